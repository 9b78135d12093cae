//! In-memory `ClimateStore` with the same query semantics as the
//! PostgreSQL backend. Backs the route tests and the end-to-end server
//! tests, so it must agree with the SQL in `store::postgres`.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ClimateStore, StoreSource};
use crate::error::StoreError;
use crate::model::{
    Measurement, PrecipitationReading, Station, TemperatureReading, TemperatureSummary,
};

#[derive(Debug, Default)]
struct Dataset {
    measurements: Vec<Measurement>,
    stations: Vec<Station>,
}

/// Immutable dataset shared cheaply between requests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Dataset>,
}

impl MemoryStore {
    pub fn new(measurements: Vec<Measurement>, stations: Vec<Station>) -> Self {
        Self {
            data: Arc::new(Dataset {
                measurements,
                stations,
            }),
        }
    }

    /// Store with no measurements and no stations.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl ClimateStore for MemoryStore {
    fn most_recent_date(&mut self) -> Result<Option<String>, StoreError> {
        Ok(self.data.measurements.iter().map(|m| m.date.clone()).max())
    }

    fn measurements_since(&mut self, since: &str) -> Result<Vec<PrecipitationReading>, StoreError> {
        Ok(self
            .data
            .measurements
            .iter()
            .filter(|m| m.date.as_str() >= since)
            .map(|m| PrecipitationReading {
                date: m.date.clone(),
                prcp: m.prcp,
            })
            .collect())
    }

    fn all_station_ids(&mut self) -> Result<Vec<String>, StoreError> {
        Ok(self.data.stations.iter().map(|s| s.station.clone()).collect())
    }

    fn most_active_station(&mut self) -> Result<Option<String>, StoreError> {
        // BTreeMap iterates in station order, so a strict `>` keeps the
        // lowest id on ties, same as `ORDER BY COUNT(*) DESC, station ASC`.
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for m in &self.data.measurements {
            *counts.entry(m.station.as_str()).or_insert(0) += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for (station, count) in counts {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((station, count));
            }
        }

        Ok(best.map(|(station, _)| station.to_string()))
    }

    fn most_recent_date_for_station(&mut self, station: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .data
            .measurements
            .iter()
            .filter(|m| m.station == station)
            .map(|m| m.date.clone())
            .max())
    }

    fn measurements_for_station(
        &mut self,
        station: &str,
        since: &str,
    ) -> Result<Vec<TemperatureReading>, StoreError> {
        Ok(self
            .data
            .measurements
            .iter()
            .filter(|m| m.station == station && m.date.as_str() >= since)
            .map(|m| TemperatureReading {
                date: m.date.clone(),
                tobs: m.tobs,
            })
            .collect())
    }

    fn temperature_summary(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureSummary, StoreError> {
        let temps: Vec<f64> = self
            .data
            .measurements
            .iter()
            .filter(|m| m.date.as_str() >= start)
            .filter(|m| end.is_none_or(|end| m.date.as_str() <= end))
            .filter_map(|m| m.tobs)
            .collect();

        if temps.is_empty() {
            return Ok(TemperatureSummary::default());
        }

        let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
        let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = temps.iter().sum::<f64>() / temps.len() as f64;

        Ok(TemperatureSummary {
            min: Some(min),
            avg: Some(avg),
            max: Some(max),
        })
    }
}

impl StoreSource for MemoryStore {
    fn with_store<R, E>(
        &self,
        f: impl FnOnce(&mut dyn ClimateStore) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut view = self.clone();
        f(&mut view)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
