//! Shared record types for the climate dataset.
//!
//! These mirror the two tables in the store (`measurement`, `station`)
//! plus the narrower row shapes the routes actually query.

use serde::{Deserialize, Serialize};

/// Date format used by the `measurement.date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Table records
// ---------------------------------------------------------------------------

/// One row of the `measurement` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Station code, references `station.station`.
    pub station: String,
    /// Observation date as `YYYY-MM-DD` text.
    pub date: String,
    /// Precipitation amount, missing for some days.
    pub prcp: Option<f64>,
    /// Observed temperature.
    pub tobs: Option<f64>,
}

impl Measurement {
    pub fn new(station: &str, date: &str, prcp: Option<f64>, tobs: Option<f64>) -> Self {
        Self {
            station: station.to_string(),
            date: date.to_string(),
            prcp,
            tobs,
        }
    }
}

/// One row of the `station` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl Station {
    /// Station with only an id and name; location left unknown.
    pub fn named(station: &str, name: &str) -> Self {
        Self {
            station: station.to_string(),
            name: name.to_string(),
            latitude: None,
            longitude: None,
            elevation: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Query shapes
// ---------------------------------------------------------------------------

/// `(date, prcp)` projection used by the precipitation route.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

/// `(date, tobs)` projection used by the tobs route.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureReading {
    pub date: String,
    pub tobs: Option<f64>,
}

/// Min / average / max temperature over a date range.
///
/// All three fields are `None` when no row matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    #[serde(rename = "TMIN")]
    pub min: Option<f64>,
    #[serde(rename = "TAVG")]
    pub avg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub max: Option<f64>,
}

impl TemperatureSummary {
    /// True when the range contained no temperature observations.
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.avg.is_none() && self.max.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_with_uppercase_keys() {
        let summary = TemperatureSummary {
            min: Some(75.0),
            avg: Some(77.5),
            max: Some(79.0),
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["TMIN"], 75.0);
        assert_eq!(json["TAVG"], 77.5);
        assert_eq!(json["TMAX"], 79.0);
    }

    #[test]
    fn test_empty_summary_serializes_nulls() {
        let summary = TemperatureSummary::default();
        assert!(summary.is_empty());

        let json = serde_json::to_value(summary).unwrap();
        assert!(json["TMIN"].is_null());
        assert!(json["TAVG"].is_null());
        assert!(json["TMAX"].is_null());
    }
}
