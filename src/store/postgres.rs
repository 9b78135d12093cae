//! PostgreSQL backend for `ClimateStore`.
//!
//! Expects two tables in the configured schema:
//!
//! ```sql
//! measurement (station TEXT, date TEXT, prcp DOUBLE PRECISION, tobs DOUBLE PRECISION)
//! station     (station TEXT UNIQUE, name TEXT, latitude DOUBLE PRECISION,
//!              longitude DOUBLE PRECISION, elevation DOUBLE PRECISION)
//! ```
//!
//! `prcp`/`tobs` may also be REAL and `date` may be DATE; queries cast them.

use postgres::Client;
use postgres::NoTls;
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use tracing::debug;

use super::{ClimateStore, StoreSource};
use crate::error::StoreError;
use crate::model::{PrecipitationReading, TemperatureReading, TemperatureSummary};

/// Connection pool type used by the service.
pub type PgPool = Pool<PostgresConnectionManager<NoTls>>;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// `ClimateStore` over a borrowed client, usually a pooled connection.
pub struct PgClimateStore<'a> {
    client: &'a mut Client,
    measurement_table: String,
    station_table: String,
}

impl<'a> PgClimateStore<'a> {
    pub fn new(client: &'a mut Client, schema: &str) -> Self {
        let schema = quote_ident(schema);
        Self {
            client,
            measurement_table: format!("{}.measurement", schema),
            station_table: format!("{}.station", schema),
        }
    }
}

// Selected columns are cast to the Rust type they are read as (REAL and
// DATE columns decode too). Reads go through `try_get`.
impl ClimateStore for PgClimateStore<'_> {
    fn most_recent_date(&mut self) -> Result<Option<String>, StoreError> {
        let row = self.client.query_one(
            &format!("SELECT MAX(date::text) FROM {}", self.measurement_table),
            &[],
        )?;
        Ok(row.try_get(0)?)
    }

    fn measurements_since(&mut self, since: &str) -> Result<Vec<PrecipitationReading>, StoreError> {
        let rows = self.client.query(
            &format!(
                "SELECT date::text, prcp::float8 FROM {} WHERE date::text >= $1",
                self.measurement_table
            ),
            &[&since],
        )?;

        debug!(since, rows = rows.len(), "Fetched precipitation rows");

        rows.iter()
            .map(|row| -> Result<PrecipitationReading, StoreError> {
                Ok(PrecipitationReading {
                    date: row.try_get(0)?,
                    prcp: row.try_get(1)?,
                })
            })
            .collect()
    }

    fn all_station_ids(&mut self) -> Result<Vec<String>, StoreError> {
        let rows = self.client.query(
            &format!("SELECT station::text FROM {}", self.station_table),
            &[],
        )?;
        rows.iter()
            .map(|row| row.try_get(0).map_err(StoreError::from))
            .collect()
    }

    fn most_active_station(&mut self) -> Result<Option<String>, StoreError> {
        let rows = self.client.query(
            &format!(
                "SELECT station::text
                 FROM {}
                 GROUP BY station
                 ORDER BY COUNT(*) DESC, station ASC
                 LIMIT 1",
                self.measurement_table
            ),
            &[],
        )?;
        rows.first()
            .map(|row| row.try_get(0).map_err(StoreError::from))
            .transpose()
    }

    fn most_recent_date_for_station(&mut self, station: &str) -> Result<Option<String>, StoreError> {
        let row = self.client.query_one(
            &format!(
                "SELECT MAX(date::text) FROM {} WHERE station::text = $1",
                self.measurement_table
            ),
            &[&station],
        )?;
        Ok(row.try_get(0)?)
    }

    fn measurements_for_station(
        &mut self,
        station: &str,
        since: &str,
    ) -> Result<Vec<TemperatureReading>, StoreError> {
        let rows = self.client.query(
            &format!(
                "SELECT date::text, tobs::float8 FROM {}
                 WHERE station::text = $1 AND date::text >= $2",
                self.measurement_table
            ),
            &[&station, &since],
        )?;

        rows.iter()
            .map(|row| -> Result<TemperatureReading, StoreError> {
                Ok(TemperatureReading {
                    date: row.try_get(0)?,
                    tobs: row.try_get(1)?,
                })
            })
            .collect()
    }

    fn temperature_summary(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureSummary, StoreError> {
        let select = format!(
            "SELECT MIN(tobs)::float8, AVG(tobs)::float8, MAX(tobs)::float8 FROM {}",
            self.measurement_table
        );

        let row = match end {
            Some(end) => self.client.query_one(
                &format!("{} WHERE date::text >= $1 AND date::text <= $2", select),
                &[&start, &end],
            )?,
            None => self
                .client
                .query_one(&format!("{} WHERE date::text >= $1", select), &[&start])?,
        };

        Ok(TemperatureSummary {
            min: row.try_get(0)?,
            avg: row.try_get(1)?,
            max: row.try_get(2)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Pooled source
// ---------------------------------------------------------------------------

/// Checks a connection out of the pool for each request.
#[derive(Clone)]
pub struct PgStoreSource {
    pool: PgPool,
    schema: String,
}

impl PgStoreSource {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        Self {
            pool,
            schema: schema.to_string(),
        }
    }
}

impl StoreSource for PgStoreSource {
    fn with_store<R, E>(
        &self,
        f: impl FnOnce(&mut dyn ClimateStore) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut conn = self.pool.get().map_err(StoreError::from)?;
        let mut store = PgClimateStore::new(&mut conn, &self.schema);
        f(&mut store)
        // Connection goes back to the pool when `conn` drops here.
    }
}

/// Quote a schema name as a SQL identifier.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("public"), "\"public\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
