//! Data access layer.
//!
//! Every route reads the dataset through `ClimateStore`. Two backends
//! implement it:
//! - `postgres` — queries against the live `measurement`/`station` tables
//! - `memory`   — the same semantics over in-process vectors (tests, demos)
//!
//! A `StoreSource` hands out a store scoped to one request. For PostgreSQL
//! that means a connection checked out of the pool and returned when the
//! closure finishes; nothing is shared between requests.

pub mod memory;
pub mod postgres;

use crate::error::StoreError;
use crate::model::{PrecipitationReading, TemperatureReading, TemperatureSummary};

pub use self::memory::MemoryStore;
pub use self::postgres::{PgClimateStore, PgPool, PgStoreSource};

/// Read-only queries over the climate dataset.
///
/// Dates are `YYYY-MM-DD` strings and compare lexically; callers pass
/// them through unvalidated, so a malformed date simply matches nothing.
pub trait ClimateStore {
    /// Latest `date` across all measurements, `None` if the table is empty.
    fn most_recent_date(&mut self) -> Result<Option<String>, StoreError>;

    /// `(date, prcp)` for every measurement with `date >= since`.
    fn measurements_since(&mut self, since: &str) -> Result<Vec<PrecipitationReading>, StoreError>;

    /// Every station id in the station table.
    fn all_station_ids(&mut self) -> Result<Vec<String>, StoreError>;

    /// Station with the most measurement rows.
    ///
    /// Ties go to the lowest station id.
    fn most_active_station(&mut self) -> Result<Option<String>, StoreError>;

    /// Latest `date` recorded for one station.
    fn most_recent_date_for_station(&mut self, station: &str) -> Result<Option<String>, StoreError>;

    /// `(date, tobs)` for one station with `date >= since`.
    fn measurements_for_station(
        &mut self,
        station: &str,
        since: &str,
    ) -> Result<Vec<TemperatureReading>, StoreError>;

    /// Min/avg/max of `tobs` over `date >= start` and, if given, `date <= end`.
    fn temperature_summary(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureSummary, StoreError>;
}

/// Provides a request-scoped `ClimateStore`.
pub trait StoreSource: Send + Sync {
    /// Run `f` against a store that lives only for this call.
    fn with_store<R, E>(
        &self,
        f: impl FnOnce(&mut dyn ClimateStore) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>;
}
