//! climate_api: read-only JSON API over a climate observations dataset.
//!
//! # Module structure
//!
//! ```text
//! climate_api
//! ├── model     — record types (Measurement, Station, TemperatureSummary, …)
//! ├── config    — service configuration loader (climate_api.toml)
//! ├── db        — connection pool construction and table validation
//! ├── error     — StoreError / ApiError and their HTTP mapping
//! ├── window    — trailing-year cutoff arithmetic
//! ├── store
//! │   ├── postgres — ClimateStore over pooled PostgreSQL connections
//! │   └── memory   — ClimateStore over in-process data
//! ├── routes    — route table, handlers, JSON shaping
//! └── endpoint  — tiny_http server with a worker pool
//! ```

pub mod config;
pub mod db;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod routes;
pub mod store;
pub mod window;
