//! Route table and handlers for the climate API.
//!
//! Endpoints:
//! - GET /                          - Route listing (HTML)
//! - GET /health                    - Service health check
//! - GET /api/v1.0/precipitation    - Trailing-year precipitation by date
//! - GET /api/v1.0/stations         - All station ids
//! - GET /api/v1.0/tobs             - Trailing-year temperatures of the most active station
//! - GET /api/v1.0/{start}          - TMIN/TAVG/TMAX from start onward
//! - GET /api/v1.0/{start}/{end}    - TMIN/TAVG/TMAX between start and end, inclusive
//!
//! Handlers only see a `ClimateStore`; how the store is acquired is up to
//! the `StoreSource` passed to `respond`.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::error;

use crate::error::ApiError;
use crate::store::{ClimateStore, StoreSource};
use crate::window::trailing_year_cutoff;

const API_PREFIX: &str = "/api/v1.0/";

/// Listed in 404 bodies.
pub const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/",
    "/health",
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/{start}",
    "/api/v1.0/{start}/{end}",
];

const HOME_PAGE: &str = "Available Routes:<br/>\
    /api/v1.0/precipitation<br/>\
    /api/v1.0/stations<br/>\
    /api/v1.0/tobs<br/>\
    /api/v1.0/YYYY-MM-DD<br/>\
    /api/v1.0/YYYY-MM-DD/YYYY-MM-DD<br/>";

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// A parsed request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Health,
    Precipitation,
    Stations,
    Tobs,
    TemperatureFrom { start: String },
    TemperatureRange { start: String, end: String },
}

impl Route {
    /// Match a request URL against the route table.
    ///
    /// Query strings and a trailing slash are ignored. Date segments are
    /// percent-decoded but not validated.
    pub fn parse(url: &str) -> Option<Route> {
        let path = url.split('?').next().unwrap_or("");
        let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };

        match path {
            "" | "/" => return Some(Route::Home),
            "/health" => return Some(Route::Health),
            _ => {}
        }

        let rest = path.strip_prefix(API_PREFIX)?;
        // Split on raw slashes, then decode, so an encoded name still hits
        // its fixed route and `%2F` stays inside one segment.
        let segments: Vec<String> = rest.split('/').map(decode_segment).collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        match segments.as_slice() {
            ["precipitation"] => Some(Route::Precipitation),
            ["stations"] => Some(Route::Stations),
            ["tobs"] => Some(Route::Tobs),
            [start] if !start.is_empty() => Some(Route::TemperatureFrom {
                start: start.to_string(),
            }),
            [start, end] if !start.is_empty() && !end.is_empty() => {
                Some(Route::TemperatureRange {
                    start: start.to_string(),
                    end: end.to_string(),
                })
            }
            _ => None,
        }
    }
}

/// Percent-decode a path segment, keeping it verbatim if it isn't UTF-8.
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Status, content type and body ready to hand to the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                error!(error = %e, "Failed to serialize response");
                Self {
                    status: 500,
                    content_type: "application/json",
                    body: r#"{"error": "Internal server error"}"#.to_string(),
                }
            }
        }
    }

    pub fn html(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
        }
    }

    /// Parse the body back as JSON. Handy in tests and clients.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Answer one request. Never fails: errors become their JSON error body.
pub fn respond<S: StoreSource>(source: &S, method: &str, url: &str, debug: bool) -> ApiResponse {
    match route_request(source, method, url) {
        Ok(response) => response,
        Err(err) => {
            if err.status_code() >= 500 {
                error!(error = %err, url, "Request failed");
            }
            ApiResponse::json(err.status_code(), &err.to_json(debug))
        }
    }
}

fn route_request<S: StoreSource>(
    source: &S,
    method: &str,
    url: &str,
) -> Result<ApiResponse, ApiError> {
    if !method.eq_ignore_ascii_case("GET") {
        return Err(ApiError::MethodNotAllowed);
    }

    let route = Route::parse(url).ok_or(ApiError::NotFound)?;

    match route {
        Route::Home => Ok(ApiResponse::html(200, HOME_PAGE)),
        Route::Health => Ok(handle_health()),
        route => source.with_store(|store| dispatch(&route, store)),
    }
}

/// Run a data route against an already-acquired store.
pub fn dispatch(route: &Route, store: &mut dyn ClimateStore) -> Result<ApiResponse, ApiError> {
    match route {
        Route::Home => Ok(ApiResponse::html(200, HOME_PAGE)),
        Route::Health => Ok(handle_health()),
        Route::Precipitation => handle_precipitation(store),
        Route::Stations => handle_stations(store),
        Route::Tobs => handle_tobs(store),
        Route::TemperatureFrom { start } => handle_temperature(store, start, None),
        Route::TemperatureRange { start, end } => handle_temperature(store, start, Some(end)),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_health() -> ApiResponse {
    ApiResponse::json(
        200,
        &serde_json::json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Date → precipitation over the trailing year of the whole dataset.
/// A date seen more than once keeps the last row's value.
fn handle_precipitation(store: &mut dyn ClimateStore) -> Result<ApiResponse, ApiError> {
    let most_recent = store
        .most_recent_date()?
        .ok_or_else(|| ApiError::no_data("No data available."))?;

    let cutoff = trailing_year_cutoff(&most_recent)?;
    let rows = store.measurements_since(&cutoff)?;

    if rows.is_empty() {
        return Err(ApiError::no_data("No data available for the last 12 months."));
    }

    let by_date: BTreeMap<String, Option<f64>> =
        rows.into_iter().map(|r| (r.date, r.prcp)).collect();

    Ok(ApiResponse::json(200, &by_date))
}

fn handle_stations(store: &mut dyn ClimateStore) -> Result<ApiResponse, ApiError> {
    let stations = store.all_station_ids()?;

    if stations.is_empty() {
        return Err(ApiError::no_data("No stations available."));
    }

    Ok(ApiResponse::json(200, &stations))
}

/// Date → temperature over the most active station's own trailing year.
fn handle_tobs(store: &mut dyn ClimateStore) -> Result<ApiResponse, ApiError> {
    let no_data = || ApiError::no_data("No temperature observations available.");

    let station = store.most_active_station()?.ok_or_else(no_data)?;
    let most_recent = store
        .most_recent_date_for_station(&station)?
        .ok_or_else(no_data)?;

    let cutoff = trailing_year_cutoff(&most_recent)?;
    let rows = store.measurements_for_station(&station, &cutoff)?;

    if rows.is_empty() {
        return Err(no_data());
    }

    let by_date: BTreeMap<String, Option<f64>> =
        rows.into_iter().map(|r| (r.date, r.tobs)).collect();

    Ok(ApiResponse::json(200, &by_date))
}

fn handle_temperature(
    store: &mut dyn ClimateStore,
    start: &str,
    end: Option<&str>,
) -> Result<ApiResponse, ApiError> {
    let summary = store.temperature_summary(start, end)?;

    if summary.is_empty() {
        return Err(ApiError::no_data(
            "No temperature observations in the requested date range.",
        ));
    }

    Ok(ApiResponse::json(200, &summary))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
