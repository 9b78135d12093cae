//! Error types shared by the store and the HTTP layer.

use thiserror::Error;

/// Failures raised while querying the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query against PostgreSQL failed.
    #[error("Database query failed: {0}")]
    Query(#[from] postgres::Error),

    /// No pooled connection could be checked out.
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Errors a route handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Path did not match any route.
    #[error("Not found")]
    NotFound,

    /// Query ran but produced an empty result set.
    #[error("{0}")]
    NoData(String),

    /// Only GET is served.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A date read back from the store could not be parsed.
    #[error("Invalid date in store: {0}")]
    InvalidStoredDate(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn no_data(message: &str) -> Self {
        ApiError::NoData(message.to_string())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound => 404,
            ApiError::NoData(_) => 404,
            ApiError::MethodNotAllowed => 405,
            ApiError::InvalidStoredDate(_) => 500,
            ApiError::Store(_) => 500,
        }
    }

    /// Render the `{"error": ...}` body.
    ///
    /// Internal failures hide their cause unless `debug` is set.
    pub fn to_json(&self, debug: bool) -> serde_json::Value {
        match self {
            ApiError::NotFound => serde_json::json!({
                "error": "Not found",
                "available_endpoints": crate::routes::AVAILABLE_ENDPOINTS,
            }),
            ApiError::NoData(message) => serde_json::json!({ "error": message }),
            ApiError::MethodNotAllowed => serde_json::json!({ "error": "Method not allowed" }),
            ApiError::InvalidStoredDate(_) | ApiError::Store(_) => {
                if debug {
                    serde_json::json!({
                        "error": "Internal server error",
                        "detail": self.to_string(),
                    })
                } else {
                    serde_json::json!({ "error": "Internal server error" })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotFound.status_code(), 404);
        assert_eq!(ApiError::no_data("No stations available.").status_code(), 404);
        assert_eq!(ApiError::MethodNotAllowed.status_code(), 405);
        assert_eq!(ApiError::InvalidStoredDate("bad".to_string()).status_code(), 500);
    }

    #[test]
    fn test_no_data_body_carries_message() {
        let body = ApiError::no_data("No data available.").to_json(false);
        assert_eq!(body, serde_json::json!({ "error": "No data available." }));
    }

    #[test]
    fn test_internal_detail_only_in_debug() {
        let err = ApiError::InvalidStoredDate("2017-13-45".to_string());

        let quiet = err.to_json(false);
        assert!(quiet.get("detail").is_none());

        let verbose = err.to_json(true);
        assert!(verbose["detail"].as_str().unwrap().contains("2017-13-45"));
    }

    #[test]
    fn test_not_found_lists_endpoints() {
        let body = ApiError::NotFound.to_json(false);
        let endpoints = body["available_endpoints"].as_array().unwrap();
        assert!(endpoints.iter().any(|e| e == "/api/v1.0/stations"));
    }
}
