//! HTTP server for the climate API.
//!
//! `tiny_http` accepts connections on the listener thread; each request is
//! handed to a worker in a fixed-size thread pool, which acquires its own
//! store from the `StoreSource` for the duration of that request.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use threadpool::ThreadPool;
use tracing::{info, warn};

use crate::routes::{self, ApiResponse};
use crate::store::StoreSource;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Failed to start HTTP server on {addr}: {message}")]
    Bind { addr: String, message: String },
}

/// A bound, not yet serving, HTTP endpoint.
pub struct EndpointServer {
    server: tiny_http::Server,
    workers: usize,
    debug: bool,
}

impl EndpointServer {
    /// Bind the listener. Port 0 picks an ephemeral port.
    pub fn bind(addr: &str, workers: usize, debug: bool) -> Result<Self, EndpointError> {
        let server = tiny_http::Server::http(addr).map_err(|e| EndpointError::Bind {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            server,
            workers: workers.max(1),
            debug,
        })
    }

    /// Address actually bound, if listening on TCP.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests until the listener shuts down.
    pub fn serve<S>(self, source: S)
    where
        S: StoreSource + 'static,
    {
        let source = Arc::new(source);
        let pool = ThreadPool::new(self.workers);
        let debug = self.debug;

        if let Some(addr) = self.local_addr() {
            info!(%addr, workers = self.workers, "HTTP endpoint listening");
        }

        for request in self.server.incoming_requests() {
            let source = Arc::clone(&source);
            pool.execute(move || handle_request(request, source.as_ref(), debug));
        }

        pool.join();
    }
}

/// Route one request and write the response back to the client.
fn handle_request<S: StoreSource>(request: tiny_http::Request, source: &S, debug: bool) {
    let started = Instant::now();
    let method = request.method().as_str().to_string();
    let url = request.url().to_string();

    let response = routes::respond(source, &method, &url, debug);

    info!(
        method = %method,
        path = %url,
        status = response.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );

    if let Err(e) = request.respond(create_response(response)) {
        warn!(error = %e, path = %url, "Failed to send response");
    }
}

/// Convert an `ApiResponse` into a `tiny_http` response with its content type.
fn create_response(response: ApiResponse) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let mut http = tiny_http::Response::from_data(response.body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(response.status));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], response.content_type.as_bytes()) {
        Ok(header) => http = http.with_header(header),
        Err(()) => warn!(content_type = response.content_type, "Invalid content type header"),
    }

    http
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_response_sets_status_and_content_type() {
        let response = create_response(ApiResponse::json(
            404,
            &serde_json::json!({ "error": "No stations available." }),
        ));

        assert_eq!(response.status_code(), tiny_http::StatusCode(404));
        let content_type = response
            .headers()
            .iter()
            .find(|h| h.field.equiv("Content-Type"))
            .expect("content type header");
        assert_eq!(content_type.value.as_str(), "application/json");
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let server = EndpointServer::bind("127.0.0.1:0", 2, false).unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }
}
