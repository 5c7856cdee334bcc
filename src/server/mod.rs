//! HTTP host for the healthcheck engine.
//!
//! A small HTTP/1 server that routes requests to the engine, checks the URL
//! secret and caller IP, exposes the pause control endpoints and a plain
//! liveness route for the process itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck::server::Server;
//! use tokio::net::TcpListener;
//!
//! let listener = TcpListener::bind(config.server.listen_addr).await?;
//! Server::new(config.server.clone(), engine).run(listener).await?;
//! ```
//!
//! A healthcheck run is bound to its request: if the client goes away the
//! run is cancelled and no further probes are started.

pub mod access_log;
pub mod gate;
pub mod routing;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE, USER_AGENT};
use http::request::Parts;
use http_body_util::Full;
use hyper::body::Incoming as IncomingBody;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::healthcheck::{Healthcheck, RequestInfo};

use self::access_log::AccessEntry;
use self::gate::Gate;
use self::routing::Route;

/// Shared per-process server state.
struct AppState {
    engine: Arc<Healthcheck>,
    config: ServerConfig,
    gate: Gate,
}

/// HTTP server in front of a [`Healthcheck`].
#[derive(Clone)]
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: ServerConfig, engine: Healthcheck) -> Self {
        let gate = Gate::new(config.secret.clone(), &config.allowed_ips);
        Self {
            state: Arc::new(AppState {
                engine: Arc::new(engine),
                config,
                gate,
            }),
        }
    }

    /// Bind the configured address and serve forever.
    pub async fn bind_and_run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.state.config.listen_addr).await?;
        self.run(listener).await
    }

    /// Serve connections from `listener` until accepting fails.
    pub async fn run(&self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            addr = %listener.local_addr()?,
            path = %format!("/{}/", self.state.config.path_segment),
            "Healthcheck server listening"
        );

        loop {
            let (stream, remote) = listener.accept().await?;
            let _ = stream.set_nodelay(true);
            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { handle(req, remote, state).await }
                });

                let io = TokioIo::new(stream);
                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(error = %e, "Connection closed with error");
                }
            });
        }
    }
}

async fn handle(
    req: Request<IncomingBody>,
    remote: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().simple().to_string();

    let (req, _body) = req.into_parts();
    let response = dispatch(&req, remote, &state).await;

    if state.config.access_log {
        let size = hyper::body::Body::size_hint(response.body()).exact().unwrap_or(0);
        access_log::log_request(&AccessEntry {
            request_id: &request_id,
            ip: remote.ip(),
            method: req.method.as_str(),
            path: req.uri.path(),
            status: response.status().as_u16(),
            bytes: size,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
            user_agent: req.headers.get(USER_AGENT).and_then(|v| v.to_str().ok()),
        });
    }

    Ok(response)
}

async fn dispatch(
    req: &Parts,
    remote: SocketAddr,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    if req.method != Method::GET && req.method != Method::HEAD {
        return text(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    match routing::route(req.uri.path(), &state.config.path_segment) {
        Route::Liveness => response(
            StatusCode::OK,
            "application/json",
            format!(r#"{{"status":"ok","version":"{}"}}"#, crate::VERSION),
        ),
        Route::Healthcheck { secret, format } => {
            if let Some(denied) = deny(state, &secret, remote) {
                return denied;
            }
            run_healthcheck(state, format, remote).await
        }
        Route::Pause { secret } => {
            if let Some(denied) = deny(state, &secret, remote) {
                return denied;
            }
            pause_control(state, req.uri.query(), true).await
        }
        Route::Play { secret } => {
            if let Some(denied) = deny(state, &secret, remote) {
                return denied;
            }
            pause_control(state, req.uri.query(), false).await
        }
        Route::NotFound => text(StatusCode::NOT_FOUND, "Not found"),
    }
}

/// Refusal response if the gate does not let the request through.
fn deny(state: &AppState, secret: &str, remote: SocketAddr) -> Option<Response<Full<Bytes>>> {
    let denied = state.gate.check(secret, remote.ip()).err()?;
    warn!(ip = %remote.ip(), reason = denied.reason(), "Healthcheck request refused");

    let body = if state.engine.config().debug {
        format!("Access denied: {}", denied.reason())
    } else {
        "Access denied".to_string()
    };
    Some(text(StatusCode::FORBIDDEN, body))
}

async fn run_healthcheck(
    state: &Arc<AppState>,
    format: String,
    remote: SocketAddr,
) -> Response<Full<Bytes>> {
    let cancel = CancellationToken::new();
    // Dropping this handler (client gone) cancels the run.
    let _guard = cancel.clone().drop_guard();

    let engine = Arc::clone(&state.engine);
    let info = RequestInfo {
        client_ip: Some(remote.ip()),
    };
    let run = tokio::spawn(async move { engine.respond(&format, &info, &cancel).await });

    match run.await {
        Ok(result) => response(result.status, &result.content_type, result.body),
        Err(e) => {
            error!(error = %e, "Healthcheck task failed");
            text(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn pause_control(state: &AppState, query: Option<&str>, pause: bool) -> Response<Full<Bytes>> {
    let Some(identifier) = routing::query_param(query, "probe") else {
        return json_status(StatusCode::BAD_REQUEST, false);
    };

    let store = state.engine.pause_store();
    let outcome = if pause {
        store.pause(&identifier).await
    } else {
        store.resume(&identifier).await.map(|removed| {
            if !removed {
                debug!(probe = %identifier, "Probe was not paused");
            }
        })
    };

    match outcome {
        Ok(()) => {
            info!(probe = %identifier, paused = pause, "Pause flag updated");
            json_status(StatusCode::OK, true)
        }
        Err(e) => {
            error!(probe = %identifier, error = %e, "Failed to update pause flag");
            json_status(StatusCode::INTERNAL_SERVER_ERROR, false)
        }
    }
}

/// `["success"]` or `["error"]`.
fn json_status(status: StatusCode, success: bool) -> Response<Full<Bytes>> {
    let body = if success { r#"["success"]"# } else { r#"["error"]"# };
    response(status, "application/json", body)
}

fn text(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    response(status, "text/plain; charset=utf-8", body)
}

fn response(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(CONTENT_TYPE, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
