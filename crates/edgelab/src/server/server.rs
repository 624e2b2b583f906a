//! SimServer struct and main accept loop.
//!
//! Every connection is served on its own task, so a request suspended in a
//! simulated delay never holds up another connection.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tracing::{debug, error, info};

use super::network::{Accept, ACCEPT_ERROR_BACKOFF};
use super::response_ext::OutcomeExt;
use super::router::route;
use crate::engine::context::RequestContext;
use crate::engine::ResponseEngine;
use crate::metrics;

pub struct SimServer {
    engine: Arc<ResponseEngine>,
}

impl SimServer {
    pub fn new(engine: Arc<ResponseEngine>) -> Self {
        Self { engine }
    }

    /// Accept connections forever. A failed accept is logged and retried.
    pub async fn run<A: Accept>(self, listener: A) -> Result<(), anyhow::Error> {
        info!(
            "edgelab listening on http://{} (posture: {})",
            listener.local_addr()?,
            self.engine.posture()
        );

        loop {
            let (stream, remote_addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    error!("Accept error: {}", err);
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            };
            let io = TokioIo::new(stream);
            let engine = Arc::clone(&self.engine);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let engine = Arc::clone(&engine);
                    async move { handle_request(&engine, req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }
    }
}

/// Build the request context, run the engine, and log the result.
pub async fn handle_request(
    engine: &ResponseEngine,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start_time = Instant::now();
    let ctx = RequestContext::from_request(&req);
    let endpoint = route(&ctx.method, &ctx.path);

    debug!("Received request: {} {}", ctx.method, req.uri());

    let outcome = engine.respond(&endpoint, &ctx).await;
    let status = outcome.status.as_u16();
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    info!(
        method = %ctx.method,
        path = %ctx.path,
        endpoint = endpoint.label(),
        status,
        duration_ms,
        "request completed"
    );
    metrics::record_request(endpoint.label(), status, duration_ms);

    Ok(outcome.into_response())
}
