//! Prometheus scrape endpoint on its own listener.

use std::convert::Infallible;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tracing::{debug, error, info};

use super::network::{Accept, ACCEPT_ERROR_BACKOFF};
use crate::metrics::collect_metrics;

pub struct MetricsServer;

impl MetricsServer {
    pub async fn run<A: Accept>(listener: A) -> Result<(), anyhow::Error> {
        info!("Metrics listening on http://{}/metrics", listener.local_addr()?);

        loop {
            let stream = match listener.accept().await {
                Ok((stream, _)) => stream,
                Err(err) => {
                    error!("Metrics accept error: {}", err);
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            };
            let io = TokioIo::new(stream);

            tokio::spawn(async move {
                let service = service_fn(|req| async move { handle_metrics(req) });
                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Metrics connection error: {}", e);
                }
            });
        }
    }
}

fn handle_metrics(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => {
            let mut response = Response::new(Full::new(Bytes::from(collect_metrics())));
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        _ => {
            let mut response = Response::new(Full::new(Bytes::from_static(b"Not found")));
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        }
    };
    Ok(response)
}
