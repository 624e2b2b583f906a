use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use edgelab::cli::Args;
use edgelab::engine::assets::DirAssetSource;
use edgelab::server::{create_listener, MetricsServer, SimServer};
use edgelab::{telemetry, ResponseEngine};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let config = args.resolve_config()?;
    telemetry::init(&config.logging)?;

    if config.posture.is_vulnerable() {
        warn!("Posture is VULNERABLE: input is reflected raw and /admin is open");
    } else {
        info!("Posture is safe");
    }
    info!("Serving static assets from {}", config.static_dir.display());

    let engine = Arc::new(ResponseEngine::new(
        config.engine_settings(),
        Arc::new(DirAssetSource::new(&config.static_dir)),
    ));

    let addr = config.listen.socket_addr();
    let listener =
        create_listener(addr).with_context(|| format!("Failed to bind listener on {addr}"))?;

    if config.metrics.enabled {
        let metrics_addr = SocketAddr::new(config.listen.host, config.metrics.port);
        let metrics_listener = create_listener(metrics_addr)
            .with_context(|| format!("Failed to bind metrics listener on {metrics_addr}"))?;
        tokio::spawn(async move {
            if let Err(err) = MetricsServer::run(metrics_listener).await {
                error!("Metrics server stopped: {:#}", err);
            }
        });
    }

    tokio::select! {
        result = SimServer::new(engine).run(listener) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
