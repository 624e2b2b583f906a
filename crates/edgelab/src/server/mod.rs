//! HTTP transport for the simulator.
//!
//! # Module Structure
//!
//! - `server` - SimServer accept loop and per-request handling
//! - `router` - `(method, path)` to endpoint dispatch
//! - `response_ext` - engine outcome to hyper response conversion
//! - `metrics_server` - Prometheus scrape listener
//! - `network` - listener creation and the `Accept` seam

mod metrics_server;
mod network;
mod response_ext;
pub mod router;
mod server;

pub use metrics_server::MetricsServer;
pub use network::{create_listener, Accept};
pub use server::SimServer;
