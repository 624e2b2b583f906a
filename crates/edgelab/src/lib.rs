// Library exports for the binary and integration tests

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod server;
pub mod telemetry;

pub use engine::{EngineSettings, ResponseEngine};
pub use error::RequestError;
