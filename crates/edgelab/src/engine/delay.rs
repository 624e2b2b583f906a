//! Simulated latency for the `/slow` endpoint.

use std::time::Duration;

use crate::error::RequestError;

pub const DEFAULT_DELAY_MS: u64 = 1200;
pub const MAX_DELAY_MS: u64 = 5000;

/// Requested wait, clamped to `[0, MAX_DELAY_MS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedDelay {
    ms: u64,
}

impl SimulatedDelay {
    /// Parse the raw `ms` query value.
    ///
    /// Fractions are truncated. A missing value yields the default; an
    /// unparsable one is reported so the caller can log and substitute it.
    pub fn parse(raw: Option<&str>) -> Result<Self, RequestError> {
        let Some(raw) = raw else {
            return Ok(Self::default());
        };
        let value: f64 = raw
            .trim()
            .parse()
            .ok()
            .filter(|v: &f64| !v.is_nan())
            .ok_or_else(|| RequestError::invalid_input("ms", raw))?;
        Ok(Self::clamped(value))
    }

    pub fn from_query(raw: Option<&str>) -> Self {
        Self::parse(raw).unwrap_or_else(|err| {
            tracing::debug!("{err}; using {DEFAULT_DELAY_MS}ms");
            Self::default()
        })
    }

    fn clamped(value: f64) -> Self {
        let ms = value.trunc().clamp(0.0, MAX_DELAY_MS as f64) as u64;
        Self { ms }
    }

    pub fn as_millis(self) -> u64 {
        self.ms
    }

    pub fn duration(self) -> Duration {
        Duration::from_millis(self.ms)
    }

    /// Suspend on a tokio timer; other requests keep running meanwhile.
    pub async fn wait(self) {
        tokio::time::sleep(self.duration()).await;
    }
}

impl Default for SimulatedDelay {
    fn default() -> Self {
        Self {
            ms: DEFAULT_DELAY_MS,
        }
    }
}
