use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::Display;

use crate::pipeline::ProcessingMetrics;

#[derive(Debug, Clone, PartialEq, Display, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceState {
    Idle,
    Running { started_at: DateTime<Utc> },
    Stopping,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub state: ServiceState,
    pub metrics: ProcessingMetrics,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    /// Period of the metrics summary log line. Zero disables it.
    pub stats_interval: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        ServiceOptions {
            stats_interval: Duration::from_secs(10),
        }
    }
}
