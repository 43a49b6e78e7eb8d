//! Process-wide rasterizer worker endpoint.
//!
//! The endpoint is written at most once. The first caller wins and later
//! attempts are reported as [`WorkerStatus::AlreadyConfigured`].

use std::sync::OnceLock;
use tracing::{debug, info};

/// Outcome of a configuration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// This call installed the endpoint.
    Configured,
    /// An endpoint was already installed; nothing changed.
    AlreadyConfigured,
}

/// Write-once holder for a worker endpoint.
#[derive(Debug)]
pub struct WorkerEndpoint {
    src: OnceLock<String>,
}

impl WorkerEndpoint {
    pub const fn new() -> Self {
        Self {
            src: OnceLock::new(),
        }
    }

    /// Install `src` unless an endpoint is already configured.
    pub fn configure(&self, src: &str) -> WorkerStatus {
        let mut installed = false;
        let current = self.src.get_or_init(|| {
            installed = true;
            src.to_string()
        });

        if installed {
            info!("Rasterizer worker endpoint set to {}", current);
            WorkerStatus::Configured
        } else {
            debug!("Rasterizer worker endpoint already set to {}", current);
            WorkerStatus::AlreadyConfigured
        }
    }

    /// The configured endpoint, if any.
    pub fn get(&self) -> Option<&str> {
        self.src.get().map(String::as_str)
    }

    pub fn is_configured(&self) -> bool {
        self.src.get().is_some()
    }
}

impl Default for WorkerEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_WORKER: WorkerEndpoint = WorkerEndpoint::new();

/// Configure the process-wide worker endpoint.
pub fn configure_worker_src(src: &str) -> WorkerStatus {
    GLOBAL_WORKER.configure(src)
}

/// The process-wide worker endpoint, if configured.
pub fn worker_src() -> Option<&'static str> {
    GLOBAL_WORKER.get()
}
