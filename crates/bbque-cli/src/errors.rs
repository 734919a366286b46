//! Error types for the allocation tool.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use bbque_ras::{AllocationError, TelemetryError};
use thiserror::Error;

/// Exit status reported when the resource manager is not configured.
pub(crate) const EXIT_NOT_CONFIGURED: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("resource manager is not configured: set BBQUE_IP and BBQUE_PORT")]
    NotConfigured,
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("allocation failed: {0}")]
    Allocation(#[from] AllocationError),
    #[error("failed to serialise allocation: {0}")]
    SerialiseAllocation(serde_json::Error),
    #[error("failed to write allocation: {0}")]
    EmitAllocation(io::Error),
}

impl AppError {
    /// Process exit status for this error.
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotConfigured => ExitCode::from(EXIT_NOT_CONFIGURED),
            Self::Allocation(error) if error.is_unavailable() => {
                ExitCode::from(EXIT_NOT_CONFIGURED)
            }
            _ => ExitCode::FAILURE,
        }
    }
}
