//! CLI error types with miette diagnostics.
//!
//! Every error ends the run with the failure exit code; the variants exist
//! for the message and help text.

use miette::Diagnostic;
use thiserror::Error;

use nxprov_config::ConfigError;
use nxprov_core::CoreError;

/// Process exit codes. Success is 1 and failure is 0, which scripts
/// driving this tool already depend on.
pub mod exit_code {
    pub const SUCCESS: i32 = 1;
    pub const FAILURE: i32 = 0;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(
        code(nxprov::validation),
        help("--ip must be an IPv4 or IPv6 address, e.g. 192.0.2.10 or 2001:db8::10")
    )]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(nxprov::config),
        help("Check the file passed with --config or the NXPROV_* environment variables.")
    )]
    Config(#[from] ConfigError),

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not set up a client for {url}: {reason}")]
    #[diagnostic(code(nxprov::client))]
    Client { url: String, reason: String },

    // ── Provisioning ─────────────────────────────────────────────────
    #[error("Provisioning incomplete: {reason}")]
    #[diagnostic(
        code(nxprov::incomplete),
        help("Failed steps are listed above; rerun with -v for request details.")
    )]
    Incomplete { reason: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        exit_code::FAILURE
    }
}

// ── Lower-layer error mapping ─────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "plan".into(),
                reason: message,
            },
            other => CliError::Incomplete {
                reason: other.to_string(),
            },
        }
    }
}

impl From<nxprov_api::Error> for CliError {
    fn from(err: nxprov_api::Error) -> Self {
        match err {
            nxprov_api::Error::Validation { field, reason } => {
                CliError::Validation { field, reason }
            }
            other => CliError::Incomplete {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_is_a_failure() {
        let err = CliError::Incomplete {
            reason: "1 VLAN(s) could not be created".into(),
        };
        assert_eq!(err.exit_code(), exit_code::FAILURE);
        assert_ne!(exit_code::SUCCESS, exit_code::FAILURE);
    }

    #[test]
    fn host_validation_keeps_field() {
        let err: CliError = nxprov_api::Error::Validation {
            field: "host".into(),
            reason: "'sw1' is not an IPv4 or IPv6 address".into(),
        }
        .into();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "host"));
    }
}
