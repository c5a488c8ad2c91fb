// ── Core error types ──
//
// Domain errors for the provisioning layer. The `From<nxprov_api::Error>`
// impl folds transport and HTTP details into workflow-level variants.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to switch: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session already closed")]
    SessionClosed,

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Feature '{feature}' could not be enabled after {attempts} attempt(s)")]
    FeatureUnavailable { feature: String, attempts: u32 },

    #[error("Rejected by switch (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("No addresses left after {last}")]
    AddressSpaceExhausted { last: Ipv4Addr },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<nxprov_api::Error> for CoreError {
    fn from(err: nxprov_api::Error) -> Self {
        match err {
            nxprov_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            nxprov_api::Error::SessionClosed => CoreError::SessionClosed,
            nxprov_api::Error::Transport(e) => CoreError::ConnectionFailed {
                reason: e.to_string(),
            },
            nxprov_api::Error::Tls(reason) => CoreError::ConnectionFailed { reason },
            nxprov_api::Error::InvalidUrl(e) => CoreError::ValidationFailed {
                message: format!("invalid URL: {e}"),
            },
            nxprov_api::Error::Api { status, message } => CoreError::Rejected { status, message },
            nxprov_api::Error::Deserialization { message, .. } => {
                CoreError::Internal(format!("unexpected reply: {message}"))
            }
            nxprov_api::Error::Validation { field, reason } => CoreError::ValidationFailed {
                message: format!("{field}: {reason}"),
            },
        }
    }
}
