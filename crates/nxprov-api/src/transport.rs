// Shared transport configuration for building reqwest::Client instances.
//
// The session client (cookie jar) and the command-API client (no jar, Basic
// auth per request) share TLS and timeout settings through this module.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use tracing::warn;

use crate::connection::Connection;
use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Accept any certificate (for self-signed switches).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// `None` leaves reqwest's default (no overall timeout).
    pub timeout: Option<Duration>,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: None,
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Transport settings implied by a connection's TLS policy.
    pub fn for_connection(connection: &Connection) -> Self {
        Self {
            tls: if connection.verify_tls() {
                TlsMode::System
            } else {
                TlsMode::DangerAcceptInvalid
            },
            ..Self::default()
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    /// Same settings without a cookie jar.
    pub fn without_cookie_jar(mut self) -> Self {
        self.cookie_jar = None;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("nxprov/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if self.tls == TlsMode::DangerAcceptInvalid {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Log the verification policy once per client, never per request.
    pub(crate) fn announce(&self, base_url: &str) {
        if self.tls == TlsMode::DangerAcceptInvalid {
            warn!(base_url, "TLS certificate verification disabled");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::connection::{Credentials, Protocol};

    #[test]
    fn connection_policy_maps_to_tls_mode() {
        let strict = Connection::new(
            "10.0.0.1",
            443,
            Protocol::Https,
            true,
            Credentials::new("admin", "pw"),
        )
        .unwrap();
        let lax = Connection::new(
            "10.0.0.1",
            443,
            Protocol::Https,
            false,
            Credentials::new("admin", "pw"),
        )
        .unwrap();

        assert_eq!(TransportConfig::for_connection(&strict).tls, TlsMode::System);
        assert_eq!(
            TransportConfig::for_connection(&lax).tls,
            TlsMode::DangerAcceptInvalid
        );
    }

    #[test]
    fn cookie_jar_toggles() {
        let config = TransportConfig::default().with_cookie_jar();
        assert!(config.cookie_jar.is_some());
        assert!(config.without_cookie_jar().cookie_jar.is_none());
    }

    #[test]
    fn builds_client_with_and_without_verification() {
        let mut config = TransportConfig::default().with_timeout(Some(Duration::from_secs(5)));
        assert!(config.build_client().is_ok());
        config.tls = TlsMode::DangerAcceptInvalid;
        assert!(config.build_client().is_ok());
    }
}
