// Connection parameters
//
// Host, port, scheme, TLS policy and credentials for one switch. Built once
// and never mutated; the host must be an IP literal.

use std::fmt;
use std::net::IpAddr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Error;

/// URL scheme of the management API.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

/// Username and password for both the AAA login and the command API.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Validated connection parameters for a single device.
#[derive(Debug, Clone)]
pub struct Connection {
    host: IpAddr,
    port: u16,
    protocol: Protocol,
    verify_tls: bool,
    credentials: Credentials,
}

impl Connection {
    /// Validate `host` as an IPv4/IPv6 literal and build the connection.
    ///
    /// Hostnames are rejected here, before any socket is opened.
    pub fn new(
        host: &str,
        port: u16,
        protocol: Protocol,
        verify_tls: bool,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let host: IpAddr = host.parse().map_err(|_| Error::Validation {
            field: "host".into(),
            reason: format!("'{host}' is not an IPv4 or IPv6 address"),
        })?;

        if port == 0 {
            return Err(Error::Validation {
                field: "port".into(),
                reason: "port must be between 1 and 65535".into(),
            });
        }

        if credentials.username.is_empty() {
            return Err(Error::Validation {
                field: "username".into(),
                reason: "username must not be empty".into(),
            });
        }

        Ok(Self {
            host,
            port,
            protocol,
            verify_tls,
            credentials,
        })
    }

    /// `{protocol}://{host}:{port}` with no trailing slash.
    ///
    /// IPv6 literals are bracketed, otherwise the port would be ambiguous.
    pub fn base_url(&self) -> String {
        match self.host {
            IpAddr::V4(v4) => format!("{}://{v4}:{}", self.protocol, self.port),
            IpAddr::V6(v6) => format!("{}://[{v6}]:{}", self.protocol, self.port),
        }
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("admin", "secret")
    }

    #[test]
    fn base_url_is_scheme_host_port() {
        for (host, port, proto, expected) in [
            ("10.1.1.1", 10180, Protocol::Http, "http://10.1.1.1:10180"),
            ("192.168.0.2", 443, Protocol::Https, "https://192.168.0.2:443"),
            ("172.16.5.4", 80, Protocol::Http, "http://172.16.5.4:80"),
        ] {
            let conn = Connection::new(host, port, proto, true, creds()).unwrap();
            assert_eq!(conn.base_url(), expected);
        }
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        let conn = Connection::new("2001:db8::1", 10180, Protocol::Https, false, creds()).unwrap();
        assert_eq!(conn.base_url(), "https://[2001:db8::1]:10180");
    }

    #[test]
    fn hostname_is_rejected() {
        let err = Connection::new("switch01.lab", 10180, Protocol::Http, true, creds()).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "host"));
    }

    #[test]
    fn padded_host_is_rejected() {
        for host in [" 10.0.0.1 ", "10.0.0.1\n", "\t::1"] {
            let err = Connection::new(host, 10180, Protocol::Http, true, creds()).unwrap_err();
            assert!(matches!(err, Error::Validation { ref field, .. } if field == "host"));
        }
    }

    #[test]
    fn port_zero_is_rejected() {
        let err = Connection::new("10.0.0.1", 0, Protocol::Http, true, creds()).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "port"));
    }

    #[test]
    fn protocol_parses_lowercase() {
        assert_eq!("https".parse::<Protocol>().unwrap(), Protocol::Https);
        assert_eq!(Protocol::Http.to_string(), "http");
        assert!("ftp".parse::<Protocol>().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", creds());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("REDACTED"));
    }
}
