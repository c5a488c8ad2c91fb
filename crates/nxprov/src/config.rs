//! Merge command-line flags over the config file into run settings.
//!
//! Host and credentials come only from flags (or their env fallbacks);
//! protocol, port and TLS policy fall back to the file, then to defaults.

use std::time::Duration;

use nxprov_api::{Connection, Credentials};
use nxprov_config::Config;
use nxprov_core::ProvisioningPlan;

use crate::cli::Cli;
use crate::error::CliError;

/// Everything a run needs, validated.
#[derive(Debug)]
pub struct RunSettings {
    pub connection: Connection,
    pub timeout: Option<Duration>,
    pub plan: ProvisioningPlan,
}

/// Load the config file named by `--config` (or the platform default) and
/// apply the flags on top.
pub fn resolve(cli: &Cli) -> Result<RunSettings, CliError> {
    let config = nxprov_config::load(cli.config.as_deref())?;
    merge(cli, config)
}

fn merge(cli: &Cli, config: Config) -> Result<RunSettings, CliError> {
    let protocol = cli.proto.map_or(config.connection.proto, Into::into);
    let port = cli.port.unwrap_or(config.connection.port);
    // --ignoreSSL can only loosen the file's setting.
    let verify_tls = config.connection.verify_tls && !cli.ignore_ssl;

    let connection = Connection::new(
        &cli.ip,
        port,
        protocol,
        verify_tls,
        Credentials::new(cli.user.as_str(), cli.passwd.as_str()),
    )?;

    Ok(RunSettings {
        connection,
        timeout: config.connection.timeout(),
        plan: config.plan,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use nxprov_core::Protocol;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["nxprov", "--user", "admin", "--passwd", "pw"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_apply_without_flags() {
        let settings = merge(&parse(&["--ip", "192.0.2.1"]), Config::default()).unwrap();
        assert_eq!(settings.connection.base_url(), "http://192.0.2.1:10180");
        assert!(settings.connection.verify_tls());
        assert_eq!(settings.timeout, None);
    }

    #[test]
    fn flags_override_file() {
        let mut config = Config::default();
        config.connection.proto = Protocol::Https;
        config.connection.port = 8443;

        let settings = merge(
            &parse(&["--ip", "2001:db8::1", "--proto", "http", "--port", "80", "--ignoreSSL"]),
            config,
        )
        .unwrap();
        assert_eq!(settings.connection.base_url(), "http://[2001:db8::1]:80");
        assert!(!settings.connection.verify_tls());
    }

    #[test]
    fn file_values_used_when_flags_absent() {
        let mut config = Config::default();
        config.connection.proto = Protocol::Https;
        config.connection.verify_tls = false;
        config.connection.timeout_secs = Some(5);

        let settings = merge(&parse(&["--ip", "192.0.2.1"]), config).unwrap();
        assert_eq!(settings.connection.base_url(), "https://192.0.2.1:10180");
        assert!(!settings.connection.verify_tls());
        assert_eq!(settings.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn hostname_is_rejected() {
        let err = merge(&parse(&["--ip", "switch.local"]), Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "host"));
    }
}
