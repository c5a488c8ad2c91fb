//! Clap derive structures for the `nxprov` CLI.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use nxprov_core::Protocol;

/// nxprov -- one-shot VLAN and SVI provisioning for NX-API switches
#[derive(Debug, Parser)]
#[command(
    name = "nxprov",
    version,
    about = "Provision VLANs and SVIs on an NX-API switch",
    long_about = "Logs in to the switch's object-model API, makes sure the \
        interface-vlan feature is enabled, creates VLANs 5..250 and SVIs for \
        VLANs 5..50 with successive /30 addresses, then logs out.\n\n\
        Exit status is 1 when every step succeeded and 0 otherwise."
)]
pub struct Cli {
    /// Switch management IP address (IPv4 or IPv6)
    #[arg(long, env = "NXPROV_IP")]
    pub ip: String,

    /// Username for the switch
    #[arg(long, env = "NXPROV_USER")]
    pub user: String,

    /// Password for the switch
    #[arg(long, env = "NXPROV_PASSWD", hide_env_values = true)]
    pub passwd: String,

    /// Protocol to reach the API with [default: http]
    #[arg(long, value_enum)]
    pub proto: Option<ProtoArg>,

    /// Port the API listens on [default: 10180]
    #[arg(long)]
    pub port: Option<u16>,

    /// Skip TLS certificate verification
    #[arg(long = "ignoreSSL")]
    pub ignore_ssl: bool,

    /// Config file (defaults to the platform config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print interfaces of this class (e.g. l1PhysIf) before provisioning
    #[arg(long, value_name = "KIND")]
    pub list_interfaces: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProtoArg {
    Http,
    Https,
}

impl From<ProtoArg> for Protocol {
    fn from(arg: ProtoArg) -> Self {
        match arg {
            ProtoArg::Http => Protocol::Http,
            ProtoArg::Https => Protocol::Https,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ignore_ssl_keeps_its_spelling() {
        let cli = Cli::try_parse_from([
            "nxprov", "--ip", "10.1.1.1", "--user", "u", "--passwd", "p", "--ignoreSSL",
        ])
        .unwrap();
        assert!(cli.ignore_ssl);
        assert!(cli.proto.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn proto_accepts_https() {
        let cli = Cli::try_parse_from([
            "nxprov", "--ip", "::1", "--user", "u", "--passwd", "p", "--proto", "https", "--port",
            "443",
        ])
        .unwrap();
        assert_eq!(cli.proto.map(Protocol::from), Some(Protocol::Https));
        assert_eq!(cli.port, Some(443));
    }
}
