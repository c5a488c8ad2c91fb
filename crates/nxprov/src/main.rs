mod cli;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nxprov_api::{DeviceSession, TransportConfig};
use nxprov_core::ProvisioningWorkflow;

use crate::cli::Cli;
use crate::error::{CliError, exit_code};
use crate::output::Printer;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let code = match run(cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = config::resolve(&cli)?;

    let url = settings.connection.base_url();
    let transport =
        TransportConfig::for_connection(&settings.connection).with_timeout(settings.timeout);
    let session = DeviceSession::with_transport(settings.connection, &transport).map_err(|e| {
        CliError::Client {
            url: url.clone(),
            reason: e.to_string(),
        }
    })?;

    let mut workflow = ProvisioningWorkflow::new(session, settings.plan)?;
    if let Some(kind) = cli.list_interfaces {
        workflow = workflow.list_interfaces_first(kind);
    }

    tracing::debug!(%url, "starting provisioning run");
    let printer = Printer::new(output::should_color());
    let report = workflow.run_with(|event| printer.progress(event)).await;
    printer.summary(&report);

    match report.abort {
        None => Ok(()),
        Some(reason) => Err(CliError::Incomplete {
            reason: reason.to_string(),
        }),
    }
}
