// JSON-RPC command API (`/ins`)
//
// Runs CLI commands in order as a single batch. Authenticated with HTTP
// Basic per request, independent of the object-model session.

use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::session::{DeviceSession, Reply};

pub const COMMAND_API_PATH: &str = "/ins";

/// One entry of a JSON-RPC CLI batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: CliParams,
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliParams {
    pub cmd: String,
    pub version: u32,
}

/// Build an ordered batch; ids start at 1 and follow command order.
pub fn cli_batch<S: AsRef<str>>(commands: &[S]) -> Vec<CliRequest> {
    commands
        .iter()
        .zip(1..)
        .map(|(cmd, id)| CliRequest {
            jsonrpc: "2.0",
            method: "cli",
            params: CliParams {
                cmd: cmd.as_ref().to_owned(),
                version: 1,
            },
            id,
        })
        .collect()
}

impl DeviceSession {
    /// Run `commands` in order through the command API.
    ///
    /// Success is decided by the HTTP status of the batch reply alone.
    pub async fn run_cli<S: AsRef<str> + Sync>(&self, commands: &[S]) -> Result<Reply, Error> {
        let batch = cli_batch(commands);
        debug!(count = batch.len(), "running CLI batch");
        self.post_json_rpc(COMMAND_API_PATH, &batch)
            .await?
            .error_for_status("CLI batch")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn batch_is_ordered_with_sequential_ids() {
        let batch = cli_batch(&["conf t", "feature interface-vlan"]);
        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!([
                {
                    "jsonrpc": "2.0",
                    "method": "cli",
                    "params": { "cmd": "conf t", "version": 1 },
                    "id": 1
                },
                {
                    "jsonrpc": "2.0",
                    "method": "cli",
                    "params": { "cmd": "feature interface-vlan", "version": 1 },
                    "id": 2
                }
            ])
        );
    }

    #[test]
    fn empty_batch() {
        assert!(cli_batch::<&str>(&[]).is_empty());
    }
}
