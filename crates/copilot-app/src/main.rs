mod bootstrap;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use copilot_api::{envelope, Coordinator};
use copilot_core::config::Config;
use tracing::error;

#[derive(Parser)]
#[command(name = "copilot", about = "Validation and routing control plane for workflow-automation agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the workflow document through the Validation Gateway without deploying it.
    Validate { file: PathBuf },
    /// Validate the workflow document and, if it passes, create or update it on the Engine.
    Submit { file: PathBuf },
    /// Force a catalog resync, invalidating every cached validation outcome.
    Resync,
    /// Print Node Catalog statistics.
    Stats,
    /// Print Smart Execution Router statistics.
    RouterStats,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", serde_json::json!({"ok": false, "error": {"kind": "Config", "message": error.to_string()}}));
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse();

    let (coordinator, _catalog) = match bootstrap::wire_up(config).await {
        Ok(wired) => wired,
        Err(error) => {
            error!(%error, "failed to wire up the control plane");
            eprintln!("{}", serde_json::json!({"ok": false, "error": {"kind": "Startup", "message": error.to_string()}}));
            return ExitCode::FAILURE;
        }
    };

    run(&coordinator, cli.command).await
}

async fn run(coordinator: &Coordinator, command: Command) -> ExitCode {
    match command {
        Command::Validate { file } => {
            let Some(doc) = read_workflow_document(&file) else { return ExitCode::FAILURE };
            let result = coordinator.submit_for_validation(&doc).await;
            print_and_exit(envelope(&result))
        }
        Command::Submit { file } => {
            let Some(doc) = read_workflow_document(&file) else { return ExitCode::FAILURE };
            let result = coordinator.submit_with_deploy(&doc).await;
            print_and_exit(envelope(&result))
        }
        Command::Resync => {
            let result = coordinator.resync_catalog().await;
            print_and_exit(envelope(&result))
        }
        Command::Stats => {
            let stats = coordinator.statistics().await;
            print_and_exit(serde_json::json!({"ok": true, "value": stats}))
        }
        Command::RouterStats => {
            let stats = coordinator.router_statistics().await;
            print_and_exit(serde_json::json!({"ok": true, "value": stats}))
        }
    }
}

fn read_workflow_document(file: &std::path::Path) -> Option<serde_json::Value> {
    let contents = match std::fs::read_to_string(file) {
        Ok(contents) => contents,
        Err(error) => {
            eprintln!("{}", serde_json::json!({"ok": false, "error": {"kind": "Io", "message": error.to_string()}}));
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(doc) => Some(doc),
        Err(error) => {
            eprintln!("{}", serde_json::json!({"ok": false, "error": {"kind": "SchemaError", "message": error.to_string()}}));
            None
        }
    }
}

fn print_and_exit(body: serde_json::Value) -> ExitCode {
    let ok = body["ok"].as_bool().unwrap_or(false);
    println!("{body}");
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_a_well_formed_workflow_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "wf", "nodes": []}}"#).unwrap();
        let doc = read_workflow_document(file.path()).expect("valid JSON must parse");
        assert_eq!(doc["name"], "wf");
    }

    #[test]
    fn rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(read_workflow_document(file.path()).is_none());
    }

    #[test]
    fn rejects_a_missing_file() {
        assert!(read_workflow_document(std::path::Path::new("/no/such/file.json")).is_none());
    }

    #[test]
    fn exit_code_reflects_the_ok_field() {
        // `ExitCode` carries no `PartialEq`, so compare via its `Debug` form.
        let success = format!("{:?}", print_and_exit(serde_json::json!({"ok": true})));
        let failure = format!("{:?}", print_and_exit(serde_json::json!({"ok": false})));
        assert_ne!(success, failure);
    }
}
