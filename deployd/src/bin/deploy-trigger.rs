//! deploy-trigger - Entry Point
//!
//! Asks a remote deployd to run its pipeline and prints the outcome.
//! Exit status: 0 deployed, 1 deployment failed, 2 request failed.

use std::env;
use std::io;
use std::process::ExitCode;

use deployd::logs::init_logging;
use deployd::storage::layout::StorageLayout;
use deployd::storage::settings::Settings;
use deployd::trigger::{report, TriggerClient, TriggerOutcome};
use deployd::utils::{parse_cli_args, version_info};

use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = parse_cli_args(env::args().skip(1));

    if cli_args.contains_key("version") {
        let version = version_info();
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", version.version),
        }
        return ExitCode::SUCCESS;
    }

    let settings_path =
        StorageLayout::default().resolve_settings_file(cli_args.get("settings").map(String::as_str));
    let settings = match Settings::load(&settings_path).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to load settings: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = init_logging(settings.log_options()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let mut options = settings.trigger_options();
    if let Some(url) = cli_args.get("url") {
        options.url = url.clone();
    }

    let outcome = match TriggerClient::new(&options) {
        Ok(client) => {
            info!("Triggering deployment at {}", client.url());
            client.trigger().await
        }
        Err(e) => TriggerOutcome::RequestFailed(e),
    };

    if let Err(e) = report(&outcome, &mut io::stdout().lock()) {
        error!("Failed to write report: {}", e);
    }

    ExitCode::from(outcome.exit_code() as u8)
}
