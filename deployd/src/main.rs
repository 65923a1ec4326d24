//! deployd - Entry Point
//!
//! Listens for `POST /deploy` and runs the configured pipeline, one
//! deployment at a time.

use std::env;
use std::process::ExitCode;

use deployd::app::run::run;
use deployd::logs::init_logging;
use deployd::storage::layout::StorageLayout;
use deployd::storage::settings::Settings;
use deployd::utils::{parse_cli_args, version_info};

use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = parse_cli_args(env::args().skip(1));

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", version.version),
        }
        return ExitCode::SUCCESS;
    }

    let settings_path =
        StorageLayout::default().resolve_settings_file(cli_args.get("settings").map(String::as_str));
    let mut settings = match Settings::load(&settings_path).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(settings.log_options()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if !settings_path.exists() {
        warn!("Settings file {} not found, using defaults", settings_path.display());
    }

    if let Some(port) = cli_args.get("port") {
        match port.parse() {
            Ok(port) => settings.server.port = port,
            Err(_) => {
                error!("Invalid --port value: {}", port);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Err(e) = settings.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let options = settings.app_options();
    info!(version = %version.version, git_hash = %version.git_hash, "Running deployd with options: {:?}", options);

    match run(options, await_shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to run the deploy service: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Failed to install signal handlers, falling back to Ctrl+C");
                    if tokio::signal::ctrl_c().await.is_ok() {
                        info!("Ctrl+C received, shutting down...");
                    }
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down...");
        }
    }
}
