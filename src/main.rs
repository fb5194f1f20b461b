//! MixScribe CLI entry point

use std::process::ExitCode;

use clap::Parser;

use mixscribe::cli::{
    app::{load_merged_config, run_devices, run_import, run_record, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use mixscribe::domain::config::AppConfig;
use mixscribe::infrastructure::JsonConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            let presenter = Presenter::new();
            let store = JsonConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Devices) => {
            return run_devices().await;
        }
        Some(Commands::Import { ref file }) => {
            let config = load_merged_config(cli_overrides(&cli)).await;
            return run_import(file, config).await;
        }
        None => {}
    }

    let config = load_merged_config(cli_overrides(&cli)).await;
    run_record(config, cli.no_transcribe).await
}

/// Build the override layer from command-line flags
fn cli_overrides(cli: &Cli) -> AppConfig {
    AppConfig {
        loopback_device_id: cli.loopback_device.clone(),
        mic_device_id: cli.mic_device.clone(),
        output_folder: cli.output_folder.clone(),
        ..Default::default()
    }
}
