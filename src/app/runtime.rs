use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use audio_downloader_core::download::{
    PROGRESS_CHANNEL_CAPACITY, RunCoordinator, RunMode, RunRequest, RunWorker,
};
use audio_downloader_core::remote::{Credentials, ExportConnector};
use clap::Parser;
use tracing::{debug, info, warn};

use crate::app::{config_runtime, exit_handler, progress_manager, terminal};
use crate::app_config::{LoadedConfig, auth_file_path, load_auth_file, load_config};
use crate::cli::{Cli, Command, ConfigCommand, RunArgs};
use crate::{ProcessExit, commands, output};

pub(crate) async fn run_app() -> Result<ProcessExit> {
    let cli = Cli::parse();

    let default_level = config_runtime::resolve_default_log_level(cli.verbose, cli.quiet);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(cli.verbose, cli.quiet);
    let _log_guard =
        terminal::init_tracing(default_level, force_cli_log_level, cli.log_dir.as_deref());
    debug!(?cli, "CLI arguments parsed");

    let loaded = load_config(cli.config.as_deref());

    match &cli.command {
        Command::Config {
            command: ConfigCommand::Show,
        } => {
            commands::run_config_show_command(&loaded);
            Ok(ProcessExit::Success)
        }
        Command::Config {
            command: ConfigCommand::Init,
        } => {
            commands::run_config_init_command(cli.config.as_deref())?;
            Ok(ProcessExit::Success)
        }
        Command::Config {
            command: ConfigCommand::Set { key, value },
        } => {
            commands::run_config_set_command(&loaded, key, value)?;
            Ok(ProcessExit::Success)
        }
        Command::Chats(source) => {
            let credentials = session_credentials(&loaded);
            commands::run_chats_command(source, &loaded, &credentials).await?;
            Ok(ProcessExit::Success)
        }
        Command::Scan(args) => run_worker(RunMode::Scan, args, &loaded, cli.quiet).await,
        Command::Download(args) => run_worker(RunMode::Download, args, &loaded, cli.quiet).await,
    }
}

fn session_credentials(loaded: &LoadedConfig) -> Credentials {
    let auth_values = loaded
        .path
        .as_deref()
        .map(|path| load_auth_file(&auth_file_path(path)))
        .unwrap_or_default();
    loaded.config.credentials(&auth_values)
}

async fn run_worker(
    mode: RunMode,
    args: &RunArgs,
    loaded: &LoadedConfig,
    quiet: bool,
) -> Result<ProcessExit> {
    let resolved = config_runtime::resolve_run(args, &loaded.config, loaded.path.as_deref())?;
    let credentials = session_credentials(loaded);

    let connector = Arc::new(ExportConnector::new(resolved.export_dir.clone()));
    let coordinator = Arc::new(RunCoordinator::new(connector, credentials));
    let worker = RunWorker::new(coordinator, PROGRESS_CHANNEL_CAPACITY);

    info!(
        mode = mode.label(),
        chat_id = %resolved.chat_id,
        output_dir = %resolved.output_dir.display(),
        "Starting run"
    );
    let request = RunRequest {
        mode,
        chat_id: resolved.chat_id,
        output_dir: resolved.output_dir,
    };
    let mut handle = worker.spawn(request).context("failed to start run")?;
    let events = handle
        .take_progress()
        .ok_or_else(|| anyhow!("progress channel already taken"))?;

    let use_bar = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        quiet,
        terminal::is_dumb_terminal(),
    );
    let progress_handle = progress_manager::spawn_progress_ui(use_bar, events);

    let cancel = handle.cancellation_token();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancelling after the current item...");
            cancel.cancel();
        }
    });

    let outcome = handle.wait().await.context("run worker failed")?;
    signal_task.abort();
    let _ = progress_handle.await;

    output::print_run_summary(&outcome);
    Ok(exit_handler::determine_exit_outcome(&outcome.state))
}
