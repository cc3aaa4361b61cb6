//! Effective settings: CLI flag, then config file, then default.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::app_config::AppConfig;
use crate::cli::{RunArgs, SourceArgs};

/// Settings of one scan or download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedRun {
    pub(crate) chat_id: String,
    pub(crate) output_dir: PathBuf,
    pub(crate) export_dir: PathBuf,
}

pub(crate) fn resolve_default_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// `-v`/`-q` on the command line beat `RUST_LOG`.
pub(crate) fn should_force_cli_log_level(verbose: u8, quiet: bool) -> bool {
    verbose > 0 || quiet
}

pub(crate) fn resolve_run(
    args: &RunArgs,
    config: &AppConfig,
    config_path: Option<&Path>,
) -> Result<ResolvedRun> {
    let chat_id = args
        .chat
        .as_deref()
        .map(str::trim)
        .filter(|chat| !chat.is_empty())
        .or_else(|| Some(config.chat_id.trim()).filter(|chat| !chat.is_empty()));
    let Some(chat_id) = chat_id else {
        bail!(
            "No chat selected.\n  \
             Pass --chat <ID> or set `chat_id` in {}",
            describe_config(config_path)
        );
    };

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.download_folder.clone());
    let export_dir = resolve_export_dir(&args.source, config, config_path)?;

    Ok(ResolvedRun {
        chat_id: chat_id.to_string(),
        output_dir,
        export_dir,
    })
}

pub(crate) fn resolve_export_dir(
    source: &SourceArgs,
    config: &AppConfig,
    config_path: Option<&Path>,
) -> Result<PathBuf> {
    match source.export_dir.as_ref().or(config.export_dir.as_ref()) {
        Some(dir) => Ok(dir.clone()),
        None => bail!(
            "No chat source configured.\n  \
             Pass --export-dir <DIR> or set `export_dir` in {}",
            describe_config(config_path)
        ),
    }
}

fn describe_config(config_path: Option<&Path>) -> String {
    config_path.map_or_else(
        || "the config file".to_string(),
        |path| path.display().to_string(),
    )
}
