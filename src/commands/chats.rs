//! Chats command: list the chats the session can see.

use anyhow::{Context, Result};
use audio_downloader_core::remote::{Connector, Credentials, ExportConnector};
use tracing::{debug, info};

use crate::app::config_runtime;
use crate::app_config::LoadedConfig;
use crate::cli::SourceArgs;
use crate::output;

pub async fn run_chats_command(
    source: &SourceArgs,
    loaded: &LoadedConfig,
    credentials: &Credentials,
) -> Result<()> {
    let export_dir =
        config_runtime::resolve_export_dir(source, &loaded.config, loaded.path.as_deref())?;
    debug!(export_dir = %export_dir.display(), "listing chats");

    let connector = ExportConnector::new(export_dir);
    if connector.requires_login() {
        credentials.validate().context("invalid credentials")?;
    }
    let client = connector
        .connect(credentials)
        .await
        .context("failed to open chat source")?;
    let chats = client.list_chats().await.context("failed to list chats")?;

    info!(chats = chats.len(), "Listed chats");
    output::print_chats(&chats);
    Ok(())
}
