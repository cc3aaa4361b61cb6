//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Scan chat history for audio attachments and download them.
///
/// Every run writes a summary report, plus an error report when anything
/// went wrong. Press Ctrl-C to stop a run after the current item.
#[derive(Parser, Debug)]
#[command(name = "audio-downloader")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Also write daily log files into this folder
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the audio messages of a chat without downloading
    Scan(RunArgs),
    /// Download every audio message not already on disk
    Download(RunArgs),
    /// List the chats available to the current session
    Chats(SourceArgs),
    /// Inspect, create or edit the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write a config file with default values
    Init,
    /// Change one setting and save the config file
    Set {
        /// Setting name, e.g. `chat_id` or `download_folder`
        key: String,
        /// New value; empty clears `export_dir`
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

/// Where chat data comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Chat export folder containing result.json
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

/// Arguments shared by scan and download.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Chat to process (falls back to `chat_id` from the config)
    #[arg(long, value_name = "ID", allow_hyphen_values = true)]
    pub chat: Option<String>,

    /// Folder for downloads and reports (falls back to `download_folder`)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,
}
