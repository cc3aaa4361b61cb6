//! CLI command handlers.

mod chats;
mod config;

pub use chats::run_chats_command;
pub use config::{run_config_init_command, run_config_set_command, run_config_show_command};
