//! Minecraft server control plane: RCON commands, status pings, folder
//! sizes, and cleanup of the formatted text the server sends back.

pub mod commands;
pub mod disk;
pub mod format;
pub mod rcon;
pub mod status;

use std::time::Duration;
use thiserror::Error;

use crate::shared::errors::BotError;

/// Errors from talking to the Minecraft server directly.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Connection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("RCON authentication failed")]
    AuthFailed,
    #[error("Server did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Malformed packet: {0}")]
    Malformed(String),
    #[error("Cannot read {path}: {source}")]
    Disk {
        path: String,
        source: std::io::Error,
    },
}

impl From<ServerError> for BotError {
    fn from(e: ServerError) -> Self {
        BotError::external(e.to_string())
    }
}
