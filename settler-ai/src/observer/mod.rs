//! Side channels that watch the AI without influencing it.
//!
//! Currently only the [`CommandLog`], a JSONL record of every intent the
//! engines emit, used for replay and debugging.

mod command_log;

pub use command_log::{CommandLog, CommandRecord};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObserverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
