//! Command log writing one JSON line per submitted command:
//!
//! ```json
//! {"tick":12,"player":0,"command":{"type":"construct","building":"FARM","position":{"x":3,"y":4}}}
//! ```

use super::ObserverError;
use crate::input::{Command, CommandSink};
use crate::state::PlayerId;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub tick: u64,
    pub player: PlayerId,
    pub command: Command,
}

/// Writes every command it receives, tagged with the current tick and player.
///
/// [`CommandSink::submit`] cannot fail, so the first write error is kept and
/// later commands are dropped; [`CommandLog::finish`] reports it.
pub struct CommandLog<W: Write> {
    writer: W,
    tick: u64,
    player: PlayerId,
    written: u64,
    error: Option<ObserverError>,
}

impl CommandLog<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ObserverError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> CommandLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            tick: 0,
            player: PlayerId(0),
            written: 0,
            error: None,
        }
    }

    /// Tags subsequent commands with `tick` and `player`.
    pub fn set_context(&mut self, tick: u64, player: PlayerId) {
        self.tick = tick;
        self.player = player;
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    fn write_record(&mut self, command: Command) -> Result<(), ObserverError> {
        let record = CommandRecord {
            tick: self.tick,
            player: self.player,
            command,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flushes and returns the writer, or the first error hit while logging.
    pub fn finish(mut self) -> Result<W, ObserverError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> CommandSink for CommandLog<W> {
    fn submit(&mut self, command: Command) {
        if self.error.is_some() {
            return;
        }
        match self.write_record(command) {
            Ok(()) => self.written += 1,
            Err(e) => {
                log::warn!("command log stopped at tick {}: {}", self.tick, e);
                self.error = Some(e);
            }
        }
    }
}
