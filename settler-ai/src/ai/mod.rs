//! High-level AI for one player.
//!
//! Each tick the [`DecisionEngine`] reads a [`WorldStatistics`] snapshot and
//! emits [`Command`]s through a [`CommandSink`]. It runs a fixed chain of rule
//! passes:
//!
//! ```text
//! destroy obsolete ─▶ pioneers ─▶ construct (≤1) ─▶ army general ─▶ geologists ─▶ garrison
//! ```
//!
//! What to build comes from the economy minister, where pioneers go from the
//! border policy, where a building fits from the position search; the engine
//! only decides *whether* and *in which order*. None of the emitted commands is
//! guaranteed to succeed, so every rule re-derives its view from the next
//! snapshot instead of remembering what it asked for.
//!
//! # Rolling state
//!
//! Only three things survive a tick: the end-game latch, the broaden-target
//! cooldown, and (cleared at the start of each tick) the list of building
//! types whose placement failed.

mod construct;
pub mod dependencies;
mod destroy;
mod engine;
mod garrison;
mod units;

pub use engine::DecisionEngine;

use crate::input::{Command, CommandSink};
use crate::state::{BuildingType, Position, UnitId};
use crate::stats::WorldStatistics;
use thiserror::Error;

/// Something in the snapshot contradicted itself. Logged, never fatal: the
/// pass that hit it stops and the tick goes on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("no building at listed {kind} position {position}")]
    MissingBuilding {
        kind: BuildingType,
        position: Position,
    },
    #[error("finished {kind} count is {count} but no position is listed")]
    MissingPosition { kind: BuildingType, count: usize },
    #[error("unit {0:?} proposed for a second role in one tick")]
    UnitAlreadyClaimed(UnitId),
}

/// A computer player driven once per simulation tick.
pub trait AiPlayer: Send {
    fn name(&self) -> &'static str;

    /// Runs one tick of decisions. A dead player is a no-op.
    fn apply_rules(&mut self, stats: &dyn WorldStatistics, sink: &mut dyn CommandSink);
}

impl AiPlayer for DecisionEngine {
    fn name(&self) -> &'static str {
        "decision-engine"
    }

    fn apply_rules(&mut self, stats: &dyn WorldStatistics, sink: &mut dyn CommandSink) {
        DecisionEngine::apply_rules(self, stats, sink)
    }
}

/// Number of constructions in a batch of commands.
pub fn count_constructions(commands: &[Command]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, Command::Construct { .. }))
        .count()
}
