//! # Settler AI
//!
//! High-level computer player for a settlement-and-combat simulation.
//!
//! The simulation owns the world; this crate only reads it and proposes
//! intents. Once per tick and per living player:
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ WorldStatistics  │────▶│ DecisionEngine │────▶│ CommandSink │
//! │ (snapshot, read) │     │ (rule passes)  │     │ (intents)   │
//! └──────────────────┘     └───────┬────────┘     └─────────────┘
//!                                  │ asks
//!                  ┌───────────────┼────────────────┐
//!                  ▼               ▼                ▼
//!           EconomicPolicy   MilitaryPolicy   BorderPolicy / PositionSearch
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`DecisionEngine`] | Per-player AI; runs the rule passes |
//! | [`WorldStatistics`] | Read-only queries over the world |
//! | [`WorldSnapshot`] | Plain-data `WorldStatistics` for hosts and tests |
//! | [`Command`] | Intents: construct, destroy, move, reassign, set work area |
//! | [`AiConfig`] | Tuning constants and building dependency ratios |
//! | [`CommandLog`] | JSONL record of emitted commands |

pub mod ai;
pub mod config;
pub mod input;
pub mod metrics;
pub mod observer;
pub mod policy;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod testing;

pub use ai::dependencies::{BuildingDependency, DependencyTable};
pub use ai::{AiPlayer, DecisionEngine, RuleError};
pub use config::{AiConfig, ConfigError};
pub use input::{Command, CommandSink, PlayerInputs};
pub use metrics::AiMetrics;
pub use observer::{CommandLog, CommandRecord, ObserverError};
pub use policy::{
    BorderPolicy, EconomicPolicy, MilitaryPolicy, PassiveGeneral, PositionSearch, StaticEconomy,
};
pub use snapshot::{Deposit, PlayerState, ResourceDeposit, WorldSnapshot};
pub use state::{
    BuildingInstance, BuildingType, MaterialType, MobileUnit, PlayerId, Position, ResourceType,
    UnitAction, UnitId, UnitRole,
};
pub use stats::WorldStatistics;
