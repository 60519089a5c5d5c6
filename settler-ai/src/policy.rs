//! Collaborators the decision engine consults but does not own the logic of.
//!
//! The engine asks an [`EconomicPolicy`] what to build, a [`BorderPolicy`] where
//! pioneers should go, a [`PositionSearch`] where a building fits, and hands the
//! army over to a [`MilitaryPolicy`]. Hosts plug in their own implementations;
//! [`StaticEconomy`] and [`PassiveGeneral`] are simple ones for harnesses.

use crate::input::CommandSink;
use crate::state::{BuildingType, PlayerId, Position};
use crate::stats::WorldStatistics;
use serde::{Deserialize, Serialize};

/// "Economy minister": decides what the economy should grow into.
pub trait EconomicPolicy: Send {
    /// Advances the policy once per tick, before any other query.
    fn update(&mut self, stats: &dyn WorldStatistics, player: PlayerId);

    fn is_end_game(&self) -> bool;

    /// Ordered building wish list. A type listed `n` times means "want `n` of them".
    fn buildings_to_build(&self) -> Vec<BuildingType>;

    fn automatic_living_houses_enabled(&self) -> bool;

    fn mid_game_number_of_stone_cutters(&self) -> usize;

    fn number_of_parallel_construction_sites(&self) -> usize;
}

/// "Army general": levies soldiers and commands them in combat.
pub trait MilitaryPolicy: Send {
    fn levy_units(&mut self, stats: &dyn WorldStatistics, sink: &mut dyn CommandSink);

    fn command_troops(&mut self, stats: &dyn WorldStatistics, sink: &mut dyn CommandSink);
}

/// Proposes where pioneers should expand the territory.
pub trait BorderPolicy: Send {
    fn update(&mut self, stats: &dyn WorldStatistics, player: PlayerId);

    /// Target that brings a wanted resource into the territory.
    fn find_resource_target(&self) -> Option<Position>;

    /// Target that simply broadens the territory.
    fn find_broaden_target(&self) -> Option<Position>;
}

/// Finds legal construction sites.
pub trait PositionSearch: Send {
    fn best_position_for(
        &self,
        kind: BuildingType,
        stats: &dyn WorldStatistics,
        player: PlayerId,
    ) -> Option<Position>;

    /// Site for a defensive tower covering the given threatened border tiles.
    fn border_defence_position(
        &self,
        threatened: &[Position],
        stats: &dyn WorldStatistics,
        player: PlayerId,
    ) -> Option<Position>;
}

/// Economy driven by a fixed wish list.
///
/// End-game starts once the player owns `end_game_at_buildings` buildings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticEconomy {
    pub buildings: Vec<BuildingType>,
    pub automatic_living_houses: bool,
    pub mid_game_stone_cutters: usize,
    pub parallel_construction_sites: usize,
    pub end_game_at_buildings: Option<usize>,
    #[serde(skip)]
    end_game: bool,
}

impl Default for StaticEconomy {
    fn default() -> Self {
        use BuildingType::*;
        Self {
            buildings: vec![
                Lumberjack, Lumberjack, Sawmill, Stonecutter, Forester, Lumberjack, Lumberjack,
                Farm, Waterworks, Mill, Baker, Fisher, Coalmine, Ironmine, Ironmelt, Toolsmith,
                Farm, PigFarm, Slaughterhouse, Coalmine, Goldmine, Goldmelt, Weaponsmith,
                Barrack, Winegrower, Temple,
            ],
            automatic_living_houses: true,
            mid_game_stone_cutters: 2,
            parallel_construction_sites: 4,
            end_game_at_buildings: None,
            end_game: false,
        }
    }
}

impl EconomicPolicy for StaticEconomy {
    fn update(&mut self, stats: &dyn WorldStatistics, player: PlayerId) {
        if let Some(limit) = self.end_game_at_buildings {
            self.end_game = stats.total_buildings(player) >= limit;
        }
    }

    fn is_end_game(&self) -> bool {
        self.end_game
    }

    fn buildings_to_build(&self) -> Vec<BuildingType> {
        self.buildings.clone()
    }

    fn automatic_living_houses_enabled(&self) -> bool {
        self.automatic_living_houses
    }

    fn mid_game_number_of_stone_cutters(&self) -> usize {
        self.mid_game_stone_cutters
    }

    fn number_of_parallel_construction_sites(&self) -> usize {
        self.parallel_construction_sites
    }
}

/// General that never levies or moves troops.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassiveGeneral;

impl MilitaryPolicy for PassiveGeneral {
    fn levy_units(&mut self, _stats: &dyn WorldStatistics, _sink: &mut dyn CommandSink) {}

    fn command_troops(&mut self, _stats: &dyn WorldStatistics, _sink: &mut dyn CommandSink) {}
}
