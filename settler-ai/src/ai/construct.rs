//! Picks the one building to place this tick.
//!
//! Living houses come first so bearers never run out, then (outside end-game)
//! a defensive tower, a stock for surplus gold, and finally the economy
//! minister's wish list filtered by the dependency table.

use super::engine::{beds, DecisionEngine, LIVING_HOUSES};
use super::RuleError;
use crate::input::{Command, CommandSink};
use crate::state::{BuildingType, MaterialType, UnitRole};
use crate::stats::WorldStatistics;
use rustc_hash::FxHashMap;

impl DecisionEngine {
    pub(super) fn build_buildings(
        &mut self,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<(), RuleError> {
        if stats.unfinished_buildings(self.player)
            >= self.economy.number_of_parallel_construction_sites()
        {
            return Ok(());
        }
        if self.economy.automatic_living_houses_enabled() && self.build_living_house(stats, sink) {
            return Ok(());
        }
        if self.end_game {
            return Ok(());
        }
        if self.build_tower(stats, sink) {
            return Ok(());
        }
        if self.build_stock(stats, sink) {
            return Ok(());
        }
        self.build_economy(stats, sink);
        Ok(())
    }

    fn build_living_house(&mut self, stats: &dyn WorldStatistics, sink: &mut dyn CommandSink) -> bool {
        let player = self.player;
        let bearers = stats.units_of_role(UnitRole::Bearer, player).len();
        let future_bearers = bearers
            + LIVING_HOUSES
                .iter()
                .map(|&kind| stats.unfinished_count(kind, player) * beds(kind) as usize)
                .sum::<usize>();

        let weighted_buildings = stats.total_buildings(player) as f64
            + stats.finished_count(BuildingType::Weaponsmith, player) as f64
                * self.config.weaponsmith_factor as f64;
        let demand = weighted_buildings * self.config.bearers_per_house as f64;

        if future_bearers < self.config.minimum_bearers as usize || demand > future_bearers as f64 {
            let tier = if stats.total_count(BuildingType::Stonecutter, player) < 1
                || stats.total_count(BuildingType::Lumberjack, player) < 1
            {
                BuildingType::SmallLivinghouse
            } else if stats.total_count(BuildingType::Weaponsmith, player) < 2 {
                BuildingType::MediumLivinghouse
            } else {
                BuildingType::BigLivinghouse
            };
            return self.construct(tier, stats, sink);
        }
        false
    }

    /// Builds a tower at the threatened border once every existing tower is manned.
    /// A listed tower without a record counts as unmanned.
    fn build_tower(&mut self, stats: &dyn WorldStatistics, sink: &mut dyn CommandSink) -> bool {
        let kind = BuildingType::Tower;
        for position in stats.building_positions(kind, self.player) {
            let Some(tower) = stats.building_at(position) else {
                let error = RuleError::MissingBuilding { kind, position };
                self.note_inconsistency("construct", error);
                return false;
            };
            if !tower.construction_finished || !tower.occupied {
                return false;
            }
        }

        let threatened = stats.threatened_border_of(self.player);
        if threatened.is_empty() {
            return false;
        }

        match self
            .positions
            .border_defence_position(&threatened, stats, self.player)
        {
            Some(position) => {
                self.emit(
                    sink,
                    Command::Construct {
                        building: kind,
                        position,
                    },
                );
                self.send_swordsman_to(stats, sink, position);
                true
            }
            None => false,
        }
    }

    fn build_stock(&mut self, stats: &dyn WorldStatistics, sink: &mut dyn CommandSink) -> bool {
        let player = self.player;
        if stats.total_count(BuildingType::Goldmelt, player) < 1 {
            return false;
        }
        let stocks = stats.total_count(BuildingType::Stock, player) as i64;
        let capacity = stocks * self.config.stock_capacity as i64 - self.config.stock_slack as i64;
        let gold = stats.material_count(MaterialType::Gold, player) as i64;
        if capacity < gold {
            return self.construct(BuildingType::Stock, stats, sink);
        }
        false
    }

    /// Walks the wish list; the n-th occurrence of a type asks for n of them.
    fn build_economy(&mut self, stats: &dyn WorldStatistics, sink: &mut dyn CommandSink) -> bool {
        let player = self.player;
        let mut plan: FxHashMap<BuildingType, usize> = FxHashMap::default();

        for kind in self.economy.buildings_to_build() {
            let target = plan.entry(kind).or_insert(0);
            *target += 1;
            let target = *target;

            if stats.total_count(kind, player) < target
                && self.config.dependencies.fulfilled(kind, stats, player)
                && self.construct(kind, stats, sink)
            {
                return true;
            }
        }
        false
    }

    /// Places `kind` where the position search suggests.
    ///
    /// A failed search is remembered for the rest of the tick, but the
    /// remembered types are only skipped once two or more have failed.
    fn construct(
        &mut self,
        kind: BuildingType,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> bool {
        if self.failed_constructions.len() > 1 && self.failed_constructions.contains(&kind) {
            return false;
        }

        match self.positions.best_position_for(kind, stats, self.player) {
            Some(position) => {
                self.emit(
                    sink,
                    Command::Construct {
                        building: kind,
                        position,
                    },
                );
                if kind.is_military() {
                    self.send_swordsman_to(stats, sink, position);
                }
                true
            }
            None => {
                log::trace!("{} found no site for {}", self.player, kind);
                self.failed_constructions.push(kind);
                self.metrics.failed_placements += 1;
                false
            }
        }
    }
}
