//! Tearing down buildings that no longer pay off, to get building material back.

use super::engine::{beds, DecisionEngine, LIVING_HOUSES};
use super::RuleError;
use crate::input::{Command, CommandSink};
use crate::state::{BuildingType, MaterialType, UnitRole};
use crate::stats::WorldStatistics;

impl DecisionEngine {
    pub(super) fn destroy_buildings(
        &mut self,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<(), RuleError> {
        let stone_cutters = self.handle_exhausted_stone_cutters(stats, sink);

        let living_houses = if self.economy.automatic_living_houses_enabled() {
            self.destroy_surplus_living_house(stats, sink).map(|_| ())
        } else {
            Ok(())
        };

        // Make room for living houses once the economy is done growing.
        let wood_industry = if self.end_game && self.is_wood_jam(stats) {
            self.thin_out_wood_industry(stats, sink)
        } else {
            Ok(())
        };

        stone_cutters.and(living_houses).and(wood_industry)
    }

    /// Moves exhausted stone-cutters to nearby stone while more cutters are
    /// wanted; otherwise destroys the first exhausted one.
    fn handle_exhausted_stone_cutters(
        &mut self,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<(), RuleError> {
        let kind = BuildingType::Stonecutter;
        let search_radius = kind.work_radius() * self.config.stonecutter_work_radius_factor;

        for position in stats.building_positions(kind, self.player) {
            let building = stats
                .building_at(position)
                .ok_or(RuleError::MissingBuilding { kind, position })?;
            if !building.cannot_work {
                continue;
            }

            let stone_cutters = stats.finished_count(kind, self.player);
            match stats.nearest_stone(position, search_radius, self.player) {
                Some(stone) if stone_cutters < self.economy.mid_game_number_of_stone_cutters() => {
                    self.emit(
                        sink,
                        Command::SetWorkArea {
                            building: position,
                            target: stone,
                        },
                    );
                }
                _ => {
                    self.emit(sink, Command::Destroy { position });
                    break;
                }
            }
        }
        Ok(())
    }

    /// Destroys at most one exhausted living house, smallest tier first, as long
    /// as the remaining beds still cover every bearer. Returns whether one was destroyed.
    pub(super) fn destroy_surplus_living_house(
        &mut self,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<bool, RuleError> {
        let total_beds: i64 = LIVING_HOUSES
            .iter()
            .map(|&kind| stats.finished_count(kind, self.player) as i64 * beds(kind) as i64)
            .sum();
        let bearers = stats.units_of_role(UnitRole::Bearer, self.player).len() as i64;
        let free_beds = total_beds - bearers;

        for kind in LIVING_HOUSES {
            if free_beds < beds(kind) as i64 + 1 {
                return Ok(false);
            }
            if self.destroy_living_house(kind, stats, sink)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn destroy_living_house(
        &mut self,
        kind: BuildingType,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<bool, RuleError> {
        for position in stats.building_positions(kind, self.player) {
            let house = stats
                .building_at(position)
                .ok_or(RuleError::MissingBuilding { kind, position })?;
            if house.cannot_work {
                self.emit(sink, Command::Destroy { position });
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// More trunks in stock than the lumberjacks can keep up with.
    fn is_wood_jam(&self, stats: &dyn WorldStatistics) -> bool {
        stats.material_count(MaterialType::Trunk, self.player) as usize
            > stats.finished_count(BuildingType::Lumberjack, self.player) * 2
    }

    fn thin_out_wood_industry(
        &mut self,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<(), RuleError> {
        let player = self.player;

        for position in stats
            .building_positions(BuildingType::Forester, player)
            .into_iter()
            .skip(1)
        {
            self.emit(sink, Command::Destroy { position });
        }

        let kind = BuildingType::Lumberjack;
        for position in stats.building_positions(kind, player) {
            let lumberjack = stats
                .building_at(position)
                .ok_or(RuleError::MissingBuilding { kind, position })?;
            if lumberjack.cannot_work {
                self.emit(sink, Command::Destroy { position });
            }
        }

        let sawmills = stats.finished_count(BuildingType::Sawmill, player);
        let lumberjacks = stats.finished_count(BuildingType::Lumberjack, player);
        let sawmill = if (sawmills * 3) as i64 - 2 > lumberjacks as i64 {
            match stats.building_positions(BuildingType::Sawmill, player).first() {
                Some(&position) => {
                    self.emit(sink, Command::Destroy { position });
                    Ok(())
                }
                None => Err(RuleError::MissingPosition {
                    kind: BuildingType::Sawmill,
                    count: sawmills,
                }),
            }
        } else {
            Ok(())
        };

        for position in stats.building_positions(BuildingType::BigTemple, player) {
            self.emit(sink, Command::Destroy { position });
        }
        sawmill
    }
}
