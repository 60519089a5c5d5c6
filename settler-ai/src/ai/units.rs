//! Turning bearers into pioneers and geologists and sending them out.

use super::engine::DecisionEngine;
use super::RuleError;
use crate::input::{Command, CommandSink};
use crate::state::{BuildingType, MobileUnit, ResourceType, UnitId, UnitRole};
use crate::stats::WorldStatistics;

/// One geologist per resource, in this order.
const GEOLOGIST_TARGETS: [ResourceType; 3] =
    [ResourceType::Coal, ResourceType::Ironore, ResourceType::Goldore];

impl DecisionEngine {
    /// Splits all pioneers into a resource group and a broadening group.
    pub(super) fn command_pioneers(
        &mut self,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<(), RuleError> {
        let player = self.player;
        if stats.border_of(player).is_empty() {
            return Ok(());
        }

        let mut pioneers: Vec<UnitId> = stats
            .units_of_role(UnitRole::Pioneer, player)
            .iter()
            .map(|u| u.id)
            .collect();
        let recruits = self.recruit_new_pioneers(pioneers.len(), stats, sink)?;
        pioneers.extend(&recruits);
        pioneers.sort_unstable();

        if pioneers.is_empty() {
            return Ok(());
        }

        self.border.update(stats, player);
        let mut remaining: &[UnitId] = &pioneers;

        if let Some(target) = self.border.find_resource_target() {
            let group = remaining.len().min(self.config.resource_pioneer_group);
            let (resource_group, rest) = remaining.split_at(group);
            self.emit(
                sink,
                Command::MoveUnits {
                    target,
                    units: resource_group.to_vec(),
                },
            );
            remaining = rest;
        }

        if !remaining.is_empty() {
            if !recruits.is_empty() || self.ticks_until_broaden_retarget == 0 {
                if let Some(target) = self.border.find_broaden_target() {
                    self.emit(
                        sink,
                        Command::MoveUnits {
                            target,
                            units: remaining.to_vec(),
                        },
                    );
                    self.ticks_until_broaden_retarget = self.config.broaden_refresh_period;
                }
            }
            self.ticks_until_broaden_retarget = self.ticks_until_broaden_retarget.saturating_sub(1);
        }
        Ok(())
    }

    /// Converts idle bearers into pioneers until the pool matches the lumber
    /// economy, keeping enough bearers for the existing buildings.
    fn recruit_new_pioneers(
        &mut self,
        existing_pioneers: usize,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<Vec<UnitId>, RuleError> {
        let player = self.player;
        if !stats.enemies_in_town_of(player).is_empty() {
            return Ok(Vec::new());
        }

        let bearers = stats.units_of_role(UnitRole::Bearer, player);
        if bearers.len() <= self.config.minimum_bearers as usize {
            return Ok(Vec::new());
        }

        let lumberjacks = stats.finished_count(BuildingType::Lumberjack, player);
        let wanted = (lumberjacks as f32 / self.config.lumberjack_to_pioneer_ratio).round() as usize;
        let missing = wanted.min(self.config.max_pioneers().saturating_sub(existing_pioneers));
        if missing == 0 {
            return Ok(Vec::new());
        }

        let reserved = stats.total_buildings(player) * self.config.bearers_per_house as usize;
        let mut recruits = Vec::with_capacity(missing);
        for bearer in &bearers {
            if bearers.len() <= recruits.len() + reserved {
                break;
            }
            if bearer.is_idle() && !self.is_claimed(bearer.id) {
                recruits.push(bearer.id);
                if recruits.len() == missing {
                    break;
                }
            }
        }

        if !recruits.is_empty() {
            log::debug!("{} recruits {} pioneers", player, recruits.len());
            self.reassign(sink, recruits.clone(), UnitRole::Pioneer)?;
        }
        Ok(recruits)
    }

    /// Sends three bearers out as geologists once stone-cutting has started and
    /// there is no geologist yet.
    pub(super) fn send_geologists(
        &mut self,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<(), RuleError> {
        let player = self.player;
        let geologists = stats.units_of_role(UnitRole::Geologist, player).len();
        let stone_cutters = stats.finished_count(BuildingType::Stonecutter, player);
        let bearers = stats.units_of_role(UnitRole::Bearer, player);

        if geologists != 0
            || stone_cutters < 1
            || bearers.len() <= self.config.minimum_bearers as usize + GEOLOGIST_TARGETS.len()
        {
            return Ok(());
        }

        let candidates: Vec<&MobileUnit> = bearers
            .into_iter()
            .filter(|b| !self.is_claimed(b.id))
            .take(GEOLOGIST_TARGETS.len())
            .collect();
        if candidates.len() < GEOLOGIST_TARGETS.len() {
            return Ok(());
        }

        self.reassign(
            sink,
            candidates.iter().map(|u| u.id).collect(),
            UnitRole::Geologist,
        )?;

        let Some(origin) = stats.partition_position_of(player) else {
            return Ok(());
        };
        for (geologist, resource) in candidates.iter().zip(GEOLOGIST_TARGETS) {
            let target = stats
                .nearest_resource_point(origin, resource, player, u32::MAX)
                .or_else(|| {
                    stats.nearest_resource_point_in_default_partition(origin, resource, u32::MAX)
                });
            if let Some(target) = target {
                self.send_unit_to(sink, geologist.id, target);
            }
        }
        Ok(())
    }
}
