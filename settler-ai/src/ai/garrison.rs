use super::engine::DecisionEngine;
use super::RuleError;
use crate::input::CommandSink;
use crate::state::BuildingType;
use crate::stats::WorldStatistics;

impl DecisionEngine {
    /// Calls a swordsman to every finished, empty military building whose
    /// nearest swordsman is too far from its door to notice it on his own.
    /// Listed buildings without a record are skipped.
    pub(super) fn occupy_military_buildings(
        &mut self,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
    ) -> Result<(), RuleError> {
        for &kind in BuildingType::military_buildings() {
            for position in stats.building_positions(kind, self.player) {
                let Some(building) = stats.building_at(position) else {
                    let error = RuleError::MissingBuilding { kind, position };
                    self.note_inconsistency("garrison", error);
                    continue;
                };
                if !building.is_fully_built() || building.occupied {
                    continue;
                }

                let door = building.door;
                let Some(soldier) = stats.nearest_swordsman(door, self.player) else {
                    continue;
                };
                if door.on_grid_distance(soldier.position) > self.config.tower_search_radius {
                    let id = soldier.id;
                    self.send_unit_to(sink, id, door);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Command;
    use crate::state::{BuildingInstance, PlayerId, Position, UnitId};
    use crate::testing::{
        engine_with, FixedBorderPolicy, MissingRecords, ScriptedEconomy, ScriptedPositionSearch,
        SnapshotBuilder,
    };

    const P: PlayerId = PlayerId(3);

    fn garrison(snapshot: &crate::snapshot::WorldSnapshot) -> Vec<Command> {
        let mut ai = engine_with(
            P,
            ScriptedEconomy::default(),
            FixedBorderPolicy::default(),
            ScriptedPositionSearch::new(),
        );
        let mut commands = Vec::new();
        ai.occupy_military_buildings(snapshot, &mut commands).unwrap();
        commands
    }

    #[test]
    fn test_distant_swordsman_sent_to_door() {
        let snapshot = SnapshotBuilder::new(P)
            .with_military_building(BuildingType::Tower, 0, 0, true, false)
            .with_swordsman(50, 0)
            .build();

        assert_eq!(
            garrison(&snapshot),
            vec![Command::MoveUnits {
                target: Position::new(0, 1),
                units: vec![UnitId(1)],
            }]
        );
    }

    #[test]
    fn test_nearby_swordsman_left_alone() {
        let snapshot = SnapshotBuilder::new(P)
            .with_military_building(BuildingType::Castle, 0, 0, true, false)
            .with_swordsman(40, 1)
            .build();

        assert!(garrison(&snapshot).is_empty());
    }

    #[test]
    fn test_occupied_and_unbuilt_buildings_skipped() {
        let mut half_built = BuildingInstance::finished(P, BuildingType::BigTower, Position::new(60, 0));
        half_built.state_progress = 0.5;
        let snapshot = SnapshotBuilder::new(P)
            .with_military_building(BuildingType::Tower, 0, 0, true, true)
            .with_military_building(BuildingType::Tower, 0, 30, false, false)
            .with_building_instance(half_built)
            .with_swordsman(100, 100)
            .build();

        assert!(garrison(&snapshot).is_empty());
    }

    #[test]
    fn test_missing_record_skips_only_that_building() {
        let snapshot = SnapshotBuilder::new(P)
            .with_military_building(BuildingType::Tower, 0, 0, true, false)
            .with_military_building(BuildingType::Tower, 0, 10, true, false)
            .with_swordsman(80, 0)
            .build();
        let stats = MissingRecords::new(&snapshot, &[(0, 0)]);
        let mut ai = engine_with(
            P,
            ScriptedEconomy::default(),
            FixedBorderPolicy::default(),
            ScriptedPositionSearch::new(),
        );

        let mut commands = Vec::new();
        ai.occupy_military_buildings(&stats, &mut commands).unwrap();

        assert_eq!(
            commands,
            vec![Command::MoveUnits {
                target: Position::new(0, 11),
                units: vec![UnitId(1)],
            }]
        );
        assert_eq!(ai.metrics().diagnostics, 1);
    }

    #[test]
    fn test_no_swordsman_no_command() {
        let snapshot = SnapshotBuilder::new(P)
            .with_military_building(BuildingType::Tower, 0, 0, true, false)
            .build();

        assert!(garrison(&snapshot).is_empty());
    }
}
