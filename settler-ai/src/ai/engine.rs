use super::RuleError;
use crate::config::AiConfig;
use crate::input::{Command, CommandSink};
use crate::metrics::AiMetrics;
use crate::policy::{BorderPolicy, EconomicPolicy, MilitaryPolicy, PositionSearch};
use crate::state::{BuildingType, PlayerId, Position, UnitId, UnitRole};
use crate::stats::WorldStatistics;
use rustc_hash::FxHashSet;
use std::time::Instant;
use tracing::instrument;

pub(super) const LIVING_HOUSES: [BuildingType; 3] = [
    BuildingType::SmallLivinghouse,
    BuildingType::MediumLivinghouse,
    BuildingType::BigLivinghouse,
];

pub(super) fn beds(kind: BuildingType) -> u32 {
    kind.beds().unwrap_or(0)
}

/// The high-level AI of one player.
///
/// It delegates what to build to its economy minister and how to fight to its
/// army general. On top of that it keeps enough bearers housed, sends pioneers
/// and geologists out, builds towers where the border is threatened, and tears
/// down buildings that no longer pay off.
pub struct DecisionEngine {
    pub(super) player: PlayerId,
    pub(super) config: AiConfig,
    pub(super) economy: Box<dyn EconomicPolicy>,
    pub(super) military: Box<dyn MilitaryPolicy>,
    pub(super) border: Box<dyn BorderPolicy>,
    pub(super) positions: Box<dyn PositionSearch>,
    /// Types whose placement failed this tick.
    pub(super) failed_constructions: Vec<BuildingType>,
    /// Units proposed for a new role this tick.
    pub(super) claimed_units: FxHashSet<UnitId>,
    pub(super) ticks_until_broaden_retarget: u32,
    pub(super) end_game: bool,
    pub(super) metrics: AiMetrics,
}

impl DecisionEngine {
    pub fn new(
        player: PlayerId,
        config: AiConfig,
        economy: Box<dyn EconomicPolicy>,
        military: Box<dyn MilitaryPolicy>,
        border: Box<dyn BorderPolicy>,
        positions: Box<dyn PositionSearch>,
    ) -> Self {
        Self {
            player,
            config,
            economy,
            military,
            border,
            positions,
            failed_constructions: Vec::new(),
            claimed_units: FxHashSet::default(),
            ticks_until_broaden_retarget: 0,
            end_game: false,
            metrics: AiMetrics::default(),
        }
    }

    pub fn with_config(mut self, config: AiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn metrics(&self) -> &AiMetrics {
        &self.metrics
    }

    /// Latched: once the economy reports end-game it stays on.
    pub fn is_end_game(&self) -> bool {
        self.end_game
    }

    pub fn ticks_until_broaden_retarget(&self) -> u32 {
        self.ticks_until_broaden_retarget
    }

    pub fn failed_constructions(&self) -> &[BuildingType] {
        &self.failed_constructions
    }

    /// Runs all rule passes for this tick. Call exactly once per simulation step.
    #[instrument(skip_all, fields(player = self.player.0))]
    pub fn apply_rules(&mut self, stats: &dyn WorldStatistics, sink: &mut dyn CommandSink) {
        if !stats.is_alive(self.player) {
            return;
        }
        let started = Instant::now();

        self.economy.update(stats, self.player);
        if !self.end_game && self.economy.is_end_game() {
            log::info!("{} switches to end-game", self.player);
            self.end_game = true;
        }
        self.failed_constructions.clear();
        self.claimed_units.clear();

        self.run_pass("destroy", |ai| ai.destroy_buildings(stats, sink));
        self.run_pass("pioneers", |ai| ai.command_pioneers(stats, sink));
        self.run_pass("construct", |ai| ai.build_buildings(stats, sink));
        self.military.levy_units(stats, sink);
        self.military.command_troops(stats, sink);
        self.run_pass("geologists", |ai| ai.send_geologists(stats, sink));
        self.run_pass("garrison", |ai| ai.occupy_military_buildings(stats, sink));

        self.metrics.ticks += 1;
        self.metrics.decision_time += started.elapsed();
    }

    fn run_pass(
        &mut self,
        pass: &'static str,
        rule: impl FnOnce(&mut Self) -> Result<(), RuleError>,
    ) {
        if let Err(e) = rule(self) {
            self.metrics.diagnostics += 1;
            log::warn!("{}: {} pass cut short: {}", self.player, pass, e);
        }
    }

    /// Records an inconsistency a pass chose to step over.
    pub(super) fn note_inconsistency(&mut self, pass: &'static str, error: RuleError) {
        self.metrics.diagnostics += 1;
        log::warn!("{}: {} pass skipped an entry: {}", self.player, pass, error);
    }

    pub(super) fn emit(&mut self, sink: &mut dyn CommandSink, command: Command) {
        log::debug!("{} issues {:?}", self.player, command);
        self.metrics.record(&command);
        sink.submit(command);
    }

    pub(super) fn send_unit_to(&mut self, sink: &mut dyn CommandSink, unit: UnitId, target: Position) {
        self.emit(
            sink,
            Command::MoveUnits {
                target,
                units: vec![unit],
            },
        );
    }

    /// Sends the nearest idle swordsman toward a new military building, if any.
    pub(super) fn send_swordsman_to(
        &mut self,
        stats: &dyn WorldStatistics,
        sink: &mut dyn CommandSink,
        position: Position,
    ) {
        if let Some(soldier) = stats.nearest_swordsman(position, self.player) {
            self.send_unit_to(sink, soldier.id, position);
        }
    }

    pub(super) fn is_claimed(&self, unit: UnitId) -> bool {
        self.claimed_units.contains(&unit)
    }

    /// Emits one batched role change. A unit may change role at most once per tick.
    pub(super) fn reassign(
        &mut self,
        sink: &mut dyn CommandSink,
        units: Vec<UnitId>,
        role: UnitRole,
    ) -> Result<(), RuleError> {
        if let Some(&unit) = units.iter().find(|u| self.claimed_units.contains(u)) {
            return Err(RuleError::UnitAlreadyClaimed(unit));
        }
        self.claimed_units.extend(units.iter().copied());
        self.emit(sink, Command::ReassignRole { units, role });
        Ok(())
    }
}

impl std::fmt::Display for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (end-game: {})", self.player, self.end_game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::count_constructions;
    use crate::state::UnitAction;
    use crate::testing::{
        engine_with, FixedBorderPolicy, MissingRecords, RecordingMilitary, ScriptedEconomy,
        ScriptedPositionSearch, SnapshotBuilder,
    };
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    const P: PlayerId = PlayerId(1);

    #[test]
    fn test_dead_player_is_a_no_op() {
        let snapshot = SnapshotBuilder::new(P)
            .with_bearers(20)
            .with_building(BuildingType::Stonecutter, 30, 30)
            .dead()
            .build();
        let economy = ScriptedEconomy {
            buildings: vec![BuildingType::Farm],
            ..Default::default()
        };
        let positions = ScriptedPositionSearch::new().with(BuildingType::Farm, 5, 5);
        let mut ai = engine_with(P, economy, FixedBorderPolicy::default(), positions);

        let mut commands = Vec::new();
        ai.apply_rules(&snapshot, &mut commands);

        assert!(commands.is_empty());
        assert_eq!(ai.metrics().ticks, 0);
    }

    #[test]
    fn test_military_is_delegated_once_per_tick() {
        let snapshot = SnapshotBuilder::new(P).build();
        let (military, log) = RecordingMilitary::new();
        let mut ai = DecisionEngine::new(
            P,
            AiConfig::default(),
            Box::new(ScriptedEconomy::default()),
            Box::new(military),
            Box::new(FixedBorderPolicy::default()),
            Box::new(ScriptedPositionSearch::new()),
        );

        let mut commands = Vec::new();
        ai.apply_rules(&snapshot, &mut commands);
        ai.apply_rules(&snapshot, &mut commands);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["levy_units", "command_troops", "levy_units", "command_troops"]
        );
    }

    #[test]
    fn test_construction_precedes_geologists() {
        // 14 bearers, one stone-cutter: geologists go out; a farm is also placeable.
        let snapshot = SnapshotBuilder::new(P)
            .with_building(BuildingType::Stonecutter, 30, 30)
            .with_bearers(14)
            .with_resource(crate::state::ResourceType::Coal, 12, 12, Some(P))
            .build();
        let economy = ScriptedEconomy {
            buildings: vec![BuildingType::Farm],
            ..Default::default()
        };
        let positions = ScriptedPositionSearch::new().with(BuildingType::Farm, 5, 5);
        let mut ai = engine_with(P, economy, FixedBorderPolicy::default(), positions);

        let mut commands = Vec::new();
        ai.apply_rules(&snapshot, &mut commands);

        let construct = commands
            .iter()
            .position(|c| matches!(c, Command::Construct { .. }))
            .unwrap();
        let geologists = commands
            .iter()
            .position(|c| {
                matches!(
                    c,
                    Command::ReassignRole {
                        role: UnitRole::Geologist,
                        ..
                    }
                )
            })
            .unwrap();
        assert!(construct < geologists);
    }

    #[test]
    fn test_failure_cache_is_cleared_every_tick() {
        let snapshot = SnapshotBuilder::new(P).build();
        let economy = ScriptedEconomy {
            buildings: vec![BuildingType::Farm, BuildingType::Mill],
            ..Default::default()
        };
        let positions = ScriptedPositionSearch::new();
        let requests = positions.requests();
        let mut ai = engine_with(P, economy, FixedBorderPolicy::default(), positions);

        let mut commands = Vec::new();
        ai.apply_rules(&snapshot, &mut commands);
        assert_eq!(
            ai.failed_constructions(),
            &[BuildingType::Farm, BuildingType::Mill]
        );

        ai.apply_rules(&snapshot, &mut commands);
        // Both types were searched again on the second tick.
        assert_eq!(requests.lock().unwrap().len(), 4);
        assert_eq!(ai.failed_constructions().len(), 2);
        assert_eq!(ai.metrics().failed_placements, 4);
        assert!(commands.is_empty());
    }

    struct ToggleEconomy(Arc<AtomicBool>);

    impl EconomicPolicy for ToggleEconomy {
        fn update(&mut self, _stats: &dyn WorldStatistics, _player: PlayerId) {}
        fn is_end_game(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
        fn buildings_to_build(&self) -> Vec<BuildingType> {
            vec![BuildingType::Farm]
        }
        fn automatic_living_houses_enabled(&self) -> bool {
            false
        }
        fn mid_game_number_of_stone_cutters(&self) -> usize {
            2
        }
        fn number_of_parallel_construction_sites(&self) -> usize {
            3
        }
    }

    #[test]
    fn test_end_game_latches() {
        let flag = Arc::new(AtomicBool::new(false));
        let snapshot = SnapshotBuilder::new(P).build();
        let mut ai = DecisionEngine::new(
            P,
            AiConfig::default(),
            Box::new(ToggleEconomy(flag.clone())),
            Box::new(RecordingMilitary::default()),
            Box::new(FixedBorderPolicy::default()),
            Box::new(ScriptedPositionSearch::new().with(BuildingType::Farm, 3, 3)),
        );

        let mut commands = Vec::new();
        ai.apply_rules(&snapshot, &mut commands);
        assert!(!ai.is_end_game());
        assert_eq!(count_constructions(&commands), 1);

        flag.store(true, Ordering::SeqCst);
        ai.apply_rules(&snapshot, &mut commands);
        flag.store(false, Ordering::SeqCst);
        ai.apply_rules(&snapshot, &mut commands);

        assert!(ai.is_end_game());
        // No economy construction once end-game has been reported.
        assert_eq!(count_constructions(&commands), 1);
    }

    #[test]
    fn test_policies_updated_once_per_tick() {
        let snapshot = SnapshotBuilder::new(P)
            .with_border(&[(0, 0), (20, 20)])
            .with_unit(UnitRole::Pioneer, 5, 5, UnitAction::Idle)
            .build();
        let economy = ScriptedEconomy::default();
        let border = FixedBorderPolicy::default();
        let economy_updates = economy.updates.clone();
        let border_updates = border.updates.clone();
        let mut ai = engine_with(P, economy, border, ScriptedPositionSearch::new());

        let mut commands = Vec::new();
        ai.apply_rules(&snapshot, &mut commands);
        ai.apply_rules(&snapshot, &mut commands);

        assert_eq!(economy_updates.load(Ordering::SeqCst), 2);
        assert_eq!(border_updates.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dead_player_policies_not_updated() {
        let snapshot = SnapshotBuilder::new(P)
            .with_border(&[(0, 0)])
            .with_unit(UnitRole::Pioneer, 5, 5, UnitAction::Idle)
            .dead()
            .build();
        let economy = ScriptedEconomy::default();
        let border = FixedBorderPolicy::default();
        let economy_updates = economy.updates.clone();
        let border_updates = border.updates.clone();
        let mut ai = engine_with(P, economy, border, ScriptedPositionSearch::new());

        ai.apply_rules(&snapshot, &mut Vec::new());

        assert_eq!(economy_updates.load(Ordering::SeqCst), 0);
        assert_eq!(border_updates.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_end_game_stops_economy_construction() {
        let snapshot = SnapshotBuilder::new(P).build();
        let economy = ScriptedEconomy {
            buildings: vec![BuildingType::Farm],
            end_game: true,
            ..Default::default()
        };
        let positions = ScriptedPositionSearch::new().with(BuildingType::Farm, 3, 3);
        let mut ai = engine_with(P, economy, FixedBorderPolicy::default(), positions);

        let mut commands = Vec::new();
        ai.apply_rules(&snapshot, &mut commands);

        assert!(ai.is_end_game());
        assert_eq!(count_constructions(&commands), 0);
    }

    #[test]
    fn test_missing_building_record_is_counted_and_tick_goes_on() {
        // The record of the tower at (0, 0) is missing; the one at (0, 10) still gets a swordsman.
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
        ai.apply_rules(&stats, &mut commands);

        assert_eq!(
            commands,
            vec![Command::MoveUnits {
                target: Position::new(0, 11),
                units: vec![UnitId(1)],
            }]
        );
        // Once in the tower check, once in the garrison pass.
        assert_eq!(ai.metrics().diagnostics, 2);
        assert_eq!(ai.metrics().ticks, 1);
    }

    #[test]
    fn test_reassign_rejects_double_claim() {
        let mut ai = engine_with(
            P,
            ScriptedEconomy::default(),
            FixedBorderPolicy::default(),
            ScriptedPositionSearch::new(),
        );
        let mut commands = Vec::new();
        ai.reassign(&mut commands, vec![UnitId(1), UnitId(2)], UnitRole::Pioneer)
            .unwrap();
        let err = ai
            .reassign(&mut commands, vec![UnitId(3), UnitId(2)], UnitRole::Geologist)
            .unwrap_err();
        assert_eq!(err, RuleError::UnitAlreadyClaimed(UnitId(2)));
        assert_eq!(commands.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_at_most_one_construction_per_tick(
            bearers in 0usize..40,
            gold in 0u32..200,
            with_goldmelt in any::<bool>(),
            threatened in any::<bool>(),
            automation in any::<bool>(),
        ) {
            let mut builder = SnapshotBuilder::new(P)
                .with_bearers(bearers)
                .with_material(crate::state::MaterialType::Gold, gold)
                .with_swordsman(3, 3)
                .with_border(&[(0, 0), (20, 20)]);
            if with_goldmelt {
                builder = builder.with_building(BuildingType::Goldmelt, 40, 40);
            }
            if threatened {
                builder = builder.with_threatened_border(&[(20, 20)]);
            }
            let snapshot = builder.build();

            let economy = ScriptedEconomy {
                buildings: vec![BuildingType::Farm, BuildingType::Tower, BuildingType::Mill],
                automatic_living_houses: automation,
                ..Default::default()
            };
            let mut positions = ScriptedPositionSearch::new().with_defence(18, 18);
            for (i, kind) in BuildingType::ALL.iter().enumerate() {
                positions = positions.with(*kind, i as i16, 50);
            }
            let mut ai = engine_with(P, economy, FixedBorderPolicy::default(), positions);

            for _ in 0..3 {
                let mut commands = Vec::new();
                ai.apply_rules(&snapshot, &mut commands);
                prop_assert!(count_constructions(&commands) <= 1);
            }
        }
    }
}
