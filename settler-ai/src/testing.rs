//! Fixtures for exercising the AI without a simulation: a snapshot builder and
//! scripted stand-ins for every policy the engine consults.

use crate::ai::DecisionEngine;
use crate::config::AiConfig;
use crate::input::CommandSink;
use crate::policy::{BorderPolicy, EconomicPolicy, MilitaryPolicy, PositionSearch};
use crate::snapshot::{Deposit, PlayerState, ResourceDeposit, WorldSnapshot};
use crate::state::{
    BuildingInstance, BuildingType, MaterialType, MobileUnit, PlayerId, Position, ResourceType,
    UnitAction, UnitId, UnitRole,
};
use crate::stats::WorldStatistics;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub struct SnapshotBuilder {
    player: PlayerId,
    state: PlayerState,
    snapshot: WorldSnapshot,
    next_unit_id: u32,
}

impl SnapshotBuilder {
    /// A living player whose partition is centred on (10, 10), with no border yet.
    pub fn new(player: PlayerId) -> Self {
        let mut state = PlayerState::new(player);
        state.partition_position = Some(Position::new(10, 10));
        Self {
            player,
            state,
            snapshot: WorldSnapshot::default(),
            next_unit_id: 1,
        }
    }

    fn player_state(&mut self) -> &mut PlayerState {
        &mut self.state
    }

    pub fn with_building(self, kind: BuildingType, x: i16, y: i16) -> Self {
        let owner = self.player;
        self.with_building_instance(BuildingInstance::finished(
            owner,
            kind,
            Position::new(x, y),
        ))
    }

    pub fn with_construction_site(self, kind: BuildingType, x: i16, y: i16) -> Self {
        let owner = self.player;
        self.with_building_instance(BuildingInstance::construction_site(
            owner,
            kind,
            Position::new(x, y),
        ))
    }

    /// A finished building that has run out of work.
    pub fn with_exhausted_building(self, kind: BuildingType, x: i16, y: i16) -> Self {
        let owner = self.player;
        let mut building = BuildingInstance::finished(owner, kind, Position::new(x, y));
        building.cannot_work = true;
        self.with_building_instance(building)
    }

    pub fn with_military_building(
        self,
        kind: BuildingType,
        x: i16,
        y: i16,
        finished: bool,
        occupied: bool,
    ) -> Self {
        let owner = self.player;
        let pos = Position::new(x, y);
        let mut building = if finished {
            BuildingInstance::finished(owner, kind, pos)
        } else {
            BuildingInstance::construction_site(owner, kind, pos)
        };
        building.occupied = occupied;
        self.with_building_instance(building)
    }

    pub fn with_building_instance(mut self, building: BuildingInstance) -> Self {
        self.snapshot.buildings.push(building);
        self
    }

    pub fn with_unit(mut self, role: UnitRole, x: i16, y: i16, action: UnitAction) -> Self {
        let unit = MobileUnit {
            id: UnitId(self.next_unit_id),
            owner: self.player,
            position: Position::new(x, y),
            role,
            action,
        };
        self.next_unit_id += 1;
        self.snapshot.units.push(unit);
        self
    }

    /// `count` idle bearers lined up along y = 0.
    pub fn with_bearers(mut self, count: usize) -> Self {
        for i in 0..count {
            self = self.with_unit(UnitRole::Bearer, i as i16, 0, UnitAction::Idle);
        }
        self
    }

    pub fn with_swordsman(self, x: i16, y: i16) -> Self {
        self.with_unit(UnitRole::Swordsman, x, y, UnitAction::Idle)
    }

    pub fn with_material(mut self, material: MaterialType, amount: u32) -> Self {
        self.player_state().materials.insert(material, amount);
        self
    }

    pub fn with_border(mut self, border: &[(i16, i16)]) -> Self {
        self.player_state().border = border.iter().map(|&(x, y)| Position::new(x, y)).collect();
        self
    }

    pub fn with_threatened_border(mut self, border: &[(i16, i16)]) -> Self {
        self.player_state().threatened_border =
            border.iter().map(|&(x, y)| Position::new(x, y)).collect();
        self
    }

    pub fn with_enemy_in_town(mut self, x: i16, y: i16) -> Self {
        self.player_state()
            .enemies_in_town
            .push(Position::new(x, y));
        self
    }

    pub fn with_stone(mut self, x: i16, y: i16) -> Self {
        let owner = Some(self.player);
        self.snapshot.stones.push(Deposit {
            position: Position::new(x, y),
            owner,
        });
        self
    }

    pub fn with_resource(
        mut self,
        resource: ResourceType,
        x: i16,
        y: i16,
        owner: Option<PlayerId>,
    ) -> Self {
        self.snapshot.resources.push(ResourceDeposit {
            resource,
            position: Position::new(x, y),
            owner,
        });
        self
    }

    pub fn dead(mut self) -> Self {
        self.player_state().alive = false;
        self
    }

    pub fn build(mut self) -> WorldSnapshot {
        self.snapshot.players.push(self.state);
        self.snapshot
    }
}

/// Shared count of `update` calls, readable after the policy is boxed.
pub type UpdateCounter = Arc<AtomicU32>;

/// Economy whose answers are fixed fields. Counts its `update` calls.
#[derive(Debug, Clone)]
pub struct ScriptedEconomy {
    pub buildings: Vec<BuildingType>,
    pub automatic_living_houses: bool,
    pub end_game: bool,
    pub mid_game_stone_cutters: usize,
    pub parallel_construction_sites: usize,
    pub updates: UpdateCounter,
}

impl Default for ScriptedEconomy {
    fn default() -> Self {
        Self {
            buildings: Vec::new(),
            automatic_living_houses: false,
            end_game: false,
            mid_game_stone_cutters: 2,
            parallel_construction_sites: 5,
            updates: UpdateCounter::default(),
        }
    }
}

impl EconomicPolicy for ScriptedEconomy {
    fn update(&mut self, _stats: &dyn WorldStatistics, _player: PlayerId) {
        self.updates.fetch_add(1, Ordering::SeqCst);
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

/// Shared record of what a [`RecordingMilitary`] was asked to do.
pub type MilitaryLog = Arc<Mutex<Vec<&'static str>>>;

/// General that only records the calls it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingMilitary {
    log: MilitaryLog,
}

impl RecordingMilitary {
    pub fn new() -> (Self, MilitaryLog) {
        let log = MilitaryLog::default();
        (Self { log: log.clone() }, log)
    }

    fn record(&self, call: &'static str) {
        if let Ok(mut log) = self.log.lock() {
            log.push(call);
        }
    }
}

impl MilitaryPolicy for RecordingMilitary {
    fn levy_units(&mut self, _stats: &dyn WorldStatistics, _sink: &mut dyn CommandSink) {
        self.record("levy_units");
    }

    fn command_troops(&mut self, _stats: &dyn WorldStatistics, _sink: &mut dyn CommandSink) {
        self.record("command_troops");
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixedBorderPolicy {
    pub resource_target: Option<Position>,
    pub broaden_target: Option<Position>,
    pub updates: UpdateCounter,
}

impl BorderPolicy for FixedBorderPolicy {
    fn update(&mut self, _stats: &dyn WorldStatistics, _player: PlayerId) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn find_resource_target(&self) -> Option<Position> {
        self.resource_target
    }

    fn find_broaden_target(&self) -> Option<Position> {
        self.broaden_target
    }
}

/// Position search answering from a fixed table; types not listed fail placement.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPositionSearch {
    positions: FxHashMap<BuildingType, Position>,
    defence: Option<Position>,
    requests: Arc<Mutex<Vec<BuildingType>>>,
}

impl ScriptedPositionSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: BuildingType, x: i16, y: i16) -> Self {
        self.positions.insert(kind, Position::new(x, y));
        self
    }

    pub fn with_defence(mut self, x: i16, y: i16) -> Self {
        self.defence = Some(Position::new(x, y));
        self
    }

    /// Handle to every type `best_position_for` was asked about, in order.
    pub fn requests(&self) -> Arc<Mutex<Vec<BuildingType>>> {
        self.requests.clone()
    }
}

impl PositionSearch for ScriptedPositionSearch {
    fn best_position_for(
        &self,
        kind: BuildingType,
        _stats: &dyn WorldStatistics,
        _player: PlayerId,
    ) -> Option<Position> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(kind);
        }
        self.positions.get(&kind).copied()
    }

    fn border_defence_position(
        &self,
        threatened: &[Position],
        _stats: &dyn WorldStatistics,
        _player: PlayerId,
    ) -> Option<Position> {
        if threatened.is_empty() {
            return None;
        }
        self.defence
    }
}

/// A snapshot whose building list names positions it has no record for,
/// as a simulation can report mid-update.
pub struct MissingRecords<'a> {
    inner: &'a WorldSnapshot,
    missing: Vec<Position>,
}

impl<'a> MissingRecords<'a> {
    pub fn new(inner: &'a WorldSnapshot, missing: &[(i16, i16)]) -> Self {
        Self {
            inner,
            missing: missing.iter().map(|&(x, y)| Position::new(x, y)).collect(),
        }
    }
}

impl WorldStatistics for MissingRecords<'_> {
    fn is_alive(&self, player: PlayerId) -> bool {
        self.inner.is_alive(player)
    }

    fn building_positions(&self, kind: BuildingType, player: PlayerId) -> Vec<Position> {
        self.inner.building_positions(kind, player)
    }

    fn building_at(&self, position: Position) -> Option<&BuildingInstance> {
        if self.missing.contains(&position) {
            return None;
        }
        self.inner.building_at(position)
    }

    fn finished_count(&self, kind: BuildingType, player: PlayerId) -> usize {
        self.inner.finished_count(kind, player)
    }

    fn total_count(&self, kind: BuildingType, player: PlayerId) -> usize {
        self.inner.total_count(kind, player)
    }

    fn total_buildings(&self, player: PlayerId) -> usize {
        self.inner.total_buildings(player)
    }

    fn unfinished_buildings(&self, player: PlayerId) -> usize {
        self.inner.unfinished_buildings(player)
    }

    fn units_of_role(&self, role: UnitRole, player: PlayerId) -> Vec<&MobileUnit> {
        self.inner.units_of_role(role, player)
    }

    fn material_count(&self, material: MaterialType, player: PlayerId) -> u32 {
        self.inner.material_count(material, player)
    }

    fn nearest_swordsman(&self, from: Position, player: PlayerId) -> Option<&MobileUnit> {
        self.inner.nearest_swordsman(from, player)
    }

    fn nearest_stone(
        &self,
        from: Position,
        max_distance: u32,
        player: PlayerId,
    ) -> Option<Position> {
        self.inner.nearest_stone(from, max_distance, player)
    }

    fn border_of(&self, player: PlayerId) -> Vec<Position> {
        self.inner.border_of(player)
    }

    fn threatened_border_of(&self, player: PlayerId) -> Vec<Position> {
        self.inner.threatened_border_of(player)
    }

    fn enemies_in_town_of(&self, player: PlayerId) -> Vec<Position> {
        self.inner.enemies_in_town_of(player)
    }

    fn partition_position_of(&self, player: PlayerId) -> Option<Position> {
        self.inner.partition_position_of(player)
    }

    fn nearest_resource_point(
        &self,
        from: Position,
        resource: ResourceType,
        player: PlayerId,
        max_distance: u32,
    ) -> Option<Position> {
        self.inner
            .nearest_resource_point(from, resource, player, max_distance)
    }

    fn nearest_resource_point_in_default_partition(
        &self,
        from: Position,
        resource: ResourceType,
        max_distance: u32,
    ) -> Option<Position> {
        self.inner
            .nearest_resource_point_in_default_partition(from, resource, max_distance)
    }
}

/// Engine with default config, a recording general and the given scripted policies.
pub fn engine_with(
    player: PlayerId,
    economy: ScriptedEconomy,
    border: FixedBorderPolicy,
    positions: ScriptedPositionSearch,
) -> DecisionEngine {
    let (military, _) = RecordingMilitary::new();
    DecisionEngine::new(
        player,
        AiConfig::default(),
        Box::new(economy),
        Box::new(military),
        Box::new(border),
        Box::new(positions),
    )
}
