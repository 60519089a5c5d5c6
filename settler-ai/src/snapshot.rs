//! Plain in-memory world snapshot.
//!
//! [`WorldSnapshot`] is a flat, serializable picture of the world that answers
//! every [`WorldStatistics`] query by scanning its lists. It is what tests and
//! the `settler-sim` harness feed to the AI; a real engine would implement
//! [`WorldStatistics`] over its own grids instead.

use crate::state::{
    BuildingInstance, BuildingType, MaterialType, MobileUnit, PlayerId, Position, ResourceType,
    UnitRole,
};
use crate::stats::WorldStatistics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-player view of land and storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(default)]
    pub materials: BTreeMap<MaterialType, u32>,
    #[serde(default)]
    pub border: Vec<Position>,
    #[serde(default)]
    pub threatened_border: Vec<Position>,
    #[serde(default)]
    pub enemies_in_town: Vec<Position>,
    #[serde(default)]
    pub partition_position: Option<Position>,
}

fn default_alive() -> bool {
    true
}

impl PlayerState {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            alive: true,
            materials: BTreeMap::new(),
            border: Vec::new(),
            threatened_border: Vec::new(),
            enemies_in_town: Vec::new(),
            partition_position: None,
        }
    }
}

/// A cuttable stone or an underground deposit. `owner` is `None` in unowned land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub position: Position,
    #[serde(default)]
    pub owner: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDeposit {
    pub resource: ResourceType,
    pub position: Position,
    #[serde(default)]
    pub owner: Option<PlayerId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub players: Vec<PlayerState>,
    #[serde(default)]
    pub buildings: Vec<BuildingInstance>,
    #[serde(default)]
    pub units: Vec<MobileUnit>,
    #[serde(default)]
    pub stones: Vec<Deposit>,
    #[serde(default)]
    pub resources: Vec<ResourceDeposit>,
}

impl WorldSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    fn buildings_of(
        &self,
        kind: BuildingType,
        player: PlayerId,
    ) -> impl Iterator<Item = &BuildingInstance> {
        self.buildings
            .iter()
            .filter(move |b| b.owner == player && b.kind == kind)
    }
}

impl WorldStatistics for WorldSnapshot {
    fn is_alive(&self, player: PlayerId) -> bool {
        self.player(player).is_some_and(|p| p.alive)
    }

    fn building_positions(&self, kind: BuildingType, player: PlayerId) -> Vec<Position> {
        self.buildings_of(kind, player).map(|b| b.position).collect()
    }

    fn building_at(&self, position: Position) -> Option<&BuildingInstance> {
        self.buildings.iter().find(|b| b.position == position)
    }

    fn finished_count(&self, kind: BuildingType, player: PlayerId) -> usize {
        self.buildings_of(kind, player)
            .filter(|b| b.construction_finished)
            .count()
    }

    fn total_count(&self, kind: BuildingType, player: PlayerId) -> usize {
        self.buildings_of(kind, player).count()
    }

    fn total_buildings(&self, player: PlayerId) -> usize {
        self.buildings.iter().filter(|b| b.owner == player).count()
    }

    fn unfinished_buildings(&self, player: PlayerId) -> usize {
        self.buildings
            .iter()
            .filter(|b| b.owner == player && !b.construction_finished)
            .count()
    }

    fn units_of_role(&self, role: UnitRole, player: PlayerId) -> Vec<&MobileUnit> {
        self.units
            .iter()
            .filter(|u| u.owner == player && u.role == role)
            .collect()
    }

    fn material_count(&self, material: MaterialType, player: PlayerId) -> u32 {
        self.player(player)
            .and_then(|p| p.materials.get(&material).copied())
            .unwrap_or(0)
    }

    fn nearest_swordsman(&self, from: Position, player: PlayerId) -> Option<&MobileUnit> {
        self.units
            .iter()
            .filter(|u| u.owner == player && u.role == UnitRole::Swordsman && u.is_idle())
            .min_by_key(|u| from.on_grid_distance(u.position))
    }

    fn nearest_stone(
        &self,
        from: Position,
        max_distance: u32,
        player: PlayerId,
    ) -> Option<Position> {
        self.stones
            .iter()
            .filter(|s| s.owner == Some(player))
            .map(|s| (from.on_grid_distance(s.position), s.position))
            .filter(|(dist, _)| *dist <= max_distance)
            .min_by_key(|(dist, _)| *dist)
            .map(|(_, pos)| pos)
    }

    fn border_of(&self, player: PlayerId) -> Vec<Position> {
        self.player(player)
            .map(|p| p.border.clone())
            .unwrap_or_default()
    }

    fn threatened_border_of(&self, player: PlayerId) -> Vec<Position> {
        self.player(player)
            .map(|p| p.threatened_border.clone())
            .unwrap_or_default()
    }

    fn enemies_in_town_of(&self, player: PlayerId) -> Vec<Position> {
        self.player(player)
            .map(|p| p.enemies_in_town.clone())
            .unwrap_or_default()
    }

    fn partition_position_of(&self, player: PlayerId) -> Option<Position> {
        self.player(player).and_then(|p| p.partition_position)
    }

    fn nearest_resource_point(
        &self,
        from: Position,
        resource: ResourceType,
        player: PlayerId,
        max_distance: u32,
    ) -> Option<Position> {
        nearest_deposit(&self.resources, from, resource, Some(player), max_distance)
    }

    fn nearest_resource_point_in_default_partition(
        &self,
        from: Position,
        resource: ResourceType,
        max_distance: u32,
    ) -> Option<Position> {
        nearest_deposit(&self.resources, from, resource, None, max_distance)
    }
}

fn nearest_deposit(
    deposits: &[ResourceDeposit],
    from: Position,
    resource: ResourceType,
    owner: Option<PlayerId>,
    max_distance: u32,
) -> Option<Position> {
    deposits
        .iter()
        .filter(|d| d.resource == resource && d.owner == owner)
        .map(|d| (from.on_grid_distance(d.position), d.position))
        .filter(|(dist, _)| *dist <= max_distance)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, pos)| pos)
}
