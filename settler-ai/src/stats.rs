//! Read-only statistics over the current world snapshot.
//!
//! The AI never touches world state directly; everything it knows comes from
//! a [`WorldStatistics`] implementation that answers queries for one tick.
//! Queries are pure: asking twice within a tick yields the same answer, and
//! a query with no match returns an empty list, zero or `None`.

use crate::state::{
    BuildingInstance, BuildingType, MaterialType, MobileUnit, PlayerId, Position, ResourceType,
    UnitRole,
};

pub trait WorldStatistics {
    fn is_alive(&self, player: PlayerId) -> bool;

    // Buildings

    /// Positions of all buildings of `kind`, finished or not, in snapshot order.
    fn building_positions(&self, kind: BuildingType, player: PlayerId) -> Vec<Position>;

    fn building_at(&self, position: Position) -> Option<&BuildingInstance>;

    /// Finished buildings of `kind`.
    fn finished_count(&self, kind: BuildingType, player: PlayerId) -> usize;

    /// Buildings of `kind` including construction sites.
    fn total_count(&self, kind: BuildingType, player: PlayerId) -> usize;

    /// Construction sites of `kind`.
    fn unfinished_count(&self, kind: BuildingType, player: PlayerId) -> usize {
        self.total_count(kind, player) - self.finished_count(kind, player)
    }

    /// All buildings of the player, any type, including construction sites.
    fn total_buildings(&self, player: PlayerId) -> usize;

    /// All construction sites of the player.
    fn unfinished_buildings(&self, player: PlayerId) -> usize;

    // Units & goods

    /// Units of `role` in snapshot order.
    fn units_of_role(&self, role: UnitRole, player: PlayerId) -> Vec<&MobileUnit>;

    fn material_count(&self, material: MaterialType, player: PlayerId) -> u32;

    /// Nearest idle swordsman of the player.
    fn nearest_swordsman(&self, from: Position, player: PlayerId) -> Option<&MobileUnit>;

    // Land

    /// Nearest cuttable stone within `max_distance` of `from`.
    fn nearest_stone(&self, from: Position, max_distance: u32, player: PlayerId)
        -> Option<Position>;

    fn border_of(&self, player: PlayerId) -> Vec<Position>;

    /// Border tiles next to enemy territory or troops.
    fn threatened_border_of(&self, player: PlayerId) -> Vec<Position>;

    /// Enemy units standing inside the player's territory.
    fn enemies_in_town_of(&self, player: PlayerId) -> Vec<Position>;

    /// A representative position of the player's main partition.
    fn partition_position_of(&self, player: PlayerId) -> Option<Position>;

    /// Nearest deposit of `resource` inside the player's land.
    fn nearest_resource_point(
        &self,
        from: Position,
        resource: ResourceType,
        player: PlayerId,
        max_distance: u32,
    ) -> Option<Position>;

    /// Nearest deposit of `resource` in unowned land.
    fn nearest_resource_point_in_default_partition(
        &self,
        from: Position,
        resource: ResourceType,
        max_distance: u32,
    ) -> Option<Position>;
}
