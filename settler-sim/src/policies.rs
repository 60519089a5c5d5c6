//! Simple border and placement policies for running the AI against an
//! in-memory world.

use settler_ai::{
    BorderPolicy, BuildingType, PlayerId, Position, PositionSearch, ResourceType, WorldStatistics,
};

/// Spacing between candidate building sites.
const SITE_GRID: i16 = 3;

/// Places buildings on the free grid tile closest to the player's partition centre.
#[derive(Debug, Clone)]
pub struct NearestFreeSite {
    max_radius: i16,
}

impl NearestFreeSite {
    pub fn new(max_radius: i16) -> Self {
        Self { max_radius }
    }

    fn is_free(stats: &dyn WorldStatistics, site: Position) -> bool {
        let door = Position::new(site.x, site.y + 1);
        stats.building_at(site).is_none() && stats.building_at(door).is_none()
    }

    fn search_from(&self, stats: &dyn WorldStatistics, center: Position) -> Option<Position> {
        let center = Position::new(
            center.x - center.x.rem_euclid(SITE_GRID),
            center.y - center.y.rem_euclid(SITE_GRID),
        );
        for ring in 0..=self.max_radius / SITE_GRID {
            let r = ring * SITE_GRID;
            for dy in (-r..=r).step_by(SITE_GRID as usize) {
                for dx in (-r..=r).step_by(SITE_GRID as usize) {
                    if dx.abs().max(dy.abs()) != r {
                        continue;
                    }
                    let site = Position::new(center.x + dx, center.y + dy);
                    if Self::is_free(stats, site) {
                        return Some(site);
                    }
                }
            }
        }
        None
    }
}

impl PositionSearch for NearestFreeSite {
    fn best_position_for(
        &self,
        kind: BuildingType,
        stats: &dyn WorldStatistics,
        player: PlayerId,
    ) -> Option<Position> {
        let center = stats.partition_position_of(player)?;
        let site = self.search_from(stats, center);
        log::trace!("{} site for {}: {:?}", player, kind, site);
        site
    }

    fn border_defence_position(
        &self,
        threatened: &[Position],
        stats: &dyn WorldStatistics,
        player: PlayerId,
    ) -> Option<Position> {
        let center = stats.partition_position_of(player)?;
        let front = threatened
            .iter()
            .min_by_key(|p| center.on_grid_distance(**p))?;
        // Halfway between the centre and the front stays inside the territory.
        let midpoint = Position::new((center.x + front.x) / 2, (center.y + front.y) / 2);
        self.search_from(stats, midpoint)
    }
}

/// Sends resource pioneers toward the closest unclaimed coal and broadens the
/// border at the point farthest from the centre.
#[derive(Debug, Clone)]
pub struct FrontierBorder {
    search_radius: u32,
    resource_target: Option<Position>,
    broaden_target: Option<Position>,
}

impl FrontierBorder {
    pub fn new(search_radius: u32) -> Self {
        Self {
            search_radius,
            resource_target: None,
            broaden_target: None,
        }
    }
}

impl BorderPolicy for FrontierBorder {
    fn update(&mut self, stats: &dyn WorldStatistics, player: PlayerId) {
        let Some(center) = stats.partition_position_of(player) else {
            self.resource_target = None;
            self.broaden_target = None;
            return;
        };
        self.resource_target = stats.nearest_resource_point_in_default_partition(
            center,
            ResourceType::Coal,
            self.search_radius,
        );
        self.broaden_target = stats
            .border_of(player)
            .into_iter()
            .max_by_key(|p| (center.on_grid_distance(*p), std::cmp::Reverse(*p)));
    }

    fn find_resource_target(&self) -> Option<Position> {
        self.resource_target
    }

    fn find_broaden_target(&self) -> Option<Position> {
        self.broaden_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settler_ai::testing::SnapshotBuilder;

    const P: PlayerId = PlayerId(0);

    #[test]
    fn test_first_site_is_the_centre() {
        // The builder centres the partition on (10, 10); the grid snaps to (9, 9).
        let snapshot = SnapshotBuilder::new(P).build();
        let search = NearestFreeSite::new(30);

        assert_eq!(
            search.best_position_for(BuildingType::Farm, &snapshot, P),
            Some(Position::new(9, 9))
        );
    }

    #[test]
    fn test_occupied_sites_are_skipped() {
        let snapshot = SnapshotBuilder::new(P)
            .with_building(BuildingType::Farm, 9, 9)
            .build();
        let search = NearestFreeSite::new(30);

        assert_eq!(
            search.best_position_for(BuildingType::Mill, &snapshot, P),
            Some(Position::new(6, 6))
        );
    }

    #[test]
    fn test_no_site_without_partition() {
        let mut snapshot = SnapshotBuilder::new(P).build();
        snapshot.players[0].partition_position = None;

        assert_eq!(
            NearestFreeSite::new(30).best_position_for(BuildingType::Farm, &snapshot, P),
            None
        );
    }

    #[test]
    fn test_defence_site_between_centre_and_front() {
        let snapshot = SnapshotBuilder::new(P).build();
        let search = NearestFreeSite::new(30);

        let site = search
            .border_defence_position(&[Position::new(40, 10), Position::new(22, 10)], &snapshot, P)
            .unwrap();

        assert_eq!(site, Position::new(15, 9));
    }

    #[test]
    fn test_frontier_targets() {
        let snapshot = SnapshotBuilder::new(P)
            .with_border(&[(0, 10), (10, 30), (12, 10)])
            .with_resource(ResourceType::Coal, 25, 10, None)
            .with_resource(ResourceType::Coal, 11, 11, Some(P))
            .build();
        let mut border = FrontierBorder::new(40);

        border.update(&snapshot, P);

        assert_eq!(border.find_resource_target(), Some(Position::new(25, 10)));
        assert_eq!(border.find_broaden_target(), Some(Position::new(10, 30)));
    }
}
