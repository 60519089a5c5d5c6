//! Upstream ratios a building needs before another one is worth placing.
//!
//! Each entry reads "every `dependent` needs `ratio` `required` buildings":
//! an iron melt is only built while `coal mines >= iron melts * ratio`, and
//! so on. Types without entries are never held back.

use crate::state::{BuildingType, PlayerId};
use crate::stats::WorldStatistics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingDependency {
    pub dependent: BuildingType,
    pub required: BuildingType,
    pub ratio: f32,
}

impl BuildingDependency {
    pub const fn new(dependent: BuildingType, required: BuildingType, ratio: f32) -> Self {
        Self {
            dependent,
            required,
            ratio,
        }
    }

    /// `required_count >= dependent_count * ratio`
    pub fn fits(&self, required_count: usize, dependent_count: usize) -> bool {
        required_count as f64 >= dependent_count as f64 * self.ratio as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyTable {
    entries: Vec<BuildingDependency>,
}

impl DependencyTable {
    pub fn new(entries: Vec<BuildingDependency>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[BuildingDependency] {
        &self.entries
    }

    pub fn requirements_of(
        &self,
        dependent: BuildingType,
    ) -> impl Iterator<Item = &BuildingDependency> {
        self.entries.iter().filter(move |d| d.dependent == dependent)
    }

    /// True when every ratio listed for `dependent` holds, counting construction sites.
    pub fn fulfilled(
        &self,
        dependent: BuildingType,
        stats: &dyn WorldStatistics,
        player: PlayerId,
    ) -> bool {
        self.requirements_of(dependent).all(|dep| {
            dep.fits(
                stats.total_count(dep.required, player),
                stats.total_count(dep.dependent, player),
            )
        })
    }
}

impl Default for DependencyTable {
    fn default() -> Self {
        use BuildingType::*;
        Self::new(vec![
            BuildingDependency::new(Ironmine, Coalmine, 1.0),
            BuildingDependency::new(Ironmelt, Coalmine, 1.0),
            BuildingDependency::new(Ironmelt, Ironmine, 1.0),
            BuildingDependency::new(Weaponsmith, Ironmelt, 1.0),
            BuildingDependency::new(Barrack, Weaponsmith, 3.0),
            BuildingDependency::new(Mill, Farm, 2.0),
            BuildingDependency::new(Baker, Farm, 2.0),
            BuildingDependency::new(Waterworks, Farm, 2.0),
            BuildingDependency::new(Slaughterhouse, Farm, 3.0),
            BuildingDependency::new(PigFarm, Farm, 1.0),
            BuildingDependency::new(Temple, Winegrower, 1.0),
            BuildingDependency::new(Sawmill, Lumberjack, 8.0 / 3.0),
            BuildingDependency::new(Forester, Lumberjack, 2.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SnapshotBuilder;
    use proptest::prelude::*;
    use BuildingType::*;

    #[test]
    fn test_smelter_needs_twice_the_mines() {
        let table = DependencyTable::new(vec![BuildingDependency::new(Ironmelt, Ironmine, 2.0)]);
        let p = PlayerId(0);
        let snapshot = SnapshotBuilder::new(p)
            .with_building(Ironmine, 0, 0)
            .with_building(Ironmine, 2, 0)
            .with_building(Ironmine, 4, 0)
            .with_building(Ironmelt, 0, 4)
            .with_construction_site(Ironmelt, 2, 4)
            .build();

        // 3 >= 2 * 2.0 is false
        assert!(!table.fulfilled(Ironmelt, &snapshot, p));
    }

    #[test]
    fn test_all_entries_must_hold() {
        let p = PlayerId(0);
        let snapshot = SnapshotBuilder::new(p)
            .with_building(Coalmine, 0, 0)
            .with_building(Ironmelt, 0, 4)
            .build();

        // Enough coal, but no iron mine for the existing melt.
        assert!(!DependencyTable::default().fulfilled(Ironmelt, &snapshot, p));
    }

    #[test]
    fn test_unlisted_type_always_passes() {
        let p = PlayerId(0);
        let snapshot = SnapshotBuilder::new(p).with_building(Stock, 0, 0).build();
        assert!(DependencyTable::default().fulfilled(Stock, &snapshot, p));
        assert!(DependencyTable::new(vec![]).fulfilled(Ironmelt, &snapshot, p));
    }

    #[test]
    fn test_first_building_of_a_chain() {
        let p = PlayerId(0);
        let snapshot = SnapshotBuilder::new(p).build();
        // 0 >= 0 * ratio: the very first dependent may be placed.
        assert!(DependencyTable::default().fulfilled(Sawmill, &snapshot, p));
    }

    #[test]
    fn test_table_from_json() {
        let table: DependencyTable =
            serde_json::from_str(r#"[{"dependent":"MILL","required":"FARM","ratio":4.0}]"#)
                .unwrap();
        assert_eq!(table.requirements_of(Mill).count(), 1);
        assert_eq!(table.requirements_of(Baker).count(), 0);
    }

    proptest! {
        #[test]
        fn prop_more_upstream_never_breaks_a_passing_ratio(
            required in 0usize..200,
            extra in 0usize..200,
            dependent in 0usize..100,
            ratio in 0.0f32..10.0
        ) {
            let dep = BuildingDependency::new(Ironmelt, Ironmine, ratio);
            if dep.fits(required, dependent) {
                prop_assert!(dep.fits(required + extra, dependent));
            }
        }
    }
}
