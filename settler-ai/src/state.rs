use serde::{Deserialize, Serialize};

/// Identifies one side of the game. Constant for an engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Engine-assigned unit id. Ordering is numeric, which pioneer batching relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Walking distance on the hex grid.
    ///
    /// Moving along the shared diagonal (both deltas with the same sign) costs
    /// one step per tile, so the larger delta wins; otherwise both axes add up.
    pub fn on_grid_distance(&self, other: Position) -> u32 {
        let dx = other.x as i32 - self.x as i32;
        let dy = other.y as i32 - self.y as i32;
        if dx * dy > 0 {
            dx.unsigned_abs().max(dy.unsigned_abs())
        } else {
            dx.unsigned_abs() + dy.unsigned_abs()
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildingType {
    // Housing
    SmallLivinghouse,
    MediumLivinghouse,
    BigLivinghouse,

    // Wood & stone
    Lumberjack,
    Sawmill,
    Stonecutter,
    Forester,

    // Food
    Farm,
    Mill,
    Baker,
    Waterworks,
    PigFarm,
    Slaughterhouse,
    Fisher,

    // Mining & metal
    Coalmine,
    Ironmine,
    Goldmine,
    Ironmelt,
    Goldmelt,
    Toolsmith,
    Weaponsmith,
    Barrack,

    // Religion
    Winegrower,
    Temple,
    BigTemple,

    // Storage
    Stock,

    // Military
    Tower,
    BigTower,
    Castle,
    Hospital,
}

impl BuildingType {
    pub const ALL: [BuildingType; 30] = [
        Self::SmallLivinghouse,
        Self::MediumLivinghouse,
        Self::BigLivinghouse,
        Self::Lumberjack,
        Self::Sawmill,
        Self::Stonecutter,
        Self::Forester,
        Self::Farm,
        Self::Mill,
        Self::Baker,
        Self::Waterworks,
        Self::PigFarm,
        Self::Slaughterhouse,
        Self::Fisher,
        Self::Coalmine,
        Self::Ironmine,
        Self::Goldmine,
        Self::Ironmelt,
        Self::Goldmelt,
        Self::Toolsmith,
        Self::Weaponsmith,
        Self::Barrack,
        Self::Winegrower,
        Self::Temple,
        Self::BigTemple,
        Self::Stock,
        Self::Tower,
        Self::BigTower,
        Self::Castle,
        Self::Hospital,
    ];

    const MILITARY: [BuildingType; 3] = [Self::Tower, Self::BigTower, Self::Castle];

    /// Maximum distance the building's workers draw input from. 0 if it has no work area.
    pub fn work_radius(self) -> u32 {
        match self {
            Self::Lumberjack => 10,
            Self::Stonecutter => 8,
            Self::Forester => 8,
            Self::Farm => 7,
            Self::Winegrower => 6,
            Self::Fisher => 8,
            _ => 0,
        }
    }

    /// Occupiable by soldiers; extends the border when garrisoned.
    pub fn is_military(self) -> bool {
        Self::MILITARY.contains(&self)
    }

    pub fn military_buildings() -> &'static [BuildingType] {
        &Self::MILITARY
    }

    /// Bearers housed by a living house; `None` for every other type.
    pub fn beds(self) -> Option<u32> {
        match self {
            Self::SmallLivinghouse => Some(10),
            Self::MediumLivinghouse => Some(30),
            Self::BigLivinghouse => Some(100),
            _ => None,
        }
    }
}

impl std::fmt::Display for BuildingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Stored goods the AI looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialType {
    Trunk,
    Plank,
    Stone,
    Coal,
    Ironore,
    Goldore,
    Iron,
    Gold,
    Sword,
}

/// Underground deposits a geologist can discover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Coal,
    Ironore,
    Goldore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitRole {
    Bearer,
    Pioneer,
    Geologist,
    Thief,
    Swordsman,
    Bowman,
    Pikeman,
    /// Any building-bound worker (lumberjack, baker, ...).
    Worker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitAction {
    #[default]
    Idle,
    Working,
    Moving,
}

/// A building as reported by the simulation. Read-only to the AI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInstance {
    pub owner: PlayerId,
    pub kind: BuildingType,
    pub position: Position,
    /// Entry point soldiers walk to when garrisoning.
    pub door: Position,
    #[serde(default)]
    pub construction_finished: bool,
    /// Military buildings only: at least one soldier inside.
    #[serde(default)]
    pub occupied: bool,
    /// The building has nothing left to work on (e.g. stones or trees exhausted).
    #[serde(default)]
    pub cannot_work: bool,
    /// Construction progress in `[0, 1]`.
    #[serde(default)]
    pub state_progress: f32,
}

impl BuildingInstance {
    /// A finished building whose door sits one tile below its origin.
    pub fn finished(owner: PlayerId, kind: BuildingType, position: Position) -> Self {
        Self {
            owner,
            kind,
            position,
            door: Position::new(position.x, position.y + 1),
            construction_finished: true,
            occupied: false,
            cannot_work: false,
            state_progress: 1.0,
        }
    }

    /// A freshly placed construction site.
    pub fn construction_site(owner: PlayerId, kind: BuildingType, position: Position) -> Self {
        Self {
            construction_finished: false,
            state_progress: 0.0,
            ..Self::finished(owner, kind, position)
        }
    }

    pub fn is_fully_built(&self) -> bool {
        self.construction_finished && self.state_progress >= 1.0
    }
}

/// A unit as reported by the simulation. Read-only to the AI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileUnit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub position: Position,
    pub role: UnitRole,
    #[serde(default)]
    pub action: UnitAction,
}

impl MobileUnit {
    pub fn is_idle(&self) -> bool {
        self.action == UnitAction::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_distance_same_sign_uses_max() {
        let a = Position::new(10, 10);
        assert_eq!(a.on_grid_distance(Position::new(13, 15)), 5);
        assert_eq!(a.on_grid_distance(Position::new(7, 8)), 3);
    }

    #[test]
    fn test_grid_distance_opposite_sign_adds() {
        let a = Position::new(10, 10);
        assert_eq!(a.on_grid_distance(Position::new(13, 8)), 5);
        assert_eq!(a.on_grid_distance(Position::new(10, 4)), 6);
        assert_eq!(a.on_grid_distance(a), 0);
    }

    #[test]
    fn test_building_properties() {
        assert!(BuildingType::Tower.is_military());
        assert!(BuildingType::Castle.is_military());
        assert!(!BuildingType::Barrack.is_military());
        assert_eq!(BuildingType::SmallLivinghouse.beds(), Some(10));
        assert_eq!(BuildingType::BigLivinghouse.beds(), Some(100));
        assert_eq!(BuildingType::Farm.beds(), None);
        assert!(BuildingType::Stonecutter.work_radius() > 0);
    }

    #[test]
    fn test_building_type_serde_names() {
        let json = serde_json::to_string(&BuildingType::PigFarm).unwrap();
        assert_eq!(json, "\"PIG_FARM\"");
        let back: BuildingType = serde_json::from_str("\"BIG_TEMPLE\"").unwrap();
        assert_eq!(back, BuildingType::BigTemple);
    }
}
