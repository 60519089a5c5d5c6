use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use settler_ai::{
    AiConfig, BuildingInstance, BuildingType, Deposit, MobileUnit, PlayerId, PlayerState,
    Position, ResourceDeposit, ResourceType, StaticEconomy, UnitAction, UnitId, UnitRole,
    WorldSnapshot,
};
use std::path::Path;

/// Starting world plus the economy every computer player follows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub world: WorldSnapshot,
    #[serde(default)]
    pub economy: StaticEconomy,
}

pub fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    let Some(path) = path else {
        log::info!("No scenario given, using the built-in two-player map");
        return Ok(default_scenario());
    };

    log::info!("Loading scenario from {:?}", path);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse scenario {}", path.display()))?;
    log::info!(
        "Loaded {} players, {} buildings, {} units",
        scenario.world.players.len(),
        scenario.world.buildings.len(),
        scenario.world.units.len()
    );
    Ok(scenario)
}

pub fn load_config(path: Option<&Path>) -> Result<AiConfig> {
    match path {
        Some(path) => {
            let config = AiConfig::load(path)?;
            log::info!("Loaded AI config from {:?}", path);
            Ok(config)
        }
        None => Ok(AiConfig::default()),
    }
}

/// Two players on opposite corners, each with a handful of bearers, a
/// swordsman, a tower and some stone and ore nearby.
pub fn default_scenario() -> Scenario {
    let mut world = WorldSnapshot::default();
    let mut next_id = 1;

    for (index, center) in [Position::new(20, 20), Position::new(80, 80)]
        .into_iter()
        .enumerate()
    {
        let player = PlayerId(index as u8);
        let mut state = PlayerState::new(player);
        state.partition_position = Some(center);
        state.border = square_border(center, 12);
        world.players.push(state);

        let mut tower = BuildingInstance::finished(
            player,
            BuildingType::Tower,
            Position::new(center.x - 4, center.y - 4),
        );
        tower.occupied = true;
        world.buildings.push(tower);

        for i in 0..14 {
            world.units.push(MobileUnit {
                id: UnitId(next_id),
                owner: player,
                position: Position::new(center.x + i % 5, center.y - 2),
                role: UnitRole::Bearer,
                action: UnitAction::Idle,
            });
            next_id += 1;
        }
        world.units.push(MobileUnit {
            id: UnitId(next_id),
            owner: player,
            position: Position::new(center.x - 3, center.y - 3),
            role: UnitRole::Swordsman,
            action: UnitAction::Idle,
        });
        next_id += 1;

        for dx in [6, 7, 8] {
            world.stones.push(Deposit {
                position: Position::new(center.x + dx, center.y + 6),
                owner: Some(player),
            });
        }
        world.resources.push(ResourceDeposit {
            resource: ResourceType::Coal,
            position: Position::new(center.x - 8, center.y + 5),
            owner: Some(player),
        });
        world.resources.push(ResourceDeposit {
            resource: ResourceType::Ironore,
            position: Position::new(center.x + 18, center.y),
            owner: None,
        });
    }

    Scenario {
        world,
        economy: StaticEconomy::default(),
    }
}

fn square_border(center: Position, radius: i16) -> Vec<Position> {
    let mut border = Vec::new();
    for d in (-radius..=radius).step_by(4) {
        border.push(Position::new(center.x + d, center.y - radius));
        border.push(Position::new(center.x + d, center.y + radius));
        border.push(Position::new(center.x - radius, center.y + d));
        border.push(Position::new(center.x + radius, center.y + d));
    }
    border.sort();
    border.dedup();
    border
}
