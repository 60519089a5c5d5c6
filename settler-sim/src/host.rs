//! In-memory world that carries out AI commands with toy semantics.
//!
//! Construction finishes after a fixed number of ticks, finished living houses
//! spawn bearers, pioneers push the border out to where they were sent and
//! geologists claim nearby deposits. Invalid commands are dropped with a debug
//! log, like a real simulation would refuse them.

use settler_ai::{
    BuildingInstance, BuildingType, Command, MobileUnit, PlayerId, Position, UnitAction, UnitId,
    UnitRole, WorldSnapshot,
};

/// Construction progress added per tick.
const BUILD_RATE: f32 = 0.25;

/// Distance within which a geologist claims unowned deposits.
const GEOLOGIST_REACH: u32 = 6;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HostStats {
    pub applied: u64,
    pub rejected: u64,
    pub completed: u64,
}

pub struct World {
    pub snapshot: WorldSnapshot,
    next_unit_id: u32,
    pub stats: HostStats,
}

impl World {
    pub fn new(snapshot: WorldSnapshot) -> Self {
        let next_unit_id = snapshot.units.iter().map(|u| u.id.0).max().unwrap_or(0) + 1;
        Self {
            snapshot,
            next_unit_id,
            stats: HostStats::default(),
        }
    }

    pub fn living_players(&self) -> Vec<PlayerId> {
        self.snapshot
            .players
            .iter()
            .filter(|p| p.alive)
            .map(|p| p.id)
            .collect()
    }

    pub fn apply(&mut self, player: PlayerId, command: &Command) {
        let accepted = match command {
            Command::Construct { building, position } => {
                self.construct(player, *building, *position)
            }
            Command::Destroy { position } => self.destroy(player, *position),
            Command::SetWorkArea { building, target } => {
                self.set_work_area(player, *building, *target)
            }
            Command::MoveUnits { target, units } => self.move_units(player, *target, units),
            Command::ReassignRole { units, role } => self.reassign(player, units, *role),
        };
        if accepted {
            self.stats.applied += 1;
        } else {
            self.stats.rejected += 1;
            log::debug!("{} command rejected: {:?}", player, command);
        }
    }

    fn construct(&mut self, player: PlayerId, kind: BuildingType, position: Position) -> bool {
        let door = Position::new(position.x, position.y + 1);
        let blocked = self
            .snapshot
            .buildings
            .iter()
            .any(|b| b.position == position || b.position == door || b.door == position);
        if blocked {
            return false;
        }
        self.snapshot
            .buildings
            .push(BuildingInstance::construction_site(player, kind, position));
        true
    }

    fn destroy(&mut self, player: PlayerId, position: Position) -> bool {
        let before = self.snapshot.buildings.len();
        self.snapshot
            .buildings
            .retain(|b| !(b.owner == player && b.position == position));
        before != self.snapshot.buildings.len()
    }

    fn set_work_area(&mut self, player: PlayerId, building: Position, target: Position) -> bool {
        let Some(building) = self
            .snapshot
            .buildings
            .iter_mut()
            .find(|b| b.owner == player && b.position == building)
        else {
            return false;
        };
        log::trace!("{} work area moved to {}", building.kind, target);
        building.cannot_work = false;
        true
    }

    fn own_units<'a>(
        &'a mut self,
        player: PlayerId,
        ids: &'a [UnitId],
    ) -> impl Iterator<Item = &'a mut MobileUnit> {
        self.snapshot
            .units
            .iter_mut()
            .filter(move |u| u.owner == player && ids.contains(&u.id))
    }

    fn move_units(&mut self, player: PlayerId, target: Position, ids: &[UnitId]) -> bool {
        let mut moved = 0;
        let mut pioneers = 0;
        for unit in self.own_units(player, ids) {
            unit.action = UnitAction::Moving;
            unit.position = target;
            moved += 1;
            if unit.role == UnitRole::Pioneer {
                pioneers += 1;
            }
        }
        if pioneers > 0 {
            if let Some(state) = self.snapshot.player_mut(player) {
                if !state.border.contains(&target) {
                    state.border.push(target);
                }
            }
        }
        moved > 0
    }

    fn reassign(&mut self, player: PlayerId, ids: &[UnitId], role: UnitRole) -> bool {
        let mut changed = 0;
        for unit in self.own_units(player, ids) {
            unit.role = role;
            unit.action = UnitAction::Idle;
            changed += 1;
        }
        changed > 0
    }

    /// Advances construction and settles moving units. Called once per tick
    /// after every player's commands have been applied.
    pub fn advance(&mut self) {
        let mut spawned = Vec::new();
        for building in self.snapshot.buildings.iter_mut() {
            if building.construction_finished {
                continue;
            }
            building.state_progress = (building.state_progress + BUILD_RATE).min(1.0);
            if building.state_progress >= 1.0 {
                building.construction_finished = true;
                self.stats.completed += 1;
                log::debug!(
                    "{} finished {} at {}",
                    building.owner,
                    building.kind,
                    building.position
                );
                if let Some(beds) = building.kind.beds() {
                    spawned.push((building.owner, building.door, beds));
                }
            }
        }
        for (owner, door, beds) in spawned {
            for _ in 0..beds {
                self.spawn_bearer(owner, door);
            }
        }

        for unit in self.snapshot.units.iter_mut() {
            if unit.action == UnitAction::Moving {
                unit.action = UnitAction::Idle;
            }
        }
        self.settle_geologists();
    }

    fn spawn_bearer(&mut self, owner: PlayerId, position: Position) {
        self.snapshot.units.push(MobileUnit {
            id: UnitId(self.next_unit_id),
            owner,
            position,
            role: UnitRole::Bearer,
            action: UnitAction::Idle,
        });
        self.next_unit_id += 1;
    }

    fn settle_geologists(&mut self) {
        let geologists: Vec<(PlayerId, Position)> = self
            .snapshot
            .units
            .iter()
            .filter(|u| u.role == UnitRole::Geologist)
            .map(|u| (u.owner, u.position))
            .collect();
        for (owner, position) in geologists {
            for deposit in self.snapshot.resources.iter_mut() {
                if deposit.owner.is_none()
                    && deposit.position.on_grid_distance(position) <= GEOLOGIST_REACH
                {
                    deposit.owner = Some(owner);
                }
            }
        }
    }
}
