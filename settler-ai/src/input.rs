use crate::state::{BuildingType, PlayerId, Position, UnitId, UnitRole};
use serde::{Deserialize, Serialize};

/// Commands issued by one player during one tick, in emission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInputs {
    pub player: PlayerId,
    pub commands: Vec<Command>,
}

impl PlayerInputs {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            commands: Vec::new(),
        }
    }
}

/// An intent for the simulation. Fire-and-forget: the simulation may refuse it
/// and the AI never learns the outcome directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // Buildings
    Construct {
        building: BuildingType,
        position: Position,
    },
    Destroy {
        position: Position,
    },
    /// Moves the work centre of the building at `building` to `target`.
    SetWorkArea {
        building: Position,
        target: Position,
    },

    // Units
    MoveUnits {
        target: Position,
        units: Vec<UnitId>,
    },
    ReassignRole {
        units: Vec<UnitId>,
        role: UnitRole,
    },
}

impl Command {
    /// Short name used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Construct { .. } => "construct",
            Command::Destroy { .. } => "destroy",
            Command::SetWorkArea { .. } => "set_work_area",
            Command::MoveUnits { .. } => "move_units",
            Command::ReassignRole { .. } => "reassign_role",
        }
    }
}

/// Destination of emitted commands.
///
/// Submission never fails from the AI's point of view; sinks that can fail
/// (e.g. writing to disk) deal with their own errors.
pub trait CommandSink {
    fn submit(&mut self, command: Command);
}

impl CommandSink for Vec<Command> {
    fn submit(&mut self, command: Command) {
        self.push(command);
    }
}

impl CommandSink for PlayerInputs {
    fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_is_tagged() {
        let cmd = Command::Destroy {
            position: Position::new(3, 4),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"type":"destroy","position":{"x":3,"y":4}}"#);
    }

    #[test]
    fn test_player_inputs_collects_in_order() {
        let mut inputs = PlayerInputs::new(PlayerId(1));
        inputs.submit(Command::Destroy {
            position: Position::new(1, 1),
        });
        inputs.submit(Command::ReassignRole {
            units: vec![UnitId(4)],
            role: UnitRole::Pioneer,
        });
        assert_eq!(inputs.commands.len(), 2);
        assert_eq!(inputs.commands[1].kind(), "reassign_role");
    }
}
