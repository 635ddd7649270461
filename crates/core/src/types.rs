use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Side length of one tile, and therefore of one movement step.
pub const TILE_SIZE: i32 = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Order in which simultaneously held movement keys are considered.
    pub const INPUT_PRIORITY: [Direction; 4] =
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    /// Order in which screen-edge exits are checked.
    pub const EXIT_PRIORITY: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// One-tile step in this direction.
    pub const fn step(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -TILE_SIZE),
            Direction::Down => (0, TILE_SIZE),
            Direction::Left => (-TILE_SIZE, 0),
            Direction::Right => (TILE_SIZE, 0),
        }
    }
}

/// Snapshot of the controls for one simulation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub down: bool,
    #[serde(default)]
    pub attack: bool,
    #[serde(default)]
    pub dismiss: bool,
}

impl TickInput {
    pub fn holding(direction: Direction) -> Self {
        let mut input = Self::default();
        match direction {
            Direction::Up => input.up = true,
            Direction::Down => input.down = true,
            Direction::Left => input.left = true,
            Direction::Right => input.right = true,
        }
        input
    }

    pub fn attack() -> Self {
        Self { attack: true, ..Self::default() }
    }

    pub fn dismiss() -> Self {
        Self { dismiss: true, ..Self::default() }
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// The single direction acted on this tick when several keys are held.
    pub fn direction(&self) -> Option<Direction> {
        Direction::INPUT_PRIORITY.into_iter().find(|direction| self.is_held(*direction))
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Door,
    Edge(Direction),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    StepBlocked { direction: Direction, at: Pos },
    EncounterStarted { map: String, species: String },
    MapChanged { from: String, to: String, via: TransitionKind, spawn: Pos },
    PlayerAttacked { damage: i32, opponent_hp: i32 },
    OpponentAttacked { damage: i32, player_hp: i32 },
    BattleEnded { player_won: bool },
    BattleDismissed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    UnknownMap(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::UnknownMap(name) => write!(f, "map '{name}' is not in the registry"),
        }
    }
}

impl Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_resolve_left_right_up_down() {
        let all = TickInput { left: true, right: true, up: true, down: true, ..TickInput::default() };
        assert_eq!(all.direction(), Some(Direction::Left));

        let no_left = TickInput { left: false, ..all };
        assert_eq!(no_left.direction(), Some(Direction::Right));

        let vertical = TickInput { up: true, down: true, ..TickInput::default() };
        assert_eq!(vertical.direction(), Some(Direction::Up));

        assert_eq!(TickInput::holding(Direction::Down).direction(), Some(Direction::Down));
        assert_eq!(TickInput::attack().direction(), None);
    }

    #[test]
    fn steps_are_exactly_one_tile() {
        for direction in Direction::EXIT_PRIORITY {
            let (dx, dy) = direction.step();
            assert_eq!(dx.abs() + dy.abs(), TILE_SIZE);
            assert!(dx == 0 || dy == 0);
        }
    }

    #[test]
    fn idle_input_is_default() {
        assert!(TickInput::default().is_idle());
        assert!(!TickInput::dismiss().is_idle());
    }
}
