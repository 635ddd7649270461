//! Static map data and the collision, encounter and transition queries over it.

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, ScreenBounds};
use crate::types::{Direction, Pos};

/// Destination of a map change: target map plus the spawn point of the player's top-left corner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub target: String,
    pub x: i32,
    pub y: i32,
}

impl Transition {
    pub fn new(target: impl Into<String>, x: i32, y: i32) -> Self {
        Self { target: target.into(), x, y }
    }

    pub fn spawn(&self) -> Pos {
        Pos::new(self.x, self.y)
    }
}

/// Screen-edge exits. Only directions that lead somewhere are set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeTransitions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Transition>,
}

impl EdgeTransitions {
    pub fn get(&self, direction: Direction) -> Option<&Transition> {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
            Direction::Left => self.left.as_ref(),
            Direction::Right => self.right.as_ref(),
        }
    }

    pub fn set(&mut self, direction: Direction, transition: Transition) {
        let slot = match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        };
        *slot = Some(transition);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &Transition)> {
        Direction::EXIT_PRIORITY
            .into_iter()
            .filter_map(|direction| self.get(direction).map(|transition| (direction, transition)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub trigger: Rect,
    pub to: Transition,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    pub name: String,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    #[serde(default)]
    pub encounter_zones: Vec<Rect>,
    #[serde(default)]
    pub wild_roster: Vec<String>,
    #[serde(default)]
    pub edge_transitions: EdgeTransitions,
    #[serde(default)]
    pub door_transitions: Vec<Door>,
}

impl Map {
    /// An empty map of the given size, with no obstacles, grass or exits.
    pub fn new(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            obstacles: Vec::new(),
            encounter_zones: Vec::new(),
            wild_roster: Vec::new(),
            edge_transitions: EdgeTransitions::default(),
            door_transitions: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn check_collision(&self, rect: &Rect) -> bool {
        self.obstacles.iter().any(|obstacle| obstacle.intersects(rect))
    }

    pub fn is_encounter_zone(&self, rect: &Rect) -> bool {
        self.encounter_zones.iter().any(|zone| zone.intersects(rect))
    }

    /// True when stepping onto this map's grass can actually start a battle.
    pub fn has_encounters(&self) -> bool {
        !self.encounter_zones.is_empty() && !self.wild_roster.is_empty()
    }

    /// First door, in declaration order, whose trigger overlaps `rect`.
    pub fn resolve_door(&self, rect: &Rect) -> Option<&Door> {
        self.door_transitions.iter().find(|door| door.trigger.intersects(rect))
    }

    /// First screen edge reached by `player_rect` that has an exit, checked up, down, left, right.
    pub fn resolve_edge_exit(
        &self,
        player_rect: &Rect,
        screen: ScreenBounds,
    ) -> Option<(Direction, &Transition)> {
        Direction::EXIT_PRIORITY.into_iter().find_map(|direction| {
            let reached = match direction {
                Direction::Up => player_rect.top() <= 0,
                Direction::Down => player_rect.bottom() >= screen.height,
                Direction::Left => player_rect.left() <= 0,
                Direction::Right => player_rect.right() >= screen.width,
            };
            if !reached {
                return None;
            }
            self.edge_transitions.get(direction).map(|transition| (direction, transition))
        })
    }

    /// Every transition leaving this map, doors first.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.door_transitions
            .iter()
            .map(|door| &door.to)
            .chain(self.edge_transitions.iter().map(|(_, transition)| transition))
    }
}
