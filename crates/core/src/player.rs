//! The walking player: grid movement with collision and the wild-encounter roll.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

use crate::battle::Battle;
use crate::geometry::Rect;
use crate::map::Map;
use crate::types::{Pos, TickInput};

/// Default chance, in percent, that a step onto grass starts a battle.
pub const ENCOUNTER_CHANCE_PERCENT: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pos: Pos,
    pub in_battle: bool,
}

impl Player {
    pub fn new(pos: Pos) -> Self {
        Self { pos, in_battle: false }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn hitbox(&self) -> Rect {
        Rect::tile_at(self.pos)
    }

    /// Moves by `(dx, dy)` unless the destination hitbox hits an obstacle.
    pub fn move_by(&mut self, dx: i32, dy: i32, map: &Map) -> bool {
        let candidate = self.hitbox().translated(dx, dy);
        if map.check_collision(&candidate) {
            return false;
        }
        self.pos = candidate.top_left();
        true
    }

    /// Teleports to `pos`; the hitbox follows from the new position.
    pub fn place_at(&mut self, pos: Pos) {
        self.pos = pos;
    }

    /// One overworld step. Returns a new battle when the step lands on grass and the roll hits.
    pub fn update(
        &mut self,
        input: &TickInput,
        map: &Map,
        rng: &mut ChaCha8Rng,
        encounter_chance_percent: u32,
    ) -> Option<Battle> {
        if self.in_battle {
            return None;
        }
        let direction = input.direction()?;
        let (dx, dy) = direction.step();
        if !self.move_by(dx, dy, map) || !map.is_encounter_zone(&self.hitbox()) {
            return None;
        }
        if roll_percent(rng) > encounter_chance_percent {
            return None;
        }
        // Grass with nobody living in it never starts a battle.
        let species = pick(rng, &map.wild_roster)?;
        self.in_battle = true;
        Some(Battle::wild(species))
    }
}

/// Uniform integer in `1..=100`.
pub fn roll_percent(rng: &mut ChaCha8Rng) -> u32 {
    (rng.next_u64() % 100) as u32 + 1
}

fn pick<'a>(rng: &mut ChaCha8Rng, roster: &'a [String]) -> Option<&'a str> {
    if roster.is_empty() {
        return None;
    }
    let index = (rng.next_u64() % roster.len() as u64) as usize;
    roster.get(index).map(String::as_str)
}
