use std::error::Error;
use std::fmt;

use crate::game::Game;
use crate::journal::{InputJournal, InputPayload};
use crate::registry::MapRegistry;
use crate::types::{GameError, Pos, TickInput};

#[derive(Debug, PartialEq)]
pub enum ReplayError {
    /// The journal was recorded against different map data.
    ContentMismatch { expected: u64, found: u64 },
    /// A record asks for a tick the replay has already passed.
    OutOfOrder { seq: u64, tick: u64, current_tick: u64 },
    Game(GameError),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentMismatch { expected, found } => write!(
                f,
                "journal content hash {expected:016x} does not match registry {found:016x}"
            ),
            Self::OutOfOrder { seq, tick, current_tick } => write!(
                f,
                "record {seq} targets tick {tick} but replay is already at tick {current_tick}"
            ),
            Self::Game(err) => write!(f, "replay failed: {err}"),
        }
    }
}

impl Error for ReplayError {}

impl From<GameError> for ReplayError {
    fn from(err: GameError) -> Self {
        Self::Game(err)
    }
}

#[derive(Debug, PartialEq)]
pub struct ReplayResult {
    pub final_tick: u64,
    pub final_map: String,
    pub final_position: Pos,
    pub battles_won: u32,
    pub battles_lost: u32,
    pub snapshot_hash: u64,
}

/// Re-runs a recorded session from its seed and returns where it ended up.
pub fn replay_to_end(
    registry: &MapRegistry,
    journal: &InputJournal,
) -> Result<ReplayResult, ReplayError> {
    if journal.content_hash != registry.content_hash() {
        return Err(ReplayError::ContentMismatch {
            expected: journal.content_hash,
            found: registry.content_hash(),
        });
    }

    let mut game = Game::new(journal.seed, registry.clone())?;
    let final_tick = journal.final_tick();

    for record in &journal.inputs {
        if record.tick < game.current_tick() {
            return Err(ReplayError::OutOfOrder {
                seq: record.seq,
                tick: record.tick,
                current_tick: game.current_tick(),
            });
        }
        idle_until(&mut game, record.tick)?;
        match &record.payload {
            InputPayload::Controls(input) => {
                game.tick(*input)?;
            }
            InputPayload::Stop => break,
        }
    }
    idle_until(&mut game, final_tick)?;

    let stats = game.stats();
    Ok(ReplayResult {
        final_tick: game.current_tick(),
        final_map: game.current_map().name.clone(),
        final_position: game.player().pos(),
        battles_won: stats.battles_won,
        battles_lost: stats.battles_lost,
        snapshot_hash: game.snapshot_hash(),
    })
}

fn idle_until(game: &mut Game, tick: u64) -> Result<(), GameError> {
    while game.current_tick() < tick {
        game.tick(TickInput::default())?;
    }
    Ok(())
}
