pub mod battle;
pub mod game;
pub mod geometry;
pub mod journal;
pub mod journal_file;
pub mod map;
pub mod player;
pub mod registry;
pub mod replay;
pub mod types;

pub use battle::{Battle, BattleInput, BattlePhase, Combatant};
pub use game::{Game, LOG_CAPACITY, SessionStats};
pub use geometry::{Rect, ScreenBounds};
pub use journal::{InputJournal, InputPayload, InputRecord};
pub use map::{Door, EdgeTransitions, Map, Transition};
pub use player::Player;
pub use registry::{MapId, MapRegistry, RegistryError, WorldConfig};
pub use replay::*;
pub use types::*;
