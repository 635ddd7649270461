//! Text formatting for the battle overlay, the status strip, and event log entries.

use kanto::format_seed;
use overworld::{Battle, Direction, Game, LogEvent, TransitionKind};

pub const ATTACK_PROMPT: &str = "Press A to attack";
pub const BATTLE_OVER_PROMPT: &str = "Battle over! Press SPACE to continue.";

pub fn player_hp_line(battle: &Battle) -> String {
    let player = battle.player();
    format!("{} HP: {}/{}", player.species, player.hp, player.max_hp)
}

pub fn opponent_hp_line(battle: &Battle) -> String {
    let opponent = battle.opponent();
    format!("Wild {} HP: {}/{}", opponent.species, opponent.hp, opponent.max_hp)
}

/// The prompt under the battle message, or `None` once the battle is over.
pub fn battle_prompt(battle: &Battle) -> Option<&'static str> {
    if battle.is_over() { None } else { Some(ATTACK_PROMPT) }
}

pub fn status_text(game: &Game) -> String {
    let pos = game.player().pos();
    let stats = game.stats();
    format!(
        "{} ({}, {})  tick {}  seed {}  won {} lost {}",
        game.current_map().name,
        pos.x,
        pos.y,
        game.current_tick(),
        format_seed(game.seed()),
        stats.battles_won,
        stats.battles_lost
    )
}

fn direction_word(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "north",
        Direction::Down => "south",
        Direction::Left => "west",
        Direction::Right => "east",
    }
}

pub fn event_log_line(event: &LogEvent) -> String {
    match event {
        LogEvent::StepBlocked { direction, at } => {
            format!("Blocked going {} at ({}, {})", direction_word(*direction), at.x, at.y)
        }
        LogEvent::EncounterStarted { map, species } => {
            format!("A wild {species} appeared in {map}!")
        }
        LogEvent::MapChanged { to, via: TransitionKind::Door, .. } => format!("Entered {to}"),
        LogEvent::MapChanged { to, via: TransitionKind::Edge(direction), .. } => {
            format!("Headed {} to {to}", direction_word(*direction))
        }
        LogEvent::PlayerAttacked { damage, opponent_hp } => {
            format!("You hit for {damage} (foe HP {opponent_hp})")
        }
        LogEvent::OpponentAttacked { damage, player_hp } => {
            format!("Foe hit for {damage} (your HP {player_hp})")
        }
        LogEvent::BattleEnded { player_won: true } => "Battle won".to_string(),
        LogEvent::BattleEnded { player_won: false } => "Battle lost".to_string(),
        LogEvent::BattleDismissed => "Back to exploring".to_string(),
    }
}
