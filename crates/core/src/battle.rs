//! Turn-based wild battle. The session owns its state machine; callers only forward
//! input and ask whether it is over.

use crate::types::LogEvent;

/// Flat amount subtracted from every attack.
pub const FLAT_DEFENSE: i32 = 2;

pub const STARTER_SPECIES: &str = "Charmander";
pub const STARTER_MAX_HP: i32 = 20;
pub const STARTER_ATTACK: i32 = 10;
pub const WILD_MAX_HP: i32 = 15;
pub const WILD_ATTACK: i32 = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combatant {
    pub species: String,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
}

impl Combatant {
    pub fn new(species: impl Into<String>, max_hp: i32, attack: i32) -> Self {
        Self { species: species.into(), hp: max_hp, max_hp, attack }
    }

    pub fn starter() -> Self {
        Self::new(STARTER_SPECIES, STARTER_MAX_HP, STARTER_ATTACK)
    }

    /// Wild opponents share one stat line; the species only changes the name.
    pub fn wild(species: &str) -> Self {
        Self::new(species, WILD_MAX_HP, WILD_ATTACK)
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    /// Damage this combatant deals per hit. Never negative, so an attack can't heal.
    pub fn damage(&self) -> i32 {
        (self.attack - FLAT_DEFENSE).max(0)
    }

    fn take_hit(&mut self, damage: i32) {
        self.hp = (self.hp - damage).max(0);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    PlayerTurn,
    EnemyTurn,
    Over { player_won: bool },
}

/// Actions a battle accepts in one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BattleInput {
    pub attack: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Battle {
    player: Combatant,
    opponent: Combatant,
    phase: BattlePhase,
    message: String,
}

impl Battle {
    pub fn new(player: Combatant, opponent: Combatant) -> Self {
        let message = format!("A wild {} appeared!", opponent.species);
        Self { player, opponent, phase: BattlePhase::PlayerTurn, message }
    }

    pub fn wild(species: &str) -> Self {
        Self::new(Combatant::starter(), Combatant::wild(species))
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn opponent(&self) -> &Combatant {
        &self.opponent
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, BattlePhase::Over { .. })
    }

    pub fn player_won(&self) -> bool {
        matches!(self.phase, BattlePhase::Over { player_won: true })
    }

    /// Applies the player's action. Only an attack during the player's turn does anything.
    pub fn handle_input(&mut self, input: BattleInput) -> Option<LogEvent> {
        if self.phase != BattlePhase::PlayerTurn || !input.attack {
            return None;
        }
        let damage = self.player.damage();
        self.opponent.take_hit(damage);
        if self.opponent.is_fainted() {
            self.message = format!("Wild {} fainted!", self.opponent.species);
            self.phase = BattlePhase::Over { player_won: true };
        } else {
            self.message = format!("{} dealt {damage} damage!", self.player.species);
            self.phase = BattlePhase::EnemyTurn;
        }
        Some(LogEvent::PlayerAttacked { damage, opponent_hp: self.opponent.hp })
    }

    /// Resolves a pending enemy turn; does nothing in any other phase.
    pub fn update(&mut self) -> Option<LogEvent> {
        if self.phase != BattlePhase::EnemyTurn {
            return None;
        }
        let damage = self.opponent.damage();
        self.player.take_hit(damage);
        if self.player.is_fainted() {
            self.message = format!("Your {} fainted!", self.player.species);
            self.phase = BattlePhase::Over { player_won: false };
        } else {
            self.message = format!("{} dealt {damage} damage!", self.opponent.species);
            self.phase = BattlePhase::PlayerTurn;
        }
        Some(LogEvent::OpponentAttacked { damage, player_hp: self.player.hp })
    }
}
