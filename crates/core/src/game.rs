use std::hash::Hasher;
use std::mem;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use xxhash_rust::xxh3::Xxh3;

use crate::battle::{Battle, BattleInput, BattlePhase};
use crate::geometry::Rect;
use crate::map::{Map, Transition};
use crate::player::Player;
use crate::registry::{MapId, MapRegistry};
use crate::types::{GameError, LogEvent, TickInput, TransitionKind};

/// Events kept in `Game::log()`. Once full, the older half is dropped.
pub const LOG_CAPACITY: usize = 256;

/// Running totals for one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub steps: u64,
    pub encounters: u32,
    pub battles_won: u32,
    pub battles_lost: u32,
    pub map_changes: u32,
}

pub struct Game {
    seed: u64,
    tick: u64,
    rng: ChaCha8Rng,
    registry: MapRegistry,
    current_map: MapId,
    player: Player,
    battle: Option<Battle>,
    log: Vec<LogEvent>,
    stats: SessionStats,
}

impl Game {
    pub fn new(seed: u64, registry: MapRegistry) -> Result<Self, GameError> {
        let current_map = registry.id_of(&registry.world().start_map)?;
        let player = Player::new(registry.world().start());
        Ok(Self {
            seed,
            tick: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            registry,
            current_map,
            player,
            battle: None,
            log: Vec::new(),
            stats: SessionStats::default(),
        })
    }

    /// Advances the session by one tick and returns the events it produced.
    ///
    /// While a battle is active the overworld is frozen: no movement, no encounter
    /// rolls, no transitions. Otherwise the player steps, may start a battle, and
    /// then a door entered by this step moves it to another map. A reached screen
    /// edge only counts while the player isn't standing on any door.
    pub fn tick(&mut self, input: TickInput) -> Result<&[LogEvent], GameError> {
        if self.log.len() >= LOG_CAPACITY {
            self.log.drain(..self.log.len() - LOG_CAPACITY / 2);
        }
        let first_event = self.log.len();
        if self.battle.is_some() {
            self.tick_battle(input);
        } else {
            self.tick_overworld(input)?;
        }
        self.tick += 1;
        Ok(&self.log[first_event..])
    }

    fn tick_battle(&mut self, input: TickInput) {
        let Some(battle) = self.battle.as_mut() else {
            return;
        };
        if battle.is_over() {
            if input.dismiss {
                self.battle = None;
                self.player.in_battle = false;
                self.log.push(LogEvent::BattleDismissed);
            }
            return;
        }

        // The enemy answers in the same tick the player attacked.
        self.log.extend(battle.handle_input(BattleInput { attack: input.attack }));
        self.log.extend(battle.update());

        if let BattlePhase::Over { player_won } = battle.phase() {
            if player_won {
                self.stats.battles_won += 1;
            } else {
                self.stats.battles_lost += 1;
            }
            self.log.push(LogEvent::BattleEnded { player_won });
        }
    }

    fn tick_overworld(&mut self, input: TickInput) -> Result<(), GameError> {
        let map = self.registry.map(self.current_map);
        let before = self.player.hitbox();
        let chance = self.registry.world().encounter_chance_percent;

        if let Some(battle) = self.player.update(&input, map, &mut self.rng, chance) {
            self.stats.encounters += 1;
            self.log.push(LogEvent::EncounterStarted {
                map: map.name.clone(),
                species: battle.opponent().species.clone(),
            });
            self.battle = Some(battle);
        }

        let after = self.player.hitbox();
        if after != before {
            self.stats.steps += 1;
        } else if let Some(direction) = input.direction() {
            // Holding a key against a wall reports the block once.
            let blocked = LogEvent::StepBlocked { direction, at: self.player.pos() };
            if self.log.last() != Some(&blocked) {
                self.log.push(blocked);
            }
        }

        // Standing on a door suppresses edge exits, even when the door doesn't fire.
        let pending = if map.resolve_door(&after).is_some() {
            entered_door(map, &before, &after).map(|to| (TransitionKind::Door, to.clone()))
        } else {
            let screen = self.registry.world().screen();
            map.resolve_edge_exit(&after, screen)
                .map(|(direction, to)| (TransitionKind::Edge(direction), to.clone()))
        };
        match pending {
            Some((via, to)) => self.apply_transition(via, to),
            None => Ok(()),
        }
    }

    fn apply_transition(&mut self, via: TransitionKind, to: Transition) -> Result<(), GameError> {
        let target = self.registry.id_of(&to.target)?;
        let from = mem::replace(&mut self.current_map, target);
        let spawn = to.spawn();
        self.player.place_at(spawn);
        self.stats.map_changes += 1;
        self.log.push(LogEvent::MapChanged {
            from: self.registry.map(from).name.clone(),
            to: to.target,
            via,
            spawn,
        });
        Ok(())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn registry(&self) -> &MapRegistry {
        &self.registry
    }

    pub fn current_map(&self) -> &Map {
        self.registry.map(self.current_map)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.tick);
        hasher.write(self.current_map().name.as_bytes());
        let pos = self.player.pos();
        hasher.write_i32(pos.x);
        hasher.write_i32(pos.y);
        hasher.write_u8(u8::from(self.player.in_battle));
        if let Some(battle) = &self.battle {
            hasher.write(battle.opponent().species.as_bytes());
            hasher.write_i32(battle.player().hp);
            hasher.write_i32(battle.opponent().hp);
            hasher.write_u8(match battle.phase() {
                BattlePhase::PlayerTurn => 0,
                BattlePhase::EnemyTurn => 1,
                BattlePhase::Over { player_won: true } => 2,
                BattlePhase::Over { player_won: false } => 3,
            });
        }
        hasher.write_u32(self.stats.battles_won);
        hasher.write_u32(self.stats.battles_lost);
        hasher.finish()
    }
}

/// The first door, in declaration order, that the step newly entered. Doors the
/// hitbox already overlapped before the step are skipped, not treated as a match.
fn entered_door<'a>(map: &'a Map, before: &Rect, after: &Rect) -> Option<&'a Transition> {
    map.door_transitions
        .iter()
        .find(|door| door.trigger.intersects(after) && !door.trigger.intersects(before))
        .map(|door| &door.to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::map::{Door, EdgeTransitions};
    use crate::registry::WorldConfig;
    use crate::types::{Direction, Pos};

    fn world(start_map: &str, start_x: i32, start_y: i32, chance: u32) -> WorldConfig {
        WorldConfig {
            screen_width: 600,
            screen_height: 400,
            start_map: start_map.to_string(),
            start_x,
            start_y,
            encounter_chance_percent: chance,
        }
    }

    fn town_and_house() -> Vec<Map> {
        let mut town = Map::new("Town", 600, 400);
        town.obstacles = vec![Rect::new(200, 100, 16, 16)];
        town.door_transitions = vec![Door {
            trigger: Rect::new(100, 100, 32, 32),
            to: Transition::new("House", 300, 350),
        }];
        town.edge_transitions = EdgeTransitions {
            up: Some(Transition::new("Field", 300, 380)),
            ..EdgeTransitions::default()
        };
        let mut house = Map::new("House", 600, 400);
        house.door_transitions = vec![Door {
            trigger: Rect::new(300, 350, 32, 16),
            to: Transition::new("Town", 120, 120),
        }];
        let mut field = Map::new("Field", 600, 400);
        field.encounter_zones = vec![Rect::new(300, 300, 16, 100)];
        field.wild_roster = vec!["Pidgey".to_string()];
        vec![town, house, field]
    }

    fn game_at(map: &str, x: i32, y: i32, chance: u32) -> Game {
        let registry = MapRegistry::new(world(map, x, y, chance), town_and_house())
            .expect("test world should validate");
        Game::new(7, registry).expect("start map exists")
    }

    #[test]
    fn starts_on_configured_map_and_spawn() {
        let game = game_at("Town", 300, 200, 10);
        assert_eq!(game.current_map().name, "Town");
        assert_eq!(game.player().pos(), Pos::new(300, 200));
        assert_eq!(game.current_tick(), 0);
        assert!(game.battle().is_none());
    }

    #[test]
    fn blocked_step_is_logged_and_tick_still_advances() {
        let mut game = game_at("Town", 200, 116, 10);
        let events = game.tick(TickInput::holding(Direction::Up)).expect("tick").to_vec();
        assert_eq!(
            events,
            vec![LogEvent::StepBlocked { direction: Direction::Up, at: Pos::new(200, 116) }]
        );
        assert_eq!(game.current_tick(), 1);
    }

    #[test]
    fn stepping_into_door_changes_map() {
        let mut game = game_at("Town", 132, 116, 10);
        let events = game.tick(TickInput::holding(Direction::Left)).expect("tick").to_vec();
        assert_eq!(
            events,
            vec![LogEvent::MapChanged {
                from: "Town".to_string(),
                to: "House".to_string(),
                via: TransitionKind::Door,
                spawn: Pos::new(300, 350),
            }]
        );
        assert_eq!(game.current_map().name, "House");
        assert_eq!(game.player().pos(), Pos::new(300, 350));
    }

    #[test]
    fn spawning_inside_return_door_does_not_bounce_back() {
        let mut game = game_at("Town", 132, 116, 10);
        game.tick(TickInput::holding(Direction::Left)).expect("tick");
        assert_eq!(game.current_map().name, "House");

        // Walking around inside the return door keeps the player in the house.
        game.tick(TickInput::holding(Direction::Right)).expect("tick");
        assert_eq!(game.current_map().name, "House");
        game.tick(TickInput::default()).expect("tick");
        assert_eq!(game.current_map().name, "House");

        // Leaving the door and stepping back in fires it.
        game.tick(TickInput::holding(Direction::Up)).expect("tick");
        game.tick(TickInput::holding(Direction::Down)).expect("tick");
        assert_eq!(game.current_map().name, "Town");
        assert_eq!(game.player().pos(), Pos::new(120, 120));
    }

    #[test]
    fn reaching_top_edge_uses_up_exit() {
        let mut game = game_at("Town", 300, 16, 10);
        let events = game.tick(TickInput::holding(Direction::Up)).expect("tick").to_vec();
        assert!(matches!(
            events.as_slice(),
            [LogEvent::MapChanged { via: TransitionKind::Edge(Direction::Up), .. }]
        ));
        assert_eq!(game.current_map().name, "Field");
        assert_eq!(game.player().pos(), Pos::new(300, 380));
    }

    #[test]
    fn door_wins_over_edge_on_the_same_tick() {
        let mut maps = town_and_house();
        maps[0].door_transitions.push(Door {
            trigger: Rect::new(400, 0, 16, 16),
            to: Transition::new("House", 300, 350),
        });
        let registry = MapRegistry::new(world("Town", 400, 16, 10), maps).expect("valid");
        let mut game = Game::new(1, registry).expect("start");
        game.tick(TickInput::holding(Direction::Up)).expect("tick");
        assert_eq!(game.current_map().name, "House");
    }

    #[test]
    fn standing_on_a_door_at_the_top_edge_ignores_the_up_exit() {
        let mut maps = town_and_house();
        maps[0].door_transitions.push(Door {
            trigger: Rect::new(280, 0, 48, 48),
            to: Transition::new("House", 300, 350),
        });
        let registry = MapRegistry::new(world("Town", 300, 16, 10), maps).expect("valid");
        let mut game = Game::new(1, registry).expect("start");

        // Already inside the door, so it doesn't fire, and the edge stays shut.
        let events = game.tick(TickInput::holding(Direction::Up)).expect("tick").to_vec();
        assert!(events.is_empty());
        assert_eq!(game.current_map().name, "Town");
        assert_eq!(game.player().pos(), Pos::new(300, 0));

        // Step clear of the door, then walk back into it.
        for _ in 0..3 {
            game.tick(TickInput::holding(Direction::Down)).expect("tick");
        }
        assert_eq!(game.player().pos(), Pos::new(300, 48));
        let events = game.tick(TickInput::holding(Direction::Up)).expect("tick").to_vec();
        assert!(matches!(
            events.as_slice(),
            [LogEvent::MapChanged { via: TransitionKind::Door, .. }]
        ));
        assert_eq!(game.current_map().name, "House");
    }

    #[test]
    fn newly_entered_door_fires_past_one_already_overlapped() {
        let mut maps = town_and_house();
        maps[0].door_transitions = vec![
            Door { trigger: Rect::new(100, 100, 64, 16), to: Transition::new("Field", 300, 380) },
            Door { trigger: Rect::new(140, 100, 16, 16), to: Transition::new("House", 300, 350) },
        ];
        let registry = MapRegistry::new(world("Town", 116, 100, 10), maps).expect("valid");
        let mut game = Game::new(1, registry).expect("start");

        game.tick(TickInput::holding(Direction::Right)).expect("tick");
        assert_eq!(game.player().pos(), Pos::new(300, 350));
        assert_eq!(game.current_map().name, "House");
    }

    #[test]
    fn holding_into_a_wall_logs_the_block_once() {
        let mut game = game_at("Town", 200, 116, 10);
        for _ in 0..9000 {
            game.tick(TickInput::holding(Direction::Up)).expect("tick");
        }
        assert_eq!(
            game.log(),
            [LogEvent::StepBlocked { direction: Direction::Up, at: Pos::new(200, 116) }]
        );
    }

    #[test]
    fn log_keeps_only_recent_events() {
        let mut maps = town_and_house();
        maps[0].obstacles.push(Rect::new(216, 116, 16, 16));
        let registry = MapRegistry::new(world("Town", 200, 116, 10), maps).expect("valid");
        let mut game = Game::new(1, registry).expect("start");
        // Walled in above and to the right; alternating keys logs a new block every tick.
        for step in 0..9000 {
            let direction = if step % 2 == 0 { Direction::Up } else { Direction::Right };
            game.tick(TickInput::holding(direction)).expect("tick");
            assert!(game.log().len() <= LOG_CAPACITY);
        }
        assert_eq!(
            game.log().last(),
            Some(&LogEvent::StepBlocked { direction: Direction::Right, at: Pos::new(200, 116) })
        );
    }

    #[test]
    fn certain_encounter_freezes_overworld_until_dismissed() {
        let mut game = game_at("Field", 300, 380, 100);
        let events = game.tick(TickInput::holding(Direction::Up)).expect("tick").to_vec();
        assert_eq!(
            events,
            vec![LogEvent::EncounterStarted {
                map: "Field".to_string(),
                species: "Pidgey".to_string(),
            }]
        );
        assert!(game.player().in_battle);
        let frozen_at = game.player().pos();

        game.tick(TickInput::holding(Direction::Up)).expect("tick");
        assert_eq!(game.player().pos(), frozen_at);

        // 15 -> 7, enemy hits back, 7 -> 0.
        let events = game.tick(TickInput::attack()).expect("tick").to_vec();
        assert_eq!(
            events,
            vec![
                LogEvent::PlayerAttacked { damage: 8, opponent_hp: 7 },
                LogEvent::OpponentAttacked { damage: 6, player_hp: 14 },
            ]
        );
        let events = game.tick(TickInput::attack()).expect("tick").to_vec();
        assert_eq!(
            events,
            vec![
                LogEvent::PlayerAttacked { damage: 8, opponent_hp: 0 },
                LogEvent::BattleEnded { player_won: true },
            ]
        );
        assert_eq!(game.stats().battles_won, 1);

        // An over battle stays on screen until dismissed.
        game.tick(TickInput::attack()).expect("tick");
        assert!(game.battle().is_some());
        let events = game.tick(TickInput::dismiss()).expect("tick").to_vec();
        assert_eq!(events, vec![LogEvent::BattleDismissed]);
        assert!(game.battle().is_none());
        assert!(!game.player().in_battle);

        game.tick(TickInput::holding(Direction::Left)).expect("tick");
        assert_eq!(game.player().pos(), Pos::new(frozen_at.x - 16, frozen_at.y));
    }

    #[test]
    fn zero_chance_never_starts_a_battle() {
        let mut game = game_at("Field", 300, 380, 0);
        for _ in 0..4 {
            game.tick(TickInput::holding(Direction::Up)).expect("tick");
        }
        assert!(game.battle().is_none());
        assert_eq!(game.stats().encounters, 0);
        assert_eq!(game.player().pos(), Pos::new(300, 316));
    }

    #[test]
    fn same_seed_and_inputs_give_same_snapshot() {
        let script = [
            TickInput::holding(Direction::Up),
            TickInput::holding(Direction::Left),
            TickInput::attack(),
            TickInput::holding(Direction::Up),
            TickInput::dismiss(),
        ];
        let run = || {
            let mut game = game_at("Field", 300, 380, 50);
            for input in script {
                game.tick(input).expect("tick");
            }
            game.snapshot_hash()
        };
        assert_eq!(run(), run());
    }
}
