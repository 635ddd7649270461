use std::collections::BTreeSet;

use overworld::player::{ENCOUNTER_CHANCE_PERCENT, Player};
use overworld::{Direction, MapRegistry, Pos, TickInput};
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

const TRIALS: u32 = 1000;

/// Steps onto Route 1 grass `TRIALS` times and counts how many steps start a battle.
fn battles_started(seed: u64) -> u32 {
    let registry = MapRegistry::builtin().expect("valid");
    let route = registry.get("Route 1").expect("Route 1 ships");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut battles = 0;
    for _ in 0..TRIALS {
        let mut player = Player::new(Pos::new(100, 232));
        if player
            .update(&TickInput::holding(Direction::Up), route, &mut rng, ENCOUNTER_CHANCE_PERCENT)
            .is_some()
        {
            battles += 1;
        }
        assert_eq!(player.pos(), Pos::new(100, 216));
    }
    battles
}

#[test]
fn grass_encounter_rate_is_about_ten_percent() {
    for seed in [1, 42, 9001] {
        let battles = battles_started(seed);
        assert!(
            (60..=140).contains(&battles),
            "seed {seed}: {battles} battles in {TRIALS} grass steps"
        );
    }
}

#[test]
fn encounter_species_come_from_the_map_roster() {
    let registry = MapRegistry::builtin().expect("valid");
    let route = registry.get("Route 1").expect("Route 1 ships");
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut seen = BTreeSet::new();
    for _ in 0..200 {
        let mut player = Player::new(Pos::new(100, 232));
        if let Some(battle) =
            player.update(&TickInput::holding(Direction::Up), route, &mut rng, 100)
        {
            seen.insert(battle.opponent().species.clone());
        }
    }
    let roster: BTreeSet<String> = route.wild_roster.iter().cloned().collect();
    assert_eq!(seen, roster);
}
