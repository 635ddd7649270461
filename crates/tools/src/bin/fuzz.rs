use anyhow::{Result, ensure};
use clap::Parser;
use overworld::{Direction, Game, MapRegistry, TickInput};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 10_000)]
    ticks: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_input(rng: &mut ChaCha8Rng, in_battle: bool) -> TickInput {
    if in_battle {
        // Bias to attack so battles finish
        return choose(
            rng,
            &[TickInput::attack(), TickInput::attack(), TickInput::dismiss(), TickInput::default()],
        );
    }
    let direction =
        choose(rng, &[Direction::Up, Direction::Down, Direction::Left, Direction::Right]);
    TickInput::holding(direction)
}

fn check_invariants(game: &Game) -> Result<()> {
    let map = game.current_map();
    let hitbox = game.player().hitbox();
    ensure!(!map.check_collision(&hitbox), "player inside a wall on {} at {hitbox:?}", map.name);

    let screen = game.registry().world().screen().as_rect();
    ensure!(hitbox.is_within(&screen), "player left the screen on {} at {hitbox:?}", map.name);

    ensure!(
        game.player().in_battle == game.battle().is_some(),
        "player battle flag out of sync at tick {}",
        game.current_tick()
    );
    if let Some(battle) = game.battle() {
        for combatant in [battle.player(), battle.opponent()] {
            ensure!(
                (0..=combatant.max_hp).contains(&combatant.hp),
                "{} has {} of {} HP",
                combatant.species,
                combatant.hp,
                combatant.max_hp
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting Fuzz harness on seed {} for {} ticks...", args.seed, args.ticks);
    let registry = MapRegistry::builtin()?;
    let mut game = Game::new(args.seed, registry)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for _ in 0..args.ticks {
        let input = random_input(&mut rng, game.battle().is_some());
        game.tick(input)?;
        check_invariants(&game)?;
    }

    let stats = game.stats();
    println!(
        "Fuzzing completed successfully: {} steps, {} map changes, {} battles ({} won, {} lost), ended on {}.",
        stats.steps,
        stats.map_changes,
        stats.encounters,
        stats.battles_won,
        stats.battles_lost,
        game.current_map().name
    );
    Ok(())
}
