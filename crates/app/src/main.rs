mod frame_input;
mod game_layout;
mod ui_render;
mod ui_text;
mod window_config;

use std::env;
use std::error::Error;
use std::process;

use frame_input::capture_frame_input;
use game_layout::frame_layout;
use kanto::app_loop::{AppMode, AppState};
use kanto::seed::{
    SeedChoice, default_journal_path, generate_runtime_seed, resolve_record_path_from_args,
    resolve_seed_from_args,
};
use kanto::{BUILD_ID, format_seed, format_snapshot_hash};
use macroquad::prelude::{get_frame_time, next_frame};
use macroquad::window::Conf;
use overworld::journal_file::JournalWriter;
use overworld::{Game, InputJournal, MapRegistry};
use ui_render::draw_frame;
use window_config::build_window_conf;

fn window_conf() -> Conf {
    build_window_conf()
}

#[macroquad::main(window_conf)]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let seed_choice = resolve_seed_from_args(&args, generate_runtime_seed())?;
    let record_path = resolve_record_path_from_args(&args, default_journal_path())?;
    if let SeedChoice::Generated(seed) = seed_choice {
        println!("seed: {} (pass --seed={} to replay this world)", format_seed(seed), seed);
    }
    let seed = seed_choice.value();

    let registry = MapRegistry::builtin()?;
    let content_hash = registry.content_hash();
    let mut game = Game::new(seed, registry)?;

    let mut journal = InputJournal::new(seed, content_hash);
    journal.build_id = BUILD_ID.to_string();
    let mut writer = match &record_path {
        Some(path) => Some(JournalWriter::create(path, seed, BUILD_ID, content_hash)?),
        None => None,
    };
    let mut app = AppState::new(journal);

    let layout = frame_layout(game.registry().world().screen());
    loop {
        let input = capture_frame_input();
        app.tick(&mut game, get_frame_time(), &input.keys_down, &input.keys_pressed)?;
        if let Some(writer) = writer.as_mut() {
            for record in app.accepted_inputs.drain(..) {
                writer.append_record(&record)?;
            }
        }
        if app.mode == AppMode::Quit {
            break;
        }

        draw_frame(&game, &layout);
        next_frame().await;
    }

    if let Some(stop) = app.finish(&game)
        && let Some(writer) = writer.as_mut()
    {
        writer.append_record(&stop)?;
    }
    println!(
        "seed={} tick={} snapshot={}",
        format_seed(game.seed()),
        game.current_tick(),
        format_snapshot_hash(game.snapshot_hash())
    );
    Ok(())
}
