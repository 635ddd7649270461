use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use overworld::journal_file::load_journal_from_file;
use overworld::{Map, MapRegistry, ReplayResult, replay_to_end};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a map file (the shipped maps when no path is given) and list its exits
    Validate {
        path: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-run a recorded input journal and print where the session ended
    Replay {
        /// Path to the JSONL journal file to replay
        #[arg(short, long)]
        journal: PathBuf,
        /// Map file the journal was recorded against (defaults to the shipped maps)
        #[arg(long)]
        maps: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct MapReport {
    name: String,
    obstacles: usize,
    encounter_zones: usize,
    wild_roster: Vec<String>,
    exits: Vec<String>,
}

impl MapReport {
    fn from_map(map: &Map) -> Self {
        let mut exits: Vec<String> = map
            .edge_transitions
            .iter()
            .map(|(direction, to)| {
                let edge = format!("{direction:?}").to_lowercase();
                format!("{edge} -> {} ({}, {})", to.target, to.x, to.y)
            })
            .collect();
        exits.extend(map.door_transitions.iter().map(|door| {
            let trigger = door.trigger;
            format!(
                "door [{}, {}, {}, {}] -> {} ({}, {})",
                trigger.x, trigger.y, trigger.w, trigger.h, door.to.target, door.to.x, door.to.y
            )
        }));
        Self {
            name: map.name.clone(),
            obstacles: map.obstacles.len(),
            encounter_zones: map.encounter_zones.len(),
            wild_roster: map.wild_roster.clone(),
            exits,
        }
    }
}

fn load_registry(path: Option<&Path>) -> Result<MapRegistry> {
    let Some(path) = path else {
        return MapRegistry::builtin().context("Shipped maps failed validation");
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read map file: {}", path.display()))?;
    MapRegistry::from_toml_str(&source)
        .with_context(|| format!("Map file failed validation: {}", path.display()))
}

fn validate(path: Option<&Path>, json: bool) -> Result<()> {
    let registry = load_registry(path)?;
    let reports: Vec<MapReport> = registry.maps().map(MapReport::from_map).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!(
            "{}: {} obstacles, {} grass patches, roster {:?}",
            report.name, report.obstacles, report.encounter_zones, report.wild_roster
        );
        for exit in &report.exits {
            println!("  {exit}");
        }
    }
    println!("{} maps OK, content hash {:016x}", registry.len(), registry.content_hash());
    Ok(())
}

fn replay(journal_path: &Path, maps: Option<&Path>) -> Result<()> {
    let loaded = load_journal_from_file(journal_path)
        .with_context(|| format!("Failed to load journal file: {}", journal_path.display()))?;
    if loaded.journal.inputs.is_empty() {
        bail!("Journal {} has no records", journal_path.display());
    }
    let registry = load_registry(maps)?;

    let result: ReplayResult = replay_to_end(&registry, &loaded.journal)
        .with_context(|| "Replay failed during execution")?;

    println!("Replay complete.");
    println!("Seed: {}", loaded.journal.seed);
    println!("Final Tick: {}", result.final_tick);
    println!(
        "Final Position: {} ({}, {})",
        result.final_map, result.final_position.x, result.final_position.y
    );
    println!("Battles: {} won, {} lost", result.battles_won, result.battles_lost);
    println!("Snapshot Hash: 0x{:016x}", result.snapshot_hash);

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Validate { path, json } => validate(path.as_deref(), json),
        Command::Replay { journal, maps } => replay(&journal, maps.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn report_lists_edge_and_door_exits() {
        let registry = load_registry(None).expect("shipped maps");
        let pallet = registry.get("Pallet Town").expect("Pallet Town");
        let report = MapReport::from_map(pallet);
        assert_eq!(report.exits[0], "up -> Route 1 (300, 380)");
        assert!(
            report
                .exits
                .iter()
                .any(|exit| exit.starts_with("door [100, 100, 50, 50] -> Pallet House 1"))
        );
    }

    #[test]
    fn bad_map_file_names_the_path() {
        let dir = env::temp_dir().join("tools-validate-missing.toml");
        let err = load_registry(Some(&dir)).unwrap_err();
        assert!(err.to_string().contains("tools-validate-missing.toml"));
    }
}
