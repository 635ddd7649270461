//! Command-line handling for the session seed and the input journal location.

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;

use crate::APP_NAME;

const JOURNAL_FILE_NAME: &str = "last_session.jsonl";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedChoice {
    Cli(u64),
    Generated(u64),
}

impl SeedChoice {
    pub fn value(self) -> u64 {
        match self {
            Self::Cli(seed) | Self::Generated(seed) => seed,
        }
    }
}

static GENERATED_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Seed for a session started without `--seed`; differs between calls in one process.
pub fn generate_runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(process::id());
    let counter = GENERATED_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.rotate_left(7);

    splitmix64(entropy)
}

pub fn resolve_seed_from_args(args: &[String], generated_seed: u64) -> Result<SeedChoice, String> {
    match single_flag(args, "--seed", true)? {
        Some(FlagValue::Value(raw)) => raw
            .parse::<u64>()
            .map(SeedChoice::Cli)
            .map_err(|_| format!("seed value '{raw}' must be a number")),
        Some(FlagValue::Bare) => Err("missing value for --seed".to_string()),
        None => Ok(SeedChoice::Generated(generated_seed)),
    }
}

/// Resolves where to record the input journal, if anywhere.
///
/// `--record` alone uses `default_path`; `--record=PATH` names the file.
pub fn resolve_record_path_from_args(
    args: &[String],
    default_path: Option<PathBuf>,
) -> Result<Option<PathBuf>, String> {
    match single_flag(args, "--record", false)? {
        Some(FlagValue::Value("")) => Err("missing value for --record=".to_string()),
        Some(FlagValue::Value(path)) => Ok(Some(PathBuf::from(path))),
        Some(FlagValue::Bare) => default_path.map(Some).ok_or_else(|| {
            "no default journal location on this system; use --record=PATH".to_string()
        }),
        None => Ok(None),
    }
}

/// Where a bare `--record` writes the journal, inside the user's data directory.
pub fn default_journal_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join(JOURNAL_FILE_NAME))
}

#[derive(Debug, PartialEq, Eq)]
enum FlagValue<'a> {
    Bare,
    Value(&'a str),
}

/// Finds the one occurrence of `flag` after the program name.
///
/// `--flag=VALUE` is always accepted. `--flag VALUE` only when `separate_value` is
/// set; otherwise a lone `--flag` is reported as [`FlagValue::Bare`].
fn single_flag<'a>(
    args: &'a [String],
    flag: &str,
    separate_value: bool,
) -> Result<Option<FlagValue<'a>>, String> {
    let inline_prefix = format!("{flag}=");
    let mut found = None;
    let mut rest = args.iter().skip(1);

    while let Some(argument) = rest.next() {
        let value = if argument == flag {
            if separate_value {
                let value = rest.next().ok_or_else(|| format!("missing value for {flag}"))?;
                FlagValue::Value(value.as_str())
            } else {
                FlagValue::Bare
            }
        } else if let Some(value) = argument.strip_prefix(inline_prefix.as_str()) {
            FlagValue::Value(value)
        } else {
            continue;
        };

        if found.replace(value).is_some() {
            return Err(format!("{flag} provided more than once"));
        }
    }

    Ok(found)
}

fn splitmix64(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 31)
}
