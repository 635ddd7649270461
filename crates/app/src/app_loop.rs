use macroquad::prelude::KeyCode;
use overworld::{Game, GameError, InputJournal, InputRecord, TickInput};

pub const TICKS_PER_SECOND: u32 = 30;
pub const TICK_SECONDS: f32 = 1.0 / TICKS_PER_SECOND as f32;

/// A long frame (window drag, debugger pause) catches up at most this many ticks.
const MAX_TICKS_PER_FRAME: u32 = 4;

/// Slack for rounding when frame times are summed.
const TICK_EPSILON: f32 = 1e-6;

pub const KEY_LEFT: KeyCode = KeyCode::Left;
pub const KEY_RIGHT: KeyCode = KeyCode::Right;
pub const KEY_UP: KeyCode = KeyCode::Up;
pub const KEY_DOWN: KeyCode = KeyCode::Down;
pub const KEY_ATTACK: KeyCode = KeyCode::A;
pub const KEY_DISMISS: KeyCode = KeyCode::Space;
pub const KEY_QUIT: KeyCode = KeyCode::Escape;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Running,
    Quit,
}

pub struct AppState {
    pub mode: AppMode,
    accumulator: f32,
    dismiss_latched: bool,
    journal: InputJournal,
    /// Records added to the journal during the current frame's `tick()` call.
    /// Drained by the caller after each tick to persist to the journal file.
    pub accepted_inputs: Vec<InputRecord>,
}

impl AppState {
    pub fn new(journal: InputJournal) -> Self {
        Self {
            mode: AppMode::default(),
            accumulator: 0.0,
            dismiss_latched: false,
            journal,
            accepted_inputs: Vec::new(),
        }
    }

    pub fn journal(&self) -> &InputJournal {
        &self.journal
    }

    /// Feeds one rendered frame into the fixed-rate simulation and returns how many
    /// ticks ran. Held keys are sampled for every tick of the frame; a dismiss press
    /// is kept until a tick consumes it.
    pub fn tick(
        &mut self,
        game: &mut Game,
        frame_seconds: f32,
        keys_down: &[KeyCode],
        keys_pressed: &[KeyCode],
    ) -> Result<u32, GameError> {
        self.accepted_inputs.clear();
        if self.mode == AppMode::Quit {
            return Ok(0);
        }
        if keys_pressed.contains(&KEY_QUIT) {
            self.mode = AppMode::Quit;
            return Ok(0);
        }
        if keys_pressed.contains(&KEY_DISMISS) {
            self.dismiss_latched = true;
        }

        let max_backlog = TICK_SECONDS * MAX_TICKS_PER_FRAME as f32;
        self.accumulator = (self.accumulator + frame_seconds.max(0.0)).min(max_backlog);

        let mut ticks = 0;
        while self.accumulator + TICK_EPSILON >= TICK_SECONDS {
            self.accumulator = (self.accumulator - TICK_SECONDS).max(0.0);
            let input = tick_input_from_keys(keys_down, self.dismiss_latched);
            self.dismiss_latched = false;
            if let Some(record) = self.journal.append_input(game.current_tick(), input) {
                self.accepted_inputs.push(record.clone());
            }
            game.tick(input)?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Closes the journal at the current tick. Returns the stop record to persist.
    pub fn finish(&mut self, game: &Game) -> Option<InputRecord> {
        if self.journal.is_stopped() {
            return None;
        }
        self.journal.append_stop(game.current_tick()).cloned()
    }
}

pub fn tick_input_from_keys(keys_down: &[KeyCode], dismiss: bool) -> TickInput {
    TickInput {
        left: keys_down.contains(&KEY_LEFT),
        right: keys_down.contains(&KEY_RIGHT),
        up: keys_down.contains(&KEY_UP),
        down: keys_down.contains(&KEY_DOWN),
        attack: keys_down.contains(&KEY_ATTACK),
        dismiss,
    }
}
