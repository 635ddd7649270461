use serde::{Deserialize, Serialize};

use crate::types::TickInput;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub build_id: String,
    pub content_hash: u64,
    pub seed: u64,
    pub inputs: Vec<InputRecord>,
}

/// One recorded tick. Ticks without a record were idle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub tick: u64,
    pub payload: InputPayload,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputPayload {
    Controls(TickInput),
    /// The session ended before this tick ran.
    Stop,
}

impl InputJournal {
    pub fn new(seed: u64, content_hash: u64) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: "dev".to_string(),
            content_hash,
            seed,
            inputs: Vec::new(),
        }
    }

    fn next_seq(&self) -> u64 {
        self.inputs.len() as u64
    }

    /// Records the input applied on `tick`. Idle input is implied and not stored.
    pub fn append_input(&mut self, tick: u64, input: TickInput) -> Option<&InputRecord> {
        if input.is_idle() {
            return None;
        }
        self.push(tick, InputPayload::Controls(input))
    }

    pub fn append_stop(&mut self, tick: u64) -> Option<&InputRecord> {
        self.push(tick, InputPayload::Stop)
    }

    fn push(&mut self, tick: u64, payload: InputPayload) -> Option<&InputRecord> {
        let seq = self.next_seq();
        self.inputs.push(InputRecord { seq, tick, payload });
        self.inputs.last()
    }

    /// Number of ticks the recorded session ran.
    pub fn final_tick(&self) -> u64 {
        match self.inputs.last() {
            Some(InputRecord { tick, payload: InputPayload::Stop, .. }) => *tick,
            Some(record) => record.tick + 1,
            None => 0,
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.inputs.last(), Some(InputRecord { payload: InputPayload::Stop, .. }))
    }
}
