//! Keyboard input collection for one rendered frame.

use kanto::app_loop::{
    KEY_ATTACK, KEY_DISMISS, KEY_DOWN, KEY_LEFT, KEY_QUIT, KEY_RIGHT, KEY_UP,
};
use macroquad::prelude::{KeyCode, is_key_down, is_key_pressed};

/// Keys sampled as "held" on every simulation tick.
const HELD_KEYS: [KeyCode; 5] = [KEY_LEFT, KEY_RIGHT, KEY_UP, KEY_DOWN, KEY_ATTACK];

/// Keys that act once per press.
const PRESS_KEYS: [KeyCode; 2] = [KEY_DISMISS, KEY_QUIT];

#[derive(Default)]
pub struct FrameInput {
    pub keys_down: Vec<KeyCode>,
    pub keys_pressed: Vec<KeyCode>,
}

pub fn capture_frame_input() -> FrameInput {
    let keys_down = HELD_KEYS.into_iter().filter(|key| is_key_down(*key)).collect();
    let keys_pressed = PRESS_KEYS.into_iter().filter(|key| is_key_pressed(*key)).collect();
    FrameInput { keys_down, keys_pressed }
}
