//! Window configuration for the desktop app.

use crate::game_layout::window_size;
use kanto::APP_NAME;
use macroquad::window::Conf;
use overworld::{MapRegistry, ScreenBounds};

/// Used only when the shipped registry fails to load; startup reports that error right after.
const FALLBACK_SCREEN: ScreenBounds = ScreenBounds { width: 600, height: 400 };

pub fn build_window_conf() -> Conf {
    let screen =
        MapRegistry::builtin().map(|registry| registry.world().screen()).unwrap_or(FALLBACK_SCREEN);
    let (window_width, window_height) = window_size(screen);
    Conf {
        window_title: APP_NAME.to_owned(),
        window_width,
        window_height,
        // World coordinates map 1:1 to pixels.
        window_resizable: false,
        high_dpi: true,
        ..Default::default()
    }
}
