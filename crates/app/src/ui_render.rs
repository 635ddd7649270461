//! Rendering for the overworld, the battle overlay, and the status strip.

use crate::game_layout::{FrameLayout, PanelRect};
use crate::ui_text::{
    BATTLE_OVER_PROMPT, battle_prompt, event_log_line, opponent_hp_line, player_hp_line,
    status_text,
};
use macroquad::prelude::*;
use overworld::{Battle, Game, LogEvent, Map, Rect};

const FLOOR_COLOR: Color = Color { r: 128.0 / 255.0, g: 128.0 / 255.0, b: 128.0 / 255.0, a: 1.0 };
const WALL_COLOR: Color = Color { r: 139.0 / 255.0, g: 69.0 / 255.0, b: 19.0 / 255.0, a: 1.0 };
const GRASS_COLOR: Color = Color { r: 0.0, g: 150.0 / 255.0, b: 0.0, a: 1.0 };
const DOOR_COLOR: Color = BLUE;
const PLAYER_COLOR: Color = YELLOW;
const OVERLAY_COLOR: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 180.0 / 255.0 };

const BATTLE_FONT_SIZE: f32 = 24.0;
const PLAYER_HP_AT: (f32, f32) = (50.0, 250.0);
const OPPONENT_HP_AT: (f32, f32) = (350.0, 50.0);
const MESSAGE_AT: (f32, f32) = (50.0, 300.0);
const PROMPT_AT: (f32, f32) = (50.0, 350.0);
const OVER_PROMPT_AT: (f32, f32) = (150.0, 200.0);

const BORDER_COLOR: Color = Color { r: 0.2, g: 0.2, b: 0.2, a: 1.0 };
const PANEL_PAD_X: f32 = 10.0;
const PANEL_PAD_Y: f32 = 20.0;
const STATUS_FONT_SIZE: f32 = 18.0;
const LOG_FONT_SIZE: f32 = 16.0;
const LOG_LINE_STEP: f32 = 16.0;
const STATUS_LOG_LINES: usize = 10;

pub fn draw_frame(game: &Game, layout: &FrameLayout) {
    clear_background(BLACK);
    draw_world(game.current_map(), layout.world);
    draw_world_rect(game.player().hitbox(), layout.world, PLAYER_COLOR);
    if let Some(battle) = game.battle() {
        draw_battle_overlay(battle, layout.world);
    }
    draw_status_strip(game, layout.status);
}

/// Grass is drawn after walls so zones that touch a wall stay visible.
fn draw_world(map: &Map, panel: PanelRect) {
    draw_rectangle(panel.x, panel.y, panel.width, panel.height, FLOOR_COLOR);
    for wall in &map.obstacles {
        draw_world_rect(*wall, panel, WALL_COLOR);
    }
    for grass in &map.encounter_zones {
        draw_world_rect(*grass, panel, GRASS_COLOR);
    }
    for door in &map.door_transitions {
        draw_world_rect(door.trigger, panel, DOOR_COLOR);
    }
}

fn draw_world_rect(rect: Rect, panel: PanelRect, color: Color) {
    let (x, y, width, height) = world_to_screen(rect, panel);
    draw_rectangle(x, y, width, height, color);
}

fn world_to_screen(rect: Rect, panel: PanelRect) -> (f32, f32, f32, f32) {
    (panel.x + rect.x as f32, panel.y + rect.y as f32, rect.w as f32, rect.h as f32)
}

fn draw_battle_overlay(battle: &Battle, panel: PanelRect) {
    draw_rectangle(panel.x, panel.y, panel.width, panel.height, OVERLAY_COLOR);
    for (text, at) in battle_overlay_lines(battle) {
        let (x, y) = text_origin(at, panel);
        draw_text(&text, x, y, BATTLE_FONT_SIZE, WHITE);
    }
}

/// Overlay text with its top-left corner in world coordinates.
fn battle_overlay_lines(battle: &Battle) -> Vec<(String, (f32, f32))> {
    let mut lines = vec![
        (player_hp_line(battle), PLAYER_HP_AT),
        (opponent_hp_line(battle), OPPONENT_HP_AT),
        (battle.message().to_string(), MESSAGE_AT),
    ];
    match battle_prompt(battle) {
        Some(prompt) => lines.push((prompt.to_string(), PROMPT_AT)),
        None => lines.push((BATTLE_OVER_PROMPT.to_string(), OVER_PROMPT_AT)),
    }
    lines
}

/// `draw_text` places the baseline, so shift down by the font size to anchor at the top.
fn text_origin(at: (f32, f32), panel: PanelRect) -> (f32, f32) {
    (panel.x + at.0, panel.y + at.1 + BATTLE_FONT_SIZE)
}

fn draw_status_strip(game: &Game, panel: PanelRect) {
    draw_rectangle_lines(panel.x, panel.y, panel.width, panel.height, 1.0, BORDER_COLOR);
    let text_x = panel.x + PANEL_PAD_X;
    let mut text_y = panel.y + PANEL_PAD_Y;
    draw_text(&status_text(game), text_x, text_y, STATUS_FONT_SIZE, WHITE);

    let lines = status_log_lines(game.log());
    let visible =
        fit_lines_to_panel(&lines, panel.height - PANEL_PAD_Y, LOG_LINE_STEP, PANEL_PAD_Y / 2.0);
    for line in visible {
        text_y += LOG_LINE_STEP;
        draw_text(&line, text_x, text_y, LOG_FONT_SIZE, LIGHTGRAY);
    }
}

/// The most recent events, newest first.
fn status_log_lines(log: &[LogEvent]) -> Vec<String> {
    let start = log.len().saturating_sub(STATUS_LOG_LINES);
    log[start..].iter().rev().map(event_log_line).collect()
}

fn fit_lines_to_panel(
    lines: &[String],
    panel_height: f32,
    line_step: f32,
    panel_pad_y: f32,
) -> Vec<String> {
    if line_step <= 0.0 {
        return Vec::new();
    }

    let usable_height = (panel_height - panel_pad_y).max(0.0);
    let max_lines = (usable_height / line_step).floor() as usize;
    if lines.len() <= max_lines {
        return lines.to_vec();
    }
    if max_lines == 0 {
        return Vec::new();
    }
    if max_lines == 1 {
        return vec![format!("... and {} more", lines.len())];
    }

    let hidden_count = lines.len() - (max_lines - 1);
    let mut fitted_lines = lines[..max_lines - 1].to_vec();
    fitted_lines.push(format!("... and {hidden_count} more"));
    fitted_lines
}
