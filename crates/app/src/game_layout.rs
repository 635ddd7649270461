//! Screen regions: the world view at the top, the status strip under it.

use overworld::ScreenBounds;

/// Height of the strip that shows position, record and the latest events.
pub const STATUS_STRIP_HEIGHT: f32 = 96.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLayout {
    pub world: PanelRect,
    pub status: PanelRect,
}

/// The world is drawn 1:1 in world units, so its panel is exactly the screen size.
pub fn frame_layout(screen: ScreenBounds) -> FrameLayout {
    let width = screen.width as f32;
    let height = screen.height as f32;
    FrameLayout {
        world: PanelRect { x: 0.0, y: 0.0, width, height },
        status: PanelRect { x: 0.0, y: height, width, height: STATUS_STRIP_HEIGHT },
    }
}

/// Window size that fits the whole layout.
pub fn window_size(screen: ScreenBounds) -> (i32, i32) {
    let layout = frame_layout(screen);
    let bottom = layout.status.y + layout.status.height;
    (layout.world.width.ceil() as i32, bottom.ceil() as i32)
}
