//! Axis-aligned rectangles in world units.

use serde::{Deserialize, Serialize};

use crate::types::{Pos, TILE_SIZE};

/// Rectangle anchored at its top-left corner. Serialized as `[x, y, w, h]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// The tile-sized hitbox whose top-left corner is `pos`.
    pub const fn tile_at(pos: Pos) -> Self {
        Self::new(pos.x, pos.y, TILE_SIZE, TILE_SIZE)
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn top_left(&self) -> Pos {
        Pos { x: self.x, y: self.y }
    }

    pub const fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// True when the interiors overlap. Touching edges and empty rectangles never intersect.
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// True when `self` lies entirely inside `bounds`.
    pub const fn is_within(&self, bounds: &Rect) -> bool {
        self.left() >= bounds.left()
            && self.top() >= bounds.top()
            && self.right() <= bounds.right()
            && self.bottom() <= bounds.bottom()
    }
}

impl From<[i32; 4]> for Rect {
    fn from([x, y, w, h]: [i32; 4]) -> Self {
        Self::new(x, y, w, h)
    }
}

impl From<Rect> for [i32; 4] {
    fn from(rect: Rect) -> Self {
        [rect.x, rect.y, rect.w, rect.h]
    }
}

/// Width and height of the visible screen; edge exits are measured against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub width: i32,
    pub height: i32,
}

impl ScreenBounds {
    pub const fn as_rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}
