//! Axis-aligned rectangle collision
//!
//! Every entity in both games collides through its bounding rectangle. The
//! raw test is one-sided (`detect`), callers use the symmetric `overlaps`.
//! `ContactLatch` turns a continuous overlap into a single trigger per
//! contact, which pong needs for reflections.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle: top-left corner plus extent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Center point of the rectangle
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Do two closed intervals `[a, a + a_len]` and `[b, b + b_len]` meet?
#[inline]
fn spans_meet(a: f64, a_len: f64, b: f64, b_len: f64) -> bool {
    (a >= b && a <= b + b_len) || (a <= b && a + a_len >= b)
}

/// One-sided overlap test of `a` against `b`
///
/// Touching edges count as overlap. When `already_colliding` is set the
/// result is always false, which lets callers suppress repeat triggers.
pub fn detect(a: &Rect, b: &Rect, already_colliding: bool) -> bool {
    if already_colliding {
        return false;
    }
    spans_meet(a.x, a.w, b.x, b.w) && spans_meet(a.y, a.h, b.y, b.h)
}

/// Symmetric overlap test: `detect(a, b) || detect(b, a)`
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    detect(a, b, false) || detect(b, a, false)
}

/// Edge detector for a single pair of colliders
///
/// Fires once when contact starts and stays quiet while the rectangles remain
/// overlapped. Separation re-arms it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLatch {
    touching: bool,
}

impl ContactLatch {
    /// Feed this tick's rectangles; returns true only on the first tick of contact
    pub fn update(&mut self, a: &Rect, b: &Rect) -> bool {
        let fired = detect(a, b, self.touching) || detect(b, a, self.touching);
        self.touching = overlaps(a, b);
        fired
    }

    /// Whether the pair overlapped on the last update
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    pub fn reset(&mut self) {
        self.touching = false;
    }
}
