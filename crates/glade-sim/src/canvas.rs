//! Consumer-side projection helpers.
//!
//! The representation pipeline publishes world-space records; a canvas
//! consumer needs them mapped into pixel coordinates and styled by
//! category. This module is the consumer contract only — no drawing.

use glade_core::MetaKind;

/// How a category is drawn: tile size multiplier and RGBA color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindStyle {
    /// Tile size multiplier relative to the base tile.
    pub size: f32,
    /// RGBA color, 0-255 per channel.
    pub color: [u8; 4],
}

/// Style for a category. Unknown or invalid kinds draw as the default
/// white unit tile.
pub fn kind_style(kind: MetaKind) -> KindStyle {
    match kind {
        MetaKind::Tree => KindStyle {
            size: 1.5,
            color: [0, 255, 0, 255],
        },
        MetaKind::Wisp => KindStyle {
            size: 1.0,
            color: [255, 255, 0, 255],
        },
        _ => KindStyle {
            size: 1.0,
            color: [255, 255, 255, 255],
        },
    }
}

/// Maps world-space locations onto a fixed-size canvas.
///
/// The world is the axis-aligned box `origin ± extent` (in x and y);
/// canvas size is derived from the extent and a pixels-per-unit scale.
/// Projected points are clamped to the canvas.
#[derive(Clone, Copy, Debug)]
pub struct CanvasProjection {
    /// World-space center of the mapped region.
    pub origin: [f32; 3],
    /// World-space half-size of the mapped region.
    pub extent: [f32; 3],
    /// Canvas size in pixels.
    pub canvas_size: [u32; 2],
}

impl CanvasProjection {
    /// Build a projection covering `origin ± extent` at `scale` pixels
    /// per world unit.
    pub fn new(origin: [f32; 3], extent: [f32; 3], scale: f32) -> Self {
        let canvas_size = [
            (scale * 2.0 * extent[0]).ceil().max(1.0) as u32,
            (scale * 2.0 * extent[1]).ceil().max(1.0) as u32,
        ];
        Self {
            origin,
            extent,
            canvas_size,
        }
    }

    /// Project a world location to canvas pixels, clamped to the canvas.
    pub fn project(&self, location: [f32; 3]) -> [f32; 2] {
        let mut out = [0.0; 2];
        for axis in 0..2 {
            let half = self.extent[axis];
            let alpha = if half > f32::EPSILON {
                ((location[axis] - (self.origin[axis] - half)) / (2.0 * half)).clamp(0.0, 1.0)
            } else {
                0.5
            };
            out[axis] = alpha * self.canvas_size[axis] as f32;
        }
        out
    }
}
