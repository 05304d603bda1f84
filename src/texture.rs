//! Deterministic procedural textures (grain, patterns, gradient fills).
//!
//! Everything here is a pure function of its inputs so texture generation
//! can never introduce frame-to-frame flicker: the same seed and size give
//! byte-identical buffers. All output is premultiplied RGBA8.

use crate::{
    color::{Rgba, css_color_or},
    gradient::LinearGradient,
    model::{PatternKind, PatternSpec},
};

/// Seeded FNV-1a 64, folded per pixel coordinate.
fn hash2d(seed: u64, x: u32, y: u32) -> u64 {
    let mut h = 0xcbf2_9ce4_8422_2325u64 ^ seed;
    for b in x.to_le_bytes().into_iter().chain(y.to_le_bytes()) {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01B3);
    }
    h
}

/// Monochrome film grain, opaque; callers apply intensity as layer opacity.
pub fn noise_rgba8_premul(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let v = (hash2d(seed, x, y) & 0xff) as u8;
            out.extend_from_slice(&[v, v, v, 255]);
        }
    }
    out
}

/// Rasterize a repeating pattern over the full target rectangle.
///
/// Cell spacing and mark size scale together; spacing is floored so a tiny
/// scale cannot degenerate into a division by zero or an all-ink fill.
pub fn pattern_rgba8_premul(spec: &PatternSpec, width: u32, height: u32) -> Vec<u8> {
    let color = css_color_or(&spec.color, Rgba::BLACK);
    let px = color.to_premul8();
    let scale = if spec.scale.is_finite() && spec.scale > 0.0 { spec.scale } else { 1.0 };
    let spacing = (spec.spacing_px * scale).max(2.0);
    let dot_radius = (1.5 * scale).max(0.75);
    let line_width = scale.max(0.5);

    let mut out = vec![0u8; width as usize * height as usize * 4];
    for y in 0..height {
        for x in 0..width {
            let fx = f64::from(x) + 0.5;
            let fy = f64::from(y) + 0.5;
            let inked = match spec.kind {
                PatternKind::Dots => {
                    let dx = fx.rem_euclid(spacing) - spacing / 2.0;
                    let dy = fy.rem_euclid(spacing) - spacing / 2.0;
                    dx * dx + dy * dy <= dot_radius * dot_radius
                }
                PatternKind::Grid => {
                    fx.rem_euclid(spacing) < line_width || fy.rem_euclid(spacing) < line_width
                }
                PatternKind::Diagonal => (fx + fy).rem_euclid(spacing) < line_width,
            };
            if inked {
                let idx = (y as usize * width as usize + x as usize) * 4;
                out[idx..idx + 4].copy_from_slice(&px);
            }
        }
    }
    out
}

/// Evaluate a linear gradient over the full target rectangle.
pub fn gradient_rgba8_premul(gradient: &LinearGradient, width: u32, height: u32) -> Vec<u8> {
    let dx = gradient.end.x - gradient.start.x;
    let dy = gradient.end.y - gradient.start.y;
    let len_sq = dx * dx + dy * dy;

    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let t = if len_sq <= 0.0 {
                0.0
            } else {
                let px = f64::from(x) + 0.5 - gradient.start.x;
                let py = f64::from(y) + 0.5 - gradient.start.y;
                (px * dx + py * dy) / len_sq
            };
            out.extend_from_slice(&gradient.sample(t).to_premul8());
        }
    }
    out
}
