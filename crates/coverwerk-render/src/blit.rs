// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Straight-alpha pixel blending and layer compositing with an optional
// clip rectangle.

use coverwerk_core::Color;
use image::{Rgba, RgbaImage};

use crate::geometry::Rect;

pub(crate) fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

/// Source-over blend of straight-alpha `src` onto `dst`.
pub(crate) fn blend_px(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src.0[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    if sa >= 1.0 {
        *dst = src;
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let inv = 1.0 - sa;
    let out_a = sa + da * inv;
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    // Straight (non-premultiplied) channels: divide the premultiplied sum
    // back out by the result alpha.
    for i in 0..3 {
        let blended = (src.0[i] as f32 * sa + dst.0[i] as f32 * da * inv) / out_a;
        dst.0[i] = blended.round().min(255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round().min(255.0) as u8;
}

/// Blend a single pixel at `(x, y)`, honoring the clip rectangle.
pub(crate) fn blend_at(
    canvas: &mut RgbaImage,
    x: i64,
    y: i64,
    src: Rgba<u8>,
    clip: Option<&Rect>,
) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    if let Some(clip) = clip {
        let fx = x as f32 + 0.5;
        let fy = y as f32 + 0.5;
        if fx < clip.x || fx >= clip.right() || fy < clip.y || fy >= clip.bottom() {
            return;
        }
    }
    blend_px(canvas.get_pixel_mut(x as u32, y as u32), src);
}

/// Composite `layer` onto `canvas` with its top-left corner at
/// `(left, top)`. Pixels outside the canvas or the clip rect are dropped.
pub(crate) fn blend_layer(
    canvas: &mut RgbaImage,
    layer: &RgbaImage,
    left: i64,
    top: i64,
    clip: Option<&Rect>,
) {
    for (x, y, px) in layer.enumerate_pixels() {
        if px.0[3] == 0 {
            continue;
        }
        blend_at(canvas, left + x as i64, top + y as i64, *px, clip);
    }
}

/// Fill a rectangle with a solid color (blended, honoring alpha).
pub(crate) fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, color: Rgba<u8>, clip: Option<&Rect>) {
    let x0 = rect.x.round().max(0.0) as i64;
    let y0 = rect.y.round().max(0.0) as i64;
    let x1 = (rect.right().round() as i64).min(canvas.width() as i64);
    let y1 = (rect.bottom().round() as i64).min(canvas.height() as i64);
    for y in y0..y1 {
        for x in x0..x1 {
            blend_at(canvas, x, y, color, clip);
        }
    }
}
