// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background renderer — fills a panel's full bleed rectangle with a linear
// gradient or a cover-fit image.

use coverwerk_assets::ResolvedAssets;
use coverwerk_core::error::Result;
use coverwerk_core::{BackgroundSpec, Color};
use image::{DynamicImage, RgbaImage, imageops::FilterType};
use tracing::debug;

use crate::blit::{blend_at, blend_layer, to_rgba};
use crate::geometry::{PanelFrame, Rect};

/// Fill the panel's bleed rectangle per its background spec. A gradient is
/// always renderable; an upload requires the image in the resolved batch.
pub fn draw_background(
    canvas: &mut RgbaImage,
    frame: &PanelFrame,
    spec: &BackgroundSpec,
    assets: &ResolvedAssets,
) -> Result<()> {
    match spec {
        BackgroundSpec::Gradient {
            color1,
            color2,
            angle_deg,
        } => {
            fill_linear_gradient(canvas, &frame.bleed_rect, *color1, *color2, *angle_deg);
            Ok(())
        }
        BackgroundSpec::Upload { image } => {
            let source = assets.image(*image)?;
            debug!(panel = frame.panel.as_str(), %image, "cover-fit background");
            draw_cover_fit(canvas, &frame.bleed_rect, source);
            Ok(())
        }
    }
}

/// Per-pixel linear gradient over `rect`.
///
/// The axis convention is fixed for visual compatibility with the original
/// export path: the CSS-style angle is offset by −90° and the endpoints are
/// the projection onto the rectangle's half-*extents* (w/2, h/2), not the
/// half-diagonal. `color1` sits at t=0, `color2` at t=1.
pub fn fill_linear_gradient(
    canvas: &mut RgbaImage,
    rect: &Rect,
    color1: Color,
    color2: Color,
    angle_deg: f32,
) {
    let rad = (angle_deg - 90.0).to_radians();
    let (cx, cy) = rect.center();
    let ax = rad.cos() * rect.w / 2.0;
    let ay = rad.sin() * rect.h / 2.0;
    let (x1, y1) = (cx + ax, cy + ay);
    let (x2, y2) = (cx - ax, cy - ay);
    let (dx, dy) = (x2 - x1, y2 - y1);
    let len2 = dx * dx + dy * dy;

    let x0 = rect.x.round().max(0.0) as i64;
    let y0 = rect.y.round().max(0.0) as i64;
    let x_end = (rect.right().round() as i64).min(canvas.width() as i64);
    let y_end = (rect.bottom().round() as i64).min(canvas.height() as i64);

    for y in y0..y_end {
        for x in x0..x_end {
            let t = if len2 <= f32::EPSILON {
                0.0
            } else {
                let px = x as f32 + 0.5 - x1;
                let py = y as f32 + 0.5 - y1;
                ((px * dx + py * dy) / len2).clamp(0.0, 1.0)
            };
            blend_at(canvas, x, y, to_rgba(lerp(color1, color2, t)), None);
        }
    }
}

fn lerp(a: Color, b: Color, t: f32) -> Color {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color::rgba(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

/// Cover-fit: scale the source preserving aspect ratio so it fully covers
/// `rect`, center-cropping the overflow axis. Never letterboxes.
pub fn draw_cover_fit(canvas: &mut RgbaImage, rect: &Rect, source: &DynamicImage) {
    let (sw, sh) = (source.width(), source.height());
    if sw == 0 || sh == 0 || rect.w < 1.0 || rect.h < 1.0 {
        return;
    }
    let src_ratio = sw as f32 / sh as f32;
    let rect_ratio = rect.w / rect.h;

    let (crop_x, crop_y, crop_w, crop_h) = if src_ratio > rect_ratio {
        // Source is wider: crop left and right.
        let crop_w = ((sh as f32 * rect_ratio).round() as u32).clamp(1, sw);
        ((sw - crop_w) / 2, 0, crop_w, sh)
    } else {
        // Source is taller or matching: crop top and bottom.
        let crop_h = ((sw as f32 / rect_ratio).round() as u32).clamp(1, sh);
        (0, (sh - crop_h) / 2, sw, crop_h)
    };

    let target_w = rect.w.round().max(1.0) as u32;
    let target_h = rect.h.round().max(1.0) as u32;
    let scaled = source
        .crop_imm(crop_x, crop_y, crop_w, crop_h)
        .resize_exact(target_w, target_h, FilterType::Lanczos3)
        .to_rgba8();

    blend_layer(
        canvas,
        &scaled,
        rect.x.round() as i64,
        rect.y.round() as i64,
        None,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn white_canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn equal_colors_fill_uniformly_at_any_angle() {
        let color = Color::rgb(90, 120, 30);
        for angle in [0.0, 45.0, 145.0, 180.0, 270.0, 361.5] {
            let mut canvas = white_canvas(40, 20);
            fill_linear_gradient(&mut canvas, &Rect::new(0.0, 0.0, 40.0, 20.0), color, color, angle);
            assert!(
                canvas.pixels().all(|p| p.0 == [90, 120, 30, 255]),
                "seam visible at angle {angle}"
            );
        }
    }

    #[test]
    fn angle_zero_puts_color1_at_the_top() {
        let mut canvas = white_canvas(10, 50);
        let c1 = Color::rgb(255, 0, 0);
        let c2 = Color::rgb(0, 0, 255);
        fill_linear_gradient(&mut canvas, &Rect::new(0.0, 0.0, 10.0, 50.0), c1, c2, 0.0);

        let top = canvas.get_pixel(5, 0).0;
        let bottom = canvas.get_pixel(5, 49).0;
        assert!(top[0] > 200 && top[2] < 60, "top should be near color1: {top:?}");
        assert!(bottom[2] > 200 && bottom[0] < 60, "bottom should be near color2: {bottom:?}");
    }

    #[test]
    fn angle_180_flips_the_axis() {
        let mut canvas = white_canvas(10, 50);
        let c1 = Color::rgb(255, 0, 0);
        let c2 = Color::rgb(0, 0, 255);
        fill_linear_gradient(&mut canvas, &Rect::new(0.0, 0.0, 10.0, 50.0), c1, c2, 180.0);
        assert!(canvas.get_pixel(5, 0).0[2] > 200);
        assert!(canvas.get_pixel(5, 49).0[0] > 200);
    }

    #[test]
    fn gradient_is_confined_to_its_rect() {
        let mut canvas = white_canvas(40, 20);
        let c = Color::rgb(0, 0, 0);
        fill_linear_gradient(&mut canvas, &Rect::new(0.0, 0.0, 20.0, 20.0), c, c, 90.0);
        assert_eq!(canvas.get_pixel(19, 10).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(20, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn cover_fit_covers_the_whole_rect() {
        let mut canvas = white_canvas(40, 40);
        // A wide uniform source into a square rect: crop, never letterbox.
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            80,
            20,
            Rgba([10, 200, 10, 255]),
        ));
        let rect = Rect::new(4.0, 4.0, 30.0, 30.0);
        draw_cover_fit(&mut canvas, &rect, &source);

        for (x, y) in [(4, 4), (33, 4), (4, 33), (33, 33), (19, 19)] {
            assert_eq!(canvas.get_pixel(x, y).0, [10, 200, 10, 255], "at ({x},{y})");
        }
        // Outside the rect stays untouched.
        assert_eq!(canvas.get_pixel(2, 2).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(36, 36).0, [255, 255, 255, 255]);
    }

    #[test]
    fn cover_fit_center_crops_the_wide_axis() {
        let mut canvas = white_canvas(20, 20);
        // Left half red, right half blue, 4:1 over a square: the crop keeps
        // the middle, so both halves survive split down the center.
        let mut src = RgbaImage::from_pixel(80, 20, Rgba([255, 0, 0, 255]));
        for y in 0..20 {
            for x in 40..80 {
                src.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let source = DynamicImage::ImageRgba8(src);
        draw_cover_fit(&mut canvas, &Rect::new(0.0, 0.0, 20.0, 20.0), &source);

        assert!(canvas.get_pixel(2, 10).0[0] > 200, "left edge keeps red");
        assert!(canvas.get_pixel(17, 10).0[2] > 200, "right edge keeps blue");
    }
}
