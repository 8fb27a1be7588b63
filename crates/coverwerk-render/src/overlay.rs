// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay image renderer — fixed-role placements (logos, author photo,
// ISBN barcode) and free-form custom image elements with rotation, opacity
// and clip shapes.

use coverwerk_assets::ResolvedAssets;
use coverwerk_core::error::Result;
use coverwerk_core::{CustomImageElement, ImagePlacement};
use image::{Rgba, RgbaImage, imageops::FilterType};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use tracing::debug;

use crate::blit::{blend_layer, fill_rect};
use crate::geometry::{PanelFrame, Rect};
use crate::shapes::shape_mask;

/// Opaque white margin drawn behind the ISBN barcode so scanners keep
/// contrast against dark artwork, in device pixels.
const ISBN_PAD_PX: f32 = 5.0;

/// Draw a fixed-role image: unrotated, unclipped by shape, full opacity.
/// Height follows the decoded source's aspect ratio. `white_pad` enables
/// the ISBN contrast rectangle.
pub fn draw_placement(
    canvas: &mut RgbaImage,
    frame: &PanelFrame,
    placement: &ImagePlacement,
    assets: &ResolvedAssets,
    clip: Option<&Rect>,
    white_pad: bool,
) -> Result<()> {
    let source = assets.image(placement.image)?;
    if source.width() == 0 || source.height() == 0 {
        return Ok(());
    }
    let content = &frame.content_rect;
    let w = placement.width_pct / 100.0 * content.w;
    let h = source.height() as f32 * (w / source.width() as f32);
    let cx = content.x + placement.position.x / 100.0 * content.w;
    let cy = content.y + placement.position.y / 100.0 * content.h;

    let target_w = w.round().max(1.0) as u32;
    let target_h = h.round().max(1.0) as u32;
    let scaled = source
        .resize_exact(target_w, target_h, FilterType::Lanczos3)
        .to_rgba8();

    let left = (cx - w / 2.0).round();
    let top = (cy - h / 2.0).round();
    if white_pad {
        fill_rect(
            canvas,
            &Rect::new(
                left - ISBN_PAD_PX,
                top - ISBN_PAD_PX,
                target_w as f32 + 2.0 * ISBN_PAD_PX,
                target_h as f32 + 2.0 * ISBN_PAD_PX,
            ),
            Rgba([255, 255, 255, 255]),
            clip,
        );
    }
    blend_layer(canvas, &scaled, left as i64, top as i64, clip);
    Ok(())
}

/// Draw a custom image element: resize to its percentage width (height from
/// the stored aspect ratio), apply the clip shape and opacity, rotate about
/// the center, and composite at the percentage anchor.
pub fn draw_custom_image(
    canvas: &mut RgbaImage,
    frame: &PanelFrame,
    element: &CustomImageElement,
    assets: &ResolvedAssets,
    clip: Option<&Rect>,
) -> Result<()> {
    let source = assets.image(element.image)?;
    if source.width() == 0 || source.height() == 0 {
        return Ok(());
    }
    let content = &frame.content_rect;
    let w = element.width_pct / 100.0 * content.w;
    let aspect = if element.aspect_ratio > 0.0 {
        element.aspect_ratio
    } else {
        source.width() as f32 / source.height() as f32
    };
    let h = w / aspect;
    if w < 1.0 || h < 1.0 {
        return Ok(());
    }

    let target_w = w.round() as u32;
    let target_h = h.round() as u32;
    let mut layer = source
        .resize_exact(target_w, target_h, FilterType::Lanczos3)
        .to_rgba8();

    if let Some(mask) = shape_mask(element.clip_shape, target_w, target_h) {
        for (px, mask_px) in layer.pixels_mut().zip(mask.pixels()) {
            px.0[3] = (px.0[3] as u16 * mask_px.0[0] as u16 / 255) as u8;
        }
    }

    let opacity = element.opacity.clamp(0.0, 1.0);
    if opacity < 1.0 {
        for px in layer.pixels_mut() {
            px.0[3] = (px.0[3] as f32 * opacity).round() as u8;
        }
    }

    let layer = rotate_layer(layer, element.rotation_deg);

    let cx = content.x + element.position.x / 100.0 * content.w;
    let cy = content.y + element.position.y / 100.0 * content.h;
    let left = (cx - layer.width() as f32 / 2.0).round() as i64;
    let top = (cy - layer.height() as f32 / 2.0).round() as i64;
    debug!(
        id = %element.id,
        panel = element.panel.as_str(),
        rotation = element.rotation_deg,
        "custom image composited"
    );
    blend_layer(canvas, &layer, left, top, clip);
    Ok(())
}

/// Rotate clockwise about the center on an expanded canvas so no corner is
/// cropped. No-op for multiples of 360°.
fn rotate_layer(layer: RgbaImage, rotation_deg: f32) -> RgbaImage {
    let normalized = rotation_deg.rem_euclid(360.0);
    if normalized.abs() < 0.01 || (normalized - 360.0).abs() < 0.01 {
        return layer;
    }
    let theta = normalized.to_radians();
    let (w, h) = (layer.width() as f32, layer.height() as f32);
    let expanded_w = (w * theta.cos().abs() + h * theta.sin().abs()).ceil() as u32;
    let expanded_h = (w * theta.sin().abs() + h * theta.cos().abs()).ceil() as u32;

    let mut padded = RgbaImage::new(expanded_w.max(1), expanded_h.max(1));
    let off_x = (expanded_w.saturating_sub(layer.width())) / 2;
    let off_y = (expanded_h.saturating_sub(layer.height())) / 2;
    for (x, y, px) in layer.enumerate_pixels() {
        padded.put_pixel(x + off_x, y + off_y, *px);
    }

    rotate_about_center(&padded, theta, Interpolation::Bilinear, Rgba([0, 0, 0, 0]))
}
