// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spine text renderer — the 90°-rotated channel.
//
// Text draws into a working layer that is the spine's local frame laid
// flat: layer x runs along the book's height, layer y across the spine
// thickness. The finished layer is rotated 90° clockwise and composited,
// clipped strictly to the spine's bleed rectangle. Elements share the
// channel without collision avoidance; overlap is the user's choice.

use coverwerk_assets::{AdvanceMeasure, ResolvedAssets};
use coverwerk_core::error::Result;
use coverwerk_core::{DesignState, Panel, PositionPct, TextStyle};
use image::{RgbaImage, imageops::rotate90};
use tracing::debug;

use crate::blit::blend_layer;
use crate::geometry::{CoverGeometry, PanelFrame};
use crate::text::{
    LaidLine, SPINE_SHADOW_OFFSET_PT, TextPaint, TextRun, draw_text_block, line_width, wrap_text,
};

/// Draw the spine's title, author, and custom spine elements.
pub fn draw_spine_stage(
    canvas: &mut RgbaImage,
    geometry: &CoverGeometry,
    state: &DesignState,
    assets: &ResolvedAssets,
) -> Result<()> {
    let frame = geometry.panel(Panel::Spine);
    let channel_len = frame.bleed_rect.h.round() as u32;
    let channel_depth = frame.content_rect.w.round() as u32;
    if channel_len == 0 || channel_depth == 0 {
        return Ok(());
    }

    let mut layer = RgbaImage::new(channel_len, channel_depth);
    let mut drew_any = false;

    let named = [
        (&state.spine.title.content, &state.spine.title.style, state.spine.title.position),
        (&state.spine.author.content, &state.spine.author.style, state.spine.author.position),
    ];
    for (text, style, position) in named {
        drew_any |= draw_channel_text(&mut layer, frame, text, style, position, assets, geometry.px_per_pt())?;
    }
    for element in state.custom_text_on(Panel::Spine) {
        drew_any |= draw_channel_text(
            &mut layer,
            frame,
            &element.text,
            &element.style,
            element.position,
            assets,
            geometry.px_per_pt(),
        )?;
    }

    if drew_any {
        let rotated = rotate90(&layer);
        debug!(channel_len, channel_depth, "spine channel composited");
        blend_layer(
            canvas,
            &rotated,
            frame.bleed_rect.x.round() as i64,
            frame.bleed_rect.y.round() as i64,
            Some(&frame.bleed_rect),
        );
    }
    Ok(())
}

/// Lay one element into the flat channel layer.
///
/// In the rotated frame the anchor maps to (y% of panel height, x% of spine
/// width). Lines are centered on the anchor with the first baseline sitting
/// exactly on it, wrapping only when the text outruns the whole channel.
fn draw_channel_text(
    layer: &mut RgbaImage,
    frame: &PanelFrame,
    text: &str,
    style: &TextStyle,
    position: PositionPct,
    assets: &ResolvedAssets,
    px_per_pt: f32,
) -> Result<bool> {
    if text.trim().is_empty() {
        return Ok(false);
    }

    let content = &frame.content_rect;
    let size_px = style.size_pt * px_per_pt;
    let face = assets.font(&style.font_family)?.scaled(size_px);
    let paint = TextPaint::from_style(style, px_per_pt, SPINE_SHADOW_OFFSET_PT);

    // Anchor in channel coordinates. The layer spans the bleed height, so
    // percentage positions (relative to the content box) shift by the bleed.
    let bleed_shift = content.y - frame.bleed_rect.y;
    let anchor_x = bleed_shift + position.y / 100.0 * content.h;
    let anchor_y = content.w / 2.0 + (position.x / 100.0 - 0.5) * content.w;

    let max_width = content.h;
    let line_height_px = size_px * style.line_height;
    let lines = wrap_text(text, &face, paint.letter_spacing, max_width);

    let mut baseline = anchor_y;
    let mut laid = Vec::with_capacity(lines.len());
    for line in &lines {
        let width = line_width(line, &face, paint.letter_spacing);
        laid.push(LaidLine {
            top: baseline - face.ascent(),
            runs: vec![TextRun {
                x: anchor_x - width / 2.0,
                text: line.clone(),
            }],
        });
        baseline += line_height_px;
    }

    draw_text_block(layer, None, &face, &laid, &paint);
    Ok(true)
}
