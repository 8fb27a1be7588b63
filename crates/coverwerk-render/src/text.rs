// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text layout engine — wrapping, alignment (including full justification),
// letter-spacing, stroke and shadow for a block of text anchored at a
// percentage position.
//
// Layout is pure and driven entirely by per-character advances through the
// `AdvanceMeasure` seam; rasterization happens afterwards over the laid-out
// runs. All pixel values here are already converted from points at the
// single dpi/72 boundary.

use coverwerk_assets::{AdvanceMeasure, ScaledTypeface};
use coverwerk_core::{Color, TextAlign, TextStyle};
use image::{GrayImage, Rgba, RgbaImage};
use imageproc::filter::gaussian_blur_f32;

use crate::blit::{blend_at, to_rgba};
use crate::geometry::Rect;

/// Fixed shadow offset for panel text, in points (the spine channel uses
/// `SPINE_SHADOW_OFFSET_PT`).
pub const PANEL_SHADOW_OFFSET_PT: f32 = 2.0;
/// Fixed shadow offset for spine text, in points.
pub const SPINE_SHADOW_OFFSET_PT: f32 = 1.0;

/// Stroke outlines are approximated by redrawing the glyphs along a ring of
/// this many fixed directions.
const STROKE_DIRECTIONS: usize = 16;

/// Geometry inputs for laying out one text block.
#[derive(Debug, Clone, Copy)]
pub struct BlockParams {
    pub anchor_x: f32,
    pub anchor_y: f32,
    /// Maximum line width in pixels; also the box width for box-bound
    /// fields and the justification width.
    pub max_width: f32,
    pub align: TextAlign,
    pub size_px: f32,
    /// Multiplier on `size_px` giving the advance between line tops.
    pub line_height: f32,
    pub letter_spacing: f32,
    /// `true` for anchor-centered fields: the anchor is the block's center
    /// both vertically and horizontally. `false` for box-bound fields: the
    /// anchor is the box's top-left corner.
    pub anchor_is_center: bool,
}

impl BlockParams {
    pub fn line_height_px(&self) -> f32 {
        self.size_px * self.line_height
    }
}

/// A horizontally positioned piece of one line. Non-justified lines have a
/// single run; justified lines have one run per word.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Pen start x of the run's first character.
    pub x: f32,
    pub text: String,
}

/// One laid-out line: the y of its top edge plus its runs.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidLine {
    pub top: f32,
    pub runs: Vec<TextRun>,
}

/// Measured width of `text` including the letter-spacing contribution
/// (spacing after every character except the last).
pub fn line_width(text: &str, measure: &impl AdvanceMeasure, letter_spacing: f32) -> f32 {
    let mut width = 0.0;
    let mut chars = 0usize;
    for ch in text.chars() {
        width += measure.advance(ch);
        chars += 1;
    }
    if chars > 1 {
        width += letter_spacing * (chars - 1) as f32;
    }
    width
}

/// Greedy word wrap: append the next word while the running line stays
/// within `max_width`. A single word wider than the box is kept whole on
/// its own line and overflows.
pub fn wrap_text(
    text: &str,
    measure: &impl AdvanceMeasure,
    letter_spacing: f32,
    max_width: f32,
) -> Vec<String> {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut current = first.to_owned();
    for word in words {
        let candidate = format!("{current} {word}");
        if line_width(&candidate, measure, letter_spacing) > max_width {
            lines.push(current);
            current = word.to_owned();
        } else {
            current = candidate;
        }
    }
    lines.push(current);
    lines
}

/// Wrap `text` and position every line per the block's alignment.
pub fn layout_block(
    text: &str,
    measure: &impl AdvanceMeasure,
    params: &BlockParams,
) -> Vec<LaidLine> {
    let lines = wrap_text(text, measure, params.letter_spacing, params.max_width);
    if lines.is_empty() {
        return Vec::new();
    }

    let line_height_px = params.line_height_px();
    let block_height = lines.len() as f32 * line_height_px;
    let mut top = if params.anchor_is_center {
        params.anchor_y - block_height / 2.0
    } else {
        params.anchor_y
    };
    let box_left = if params.anchor_is_center {
        params.anchor_x - params.max_width / 2.0
    } else {
        params.anchor_x
    };
    let box_right = box_left + params.max_width;

    let mut laid = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        // Justification never applies to a paragraph's last line.
        let align = match params.align {
            TextAlign::Justify if i + 1 == lines.len() => TextAlign::Left,
            other => other,
        };
        let runs = match align {
            TextAlign::Left => vec![TextRun {
                x: box_left,
                text: line.clone(),
            }],
            TextAlign::Center => {
                let width = line_width(line, measure, params.letter_spacing);
                vec![TextRun {
                    x: (box_left + box_right) / 2.0 - width / 2.0,
                    text: line.clone(),
                }]
            }
            TextAlign::Right => {
                let width = line_width(line, measure, params.letter_spacing);
                vec![TextRun {
                    x: box_right - width,
                    text: line.clone(),
                }]
            }
            TextAlign::Justify => justify_runs(
                line,
                measure,
                params.letter_spacing,
                box_left,
                params.max_width,
            ),
        };
        laid.push(LaidLine { top, runs });
        top += line_height_px;
    }
    laid
}

/// Distribute a justified line's leftover width evenly over its N−1
/// inter-word gaps. A single-word line cannot justify and renders left.
fn justify_runs(
    line: &str,
    measure: &impl AdvanceMeasure,
    letter_spacing: f32,
    box_left: f32,
    max_width: f32,
) -> Vec<TextRun> {
    let words: Vec<&str> = line.split(' ').collect();
    if words.len() < 2 {
        return vec![TextRun {
            x: box_left,
            text: line.to_owned(),
        }];
    }

    let widths: Vec<f32> = words
        .iter()
        .map(|word| line_width(word, measure, letter_spacing))
        .collect();
    let words_width: f32 = widths.iter().sum();
    let gap = (max_width - words_width) / (words.len() - 1) as f32;

    let mut runs = Vec::with_capacity(words.len());
    let mut x = box_left;
    for (word, width) in words.iter().zip(&widths) {
        runs.push(TextRun {
            x,
            text: (*word).to_owned(),
        });
        x += width + gap;
    }
    runs
}

/// Raster styling for one text block, in pixels.
#[derive(Debug, Clone, Copy)]
pub struct TextPaint {
    pub color: Color,
    pub letter_spacing: f32,
    pub stroke_width: f32,
    pub stroke_color: Color,
    pub shadow_blur: f32,
    pub shadow_color: Color,
    pub shadow_offset: (f32, f32),
}

impl TextPaint {
    /// Convert a pt-space style record at `px_per_pt`, with the fixed
    /// shadow offset for the target channel.
    pub fn from_style(style: &TextStyle, px_per_pt: f32, shadow_offset_pt: f32) -> Self {
        let offset = shadow_offset_pt * px_per_pt;
        Self {
            color: style.color,
            letter_spacing: style.letter_spacing_pt * px_per_pt,
            stroke_width: style.stroke_width_pt * px_per_pt,
            stroke_color: style.stroke_color,
            shadow_blur: style.shadow_blur_pt * px_per_pt,
            shadow_color: style.shadow_color,
            shadow_offset: (offset, offset),
        }
    }
}

/// Draw laid-out lines: shadow (only when blur > 0), then stroke outline,
/// then fill, clipped to `clip` when given.
pub fn draw_text_block(
    canvas: &mut RgbaImage,
    clip: Option<&Rect>,
    face: &ScaledTypeface<'_>,
    lines: &[LaidLine],
    paint: &TextPaint,
) {
    if lines.is_empty() {
        return;
    }
    let ascent = face.ascent();

    if paint.shadow_blur > 0.0 {
        draw_shadow_pass(canvas, clip, face, lines, paint, ascent);
    }

    if paint.stroke_width > 0.0 {
        for (dx, dy) in ring_offsets(paint.stroke_width / 2.0) {
            for line in lines {
                for run in &line.runs {
                    draw_run(
                        canvas,
                        clip,
                        face,
                        run.x + dx,
                        line.top + ascent + dy,
                        &run.text,
                        paint.letter_spacing,
                        paint.stroke_color,
                    );
                }
            }
        }
    }

    for line in lines {
        for run in &line.runs {
            draw_run(
                canvas,
                clip,
                face,
                run.x,
                line.top + ascent,
                &run.text,
                paint.letter_spacing,
                paint.color,
            );
        }
    }
}

/// Rasterize one run of characters with its baseline at `(x, baseline_y)`,
/// advancing the pen by the glyph advance plus letter spacing.
pub(crate) fn draw_run(
    canvas: &mut RgbaImage,
    clip: Option<&Rect>,
    face: &ScaledTypeface<'_>,
    x: f32,
    baseline_y: f32,
    text: &str,
    letter_spacing: f32,
    color: Color,
) {
    let src = to_rgba(color);
    let mut caret = x;
    for ch in text.chars() {
        if let Some(outlined) = face.outline(ch, caret, baseline_y) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                if coverage <= 0.0 {
                    return;
                }
                let alpha = (coverage.min(1.0) * src.0[3] as f32).round() as u8;
                let px = Rgba([src.0[0], src.0[1], src.0[2], alpha]);
                blend_at(
                    canvas,
                    bounds.min.x as i64 + gx as i64,
                    bounds.min.y as i64 + gy as i64,
                    px,
                    clip,
                );
            });
        }
        caret += face.advance(ch) + letter_spacing;
    }
}

/// A blurred duplicate of the block beneath the fill: glyph coverage goes
/// into a grayscale mask, the mask is gaussian-blurred, then tinted with
/// the shadow color at the fixed offset. The blur radius maps to sigma via
/// a fixed /2 convention.
fn draw_shadow_pass(
    canvas: &mut RgbaImage,
    clip: Option<&Rect>,
    face: &ScaledTypeface<'_>,
    lines: &[LaidLine],
    paint: &TextPaint,
    ascent: f32,
) {
    let sigma = paint.shadow_blur / 2.0;
    let margin = (3.0 * sigma).ceil() + 2.0;

    let mut min_x = f32::MAX;
    let mut max_x = f32::MIN;
    for line in lines {
        for run in &line.runs {
            min_x = min_x.min(run.x);
            max_x = max_x.max(run.x + line_width(&run.text, face, paint.letter_spacing));
        }
    }
    let min_y = lines[0].top;
    let max_y = lines[lines.len() - 1].top + ascent - face.descent();
    if min_x > max_x {
        return;
    }

    let origin_x = (min_x - margin).floor();
    let origin_y = (min_y - margin).floor();
    let mask_w = ((max_x - min_x) + 2.0 * margin).ceil().max(1.0) as u32;
    let mask_h = ((max_y - min_y) + 2.0 * margin).ceil().max(1.0) as u32;

    let mut mask = GrayImage::new(mask_w, mask_h);
    for line in lines {
        for run in &line.runs {
            draw_run_coverage(
                &mut mask,
                face,
                run.x - origin_x,
                line.top + ascent - origin_y,
                &run.text,
                paint.letter_spacing,
            );
        }
    }
    let blurred = if sigma > 0.0 {
        gaussian_blur_f32(&mask, sigma)
    } else {
        mask
    };

    let shadow = paint.shadow_color;
    let left = (origin_x + paint.shadow_offset.0).round() as i64;
    let top = (origin_y + paint.shadow_offset.1).round() as i64;
    for (x, y, px) in blurred.enumerate_pixels() {
        if px.0[0] == 0 {
            continue;
        }
        let alpha = (px.0[0] as f32 * shadow.a as f32 / 255.0).round() as u8;
        blend_at(
            canvas,
            left + x as i64,
            top + y as i64,
            Rgba([shadow.r, shadow.g, shadow.b, alpha]),
            clip,
        );
    }
}

/// Accumulate glyph coverage into a grayscale mask (max-composited).
fn draw_run_coverage(
    mask: &mut GrayImage,
    face: &ScaledTypeface<'_>,
    x: f32,
    baseline_y: f32,
    text: &str,
    letter_spacing: f32,
) {
    let mut caret = x;
    for ch in text.chars() {
        if let Some(outlined) = face.outline(ch, caret, baseline_y) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px < 0 || py < 0 || px >= mask.width() as i64 || py >= mask.height() as i64 {
                    return;
                }
                let value = (coverage.min(1.0) * 255.0).round() as u8;
                let dst = mask.get_pixel_mut(px as u32, py as u32);
                dst.0[0] = dst.0[0].max(value);
            });
        }
        caret += face.advance(ch) + letter_spacing;
    }
}

fn ring_offsets(radius: f32) -> impl Iterator<Item = (f32, f32)> {
    (0..STROKE_DIRECTIONS).map(move |i| {
        let angle = i as f32 * std::f32::consts::TAU / STROKE_DIRECTIONS as f32;
        (angle.cos() * radius, angle.sin() * radius)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-advance measurer: every character is 10 px wide.
    struct FixedAdvance;

    impl AdvanceMeasure for FixedAdvance {
        fn advance(&self, _ch: char) -> f32 {
            10.0
        }

        fn ascent(&self) -> f32 {
            8.0
        }
    }

    fn params(align: TextAlign, anchor_is_center: bool) -> BlockParams {
        BlockParams {
            anchor_x: 100.0,
            anchor_y: 50.0,
            max_width: 100.0,
            align,
            size_px: 10.0,
            line_height: 1.2,
            letter_spacing: 0.0,
            anchor_is_center,
        }
    }

    #[test]
    fn width_includes_letter_spacing_between_chars_only() {
        assert_eq!(line_width("abc", &FixedAdvance, 2.0), 34.0);
        assert_eq!(line_width("a", &FixedAdvance, 2.0), 10.0);
        assert_eq!(line_width("", &FixedAdvance, 2.0), 0.0);
    }

    #[test]
    fn wraps_greedily_at_max_width() {
        // "aaaa bbbb" = 90 px fits; adding " cccc" = 140 px does not.
        let lines = wrap_text("aaaa bbbb cccc dddd", &FixedAdvance, 0.0, 100.0);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc dddd"]);
    }

    #[test]
    fn letter_spacing_tightens_the_wrap() {
        // With 2 px spacing "aaaa bbbb" measures 106 px and no longer fits.
        let lines = wrap_text("aaaa bbbb", &FixedAdvance, 2.0, 100.0);
        assert_eq!(lines, vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn unbreakable_word_overflows_on_one_line() {
        let lines = wrap_text("aaaaaaaaaaaaaaaaaaaa", &FixedAdvance, 0.0, 100.0);
        assert_eq!(lines.len(), 1);
        assert!(line_width(&lines[0], &FixedAdvance, 0.0) > 100.0);
    }

    #[test]
    fn empty_text_lays_out_nothing() {
        assert!(layout_block("   ", &FixedAdvance, &params(TextAlign::Left, false)).is_empty());
    }

    #[test]
    fn box_bound_block_is_top_anchored() {
        let laid = layout_block("aaaa bbbb cccc dddd", &FixedAdvance, &params(TextAlign::Left, false));
        assert_eq!(laid.len(), 2);
        assert_eq!(laid[0].top, 50.0);
        assert_eq!(laid[1].top, 62.0);
        assert_eq!(laid[0].runs[0].x, 100.0);
    }

    #[test]
    fn anchored_block_centers_vertically_and_horizontally() {
        let laid = layout_block("aaaa", &FixedAdvance, &params(TextAlign::Center, true));
        assert_eq!(laid.len(), 1);
        // Block height 12, centered on y=50 → top at 44.
        assert_eq!(laid[0].top, 44.0);
        // 40 px line centered on x=100 → pen at 80.
        assert_eq!(laid[0].runs[0].x, 80.0);
    }

    #[test]
    fn centered_alignment_accounts_for_letter_spacing() {
        let mut p = params(TextAlign::Center, true);
        p.letter_spacing = 2.0;
        let laid = layout_block("aaaa", &FixedAdvance, &p);
        // Width 46 centered on 100 → pen at 77.
        assert_eq!(laid[0].runs[0].x, 77.0);
    }

    #[test]
    fn right_alignment_uses_the_box_edge() {
        let laid = layout_block("aaaa", &FixedAdvance, &params(TextAlign::Right, false));
        // Box [100, 200], width 40 → pen at 160.
        assert_eq!(laid[0].runs[0].x, 160.0);
    }

    #[test]
    fn justify_distributes_the_leftover_evenly() {
        let laid = layout_block(
            "aaaa bbbb cccc dddd",
            &FixedAdvance,
            &params(TextAlign::Justify, false),
        );
        assert_eq!(laid.len(), 2);

        // First line "aaaa bbbb": leftover 100 − 80 = 20 → one 20 px gap;
        // the second word ends flush at the right box edge.
        let first = &laid[0].runs;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].x, 100.0);
        assert_eq!(first[1].x, 160.0);
        assert_eq!(first[1].x + 40.0, 200.0);

        // The paragraph's last line falls back to left alignment.
        let last = &laid[1].runs;
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].x, 100.0);
    }

    #[test]
    fn two_word_justified_gap_is_exactly_the_leftover() {
        // Wraps as ["aaaaaaaaa", "a aaa", "bbbbb", ...]: the two-word middle
        // line justifies with w1=10, w2=30.
        let laid = layout_block(
            "aaaaaaaaa a aaa bbbbb aaaaaaaaa a",
            &FixedAdvance,
            &params(TextAlign::Justify, false),
        );
        let justified = laid
            .iter()
            .find(|line| line.runs.len() == 2)
            .expect("the two-word line should justify into two runs");
        assert_eq!(justified.runs[0].text, "a");
        assert_eq!(justified.runs[1].text, "aaa");
        let gap = justified.runs[1].x - (justified.runs[0].x + 10.0);
        assert!((gap - (100.0 - 10.0 - 30.0)).abs() < 1e-3);
        // Second word ends flush at the right box edge.
        assert!((justified.runs[1].x + 30.0 - 200.0).abs() < 1e-3);
    }

    #[test]
    fn single_word_line_cannot_justify() {
        let runs = justify_runs("aaaa", &FixedAdvance, 0.0, 10.0, 100.0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].x, 10.0);
    }

    #[test]
    fn paint_converts_points_once() {
        let mut style = TextStyle::new("serif", 12.0, TextAlign::Left);
        style.letter_spacing_pt = 2.0;
        style.stroke_width_pt = 1.0;
        style.shadow_blur_pt = 6.0;

        let paint = TextPaint::from_style(&style, 300.0 / 72.0, PANEL_SHADOW_OFFSET_PT);
        assert!((paint.letter_spacing - 2.0 * 300.0 / 72.0).abs() < 1e-4);
        assert!((paint.stroke_width - 300.0 / 72.0).abs() < 1e-4);
        assert!((paint.shadow_offset.0 - 2.0 * 300.0 / 72.0).abs() < 1e-4);
    }
}
