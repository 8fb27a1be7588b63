// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry resolver — physical inches to device pixels.
//
// The printed sheet is three panels side by side plus a bleed margin all
// around. Panel backgrounds run to the bleed edge; every percentage anchor
// is relative to a panel's unbled content box.

use coverwerk_core::error::{CoverError, Result};
use coverwerk_core::{Dimensions, Orientation, Panel};
use tracing::debug;

/// Allocation guard for the output surface (pixels, not bytes).
const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// An axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Shrink by `d` on every side (never past the center).
    pub fn inset(&self, d: f32) -> Self {
        let d = d.min(self.w / 2.0).min(self.h / 2.0);
        Self::new(self.x + d, self.y + d, self.w - 2.0 * d, self.h - 2.0 * d)
    }
}

/// Pixel frames for one panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelFrame {
    pub panel: Panel,
    /// Full-bleed fill area: what backgrounds must cover.
    pub bleed_rect: Rect,
    /// The trim box — the base for all percentage anchors.
    pub content_rect: Rect,
    /// Safety-margin box inside the trim line. Advisory only; overlays are
    /// not clamped to it.
    pub safe_rect: Rect,
}

/// Resolved pixel geometry for the whole sheet.
#[derive(Debug, Clone)]
pub struct CoverGeometry {
    dpi: f32,
    pub canvas_w: u32,
    pub canvas_h: u32,
    /// Panels in left-to-right order on the sheet.
    panels: [PanelFrame; 3],
}

impl CoverGeometry {
    /// Convert physical dimensions at `dpi` into pixel frames.
    ///
    /// Panel x-origins run left-to-right per the reading orientation:
    /// right-bound gives [back, spine, front], left-bound the reverse.
    pub fn resolve(dims: &Dimensions, orientation: Orientation, dpi: f32) -> Result<Self> {
        dims.validate()?;
        if !(dpi > 0.0) {
            return Err(CoverError::InvalidGeometry(format!(
                "dpi must be positive (got {dpi})"
            )));
        }

        let canvas_w = (dims.total_width_in() * dpi).round();
        let canvas_h = (dims.total_height_in() * dpi).round();
        if canvas_w as u64 * canvas_h as u64 > MAX_CANVAS_PIXELS {
            return Err(CoverError::RenderSurface(format!(
                "canvas {canvas_w}x{canvas_h} exceeds the allocation limit"
            )));
        }

        let b = dims.bleed_in * dpi;
        let w = dims.width_in * dpi;
        let h = dims.height_in * dpi;
        let s = dims.spine_in * dpi;
        let t = dims.trim_in * dpi;

        // Left-to-right: outer panel (bleed through content plus the shared
        // strip), spine, outer panel to the right canvas edge.
        let order = orientation.panel_order();
        let frame = |panel: Panel, bleed_x: f32, bleed_w: f32, content_x: f32, content_w: f32| {
            let content_rect = Rect::new(content_x, b, content_w, h);
            PanelFrame {
                panel,
                bleed_rect: Rect::new(bleed_x, 0.0, bleed_w, canvas_h),
                content_rect,
                safe_rect: content_rect.inset(t),
            }
        };
        let panels = [
            frame(order[0], 0.0, b + w, b, w),
            frame(order[1], b + w, s, b + w, s),
            frame(order[2], b + w + s, w + b, b + w + s, w),
        ];

        debug!(canvas_w, canvas_h, dpi, "geometry resolved");
        Ok(Self {
            dpi,
            canvas_w: canvas_w as u32,
            canvas_h: canvas_h as u32,
            panels,
        })
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    /// Pixels per point at this resolution.
    pub fn px_per_pt(&self) -> f32 {
        self.dpi / 72.0
    }

    /// Panels in left-to-right sheet order.
    pub fn panels(&self) -> &[PanelFrame; 3] {
        &self.panels
    }

    pub fn panel(&self, panel: Panel) -> &PanelFrame {
        self.panels
            .iter()
            .find(|f| f.panel == panel)
            .expect("all three panels are always present")
    }

    /// Screen-fit scale (pixels per inch) for on-screen preview: fit the
    /// whole sheet into `max_width_px`, capped at `max_scale`.
    pub fn preview_scale(dims: &Dimensions, max_width_px: f32, max_scale: f32) -> f32 {
        max_scale.min(max_width_px / dims.total_width_in())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade_paperback() -> Dimensions {
        Dimensions {
            width_in: 6.0,
            height_in: 9.0,
            spine_in: 1.0,
            bleed_in: 0.125,
            trim_in: 0.125,
        }
    }

    #[test]
    fn canvas_matches_physical_dimensions_at_300_dpi() {
        let g = CoverGeometry::resolve(&trade_paperback(), Orientation::RightBound, 300.0).unwrap();
        // (2*6 + 1 + 0.25) * 300 = 3975, (9 + 0.25) * 300 = 2775
        assert_eq!((g.canvas_w, g.canvas_h), (3975, 2775));
    }

    #[test]
    fn right_bound_order_is_back_spine_front() {
        let g = CoverGeometry::resolve(&trade_paperback(), Orientation::RightBound, 300.0).unwrap();
        let order: Vec<_> = g.panels().iter().map(|f| f.panel).collect();
        assert_eq!(order, vec![Panel::Back, Panel::Spine, Panel::Front]);

        let g = CoverGeometry::resolve(&trade_paperback(), Orientation::LeftBound, 300.0).unwrap();
        let order: Vec<_> = g.panels().iter().map(|f| f.panel).collect();
        assert_eq!(order, vec![Panel::Front, Panel::Spine, Panel::Back]);
    }

    #[test]
    fn bleed_rects_tile_the_canvas() {
        let g = CoverGeometry::resolve(&trade_paperback(), Orientation::RightBound, 300.0).unwrap();
        let [left, spine, right] = g.panels();

        assert_eq!(left.bleed_rect.x, 0.0);
        assert_eq!(left.bleed_rect.right(), spine.bleed_rect.x);
        assert_eq!(spine.bleed_rect.right(), right.bleed_rect.x);
        assert!((right.bleed_rect.right() - g.canvas_w as f32).abs() < 1.0);
        for frame in g.panels() {
            assert_eq!(frame.bleed_rect.y, 0.0);
            assert_eq!(frame.bleed_rect.h, g.canvas_h as f32);
        }
    }

    #[test]
    fn content_boxes_sit_inside_the_bleed() {
        let g = CoverGeometry::resolve(&trade_paperback(), Orientation::RightBound, 300.0).unwrap();
        let bleed_px = 0.125 * 300.0;

        let back = g.panel(Panel::Back);
        assert_eq!(back.content_rect.x, bleed_px);
        assert_eq!(back.content_rect.y, bleed_px);
        assert_eq!(back.content_rect.w, 1800.0);
        assert_eq!(back.content_rect.h, 2700.0);

        let spine = g.panel(Panel::Spine);
        assert_eq!(spine.content_rect.x, bleed_px + 1800.0);
        assert_eq!(spine.content_rect.w, 300.0);

        let front = g.panel(Panel::Front);
        assert_eq!(front.content_rect.x, bleed_px + 1800.0 + 300.0);
    }

    #[test]
    fn safe_rect_is_the_trim_inset() {
        let g = CoverGeometry::resolve(&trade_paperback(), Orientation::RightBound, 300.0).unwrap();
        let back = g.panel(Panel::Back);
        let trim_px = 0.125 * 300.0;
        assert_eq!(back.safe_rect.x, back.content_rect.x + trim_px);
        assert_eq!(back.safe_rect.w, back.content_rect.w - 2.0 * trim_px);
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        let mut dims = trade_paperback();
        dims.height_in = 0.0;
        let err = CoverGeometry::resolve(&dims, Orientation::RightBound, 300.0).unwrap_err();
        assert!(matches!(err, CoverError::InvalidGeometry(_)));

        let err =
            CoverGeometry::resolve(&trade_paperback(), Orientation::RightBound, 0.0).unwrap_err();
        assert!(matches!(err, CoverError::InvalidGeometry(_)));
    }

    #[test]
    fn oversized_canvas_is_a_surface_error() {
        let dims = Dimensions {
            width_in: 500.0,
            height_in: 500.0,
            ..trade_paperback()
        };
        let err = CoverGeometry::resolve(&dims, Orientation::RightBound, 300.0).unwrap_err();
        assert!(matches!(err, CoverError::RenderSurface(_)));
    }

    #[test]
    fn preview_scale_fits_and_caps() {
        let dims = trade_paperback();
        // 450 / 13.25 ≈ 33.96, under the 40 cap.
        let scale = CoverGeometry::preview_scale(&dims, 450.0, 40.0);
        assert!((scale - 450.0 / 13.25).abs() < 1e-3);

        // A miniature book hits the cap instead.
        let tiny = Dimensions {
            width_in: 2.0,
            height_in: 3.0,
            spine_in: 0.25,
            ..dims
        };
        assert_eq!(CoverGeometry::preview_scale(&tiny, 450.0, 40.0), 40.0);
    }
}
