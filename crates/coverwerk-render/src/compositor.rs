// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositor — sequences geometry, backgrounds, text and overlay images
// across the three panels into a single bleed-aware raster. One render
// call owns its buffer end to end; the same snapshot and flags always
// produce pixel-identical output.

use coverwerk_assets::ResolvedAssets;
use coverwerk_core::error::{CoverError, Result};
use coverwerk_core::{
    DesignState, Panel, PositionPct, RenderConfig, RenderOptions, TextStyle,
};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgba, RgbaImage, buffer::ConvertBuffer, RgbImage};
use tracing::{debug, instrument};

use crate::background::draw_background;
use crate::geometry::{CoverGeometry, PanelFrame};
use crate::overlay::{draw_custom_image, draw_placement};
use crate::spine::draw_spine_stage;
use crate::text::{BlockParams, PANEL_SHADOW_OFFSET_PT, TextPaint, draw_text_block, layout_block};

/// Box widths for the anchor-centered front fields, as fractions of the
/// panel width.
const TITLE_BOX_FRACTION: f32 = 0.90;
const SUBTITLE_BOX_FRACTION: f32 = 0.85;
const AUTHOR_BOX_FRACTION: f32 = 0.90;

/// The print compositor. Stateless between calls; holds only configuration.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: RenderConfig,
}

impl Compositor {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render one snapshot into a fresh RGBA buffer.
    ///
    /// Stages: white canvas → full-bleed backgrounds in orientation order →
    /// text (front, spine, back; flag-gated) → overlay images (front,
    /// spine, back; flag-gated). Any missing resource aborts the render.
    #[instrument(skip_all, fields(
        dpi = self.config.dpi,
        include_text = options.include_text,
        include_overlay_images = options.include_overlay_images,
    ))]
    pub fn render(
        &self,
        state: &DesignState,
        assets: &ResolvedAssets,
        options: RenderOptions,
    ) -> Result<RgbaImage> {
        let geometry = CoverGeometry::resolve(&state.dimensions, state.orientation, self.config.dpi)?;
        let mut canvas = RgbaImage::from_pixel(
            geometry.canvas_w,
            geometry.canvas_h,
            Rgba([255, 255, 255, 255]),
        );

        for frame in geometry.panels() {
            draw_background(&mut canvas, frame, state.background(frame.panel), assets)?;
        }

        if options.include_text {
            self.draw_text_stage(&mut canvas, &geometry, state, assets)?;
        }
        if options.include_overlay_images {
            self.draw_overlay_stage(&mut canvas, &geometry, state, assets)?;
        }

        debug!(
            width = geometry.canvas_w,
            height = geometry.canvas_h,
            "render complete"
        );
        Ok(canvas)
    }

    /// Render and encode to the export format (JPEG, fixed high quality).
    pub fn export(
        &self,
        state: &DesignState,
        assets: &ResolvedAssets,
        options: RenderOptions,
    ) -> Result<Vec<u8>> {
        let canvas = self.render(state, assets, options)?;
        self.encode_jpeg(&canvas)
    }

    /// Encode an opaque canvas as JPEG at the configured quality.
    pub fn encode_jpeg(&self, canvas: &RgbaImage) -> Result<Vec<u8>> {
        let rgb: RgbImage = canvas.convert();
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.config.jpeg_quality);
        rgb.write_with_encoder(encoder)
            .map_err(|err| CoverError::RenderSurface(format!("JPEG encoding failed: {err}")))?;
        Ok(buffer)
    }

    fn draw_text_stage(
        &self,
        canvas: &mut RgbaImage,
        geometry: &CoverGeometry,
        state: &DesignState,
        assets: &ResolvedAssets,
    ) -> Result<()> {
        let front = geometry.panel(Panel::Front);
        let fields = [
            (&state.front.title, TITLE_BOX_FRACTION),
            (&state.front.subtitle, SUBTITLE_BOX_FRACTION),
            (&state.front.author, AUTHOR_BOX_FRACTION),
        ];
        for (field, fraction) in fields {
            self.draw_text_box(
                canvas,
                front,
                geometry,
                &field.content,
                &field.style,
                field.position,
                field.width_pct,
                fraction,
                assets,
            )?;
        }
        for element in state.custom_text_on(Panel::Front) {
            self.draw_text_box(
                canvas,
                front,
                geometry,
                &element.text,
                &element.style,
                element.position,
                Some(element.width_pct),
                1.0,
                assets,
            )?;
        }

        draw_spine_stage(canvas, geometry, state, assets)?;

        let back = geometry.panel(Panel::Back);
        self.draw_text_box(
            canvas,
            back,
            geometry,
            &state.back.blurb.content,
            &state.back.blurb.style,
            state.back.blurb.position,
            state.back.blurb.width_pct,
            1.0,
            assets,
        )?;
        for element in state.custom_text_on(Panel::Back) {
            self.draw_text_box(
                canvas,
                back,
                geometry,
                &element.text,
                &element.style,
                element.position,
                Some(element.width_pct),
                1.0,
                assets,
            )?;
        }
        Ok(())
    }

    /// Lay out and draw one text box. Fields without an explicit box width
    /// are anchor-centered inside `default_fraction` of the panel width;
    /// box-bound fields hang from their top-left anchor.
    #[allow(clippy::too_many_arguments)]
    fn draw_text_box(
        &self,
        canvas: &mut RgbaImage,
        frame: &PanelFrame,
        geometry: &CoverGeometry,
        text: &str,
        style: &TextStyle,
        position: PositionPct,
        width_pct: Option<f32>,
        default_fraction: f32,
        assets: &ResolvedAssets,
    ) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let content = &frame.content_rect;
        let px_per_pt = geometry.px_per_pt();
        let size_px = style.size_pt * px_per_pt;
        let face = assets.font(&style.font_family)?.scaled(size_px);
        let paint = TextPaint::from_style(style, px_per_pt, PANEL_SHADOW_OFFSET_PT);

        let (max_width, anchor_is_center) = match width_pct {
            Some(pct) => (pct / 100.0 * content.w, false),
            None => (default_fraction * content.w, true),
        };
        let params = BlockParams {
            anchor_x: content.x + position.x / 100.0 * content.w,
            anchor_y: content.y + position.y / 100.0 * content.h,
            max_width,
            align: style.align,
            size_px,
            line_height: style.line_height,
            letter_spacing: paint.letter_spacing,
            anchor_is_center,
        };
        let lines = layout_block(text, &face, &params);
        draw_text_block(canvas, None, &face, &lines, &paint);
        Ok(())
    }

    fn draw_overlay_stage(
        &self,
        canvas: &mut RgbaImage,
        geometry: &CoverGeometry,
        state: &DesignState,
        assets: &ResolvedAssets,
    ) -> Result<()> {
        let front = geometry.panel(Panel::Front);
        if let Some(logo) = &state.front.logo {
            draw_placement(canvas, front, logo, assets, None, false)?;
        }
        for element in state.custom_images_on(Panel::Front) {
            draw_custom_image(canvas, front, element, assets, None)?;
        }

        // The spine stage is clipped as a whole: nothing may leak onto the
        // neighbouring panels.
        let spine = geometry.panel(Panel::Spine);
        let spine_clip = spine.bleed_rect;
        if let Some(logo) = &state.spine.logo {
            draw_placement(canvas, spine, logo, assets, Some(&spine_clip), false)?;
        }
        for element in state.custom_images_on(Panel::Spine) {
            draw_custom_image(canvas, spine, element, assets, Some(&spine_clip))?;
        }

        let back = geometry.panel(Panel::Back);
        if let Some(photo) = &state.back.author_photo {
            draw_placement(canvas, back, photo, assets, None, false)?;
        }
        if let Some(logo) = &state.back.logo {
            draw_placement(canvas, back, logo, assets, None, false)?;
        }
        if let Some(barcode) = &state.back.isbn_barcode {
            draw_placement(canvas, back, barcode, assets, None, true)?;
        }
        for element in state.custom_images_on(Panel::Back) {
            draw_custom_image(canvas, back, element, assets, None)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverwerk_core::{BackgroundSpec, Color};

    #[test]
    fn jpeg_export_produces_a_jfif_stream() {
        let compositor = Compositor::new(RenderConfig {
            dpi: 20.0,
            ..RenderConfig::default()
        });
        let state = DesignState::default();
        let bytes = compositor
            .export(&state, &ResolvedAssets::empty(), RenderOptions::ARTWORK_ONLY)
            .unwrap();
        // JPEG SOI marker.
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert!(bytes.len() > 100);
    }

    #[test]
    fn backgrounds_cover_the_bleed_in_both_modes() {
        let compositor = Compositor::new(RenderConfig {
            dpi: 20.0,
            ..RenderConfig::default()
        });
        let mut state = DesignState::default();
        let ink = Color::rgb(40, 40, 40);
        for panel in [Panel::Back, Panel::Spine, Panel::Front] {
            let spec = BackgroundSpec::Gradient {
                color1: ink,
                color2: ink,
                angle_deg: 90.0,
            };
            match panel {
                Panel::Back => state.back.background = spec,
                Panel::Spine => state.spine.background = spec,
                Panel::Front => state.front.background = spec,
            }
        }

        for options in [RenderOptions::WITH_TEXT, RenderOptions::ARTWORK_ONLY] {
            let canvas = compositor
                .render(&state, &ResolvedAssets::empty(), options)
                .unwrap();
            // Outer bleed corner and dead center both carry ink.
            assert_eq!(canvas.get_pixel(0, 0).0, [40, 40, 40, 255]);
            let (w, h) = canvas.dimensions();
            assert_eq!(canvas.get_pixel(w / 2, h / 2).0, [40, 40, 40, 255]);
        }
    }

    #[test]
    fn missing_overlay_image_fails_the_whole_render() {
        let compositor = Compositor::new(RenderConfig {
            dpi: 20.0,
            ..RenderConfig::default()
        });
        let mut state = DesignState::default();
        state.custom_images.push(coverwerk_core::CustomImageElement::new(
            coverwerk_core::ImageRef::new(),
            Panel::Front,
            1.0,
        ));

        let err = compositor
            .render(&state, &ResolvedAssets::empty(), RenderOptions::WITH_TEXT)
            .unwrap_err();
        assert!(matches!(err, CoverError::ResourceLoad(_)));

        // Artwork-only never reaches the overlay stage, so it succeeds.
        assert!(
            compositor
                .render(&state, &ResolvedAssets::empty(), RenderOptions::ARTWORK_ONLY)
                .is_ok()
        );
    }
}
