// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// coverwerk-render — Deterministic raster compositor for book covers.
//
// Takes an immutable design snapshot plus resolved assets and produces a
// single bleed-aware high-resolution image: geometry resolution, gradient
// and cover-fit backgrounds, wrapped/aligned/justified text with stroke and
// shadow, the 90°-rotated spine channel, and overlay images with rotation,
// opacity and clip shapes.

pub mod background;
pub mod compositor;
pub mod geometry;
pub mod overlay;
pub mod spine;
pub mod text;

mod blit;
mod shapes;

pub use compositor::Compositor;
pub use geometry::{CoverGeometry, PanelFrame, Rect};

use coverwerk_assets::{ResolvedAssets, SourceProvider};
use coverwerk_core::error::Result;
use coverwerk_core::{DesignState, RenderConfig, RenderOptions};

/// One-call export: resolve the asset batch (the only async step), then run
/// the synchronous compositor and encode. The surrounding product calls
/// this twice — once per export mode.
pub async fn export_cover(
    state: &DesignState,
    provider: &dyn SourceProvider,
    config: RenderConfig,
    options: RenderOptions,
) -> Result<Vec<u8>> {
    let assets = ResolvedAssets::load(state, provider, options).await?;
    Compositor::new(config).export(state, &assets, options)
}
