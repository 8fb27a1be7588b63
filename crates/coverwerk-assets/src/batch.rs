// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async resource batch: every image and font a render will touch is
// resolved here, before a single pixel is drawn. Decoding and font parsing
// are the only suspension points in the whole pipeline — the compositor
// itself runs synchronously over the finished batch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use image::DynamicImage;
use tokio::task::JoinSet;
use tracing::{debug, instrument};

use coverwerk_core::error::{CoverError, Result};
use coverwerk_core::{DesignState, ImageRef, RenderOptions};

use crate::fonts::{FontLibrary, ResolvedFont};
use crate::sources::SourceProvider;

/// Decoded images and parsed fonts for one render call.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAssets {
    images: HashMap<ImageRef, Arc<DynamicImage>>,
    fonts: FontLibrary,
}

impl ResolvedAssets {
    /// An empty batch, sufficient for gradient-only artwork renders.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve everything `state` needs under `options`.
    ///
    /// Image decodes run concurrently on the blocking pool. Fail-fast: any
    /// missing or undecodable source aborts the whole load — a cover
    /// silently missing its author photo is worse than a failed render.
    #[instrument(skip_all, fields(
        include_text = options.include_text,
        include_overlay_images = options.include_overlay_images,
    ))]
    pub async fn load(
        state: &DesignState,
        provider: &dyn SourceProvider,
        options: RenderOptions,
    ) -> Result<Self> {
        let mut decodes: JoinSet<(ImageRef, Result<DynamicImage>)> = JoinSet::new();
        let mut seen = HashSet::new();
        for image in state.referenced_images(options.include_overlay_images) {
            if !seen.insert(image) {
                continue;
            }
            let bytes = provider.image_bytes(image).ok_or_else(|| {
                CoverError::ResourceLoad(format!("no source bytes for image {image}"))
            })?;
            decodes.spawn_blocking(move || {
                let decoded = image::load_from_memory(&bytes).map_err(|err| {
                    CoverError::ResourceLoad(format!("failed to decode image {image}: {err}"))
                });
                (image, decoded)
            });
        }

        let mut images = HashMap::new();
        while let Some(joined) = decodes.join_next().await {
            let (image, decoded) = joined.map_err(|err| {
                CoverError::ResourceLoad(format!("image decode task failed: {err}"))
            })?;
            let decoded = decoded?;
            debug!(%image, width = decoded.width(), height = decoded.height(), "image decoded");
            images.insert(image, Arc::new(decoded));
        }

        let mut fonts = FontLibrary::default();
        if options.include_text {
            for family in state.font_families() {
                if let Some(bytes) = provider.font_bytes(family) {
                    fonts.insert(ResolvedFont::from_bytes(family, bytes)?);
                    debug!(family, "font parsed");
                } else if fonts.resolve(family).is_err() {
                    let bytes = provider.fallback_font_bytes().ok_or_else(|| {
                        CoverError::ResourceLoad(format!(
                            "font family '{family}' is unavailable and no fallback font is provided"
                        ))
                    })?;
                    fonts.set_fallback(ResolvedFont::from_bytes(family, bytes)?);
                    debug!(family, "fallback font parsed");
                }
            }
        }

        Ok(Self { images, fonts })
    }

    /// The decoded pixels for a handle. Absence here means the loader was
    /// run with narrower options than the render — a caller bug surfaced as
    /// a resource error rather than a panic.
    pub fn image(&self, image: ImageRef) -> Result<&DynamicImage> {
        self.images
            .get(&image)
            .map(Arc::as_ref)
            .ok_or_else(|| CoverError::ResourceLoad(format!("image {image} was not resolved")))
    }

    pub fn font(&self, family: &str) -> Result<&ResolvedFont> {
        self.fonts.resolve(family)
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Insert already-decoded pixels, for callers that hold them (previews,
    /// tests) and skip the byte-level provider.
    pub fn insert_image(&mut self, image: ImageRef, decoded: DynamicImage) {
        self.images.insert(image, Arc::new(decoded));
    }

    pub fn insert_font(&mut self, font: ResolvedFont) {
        self.fonts.insert(font);
    }
}
