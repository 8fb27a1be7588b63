// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font resolution and glyph measurement. A font must be fully parsed before
// any layout runs — wrapping measurements over a missing face would be
// wrong, so the batch loader resolves every referenced family up front.

use std::collections::HashMap;
use std::sync::Arc;

use ab_glyph::{Font, FontVec, OutlinedGlyph, PxScale, PxScaleFont, ScaleFont, point};
use coverwerk_core::error::{CoverError, Result};

/// Per-character horizontal advance at a fixed pixel size.
///
/// This is the seam between the pure layout algorithms (wrapping, alignment,
/// justification) and glyph rasterization: layout code only ever needs
/// advances, so tests drive it with a fixed-advance stand-in instead of a
/// font file.
pub trait AdvanceMeasure {
    /// Horizontal pen advance for `ch`, in pixels.
    fn advance(&self, ch: char) -> f32;

    /// Distance from the baseline up to the top of the em box, in pixels.
    fn ascent(&self) -> f32;
}

/// A parsed font face, cheap to clone.
#[derive(Clone)]
pub struct ResolvedFont {
    family: String,
    font: Arc<FontVec>,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl ResolvedFont {
    /// Parse TTF/OTF bytes. Unparseable data is a resource-load failure.
    pub fn from_bytes(family: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let family = family.into();
        let font = FontVec::try_from_vec(bytes).map_err(|err| {
            CoverError::ResourceLoad(format!("font family '{family}' could not be parsed: {err}"))
        })?;
        Ok(Self {
            family,
            font: Arc::new(font),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Scale the face to a pixel size for measurement and rasterization.
    pub fn scaled(&self, size_px: f32) -> ScaledTypeface<'_> {
        let font: &FontVec = &self.font;
        ScaledTypeface {
            font,
            scaled: font.as_scaled(PxScale::from(size_px)),
        }
    }
}

/// A face at a concrete pixel size.
pub struct ScaledTypeface<'a> {
    font: &'a FontVec,
    scaled: PxScaleFont<&'a FontVec>,
}

impl ScaledTypeface<'_> {
    pub fn size_px(&self) -> f32 {
        self.scaled.scale().y
    }

    pub fn descent(&self) -> f32 {
        self.scaled.descent()
    }

    /// Outline `ch` with its baseline origin at `(x, y)`. Whitespace and
    /// other mark-less characters return `None`.
    pub fn outline(&self, ch: char, x: f32, y: f32) -> Option<OutlinedGlyph> {
        let mut glyph = self.scaled.scaled_glyph(ch);
        glyph.position = point(x, y);
        self.font.outline_glyph(glyph)
    }
}

impl AdvanceMeasure for ScaledTypeface<'_> {
    fn advance(&self, ch: char) -> f32 {
        self.scaled.h_advance(self.font.glyph_id(ch))
    }

    fn ascent(&self) -> f32 {
        self.scaled.ascent()
    }
}

/// Loaded faces keyed by family name, with an optional fallback face for
/// families the provider could not resolve.
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    families: HashMap<String, ResolvedFont>,
    fallback: Option<ResolvedFont>,
}

impl FontLibrary {
    pub fn insert(&mut self, font: ResolvedFont) {
        self.families.insert(font.family.clone(), font);
    }

    pub fn set_fallback(&mut self, font: ResolvedFont) {
        self.fallback = Some(font);
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains_key(family)
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty() && self.fallback.is_none()
    }

    /// The face for `family`, or the fallback face, or a resource error.
    pub fn resolve(&self, family: &str) -> Result<&ResolvedFont> {
        self.families
            .get(family)
            .or(self.fallback.as_ref())
            .ok_or_else(|| {
                CoverError::ResourceLoad(format!("font family '{family}' is not loaded"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_library_refuses_to_resolve() {
        let library = FontLibrary::default();
        assert!(library.is_empty());
        let err = library.resolve("serif").unwrap_err();
        assert!(matches!(err, CoverError::ResourceLoad(_)));
        assert!(err.to_string().contains("serif"));
    }

    #[test]
    fn garbage_bytes_are_a_resource_error() {
        let err = ResolvedFont::from_bytes("serif", vec![0u8; 16]).unwrap_err();
        assert!(matches!(err, CoverError::ResourceLoad(_)));
    }
}
