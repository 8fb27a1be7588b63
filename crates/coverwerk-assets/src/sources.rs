// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The seam to the external collaborator that owns raw bytes: file pickers,
// embedded uploads, bundled fonts. The compositor core never touches the
// filesystem or network itself.

use std::collections::HashMap;

use coverwerk_core::ImageRef;

/// Supplies the bytes behind opaque image and font handles.
///
/// Lookups are synchronous; any slow fetching is the provider's problem and
/// must happen before the design state reaches the loader.
pub trait SourceProvider: Send + Sync {
    /// Raw encoded bytes (JPEG, PNG, WebP...) for an image handle.
    fn image_bytes(&self, image: ImageRef) -> Option<Vec<u8>>;

    /// Raw font data (TTF/OTF) for a font family name.
    fn font_bytes(&self, family: &str) -> Option<Vec<u8>>;

    /// Font data used for families the provider cannot resolve, e.g. the
    /// generic `serif`/`sans-serif` names when no concrete face is bundled.
    fn fallback_font_bytes(&self) -> Option<Vec<u8>> {
        None
    }
}

/// In-memory `SourceProvider`, the storage behind editor uploads (the data
/// URLs of the web flow become plain byte buffers here).
#[derive(Debug, Default)]
pub struct MemorySources {
    images: HashMap<ImageRef, Vec<u8>>,
    fonts: HashMap<String, Vec<u8>>,
    fallback_font: Option<Vec<u8>>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store encoded image bytes and return the new handle for them.
    pub fn add_image(&mut self, bytes: Vec<u8>) -> ImageRef {
        let image = ImageRef::new();
        self.images.insert(image, bytes);
        image
    }

    /// Store encoded image bytes under an existing handle.
    pub fn insert_image(&mut self, image: ImageRef, bytes: Vec<u8>) {
        self.images.insert(image, bytes);
    }

    /// Register a font family (a user-uploaded custom font, or one of the
    /// generic families mapped to a concrete face).
    pub fn add_font(&mut self, family: impl Into<String>, bytes: Vec<u8>) {
        self.fonts.insert(family.into(), bytes);
    }

    /// Register the fallback face for unresolvable families.
    pub fn set_fallback_font(&mut self, bytes: Vec<u8>) {
        self.fallback_font = Some(bytes);
    }
}

impl SourceProvider for MemorySources {
    fn image_bytes(&self, image: ImageRef) -> Option<Vec<u8>> {
        self.images.get(&image).cloned()
    }

    fn font_bytes(&self, family: &str) -> Option<Vec<u8>> {
        self.fonts.get(family).cloned()
    }

    fn fallback_font_bytes(&self) -> Option<Vec<u8>> {
        self.fallback_font.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_returns_image_bytes() {
        let mut sources = MemorySources::new();
        let image = sources.add_image(vec![1, 2, 3]);
        assert_eq!(sources.image_bytes(image), Some(vec![1, 2, 3]));
        assert_eq!(sources.image_bytes(ImageRef::new()), None);
    }

    #[test]
    fn resolves_fonts_by_family() {
        let mut sources = MemorySources::new();
        sources.add_font("serif", vec![0xAA]);
        assert_eq!(sources.font_bytes("serif"), Some(vec![0xAA]));
        assert_eq!(sources.font_bytes("cursive"), None);
        assert_eq!(sources.fallback_font_bytes(), None);

        sources.set_fallback_font(vec![0xBB]);
        assert_eq!(sources.fallback_font_bytes(), Some(vec![0xBB]));
    }
}
