// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render configuration.

use serde::{Deserialize, Serialize};

/// Settings for a render pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Output resolution in dots per inch. Print exports use 300.
    pub dpi: f32,
    /// JPEG quality for the exported buffer (1-100).
    pub jpeg_quality: u8,
    /// Width the on-screen preview must fit into, in pixels.
    pub preview_max_width_px: f32,
    /// Cap on the preview pixels-per-inch scale.
    pub preview_max_scale: f32,
}

impl RenderConfig {
    /// Pixels per point at this resolution — the single pt→px conversion
    /// boundary for every text size, spacing, stroke and shadow value.
    pub fn px_per_pt(&self) -> f32 {
        self.dpi / 72.0
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            jpeg_quality: 95,
            preview_max_width_px: 450.0,
            preview_max_scale: 40.0,
        }
    }
}
