// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Coverwerk.

use thiserror::Error;

/// Top-level error type for all Coverwerk operations.
///
/// Every variant is fatal to the render call that raised it: the compositor
/// never returns a partial buffer, and no retries happen internally — a
/// missing author photo is a permanent data problem, not a transient one.
#[derive(Debug, Error)]
pub enum CoverError {
    /// An image source or font could not be fetched or decoded.
    #[error("resource load failed: {0}")]
    ResourceLoad(String),

    /// The drawing surface could not be allocated at the requested resolution,
    /// or the final buffer could not be encoded.
    #[error("render surface error: {0}")]
    RenderSurface(String),

    /// Non-positive cover dimensions or other geometry the resolver refuses
    /// to divide by.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CoverError>;
