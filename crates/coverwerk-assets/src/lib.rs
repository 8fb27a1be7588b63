// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// coverwerk-assets — Resource resolution for the Coverwerk compositor.
//
// Turns the opaque image/font handles of a design snapshot into decoded
// pixels and parsed font faces. Loading is the pipeline's only async
// surface; everything downstream is synchronous and deterministic.

pub mod batch;
pub mod fonts;
pub mod sources;

pub use batch::ResolvedAssets;
pub use fonts::{AdvanceMeasure, FontLibrary, ResolvedFont, ScaledTypeface};
pub use sources::{MemorySources, SourceProvider};
