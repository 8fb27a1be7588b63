// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coverwerk — Core types and error definitions shared across all crates.

pub mod color;
pub mod config;
pub mod error;
pub mod types;

pub use color::Color;
pub use config::RenderConfig;
pub use error::CoverError;
pub use types::*;
