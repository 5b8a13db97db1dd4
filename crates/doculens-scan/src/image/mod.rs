// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: perspective rectification, overlay drawing, and grid stacking.

pub mod overlay;
pub mod rectify;
pub mod stack;

pub use rectify::{rectify, trim, warp, warp_document};
pub use stack::stack;
