// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// doculens-scan: Document detection and rectification for single video frames.
//
// Provides edge preprocessing, quadrilateral detection over outer contours,
// canonical corner ordering, perspective rectification with border trim, and
// the debug overlay / image stacking used to visualise each stage.

pub mod detect;
pub mod image;
pub mod scanner;

// Re-export the primary entry points so callers can use `doculens_scan::DocumentScanner` etc.
pub use crate::detect::contour::{Detection, DrawCommand, Quadrilateral, extract_best_quadrilateral};
pub use crate::detect::corners::{OrderedQuadrilateral, reorder};
pub use crate::detect::preprocess::preprocess;
pub use crate::image::rectify::{rectify, warp_document};
pub use crate::image::stack::stack;
pub use crate::scanner::{DocumentScanner, FrameResult};
