// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection stages: edge preprocessing, contour filtering, corner ordering.

pub mod contour;
pub mod corners;
pub mod preprocess;

pub use contour::{Detection, DrawCommand, Quadrilateral, extract_best_quadrilateral};
pub use corners::{OrderedQuadrilateral, reorder};
pub use preprocess::preprocess;
