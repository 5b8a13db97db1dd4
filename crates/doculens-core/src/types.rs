// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core value types for the Doculens scanner.

use serde::{Deserialize, Serialize};

/// Target resolution of the rectified document, fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered by a frame of this size.
    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Inclusive range accepted for the width/height ratio of a candidate document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRange {
    pub min: f64,
    pub max: f64,
}

impl AspectRange {
    pub fn contains(&self, ratio: f64) -> bool {
        ratio >= self.min && ratio <= self.max
    }
}

impl Default for AspectRange {
    fn default() -> Self {
        Self { min: 0.4, max: 3.0 }
    }
}

/// Colors and stroke widths used when drawing the debug overlay.
///
/// Colors are RGB triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// Color of every sufficiently large contour.
    pub contour_color: [u8; 3],
    pub contour_thickness: u32,
    /// Color of the selected document outline.
    pub selected_color: [u8; 3],
    pub selected_thickness: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            contour_color: [0, 0, 255],
            contour_thickness: 1,
            selected_color: [0, 255, 0],
            selected_thickness: 4,
        }
    }
}
