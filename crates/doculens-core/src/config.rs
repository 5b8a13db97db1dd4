// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{DoculensError, Result};
use crate::types::{AspectRange, FrameSize, OverlayStyle};

/// Every tunable threshold of the detection and rectification pipeline.
///
/// Missing fields in a JSON file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Rectification output resolution (also the input resize target).
    pub target_size: FrameSize,
    /// Resize every incoming frame to `target_size` before processing.
    pub resize_input: bool,

    // -- Preprocessing --
    /// Side of the square Gaussian kernel (odd).
    pub blur_kernel: u32,
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Side of the square closing element (odd).
    pub close_kernel: u32,
    pub close_iterations: u32,

    // -- Contour filtering --
    /// Contours above this area are drawn on the debug overlay.
    pub overlay_min_area: f64,
    pub min_area: f64,
    /// Upper area bound as a fraction of the frame area.
    pub max_area_fraction: f64,
    /// Candidates whose bounding box comes within this many pixels of a border are rejected.
    pub border_margin: u32,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_fraction: f64,
    pub min_side_length: f64,
    pub aspect_ratio_range: AspectRange,

    // -- Rectification / display --
    pub crop_margin: u32,
    pub stack_scale: f32,
    pub overlay: OverlayStyle,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            target_size: FrameSize::default(),
            resize_input: true,
            blur_kernel: 5,
            blur_sigma: 1.0,
            canny_low: 50.0,
            canny_high: 150.0,
            close_kernel: 3,
            close_iterations: 2,
            overlay_min_area: 2000.0,
            min_area: 5000.0,
            max_area_fraction: 0.95,
            border_margin: 8,
            approx_epsilon_fraction: 0.02,
            min_side_length: 50.0,
            aspect_ratio_range: AspectRange::default(),
            crop_margin: 20,
            stack_scale: 0.6,
            overlay: OverlayStyle::default(),
        }
    }
}

impl ScannerConfig {
    /// Load a configuration from a JSON file and validate it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        debug!(target_size = %config.target_size, "Scanner configuration loaded");
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.target_size.is_empty() {
            return Err(invalid(format!(
                "target_size must be non-zero, got {}",
                self.target_size
            )));
        }
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(invalid(format!(
                "blur_kernel must be odd, got {}",
                self.blur_kernel
            )));
        }
        if !(self.blur_sigma > 0.0) {
            return Err(invalid(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if self.canny_low < 0.0 || self.canny_low > self.canny_high {
            return Err(invalid(format!(
                "canny thresholds must satisfy 0 <= low <= high, got ({}, {})",
                self.canny_low, self.canny_high
            )));
        }
        if self.close_kernel == 0 || self.close_kernel % 2 == 0 {
            return Err(invalid(format!(
                "close_kernel must be odd, got {}",
                self.close_kernel
            )));
        }
        if (self.close_kernel / 2) * self.close_iterations > u32::from(u8::MAX) {
            return Err(invalid("closing radius exceeds 255 pixels".to_string()));
        }
        if !(self.max_area_fraction > 0.0 && self.max_area_fraction <= 1.0) {
            return Err(invalid(format!(
                "max_area_fraction must lie in (0, 1], got {}",
                self.max_area_fraction
            )));
        }
        if self.min_area < 0.0 {
            return Err(invalid(format!(
                "min_area must not be negative, got {}",
                self.min_area
            )));
        }
        if !(self.approx_epsilon_fraction > 0.0) {
            return Err(invalid(format!(
                "approx_epsilon_fraction must be positive, got {}",
                self.approx_epsilon_fraction
            )));
        }
        let range = self.aspect_ratio_range;
        if !(range.min > 0.0 && range.min <= range.max) {
            return Err(invalid(format!(
                "aspect_ratio_range must satisfy 0 < min <= max, got [{}, {}]",
                range.min, range.max
            )));
        }
        if !(self.stack_scale > 0.0) {
            return Err(invalid(format!(
                "stack_scale must be positive, got {}",
                self.stack_scale
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> DoculensError {
    DoculensError::InvalidConfig(message)
}
