// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-frame scanning pipeline: resize, edge mask, quadrilateral detection,
// overlay, rectification, and the stacked "Work Flow" composite.

use doculens_core::ScannerConfig;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};
use tracing::{debug, info, instrument, warn};

use crate::detect::{Quadrilateral, extract_best_quadrilateral, preprocess};
use crate::image::{overlay, stack, warp_document};

/// Everything produced while scanning one frame.
#[derive(Debug, Clone)]
pub struct FrameResult {
    /// The (possibly resized) input frame.
    pub frame: RgbImage,
    /// Closed Canny edge mask.
    pub edge_mask: GrayImage,
    /// Frame copy with contour overlay.
    pub annotated: RgbImage,
    /// Detected document outline in approximation order.
    pub quadrilateral: Option<Quadrilateral>,
    /// Rectified document, `None` when nothing was detected or the warp failed.
    pub rectified: Option<RgbImage>,
    /// 2x2 debug grid: frame, edge mask, annotated frame, displayed result.
    pub composite: Option<RgbImage>,
}

impl FrameResult {
    pub fn detected(&self) -> bool {
        self.quadrilateral.is_some()
    }

    /// The image shown as the scan result: the rectified document if any,
    /// otherwise the frame itself.
    pub fn display(&self) -> &RgbImage {
        self.rectified.as_ref().unwrap_or(&self.frame)
    }
}

/// Runs the detection and rectification pipeline on individual frames.
///
/// A scanner holds no per-frame state, so frames may be processed in any
/// order and each result depends only on its own input.
#[derive(Debug, Clone, Default)]
pub struct DocumentScanner {
    config: ScannerConfig,
}

impl DocumentScanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Process one frame end to end.
    ///
    /// Never fails: a frame without a usable document simply yields
    /// `rectified == None`, and a failed warp is logged and treated the same way.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn process_frame(&self, frame: &DynamicImage) -> FrameResult {
        let config = &self.config;
        let frame = self.prepare_frame(frame);

        let edge_mask = preprocess(&frame, config);
        let detection = extract_best_quadrilateral(&edge_mask, config);

        let mut annotated = frame.to_rgb8();
        overlay::apply(&mut annotated, &detection.overlay, &config.overlay);

        let rectified = detection.quadrilateral.and_then(|quad| {
            match warp_document(&frame, &quad.points, config.target_size, config.crop_margin) {
                Ok(image) => Some(image),
                Err(err) => {
                    warn!(error = %err, "Rectification failed, showing the raw frame");
                    None
                }
            }
        });

        let frame_rgb = frame.to_rgb8();
        let composite = {
            let mask_cell = DynamicImage::ImageLuma8(edge_mask.clone());
            let annotated_cell = DynamicImage::ImageRgb8(annotated.clone());
            let result_cell = DynamicImage::ImageRgb8(rectified.clone().unwrap_or_else(|| frame_rgb.clone()));
            stack(
                config.stack_scale,
                &[
                    vec![Some(&frame), Some(&mask_cell)],
                    vec![Some(&annotated_cell), Some(&result_cell)],
                ],
            )
        };

        if let Some(quad) = &detection.quadrilateral {
            info!(corners = ?quad.points, area = detection.area, "Document detected");
        } else {
            debug!(contours = detection.contour_count, "No document in frame");
        }

        FrameResult {
            frame: frame_rgb,
            edge_mask,
            annotated,
            quadrilateral: detection.quadrilateral,
            rectified,
            composite,
        }
    }

    /// Resize to the target size when configured to and the size differs.
    fn prepare_frame(&self, frame: &DynamicImage) -> DynamicImage {
        let target = self.config.target_size;
        let resize = self.config.resize_input
            && !target.is_empty()
            && (frame.width(), frame.height()) != (target.width, target.height);
        if !resize {
            return frame.clone();
        }
        debug!(
            from_width = frame.width(),
            from_height = frame.height(),
            to = %target,
            "Resizing input frame"
        );
        DynamicImage::ImageRgb8(imageops::resize(
            &frame.to_rgb8(),
            target.width,
            target.height,
            FilterType::Triangle,
        ))
    }
}
