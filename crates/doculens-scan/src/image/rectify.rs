// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: map the ordered document quadrilateral onto
// the target rectangle, then trim a fixed border to drop edge artifacts.

use doculens_core::FrameSize;
use doculens_core::error::{DoculensError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::point::Point;
use tracing::{debug, instrument, warn};

use crate::detect::corners::{OrderedQuadrilateral, reorder};

/// Order `corners` and rectify the document they outline.
///
/// Fails with [`DoculensError::InvalidQuadrilateral`] unless exactly four
/// corners are given.
pub fn warp_document(
    frame: &DynamicImage,
    corners: &[Point<i32>],
    target: FrameSize,
    crop_margin: u32,
) -> Result<RgbImage> {
    let ordered = reorder(corners)?;
    rectify(frame, &ordered, target, crop_margin)
}

/// Warp the document to `target` and trim `crop_margin` pixels from each side.
///
/// The output is always `target` sized. When the margin leaves no usable
/// interior the untrimmed warp is returned.
#[instrument(skip(frame, quad, target), fields(target_size = %target))]
pub fn rectify(
    frame: &DynamicImage,
    quad: &OrderedQuadrilateral,
    target: FrameSize,
    crop_margin: u32,
) -> Result<RgbImage> {
    let warped = warp(frame, quad, target)?;
    if warped.width() == 0 || warped.height() == 0 {
        return Ok(warped);
    }
    Ok(trim(warped, crop_margin))
}

/// Resample the quadrilateral into a `target` sized RGB image.
///
/// Corners map TL → (0, 0), TR → (W, 0), BL → (0, H), BR → (W, H). Pixels
/// that fall outside the source frame are black. Outlines whose labels
/// collapse onto a shared point are [`DoculensError::DegenerateTransform`].
pub fn warp(frame: &DynamicImage, quad: &OrderedQuadrilateral, target: FrameSize) -> Result<RgbImage> {
    if target.is_empty() {
        warn!(target = %target, "Empty rectification target");
        return Ok(RgbImage::new(target.width, target.height));
    }
    if quad.area() < 1.0 || quad.has_coincident_corners() {
        return Err(DoculensError::DegenerateTransform);
    }

    let (w, h) = (target.width as f32, target.height as f32);
    let dest = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];
    let projection = Projection::from_control_points(quad.to_array(), dest)
        .ok_or(DoculensError::DegenerateTransform)?;

    let source = frame.to_rgb8();
    let mut output = RgbImage::new(target.width, target.height);
    warp_into(
        &source,
        &projection,
        Interpolation::Bilinear,
        Rgb([0u8, 0, 0]),
        &mut output,
    );
    debug!(corners = ?quad.to_array(), "Perspective warp applied");
    Ok(output)
}

/// Crop `margin` pixels from every side and scale back to the original size.
///
/// Returns the image unchanged when either dimension is at most `2 * margin`.
pub fn trim(image: RgbImage, margin: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let (w, h, m) = (i64::from(width), i64::from(height), i64::from(margin));

    // Requested crop, clamped to the image.
    let x0 = m.clamp(0, w);
    let y0 = m.clamp(0, h);
    let x1 = (m + (w - 2 * m)).clamp(0, w);
    let y1 = (m + (h - 2 * m)).clamp(0, h);
    let (crop_w, crop_h) = (x1 - x0, y1 - y0);

    if w - 2 * m <= 0 || h - 2 * m <= 0 || crop_w <= 0 || crop_h <= 0 {
        debug!(width, height, margin, "Trim skipped, margin leaves no interior");
        return image;
    }

    let cropped = imageops::crop_imm(&image, x0 as u32, y0 as u32, crop_w as u32, crop_h as u32)
        .to_image();
    imageops::resize(&cropped, width, height, FilterType::Triangle)
}
