// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge preprocessing: grayscale, Gaussian blur, Canny, and morphological
// closing so that document outlines form closed loops.

use doculens_core::ScannerConfig;
use image::{DynamicImage, GrayImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use imageproc::morphology::close;
use tracing::{debug, instrument};

/// Convert a frame into a binary edge mask of the same size.
///
/// ## Pipeline
///
/// 1. Convert to grayscale (single-channel input passes through)
/// 2. Gaussian blur with a `blur_kernel` x `blur_kernel` kernel
/// 3. Canny edge detection with `canny_low` / `canny_high` hysteresis
/// 4. Morphological closing with a `close_kernel` square element, repeated
///    `close_iterations` times
///
/// `imageproc::edges::canny` smooths its input with its own fixed
/// Gaussian (sigma 1.4) before taking gradients, so the edge detector sees the
/// configured blur followed by that one: an effective sigma of about
/// `sqrt(blur_sigma^2 + 1.4^2)`, roughly 1.7 with the defaults. Step edges
/// still land within a pixel of the true boundary.
///
/// Uniform or black frames yield an all-zero mask.
#[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
pub fn preprocess(frame: &DynamicImage, config: &ScannerConfig) -> GrayImage {
    let gray = frame.to_luma8();

    let kernel = gaussian_kernel(config.blur_kernel, config.blur_sigma);
    let blurred: GrayImage = separable_filter_equal(&gray, &kernel);

    let edges = canny(&blurred, config.canny_low, config.canny_high);
    debug!(
        edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count(),
        "Canny edge detection complete"
    );

    // Iterating a (2r+1)-square element n times equals one pass with radius r*n
    // under the chessboard norm.
    let radius = (config.close_kernel / 2) * config.close_iterations;
    let radius = u8::try_from(radius).unwrap_or(u8::MAX);
    if radius == 0 {
        return edges;
    }
    close(&edges, Norm::LInf, radius)
}

/// Normalised 1-D Gaussian kernel of odd length `size`.
fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let center = (size / 2) as f32;
    let denom = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let offset = i as f32 - center;
            (-(offset * offset) / denom).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}
