// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grid stacking: tile independently sized images into one canvas for
// side-by-side debug display.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use tracing::{debug, warn};

/// Compose a rows x cols grid of images into a single RGB canvas.
///
/// The (0, 0) cell sets the reference size. Every cell is resized to the
/// reference size, then both dimensions are scaled by `scale` (truncated).
/// Missing or zero-sized cells become black tiles and grayscale cells are
/// expanded to RGB. The column count comes from the first row; rows are
/// expected to have the same length (short rows are padded with black tiles,
/// extra cells are ignored).
///
/// Returns `None` when the grid or its first row is empty, when the
/// reference cell is missing or zero-sized, or when scaling yields a zero
/// tile size.
pub fn stack(scale: f32, grid: &[Vec<Option<&DynamicImage>>]) -> Option<RgbImage> {
    let first_row = grid.first()?;
    let reference = first_row.first().copied().flatten()?;
    let (ref_w, ref_h) = (reference.width(), reference.height());
    if ref_w == 0 || ref_h == 0 {
        return None;
    }

    let tile_w = (ref_w as f32 * scale) as u32;
    let tile_h = (ref_h as f32 * scale) as u32;
    if tile_w == 0 || tile_h == 0 {
        warn!(scale, ref_w, ref_h, "Stack scale collapses tiles to nothing");
        return None;
    }

    let rows = grid.len() as u32;
    let cols = first_row.len() as u32;
    let mut canvas = RgbImage::new(cols * tile_w, rows * tile_h);

    for (r, row) in grid.iter().enumerate() {
        for c in 0..first_row.len() {
            let cell = row.get(c).copied().flatten();
            if let Some(tile) = prepare_cell(cell, (ref_w, ref_h), (tile_w, tile_h)) {
                let x = i64::from(c as u32 * tile_w);
                let y = i64::from(r as u32 * tile_h);
                imageops::replace(&mut canvas, &tile, x, y);
            }
        }
    }

    debug!(
        rows,
        cols,
        width = canvas.width(),
        height = canvas.height(),
        "Image grid stacked"
    );
    Some(canvas)
}

/// Resize one cell to the tile size; `None` leaves the black canvas showing.
fn prepare_cell(
    cell: Option<&DynamicImage>,
    reference: (u32, u32),
    tile: (u32, u32),
) -> Option<RgbImage> {
    let cell = cell.filter(|img| img.width() > 0 && img.height() > 0)?;
    let rgb = cell.to_rgb8();

    let normalised = if rgb.dimensions() == reference {
        rgb
    } else {
        imageops::resize(&rgb, reference.0, reference.1, FilterType::Triangle)
    };
    if normalised.dimensions() == tile {
        return Some(normalised);
    }
    Some(imageops::resize(&normalised, tile.0, tile.1, FilterType::Triangle))
}
