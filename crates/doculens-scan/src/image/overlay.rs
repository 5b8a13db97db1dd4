// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay rendering: draw detection contours and the selected document
// outline onto an annotation canvas.

use doculens_core::OverlayStyle;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use imageproc::point::Point;

use crate::detect::DrawCommand;

/// Draw every command onto `canvas`.
///
/// Debug contours are painted first so the selected outline always ends up
/// on top, whatever order the commands arrive in.
pub fn apply(canvas: &mut RgbImage, commands: &[DrawCommand], style: &OverlayStyle) {
    let contour = Rgb(style.contour_color);
    let selected = Rgb(style.selected_color);

    for command in commands.iter().filter(|c| !c.selected) {
        draw_closed_polygon(canvas, &command.polygon, contour, style.contour_thickness);
    }
    for command in commands.iter().filter(|c| c.selected) {
        draw_closed_polygon(canvas, &command.polygon, selected, style.selected_thickness);
    }
}

/// Stroke the closed outline through `points` with the given line width.
pub fn draw_closed_polygon(canvas: &mut RgbImage, points: &[Point<i32>], color: Rgb<u8>, thickness: u32) {
    if points.is_empty() || thickness == 0 {
        return;
    }
    if points.len() == 1 {
        let p = points[0];
        draw_filled_circle_mut(canvas, (p.x, p.y), (thickness / 2) as i32, color);
        return;
    }

    // Offsets centred on the true edge, e.g. -2..=1 for a 4 px stroke.
    let lo = -((thickness / 2) as i32);
    let hi = lo + thickness as i32 - 1;

    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let (ax, ay, bx, by) = (a.x as f32, a.y as f32, b.x as f32, b.y as f32);
        for offset in lo..=hi {
            let o = offset as f32;
            draw_line_segment_mut(canvas, (ax + o, ay), (bx + o, by), color);
            draw_line_segment_mut(canvas, (ax, ay + o), (bx, by + o), color);
        }
        if thickness > 2 {
            draw_filled_circle_mut(canvas, (a.x, a.y), (thickness / 2) as i32, color);
        }
    }
}
