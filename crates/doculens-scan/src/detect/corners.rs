// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering: label four unordered quadrilateral vertices as
// top-left / top-right / bottom-left / bottom-right.

use doculens_core::error::{DoculensError, Result};
use imageproc::point::Point;

/// Quadrilateral corners in canonical order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedQuadrilateral {
    pub top_left: Point<f32>,
    pub top_right: Point<f32>,
    pub bottom_left: Point<f32>,
    pub bottom_right: Point<f32>,
}

impl OrderedQuadrilateral {
    /// Corners as `(x, y)` pairs in TL, TR, BL, BR order.
    pub fn to_array(&self) -> [(f32, f32); 4] {
        [
            (self.top_left.x, self.top_left.y),
            (self.top_right.x, self.top_right.y),
            (self.bottom_left.x, self.bottom_left.y),
            (self.bottom_right.x, self.bottom_right.y),
        ]
    }

    /// Area of the outline TL → TR → BR → BL; zero when corners coincide.
    pub fn area(&self) -> f32 {
        let ring = [self.top_left, self.top_right, self.bottom_right, self.bottom_left];
        let twice: f32 = (0..4)
            .map(|i| {
                let a = ring[i];
                let b = ring[(i + 1) % 4];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice.abs() / 2.0
    }

    /// Whether two labels share a point, which happens when `reorder` hits ties.
    pub fn has_coincident_corners(&self) -> bool {
        let corners = [self.top_left, self.top_right, self.bottom_left, self.bottom_right];
        (0..4).any(|i| (i + 1..4).any(|j| corners[i] == corners[j]))
    }
}

/// Label four points using the sum / difference heuristic.
///
/// The smallest `x + y` is the top-left corner and the largest the
/// bottom-right; the smallest `x - y` is labelled top-right and the largest
/// bottom-left. In image coordinates (y grows downward) the last two labels
/// sit on the transposed diagonal, so the rectified output is reflected
/// across its main diagonal relative to the frame.
///
/// The result does not depend on input order unless two sums or two
/// differences are equal, in which case the lowest input index wins. Ties can
/// put two labels on the same point (a diamond yields `top_left ==
/// bottom_left`); [`crate::image::warp`] rejects such a collapsed outline
/// with [`DoculensError::DegenerateTransform`].
///
/// Returns [`DoculensError::InvalidQuadrilateral`] unless exactly four points
/// are given.
pub fn reorder(points: &[Point<i32>]) -> Result<OrderedQuadrilateral> {
    let points: &[Point<i32>; 4] = points
        .try_into()
        .map_err(|_| DoculensError::InvalidQuadrilateral(points.len()))?;
    let pts = points.map(|p| Point::new(p.x as f32, p.y as f32));

    let sums = pts.map(|p| p.x + p.y);
    let diffs = pts.map(|p| p.x - p.y);

    Ok(OrderedQuadrilateral {
        top_left: pts[first_extreme(&sums, |a, b| a < b)],
        top_right: pts[first_extreme(&diffs, |a, b| a < b)],
        bottom_left: pts[first_extreme(&diffs, |a, b| a > b)],
        bottom_right: pts[first_extreme(&sums, |a, b| a > b)],
    })
}

/// Index of the first value that no later value strictly beats.
fn first_extreme(values: &[f32; 4], beats: impl Fn(f32, f32) -> bool) -> usize {
    let mut index = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if beats(value, values[index]) {
            index = i;
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: i32, y: i32) -> Point<i32> {
        Point::new(x, y)
    }

    fn fpt(x: f32, y: f32) -> Point<f32> {
        Point::new(x, y)
    }

    #[test]
    fn labels_axis_aligned_rectangle() {
        let ordered = reorder(&[pt(500, 100), pt(100, 400), pt(100, 100), pt(500, 400)])
            .expect("four points");
        assert_eq!(ordered.top_left, fpt(100.0, 100.0));
        // Minimum x - y (-300) is top-right, maximum (400) bottom-left.
        assert_eq!(ordered.top_right, fpt(100.0, 400.0));
        assert_eq!(ordered.bottom_left, fpt(500.0, 100.0));
        assert_eq!(ordered.bottom_right, fpt(500.0, 400.0));
        assert_eq!(ordered.area(), 120_000.0);
        assert!(!ordered.has_coincident_corners());
    }

    #[test]
    fn invariant_under_rotation_and_reflection() {
        let quad = [pt(120, 90), pt(520, 130), pt(480, 420), pt(90, 380)];
        let expected = reorder(&quad).expect("four points");
        assert_eq!(expected.top_left, fpt(120.0, 90.0));
        assert_eq!(expected.top_right, fpt(90.0, 380.0));
        assert_eq!(expected.bottom_right, fpt(480.0, 420.0));
        assert_eq!(expected.bottom_left, fpt(520.0, 130.0));

        for shift in 0..4 {
            let mut rotated = quad;
            rotated.rotate_left(shift);
            assert_eq!(reorder(&rotated).expect("rotated"), expected);

            let mut reflected = rotated;
            reflected.reverse();
            assert_eq!(reorder(&reflected).expect("reflected"), expected);
        }
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        // A diamond: sums and differences tie pairwise.
        let diamond = [pt(200, 100), pt(300, 200), pt(200, 300), pt(100, 200)];
        let ordered = reorder(&diamond).expect("four points");
        assert_eq!(ordered.top_left, fpt(200.0, 100.0));
        assert_eq!(ordered.top_right, fpt(200.0, 300.0));
        assert_eq!(ordered.bottom_left, fpt(200.0, 100.0));
        assert_eq!(ordered.bottom_right, fpt(300.0, 200.0));
        // Two labels collapse onto one point.
        assert!(ordered.has_coincident_corners());
    }

    #[test]
    fn wrong_point_count_is_an_error() {
        let err = reorder(&[pt(0, 0), pt(10, 0), pt(0, 10)]).unwrap_err();
        assert!(matches!(err, DoculensError::InvalidQuadrilateral(3)));
        assert!(reorder(&[]).is_err());
        assert!(reorder(&[pt(0, 0); 5]).is_err());
    }
}
