// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour extraction: outer boundary tracing, area ranking, and the
// geometric filter chain that selects the document quadrilateral.

use doculens_core::ScannerConfig;
use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;
use tracing::{debug, info, instrument, trace};

/// Four polygon vertices in approximation order (not yet labelled).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrilateral {
    pub points: [Point<i32>; 4],
}

impl Quadrilateral {
    /// Enclosed area (shoelace).
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }
}

/// A polygon the caller should draw on its annotation canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCommand {
    pub polygon: Vec<Point<i32>>,
    /// `true` for the chosen document outline, `false` for the debug contours.
    pub selected: bool,
}

/// Outcome of quadrilateral detection on one edge mask.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Best candidate, `None` when no document is visible.
    pub quadrilateral: Option<Quadrilateral>,
    /// Contour area of the selected candidate (0 when nothing was selected).
    pub area: f64,
    /// Number of outer contours found in the mask.
    pub contour_count: usize,
    /// Overlay drawing, debug contours first and the selection last.
    pub overlay: Vec<DrawCommand>,
}

impl Detection {
    pub fn is_found(&self) -> bool {
        self.quadrilateral.is_some()
    }
}

/// Why a contour was not accepted as a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Area outside `[min_area, max_area_fraction * frame_area]`.
    Area(f64),
    /// The simplified polygon does not have exactly four vertices.
    VertexCount(usize),
    NotConvex,
    /// Bounding box within `border_margin` of a frame edge.
    TouchesBorder,
    /// Averaged opposite sides shorter than `min_side_length`.
    SideTooShort { width: f64, height: f64 },
    AspectRatio(f64),
}

/// Find the largest contour in `edge_mask` that looks like a document.
///
/// ## Filter chain
///
/// Contours are ranked by area (descending) and each is checked in order
/// against:
///
/// 1. area within `[min_area, max_area_fraction * frame_area]`
/// 2. exactly 4 vertices after Douglas-Peucker simplification with a
///    tolerance of `approx_epsilon_fraction * perimeter`
/// 3. convexity
/// 4. bounding box clear of every frame border by more than `border_margin`
/// 5. averaged opposite side lengths of at least `min_side_length`
/// 6. width / height ratio inside `aspect_ratio_range`
///
/// The maximum-area survivor is selected; ties keep the earlier contour.
/// Every contour above `overlay_min_area` becomes a debug draw command, and
/// the selection (if any) is appended last.
#[instrument(skip_all, fields(width = edge_mask.width(), height = edge_mask.height()))]
pub fn extract_best_quadrilateral(edge_mask: &GrayImage, config: &ScannerConfig) -> Detection {
    let (width, height) = edge_mask.dimensions();

    let mut ranked: Vec<(f64, Vec<Point<i32>>)> = outer_contours(edge_mask)
        .into_iter()
        .map(|contour| (polygon_area(&contour), contour))
        .collect();
    // Stable sort: equal areas keep tracing order.
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    debug!(contours = ranked.len(), "Outer contours ranked by area");

    let mut overlay: Vec<DrawCommand> = ranked
        .iter()
        .filter(|(area, _)| *area > config.overlay_min_area)
        .map(|(_, contour)| DrawCommand {
            polygon: contour.clone(),
            selected: false,
        })
        .collect();

    let mut best: Option<(f64, Quadrilateral)> = None;
    for (rank, (area, contour)) in ranked.iter().enumerate() {
        match evaluate_candidate(contour, *area, width, height, config) {
            Ok(quad) => {
                if best.is_none_or(|(best_area, _)| *area > best_area) {
                    best = Some((*area, quad));
                }
            }
            Err(reason) => trace!(rank, area, ?reason, "Contour rejected"),
        }
    }

    let contour_count = ranked.len();
    match best {
        Some((area, quad)) => {
            info!(area, corners = ?quad.points, "Document quadrilateral selected");
            overlay.push(DrawCommand {
                polygon: quad.points.to_vec(),
                selected: true,
            });
            Detection {
                quadrilateral: Some(quad),
                area,
                contour_count,
                overlay,
            }
        }
        None => {
            debug!(contour_count, "No contour passed the document filters");
            Detection {
                quadrilateral: None,
                area: 0.0,
                contour_count,
                overlay,
            }
        }
    }
}

/// Run one contour through the document filter chain.
///
/// `area` is the contour's own shoelace area and `frame_width` /
/// `frame_height` the mask dimensions.
pub fn evaluate_candidate(
    contour: &[Point<i32>],
    area: f64,
    frame_width: u32,
    frame_height: u32,
    config: &ScannerConfig,
) -> Result<Quadrilateral, Rejection> {
    let frame_area = f64::from(frame_width) * f64::from(frame_height);
    if area < config.min_area || area > config.max_area_fraction * frame_area {
        return Err(Rejection::Area(area));
    }

    let epsilon = config.approx_epsilon_fraction * closed_perimeter(contour);
    if contour.len() < 4 || !(epsilon > 0.0) {
        return Err(Rejection::VertexCount(contour.len()));
    }
    let approx = approximate_closed_polygon(contour, epsilon);
    let points: [Point<i32>; 4] = approx
        .as_slice()
        .try_into()
        .map_err(|_| Rejection::VertexCount(approx.len()))?;

    if !is_convex(&points) {
        return Err(Rejection::NotConvex);
    }

    let margin = i64::from(config.border_margin);
    let (min_x, min_y, max_x, max_y) = bounding_box(&points);
    if min_x <= margin
        || min_y <= margin
        || max_x + 1 >= i64::from(frame_width) - margin
        || max_y + 1 >= i64::from(frame_height) - margin
    {
        return Err(Rejection::TouchesBorder);
    }

    let width = (distance(points[0], points[1]) + distance(points[2], points[3])) / 2.0;
    let height = (distance(points[1], points[2]) + distance(points[3], points[0])) / 2.0;
    if width < config.min_side_length || height < config.min_side_length {
        return Err(Rejection::SideTooShort { width, height });
    }

    let ratio = width / height;
    if !config.aspect_ratio_range.contains(ratio) {
        return Err(Rejection::AspectRatio(ratio));
    }

    Ok(Quadrilateral { points })
}

// -- Contour helpers ----------------------------------------------------------

/// Outermost boundaries only: holes and anything nested inside them are skipped.
fn outer_contours(edge_mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(edge_mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y)
        })
        .sum();
    twice.abs() as f64 / 2.0
}

fn closed_perimeter(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| distance(points[i], points[(i + 1) % n])).sum()
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    dx.hypot(dy)
}

/// Inclusive bounding box as `(min_x, min_y, max_x, max_y)`.
fn bounding_box(points: &[Point<i32>]) -> (i64, i64, i64, i64) {
    points.iter().fold(
        (i64::MAX, i64::MAX, i64::MIN, i64::MIN),
        |(min_x, min_y, max_x, max_y), p| {
            let (x, y) = (i64::from(p.x), i64::from(p.y));
            (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
        },
    )
}

/// A polygon is convex when every turn has the same orientation.
pub fn is_convex(points: &[Point<i32>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut orientation = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = i64::from(b.x - a.x) * i64::from(c.y - b.y)
            - i64::from(b.y - a.y) * i64::from(c.x - b.x);
        if cross == 0 {
            continue;
        }
        let sign = cross.signum();
        if orientation == 0 {
            orientation = sign;
        } else if sign != orientation {
            return false;
        }
    }
    orientation != 0
}

// -- Polygon simplification ---------------------------------------------------

/// Douglas-Peucker simplification of a closed curve.
///
/// The curve is split at two mutually distant points (both are always
/// vertices of a convex outline), each half is simplified as an open chain,
/// and the halves are joined. The result keeps the curve's orientation.
pub fn approximate_closed_polygon(contour: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = contour.len();
    if n < 3 {
        return contour.to_vec();
    }

    let farthest_from = |origin: Point<i32>| -> usize {
        let mut index = 0;
        let mut best = -1i64;
        for (i, p) in contour.iter().enumerate() {
            let dx = i64::from(p.x - origin.x);
            let dy = i64::from(p.y - origin.y);
            let d = dx * dx + dy * dy;
            if d > best {
                best = d;
                index = i;
            }
        }
        index
    };
    let b = farthest_from(contour[0]);
    let a = farthest_from(contour[b]);
    if a == b {
        return vec![contour[a]];
    }

    let mut result = Vec::new();
    for (from, to) in [(a, b), (b, a)] {
        let len = (to + n - from) % n + 1;
        let chain: Vec<Point<i32>> = (0..len).map(|k| contour[(from + k) % n]).collect();
        let kept = simplify_open_chain(&chain, epsilon);
        result.extend_from_slice(&kept[..kept.len() - 1]);
    }
    result
}

/// Iterative Douglas-Peucker on an open chain; both endpoints are kept.
fn simplify_open_chain(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }
        let mut max_dist = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let dist = point_to_line_distance(points[i], points[start], points[end]);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }
        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Distance from `p` to the line through `a` and `b` (or to `a` if they coincide).
fn point_to_line_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let length = dx.hypot(dy);
    if length == 0.0 {
        return distance(p, a);
    }
    let cross = dx * f64::from(p.y - a.y) - dy * f64::from(p.x - a.x);
    cross.abs() / length
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_hollow_rect_mut, draw_polygon_mut};
    use imageproc::rect::Rect;

    fn pt(x: i32, y: i32) -> Point<i32> {
        Point::new(x, y)
    }

    fn mask_with_outline(x: i32, y: i32, w: u32, h: u32) -> GrayImage {
        let mut mask = GrayImage::new(640, 480);
        draw_hollow_rect_mut(&mut mask, Rect::at(x, y).of_size(w, h), Luma([255u8]));
        mask
    }

    #[test]
    fn shoelace_area_of_rectangle() {
        let square = [pt(0, 0), pt(10, 0), pt(10, 5), pt(0, 5)];
        assert_eq!(polygon_area(&square), 50.0);
        // Orientation does not matter.
        let reversed = [pt(0, 5), pt(10, 5), pt(10, 0), pt(0, 0)];
        assert_eq!(polygon_area(&reversed), 50.0);
    }

    #[test]
    fn convexity_detects_reflex_vertex() {
        assert!(is_convex(&[pt(0, 0), pt(10, 0), pt(10, 10), pt(0, 10)]));
        assert!(!is_convex(&[pt(0, 0), pt(10, 0), pt(3, 3), pt(0, 10)]));
        assert!(!is_convex(&[pt(0, 0), pt(5, 0), pt(10, 0)]));
    }

    #[test]
    fn simplification_keeps_rectangle_corners() {
        // Dense outline of a 100x60 rectangle, starting mid-edge.
        let mut outline = Vec::new();
        for x in 50..=100 {
            outline.push(pt(x, 0));
        }
        for y in 1..=60 {
            outline.push(pt(100, y));
        }
        for x in (0..100).rev() {
            outline.push(pt(x, 60));
        }
        for y in (0..60).rev() {
            outline.push(pt(0, y));
        }
        for x in 1..50 {
            outline.push(pt(x, 0));
        }

        let approx = approximate_closed_polygon(&outline, 0.02 * closed_perimeter(&outline));
        assert_eq!(approx.len(), 4, "got {approx:?}");
        for corner in [pt(0, 0), pt(100, 0), pt(100, 60), pt(0, 60)] {
            assert!(approx.contains(&corner), "missing corner {corner:?} in {approx:?}");
        }
    }

    #[test]
    fn implanted_rectangle_is_detected() {
        let mask = mask_with_outline(100, 100, 400, 300);
        let detection = extract_best_quadrilateral(&mask, &ScannerConfig::default());

        let quad = detection.quadrilateral.expect("rectangle should be found");
        for corner in [pt(100, 100), pt(499, 100), pt(499, 399), pt(100, 399)] {
            assert!(quad.points.contains(&corner), "missing {corner:?} in {quad:?}");
        }
        assert!(detection.area > 100_000.0);

        let selected: Vec<_> = detection.overlay.iter().filter(|c| c.selected).collect();
        assert_eq!(selected.len(), 1);
        assert!(detection.overlay.last().is_some_and(|c| c.selected));
    }

    #[test]
    fn empty_mask_yields_no_detection() {
        let mask = GrayImage::new(640, 480);
        let detection = extract_best_quadrilateral(&mask, &ScannerConfig::default());
        assert!(!detection.is_found());
        assert_eq!(detection.contour_count, 0);
        assert!(detection.overlay.is_empty());
    }

    #[test]
    fn larger_valid_candidate_wins() {
        let mut mask = mask_with_outline(40, 40, 200, 150);
        draw_hollow_rect_mut(&mut mask, Rect::at(300, 100).of_size(300, 250), Luma([255u8]));

        let detection = extract_best_quadrilateral(&mask, &ScannerConfig::default());
        let quad = detection.quadrilateral.expect("a rectangle should be found");
        assert!(quad.points.contains(&pt(300, 100)));
        assert!(quad.points.contains(&pt(599, 349)));
        // Both outlines exceed the overlay threshold.
        assert_eq!(detection.overlay.iter().filter(|c| !c.selected).count(), 2);
    }

    #[test]
    fn rectangle_touching_border_is_rejected() {
        let mask = mask_with_outline(0, 100, 300, 200);
        let detection = extract_best_quadrilateral(&mask, &ScannerConfig::default());
        assert!(!detection.is_found());

        let contour = [pt(0, 100), pt(299, 100), pt(299, 299), pt(0, 299)];
        let area = polygon_area(&contour);
        let dense: Vec<_> = dense_outline(&contour);
        assert_eq!(
            evaluate_candidate(&dense, area, 640, 480, &ScannerConfig::default()),
            Err(Rejection::TouchesBorder)
        );
    }

    #[test]
    fn rectangle_inside_margin_is_rejected() {
        // Exactly `border_margin` pixels from the left edge.
        let mask = mask_with_outline(8, 100, 300, 200);
        let detection = extract_best_quadrilateral(&mask, &ScannerConfig::default());
        assert!(!detection.is_found());
    }

    #[test]
    fn triangle_is_rejected_on_vertex_count() {
        let mut mask = GrayImage::new(640, 480);
        draw_polygon_mut(
            &mut mask,
            &[pt(100, 400), pt(320, 60), pt(540, 400)],
            Luma([255u8]),
        );
        let detection = extract_best_quadrilateral(&mask, &ScannerConfig::default());
        assert!(!detection.is_found());

        let triangle = dense_outline(&[pt(100, 400), pt(320, 60), pt(540, 400)]);
        let area = polygon_area(&triangle);
        assert_eq!(
            evaluate_candidate(&triangle, area, 640, 480, &ScannerConfig::default()),
            Err(Rejection::VertexCount(3))
        );
    }

    #[test]
    fn small_and_elongated_candidates_are_rejected() {
        let config = ScannerConfig::default();

        let small = dense_outline(&[pt(100, 100), pt(150, 100), pt(150, 150), pt(100, 150)]);
        assert!(matches!(
            evaluate_candidate(&small, polygon_area(&small), 640, 480, &config),
            Err(Rejection::Area(_))
        ));

        let strip = dense_outline(&[pt(20, 200), pt(620, 200), pt(620, 260), pt(20, 260)]);
        let result = evaluate_candidate(&strip, polygon_area(&strip), 640, 480, &config);
        assert!(matches!(result, Err(Rejection::AspectRatio(_))), "got {result:?}");
    }

    #[test]
    fn short_sided_candidate_is_rejected() {
        // 300 x 40: large enough by area, too thin by side length.
        let thin = dense_outline(&[pt(100, 200), pt(400, 200), pt(400, 240), pt(100, 240)]);
        let area = polygon_area(&thin);
        assert!(area >= ScannerConfig::default().min_area);

        let result = evaluate_candidate(&thin, area, 640, 480, &ScannerConfig::default());
        assert!(
            matches!(result, Err(Rejection::SideTooShort { width, height }) if width == 300.0 && height == 40.0),
            "got {result:?}"
        );
    }

    #[test]
    fn concave_quadrilateral_is_rejected() {
        let dart = dense_outline(&[pt(100, 100), pt(400, 100), pt(250, 180), pt(100, 400)]);
        let area = polygon_area(&dart);
        assert_eq!(area, 34_500.0);
        assert_eq!(
            evaluate_candidate(&dart, area, 640, 480, &ScannerConfig::default()),
            Err(Rejection::NotConvex)
        );
    }

    #[test]
    fn near_full_frame_candidate_is_rejected() {
        // 630 x 470 exceeds 0.95 of a 640 x 480 frame.
        let outline = dense_outline(&[pt(5, 5), pt(635, 5), pt(635, 475), pt(5, 475)]);
        let area = polygon_area(&outline);
        assert_eq!(area, 296_100.0);
        assert_eq!(
            evaluate_candidate(&outline, area, 640, 480, &ScannerConfig::default()),
            Err(Rejection::Area(296_100.0))
        );

        let relaxed = ScannerConfig {
            max_area_fraction: 1.0,
            border_margin: 0,
            ..ScannerConfig::default()
        };
        assert!(evaluate_candidate(&outline, area, 640, 480, &relaxed).is_ok());
    }

    #[test]
    fn thresholds_come_from_config() {
        let config = ScannerConfig {
            min_area: 100.0,
            min_side_length: 5.0,
            border_margin: 1,
            ..ScannerConfig::default()
        };
        let mut mask = GrayImage::new(64, 48);
        draw_hollow_rect_mut(&mut mask, Rect::at(10, 10).of_size(30, 20), Luma([255u8]));
        let detection = extract_best_quadrilateral(&mask, &config);
        assert!(detection.is_found());
    }

    /// Every integer point along the closed polygon through `corners`.
    fn dense_outline(corners: &[Point<i32>]) -> Vec<Point<i32>> {
        let mut out = Vec::new();
        for i in 0..corners.len() {
            let a = corners[i];
            let b = corners[(i + 1) % corners.len()];
            let steps = (b.x - a.x).abs().max((b.y - a.y).abs());
            for s in 0..steps {
                let t = s as f64 / steps as f64;
                out.push(pt(
                    (f64::from(a.x) + t * f64::from(b.x - a.x)).round() as i32,
                    (f64::from(a.y) + t * f64::from(b.y - a.y)).round() as i32,
                ));
            }
        }
        out
    }
}
