// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations for Footprint Union
//!
//! Thin layer over the i_overlay crate. Shapes are returned the way i_overlay
//! produces them: a list of shapes, each a list of contours where the first
//! contour is the outer boundary and the rest are holes. Contours are open
//! (the first point is not repeated at the end).

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// A shape: outer contour followed by hole contours
pub type Shape = Vec<Vec<Point2<f64>>>;

/// Union triangles one at a time into an accumulated region.
///
/// The union is order independent; only the starting vertex of the
/// resulting contours may differ between input orders.
pub fn union_triangles(triangles: &[[Point2<f64>; 3]]) -> Vec<Shape> {
    let mut accumulated: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut shapes: Vec<Vec<Vec<[f64; 2]>>> = Vec::new();

    for triangle in triangles {
        if !is_valid_contour(triangle) {
            continue;
        }

        let clip = vec![contour_to_path(&ensure_ccw(triangle))];
        shapes = if accumulated.is_empty() {
            clip.overlay(&Vec::<Vec<[f64; 2]>>::new(), OverlayRule::Union, FillRule::EvenOdd)
        } else {
            accumulated.overlay(&clip, OverlayRule::Union, FillRule::EvenOdd)
        };
        accumulated = shapes.iter().flatten().cloned().collect();
    }

    shapes
        .into_iter()
        .map(|shape| {
            shape
                .into_iter()
                .map(|contour| contour.into_iter().map(|p| Point2::new(p[0], p[1])).collect())
                .collect::<Shape>()
        })
        .filter(|shape| shape.first().is_some_and(|outer| is_valid_contour(outer)))
        .collect()
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let area = compute_signed_area(contour).abs();
    area > MIN_AREA_THRESHOLD
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let area = compute_signed_area(contour);
    if area < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let area = compute_signed_area(contour);
    if area > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON_2D: f64 = 1e-9;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_compute_signed_area_ccw() {
        let contour = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let area = compute_signed_area(&contour);
        assert!((area - 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_compute_signed_area_cw() {
        let contour = vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)];
        let area = compute_signed_area(&contour);
        assert!((area + 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_ensure_ccw_and_cw() {
        let cw = vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)];
        assert!(compute_signed_area(&ensure_ccw(&cw)) > 0.0);
        assert!(compute_signed_area(&ensure_cw(&ensure_ccw(&cw))) < 0.0);
    }

    #[test]
    fn test_is_valid_contour() {
        assert!(is_valid_contour(&[p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]));
        assert!(!is_valid_contour(&[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]));
        assert!(!is_valid_contour(&[p(0.0, 0.0), p(1.0, 0.0)]));
    }

    #[test]
    fn test_union_of_two_halves_is_square() {
        let triangles = [
            [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)],
            [p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)],
        ];
        let shapes = union_triangles(&triangles);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].len(), 1);
        assert!((compute_signed_area(&shapes[0][0]).abs() - 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_union_keeps_disjoint_shapes() {
        let triangles = [
            [p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)],
            [p(5.0, 5.0), p(6.0, 5.0), p(5.0, 6.0)],
        ];
        assert_eq!(union_triangles(&triangles).len(), 2);
    }

    #[test]
    fn test_union_skips_degenerate_triangles() {
        let triangles = [[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]];
        assert!(union_triangles(&triangles).is_empty());
    }
}
