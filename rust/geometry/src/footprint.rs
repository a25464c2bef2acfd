// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint extraction
//!
//! A footprint is the 2D outline of a mesh's horizontal faces: every triangle
//! whose three vertices share the same Z is projected onto the XY plane,
//! duplicates are dropped and the rest are unioned into one polygon.

use crate::bool2d::{compute_signed_area, ensure_ccw, ensure_cw, union_triangles};
use nalgebra::Point2;
use rustc_hash::FxHashSet;

/// Tolerance (meters) for treating three Z values as equal
pub const FLAT_EPSILON: f64 = 1e-6;

/// A triangle as three XYZ corners
pub type Triangle3 = [[f64; 3]; 3];

/// Ground polygon derived from a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    /// Counter-clockwise outer ring, open (first point not repeated)
    pub outer: Vec<Point2<f64>>,
    /// Clockwise hole rings, open
    pub holes: Vec<Vec<Point2<f64>>>,
    /// Lowest Z among the flat triangles that built the footprint
    pub elevation: f64,
}

/// Order-independent identity of a triangle, built from its vertex positions
pub type TriangleKey = [[u64; 3]; 3];

/// Key a triangle by its sorted vertex positions so that the same three
/// corners in any order (or under different vertex indices) collide.
pub fn triangle_key(triangle: &Triangle3) -> TriangleKey {
    let bits = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
    let mut key = triangle.map(|[x, y, z]| [bits(x), bits(y), bits(z)]);
    key.sort_unstable();
    key
}

/// Whether all three corners lie at the same height
#[inline]
pub fn is_flat(triangle: &Triangle3) -> bool {
    let [a, b, c] = triangle;
    (a[2] - b[2]).abs() <= FLAT_EPSILON && (a[2] - c[2]).abs() <= FLAT_EPSILON
}

/// Flat triangles of a mesh with duplicates removed, in first-seen order.
///
/// Triangles referencing vertices outside the position buffer are skipped.
pub fn flat_triangles(positions: &[f64], triangles: &[u32]) -> Vec<Triangle3> {
    let vertex_count = positions.len() / 3;
    let vertex = |i: u32| {
        let i = i as usize;
        [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]]
    };

    let mut seen: FxHashSet<TriangleKey> = FxHashSet::default();
    let mut selected = Vec::new();
    let mut skipped = 0usize;

    for tri in triangles.chunks_exact(3) {
        if tri.iter().any(|&i| i as usize >= vertex_count) {
            skipped += 1;
            continue;
        }
        let triangle = [vertex(tri[0]), vertex(tri[1]), vertex(tri[2])];
        if is_flat(&triangle) && seen.insert(triangle_key(&triangle)) {
            selected.push(triangle);
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Skipped triangles with out-of-range vertex indices");
    }
    selected
}

/// Derive the footprint of a mesh.
///
/// Returns `None` when the mesh has no flat triangles (or they are all
/// degenerate). When the union falls apart into several disjoint pieces the
/// piece with the largest area is kept.
pub fn extract_footprint(positions: &[f64], triangles: &[u32]) -> Option<Footprint> {
    let flat = flat_triangles(positions, triangles);
    if flat.is_empty() {
        return None;
    }

    let elevation = flat
        .iter()
        .map(|t| t[0][2])
        .fold(f64::INFINITY, f64::min);

    let projected: Vec<[Point2<f64>; 3]> = flat
        .iter()
        .map(|t| t.map(|[x, y, _]| Point2::new(x, y)))
        .collect();

    let shapes = union_triangles(&projected);
    if shapes.len() > 1 {
        tracing::debug!(pieces = shapes.len(), "Footprint union is disjoint, keeping the largest piece");
    }

    let mut best = shapes.into_iter().max_by(|a, b| {
        compute_signed_area(&a[0])
            .abs()
            .total_cmp(&compute_signed_area(&b[0]).abs())
    })?;

    let outer = ensure_ccw(&best.remove(0));
    let holes = best.iter().map(|h| ensure_cw(h)).collect();

    Some(Footprint {
        outer,
        holes,
        elevation,
    })
}

/// Close a ring by appending its first vertex if the ends differ.
pub fn close_ring<T: PartialEq + Clone>(ring: &mut Vec<T>) {
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            let first = first.clone();
            ring.push(first);
        }
    }
}
