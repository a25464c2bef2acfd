// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operations on flat mesh buffers
//!
//! Positions and normals are flat `[x0, y0, z0, x1, y1, z1, ...]` buffers in
//! meters, triangles are flat vertex index triples.

use crate::error::{Error, Result};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Transform positions, translation included.
pub fn transform_points(points: &[f64], matrix: &Matrix4<f64>) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len());
    for chunk in points.chunks_exact(3) {
        let p = matrix.transform_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
        out.extend_from_slice(&[p.x, p.y, p.z]);
    }
    out
}

/// Transform normals with the inverse-transpose of the matrix's linear
/// part, so they stay perpendicular under non-uniform scale. Translation is
/// ignored and non-zero results are re-normalized.
pub fn transform_vectors(vectors: &[f64], matrix: &Matrix4<f64>) -> Vec<f64> {
    let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    // Singular matrices flatten the mesh; keep the plain linear part then
    let normal_matrix = linear.try_inverse().map(|m| m.transpose()).unwrap_or(linear);

    let mut out = Vec::with_capacity(vectors.len());
    for chunk in vectors.chunks_exact(3) {
        let v = normal_matrix * Vector3::new(chunk[0], chunk[1], chunk[2]);
        let len = v.norm();
        let v = if len > 1e-12 { v / len } else { v };
        out.extend_from_slice(&[v.x, v.y, v.z]);
    }
    out
}

/// Arithmetic mean of all position triples, `None` for an empty buffer.
pub fn centroid(positions: &[f64]) -> Option<Point3<f64>> {
    let count = positions.len() / 3;
    if count == 0 {
        return None;
    }

    let mut sum = Vector3::zeros();
    for chunk in positions.chunks_exact(3) {
        sum += Vector3::new(chunk[0], chunk[1], chunk[2]);
    }
    Some(Point3::from(sum / count as f64))
}

/// Minimum and maximum Z over all positions
pub fn z_range(positions: &[f64]) -> Option<(f64, f64)> {
    positions
        .chunks_exact(3)
        .map(|c| c[2])
        .fold(None, |acc, z| match acc {
            None => Some((z, z)),
            Some((min, max)) => Some((min.min(z), max.max(z))),
        })
}

/// Stretch Z so that `max - min == new_height`, keeping `min` in place.
pub fn update_height(positions: &mut [f64], new_height: f64) {
    if let Some(range) = z_range(positions) {
        update_height_in_range(positions, range, new_height);
    }
}

/// Same as [`update_height`] against an externally computed range, so several
/// buffers can be stretched consistently.
pub fn update_height_in_range(positions: &mut [f64], range: (f64, f64), new_height: f64) {
    let (min, max) = range;
    let current = max - min;
    if current == new_height || current.abs() < f64::EPSILON {
        return;
    }
    for chunk in positions.chunks_exact_mut(3) {
        chunk[2] = (chunk[2] - min) / current * new_height + min;
    }
}

/// Shift Z so that the lowest vertex sits at `new_altitude`.
pub fn update_altitude(positions: &mut [f64], new_altitude: f64) {
    if let Some((min, _)) = z_range(positions) {
        update_altitude_in_range(positions, min, new_altitude);
    }
}

/// Same as [`update_altitude`] against an externally computed minimum.
pub fn update_altitude_in_range(positions: &mut [f64], min: f64, new_altitude: f64) {
    let delta = new_altitude - min;
    if delta == 0.0 {
        return;
    }
    for chunk in positions.chunks_exact_mut(3) {
        chunk[2] += delta;
    }
}

/// Check buffer shapes and index bounds of a mesh.
pub fn check_mesh(positions: &[f64], normals: &[f64], triangles: &[u32]) -> Result<()> {
    if positions.len() % 3 != 0 {
        return Err(Error::mesh(format!(
            "position buffer length {} is not a multiple of 3",
            positions.len()
        )));
    }
    if !normals.is_empty() && normals.len() != positions.len() {
        return Err(Error::mesh(format!(
            "{} normal values for {} position values",
            normals.len(),
            positions.len()
        )));
    }
    if triangles.len() % 3 != 0 {
        return Err(Error::mesh(format!(
            "triangle index count {} is not a multiple of 3",
            triangles.len()
        )));
    }
    let vertex_count = positions.len() / 3;
    if let Some(bad) = triangles.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(Error::mesh(format!(
            "triangle index {} out of range for {} vertices",
            bad, vertex_count
        )));
    }
    Ok(())
}
