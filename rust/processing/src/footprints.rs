// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh post-processing: derived footprints and height/altitude
//! normalization.

use crate::error::Result;
use c3ml_core::{Coordinate, Entity, EntityCollection, GeoLocation};
use c3ml_geometry::{
    close_ring, extract_footprint, to_geodetic, update_altitude_in_range, update_height_in_range,
    z_range, Point2,
};

/// Attach a footprint Polygon child to every Mesh that has flat faces.
///
/// Returns the number of footprints created.
pub fn derive_footprints(collection: &mut EntityCollection) -> Result<usize> {
    let mut derived = Vec::new();
    for entity in collection.iter() {
        let Some(mesh) = entity.as_mesh() else {
            continue;
        };
        let Some(footprint) = extract_footprint(&mesh.positions, &mesh.triangles) else {
            tracing::debug!(mesh = entity.id.as_str(), "Mesh has no flat faces, no footprint");
            continue;
        };

        let geo = mesh.geo_location;
        let outer = geodetic_ring(&footprint.outer, footprint.elevation, &geo);
        let holes = footprint
            .holes
            .iter()
            .map(|h| geodetic_ring(h, footprint.elevation, &geo))
            .collect();
        let polygon = Entity::polygon(format!("{}_footprint", entity.name), outer, holes)
            .with_color(entity.color_or_default());
        derived.push((entity.id.clone(), polygon));
    }

    let count = derived.len();
    for (mesh_id, polygon) in derived {
        collection.insert_child(&mesh_id, polygon)?;
    }
    tracing::info!(footprints = count, "Derived mesh footprints");
    Ok(count)
}

/// Closed `[lat, lon, alt]` ring for local footprint points
fn geodetic_ring(points: &[Point2<f64>], elevation: f64, anchor: &GeoLocation) -> Vec<Coordinate> {
    let mut ring: Vec<Coordinate> = points
        .iter()
        .map(|p| to_geodetic(p.x, p.y, elevation, anchor.latitude, anchor.longitude, anchor.altitude))
        .collect();
    close_ring(&mut ring);
    ring
}

/// Z range shared by all meshes of a collection
fn shared_z_range(collection: &EntityCollection) -> Option<(f64, f64)> {
    collection
        .iter()
        .filter_map(|e| e.as_mesh())
        .filter_map(|m| z_range(&m.positions))
        .reduce(|(a_min, a_max), (b_min, b_max)| (a_min.min(b_min), a_max.max(b_max)))
}

/// Stretch every mesh vertically so the collection spans `new_height`
/// meters, keeping the lowest point in place. Meshes keep their relative
/// placement because they are scaled against one shared range.
pub fn normalize_height(collection: &mut EntityCollection, new_height: f64) {
    let Some(range) = shared_z_range(collection) else {
        return;
    };
    for mesh in collection.iter_mut().filter_map(|e| e.as_mesh_mut()) {
        update_height_in_range(&mut mesh.positions, range, new_height);
    }
    tracing::debug!(from = range.1 - range.0, to = new_height, "Normalized mesh height");
}

/// Shift every mesh so the collection's lowest point sits at `new_altitude`
pub fn normalize_altitude(collection: &mut EntityCollection, new_altitude: f64) {
    let Some((min, _)) = shared_z_range(collection) else {
        return;
    };
    for mesh in collection.iter_mut().filter_map(|e| e.as_mesh_mut()) {
        update_altitude_in_range(&mut mesh.positions, min, new_altitude);
    }
    tracing::debug!(from = min, to = new_altitude, "Normalized mesh altitude");
}
