//! C3ML Geometry Kernel
//!
//! Transform construction and composition, up-axis correction, mesh buffer
//! operations, local-to-geodetic conversion and footprint extraction, built
//! on nalgebra and i_overlay.

pub mod bool2d;
pub mod error;
pub mod footprint;
pub mod geodetic;
pub mod mesh;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector3};

pub use error::{Error, Result};
pub use footprint::{close_ring, extract_footprint, flat_triangles, triangle_key, Footprint};
pub use geodetic::{to_geodetic, EARTH_RADIUS_M};
pub use mesh::{
    centroid, check_mesh, transform_points, transform_vectors, update_altitude,
    update_altitude_in_range, update_height, update_height_in_range, z_range,
};
pub use transform::{
    axis_rotation, compose, identity, matrix_from_row_major, non_uniform_scale, rotation_x,
    rotation_y, rotation_z, scale, translation, up_axis_correction, UpAxis,
};
