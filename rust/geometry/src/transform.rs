// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 4x4 transform construction and composition
//!
//! All matrices use the column-vector convention: a point `p` is transformed
//! as `M * p`, translation lives in the last column.

use crate::error::{Error, Result};
use nalgebra::{Matrix4, Rotation3, Unit, Vector3};

/// Identity transform
#[inline]
pub fn identity() -> Matrix4<f64> {
    Matrix4::identity()
}

/// Rotation about the X axis, angle in degrees
#[inline]
pub fn rotation_x(degrees: f64) -> Matrix4<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), degrees.to_radians()).to_homogeneous()
}

/// Rotation about the Y axis, angle in degrees
#[inline]
pub fn rotation_y(degrees: f64) -> Matrix4<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), degrees.to_radians()).to_homogeneous()
}

/// Rotation about the Z axis, angle in degrees
#[inline]
pub fn rotation_z(degrees: f64) -> Matrix4<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians()).to_homogeneous()
}

/// Uniform scale
#[inline]
pub fn scale(factor: f64) -> Matrix4<f64> {
    Matrix4::new_scaling(factor)
}

/// Per-axis scale
#[inline]
pub fn non_uniform_scale(sx: f64, sy: f64, sz: f64) -> Matrix4<f64> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
}

/// Translation by (x, y, z)
#[inline]
pub fn translation(x: f64, y: f64, z: f64) -> Matrix4<f64> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Rotation of `degrees` about an arbitrary axis.
///
/// The axis does not need to be normalized but must not be zero.
pub fn axis_rotation(axis: Vector3<f64>, degrees: f64) -> Result<Matrix4<f64>> {
    let unit_axis = Unit::try_new(axis, 1e-12)
        .ok_or_else(|| Error::transform(format!("degenerate rotation axis {:?}", axis.as_slice())))?;
    Ok(Rotation3::from_axis_angle(&unit_axis, degrees.to_radians()).to_homogeneous())
}

/// Build a matrix from 16 values listed row by row (COLLADA `<matrix>` order).
pub fn matrix_from_row_major(values: &[f64]) -> Result<Matrix4<f64>> {
    if values.len() != 16 {
        return Err(Error::transform(format!(
            "expected 16 matrix values, got {}",
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::transform("matrix contains non-finite values"));
    }
    Ok(Matrix4::from_row_slice(values))
}

/// Combine a parent's accumulated transform with a node's local transform.
///
/// Equivalent to transposing both operands, multiplying them in row-vector
/// order and transposing the result: `(localᵀ · parentᵀ)ᵀ = parent · local`.
/// The local transform is applied first, then the parent's.
#[inline]
pub fn compose(parent: &Matrix4<f64>, local: &Matrix4<f64>) -> Matrix4<f64> {
    parent * local
}

/// Authored "up" direction of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpAxis {
    X,
    /// COLLADA's default when `<up_axis>` is missing
    #[default]
    Y,
    Z,
}

impl UpAxis {
    /// Parse a COLLADA `<up_axis>` value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "X_UP" => Some(UpAxis::X),
            "Y_UP" => Some(UpAxis::Y),
            "Z_UP" => Some(UpAxis::Z),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpAxis::X => "X_UP",
            UpAxis::Y => "Y_UP",
            UpAxis::Z => "Z_UP",
        }
    }
}

/// Matrix that rotates a model authored with `axis` up so that +Z is up.
///
/// X-up and Y-up models get a ±90° rotation about the other horizontal axis
/// followed by 180° about Z; without the Z turn the result comes out mirrored.
pub fn up_axis_correction(axis: UpAxis) -> Matrix4<f64> {
    match axis {
        UpAxis::X => rotation_z(180.0) * rotation_y(-90.0),
        UpAxis::Y => rotation_z(180.0) * rotation_x(90.0),
        UpAxis::Z => identity(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_rotation_z_quarter_turn() {
        let p = rotation_z(90.0).transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_compose_matches_transposed_product() {
        let parent = translation(10.0, 0.0, 0.0) * rotation_z(30.0);
        let local = rotation_x(45.0) * scale(2.0);

        let reference = (local.transpose() * parent.transpose()).transpose();
        assert_relative_eq!(compose(&parent, &local), reference, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_applies_local_first() {
        let parent = translation(5.0, 0.0, 0.0);
        let local = scale(2.0);
        let p = compose(&parent, &local).transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(7.0, 2.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_from_row_major() {
        let values = [
            1.0, 0.0, 0.0, 3.0, //
            0.0, 1.0, 0.0, 4.0, //
            0.0, 0.0, 1.0, 5.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        let m = matrix_from_row_major(&values).unwrap();
        let p = m.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_matrix_wrong_length_is_invalid() {
        let err = matrix_from_row_major(&[1.0; 12]).unwrap_err();
        assert!(matches!(err, Error::InvalidTransform(_)));
    }

    #[test]
    fn test_axis_rotation_rejects_zero_axis() {
        assert!(axis_rotation(Vector3::zeros(), 90.0).is_err());
        let m = axis_rotation(Vector3::new(0.0, 0.0, 2.0), 90.0).unwrap();
        assert_relative_eq!(m, rotation_z(90.0), epsilon = 1e-12);
    }

    #[test]
    fn test_y_up_correction_points_up() {
        let m = up_axis_correction(UpAxis::Y);
        let v = m.transform_vector(&Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(v, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_x_up_correction_points_up() {
        let m = up_axis_correction(UpAxis::X);
        let v = m.transform_vector(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_z_up_is_identity() {
        assert_eq!(up_axis_correction(UpAxis::Z), identity());
    }

    #[test]
    fn test_parse_up_axis() {
        assert_eq!(UpAxis::parse(" y_up\n"), Some(UpAxis::Y));
        assert_eq!(UpAxis::parse("Z_UP"), Some(UpAxis::Z));
        assert_eq!(UpAxis::parse("W_UP"), None);
        assert_eq!(UpAxis::default(), UpAxis::Y);
    }
}
