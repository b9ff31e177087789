// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement frames for sign instances.
//!
//! Sign geometry is authored face-up in the local X-Y plane with +Z as the face
//! normal. Mounting a sign means choosing a frame whose Z axis (the `axis`)
//! points at the viewer: `(0, -1, 0)` for a sign read by someone facing north.
//!
//! Two kinds of frame are produced:
//! - [`Axis2Placement3D`]: absolute Cartesian location plus orientation
//! - [`LinearPlacement`]: distance along a reference curve with lateral and
//!   vertical offsets, oriented from the curve tangent

use crate::alignment::ReferenceCurve;
use crate::error::Result;
use nalgebra::{Matrix4, Point3, Vector3};

/// Location with optional Z (`axis`) and X (`ref_direction`) directions.
///
/// Missing directions default to global Z and X, as for IfcAxis2Placement3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis2Placement3D {
    pub location: Point3<f64>,
    pub axis: Option<Vector3<f64>>,
    pub ref_direction: Option<Vector3<f64>>,
}

impl Axis2Placement3D {
    /// Placement at a location with default axes
    pub fn at(location: Point3<f64>) -> Self {
        Self {
            location,
            axis: None,
            ref_direction: None,
        }
    }

    pub fn origin() -> Self {
        Self::at(Point3::origin())
    }

    /// Normalized local Z axis
    pub fn z_axis(&self) -> Vector3<f64> {
        self.axis
            .and_then(|a| a.try_normalize(1e-12))
            .unwrap_or_else(Vector3::z)
    }

    /// Local X axis, projected onto the plane perpendicular to Z
    pub fn x_axis(&self) -> Vector3<f64> {
        let z_axis = self.z_axis();
        let x_axis = self
            .ref_direction
            .and_then(|d| d.try_normalize(1e-12))
            .unwrap_or_else(Vector3::x);

        let x_axis_orthogonal = x_axis - z_axis * x_axis.dot(&z_axis);
        if x_axis_orthogonal.norm() > 1e-6 {
            x_axis_orthogonal.normalize()
        } else if z_axis.z.abs() < 0.9 {
            // X and Z are parallel - pick a perpendicular direction
            Vector3::z().cross(&z_axis).normalize()
        } else {
            Vector3::x().cross(&z_axis).normalize()
        }
    }

    /// Local Y axis (right-hand rule: Y = Z × X)
    pub fn y_axis(&self) -> Vector3<f64> {
        self.z_axis().cross(&self.x_axis()).normalize()
    }

    /// Matrix transforming local coordinates into the parent frame.
    /// Columns hold the parent-space directions of the local axes.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let x_axis = self.x_axis();
        let y_axis = self.y_axis();
        let z_axis = self.z_axis();

        let mut transform = Matrix4::identity();
        transform[(0, 0)] = x_axis.x;
        transform[(1, 0)] = x_axis.y;
        transform[(2, 0)] = x_axis.z;
        transform[(0, 1)] = y_axis.x;
        transform[(1, 1)] = y_axis.y;
        transform[(2, 1)] = y_axis.z;
        transform[(0, 2)] = z_axis.x;
        transform[(1, 2)] = z_axis.y;
        transform[(2, 2)] = z_axis.z;
        transform[(0, 3)] = self.location.x;
        transform[(1, 3)] = self.location.y;
        transform[(2, 3)] = self.location.z;
        transform
    }
}

impl Default for Axis2Placement3D {
    fn default() -> Self {
        Self::origin()
    }
}

/// Face normal of a sign read by someone facing north
pub fn north_facing() -> Vector3<f64> {
    Vector3::new(0.0, -1.0, 0.0)
}

/// Absolute placement: sign centre at `origin`, face normal along `face_normal`
pub fn place_absolute(
    origin: Point3<f64>,
    face_normal: Vector3<f64>,
    ref_direction: Option<Vector3<f64>>,
) -> Axis2Placement3D {
    Axis2Placement3D {
        location: origin,
        axis: Some(face_normal),
        ref_direction,
    }
}

/// Face normal and reference direction for a horizontal orientation angle.
///
/// Returns `(axis, ref_direction)` = `((sin θ, -cos θ, 0), (cos θ, sin θ, 0))`:
/// the reference direction runs along the orientation and the face normal is
/// that direction turned a quarter clockwise.
pub fn facing_from_orientation(radians: f64) -> (Vector3<f64>, Vector3<f64>) {
    let (sin, cos) = radians.sin_cos();
    (Vector3::new(sin, -cos, 0.0), Vector3::new(cos, sin, 0.0))
}

/// Z drop from a primary sign's centre to a secondary placard hung beneath it
#[inline]
pub fn stacked_offset(primary_height: f64, secondary_height: f64, gap: f64) -> f64 {
    0.5 * primary_height + 0.5 * secondary_height + gap
}

/// Distance-along expression on a basis curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointByDistance {
    pub distance_along: f64,
    /// Offset perpendicular to the curve, positive to the left of travel
    pub offset_lateral: f64,
    pub offset_vertical: f64,
}

/// Curve-relative frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearPlacement {
    pub location: PointByDistance,
    pub axis: Vector3<f64>,
    pub ref_direction: Vector3<f64>,
    /// Equivalent Cartesian frame in the curve's coordinate system
    pub cartesian: Axis2Placement3D,
}

/// Place a sign at a station on a reference curve.
///
/// The face normal is the tangent at the station turned a quarter clockwise,
/// so for a circular arc of radius `R` starting at heading 0 the axis at
/// distance `d` is `(sin(d/R), -cos(d/R), 0)`.
pub fn place_on_curve(
    distance_along: f64,
    lateral_offset: f64,
    vertical_offset: f64,
    basis_curve: &dyn ReferenceCurve,
) -> Result<LinearPlacement> {
    let point = basis_curve.point_at_station(distance_along)?;
    let heading = basis_curve.heading_at(distance_along)?;
    let (axis, ref_direction) = facing_from_orientation(heading);

    let left = Vector3::new(-heading.sin(), heading.cos(), 0.0);
    let location = point + left * lateral_offset + Vector3::z() * vertical_offset;

    Ok(LinearPlacement {
        location: PointByDistance {
            distance_along,
            offset_lateral: lateral_offset,
            offset_vertical: vertical_offset,
        },
        axis,
        ref_direction,
        cartesian: Axis2Placement3D {
            location,
            axis: Some(axis),
            ref_direction: Some(ref_direction),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{CircularArc, Turn};
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    #[test]
    fn test_default_axes() {
        let placement = Axis2Placement3D::at(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(placement.z_axis(), Vector3::z());
        assert_eq!(placement.x_axis(), Vector3::x());
        assert_eq!(placement.to_matrix().transform_point(&Point3::origin()), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_north_facing_sign_frame() {
        let placement = place_absolute(Point3::new(30.0, 40.0, 50.0), north_facing(), None);
        let z = placement.z_axis();
        let x = placement.x_axis();
        let y = placement.y_axis();

        assert_relative_eq!(z, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(x, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        // Sign "up" (local Y) ends up pointing at the sky
        assert_relative_eq!(y, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_ref_direction_is_orthogonalized() {
        let placement = place_absolute(
            Point3::origin(),
            Vector3::new(0.0, 0.0, 1.0),
            Some(Vector3::new(1.0, 0.0, 1.0)),
        );
        assert_relative_eq!(placement.x_axis(), Vector3::x(), epsilon = 1e-12);

        // Parallel reference direction falls back to a perpendicular axis
        let degenerate = place_absolute(Point3::origin(), Vector3::y(), Some(Vector3::y()));
        assert_relative_eq!(degenerate.x_axis().dot(&Vector3::y()), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_facing_from_orientation() {
        let (axis, ref_dir) = facing_from_orientation(0.0);
        assert_relative_eq!(axis, north_facing(), epsilon = 1e-12);
        assert_relative_eq!(ref_dir, Vector3::x(), epsilon = 1e-12);

        let (axis, ref_dir) = facing_from_orientation(90f64.to_radians());
        assert_relative_eq!(axis, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(ref_dir, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(axis.dot(&ref_dir), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stacked_offset() {
        // 36" stop sign over an 18x6 placard with a 1" gap
        let drop = stacked_offset(36.0, 6.0, 1.0);
        assert_relative_eq!(96.0 - drop, 96.0 - 18.0 - 3.0 - 1.0);
    }

    #[test]
    fn test_place_on_circular_arc() {
        let arc = CircularArc::new(Point2::origin(), 0.0, 1000.0, 2000.0, Turn::Left).unwrap();
        let placement = place_on_curve(500.0, 0.0, 0.0, &arc).unwrap();

        assert_relative_eq!(
            placement.axis,
            Vector3::new(0.5f64.sin(), -(0.5f64.cos()), 0.0),
            epsilon = 1e-9
        );
        assert_relative_eq!(placement.location.distance_along, 500.0);
    }

    #[test]
    fn test_offsets_on_curve() {
        let arc = CircularArc::new(Point2::origin(), 0.0, 1000.0, 2000.0, Turn::Left).unwrap();
        let placement = place_on_curve(0.0, 20.0, 8.0, &arc).unwrap();

        // At station 0 travel is along +X, so left is +Y
        assert_relative_eq!(
            placement.cartesian.location,
            Point3::new(0.0, 20.0, 8.0),
            epsilon = 1e-9
        );
    }
}
