// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Signs Geometry
//!
//! Sign-face geometry and placement math: regular-polygon faces, swept and
//! triangulated shape definitions, and nalgebra placement frames (absolute and
//! curve-relative).

pub mod alignment;
pub mod error;
pub mod placement;
pub mod polygon;
pub mod profile;
pub mod shape;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use alignment::{CircularArc, CompositeCurve, CurveSegment, LineSegment, ReferenceCurve, Turn};
pub use error::{Error, Result};
pub use placement::{
    facing_from_orientation, north_facing, place_absolute, place_on_curve, stacked_offset,
    Axis2Placement3D, LinearPlacement, PointByDistance,
};
pub use polygon::{generate_polygon, SignShape};
pub use profile::Profile2D;
pub use shape::{MappingTarget, ShapeDefinition, SweptSolid, TriangulatedPanel};
