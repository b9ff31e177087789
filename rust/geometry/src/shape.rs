// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reusable sign shape definitions.
//!
//! A [`ShapeDefinition`] is what a sign type's representation map holds: either a
//! closed polygon profile swept along the local normal (+Z), or an explicit
//! triangulated panel for hand-authored or surveyed sign faces. Both are
//! origin-centred and are mapped into instances through a [`MappingTarget`].

use crate::error::{Error, Result};
use crate::profile::Profile2D;
use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// Closed profile extruded along +Z
#[derive(Debug, Clone, PartialEq)]
pub struct SweptSolid {
    /// Profile name, the designation code of the sign it was built for
    pub profile_name: String,
    pub profile: Profile2D,
    pub depth: f64,
}

/// Explicit triangulated surface
#[derive(Debug, Clone, PartialEq)]
pub struct TriangulatedPanel {
    pub coordinates: Vec<Point3<f64>>,
    /// 1-based triangle corner indices into `coordinates`
    pub indices: Vec<[u32; 3]>,
}

/// Geometry held by a representation map
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeDefinition {
    SweptSolid(SweptSolid),
    TriangulatedPanel(TriangulatedPanel),
}

impl ShapeDefinition {
    /// Encode an ordered outline as a swept solid of the given depth
    pub fn swept_polygon(
        name: impl Into<String>,
        points: Vec<Point2<f64>>,
        depth: f64,
    ) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::InvalidProfile(format!(
                "outline needs at least 3 points, got {}",
                points.len()
            )));
        }
        if depth <= 0.0 || !depth.is_finite() {
            return Err(Error::InvalidExtrusion(format!(
                "Depth must be positive, got {}",
                depth
            )));
        }

        Ok(Self::SweptSolid(SweptSolid {
            profile_name: name.into(),
            profile: Profile2D::new(points),
            depth,
        }))
    }

    /// Encode a literal triangulated panel (1-based indices)
    pub fn triangulated_panel(
        coordinates: Vec<Point3<f64>>,
        indices: Vec<[u32; 3]>,
    ) -> Result<Self> {
        if indices.is_empty() {
            return Err(Error::InvalidPanel("panel has no triangles".to_string()));
        }
        let count = coordinates.len() as u32;
        if let Some(bad) = indices
            .iter()
            .flatten()
            .find(|&&i| i == 0 || i > count)
        {
            return Err(Error::InvalidPanel(format!(
                "index {} outside 1..={}",
                bad, count
            )));
        }

        Ok(Self::TriangulatedPanel(TriangulatedPanel {
            coordinates,
            indices,
        }))
    }

    /// Representation type label (`SweptSolid` or `SurfaceModel`)
    pub fn representation_type(&self) -> &'static str {
        match self {
            Self::SweptSolid(_) => "SweptSolid",
            Self::TriangulatedPanel(_) => "SurfaceModel",
        }
    }

    /// Copy with every length multiplied by `factor`.
    ///
    /// Used when a definition authored in one length unit is brought into a
    /// model declared in another.
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Self::SweptSolid(solid) => Self::SweptSolid(SweptSolid {
                profile_name: solid.profile_name.clone(),
                profile: Profile2D::new(
                    solid
                        .profile
                        .outer
                        .iter()
                        .map(|p| Point2::from(p.coords * factor))
                        .collect(),
                ),
                depth: solid.depth * factor,
            }),
            Self::TriangulatedPanel(panel) => Self::TriangulatedPanel(TriangulatedPanel {
                coordinates: panel
                    .coordinates
                    .iter()
                    .map(|p| Point3::from(p.coords * factor))
                    .collect(),
                indices: panel.indices.clone(),
            }),
        }
    }
}

/// Transformation applied when an instance maps a type's geometry.
///
/// A uniform target only relocates the origin; the non-uniform form scales the
/// X, Y and Z axes independently, which is how unit-sized library signs are
/// stretched to real dimensions and thickness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingTarget {
    pub local_origin: Point3<f64>,
    pub scale: Vector3<f64>,
}

impl MappingTarget {
    /// Identity mapping at the origin
    pub fn identity() -> Self {
        Self {
            local_origin: Point3::origin(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Non-uniform scale about the origin
    pub fn non_uniform(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            local_origin: Point3::origin(),
            scale: Vector3::new(sx, sy, sz),
        }
    }

    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.scale.x == self.scale.y && self.scale.y == self.scale.z
    }

    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.local_origin.coords)
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

impl Default for MappingTarget {
    fn default() -> Self {
        Self::identity()
    }
}
