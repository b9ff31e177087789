// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curve-relative sign runs.
//!
//! A [`ChevronRun`] places identical signs at regular stations along an
//! alignment. Each sign is positioned by distance along, lateral offset and
//! vertical offset, and faces across the direction of travel. Sign frames are
//! positioned by the alignment alone, so the site carries no placement.

use tracing::{debug, info};

use ifc_signs_geometry::{
    place_on_curve, CompositeCurve, MappingTarget, Point2, Vector3,
};
use ifc_signs_model::{
    InstanceKey, ModelGraphBuilder, ModelImporter, PlacementFrame, SignModel,
};

use crate::catalog::Library;
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::matcher::{SizeHint, TypeMatcher};

/// Tangent-arc-tangent test alignment: a single 90° right-hand curve of
/// `radius` between PIs `(0,0)`, `(0,R)` and `(R,R)`.
pub fn quarter_turn_alignment(radius: f64) -> Result<CompositeCurve> {
    let points = [
        Point2::new(0.0, 0.0),
        Point2::new(0.0, radius),
        Point2::new(radius, radius),
    ];
    Ok(CompositeCurve::by_pi_method(&points, &[radius])?)
}

/// A row of signs at regular stations.
#[derive(Debug, Clone, PartialEq)]
pub struct ChevronRun {
    pub designation: String,
    /// Station of the first sign
    pub start: f64,
    /// Spacing between consecutive signs
    pub increment: f64,
    pub count: usize,
    /// Offset from the alignment, positive to the left of travel
    pub lateral: f64,
    pub vertical: f64,
    /// Mapping scale applied to the (unit) sign type
    pub scale: Vector3<f64>,
}

impl Default for ChevronRun {
    /// Ten right-curve chevrons, 3'×4' from a unit library, 100' apart from station 500
    fn default() -> Self {
        Self {
            designation: "W1-8R".to_string(),
            start: 500.0,
            increment: 100.0,
            count: 10,
            lateral: 20.0,
            vertical: 8.0,
            scale: Vector3::new(36.0, 48.0, 0.5),
        }
    }
}

impl ChevronRun {
    /// Stations of every sign in the run.
    pub fn stations(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(move |i| self.start + i as f64 * self.increment)
    }

    /// Builds a model with the run placed along `alignment`.
    ///
    /// The sign type must exist in `library`; it is imported into the new
    /// model.
    pub fn place(
        &self,
        library: Library<'_>,
        alignment: CompositeCurve,
        config: &BuildConfig,
    ) -> Result<(SignModel, Vec<InstanceKey>)> {
        let (source_type, _) = TypeMatcher::new(library)
            .find_record(&self.designation, &SizeHint::Any)
            .ok_or_else(|| Error::SignTypeNotFound(self.designation.clone()))?;

        let mut model = SignModel::new("Linear Placement of Signs", config.length_unit, &config.seed);
        let site = model.add_site("Test Site", None)?;
        let curve = model.add_curve("Ali", alignment);

        let sign_type = ModelImporter::new(library.model()).import_type(&mut model, source_type)?;
        let target = MappingTarget::non_uniform(self.scale.x, self.scale.y, self.scale.z);

        let mut builder = ModelGraphBuilder::new(site);
        let mut signs = Vec::with_capacity(self.count);

        for (i, station) in self.stations().enumerate() {
            let basis = &model
                .curve(curve)
                .ok_or(ifc_signs_model::Error::NotFound(curve.into()))?
                .curve;
            let placement = place_on_curve(station, self.lateral, self.vertical, basis)?;
            debug!(station, "Placing chevron");

            let frame = model.add_frame(PlacementFrame::linear(curve, placement))?;
            let sign = model.add_sign(format!("Chevron {}", i), frame, sign_type, target)?;
            builder.assign(sign, sign_type)?;
            signs.push(sign);
        }

        builder.finish(&mut model)?;
        info!(count = signs.len(), designation = %self.designation, "Placed sign run");
        Ok((model, signs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SignCatalog, SignDefinition};
    use approx::assert_relative_eq;
    use ifc_signs_geometry::{Point3, ReferenceCurve};
    use ifc_signs_model::{FramePosition, LengthUnit};

    fn unit_catalog() -> SignCatalog {
        let defs = [SignDefinition::new("W1-8R", "Chevron alignment", "R", &["18 x 24", "36 x 48"])];
        SignCatalog::build(&defs, &BuildConfig::new()).unwrap().0
    }

    #[test]
    fn default_stations() {
        let stations: Vec<f64> = ChevronRun::default().stations().collect();
        assert_eq!(stations.len(), 10);
        assert_eq!(stations[0], 500.0);
        assert_eq!(stations[9], 1400.0);
    }

    #[test]
    fn run_follows_alignment() {
        let catalog = unit_catalog();
        let config = BuildConfig::new().with_unit(LengthUnit::Foot);
        let alignment = quarter_turn_alignment(1000.0).unwrap();
        let run = ChevronRun::default();

        let (model, signs) = run.place(catalog.unit_library(), alignment.clone(), &config).unwrap();
        assert_eq!(signs.len(), 10);
        assert_eq!(model.relations().defines_by_type.len(), 1);
        assert_eq!(model.relations().defines_by_type[0].related_objects, signs);

        let first = model.instance(signs[0]).unwrap();
        assert_eq!(first.name, "Chevron 0");
        assert_relative_eq!(first.representation.target.scale, Vector3::new(36.0, 48.0, 0.5));

        let frame = model.frame(first.placement).unwrap();
        assert!(frame.relative_to.is_none());
        match &frame.position {
            FramePosition::Linear { placement, .. } => {
                assert_eq!(placement.location.distance_along, 500.0);
                assert_eq!(placement.location.offset_lateral, 20.0);
                // Heading starts due north and turns right by d/R
                let heading = std::f64::consts::FRAC_PI_2 - 0.5;
                assert_relative_eq!(
                    placement.axis,
                    Vector3::new(heading.sin(), -heading.cos(), 0.0),
                    epsilon = 1e-9
                );
            }
            other => panic!("expected linear placement, got {:?}", other),
        }

        let on_curve = alignment.point_at_station(500.0).unwrap();
        let origin = model.frame_origin(first.placement).unwrap();
        assert_relative_eq!(origin.z, 8.0, epsilon = 1e-9);
        let horizontal = Point3::new(origin.x, origin.y, 0.0) - on_curve;
        assert_relative_eq!(horizontal.norm(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn world_position_matches_curve_evaluation() {
        let catalog = unit_catalog();
        let alignment = quarter_turn_alignment(1000.0).unwrap();
        let (model, signs) = ChevronRun::default()
            .place(catalog.unit_library(), alignment.clone(), &BuildConfig::new())
            .unwrap();

        let site = model.relations().contained_in_structure[0].relating_structure;
        assert!(model.container(site).unwrap().placement.is_none());

        for (sign, station) in signs.iter().zip(ChevronRun::default().stations()) {
            let expected = place_on_curve(station, 20.0, 8.0, &alignment).unwrap().cartesian;
            let placement = model.instance(*sign).unwrap().placement;
            assert!(model.frame(placement).unwrap().relative_to.is_none());
            assert_relative_eq!(model.frame_origin(placement).unwrap(), expected.location, epsilon = 1e-9);
        }
    }

    #[test]
    fn missing_type_is_an_error() {
        let catalog = unit_catalog();
        let run = ChevronRun {
            designation: "W1-8L".to_string(),
            ..ChevronRun::default()
        };
        let result = run.place(
            catalog.unit_library(),
            quarter_turn_alignment(1000.0).unwrap(),
            &BuildConfig::new(),
        );
        assert!(matches!(result, Err(Error::SignTypeNotFound(_))));
    }

    #[test]
    fn station_past_end_is_an_error() {
        let catalog = unit_catalog();
        let run = ChevronRun {
            count: 20,
            ..ChevronRun::default()
        };
        let result = run.place(
            catalog.unit_library(),
            quarter_turn_alignment(1000.0).unwrap(),
            &BuildConfig::new(),
        );
        assert!(matches!(result, Err(Error::Geometry(_))));
    }
}
