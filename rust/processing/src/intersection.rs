// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Four-corner all-way-stop intersections.
//!
//! Each corner gets an element assembly holding a primary sign with a
//! secondary placard hung beneath it. Corner frames are placed relative to
//! the site; the signs are placed relative to their corner.

use tracing::info;

use ifc_signs_geometry::{
    north_facing, place_absolute, stacked_offset, Axis2Placement3D, MappingTarget, Point3, Vector3,
};
use ifc_signs_model::{
    AssemblyKey, ElementAssembly, ModelGraphBuilder, ModelImporter, NominalSize, PlacementFrame,
    SignModel, TypeKey,
};

use crate::catalog::Library;
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::matcher::{SizeHint, TypeMatcher};

/// Corner of an intersection with the reference direction of its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthEast,
    NorthWest,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthEast,
        Corner::NorthWest,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Corner::NorthEast => "NE",
            Corner::NorthWest => "NW",
            Corner::SouthWest => "SW",
            Corner::SouthEast => "SE",
        }
    }

    /// Corner position for an offset `d` from the intersection centre
    fn location(&self, d: f64) -> Point3<f64> {
        match self {
            Corner::NorthEast => Point3::new(d, d, 0.0),
            Corner::NorthWest => Point3::new(-d, d, 0.0),
            Corner::SouthWest => Point3::new(-d, -d, 0.0),
            Corner::SouthEast => Point3::new(d, -d, 0.0),
        }
    }

    /// Signs at each corner face the approaching traffic lane
    fn ref_direction(&self) -> Vector3<f64> {
        match self {
            Corner::NorthEast => Vector3::new(0.0, 1.0, 0.0),
            Corner::NorthWest => Vector3::new(-1.0, 0.0, 0.0),
            Corner::SouthWest => Vector3::new(0.0, -1.0, 0.0),
            Corner::SouthEast => Vector3::new(1.0, 0.0, 0.0),
        }
    }
}

/// Sign pair mounted at every corner
#[derive(Debug, Clone, PartialEq)]
pub struct AllWayStop {
    pub primary: (String, NominalSize),
    pub secondary: (String, NominalSize),
    /// Distance of each corner from the centre along X and Y
    pub corner_offset: f64,
    pub site_origin: Point3<f64>,
}

impl Default for AllWayStop {
    /// 36" stop sign over an 18"×6" ALL WAY plaque, 35 ft from the centre (inch units)
    fn default() -> Self {
        Self {
            primary: ("R1-1".to_string(), NominalSize::new(36, 36)),
            secondary: ("R1-3P".to_string(), NominalSize::new(18, 6)),
            corner_offset: 35.0 * 12.0,
            site_origin: Point3::new(120.0, 120.0, 0.0),
        }
    }
}

/// Result of [`AllWayStop::build`].
#[derive(Debug, Clone)]
pub struct Intersection {
    pub model: SignModel,
    pub assemblies: Vec<AssemblyKey>,
    pub primary_type: TypeKey,
    pub secondary_type: TypeKey,
}

impl AllWayStop {
    pub fn build(&self, library: Library<'_>, config: &BuildConfig) -> Result<Intersection> {
        let matcher = TypeMatcher::new(library);
        let find = |(code, size): &(String, NominalSize)| {
            matcher
                .find(code, &SizeHint::Text(size.to_string()))
                .ok_or_else(|| Error::SignTypeNotFound(format!("{} ({})", code, size)))
        };
        let primary_source = find(&self.primary)?;
        let secondary_source = find(&self.secondary)?;

        let mut model = SignModel::new("All Way Stop Test Project", config.length_unit, &config.seed);
        let site_frame = model.add_frame(PlacementFrame::absolute(Axis2Placement3D::at(self.site_origin)))?;
        let site = model.add_site("Test Site", Some(site_frame))?;

        let mut importer = ModelImporter::new(library.model());
        let primary_type = importer.import_type(&mut model, primary_source)?;
        let secondary_type = importer.import_type(&mut model, secondary_source)?;

        let primary_z = config.mount_height;
        let secondary_z = primary_z
            - stacked_offset(
                f64::from(self.primary.1.height),
                f64::from(self.secondary.1.height),
                config.clearance_gap,
            );

        let mut builder = ModelGraphBuilder::new(site);
        let mut assemblies = Vec::with_capacity(Corner::ALL.len());

        for corner in Corner::ALL {
            let corner_placement = place_absolute(
                corner.location(self.corner_offset),
                Vector3::z(),
                Some(corner.ref_direction()),
            );
            let corner_frame = model.add_frame(PlacementFrame::relative(site_frame, corner_placement))?;

            let mut sign_at = |model: &mut SignModel, name: &str, z: f64, ty: TypeKey| -> Result<_> {
                let placement = place_absolute(Point3::new(0.0, 0.0, z), north_facing(), None);
                let frame = model.add_frame(PlacementFrame::relative(corner_frame, placement))?;
                let sign = model.add_sign(name, frame, ty, MappingTarget::identity())?;
                builder.assign_part(sign, ty)?;
                Ok(sign)
            };
            let primary = sign_at(&mut model, "Stop Sign", primary_z, primary_type)?;
            let secondary = sign_at(&mut model, "All Way Sign", secondary_z, secondary_type)?;

            let assembly = model.add_assembly(
                ElementAssembly {
                    name: format!("Sign in {} corner", corner.abbreviation()),
                    placement: corner_frame,
                    assembly_place: "SITE".to_string(),
                    object_type: "SIGNASSEMBLY".to_string(),
                },
                &[primary, secondary],
            )?;
            builder.contain(assembly);
            assemblies.push(assembly);
        }

        builder.finish(&mut model)?;
        info!(corners = assemblies.len(), "Built all-way stop");

        Ok(Intersection {
            model,
            assemblies,
            primary_type,
            secondary_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SignCatalog, SignDefinition};
    use approx::assert_relative_eq;
    use ifc_signs_model::EntityKey;

    fn catalog() -> SignCatalog {
        let defs = [
            SignDefinition::new("R1-1", "Stop", "O", &["30 x 30", "36 x 36"]),
            SignDefinition::new("R1-3P", "All Way", "R", &["18 x 6"]),
        ];
        SignCatalog::build(&defs, &BuildConfig::new()).unwrap().0
    }

    #[test]
    fn four_corner_assemblies() {
        let catalog = catalog();
        let built = AllWayStop::default()
            .build(catalog.explicit_library(), &BuildConfig::new())
            .unwrap();
        let model = &built.model;

        assert_eq!(built.assemblies.len(), 4);
        assert_eq!(model.instance_count(), 8);
        assert_eq!(model.sign_type(built.primary_type).unwrap().description, "Stop (36x36)");

        // Two type groups of four signs each
        let rels = &model.relations().defines_by_type;
        assert_eq!(rels.len(), 2);
        assert!(rels.iter().all(|r| r.related_objects.len() == 4));

        // Assemblies are contained by the site, signs are not
        for assembly in &built.assemblies {
            assert!(model.container_of(EntityKey::Assembly(*assembly)).is_some());
        }
        let (first_sign, _) = model.instances().next().unwrap();
        assert!(model.container_of(first_sign.into()).is_none());
    }

    #[test]
    fn placard_hangs_below_primary() {
        let catalog = catalog();
        let built = AllWayStop::default()
            .build(catalog.explicit_library(), &BuildConfig::new())
            .unwrap();
        let model = &built.model;

        let mut signs = model.instances();
        let (stop, _) = signs.next().unwrap();
        let (allway, _) = signs.next().unwrap();
        let stop_origin = model.frame_origin(model.instance(stop).unwrap().placement).unwrap();
        let allway_origin = model.frame_origin(model.instance(allway).unwrap().placement).unwrap();

        // NE corner: site (120,120) + (420,420)
        assert_relative_eq!(stop_origin, Point3::new(540.0, 540.0, 96.0), epsilon = 1e-9);
        assert_relative_eq!(allway_origin.z, 96.0 - 18.0 - 3.0 - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_size_is_an_error() {
        let catalog = catalog();
        let layout = AllWayStop {
            primary: ("R1-1".to_string(), NominalSize::new(48, 48)),
            ..AllWayStop::default()
        };
        let result = layout.build(catalog.explicit_library(), &BuildConfig::new());
        assert!(matches!(result, Err(Error::SignTypeNotFound(_))));
    }
}
