// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single sign classified against an external data dictionary.
//!
//! The sign type carries base and pictorial quantity sets plus a
//! classification reference; the placed sign carries its own property set
//! with per-property dictionary URIs.

use tracing::info;

use ifc_signs_geometry::{
    north_facing, place_absolute, MappingTarget, Point3, ShapeDefinition,
};
use ifc_signs_model::{
    assemble, Classification, ClassificationReference, ModelImporter, PlacementFrame,
    PropertySet, PropertyValue, SignModel, SignTypeRecord, TypeKey,
};

use crate::catalog::Library;
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::matcher::{SizeHint, TypeMatcher};

const DICTIONARY_URI: &str = "https://identifier.buildingsmart.org/uri/wsdot/wsdotsigns/0.1.0";

/// The hand-authored 36"×36" guide panel: bottom-centre origin, face in the X-Y plane.
pub fn guide_panel() -> Result<ShapeDefinition> {
    Ok(ShapeDefinition::triangulated_panel(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(18.0, 0.0, 0.0),
            Point3::new(18.0, 36.0, 0.0),
            Point3::new(-18.0, 36.0, 0.0),
            Point3::new(-18.0, 0.0, 0.0),
        ],
        vec![[1, 2, 3], [3, 4, 1], [4, 5, 1]],
    )?)
}

/// Where the classified sign's type comes from.
#[derive(Debug, Clone)]
pub enum TypeSource<'a> {
    /// A literal shape authored for this sign
    Authored {
        designation: String,
        description: String,
        shape: ShapeDefinition,
    },
    /// A catalog type, imported into the new model
    Catalog {
        library: Library<'a>,
        designation: String,
        size: SizeHint,
    },
}

/// A sign placed at a point, facing north, with dictionary metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedSign {
    pub name: String,
    pub location: Point3<f64>,
    pub facing: String,
    pub side_of_road: String,
    pub classification: Classification,
    pub class_identification: String,
}

impl Default for ClassifiedSign {
    fn default() -> Self {
        Self {
            name: "Sign_1".to_string(),
            location: Point3::new(30.0, 40.0, 50.0),
            facing: "North".to_string(),
            side_of_road: "R".to_string(),
            classification: Classification {
                name: "wsdotsigns".to_string(),
                source: Some("wsdot_test_dict".to_string()),
                edition: Some("0.1.0".to_string()),
                specification: Some(
                    "https://search.bsdd.buildingsmart.org/uri/wsdot/wsdotsigns/0.1.0".to_string(),
                ),
            },
            class_identification: "wsdotGuideSign".to_string(),
        }
    }
}

impl ClassifiedSign {
    pub fn build(&self, source: TypeSource<'_>, config: &BuildConfig) -> Result<SignModel> {
        let mut model = SignModel::new("Sign Test Project", config.length_unit, &config.seed);
        let site = model.add_site("Test Site", None)?;

        let sign_type = self.resolve_type(&mut model, source)?;
        if model.property_set(sign_type, "Qset_SignBaseQuantities").is_none() {
            self.add_quantities(&mut model, sign_type)?;
        }
        model.add_classification(
            sign_type,
            ClassificationReference {
                system: self.classification.clone(),
                identification: self.class_identification.clone(),
                location: Some(format!("{}/class/{}", DICTIONARY_URI, self.class_identification)),
            },
        )?;

        let placement = place_absolute(self.location, north_facing(), None);
        let frame = model.add_frame(PlacementFrame::absolute(placement))?;
        let sign = model.add_sign(self.name.as_str(), frame, sign_type, MappingTarget::identity())?;
        model.add_property_set(
            sign,
            PropertySet::new("Sign_Set")
                .with_specified(
                    "sign_facing",
                    PropertyValue::Text(self.facing.clone()),
                    format!("{}/prop/sign_facing", DICTIONARY_URI),
                )
                .with_specified(
                    "sign_side_of_rd",
                    PropertyValue::Text(self.side_of_road.clone()),
                    format!("{}/prop/sign_side_of_rd", DICTIONARY_URI),
                ),
        )?;

        assemble(&mut model, site, [(sign, sign_type)])?;
        info!(name = %self.name, "Built classified sign");
        Ok(model)
    }

    fn resolve_type(&self, model: &mut SignModel, source: TypeSource<'_>) -> Result<TypeKey> {
        match source {
            TypeSource::Authored {
                designation,
                description,
                shape,
            } => {
                let geometry = model.add_geometry(shape);
                Ok(model.add_type(SignTypeRecord::new(designation, description, geometry))?)
            }
            TypeSource::Catalog {
                library,
                designation,
                size,
            } => {
                let key = TypeMatcher::new(library)
                    .find(&designation, &size)
                    .ok_or(Error::SignTypeNotFound(designation))?;
                Ok(ModelImporter::new(library.model()).import_type(model, key)?)
            }
        }
    }

    /// Quantities measured from the type's face geometry.
    fn add_quantities(&self, model: &mut SignModel, sign_type: TypeKey) -> Result<()> {
        let geometry = model
            .sign_type(sign_type)
            .and_then(|t| model.geometry(t.representation))
            .ok_or(ifc_signs_model::Error::NotFound(sign_type.into()))?;
        let (width, height, area) = face_measures(geometry)?;

        model.add_property_set(
            sign_type,
            PropertySet::new("Qset_SignBaseQuantities")
                .with("Height", PropertyValue::Length(height))
                .with("Width", PropertyValue::Length(width)),
        )?;
        model.add_property_set(
            sign_type,
            PropertySet::new("Qset_PictorialSignQuantities")
                .with("Area", PropertyValue::Area(area)),
        )?;
        Ok(())
    }
}

/// Width, height and face area of a shape, measured in its face plane.
fn face_measures(shape: &ShapeDefinition) -> Result<(f64, f64, f64)> {
    match shape {
        ShapeDefinition::SweptSolid(solid) => {
            let (min_x, max_x, min_y, max_y) = solid.profile.outer.iter().fold(
                (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
                |(a, b, c, d), p| (a.min(p.x), b.max(p.x), c.min(p.y), d.max(p.y)),
            );
            Ok((max_x - min_x, max_y - min_y, solid.profile.signed_area().abs()))
        }
        ShapeDefinition::TriangulatedPanel(panel) => {
            let (min_x, max_x, min_y, max_y) = panel.coordinates.iter().fold(
                (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
                |(a, b, c, d), p| (a.min(p.x), b.max(p.x), c.min(p.y), d.max(p.y)),
            );
            let area = panel
                .indices
                .iter()
                .map(|[a, b, c]| {
                    let p = |i: &u32| panel.coordinates[(*i - 1) as usize];
                    let (pa, pb, pc) = (p(a), p(b), p(c));
                    0.5 * (pb - pa).cross(&(pc - pa)).norm()
                })
                .sum::<f64>();
            Ok((max_x - min_x, max_y - min_y, area))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SignCatalog, SignDefinition};
    use approx::assert_relative_eq;
    use ifc_signs_geometry::Vector3;

    #[test]
    fn authored_panel_quantities() {
        let sign = ClassifiedSign::default();
        let source = TypeSource::Authored {
            designation: "mutcd_code_goes_here".to_string(),
            description: "desc_goes_here".to_string(),
            shape: guide_panel().unwrap(),
        };
        let model = sign.build(source, &BuildConfig::new()).unwrap();

        let (ty, _) = model.types().next().unwrap();
        let base = model.property_set(ty, "Qset_SignBaseQuantities").unwrap();
        assert_eq!(base.get("Width"), Some(&PropertyValue::Length(36.0)));
        assert_eq!(base.get("Height"), Some(&PropertyValue::Length(36.0)));
        let pictorial = model.property_set(ty, "Qset_PictorialSignQuantities").unwrap();
        match pictorial.get("Area") {
            Some(PropertyValue::Area(a)) => assert_relative_eq!(*a, 1296.0, epsilon = 1e-9),
            other => panic!("unexpected area {:?}", other),
        }
        assert!(pictorial.get("SignArea").is_none());

        let refs = model.classifications(ty);
        assert_eq!(refs[0].identification, "wsdotGuideSign");
        assert!(refs[0].location.as_deref().unwrap_or("").ends_with("/class/wsdotGuideSign"));
    }

    #[test]
    fn sign_properties_and_facing() {
        let model = ClassifiedSign::default()
            .build(
                TypeSource::Authored {
                    designation: "D1-1".to_string(),
                    description: "Guide".to_string(),
                    shape: guide_panel().unwrap(),
                },
                &BuildConfig::new(),
            )
            .unwrap();

        let (sign, instance) = model.instances().next().unwrap();
        let set = model.property_set(sign, "Sign_Set").unwrap();
        assert_eq!(set.get("sign_facing"), Some(&PropertyValue::Text("North".to_string())));
        assert!(set.properties["sign_side_of_rd"]
            .specification
            .as_deref()
            .unwrap_or("")
            .ends_with("/prop/sign_side_of_rd"));

        let normal = model
            .frame_matrix(instance.placement)
            .unwrap()
            .transform_vector(&Vector3::z());
        assert_relative_eq!(normal, north_facing(), epsilon = 1e-12);
        assert!(model.container_of(sign.into()).is_some());
    }

    #[test]
    fn catalog_type_keeps_its_quantities() {
        let defs = [SignDefinition::new("R1-2", "Yield", "T", &["60 x 60 x 60"])];
        let (catalog, _) = SignCatalog::build(&defs, &BuildConfig::new()).unwrap();
        let model = ClassifiedSign::default()
            .build(
                TypeSource::Catalog {
                    library: catalog.explicit_library(),
                    designation: "R1-2".to_string(),
                    size: SizeHint::from_text("60x60x60"),
                },
                &BuildConfig::new(),
            )
            .unwrap();

        let (ty, record) = model.types().next().unwrap();
        assert_eq!(record.description, "Yield (60x60x60)");
        let base = model.property_set(ty, "Qset_SignBaseQuantities").unwrap();
        assert_eq!(base.get("Width"), Some(&PropertyValue::Length(60.0)));
    }
}
