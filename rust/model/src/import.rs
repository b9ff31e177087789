// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-model import of sign types.
//!
//! Keys are only meaningful in the model that issued them, so a type taken
//! from a library model is deep-copied into the target: its shape definition
//! is re-inserted (scaled when the two models declare different length
//! units), and the copy receives a fresh GlobalId. Property sets and
//! classifications travel with it.

use rustc_hash::FxHashMap;

use crate::arena::SignModel;
use crate::error::{Error, Result};
use crate::keys::{GeometryKey, TypeKey};

/// Copies types from `source` into target models, memoising each copy.
///
/// Importing the same source type twice into the same target returns the
/// first copy; an importer must therefore be used with a single target.
#[derive(Debug)]
pub struct ModelImporter<'a> {
    source: &'a SignModel,
    geometries: FxHashMap<GeometryKey, GeometryKey>,
    types: FxHashMap<TypeKey, TypeKey>,
}

impl<'a> ModelImporter<'a> {
    pub fn new(source: &'a SignModel) -> Self {
        Self {
            source,
            geometries: FxHashMap::default(),
            types: FxHashMap::default(),
        }
    }

    pub fn source(&self) -> &'a SignModel {
        self.source
    }

    /// Number of distinct types copied so far.
    pub fn imported_count(&self) -> usize {
        self.types.len()
    }

    /// Copies a shape definition, scaling it into the target's length unit.
    pub fn import_geometry(&mut self, target: &mut SignModel, key: GeometryKey) -> Result<GeometryKey> {
        if let Some(&copied) = self.geometries.get(&key) {
            return Ok(copied);
        }
        let shape = self.source.geometry(key).ok_or(Error::NotFound(key.into()))?;
        let factor = self.source.unit().scale_to(target.unit());
        let shape = if factor == 1.0 {
            shape.clone()
        } else {
            shape.scaled(factor)
        };
        let copied = target.add_geometry(shape);
        self.geometries.insert(key, copied);
        Ok(copied)
    }

    /// Copies a sign type with its geometry, property sets and classifications.
    pub fn import_type(&mut self, target: &mut SignModel, key: TypeKey) -> Result<TypeKey> {
        if let Some(&copied) = self.types.get(&key) {
            return Ok(copied);
        }
        let record = self.source.sign_type(key).ok_or(Error::NotFound(key.into()))?;
        let representation = self.import_geometry(target, record.representation)?;

        let mut copy = record.clone();
        copy.representation = representation;
        let copied = target.add_type(copy)?;

        for pset in self.source.property_sets(key) {
            target.add_property_set(copied, pset.clone())?;
        }
        for reference in self.source.classifications(key) {
            target.add_classification(copied, reference.clone())?;
        }

        self.types.insert(key, copied);
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::SignTypeRecord;
    use crate::dictionary::{PropertySet, PropertyValue};
    use crate::units::LengthUnit;
    use approx::assert_relative_eq;
    use ifc_signs_geometry::{ShapeDefinition, SignShape};

    fn library() -> (SignModel, TypeKey) {
        let mut lib = SignModel::new("MUTCD Sign Definition Libraries", LengthUnit::Inch, "lib");
        let outline = SignShape::Rectangle.outline(36.0, 48.0).unwrap();
        let geometry = lib.add_geometry(ShapeDefinition::swept_polygon("W1-8", outline, 1.0).unwrap());
        let ty = lib
            .add_type(SignTypeRecord::new("W1-8", "Chevron alignment (36x48)", geometry))
            .unwrap();
        lib.add_property_set(
            ty,
            PropertySet::new("Qset_SignBaseQuantities").with("Width", PropertyValue::Length(36.0)),
        )
        .unwrap();
        (lib, ty)
    }

    #[test]
    fn import_assigns_fresh_identity() {
        let (lib, ty) = library();
        let mut target = SignModel::new("Corridor", LengthUnit::Inch, "target");
        let mut importer = ModelImporter::new(&lib);

        let copied = importer.import_type(&mut target, ty).unwrap();
        let record = target.sign_type(copied).unwrap();
        assert_eq!(record.designation, "W1-8");
        assert!(target.geometry(record.representation).is_some());
        assert_ne!(target.global_id(copied), lib.global_id(ty));
        assert!(target.property_set(copied, "Qset_SignBaseQuantities").is_some());
    }

    #[test]
    fn import_is_memoised() {
        let (lib, ty) = library();
        let mut target = SignModel::new("Corridor", LengthUnit::Inch, "target");
        let mut importer = ModelImporter::new(&lib);

        let first = importer.import_type(&mut target, ty).unwrap();
        let second = importer.import_type(&mut target, ty).unwrap();
        assert_eq!(first, second);
        assert_eq!(target.type_count(), 1);
        assert_eq!(target.geometry_count(), 1);
        assert_eq!(importer.imported_count(), 1);
    }

    #[test]
    fn import_scales_between_units() {
        let (lib, ty) = library();
        let mut target = SignModel::new("Corridor", LengthUnit::Foot, "target");
        let mut importer = ModelImporter::new(&lib);

        let copied = importer.import_type(&mut target, ty).unwrap();
        let geometry = target
            .geometry(target.sign_type(copied).unwrap().representation)
            .unwrap();
        let ShapeDefinition::SweptSolid(solid) = geometry else {
            panic!("expected swept solid, got {:?}", geometry);
        };
        let xs = solid.profile.outer.iter().map(|p| p.x);
        let width = xs.clone().fold(f64::MIN, f64::max) - xs.fold(f64::MAX, f64::min);
        assert_relative_eq!(width, 3.0, epsilon = 1e-9);
        assert_relative_eq!(solid.profile.signed_area(), 12.0, epsilon = 1e-9);
        assert_relative_eq!(solid.depth, 1.0 / 12.0, epsilon = 1e-12);
    }
}
