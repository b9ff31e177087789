// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sign type catalog construction.
//!
//! Every size listed for a sign definition produces two type records: a unit
//! record (1×1 face, meant to be stretched by a non-uniform mapping) in the
//! "Unit Signs" library, and an explicit record with real dimensions in the
//! "Signs" library. Explicit descriptions carry the size, e.g.
//! `Stop sign (36x36)`, which is what [`TypeMatcher`](crate::TypeMatcher)
//! searches.
//!
//! Rows that fail to parse are reported in [`CatalogReport::errors`] and
//! skipped; the rest of the table is still catalogued.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use ifc_signs_geometry::{ShapeDefinition, SignShape};
use ifc_signs_model::{
    DeclaringContext, GeometryKey, LibraryKey, NominalSize, PropertySet, PropertyValue,
    ScaleClass, SignModel, SignTypeRecord, TypeKey,
};

use crate::config::BuildConfig;
use crate::error::{Error, Result, RowError};
use crate::table::{Table, TableRow};

pub const UNIT_LIBRARY_NAME: &str = "Unit Signs";
pub const EXPLICIT_LIBRARY_NAME: &str = "Signs";

/// Column positions in the sign definition table
mod column {
    pub const SIGN: usize = 0;
    pub const DESIGNATION: usize = 1;
    /// Section, then the six road-context size columns
    pub const SIZES: std::ops::Range<usize> = 3..9;
    pub const SHAPE: usize = 9;
}

/// One row of the sign definition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignDefinition {
    pub designation: String,
    pub description: String,
    pub shape_code: String,
    /// Nominal sizes per road context; may contain blanks and repeats
    pub sizes: Vec<String>,
}

impl SignDefinition {
    pub fn new(
        designation: impl Into<String>,
        description: impl Into<String>,
        shape_code: impl Into<String>,
        sizes: &[&str],
    ) -> Self {
        Self {
            designation: designation.into(),
            description: description.into(),
            shape_code: shape_code.into(),
            sizes: sizes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Reads a definition from a table row. Runs of whitespace in the
    /// designation collapse to a single space.
    pub fn from_row(row: &TableRow) -> Self {
        Self {
            designation: row
                .field(column::DESIGNATION)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
            description: row.field(column::SIGN).trim().to_string(),
            shape_code: row.field(column::SHAPE).trim().to_string(),
            sizes: column::SIZES.map(|i| row.field(i).to_string()).collect(),
        }
    }

    /// Trimmed, non-blank sizes with repeats removed, in first-seen order.
    pub fn unique_sizes(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for size in self.sizes.iter().map(|s| s.trim()) {
            if !size.is_empty() && !seen.contains(&size) {
                seen.push(size);
            }
        }
        seen
    }
}

/// Parse a catalog size for `shape`.
///
/// Triangles must carry a third dimension; octagons are regular, so the width
/// stands for both axes.
fn catalog_size(shape: SignShape, text: &str, row: usize) -> Result<NominalSize> {
    let size = NominalSize::parse(text).map_err(|e| Error::malformed(row, e.to_string()))?;
    if size.width == 0 || size.height == 0 {
        return Err(Error::malformed(row, format!("zero dimension in '{}'", text)));
    }
    if shape.requires_depth() && size.depth.is_none() {
        return Err(Error::malformed(
            row,
            format!("{} size '{}' needs three dimensions", shape, text),
        ));
    }
    Ok(match shape {
        SignShape::Octagon => NominalSize::new(size.width, size.width),
        _ => size,
    })
}

/// Outcome of a catalog build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    pub definitions: usize,
    pub unit_records: usize,
    pub explicit_records: usize,
    pub errors: Vec<RowError>,
}

/// Read-only view of one declared library.
#[derive(Debug, Clone, Copy)]
pub struct Library<'a> {
    model: &'a SignModel,
    key: LibraryKey,
}

impl<'a> Library<'a> {
    pub fn new(model: &'a SignModel, key: LibraryKey) -> Self {
        Self { model, key }
    }

    /// Looks a library up by name.
    pub fn by_name(model: &'a SignModel, name: &str) -> Result<Self> {
        model
            .library_by_name(name)
            .map(|key| Self { model, key })
            .ok_or_else(|| Error::LibraryNotFound(name.to_string()))
    }

    pub fn model(&self) -> &'a SignModel {
        self.model
    }

    pub fn key(&self) -> LibraryKey {
        self.key
    }

    pub fn name(&self) -> &'a str {
        self.model
            .library(self.key)
            .map(|l| l.name.as_str())
            .unwrap_or_default()
    }

    pub fn scale(&self) -> Option<ScaleClass> {
        self.model.library(self.key).and_then(|l| l.scale)
    }

    /// Declared records in declaration order.
    pub fn records(&self) -> impl Iterator<Item = (TypeKey, &'a SignTypeRecord)> + 'a {
        let model = self.model;
        model
            .library_types(self.key)
            .filter_map(move |k| model.sign_type(k).map(|t| (k, t)))
    }

    pub fn len(&self) -> usize {
        self.model.library_types(self.key).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A built catalog: a library model with its two libraries.
#[derive(Debug, Clone)]
pub struct SignCatalog {
    model: SignModel,
    unit_library: LibraryKey,
    explicit_library: LibraryKey,
}

impl SignCatalog {
    /// Reads the definition table at `path` and builds the catalog.
    pub fn from_table(path: impl AsRef<Path>, config: &BuildConfig) -> Result<(Self, CatalogReport)> {
        let path = path.as_ref();
        let table = Table::open(path)?;
        info!(path = %path.display(), rows = table.len(), "Read sign definition table");

        let lines: Vec<usize> = table.rows.iter().map(|r| r.line).collect();
        let definitions: Vec<SignDefinition> = table.rows.iter().map(SignDefinition::from_row).collect();
        Self::build_numbered(definitions.iter().zip(lines), config)
    }

    /// Builds the catalog from definitions in order.
    ///
    /// Rows are numbered from 1 in error reports.
    pub fn build(definitions: &[SignDefinition], config: &BuildConfig) -> Result<(Self, CatalogReport)> {
        Self::build_numbered(definitions.iter().zip(1..), config)
    }

    fn build_numbered<'d>(
        definitions: impl Iterator<Item = (&'d SignDefinition, usize)>,
        config: &BuildConfig,
    ) -> Result<(Self, CatalogReport)> {
        let mut model = SignModel::new(
            "MUTCD Sign Definition Libraries",
            config.length_unit,
            &config.seed,
        );
        let unit_library = model.add_library(UNIT_LIBRARY_NAME, Some(ScaleClass::Unit));
        let explicit_library = model.add_library(EXPLICIT_LIBRARY_NAME, Some(ScaleClass::Explicit));
        let project = model.project();
        model.declare(
            DeclaringContext::Project(project),
            vec![unit_library.into(), explicit_library.into()],
        )?;

        let mut builder = CatalogBuilder {
            model,
            depth: config.panel_depth,
            unit_geometry: FxHashMap::default(),
            unit_types: Vec::new(),
            explicit_types: Vec::new(),
        };
        let mut report = CatalogReport::default();

        for (definition, row) in definitions {
            report.definitions += 1;
            match builder.add_definition(definition, row) {
                Ok(()) => debug!(row, designation = %definition.designation, "Catalogued sign"),
                Err(e @ (Error::InvalidShape(_) | Error::MalformedRow { .. })) => {
                    warn!(row, designation = %definition.designation, error = %e, "Skipping sign definition");
                    report.errors.push(RowError::new(row, &e));
                }
                Err(e) => return Err(e),
            }
        }

        report.unit_records = builder.unit_types.len();
        report.explicit_records = builder.explicit_types.len();

        let mut model = builder.model;
        if !builder.unit_types.is_empty() {
            model.declare_library_types(unit_library, &builder.unit_types)?;
        }
        if !builder.explicit_types.is_empty() {
            model.declare_library_types(explicit_library, &builder.explicit_types)?;
        }

        info!(
            definitions = report.definitions,
            unit_records = report.unit_records,
            explicit_records = report.explicit_records,
            errors = report.errors.len(),
            "Built sign catalog"
        );

        Ok((
            Self {
                model,
                unit_library,
                explicit_library,
            },
            report,
        ))
    }

    pub fn model(&self) -> &SignModel {
        &self.model
    }

    pub fn into_model(self) -> SignModel {
        self.model
    }

    pub fn unit_library(&self) -> Library<'_> {
        Library::new(&self.model, self.unit_library)
    }

    pub fn explicit_library(&self) -> Library<'_> {
        Library::new(&self.model, self.explicit_library)
    }

    pub fn library(&self, scale: ScaleClass) -> Library<'_> {
        match scale {
            ScaleClass::Unit => self.unit_library(),
            ScaleClass::Explicit => self.explicit_library(),
        }
    }

    /// The library selected by [`BuildConfig::library`].
    pub fn configured_library(&self, config: &BuildConfig) -> Library<'_> {
        self.library(config.library)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(self.model.to_json()?)
    }
}

/// Mutable state while a catalog is being built.
struct CatalogBuilder {
    model: SignModel,
    depth: f64,
    /// Unit faces are shared by every unit record of the same sign
    unit_geometry: FxHashMap<(String, SignShape), GeometryKey>,
    unit_types: Vec<TypeKey>,
    explicit_types: Vec<TypeKey>,
}

impl CatalogBuilder {
    fn add_definition(&mut self, definition: &SignDefinition, row: usize) -> Result<()> {
        let shape = SignShape::from_code(&definition.shape_code).map_err(|_| {
            Error::InvalidShape(format!(
                "unknown shape code '{}' for {}",
                definition.shape_code, definition.designation
            ))
        })?;

        // Validate every size before creating anything for this row
        let sizes = definition
            .unique_sizes()
            .into_iter()
            .map(|s| catalog_size(shape, s, row))
            .collect::<Result<Vec<_>>>()?;

        for size in sizes {
            let unit = self.unit_record(definition, shape)?;
            self.unit_types.push(unit);

            let explicit = self.explicit_record(definition, shape, size)?;
            self.explicit_types.push(explicit);
        }
        Ok(())
    }

    fn unit_record(&mut self, definition: &SignDefinition, shape: SignShape) -> Result<TypeKey> {
        let geometry_key = (definition.designation.clone(), shape);
        let geometry = match self.unit_geometry.get(&geometry_key) {
            Some(&g) => g,
            None => {
                let face = ShapeDefinition::swept_polygon(
                    definition.designation.as_str(),
                    shape.outline(1.0, 1.0)?,
                    self.depth,
                )?;
                let g = self.model.add_geometry(face);
                self.unit_geometry.insert(geometry_key, g);
                g
            }
        };

        let unit_size = if shape.requires_depth() {
            NominalSize::with_depth(1, 1, 1)
        } else {
            NominalSize::new(1, 1)
        };
        let record = SignTypeRecord::new(
            definition.designation.as_str(),
            definition.description.as_str(),
            geometry,
        )
        .with_shape(shape)
        .with_size(unit_size)
        .with_scale(ScaleClass::Unit);
        Ok(self.model.add_type(record)?)
    }

    fn explicit_record(
        &mut self,
        definition: &SignDefinition,
        shape: SignShape,
        size: NominalSize,
    ) -> Result<TypeKey> {
        let (width, height) = (f64::from(size.width), f64::from(size.height));
        let face = ShapeDefinition::swept_polygon(
            definition.designation.as_str(),
            shape.outline(width, height)?,
            self.depth,
        )?;
        let geometry = self.model.add_geometry(face);

        let record = SignTypeRecord::new(
            definition.designation.as_str(),
            format!("{} ({})", definition.description, size),
            geometry,
        )
        .with_shape(shape)
        .with_size(size)
        .with_scale(ScaleClass::Explicit);
        let key = self.model.add_type(record)?;

        let area = face_area(&self.model, geometry);
        self.model.add_property_set(
            key,
            PropertySet::new("Qset_SignBaseQuantities")
                .with("Height", PropertyValue::Length(height))
                .with("Width", PropertyValue::Length(width)),
        )?;
        self.model.add_property_set(
            key,
            PropertySet::new("Qset_PictorialSignQuantities")
                .with("Area", PropertyValue::Area(area)),
        )?;
        Ok(key)
    }
}

/// Area of a swept face outline.
fn face_area(model: &SignModel, geometry: GeometryKey) -> f64 {
    match model.geometry(geometry) {
        Some(ShapeDefinition::SweptSolid(solid)) => solid.profile.signed_area().abs(),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stop() -> SignDefinition {
        SignDefinition::new("R1-1", "Stop sign", "R", &["36 x 36", "30 x 30"])
    }

    fn descriptions(library: Library<'_>) -> Vec<String> {
        library.records().map(|(_, t)| t.description.clone()).collect()
    }

    #[test]
    fn unique_sizes_drop_blanks_and_repeats() {
        let def = SignDefinition::new("R1-1", "Stop", "O", &["30 x 30", "", " 36 x 36", "30 x 30", "  "]);
        assert_eq!(def.unique_sizes(), vec!["30 x 30", "36 x 36"]);
    }

    #[test]
    fn two_sizes_give_four_records() {
        let (catalog, report) = SignCatalog::build(&[stop()], &BuildConfig::new()).unwrap();
        assert_eq!(report.unit_records, 2);
        assert_eq!(report.explicit_records, 2);
        assert!(report.errors.is_empty());
        assert_eq!(catalog.model().type_count(), 4);

        assert_eq!(
            descriptions(catalog.explicit_library()),
            vec!["Stop sign (36x36)", "Stop sign (30x30)"]
        );
        assert_eq!(descriptions(catalog.unit_library()), vec!["Stop sign", "Stop sign"]);
    }

    #[test]
    fn configured_library_follows_config() {
        let (catalog, _) = SignCatalog::build(&[stop()], &BuildConfig::new()).unwrap();
        let unit = BuildConfig::new().with_library(ScaleClass::Unit);
        assert_eq!(catalog.configured_library(&unit).name(), UNIT_LIBRARY_NAME);
        assert_eq!(catalog.configured_library(&BuildConfig::new()).name(), EXPLICIT_LIBRARY_NAME);
    }

    #[test]
    fn duplicate_sizes_give_one_pair() {
        let def = SignDefinition::new("R2-1", "Speed limit", "R", &["24 x 30", "24 x 30", "", "24 x 30"]);
        let (catalog, report) = SignCatalog::build(&[def], &BuildConfig::new()).unwrap();
        assert_eq!(report.unit_records, 1);
        assert_eq!(report.explicit_records, 1);
        assert_eq!(catalog.explicit_library().len(), 1);
    }

    #[test]
    fn unit_geometry_is_shared() {
        let (catalog, _) = SignCatalog::build(&[stop()], &BuildConfig::new()).unwrap();
        let reps: Vec<_> = catalog
            .unit_library()
            .records()
            .map(|(_, t)| t.representation)
            .collect();
        assert_eq!(reps[0], reps[1]);
        // One shared unit face plus two explicit faces
        assert_eq!(catalog.model().geometry_count(), 3);
    }

    #[test]
    fn octagon_uses_width_for_both_axes() {
        let def = SignDefinition::new("R1-1", "Stop sign", "O", &["36 x 30"]);
        let (catalog, _) = SignCatalog::build(&[def], &BuildConfig::new()).unwrap();
        let (_, record) = catalog.explicit_library().records().next().unwrap();
        assert_eq!(record.description, "Stop sign (36x36)");
        assert_eq!(record.size, Some(NominalSize::new(36, 36)));
    }

    #[test]
    fn triangle_requires_third_dimension() {
        let good = SignDefinition::new("R1-2", "Yield", "T", &["60 x 60 x 60"]);
        let bad = SignDefinition::new("R1-2a", "Yield", "T", &["36 x 36"]);
        let (catalog, report) = SignCatalog::build(&[bad, good], &BuildConfig::new()).unwrap();

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 1);
        assert_eq!(descriptions(catalog.explicit_library()), vec!["Yield (60x60x60)"]);
    }

    #[test]
    fn pentagon_depth_is_optional() {
        let defs = [
            SignDefinition::new("S4-3", "School", "P", &["36 x 36"]),
            SignDefinition::new("S4-3a", "School", "P", &["36 x 36 x 12"]),
        ];
        let (catalog, report) = SignCatalog::build(&defs, &BuildConfig::new()).unwrap();
        assert!(report.errors.is_empty());
        assert_eq!(
            descriptions(catalog.explicit_library()),
            vec!["School (36x36)", "School (36x36x12)"]
        );
    }

    #[test]
    fn malformed_rows_do_not_abort() {
        let defs = [
            SignDefinition::new("X1", "Bad size", "R", &["wide x tall"]),
            SignDefinition::new("X2", "Bad shape", "Q", &["10 x 10"]),
            stop(),
        ];
        let (catalog, report) = SignCatalog::build(&defs, &BuildConfig::new()).unwrap();
        assert_eq!(report.definitions, 3);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[1].message.contains("shape"));
        assert_eq!(catalog.explicit_library().len(), 2);
    }

    #[test]
    fn explicit_records_carry_quantities() {
        let (catalog, _) = SignCatalog::build(&[stop()], &BuildConfig::new()).unwrap();
        let (key, _) = catalog.explicit_library().records().next().unwrap();

        let base = catalog.model().property_set(key, "Qset_SignBaseQuantities").unwrap();
        assert_eq!(base.get("Width"), Some(&PropertyValue::Length(36.0)));

        let pictorial = catalog
            .model()
            .property_set(key, "Qset_PictorialSignQuantities")
            .unwrap();
        match pictorial.get("Area") {
            Some(PropertyValue::Area(a)) => assert_relative_eq!(*a, 1296.0, epsilon = 1e-9),
            other => panic!("unexpected area {:?}", other),
        }
        assert!(pictorial.get("SignArea").is_none());
    }

    #[test]
    fn libraries_are_declared_by_project() {
        let (catalog, _) = SignCatalog::build(&[stop()], &BuildConfig::new()).unwrap();
        let model = catalog.model();
        let declares = &model.relations().declares[0];
        assert_eq!(declares.relating_context, DeclaringContext::Project(model.project()));
        assert_eq!(declares.related_definitions.len(), 2);
        assert_eq!(catalog.library(ScaleClass::Unit).name(), UNIT_LIBRARY_NAME);
        assert_eq!(Library::by_name(model, "Signs").unwrap().key(), catalog.explicit_library().key());
    }
}
