// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field-survey ingestion.
//!
//! Each surveyed sign becomes an `IfcSign` placed at its surveyed position and
//! facing. Designation codes are matched against a catalog library; a matched
//! type is imported into the new model, an unmatched code gets a rectangular
//! ad-hoc type sized from the row (one per code, however many rows share it).

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use ifc_signs_geometry::{
    facing_from_orientation, place_absolute, MappingTarget, Point3, ShapeDefinition, SignShape,
};
use ifc_signs_model::{
    ModelGraphBuilder, ModelImporter, PlacementFrame, ScaleClass, SignModel, SignTypeRecord,
    TypeKey,
};

use crate::catalog::{Library, SignCatalog};
use crate::config::BuildConfig;
use crate::error::{Error, Result, RowError};
use crate::matcher::{SizeHint, TypeMatcher};
use crate::table::{Table, TableRow};

/// Column positions in the survey table
mod column {
    pub const OBJECT_ID: usize = 0;
    pub const X: usize = 1;
    pub const Y: usize = 2;
    pub const Z: usize = 3;
    pub const LAYER: usize = 4;
    pub const TEXT: usize = 5;
    pub const DESIGNATION: usize = 6;
    pub const WIDTH: usize = 7;
    pub const HEIGHT: usize = 8;
    pub const CONDITION: usize = 9;
    pub const ORIENTATION: usize = 10;
}

/// One surveyed sign.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRow {
    /// 1-based table line
    pub line: usize,
    pub object_id: String,
    pub position: Point3<f64>,
    pub layer: String,
    pub text: String,
    pub designation: String,
    pub width: f64,
    pub height: f64,
    pub condition: String,
    /// Facing angle in degrees
    pub orientation: f64,
}

impl SurveyRow {
    pub fn from_row(row: &TableRow) -> Result<Self> {
        Ok(Self {
            line: row.line,
            object_id: row.field(column::OBJECT_ID).trim().to_string(),
            position: Point3::new(
                row.number(column::X, "X")?,
                row.number(column::Y, "Y")?,
                row.number(column::Z, "Z")?,
            ),
            layer: row.field(column::LAYER).trim().to_string(),
            text: row.field(column::TEXT).trim().to_string(),
            designation: row.field(column::DESIGNATION).trim().to_string(),
            width: row.number(column::WIDTH, "Width")?,
            height: row.number(column::HEIGHT, "Height")?,
            condition: row.field(column::CONDITION).trim().to_string(),
            orientation: row.number(column::ORIENTATION, "Orientation")?,
        })
    }

    /// Instance name, `"<OBJECTID> <Text>"`
    pub fn name(&self) -> String {
        format!("{} {}", self.object_id, self.text)
    }

    pub fn orientation_radians(&self) -> f64 {
        self.orientation.to_radians()
    }
}

/// Reads the survey table, collecting rows that fail to parse.
pub fn read_survey(path: impl AsRef<Path>) -> Result<(Vec<SurveyRow>, Vec<RowError>)> {
    let table = Table::open(path)?;
    Ok(parse_survey(&table))
}

pub fn parse_survey(table: &Table) -> (Vec<SurveyRow>, Vec<RowError>) {
    let mut rows = Vec::with_capacity(table.len());
    let mut errors = Vec::new();
    for row in &table.rows {
        match SurveyRow::from_row(row) {
            Ok(r) => rows.push(r),
            Err(e) => {
                warn!(line = row.line, error = %e, "Skipping survey row");
                errors.push(RowError::new(row.line, &e));
            }
        }
    }
    (rows, errors)
}

/// Counts reported after ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SurveyReport {
    /// Rows whose designation was found in the library
    pub found: usize,
    /// Rows that needed an ad-hoc type
    pub not_found: usize,
    /// Signs placed in the model
    pub modeled: usize,
    /// Distinct types the signs were grouped under
    pub types_used: usize,
    pub errors: Vec<RowError>,
}

/// Builds a site model from surveyed signs.
#[derive(Debug)]
pub struct SurveyIngest<'a> {
    library: Library<'a>,
    config: &'a BuildConfig,
    project_name: String,
}

impl<'a> SurveyIngest<'a> {
    pub fn new(library: Library<'a>, config: &'a BuildConfig) -> Self {
        Self {
            library,
            config,
            project_name: "Sign Survey".to_string(),
        }
    }

    /// Ingests against the catalog library named by `config.library`.
    pub fn from_catalog(catalog: &'a SignCatalog, config: &'a BuildConfig) -> Self {
        Self::new(catalog.configured_library(config), config)
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    /// Reads and ingests a survey table. Unparseable rows are reported.
    pub fn ingest_table(&self, path: impl AsRef<Path>) -> Result<(SignModel, SurveyReport)> {
        let (rows, mut errors) = read_survey(path)?;
        let (model, mut report) = self.ingest(&rows)?;
        errors.append(&mut report.errors);
        errors.sort_by_key(|e| e.row);
        report.errors = errors;
        Ok((model, report))
    }

    /// Places every row; matching is by designation code only.
    ///
    /// A row that cannot be placed (non-finite coordinates, or a face size
    /// that cannot scale or build a type) is skipped and reported in
    /// [`SurveyReport::errors`]; the remaining rows are still modeled.
    pub fn ingest(&self, rows: &[SurveyRow]) -> Result<(SignModel, SurveyReport)> {
        let mut model = SignModel::new(
            self.project_name.as_str(),
            self.config.length_unit,
            &self.config.seed,
        );
        let site = model.add_site("Test Site", None)?;

        let matcher = TypeMatcher::new(self.library);
        let mut importer = ModelImporter::new(self.library.model());
        let mut builder = ModelGraphBuilder::new(site);
        let mut report = SurveyReport::default();

        // One library unit expressed in model units
        let unit_factor = self.library.model().unit().scale_to(model.unit());

        for row in rows {
            let name = row.name();
            debug!(line = row.line, name = %name, designation = %row.designation, "Placing sign");

            let resolved = check_placement(row).and_then(|()| {
                match matcher.find_record(&row.designation, &SizeHint::Any) {
                    Some((key, record)) => {
                        let target = match record.scale {
                            ScaleClass::Unit => {
                                check_face(row)?;
                                MappingTarget::non_uniform(
                                    row.width / unit_factor,
                                    row.height / unit_factor,
                                    1.0,
                                )
                            }
                            ScaleClass::Explicit => MappingTarget::identity(),
                        };
                        Ok((importer.import_type(&mut model, key)?, target, true))
                    }
                    None => {
                        let key = builder.adhoc_type(&row.designation, || {
                            adhoc_type(&mut model, row, self.config.panel_depth)
                        })?;
                        Ok((key, MappingTarget::identity(), false))
                    }
                }
            });

            let (sign_type, target, found) = match resolved {
                Ok(resolved) => resolved,
                Err(e) if e.is_row_error() => {
                    warn!(line = row.line, error = %e, "Skipping survey row");
                    report.errors.push(RowError::new(row.line, &e));
                    continue;
                }
                Err(e) => return Err(e),
            };
            if found {
                report.found += 1;
            } else {
                report.not_found += 1;
                warn!(line = row.line, designation = %row.designation, "Sign type not found in library");
            }

            let (axis, ref_direction) = facing_from_orientation(row.orientation_radians());
            let placement = place_absolute(row.position, axis, Some(ref_direction));
            let frame = model.add_frame(PlacementFrame::absolute(placement))?;
            let sign = model.add_sign(name, frame, sign_type, target)?;
            builder.assign(sign, sign_type)?;
            report.modeled += 1;
        }

        let summary = builder.finish(&mut model)?;
        report.types_used = summary.type_groups;

        info!(
            found = report.found,
            not_found = report.not_found,
            modeled = report.modeled,
            types_used = report.types_used,
            skipped = report.errors.len(),
            "Survey ingested"
        );
        Ok((model, report))
    }
}

fn check_placement(row: &SurveyRow) -> Result<()> {
    let coords = [row.position.x, row.position.y, row.position.z, row.orientation];
    if coords.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(Error::malformed(row.line, "position and orientation must be finite"))
    }
}

/// Surveyed face size must be finite and positive wherever it sizes geometry.
fn check_face(row: &SurveyRow) -> Result<()> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(row.width) && valid(row.height) {
        Ok(())
    } else {
        Err(Error::malformed(
            row.line,
            format!("cannot size sign face {}x{}", row.width, row.height),
        ))
    }
}

/// Rectangular type sized from the surveyed width and height.
fn adhoc_type(model: &mut SignModel, row: &SurveyRow, depth: f64) -> Result<TypeKey> {
    check_face(row)?;
    let face = ShapeDefinition::swept_polygon(
        row.designation.as_str(),
        SignShape::Rectangle.outline(row.width, row.height)?,
        depth,
    )?;
    let geometry = model.add_geometry(face);
    let record = SignTypeRecord::new(row.designation.as_str(), row.name(), geometry)
        .with_shape(SignShape::Rectangle);
    Ok(model.add_type(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SignDefinition;
    use approx::assert_relative_eq;
    use ifc_signs_geometry::Vector3;
    use ifc_signs_model::LengthUnit;

    fn row(id: &str, code: &str, orientation: f64) -> SurveyRow {
        SurveyRow {
            line: 2,
            object_id: id.to_string(),
            position: Point3::new(100.0, 200.0, 5.0),
            layer: "SIGNS".to_string(),
            text: "Test".to_string(),
            designation: code.to_string(),
            width: 2.0,
            height: 3.0,
            condition: "Good".to_string(),
            orientation,
        }
    }

    fn catalog() -> SignCatalog {
        let defs = [SignDefinition::new("R1-1", "Stop sign", "O", &["36 x 36"])];
        SignCatalog::build(&defs, &BuildConfig::new()).unwrap().0
    }

    #[test]
    fn parses_table_rows() {
        let table = Table::parse(
            "OBJECTID,X,Y,Z,Layer,Text,MUTCD,Width,Height,Condition,Orientation\n\
             17,1.5,2.5,3.5,SIGNS,STOP,R1-1,3,3,Good,90\n\
             18,oops,2,3,SIGNS,STOP,R1-1,3,3,Good,90\n",
        );
        let (rows, errors) = parse_survey(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name(), "17 STOP");
        assert_relative_eq!(rows[0].orientation_radians(), std::f64::consts::FRAC_PI_2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 3);
    }

    #[test]
    fn matched_and_unmatched_counts() {
        let catalog = catalog();
        let config = BuildConfig::new().with_unit(LengthUnit::Inch);
        let ingest = SurveyIngest::new(catalog.explicit_library(), &config);

        let rows = [row("1", "R1-1", 0.0), row("2", "Z9-9", 0.0), row("3", "R1-1", 0.0)];
        let (model, report) = ingest.ingest(&rows).unwrap();

        assert_eq!(report.found, 2);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.modeled, 3);
        assert_eq!(report.types_used, 2);
        assert_eq!(model.type_count(), 2);
    }

    #[test]
    fn unmatched_code_gets_one_adhoc_type() {
        let catalog = catalog();
        let config = BuildConfig::new();
        let ingest = SurveyIngest::new(catalog.explicit_library(), &config);

        let rows = [row("1", "Z9-9", 0.0), row("2", "Z9-9", 45.0), row("3", "Z9-9", 90.0)];
        let (model, report) = ingest.ingest(&rows).unwrap();

        assert_eq!(report.not_found, 3);
        assert_eq!(model.type_count(), 1);
        let rels = &model.relations().defines_by_type;
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].related_objects.len(), 3);
    }

    #[test]
    fn orientation_sets_facing() {
        let catalog = catalog();
        let config = BuildConfig::new();
        let ingest = SurveyIngest::new(catalog.explicit_library(), &config);
        let (model, _) = ingest.ingest(&[row("1", "R1-1", 90.0)]).unwrap();

        let (_, sign) = model.instances().next().unwrap();
        let matrix = model.frame_matrix(sign.placement).unwrap();
        let normal = matrix.transform_vector(&Vector3::z());
        assert_relative_eq!(normal, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(
            model.frame_origin(sign.placement).unwrap(),
            Point3::new(100.0, 200.0, 5.0)
        );
    }

    #[test]
    fn unsizable_row_is_skipped_and_reported() {
        let catalog = catalog();
        let config = BuildConfig::new();
        let ingest = SurveyIngest::new(catalog.explicit_library(), &config);

        let mut bad = row("2", "Z9-9", 0.0);
        bad.line = 3;
        bad.width = 0.0;
        let mut last = row("3", "R1-1", 0.0);
        last.line = 4;
        let (model, report) = ingest.ingest(&[row("1", "R1-1", 0.0), bad, last]).unwrap();

        assert_eq!(report.modeled, 2);
        assert_eq!(report.found, 2);
        assert_eq!(report.not_found, 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 3);
        assert_eq!(model.instance_count(), 2);
        assert_eq!(model.type_count(), 1);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let catalog = catalog();
        let config = BuildConfig::new();

        let mut nan_face = row("1", "Z9-9", 0.0);
        nan_face.width = f64::NAN;
        let mut inf_position = row("2", "R1-1", 0.0);
        inf_position.position.x = f64::INFINITY;
        let rows = [nan_face, inf_position, row("3", "R1-1", 0.0)];

        let (model, report) = SurveyIngest::new(catalog.explicit_library(), &config)
            .ingest(&rows)
            .unwrap();
        assert_eq!(report.modeled, 1);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(model.instance_count(), 1);

        // Unit-scale mapping needs a usable face size as well
        let mut nan_unit = row("4", "R1-1", 0.0);
        nan_unit.height = f64::NAN;
        let (_, report) = SurveyIngest::new(catalog.unit_library(), &config)
            .ingest(&[nan_unit])
            .unwrap();
        assert_eq!(report.modeled, 0);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn configured_library_drives_matching() {
        let catalog = catalog();
        let unit = BuildConfig::new().with_unit(LengthUnit::Foot).with_library(ScaleClass::Unit);
        let (model, _) = SurveyIngest::from_catalog(&catalog, &unit)
            .ingest(&[row("1", "R1-1", 0.0)])
            .unwrap();
        let (_, sign) = model.instances().next().unwrap();
        assert_relative_eq!(sign.representation.target.scale.x, 24.0, epsilon = 1e-9);

        let explicit = BuildConfig::new().with_library(ScaleClass::Explicit);
        let (model, _) = SurveyIngest::from_catalog(&catalog, &explicit)
            .ingest(&[row("1", "R1-1", 0.0)])
            .unwrap();
        let (_, sign) = model.instances().next().unwrap();
        assert_relative_eq!(sign.representation.target.scale, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn unit_library_signs_are_stretched() {
        let catalog = catalog();
        let config = BuildConfig::new().with_unit(LengthUnit::Foot);
        let ingest = SurveyIngest::new(catalog.unit_library(), &config);
        let (model, _) = ingest.ingest(&[row("1", "R1-1", 0.0)]).unwrap();

        let (_, sign) = model.instances().next().unwrap();
        // 1 inch face in a foot model, stretched to 2 ft x 3 ft
        assert_relative_eq!(sign.representation.target.scale.x, 24.0, epsilon = 1e-9);
        assert_relative_eq!(sign.representation.target.scale.y, 36.0, epsilon = 1e-9);
    }
}
