// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Signs Processing
//!
//! Pipelines that turn sign tables and survey data into [`SignModel`]s.
//!
//! - [`SignCatalog`] builds the "Unit Signs" and "Signs" libraries from a
//!   catalog table.
//! - [`TypeMatcher`] resolves a sign code and size hint to a library type.
//! - [`SurveyIngest`] places surveyed signs, falling back to ad-hoc types.
//! - [`ChevronRun`] and [`AllWayStop`] place signs along an alignment and at
//!   an intersection.
//!
//! ```
//! use ifc_signs_processing::{BuildConfig, SignCatalog, SignDefinition, SizeHint, TypeMatcher};
//!
//! let defs = [SignDefinition::new("R1-1", "Stop", "O", &["30 x 30", "36 x 36"])];
//! let (catalog, report) = SignCatalog::build(&defs, &BuildConfig::new()).unwrap();
//! assert!(report.errors.is_empty());
//!
//! let matcher = TypeMatcher::new(catalog.explicit_library());
//! assert!(matcher.find("R1-1", &SizeHint::from_text("36x36")).is_some());
//! ```
//!
//! [`SignModel`]: ifc_signs_model::SignModel

pub mod catalog;
pub mod classified;
pub mod config;
pub mod corridor;
pub mod error;
pub mod intersection;
pub mod matcher;
pub mod survey;
pub mod table;

pub use catalog::{
    CatalogReport, Library, SignCatalog, SignDefinition, EXPLICIT_LIBRARY_NAME, UNIT_LIBRARY_NAME,
};
pub use classified::{guide_panel, ClassifiedSign, TypeSource};
pub use config::BuildConfig;
pub use corridor::{quarter_turn_alignment, ChevronRun};
pub use error::{Error, Result, RowError};
pub use intersection::{AllWayStop, Corner, Intersection};
pub use matcher::{SizeHint, TypeMatcher};
pub use survey::{parse_survey, read_survey, SurveyIngest, SurveyReport, SurveyRow};
pub use table::{Table, TableRow};
