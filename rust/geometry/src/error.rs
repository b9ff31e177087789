// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or placing sign geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    #[error("Invalid triangulated panel: {0}")]
    InvalidPanel(String),

    #[error("Invalid alignment: {0}")]
    InvalidAlignment(String),

    #[error("Station {station} is outside the curve range [0, {length}]")]
    StationOutOfRange { station: f64, length: f64 },
}
