// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for catalog and placement pipelines.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Malformed row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    #[error("Input table not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Sign type '{0}' not found in library")]
    SignTypeNotFound(String),

    #[error("Library '{0}' not found")]
    LibraryNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] ifc_signs_geometry::Error),

    #[error("Model error: {0}")]
    Model(#[from] ifc_signs_model::Error),
}

impl Error {
    pub fn malformed(row: usize, message: impl Into<String>) -> Self {
        Self::MalformedRow {
            row,
            message: message.into(),
        }
    }

    /// Errors confined to one input row; pipelines skip the row and go on.
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedRow { .. } | Self::InvalidShape(_) | Self::Geometry(_)
        )
    }
}

/// A non-fatal error tied to one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// 1-based line of the row in its table (the header is line 1)
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, error: &Error) -> Self {
        Self {
            row,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}
