// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model graph operations.

use crate::keys::{EntityKey, FrameKey, InstanceKey, LibraryKey};

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a sign model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced entity was not found in the model.
    #[error("entity not found: {0:?}")]
    NotFound(EntityKey),

    /// A library's type declarations are fixed once declared.
    #[error("library already declared: {0:?}")]
    LibraryAlreadyDeclared(LibraryKey),

    /// An instance was assigned to a second type grouping.
    #[error("instance already grouped under a type: {0:?}")]
    AlreadyGrouped(InstanceKey),

    /// A curve-relative frame was also given a parent frame.
    #[error("curve-relative frame cannot also be placed relative to {0:?}")]
    ParentedLinearFrame(FrameKey),

    /// A nominal size string could not be parsed.
    #[error("invalid size '{0}': expected 'W x H' or 'W x H x D'")]
    InvalidSize(String),

    /// A relation was created without any related entities.
    #[error("relation {0} has no related entities")]
    EmptyRelation(&'static str),

    /// Geometry construction failed.
    #[error("geometry error: {0}")]
    Geometry(#[from] ifc_signs_geometry::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
