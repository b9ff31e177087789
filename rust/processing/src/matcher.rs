// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Designation-code lookup against a declared library.
//!
//! The scan is linear and in declaration order, and the first record that
//! satisfies the query wins, so catalog build order decides ties. Absence is
//! an ordinary `None`; callers choose the fallback.

use ifc_signs_model::{NominalSize, SignTypeRecord, TypeKey};

use crate::catalog::Library;

/// Optional size constraint on a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SizeHint {
    /// Any size; the first record with the code matches
    #[default]
    Any,
    /// Literal substring of the record description, e.g. `"36x36"`
    Text(String),
    /// Structural comparison against the record's parsed size
    Structured(NominalSize),
}

impl SizeHint {
    /// Blank text means no constraint.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Self::Any
        } else {
            Self::Text(text.to_string())
        }
    }

    pub fn matches(&self, record: &SignTypeRecord) -> bool {
        match self {
            SizeHint::Any => true,
            SizeHint::Text(text) => record.description.contains(text.as_str()),
            SizeHint::Structured(size) => match &record.size {
                Some(record_size) => record_size == size,
                // Records without a parsed size only carry it in the description
                None => record.description.contains(&size.to_string()),
            },
        }
    }
}

impl From<NominalSize> for SizeHint {
    fn from(size: NominalSize) -> Self {
        SizeHint::Structured(size)
    }
}

/// Resolves designation codes against one library.
#[derive(Debug, Clone, Copy)]
pub struct TypeMatcher<'a> {
    library: Library<'a>,
}

impl<'a> TypeMatcher<'a> {
    pub fn new(library: Library<'a>) -> Self {
        Self { library }
    }

    pub fn library(&self) -> Library<'a> {
        self.library
    }

    /// First record with `code` whose size satisfies `hint`.
    pub fn find(&self, code: &str, hint: &SizeHint) -> Option<TypeKey> {
        self.find_record(code, hint).map(|(key, _)| key)
    }

    pub fn find_record(&self, code: &str, hint: &SizeHint) -> Option<(TypeKey, &'a SignTypeRecord)> {
        self.library
            .records()
            .find(|(_, record)| record.designation == code && hint.matches(record))
    }
}
