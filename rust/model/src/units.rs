// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project length units
//!
//! A model declares a single length unit. Bringing geometry from a model in
//! one unit into a model in another is a plain scalar scale.

use serde::{Deserialize, Serialize};

/// Length unit declared by a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Millimetre,
    Metre,
    Inch,
    Foot,
}

impl LengthUnit {
    /// Parse a unit name (`inch`, `foot`, `metre`, `millimetre` and common abbreviations)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimetre" | "millimeter" => Some(Self::Millimetre),
            "m" | "metre" | "meter" => Some(Self::Metre),
            "in" | "inch" | "inches" => Some(Self::Inch),
            "ft" | "foot" | "feet" => Some(Self::Foot),
            _ => None,
        }
    }

    /// Unit name as declared on the project
    pub fn name(&self) -> &'static str {
        match self {
            Self::Millimetre => "millimetre",
            Self::Metre => "metre",
            Self::Inch => "inch",
            Self::Foot => "foot",
        }
    }

    #[inline]
    pub fn metres_per_unit(&self) -> f64 {
        match self {
            Self::Millimetre => 1e-3,
            Self::Metre => 1.0,
            Self::Inch => 0.0254,
            Self::Foot => 0.3048,
        }
    }

    /// Factor converting a length in `self` into `target` units
    #[inline]
    pub fn scale_to(&self, target: LengthUnit) -> f64 {
        if *self == target {
            return 1.0;
        }
        self.metres_per_unit() / target.metres_per_unit()
    }
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self::Inch
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
