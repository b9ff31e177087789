// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Build configuration loaded from environment variables.

use ifc_signs_model::{LengthUnit, ScaleClass};

/// Build configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Library that survey rows are matched against.
    pub library: ScaleClass,
    /// Length unit of the model being built.
    pub length_unit: LengthUnit,
    /// Sign panel thickness used when extruding faces.
    pub panel_depth: f64,
    /// Height of a primary sign's centre above its mounting point.
    pub mount_height: f64,
    /// Clearance between a primary sign and a placard hung beneath it.
    pub clearance_gap: f64,
    /// Seed for reproducible GlobalIds.
    pub seed: String,
}

impl BuildConfig {
    /// Fixed defaults, independent of the environment.
    pub fn new() -> Self {
        Self {
            library: ScaleClass::Explicit,
            length_unit: LengthUnit::Inch,
            panel_depth: 1.0,
            mount_height: 96.0,
            clearance_gap: 1.0,
            seed: "ifc-signs".into(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::new();
        Self {
            library: std::env::var("SIGNS_LIBRARY")
                .ok()
                .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
                    "unit" => Some(ScaleClass::Unit),
                    "explicit" => Some(ScaleClass::Explicit),
                    _ => None,
                })
                .unwrap_or(defaults.library),
            length_unit: std::env::var("SIGNS_LENGTH_UNIT")
                .ok()
                .and_then(|v| LengthUnit::from_name(&v))
                .unwrap_or(defaults.length_unit),
            panel_depth: std::env::var("SIGNS_PANEL_DEPTH")
                .unwrap_or_else(|_| "1.0".into())
                .parse()
                .unwrap_or(defaults.panel_depth),
            mount_height: std::env::var("SIGNS_MOUNT_HEIGHT")
                .unwrap_or_else(|_| "96.0".into())
                .parse()
                .unwrap_or(defaults.mount_height),
            clearance_gap: std::env::var("SIGNS_CLEARANCE_GAP")
                .unwrap_or_else(|_| "1.0".into())
                .parse()
                .unwrap_or(defaults.clearance_gap),
            seed: std::env::var("SIGNS_SEED").unwrap_or(defaults.seed),
        }
    }

    pub fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.length_unit = unit;
        self
    }

    pub fn with_library(mut self, library: ScaleClass) -> Self {
        self.library = library;
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_defaults() {
        let config = BuildConfig::new();
        assert_eq!(config.library, ScaleClass::Explicit);
        assert_eq!(config.length_unit, LengthUnit::Inch);
        assert_eq!(config.panel_depth, 1.0);
        assert_eq!(config.mount_height, 96.0);
        assert_eq!(config.seed, "ifc-signs");
    }

    #[test]
    fn builder_overrides() {
        let config = BuildConfig::new()
            .with_unit(LengthUnit::Foot)
            .with_library(ScaleClass::Unit)
            .with_seed("corridor");
        assert_eq!(config.length_unit, LengthUnit::Foot);
        assert_eq!(config.library, ScaleClass::Unit);
        assert_eq!(config.seed, "corridor");
    }
}
