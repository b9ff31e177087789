// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nominal sign sizes (`W x H [x D]`)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Nominal sign dimensions as printed in the sign manual tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NominalSize {
    pub width: u32,
    pub height: u32,
    /// Third dimension, only given for some shapes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

impl NominalSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: None,
        }
    }

    pub fn with_depth(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth: Some(depth),
        }
    }

    /// Parse `"36 x 36"`, `"36x36"` or `"60 x 60 x 60"`.
    ///
    /// Two or three dimensions are accepted; more is an error.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text
            .split(|c: char| c == 'x' || c == 'X' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.len() > 3 {
            return Err(Error::InvalidSize(text.to_string()));
        }

        let number = |i: usize| -> Result<Option<u32>> {
            tokens
                .get(i)
                .map(|t| t.parse::<u32>().map_err(|_| Error::InvalidSize(text.to_string())))
                .transpose()
        };

        let width = number(0)?.ok_or_else(|| Error::InvalidSize(text.to_string()))?;
        let height = number(1)?.ok_or_else(|| Error::InvalidSize(text.to_string()))?;
        let depth = number(2)?;

        Ok(Self {
            width,
            height,
            depth,
        })
    }
}

/// Compact form used in type descriptions: `36x36` or `60x60x60`
impl fmt::Display for NominalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.depth {
            Some(depth) => write!(f, "{}x{}x{}", self.width, self.height, depth),
            None => write!(f, "{}x{}", self.width, self.height),
        }
    }
}

impl FromStr for NominalSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
