// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Regular-polygon sign faces.
//!
//! Sign faces are authored face-up in the local X-Y plane. A face is a regular
//! polygon circumscribed so that its flat-to-flat extents equal the nominal
//! width and height of the sign.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use nalgebra::Point2;

/// Generate the vertices of a regular polygon.
///
/// The radii are corrected from apothem to vertex (`0.5 * width / cos(π/sides)`)
/// so a polygon whose edges are axis aligned spans exactly `width` by `height`.
/// `start_angle` orients the first vertex; vertices are counter-clockwise.
pub fn generate_polygon(
    width: f64,
    height: f64,
    sides: usize,
    start_angle: f64,
) -> Result<Vec<Point2<f64>>> {
    if sides < 3 {
        return Err(Error::InvalidShape(format!(
            "polygon needs at least 3 sides, got {}",
            sides
        )));
    }

    let angle_step = 2.0 * PI / sides as f64;
    let correction = (PI / sides as f64).cos();
    let radius_x = 0.5 * width / correction;
    let radius_y = 0.5 * height / correction;

    Ok((0..sides)
        .map(|i| {
            let angle = start_angle + i as f64 * angle_step;
            Point2::new(radius_x * angle.cos(), radius_y * angle.sin())
        })
        .collect())
}

/// Sign face shapes found in the sign definition tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignShape {
    Octagon,
    Rectangle,
    Diamond,
    /// Triangle, sized as `W x H x D` in the definition tables
    Triangle,
    Pentagon,
}

impl SignShape {
    /// Parse a single-letter shape code (`O`, `R`, `D`, `T`, `P`) or a spelled-out name
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "O" | "OCTAGON" => Ok(Self::Octagon),
            "R" | "RECTANGLE" | "SQUARE" => Ok(Self::Rectangle),
            "D" | "DIAMOND" => Ok(Self::Diamond),
            "T" | "TRIANGLE" => Ok(Self::Triangle),
            "P" | "PENTAGON" => Ok(Self::Pentagon),
            other => Err(Error::InvalidShape(format!("unknown shape code '{}'", other))),
        }
    }

    /// Single-letter code used by the definition tables
    pub fn code(&self) -> &'static str {
        match self {
            Self::Octagon => "O",
            Self::Rectangle => "R",
            Self::Diamond => "D",
            Self::Triangle => "T",
            Self::Pentagon => "P",
        }
    }

    #[inline]
    pub fn sides(&self) -> usize {
        match self {
            Self::Octagon => 8,
            Self::Rectangle | Self::Diamond => 4,
            Self::Triangle => 3,
            Self::Pentagon => 5,
        }
    }

    /// Orientation of the first vertex.
    ///
    /// Octagons and rectangles are rotated half a step so they present flat
    /// edges at top and bottom; diamonds keep a vertex on the X axis.
    #[inline]
    pub fn start_angle(&self) -> f64 {
        match self {
            Self::Octagon => PI / 8.0,
            Self::Rectangle => PI / 4.0,
            Self::Diamond => 0.0,
            Self::Triangle | Self::Pentagon => PI / 6.0,
        }
    }

    /// Whether the size columns for this shape carry a mandatory third dimension
    #[inline]
    pub fn requires_depth(&self) -> bool {
        matches!(self, Self::Triangle)
    }

    /// Face outline for a sign of the given nominal size.
    ///
    /// Octagons are always regular, so only the width is used.
    pub fn outline(&self, width: f64, height: f64) -> Result<Vec<Point2<f64>>> {
        let height = match self {
            Self::Octagon => width,
            _ => height,
        };
        generate_polygon(width, height, self.sides(), self.start_angle())
    }
}

impl fmt::Display for SignShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Octagon => "Octagon",
            Self::Rectangle => "Rectangle",
            Self::Diamond => "Diamond",
            Self::Triangle => "Triangle",
            Self::Pentagon => "Pentagon",
        })
    }
}

impl FromStr for SignShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}
