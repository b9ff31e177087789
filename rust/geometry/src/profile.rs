// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D closed profiles

use nalgebra::Point2;

/// Closed planar outline.
///
/// The outline is stored without a repeated closing point; the edge from the
/// last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self { outer }
    }

    /// Line segments of the closed outline as 1-based index pairs,
    /// `(1,2), (2,3), ..., (n,1)`, the way an indexed poly curve records them
    pub fn segments(&self) -> Vec<(usize, usize)> {
        let n = self.outer.len();
        let mut segments: Vec<(usize, usize)> = (1..n).map(|i| (i, i + 1)).collect();
        if n > 0 {
            segments.push((n, 1));
        }
        segments
    }

    /// Signed area (positive for counter-clockwise outlines)
    pub fn signed_area(&self) -> f64 {
        let n = self.outer.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice_area = 0.0;
        for i in 0..n {
            let p0 = self.outer[i];
            let p1 = self.outer[(i + 1) % n];
            twice_area += p0.x * p1.y - p1.x * p0.y;
        }
        twice_area * 0.5
    }
}
