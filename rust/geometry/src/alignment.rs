// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Horizontal reference curves for curve-relative placement.
//!
//! Headings are measured counter-clockwise from +X, in radians. Curves lie in
//! the X-Y plane; vertical offsets are applied by the placement.

use crate::error::{Error, Result};
use nalgebra::{Point2, Point3, Vector2, Vector3};

/// Tolerance for stations that land just past either end of a curve
const STATION_TOLERANCE: f64 = 1e-9;

/// A curve that can be queried by arc length
pub trait ReferenceCurve {
    /// Total arc length
    fn length(&self) -> f64;

    /// Point at the given distance along the curve
    fn point_at_station(&self, distance_along: f64) -> Result<Point3<f64>>;

    /// Unit tangent at the given distance along the curve
    fn tangent_at(&self, distance_along: f64) -> Result<Vector3<f64>>;

    /// Tangent heading at the given distance along the curve
    fn heading_at(&self, distance_along: f64) -> Result<f64> {
        let tangent = self.tangent_at(distance_along)?;
        Ok(tangent.y.atan2(tangent.x))
    }
}

fn check_station(station: f64, length: f64) -> Result<f64> {
    if station < -STATION_TOLERANCE || station > length + STATION_TOLERANCE || !station.is_finite() {
        return Err(Error::StationOutOfRange { station, length });
    }
    Ok(station.clamp(0.0, length))
}

#[inline]
fn heading_vector(heading: f64) -> Vector3<f64> {
    Vector3::new(heading.cos(), heading.sin(), 0.0)
}

/// Straight tangent run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Point2<f64>,
    pub heading: f64,
    pub length: f64,
}

impl LineSegment {
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Result<Self> {
        let delta = end - start;
        let length = delta.norm();
        if length <= 0.0 {
            return Err(Error::InvalidAlignment("zero-length line segment".to_string()));
        }
        Ok(Self {
            start,
            heading: delta.y.atan2(delta.x),
            length,
        })
    }
}

impl ReferenceCurve for LineSegment {
    fn length(&self) -> f64 {
        self.length
    }

    fn point_at_station(&self, distance_along: f64) -> Result<Point3<f64>> {
        let d = check_station(distance_along, self.length)?;
        let p = self.start + Vector2::new(self.heading.cos(), self.heading.sin()) * d;
        Ok(Point3::new(p.x, p.y, 0.0))
    }

    fn tangent_at(&self, distance_along: f64) -> Result<Vector3<f64>> {
        check_station(distance_along, self.length)?;
        Ok(heading_vector(self.heading))
    }
}

/// Turn direction of a circular arc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

impl Turn {
    #[inline]
    fn sign(&self) -> f64 {
        match self {
            Turn::Left => 1.0,
            Turn::Right => -1.0,
        }
    }
}

/// Circular arc; the heading changes by `d / radius` over distance `d`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularArc {
    pub start: Point2<f64>,
    pub start_heading: f64,
    pub radius: f64,
    pub length: f64,
    pub turn: Turn,
}

impl CircularArc {
    pub fn new(
        start: Point2<f64>,
        start_heading: f64,
        radius: f64,
        length: f64,
        turn: Turn,
    ) -> Result<Self> {
        if radius <= 0.0 || !radius.is_finite() {
            return Err(Error::InvalidAlignment(format!("radius must be positive, got {}", radius)));
        }
        if length <= 0.0 {
            return Err(Error::InvalidAlignment(format!("arc length must be positive, got {}", length)));
        }
        Ok(Self {
            start,
            start_heading,
            radius,
            length,
            turn,
        })
    }

    /// Centre of curvature
    pub fn center(&self) -> Point2<f64> {
        let s = self.turn.sign();
        let (sin, cos) = self.start_heading.sin_cos();
        self.start + Vector2::new(-sin, cos) * (s * self.radius)
    }

    fn heading_unchecked(&self, d: f64) -> f64 {
        self.start_heading + self.turn.sign() * d / self.radius
    }
}

impl ReferenceCurve for CircularArc {
    fn length(&self) -> f64 {
        self.length
    }

    fn point_at_station(&self, distance_along: f64) -> Result<Point3<f64>> {
        let d = check_station(distance_along, self.length)?;
        let s = self.turn.sign();
        let heading = self.heading_unchecked(d);
        let center = self.center();
        let p = center + Vector2::new(heading.sin(), -heading.cos()) * (s * self.radius);
        Ok(Point3::new(p.x, p.y, 0.0))
    }

    fn tangent_at(&self, distance_along: f64) -> Result<Vector3<f64>> {
        let d = check_station(distance_along, self.length)?;
        Ok(heading_vector(self.heading_unchecked(d)))
    }

    fn heading_at(&self, distance_along: f64) -> Result<f64> {
        let d = check_station(distance_along, self.length)?;
        Ok(self.heading_unchecked(d))
    }
}

/// Piece of a composite curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveSegment {
    Line(LineSegment),
    Arc(CircularArc),
}

impl CurveSegment {
    fn as_curve(&self) -> &dyn ReferenceCurve {
        match self {
            CurveSegment::Line(line) => line,
            CurveSegment::Arc(arc) => arc,
        }
    }
}

/// Ordered chain of segments measured by cumulative arc length
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeCurve {
    segments: Vec<CurveSegment>,
}

impl CompositeCurve {
    pub fn new(segments: Vec<CurveSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// Build a tangent-arc-tangent alignment from points of intersection.
    ///
    /// `points` are the PIs including both ends; `radii` holds one radius per
    /// interior PI.
    pub fn by_pi_method(points: &[Point2<f64>], radii: &[f64]) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::InvalidAlignment("need at least two points".to_string()));
        }
        if radii.len() != points.len() - 2 {
            return Err(Error::InvalidAlignment(format!(
                "expected {} radii for {} points, got {}",
                points.len() - 2,
                points.len(),
                radii.len()
            )));
        }

        let mut segments = Vec::with_capacity(points.len() * 2);
        let mut current = points[0];

        for (i, &radius) in radii.iter().enumerate() {
            let (prev, pi, next) = (points[i], points[i + 1], points[i + 2]);
            let incoming = (pi - prev)
                .try_normalize(1e-12)
                .ok_or_else(|| Error::InvalidAlignment("coincident points".to_string()))?;
            let outgoing = (next - pi)
                .try_normalize(1e-12)
                .ok_or_else(|| Error::InvalidAlignment("coincident points".to_string()))?;

            let deflection = incoming.perp(&outgoing).atan2(incoming.dot(&outgoing));
            if deflection.abs() < 1e-12 {
                continue;
            }
            let tangent_length = radius * (deflection.abs() / 2.0).tan();
            let pc = pi - incoming * tangent_length;
            let pt = pi + outgoing * tangent_length;

            if (pc - current).dot(&incoming) < -1e-9 {
                return Err(Error::InvalidAlignment(format!(
                    "curve at PI {} overlaps the previous curve",
                    i + 1
                )));
            }
            if (pc - current).norm() > 1e-9 {
                segments.push(CurveSegment::Line(LineSegment::new(current, pc)?));
            }

            let turn = if deflection > 0.0 { Turn::Left } else { Turn::Right };
            segments.push(CurveSegment::Arc(CircularArc::new(
                pc,
                incoming.y.atan2(incoming.x),
                radius,
                radius * deflection.abs(),
                turn,
            )?));
            current = pt;
        }

        let last = points[points.len() - 1];
        let final_tangent = (last - points[points.len() - 2])
            .try_normalize(1e-12)
            .ok_or_else(|| Error::InvalidAlignment("coincident points".to_string()))?;
        if (last - current).dot(&final_tangent) < -1e-9 {
            return Err(Error::InvalidAlignment(
                "last curve runs past the end point".to_string(),
            ));
        }
        if (last - current).norm() > 1e-9 {
            segments.push(CurveSegment::Line(LineSegment::new(current, last)?));
        }

        Ok(Self { segments })
    }

    /// Segment holding a station and the station local to it
    fn locate(&self, distance_along: f64) -> Result<(&CurveSegment, f64)> {
        let total = self.length();
        let d = check_station(distance_along, total)?;

        let mut start = 0.0;
        for (i, segment) in self.segments.iter().enumerate() {
            let len = segment.as_curve().length();
            let is_last = i + 1 == self.segments.len();
            if d <= start + len || is_last {
                return Ok((segment, (d - start).clamp(0.0, len)));
            }
            start += len;
        }
        Err(Error::StationOutOfRange {
            station: distance_along,
            length: total,
        })
    }
}

impl From<CircularArc> for CompositeCurve {
    fn from(arc: CircularArc) -> Self {
        Self::new(vec![CurveSegment::Arc(arc)])
    }
}

impl From<LineSegment> for CompositeCurve {
    fn from(line: LineSegment) -> Self {
        Self::new(vec![CurveSegment::Line(line)])
    }
}

impl ReferenceCurve for CompositeCurve {
    fn length(&self) -> f64 {
        self.segments.iter().map(|s| s.as_curve().length()).sum()
    }

    fn point_at_station(&self, distance_along: f64) -> Result<Point3<f64>> {
        let (segment, local) = self.locate(distance_along)?;
        segment.as_curve().point_at_station(local)
    }

    fn tangent_at(&self, distance_along: f64) -> Result<Vector3<f64>> {
        let (segment, local) = self.locate(distance_along)?;
        segment.as_curve().tangent_at(local)
    }

    fn heading_at(&self, distance_along: f64) -> Result<f64> {
        let (segment, local) = self.locate(distance_along)?;
        segment.as_curve().heading_at(local)
    }
}
