// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use ifc_signs_geometry::{
    place_on_curve, stacked_offset, CompositeCurve, MappingTarget, Point2, Point3, ReferenceCurve,
    ShapeDefinition, SignShape, Vector3,
};
use std::f64::consts::FRAC_PI_2;

/// 90° right-hand curve of radius 1000 between PIs (0,0), (0,R) and (R,R)
fn quarter_turn() -> CompositeCurve {
    let r = 1000.0;
    let pis = [Point2::new(0.0, 0.0), Point2::new(0.0, r), Point2::new(r, r)];
    CompositeCurve::by_pi_method(&pis, &[r]).unwrap()
}

#[test]
fn quarter_turn_is_all_arc() {
    let curve = quarter_turn();
    assert_relative_eq!(curve.length(), 1000.0 * FRAC_PI_2, epsilon = 1e-6);

    let end = curve.point_at_station(curve.length()).unwrap();
    assert_relative_eq!(end, Point3::new(1000.0, 1000.0, 0.0), epsilon = 1e-6);
}

#[test]
fn chevron_faces_turn_with_the_curve() {
    let curve = quarter_turn();

    // Heading north at the start: face normal points east, left is west
    let start = place_on_curve(0.0, 20.0, 8.0, &curve).unwrap();
    assert_relative_eq!(start.axis, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(start.cartesian.location, Point3::new(-20.0, 0.0, 8.0), epsilon = 1e-9);

    // Heading east at the end
    let end = place_on_curve(curve.length(), 0.0, 0.0, &curve).unwrap();
    assert_relative_eq!(end.axis, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(end.ref_direction, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-9);
}

#[test]
fn stacked_signs_share_a_gap() {
    // 36" stop sign over an 18"×6" plaque with a 1" gap
    assert_relative_eq!(stacked_offset(36.0, 6.0, 1.0), 22.0);
}

#[test]
fn unit_chevron_maps_to_three_by_four_feet() {
    let unit = ShapeDefinition::swept_polygon(
        "W1-8R",
        SignShape::Rectangle.outline(1.0 / 12.0, 1.0 / 12.0).unwrap(),
        1.0 / 12.0,
    )
    .unwrap();
    let ShapeDefinition::SweptSolid(solid) = unit else {
        panic!("expected swept solid");
    };
    let matrix = MappingTarget::non_uniform(36.0, 48.0, 0.5).to_matrix();

    let corners: Vec<Point3<f64>> = solid
        .profile
        .outer
        .iter()
        .map(|p| matrix.transform_point(&Point3::new(p.x, p.y, 0.0)))
        .collect();
    let span = |f: fn(&Point3<f64>) -> f64| {
        let max = corners.iter().map(f).fold(f64::MIN, f64::max);
        let min = corners.iter().map(f).fold(f64::MAX, f64::min);
        max - min
    };
    assert_relative_eq!(span(|p| p.x), 3.0, epsilon = 1e-9);
    assert_relative_eq!(span(|p| p.y), 4.0, epsilon = 1e-9);
}
