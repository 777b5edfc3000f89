//! Unit tests for the geofence evaluator.

use super::fixtures::{SITE, point_north_of};
use crate::task::domain::{Coordinates, distance_meters, within_radius};
use rstest::rstest;

#[rstest]
#[case(SITE)]
#[case(Coordinates::new(0.0, 0.0))]
#[case(Coordinates::new(-33.447_49, -70.673_66))]
fn distance_from_a_point_to_itself_is_zero(#[case] point: Coordinates) {
    assert_eq!(distance_meters(point, point), 0.0);
}

#[rstest]
fn distance_is_symmetric() {
    let other = Coordinates::new(4.624_335, -74.063_644);
    let forward = distance_meters(SITE, other);
    let backward = distance_meters(other, SITE);
    assert_eq!(forward, backward);
    assert!(forward > 0.0);
}

#[rstest]
fn metric_offset_yields_expected_distance() {
    let fix = point_north_of(SITE, 150.0);
    let distance = distance_meters(SITE, fix);
    assert!(
        (149.0..151.0).contains(&distance),
        "expected ~150 m, got {distance}"
    );
}

#[rstest]
fn point_at_the_site_is_in_range_for_any_positive_radius() {
    assert!(within_radius(distance_meters(SITE, SITE), 0.5));
    assert!(within_radius(distance_meters(SITE, SITE), 100.0));
}

#[rstest]
fn point_just_inside_the_radius_is_accepted() {
    let fix = point_north_of(SITE, 99.0);
    assert!(within_radius(distance_meters(SITE, fix), 100.0));
}

#[rstest]
fn point_just_outside_the_radius_is_rejected() {
    let fix = point_north_of(SITE, 101.0);
    assert!(!within_radius(distance_meters(SITE, fix), 100.0));
}

#[rstest]
fn non_finite_distance_is_out_of_range() {
    let broken = Coordinates::new(f64::NAN, -74.0);
    let distance = distance_meters(broken, SITE);
    assert!(!within_radius(distance, 100.0));
    assert!(!within_radius(f64::INFINITY, 100.0));
    assert!(!within_radius(50.0, f64::NAN));
}
