use theater_geo::core::constants::{FEET_PER_METER, METERS_PER_FOOT};
use theater_geo::core::units::{feet_to_meters, meters_to_feet};
use theater_geo::core::{Dms, GameCoordinate, GeodeticCoordinate, LengthUnit};

#[test]
fn feet_meter_round_trip_is_lossless() {
    for &value in &[0.0, 1.0, 3_358_699.5, -42.25] {
        let there_and_back = feet_to_meters(meters_to_feet(value));
        assert!(
            (there_and_back - value).abs() <= 4.0 * f64::EPSILON * value.abs().max(1.0),
            "{value} round-tripped to {there_and_back}"
        );
        let back_and_there = meters_to_feet(feet_to_meters(value));
        assert!(
            (back_and_there - value).abs() <= 4.0 * f64::EPSILON * value.abs().max(1.0),
            "{value} round-tripped to {back_and_there}"
        );
    }
}

#[test]
fn large_theater_spans_1024_km() {
    let meters = feet_to_meters(3_358_699.5);
    assert!(
        (meters - 1_024_000.0).abs() < 0.1,
        "3358699.5 ft = {meters} m"
    );
    assert!((METERS_PER_FOOT * FEET_PER_METER - 1.0).abs() < 1e-15);
}

#[test]
fn game_coordinates_resolve_their_unit() {
    let feet = GameCoordinate::feet(1_000.0, 2_000.0);
    assert_eq!(feet.to_feet(), (1_000.0, 2_000.0));

    let meters = GameCoordinate::meters(304.879_909_6, 0.0);
    let (x_ft, y_ft) = meters.to_feet();
    assert!((x_ft - 1_000.0).abs() < 1e-9, "x = {x_ft}");
    assert_eq!(y_ft, 0.0);

    let converted = feet.in_unit(LengthUnit::Meters);
    assert_eq!(converted.unit, LengthUnit::Meters);
    assert!((converted.x - 304.879_909_6).abs() < 1e-9);
}

#[test]
fn dms_formatting_and_round_trip() {
    let dms = Dms::from_decimal(-127.508_333_333_333_33);
    assert!(dms.negative);
    assert_eq!(dms.degrees, 127);
    assert_eq!(dms.minutes, 30);
    assert!(
        (dms.seconds - 30.0).abs() < 1e-6,
        "seconds = {}",
        dms.seconds
    );
    assert_eq!(dms.to_string(), "-127° 30' 30.00\"");
    assert!((dms.to_decimal() + 127.508_333_333_333_33).abs() < 1e-12);

    let geo = GeodeticCoordinate::new(38.5, 127.25);
    let ((lat_d, lat_m), (lon_d, lon_m)) = geo.to_decimal_minutes();
    assert_eq!((lat_d, lon_d), (38, 127));
    assert!((lat_m - 30.0).abs() < 1e-9 && (lon_m - 15.0).abs() < 1e-9);
    assert_eq!(geo.to_string(), "38.500000°, 127.250000°");
}
