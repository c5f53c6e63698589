//! Golden searches against known eclipses of the 2023-2025 seasons.

mod common;

use approx::assert_relative_eq;
use common::MeanEphemeris;
use umbra::constants::MJD;
use umbra::ephemeris::{Body, BodyPosition, EquatorialCoord, PositionProvider};
use umbra::search::{
    lunar_eclipse_after, nearest_lunar_eclipse, nearest_solar_eclipse, solar_eclipse_after,
    LunarEclipseKind, SearchDirection, SolarEclipseKind,
};
use umbra::time::jd_to_mjd;
use umbra::umbra_errors::UmbraError;

#[test]
fn next_solar_eclipse_is_the_april_2024_total() {
    let eclipse = nearest_solar_eclipse(&MeanEphemeris, 295, SearchDirection::Next, false)
        .expect("search must land on lunation 300");

    assert_eq!(eclipse.lunation, 300);
    assert_eq!(eclipse.kind, SolarEclipseKind::Total);
    assert!(!eclipse.non_central);
    // Greatest eclipse 2024-04-08 18:17 TT (JD 2460409.262)
    assert_relative_eq!(
        eclipse.maximum,
        jd_to_mjd(2460409.262),
        epsilon = 0.02,
        max_relative = 1e-6
    );
    assert!(eclipse.magnitude > 1.0 && eclipse.magnitude < 1.1);
}

#[test]
fn previous_solar_eclipse_is_the_october_2023_annular() {
    let eclipse = nearest_solar_eclipse(&MeanEphemeris, 300, SearchDirection::Previous, false)
        .expect("search must land on lunation 294");

    assert_eq!(eclipse.lunation, 294);
    assert_eq!(eclipse.kind, SolarEclipseKind::Annular);
}

#[test]
fn saros_step_jumps_223_lunations() {
    // Lunation 77 is the 2006-03-29 total eclipse; one saros later is 2024-04-08
    let eclipse = nearest_solar_eclipse(&MeanEphemeris, 77, SearchDirection::Next, true)
        .expect("saros search must succeed");

    assert!(eclipse.lunation >= 77 + 223);
    assert_eq!(eclipse.lunation, 300);
    assert_eq!(eclipse.kind, SolarEclipseKind::Total);
}

#[test]
fn confirmed_eclipse_satisfies_the_existence_bound() {
    let eclipse = nearest_solar_eclipse(&MeanEphemeris, 295, SearchDirection::Next, false).unwrap();

    let at_max = eclipse.elements.evaluate(eclipse.maximum).unwrap();
    let miss = eclipse.elements.shadow_axis_offset(eclipse.maximum) - at_max.l1;
    assert!(miss <= 0.999, "existence bound violated: {miss}");
}

#[test]
fn fitted_axis_offset_agrees_with_the_series_gamma() {
    // Two independent paths to the same number: the series' gamma and the
    // fitted elements' axis offset at maximum
    let eclipse = nearest_solar_eclipse(&MeanEphemeris, 295, SearchDirection::Next, false).unwrap();
    let offset = eclipse.elements.shadow_axis_offset(eclipse.maximum);
    assert!(
        (offset - eclipse.gamma.abs()).abs() < 0.1,
        "offset = {offset}, gamma = {}",
        eclipse.gamma
    );
}

#[test]
fn solar_eclipse_after_an_instant_is_not_in_the_past() {
    // 2024-01-01 (MJD TT ~60310)
    let eclipse = solar_eclipse_after(&MeanEphemeris, 60310.0).unwrap();
    assert!(eclipse.maximum >= 60310.0);
    assert_eq!(eclipse.lunation, 300);
}

#[test]
fn next_lunar_eclipse_is_the_march_2025_total() {
    let eclipse = nearest_lunar_eclipse(&MeanEphemeris, 308, SearchDirection::Next, false)
        .expect("search must land on lunation 311");

    assert_eq!(eclipse.lunation, 311);
    assert_eq!(eclipse.kind, LunarEclipseKind::Total);
    // Greatest eclipse 2025-03-14 ~06:59 TT
    assert!(
        (eclipse.maximum - jd_to_mjd(2460748.791)).abs() < 0.02,
        "maximum = {}",
        eclipse.maximum
    );
    assert!(
        eclipse.magnitude > 1.0 && eclipse.magnitude < 1.4,
        "umbral magnitude = {}",
        eclipse.magnitude
    );
    assert!(eclipse.penumbral_magnitude > eclipse.magnitude);
}

#[test]
fn lunar_search_continues_to_the_september_2025_total() {
    let eclipse = nearest_lunar_eclipse(&MeanEphemeris, 311, SearchDirection::Next, false).unwrap();
    assert_eq!(eclipse.lunation, 317);
    assert_eq!(eclipse.kind, LunarEclipseKind::Total);
}

#[test]
fn lunar_eclipse_after_an_instant_is_not_in_the_past() {
    let eclipse = lunar_eclipse_after(&MeanEphemeris, 60310.0).unwrap();
    assert!(eclipse.maximum >= 60310.0);
}

/// Provider whose Moon is locked 90° from the Sun: no candidate can ever
/// pass the existence test.
struct NoEclipseProvider;

impl PositionProvider for NoEclipseProvider {
    fn position(&self, body: Body, _instant: MJD) -> Result<BodyPosition, UmbraError> {
        Ok(match body {
            Body::Sun => BodyPosition {
                coord: EquatorialCoord { ra: 0.0, dec: 0.0 },
                distance: 1.0,
            },
            Body::Moon => BodyPosition {
                coord: EquatorialCoord {
                    ra: std::f64::consts::FRAC_PI_2,
                    dec: 0.0,
                },
                distance: 384_400.0,
            },
        })
    }
}

#[test]
fn degenerate_geometry_exhausts_the_search_instead_of_looping() {
    let err = nearest_solar_eclipse(&NoEclipseProvider, 295, SearchDirection::Next, false)
        .expect_err("no eclipse can be confirmed against this geometry");
    assert!(matches!(err, UmbraError::SearchExhausted { .. }));
}
