//! Shared test fixture: a deterministic mean-element Sun/Moon provider.
//!
//! Truncated series good to a few hundredths of a degree over 2000-2030,
//! which is ample for exercising the search, the element fit, and the
//! central-line pipeline end to end without any ephemeris file.

use umbra::constants::{MJD, T2000};
use umbra::ephemeris::{Body, BodyPosition, EquatorialCoord, PositionProvider};
use umbra::umbra_errors::UmbraError;

pub struct MeanEphemeris;

fn norm_deg(x: f64) -> f64 {
    x.rem_euclid(360.0)
}

/// Ecliptic longitude/latitude (degrees) + distance to equatorial RA/Dec (radians).
fn ecliptic_to_equatorial(lon_deg: f64, lat_deg: f64, t: f64) -> EquatorialCoord {
    let eps = (23.43929111 - 0.01300416 * t).to_radians();
    let lam = lon_deg.to_radians();
    let beta = lat_deg.to_radians();

    let ra = (lam.sin() * eps.cos() - beta.tan() * eps.sin()).atan2(lam.cos());
    let dec = (beta.sin() * eps.cos() + beta.cos() * eps.sin() * lam.sin()).asin();
    EquatorialCoord {
        ra: ra.rem_euclid(std::f64::consts::TAU),
        dec,
    }
}

/// Low-accuracy solar coordinates (mean equinox of date), distance in AU.
fn sun_position(mjd: MJD) -> BodyPosition {
    let t = (mjd - T2000) / 36525.0;

    let l0 = norm_deg(280.46646 + 36000.76983 * t + 0.0003032 * t * t);
    let m = norm_deg(357.52911 + 35999.05029 * t - 0.0001537 * t * t).to_radians();
    let e = 0.016708634 - 0.000042037 * t;

    let c = (1.914602 - 0.004817 * t) * m.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * m).sin()
        + 0.000289 * (3.0 * m).sin();

    let true_lon = l0 + c;
    let nu = m + c.to_radians();
    let r = 1.000001018 * (1.0 - e * e) / (1.0 + e * nu.cos());

    BodyPosition {
        coord: ecliptic_to_equatorial(true_lon, 0.0, t),
        distance: r,
    }
}

/// Truncated lunar theory: main longitude, latitude, and distance terms,
/// distance in kilometers.
fn moon_position(mjd: MJD) -> BodyPosition {
    let t = (mjd - T2000) / 36525.0;

    let lp = norm_deg(218.3164477 + 481267.88123421 * t);
    let d = norm_deg(297.8501921 + 445267.1114034 * t).to_radians();
    let m = norm_deg(357.5291092 + 35999.0502909 * t).to_radians();
    let mp = norm_deg(134.9633964 + 477198.8675055 * t).to_radians();
    let f = norm_deg(93.2720950 + 483202.0175233 * t).to_radians();

    let lon = lp
        + 6.288774 * mp.sin()
        + 1.274027 * (2.0 * d - mp).sin()
        + 0.658314 * (2.0 * d).sin()
        + 0.213618 * (2.0 * mp).sin()
        - 0.185116 * m.sin()
        - 0.114332 * (2.0 * f).sin()
        + 0.058793 * (2.0 * d - 2.0 * mp).sin()
        + 0.057066 * (2.0 * d - m - mp).sin()
        + 0.053322 * (2.0 * d + mp).sin()
        + 0.045758 * (2.0 * d - m).sin()
        - 0.040923 * (m - mp).sin()
        - 0.034720 * d.sin()
        - 0.030383 * (m + mp).sin();

    let lat = 5.128122 * f.sin()
        + 0.280602 * (mp + f).sin()
        + 0.277693 * (mp - f).sin()
        + 0.173237 * (2.0 * d - f).sin()
        + 0.055413 * (2.0 * d - mp + f).sin()
        + 0.046271 * (2.0 * d - mp - f).sin()
        + 0.032573 * (2.0 * d + f).sin();

    let dist = 385000.56 - 20905.355 * mp.cos()
        - 3699.111 * (2.0 * d - mp).cos()
        - 2955.968 * (2.0 * d).cos()
        - 569.925 * (2.0 * mp).cos()
        + 246.158 * (2.0 * d - 2.0 * mp).cos()
        - 204.586 * (2.0 * d - m).cos()
        - 170.733 * (2.0 * d + mp).cos()
        - 152.138 * (2.0 * d - m - mp).cos()
        - 129.620 * (m - mp).cos()
        + 108.743 * d.cos()
        + 104.755 * (m + mp).cos();

    BodyPosition {
        coord: ecliptic_to_equatorial(lon, lat, t),
        distance: dist,
    }
}

impl PositionProvider for MeanEphemeris {
    fn position(&self, body: Body, instant: MJD) -> Result<BodyPosition, UmbraError> {
        Ok(match body {
            Body::Sun => sun_position(instant),
            Body::Moon => moon_position(instant),
        })
    }
}
