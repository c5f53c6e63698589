use hifitime::{Epoch, TimeScale};

use crate::constants::{DPI, JDTOMJD, MJD, T2000};

/// Transformation from julian date (JD) to modified julian date (MJD)
#[inline]
pub fn jd_to_mjd(jd: f64) -> MJD {
    jd - JDTOMJD
}

/// Transformation from modified julian date (MJD) to julian date (JD)
#[inline]
pub fn mjd_to_jd(mjd: MJD) -> f64 {
    mjd + JDTOMJD
}

/// Round an instant to the nearest whole hour.
///
/// The shadow-model fit is anchored on a whole-hour reference instant so that
/// repeated fits of the same event produce identical coefficient sets.
#[inline]
pub fn round_to_hour(mjd: MJD) -> MJD {
    (mjd * 24.0).round() / 24.0
}

/// Render an MJD (TT scale) as a human-readable UTC timestamp.
///
/// Used by callers that hand contact instants to tabular writers; the crate
/// itself never persists anything.
pub fn format_mjd_tt(mjd: MJD) -> String {
    Epoch::from_mjd_in_time_scale(mjd, TimeScale::TT).to_string()
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date.
///
/// This function implements the IAU 1982/2000 polynomial formula
/// for the mean sidereal time at 0h, plus the fractional-day
/// correction term due to Earth's rotation rate.
///
/// # Arguments
/// * `tjm` - Modified Julian Date
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
///
/// # References
/// * IAU 1982, IERS Conventions 1996/2000.
/// * Explanatory Supplement to the Astronomical Almanac (1992).
pub fn gmst(tjm: f64) -> f64 {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    // Extract the integer MJD (0h) and compute centuries since J2000.0
    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    // GMST at 0h using the polynomial expression, converted to radians
    let mut gmst0 = ((C3 * t + C2) * t + C1) * t + C0;
    gmst0 *= DPI / 86400.0;

    // Contribution from the fraction of the day, scaled by the sidereal rate
    let h = tjm.fract() * DPI;
    let mut gmst = gmst0 + h * RAP;

    // Normalize to [0, 2π)
    let mut i: i64 = (gmst / DPI).floor() as i64;
    if gmst < 0.0 {
        i -= 1;
    }
    gmst -= i as f64 * DPI;

    gmst
}
