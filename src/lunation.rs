//! # Mean lunation series and eclipse candidacy
//!
//! Series-based prediction of new/full-moon instants and of the eclipse
//! circumstances attached to a given lunation number. The series gives the
//! search three things per lunation:
//!
//! 1. the instant of greatest eclipse (good to a couple of minutes),
//! 2. the least geocentric shadow-axis distance `gamma` and the radius term
//!    `u`, from which eclipse type and magnitude follow,
//! 3. a candidacy verdict: no eclipse possible, eclipse **certain**, or
//!    **uncertain** (node distance in the boundary band, to be resolved by the
//!    geometric existence test against fitted elements).
//!
//! Lunation numbering: `k = 0` is the first new moon of January 2000; full
//! moons sit at `k + 0.5`. Negative numbers run backwards in time.
//!
//! ## References
//! * Meeus, *Astronomical Algorithms*, chapters 49 and 54.

use crate::constants::{LunationNumber, MJD};
use crate::search::{LunarEclipseKind, SolarEclipseKind};
use crate::time::jd_to_mjd;

/// Mean new moon of lunation 0, as a Julian Date (TT).
const LUNATION_ZERO_JD: f64 = 2451550.09766;

/// Mean synodic month length in days.
const SYNODIC_MONTH: f64 = 29.530588861;

/// Node-distance band (degrees away from 0°/180° of the argument of latitude).
/// Below `CERTAIN_DEG` an eclipse always occurs; between the two bounds the
/// geometry is marginal and the candidate is flagged uncertain.
const CERTAIN_DEG: f64 = 13.9;
const POSSIBLE_DEG: f64 = 21.0;

/// Did the series alone settle the candidate, or does it need the geometric
/// existence test?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidacy {
    Certain,
    Uncertain,
}

/// Series prediction for a solar eclipse at one lunation.
#[derive(Debug, Clone, Copy)]
pub struct SolarCandidate {
    /// Instant of greatest eclipse (MJD TT).
    pub maximum: MJD,
    /// Least distance of the shadow axis from Earth's center, in Earth radii
    /// (positive north of the fundamental-plane origin).
    pub gamma: f64,
    /// Umbral-cone radius term in Earth radii (negative for a total eclipse).
    pub u: f64,
    pub kind: SolarEclipseKind,
    /// The shadow axis misses the surface but part of the umbral cone touches it.
    pub non_central: bool,
    /// Greatest magnitude; for partial eclipses from the series formula,
    /// placeholder 1.0 for central ones (refined from fitted elements).
    pub magnitude: f64,
    pub certainty: Candidacy,
}

/// Series prediction for a lunar eclipse at one lunation.
#[derive(Debug, Clone, Copy)]
pub struct LunarCandidate {
    /// Instant of greatest eclipse (MJD TT).
    pub maximum: MJD,
    /// Least distance of the Moon's center from the shadow axis, in units of
    /// the Moon's equatorial parallax.
    pub gamma: f64,
    pub u: f64,
    pub kind: LunarEclipseKind,
    /// Umbral magnitude (penumbral magnitude for penumbral eclipses).
    pub magnitude: f64,
    pub penumbral_magnitude: f64,
    pub certainty: Candidacy,
}

/// Fundamental angles at lunation phase `k`, all in radians, plus the
/// eccentricity factor `e` and the corrected argument of latitude `f1`.
struct PhaseAngles {
    jde_mean: f64,
    m: f64,
    mp: f64,
    f: f64,
    f1: f64,
    omega: f64,
    a1: f64,
    e: f64,
}

fn norm_deg(x: f64) -> f64 {
    x.rem_euclid(360.0)
}

fn phase_angles(k: f64) -> PhaseAngles {
    let t = k / 1236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let jde_mean = LUNATION_ZERO_JD + SYNODIC_MONTH * k + 0.00015437 * t2
        - 0.000000150 * t3
        + 0.00000000073 * t4;

    let m = norm_deg(2.5534 + 29.10535670 * k - 0.0000014 * t2 - 0.00000011 * t3);
    let mp = norm_deg(
        201.5643 + 385.81693528 * k + 0.0107582 * t2 + 0.00001238 * t3 - 0.000000058 * t4,
    );
    let f = norm_deg(
        160.7108 + 390.67050284 * k - 0.0016118 * t2 - 0.00000227 * t3 + 0.000000011 * t4,
    );
    let omega = norm_deg(124.7746 - 1.56375588 * k + 0.0020672 * t2 + 0.00000215 * t3);
    let a1 = norm_deg(299.77 + 0.107408 * k - 0.009173 * t2);
    let e = 1.0 - 0.002516 * t - 0.0000074 * t2;

    let f1 = f - 0.02665 * omega.to_radians().sin();

    PhaseAngles {
        jde_mean,
        m: m.to_radians(),
        mp: mp.to_radians(),
        f: f.to_radians(),
        f1: f1.to_radians(),
        omega: omega.to_radians(),
        a1: a1.to_radians(),
        e,
    }
}

/// Distance of the argument of latitude from the nearest node, in degrees.
fn node_distance_deg(f: f64) -> f64 {
    let fd = norm_deg(f.to_degrees());
    let d0 = fd.min(360.0 - fd);
    let d180 = (fd - 180.0).abs();
    d0.min(d180)
}

/// Shared eclipse geometry: time correction, gamma, and u for phase `k`.
/// `first_term` is the leading `sin M'` coefficient, the only place where the
/// solar and lunar series differ.
fn eclipse_geometry(p: &PhaseAngles, first_term: f64) -> (f64, f64, f64) {
    let (m, mp, f1, e) = (p.m, p.mp, p.f1, p.e);

    let dt = first_term * mp.sin()
        + 0.1721 * e * m.sin()
        + 0.0161 * (2.0 * mp).sin()
        - 0.0097 * (2.0 * f1).sin()
        + 0.0073 * e * (mp - m).sin()
        - 0.0050 * e * (mp + m).sin()
        - 0.0023 * (mp - 2.0 * f1).sin()
        + 0.0021 * e * (2.0 * m).sin()
        + 0.0012 * (mp + 2.0 * f1).sin()
        + 0.0006 * e * (2.0 * mp + m).sin()
        - 0.0004 * (3.0 * mp).sin()
        - 0.0003 * e * (m + 2.0 * f1).sin()
        + 0.0003 * p.a1.sin()
        - 0.0002 * e * (m - 2.0 * f1).sin()
        - 0.0002 * e * (2.0 * mp - m).sin()
        - 0.0002 * p.omega.sin();

    let pp = 0.2070 * e * m.sin() + 0.0024 * e * (2.0 * m).sin() - 0.0392 * mp.sin()
        + 0.0116 * (2.0 * mp).sin()
        - 0.0073 * e * (mp + m).sin()
        + 0.0067 * e * (mp - m).sin()
        + 0.0118 * (2.0 * f1).sin();

    let qq = 5.2207 - 0.0048 * e * m.cos() + 0.0020 * e * (2.0 * m).cos() - 0.3299 * mp.cos()
        - 0.0060 * e * (mp + m).cos()
        + 0.0041 * e * (mp - m).cos();

    let ww = f1.cos().abs();
    let gamma = (pp * f1.cos() + qq * f1.sin()) * (1.0 - 0.0048 * ww);

    let u = 0.0059 + 0.0046 * e * m.cos() - 0.0182 * mp.cos() + 0.0004 * (2.0 * mp).cos()
        - 0.0005 * (m + mp).cos();

    (dt, gamma, u)
}

/// Series prediction of a solar eclipse at the given lunation, if the Moon is
/// close enough to a node for one to be geometrically possible.
pub fn solar_candidate(lunation: LunationNumber) -> Option<SolarCandidate> {
    let k = f64::from(lunation);
    let p = phase_angles(k);

    let node = node_distance_deg(p.f);
    if node > POSSIBLE_DEG {
        return None;
    }
    let certainty = if node < CERTAIN_DEG {
        Candidacy::Certain
    } else {
        Candidacy::Uncertain
    };

    let (dt, gamma, u) = eclipse_geometry(&p, -0.4075);
    let maximum = jd_to_mjd(p.jde_mean + dt);
    let ag = gamma.abs();

    if ag > 1.5433 + u {
        return None;
    }

    let (kind, non_central, magnitude) = if ag <= 0.9972 {
        // Central eclipse: the axis crosses the surface
        let kind = if u < 0.0 {
            SolarEclipseKind::Total
        } else if u > 0.0047 {
            SolarEclipseKind::Annular
        } else {
            // Narrow band where the umbral tip grazes the surface
            let omega = 0.00464 * (1.0 - gamma * gamma).max(0.0).sqrt();
            if u < omega {
                SolarEclipseKind::Hybrid
            } else {
                SolarEclipseKind::Annular
            }
        };
        (kind, false, 1.0)
    } else if ag < 0.9972 + u.abs() {
        // Part of the umbral cone touches the surface but the axis misses it
        let kind = if u < 0.0 {
            SolarEclipseKind::Total
        } else {
            SolarEclipseKind::Annular
        };
        (kind, true, 1.0)
    } else {
        let magnitude = (1.5433 + u - ag) / (0.5461 + 2.0 * u);
        (SolarEclipseKind::Partial, false, magnitude.max(0.0))
    };

    Some(SolarCandidate {
        maximum,
        gamma,
        u,
        kind,
        non_central,
        magnitude,
        certainty,
    })
}

/// Series prediction of a lunar eclipse at the given lunation (full moon at
/// `lunation + 0.5`), if one is geometrically possible.
pub fn lunar_candidate(lunation: LunationNumber) -> Option<LunarCandidate> {
    let k = f64::from(lunation) + 0.5;
    let p = phase_angles(k);

    let node = node_distance_deg(p.f);
    if node > POSSIBLE_DEG {
        return None;
    }
    let certainty = if node < CERTAIN_DEG {
        Candidacy::Certain
    } else {
        Candidacy::Uncertain
    };

    let (dt, gamma, u) = eclipse_geometry(&p, -0.4065);
    let maximum = jd_to_mjd(p.jde_mean + dt);
    let ag = gamma.abs();

    let penumbral_magnitude = (1.5573 + u - ag) / 0.5450;
    let umbral_magnitude = (1.0128 - u - ag) / 0.5450;

    if penumbral_magnitude < 0.0 {
        return None;
    }

    let (kind, magnitude) = if umbral_magnitude >= 1.0 {
        (LunarEclipseKind::Total, umbral_magnitude)
    } else if umbral_magnitude > 0.0 {
        (LunarEclipseKind::Partial, umbral_magnitude)
    } else {
        (LunarEclipseKind::Penumbral, penumbral_magnitude)
    };

    Some(LunarCandidate {
        maximum,
        gamma,
        u,
        kind,
        magnitude,
        penumbral_magnitude,
        certainty,
    })
}

/// Lunation number whose new moon most recently preceded `mjd`.
pub fn lunation_for_mjd(mjd: MJD) -> LunationNumber {
    let k = (mjd - jd_to_mjd(LUNATION_ZERO_JD)) / SYNODIC_MONTH;
    k.floor() as LunationNumber
}

/// Mean instant (MJD TT) of the new moon of `lunation`, or of the following
/// full moon when `full_moon` is set.
pub fn mean_phase_mjd(lunation: LunationNumber, full_moon: bool) -> MJD {
    let k = f64::from(lunation) + if full_moon { 0.5 } else { 0.0 };
    jd_to_mjd(phase_angles(k).jde_mean)
}
