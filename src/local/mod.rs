//! # Local circumstances engine
//!
//! Evaluates fitted shadow elements at one geographic site and derives the
//! observable numbers: contact instants with body altitudes, greatest local
//! magnitude, durations, and the projected path width. The classifier in
//! [`visibility`] then maps these numbers to a single textual category.
//!
//! ## Contract
//! -----------------
//! * Input elements are **read-only**: nothing here mutates them, so many
//!   sites can be evaluated concurrently against the same instance.
//! * Contacts that never occur at the site are `None`; the maximum-phase point
//!   is always produced, possibly with a non-positive magnitude meaning the
//!   eclipse misses the site entirely.
//! * All instants are MJD TT, altitudes in degrees.
//!
//! ## Method
//! -----------------
//! The observer is projected on the fundamental plane with the classical
//! (ξ, η, ζ) formulas from their geocentric parallax coordinates; contact
//! instants are located by a coarse scan over the elements window followed by
//! bisection on the relevant radius crossing, and the maximum phase by a
//! golden-section refinement of the scan minimum.

pub mod visibility;

use crate::constants::{Degree, Kilometer, EARTH_RADIUS_KM, MJD};
use crate::elements::{LunarElements, SolarElements};
use crate::geo::GeographicLocation;

/// Scan resolution over the elements window when bracketing extrema and
/// contacts (per window, so ~30 s steps for a 12-hour window).
const SCAN_STEPS: usize = 1440;

/// Bisection convergence for contact times, in days (~0.9 ms).
const CONTACT_CONVERGENCE_DAYS: f64 = 1e-8;

/// Maximum bisection iterations for contact times.
const CONTACT_MAX_ITER: u32 = 60;

/// One contact instant paired with the body's altitude at that instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Instant of the contact, MJD TT.
    pub instant: MJD,
    /// Altitude of the eclipsed body above the local horizon, degrees.
    pub altitude: Degree,
}

/// Per-site circumstances of a solar eclipse.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarLocalCircumstances {
    /// First exterior contact (partial phase begins).
    pub first_contact: Option<ContactPoint>,
    /// First interior contact (total or annular phase begins).
    pub second_contact: Option<ContactPoint>,
    /// Last interior contact (total or annular phase ends).
    pub third_contact: Option<ContactPoint>,
    /// Last exterior contact (partial phase ends).
    pub fourth_contact: Option<ContactPoint>,
    /// Maximum phase at this site.
    pub maximum: ContactPoint,
    /// Greatest local magnitude; non-positive when the penumbra never reaches
    /// the site.
    pub magnitude: f64,
    /// Projected shadow-path width at the site, kilometers; zero when the
    /// central phase does not occur here.
    pub path_width_km: Kilometer,
    /// Duration of the total/annular phase in days (zero when absent).
    pub total_duration_days: f64,
    /// Duration of the partial phase in days (zero when absent).
    pub partial_duration_days: f64,
}

/// Per-site circumstances of a lunar eclipse.
///
/// Contact instants are geocentric (the same everywhere on Earth); only the
/// altitudes attached to them are site-specific.
#[derive(Debug, Clone, PartialEq)]
pub struct LunarLocalCircumstances {
    pub penumbral_begin: Option<ContactPoint>,
    pub partial_begin: Option<ContactPoint>,
    pub total_begin: Option<ContactPoint>,
    pub maximum: ContactPoint,
    pub total_end: Option<ContactPoint>,
    pub partial_end: Option<ContactPoint>,
    pub penumbral_end: Option<ContactPoint>,
    /// Umbral magnitude at maximum.
    pub magnitude: f64,
    /// Penumbral magnitude at maximum.
    pub penumbral_magnitude: f64,
}

/// Altitude of a body at declination `d` and Greenwich hour angle `mu`
/// as seen from latitude `lat_rad`, longitude `lon_rad` (east positive).
#[inline]
fn altitude_deg(lat_rad: f64, d: f64, mu: f64, lon_rad: f64) -> Degree {
    let h = mu + lon_rad;
    let sin_alt = lat_rad.sin() * d.sin() + lat_rad.cos() * d.cos() * h.cos();
    sin_alt.clamp(-1.0, 1.0).asin().to_degrees()
}

/// Bisect a sign change of `f` between `t_a` and `t_b`.
///
/// The caller guarantees `f(t_a)` and `f(t_b)` have opposite signs; the
/// midpoint of the final bracket is returned.
fn bisect(f: impl Fn(MJD) -> f64, t_a: MJD, t_b: MJD) -> MJD {
    let mut ta = t_a;
    let mut tb = t_b;
    let mut fa = f(ta);

    for _ in 0..CONTACT_MAX_ITER {
        let tm = 0.5 * (ta + tb);
        let fm = f(tm);

        if fa * fm <= 0.0 {
            tb = tm;
        } else {
            ta = tm;
            fa = fm;
        }

        if (tb - ta).abs() < CONTACT_CONVERGENCE_DAYS {
            break;
        }
    }

    0.5 * (ta + tb)
}

/// Locate the minimum of `f` over `[t_min, t_max]`: coarse scan, then
/// golden-section refinement inside the bracketing pair of scan steps.
fn find_minimum(f: impl Fn(MJD) -> f64, t_min: MJD, t_max: MJD) -> MJD {
    let step = (t_max - t_min) / SCAN_STEPS as f64;

    let mut best_i = 0usize;
    let mut best_v = f64::INFINITY;
    for i in 0..=SCAN_STEPS {
        let v = f(t_min + i as f64 * step);
        if v < best_v {
            best_v = v;
            best_i = i;
        }
    }

    let mut a = t_min + best_i.saturating_sub(1) as f64 * step;
    let mut b = (t_min + (best_i + 1) as f64 * step).min(t_max);

    // Golden-section: unimodal inside one scan bracket
    const INV_PHI: f64 = 0.618_033_988_749_894_8;
    for _ in 0..40 {
        let c = b - (b - a) * INV_PHI;
        let d = a + (b - a) * INV_PHI;
        if f(c) < f(d) {
            b = d;
        } else {
            a = c;
        }
        if (b - a).abs() < CONTACT_CONVERGENCE_DAYS {
            break;
        }
    }
    0.5 * (a + b)
}

/// Observer-dependent solar quantities at one instant.
struct SolarSiteSample {
    /// Distance of the site from the shadow axis on the fundamental plane.
    m: f64,
    /// Penumbral radius at the site's plane.
    l1p: f64,
    /// Umbral radius at the site's plane.
    l2p: f64,
    /// Site coordinate along the shadow axis.
    zeta: f64,
    /// Sun altitude, degrees.
    altitude: Degree,
}

struct SolarSite<'a> {
    elements: &'a SolarElements,
    rho_cos: f64,
    rho_sin: f64,
    lat_rad: f64,
    lon_rad: f64,
}

impl SolarSite<'_> {
    fn at(&self, t: MJD) -> SolarSiteSample {
        let inst = self.elements.eval_raw(t);
        let h = inst.mu + self.lon_rad;

        let xi = self.rho_cos * h.sin();
        let eta = self.rho_sin * inst.d.cos() - self.rho_cos * inst.d.sin() * h.cos();
        let zeta = self.rho_sin * inst.d.sin() + self.rho_cos * inst.d.cos() * h.cos();

        let u = inst.x - xi;
        let v = inst.y - eta;
        let m = u.hypot(v);

        SolarSiteSample {
            m,
            l1p: inst.l1 - zeta * inst.tan_f1,
            l2p: inst.l2 - zeta * inst.tan_f2,
            zeta,
            altitude: altitude_deg(self.lat_rad, inst.d, inst.mu, self.lon_rad),
        }
    }
}

/// Compute the solar local circumstances for one site.
///
/// Pure read-only evaluation of `elements`; safe to call concurrently for
/// many sites against the same instance.
pub fn solar_local_circumstances(
    elements: &SolarElements,
    site: &GeographicLocation,
) -> SolarLocalCircumstances {
    let (rho_cos, rho_sin) = site.parallax();
    let geom = SolarSite {
        elements,
        rho_cos,
        rho_sin,
        lat_rad: site.latitude().to_radians(),
        lon_rad: site.longitude().to_radians(),
    };

    let (win_a, win_b) = elements.window();

    // Greatest phase: minimize the axis distance relative to the local
    // penumbral radius (the radii vary slowly, the distance does not)
    let depth = |t: MJD| {
        let s = geom.at(t);
        s.m - s.l1p
    };
    let t_max = find_minimum(depth, win_a, win_b);
    let at_max = geom.at(t_max);

    let magnitude = (at_max.l1p - at_max.m) / (at_max.l1p + at_max.l2p);
    let maximum = ContactPoint {
        instant: t_max,
        altitude: at_max.altitude,
    };

    if magnitude <= 0.0 {
        return SolarLocalCircumstances {
            first_contact: None,
            second_contact: None,
            third_contact: None,
            fourth_contact: None,
            maximum,
            magnitude,
            path_width_km: 0.0,
            total_duration_days: 0.0,
            partial_duration_days: 0.0,
        };
    }

    let contact = |f: &dyn Fn(MJD) -> f64, a: MJD, b: MJD| -> Option<MJD> {
        (f(a) > 0.0 && f(b) < 0.0 || f(a) < 0.0 && f(b) > 0.0).then(|| bisect(f, a, b))
    };

    let with_altitude = |t: MJD| ContactPoint {
        instant: t,
        altitude: geom.at(t).altitude,
    };

    // Exterior contacts: the site crosses the penumbral boundary
    let first_contact = contact(&depth, win_a, t_max).map(with_altitude);
    let fourth_contact = contact(&depth, t_max, win_b).map(with_altitude);

    // Interior contacts: the site crosses the umbral/antumbral boundary
    let central_depth = |t: MJD| {
        let s = geom.at(t);
        s.m - s.l2p.abs()
    };
    let (second_contact, third_contact) = if central_depth(t_max) < 0.0 {
        (
            contact(&central_depth, win_a, t_max).map(with_altitude),
            contact(&central_depth, t_max, win_b).map(with_altitude),
        )
    } else {
        (None, None)
    };

    let total_duration_days = match (&second_contact, &third_contact) {
        (Some(c2), Some(c3)) => c3.instant - c2.instant,
        _ => 0.0,
    };
    let partial_duration_days = match (&first_contact, &fourth_contact) {
        (Some(c1), Some(c4)) => c4.instant - c1.instant,
        _ => 0.0,
    };

    // Shadow footprint width, corrected for the obliquity of the surface
    let path_width_km = if total_duration_days > 0.0 && at_max.zeta > 0.0 {
        2.0 * at_max.l2p.abs() * EARTH_RADIUS_KM / at_max.zeta.max(0.1)
    } else {
        0.0
    };

    SolarLocalCircumstances {
        first_contact,
        second_contact,
        third_contact,
        fourth_contact,
        maximum,
        magnitude,
        path_width_km,
        total_duration_days,
        partial_duration_days,
    }
}

/// Compute the lunar local circumstances for one site.
///
/// Contact instants come from the shadow geometry alone; the site only
/// contributes the Moon altitudes attached to each contact.
pub fn lunar_local_circumstances(
    elements: &LunarElements,
    site: &GeographicLocation,
) -> LunarLocalCircumstances {
    let lat_rad = site.latitude().to_radians();
    let lon_rad = site.longitude().to_radians();
    let (win_a, win_b) = elements.window();

    let offset = |t: MJD| elements.eval_raw(t).offset();
    let t_max = find_minimum(offset, win_a, win_b);
    let at_max = elements.eval_raw(t_max);
    let m0 = at_max.offset();

    let magnitude = (at_max.umbra - m0 + at_max.moon_radius) / (2.0 * at_max.moon_radius);
    let penumbral_magnitude =
        (at_max.penumbra - m0 + at_max.moon_radius) / (2.0 * at_max.moon_radius);

    let with_altitude = |t: MJD| {
        let inst = elements.eval_raw(t);
        ContactPoint {
            instant: t,
            altitude: altitude_deg(lat_rad, inst.d, inst.mu, lon_rad),
        }
    };

    let maximum = with_altitude(t_max);

    // Limb-crossing functions against each shadow boundary
    let penumbral = |t: MJD| {
        let i = elements.eval_raw(t);
        i.offset() - (i.penumbra + i.moon_radius)
    };
    let partial = |t: MJD| {
        let i = elements.eval_raw(t);
        i.offset() - (i.umbra + i.moon_radius)
    };
    let total = |t: MJD| {
        let i = elements.eval_raw(t);
        i.offset() - (i.umbra - i.moon_radius)
    };

    let contact = |f: &dyn Fn(MJD) -> f64, a: MJD, b: MJD| -> Option<ContactPoint> {
        (f(a) > 0.0 && f(b) < 0.0 || f(a) < 0.0 && f(b) > 0.0)
            .then(|| with_altitude(bisect(f, a, b)))
    };

    LunarLocalCircumstances {
        penumbral_begin: contact(&penumbral, win_a, t_max),
        partial_begin: contact(&partial, win_a, t_max),
        total_begin: contact(&total, win_a, t_max),
        maximum,
        total_end: contact(&total, t_max, win_b),
        partial_end: contact(&partial, t_max, win_b),
        penumbral_end: contact(&penumbral, t_max, win_b),
        magnitude,
        penumbral_magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{LunarElements, SolarElements};
    use crate::geo::GeographicLocation;

    fn poly(c0: f64, c1: f64) -> [f64; 4] {
        [c0, c1, 0.0, 0.0]
    }

    /// Synthetic total eclipse sweeping its axis across the sub-solar point:
    /// x moves linearly and fast enough to outrun Earth's rotation, the axis
    /// declination is 0, and the reference hour angle puts the shadow over
    /// longitude 0 at t0.
    fn sweeping_elements() -> SolarElements {
        SolarElements::new(
            60000.0,
            6.0,
            poly(0.0, 0.6),  // x drifts east 0.6 ER/hour
            poly(0.0, 0.0),  // y stays on the axis
            poly(0.0, 0.0),  // d = 0
            poly(0.0, 0.2618), // mu advances ~15°/hour, 0 at t0
            poly(0.54, 0.0),
            poly(-0.0095, 0.0),
            0.0046,
            0.0045,
        )
    }

    fn site(lat: f64, lon: f64) -> GeographicLocation {
        GeographicLocation::new("test", lat, lon, 0.0).unwrap()
    }

    #[test]
    fn sub_shadow_site_sees_a_total_eclipse() {
        let el = sweeping_elements();
        let c = solar_local_circumstances(&el, &site(0.0, 0.0));

        assert!(c.magnitude > 1.0, "magnitude = {}", c.magnitude);
        assert!(c.second_contact.is_some() && c.third_contact.is_some());
        assert!(c.total_duration_days > 0.0);
        assert!(c.partial_duration_days > c.total_duration_days);
        assert!(c.path_width_km > 0.0);
        // The shadow axis passes overhead: the Sun is near the zenith
        assert!(c.maximum.altitude > 85.0, "alt = {}", c.maximum.altitude);
        // Contacts are ordered
        let c1 = c.first_contact.unwrap().instant;
        let c2 = c.second_contact.unwrap().instant;
        let c3 = c.third_contact.unwrap().instant;
        let c4 = c.fourth_contact.unwrap().instant;
        assert!(c1 < c2 && c2 < c.maximum.instant && c.maximum.instant < c3 && c3 < c4);
    }

    #[test]
    fn off_track_site_sees_a_partial_eclipse() {
        let el = sweeping_elements();
        // 0.3 Earth radii north of the track: inside the penumbra, outside the umbra
        let c = solar_local_circumstances(&el, &site(17.5, 0.0));

        assert!(c.magnitude > 0.0 && c.magnitude < 1.0, "mag = {}", c.magnitude);
        assert!(c.second_contact.is_none() && c.third_contact.is_none());
        assert!(c.total_duration_days == 0.0);
        assert!(c.path_width_km == 0.0);
        assert!(c.first_contact.is_some() && c.fourth_contact.is_some());
    }

    #[test]
    fn antipodal_site_has_the_sun_below_the_horizon() {
        let el = sweeping_elements();
        let c = solar_local_circumstances(&el, &site(0.0, 180.0));

        // The projection is sign-ambiguous for the far intersection of the
        // axis with the sphere; what distinguishes the antipode is that every
        // instant of the event happens below the horizon.
        assert!(c.maximum.altitude < 0.0, "alt = {}", c.maximum.altitude);
        for contact in [&c.first_contact, &c.fourth_contact].into_iter().flatten() {
            assert!(contact.altitude < 0.0);
        }
    }

    /// Total lunar eclipse: the Moon's offset dips well inside the umbra.
    fn lunar_test_elements() -> LunarElements {
        LunarElements::new(
            60000.0,
            6.0,
            poly(0.0, 0.55), // x sweeps 0.55°/hour through the shadow
            poly(0.1, 0.0),
            poly(1.25, 0.0), // penumbral radius
            poly(0.70, 0.0), // umbral radius
            poly(0.26, 0.0), // moon radius
            poly(0.2, 0.0),  // moon declination (rad)
            poly(0.0, 0.2618),
        )
    }

    #[test]
    fn lunar_contacts_are_ordered_and_complete() {
        let el = lunar_test_elements();
        let c = lunar_local_circumstances(&el, &site(45.0, 0.0));

        assert!(c.magnitude > 1.0, "umbral magnitude = {}", c.magnitude);
        assert!(c.penumbral_magnitude > c.magnitude);

        let p1 = c.penumbral_begin.unwrap().instant;
        let u1 = c.partial_begin.unwrap().instant;
        let u2 = c.total_begin.unwrap().instant;
        let u3 = c.total_end.unwrap().instant;
        let u4 = c.partial_end.unwrap().instant;
        let p4 = c.penumbral_end.unwrap().instant;
        assert!(p1 < u1 && u1 < u2 && u2 < c.maximum.instant);
        assert!(c.maximum.instant < u3 && u3 < u4 && u4 < p4);
    }

    #[test]
    fn lunar_altitudes_flip_with_hemisphere() {
        let el = lunar_test_elements();
        let near = lunar_local_circumstances(&el, &site(11.5, 0.0));
        let far = lunar_local_circumstances(&el, &site(11.5, 180.0));
        assert!(near.maximum.altitude > 0.0);
        assert!(far.maximum.altitude < 0.0);
    }
}
