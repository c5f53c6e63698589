//! # Central-line generation
//!
//! Produces the ordered surface track of the shadow axis for a central solar
//! eclipse by inverting the fundamental-plane projection: wherever
//! `x² + y² < 1` the axis pierces the unit sphere at `ζ = sqrt(1 − x² − y²)`,
//! and the fundamental-frame point `(x, y, ζ)` maps back to a geographic
//! latitude and longitude through the axis declination and hour angle.
//!
//! The entry and exit instants of the axis are bracketed by a scan over the
//! elements window and refined by bisection; the track is then sampled at
//! equal time steps between them. Non-central eclipses yield an empty track.

use crate::constants::{Degree, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS, MJD};
use crate::elements::SolarElements;
use crate::geo::GeographicLocation;

/// Scan resolution used to bracket the axis entry/exit instants.
const SCAN_STEPS: usize = 2880;

/// Bisection convergence for the entry/exit instants, days.
const EDGE_CONVERGENCE_DAYS: f64 = 1e-7;

/// Signed surface-clearance of the axis: positive while the axis pierces the
/// sphere.
fn clearance(elements: &SolarElements, t: MJD) -> f64 {
    let inst = elements.eval_raw(t);
    1.0 - inst.x * inst.x - inst.y * inst.y
}

/// Geographic point under the shadow axis at `t`, if the axis meets the
/// surface there.
pub fn surface_point(elements: &SolarElements, t: MJD) -> Option<(Degree, Degree)> {
    let inst = elements.eval_raw(t);
    let zeta2 = 1.0 - inst.x * inst.x - inst.y * inst.y;
    if zeta2 <= 0.0 {
        return None;
    }
    let zeta = zeta2.sqrt();

    // Invert the (ξ, η, ζ) projection for a point on the unit sphere
    let sin_phi1 = (inst.y * inst.d.cos() + zeta * inst.d.sin()).clamp(-1.0, 1.0);
    let phi1 = sin_phi1.asin();
    let hour_angle = inst.x.atan2(zeta * inst.d.cos() - inst.y * inst.d.sin());

    // Geocentric to geodetic latitude
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;
    let phi = (phi1.tan() / (axis_ratio * axis_ratio)).atan();

    // East longitude from the Greenwich hour angle of the axis
    let lon = wrap_lon(hour_angle - inst.mu);
    Some((phi.to_degrees(), lon.to_degrees()))
}

/// Wrap a longitude to (-π, π].
fn wrap_lon(x: f64) -> f64 {
    let w = x.rem_euclid(crate::constants::DPI);
    if w > std::f64::consts::PI {
        w - crate::constants::DPI
    } else {
        w
    }
}

/// Bisect the instant where the axis crosses the surface between `inside`
/// and `outside`.
fn refine_edge(elements: &SolarElements, mut inside: MJD, mut outside: MJD) -> MJD {
    for _ in 0..60 {
        let mid = 0.5 * (inside + outside);
        if clearance(elements, mid) > 0.0 {
            inside = mid;
        } else {
            outside = mid;
        }
        if (outside - inside).abs() < EDGE_CONVERGENCE_DAYS {
            break;
        }
    }
    inside
}

/// Sample the central line of a central eclipse.
///
/// Arguments
/// -----------------
/// * `elements`: Fitted Besselian elements of the event.
/// * `points`: Number of track points to produce (at least 2).
///
/// Return
/// ----------
/// * Ordered surface points from the western to the eastern end of the
///   track; empty when the axis never touches the surface.
pub fn central_line(elements: &SolarElements, points: usize) -> Vec<GeographicLocation> {
    let (win_a, win_b) = elements.window();
    let step = (win_b - win_a) / SCAN_STEPS as f64;

    // Bracket the interval where the axis is on the surface
    let mut enter: Option<MJD> = None;
    let mut exit: Option<MJD> = None;
    let mut prev_t = win_a;
    let mut prev_inside = clearance(elements, win_a) > 0.0;
    if prev_inside {
        enter = Some(win_a);
    }
    for i in 1..=SCAN_STEPS {
        let t = win_a + i as f64 * step;
        let inside = clearance(elements, t) > 0.0;
        match (prev_inside, inside) {
            (false, true) => enter = Some(refine_edge(elements, t, prev_t)),
            (true, false) => {
                exit = Some(refine_edge(elements, prev_t, t));
                break;
            }
            _ => {}
        }
        prev_t = t;
        prev_inside = inside;
    }
    if prev_inside && exit.is_none() {
        exit = Some(win_b);
    }

    let (Some(t_enter), Some(t_exit)) = (enter, exit) else {
        return Vec::new();
    };

    let n = points.max(2);
    let mut track = Vec::with_capacity(n);
    for i in 0..n {
        let t = t_enter + (t_exit - t_enter) * i as f64 / (n - 1) as f64;
        let Some((lat, lon)) = surface_point(elements, t) else {
            continue;
        };
        let Ok(location) = GeographicLocation::new("", lat, lon, 0.0) else {
            continue;
        };
        track.push(location);
    }
    track
}
