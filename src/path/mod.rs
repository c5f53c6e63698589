//! # Central-line walk and city matching
//!
//! Walks the ordered central-line points of a solar eclipse, adaptively
//! subdividing each segment according to the local shadow width, queries a
//! spatial index for named places around every subdivision point, and
//! computes full local circumstances for each distinct place found.
//!
//! ## Adaptive subdivision
//! -----------------
//! The path width varies continuously along the track, narrowing toward the
//! limbs. Each segment is split into `round(length / r)` pieces where `r` is
//! the local half-width clamped to a 10 km floor; queries use the clamped
//! radius while the **unclamped** half-width remains the true inclusion
//! bound. The number of proximity queries therefore stays roughly
//! proportional to the path width everywhere along the track.
//!
//! ## Cancellation and progress
//! -----------------
//! The walk takes a `should_cancel` closure polled once per segment, per
//! subdivision point, and per batched circumstances computation, plus a
//! `progress` sink invoked with a percentage after each segment. A cancelled
//! run returns [`PathSearchOutcome::Cancelled`] so callers can distinguish it
//! from a completed walk that simply found no cities.

pub mod catalog;
pub mod central_line;

use std::collections::HashSet;

use ahash::RandomState;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::constants::{Degree, Kilometer};
use crate::geo::{great_circle_deg_km, great_circle_km, intermediate_point, GeographicLocation};
use crate::local::visibility::{classify_solar, SolarVisibility};
use crate::local::{solar_local_circumstances, SolarLocalCircumstances};
use crate::search::SolarEclipse;

/// Floor on the proximity-query radius, kilometers. Keeps the number of
/// subdivision points bounded where the path narrows toward the limbs.
pub const MIN_QUERY_RADIUS_KM: Kilometer = 10.0;

/// Spatial lookup capability consumed by the walk.
///
/// Implementations return all known named places within `radius_km` of the
/// query point, in no particular order.
pub trait LocationIndex {
    fn search(
        &self,
        latitude: Degree,
        longitude: Degree,
        radius_km: Kilometer,
    ) -> Vec<GeographicLocation>;
}

/// One matched city with its computed circumstances.
#[derive(Debug, Clone)]
pub struct CityCircumstances {
    pub location: GeographicLocation,
    pub circumstances: SolarLocalCircumstances,
    pub visibility: SolarVisibility,
}

/// Result of a central-line walk.
///
/// `Cancelled` is distinct from `Completed` with an empty list: the latter
/// genuinely means no city lies inside the shadow footprint.
#[derive(Debug, Clone)]
pub enum PathSearchOutcome {
    Completed(Vec<CityCircumstances>),
    Cancelled,
}

impl PathSearchOutcome {
    /// The matched cities of a completed walk, `None` when cancelled.
    pub fn completed(self) -> Option<Vec<CityCircumstances>> {
        match self {
            PathSearchOutcome::Completed(cities) => Some(cities),
            PathSearchOutcome::Cancelled => None,
        }
    }
}

/// Query centers for one segment: `round(length / radius)` equally spaced
/// fractional points when the segment is longer than the radius, the segment
/// start alone otherwise.
fn subdivision_points(
    g0: &GeographicLocation,
    g1: &GeographicLocation,
    radius_km: Kilometer,
) -> SmallVec<[(Degree, Degree); 16]> {
    let mut points: SmallVec<[(Degree, Degree); 16]> = SmallVec::new();

    let length = great_circle_km(g0, g1);
    let parts = (length / radius_km).round() as i64;

    if parts > 1 {
        for j in 0..parts {
            let f = j as f64 / parts as f64;
            points.push(intermediate_point(g0, g1, f));
        }
    } else {
        points.push((g0.latitude(), g0.longitude()));
    }
    points
}

/// Walk the central line of a confirmed eclipse and enumerate the named
/// places lying inside the shadow footprint, each with its own local
/// circumstances and visibility classification.
///
/// Arguments
/// -----------------
/// * `eclipse`: The confirmed event; its elements drive both the local
///   half-width used for subdivision and the final per-city circumstances.
/// * `central_line`: Ordered points of the path of totality/annularity.
/// * `index`: Spatial lookup for named places.
/// * `should_cancel`: Polled at loop granularity; `true` aborts the walk.
/// * `progress`: Receives the completed percentage after each segment.
///
/// Return
/// ----------
/// * [`PathSearchOutcome::Completed`] with deduplicated, name-sorted matches,
///   or [`PathSearchOutcome::Cancelled`].
pub fn find_cities_on_central_line(
    eclipse: &SolarEclipse,
    central_line: &[GeographicLocation],
    index: &impl LocationIndex,
    mut should_cancel: impl FnMut() -> bool,
    mut progress: impl FnMut(f64),
) -> PathSearchOutcome {
    let mut found: HashSet<GeographicLocation, RandomState> = HashSet::default();

    if should_cancel() {
        return PathSearchOutcome::Cancelled;
    }

    let segments = central_line.len().saturating_sub(1);
    for (i, (g0, g1)) in central_line.iter().tuple_windows().enumerate() {
        if should_cancel() {
            return PathSearchOutcome::Cancelled;
        }

        // Local half-width drives both the subdivision density and the true
        // inclusion bound
        let half_width = solar_local_circumstances(&eclipse.elements, g0).path_width_km / 2.0;
        let radius = half_width.max(MIN_QUERY_RADIUS_KM);

        for (lat, lon) in subdivision_points(g0, g1, radius) {
            if should_cancel() {
                return PathSearchOutcome::Cancelled;
            }
            for city in index.search(lat, lon, radius) {
                let true_distance =
                    great_circle_deg_km(lat, lon, city.latitude(), city.longitude());
                if true_distance <= half_width {
                    found.insert(city);
                }
            }
        }

        progress((i + 1) as f64 / segments as f64 * 100.0);
    }

    let mut cities = Vec::with_capacity(found.len());
    for location in found {
        if should_cancel() {
            return PathSearchOutcome::Cancelled;
        }
        let circumstances = solar_local_circumstances(&eclipse.elements, &location);
        let visibility = classify_solar(&circumstances, eclipse.kind);
        cities.push(CityCircumstances {
            location,
            circumstances,
            visibility,
        });
    }
    cities.sort_by(|a, b| a.location.name().cmp(b.location.name()));

    PathSearchOutcome::Completed(cities)
}

/// Same walk with a live `indicatif` progress bar wired to the percentage
/// sink. Intended for interactive front ends; the closure-based entry point
/// stays the canonical API.
#[cfg(feature = "progress")]
pub fn find_cities_with_progress_bar(
    eclipse: &SolarEclipse,
    central_line: &[GeographicLocation],
    index: &impl LocationIndex,
    should_cancel: impl FnMut() -> bool,
) -> PathSearchOutcome {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {msg}")
            .expect("indicatif template"),
    );

    let outcome = find_cities_on_central_line(eclipse, central_line, index, should_cancel, |p| {
        pb.set_position(p.round() as u64)
    });

    pb.finish_and_clear();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeographicLocation;

    fn point(lat: f64, lon: f64) -> GeographicLocation {
        GeographicLocation::new("", lat, lon, 0.0).unwrap()
    }

    #[test]
    fn subdivision_count_follows_length_over_radius() {
        // Two points 2° apart on the equator: ~222.4 km
        let g0 = point(0.0, 0.0);
        let g1 = point(0.0, 2.0);
        let length = great_circle_km(&g0, &g1);

        for radius in [15.0, 40.0, 80.0] {
            let expected = (length / radius).round() as usize;
            let pts = subdivision_points(&g0, &g1, radius);
            assert_eq!(pts.len(), expected, "radius = {radius}");
        }
    }

    #[test]
    fn short_segment_collapses_to_a_single_query() {
        let g0 = point(0.0, 0.0);
        let g1 = point(0.0, 0.1); // ~11 km, about one radius long
        let pts = subdivision_points(&g0, &g1, MIN_QUERY_RADIUS_KM);
        assert_eq!(pts.len(), 1);
        assert_eq!(pts[0], (0.0, 0.0));
    }

    #[test]
    fn subdivision_points_lie_on_the_segment() {
        let g0 = point(10.0, 20.0);
        let g1 = point(10.0, 24.0);
        for (lat, lon) in subdivision_points(&g0, &g1, 30.0) {
            assert!((lat - 10.0).abs() < 0.1);
            assert!((20.0..24.0).contains(&lon));
        }
    }
}
