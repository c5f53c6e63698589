//! # Geographic sites and great-circle geometry
//!
//! This module gathers the **named-place representation** and the spherical
//! geometry helpers used by the central-line matcher:
//!
//! - [`GeographicLocation`] – a named site with geodetic coordinates, elevation,
//!   UTC offset and optional IANA timezone identifier. Equality and hashing go
//!   through `NotNan<f64>` coordinates so sites can be deduplicated in hash sets.
//! - [`great_circle_km`] – haversine distance between two sites.
//! - [`intermediate_point`] – fractional interpolation along the great circle
//!   joining two sites.
//! - [`lat_alt_to_parallax`] – geodetic latitude/elevation to normalized
//!   geocentric parallax coordinates (ρ·cosφ', ρ·sinφ'), accounting for Earth
//!   oblateness.
//!
//! ## Units
//!
//! - Latitudes/longitudes: **degrees** (north/east positive).
//! - Elevation: **meters** above the ellipsoid.
//! - Parallax coordinates: **Earth equatorial radii** (dimensionless).
//!
//! ## Errors
//!
//! Constructors return [`UmbraError::NanCoordinate`](crate::umbra_errors::UmbraError)
//! when handed NaN coordinates; downstream geometry then never has to reason
//! about NaN.

use std::hash::{Hash, Hasher};

use ordered_float::NotNan;

use crate::constants::{
    Degree, Kilometer, Meter, EARTH_MAJOR_AXIS, EARTH_MEAN_RADIUS_KM, EARTH_MINOR_AXIS,
};
use crate::umbra_errors::UmbraError;

/// A named place on Earth.
///
/// Plain value type: once constructed it is never mutated. Two locations are
/// equal when they share the same name and coordinates; UTC offset and
/// timezone are descriptive metadata and do not participate in equality.
#[derive(Debug, Clone)]
pub struct GeographicLocation {
    name: String,
    latitude: NotNan<f64>,
    longitude: NotNan<f64>,
    elevation: NotNan<f64>,
    utc_offset: f64,
    timezone: Option<String>,
}

impl GeographicLocation {
    /// Build a location from geodetic inputs.
    ///
    /// Arguments
    /// -----------------
    /// * `name`: Human-readable place name (may be empty for synthetic points).
    /// * `latitude`: Geodetic latitude in **degrees** (north positive).
    /// * `longitude`: Geodetic longitude in **degrees** (east positive).
    /// * `elevation`: Elevation in **meters**.
    ///
    /// Return
    /// ----------
    /// * The new location, or [`UmbraError::NanCoordinate`] if any coordinate is NaN.
    pub fn new(
        name: impl Into<String>,
        latitude: Degree,
        longitude: Degree,
        elevation: Meter,
    ) -> Result<Self, UmbraError> {
        Ok(GeographicLocation {
            name: name.into(),
            latitude: NotNan::new(latitude)?,
            longitude: NotNan::new(longitude)?,
            elevation: NotNan::new(elevation)?,
            utc_offset: 0.0,
            timezone: None,
        })
    }

    /// Attach a fixed UTC offset in hours.
    pub fn with_utc_offset(mut self, hours: f64) -> Self {
        self.utc_offset = hours;
        self
    }

    /// Attach an IANA timezone identifier (e.g. `"America/Mexico_City"`).
    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = Some(tz.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> Degree {
        self.latitude.into_inner()
    }

    pub fn longitude(&self) -> Degree {
        self.longitude.into_inner()
    }

    pub fn elevation_m(&self) -> Meter {
        self.elevation.into_inner()
    }

    pub fn utc_offset_hours(&self) -> f64 {
        self.utc_offset
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    /// Normalized geocentric parallax coordinates (ρ·cosφ', ρ·sinφ') of this site.
    pub(crate) fn parallax(&self) -> (f64, f64) {
        lat_alt_to_parallax(self.latitude().to_radians(), self.elevation_m())
    }
}

impl PartialEq for GeographicLocation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.latitude == other.latitude
            && self.longitude == other.longitude
    }
}

impl Eq for GeographicLocation {}

impl Hash for GeographicLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.latitude.hash(state);
        self.longitude.hash(state);
    }
}

/// Convert geodetic latitude (radians) and elevation (meters) into
/// normalized parallax coordinates (ρ·cosφ', ρ·sinφ').
///
/// The parametric-latitude correction accounts for Earth's oblateness via the
/// GRS1980 axis ratio; elevation enters as a fraction of the equatorial radius.
pub fn lat_alt_to_parallax(lat: f64, height: Meter) -> (f64, f64) {
    // Ratio of the Earth's minor to major axis (flattening factor)
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;

    // Auxiliary angle u (parametric latitude)
    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    // Normalized distance along the polar axis
    let rho_sin_phi = axis_ratio * u.sin() + (height / EARTH_MAJOR_AXIS) * lat.sin();

    // Normalized distance along the equatorial plane
    let rho_cos_phi = u.cos() + (height / EARTH_MAJOR_AXIS) * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}

/// Haversine great-circle distance between two sites, in kilometers.
pub fn great_circle_km(a: &GeographicLocation, b: &GeographicLocation) -> Kilometer {
    great_circle_deg_km(a.latitude(), a.longitude(), b.latitude(), b.longitude())
}

/// Haversine distance between two raw coordinate pairs (degrees), in kilometers.
pub fn great_circle_deg_km(
    lat1: Degree,
    lon1: Degree,
    lat2: Degree,
    lon2: Degree,
) -> Kilometer {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS_KM * h.sqrt().asin()
}

/// Point at fraction `f` (0 at `a`, 1 at `b`) along the great circle from `a` to `b`.
///
/// Returns `(latitude, longitude)` in degrees. Degenerate segments (identical
/// endpoints) return the coordinates of `a`.
pub fn intermediate_point(
    a: &GeographicLocation,
    b: &GeographicLocation,
    f: f64,
) -> (Degree, Degree) {
    let (phi1, lam1) = (a.latitude().to_radians(), a.longitude().to_radians());
    let (phi2, lam2) = (b.latitude().to_radians(), b.longitude().to_radians());

    // Angular separation between the endpoints
    let delta = (great_circle_km(a, b) / EARTH_MEAN_RADIUS_KM).max(0.0);
    if delta < 1e-12 {
        return (a.latitude(), a.longitude());
    }

    let fa = ((1.0 - f) * delta).sin() / delta.sin();
    let fb = (f * delta).sin() / delta.sin();

    let x = fa * phi1.cos() * lam1.cos() + fb * phi2.cos() * lam2.cos();
    let y = fa * phi1.cos() * lam1.sin() + fb * phi2.cos() * lam2.sin();
    let z = fa * phi1.sin() + fb * phi2.sin();

    let lat = z.atan2((x * x + y * y).sqrt());
    let lon = y.atan2(x);
    (lat.to_degrees(), lon.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str, lat: f64, lon: f64) -> GeographicLocation {
        GeographicLocation::new(name, lat, lon, 0.0).unwrap()
    }

    #[test]
    fn nan_coordinates_are_rejected() {
        assert!(GeographicLocation::new("x", f64::NAN, 0.0, 0.0).is_err());
        assert!(GeographicLocation::new("x", 0.0, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn equality_ignores_metadata() {
        let a = site("Paris", 48.8566, 2.3522).with_utc_offset(1.0);
        let b = site("Paris", 48.8566, 2.3522).with_timezone("Europe/Paris");
        assert_eq!(a, b);
    }

    #[test]
    fn paris_london_distance() {
        let paris = site("Paris", 48.8566, 2.3522);
        let london = site("London", 51.5074, -0.1278);
        let d = great_circle_km(&paris, &london);
        assert!((d - 344.0).abs() < 5.0, "distance = {d}");
    }

    #[test]
    fn midpoint_on_equator() {
        let a = site("a", 0.0, 0.0);
        let b = site("b", 0.0, 10.0);
        let (lat, lon) = intermediate_point(&a, &b, 0.5);
        assert!(lat.abs() < 1e-9);
        assert!((lon - 5.0).abs() < 1e-9);
    }

    #[test]
    fn parallax_at_equator_and_pole() {
        let (c, s) = lat_alt_to_parallax(0.0, 0.0);
        assert!((c - 1.0).abs() < 1e-12);
        assert!(s.abs() < 1e-12);

        let (c, s) = lat_alt_to_parallax(std::f64::consts::FRAC_PI_2, 0.0);
        assert!(c.abs() < 1e-9);
        // Polar radius as a fraction of the equatorial one
        assert!((s - EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS).abs() < 1e-9);
    }
}
