//! # Position-provider boundary and Sun/Moon sampling
//!
//! The eclipse engine does not compute planetary positions itself: it consumes
//! a caller-supplied [`PositionProvider`] returning apparent equatorial
//! coordinates and distances for the Sun and the Moon. Everything downstream
//! (element fitting, local circumstances, path matching) is built on top of
//! the five-sample snapshots produced here.
//!
//! ## Components
//! -----------------
//! * [`PositionProvider`] – the consumed capability, one `position` operation.
//! * [`SunMoonPosition`] – one immutable sample pairing Sun and Moon states.
//! * [`sample_sun_moon`] – five equally spaced samples centered on a reference
//!   instant, distances normalized to Earth radii.
//!
//! ## Units
//! -----------------
//! * Right ascension / declination: **radians**.
//! * Sun distance as returned by the provider: **astronomical units**.
//! * Moon distance as returned by the provider: **kilometers**.
//! * Distances stored in [`SunMoonPosition`]: **Earth equatorial radii**.
//!
//! Provider failures propagate unchanged; this module performs no validation
//! of the returned distances.

use crate::constants::{AU_ER, EARTH_RADIUS_KM, MJD, Radian};
use crate::umbra_errors::UmbraError;

/// Bodies this crate ever asks a provider about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Moon,
}

/// Apparent equatorial coordinates of a body center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialCoord {
    /// Right ascension in radians, [0, 2π).
    pub ra: Radian,
    /// Declination in radians.
    pub dec: Radian,
}

/// One provider answer: where a body is and how far away it is.
///
/// Distance units are body-dependent: **AU** for the Sun, **km** for the Moon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPosition {
    pub coord: EquatorialCoord,
    pub distance: f64,
}

/// External ephemeris capability consumed by the eclipse engine.
///
/// Implementations must be pure with respect to their inputs: the engine may
/// call `position` many times for the same instant and expects identical
/// answers.
pub trait PositionProvider {
    /// Apparent geocentric equatorial position of `body` at `instant` (MJD TT).
    fn position(&self, body: Body, instant: MJD) -> Result<BodyPosition, UmbraError>;
}

/// One sampled instant with both bodies, distances in Earth radii.
///
/// Immutable once produced; an ordered array of exactly five such samples is
/// the sole input of the element fitter.
#[derive(Debug, Clone, Copy)]
pub struct SunMoonPosition {
    pub instant: MJD,
    pub sun: EquatorialCoord,
    pub moon: EquatorialCoord,
    /// Sun distance in Earth equatorial radii.
    pub sun_distance: f64,
    /// Moon distance in Earth equatorial radii.
    pub moon_distance: f64,
}

/// Sample Sun and Moon at five instants centered on `t0`.
///
/// The offsets are `{-2, -1, 0, 1, 2} × span/4`, i.e. the samples cover the
/// full `span_hours` interval symmetrically. `t0` should already be rounded
/// to a whole hour (see [`round_to_hour`](crate::time::round_to_hour)) so that
/// the downstream fit is reproducible.
///
/// Arguments
/// -----------------
/// * `provider`: The position provider to sample.
/// * `t0`: Central instant (MJD TT).
/// * `span_hours`: Full sampling span in hours.
///
/// Return
/// ----------
/// * Five [`SunMoonPosition`] samples in time order, or the first provider
///   failure encountered.
pub fn sample_sun_moon(
    provider: &impl PositionProvider,
    t0: MJD,
    span_hours: f64,
) -> Result<[SunMoonPosition; 5], UmbraError> {
    let step_days = span_hours / 4.0 / 24.0;

    let sample_at = |i: i32| -> Result<SunMoonPosition, UmbraError> {
        let t = t0 + f64::from(i) * step_days;
        let sun = provider.position(Body::Sun, t)?;
        let moon = provider.position(Body::Moon, t)?;
        Ok(SunMoonPosition {
            instant: t,
            sun: sun.coord,
            moon: moon.coord,
            sun_distance: sun.distance * AU_ER,
            moon_distance: moon.distance / EARTH_RADIUS_KM,
        })
    };

    Ok([
        sample_at(-2)?,
        sample_at(-1)?,
        sample_at(0)?,
        sample_at(1)?,
        sample_at(2)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-geometry provider: Sun at 1 AU, Moon at 384400 km, both on the equator.
    struct StaticProvider;

    impl PositionProvider for StaticProvider {
        fn position(&self, body: Body, _instant: MJD) -> Result<BodyPosition, UmbraError> {
            let distance = match body {
                Body::Sun => 1.0,
                Body::Moon => 384_400.0,
            };
            Ok(BodyPosition {
                coord: EquatorialCoord { ra: 0.0, dec: 0.0 },
                distance,
            })
        }
    }

    struct FailingProvider;

    impl PositionProvider for FailingProvider {
        fn position(&self, _body: Body, _instant: MJD) -> Result<BodyPosition, UmbraError> {
            Err(UmbraError::provider("ephemeris file not loaded"))
        }
    }

    #[test]
    fn five_samples_cover_the_span() {
        let samples = sample_sun_moon(&StaticProvider, 60000.0, 12.0).unwrap();
        let offsets_h: Vec<f64> = samples
            .iter()
            .map(|s| (s.instant - 60000.0) * 24.0)
            .collect();
        for (got, want) in offsets_h.iter().zip([-6.0, -3.0, 0.0, 3.0, 6.0]) {
            assert!((got - want).abs() < 1e-9, "offset {got} != {want}");
        }
    }

    #[test]
    fn distances_are_normalized_to_earth_radii() {
        let samples = sample_sun_moon(&StaticProvider, 60000.0, 12.0).unwrap();
        let s = &samples[2];
        assert!((s.sun_distance - AU_ER).abs() < 1e-9);
        assert!((s.moon_distance - 384_400.0 / EARTH_RADIUS_KM).abs() < 1e-9);
    }

    #[test]
    fn provider_failure_propagates() {
        let err = sample_sun_moon(&FailingProvider, 60000.0, 12.0).unwrap_err();
        assert!(matches!(err, UmbraError::PositionProvider(_)));
    }
}
