//! # Fundamental-plane shadow elements
//!
//! A compact time-polynomial description of an eclipse shadow, fitted once per
//! event and evaluated read-only everywhere else. Two flavors exist:
//!
//! * [`SolarElements`] – classical Besselian elements of a solar eclipse:
//!   shadow-axis intersection `(x, y)` with the fundamental plane (Earth
//!   radii), axis declination `d` and Greenwich hour angle `mu` (radians),
//!   penumbral/umbral fundamental-plane radii `l1`/`l2` (Earth radii), and the
//!   cone half-angle tangents.
//! * [`LunarElements`] – the Moon against Earth's shadow: angular offset
//!   `(x, y)` of the Moon's center from the shadow axis (degrees), the Danjon
//!   penumbral/umbral shadow radii and the Moon's angular radius (degrees),
//!   plus the Moon's declination and Greenwich hour angle for altitude work.
//!
//! Each parameter is stored as a cubic in hours since the reference instant
//! `t0` and reproduced by Horner evaluation. Elements are immutable after the
//! fit and carry their own validity window; evaluation outside the window is
//! an error through the public entry point, while the engine-internal raw
//! evaluator is used only at instants the engine has already bounded.
//!
//! See [`fitter`] for how the coefficients are produced.

pub mod fitter;

use crate::constants::{Degree, Radian, MJD};
use crate::umbra_errors::UmbraError;

/// Cubic polynomial coefficients, lowest order first, argument in hours.
pub(crate) type Poly = [f64; 4];

#[inline]
pub(crate) fn horner(p: &Poly, tau: f64) -> f64 {
    ((p[3] * tau + p[2]) * tau + p[1]) * tau + p[0]
}

/// Instantaneous solar shadow geometry on the fundamental plane.
#[derive(Debug, Clone, Copy)]
pub struct SolarInstant {
    /// Shadow-axis intersection with the fundamental plane, Earth radii.
    pub x: f64,
    pub y: f64,
    /// Declination of the shadow axis, radians.
    pub d: Radian,
    /// Greenwich hour angle of the shadow axis, radians.
    pub mu: Radian,
    /// Penumbral radius on the fundamental plane, Earth radii.
    pub l1: f64,
    /// Umbral radius on the fundamental plane, Earth radii (negative when the
    /// umbral vertex lies beyond the plane, i.e. a total eclipse).
    pub l2: f64,
    /// Tangent of the penumbral cone half-angle.
    pub tan_f1: f64,
    /// Tangent of the umbral cone half-angle.
    pub tan_f2: f64,
}

/// Polynomial Besselian elements of one solar eclipse.
///
/// Owned by the eclipse they were fitted for; never mutated afterwards, so
/// sharing one instance across concurrent evaluations is safe.
#[derive(Debug, Clone)]
pub struct SolarElements {
    t0: MJD,
    window_hours: f64,
    x: Poly,
    y: Poly,
    d: Poly,
    mu: Poly,
    l1: Poly,
    l2: Poly,
    tan_f1: f64,
    tan_f2: f64,
}

impl SolarElements {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        t0: MJD,
        window_hours: f64,
        x: Poly,
        y: Poly,
        d: Poly,
        mu: Poly,
        l1: Poly,
        l2: Poly,
        tan_f1: f64,
        tan_f2: f64,
    ) -> Self {
        SolarElements {
            t0,
            window_hours,
            x,
            y,
            d,
            mu,
            l1,
            l2,
            tan_f1,
            tan_f2,
        }
    }

    /// Reference instant the polynomials are anchored on (a whole hour, MJD TT).
    pub fn t0(&self) -> MJD {
        self.t0
    }

    /// Validity window `(min, max)` in MJD TT.
    pub fn window(&self) -> (MJD, MJD) {
        let half = self.window_hours / 24.0;
        (self.t0 - half, self.t0 + half)
    }

    /// Evaluate the model at `t`, failing outside the validity window.
    pub fn evaluate(&self, t: MJD) -> Result<SolarInstant, UmbraError> {
        let (min, max) = self.window();
        if t < min || t > max {
            return Err(UmbraError::OutsideElementsWindow {
                instant: t,
                min,
                max,
            });
        }
        Ok(self.eval_raw(t))
    }

    /// Distance of the shadow axis from the fundamental-plane origin at `t`,
    /// in Earth radii. The geometric existence test compares this against the
    /// penumbral radius.
    pub fn shadow_axis_offset(&self, t: MJD) -> f64 {
        let inst = self.eval_raw(t);
        inst.x.hypot(inst.y)
    }

    pub(crate) fn eval_raw(&self, t: MJD) -> SolarInstant {
        let tau = (t - self.t0) * 24.0;
        SolarInstant {
            x: horner(&self.x, tau),
            y: horner(&self.y, tau),
            d: horner(&self.d, tau),
            mu: horner(&self.mu, tau),
            l1: horner(&self.l1, tau),
            l2: horner(&self.l2, tau),
            tan_f1: self.tan_f1,
            tan_f2: self.tan_f2,
        }
    }
}

/// Instantaneous lunar shadow geometry, all angles in degrees except where noted.
#[derive(Debug, Clone, Copy)]
pub struct LunarInstant {
    /// Moon-center offset from the shadow axis along increasing right
    /// ascension, degrees.
    pub x: Degree,
    /// Moon-center offset from the shadow axis along increasing declination,
    /// degrees.
    pub y: Degree,
    /// Danjon-enlarged penumbral shadow radius at the Moon's distance, degrees.
    pub penumbra: Degree,
    /// Danjon-enlarged umbral shadow radius, degrees.
    pub umbra: Degree,
    /// Moon angular radius, degrees.
    pub moon_radius: Degree,
    /// Moon declination, radians.
    pub d: Radian,
    /// Greenwich hour angle of the Moon, radians.
    pub mu: Radian,
}

impl LunarInstant {
    /// Angular distance of the Moon's center from the shadow center, degrees.
    pub fn offset(&self) -> Degree {
        self.x.hypot(self.y)
    }
}

/// Polynomial elements of one lunar eclipse.
#[derive(Debug, Clone)]
pub struct LunarElements {
    t0: MJD,
    window_hours: f64,
    x: Poly,
    y: Poly,
    penumbra: Poly,
    umbra: Poly,
    moon_radius: Poly,
    d: Poly,
    mu: Poly,
}

impl LunarElements {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        t0: MJD,
        window_hours: f64,
        x: Poly,
        y: Poly,
        penumbra: Poly,
        umbra: Poly,
        moon_radius: Poly,
        d: Poly,
        mu: Poly,
    ) -> Self {
        LunarElements {
            t0,
            window_hours,
            x,
            y,
            penumbra,
            umbra,
            moon_radius,
            d,
            mu,
        }
    }

    pub fn t0(&self) -> MJD {
        self.t0
    }

    /// Validity window `(min, max)` in MJD TT.
    pub fn window(&self) -> (MJD, MJD) {
        let half = self.window_hours / 24.0;
        (self.t0 - half, self.t0 + half)
    }

    /// Evaluate the model at `t`, failing outside the validity window.
    pub fn evaluate(&self, t: MJD) -> Result<LunarInstant, UmbraError> {
        let (min, max) = self.window();
        if t < min || t > max {
            return Err(UmbraError::OutsideElementsWindow {
                instant: t,
                min,
                max,
            });
        }
        Ok(self.eval_raw(t))
    }

    pub(crate) fn eval_raw(&self, t: MJD) -> LunarInstant {
        let tau = (t - self.t0) * 24.0;
        LunarInstant {
            x: horner(&self.x, tau),
            y: horner(&self.y, tau),
            penumbra: horner(&self.penumbra, tau),
            umbra: horner(&self.umbra, tau),
            moon_radius: horner(&self.moon_radius, tau),
            d: horner(&self.d, tau),
            mu: horner(&self.mu, tau),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(v: f64) -> Poly {
        [v, 0.0, 0.0, 0.0]
    }

    #[test]
    fn horner_matches_direct_evaluation() {
        let p: Poly = [1.0, -2.0, 0.5, 0.25];
        for tau in [-3.0, -0.7, 0.0, 1.3, 4.0] {
            let direct = 1.0 - 2.0 * tau + 0.5 * tau * tau + 0.25 * tau * tau * tau;
            assert!((horner(&p, tau) - direct).abs() < 1e-12);
        }
    }

    #[test]
    fn evaluation_outside_window_is_rejected() {
        let el = SolarElements::new(
            60000.0,
            6.0,
            flat(0.0),
            flat(0.0),
            flat(0.0),
            flat(0.0),
            flat(0.54),
            flat(-0.01),
            0.0046,
            0.0045,
        );
        assert!(el.evaluate(60000.0).is_ok());
        assert!(el.evaluate(60000.0 + 5.9 / 24.0).is_ok());
        let err = el.evaluate(60000.0 + 6.1 / 24.0).unwrap_err();
        assert!(matches!(err, UmbraError::OutsideElementsWindow { .. }));
    }

    #[test]
    fn shadow_axis_offset_is_the_euclidean_norm() {
        let el = SolarElements::new(
            60000.0,
            6.0,
            flat(0.3),
            flat(-0.4),
            flat(0.0),
            flat(0.0),
            flat(0.54),
            flat(-0.01),
            0.0046,
            0.0045,
        );
        assert!((el.shadow_axis_offset(60000.0) - 0.5).abs() < 1e-12);
    }
}
