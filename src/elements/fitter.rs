//! # Least-squares fit of the shadow polynomials
//!
//! Turns five [`SunMoonPosition`] samples into [`SolarElements`] or
//! [`LunarElements`]. For each fundamental-plane parameter the five sampled
//! values are fitted with a cubic in hours since the reference instant,
//! solved in the least-squares sense through an SVD of the Vandermonde design
//! matrix. With five samples and four coefficients the residual is the
//! single-degree-of-freedom smoothing left over, and evaluating the fitted
//! polynomials back at the sample instants reproduces the direct geometry to
//! well below 1e-4 normalized shadow units for any realistic ephemeris.
//!
//! ## Geometry
//! -----------------
//! Solar samples are projected on the classical fundamental plane: the plane
//! through Earth's center perpendicular to the Moon-to-Sun axis. Penumbral
//! and umbral cone radii follow from the nominal Sun/Moon radii; the hour
//! angle of the axis comes from [`gmst`](crate::time::gmst).
//!
//! Lunar samples are reduced to the Moon's angular offset from the anti-solar
//! point together with the Danjon-enlarged shadow radii at the Moon's
//! distance.

use nalgebra::{SMatrix, SVector, Vector3};

use crate::constants::{
    DANJON_ENLARGEMENT, DPI, LUNAR_SAMPLE_SPAN_HOURS, LUNAR_WINDOW_HOURS, MJD, MOON_RADIUS_ER,
    SOLAR_SAMPLE_SPAN_HOURS, SOLAR_WINDOW_HOURS, SUN_RADIUS_ER,
};
use crate::elements::{LunarElements, Poly, SolarElements};
use crate::ephemeris::{sample_sun_moon, EquatorialCoord, PositionProvider, SunMoonPosition};
use crate::time::{gmst, round_to_hour};
use crate::umbra_errors::UmbraError;

/// Wrap an angle to (-π, π].
#[inline]
fn wrap_pi(x: f64) -> f64 {
    let w = x.rem_euclid(DPI);
    if w > std::f64::consts::PI {
        w - DPI
    } else {
        w
    }
}

/// Cartesian unit vector of an equatorial direction.
#[inline]
fn unit_vector(c: &EquatorialCoord) -> Vector3<f64> {
    Vector3::new(
        c.dec.cos() * c.ra.cos(),
        c.dec.cos() * c.ra.sin(),
        c.dec.sin(),
    )
}

/// Least-squares cubic through five `(tau, value)` points, `tau` in hours.
fn fit_poly(taus: &[f64; 5], values: &[f64; 5]) -> Result<Poly, UmbraError> {
    let mut design = SMatrix::<f64, 5, 4>::zeros();
    for (i, &tau) in taus.iter().enumerate() {
        let mut p = 1.0;
        for j in 0..4 {
            design[(i, j)] = p;
            p *= tau;
        }
    }

    let rhs = SVector::<f64, 5>::from_row_slice(values);
    let svd = design.svd(true, true);
    let coeffs = svd.solve(&rhs, 1e-12).map_err(|_| UmbraError::SingularFit)?;
    Ok([coeffs[0], coeffs[1], coeffs[2], coeffs[3]])
}

/// Sample offsets in hours for a given full span: `{-2,-1,0,1,2} × span/4`.
fn sample_taus(span_hours: f64) -> [f64; 5] {
    let q = span_hours / 4.0;
    [-2.0 * q, -q, 0.0, q, 2.0 * q]
}

/// Direct (unfitted) solar fundamental-plane geometry of one sample.
pub(crate) struct SolarSampleGeometry {
    pub x: f64,
    pub y: f64,
    pub d: f64,
    pub mu: f64,
    pub l1: f64,
    pub l2: f64,
    pub tan_f1: f64,
    pub tan_f2: f64,
}

pub(crate) fn solar_sample_geometry(sample: &SunMoonPosition) -> SolarSampleGeometry {
    // Shadow axis: from the Moon's center towards the Sun's center
    let sun_v = unit_vector(&sample.sun) * sample.sun_distance;
    let moon_v = unit_vector(&sample.moon) * sample.moon_distance;
    let g = sun_v - moon_v;
    let g_len = g.norm();
    let axis = g / g_len;

    let d = axis.z.asin();
    let a = axis.y.atan2(axis.x);

    // Moon center in the fundamental frame (Earth radii)
    let dra = wrap_pi(sample.moon.ra - a);
    let (sin_dec, cos_dec) = sample.moon.dec.sin_cos();
    let rm = sample.moon_distance;
    let x = rm * cos_dec * dra.sin();
    let y = rm * (sin_dec * d.cos() - cos_dec * d.sin() * dra.cos());
    let z = rm * (sin_dec * d.sin() + cos_dec * d.cos() * dra.cos());

    // Shadow cone half-angles and fundamental-plane radii
    let sin_f1 = (SUN_RADIUS_ER + MOON_RADIUS_ER) / g_len;
    let sin_f2 = (SUN_RADIUS_ER - MOON_RADIUS_ER) / g_len;
    let tan_f1 = sin_f1.asin().tan();
    let tan_f2 = sin_f2.asin().tan();
    let c1 = z + MOON_RADIUS_ER / sin_f1;
    let c2 = z - MOON_RADIUS_ER / sin_f2;
    let l1 = c1 * tan_f1;
    let l2 = c2 * tan_f2;

    // Greenwich hour angle of the shadow axis
    let mu = (gmst(sample.instant) - a).rem_euclid(DPI);

    SolarSampleGeometry {
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

/// Direct lunar shadow geometry of one sample, angles in degrees.
pub(crate) struct LunarSampleGeometry {
    pub x: f64,
    pub y: f64,
    pub penumbra: f64,
    pub umbra: f64,
    pub moon_radius: f64,
    pub d: f64,
    pub mu: f64,
}

pub(crate) fn lunar_sample_geometry(sample: &SunMoonPosition) -> LunarSampleGeometry {
    // Shadow center is the anti-solar point
    let shadow_ra = (sample.sun.ra + std::f64::consts::PI).rem_euclid(DPI);
    let shadow_dec = -sample.sun.dec;

    let x = (wrap_pi(sample.moon.ra - shadow_ra) * sample.moon.dec.cos()).to_degrees();
    let y = (sample.moon.dec - shadow_dec).to_degrees();

    // Danjon-enlarged shadow radii projected at the Moon's distance
    let pi_moon = (1.0 / sample.moon_distance).asin();
    let pi_sun = (1.0 / sample.sun_distance).asin();
    let s_sun = (SUN_RADIUS_ER / sample.sun_distance).asin();
    let penumbra = (DANJON_ENLARGEMENT * (pi_moon + pi_sun + s_sun)).to_degrees();
    let umbra = (DANJON_ENLARGEMENT * (pi_moon + pi_sun - s_sun)).to_degrees();
    let moon_radius = (MOON_RADIUS_ER / sample.moon_distance).asin().to_degrees();

    let mu = (gmst(sample.instant) - sample.moon.ra).rem_euclid(DPI);

    LunarSampleGeometry {
        x,
        y,
        penumbra,
        umbra,
        moon_radius,
        d: sample.moon.dec,
        mu,
    }
}

/// Make a sampled hour-angle series monotonically increasing by unwrapping
/// the 2π discontinuity.
fn unwrap_increasing(series: &mut [f64; 5]) {
    for i in 1..5 {
        while series[i] < series[i - 1] {
            series[i] += DPI;
        }
    }
}

/// Fit solar Besselian elements around a provisional maximum instant.
///
/// The reference instant is the maximum rounded to the nearest whole hour;
/// samples cover a 12-hour span and the resulting elements are valid over the
/// 6-hour half-window on each side of the reference.
///
/// Arguments
/// -----------------
/// * `provider`: Position provider queried for the five samples.
/// * `t_max`: Provisional instant of greatest eclipse (MJD TT).
///
/// Return
/// ----------
/// * The fitted [`SolarElements`], or a provider/fit failure.
pub fn fit_solar_elements(
    provider: &impl PositionProvider,
    t_max: MJD,
) -> Result<SolarElements, UmbraError> {
    let t0 = round_to_hour(t_max);
    let samples = sample_sun_moon(provider, t0, SOLAR_SAMPLE_SPAN_HOURS)?;

    let mut xs = [0.0; 5];
    let mut ys = [0.0; 5];
    let mut ds = [0.0; 5];
    let mut mus = [0.0; 5];
    let mut l1s = [0.0; 5];
    let mut l2s = [0.0; 5];
    let mut tan_f1 = 0.0;
    let mut tan_f2 = 0.0;

    for (i, sample) in samples.iter().enumerate() {
        let geo = solar_sample_geometry(sample);
        xs[i] = geo.x;
        ys[i] = geo.y;
        ds[i] = geo.d;
        mus[i] = geo.mu;
        l1s[i] = geo.l1;
        l2s[i] = geo.l2;
        tan_f1 += geo.tan_f1 / 5.0;
        tan_f2 += geo.tan_f2 / 5.0;
    }
    unwrap_increasing(&mut mus);

    let taus = sample_taus(SOLAR_SAMPLE_SPAN_HOURS);
    Ok(SolarElements::new(
        t0,
        SOLAR_WINDOW_HOURS,
        fit_poly(&taus, &xs)?,
        fit_poly(&taus, &ys)?,
        fit_poly(&taus, &ds)?,
        fit_poly(&taus, &mus)?,
        fit_poly(&taus, &l1s)?,
        fit_poly(&taus, &l2s)?,
        tan_f1,
        tan_f2,
    ))
}

/// Fit lunar shadow elements around a provisional maximum instant.
///
/// Samples cover a 4-hour span; the elements remain valid out to ±6 hours,
/// where the near-linear lunar offsets extrapolate stably, so that the slow
/// penumbral contacts stay inside the window.
pub fn fit_lunar_elements(
    provider: &impl PositionProvider,
    t_max: MJD,
) -> Result<LunarElements, UmbraError> {
    let t0 = round_to_hour(t_max);
    let samples = sample_sun_moon(provider, t0, LUNAR_SAMPLE_SPAN_HOURS)?;

    let mut xs = [0.0; 5];
    let mut ys = [0.0; 5];
    let mut pens = [0.0; 5];
    let mut umbs = [0.0; 5];
    let mut moons = [0.0; 5];
    let mut ds = [0.0; 5];
    let mut mus = [0.0; 5];

    for (i, sample) in samples.iter().enumerate() {
        let geo = lunar_sample_geometry(sample);
        xs[i] = geo.x;
        ys[i] = geo.y;
        pens[i] = geo.penumbra;
        umbs[i] = geo.umbra;
        moons[i] = geo.moon_radius;
        ds[i] = geo.d;
        mus[i] = geo.mu;
    }
    unwrap_increasing(&mut mus);

    let taus = sample_taus(LUNAR_SAMPLE_SPAN_HOURS);
    Ok(LunarElements::new(
        t0,
        LUNAR_WINDOW_HOURS,
        fit_poly(&taus, &xs)?,
        fit_poly(&taus, &ys)?,
        fit_poly(&taus, &pens)?,
        fit_poly(&taus, &umbs)?,
        fit_poly(&taus, &moons)?,
        fit_poly(&taus, &ds)?,
        fit_poly(&taus, &mus)?,
    ))
}
