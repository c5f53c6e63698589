//! # Eclipse search
//!
//! Walks lunation numbers to find the nearest solar or lunar eclipse in a
//! given direction, one synodic month at a time, or one saros (223 lunations)
//! for the first hop when saros stepping is requested.
//!
//! Every candidate produced by the mean series is put through a **geometric
//! existence test** against freshly fitted shadow elements before it is
//! returned: for solar eclipses the penumbra must actually reach Earth's
//! disk, `sqrt(x² + y²) − L1 ≤ 0.999` at the candidate maximum. This subsumes
//! the series' own uncertain band: a candidate either survives the test and
//! comes out confirmed, owning its elements, or is discarded and the search
//! advances by a single lunation (even under saros stepping, which keeps the
//! walk exhaustive and terminating).
//!
//! The search is bounded: after [`MAX_SEARCH_STEPS`] candidate lunations
//! without a confirmed eclipse it fails with
//! [`UmbraError::SearchExhausted`] instead of looping forever on degenerate
//! ephemeris data.

use std::fmt;

use crate::constants::{LunationNumber, MJD, SAROS_LUNATIONS};
use crate::elements::fitter::{fit_lunar_elements, fit_solar_elements};
use crate::elements::{LunarElements, SolarElements};
use crate::ephemeris::PositionProvider;
use crate::lunation::{self, LunarCandidate, SolarCandidate};
use crate::umbra_errors::UmbraError;

/// Penumbra-versus-disk threshold of the solar existence test, in Earth
/// radii: slightly under 1 so grazing geometries on the far limb are kept.
const EXISTENCE_MARGIN: f64 = 0.999;

/// Upper bound on examined lunations per search (~48 years of months).
pub const MAX_SEARCH_STEPS: u32 = 600;

/// Which way to walk the lunation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Next,
    Previous,
}

impl SearchDirection {
    #[inline]
    fn step(self) -> LunationNumber {
        match self {
            SearchDirection::Next => 1,
            SearchDirection::Previous => -1,
        }
    }
}

/// Geometric type of a solar eclipse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolarEclipseKind {
    Partial,
    Annular,
    Total,
    /// Annular along part of the track, total along the rest.
    Hybrid,
}

impl fmt::Display for SolarEclipseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SolarEclipseKind::Partial => "partial",
            SolarEclipseKind::Annular => "annular",
            SolarEclipseKind::Total => "total",
            SolarEclipseKind::Hybrid => "hybrid",
        };
        f.write_str(text)
    }
}

/// Geometric type of a lunar eclipse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LunarEclipseKind {
    Penumbral,
    Partial,
    Total,
}

impl fmt::Display for LunarEclipseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LunarEclipseKind::Penumbral => "penumbral",
            LunarEclipseKind::Partial => "partial",
            LunarEclipseKind::Total => "total",
        };
        f.write_str(text)
    }
}

/// A confirmed solar eclipse.
///
/// Instances only leave this module after passing the existence test, and
/// they exclusively own the elements fitted for them, so downstream
/// consumers (local circumstances, path matching) never see a provisional
/// event.
#[derive(Debug, Clone)]
pub struct SolarEclipse {
    /// Instant of greatest eclipse, MJD TT.
    pub maximum: MJD,
    pub kind: SolarEclipseKind,
    /// The shadow axis misses the surface although the umbral cone grazes it.
    pub non_central: bool,
    /// Greatest magnitude of the event.
    pub magnitude: f64,
    /// Least distance of the shadow axis from Earth's center, Earth radii.
    pub gamma: f64,
    pub lunation: LunationNumber,
    /// Fitted Besselian elements, valid around `maximum`.
    pub elements: SolarElements,
}

/// A confirmed lunar eclipse.
#[derive(Debug, Clone)]
pub struct LunarEclipse {
    /// Instant of greatest eclipse, MJD TT.
    pub maximum: MJD,
    pub kind: LunarEclipseKind,
    /// Umbral magnitude (penumbral magnitude for penumbral events).
    pub magnitude: f64,
    pub penumbral_magnitude: f64,
    pub gamma: f64,
    pub lunation: LunationNumber,
    /// Fitted shadow elements, valid around `maximum`.
    pub elements: LunarElements,
}

/// Find the nearest solar eclipse relative to `lunation`.
///
/// The first candidate examined is one step away from `lunation`: a single
/// lunation normally, one saros when `saros_step` is set. Whenever a
/// candidate is discarded (no eclipse possible at that lunation, or the
/// existence test fails) the search advances by a **single** lunation
/// regardless of `saros_step`, so every month is eventually examined.
///
/// Arguments
/// -----------------
/// * `provider`: Position provider used to fit and test candidate elements.
/// * `lunation`: Starting lunation number (excluded from the search).
/// * `direction`: Walk forward (`Next`) or backward (`Previous`).
/// * `saros_step`: Jump one saros for the first hop.
///
/// Return
/// ----------
/// * The confirmed [`SolarEclipse`], or [`UmbraError::SearchExhausted`] after
///   [`MAX_SEARCH_STEPS`] candidates, or any provider failure.
pub fn nearest_solar_eclipse(
    provider: &impl PositionProvider,
    lunation: LunationNumber,
    direction: SearchDirection,
    saros_step: bool,
) -> Result<SolarEclipse, UmbraError> {
    let stride = if saros_step { SAROS_LUNATIONS } else { 1 };
    let first = lunation + direction.step() * stride;
    search_solar(provider, first, direction, lunation)
}

/// Find the nearest lunar eclipse relative to `lunation`.
///
/// Same walk as [`nearest_solar_eclipse`]; the existence test requires the
/// Moon's limb to reach the penumbral shadow at maximum.
pub fn nearest_lunar_eclipse(
    provider: &impl PositionProvider,
    lunation: LunationNumber,
    direction: SearchDirection,
    saros_step: bool,
) -> Result<LunarEclipse, UmbraError> {
    let stride = if saros_step { SAROS_LUNATIONS } else { 1 };
    let first = lunation + direction.step() * stride;
    search_lunar(provider, first, direction, lunation)
}

/// First solar eclipse whose maximum follows `mjd`.
pub fn solar_eclipse_after(
    provider: &impl PositionProvider,
    mjd: MJD,
) -> Result<SolarEclipse, UmbraError> {
    let start = lunation::lunation_for_mjd(mjd);
    let eclipse = search_solar(provider, start, SearchDirection::Next, start)?;
    if eclipse.maximum >= mjd {
        Ok(eclipse)
    } else {
        search_solar(provider, eclipse.lunation + 1, SearchDirection::Next, start)
    }
}

/// First lunar eclipse whose maximum follows `mjd`.
pub fn lunar_eclipse_after(
    provider: &impl PositionProvider,
    mjd: MJD,
) -> Result<LunarEclipse, UmbraError> {
    let start = lunation::lunation_for_mjd(mjd);
    let eclipse = search_lunar(provider, start, SearchDirection::Next, start)?;
    if eclipse.maximum >= mjd {
        Ok(eclipse)
    } else {
        search_lunar(provider, eclipse.lunation + 1, SearchDirection::Next, start)
    }
}

fn search_solar(
    provider: &impl PositionProvider,
    first: LunationNumber,
    direction: SearchDirection,
    origin: LunationNumber,
) -> Result<SolarEclipse, UmbraError> {
    let mut k = first;
    for _ in 0..MAX_SEARCH_STEPS {
        if let Some(candidate) = lunation::solar_candidate(k) {
            if let Some(eclipse) = confirm_solar(provider, &candidate, k)? {
                return Ok(eclipse);
            }
        }
        k += direction.step();
    }
    Err(UmbraError::SearchExhausted {
        start: origin,
        tried: MAX_SEARCH_STEPS,
    })
}

fn search_lunar(
    provider: &impl PositionProvider,
    first: LunationNumber,
    direction: SearchDirection,
    origin: LunationNumber,
) -> Result<LunarEclipse, UmbraError> {
    let mut k = first;
    for _ in 0..MAX_SEARCH_STEPS {
        if let Some(candidate) = lunation::lunar_candidate(k) {
            if let Some(eclipse) = confirm_lunar(provider, &candidate, k)? {
                return Ok(eclipse);
            }
        }
        k += direction.step();
    }
    Err(UmbraError::SearchExhausted {
        start: origin,
        tried: MAX_SEARCH_STEPS,
    })
}

/// Run the existence test for a solar candidate and promote it to a
/// confirmed eclipse, or discard it.
fn confirm_solar(
    provider: &impl PositionProvider,
    candidate: &SolarCandidate,
    lunation: LunationNumber,
) -> Result<Option<SolarEclipse>, UmbraError> {
    let elements = fit_solar_elements(provider, candidate.maximum)?;

    let instant = elements.eval_raw(candidate.maximum);
    let miss = elements.shadow_axis_offset(candidate.maximum) - instant.l1;
    if miss > EXISTENCE_MARGIN {
        return Ok(None);
    }

    // Partial magnitude comes from the series; for central events the
    // diameter ratio at maximum is read off the fitted cone radii.
    let magnitude = if candidate.kind == SolarEclipseKind::Partial {
        candidate.magnitude
    } else {
        (instant.l1 - instant.l2) / (instant.l1 + instant.l2)
    };

    Ok(Some(SolarEclipse {
        maximum: candidate.maximum,
        kind: candidate.kind,
        non_central: candidate.non_central,
        magnitude,
        gamma: candidate.gamma,
        lunation,
        elements,
    }))
}

/// Run the existence test for a lunar candidate: the Moon's limb must reach
/// the penumbral shadow at maximum. Type and magnitudes are re-derived from
/// the fitted geometry.
fn confirm_lunar(
    provider: &impl PositionProvider,
    candidate: &LunarCandidate,
    lunation: LunationNumber,
) -> Result<Option<LunarEclipse>, UmbraError> {
    let elements = fit_lunar_elements(provider, candidate.maximum)?;
    let instant = elements.eval_raw(candidate.maximum);

    let offset = instant.offset();
    if offset - instant.moon_radius >= instant.penumbra {
        // Moon entirely outside the penumbra
        return Ok(None);
    }

    let kind = if offset + instant.moon_radius <= instant.umbra {
        LunarEclipseKind::Total
    } else if offset - instant.moon_radius < instant.umbra {
        LunarEclipseKind::Partial
    } else {
        LunarEclipseKind::Penumbral
    };

    let umbral_magnitude =
        (instant.umbra - offset + instant.moon_radius) / (2.0 * instant.moon_radius);
    let penumbral_magnitude =
        (instant.penumbra - offset + instant.moon_radius) / (2.0 * instant.moon_radius);
    let magnitude = if kind == LunarEclipseKind::Penumbral {
        penumbral_magnitude
    } else {
        umbral_magnitude
    };

    Ok(Some(LunarEclipse {
        maximum: candidate.maximum,
        kind,
        magnitude,
        penumbral_magnitude,
        gamma: candidate.gamma,
        lunation,
        elements,
    }))
}
