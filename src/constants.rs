//! # Constants and type definitions for Umbra
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `umbra` library.
//!
//! ## Overview
//!
//! - Astronomical and geophysical constants (IAU nominal values)
//! - Unit conversions (degrees ↔ radians, AU ↔ Earth radii)
//! - Core type aliases used across the crate
//! - Shadow-geometry windows shared by the fitter and the evaluation engine
//!
//! These definitions are used by all main modules, including the eclipse search,
//! the fundamental-plane elements, and the central-line matcher.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Earth equatorial radius in km (IAU 2015 Resolution B3)
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Earth equatorial radius in meters (GRS1980/WGS84)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// Earth polar radius in meters (GRS1980/WGS84)
pub const EARTH_MINOR_AXIS: f64 = 6_356_752.3;

/// Mean Earth radius in km, used for great-circle distances
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

/// Sun nominal radius in km (IAU 2015 Resolution B3)
pub const SUN_RADIUS_KM: f64 = 696_000.0;

/// Moon mean radius in km (IAU 2015)
pub const MOON_RADIUS_KM: f64 = 1737.4;

/// Sun radius expressed in Earth equatorial radii
pub const SUN_RADIUS_ER: f64 = SUN_RADIUS_KM / EARTH_RADIUS_KM;

/// Moon radius expressed in Earth equatorial radii
pub const MOON_RADIUS_ER: f64 = MOON_RADIUS_KM / EARTH_RADIUS_KM;

/// Astronomical Unit expressed in Earth equatorial radii
pub const AU_ER: f64 = AU / EARTH_RADIUS_KM;

/// Danjon atmospheric enlargement factor for Earth's shadow.
/// The atmosphere makes the geometrical shadow appear ~2% larger.
pub const DANJON_ENLARGEMENT: f64 = 1.02;

// -------------------------------------------------------------------------------------------------
// Shadow-model windows
// -------------------------------------------------------------------------------------------------

/// Full span of the five solar samples, in hours (samples at ±span/2, ±span/4, 0).
pub const SOLAR_SAMPLE_SPAN_HOURS: f64 = 12.0;

/// Full span of the five lunar samples, in hours.
pub const LUNAR_SAMPLE_SPAN_HOURS: f64 = 4.0;

/// Half-width of the solar evaluation window around the reference instant, in hours.
pub const SOLAR_WINDOW_HOURS: f64 = 6.0;

/// Half-width of the lunar evaluation window, in hours. Wider than the sample
/// span: lunar shadow offsets are nearly linear in time, so the cubic
/// extrapolates stably out to the penumbral contacts.
pub const LUNAR_WINDOW_HOURS: f64 = 6.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Modified Julian Date (days)
pub type MJD = f64;

/// Sequential index of synodic months; 0 is the first new moon of January 2000.
pub type LunationNumber = i32;

/// Number of lunations in one saros period.
pub const SAROS_LUNATIONS: LunationNumber = 223;
