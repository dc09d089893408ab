//! # Constants and type definitions for tidegen
//!
//! This module centralizes the **astronomical constants**, **calendar constants**,
//! **analysis thresholds** and **common type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Calendar anchors (start of year 1, average Gregorian year)
//! - Julian century conversions used by the SP 98 polynomials
//! - Obliquity and lunar inclination used by the node geometry
//! - Rayleigh criterion and amplitude noise floor used by the analyzer
//! - Type aliases shared across the crate

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angular speed in degrees per solar hour
pub type DegreePerHour = f64;
/// Seconds since 1970-01-01 00:00 UTC, proleptic Gregorian, no leap seconds
pub type Timestamp = i64;
/// Calendar year, valid range [`MIN_YEAR`, `MAX_YEAR`]
pub type Year = u16;

// -------------------------------------------------------------------------------------------------
// Calendar
// -------------------------------------------------------------------------------------------------

/// First supported year
pub const MIN_YEAR: Year = 1;

/// Last supported year
pub const MAX_YEAR: Year = 4000;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Number of seconds in a 365-day year
pub const SECONDS_PER_COMMON_YEAR: i64 = 31_536_000;

/// Timestamp of 0001-01-01 00:00 UTC
pub const YEAR_ONE_START: Timestamp = -62_135_596_800;

/// Timestamp of 1899-12-31 12:00 UTC, origin of the SP 98 Table 1 polynomials
pub const TABLE_1_EPOCH: Timestamp = -2_209_032_000;

/// Average Gregorian year in seconds
pub const AVG_SECONDS_PER_YEAR: i64 = 31_556_952;

/// Average Gregorian year in hours (rounded as in the reference tables)
pub const AVG_HOURS_PER_YEAR: f64 = 8765.82;

/// Days in a Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Hours in a Julian century
pub const HOURS_PER_JULIAN_CENTURY: f64 = 876_600.0;

/// Seconds in a Julian century
pub const SECONDS_PER_JULIAN_CENTURY: f64 = 3_155_760_000.0;

/// Default year used as the reference epoch for constituent speeds
pub const DEFAULT_SPEED_EPOCH: Year = 1900;

/// Default generation span of the table generator
pub const DEFAULT_FIRST_YEAR: Year = 1970;
pub const DEFAULT_LAST_YEAR: Year = 2037;

// -------------------------------------------------------------------------------------------------
// Astronomy (SP 98 Table 1)
// -------------------------------------------------------------------------------------------------

/// Obliquity of the ecliptic as of 1900-01-01 (ω), degrees
pub const OBLIQUITY: Degree = 23.0 + 27.0 / 60.0 + 8.26 / 3600.0;

/// Inclination of the moon's orbit to the ecliptic (i), degrees
pub const LUNAR_INCLINATION: Degree = 5.0 + 8.0 / 60.0 + 43.3546 / 3600.0;

// -------------------------------------------------------------------------------------------------
// Harmonic analysis
// -------------------------------------------------------------------------------------------------

/// Converts degrees per hour into rotations per average Gregorian year
pub const ROTATION_FACTOR: f64 = AVG_HOURS_PER_YEAR / 360.0;

/// Rayleigh criterion: minimum number of relative rotations over the record.
///
/// Several pairs of constituents commonly accepted for a one-year record differ
/// by .999953 rotations per average Gregorian year.
pub const MIN_ROTATIONS: f64 = 0.99;

/// Slack applied when comparing against [`MIN_ROTATIONS`]
pub const ROTATION_TOLERANCE: f64 = 1e-9;

/// Amplitudes below this round to zero in the tide database
pub const AMPLITUDE_EPSILON: f64 = 0.00005;
