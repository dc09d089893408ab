//! # Calendar model
//!
//! Year boundaries and time conversions used by constituent generation and
//! harmonic analysis.
//!
//! Timestamps are integer seconds since 1970-01-01 00:00 UTC on the proleptic
//! Gregorian calendar with **no leap seconds**. Year boundaries are computed in
//! closed form so that equilibrium arguments are reproducible to the second;
//! [`hifitime`] is only used to render timestamps as calendar dates.
use hifitime::Epoch;

use crate::constants::{
    Timestamp, Year, AVG_SECONDS_PER_YEAR, MAX_YEAR, MIN_YEAR, SECONDS_PER_COMMON_YEAR,
    SECONDS_PER_DAY, SECONDS_PER_JULIAN_CENTURY, TABLE_1_EPOCH, YEAR_ONE_START,
};
use crate::tidegen_errors::TidegenError;

/// Validate a year against the supported range [1, 4000].
///
/// Arguments
/// ---------
/// * `year`: candidate year, any integer
///
/// Return
/// ------
/// * the year as [`Year`], or [`TidegenError::YearOutOfRange`]
pub fn checked_year(year: i64) -> Result<Year, TidegenError> {
    if year < MIN_YEAR as i64 || year > MAX_YEAR as i64 {
        return Err(TidegenError::YearOutOfRange(year));
    }
    Ok(year as Year)
}

/// Timestamp of January 1st, 00:00 UTC of `year`.
///
/// Valid for years 1 through 4001 (the upper bound lets callers take the start
/// of the year following the last supported one).
pub fn start_of_year(year: Year) -> Timestamp {
    debug_assert!(year >= MIN_YEAR && year <= MAX_YEAR + 1);
    let y = year as i64 - 1;
    YEAR_ONE_START + y * SECONDS_PER_COMMON_YEAR + (y / 4 - y / 100 + y / 400) * SECONDS_PER_DAY
}

/// Exact middle of `year`: 07-02 12:00 on common years, 07-02 00:00 on leap years.
pub fn mid_of_year(year: Year) -> Timestamp {
    (start_of_year(year) + start_of_year(year + 1)) / 2
}

/// Calendar year containing the timestamp `t`.
///
/// The average Gregorian year gives an estimate that is off by at most one,
/// which is then corrected against the exact year boundaries.
///
/// Return
/// ------
/// * the year, or [`TidegenError::YearOutOfRange`] if `t` falls outside years 1..=4000
pub fn year_of_timestamp(t: Timestamp) -> Result<Year, TidegenError> {
    if t < YEAR_ONE_START || t >= start_of_year(MAX_YEAR + 1) {
        let estimate = t
            .saturating_sub(YEAR_ONE_START)
            .div_euclid(AVG_SECONDS_PER_YEAR)
            + 1;
        return Err(TidegenError::YearOutOfRange(estimate));
    }
    let mut year = ((t - YEAR_ONE_START) / AVG_SECONDS_PER_YEAR + 1) as Year;
    if t < start_of_year(year) {
        year -= 1;
    } else if t >= start_of_year(year + 1) {
        year += 1;
    }
    Ok(year)
}

/// Julian centuries (36525 days) elapsed since the SP 98 Table 1 epoch
/// (1899-12-31 12:00 UTC).
///
/// This `T` is the polynomial variable of Table 1, not the hour angle of the mean sun.
pub fn julian_centuries(t: Timestamp) -> f64 {
    (t - TABLE_1_EPOCH) as f64 / SECONDS_PER_JULIAN_CENTURY
}

/// Convert a timestamp to a [`hifitime::Epoch`] on the UTC scale.
pub fn timestamp_to_epoch(t: Timestamp) -> Epoch {
    Epoch::from_unix_seconds(t as f64)
}

/// Render a timestamp as an ISO calendar date (`YYYY-MM-DD`).
pub fn format_date(t: Timestamp) -> String {
    let (year, month, day, _, _, _, _) = timestamp_to_epoch(t).to_gregorian_utc();
    format!("{year:04}-{month:02}-{day:02}")
}
