//! Excel serial date and day-fraction conversion.
//!
//! Dates use the 1900 serial convention, counted from serial 1 = 1900-01-01.

use crate::error::ParseError;

/// Serial of 9999-12-31, the last date with a four digit year.
pub const MAX_SERIAL: i64 = 2_958_464;

const SECONDS_PER_DAY: f64 = 86_400.0;

const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Length of `month` (1-12) in `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    debug_assert!((1..=12).contains(&month), "month out of range: {}", month);
    if month == 2 && is_leap_year(year) {
        return 29;
    }
    MONTH_LENGTHS[(month - 1) as usize]
}

/// Convert a serial day number to `YYYY-MM-DD`.
///
/// Serials below 1 are rejected instead of rendering as day 0 of January 1900,
/// so such rows are dropped like any other unparseable date.
pub fn convert_serial_date(serial: i64) -> Result<String, ParseError> {
    if !(1..=MAX_SERIAL).contains(&serial) {
        return Err(ParseError::new("serial date", serial.to_string()));
    }

    let mut days = serial;
    let mut year = 1900;
    let mut month = 1;

    while days > 365 {
        let leap = is_leap_year(year);
        if leap && days == 366 {
            break;
        }
        days -= if leap { 366 } else { 365 };
        year += 1;
    }

    while days > i64::from(days_in_month(year, month)) {
        days -= i64::from(days_in_month(year, month));
        month += 1;
    }

    Ok(format!("{:04}-{:02}-{:02}", year, month, days))
}

/// Convert a fraction of a day to `HH:MM:SS`, truncating partial seconds.
pub fn convert_day_fraction(fraction: f64) -> Result<String, ParseError> {
    if !fraction.is_finite() || fraction < 0.0 {
        return Err(ParseError::new("day fraction", fraction.to_string()));
    }

    let total_seconds = (fraction * SECONDS_PER_DAY) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    Ok(format!("{:02}:{:02}:{:02}", hours, minutes, seconds))
}

/// Parse a date cell and convert it. Fractional serials keep the whole day only.
pub fn parse_serial_date(cell: &str) -> Result<String, ParseError> {
    let cell = cell.trim();
    let serial = match cell.parse::<i64>() {
        Ok(serial) => serial,
        Err(_) => {
            let value: f64 = cell
                .parse()
                .map_err(|_| ParseError::new("serial date", cell))?;
            if !value.is_finite() {
                return Err(ParseError::new("serial date", cell));
            }
            value.trunc() as i64
        }
    };
    convert_serial_date(serial)
}

/// Parse a time cell and convert it.
pub fn parse_day_fraction(cell: &str) -> Result<String, ParseError> {
    let cell = cell.trim();
    let fraction: f64 = cell
        .parse()
        .map_err(|_| ParseError::new("day fraction", cell))?;
    convert_day_fraction(fraction)
}
