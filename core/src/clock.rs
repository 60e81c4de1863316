//! Local wall-clock rendering for log context
//!
//! Implements Howard Hinnant's civil_from_days algorithm.
//! Reference: http://howardhinnant.github.io/date_algorithms.html
//!
//! O(1), correct for all leap years in the proleptic Gregorian calendar.
//! No timezone database: the local offset is a fixed number of seconds.

use core::fmt::Write;

use hal_abstractions::Timestamp;
use heapless::String;

/// Broken-down local date and time (1-second resolution)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl LocalTime {
    /// Local time for `timestamp` shifted by `offset_secs`
    pub fn from_timestamp(timestamp: Timestamp, offset_secs: i64) -> Self {
        const SECONDS_PER_DAY: i64 = 86_400;

        let local = timestamp.unix_secs as i64 + offset_secs;
        let days = local.div_euclid(SECONDS_PER_DAY);
        let secs_today = local.rem_euclid(SECONDS_PER_DAY);

        let (year, month, day) = civil_from_days(days);
        Self {
            year,
            month,
            day,
            hour: (secs_today / 3600) as u8,
            minute: ((secs_today % 3600) / 60) as u8,
            second: (secs_today % 60) as u8,
        }
    }

    /// `YYYY-MM-DD HH:MM:SS`
    pub fn render(&self) -> String<24> {
        let mut out = String::new();
        // 24 bytes hold any four-digit year; wider years are truncated
        let _ = write!(out, "{}", self);
        out
    }
}

impl core::fmt::Display for LocalTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Convert days since Unix epoch to civil date (year, month, day)
fn civil_from_days(days_since_epoch: i64) -> (i32, u8, u8) {
    // Shift epoch to 0000-03-01 so the leap day ends the year
    let z = days_since_epoch + 719_468;

    // 400-year eras
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u32; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]

    // Month [0, 11] counted from March
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;

    let year = if m <= 2 { y + 1 } else { y };
    (year as i32, m, d)
}
