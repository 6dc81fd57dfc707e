use crate::error::LayoutError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\s*$").unwrap());

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A proleptic-Gregorian calendar date with no time-of-day component.
///
/// Carrying no time means start-of-day normalization is structural: parsing a
/// date string cannot smuggle hours in, so schedule arithmetic never sees
/// partial days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CivilDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, LayoutError> {
        if month == 0 || month > 12 || day == 0 || day > days_in_month(year, month) {
            return Err(LayoutError::InvalidDate(format!(
                "{year:04}-{month:02}-{day:02}"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// Accepts `YYYY-MM-DD` with `-`, `/` or `.` separators. Anything with a
    /// time suffix or an out-of-range component is rejected.
    pub fn parse(value: &str) -> Result<Self, LayoutError> {
        let caps = DATE_RE
            .captures(value)
            .ok_or_else(|| LayoutError::InvalidDate(value.to_string()))?;
        let year: i32 = caps[1]
            .parse()
            .map_err(|_| LayoutError::InvalidDate(value.to_string()))?;
        let month: u32 = caps[2]
            .parse()
            .map_err(|_| LayoutError::InvalidDate(value.to_string()))?;
        let day: u32 = caps[3]
            .parse()
            .map_err(|_| LayoutError::InvalidDate(value.to_string()))?;
        Self::new(year, month, day).map_err(|_| LayoutError::InvalidDate(value.to_string()))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Days since 1970-01-01 (Howard Hinnant's civil-days algorithm).
    pub fn to_days(self) -> i32 {
        let y = self.year - (self.month <= 2) as i32;
        let era = if y >= 0 { y } else { y - 399 } / 400;
        let yoe = y - era * 400;
        let m = self.month as i32;
        let d = self.day as i32;
        let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + d - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * 146097 + doe - 719468
    }

    pub fn from_days(days: i32) -> Self {
        let z = days + 719468;
        let era = if z >= 0 { z } else { z - 146096 } / 146097;
        let doe = z - era * 146097;
        let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
        let y = yoe + era * 400;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let d = doy - (153 * mp + 2) / 5 + 1;
        let m = mp + if mp < 10 { 3 } else { -9 };
        Self {
            year: y + (m <= 2) as i32,
            month: m as u32,
            day: d as u32,
        }
    }

    pub fn add_days(self, days: i64) -> Self {
        // Stay well inside the i32 range the civil conversion can handle.
        let total = (self.to_days() as i64)
            .saturating_add(days)
            .clamp(-1_500_000_000, 1_500_000_000);
        Self::from_days(total as i32)
    }

    pub fn add_weeks(self, weeks: i64) -> Self {
        self.add_days(weeks.saturating_mul(7))
    }

    pub fn days_until(self, other: Self) -> i32 {
        other.to_days() - self.to_days()
    }

    /// `"Jan 5"` style, the main line on a label face.
    pub fn short_label(&self) -> String {
        format!("{} {}", MONTH_ABBREV[(self.month - 1) as usize], self.day)
    }

    /// `"2024"` style, the year line on a label face.
    pub fn year_label(&self) -> String {
        format!("{:04}", self.year)
    }

    /// `"20240105"` style, used in output file names.
    pub fn file_stamp(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }

    /// Current date from the system clock, falling back to the epoch when the
    /// clock reads before 1970.
    pub fn today() -> Self {
        let days = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| (elapsed.as_secs() / 86_400) as i32)
            .unwrap_or(0);
        Self::from_days(days)
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}
