use crate::date::CivilDate;
use crate::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often the wearer moves to the next aligner in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Weekly,
    Biweekly,
    Monthly,
}

impl Cadence {
    /// Whole weeks between consecutive change dates. Monthly is a deliberate
    /// four-week approximation so every interval in a run is identical; labels
    /// drift past calendar months on long schedules and that is accepted.
    pub fn week_multiplier(self) -> i64 {
        match self {
            Cadence::Weekly => 1,
            Cadence::Biweekly => 2,
            Cadence::Monthly => 4,
        }
    }

    pub fn parse(value: &str) -> Result<Self, LayoutError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Cadence::Weekly),
            "biweekly" => Ok(Cadence::Biweekly),
            "monthly" => Ok(Cadence::Monthly),
            _ => Err(LayoutError::InvalidCadence(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cadence::Weekly => "weekly",
            Cadence::Biweekly => "biweekly",
            Cadence::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cadence {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cadence::parse(s)
    }
}

/// Change date for the aligner at `index` (1-based). Index 1 is the start
/// date itself; each later index advances by the cadence's week multiplier.
pub fn change_date(start: CivilDate, cadence: Cadence, index: u32) -> CivilDate {
    let steps = (index.saturating_sub(1)) as i64;
    start.add_weeks(steps * cadence.week_multiplier())
}
