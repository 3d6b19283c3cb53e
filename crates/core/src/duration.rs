//! Structured program duration.
//!
//! The legacy store kept durations as free text ("2 months", "3weeks") and
//! re-parsed them with regexes at every use site. Here the parse happens
//! once, at the edge; everything downstream works with the structured
//! value.

use serde::{Deserialize, Serialize};

/// Unit of a program duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationUnit {
    /// Calendar days
    Days,
    /// Calendar weeks
    Weeks,
    /// Calendar months (30 days)
    Months,
}

/// Length of a course or internship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDuration {
    /// Number of units, at least 1
    pub count: u32,

    /// Unit
    pub unit: DurationUnit,
}

impl ProgramDuration {
    /// Create a duration. A zero count is bumped to 1.
    pub fn new(count: u32, unit: DurationUnit) -> Self {
        Self {
            count: count.max(1),
            unit,
        }
    }

    /// Number of weekly task rounds the program is expected to carry.
    /// One task per week; day-based programs fall back to 4.
    pub fn required_tasks(&self) -> u32 {
        match self.unit {
            DurationUnit::Months => self.count * 4,
            DurationUnit::Weeks => self.count,
            DurationUnit::Days => 4,
        }
    }

    /// Total length in days.
    pub fn days(&self) -> u32 {
        match self.unit {
            DurationUnit::Months => self.count * 30,
            DurationUnit::Weeks => self.count * 7,
            DurationUnit::Days => self.count,
        }
    }
}

impl Default for ProgramDuration {
    /// Two months, the legacy fallback.
    fn default() -> Self {
        Self::new(2, DurationUnit::Months)
    }
}

impl std::fmt::Display for ProgramDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = match self.unit {
            DurationUnit::Days => "day",
            DurationUnit::Weeks => "week",
            DurationUnit::Months => "month",
        };
        if self.count == 1 {
            write!(f, "1 {unit}")
        } else {
            write!(f, "{} {unit}s", self.count)
        }
    }
}

impl std::str::FromStr for ProgramDuration {
    type Err = String;

    /// Recover a duration from legacy free text. Accepts "2 months",
    /// "3weeks", "45 days" and similar; the number and the unit keyword
    /// may be glued together.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower.is_empty() {
            return Err("empty duration".to_string());
        }

        let re = regex::Regex::new(r"(\d+)").map_err(|e| e.to_string())?;
        let count: u32 = re
            .captures(&lower)
            .and_then(|c| c.get(1))
            .ok_or_else(|| format!("no number in duration: {s:?}"))?
            .as_str()
            .parse()
            .map_err(|_| format!("bad number in duration: {s:?}"))?;

        let unit = if lower.contains("month") {
            DurationUnit::Months
        } else if lower.contains("week") {
            DurationUnit::Weeks
        } else if lower.contains("day") {
            DurationUnit::Days
        } else {
            return Err(format!("no unit in duration: {s:?}"));
        };

        Ok(Self::new(count, unit))
    }
}
