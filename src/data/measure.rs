use std::{fmt, str::FromStr};

use crate::{
    data::record::Record,
    foundation::error::{WaterfallError, WaterfallResult},
};

/// The numeric field being visualized. Adding a measure means adding a variant.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Measure {
    #[default]
    JobGrowth,
    AvgWageGrowth,
}

impl Measure {
    pub const ALL: [Measure; 2] = [Measure::JobGrowth, Measure::AvgWageGrowth];

    /// Stable identifier, also accepted by [`FromStr`].
    pub fn id(self) -> &'static str {
        match self {
            Self::JobGrowth => "job-growth",
            Self::AvgWageGrowth => "avg-wage-growth",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::JobGrowth => "Job Growth, 2010-2012",
            Self::AvgWageGrowth => "Avg Wealth Growth ($M/yr)",
        }
    }

    pub fn extract(self, record: &Record) -> f64 {
        match self {
            Self::JobGrowth => record.job_growth,
            Self::AvgWageGrowth => record.avg_wage_growth,
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Measure {
    type Err = WaterfallError;

    fn from_str(s: &str) -> WaterfallResult<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        match key.as_str() {
            "job-growth" | "jobgrowth" | "jobs" => Ok(Self::JobGrowth),
            "avg-wage-growth" | "avgwagegrowth" | "wage" | "wealth" => Ok(Self::AvgWageGrowth),
            other => Err(WaterfallError::config(format!("unknown measure '{other}'"))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/measure.rs"]
mod tests;
