/// One job-statistics row: an occupational category within a wage quintile.
///
/// Records are immutable once loaded. `quintile` is carried as read so that out-of-range rows
/// are rejected by aggregation rather than silently coerced.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub category: String,
    pub quintile: i64,
    /// Jobs created (positive) or lost (negative), 2010-2012.
    pub job_growth: f64,
    /// Average annual wage in dollars.
    pub avg_wage: f64,
    /// Average annual wage growth in $M.
    pub avg_wage_growth: f64,
}

impl Record {
    pub fn new(category: impl Into<String>, quintile: i64, job_growth: f64) -> Self {
        Self {
            category: category.into(),
            quintile,
            job_growth,
            avg_wage: 0.0,
            avg_wage_growth: 0.0,
        }
    }

    pub fn with_avg_wage(mut self, avg_wage: f64) -> Self {
        self.avg_wage = avg_wage;
        self
    }

    pub fn with_avg_wage_growth(mut self, avg_wage_growth: f64) -> Self {
        self.avg_wage_growth = avg_wage_growth;
        self
    }
}

/// Income-quintile reference row, used for axis and summary context only.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuintileReference {
    pub quintile: i64,
    /// Household income bound for the quintile, in dollars.
    pub income: f64,
    /// Net annual wage growth for the quintile, in $M.
    pub net_wage_growth: f64,
}

/// Both source datasets, resolved.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct DataBundle {
    pub stats: Vec<Record>,
    pub quintiles: Vec<QuintileReference>,
}

impl DataBundle {
    pub fn quintile_reference(&self, quintile: u8) -> Option<&QuintileReference> {
        self.quintiles
            .iter()
            .find(|q| q.quintile == i64::from(quintile))
    }
}
