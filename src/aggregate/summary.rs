use crate::{
    aggregate::series::Series,
    data::{
        measure::Measure,
        record::{QuintileReference, Record},
    },
};

/// Quintile-level totals carried by a net-box selection.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SeriesSummary {
    pub quintile: u8,
    /// Measure the sums below were computed under.
    pub measure: Measure,
    pub sum_up: f64,
    pub sum_down: f64,
    pub net: f64,
    /// Net job growth over every record of the quintile.
    pub job_growth: f64,
    /// Net average wage growth over every record of the quintile.
    pub avg_wage_growth: f64,
    pub reference: Option<QuintileReference>,
}

impl SeriesSummary {
    pub fn new(
        series: &Series,
        records: &[Record],
        measure: Measure,
        reference: Option<&QuintileReference>,
    ) -> Self {
        let (job_growth, avg_wage_growth) = series
            .entries()
            .filter_map(|(_, _, e)| records.get(e.record))
            .fold((0.0, 0.0), |(j, w), r| {
                (j + r.job_growth, w + r.avg_wage_growth)
            });

        Self {
            quintile: series.id,
            measure,
            sum_up: series.sum_up,
            sum_down: series.sum_down,
            net: series.net,
            job_growth,
            avg_wage_growth,
            reference: reference.cloned(),
        }
    }

    /// Net value under the summary's measure.
    pub fn active_net(&self) -> f64 {
        match self.measure {
            Measure::JobGrowth => self.job_growth,
            Measure::AvgWageGrowth => self.avg_wage_growth,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/aggregate/summary.rs"]
mod tests;
