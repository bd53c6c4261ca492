use tracing::debug;

use crate::{
    data::{measure::Measure, record::Record},
    foundation::error::{WaterfallError, WaterfallResult},
};

/// Number of income quintiles; the chart always has exactly this many series.
pub const QUINTILE_COUNT: usize = 5;

/// Quintile ids in axis order.
pub const QUINTILES: [u8; QUINTILE_COUNT] = [1, 2, 3, 4, 5];

/// A record placed in a stack, with its value under the measure that placed it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct StackEntry {
    /// Index into the aggregated record slice.
    pub record: usize,
    pub value: f64,
}

/// Up/down partition and sums of every record in one quintile.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Series {
    /// Quintile id, `1..=5`.
    pub id: u8,
    /// Records with a value `>= 0`, in input order.
    pub up: Vec<StackEntry>,
    /// Records with a value `< 0`, in input order.
    pub down: Vec<StackEntry>,
    pub sum_up: f64,
    pub sum_down: f64,
    pub net: f64,
}

impl Series {
    fn empty(id: u8) -> Self {
        Self {
            id,
            up: Vec::new(),
            down: Vec::new(),
            sum_up: 0.0,
            sum_down: 0.0,
            net: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.up.len() + self.down.len()
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    /// Up entries followed by down entries: the order boxes move in.
    pub fn entries(&self) -> impl Iterator<Item = (Stack, usize, &StackEntry)> {
        let up = self
            .up
            .iter()
            .enumerate()
            .map(|(i, e)| (Stack::Up, i, e));
        let down = self
            .down
            .iter()
            .enumerate()
            .map(|(i, e)| (Stack::Down, i, e));
        up.chain(down)
    }
}

/// Which stack of a series an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stack {
    Up,
    Down,
}

/// The five series, ordered by quintile.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct SeriesList(Vec<Series>);

impl SeriesList {
    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.0.iter()
    }

    /// Series for quintile `q` (`1..=5`).
    pub fn quintile(&self, q: u8) -> Option<&Series> {
        self.0.get(usize::from(q).checked_sub(1)?)
    }

    pub fn as_slice(&self) -> &[Series] {
        &self.0
    }

    pub fn box_count(&self) -> usize {
        self.0.iter().map(Series::len).sum()
    }

    pub fn min_net(&self) -> f64 {
        self.0.iter().map(|s| s.net).fold(f64::INFINITY, f64::min)
    }

    pub fn max_sum_up(&self) -> f64 {
        self.0
            .iter()
            .map(|s| s.sum_up)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl std::ops::Index<usize> for SeriesList {
    type Output = Series;

    fn index(&self, index: usize) -> &Series {
        &self.0[index]
    }
}

fn validate(records: &[Record], measure: Measure) -> WaterfallResult<()> {
    for (i, r) in records.iter().enumerate() {
        if !(1..=QUINTILE_COUNT as i64).contains(&r.quintile) {
            return Err(WaterfallError::data_validation(format!(
                "record {i} ('{}'): quintile {} is outside 1..=5",
                r.category, r.quintile
            )));
        }
        let v = measure.extract(r);
        if !v.is_finite() {
            return Err(WaterfallError::data_validation(format!(
                "record {i} ('{}'): {} value {v} is not finite",
                r.category,
                measure.id()
            )));
        }
    }
    Ok(())
}

/// Partition `records` into the five quintile series under `measure`.
///
/// Every record is validated before anything is built, so a failure never yields a partial
/// list. Within each stack, input order is preserved.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn aggregate(records: &[Record], measure: Measure) -> WaterfallResult<SeriesList> {
    validate(records, measure)?;

    let mut series: Vec<Series> = QUINTILES.iter().copied().map(Series::empty).collect();
    for (index, r) in records.iter().enumerate() {
        let value = measure.extract(r);
        let s = &mut series[(r.quintile - 1) as usize];
        let entry = StackEntry {
            record: index,
            value,
        };
        if value >= 0.0 {
            s.sum_up += value;
            s.up.push(entry);
        } else {
            s.sum_down += value;
            s.down.push(entry);
        }
    }
    for s in &mut series {
        s.net = s.sum_up + s.sum_down;
        debug!(
            quintile = s.id,
            up = s.up.len(),
            down = s.down.len(),
            net = s.net,
            "series aggregated"
        );
    }

    Ok(SeriesList(series))
}

#[cfg(test)]
#[path = "../../tests/unit/aggregate/series.rs"]
mod tests;
