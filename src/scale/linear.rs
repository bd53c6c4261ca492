use crate::foundation::{
    core::Lerp,
    error::{WaterfallError, WaterfallResult},
};

/// Stable identity of a scale object across in-place domain/range updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ScaleId(pub u64);

impl ScaleId {
    /// Identity for throwaway scales that are not owned by the scale manager.
    pub const DERIVED: Self = Self(0);
}

/// Piecewise-linear scale from a non-decreasing numeric domain onto interpolable outputs.
///
/// With more than two control points the domain value picks a segment first; inputs outside
/// the domain extrapolate from the nearest segment. A zero-width segment maps to its start.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LinearScale<T> {
    id: ScaleId,
    revision: u64,
    domain: Vec<f64>,
    range: Vec<T>,
}

impl<T> LinearScale<T>
where
    T: Lerp + Clone,
{
    pub fn new(id: ScaleId, domain: Vec<f64>, range: Vec<T>) -> WaterfallResult<Self> {
        validate_domain(&domain)?;
        if range.len() != domain.len() {
            return Err(WaterfallError::config(format!(
                "scale range has {} stops but domain has {}",
                range.len(),
                domain.len()
            )));
        }
        Ok(Self {
            id,
            revision: 0,
            domain,
            range,
        })
    }

    pub fn id(&self) -> ScaleId {
        self.id
    }

    /// Bumped on every in-place update.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    pub fn range(&self) -> &[T] {
        &self.range
    }

    /// Replace domain and range together, keeping identity.
    pub fn update(&mut self, domain: Vec<f64>, range: Vec<T>) -> WaterfallResult<()> {
        validate_domain(&domain)?;
        if range.len() != domain.len() {
            return Err(WaterfallError::config(
                "scale range and domain must have the same number of stops",
            ));
        }
        self.domain = domain;
        self.range = range;
        self.revision += 1;
        Ok(())
    }

    pub fn map(&self, x: f64) -> T {
        let k = self.domain.len();
        let i = self.domain[1..k - 1].partition_point(|&d| d <= x);
        let (a, b) = (self.domain[i], self.domain[i + 1]);
        let span = b - a;
        let t = if span == 0.0 { 0.0 } else { (x - a) / span };
        T::lerp(&self.range[i], &self.range[i + 1], t)
    }

    /// Roughly `count` round values spanning the domain extent.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let lo = self.domain[0];
        let hi = self.domain[self.domain.len() - 1];
        let Some(step) = tick_step(lo, hi, count) else {
            return vec![lo];
        };
        let start = (lo / step).ceil();
        let stop = (hi / step).floor();
        let mut out = Vec::new();
        let mut i = start;
        while i <= stop {
            out.push(clean(i * step));
            i += 1.0;
        }
        out
    }
}

fn validate_domain(domain: &[f64]) -> WaterfallResult<()> {
    if domain.len() < 2 {
        return Err(WaterfallError::config(
            "scale domain needs at least two stops",
        ));
    }
    if domain.iter().any(|d| !d.is_finite()) {
        return Err(WaterfallError::config("scale domain must be finite"));
    }
    if !domain.windows(2).all(|w| w[0] <= w[1]) {
        return Err(WaterfallError::config("scale domain must be non-decreasing"));
    }
    Ok(())
}

/// Round tick spacing (1, 2 or 5 times a power of ten) giving about `count` ticks over
/// `[lo, hi]`, or `None` for an empty extent.
pub fn tick_step(lo: f64, hi: f64, count: usize) -> Option<f64> {
    let span = hi - lo;
    if !(span.is_finite() && span > 0.0) || count == 0 {
        return None;
    }
    let m = count as f64;
    let mut step = 10f64.powf((span / m).log10().floor());
    let err = m / span * step;
    if err <= 0.15 {
        step *= 10.0;
    } else if err <= 0.35 {
        step *= 5.0;
    } else if err <= 0.75 {
        step *= 2.0;
    }
    Some(step)
}

fn clean(v: f64) -> f64 {
    let r = (v * 1e9).round() / 1e9;
    if r == 0.0 { 0.0 } else { r }
}

/// Format a tick value with as many decimals as `step` needs and thousands separators.
pub fn format_tick(value: f64, step: Option<f64>) -> String {
    let decimals = step
        .map(|s| (-(s.log10() + 0.01).floor()).max(0.0) as usize)
        .unwrap_or(0);
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && raw.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/scale/linear.rs"]
mod tests;
