use crate::{
    foundation::error::{WaterfallError, WaterfallResult},
    scale::linear::ScaleId,
};

/// Ordinal scale splitting a pixel interval into equal bands, one per domain key.
///
/// `padding` is the fraction of each step left empty between bands; `outer_padding` is the
/// space before the first and after the last band, in steps.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BandScale<K> {
    id: ScaleId,
    revision: u64,
    domain: Vec<K>,
    positions: Vec<f64>,
    band_width: f64,
}

impl<K> BandScale<K>
where
    K: PartialEq + Copy,
{
    pub fn new(id: ScaleId, domain: Vec<K>) -> WaterfallResult<Self> {
        if domain.is_empty() {
            return Err(WaterfallError::config("band scale domain must be non-empty"));
        }
        let n = domain.len();
        Ok(Self {
            id,
            revision: 0,
            domain,
            positions: vec![0.0; n],
            band_width: 0.0,
        })
    }

    pub fn id(&self) -> ScaleId {
        self.id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn domain(&self) -> &[K] {
        &self.domain
    }

    /// Lay the bands out over `[start, stop]` (reversed intervals are allowed).
    pub fn range_bands(&mut self, start: f64, stop: f64, padding: f64, outer_padding: f64) {
        let reverse = stop < start;
        let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
        let n = self.domain.len() as f64;
        let step = (hi - lo) / (n - padding + 2.0 * outer_padding);
        self.positions = (0..self.domain.len())
            .map(|i| lo + step * outer_padding + step * i as f64)
            .collect();
        if reverse {
            self.positions.reverse();
        }
        self.band_width = step * (1.0 - padding);
        self.revision += 1;
    }

    /// Left edge of the band for `key`.
    pub fn band(&self, key: K) -> Option<f64> {
        let i = self.domain.iter().position(|k| *k == key)?;
        self.positions.get(i).copied()
    }

    pub fn band_width(&self) -> f64 {
        self.band_width
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scale/ordinal.rs"]
mod tests;
