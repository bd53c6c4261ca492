use tracing::debug;

use crate::{
    aggregate::series::{QUINTILES, SeriesList, Stack},
    data::{measure::Measure, record::Record},
    foundation::{
        config::{Palette, WaterfallConfig},
        core::{Canvas, Rgb8},
        error::{WaterfallError, WaterfallResult},
    },
    scale::{
        linear::{LinearScale, ScaleId},
        ordinal::BandScale,
    },
};

/// Band padding of the quintile axis and of the up/down columns inside each band.
pub const BAND_PADDING: f64 = 0.1;

/// Top margin of the value axis, in pixels.
const TOP_MARGIN: f64 = 2.0;

/// Diverging color scale: `[min, 0, max]` onto `[negative, neutral, positive]`.
pub type ColorScale = LinearScale<Rgb8>;

/// Every scale the chart draws with.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Scales {
    /// Quintile id to band left edge.
    pub x: BandScale<u8>,
    /// Value to pixel y.
    pub y: LinearScale<f64>,
    /// Value to box fill.
    pub color: ColorScale,
    /// Value to box stroke.
    pub border: ColorScale,
}

impl Scales {
    /// Pixel y of the value zero.
    pub fn y_zero(&self) -> f64 {
        self.y.map(0.0)
    }

    /// Up/down columns inside the band of `quintile`.
    pub fn stack_bands(&self, quintile: u8) -> Option<BandScale<Stack>> {
        let start = self.x.band(quintile)?;
        let mut cols = BandScale::new(ScaleId::DERIVED, vec![Stack::Up, Stack::Down]).ok()?;
        cols.range_bands(
            start,
            start + self.x.band_width(),
            BAND_PADDING,
            BAND_PADDING,
        );
        Some(cols)
    }

    /// Pixel height of a box holding `value`.
    pub fn box_height(&self, value: f64) -> f64 {
        self.y_zero() - self.y.map(value.abs())
    }
}

/// Sole owner and mutator of the chart scales.
///
/// The first computation creates the scale objects; later ones update their domain and range
/// in place so identities (and the transitions keyed on them) survive measure changes.
#[derive(Debug)]
pub struct ScaleManager {
    canvas: Canvas,
    padding_left: f64,
    padding_bottom: f64,
    palette: Palette,
    scales: Option<Scales>,
    next_id: u64,
}

impl ScaleManager {
    pub fn new(config: &WaterfallConfig) -> Self {
        Self {
            canvas: config.canvas,
            padding_left: config.padding_left,
            padding_bottom: config.padding_bottom,
            palette: config.palette,
            scales: None,
            next_id: 1,
        }
    }

    pub fn scales(&self) -> Option<&Scales> {
        self.scales.as_ref()
    }

    fn alloc_id(&mut self) -> ScaleId {
        let id = ScaleId(self.next_id);
        self.next_id += 1;
        id
    }

    #[tracing::instrument(skip(self, series, records), fields(records = records.len()))]
    pub fn compute_scales(
        &mut self,
        series: &SeriesList,
        records: &[Record],
        measure: Measure,
    ) -> WaterfallResult<&Scales> {
        let y_domain = vec![series.min_net(), series.max_sum_up()];
        let y_range = vec![self.canvas.height - self.padding_bottom, TOP_MARGIN];

        let (lo, hi) = records
            .iter()
            .map(|r| measure.extract(r))
            .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let color_domain = vec![lo, 0.0, hi];

        if !(y_domain.iter().chain(&color_domain).all(|v| v.is_finite())) {
            return Err(WaterfallError::data_validation(
                "scale domains must be finite; aggregate the records first",
            ));
        }

        let x_start = self.padding_left;
        let x_stop = self.canvas.width - TOP_MARGIN;

        let scales = match self.scales.take() {
            Some(mut s) => {
                s.x.range_bands(x_start, x_stop, BAND_PADDING, BAND_PADDING);
                let updated = s
                    .y
                    .update(y_domain, y_range)
                    .and_then(|_| {
                        s.color
                            .update(color_domain.clone(), self.palette.fill_stops().to_vec())
                    })
                    .and_then(|_| {
                        s.border
                            .update(color_domain, self.palette.border_stops().to_vec())
                    });
                if let Err(e) = updated {
                    self.scales = Some(s);
                    return Err(e);
                }
                s
            }
            None => {
                let mut x = BandScale::new(self.alloc_id(), QUINTILES.to_vec())?;
                x.range_bands(x_start, x_stop, BAND_PADDING, BAND_PADDING);
                let y = LinearScale::new(self.alloc_id(), y_domain, y_range)?;
                let color = LinearScale::new(
                    self.alloc_id(),
                    color_domain.clone(),
                    self.palette.fill_stops().to_vec(),
                )?;
                let border = LinearScale::new(
                    self.alloc_id(),
                    color_domain,
                    self.palette.border_stops().to_vec(),
                )?;
                Scales {
                    x,
                    y,
                    color,
                    border,
                }
            }
        };

        let s = &*self.scales.insert(scales);
        debug!(
            measure = %measure,
            y_domain = ?s.y.domain(),
            color_domain = ?s.color.domain(),
            "scales computed"
        );
        Ok(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scale/manager.rs"]
mod tests;
