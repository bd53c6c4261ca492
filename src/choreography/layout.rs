use kurbo::Rect;

use crate::{
    aggregate::series::{QUINTILES, SeriesList, Stack},
    foundation::{
        core::Rgb8,
        error::{WaterfallError, WaterfallResult},
    },
    scale::{
        linear::{format_tick, tick_step},
        manager::Scales,
    },
};

/// Requested number of value-axis ticks; the actual count follows the round step.
pub const VALUE_TICK_COUNT: usize = 10;

/// Where one record's box ends up in a pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BoxLayout {
    /// Index of the record the box draws.
    pub record: usize,
    pub quintile: u8,
    pub stack: Stack,
    pub value: f64,
    pub position_in_stack: usize,
    pub is_first_in_stack: bool,
    pub is_last_in_stack: bool,
    /// Position in the single left-to-right, bottom-to-top cascade.
    pub order: usize,
    /// Target geometry in canvas pixels.
    pub bounds: Rect,
    pub fill: Rgb8,
    pub stroke: Rgb8,
}

impl BoxLayout {
    pub fn is_up(&self) -> bool {
        self.stack == Stack::Up
    }

    /// Running total's pixel y once this box is in place: the top of an up box, the bottom of
    /// a down box.
    pub fn leading_edge(&self) -> f64 {
        if self.is_up() {
            self.bounds.y0
        } else {
            self.bounds.y1
        }
    }

    pub fn last_up(&self) -> bool {
        self.is_up() && self.is_last_in_stack
    }
}

/// Per-quintile geometry of the connector and net lines.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SeriesLayout {
    pub quintile: u8,
    /// Pixel y of the series' `sum_up`, where the connector rests.
    pub sum_up_y: f64,
    /// Connector spans from the up column's left edge to the down column's right edge.
    pub connector_x: (f64, f64),
    /// The net line spans the down column.
    pub net_x: (f64, f64),
    /// Column rectangles as `(up_x, down_x, width)`.
    pub columns: (f64, f64, f64),
}

/// A value-axis tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AxisTick {
    pub value: f64,
    /// Pixel y under the pass' value scale.
    pub y: f64,
    pub label: String,
}

/// Label centered under a quintile band.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct QuintileLabel {
    pub quintile: u8,
    pub x: f64,
    pub text: String,
}

/// Round ticks over the value domain, labeled with the precision their step needs.
pub fn value_ticks(scales: &Scales, count: usize) -> Vec<AxisTick> {
    let (lo, hi) = match scales.y.domain() {
        [lo, .., hi] => (*lo, *hi),
        _ => return Vec::new(),
    };
    let step = tick_step(lo, hi, count);
    scales
        .y
        .ticks(count)
        .into_iter()
        .map(|value| AxisTick {
            value,
            y: scales.y.map(value),
            label: format_tick(value, step),
        })
        .collect()
}

pub fn quintile_labels(scales: &Scales) -> Vec<QuintileLabel> {
    let half = scales.x.band_width() / 2.0;
    QUINTILES
        .iter()
        .filter_map(|&q| {
            scales.x.band(q).map(|x| QuintileLabel {
                quintile: q,
                x: x + half,
                text: format!("Quintile {q}"),
            })
        })
        .collect()
}

/// Geometry for every box, in cascade order, and for every series.
pub fn layout(
    series: &SeriesList,
    scales: &Scales,
) -> WaterfallResult<(Vec<BoxLayout>, Vec<SeriesLayout>)> {
    let mut boxes = Vec::with_capacity(series.box_count());
    let mut lines = Vec::with_capacity(series.as_slice().len());

    for s in series.iter() {
        let cols = scales.stack_bands(s.id).ok_or_else(|| {
            WaterfallError::choreography(format!("quintile {} has no band on the x axis", s.id))
        })?;
        let col_w = cols.band_width();
        let (up_x, down_x) = match (cols.band(Stack::Up), cols.band(Stack::Down)) {
            (Some(u), Some(d)) => (u, d),
            _ => {
                return Err(WaterfallError::choreography(
                    "stack columns are missing a band",
                ));
            }
        };

        let mut cumulative = 0.0;
        for (stack, i, entry) in s.entries() {
            let height = scales.box_height(entry.value);
            let base = scales.y.map(cumulative);
            let top = match stack {
                Stack::Up => base - height,
                Stack::Down => base,
            };
            cumulative += entry.value;

            let stack_len = match stack {
                Stack::Up => s.up.len(),
                Stack::Down => s.down.len(),
            };
            let x = match stack {
                Stack::Up => up_x,
                Stack::Down => down_x,
            };
            boxes.push(BoxLayout {
                record: entry.record,
                quintile: s.id,
                stack,
                value: entry.value,
                position_in_stack: i,
                is_first_in_stack: i == 0,
                is_last_in_stack: i + 1 == stack_len,
                order: boxes.len(),
                bounds: Rect::new(x, top, x + col_w, top + height),
                fill: scales.color.map(entry.value),
                stroke: scales.border.map(entry.value),
            });
        }

        lines.push(SeriesLayout {
            quintile: s.id,
            sum_up_y: scales.y.map(s.sum_up),
            connector_x: (up_x, down_x + col_w),
            net_x: (down_x, down_x + col_w),
            columns: (up_x, down_x, col_w),
        });
    }

    Ok((boxes, lines))
}

#[cfg(test)]
#[path = "../../tests/unit/choreography/layout.rs"]
mod tests;
