//! Color legend: a strip of equal intervals sampled from the fill scale, with a
//! `min / 0 / max` axis underneath. Drawn into the chart's renderer in the top-right corner;
//! every redraw after the first animates there.

use tracing::debug;

use crate::{
    data::measure::Measure,
    events::bus::ChartEvent,
    foundation::{
        config::{LegendConfig, WaterfallConfig},
        core::{Millis, Rgb8},
        error::WaterfallResult,
    },
    render::renderer::{Attr, AttrValue, Renderer, ShapeId, ShapeKind},
    scale::{
        linear::{LinearScale, ScaleId, format_tick, tick_step},
        manager::ColorScale,
    },
};

/// Vertical offset of the swatch strip below the title.
const SWATCH_TOP: f64 = 15.0;

/// Gap between the legend and the canvas' top-right corner.
const INSET: f64 = 10.0;

const TICK_SIZE: f64 = 6.0;

/// Class prefix shared by every shape the legend draws.
pub const LEGEND_CLASS_PREFIX: &str = "legend";

/// One color interval of the strip.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Swatch {
    /// Interval start in the measure's units.
    pub value: f64,
    pub x: f64,
    pub width: f64,
    /// Scale color at the interval midpoint.
    pub fill: Rgb8,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LegendTick {
    pub value: f64,
    pub x: f64,
    /// Blank at zero.
    pub label: String,
}

#[derive(Clone, Debug)]
struct LegendShapes {
    title: ShapeId,
    swatches: Vec<ShapeId>,
    marks: Vec<ShapeId>,
    labels: Vec<ShapeId>,
}

/// Legend model, redrawn from every `new-color-scale` event.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Legend {
    config: LegendConfig,
    transition: Millis,
    /// Top-left corner on the canvas.
    origin: (f64, f64),
    #[serde(skip)]
    shapes: Option<LegendShapes>,
    scale_id: Option<ScaleId>,
    title: String,
    has_zero: bool,
    swatches: Vec<Swatch>,
    ticks: Vec<LegendTick>,
    /// Number of scales applied so far; redraws after the first one transition.
    revision: u64,
}

impl Legend {
    pub fn new(config: &WaterfallConfig) -> Self {
        Self {
            config: config.legend,
            transition: Millis(config.timing.legend_transition_ms),
            origin: (config.canvas.width - config.legend.width - INSET, INSET),
            shapes: None,
            scale_id: None,
            title: String::new(),
            has_zero: false,
            swatches: Vec::new(),
            ticks: Vec::new(),
            revision: 0,
        }
    }

    pub fn scale_id(&self) -> Option<ScaleId> {
        self.scale_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// True when the domain straddles zero.
    pub fn has_zero(&self) -> bool {
        self.has_zero
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn ticks(&self) -> &[LegendTick] {
        &self.ticks
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    pub fn width(&self) -> f64 {
        self.config.width
    }

    pub fn swatch_top(&self) -> f64 {
        SWATCH_TOP
    }

    pub fn swatch_height(&self) -> f64 {
        self.config.height - SWATCH_TOP - self.config.height / 3.0
    }

    pub fn axis_y(&self) -> f64 {
        self.config.height * 2.0 / 3.0
    }

    /// Duration of the next redraw: zero for the first scale, the configured transition after.
    pub fn transition(&self) -> Millis {
        if self.revision > 1 {
            self.transition
        } else {
            Millis::ZERO
        }
    }

    /// Apply a `new-color-scale` event; other events are ignored. Returns whether the legend
    /// changed.
    pub fn handle(&mut self, event: &ChartEvent) -> WaterfallResult<bool> {
        match event {
            ChartEvent::NewColorScale {
                scale_id,
                measure,
                scale,
            } => {
                self.set_scale(*scale_id, *measure, scale)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn set_scale(
        &mut self,
        scale_id: ScaleId,
        measure: Measure,
        scale: &ColorScale,
    ) -> WaterfallResult<()> {
        let domain = scale.domain();
        let (min, max) = match domain {
            [first, .., last] => (*first, *last),
            _ => (0.0, 0.0),
        };
        let width = self.config.width;
        let n = self.config.intervals;
        let position = LinearScale::new(ScaleId::DERIVED, vec![min, max], vec![0.0, width])?;

        let step = (max - min) / n as f64;
        self.swatches = (0..n)
            .map(|i| {
                let value = min + step * i as f64;
                Swatch {
                    value,
                    x: position.map(value),
                    width: width / n as f64,
                    fill: scale.map(value + step / 2.0),
                }
            })
            .collect();

        let label_step = tick_step(min, max, 10);
        self.ticks = [min, 0.0, max]
            .into_iter()
            .map(|value| LegendTick {
                value,
                x: position.map(value),
                label: if value == 0.0 {
                    String::new()
                } else {
                    format_tick(value, label_step)
                },
            })
            .collect();

        self.has_zero = min < 0.0 && max > 0.0;
        self.scale_id = Some(scale_id);
        self.title = measure.display_name().to_owned();
        self.revision += 1;
        debug!(
            scale = scale_id.0,
            min, max, revision = self.revision, "legend redrawn"
        );
        Ok(())
    }

    fn tick_opacity(&self, tick: &LegendTick) -> f64 {
        if tick.value == 0.0 && !self.has_zero {
            0.0
        } else {
            1.0
        }
    }

    /// Bring the legend's shapes in `renderer` in line with the current scale.
    ///
    /// The first call creates them in place. Later calls retitle at once and animate swatch
    /// fills and tick positions over [`Legend::transition`].
    pub fn draw<R: Renderer>(&mut self, renderer: &mut R) -> WaterfallResult<()> {
        let Some(shapes) = self.shapes.clone() else {
            let shapes = self.create_shapes(renderer)?;
            self.shapes = Some(shapes);
            return Ok(());
        };

        let duration = self.transition();
        let (ox, _) = self.origin;
        renderer.set_text(shapes.title, &self.title)?;
        for (&id, sw) in shapes.swatches.iter().zip(&self.swatches) {
            renderer.animate_attribute(id, Attr::Fill, sw.fill.into(), duration, Millis::ZERO)?;
        }
        for ((&mark, &label), tick) in shapes.marks.iter().zip(&shapes.labels).zip(&self.ticks) {
            renderer.set_text(label, &tick.label)?;
            let x = AttrValue::Num(ox + tick.x);
            let opacity = AttrValue::Num(self.tick_opacity(tick));
            for (id, attr, value) in [
                (mark, Attr::X1, x),
                (mark, Attr::X2, x),
                (label, Attr::X, x),
                (mark, Attr::Opacity, opacity),
            ] {
                renderer.animate_attribute(id, attr, value, duration, Millis::ZERO)?;
            }
        }
        Ok(())
    }

    fn create_shapes<R: Renderer>(&self, renderer: &mut R) -> WaterfallResult<LegendShapes> {
        let (ox, oy) = self.origin;
        let title = renderer.create_shape(
            ShapeKind::Text,
            "legend-title",
            &[
                (Attr::X, AttrValue::Num(ox + self.width() / 2.0)),
                (Attr::Y, AttrValue::Num(oy + 13.0)),
            ],
        );
        renderer.set_text(title, &self.title)?;

        let swatches = self
            .swatches
            .iter()
            .map(|sw| {
                renderer.create_shape(
                    ShapeKind::Rect,
                    "legend-swatch",
                    &[
                        (Attr::X, AttrValue::Num(ox + sw.x)),
                        (Attr::Y, AttrValue::Num(oy + self.swatch_top())),
                        (Attr::Width, AttrValue::Num(sw.width)),
                        (Attr::Height, AttrValue::Num(self.swatch_height())),
                        (Attr::Fill, sw.fill.into()),
                    ],
                )
            })
            .collect();

        let axis_y = oy + self.axis_y();
        renderer.create_shape(
            ShapeKind::Line,
            "legend-axis",
            &[
                (Attr::X1, AttrValue::Num(ox)),
                (Attr::X2, AttrValue::Num(ox + self.width())),
                (Attr::Y1, AttrValue::Num(axis_y)),
                (Attr::Y2, AttrValue::Num(axis_y)),
            ],
        );

        let mut marks = Vec::with_capacity(self.ticks.len());
        let mut labels = Vec::with_capacity(self.ticks.len());
        for tick in &self.ticks {
            let x = ox + tick.x;
            marks.push(renderer.create_shape(
                ShapeKind::Line,
                "legend-tick",
                &[
                    (Attr::X1, AttrValue::Num(x)),
                    (Attr::X2, AttrValue::Num(x)),
                    (Attr::Y1, AttrValue::Num(axis_y)),
                    (Attr::Y2, AttrValue::Num(axis_y + TICK_SIZE)),
                    (Attr::Opacity, AttrValue::Num(self.tick_opacity(tick))),
                ],
            ));
            let label = renderer.create_shape(
                ShapeKind::Text,
                "legend-tick-label",
                &[
                    (Attr::X, AttrValue::Num(x)),
                    (Attr::Y, AttrValue::Num(axis_y + TICK_SIZE + 3.0)),
                ],
            );
            renderer.set_text(label, &tick.label)?;
            labels.push(label);
        }

        debug!(swatches = self.swatches.len(), "legend shapes created");
        Ok(LegendShapes {
            title,
            swatches,
            marks,
            labels,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/legend.rs"]
mod tests;
