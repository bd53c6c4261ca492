use crate::{
    aggregate::series::SeriesList,
    choreography::layout::{
        AxisTick, BoxLayout, QuintileLabel, SeriesLayout, VALUE_TICK_COUNT, layout,
        quintile_labels, value_ticks,
    },
    foundation::{config::Timing, core::Millis, error::WaterfallResult},
    render::renderer::TransitionPhase,
    scale::manager::Scales,
};

/// How boxes are released in a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One box after another, `throughput` apart.
    Staggered,
    /// Every box at once.
    Instant,
}

/// Progress of a whole pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalPhase {
    Pending,
    Staggering,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxPhase {
    Waiting,
    Moving,
    Settled,
}

/// Work the choreographer performs when a box reaches a lifecycle point.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// Pull the series' net line to `y`.
    TrailNetLine { series: usize, y: f64 },
    /// Fade the series' connector in.
    RevealConnector { series: usize },
    /// Narrate the box through a non-hover `box-selected`.
    Announce { record: usize },
}

/// An animation that may only begin once `trigger` fires.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Dependent {
    /// Box index in [`PassPlan::boxes`] and the phase that releases the action.
    pub trigger: (usize, TransitionPhase),
    pub action: Action,
}

/// Everything one render pass will do, fixed before the first transition is scheduled.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PassPlan {
    pub mode: RenderMode,
    pub boxes: Vec<BoxLayout>,
    pub series: Vec<SeriesLayout>,
    /// Pixel y of the value zero, where the x axis sits.
    pub baseline_y: f64,
    pub value_ticks: Vec<AxisTick>,
    pub quintile_labels: Vec<QuintileLabel>,
    pub dependents: Vec<Dependent>,
    pub timing: Timing,
}

impl PassPlan {
    pub fn build(
        series: &SeriesList,
        scales: &Scales,
        mode: RenderMode,
        timing: Timing,
    ) -> WaterfallResult<Self> {
        let (boxes, lines) = layout(series, scales)?;
        let index_of = |quintile: u8| usize::from(quintile).saturating_sub(1);

        let mut dependents = Vec::with_capacity(boxes.len() * 2);
        for (i, b) in boxes.iter().enumerate() {
            dependents.push(Dependent {
                trigger: (i, TransitionPhase::Start),
                action: Action::TrailNetLine {
                    series: index_of(b.quintile),
                    y: b.leading_edge(),
                },
            });
            if mode == RenderMode::Staggered {
                dependents.push(Dependent {
                    trigger: (i, TransitionPhase::Start),
                    action: Action::Announce { record: b.record },
                });
            }
            if b.last_up() {
                dependents.push(Dependent {
                    trigger: (i, TransitionPhase::End),
                    action: Action::RevealConnector {
                        series: index_of(b.quintile),
                    },
                });
            }
        }

        Ok(Self {
            mode,
            boxes,
            series: lines,
            baseline_y: scales.y_zero(),
            value_ticks: value_ticks(scales, VALUE_TICK_COUNT),
            quintile_labels: quintile_labels(scales),
            dependents,
            timing,
        })
    }

    /// Delay before box `order` starts moving.
    pub fn box_delay(&self, order: usize) -> Millis {
        match self.mode {
            RenderMode::Staggered => self.timing.box_throughput().times(order),
            RenderMode::Instant => Millis::ZERO,
        }
    }

    /// `(delay, duration)` of a net line trailing a box that just started.
    pub fn net_line_timing(&self) -> (Millis, Millis) {
        match self.mode {
            RenderMode::Staggered => (
                self.timing.box_throughput().halved(),
                self.timing.box_throughput(),
            ),
            RenderMode::Instant => (Millis::ZERO, self.timing.box_animate()),
        }
    }

    pub fn dependents_of(
        &self,
        box_index: usize,
        phase: TransitionPhase,
    ) -> impl Iterator<Item = &Dependent> {
        self.dependents
            .iter()
            .filter(move |d| d.trigger == (box_index, phase))
    }

    /// Earliest instant the pass can be done, measured from its scheduling: the last box has
    /// settled and the net line trailing it has arrived.
    pub fn nominal_duration(&self) -> Millis {
        match self.boxes.len() {
            0 => Millis::ZERO,
            n => {
                let (net_delay, net_duration) = self.net_line_timing();
                let tail = self
                    .timing
                    .box_animate()
                    .max(net_delay.saturating_add(net_duration));
                self.box_delay(n - 1).saturating_add(tail)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreography/plan.rs"]
mod tests;
