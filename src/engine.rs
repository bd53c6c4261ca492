use std::sync::mpsc::Receiver;

use tracing::{debug, info};

use crate::{
    aggregate::{
        series::{SeriesList, aggregate},
        summary::SeriesSummary,
    },
    choreography::{
        choreographer::{Choreographer, Cue, PhaseChange, ProgressEvent},
        plan::{GlobalPhase, RenderMode},
    },
    data::{
        measure::Measure,
        record::{DataBundle, Record},
    },
    events::{
        bus::{ChartEvent, EventBus, EventKind},
        selection::SelectionEmitter,
    },
    foundation::{
        config::WaterfallConfig,
        core::Millis,
        error::{WaterfallError, WaterfallResult},
    },
    legend::Legend,
    render::renderer::{Renderer, TransitionEvent},
    scale::manager::{ScaleManager, Scales},
};

/// The waterfall chart: data, scales, choreography and events around one renderer.
///
/// Time only moves when the caller advances it ([`WaterfallEngine::run_until`],
/// [`WaterfallEngine::run_to_completion`]), which is when lifecycle events are dispatched and
/// dependent animations released.
#[derive(Debug)]
pub struct WaterfallEngine<R> {
    config: WaterfallConfig,
    renderer: R,
    data: DataBundle,
    measure: Measure,
    series: Option<SeriesList>,
    scales: ScaleManager,
    choreographer: Choreographer,
    bus: EventBus,
    selection: SelectionEmitter,
    legend: Legend,
}

impl<R: Renderer> WaterfallEngine<R> {
    pub fn new(config: WaterfallConfig, renderer: R) -> WaterfallResult<Self> {
        config.validate()?;
        Ok(Self {
            scales: ScaleManager::new(&config),
            choreographer: Choreographer::new(&config),
            legend: Legend::new(&config),
            config,
            renderer,
            data: DataBundle::default(),
            measure: Measure::default(),
            series: None,
            bus: EventBus::new(),
            selection: SelectionEmitter::new(),
        })
    }

    pub fn config(&self) -> &WaterfallConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn records(&self) -> &[Record] {
        &self.data.stats
    }

    pub fn series(&self) -> Option<&SeriesList> {
        self.series.as_ref()
    }

    pub fn scales(&self) -> Option<&Scales> {
        self.scales.scales()
    }

    pub fn phase(&self) -> GlobalPhase {
        self.choreographer.phase()
    }

    pub fn choreographer(&self) -> &Choreographer {
        &self.choreographer
    }

    pub fn progress(&self) -> &[ProgressEvent] {
        self.choreographer.progress()
    }

    pub fn phase_changes(&self) -> &[PhaseChange] {
        self.choreographer.phase_changes()
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn now(&self) -> Millis {
        self.renderer.now()
    }

    pub fn subscribe(&mut self, kinds: &[EventKind]) -> Receiver<ChartEvent> {
        let rx = self.bus.subscribe(kinds);
        debug!(?kinds, subscribers = self.bus.subscriber_count(), "subscribed");
        rx
    }

    fn initialized(&self) -> WaterfallResult<&SeriesList> {
        self.series
            .as_ref()
            .ok_or_else(|| WaterfallError::choreography("engine is not initialized"))
    }

    /// Aggregate `data` under `measure`, build the scales and start the staggered cascade.
    ///
    /// Validation runs before any state is touched, so a rejected bundle leaves the engine
    /// uninitialized. The legend is drawn from the initial color scale without emitting
    /// `new-color-scale`.
    pub fn initialize(&mut self, data: DataBundle, measure: Measure) -> WaterfallResult<()> {
        if self.series.is_some() {
            return Err(WaterfallError::choreography("engine is already initialized"));
        }
        let series = aggregate(&data.stats, measure)?;
        let scales = self
            .scales
            .compute_scales(&series, &data.stats, measure)?
            .clone();
        self.choreographer
            .render(&mut self.renderer, &series, &scales, RenderMode::Staggered)?;
        self.legend
            .set_scale(scales.color.id(), measure, &scales.color)?;
        self.legend.draw(&mut self.renderer)?;

        info!(
            records = data.stats.len(),
            quintile_rows = data.quintiles.len(),
            measure = %measure,
            "waterfall initialized"
        );
        self.data = data;
        self.measure = measure;
        self.series = Some(series);
        Ok(())
    }

    /// Switch the active measure: re-aggregate, update the scales in place, move every box at
    /// once and announce the new color scale. A net-line selection is cleared.
    pub fn change_measure(&mut self, measure: Measure) -> WaterfallResult<()> {
        self.initialized()?;
        let series = aggregate(&self.data.stats, measure)?;
        let scales = self
            .scales
            .compute_scales(&series, &self.data.stats, measure)?
            .clone();
        self.choreographer
            .render(&mut self.renderer, &series, &scales, RenderMode::Instant)?;
        self.measure = measure;
        self.series = Some(series);

        let event = ChartEvent::NewColorScale {
            scale_id: scales.color.id(),
            measure,
            scale: scales.color,
        };
        self.legend.handle(&event)?;
        self.legend.draw(&mut self.renderer)?;
        self.bus.emit(event);
        self.selection.clear_net(&mut self.bus);
        debug!(measure = %measure, "measure changed");
        Ok(())
    }

    /// Collapse the chart and replay the staggered cascade under the current measure.
    pub fn reset_cascade(&mut self) -> WaterfallResult<()> {
        let series = self.initialized()?.clone();
        let scales = self
            .scales
            .scales()
            .cloned()
            .ok_or_else(|| WaterfallError::choreography("no scales to replay with"))?;
        self.choreographer
            .reset_cascade(&mut self.renderer, &series, &scales)?;
        self.selection.clear_net(&mut self.bus);
        Ok(())
    }

    fn dispatch(&mut self, event: TransitionEvent) -> WaterfallResult<()> {
        for cue in self.choreographer.dispatch(&mut self.renderer, event)? {
            match cue {
                Cue::Announce { record, element } => {
                    let rec = self.data.stats.get(record).ok_or_else(|| {
                        WaterfallError::choreography(format!("announce unknown record {record}"))
                    })?;
                    self.selection
                        .on_hover(&mut self.bus, record, rec, element, false);
                }
            }
        }
        Ok(())
    }

    /// Advance the clock to `to`, dispatching every lifecycle event on the way.
    pub fn run_until(&mut self, to: Millis) -> WaterfallResult<()> {
        while let Some(event) = self.renderer.next_transition_event(to) {
            self.dispatch(event)?;
        }
        self.renderer.advance_to(to);
        Ok(())
    }

    pub fn advance(&mut self, by: Millis) -> WaterfallResult<()> {
        self.run_until(self.renderer.now().saturating_add(by))
    }

    /// Run until nothing is left animating; returns the clock at that point.
    pub fn run_to_completion(&mut self) -> WaterfallResult<Millis> {
        while let Some(event) = self.renderer.next_transition_event(Millis::MAX) {
            self.dispatch(event)?;
        }
        Ok(self.renderer.now())
    }

    /// Pointer entered the box drawing record `record`.
    pub fn hover_box(&mut self, record: usize) -> WaterfallResult<()> {
        self.initialized()?;
        let element = self
            .choreographer
            .elements()
            .and_then(|el| el.boxes.get(&record).copied())
            .ok_or_else(|| WaterfallError::choreography(format!("no box for record {record}")))?;
        let rec = self.data.stats.get(record).ok_or_else(|| {
            WaterfallError::choreography(format!("no record at index {record}"))
        })?;
        self.selection
            .on_hover(&mut self.bus, record, rec, element, true);
        Ok(())
    }

    /// Pointer entered a quintile's net line. Returns whether `net-box-selected` was emitted,
    /// which only happens once the cascade is done.
    pub fn hover_net(&mut self, quintile: u8) -> WaterfallResult<bool> {
        let series = self.initialized()?;
        let s = series.quintile(quintile).ok_or_else(|| {
            WaterfallError::data_validation(format!("quintile {quintile} is outside 1..=5"))
        })?;
        let summary = SeriesSummary::new(
            s,
            &self.data.stats,
            self.measure,
            self.data.quintile_reference(quintile),
        );
        let element = self
            .choreographer
            .elements()
            .and_then(|el| el.nets.get(usize::from(quintile) - 1).copied())
            .ok_or_else(|| WaterfallError::choreography("net lines are not drawn"))?;
        let phase = self.choreographer.phase();
        debug!(quintile, net = summary.active_net(), "net hovered");
        Ok(self
            .selection
            .on_net_hover(&mut self.bus, phase, summary, element))
    }

    pub fn mouse_leave(&mut self) {
        self.selection.mouse_leave(&mut self.bus);
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
