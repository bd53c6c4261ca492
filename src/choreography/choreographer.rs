use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::{
    aggregate::series::{SeriesList, Stack},
    choreography::plan::{Action, BoxPhase, GlobalPhase, PassPlan, RenderMode},
    foundation::{
        config::{Timing, WaterfallConfig},
        core::{Canvas, Millis},
        error::{WaterfallError, WaterfallResult},
    },
    render::renderer::{
        Attr, AttrValue, Renderer, ShapeId, ShapeKind, TransitionEvent, TransitionPhase, TweenId,
    },
    scale::manager::Scales,
};

/// Shapes created by the first render and re-bound by every later one.
#[derive(Clone, Debug)]
pub struct Elements {
    /// Box per record index.
    pub boxes: BTreeMap<usize, ShapeId>,
    /// Connector line per series.
    pub connectors: Vec<ShapeId>,
    /// Net line per series.
    pub nets: Vec<ShapeId>,
    /// The x axis line.
    pub baseline: ShapeId,
    pub value_axis: ShapeId,
    /// Tick slots of the value axis. Grows to the largest tick count seen; unused slots are
    /// faded out.
    pub value_ticks: Vec<TickShapes>,
    /// "Quintile N" label per band, riding under the x axis.
    pub quintile_labels: Vec<ShapeId>,
}

impl Elements {
    fn all(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.boxes
            .values()
            .chain(&self.connectors)
            .chain(&self.nets)
            .copied()
            .chain([self.baseline, self.value_axis])
            .chain(self.value_ticks.iter().flat_map(|t| [t.mark, t.label]))
            .chain(self.quintile_labels.iter().copied())
    }
}

/// Mark and label of one value-axis tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickShapes {
    pub mark: ShapeId,
    pub label: ShapeId,
}

/// Length of a value-axis tick mark, left of the axis.
const TICK_SIZE: f64 = 6.0;
/// Gap between an axis and its labels.
const TICK_PADDING: f64 = 3.0;

impl TickShapes {
    fn create<R: Renderer>(renderer: &mut R, axis_x: f64, y: f64, opacity: f64) -> Self {
        let mark = renderer.create_shape(
            ShapeKind::Line,
            "y-tick",
            &[
                (Attr::X1, AttrValue::Num(axis_x - TICK_SIZE)),
                (Attr::X2, AttrValue::Num(axis_x)),
                (Attr::Y1, AttrValue::Num(y)),
                (Attr::Y2, AttrValue::Num(y)),
                (Attr::Opacity, AttrValue::Num(opacity)),
            ],
        );
        let label = renderer.create_shape(
            ShapeKind::Text,
            "y-tick-label",
            &[
                (Attr::X, AttrValue::Num(axis_x - TICK_SIZE - TICK_PADDING)),
                (Attr::Y, AttrValue::Num(y)),
                (Attr::Opacity, AttrValue::Num(opacity)),
            ],
        );
        Self { mark, label }
    }

    /// Slide to `y` and fade to `opacity` over `duration`.
    fn retarget<R: Renderer>(
        self,
        renderer: &mut R,
        y: f64,
        opacity: f64,
        duration: Millis,
    ) -> WaterfallResult<()> {
        for (id, attr) in [
            (self.mark, Attr::Y1),
            (self.mark, Attr::Y2),
            (self.label, Attr::Y),
        ] {
            renderer.animate_attribute(id, attr, AttrValue::Num(y), duration, Millis::ZERO)?;
        }
        for id in [self.mark, self.label] {
            renderer.animate_attribute(
                id,
                Attr::Opacity,
                AttrValue::Num(opacity),
                duration,
                Millis::ZERO,
            )?;
        }
        Ok(())
    }
}

/// Something the surrounding engine should publish on behalf of the choreography.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Announce { record: usize, element: ShapeId },
}

/// A box reaching a lifecycle point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ProgressEvent {
    pub pass: u64,
    pub at: Millis,
    pub record: usize,
    pub quintile: u8,
    pub phase: BoxPhase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PhaseChange {
    pub pass: u64,
    pub at: Millis,
    pub phase: GlobalPhase,
}

/// Drives box, connector and net-line transitions through a [`Renderer`].
///
/// A pass is planned up front ([`PassPlan`]); lifecycle events pulled from the renderer are fed
/// back through [`Choreographer::dispatch`], which advances the per-box and global phases and
/// releases the dependent animations.
#[derive(Debug)]
pub struct Choreographer {
    timing: Timing,
    canvas: Canvas,
    padding_left: f64,
    elements: Option<Elements>,
    plan: Option<PassPlan>,
    pass: u64,
    phase: GlobalPhase,
    box_phases: Vec<BoxPhase>,
    settled: usize,
    triggers: HashMap<TweenId, (usize, TransitionPhase)>,
    /// Every net-line tween subscribed this pass, by series.
    trails: HashMap<TweenId, usize>,
    /// Most recent net-line tween per series that has not arrived yet.
    trailing: HashMap<usize, TweenId>,
    progress: Vec<ProgressEvent>,
    phases: Vec<PhaseChange>,
}

impl Choreographer {
    pub fn new(config: &WaterfallConfig) -> Self {
        Self {
            timing: config.timing,
            canvas: config.canvas,
            padding_left: config.padding_left,
            elements: None,
            plan: None,
            pass: 0,
            phase: GlobalPhase::Pending,
            box_phases: Vec::new(),
            settled: 0,
            triggers: HashMap::new(),
            trails: HashMap::new(),
            trailing: HashMap::new(),
            progress: Vec::new(),
            phases: Vec::new(),
        }
    }

    pub fn phase(&self) -> GlobalPhase {
        self.phase
    }

    pub fn pass(&self) -> u64 {
        self.pass
    }

    pub fn plan(&self) -> Option<&PassPlan> {
        self.plan.as_ref()
    }

    pub fn elements(&self) -> Option<&Elements> {
        self.elements.as_ref()
    }

    /// Phase of the box drawing `record` in the current pass.
    pub fn box_phase(&self, record: usize) -> Option<BoxPhase> {
        let plan = self.plan.as_ref()?;
        let i = plan.boxes.iter().position(|b| b.record == record)?;
        self.box_phases.get(i).copied()
    }

    pub fn progress(&self) -> &[ProgressEvent] {
        &self.progress
    }

    pub fn phase_changes(&self) -> &[PhaseChange] {
        &self.phases
    }

    /// Lay the boxes out for `series` under `scales` and start moving them.
    ///
    /// The first call creates every element. Later calls first freeze whatever is still moving,
    /// then re-bind the same elements to the new layout.
    pub fn render<R: Renderer>(
        &mut self,
        renderer: &mut R,
        series: &SeriesList,
        scales: &Scales,
        mode: RenderMode,
    ) -> WaterfallResult<()> {
        let plan = PassPlan::build(series, scales, mode, self.timing)?;
        let existing: Option<Vec<ShapeId>> = self.elements.as_ref().map(|el| el.all().collect());
        match existing {
            None => self.create_elements(renderer, &plan, scales)?,
            Some(ids) => {
                for id in ids {
                    renderer.interrupt(id);
                }
                self.rebind_axes(renderer, &plan)?;
            }
        }
        self.schedule(renderer, plan)
    }

    /// Collapse every box to its pre-animation pose and replay the staggered cascade.
    pub fn reset_cascade<R: Renderer>(
        &mut self,
        renderer: &mut R,
        series: &SeriesList,
        scales: &Scales,
    ) -> WaterfallResult<()> {
        let el = self
            .elements
            .clone()
            .ok_or_else(|| WaterfallError::choreography("reset before the first render"))?;
        let plan = PassPlan::build(series, scales, RenderMode::Staggered, self.timing)?;

        for id in el.all() {
            renderer.interrupt(id);
        }

        let snap = |r: &mut R, id: ShapeId, attr: Attr, v: f64| {
            r.animate_attribute(id, attr, AttrValue::Num(v), Millis::ZERO, Millis::ZERO)
        };
        for b in &plan.boxes {
            let id = box_shape(&el, b.record)?;
            let rest_y = match b.stack {
                Stack::Up => plan.baseline_y,
                Stack::Down => plan.series[series_index(b.quintile)].sum_up_y,
            };
            snap(renderer, id, Attr::Height, 0.0)?;
            snap(renderer, id, Attr::Y, rest_y)?;
        }
        for &id in &el.connectors {
            snap(renderer, id, Attr::Opacity, 0.0)?;
        }
        for &id in &el.nets {
            snap(renderer, id, Attr::Y1, plan.baseline_y)?;
            snap(renderer, id, Attr::Y2, plan.baseline_y)?;
        }

        // The collapse tweens above must survive, so the replay does not interrupt again.
        self.rebind_axes(renderer, &plan)?;
        self.schedule(renderer, plan)
    }

    /// Advance the pass with one lifecycle event pulled from the renderer.
    pub fn dispatch<R: Renderer>(
        &mut self,
        renderer: &mut R,
        event: TransitionEvent,
    ) -> WaterfallResult<Vec<Cue>> {
        if let Some(series) = self.trails.remove(&event.tween) {
            if self.trailing.get(&series) == Some(&event.tween) {
                self.trailing.remove(&series);
                self.finish_if_done(event.at);
            }
            return Ok(Vec::new());
        }
        let Some(&(index, phase)) = self.triggers.get(&event.tween) else {
            warn!(tween = event.tween.0, "ignoring event outside the current pass");
            return Ok(Vec::new());
        };
        let (plan, el) = match (&self.plan, &self.elements) {
            (Some(p), Some(e)) => (p, e),
            _ => {
                return Err(WaterfallError::choreography(
                    "transition event before the first render",
                ));
            }
        };
        let layout = &plan.boxes[index];
        let (record, quintile) = (layout.record, layout.quintile);
        let actions: Vec<Action> = plan
            .dependents_of(index, phase)
            .map(|d| d.action)
            .collect();
        let (net_delay, net_duration) = plan.net_line_timing();

        let mut cues = Vec::new();
        let mut trails = Vec::new();
        for action in actions {
            match action {
                Action::TrailNetLine { series, y } => {
                    let id = el.nets[series];
                    let mut last = None;
                    for attr in [Attr::Y1, Attr::Y2] {
                        last = Some(renderer.animate_attribute(
                            id,
                            attr,
                            AttrValue::Num(y),
                            net_duration,
                            net_delay,
                        )?);
                    }
                    if let Some(t) = last {
                        renderer.on_transition_event(t, TransitionPhase::End)?;
                        trails.push((series, t));
                    }
                }
                Action::RevealConnector { series } => {
                    renderer.animate_attribute(
                        el.connectors[series],
                        Attr::Opacity,
                        AttrValue::Num(1.0),
                        self.timing.connector_fade(),
                        Millis::ZERO,
                    )?;
                }
                Action::Announce { record } => cues.push(Cue::Announce {
                    record,
                    element: box_shape(el, record)?,
                }),
            }
        }

        for (series, t) in trails {
            self.trails.insert(t, series);
            self.trailing.insert(series, t);
        }

        let box_phase = match phase {
            TransitionPhase::Start => BoxPhase::Moving,
            TransitionPhase::End => BoxPhase::Settled,
        };
        self.box_phases[index] = box_phase;
        self.progress.push(ProgressEvent {
            pass: self.pass,
            at: event.at,
            record,
            quintile,
            phase: box_phase,
        });

        match phase {
            TransitionPhase::Start if self.phase == GlobalPhase::Pending => {
                self.set_phase(GlobalPhase::Staggering, event.at);
            }
            TransitionPhase::End => {
                self.settled += 1;
                self.finish_if_done(event.at);
            }
            TransitionPhase::Start => {}
        }
        Ok(cues)
    }

    /// A pass is done once every box settled and no net line is still on its way.
    fn finish_if_done(&mut self, at: Millis) {
        if self.phase == GlobalPhase::Done
            || self.settled < self.box_phases.len()
            || !self.trailing.is_empty()
        {
            return;
        }
        self.set_phase(GlobalPhase::Done, at);
        info!(pass = self.pass, at = at.0, "cascade done");
    }

    fn set_phase(&mut self, phase: GlobalPhase, at: Millis) {
        self.phase = phase;
        self.phases.push(PhaseChange {
            pass: self.pass,
            at,
            phase,
        });
    }

    fn create_elements<R: Renderer>(
        &mut self,
        renderer: &mut R,
        plan: &PassPlan,
        scales: &Scales,
    ) -> WaterfallResult<()> {
        let mut boxes = BTreeMap::new();
        for b in &plan.boxes {
            let rest_y = match b.stack {
                Stack::Up => plan.baseline_y,
                Stack::Down => plan.series[series_index(b.quintile)].sum_up_y,
            };
            let id = renderer.create_shape(
                ShapeKind::Rect,
                "stacked-box",
                &[
                    (Attr::X, b.bounds.x0.into()),
                    (Attr::Y, rest_y.into()),
                    (Attr::Width, b.bounds.width().into()),
                    (Attr::Height, AttrValue::Num(0.0)),
                    (Attr::Fill, b.fill.into()),
                    (Attr::Stroke, b.stroke.into()),
                ],
            );
            boxes.insert(b.record, id);
        }

        let connectors = plan
            .series
            .iter()
            .map(|s| {
                renderer.create_shape(
                    ShapeKind::Line,
                    "waterfall-connector",
                    &[
                        (Attr::X1, s.connector_x.0.into()),
                        (Attr::X2, s.connector_x.1.into()),
                        (Attr::Y1, s.sum_up_y.into()),
                        (Attr::Y2, s.sum_up_y.into()),
                        (Attr::Opacity, AttrValue::Num(0.0)),
                    ],
                )
            })
            .collect();
        let nets = plan
            .series
            .iter()
            .map(|s| {
                renderer.create_shape(
                    ShapeKind::Line,
                    "waterfall-net",
                    &[
                        (Attr::X1, s.net_x.0.into()),
                        (Attr::X2, s.net_x.1.into()),
                        (Attr::Y1, plan.baseline_y.into()),
                        (Attr::Y2, plan.baseline_y.into()),
                    ],
                )
            })
            .collect();

        let baseline = renderer.create_shape(
            ShapeKind::Line,
            "x-axis",
            &[
                (Attr::X1, self.padding_left.into()),
                (Attr::X2, self.canvas.width.into()),
                (Attr::Y1, plan.baseline_y.into()),
                (Attr::Y2, plan.baseline_y.into()),
            ],
        );
        let (bottom, top) = match scales.y.range() {
            [b, .., t] => (*b, *t),
            _ => (self.canvas.height, 0.0),
        };
        let value_axis = renderer.create_shape(
            ShapeKind::Line,
            "y-axis",
            &[
                (Attr::X1, self.padding_left.into()),
                (Attr::X2, self.padding_left.into()),
                (Attr::Y1, bottom.into()),
                (Attr::Y2, top.into()),
            ],
        );

        let mut value_ticks = Vec::with_capacity(plan.value_ticks.len());
        for tick in &plan.value_ticks {
            let shapes = TickShapes::create(renderer, self.padding_left, tick.y, 1.0);
            renderer.set_text(shapes.label, &tick.label)?;
            value_ticks.push(shapes);
        }
        let mut quintile_labels = Vec::with_capacity(plan.quintile_labels.len());
        for q in &plan.quintile_labels {
            let id = renderer.create_shape(
                ShapeKind::Text,
                "quintile-label",
                &[
                    (Attr::X, q.x.into()),
                    (Attr::Y, (plan.baseline_y + TICK_SIZE + TICK_PADDING).into()),
                ],
            );
            renderer.set_text(id, &q.text)?;
            quintile_labels.push(id);
        }

        debug!(
            boxes = boxes.len(),
            ticks = value_ticks.len(),
            "elements created"
        );
        self.elements = Some(Elements {
            boxes,
            connectors,
            nets,
            baseline,
            value_axis,
            value_ticks,
            quintile_labels,
        });
        Ok(())
    }

    /// Move the x axis and its labels to the new zero, the value-axis ticks to the new scale
    /// and the connectors to the new `sum_up`.
    fn rebind_axes<R: Renderer>(
        &mut self,
        renderer: &mut R,
        plan: &PassPlan,
    ) -> WaterfallResult<()> {
        let axis = self.timing.axis_transition();
        let box_animate = self.timing.box_animate();
        let axis_x = self.padding_left;
        let Some(el) = self.elements.as_mut() else {
            return Ok(());
        };

        for attr in [Attr::Y1, Attr::Y2] {
            renderer.animate_attribute(
                el.baseline,
                attr,
                plan.baseline_y.into(),
                axis,
                Millis::ZERO,
            )?;
        }
        let label_y = plan.baseline_y + TICK_SIZE + TICK_PADDING;
        for &id in &el.quintile_labels {
            renderer.animate_attribute(id, Attr::Y, label_y.into(), axis, Millis::ZERO)?;
        }

        // New slots appear in place and fade in with the rest.
        while el.value_ticks.len() < plan.value_ticks.len() {
            let y = plan.value_ticks[el.value_ticks.len()].y;
            el.value_ticks
                .push(TickShapes::create(renderer, axis_x, y, 0.0));
        }
        for (i, shapes) in el.value_ticks.iter().copied().enumerate() {
            match plan.value_ticks.get(i) {
                Some(tick) => {
                    renderer.set_text(shapes.label, &tick.label)?;
                    shapes.retarget(renderer, tick.y, 1.0, axis)?;
                }
                None => {
                    let y = plan.value_ticks.last().map_or(plan.baseline_y, |t| t.y);
                    shapes.retarget(renderer, y, 0.0, axis)?;
                }
            }
        }

        for (s, &id) in plan.series.iter().zip(&el.connectors) {
            for attr in [Attr::Y1, Attr::Y2] {
                renderer.animate_attribute(
                    id,
                    attr,
                    s.sum_up_y.into(),
                    box_animate,
                    Millis::ZERO,
                )?;
            }
        }
        Ok(())
    }

    fn schedule<R: Renderer>(&mut self, renderer: &mut R, plan: PassPlan) -> WaterfallResult<()> {
        let el = self
            .elements
            .as_ref()
            .ok_or_else(|| WaterfallError::choreography("schedule before elements exist"))?;

        let mut triggers = HashMap::with_capacity(plan.boxes.len() * 2);
        let duration = self.timing.box_animate();
        for (i, b) in plan.boxes.iter().enumerate() {
            let id = box_shape(el, b.record)?;
            let delay = plan.box_delay(b.order);
            let steps: [(Attr, AttrValue); 6] = [
                (Attr::Y, b.bounds.y0.into()),
                (Attr::Height, b.bounds.height().into()),
                (Attr::X, b.bounds.x0.into()),
                (Attr::Width, b.bounds.width().into()),
                (Attr::Fill, b.fill.into()),
                (Attr::Stroke, b.stroke.into()),
            ];
            let mut first = None;
            let mut last = None;
            for (attr, value) in steps {
                let t = renderer.animate_attribute(id, attr, value, duration, delay)?;
                first.get_or_insert(t);
                last = Some(t);
            }
            if let (Some(first), Some(last)) = (first, last) {
                renderer.on_transition_event(first, TransitionPhase::Start)?;
                renderer.on_transition_event(last, TransitionPhase::End)?;
                triggers.insert(first, (i, TransitionPhase::Start));
                triggers.insert(last, (i, TransitionPhase::End));
            }
        }

        self.pass += 1;
        self.triggers = triggers;
        self.trails.clear();
        self.trailing.clear();
        self.box_phases = vec![BoxPhase::Waiting; plan.boxes.len()];
        self.settled = 0;
        let now = renderer.now();
        self.set_phase(GlobalPhase::Pending, now);
        debug!(
            pass = self.pass,
            mode = ?plan.mode,
            boxes = plan.boxes.len(),
            "pass scheduled"
        );
        if plan.boxes.is_empty() {
            self.set_phase(GlobalPhase::Done, now);
        }
        self.plan = Some(plan);
        Ok(())
    }
}

fn series_index(quintile: u8) -> usize {
    usize::from(quintile).saturating_sub(1)
}

fn box_shape(el: &Elements, record: usize) -> WaterfallResult<ShapeId> {
    el.boxes
        .get(&record)
        .copied()
        .ok_or_else(|| WaterfallError::choreography(format!("no box drawn for record {record}")))
}

#[cfg(test)]
#[path = "../../tests/unit/choreography/choreographer.rs"]
mod tests;
