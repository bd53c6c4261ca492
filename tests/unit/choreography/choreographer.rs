use super::*;
use crate::{
    aggregate::series::aggregate,
    animation::ease::Ease,
    data::{measure::Measure, record::Record},
    render::scene::Scene,
    scale::manager::ScaleManager,
};

struct Rig {
    records: Vec<Record>,
    scene: Scene,
    scales: ScaleManager,
    ch: Choreographer,
}

impl Rig {
    fn new(records: Vec<Record>) -> Self {
        let cfg = WaterfallConfig::default();
        Self {
            scene: Scene::new(cfg.canvas, Ease::Linear),
            scales: ScaleManager::new(&cfg),
            ch: Choreographer::new(&cfg),
            records,
        }
    }

    fn inputs(&mut self, measure: Measure) -> (SeriesList, Scales) {
        let series = aggregate(&self.records, measure).unwrap();
        let scales = self
            .scales
            .compute_scales(&series, &self.records, measure)
            .unwrap()
            .clone();
        (series, scales)
    }

    fn render(&mut self, measure: Measure, mode: RenderMode) {
        let (series, scales) = self.inputs(measure);
        self.ch
            .render(&mut self.scene, &series, &scales, mode)
            .unwrap();
    }

    fn drain(&mut self, until: Millis) -> Vec<Cue> {
        let mut cues = Vec::new();
        while let Some(ev) = self.scene.next_transition_event(until) {
            cues.extend(self.ch.dispatch(&mut self.scene, ev).unwrap());
        }
        cues
    }

    fn num(&self, id: ShapeId, attr: Attr) -> f64 {
        self.scene.attribute(id, attr).and_then(AttrValue::as_num).unwrap()
    }
}

fn abc() -> Vec<Record> {
    vec![
        Record::new("A", 1, 10.0).with_avg_wage_growth(-8.0),
        Record::new("B", 1, -5.0).with_avg_wage_growth(2.0),
        Record::new("C", 2, 3.0).with_avg_wage_growth(4.0),
    ]
}

fn moving(progress: &[ProgressEvent]) -> Vec<(usize, Millis)> {
    progress
        .iter()
        .filter(|p| p.phase == BoxPhase::Moving)
        .map(|p| (p.record, p.at))
        .collect()
}

#[test]
fn staggered_pass_moves_boxes_one_after_another() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    assert_eq!(rig.ch.phase(), GlobalPhase::Pending);
    rig.drain(Millis::MAX);

    assert_eq!(
        moving(rig.ch.progress()),
        vec![(0, Millis(0)), (1, Millis(600)), (2, Millis(1200))]
    );
    let phases: Vec<(GlobalPhase, Millis)> =
        rig.ch.phase_changes().iter().map(|p| (p.phase, p.at)).collect();
    assert_eq!(
        phases,
        vec![
            (GlobalPhase::Pending, Millis(0)),
            (GlobalPhase::Staggering, Millis(0)),
            (GlobalPhase::Done, Millis(2100)),
        ]
    );
    assert!(!rig.scene.is_animating());
}

#[test]
fn done_is_never_reached_while_a_box_is_still_moving() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    rig.drain(Millis(1999));
    assert_eq!(rig.ch.phase(), GlobalPhase::Staggering);
    assert_eq!(rig.ch.box_phase(0), Some(BoxPhase::Settled));
    assert_eq!(rig.ch.box_phase(2), Some(BoxPhase::Moving));
    rig.drain(Millis::MAX);
    assert_eq!(rig.ch.phase(), GlobalPhase::Done);
}

#[test]
fn cascade_order_ignores_input_order() {
    let mut rig = Rig::new(vec![
        Record::new("C", 2, 3.0),
        Record::new("B", 1, -5.0),
        Record::new("A", 1, 10.0),
    ]);
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    rig.drain(Millis::MAX);
    assert_eq!(
        moving(rig.ch.progress()),
        vec![(2, Millis(0)), (1, Millis(600)), (0, Millis(1200))]
    );
}

#[test]
fn done_waits_for_the_last_net_line() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    rig.drain(Millis(2000));
    assert!((0..3).all(|r| rig.ch.box_phase(r) == Some(BoxPhase::Settled)));
    assert_eq!(rig.ch.phase(), GlobalPhase::Staggering);
    assert!(rig.scene.is_animating());

    rig.drain(Millis::MAX);
    assert_eq!(rig.ch.phase(), GlobalPhase::Done);
    assert_eq!(rig.ch.phase_changes().last().unwrap().at, Millis(2100));
    assert!(!rig.scene.is_animating());
    let plan = rig.ch.plan().unwrap().clone();
    let net = rig.ch.elements().unwrap().nets[1];
    assert_eq!(rig.num(net, Attr::Y1), plan.boxes[2].leading_edge());
}

#[test]
fn axes_are_drawn_with_ticks_and_quintile_labels() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    let el = rig.ch.elements().unwrap().clone();
    let plan = rig.ch.plan().unwrap().clone();

    assert_eq!(el.value_ticks.len(), 11);
    let top = el.value_ticks[10];
    assert_eq!(rig.scene.shapes()[top.label.0 as usize].text(), Some("10"));
    assert_eq!(rig.num(top.mark, Attr::Y1), plan.value_ticks[10].y);

    let texts: Vec<&str> = el
        .quintile_labels
        .iter()
        .filter_map(|id| rig.scene.shapes()[id.0 as usize].text())
        .collect();
    assert_eq!(texts[0], "Quintile 1");
    assert_eq!(texts.len(), 5);
}

#[test]
fn value_ticks_follow_a_measure_change() {
    let mut rig = Rig::new(vec![Record::new("A", 1, 10.0).with_avg_wage_growth(4.0)]);
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    rig.drain(Millis::MAX);

    rig.render(Measure::AvgWageGrowth, RenderMode::Instant);
    let t0 = rig.scene.now();
    let el = rig.ch.elements().unwrap().clone();
    // Labels switch at once; positions glide over the axis transition.
    let slot = el.value_ticks[1];
    assert_eq!(rig.scene.shapes()[slot.label.0 as usize].text(), Some("0.5"));
    let before = rig.num(slot.label, Attr::Y);
    rig.drain(t0.saturating_add(Millis(250)));
    rig.scene.advance_to(t0.saturating_add(Millis(250)));
    let halfway = rig.num(slot.label, Attr::Y);

    rig.drain(Millis::MAX);
    let (_, scales) = rig.inputs(Measure::AvgWageGrowth);
    let target = scales.y.map(0.5);
    assert_eq!(rig.num(slot.label, Attr::Y), target);
    assert!((halfway - before) * (halfway - target) < 0.0);

    // Zero to four in halves needs nine slots; the two left over fade out.
    assert_eq!(el.value_ticks.len(), 11);
    let opacity: Vec<f64> = el
        .value_ticks
        .iter()
        .map(|t| rig.num(t.mark, Attr::Opacity))
        .collect();
    assert!(opacity[..9].iter().all(|&o| o == 1.0));
    assert_eq!(&opacity[9..], &[0.0, 0.0]);
    let q1 = el.quintile_labels[0];
    assert!((rig.num(q1, Attr::Y) - (scales.y_zero() + 9.0)).abs() < 1e-9);
}

#[test]
fn settled_pass_matches_the_plan() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    rig.drain(Millis::MAX);

    let plan = rig.ch.plan().unwrap().clone();
    let el = rig.ch.elements().unwrap().clone();
    for b in &plan.boxes {
        let id = el.boxes[&b.record];
        assert_eq!(rig.num(id, Attr::Y), b.bounds.y0);
        assert_eq!(rig.num(id, Attr::Height), b.bounds.height());
        assert_eq!(rig.scene.attribute(id, Attr::Fill), Some(b.fill.into()));
    }

    // Connectors appear only where an up stack exists.
    let opacity: Vec<f64> = el.connectors.iter().map(|&c| rig.num(c, Attr::Opacity)).collect();
    assert_eq!(opacity, vec![1.0, 1.0, 0.0, 0.0, 0.0]);

    // Net lines rest on the last box's leading edge.
    assert_eq!(rig.num(el.nets[0], Attr::Y1), plan.boxes[1].leading_edge());
    assert_eq!(rig.num(el.nets[1], Attr::Y2), plan.boxes[2].leading_edge());
    assert_eq!(rig.num(el.nets[3], Attr::Y1), plan.baseline_y);
}

#[test]
fn staggered_passes_announce_each_box_as_it_starts() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    let cues = rig.drain(Millis::MAX);
    let records: Vec<usize> = cues
        .iter()
        .map(|c| match c {
            Cue::Announce { record, .. } => *record,
        })
        .collect();
    assert_eq!(records, vec![0, 1, 2]);
}

#[test]
fn instant_pass_moves_everything_together_and_silently() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    rig.drain(Millis::MAX);
    let t0 = rig.scene.now();

    rig.render(Measure::AvgWageGrowth, RenderMode::Instant);
    let cues = rig.drain(Millis::MAX);
    assert!(cues.is_empty());

    let second: Vec<&ProgressEvent> = rig.ch.progress().iter().filter(|p| p.pass == 2).collect();
    assert!(
        second
            .iter()
            .filter(|p| p.phase == BoxPhase::Moving)
            .all(|p| p.at == t0)
    );
    assert_eq!(rig.ch.phase(), GlobalPhase::Done);
    assert_eq!(rig.ch.phase_changes().last().unwrap().at, t0.saturating_add(Millis(800)));

    // A flipped from up to down and its box followed it into the down column.
    let plan = rig.ch.plan().unwrap().clone();
    let a = plan.boxes.iter().find(|b| b.record == 0).unwrap();
    assert_eq!(a.stack, Stack::Down);
    let id = rig.ch.elements().unwrap().boxes[&0];
    assert_eq!(rig.num(id, Attr::X), a.bounds.x0);
}

#[test]
fn a_new_pass_freezes_the_previous_one() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    rig.drain(Millis(700));
    assert_eq!(rig.ch.phase(), GlobalPhase::Staggering);

    rig.render(Measure::JobGrowth, RenderMode::Instant);
    rig.drain(Millis::MAX);

    let done: Vec<u64> = rig
        .ch
        .phase_changes()
        .iter()
        .filter(|p| p.phase == GlobalPhase::Done)
        .map(|p| p.pass)
        .collect();
    assert_eq!(done, vec![2]);
}

#[test]
fn reset_replays_to_the_same_final_pose() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    rig.drain(Millis::MAX);
    let el = rig.ch.elements().unwrap().clone();
    let before: Vec<_> = el.all().map(|id| rig.scene.current_attrs(id)).collect();

    let (series, scales) = rig.inputs(Measure::JobGrowth);
    rig.ch
        .reset_cascade(&mut rig.scene, &series, &scales)
        .unwrap();
    let start = rig.scene.now();

    // Right after the collapse the first box sits flat on zero and connectors are hidden.
    let mut cues = rig.drain(start);
    let a = el.boxes[&0];
    assert_eq!(rig.num(a, Attr::Height), 0.0);
    assert_eq!(rig.num(el.connectors[0], Attr::Opacity), 0.0);

    cues.extend(rig.drain(Millis::MAX));
    assert_eq!(cues.len(), 3);
    let after: Vec<_> = el.all().map(|id| rig.scene.current_attrs(id)).collect();
    assert_eq!(before, after);
    assert_eq!(rig.ch.phase(), GlobalPhase::Done);
}

#[test]
fn down_boxes_collapse_onto_the_series_sum_up() {
    let mut rig = Rig::new(abc());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    rig.drain(Millis::MAX);
    let (series, scales) = rig.inputs(Measure::JobGrowth);
    rig.ch
        .reset_cascade(&mut rig.scene, &series, &scales)
        .unwrap();
    let now = rig.scene.now();
    rig.drain(now);
    let b = rig.ch.elements().unwrap().boxes[&1];
    assert_eq!(rig.num(b, Attr::Y), scales.y.map(10.0));
    assert_eq!(rig.num(b, Attr::Height), 0.0);
}

#[test]
fn empty_pass_is_done_immediately() {
    let mut rig = Rig::new(Vec::new());
    rig.render(Measure::JobGrowth, RenderMode::Staggered);
    assert_eq!(rig.ch.phase(), GlobalPhase::Done);
    assert!(rig.drain(Millis::MAX).is_empty());
}

#[test]
fn reset_before_render_is_an_error() {
    let mut rig = Rig::new(abc());
    let (series, scales) = rig.inputs(Measure::JobGrowth);
    let err = rig
        .ch
        .reset_cascade(&mut rig.scene, &series, &scales)
        .unwrap_err();
    assert!(matches!(err, WaterfallError::Choreography(_)));
}
