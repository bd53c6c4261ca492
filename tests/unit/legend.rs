use super::*;
use crate::{
    animation::ease::Ease,
    render::scene::{Scene, Shape},
};

fn color_scale(domain: [f64; 3]) -> ColorScale {
    LinearScale::new(
        ScaleId(3),
        domain.to_vec(),
        WaterfallConfig::default().palette.fill_stops().to_vec(),
    )
    .unwrap()
}

fn event(domain: [f64; 3], measure: Measure) -> ChartEvent {
    ChartEvent::NewColorScale {
        scale_id: ScaleId(3),
        measure,
        scale: color_scale(domain),
    }
}

#[test]
fn swatches_sample_interval_midpoints() {
    let mut legend = Legend::new(&WaterfallConfig::default());
    assert!(legend.handle(&event([-5.0, 0.0, 10.0], Measure::JobGrowth)).unwrap());

    let scale = color_scale([-5.0, 0.0, 10.0]);
    let sw = legend.swatches();
    assert_eq!(sw.len(), 10);
    assert_eq!(sw[0].x, 0.0);
    assert_eq!(sw[0].width, 10.0);
    assert_eq!(sw[0].fill, scale.map(-4.25));
    assert!((sw[9].value - 8.5).abs() < 1e-9);
    assert!((sw[9].x - 90.0).abs() < 1e-9);
}

#[test]
fn axis_has_min_zero_max_with_blank_zero() {
    let mut legend = Legend::new(&WaterfallConfig::default());
    legend
        .handle(&event([-5.0, 0.0, 10.0], Measure::JobGrowth))
        .unwrap();
    let labels: Vec<&str> = legend.ticks().iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["-5", "", "10"]);
    let xs: Vec<f64> = legend.ticks().iter().map(|t| t.x).collect();
    assert_eq!(xs[0], 0.0);
    assert!((xs[1] - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(xs[2], 100.0);
    assert!(legend.has_zero());
}

#[test]
fn title_and_identity_follow_the_event() {
    let mut legend = Legend::new(&WaterfallConfig::default());
    legend
        .handle(&event([0.0, 0.0, 4.0], Measure::AvgWageGrowth))
        .unwrap();
    assert_eq!(legend.title(), Measure::AvgWageGrowth.display_name());
    assert_eq!(legend.scale_id(), Some(ScaleId(3)));
    assert!(!legend.has_zero());
}

#[test]
fn first_draw_is_immediate_and_later_ones_transition() {
    let mut legend = Legend::new(&WaterfallConfig::default());
    legend
        .handle(&event([-1.0, 0.0, 1.0], Measure::JobGrowth))
        .unwrap();
    assert_eq!(legend.transition(), Millis::ZERO);
    legend
        .handle(&event([-2.0, 0.0, 1.0], Measure::AvgWageGrowth))
        .unwrap();
    assert_eq!(legend.transition(), Millis(500));
    assert_eq!(legend.revision(), 2);
}

#[test]
fn other_events_are_ignored() {
    let mut legend = Legend::new(&WaterfallConfig::default());
    assert!(!legend.handle(&ChartEvent::SelectionCleared).unwrap());
    assert_eq!(legend.revision(), 0);
}

fn scene() -> Scene {
    Scene::new(WaterfallConfig::default().canvas, Ease::Linear)
}

fn of_class<'a>(scene: &'a Scene, class: &str) -> Vec<&'a Shape> {
    scene.shapes().iter().filter(|s| s.class == class).collect()
}

fn attr(scene: &Scene, shape: &Shape, attr: Attr) -> AttrValue {
    scene.current_attrs(shape.id)[&attr]
}

#[test]
fn first_draw_places_the_legend_in_the_top_right_corner() {
    let mut legend = Legend::new(&WaterfallConfig::default());
    legend
        .handle(&event([-5.0, 0.0, 10.0], Measure::JobGrowth))
        .unwrap();
    let mut scene = scene();
    legend.draw(&mut scene).unwrap();

    assert_eq!(legend.origin(), (1090.0, 10.0));
    assert!(!scene.is_animating());
    let title = of_class(&scene, "legend-title");
    assert_eq!(title[0].text(), Some(Measure::JobGrowth.display_name()));

    let swatches = of_class(&scene, "legend-swatch");
    assert_eq!(swatches.len(), 10);
    assert_eq!(attr(&scene, swatches[0], Attr::X), AttrValue::Num(1090.0));
    assert_eq!(attr(&scene, swatches[0], Attr::Y), AttrValue::Num(25.0));
    assert_eq!(
        attr(&scene, swatches[0], Attr::Fill),
        AttrValue::Color(legend.swatches()[0].fill)
    );

    let labels: Vec<_> = of_class(&scene, "legend-tick-label")
        .iter()
        .map(|s| s.text().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(labels, vec!["-5", "", "10"]);
    for mark in of_class(&scene, "legend-tick") {
        assert_eq!(attr(&scene, mark, Attr::Opacity), AttrValue::Num(1.0));
    }
}

#[test]
fn redraws_animate_over_the_legend_transition() {
    let mut legend = Legend::new(&WaterfallConfig::default());
    legend
        .handle(&event([-1.0, 0.0, 1.0], Measure::JobGrowth))
        .unwrap();
    let mut scene = scene();
    legend.draw(&mut scene).unwrap();
    let before = legend.swatches()[0].fill;

    legend
        .handle(&event([0.0, 0.0, 4.0], Measure::AvgWageGrowth))
        .unwrap();
    legend.draw(&mut scene).unwrap();
    let after = legend.swatches()[0].fill;
    assert_ne!(before, after);

    let title = of_class(&scene, "legend-title")[0].id;
    assert_eq!(
        scene.shapes()[title.0 as usize].text(),
        Some(Measure::AvgWageGrowth.display_name())
    );
    let swatch = of_class(&scene, "legend-swatch")[0].id;
    assert_eq!(scene.current_attrs(swatch)[&Attr::Fill], AttrValue::Color(before));

    scene.advance_to(Millis(250));
    assert!(scene.is_animating());
    let marks: Vec<ShapeId> = of_class(&scene, "legend-tick").iter().map(|s| s.id).collect();
    assert_eq!(scene.current_attrs(marks[2])[&Attr::X1], AttrValue::Num(1190.0));

    scene.advance_to(legend.transition());
    assert!(!scene.is_animating());
    assert_eq!(scene.current_attrs(swatch)[&Attr::Fill], AttrValue::Color(after));
    // Without a zero crossing the min and zero ticks sit at the left edge, hidden.
    assert_eq!(scene.current_attrs(marks[0])[&Attr::X1], AttrValue::Num(1090.0));
    assert_eq!(scene.current_attrs(marks[1])[&Attr::Opacity], AttrValue::Num(0.0));
    assert_eq!(scene.current_attrs(marks[2])[&Attr::Opacity], AttrValue::Num(1.0));
}
