use std::{collections::BTreeMap, fmt::Write as _};

use crate::{
    legend::LEGEND_CLASS_PREFIX,
    render::{
        renderer::{Attr, AttrValue, ShapeKind},
        scene::Scene,
    },
};

fn num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "" | "-0" => "0".to_owned(),
        s => s.to_owned(),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn line_style(class: &str) -> (&'static str, f64) {
    match class {
        "waterfall-net" => ("#222222", 2.0),
        "waterfall-connector" => ("#888888", 1.0),
        "y-tick" | "legend-tick" => ("#444444", 1.0),
        _ => ("#000000", 1.0),
    }
}

/// Anchor, baseline shift and font size per text class.
fn text_style(class: &str) -> (&'static str, &'static str, u32) {
    match class {
        "y-tick-label" => ("end", "0.32em", 10),
        "quintile-label" => ("middle", "0.71em", 10),
        "legend-title" => ("middle", "0", 11),
        "legend-tick-label" => ("middle", "0.71em", 9),
        _ => ("start", "0", 10),
    }
}

fn write_attrs(tag: &mut String, attrs: &BTreeMap<Attr, AttrValue>) {
    for (attr, value) in attrs {
        let rendered = match value {
            AttrValue::Num(v) => num(*v),
            AttrValue::Color(c) => c.to_string(),
        };
        let _ = write!(tag, r#" {}="{rendered}""#, attr.name());
    }
}

/// Serialize the scene, sampled at its current clock, as a standalone SVG document.
///
/// Legend shapes are left out unless `include_legend` is set.
pub fn scene_to_svg(scene: &Scene, include_legend: bool) -> String {
    let canvas = scene.canvas();
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = num(canvas.width),
        h = num(canvas.height),
    );
    let _ = writeln!(
        out,
        r##"  <rect width="100%" height="100%" fill="#ffffff"/>"##
    );

    for shape in scene.shapes() {
        if !include_legend && shape.class.starts_with(LEGEND_CLASS_PREFIX) {
            continue;
        }
        let attrs = scene.current_attrs(shape.id);
        let class = escape(&shape.class);
        let mut tag = match shape.kind {
            ShapeKind::Rect => format!(r#"  <rect class="{class}""#),
            ShapeKind::Line => {
                let (stroke, width) = line_style(&shape.class);
                format!(
                    r#"  <line class="{class}" stroke="{stroke}" stroke-width="{}""#,
                    num(width)
                )
            }
            ShapeKind::Text => {
                let text = shape.text().unwrap_or_default();
                if text.is_empty() {
                    continue;
                }
                let (anchor, dy, size) = text_style(&shape.class);
                let mut tag = format!(
                    r#"  <text class="{class}" text-anchor="{anchor}" dy="{dy}" font-family="sans-serif" font-size="{size}""#
                );
                write_attrs(&mut tag, &attrs);
                let _ = writeln!(out, "{tag}>{}</text>", escape(text));
                continue;
            }
        };
        write_attrs(&mut tag, &attrs);
        if shape.kind == ShapeKind::Rect && attrs.contains_key(&Attr::Stroke) {
            tag.push_str(r#" stroke-width="1" shape-rendering="crispEdges""#);
        }
        tag.push_str("/>");
        let _ = writeln!(out, "{tag}");
    }

    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
