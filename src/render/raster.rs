use std::sync::Arc;

use crate::foundation::error::{WaterfallError, WaterfallResult};

/// Largest raster edge we are willing to allocate.
const MAX_DIM: u32 = 16_384;

/// Straight (non-premultiplied) RGBA8 pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

fn svg_options() -> usvg::Options<'static> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    usvg::Options {
        fontdb: Arc::new(db),
        ..Default::default()
    }
}

/// Rasterize an SVG document at `scale` times its intrinsic size.
pub fn rasterize(svg: &str, scale: f32) -> WaterfallResult<Frame> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(WaterfallError::render("raster scale must be finite and > 0"));
    }
    let tree = usvg::Tree::from_str(svg, &svg_options())
        .map_err(|e| WaterfallError::render(format!("parse svg: {e}")))?;

    let size = tree.size();
    let to_px = |v: f32| -> WaterfallResult<u32> {
        let px = (v * scale).ceil();
        if !(px.is_finite() && px >= 1.0) {
            return Err(WaterfallError::render("svg has invalid width/height"));
        }
        Ok(px as u32)
    };
    let (width, height) = (to_px(size.width())?, to_px(size.height())?);
    if width > MAX_DIM || height > MAX_DIM {
        return Err(WaterfallError::render(format!(
            "raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| WaterfallError::render("failed to allocate pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Ok(Frame {
        width,
        height,
        data,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
