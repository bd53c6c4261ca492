use std::path::Path;

use crate::{
    animation::ease::Ease,
    foundation::core::{Canvas, Millis, Rgb8},
    foundation::error::{WaterfallError, WaterfallResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Chart geometry, timing and palette.
///
/// Every field has a default, so a config file only needs to name what it overrides:
///
/// ```json
/// { "timing": { "box_throughput_ms": 300 }, "ease": "linear" }
/// ```
pub struct WaterfallConfig {
    /// Fixed drawing surface for the waterfall itself (the legend is laid out separately).
    pub canvas: Canvas,
    /// Space reserved left of the first quintile band for the y axis.
    pub padding_left: f64,
    /// Space reserved below the plot for the x axis.
    pub padding_bottom: f64,
    /// Transition durations and cascade throughput.
    pub timing: Timing,
    /// Easing used by every transition.
    pub ease: Ease,
    /// Diverging fill and border colors.
    pub palette: Palette,
    /// Color legend layout.
    pub legend: LegendConfig,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1200.0,
                height: 400.0 * 5.0 / 6.0,
            },
            padding_left: 60.0,
            padding_bottom: 30.0,
            timing: Timing::default(),
            ease: Ease::default(),
            palette: Palette::default(),
            legend: LegendConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Transition timing, in milliseconds.
pub struct Timing {
    /// How long one box takes to tween into place.
    pub box_animate_ms: u64,
    /// Pause between one box starting to move and the next.
    pub box_throughput_ms: u64,
    pub connector_fade_ms: u64,
    pub axis_transition_ms: u64,
    pub legend_transition_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            box_animate_ms: 800,
            box_throughput_ms: 600,
            connector_fade_ms: 250,
            axis_transition_ms: 500,
            legend_transition_ms: 500,
        }
    }
}

impl Timing {
    pub fn box_animate(self) -> Millis {
        Millis(self.box_animate_ms)
    }

    pub fn box_throughput(self) -> Millis {
        Millis(self.box_throughput_ms)
    }

    pub fn connector_fade(self) -> Millis {
        Millis(self.connector_fade_ms)
    }

    pub fn axis_transition(self) -> Millis {
        Millis(self.axis_transition_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Control colors for the fill and border scales, low / zero / high.
pub struct Palette {
    pub negative: Rgb8,
    pub neutral: Rgb8,
    pub positive: Rgb8,
    pub border_negative: Rgb8,
    pub border_neutral: Rgb8,
    pub border_positive: Rgb8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            negative: Rgb8::new(0xfc, 0x8d, 0x59),
            neutral: Rgb8::new(0xff, 0xff, 0xbf),
            positive: Rgb8::new(0x91, 0xbf, 0xdb),
            border_negative: Rgb8::new(0xfb, 0x6b, 0x27),
            border_neutral: Rgb8::new(0xff, 0xec, 0x8c),
            border_positive: Rgb8::new(0x6b, 0xa9, 0xce),
        }
    }
}

impl Palette {
    pub fn fill_stops(&self) -> [Rgb8; 3] {
        [self.negative, self.neutral, self.positive]
    }

    pub fn border_stops(&self) -> [Rgb8; 3] {
        [self.border_negative, self.border_neutral, self.border_positive]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    pub width: f64,
    pub height: f64,
    /// Number of equal color intervals in the gradient strip.
    pub intervals: usize,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 40.0,
            intervals: 10,
        }
    }
}

impl WaterfallConfig {
    pub fn from_json_str(s: &str) -> WaterfallResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| WaterfallError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_path(path: &Path) -> WaterfallResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            WaterfallError::config(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> WaterfallResult<()> {
        self.canvas.validate()?;
        for (name, v) in [
            ("padding_left", self.padding_left),
            ("padding_bottom", self.padding_bottom),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(WaterfallError::config(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if self.padding_left >= self.canvas.width {
            return Err(WaterfallError::config(
                "padding_left must leave room for the quintile bands",
            ));
        }
        if self.padding_bottom >= self.canvas.height {
            return Err(WaterfallError::config(
                "padding_bottom must leave room for the value axis",
            ));
        }
        if self.timing.box_animate_ms == 0 {
            return Err(WaterfallError::config("timing.box_animate_ms must be > 0"));
        }
        if self.legend.intervals == 0 {
            return Err(WaterfallError::config("legend.intervals must be > 0"));
        }
        if !(self.legend.width.is_finite() && self.legend.width > 0.0) {
            return Err(WaterfallError::config("legend.width must be finite and > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
