use crate::foundation::core::Millis;

/// Timing curve of a transition. Matches the polynomial families used for chart transitions:
/// `in` accelerates, `out` decelerates, `in-out` does both around the midpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    /// Default for box, line and axis transitions.
    #[default]
    InOutCubic,
}

impl Ease {
    pub const ALL: [Ease; 7] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ];

    /// Eased value of normalized progress `t`, clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t.powi(2),
            Self::OutQuad => mirror(t, 2),
            Self::InOutQuad => in_out(t, 2),
            Self::InCubic => t.powi(3),
            Self::OutCubic => mirror(t, 3),
            Self::InOutCubic => in_out(t, 3),
        }
    }

    /// Eased progress `elapsed` into a transition lasting `duration`.
    ///
    /// A zero-length transition is complete as soon as it starts.
    pub fn progress(self, elapsed: Millis, duration: Millis) -> f64 {
        if duration == Millis::ZERO {
            return 1.0;
        }
        self.apply(elapsed.as_f64() / duration.as_f64())
    }
}

fn mirror(t: f64, power: i32) -> f64 {
    1.0 - (1.0 - t).powi(power)
}

fn in_out(t: f64, power: i32) -> f64 {
    let t2 = t * 2.0;
    if t2 <= 1.0 {
        t2.powi(power) / 2.0
    } else {
        (2.0 - (2.0 - t2).powi(power)) / 2.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
