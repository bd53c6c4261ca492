use crate::{
    animation::ease::Ease,
    foundation::core::{Lerp, Millis},
    render::renderer::{Attr, AttrValue, ShapeId, TweenId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TweenState {
    Scheduled,
    Running,
    Finished,
    Cancelled,
}

/// One attribute transition on one shape.
#[derive(Clone, Debug)]
pub(crate) struct Tween {
    pub(crate) id: TweenId,
    pub(crate) target: ShapeId,
    pub(crate) attr: Attr,
    /// Captured when the tween starts, not when it is scheduled.
    pub(crate) from: Option<AttrValue>,
    pub(crate) to: AttrValue,
    pub(crate) start_at: Millis,
    pub(crate) duration: Millis,
    pub(crate) state: TweenState,
}

impl Tween {
    pub(crate) fn end_at(&self) -> Millis {
        self.start_at.saturating_add(self.duration)
    }

    pub(crate) fn is_live(&self) -> bool {
        matches!(self.state, TweenState::Scheduled | TweenState::Running)
    }

    /// Value at `now` for a running tween.
    pub(crate) fn sample(&self, now: Millis, ease: Ease) -> AttrValue {
        let Some(from) = self.from else {
            return self.to;
        };
        if self.duration.0 == 0 || now >= self.end_at() {
            return self.to;
        }
        let t = ease.progress(now.saturating_sub(self.start_at), self.duration);
        AttrValue::lerp(&from, &self.to, t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
