use crate::foundation::{
    core::{Lerp, Millis, Rgb8},
    error::WaterfallResult,
};

/// Handle of a drawn element.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ShapeId(pub u32);

/// Handle of one scheduled attribute transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct TweenId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Line,
    /// Anchored at `x`/`y`; its content is set with [`Renderer::set_text`].
    Text,
}

/// Animatable attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Attr {
    X,
    Y,
    Width,
    Height,
    X1,
    X2,
    Y1,
    Y2,
    Opacity,
    Fill,
    Stroke,
}

impl Attr {
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Width => "width",
            Self::Height => "height",
            Self::X1 => "x1",
            Self::X2 => "x2",
            Self::Y1 => "y1",
            Self::Y2 => "y2",
            Self::Opacity => "opacity",
            Self::Fill => "fill",
            Self::Stroke => "stroke",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Num(f64),
    Color(Rgb8),
}

impl AttrValue {
    pub fn as_num(self) -> Option<f64> {
        match self {
            Self::Num(v) => Some(v),
            Self::Color(_) => None,
        }
    }

    pub fn as_color(self) -> Option<Rgb8> {
        match self {
            Self::Color(c) => Some(c),
            Self::Num(_) => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Num(v)
    }
}

impl From<Rgb8> for AttrValue {
    fn from(c: Rgb8) -> Self {
        Self::Color(c)
    }
}

impl Lerp for AttrValue {
    /// Mismatched kinds jump to `b`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Self::Num(a), Self::Num(b)) => Self::Num(f64::lerp(a, b, t)),
            (Self::Color(a), Self::Color(b)) => Self::Color(Rgb8::lerp(a, b, t)),
            _ => *b,
        }
    }
}

/// Lifecycle point of a transition a caller can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPhase {
    Start,
    End,
}

/// A subscribed transition lifecycle event, delivered in clock order.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TransitionEvent {
    pub tween: TweenId,
    pub target: ShapeId,
    pub phase: TransitionPhase,
    pub at: Millis,
}

/// Drawing and animation capability the choreographer depends on.
///
/// Callbacks are modeled as data: a caller subscribes to a tween's start or end with
/// [`Renderer::on_transition_event`] and later pulls the fired events, in time order, from
/// [`Renderer::next_transition_event`]. Anything it schedules while handling an event is
/// anchored at that event's time.
///
/// For one `(shape, attr)` pair the most recently scheduled tween wins: when it starts, any
/// older tween on the pair is cancelled without firing further events.
pub trait Renderer {
    fn create_shape(
        &mut self,
        kind: ShapeKind,
        class: &str,
        attrs: &[(Attr, AttrValue)],
    ) -> ShapeId;

    /// Replace the content of a text shape. Takes effect immediately.
    fn set_text(&mut self, target: ShapeId, text: &str) -> WaterfallResult<()>;

    /// Tween `attr` of `target` to `value`, starting `delay` after now.
    fn animate_attribute(
        &mut self,
        target: ShapeId,
        attr: Attr,
        value: AttrValue,
        duration: Millis,
        delay: Millis,
    ) -> WaterfallResult<TweenId>;

    /// Ask for `phase` of `tween` to be reported by [`Renderer::next_transition_event`].
    fn on_transition_event(&mut self, tween: TweenId, phase: TransitionPhase)
    -> WaterfallResult<()>;

    /// Stop every pending or running tween on `target`, freezing it at its current pose.
    fn interrupt(&mut self, target: ShapeId);

    /// Value of `attr` at the current clock.
    fn attribute(&self, target: ShapeId, attr: Attr) -> Option<AttrValue>;

    fn now(&self) -> Millis;

    /// Advance the clock to the next subscribed event at or before `until` and return it.
    fn next_transition_event(&mut self, until: Millis) -> Option<TransitionEvent>;

    /// Move the clock to `to`, applying every transition step on the way. Subscribed events
    /// passed over are dropped, so drain [`Renderer::next_transition_event`] first.
    fn advance_to(&mut self, to: Millis);

    /// True while any tween is pending or running.
    fn is_animating(&self) -> bool;
}
