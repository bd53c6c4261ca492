use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::trace;

use crate::{
    animation::{
        ease::Ease,
        tween::{Tween, TweenState},
    },
    foundation::{
        core::{Canvas, Millis},
        error::{WaterfallError, WaterfallResult},
    },
    render::renderer::{
        Attr, AttrValue, Renderer, ShapeId, ShapeKind, TransitionEvent, TransitionPhase, TweenId,
    },
};

/// A retained element and its committed attribute values.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub class: String,
    text: Option<String>,
    attrs: BTreeMap<Attr, AttrValue>,
}

impl Shape {
    /// Content of a text shape.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Deterministic in-memory renderer driven by an explicit clock.
///
/// Nothing moves until the caller pulls events or advances the clock, which makes the scene
/// both the retained model behind SVG export and a fake clock for asserting transition order.
/// Happenings at the same instant are ordered by tween id, starts before ends.
#[derive(Debug)]
pub struct Scene {
    canvas: Canvas,
    ease: Ease,
    now: Millis,
    shapes: Vec<Shape>,
    tweens: Vec<Tween>,
    next_tween: u64,
    subscriptions: HashSet<(TweenId, TransitionPhase)>,
    locks: HashMap<(ShapeId, Attr), TweenId>,
}

impl Scene {
    pub fn new(canvas: Canvas, ease: Ease) -> Self {
        Self {
            canvas,
            ease,
            now: Millis::ZERO,
            shapes: Vec::new(),
            tweens: Vec::new(),
            next_tween: 0,
            subscriptions: HashSet::new(),
            locks: HashMap::new(),
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Every attribute of `id` sampled at the current clock.
    pub fn current_attrs(&self, id: ShapeId) -> BTreeMap<Attr, AttrValue> {
        let Some(shape) = self.shapes.get(id.0 as usize) else {
            return BTreeMap::new();
        };
        shape
            .attrs
            .keys()
            .filter_map(|&attr| self.attribute(id, attr).map(|v| (attr, v)))
            .collect()
    }

    fn live_holder(&self, target: ShapeId, attr: Attr) -> Option<&Tween> {
        let holder = *self.locks.get(&(target, attr))?;
        self.tweens
            .iter()
            .find(|t| t.id == holder && t.state == TweenState::Running)
    }

    fn commit(&mut self, target: ShapeId, attr: Attr, value: AttrValue) {
        if let Some(shape) = self.shapes.get_mut(target.0 as usize) {
            shape.attrs.insert(attr, value);
        }
    }

    fn retire(&mut self, idx: usize, state: TweenState) {
        let id = self.tweens[idx].id;
        self.tweens[idx].state = state;
        self.subscriptions.remove(&(id, TransitionPhase::Start));
        self.subscriptions.remove(&(id, TransitionPhase::End));
    }

    fn fired(&self, idx: usize, phase: TransitionPhase) -> Option<TransitionEvent> {
        let t = &self.tweens[idx];
        self.subscriptions
            .contains(&(t.id, phase))
            .then_some(TransitionEvent {
                tween: t.id,
                target: t.target,
                phase,
                at: self.now,
            })
    }

    fn next_happening(&self) -> Option<(Millis, TweenId, TransitionPhase, usize)> {
        self.tweens
            .iter()
            .enumerate()
            .filter_map(|(idx, t)| match t.state {
                TweenState::Scheduled => Some((t.start_at, t.id, TransitionPhase::Start, idx)),
                TweenState::Running => Some((t.end_at(), t.id, TransitionPhase::End, idx)),
                TweenState::Finished | TweenState::Cancelled => None,
            })
            .min_by_key(|&(at, id, phase, _)| (at, id, phase))
    }

    fn start(&mut self, idx: usize) -> Option<TransitionEvent> {
        let (id, target, attr) = {
            let t = &self.tweens[idx];
            (t.id, t.target, t.attr)
        };

        if let Some(&holder) = self.locks.get(&(target, attr)) {
            if holder > id {
                trace!(tween = id.0, "superseded before start");
                self.retire(idx, TweenState::Cancelled);
                return None;
            }
            if let Some(h) = self
                .tweens
                .iter()
                .position(|t| t.id == holder && t.state == TweenState::Running)
            {
                let v = self.tweens[h].sample(self.now, self.ease);
                self.commit(target, attr, v);
                self.retire(h, TweenState::Cancelled);
            }
        }
        self.locks.insert((target, attr), id);

        let to = self.tweens[idx].to;
        let from = self
            .shapes
            .get(target.0 as usize)
            .and_then(|s| s.attrs.get(&attr).copied())
            .unwrap_or(to);
        let t = &mut self.tweens[idx];
        t.from = Some(from);
        t.state = TweenState::Running;
        self.fired(idx, TransitionPhase::Start)
    }

    fn finish(&mut self, idx: usize) -> Option<TransitionEvent> {
        let (target, attr, to) = {
            let t = &self.tweens[idx];
            (t.target, t.attr, t.to)
        };
        self.commit(target, attr, to);
        let ev = self.fired(idx, TransitionPhase::End);
        self.retire(idx, TweenState::Finished);
        ev
    }
}

impl Renderer for Scene {
    fn create_shape(
        &mut self,
        kind: ShapeKind,
        class: &str,
        attrs: &[(Attr, AttrValue)],
    ) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        self.shapes.push(Shape {
            id,
            kind,
            class: class.to_owned(),
            text: (kind == ShapeKind::Text).then(String::new),
            attrs: attrs.iter().copied().collect(),
        });
        id
    }

    fn set_text(&mut self, target: ShapeId, text: &str) -> WaterfallResult<()> {
        let shape = self.shapes.get_mut(target.0 as usize).ok_or_else(|| {
            WaterfallError::render(format!("set text on unknown shape {}", target.0))
        })?;
        match shape.text.as_mut() {
            Some(t) => {
                t.clear();
                t.push_str(text);
                Ok(())
            }
            None => Err(WaterfallError::render(format!(
                "shape {} ({}) does not hold text",
                target.0, shape.class
            ))),
        }
    }

    fn animate_attribute(
        &mut self,
        target: ShapeId,
        attr: Attr,
        value: AttrValue,
        duration: Millis,
        delay: Millis,
    ) -> WaterfallResult<TweenId> {
        if self.shapes.get(target.0 as usize).is_none() {
            return Err(WaterfallError::render(format!(
                "animate unknown shape {}",
                target.0
            )));
        }
        let id = TweenId(self.next_tween);
        self.next_tween += 1;
        self.tweens.push(Tween {
            id,
            target,
            attr,
            from: None,
            to: value,
            start_at: self.now.saturating_add(delay),
            duration,
            state: TweenState::Scheduled,
        });
        Ok(id)
    }

    fn on_transition_event(
        &mut self,
        tween: TweenId,
        phase: TransitionPhase,
    ) -> WaterfallResult<()> {
        let live = self.tweens.iter().any(|t| t.id == tween && t.is_live());
        if !live {
            return Err(WaterfallError::render(format!(
                "subscribe to finished or unknown tween {}",
                tween.0
            )));
        }
        self.subscriptions.insert((tween, phase));
        Ok(())
    }

    fn interrupt(&mut self, target: ShapeId) {
        let hits: Vec<usize> = self
            .tweens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.target == target && t.is_live())
            .map(|(i, _)| i)
            .collect();
        for idx in hits {
            if self.tweens[idx].state == TweenState::Running {
                let (attr, v) = {
                    let t = &self.tweens[idx];
                    (t.attr, t.sample(self.now, self.ease))
                };
                self.commit(target, attr, v);
            }
            self.retire(idx, TweenState::Cancelled);
        }
        self.tweens.retain(Tween::is_live);
    }

    fn attribute(&self, target: ShapeId, attr: Attr) -> Option<AttrValue> {
        if let Some(t) = self.live_holder(target, attr) {
            return Some(t.sample(self.now, self.ease));
        }
        self.shapes
            .get(target.0 as usize)
            .and_then(|s| s.attrs.get(&attr).copied())
    }

    fn now(&self) -> Millis {
        self.now
    }

    fn next_transition_event(&mut self, until: Millis) -> Option<TransitionEvent> {
        loop {
            let (at, _, phase, idx) = self.next_happening()?;
            if at > until {
                return None;
            }
            if at > self.now {
                self.now = at;
            }
            let ev = match phase {
                TransitionPhase::Start => self.start(idx),
                TransitionPhase::End => self.finish(idx),
            };
            self.tweens.retain(Tween::is_live);
            if ev.is_some() {
                return ev;
            }
        }
    }

    fn advance_to(&mut self, to: Millis) {
        while self.next_transition_event(to).is_some() {}
        if to > self.now {
            self.now = to;
        }
    }

    fn is_animating(&self) -> bool {
        self.tweens.iter().any(Tween::is_live)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
