use std::sync::mpsc::{self, Receiver, Sender};

use tracing::trace;

use crate::{
    aggregate::summary::SeriesSummary,
    data::{measure::Measure, record::Record},
    render::renderer::ShapeId,
    scale::{linear::ScaleId, manager::ColorScale},
};

/// Presentation hints attached to a net-box selection.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct NetHoverOptions {
    pub opacity: f64,
}

impl Default for NetHoverOptions {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

/// Everything the chart tells the outside world.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ChartEvent {
    /// The fill scale was recomputed for a new measure. `scale_id` is stable across updates.
    NewColorScale {
        scale_id: ScaleId,
        measure: Measure,
        scale: ColorScale,
    },
    BoxSelected {
        record_index: usize,
        record: Record,
        element: ShapeId,
        /// False when the cascade itself narrates the box.
        is_hover: bool,
    },
    NetBoxSelected {
        summary: SeriesSummary,
        element: ShapeId,
        options: NetHoverOptions,
    },
    SelectionCleared,
}

impl ChartEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NewColorScale { .. } => EventKind::NewColorScale,
            Self::BoxSelected { .. } => EventKind::BoxSelected,
            Self::NetBoxSelected { .. } => EventKind::NetBoxSelected,
            Self::SelectionCleared => EventKind::SelectionCleared,
        }
    }
}

/// Subscription key for [`ChartEvent`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    NewColorScale,
    BoxSelected,
    NetBoxSelected,
    SelectionCleared,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::NewColorScale,
        EventKind::BoxSelected,
        EventKind::NetBoxSelected,
        EventKind::SelectionCleared,
    ];
}

#[derive(Debug)]
struct Subscriber {
    kinds: Vec<EventKind>,
    tx: Sender<ChartEvent>,
}

/// Fan-out of chart events to channel subscribers.
///
/// Subscribers whose receiver was dropped are pruned on the next emission.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every future event whose kind is in `kinds`.
    pub fn subscribe(&mut self, kinds: &[EventKind]) -> Receiver<ChartEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(Subscriber {
            kinds: kinds.to_vec(),
            tx,
        });
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` and return how many subscribers received it.
    pub fn emit(&mut self, event: ChartEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        self.subscribers.retain(|s| {
            if !s.kinds.contains(&kind) {
                return true;
            }
            match s.tx.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        trace!(?kind, delivered, "event emitted");
        delivered
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/bus.rs"]
mod tests;
