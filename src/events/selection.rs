use tracing::debug;

use crate::{
    aggregate::summary::SeriesSummary,
    choreography::plan::GlobalPhase,
    data::record::Record,
    events::bus::{ChartEvent, EventBus, NetHoverOptions},
    render::renderer::ShapeId,
};

/// What the pointer currently rests on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Box { record: usize },
    Net { quintile: u8 },
}

/// Turns pointer activity and cascade narration into chart events.
#[derive(Debug, Default)]
pub struct SelectionEmitter {
    current: Option<Selection>,
}

impl SelectionEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Selection> {
        self.current
    }

    /// A box was hovered (`is_hover`) or reached by the cascade.
    pub fn on_hover(
        &mut self,
        bus: &mut EventBus,
        record_index: usize,
        record: &Record,
        element: ShapeId,
        is_hover: bool,
    ) {
        if is_hover {
            self.current = Some(Selection::Box {
                record: record_index,
            });
        }
        bus.emit(ChartEvent::BoxSelected {
            record_index,
            record: record.clone(),
            element,
            is_hover,
        });
    }

    /// A quintile's net line was hovered. Ignored until the cascade is done; returns whether
    /// an event went out.
    pub fn on_net_hover(
        &mut self,
        bus: &mut EventBus,
        phase: GlobalPhase,
        summary: SeriesSummary,
        element: ShapeId,
    ) -> bool {
        if phase != GlobalPhase::Done {
            debug!(quintile = summary.quintile, ?phase, "net hover before cascade is done");
            return false;
        }
        self.current = Some(Selection::Net {
            quintile: summary.quintile,
        });
        bus.emit(ChartEvent::NetBoxSelected {
            summary,
            element,
            options: NetHoverOptions::default(),
        });
        true
    }

    /// Drop a net-line selection, whose summary went stale with the pass that just started.
    /// Box selections survive. Returns whether `selection-cleared` went out.
    pub fn clear_net(&mut self, bus: &mut EventBus) -> bool {
        let Some(Selection::Net { quintile }) = self.current() else {
            return false;
        };
        debug!(quintile, "net selection cleared by a new pass");
        self.mouse_leave(bus);
        true
    }

    pub fn mouse_leave(&mut self, bus: &mut EventBus) {
        self.current = None;
        bus.emit(ChartEvent::SelectionCleared);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/selection.rs"]
mod tests;
