//! Animated income-quintile waterfall.
//!
//! Job statistics are bucketed into five income quintiles and split, per quintile, into the
//! records that grew (the up stack) and the ones that shrank (the down stack) under the active
//! measure. Each record becomes a box; boxes cascade into place one after another while a net
//! line trails the running total of its quintile.
//!
//! # Pipeline overview
//!
//! 1. **Aggregate**: `&[Record] + Measure -> SeriesList` (five up/down partitions with sums)
//! 2. **Scale**: `SeriesList -> Scales` (band x axis, linear y axis, diverging color scales),
//!    updated in place on every measure change
//! 3. **Choreograph**: `SeriesList + Scales -> PassPlan`, then transitions scheduled on a
//!    [`Renderer`] and driven by its lifecycle events
//! 4. **Export** (optional): the in-memory [`Scene`] as SVG or RGBA pixels
//!
//! [`WaterfallEngine`] ties these together behind `initialize`, `change_measure` and
//! `reset_cascade`, and publishes [`ChartEvent`]s to channel subscribers.
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod animation;
pub mod choreography;
pub mod data;
pub mod engine;
pub mod events;
pub mod foundation;
pub mod legend;
pub mod render;
pub mod scale;

pub use aggregate::series::{QUINTILES, Series, SeriesList, Stack, StackEntry, aggregate};
pub use aggregate::summary::SeriesSummary;
pub use animation::ease::Ease;
pub use choreography::choreographer::{Choreographer, PhaseChange, ProgressEvent};
pub use choreography::plan::{BoxPhase, GlobalPhase, PassPlan, RenderMode};
pub use data::load::load_bundle;
pub use data::measure::Measure;
pub use data::record::{DataBundle, QuintileReference, Record};
pub use engine::WaterfallEngine;
pub use events::bus::{ChartEvent, EventKind, NetHoverOptions};
pub use foundation::config::WaterfallConfig;
pub use foundation::core::{Canvas, Millis, Rgb8};
pub use foundation::error::{WaterfallError, WaterfallResult};
pub use legend::Legend;
pub use render::raster::{Frame, rasterize};
pub use render::renderer::{Attr, AttrValue, Renderer, ShapeId, TransitionEvent, TransitionPhase};
pub use render::scene::Scene;
pub use render::svg::scene_to_svg;
pub use scale::manager::{ScaleManager, Scales};
