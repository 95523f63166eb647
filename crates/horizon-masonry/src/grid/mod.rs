//! The masonry layout engine.
//!
//! A grid is assembled from small parts:
//!
//! - [`ColumnTracker`]: per-column accumulated height, shortest/longest queries
//! - `ViewRegistry`: one view per collection item, created through a [`ViewFactory`]
//! - `PlacementScheduler`: the queue of items awaiting a layout pass, readiness
//!   waits and submission ordering
//! - `LayoutExecutor`: attaches, sizes, measures and positions each view
//! - [`MasonryGrid`]: wires the parts to a [`Collection`](crate::model::Collection),
//!   a [`Container`] and an [`EventLoop`](horizon_masonry_core::EventLoop)
//!
//! Layout is greedy: every item goes to the top of the column that is
//! shortest when the item is measured, ties going to the leftmost column.

mod columns;
mod config;
mod container;
mod error;
mod executor;
mod headless;
mod masonry;
mod registry;
mod scheduler;
mod view;

pub use columns::ColumnTracker;
pub use config::{
    DEFAULT_ASYNC_TIMEOUT, DEFAULT_COLUMN_COUNT, DEFAULT_GUTTER, DEFAULT_LAYOUT_INTERVAL,
    GridConfig,
};
pub use container::{Container, NodeId};
pub use error::{ConfigError, GridError, GridResult};
pub use executor::Placement;
pub use headless::{HeadlessContainer, HeadlessNode};
pub use masonry::{GridSignals, MasonryGrid, MasonryGridBuilder};
pub use view::{GridId, GridItem, ItemView, ViewConstructor, ViewFactory, ViewOptions};
