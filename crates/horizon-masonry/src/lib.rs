//! Horizon Masonry - a shortest-column (masonry) grid layout engine.
//!
//! A [`MasonryGrid`](grid::MasonryGrid) follows an observable
//! [`ItemCollection`](model::ItemCollection), creates one view per item and
//! places each view at the top of the currently shortest column. Views whose
//! size is only known later (images still loading) are held back until they
//! signal readiness. All deferred work runs on an explicit
//! [`EventLoop`] so hosts decide when time passes.
//!
//! This crate re-exports the core crate, so signals, the event loop and the
//! geometry types are available from here as well.
//!
//! # Example
//!
//! ```
//! use horizon_masonry::prelude::*;
//! use std::sync::Arc;
//!
//! struct Note {
//!     lines: usize,
//! }
//!
//! impl GridItem for Note {
//!     fn type_tag(&self) -> &str {
//!         "note"
//!     }
//! }
//!
//! struct NoteView {
//!     node: NodeId,
//!     height: f32,
//!     container: HeadlessContainer,
//! }
//!
//! impl ItemView for NoteView {
//!     fn node(&self) -> NodeId {
//!         self.node
//!     }
//!     fn render(&mut self) {
//!         self.container.set_intrinsic_height(self.node, self.height);
//!     }
//!     fn is_rendered(&self) -> bool {
//!         self.container.node(self.node).is_some()
//!     }
//!     fn remove(&mut self) {}
//! }
//!
//! let container = HeadlessContainer::new(640.0);
//! let notes = Arc::new(ItemCollection::new(vec![Note { lines: 3 }, Note { lines: 1 }]));
//! let event_loop = EventLoop::new();
//!
//! let tree = container.clone();
//! let grid = MasonryGrid::<Note>::builder()
//!     .collection(notes.clone())
//!     .container(container.clone())
//!     .view_factory(ViewFactory::typed().with("note", move |options: ViewOptions<Note>| {
//!         Box::new(NoteView {
//!             node: NodeId::next(),
//!             height: options.item.lines as f32 * 20.0,
//!             container: tree.clone(),
//!         }) as Box<dyn ItemView>
//!     }))
//!     .config(GridConfig::new().with_column_count(2))
//!     .event_loop(event_loop.clone())
//!     .build()?;
//!
//! grid.render()?;
//! notes.push(Note { lines: 2 });
//! event_loop.run_until_idle();
//!
//! assert_eq!(container.child_count(), 3);
//! assert_eq!(grid.column_heights(), vec![80.0, 100.0]);
//! # Ok::<(), horizon_masonry::grid::GridError>(())
//! ```

pub use horizon_masonry_core::*;

pub mod grid;
pub mod model;
pub mod prelude;
