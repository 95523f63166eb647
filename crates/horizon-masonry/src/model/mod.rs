//! Item collections observed by masonry grids.
//!
//! A grid never owns its items. It reads them from a [`Collection`] and
//! follows the collection's [`CollectionSignals`]:
//!
//! ```text
//! ┌────────────────┐  item_added / item_removed  ┌──────────────┐
//! │ ItemCollection │ ──────────────────────────> │ MasonryGrid  │
//! │                │  sorted / reset             │              │
//! └────────────────┘ ──────────────────────────> └──────────────┘
//! ```

mod collection;

pub use collection::{Collection, CollectionSignals, ItemCollection, ItemHandle, ItemId};
