//! Prelude module for Horizon Masonry.
//!
//! ```ignore
//! use horizon_masonry::prelude::*;
//! ```

// ============================================================================
// Core
// ============================================================================

pub use horizon_masonry_core::{ConnectionId, EventLoop, Point, Rect, Signal, Size};

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{Collection, ItemCollection, ItemHandle, ItemId};

// ============================================================================
// Grid
// ============================================================================

pub use crate::grid::{
    Container, GridConfig, GridError, GridItem, GridResult, HeadlessContainer, ItemView,
    MasonryGrid, NodeId, Placement, ViewFactory, ViewOptions,
};
