//! The visual tree a grid lays its views out in.

use std::sync::atomic::{AtomicU64, Ordering};

use horizon_masonry_core::Point;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies a view's root node inside a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocates a fresh, process-unique node id.
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// The element a masonry grid places its views in.
///
/// A container owns the visual tree. The grid only attaches and detaches
/// view nodes, sizes them, positions them absolutely and reads back their
/// rendered height.
pub trait Container: Send {
    /// Width available to the grid, in pixels.
    fn width(&self) -> f32;

    /// Returns `true` if `node` is attached.
    fn contains(&self, node: NodeId) -> bool;

    /// Appends `node` to the container.
    fn attach(&mut self, node: NodeId);

    /// Removes `node` from the container. Unknown nodes are ignored.
    fn detach(&mut self, node: NodeId);

    /// Fixes the width of `node`.
    fn set_node_width(&mut self, node: NodeId, width: f32);

    /// Rendered height of `node` at its current width.
    fn measure_height(&self, node: NodeId) -> f32;

    /// Positions `node` absolutely, relative to the container's top-left corner.
    fn set_node_position(&mut self, node: NodeId, position: Point);
}

impl<C: Container + ?Sized> Container for Box<C> {
    fn width(&self) -> f32 {
        (**self).width()
    }

    fn contains(&self, node: NodeId) -> bool {
        (**self).contains(node)
    }

    fn attach(&mut self, node: NodeId) {
        (**self).attach(node)
    }

    fn detach(&mut self, node: NodeId) {
        (**self).detach(node)
    }

    fn set_node_width(&mut self, node: NodeId, width: f32) {
        (**self).set_node_width(node, width)
    }

    fn measure_height(&self, node: NodeId) -> f32 {
        (**self).measure_height(node)
    }

    fn set_node_position(&mut self, node: NodeId, position: Point) {
        (**self).set_node_position(node, position)
    }
}
