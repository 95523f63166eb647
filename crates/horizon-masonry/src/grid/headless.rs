//! An in-memory container.
//!
//! `HeadlessContainer` keeps the visual tree as plain data. Views record the
//! height their content would render at, and the grid reads it back through
//! the [`Container`] trait. It backs tests and hosts that compute layout
//! without a real rendering backend.
//!
//! The container is a cheap handle: clones share the same tree, so a host can
//! hand one clone to the grid and keep another for inspection.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use horizon_masonry_core::Point;

use super::container::{Container, NodeId};

/// State of one node in a [`HeadlessContainer`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadlessNode {
    /// Height the node's content renders at.
    pub intrinsic_height: f32,
    /// Width fixed by the grid, if any.
    pub width: Option<f32>,
    /// Absolute position assigned by the grid, if any.
    pub position: Option<Point>,
    /// Whether the node is currently attached.
    pub attached: bool,
}

#[derive(Debug, Default)]
struct HeadlessState {
    width: f32,
    nodes: HashMap<NodeId, HeadlessNode>,
    /// Attached nodes in attachment order.
    children: Vec<NodeId>,
}

/// A [`Container`] that keeps its visual tree in memory.
#[derive(Debug, Clone, Default)]
pub struct HeadlessContainer {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessContainer {
    /// Creates an empty container `width` pixels wide.
    pub fn new(width: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState {
                width,
                ..HeadlessState::default()
            })),
        }
    }

    /// Changes the container width. Takes effect on the grid's next reflow.
    pub fn set_width(&self, width: f32) {
        self.state.lock().width = width;
    }

    /// Records the height `node`'s content renders at.
    pub fn set_intrinsic_height(&self, node: NodeId, height: f32) {
        self.state.lock().nodes.entry(node).or_default().intrinsic_height = height;
    }

    /// Snapshot of `node`, if the container has ever seen it.
    pub fn node(&self, node: NodeId) -> Option<HeadlessNode> {
        self.state.lock().nodes.get(&node).copied()
    }

    /// Attached nodes, in attachment order.
    pub fn attached_nodes(&self) -> Vec<NodeId> {
        self.state.lock().children.clone()
    }

    /// Number of attached nodes.
    pub fn child_count(&self) -> usize {
        self.state.lock().children.len()
    }
}

impl Container for HeadlessContainer {
    fn width(&self) -> f32 {
        self.state.lock().width
    }

    fn contains(&self, node: NodeId) -> bool {
        self.state.lock().nodes.get(&node).is_some_and(|n| n.attached)
    }

    fn attach(&mut self, node: NodeId) {
        let mut state = self.state.lock();
        let entry = state.nodes.entry(node).or_default();
        if !entry.attached {
            entry.attached = true;
            state.children.push(node);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let mut state = self.state.lock();
        if let Some(entry) = state.nodes.get_mut(&node) {
            entry.attached = false;
            entry.position = None;
        }
        state.children.retain(|&child| child != node);
    }

    fn set_node_width(&mut self, node: NodeId, width: f32) {
        self.state.lock().nodes.entry(node).or_default().width = Some(width);
    }

    fn measure_height(&self, node: NodeId) -> f32 {
        // Detached nodes have no layout box.
        match self.state.lock().nodes.get(&node) {
            Some(entry) if entry.attached => entry.intrinsic_height,
            _ => 0.0,
        }
    }

    fn set_node_position(&mut self, node: NodeId, position: Point) {
        self.state.lock().nodes.entry(node).or_default().position = Some(position);
    }
}

static_assertions::assert_impl_all!(HeadlessContainer: Send, Sync);
