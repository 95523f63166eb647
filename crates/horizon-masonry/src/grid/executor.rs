//! Measures views and commits their positions.

use horizon_masonry_core::logging::targets;
use horizon_masonry_core::{Point, Rect, Size};

use super::columns::ColumnTracker;
use super::container::{Container, NodeId};

/// Where an item was placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Column the item was placed in.
    pub column: usize,
    /// Top-left corner, relative to the container.
    pub position: Point,
    /// Measured height, after clamping degenerate values to zero.
    pub height: f32,
}

impl Placement {
    /// The item's box for a column width of `item_width`.
    pub fn bounds(&self, item_width: f32) -> Rect {
        Rect::from_origin_size(self.position, Size::new(item_width, self.height))
    }
}

/// Column geometry for one layout generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LayoutExecutor {
    item_width: f32,
    gutter: f32,
}

impl LayoutExecutor {
    pub(crate) fn new(item_width: f32, gutter: f32) -> Self {
        Self { item_width, gutter }
    }

    pub(crate) fn item_width(&self) -> f32 {
        self.item_width
    }

    /// Attaches `node` if needed and fixes its width, ready for measurement.
    pub(crate) fn prepare(&self, container: &mut dyn Container, node: NodeId) {
        if !container.contains(node) {
            container.attach(node);
        }
        container.set_node_width(node, self.item_width);
    }

    /// Measures `node` and positions it at the top of the shortest column.
    pub(crate) fn place(
        &self,
        columns: &mut ColumnTracker,
        container: &mut dyn Container,
        node: NodeId,
    ) -> Placement {
        let measured = container.measure_height(node);
        let height = if measured.is_finite() && measured > 0.0 {
            measured
        } else {
            tracing::warn!(
                target: targets::LAYOUT,
                node = node.as_u64(),
                measured,
                "degenerate item height, placing with zero height"
            );
            0.0
        };

        let column = columns.shortest_column();
        let position = Point::new(
            column as f32 * (self.item_width + self.gutter),
            columns.column_height(column).unwrap_or(0.0),
        );
        container.set_node_position(node, position);
        columns.add_height(column, height + self.gutter);

        tracing::trace!(
            target: targets::LAYOUT,
            node = node.as_u64(),
            column,
            x = position.x,
            y = position.y,
            height,
            "placed item"
        );

        Placement {
            column,
            position,
            height,
        }
    }
}
