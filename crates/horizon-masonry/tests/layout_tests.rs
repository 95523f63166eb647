//! Tests for shortest-column placement and reflow.

mod common;

use std::sync::Arc;

use horizon_masonry::Point;
use horizon_masonry::grid::{Container, GridConfig, Placement};
use parking_lot::Mutex;

use common::{Fixture, Tile, approx};

fn three_columns() -> GridConfig {
    GridConfig::new().with_column_count(3).with_gutter(10.0)
}

fn heights(values: &[f32]) -> Vec<Tile> {
    values.iter().map(|&h| Tile::photo(h)).collect()
}

#[test]
fn test_reference_layout() {
    let fixture = Fixture::new(310.0, heights(&[50.0, 30.0, 80.0, 20.0, 40.0]));
    let grid = fixture.grid(three_columns());

    grid.render().unwrap();
    fixture.settle();

    assert!(approx(grid.item_width(), 96.6667));
    assert_eq!(grid.column_heights(), vec![110.0, 70.0, 90.0]);
    assert_eq!(grid.grid_height(), 110.0);

    let ids = fixture.ids();
    let columns: Vec<usize> = ids
        .iter()
        .map(|&id| grid.placement(id).unwrap().column)
        .collect();
    assert_eq!(columns, vec![0, 1, 2, 1, 0]);

    let third = grid.placement(ids[2]).unwrap();
    assert!(approx(third.position.x, 2.0 * (290.0 / 3.0 + 10.0)));
    assert_eq!(third.position.y, 0.0);
    assert_eq!(grid.placement(ids[3]).unwrap().position.y, 40.0);
    assert_eq!(grid.placement(ids[4]).unwrap().position, Point::new(0.0, 60.0));

    // Positions and widths were committed to the container.
    let node = fixture.container.node(fixture.node_of(ids[4])).unwrap();
    assert_eq!(node.position, Some(Point::new(0.0, 60.0)));
    assert!(approx(node.width.unwrap(), 96.6667));

    let boxes: Vec<_> = ids
        .iter()
        .map(|&id| grid.placement(id).unwrap().bounds(grid.item_width()))
        .collect();
    for (i, a) in boxes.iter().enumerate() {
        for b in &boxes[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn test_reflow_is_idempotent() {
    let fixture = Fixture::new(310.0, heights(&[50.0, 30.0, 80.0, 20.0, 40.0, 65.0]));
    let grid = fixture.grid(three_columns());

    grid.render().unwrap();
    fixture.settle();
    let first: Vec<Option<Placement>> = fixture.ids().iter().map(|&id| grid.placement(id)).collect();
    let first_heights = grid.column_heights();

    grid.reflow().unwrap();
    fixture.settle();
    let second: Vec<Option<Placement>> = fixture.ids().iter().map(|&id| grid.placement(id)).collect();

    assert_eq!(first, second);
    assert_eq!(first_heights, grid.column_heights());
    // Views are cached, not rebuilt.
    assert_eq!(*fixture.renders.lock(), 6);
    assert_eq!(grid.view_count(), 6);
}

#[test]
fn test_single_column_stacks() {
    let fixture = Fixture::new(200.0, heights(&[10.0, 20.0, 30.0]));
    let grid = fixture.grid(GridConfig::new().with_column_count(1).with_gutter(5.0));

    grid.render().unwrap();
    fixture.settle();

    let tops: Vec<f32> = fixture
        .ids()
        .iter()
        .map(|&id| grid.placement(id).unwrap().position.y)
        .collect();
    assert_eq!(tops, vec![0.0, 15.0, 40.0]);
    assert_eq!(grid.item_width(), 200.0);
    assert_eq!(grid.grid_height(), 75.0);
}

#[test]
fn test_every_item_placed_once_and_no_orphans() {
    let fixture = Fixture::new(310.0, heights(&[50.0, 30.0, 80.0, 20.0]));
    let grid = fixture.grid(three_columns());

    grid.render().unwrap();
    fixture.settle();
    assert_eq!(fixture.container.child_count(), 4);

    let removed = fixture.tiles.remove(1).unwrap();
    let removed_node = fixture.node_of(removed.id());
    assert!(!fixture.container.contains(removed_node));
    assert_eq!(*fixture.removed.lock(), vec![removed_node]);

    grid.reflow().unwrap();
    fixture.settle();

    let attached = fixture.container.attached_nodes();
    assert_eq!(attached.len(), 3);
    for id in fixture.ids() {
        assert!(attached.contains(&fixture.node_of(id)));
        assert!(grid.placement(id).is_some());
    }
    assert_eq!(grid.view_count(), 3);
    assert_eq!(grid.pending_count(), 0);
}

#[test]
fn test_removal_leaves_gaps_until_reflow() {
    let fixture = Fixture::new(310.0, heights(&[50.0, 30.0, 80.0]));
    let grid = fixture.grid(three_columns());
    grid.render().unwrap();
    fixture.settle();

    let last = fixture.ids()[2];
    let before = grid.placement(last).unwrap();
    fixture.tiles.remove(0);
    fixture.settle();

    assert_eq!(grid.placement(last), Some(before));
    assert_eq!(grid.column_heights(), vec![60.0, 40.0, 90.0]);

    grid.reflow().unwrap();
    fixture.settle();
    assert_eq!(grid.column_heights(), vec![40.0, 90.0, 0.0]);
}

#[test]
fn test_added_items_go_to_shortest_column() {
    let fixture = Fixture::new(310.0, heights(&[50.0, 30.0, 80.0]));
    let grid = fixture.grid(three_columns());
    grid.render().unwrap();
    fixture.settle();

    let id = fixture.tiles.push(Tile::photo(25.0));
    fixture.settle();

    let placement = grid.placement(id).unwrap();
    assert_eq!(placement.column, 1);
    assert_eq!(placement.position.y, 40.0);
    assert_eq!(grid.column_heights(), vec![60.0, 75.0, 90.0]);
}

#[test]
fn test_sort_triggers_reflow_in_new_order() {
    let fixture = Fixture::new(310.0, heights(&[50.0, 30.0, 80.0]));
    let grid = fixture.grid(three_columns());
    grid.render().unwrap();
    fixture.settle();

    fixture
        .tiles
        .sort_by(|a, b| b.height.total_cmp(&a.height));
    fixture.settle();

    let order: Vec<(f32, usize)> = fixture
        .tiles
        .items()
        .iter()
        .map(|handle| (handle.height, grid.placement(handle.id()).unwrap().column))
        .collect();
    assert_eq!(order, vec![(80.0, 0), (50.0, 1), (30.0, 2)]);
    assert_eq!(grid.column_heights(), vec![90.0, 60.0, 40.0]);
}

#[test]
fn test_reset_rebuilds_views() {
    let fixture = Fixture::new(310.0, heights(&[50.0, 30.0]));
    let grid = fixture.grid(three_columns());
    grid.render().unwrap();
    fixture.settle();

    fixture.tiles.set_items(heights(&[10.0, 20.0, 30.0, 40.0]));
    fixture.settle();

    assert_eq!(fixture.removed.lock().len(), 2);
    assert_eq!(grid.view_count(), 4);
    assert_eq!(fixture.container.child_count(), 4);
    assert_eq!(grid.column_heights(), vec![70.0, 30.0, 40.0]);
}

#[test]
fn test_column_count_and_width_changes_apply_on_reflow() {
    let fixture = Fixture::new(310.0, heights(&[50.0, 30.0, 80.0]));
    let grid = fixture.grid(three_columns());
    grid.render().unwrap();
    fixture.settle();

    grid.set_column_count(2).unwrap();
    fixture.container.set_width(210.0);
    assert_eq!(grid.column_heights().len(), 3);

    grid.reflow().unwrap();
    fixture.settle();
    assert_eq!(grid.config().column_count, 2);
    assert_eq!(grid.item_width(), 100.0);
    assert_eq!(grid.column_heights(), vec![60.0, 130.0]);
}

#[test]
fn test_signals_report_placements_and_passes() {
    let fixture = Fixture::new(310.0, heights(&[50.0, 30.0]));
    let grid = fixture.grid(three_columns());

    let placed = Arc::new(Mutex::new(Vec::new()));
    let finished = Arc::new(Mutex::new(Vec::new()));
    let placed_clone = placed.clone();
    grid.signals().item_placed.connect(move |(id, placement)| {
        placed_clone.lock().push((*id, placement.column));
    });
    let finished_clone = finished.clone();
    grid.signals().layout_finished.connect(move |height| {
        finished_clone.lock().push(*height);
    });

    grid.render().unwrap();
    fixture.settle();
    fixture.tiles.push(Tile::photo(70.0));
    fixture.settle();

    let ids = fixture.ids();
    assert_eq!(
        *placed.lock(),
        vec![(ids[0], 0), (ids[1], 1), (ids[2], 2)]
    );
    assert_eq!(*finished.lock(), vec![60.0, 80.0]);
}

#[test]
fn test_degenerate_height_is_placed() {
    let fixture = Fixture::new(310.0, heights(&[0.0, f32::NAN, 40.0]));
    let grid = fixture.grid(three_columns());
    grid.render().unwrap();
    fixture.settle();

    let ids = fixture.ids();
    assert_eq!(grid.placement(ids[0]).unwrap().column, 0);
    assert_eq!(grid.placement(ids[1]).unwrap().height, 0.0);
    assert_eq!(grid.column_heights(), vec![10.0, 10.0, 50.0]);
}
