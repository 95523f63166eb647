//! Shared fixture for grid tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use horizon_masonry::grid::{
    GridConfig, GridId, GridItem, HeadlessContainer, ItemView, MasonryGrid, NodeId, ViewFactory,
    ViewOptions,
};
use horizon_masonry::model::{Collection, ItemCollection, ItemId};
use horizon_masonry::{EventLoop, Signal};

/// A test item: a box of known height.
#[derive(Debug, Clone)]
pub struct Tile {
    pub kind: &'static str,
    pub height: f32,
    pub asynchronous: bool,
    /// Asynchronous, but already loaded: signals readiness while rendering.
    pub cached: bool,
}

impl Tile {
    pub fn photo(height: f32) -> Self {
        Self {
            kind: "photo",
            height,
            asynchronous: false,
            cached: false,
        }
    }

    pub fn loading(height: f32) -> Self {
        Self {
            kind: "photo",
            height,
            asynchronous: true,
            cached: false,
        }
    }

    pub fn cached(height: f32) -> Self {
        Self {
            kind: "photo",
            height,
            asynchronous: true,
            cached: true,
        }
    }

    pub fn of_kind(kind: &'static str, height: f32) -> Self {
        Self {
            kind,
            height,
            asynchronous: false,
            cached: false,
        }
    }
}

impl GridItem for Tile {
    fn type_tag(&self) -> &str {
        self.kind
    }
}

/// An asynchronous view the test has not released yet.
#[derive(Clone)]
pub struct Pending {
    pub node: NodeId,
    pub height: f32,
    pub signal: Arc<Signal<()>>,
    pub done: Arc<Mutex<bool>>,
}

struct TileView {
    node: NodeId,
    height: f32,
    asynchronous: bool,
    cached: bool,
    done: Arc<Mutex<bool>>,
    signal: Arc<Signal<()>>,
    container: HeadlessContainer,
    rendered: bool,
    renders: Arc<Mutex<usize>>,
    removed: Arc<Mutex<Vec<NodeId>>>,
}

impl ItemView for TileView {
    fn node(&self) -> NodeId {
        self.node
    }

    fn render(&mut self) {
        *self.renders.lock() += 1;
        if !self.asynchronous || self.cached {
            self.container.set_intrinsic_height(self.node, self.height);
        }
        self.rendered = true;
        if self.cached {
            self.signal.emit(());
        }
    }

    fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn is_async(&self) -> bool {
        self.asynchronous
    }

    fn is_done(&self) -> bool {
        *self.done.lock()
    }

    fn ready_signal(&self) -> Option<Arc<Signal<()>>> {
        Some(self.signal.clone())
    }

    fn remove(&mut self) {
        self.removed.lock().push(self.node);
    }
}

/// A collection, a container and the bookkeeping the test views report to.
pub struct Fixture {
    pub container: HeadlessContainer,
    pub tiles: Arc<ItemCollection<Tile>>,
    pub event_loop: EventLoop,
    pub pending: Arc<Mutex<HashMap<ItemId, Pending>>>,
    pub nodes: Arc<Mutex<HashMap<ItemId, NodeId>>>,
    pub removed: Arc<Mutex<Vec<NodeId>>>,
    pub renders: Arc<Mutex<usize>>,
    pub options_seen: Arc<Mutex<Vec<(GridId, Map<String, Value>)>>>,
}

impl Fixture {
    pub fn new(width: f32, tiles: Vec<Tile>) -> Self {
        Self {
            container: HeadlessContainer::new(width),
            tiles: Arc::new(ItemCollection::new(tiles)),
            event_loop: EventLoop::new(),
            pending: Arc::new(Mutex::new(HashMap::new())),
            nodes: Arc::new(Mutex::new(HashMap::new())),
            removed: Arc::new(Mutex::new(Vec::new())),
            renders: Arc::new(Mutex::new(0)),
            options_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A factory that only knows the "photo" tag.
    pub fn factory(&self) -> ViewFactory<Tile> {
        let container = self.container.clone();
        let pending = self.pending.clone();
        let nodes = self.nodes.clone();
        let removed = self.removed.clone();
        let renders = self.renders.clone();
        let options_seen = self.options_seen.clone();

        ViewFactory::typed().with("photo", move |options: ViewOptions<Tile>| {
            let node = NodeId::next();
            let signal = Arc::new(Signal::new());
            let done = Arc::new(Mutex::new(false));
            let tile = options.item.item().clone();
            nodes.lock().insert(options.item.id(), node);
            options_seen
                .lock()
                .push((options.parent, options.extra.clone()));
            if tile.asynchronous {
                pending.lock().insert(
                    options.item.id(),
                    Pending {
                        node,
                        height: tile.height,
                        signal: signal.clone(),
                        done: done.clone(),
                    },
                );
            }
            Box::new(TileView {
                node,
                height: tile.height,
                asynchronous: tile.asynchronous,
                cached: tile.cached,
                done,
                signal,
                container: container.clone(),
                rendered: false,
                renders: renders.clone(),
                removed: removed.clone(),
            }) as Box<dyn ItemView>
        })
    }

    pub fn grid(&self, config: GridConfig) -> MasonryGrid<Tile> {
        MasonryGrid::builder()
            .collection(self.tiles.clone())
            .container(self.container.clone())
            .view_factory(self.factory())
            .config(config)
            .event_loop(self.event_loop.clone())
            .build()
            .expect("grid should build")
    }

    /// Finishes "loading" an asynchronous tile and signals readiness.
    pub fn make_ready(&self, id: ItemId) {
        let pending = self
            .pending
            .lock()
            .remove(&id)
            .expect("item should be loading");
        self.container
            .set_intrinsic_height(pending.node, pending.height);
        *pending.done.lock() = true;
        pending.signal.emit(());
    }

    /// Like [`Fixture::make_ready`], but the view keeps reporting that it is
    /// not done.
    pub fn signal_ready(&self, id: ItemId) {
        let pending = self
            .pending
            .lock()
            .remove(&id)
            .expect("item should be loading");
        self.container
            .set_intrinsic_height(pending.node, pending.height);
        pending.signal.emit(());
    }

    pub fn ready_signal(&self, id: ItemId) -> Arc<Signal<()>> {
        self.pending.lock()[&id].signal.clone()
    }

    pub fn node_of(&self, id: ItemId) -> NodeId {
        self.nodes.lock()[&id]
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.tiles.snapshot().iter().map(|handle| handle.id()).collect()
    }

    /// Runs every deferred task, advancing the clock as needed.
    pub fn settle(&self) {
        self.event_loop.run_until_idle();
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
