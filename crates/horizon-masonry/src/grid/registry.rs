//! One cached view per collection item.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use horizon_masonry_core::logging::targets;
use horizon_masonry_core::{ConnectionId, EventLoop, Signal, TaskId};

use super::container::Container;
use super::error::GridResult;
use super::executor::Placement;
use super::view::{GridId, GridItem, ItemView, ViewFactory, ViewOptions};
use crate::model::{Collection, ItemHandle, ItemId};

/// An outstanding readiness subscription for an asynchronous view.
pub(crate) struct ReadyWait {
    signal: Arc<Signal<()>>,
    connection: ConnectionId,
    timeout: Option<TaskId>,
}

impl ReadyWait {
    pub(crate) fn new(signal: Arc<Signal<()>>, connection: ConnectionId) -> Self {
        Self {
            signal,
            connection,
            timeout: None,
        }
    }

    pub(crate) fn set_timeout(&mut self, task: TaskId) {
        self.timeout = Some(task);
    }

    /// Disconnects from the view and cancels any pending timeout.
    pub(crate) fn retract(self, event_loop: &EventLoop) {
        self.signal.disconnect(self.connection);
        if let Some(task) = self.timeout {
            // Already ran if it is the one calling us.
            let _ = event_loop.cancel(task);
        }
    }
}

/// Everything the grid tracks for one item.
pub(crate) struct ItemRecord<T> {
    pub(crate) handle: ItemHandle<T>,
    pub(crate) view: Box<dyn ItemView>,
    pub(crate) placed: bool,
    pub(crate) queued_at: Option<Duration>,
    pub(crate) placement: Option<Placement>,
    pub(crate) readiness: Option<ReadyWait>,
    /// Set once the view has signalled readiness or its timeout fired.
    pub(crate) ready: bool,
}

impl<T> ItemRecord<T> {
    /// Whether the view still has to signal readiness before placement.
    pub(crate) fn awaits_readiness(&self) -> bool {
        self.view.is_async() && !self.view.is_done() && !self.ready
    }
}

/// Maps items to their views, creating views on first sight.
pub(crate) struct ViewRegistry<T> {
    records: HashMap<ItemId, ItemRecord<T>>,
    factory: ViewFactory<T>,
    parent: GridId,
    collection: Arc<dyn Collection<T>>,
}

impl<T: GridItem> ViewRegistry<T> {
    pub(crate) fn new(
        factory: ViewFactory<T>,
        parent: GridId,
        collection: Arc<dyn Collection<T>>,
    ) -> Self {
        Self {
            records: HashMap::new(),
            factory,
            parent,
            collection,
        }
    }

    /// Returns the record for `handle`, constructing its view if needed.
    pub(crate) fn resolve(
        &mut self,
        handle: &ItemHandle<T>,
        extra: &Map<String, Value>,
    ) -> GridResult<&mut ItemRecord<T>> {
        match self.records.entry(handle.id()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let constructor = self.factory.constructor_for(handle.item())?;
                let view = constructor(ViewOptions {
                    item: handle.clone(),
                    collection: self.collection.clone(),
                    parent: self.parent,
                    extra: extra.clone(),
                });
                tracing::debug!(
                    target: targets::GRID,
                    item = handle.id().as_u64(),
                    node = view.node().as_u64(),
                    "created view"
                );
                Ok(entry.insert(ItemRecord {
                    handle: handle.clone(),
                    view,
                    placed: false,
                    queued_at: None,
                    placement: None,
                    readiness: None,
                    ready: false,
                }))
            }
        }
    }

    /// Tears down the view for `id`. Returns `false` if there was none.
    pub(crate) fn release(
        &mut self,
        id: ItemId,
        container: &mut dyn Container,
        event_loop: &EventLoop,
    ) -> bool {
        let Some(record) = self.records.remove(&id) else {
            return false;
        };
        Self::teardown(record, container, event_loop);
        true
    }

    /// Tears down every view. Returns how many were released.
    pub(crate) fn release_all(
        &mut self,
        container: &mut dyn Container,
        event_loop: &EventLoop,
    ) -> usize {
        let count = self.records.len();
        for (_, record) in self.records.drain() {
            Self::teardown(record, container, event_loop);
        }
        count
    }

    fn teardown(mut record: ItemRecord<T>, container: &mut dyn Container, event_loop: &EventLoop) {
        if let Some(wait) = record.readiness.take() {
            wait.retract(event_loop);
        }
        let node = record.view.node();
        if container.contains(node) {
            container.detach(node);
        }
        record.view.remove();
        tracing::debug!(
            target: targets::GRID,
            item = record.handle.id().as_u64(),
            "released view"
        );
    }
}

impl<T> ViewRegistry<T> {
    pub(crate) fn get(&self, id: ItemId) -> Option<&ItemRecord<T>> {
        self.records.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut ItemRecord<T>> {
        self.records.get_mut(&id)
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut ItemRecord<T>> {
        self.records.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn unplaced_count(&self) -> usize {
        self.records.values().filter(|record| !record.placed).count()
    }
}
