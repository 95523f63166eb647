//! The masonry grid.
//!
//! `MasonryGrid` follows a [`Collection`], keeps one view per item and lays
//! the views out in shortest-column order. All deferred work runs as tasks
//! on the grid's [`EventLoop`]:
//!
//! ```text
//! item_added ──> resolve view ──> render ──> ready? ──yes──> queue ──(layout interval)──> pass
//!                                              │                                          │
//!                                              no                              per item: attach,
//!                                              │                               size, post measure
//!                                     wait for ready signal                               │
//!                                     (optionally timed out)                   measure ──> place
//! ```

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};

use horizon_masonry_core::logging::{span_names, targets};
use horizon_masonry_core::{ConnectionId, EventLoop, PerfSpan, Signal};

use super::columns::ColumnTracker;
use super::config::{GridConfig, validate_column_count, validate_gutter};
use super::container::Container;
use super::error::{ConfigError, GridError, GridResult};
use super::executor::{LayoutExecutor, Placement};
use super::registry::{ReadyWait, ViewRegistry};
use super::scheduler::PlacementScheduler;
use super::view::{GridId, GridItem, ViewFactory};
use crate::model::{Collection, ItemHandle, ItemId};

/// Notifications emitted by a grid.
///
/// Both signals fire with the grid state unlocked, so slots may query the
/// grid.
pub struct GridSignals {
    /// An item received its position.
    pub item_placed: Signal<(ItemId, Placement)>,
    /// Every outstanding measurement finished. Carries the grid height.
    pub layout_finished: Signal<f32>,
}

impl GridSignals {
    fn new() -> Self {
        Self {
            item_placed: Signal::new(),
            layout_finished: Signal::new(),
        }
    }
}

/// Collection connections held by a live grid.
struct Subscriptions {
    added: ConnectionId,
    removed: ConnectionId,
    sorted: ConnectionId,
    reset: ConnectionId,
}

struct GridState<T> {
    id: GridId,
    config: GridConfig,
    columns: ColumnTracker,
    views: ViewRegistry<T>,
    scheduler: PlacementScheduler,
    container: Box<dyn Container>,
    executor: LayoutExecutor,
    generation: u64,
    pending_measurements: usize,
    subscriptions: Option<Subscriptions>,
    alive: bool,
    last_error: Option<GridError>,
}

struct GridCore<T> {
    state: Mutex<GridState<T>>,
    collection: Arc<dyn Collection<T>>,
    event_loop: EventLoop,
    signals: GridSignals,
}

/// What a locked operation wants emitted once the lock is gone.
#[derive(Default)]
struct Emissions {
    placed: Vec<(ItemId, Placement)>,
    finished: Option<f32>,
}

impl<T: GridItem> GridCore<T> {
    fn lock_alive(&self) -> GridResult<MutexGuard<'_, GridState<T>>> {
        let state = self.state.lock();
        if state.alive {
            Ok(state)
        } else {
            Err(GridError::Removed)
        }
    }

    fn emit(&self, emissions: Emissions) {
        for event in emissions.placed {
            self.signals.item_placed.emit(event);
        }
        if let Some(height) = emissions.finished {
            self.signals.layout_finished.emit(height);
        }
    }

    #[tracing::instrument(skip(self), target = "horizon_masonry::grid", level = "debug")]
    fn reflow(self: &Arc<Self>) -> GridResult<()> {
        let handles = self.collection.snapshot();
        let mut guard = self.lock_alive()?;
        let state = &mut *guard;
        let _span = PerfSpan::new(span_names::REFLOW);

        state.generation += 1;
        let item_width = state.config.item_width(state.container.width());
        state.executor = LayoutExecutor::new(item_width, state.config.gutter);
        state.columns.reset(state.config.column_count);
        state.scheduler.set_ensure_order(state.config.orders_placement());
        state.scheduler.reset();
        for record in state.views.records_mut() {
            record.placed = false;
            record.placement = None;
        }

        tracing::debug!(
            target: targets::GRID,
            generation = state.generation,
            items = handles.len(),
            item_width,
            columns = state.config.column_count,
            "reflow"
        );

        for handle in &handles {
            self.submit(state, handle)?;
        }
        Ok(())
    }

    fn add(self: &Arc<Self>, handle: &ItemHandle<T>) -> GridResult<()> {
        let mut guard = self.lock_alive()?;
        self.submit(&mut guard, handle)
    }

    /// Resolves, renders and submits one item.
    fn submit(self: &Arc<Self>, state: &mut GridState<T>, handle: &ItemHandle<T>) -> GridResult<()> {
        let id = handle.id();
        let now = self.event_loop.now();
        let record = state.views.resolve(handle, &state.config.view_options)?;
        record.placed = false;
        record.queued_at = Some(now);

        // Subscribe before rendering: a view may turn ready inside `render()`.
        if record.awaits_readiness() && record.readiness.is_none() {
            if let Some(signal) = record.view.ready_signal() {
                let weak = Arc::downgrade(self);
                let connection = signal.connect_queued(&self.event_loop, move |_| {
                    if let Some(core) = weak.upgrade() {
                        core.on_ready(id, false);
                    }
                });
                let mut wait = ReadyWait::new(signal, connection);
                if state.config.enforce_async_timeout {
                    let weak = Arc::downgrade(self);
                    let timeout = self.event_loop.schedule(state.config.async_timeout, move || {
                        if let Some(core) = weak.upgrade() {
                            core.on_ready(id, true);
                        }
                    });
                    wait.set_timeout(timeout);
                }
                record.readiness = Some(wait);
                tracing::debug!(target: targets::SCHEDULER, item = id.as_u64(), "waiting for view readiness");
            }
        }

        if !record.view.is_rendered() {
            record.view.render();
        }

        let ready_now = if !record.awaits_readiness() {
            if let Some(wait) = record.readiness.take() {
                wait.retract(&self.event_loop);
            }
            true
        } else if record.readiness.is_some() {
            false
        } else {
            tracing::warn!(
                target: targets::SCHEDULER,
                item = id.as_u64(),
                "asynchronous view has no ready signal, placing immediately"
            );
            true
        };

        state.scheduler.take_ticket(id);
        if ready_now {
            let ready = state.scheduler.mark_ready(id);
            self.enqueue(state, ready);
        }
        Ok(())
    }

    fn on_ready(self: &Arc<Self>, id: ItemId, timed_out: bool) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if !state.alive {
            return;
        }
        let Some(record) = state.views.get_mut(id) else {
            return;
        };
        let Some(wait) = record.readiness.take() else {
            return;
        };
        // Later reflows place the view without waiting again.
        record.ready = true;
        wait.retract(&self.event_loop);

        if timed_out {
            tracing::warn!(
                target: targets::SCHEDULER,
                item = id.as_u64(),
                timeout_ms = state.config.async_timeout.as_millis() as u64,
                "view not ready before timeout, placing anyway"
            );
        } else {
            tracing::debug!(target: targets::SCHEDULER, item = id.as_u64(), "view ready");
        }

        let ready = state.scheduler.mark_ready(id);
        self.enqueue(state, ready);
    }

    fn enqueue(self: &Arc<Self>, state: &mut GridState<T>, ids: Vec<ItemId>) {
        for id in ids {
            if !state.scheduler.enqueue(id) {
                continue;
            }
            let weak = Arc::downgrade(self);
            let pass = self.event_loop.schedule(state.config.layout_interval, move || {
                if let Some(core) = weak.upgrade() {
                    core.flush();
                }
            });
            state.scheduler.set_pass(pass);
            tracing::trace!(target: targets::SCHEDULER, "armed layout pass");
        }
    }

    /// Takes the queue and prepares every queued view for measurement.
    fn flush(self: &Arc<Self>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if !state.alive {
            return;
        }
        let _span = PerfSpan::new(span_names::LAYOUT_PASS);
        let queue = state.scheduler.take_queue();
        tracing::debug!(target: targets::LAYOUT, items = queue.len(), "layout pass");

        let generation = state.generation;
        for id in queue {
            let Some(record) = state.views.get(id) else {
                continue;
            };
            let node = record.view.node();
            state.executor.prepare(state.container.as_mut(), node);

            let weak = Arc::downgrade(self);
            self.event_loop.post(move || {
                if let Some(core) = weak.upgrade() {
                    core.measure(id, generation);
                }
            });
            state.pending_measurements += 1;
        }
    }

    fn measure(&self, id: ItemId, generation: u64) {
        let mut emissions = Emissions::default();
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if !state.alive {
                return;
            }
            state.pending_measurements = state.pending_measurements.saturating_sub(1);

            if generation != state.generation {
                tracing::trace!(target: targets::LAYOUT, item = id.as_u64(), "dropping stale measurement");
            } else if let Some(record) = state.views.get_mut(id) {
                if !record.placed {
                    let placement = state.executor.place(
                        &mut state.columns,
                        state.container.as_mut(),
                        record.view.node(),
                    );
                    record.placed = true;
                    record.placement = Some(placement);
                    if let Some(queued_at) = record.queued_at.take() {
                        tracing::trace!(
                            target: targets::LAYOUT,
                            item = id.as_u64(),
                            waited_ms = self.event_loop.now().saturating_sub(queued_at).as_millis() as u64,
                            "measured item"
                        );
                    }
                    emissions.placed.push((id, placement));
                }
            }

            if state.pending_measurements == 0
                && generation == state.generation
                && state.scheduler.queued().is_empty()
            {
                emissions.finished = Some(state.columns.height());
            }
        }
        self.emit(emissions);
    }

    fn remove_item(self: &Arc<Self>, id: ItemId) -> GridResult<bool> {
        let mut guard = self.lock_alive()?;
        let state = &mut *guard;
        let released = state
            .views
            .release(id, state.container.as_mut(), &self.event_loop);
        let unblocked = state.scheduler.forget(id);
        self.enqueue(state, unblocked);
        Ok(released)
    }

    fn reset(self: &Arc<Self>) -> GridResult<()> {
        {
            let mut guard = self.lock_alive()?;
            let state = &mut *guard;
            let released = state
                .views
                .release_all(state.container.as_mut(), &self.event_loop);
            tracing::debug!(target: targets::GRID, released, "collection reset");
        }
        self.reflow()
    }

    fn teardown(&self) -> GridResult<()> {
        let subscriptions = {
            let mut guard = self.lock_alive()?;
            let state = &mut *guard;
            state.alive = false;
            let released = state
                .views
                .release_all(state.container.as_mut(), &self.event_loop);
            if let Some(pass) = state.scheduler.take_pass() {
                let _ = self.event_loop.cancel(pass);
            }
            state.scheduler.reset();
            tracing::debug!(target: targets::GRID, grid = state.id.as_u64(), released, "grid removed");
            state.subscriptions.take()
        };

        if let Some(subscriptions) = subscriptions {
            let signals = self.collection.signals();
            signals.item_added.disconnect(subscriptions.added);
            signals.item_removed.disconnect(subscriptions.removed);
            signals.sorted.disconnect(subscriptions.sorted);
            signals.reset.disconnect(subscriptions.reset);
        }
        Ok(())
    }

    /// Records an error raised where no caller can receive it.
    fn report(&self, operation: &'static str, result: GridResult<()>) {
        if let Err(error) = result {
            if error == GridError::Removed {
                return;
            }
            tracing::error!(target: targets::GRID, operation, %error, "grid operation failed");
            self.state.lock().last_error = Some(error);
        }
    }
}

/// A masonry grid bound to a collection and a container.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_masonry::grid::{
///     GridConfig, GridItem, HeadlessContainer, ItemView, MasonryGrid, NodeId, ViewFactory, ViewOptions,
/// };
/// use horizon_masonry::model::ItemCollection;
/// use horizon_masonry_core::EventLoop;
///
/// struct Card { height: f32 }
///
/// impl GridItem for Card {
///     fn type_tag(&self) -> &str { "card" }
/// }
///
/// struct CardView { node: NodeId, height: f32, container: HeadlessContainer, rendered: bool }
///
/// impl ItemView for CardView {
///     fn node(&self) -> NodeId { self.node }
///     fn render(&mut self) {
///         self.container.set_intrinsic_height(self.node, self.height);
///         self.rendered = true;
///     }
///     fn is_rendered(&self) -> bool { self.rendered }
///     fn remove(&mut self) {}
/// }
///
/// let container = HeadlessContainer::new(310.0);
/// let cards = Arc::new(ItemCollection::new(
///     [50.0, 30.0, 80.0].into_iter().map(|height| Card { height }).collect(),
/// ));
/// let event_loop = EventLoop::new();
///
/// let views = container.clone();
/// let grid = MasonryGrid::<Card>::builder()
///     .collection(cards.clone())
///     .container(container.clone())
///     .view_factory(ViewFactory::single(move |options: ViewOptions<Card>| {
///         Box::new(CardView {
///             node: NodeId::next(),
///             height: options.item.height,
///             container: views.clone(),
///             rendered: false,
///         })
///     }))
///     .config(GridConfig::new().with_column_count(3).with_gutter(10.0))
///     .event_loop(event_loop.clone())
///     .build()
///     .unwrap();
///
/// grid.render().unwrap();
/// event_loop.run_until_idle();
/// assert_eq!(grid.column_heights(), vec![60.0, 40.0, 90.0]);
/// assert_eq!(grid.grid_height(), 90.0);
/// ```
pub struct MasonryGrid<T: GridItem> {
    core: Arc<GridCore<T>>,
}

impl<T: GridItem> MasonryGrid<T> {
    /// Starts building a grid.
    pub fn builder() -> MasonryGridBuilder<T> {
        MasonryGridBuilder::new()
    }

    /// Lays out every item in the collection. Returns `self` for chaining.
    pub fn render(&self) -> GridResult<&Self> {
        self.core.reflow()?;
        Ok(self)
    }

    /// Resets the columns and re-submits every collection item in order.
    ///
    /// Picks up the current container width and any configuration change.
    pub fn reflow(&self) -> GridResult<()> {
        self.core.reflow()
    }

    /// Creates (or reuses) the view for `handle` and submits it for placement.
    pub fn add_view_for_item(&self, handle: &ItemHandle<T>) -> GridResult<()> {
        self.core.add(handle)
    }

    /// Releases the view for `id`. Other items keep their positions.
    ///
    /// Returns `false` if the grid had no view for `id`.
    pub fn remove_view_for_item(&self, id: ItemId) -> GridResult<bool> {
        self.core.remove_item(id)
    }

    /// Releases every view and stops following the collection.
    ///
    /// Terminal: every later operation fails with [`GridError::Removed`].
    pub fn remove(&self) -> GridResult<()> {
        self.core.teardown()
    }

    /// The grid's signals.
    pub fn signals(&self) -> &GridSignals {
        &self.core.signals
    }

    /// The event loop the grid schedules its work on.
    pub fn event_loop(&self) -> &EventLoop {
        &self.core.event_loop
    }

    /// This grid's id, as passed to its views.
    pub fn id(&self) -> GridId {
        self.core.state.lock().id
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> GridConfig {
        self.core.state.lock().config.clone()
    }

    /// Changes the column count. Takes effect on the next reflow.
    pub fn set_column_count(&self, column_count: usize) -> GridResult<()> {
        validate_column_count(column_count)?;
        self.core.lock_alive()?.config.column_count = column_count;
        Ok(())
    }

    /// Changes the gutter. Takes effect on the next reflow.
    pub fn set_gutter(&self, gutter: f32) -> GridResult<()> {
        validate_gutter(gutter)?;
        self.core.lock_alive()?.config.gutter = gutter;
        Ok(())
    }

    /// Height of the longest column.
    pub fn grid_height(&self) -> f32 {
        self.core.state.lock().columns.height()
    }

    /// Height of every column, by index.
    pub fn column_heights(&self) -> Vec<f32> {
        self.core.state.lock().columns.heights().to_vec()
    }

    /// Column width computed at the last reflow.
    pub fn item_width(&self) -> f32 {
        self.core.state.lock().executor.item_width()
    }

    /// Where `id` was placed in the current layout, if it has been.
    pub fn placement(&self, id: ItemId) -> Option<Placement> {
        self.core.state.lock().views.get(id).and_then(|record| record.placement)
    }

    /// Number of items with a live view.
    pub fn view_count(&self) -> usize {
        self.core.state.lock().views.len()
    }

    /// Number of items submitted but not yet placed.
    pub fn pending_count(&self) -> usize {
        self.core.state.lock().views.unplaced_count()
    }

    /// Returns `false` once [`remove`](Self::remove) has run.
    pub fn is_alive(&self) -> bool {
        self.core.state.lock().alive
    }

    /// The most recent error raised while handling a collection event.
    pub fn last_error(&self) -> Option<GridError> {
        self.core.state.lock().last_error.clone()
    }
}

impl<T: GridItem> Drop for MasonryGrid<T> {
    fn drop(&mut self) {
        if self.core.state.lock().alive {
            let _ = self.core.teardown();
        }
    }
}

impl<T: GridItem> std::fmt::Debug for MasonryGrid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.core.state.lock();
        f.debug_struct("MasonryGrid")
            .field("id", &state.id)
            .field("alive", &state.alive)
            .field("views", &state.views.len())
            .field("columns", &state.columns.heights())
            .finish()
    }
}

/// Builder for [`MasonryGrid`].
pub struct MasonryGridBuilder<T> {
    collection: Option<Arc<dyn Collection<T>>>,
    container: Option<Box<dyn Container>>,
    view_factory: Option<ViewFactory<T>>,
    config: GridConfig,
    event_loop: Option<EventLoop>,
}

impl<T: GridItem> MasonryGridBuilder<T> {
    /// A builder with no collaborators and the default configuration.
    pub fn new() -> Self {
        Self {
            collection: None,
            container: None,
            view_factory: None,
            config: GridConfig::default(),
            event_loop: None,
        }
    }

    /// The collection to follow. Required.
    pub fn collection<C: Collection<T> + 'static>(mut self, collection: Arc<C>) -> Self {
        self.collection = Some(collection);
        self
    }

    /// The container to lay views out in. Required.
    pub fn container<C: Container + 'static>(mut self, container: C) -> Self {
        self.container = Some(Box::new(container));
        self
    }

    /// How views are constructed. Required.
    pub fn view_factory(mut self, factory: ViewFactory<T>) -> Self {
        self.view_factory = Some(factory);
        self
    }

    /// Grid configuration. Defaults to [`GridConfig::default`].
    pub fn config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    /// The loop deferred work runs on. Defaults to a fresh loop.
    pub fn event_loop(mut self, event_loop: EventLoop) -> Self {
        self.event_loop = Some(event_loop);
        self
    }

    /// Validates the parameters and connects the grid to its collection.
    ///
    /// The grid lays nothing out until [`MasonryGrid::render`] or an
    /// `item_added` notification.
    pub fn build(self) -> GridResult<MasonryGrid<T>> {
        let collection = self.collection.ok_or(ConfigError::MissingCollection)?;
        let container = self.container.ok_or(ConfigError::MissingContainer)?;
        let factory = self.view_factory.ok_or(ConfigError::MissingViewFactory)?;
        self.config.validate()?;

        let id = GridId::next();
        let item_width = self.config.item_width(container.width());
        let state = GridState {
            id,
            columns: ColumnTracker::new(self.config.column_count),
            views: ViewRegistry::new(factory, id, collection.clone()),
            scheduler: PlacementScheduler::new(self.config.orders_placement()),
            container,
            executor: LayoutExecutor::new(item_width, self.config.gutter),
            generation: 0,
            pending_measurements: 0,
            subscriptions: None,
            alive: true,
            last_error: None,
            config: self.config,
        };
        let core = Arc::new(GridCore {
            state: Mutex::new(state),
            collection,
            event_loop: self.event_loop.unwrap_or_default(),
            signals: GridSignals::new(),
        });

        let subscriptions = subscribe(&core);
        core.state.lock().subscriptions = Some(subscriptions);
        tracing::debug!(target: targets::GRID, grid = id.as_u64(), item_width, "grid created");

        Ok(MasonryGrid { core })
    }
}

impl<T: GridItem> Default for MasonryGridBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn subscribe<T: GridItem>(core: &Arc<GridCore<T>>) -> Subscriptions {
    let signals = core.collection.signals();

    let weak: Weak<GridCore<T>> = Arc::downgrade(core);
    let added = signals.item_added.connect(move |(handle, _index)| {
        if let Some(core) = weak.upgrade() {
            core.report("add", core.add(handle));
        }
    });

    let weak: Weak<GridCore<T>> = Arc::downgrade(core);
    let removed = signals.item_removed.connect(move |(handle, _index)| {
        if let Some(core) = weak.upgrade() {
            let result = core.remove_item(handle.id()).map(|_| ());
            core.report("remove", result);
        }
    });

    let weak: Weak<GridCore<T>> = Arc::downgrade(core);
    let sorted = signals.sorted.connect(move |_| {
        if let Some(core) = weak.upgrade() {
            core.report("reflow", core.reflow());
        }
    });

    let weak: Weak<GridCore<T>> = Arc::downgrade(core);
    let reset = signals.reset.connect(move |_| {
        if let Some(core) = weak.upgrade() {
            core.report("reset", core.reset());
        }
    });

    Subscriptions {
        added,
        removed,
        sorted,
        reset,
    }
}

static_assertions::assert_impl_all!(GridSignals: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::container::NodeId;
    use crate::grid::headless::HeadlessContainer;
    use crate::grid::view::ItemView;
    use crate::model::ItemCollection;
    use std::time::Duration;

    struct Block(f32);

    impl GridItem for Block {
        fn type_tag(&self) -> &str {
            "block"
        }
    }

    struct BlockView {
        node: NodeId,
        height: f32,
        container: HeadlessContainer,
        rendered: bool,
    }

    impl ItemView for BlockView {
        fn node(&self) -> NodeId {
            self.node
        }
        fn render(&mut self) {
            self.container.set_intrinsic_height(self.node, self.height);
            self.rendered = true;
        }
        fn is_rendered(&self) -> bool {
            self.rendered
        }
        fn remove(&mut self) {}
    }

    fn factory(container: &HeadlessContainer) -> ViewFactory<Block> {
        let container = container.clone();
        ViewFactory::single(move |options: crate::grid::view::ViewOptions<Block>| {
            Box::new(BlockView {
                node: NodeId::next(),
                height: options.item.0,
                container: container.clone(),
                rendered: false,
            })
        })
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let container = HeadlessContainer::new(100.0);
        let blocks = Arc::new(ItemCollection::<Block>::empty());

        let err = MasonryGrid::<Block>::builder()
            .container(container.clone())
            .view_factory(factory(&container))
            .build()
            .unwrap_err();
        assert_eq!(err, GridError::Configuration(ConfigError::MissingCollection));

        let err = MasonryGrid::builder()
            .collection(blocks.clone())
            .view_factory(factory(&container))
            .build()
            .unwrap_err();
        assert_eq!(err, GridError::Configuration(ConfigError::MissingContainer));

        let err = MasonryGrid::builder()
            .collection(blocks.clone())
            .container(container.clone())
            .build()
            .unwrap_err();
        assert_eq!(err, GridError::Configuration(ConfigError::MissingViewFactory));

        let err = MasonryGrid::builder()
            .collection(blocks)
            .container(container.clone())
            .view_factory(factory(&container))
            .config(GridConfig::new().with_column_count(0))
            .build()
            .unwrap_err();
        assert_eq!(err, GridError::Configuration(ConfigError::InvalidColumnCount(0)));
    }

    #[test]
    fn test_layout_batches_into_one_pass() {
        let container = HeadlessContainer::new(310.0);
        let blocks = Arc::new(ItemCollection::new(vec![Block(10.0), Block(20.0)]));
        let event_loop = EventLoop::new();
        let grid = MasonryGrid::builder()
            .collection(blocks.clone())
            .container(container.clone())
            .view_factory(factory(&container))
            .config(GridConfig::new().with_column_count(2).with_gutter(10.0))
            .event_loop(event_loop.clone())
            .build()
            .unwrap();

        let passes = Arc::new(Mutex::new(Vec::new()));
        let passes_clone = passes.clone();
        grid.signals().layout_finished.connect(move |height| {
            passes_clone.lock().push(*height);
        });

        grid.render().unwrap();
        blocks.push(Block(5.0));
        assert_eq!(grid.pending_count(), 3);

        event_loop.advance(Duration::from_millis(19));
        assert_eq!(container.child_count(), 0);

        event_loop.advance(Duration::from_millis(1));
        assert_eq!(container.child_count(), 3);
        assert_eq!(grid.pending_count(), 0);
        assert_eq!(grid.column_heights(), vec![35.0, 30.0]);
        assert_eq!(*passes.lock(), vec![35.0]);
    }

    #[test]
    fn test_stale_measurements_are_dropped() {
        let container = HeadlessContainer::new(200.0);
        let blocks = Arc::new(ItemCollection::new(vec![Block(10.0)]));
        let event_loop = EventLoop::new();
        let grid = MasonryGrid::builder()
            .collection(blocks.clone())
            .container(container.clone())
            .view_factory(factory(&container))
            .config(GridConfig::new().with_column_count(1).with_gutter(0.0))
            .event_loop(event_loop.clone())
            .build()
            .unwrap();

        grid.render().unwrap();
        // Flush now, leaving the measurement posted but not run.
        grid.core.flush();
        grid.reflow().unwrap();

        event_loop.run_pending();
        assert_eq!(grid.column_heights(), vec![0.0]);
        assert_eq!(grid.pending_count(), 1);

        event_loop.run_until_idle();
        assert_eq!(grid.column_heights(), vec![10.0]);
        assert_eq!(grid.pending_count(), 0);
    }

    #[test]
    fn test_dropping_grid_disconnects_collection() {
        let container = HeadlessContainer::new(200.0);
        let blocks = Arc::new(ItemCollection::new(vec![Block(10.0)]));
        let grid = MasonryGrid::builder()
            .collection(blocks.clone())
            .container(container.clone())
            .view_factory(factory(&container))
            .build()
            .unwrap();
        assert_eq!(blocks.signals().item_added.connection_count(), 1);

        drop(grid);
        assert_eq!(blocks.signals().item_added.connection_count(), 0);
        assert_eq!(blocks.signals().reset.connection_count(), 0);
    }
}
