//! Signal/slot system for Horizon Masonry.
//!
//! Signals are emitted by collections, views and grids when their state
//! changes, and connected slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionType`] - Whether a slot runs during `emit` or on the event loop
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Connection Types
//!
//! - **Direct**: Slot is called immediately inside [`Signal::emit`]
//! - **Queued**: Slot execution is posted to an [`EventLoop`] and runs when the
//!   loop next processes due tasks
//!
//! Queued connections are how a receiver avoids re-entrancy: an emitter that
//! fires while the receiver is busy (for example from inside a callback the
//! receiver itself invoked) only enqueues work.
//!
//! # Example
//!
//! ```
//! use horizon_masonry_core::Signal;
//!
//! let layout_finished = Signal::<f32>::new();
//!
//! let conn_id = layout_finished.connect(|height| {
//!     println!("grid is now {height}px tall");
//! });
//!
//! layout_finished.emit(480.0);
//! layout_finished.disconnect(conn_id);
//! ```

use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, SignalError};
use crate::event_loop::EventLoop;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

/// Specifies how a connected slot is invoked when the signal is emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionType {
    /// Invoke the slot immediately, inside `emit`.
    #[default]
    Direct,

    /// Post the slot invocation to an event loop.
    ///
    /// The slot runs the next time the loop processes due tasks, after the
    /// emitter has returned.
    Queued,
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke.
    slot: Slot<Args>,
    /// Where queued invocations are posted. `None` for direct connections.
    queue: Option<EventLoop>,
}

impl<Args> Connection<Args> {
    fn connection_type(&self) -> ConnectionType {
        if self.queue.is_some() {
            ConnectionType::Queued
        } else {
            ConnectionType::Direct
        }
    }
}

type ConnectionTable<Args> = Mutex<SlotMap<ConnectionId, Connection<Args>>>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
///
/// # Re-entrancy
///
/// `emit` snapshots the connected slots and releases its internal lock before
/// invoking them, so a slot may connect or disconnect slots on the same signal
/// (including itself) without deadlocking. A slot disconnected during an
/// emission still receives that emission.
pub struct Signal<Args> {
    /// All active connections.
    connections: Arc<ConnectionTable<Args>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) that is invoked directly during `emit`.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_masonry_core::Signal;
    ///
    /// let tag_seen = Signal::<String>::new();
    /// let id = tag_seen.connect(|tag| println!("view type: {tag}"));
    /// tag_seen.emit("photo".to_string());
    /// assert!(tag_seen.is_connected(id));
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
            queue: None,
        })
    }

    /// Connect a slot whose invocations are posted to `event_loop`.
    ///
    /// The slot receives a clone of the emitted arguments once the loop runs
    /// the posted task.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_masonry_core::{EventLoop, Signal};
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicI32, Ordering};
    ///
    /// let event_loop = EventLoop::new();
    /// let signal = Signal::<i32>::new();
    /// let total = Arc::new(AtomicI32::new(0));
    ///
    /// let total_clone = total.clone();
    /// signal.connect_queued(&event_loop, move |&n| {
    ///     total_clone.fetch_add(n, Ordering::SeqCst);
    /// });
    ///
    /// signal.emit(5);
    /// assert_eq!(total.load(Ordering::SeqCst), 0);
    /// event_loop.run_pending();
    /// assert_eq!(total.load(Ordering::SeqCst), 5);
    /// ```
    pub fn connect_queued<F>(&self, event_loop: &EventLoop, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
            queue: Some(event_loop.clone()),
        })
    }

    /// Connect a slot with automatic disconnection when the guard is dropped.
    ///
    /// The guard only holds a weak reference to the connection table, so it
    /// may safely outlive the signal.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            connections: Arc::downgrade(&self.connections),
            id: Some(id),
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect a specific slot, reporting unknown IDs as an error.
    pub fn try_disconnect(&self, id: ConnectionId) -> Result<()> {
        if self.disconnect(id) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection.into())
        }
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Check whether `id` still refers to a live connection.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(id)
    }

    /// Get how a connection delivers its invocations.
    pub fn connection_type(&self, id: ConnectionId) -> Option<ConnectionType> {
        self.connections.lock().get(id).map(Connection::connection_type)
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots.
    ///
    /// Direct slots run before `emit` returns, in connection order. Queued
    /// slots are posted to their event loop with a clone of `args`.
    #[tracing::instrument(skip_all, target = "horizon_masonry_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "horizon_masonry_core::signal", "signal blocked, skipping emit");
            return;
        }

        let snapshot: Vec<(Slot<Args>, Option<EventLoop>)> = self
            .connections
            .lock()
            .values()
            .map(|conn| (conn.slot.clone(), conn.queue.clone()))
            .collect();
        tracing::trace!(target: "horizon_masonry_core::signal", connection_count = snapshot.len(), "emitting signal");

        for (slot, queue) in snapshot {
            match queue {
                None => slot(&args),
                Some(event_loop) => {
                    let args = args.clone();
                    event_loop.post(move || slot(&args));
                }
            }
        }
    }
}

/// A connection guard that automatically disconnects when dropped.
///
/// Created via [`Signal::connect_scoped`].
///
/// # Example
///
/// ```
/// use horizon_masonry_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Signal::<i32>::new();
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);
/// }
/// signal.emit(43);
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<Args> {
    connections: Weak<ConnectionTable<Args>>,
    id: Option<ConnectionId>,
}

impl<Args> ConnectionGuard<Args> {
    /// The guarded connection's ID.
    pub fn id(&self) -> Option<ConnectionId> {
        self.id
    }

    /// Disconnect now instead of on drop.
    ///
    /// Fails with [`SignalError::InvalidConnection`] if the signal was dropped
    /// or the connection was already removed.
    pub fn disconnect(mut self) -> Result<()> {
        if self.release() {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection.into())
        }
    }

    /// Keep the connection alive for the lifetime of the signal.
    pub fn forget(mut self) -> Option<ConnectionId> {
        self.id.take()
    }

    fn release(&mut self) -> bool {
        let Some(id) = self.id.take() else {
            return false;
        };
        self.connections
            .upgrade()
            .is_some_and(|table| table.lock().remove(id).is_some())
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        self.release();
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard<()>: Send, Sync);
