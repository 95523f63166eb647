//! Core systems for Horizon Masonry.
//!
//! This crate provides the foundational components the masonry layout engine
//! is built on:
//!
//! - **Signal/Slot System**: Type-safe notifications with direct or queued delivery
//! - **Event Loop**: Deferred one-shot tasks on a virtual clock
//! - **Geometry**: Points, sizes and rectangles
//! - **Logging**: Tracing targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_masonry_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Event Loop Example
//!
//! ```
//! use horizon_masonry_core::EventLoop;
//! use std::time::Duration;
//!
//! let event_loop = EventLoop::new();
//! event_loop.schedule(Duration::from_millis(20), || println!("batched work"));
//! event_loop.post(|| println!("runs first"));
//!
//! assert_eq!(event_loop.run_until_idle(), 2);
//! ```

mod error;
pub mod event_loop;
pub mod geometry;
pub mod logging;
pub mod signal;

pub use error::{CoreError, LoopError, Result, SignalError};
pub use event_loop::{EventLoop, TaskId};
pub use geometry::{Point, Rect, Size};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, ConnectionType, Signal};
