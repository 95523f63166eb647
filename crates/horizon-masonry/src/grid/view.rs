//! Item views and the policies that construct them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};

use horizon_masonry_core::Signal;

use super::container::NodeId;
use super::error::{GridError, GridResult};
use crate::model::{Collection, ItemHandle};

static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies a grid instance. Passed to views as their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridId(u64);

impl GridId {
    pub(crate) fn next() -> Self {
        Self(NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// An item a grid can display.
///
/// The type tag selects a constructor when the grid is built with
/// [`ViewFactory::typed`].
pub trait GridItem: Send + Sync + 'static {
    /// Tag naming the kind of view this item needs, e.g. `"photo"`.
    fn type_tag(&self) -> &str;
}

/// A renderable view for one collection item.
///
/// Views are created by a [`ViewFactory`] and owned by the grid until the
/// item is removed or the grid is torn down.
pub trait ItemView: Send {
    /// Root node of the view in the container.
    fn node(&self) -> NodeId;

    /// Builds the view's content. Only called while `is_rendered()` is false.
    fn render(&mut self);

    /// Whether `render` has run.
    fn is_rendered(&self) -> bool;

    /// Whether the view's final size becomes known later, e.g. once an image
    /// has loaded.
    fn is_async(&self) -> bool {
        false
    }

    /// For asynchronous views, whether readiness has already been reached.
    fn is_done(&self) -> bool {
        false
    }

    /// One-shot notification an asynchronous view emits when it is ready to
    /// be measured.
    fn ready_signal(&self) -> Option<Arc<Signal<()>>> {
        None
    }

    /// Tears the view down. Called once, when the grid releases it.
    fn remove(&mut self);
}

/// Options handed to a view constructor.
pub struct ViewOptions<T> {
    /// The item to display.
    pub item: ItemHandle<T>,
    /// The collection the item belongs to.
    pub collection: Arc<dyn Collection<T>>,
    /// The grid creating the view.
    pub parent: GridId,
    /// User-supplied fields from [`GridConfig::view_options`](super::GridConfig::view_options).
    pub extra: Map<String, Value>,
}

impl<T> ViewOptions<T> {
    /// Looks up a user-supplied option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl<T: fmt::Debug> fmt::Debug for ViewOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewOptions")
            .field("item", &self.item)
            .field("parent", &self.parent)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

/// A function producing a view for an item.
pub type ViewConstructor<T> = Arc<dyn Fn(ViewOptions<T>) -> Box<dyn ItemView> + Send + Sync>;

/// How a grid picks the constructor for each item.
///
/// # Example
///
/// ```
/// use horizon_masonry::grid::{ItemView, NodeId, ViewFactory};
///
/// struct Tile {
///     node: NodeId,
///     rendered: bool,
/// }
///
/// impl ItemView for Tile {
///     fn node(&self) -> NodeId { self.node }
///     fn render(&mut self) { self.rendered = true; }
///     fn is_rendered(&self) -> bool { self.rendered }
///     fn remove(&mut self) {}
/// }
///
/// let factory = ViewFactory::<String>::typed()
///     .with("photo", |_| Box::new(Tile { node: NodeId::next(), rendered: false }))
///     .with("note", |_| Box::new(Tile { node: NodeId::next(), rendered: false }));
/// assert_eq!(factory.tags().len(), 2);
/// ```
pub enum ViewFactory<T> {
    /// One constructor used for every item.
    Single(ViewConstructor<T>),
    /// Constructors keyed by [`GridItem::type_tag`].
    Typed(HashMap<String, ViewConstructor<T>>),
}

impl<T> ViewFactory<T> {
    /// A factory that uses `constructor` for every item.
    pub fn single<F>(constructor: F) -> Self
    where
        F: Fn(ViewOptions<T>) -> Box<dyn ItemView> + Send + Sync + 'static,
    {
        Self::Single(Arc::new(constructor))
    }

    /// An empty tag-keyed factory. Add constructors with [`with`](Self::with).
    pub fn typed() -> Self {
        Self::Typed(HashMap::new())
    }

    /// Registers `constructor` for `tag`.
    ///
    /// Turns a single-constructor factory into a tag-keyed one, dropping the
    /// previous constructor.
    pub fn with<F>(self, tag: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(ViewOptions<T>) -> Box<dyn ItemView> + Send + Sync + 'static,
    {
        let mut map = match self {
            Self::Typed(map) => map,
            Self::Single(_) => HashMap::new(),
        };
        map.insert(tag.into(), Arc::new(constructor) as ViewConstructor<T>);
        Self::Typed(map)
    }

    /// Registered tags, empty for a single-constructor factory.
    pub fn tags(&self) -> Vec<&str> {
        match self {
            Self::Single(_) => Vec::new(),
            Self::Typed(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

impl<T: GridItem> ViewFactory<T> {
    /// The constructor for `item`.
    pub fn constructor_for(&self, item: &T) -> GridResult<&ViewConstructor<T>> {
        match self {
            Self::Single(constructor) => Ok(constructor),
            Self::Typed(map) => {
                let tag = item.type_tag();
                map.get(tag).ok_or_else(|| GridError::MissingViewConstructor {
                    type_tag: tag.to_owned(),
                })
            }
        }
    }
}

impl<T> Clone for ViewFactory<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Single(constructor) => Self::Single(constructor.clone()),
            Self::Typed(map) => Self::Typed(map.clone()),
        }
    }
}

impl<T> fmt::Debug for ViewFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(_) => f.write_str("ViewFactory::Single"),
            Self::Typed(map) => f
                .debug_tuple("ViewFactory::Typed")
                .field(&map.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}
