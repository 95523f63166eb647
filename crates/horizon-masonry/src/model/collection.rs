//! Observable item collections.
//!
//! `ItemCollection<T>` is an ordered list of shared items that announces every
//! change through [`CollectionSignals`]. Each item receives a stable
//! [`ItemId`] when it enters the collection; the id survives sorting and is
//! what views and layout records are keyed on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_masonry_core::Signal;
use parking_lot::RwLock;

/// Identity of an item inside a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    /// Get the raw u64 value of this item ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique item IDs.
static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

fn next_item_id() -> ItemId {
    ItemId(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
}

/// A shared handle to one collection member.
///
/// Handles are cheap to clone; two handles are the same item when their
/// [`id`](Self::id)s match.
pub struct ItemHandle<T> {
    id: ItemId,
    item: Arc<T>,
}

impl<T> ItemHandle<T> {
    /// Wrap an item, assigning it a fresh identity.
    pub fn new(item: T) -> Self {
        Self {
            id: next_item_id(),
            item: Arc::new(item),
        }
    }

    /// The item's identity.
    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Borrow the item.
    #[inline]
    pub fn item(&self) -> &T {
        &self.item
    }

    /// The shared item.
    pub fn shared(&self) -> Arc<T> {
        self.item.clone()
    }
}

impl<T> Clone for ItemHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            item: self.item.clone(),
        }
    }
}

impl<T> std::ops::Deref for ItemHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ItemHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemHandle")
            .field("id", &self.id)
            .field("item", &self.item)
            .finish()
    }
}

/// Change notifications emitted by a collection.
///
/// All signals fire after the collection's internal lock is released, so
/// slots may read the collection.
pub struct CollectionSignals<T> {
    /// Emitted after an item was inserted.
    /// Args: (item, index it was inserted at)
    pub item_added: Signal<(ItemHandle<T>, usize)>,

    /// Emitted after an item was removed.
    /// Args: (item, index it was removed from)
    pub item_removed: Signal<(ItemHandle<T>, usize)>,

    /// Emitted after the collection was reordered.
    pub sorted: Signal<()>,

    /// Emitted after the whole content was replaced or cleared.
    pub reset: Signal<()>,
}

impl<T: Send + Sync + 'static> CollectionSignals<T> {
    /// Creates a new set of collection signals.
    pub fn new() -> Self {
        Self {
            item_added: Signal::new(),
            item_removed: Signal::new(),
            sorted: Signal::new(),
            reset: Signal::new(),
        }
    }
}

impl<T: Send + Sync + 'static> Default for CollectionSignals<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The collection contract a masonry grid observes.
///
/// A grid only ever reads a collection: it iterates it on reflow and listens
/// to its signals.
pub trait Collection<T>: Send + Sync {
    /// The current members, in iteration order.
    fn snapshot(&self) -> Vec<ItemHandle<T>>;

    /// The collection's change notifications.
    fn signals(&self) -> &CollectionSignals<T>;

    /// The number of members.
    fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` if the collection has no members.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered, observable list of items.
///
/// # Example
///
/// ```
/// use horizon_masonry::model::{Collection, ItemCollection};
///
/// let photos = ItemCollection::new(vec!["sunset".to_string(), "harbour".to_string()]);
/// photos.signals().item_added.connect(|(handle, index)| {
///     println!("{} added at {}", handle.item(), index);
/// });
///
/// let id = photos.push("forest".to_string());
/// assert_eq!(photos.len(), 3);
/// assert_eq!(photos.get(id).map(|h| h.item().clone()), Some("forest".to_string()));
/// ```
pub struct ItemCollection<T> {
    items: RwLock<Vec<ItemHandle<T>>>,
    signals: CollectionSignals<T>,
}

impl<T: Send + Sync + 'static> ItemCollection<T> {
    /// Creates a collection holding `items`, without emitting any signal.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().map(ItemHandle::new).collect()),
            signals: CollectionSignals::new(),
        }
    }

    /// Creates an empty collection.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the number of items in the collection.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Appends an item and returns its identity.
    pub fn push(&self, item: T) -> ItemId {
        let handle = ItemHandle::new(item);
        let id = handle.id();
        let index = {
            let mut items = self.items.write();
            items.push(handle.clone());
            items.len() - 1
        };
        self.signals.item_added.emit((handle, index));
        id
    }

    /// Inserts an item at `index` and returns its identity.
    ///
    /// `index` is clamped to the collection length.
    pub fn insert(&self, index: usize, item: T) -> ItemId {
        let handle = ItemHandle::new(item);
        let id = handle.id();
        let index = {
            let mut items = self.items.write();
            let index = index.min(items.len());
            items.insert(index, handle.clone());
            index
        };
        self.signals.item_added.emit((handle, index));
        id
    }

    /// Appends several items, emitting `item_added` once per item.
    pub fn extend<I>(&self, items: I) -> Vec<ItemId>
    where
        I: IntoIterator<Item = T>,
    {
        items.into_iter().map(|item| self.push(item)).collect()
    }

    /// Removes the item at `index`.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn remove(&self, index: usize) -> Option<ItemHandle<T>> {
        let removed = {
            let mut items = self.items.write();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.signals.item_removed.emit((removed.clone(), index));
        Some(removed)
    }

    /// Removes the item with the given identity.
    pub fn remove_id(&self, id: ItemId) -> Option<ItemHandle<T>> {
        let index = self.position(id)?;
        self.remove(index)
    }

    /// Returns the position of the item with the given identity.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.read().iter().position(|handle| handle.id() == id)
    }

    /// Returns a handle to the item with the given identity.
    pub fn get(&self, id: ItemId) -> Option<ItemHandle<T>> {
        self.items
            .read()
            .iter()
            .find(|handle| handle.id() == id)
            .cloned()
    }

    /// Returns a handle to the item at `index`.
    pub fn at(&self, index: usize) -> Option<ItemHandle<T>> {
        self.items.read().get(index).cloned()
    }

    /// Sorts the collection using the provided comparator.
    ///
    /// Items keep their identities. Emits `sorted`.
    pub fn sort_by<F>(&self, mut compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        self.items
            .write()
            .sort_by(|a, b| compare(a.item(), b.item()));
        self.signals.sorted.emit(());
    }

    /// Replaces all items. Every new item gets a fresh identity. Emits `reset`.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.write() = items.into_iter().map(ItemHandle::new).collect();
        self.signals.reset.emit(());
    }

    /// Removes all items. Emits `reset`.
    pub fn clear(&self) {
        self.items.write().clear();
        self.signals.reset.emit(());
    }

    /// Returns handles to all items, in order.
    pub fn items(&self) -> Vec<ItemHandle<T>> {
        self.items.read().clone()
    }
}

impl<T: Send + Sync + 'static> Collection<T> for ItemCollection<T> {
    fn snapshot(&self) -> Vec<ItemHandle<T>> {
        self.items()
    }

    fn signals(&self) -> &CollectionSignals<T> {
        &self.signals
    }

    fn len(&self) -> usize {
        ItemCollection::len(self)
    }
}

impl<T: Send + Sync + 'static> Default for ItemCollection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

static_assertions::assert_impl_all!(ItemCollection<String>: Send, Sync);
