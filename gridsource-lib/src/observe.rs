//! Observable item collection for change monitoring.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::Weak;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::model::Item;

type Listener = Arc<dyn Fn() + Send + Sync>;

/// A shared, mutable list of items that notifies subscribers on mutation.
///
/// `ObservableItems` is cheap to clone (uses `Arc` internally); clones see
/// the same items and the same subscribers. Every mutating method notifies
/// all current subscribers once, after the internal lock is released, so a
/// listener may read the collection.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use gridsource_lib::model::Item;
/// use gridsource_lib::observe::ObservableItems;
///
/// let items = ObservableItems::new(vec![Item::new().set("id", 1)]);
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = hits.clone();
/// let mut subscription = items.subscribe(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// items.push(Item::new().set("id", 2));
/// subscription.dispose();
/// items.push(Item::new().set("id", 3));
///
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// assert_eq!(items.len(), 3);
/// ```
#[derive(Clone, Default)]
pub struct ObservableItems {
    inner: Arc<ObservableInner>,
}

#[derive(Default)]
struct ObservableInner {
    items: RwLock<Vec<Item>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl ObservableInner {
    fn listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners().retain(|(listener_id, _)| *listener_id != id);
    }
}

impl ObservableItems {
    /// Creates a collection holding `items`.
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            inner: Arc::new(ObservableInner {
                items: RwLock::new(items),
                ..Default::default()
            }),
        }
    }

    /// Returns a copy of the current items.
    pub fn snapshot(&self) -> Vec<Item> {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if both handles point at the same collection.
    pub fn ptr_eq(&self, other: &ObservableItems) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Appends an item.
    pub fn push(&self, item: Item) {
        self.update(|items| items.push(item));
    }

    /// Inserts an item at `index`, or at the end if `index` is past it.
    pub fn insert(&self, index: usize, item: Item) {
        self.update(|items| {
            let index = index.min(items.len());
            items.insert(index, item);
        });
    }

    /// Removes and returns the item at `index`.
    ///
    /// Subscribers are only notified if an item was removed.
    pub fn remove(&self, index: usize) -> Option<Item> {
        let removed = {
            let mut items = self.write();
            (index < items.len()).then(|| items.remove(index))
        };
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    /// Replaces the item at `index`, returning the previous one.
    ///
    /// Subscribers are only notified if `index` was in range.
    pub fn set(&self, index: usize, item: Item) -> Option<Item> {
        let previous = {
            let mut items = self.write();
            items
                .get_mut(index)
                .map(|slot| std::mem::replace(slot, item))
        };
        if previous.is_some() {
            self.notify();
        }
        previous
    }

    /// Removes all items.
    pub fn clear(&self) {
        self.update(Vec::clear);
    }

    /// Replaces the whole collection.
    pub fn replace(&self, items: Vec<Item>) {
        self.update(|current| *current = items);
    }

    /// Mutates the items in place and notifies subscribers once.
    pub fn update<R>(&self, f: impl FnOnce(&mut Vec<Item>) -> R) -> R {
        let result = {
            let mut items = self.write();
            f(&mut items)
        };
        self.notify();
        result
    }

    /// Registers a callback invoked after every mutation.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// disposed or dropped.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.listeners().push((id, Arc::new(callback)));
        Subscription {
            id,
            target: Arc::downgrade(&self.inner),
        }
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners().len()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Item>> {
        self.inner.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl From<Vec<Item>> for ObservableItems {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}

impl fmt::Debug for ObservableItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableItems")
            .field("len", &self.len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle to a registered change callback.
///
/// Disposing is idempotent; dropping the handle disposes it.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    target: Weak<ObservableInner>,
}

impl Subscription {
    /// Unregisters the callback. Later mutations no longer reach it.
    pub fn dispose(&mut self) {
        if let Some(inner) = self.target.upgrade() {
            inner.unsubscribe(self.id);
        }
        self.target = Weak::new();
    }

    /// Returns `true` while the callback is registered.
    pub fn is_active(&self) -> bool {
        let Some(inner) = self.target.upgrade() else {
            return false;
        };
        inner.listeners().iter().any(|(id, _)| *id == self.id)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let inner = hits.clone();
        (hits, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_each_mutation_notifies_once() {
        let items = ObservableItems::default();
        let (hits, callback) = counter();
        let _sub = items.subscribe(callback);

        items.push(Item::new().set("a", 1));
        items.insert(0, Item::new().set("a", 0));
        items.set(1, Item::new().set("a", 2));
        items.remove(0);
        items.replace(vec![]);
        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_out_of_range_edits_do_not_notify() {
        let items = ObservableItems::new(vec![Item::new()]);
        let (hits, callback) = counter();
        let _sub = items.subscribe(callback);

        assert!(items.remove(3).is_none());
        assert!(items.set(3, Item::new()).is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let items = ObservableItems::default();
        let (hits, callback) = counter();
        {
            let sub = items.subscribe(callback);
            assert!(sub.is_active());
            assert_eq!(items.subscriber_count(), 1);
        }
        assert_eq!(items.subscriber_count(), 0);
        items.push(Item::new());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let items = ObservableItems::default();
        let (_, callback) = counter();
        let mut sub = items.subscribe(callback);
        sub.dispose();
        sub.dispose();
        assert!(!sub.is_active());
    }

    #[test]
    fn test_listener_can_read_collection() {
        let items = ObservableItems::default();
        let seen = Arc::new(AtomicUsize::new(0));
        let (reader, sink) = (items.clone(), seen.clone());
        let _sub = items.subscribe(move || {
            sink.store(reader.len(), Ordering::SeqCst);
        });
        items.push(Item::new());
        items.push(Item::new());
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let a = ObservableItems::default();
        let b = a.clone();
        b.push(Item::new());
        assert_eq!(a.len(), 1);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&ObservableItems::default()));
    }
}
