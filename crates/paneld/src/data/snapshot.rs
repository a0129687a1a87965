use std::sync::{Arc, RwLock};

/// Publication point of one data domain.
///
/// Exactly one refresh worker writes into a cell; any number of screens read
/// from it. A write swaps the inner `Arc` wholesale, so a reader either gets
/// the previous fully-formed snapshot or the new one, never a partial
/// update. Readers keep their `Arc` for as long as they render from it.
pub struct SnapshotCell<T> {
    inner: Arc<RwLock<Arc<T>>>,
}

impl<T> Clone for SnapshotCell<T> {
    fn clone(&self) -> Self {
        SnapshotCell {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        SnapshotCell::new(T::default())
    }
}

impl<T> SnapshotCell<T> {
    pub fn new(initial: T) -> Self {
        SnapshotCell {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Replace the published snapshot. The critical section is a single
    /// pointer swap.
    pub fn publish(&self, value: T) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(value);
    }

    /// Get the most recently published snapshot.
    pub fn load(&self) -> Arc<T> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotCell;

    #[test]
    fn readers_keep_their_snapshot_across_publishes() {
        let cell = SnapshotCell::new(vec![1, 2, 3]);
        let before = cell.load();
        cell.publish(vec![4]);
        assert_eq!(*before, vec![1, 2, 3]);
        assert_eq!(*cell.load(), vec![4]);
    }

    #[test]
    fn clones_share_the_same_slot() {
        let cell = SnapshotCell::new(0u32);
        let reader = cell.clone();
        cell.publish(7);
        assert_eq!(*reader.load(), 7);
    }

    #[test]
    fn concurrent_publish_and_load_never_observe_a_torn_value() {
        let cell = SnapshotCell::new((0u64, 0u64));
        let writer = cell.clone();
        let handle = std::thread::spawn(move || {
            for i in 1..=1000u64 {
                writer.publish((i, i));
            }
        });
        for _ in 0..1000 {
            let snapshot = cell.load();
            assert_eq!(snapshot.0, snapshot.1);
        }
        handle.join().unwrap();
    }
}
