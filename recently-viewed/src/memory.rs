use crate::MAX_PRODUCTS;
use crate::RecentlyViewedStore;
use crate::Result;
use crate::push_front;
use parking_lot::Mutex;

/// Process-local store, used by tests and by hosts that manage persistence
/// themselves.
#[derive(Debug)]
pub struct InMemoryStore {
    ids: Mutex<Vec<String>>,
    limit: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            ids: Mutex::new(Vec::new()),
            limit: MAX_PRODUCTS,
        }
    }
}

impl InMemoryStore {
    /// Seeds the store with `ids` given most-recent-first.
    pub fn with_products<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let store = Self::default();
        let mut seeded: Vec<String> = Vec::new();
        for id in ids {
            let id = id.as_ref();
            if !seeded.iter().any(|existing| existing == id) {
                seeded.push(id.to_string());
            }
        }
        seeded.truncate(store.limit);
        *store.ids.lock() = seeded;
        store
    }
}

impl RecentlyViewedStore for InMemoryStore {
    fn products(&self) -> Result<Vec<String>> {
        Ok(self.ids.lock().clone())
    }

    fn record(&self, product_id: &str) -> Result<()> {
        push_front(&mut self.ids.lock(), product_id, self.limit);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.ids.lock().clear();
        Ok(())
    }
}
