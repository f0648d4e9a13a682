use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::trace;

use crate::calendar::YearMonth;

/// Read-through cache of per-user, per-month values.
///
/// Values are derived from the store, so any write for a user drops all of
/// that user's months: an installment purchase touches months far from its
/// own date.
#[derive(Debug)]
pub struct MonthCache<V> {
    entries: HashMap<(i64, YearMonth), V>,
    hits: u64,
    misses: u64,
}

impl<V> Default for MonthCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V> MonthCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: i64, month: YearMonth) -> Option<&V> {
        self.entries.get(&(user_id, month))
    }

    /// The cached value, or the result of `load` stored for next time. A
    /// failed load caches nothing.
    pub fn get_or_try_load<E>(
        &mut self,
        user_id: i64,
        month: YearMonth,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<&V, E> {
        match self.entries.entry((user_id, month)) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                trace!(user = user_id, %month, "month cache miss");
                let value = load()?;
                Ok(entry.insert(value))
            }
        }
    }

    pub fn invalidate(&mut self, user_id: i64, month: YearMonth) {
        self.entries.remove(&(user_id, month));
    }

    /// Drop every month cached for `user_id`.
    pub fn invalidate_user(&mut self, user_id: i64) {
        let before = self.entries.len();
        self.entries.retain(|(user, _), _| *user != user_id);
        trace!(user = user_id, dropped = before - self.entries.len(), "month cache invalidated");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
