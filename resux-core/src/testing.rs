//! In-memory raw collection for exercising [`PaginationAdapter`] without a
//! provider. Compiled for tests and under the `test-export-mocks` feature so
//! downstream crates can reuse it.
//!
//! [`PaginationAdapter`]: crate::pagination::PaginationAdapter

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::ProviderError;
use crate::pagination::{Cursor, RawCollection};

/// Counts every blocking call made against a [`StubCollection`].
#[derive(Debug, Default)]
pub struct CallCounts {
    constructed: AtomicUsize,
    count: AtomicUsize,
    get: AtomicUsize,
    slice: AtomicUsize,
    advanced: AtomicUsize,
}

impl CallCounts {
    /// Times the factory built a collection.
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn get(&self) -> usize {
        self.get.load(Ordering::SeqCst)
    }

    pub fn slice(&self) -> usize {
        self.slice.load(Ordering::SeqCst)
    }

    /// Cursor advances, including the final one that reports exhaustion.
    pub fn advanced(&self) -> usize {
        self.advanced.load(Ordering::SeqCst)
    }
}

pub struct StubCollection<I> {
    items: Vec<I>,
    fail_at: Option<usize>,
    calls: Arc<CallCounts>,
}

type StubFactory<I> =
    Box<dyn Fn() -> Result<StubCollection<I>, ProviderError> + Send + Sync + 'static>;

impl<I> StubCollection<I>
where
    I: Clone + Send + Sync + 'static,
{
    /// A factory building a collection over `items`, and the counters it reports to.
    pub fn factory(items: Vec<I>) -> (StubFactory<I>, Arc<CallCounts>) {
        Self::build_factory(items, None)
    }

    /// Like [`StubCollection::factory`], but iteration fails with a 500 when
    /// the cursor reaches position `fail_at`.
    pub fn failing_factory(items: Vec<I>, fail_at: usize) -> (StubFactory<I>, Arc<CallCounts>) {
        Self::build_factory(items, Some(fail_at))
    }

    fn build_factory(items: Vec<I>, fail_at: Option<usize>) -> (StubFactory<I>, Arc<CallCounts>) {
        let calls = Arc::new(CallCounts::default());
        let counts = Arc::clone(&calls);
        let factory: StubFactory<I> = Box::new(move || {
            counts.constructed.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ProviderError>(StubCollection {
                items: items.clone(),
                fail_at,
                calls: Arc::clone(&counts),
            })
        });
        (factory, calls)
    }
}

impl<I> RawCollection for StubCollection<I>
where
    I: Clone + Send + Sync + 'static,
{
    type Item = I;

    fn count(&self) -> Result<usize, ProviderError> {
        self.calls.count.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.len())
    }

    fn get(&self, index: usize) -> Result<I, ProviderError> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        self.items
            .get(index)
            .cloned()
            .ok_or(ProviderError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
    }

    fn slice(&self, start: usize, stop: usize) -> Result<Vec<I>, ProviderError> {
        self.calls.slice.fetch_add(1, Ordering::SeqCst);
        let stop = stop.min(self.items.len());
        let start = start.min(stop);
        Ok(self.items[start..stop].to_vec())
    }

    fn cursor(self: Arc<Self>) -> Cursor<I> {
        let mut position = 0;
        Box::new(std::iter::from_fn(move || {
            self.calls.advanced.fetch_add(1, Ordering::SeqCst);
            if self.fail_at == Some(position) {
                position += 1;
                return Some(Err(ProviderError::Status {
                    status: 500,
                    message: "stub failure".to_string(),
                }));
            }
            let item = self.items.get(position).cloned()?;
            position += 1;
            Some(Ok(item))
        }))
    }
}
