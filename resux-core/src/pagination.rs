//! # pagination: blocking provider collections behind the async [`Pagination`] contract
//!
//! A [`PaginationAdapter`] is built from three pieces:
//! - a **factory** producing the provider's raw collection (a [`RawCollection`]),
//! - a **mapping** function turning one raw record into a domain model,
//! - optionally a **key lookup** resolving a string identifier to one raw record.
//!
//! Every blocking call, including the factory itself, runs through the shared
//! [`Offloader`]. The raw collection is built at most once per adapter, on first
//! use, and every later `length`/`get`/`slice`/`stream` call reads that same
//! snapshot. Concurrent first callers wait on the same construction.
//!
//! Each [`Pagination::stream`] call owns an independent cursor over the memoized
//! collection, so two streams over one adapter never interfere.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::contract::{Key, Pagination};
use crate::error::{GitError, ProviderError, Result};
use crate::offload::Offloader;

/// Blocking iterator over a raw collection.
pub type Cursor<I> = Box<dyn Iterator<Item = std::result::Result<I, ProviderError>> + Send>;

/// Blocking, provider-side view of a sized, indexable collection.
///
/// Every method may perform network I/O and is only ever invoked from a
/// blocking worker.
pub trait RawCollection: Send + Sync + 'static {
    type Item: Send + 'static;

    /// Provider-reported number of elements.
    fn count(&self) -> std::result::Result<usize, ProviderError>;

    /// Element at `index`; [`ProviderError::IndexOutOfRange`] past the end.
    fn get(&self, index: usize) -> std::result::Result<Self::Item, ProviderError>;

    /// Elements in `start..stop`, clamped to the collection's end.
    fn slice(&self, start: usize, stop: usize)
        -> std::result::Result<Vec<Self::Item>, ProviderError>;

    /// Fresh cursor starting at the first element. Creating it must not block;
    /// each `next` may.
    fn cursor(self: Arc<Self>) -> Cursor<Self::Item>;
}

type Factory<C> = Arc<dyn Fn() -> std::result::Result<C, ProviderError> + Send + Sync>;
type Lookup<I> = Arc<dyn Fn(&str) -> std::result::Result<I, ProviderError> + Send + Sync>;
type Mapper<I, T> = Arc<dyn Fn(I) -> T + Send + Sync>;

/// State shared between an adapter and the streams it hands out.
struct Shared<C: RawCollection> {
    factory: Factory<C>,
    offloader: Offloader,
    raw: OnceCell<Arc<C>>,
    len: OnceCell<usize>,
}

impl<C: RawCollection> Shared<C> {
    async fn collection(&self) -> Result<Arc<C>> {
        let raw = self
            .raw
            .get_or_try_init(|| async {
                debug!(collection = std::any::type_name::<C>(), "constructing raw collection");
                let factory = Arc::clone(&self.factory);
                let raw = self.offloader.run(move || factory()).await??;
                Ok::<_, GitError>(Arc::new(raw))
            })
            .await?;
        Ok(Arc::clone(raw))
    }
}

pub struct PaginationAdapter<C: RawCollection, T> {
    shared: Arc<Shared<C>>,
    lookup: Option<Lookup<C::Item>>,
    map: Mapper<C::Item, T>,
}

impl<C, T> PaginationAdapter<C, T>
where
    C: RawCollection,
    T: Send + 'static,
{
    /// Adapter over the collection produced by `factory`. Nothing is called
    /// until the first operation.
    pub fn new<F, M>(offloader: Offloader, factory: F, map: M) -> Self
    where
        F: Fn() -> std::result::Result<C, ProviderError> + Send + Sync + 'static,
        M: Fn(C::Item) -> T + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                factory: Arc::new(factory),
                offloader,
                raw: OnceCell::new(),
                len: OnceCell::new(),
            }),
            lookup: None,
            map: Arc::new(map),
        }
    }

    /// Enables `get` with a string key.
    pub fn with_lookup<L>(mut self, lookup: L) -> Self
    where
        L: Fn(&str) -> std::result::Result<C::Item, ProviderError> + Send + Sync + 'static,
    {
        self.lookup = Some(Arc::new(lookup));
        self
    }

    pub fn supports_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    /// Boxes the adapter behind the provider-agnostic trait.
    pub fn boxed(self) -> Box<dyn Pagination<T>> {
        Box::new(self)
    }

    async fn resolve(&self, id: String) -> Result<C::Item> {
        let Some(lookup) = self.lookup.as_ref().map(Arc::clone) else {
            return Err(GitError::UnsupportedKeyType { key: id });
        };
        let key = id.clone();
        match self.shared.offloader.run(move || lookup(&id)).await? {
            Ok(raw) => Ok(raw),
            Err(e) if e.is_not_found() => Err(GitError::NotFound { key }),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<C, T> Pagination<T> for PaginationAdapter<C, T>
where
    C: RawCollection,
    T: Send + 'static,
{
    async fn length(&self) -> Result<usize> {
        let len = self
            .shared
            .len
            .get_or_try_init(|| async {
                let collection = self.shared.collection().await?;
                let len = self.shared.offloader.run(move || collection.count()).await??;
                Ok::<_, GitError>(len)
            })
            .await?;
        Ok(*len)
    }

    async fn get(&self, key: Key) -> Result<T> {
        let raw = match key {
            Key::Index(index) => {
                let collection = self.shared.collection().await?;
                self.shared
                    .offloader
                    .run(move || collection.get(index))
                    .await??
            }
            Key::Id(id) => self.resolve(id).await?,
        };
        Ok((self.map)(raw))
    }

    async fn slice(&self, start: usize, stop: usize) -> Result<Vec<T>> {
        if start >= stop {
            return Ok(Vec::new());
        }
        let collection = self.shared.collection().await?;
        let raws = self
            .shared
            .offloader
            .run(move || collection.slice(start, stop))
            .await??;
        Ok(raws.into_iter().map(|raw| (self.map)(raw)).collect())
    }

    fn stream(&self) -> BoxStream<'static, Result<T>> {
        let shared = Arc::clone(&self.shared);
        let map = Arc::clone(&self.map);

        stream::try_unfold(None, move |cursor: Option<Cursor<C::Item>>| {
            let shared = Arc::clone(&shared);
            let map = Arc::clone(&map);
            async move {
                let mut cursor = match cursor {
                    Some(cursor) => cursor,
                    None => shared.collection().await?.cursor(),
                };
                let (cursor, next) = shared
                    .offloader
                    .run(move || {
                        let next = cursor.next();
                        (cursor, next)
                    })
                    .await?;
                match next {
                    Some(raw) => Ok::<_, GitError>(Some((map(raw?), Some(cursor)))),
                    None => Ok(None),
                }
            }
        })
        .boxed()
    }
}
