//! A GitHub list endpoint (`?page=N&per_page=M`) as a [`RawCollection`].
//!
//! Pages are fetched on demand and cached for the lifetime of the list, so
//! `get`, `slice` and cursors over one list never refetch a page. The element
//! count is probed once with `per_page=1`: the `rel="last"` page number is then
//! the number of elements.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, OnceLock};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use super::types::RawPage;
use super::GithubApi;
use crate::error::ProviderError;
use crate::pagination::{Cursor, RawCollection};

pub struct PaginatedList<T> {
    api: Arc<dyn GithubApi>,
    path: String,
    per_page: u32,
    pages: Mutex<HashMap<u32, Arc<RawPage>>>,
    total: OnceLock<usize>,
    _item: PhantomData<fn() -> T>,
}

impl<T> PaginatedList<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn new(api: Arc<dyn GithubApi>, path: impl Into<String>, per_page: u32) -> Self {
        Self {
            api,
            path: path.into(),
            per_page: per_page.max(1),
            pages: Mutex::new(HashMap::new()),
            total: OnceLock::new(),
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Page `number` (1-based), from cache when already fetched.
    fn page(&self, number: u32) -> Result<Arc<RawPage>, ProviderError> {
        if let Some(page) = self.cached(number) {
            return Ok(page);
        }
        let page = Arc::new(self.api.page(&self.path, number, self.per_page)?);
        trace!(path = %self.path, number, items = page.items.len(), "page cached");
        if let Ok(mut pages) = self.pages.lock() {
            pages.insert(number, Arc::clone(&page));
        }
        Ok(page)
    }

    fn cached(&self, number: u32) -> Option<Arc<RawPage>> {
        self.pages.lock().ok()?.get(&number).cloned()
    }

    /// Page number and offset within it for element `index`.
    fn locate(&self, index: usize) -> (u32, usize) {
        let per_page = self.per_page as usize;
        ((index / per_page + 1) as u32, index % per_page)
    }

    fn decode(value: &Value) -> Result<T, ProviderError> {
        Ok(T::deserialize(value)?)
    }
}

impl<T> RawCollection for PaginatedList<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    fn count(&self) -> Result<usize, ProviderError> {
        if let Some(total) = self.total.get() {
            return Ok(*total);
        }
        let probe = self.api.page(&self.path, 1, 1)?;
        let total = match probe.last_page {
            Some(last) => last as usize,
            None => probe.items.len(),
        };
        debug!(path = %self.path, total, "collection size probed");
        Ok(*self.total.get_or_init(|| total))
    }

    fn get(&self, index: usize) -> Result<T, ProviderError> {
        let (number, offset) = self.locate(index);
        let page = self.page(number)?;
        match page.items.get(offset) {
            Some(value) => Self::decode(value),
            None => Err(ProviderError::IndexOutOfRange {
                index,
                len: self.count()?,
            }),
        }
    }

    fn slice(&self, start: usize, stop: usize) -> Result<Vec<T>, ProviderError> {
        let mut items = Vec::with_capacity(stop.saturating_sub(start));
        let mut index = start;
        while index < stop {
            let (number, offset) = self.locate(index);
            let page = self.page(number)?;
            let available = page.items.len().saturating_sub(offset);
            if available == 0 {
                break;
            }
            let take = available.min(stop - index);
            for value in &page.items[offset..offset + take] {
                items.push(Self::decode(value)?);
            }
            index += take;
            if page.next_page.is_none() && offset + take >= page.items.len() {
                break;
            }
        }
        Ok(items)
    }

    fn cursor(self: Arc<Self>) -> Cursor<T> {
        let mut number = 1;
        let mut offset = 0;
        let mut done = false;
        Box::new(std::iter::from_fn(move || {
            while !done {
                let page = match self.page(number) {
                    Ok(page) => page,
                    Err(e) => {
                        done = true;
                        return Some(Err(e));
                    }
                };
                if let Some(value) = page.items.get(offset) {
                    offset += 1;
                    return Some(Self::decode(value));
                }
                if page.next_page.is_none() || page.items.is_empty() {
                    done = true;
                } else {
                    number += 1;
                    offset = 0;
                }
            }
            None
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::RawTag;
    use crate::github::MockGithubApi;
    use serde_json::json;

    /// A mock serving `total` tags named `v0..`, `per_page` at a time, with
    /// GitHub's link semantics.
    fn tag_api(total: usize) -> MockGithubApi {
        let mut api = MockGithubApi::new();
        api.expect_page().returning(move |_, page, per_page| {
            let per_page = per_page as usize;
            let last = total.div_ceil(per_page).max(1) as u32;
            let start = (page as usize - 1) * per_page;
            let items = (start..(start + per_page).min(total))
                .map(|i| json!({ "name": format!("v{i}") }))
                .collect();
            Ok(RawPage {
                items,
                next_page: (page < last).then_some(page + 1),
                last_page: (last > 1).then_some(last),
            })
        });
        api
    }

    fn names(tags: &[RawTag]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn count_uses_the_last_page_of_a_single_item_probe() {
        let list: PaginatedList<RawTag> = PaginatedList::new(Arc::new(tag_api(7)), "t", 3);
        assert_eq!(list.count().expect("count"), 7);
    }

    #[test]
    fn count_of_a_single_page_collection_is_its_length() {
        let list: PaginatedList<RawTag> = PaginatedList::new(Arc::new(tag_api(1)), "t", 3);
        assert_eq!(list.count().expect("count"), 1);
        let empty: PaginatedList<RawTag> = PaginatedList::new(Arc::new(tag_api(0)), "t", 3);
        assert_eq!(empty.count().expect("count"), 0);
    }

    #[test]
    fn get_reads_the_right_page() {
        let list: PaginatedList<RawTag> = PaginatedList::new(Arc::new(tag_api(7)), "t", 3);
        assert_eq!(list.get(0).expect("first").name, "v0");
        assert_eq!(list.get(4).expect("fifth").name, "v4");
        assert_eq!(list.get(6).expect("last").name, "v6");
    }

    #[test]
    fn get_past_the_end_is_out_of_range() {
        let list: PaginatedList<RawTag> = PaginatedList::new(Arc::new(tag_api(7)), "t", 3);
        assert!(matches!(
            list.get(7),
            Err(ProviderError::IndexOutOfRange { index: 7, len: 7 })
        ));
    }

    #[test]
    fn slice_spans_pages_and_clamps() {
        let list: PaginatedList<RawTag> = PaginatedList::new(Arc::new(tag_api(7)), "t", 3);
        assert_eq!(names(&list.slice(2, 5).expect("slice")), vec!["v2", "v3", "v4"]);
        assert_eq!(names(&list.slice(5, 50).expect("slice")), vec!["v5", "v6"]);
        assert!(list.slice(9, 12).expect("slice").is_empty());
    }

    #[test]
    fn slice_starting_past_a_short_final_page_is_empty() {
        let list: PaginatedList<RawTag> = PaginatedList::new(Arc::new(tag_api(7)), "t", 3);
        assert!(list.slice(8, 10).expect("slice").is_empty());
        assert!(list.slice(7, 8).expect("slice").is_empty());
    }

    #[test]
    fn pages_are_fetched_once() {
        let mut api = MockGithubApi::new();
        api.expect_page().times(1).returning(|_, _, _| {
            Ok(RawPage {
                items: vec![json!({ "name": "v1" }), json!({ "name": "v2" })],
                next_page: None,
                last_page: None,
            })
        });
        let list: PaginatedList<RawTag> = PaginatedList::new(Arc::new(api), "t", 30);

        assert_eq!(list.get(1).expect("get").name, "v2");
        assert_eq!(names(&list.slice(0, 2).expect("slice")), vec!["v1", "v2"]);
    }

    #[test]
    fn cursor_walks_every_page_in_order() {
        let list: Arc<PaginatedList<RawTag>> =
            Arc::new(PaginatedList::new(Arc::new(tag_api(5)), "t", 2));
        let tags: Vec<RawTag> = list.cursor().collect::<Result<_, _>>().expect("cursor");
        assert_eq!(names(&tags), vec!["v0", "v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn cursor_ends_after_a_failed_page() {
        let mut api = MockGithubApi::new();
        api.expect_page().returning(|_, page, _| match page {
            1 => Ok(RawPage {
                items: vec![json!({ "name": "v0" })],
                next_page: Some(2),
                last_page: Some(2),
            }),
            _ => Err(ProviderError::Status {
                status: 502,
                message: "Bad Gateway".to_string(),
            }),
        });
        let list: Arc<PaginatedList<RawTag>> = Arc::new(PaginatedList::new(Arc::new(api), "t", 1));

        let mut cursor = list.cursor();
        assert_eq!(cursor.next().expect("first").expect("ok").name, "v0");
        assert!(matches!(cursor.next(), Some(Err(ProviderError::Status { status: 502, .. }))));
        assert!(cursor.next().is_none());
    }

    #[test]
    fn undecodable_items_surface_as_decode_errors() {
        let mut api = MockGithubApi::new();
        api.expect_page().returning(|_, _, _| {
            Ok(RawPage {
                items: vec![json!({ "label": "not a tag" })],
                next_page: None,
                last_page: None,
            })
        });
        let list: PaginatedList<RawTag> = PaginatedList::new(Arc::new(api), "t", 30);
        assert!(matches!(list.get(0), Err(ProviderError::Decode(_))));
    }
}
