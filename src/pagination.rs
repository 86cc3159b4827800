//! Lazy traversal of paged collections.
//!
//! A collection endpoint answers with one bounded [`Page`] that links to the
//! following one. [`Paginator`] hides the links: it hands out the items of
//! the current page in server order and only requests the next page when the
//! caller asks for an item past the end of the current one. Nothing is
//! prefetched and no item is reordered or deduplicated.

use std::future::Future;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Res, transport::BoxFuture};

/// One bounded response of a paged collection.
///
/// Offset-paged endpoints fill `offset`/`previous`/`total`; cursor-paged
/// ones (followed artists, recently played) fill `cursors` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<R> {
    pub href: String,
    pub items: Vec<R>,
    pub limit: u32,
    pub next: Option<String>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cursors {
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

impl Page<Value> {
    pub fn from_value(payload: Value) -> Res<Self> {
        Ok(serde_json::from_value(payload)?)
    }
}

/// Default item factory: deserializes the raw record into `T`.
pub fn deserialize_item<T: DeserializeOwned>(raw: Value) -> Res<T> {
    Ok(serde_json::from_value(raw)?)
}

type ItemFactory<'a, T> = Box<dyn Fn(Value) -> Res<T> + Send + 'a>;
type FetchNext<'a> = Box<dyn FnMut(String) -> BoxFuture<'a, Res<Value>> + Send + 'a>;

/// Forward-only, non-restartable sequence over every item of a collection.
pub struct Paginator<'a, T> {
    items: std::vec::IntoIter<Value>,
    next: Option<String>,
    href: String,
    total: Option<u32>,
    item_factory: ItemFactory<'a, T>,
    fetch_next: FetchNext<'a>,
    pages_fetched: usize,
    finished: bool,
}

/// Wraps `initial` into a paginator.
///
/// `item_factory` turns one raw record into a domain object; `fetch_next`
/// is called with the `next` link of a page once that page is used up and
/// must return the payload of the following page.
pub fn paginate<'a, T, F, N, Fut>(initial: Value, item_factory: F, mut fetch_next: N) -> Res<Paginator<'a, T>>
where
    F: Fn(Value) -> Res<T> + Send + 'a,
    N: FnMut(String) -> Fut + Send + 'a,
    Fut: Future<Output = Res<Value>> + Send + 'a,
{
    let page = Page::from_value(initial)?;

    Ok(Paginator {
        items: Vec::new().into_iter(),
        next: None,
        href: String::new(),
        total: page.total,
        item_factory: Box::new(item_factory),
        fetch_next: Box::new(move |url: String| -> BoxFuture<'a, Res<Value>> {
            Box::pin(fetch_next(url))
        }),
        pages_fetched: 0,
        finished: false,
    }
    .with_page(page))
}

impl<'a, T> Paginator<'a, T> {
    fn with_page(mut self, page: Page<Value>) -> Self {
        self.load(page);
        self
    }

    fn load(&mut self, page: Page<Value>) {
        tracing::debug!(href = %page.href, items = page.items.len(), has_next = page.next.is_some(), "page loaded");
        self.href = page.href;
        self.next = page.next;
        self.items = page.items.into_iter();
    }

    /// Next item, fetching the following page first if the current one is
    /// exhausted. Returns `None` once the last page has been drained.
    ///
    /// A failed fetch or a failing item factory is returned once; the
    /// paginator is finished afterwards. Items handed out before stay valid.
    pub async fn next(&mut self) -> Option<Res<T>> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(raw) = self.items.next() {
                let item = (self.item_factory)(raw);
                if item.is_err() {
                    self.finished = true;
                }
                return Some(item);
            }

            let Some(url) = self.next.take() else {
                self.finished = true;
                return None;
            };

            match (self.fetch_next)(url).await.and_then(Page::from_value) {
                Ok(page) => {
                    self.pages_fetched += 1;
                    self.load(page);
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }

    /// Drains the remaining items, stopping at the first failure.
    pub async fn collect_all(mut self) -> Res<Vec<T>> {
        let mut all = Vec::new();
        while let Some(item) = self.next().await {
            all.push(item?);
        }
        Ok(all)
    }

    /// Collection size as reported by the first page, when the endpoint provides it.
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    /// Link of the page currently being consumed.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Number of pages requested beyond the initial one.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
