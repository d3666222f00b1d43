// Graph transport - the narrow async interface the query layer reads through

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::GraphResult;
use crate::models::Envelope;

/// Wire-format request parameters plus the client-side paging flag.
///
/// The flag never goes on the wire; it records that the selection carries an
/// explicit date range and must walk continuation pages. Everything in the
/// value map is sent verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    paged: bool,
    values: BTreeMap<String, Value>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn enable_paging(&mut self) {
        self.paged = true;
    }

    pub fn paged(&self) -> bool {
        self.paged
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One entry of a batched read, addressed by a path relative to the batch
/// resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRequest {
    pub relative_url: String,
}

impl SubRequest {
    pub fn new(relative_url: impl Into<String>) -> Self {
        Self {
            relative_url: relative_url.into(),
        }
    }
}

/// Authenticated read access to one scope of the remote graph.
///
/// Implementations do whatever I/O they like (the HTTP backend parallelizes
/// batches internally); callers issue one logical call at a time and never
/// retry, cache or rate-limit here.
#[async_trait]
pub trait GraphTransport: Send + Sync {
    /// One read against the scoped resource. An empty resource reads the
    /// scope root itself.
    async fn get(&self, resource: &str, params: &RequestParams) -> GraphResult<Value>;

    /// Fetch an opaque continuation URL produced by a previous page.
    async fn follow(&self, url: &str) -> GraphResult<Value>;

    /// Batched read: one result per sub-request, in sub-request order.
    async fn all(
        &self,
        resource: &str,
        requests: &[SubRequest],
        params: &RequestParams,
    ) -> GraphResult<Vec<Value>>;

    /// Full-text search scoped to one object type.
    async fn find(&self, query: &str, object_type: &str) -> GraphResult<Value>;

    /// Handle scoped to a sub-resource of this one.
    fn partial(&self, scope: &str) -> Arc<dyn GraphTransport>;

    /// Token the transport authenticates with.
    fn oauth_token(&self) -> &str;
}

/// Lazy page sequence over a first page and its `paging.next` continuations.
///
/// Pull-based and strictly sequential: a page is requested only when the
/// consumer asks for it, so a consumer that stops early never touches the
/// rest of the feed. In single-page mode the cursor yields exactly one page.
pub struct PageCursor<'a> {
    transport: &'a dyn GraphTransport,
    head: Option<Envelope>,
    next: Option<String>,
    follow: bool,
}

impl<'a> PageCursor<'a> {
    /// Cursor that walks `paging.next` continuations after the first page.
    pub fn paged(transport: &'a dyn GraphTransport, first: Value) -> GraphResult<Self> {
        Self::build(transport, first, true)
    }

    /// Single-page view used when paging is disabled, so both modes flow
    /// through one loop.
    pub fn single(transport: &'a dyn GraphTransport, first: Value) -> GraphResult<Self> {
        Self::build(transport, first, false)
    }

    fn build(transport: &'a dyn GraphTransport, first: Value, follow: bool) -> GraphResult<Self> {
        let envelope: Envelope = serde_json::from_value(first)?;
        let next = envelope.paging.as_ref().and_then(|paging| paging.next.clone());
        Ok(Self {
            transport,
            head: Some(envelope),
            next,
            follow,
        })
    }

    /// The next page, or `None` once the sequence is exhausted. An empty
    /// continuation page ends the sequence: the server keeps handing out
    /// `next` links past the end of range-delimited feeds.
    pub async fn next_page(&mut self) -> GraphResult<Option<Envelope>> {
        if let Some(head) = self.head.take() {
            return Ok(Some(head));
        }
        if !self.follow {
            return Ok(None);
        }
        let Some(url) = self.next.take() else {
            return Ok(None);
        };
        let raw = self.transport.follow(&url).await?;
        let envelope: Envelope = serde_json::from_value(raw)?;
        if envelope.data.is_empty() {
            return Ok(None);
        }
        self.next = envelope.paging.as_ref().and_then(|paging| paging.next.clone());
        Ok(Some(envelope))
    }
}
