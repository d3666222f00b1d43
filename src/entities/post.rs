// Post entity - one feed item with explicit optional fields

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::core::{dates, quotes};
use crate::error::GraphResult;
use crate::infrastructure::transport::GraphTransport;
use crate::infrastructure::urls;
use crate::models::FeedItem;
use crate::selections::{InsightsSelection, SelectionState};

use super::picture::Picture;

/// One feed item. Everything beyond id, type and the two timestamps is
/// optional on the wire and stays optional here. Built fresh per fetch and
/// never mutated.
pub struct Post {
    transport: Arc<dyn GraphTransport>,
    pub id: String,
    pub kind: String,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub name: Option<String>,
    pub story: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub shares: Option<u64>,
    pub comments: Option<Vec<Value>>,
    pub likes: Option<Vec<Value>>,
    /// Quoted spans pulled out of the description.
    pub quotes: Vec<String>,
    pub picture: Option<Picture>,
    raw: Value,
}

impl Post {
    /// Build from one raw feed item; the account handle is re-scoped to the
    /// post's own id so later insights queries address the post directly.
    pub fn from_raw(account: &Arc<dyn GraphTransport>, raw: Value) -> GraphResult<Self> {
        let item: FeedItem = serde_json::from_value(raw.clone())?;
        let quotes = quotes::extract_quotes(item.description.as_deref().unwrap_or(""));

        Ok(Self {
            transport: account.partial(&item.id),
            created_time: dates::parse(&item.created_time)?,
            updated_time: dates::parse(&item.updated_time)?,
            name: item.name,
            story: item.story,
            link: item.link,
            description: item.description,
            shares: item.shares.map(|shares| shares.count),
            comments: item.comments.map(|list| list.data),
            likes: item.likes.map(|list| list.data),
            quotes,
            picture: item.picture.as_deref().map(Picture::parse),
            kind: item.kind,
            id: item.id,
            raw,
        })
    }

    /// Analytics query anchored on this post.
    pub fn insights(&self) -> InsightsSelection {
        InsightsSelection::new(SelectionState::new(self.transport.clone(), self.id.clone()))
    }

    /// Resolve a possibly shortened link; `clean` strips the result down to
    /// its base URL. Posts without a link yield `None`.
    pub async fn resolve_link(&self, clean: bool) -> GraphResult<Option<String>> {
        let Some(link) = &self.link else {
            return Ok(None);
        };
        let mut resolved = urls::resolve(link).await?;
        if clean {
            resolved = urls::base(&resolved)?;
        }
        Ok(Some(resolved))
    }

    /// Raw feed item this post was built from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Post {} ({})", self.id, self.created_time.date_naive())
    }
}
