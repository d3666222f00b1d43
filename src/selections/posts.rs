// Post selection - feed queries with the pagination/date-range stopping rule

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::entities::Post;
use crate::error::GraphResult;
use crate::infrastructure::transport::PageCursor;
use crate::models::Envelope;

use super::selection::{Selection, SelectionState};

/// Chainable query over an account's feed. Materialization is lazy and
/// memoized: the first `fetch` runs the query, later calls return the same
/// cached posts.
pub struct PostSelection {
    state: SelectionState,
    cache: OnceCell<Vec<Post>>,
}

impl Clone for PostSelection {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            cache: OnceCell::new(),
        }
    }
}

impl Selection for PostSelection {
    fn state(&self) -> &SelectionState {
        &self.state
    }

    fn with_state(&self, state: SelectionState) -> Self {
        Self {
            state,
            cache: OnceCell::new(),
        }
    }
}

impl PostSelection {
    pub fn new(state: SelectionState) -> Self {
        Self {
            state,
            cache: OnceCell::new(),
        }
    }

    /// Cap the result at the `n` most recent items.
    pub fn latest(&self, n: u32) -> Self {
        self.with_state(self.state.with_param("limit", n))
    }

    /// Full-text search over posts.
    pub async fn find(&self, query: &str) -> GraphResult<Vec<Value>> {
        let raw = self.state.transport().find(query, "post").await?;
        let envelope: Envelope = serde_json::from_value(raw)?;
        Ok(envelope.data)
    }

    /// The selected posts, fetched on first call and cached on this instance.
    pub async fn fetch(&self) -> GraphResult<&[Post]> {
        let posts = self.cache.get_or_try_init(|| self.run()).await?;
        Ok(posts.as_slice())
    }

    async fn run(&self) -> GraphResult<Vec<Post>> {
        let transport = self.state.transport();
        let first = transport.get("posts", self.state.params()).await?;
        let mut pages = if self.state.params().paged() {
            PageCursor::paged(transport.as_ref(), first)?
        } else {
            PageCursor::single(transport.as_ref(), first)?
        };

        let mut posts = Vec::new();
        while let Some(page) = pages.next_page().await? {
            for raw in page.data {
                let post = Post::from_raw(transport, raw)?;
                // `since` and `until` double as pagination cursors on this
                // resource, so there is always a next page; items arrive in
                // reverse-chronological order and the first one older than
                // the lower bound marks the end of the range.
                if post.created_time >= self.state.meta().since {
                    posts.push(post);
                } else {
                    debug!(accepted = posts.len(), "reached lower bound, stopping fetch");
                    return Ok(posts);
                }
            }
        }

        debug!(accepted = posts.len(), "feed exhausted");
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selections::support::{Call, MockGraph};
    use serde_json::json;
    use std::sync::Arc;

    fn feed_item(id: &str, created: &str) -> Value {
        json!({
            "id": id,
            "type": "status",
            "created_time": created,
            "updated_time": created,
        })
    }

    fn selection(mock: &MockGraph) -> PostSelection {
        PostSelection::new(SelectionState::new(Arc::new(mock.clone()), "test page"))
    }

    #[tokio::test]
    async fn test_stop_rule_cuts_mid_page() {
        let mock = MockGraph::new();
        mock.push_get(json!({
            "data": [
                feed_item("1_1", "2015-03-05T10:00:00+0000"),
                feed_item("1_2", "2015-03-01T10:00:00+0000"),
                feed_item("1_3", "2015-02-01T10:00:00+0000"),
            ],
            "paging": {"next": "https://graph.test/page2"},
        }));

        let selection = selection(&mock)
            .range("2015-02-15", Some("2015-03-06"))
            .unwrap();
        let posts = selection.fetch().await.unwrap();

        let ids: Vec<&str> = posts.iter().map(|post| post.id.as_str()).collect();
        assert_eq!(ids, vec!["1_1", "1_2"]);
        // the out-of-range item ended the fetch before the next page
        assert!(!mock
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Follow { .. })));
    }

    #[tokio::test]
    async fn test_stop_rule_spans_pages() {
        let mock = MockGraph::new();
        mock.push_get(json!({
            "data": [feed_item("1_1", "2015-03-05T10:00:00+0000")],
            "paging": {"next": "https://graph.test/page2"},
        }));
        mock.push_follow(json!({
            "data": [
                feed_item("1_2", "2015-03-01T10:00:00+0000"),
                feed_item("1_3", "2015-01-01T10:00:00+0000"),
            ],
            "paging": {"next": "https://graph.test/page3"},
        }));

        let selection = selection(&mock)
            .range("2015-02-15", Some("2015-03-06"))
            .unwrap();
        let posts = selection.fetch().await.unwrap();

        assert_eq!(posts.len(), 2);
        let follows = mock
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::Follow { .. }))
            .count();
        assert_eq!(follows, 1);
    }

    #[tokio::test]
    async fn test_first_item_out_of_range_yields_empty() {
        let mock = MockGraph::new();
        mock.push_get(json!({
            "data": [feed_item("1_1", "2014-01-01T10:00:00+0000")],
            "paging": {"next": "https://graph.test/page2"},
        }));

        let selection = selection(&mock)
            .range("2015-02-15", Some("2015-03-06"))
            .unwrap();
        let posts = selection.fetch().await.unwrap();

        assert!(posts.is_empty());
        assert!(!mock
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Follow { .. })));
    }

    #[tokio::test]
    async fn test_unranged_fetch_reads_one_page() {
        let mock = MockGraph::new();
        // a next link is present but an unranged selection is not paged
        mock.push_get(json!({
            "data": [feed_item("1_1", "2015-03-05T10:00:00+0000")],
            "paging": {"next": "https://graph.test/page2"},
        }));

        let selection = selection(&mock);
        let posts = selection.fetch().await.unwrap();

        assert_eq!(posts.len(), 1);
        assert!(!mock
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Follow { .. })));
    }

    #[tokio::test]
    async fn test_latest_sets_limit_param() {
        let mock = MockGraph::new();
        mock.push_get(json!({"data": []}));

        selection(&mock).latest(3).fetch().await.unwrap();

        let params = mock.last_params().unwrap();
        assert_eq!(params.get("limit"), Some(&json!(3)));
        assert!(!params.paged());
    }

    #[tokio::test]
    async fn test_fetch_is_memoized() {
        let mock = MockGraph::new();
        mock.push_get(json!({
            "data": [feed_item("1_1", "2015-03-05T10:00:00+0000")],
        }));

        let selection = selection(&mock);
        selection.fetch().await.unwrap();
        selection.fetch().await.unwrap();

        let gets = mock
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::Get { .. }))
            .count();
        assert_eq!(gets, 1);
    }

    #[tokio::test]
    async fn test_builder_chain_does_not_share_caches() {
        let mock = MockGraph::new();
        mock.push_get(json!({
            "data": [feed_item("1_1", "2015-03-05T10:00:00+0000")],
        }));
        mock.push_get(json!({"data": []}));

        let all = selection(&mock);
        let capped = all.latest(1);

        assert_eq!(all.fetch().await.unwrap().len(), 1);
        // the derived selection fetches on its own
        assert_eq!(capped.fetch().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_find_delegates_to_search() {
        let mock = MockGraph::new();
        mock.push_get(json!({"data": [{"id": "9"}]}));

        let results = selection(&mock).find("rust").await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(mock.calls().contains(&Call::Find {
            query: "rust".to_string(),
            object_type: "post".to_string(),
        }));
    }
}
