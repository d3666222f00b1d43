// Selection core - immutable builder state shared by the concrete selections

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::core::dates;
use crate::error::GraphResult;
use crate::infrastructure::transport::{GraphTransport, RequestParams};

/// Interpretation-time state: the instants builder calls were parsed into.
/// Wire-format twins of these live in the request params.
#[derive(Debug, Clone)]
pub struct SelectionMeta {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

/// Query state carried by every selection: the edge it is anchored on, the
/// transport handle scoped to that edge, parsed instants and wire params.
///
/// Builder calls never mutate a state in place; each derives a fresh copy,
/// so chains sharing a prefix never alias.
#[derive(Clone)]
pub struct SelectionState {
    transport: Arc<dyn GraphTransport>,
    edge: String,
    meta: SelectionMeta,
    params: RequestParams,
}

impl SelectionState {
    pub fn new(transport: Arc<dyn GraphTransport>, edge: impl Into<String>) -> Self {
        Self {
            transport,
            edge: edge.into(),
            meta: SelectionMeta {
                since: *dates::COMMON_ERA,
                until: Utc::now(),
            },
            params: RequestParams::new(),
        }
    }

    pub fn transport(&self) -> &Arc<dyn GraphTransport> {
        &self.transport
    }

    /// Label of the entity this selection is anchored on.
    pub fn edge(&self) -> &str {
        &self.edge
    }

    pub fn meta(&self) -> &SelectionMeta {
        &self.meta
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// True once a date range was explicitly set.
    pub fn has_range(&self) -> bool {
        self.params.contains("since") || self.params.contains("until")
    }

    /// Derive a state with one wire parameter changed.
    pub fn with_param(&self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        let mut next = self.clone();
        next.params.set(key, value);
        next
    }

    /// Derive a state bounded to `[since, until]`; `until` defaults to now.
    /// Stores parsed instants in meta, numeric timestamps on the wire, and
    /// flips the selection into paged mode.
    pub fn with_range(&self, since: &str, until: Option<&str>) -> GraphResult<Self> {
        let since_instant = dates::parse_utc(since)?;
        let until_instant = match until {
            Some(raw) => dates::parse_utc(raw)?,
            None => Utc::now(),
        };

        let mut next = self.clone();
        next.meta.since = since_instant;
        next.meta.until = until_instant;
        next.params.set("since", since_instant.timestamp());
        next.params.set("until", until_instant.timestamp());
        next.params.enable_paging();
        Ok(next)
    }
}

/// Shared builder surface of the concrete selections.
///
/// `range` and `since` are pure transformations: the receiver is left
/// untouched and the derived selection starts with an empty result cache.
pub trait Selection: Sized {
    fn state(&self) -> &SelectionState;

    /// Rebuild the same selection kind around a derived state.
    fn with_state(&self, state: SelectionState) -> Self;

    fn range(&self, since: &str, until: Option<&str>) -> GraphResult<Self> {
        Ok(self.with_state(self.state().with_range(since, until)?))
    }

    fn since(&self, date: &str) -> GraphResult<Self> {
        self.range(date, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selections::support::MockGraph;
    use serde_json::json;

    fn state() -> SelectionState {
        let mock = MockGraph::new();
        SelectionState::new(Arc::new(mock), "test edge")
    }

    #[test]
    fn test_defaults_cover_all_time() {
        let state = state();
        assert_eq!(state.meta().since, *dates::COMMON_ERA);
        assert!(!state.has_range());
        assert!(!state.params().paged());
    }

    #[test]
    fn test_with_range_leaves_original_untouched() {
        let original = state();
        let ranged = original.with_range("2015-01-01", Some("2015-02-01")).unwrap();

        assert!(!original.has_range());
        assert!(!original.params().paged());
        assert!(original.params().get("since").is_none());

        assert!(ranged.has_range());
        assert!(ranged.params().paged());
        assert_eq!(
            ranged.params().get("since"),
            Some(&json!(dates::timestamp("2015-01-01").unwrap()))
        );
        assert_eq!(
            ranged.params().get("until"),
            Some(&json!(dates::timestamp("2015-02-01").unwrap()))
        );
    }

    #[test]
    fn test_with_range_parses_meta_instants() {
        let ranged = state().with_range("2015-01-01", Some("2015-02-01")).unwrap();
        assert_eq!(ranged.meta().since, dates::parse_utc("2015-01-01").unwrap());
        assert_eq!(ranged.meta().until, dates::parse_utc("2015-02-01").unwrap());
    }

    #[test]
    fn test_until_defaults_to_now() {
        let before = Utc::now();
        let ranged = state().with_range("2015-01-01", None).unwrap();
        let after = Utc::now();

        assert!(ranged.meta().until >= before);
        assert!(ranged.meta().until <= after);
        assert_eq!(
            ranged.params().get("since"),
            Some(&json!(dates::timestamp("2015-01-01").unwrap()))
        );
    }

    #[test]
    fn test_inverted_range_is_accepted() {
        let ranged = state().with_range("2015-02-01", Some("2015-01-01")).unwrap();
        assert!(ranged.meta().until < ranged.meta().since);
    }

    #[test]
    fn test_with_param_is_a_pure_transformation() {
        let original = state();
        let limited = original.with_param("limit", 5);
        assert!(original.params().get("limit").is_none());
        assert_eq!(limited.params().get("limit"), Some(&json!(5)));
    }
}
