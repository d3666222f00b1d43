// Insights selection - period/metric builders and the metric-major to
// time-major pivot

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::core::dates;
use crate::error::{GraphError, GraphResult};
use crate::infrastructure::transport::SubRequest;
use crate::models::{Envelope, InsightsDataset, Period};

use super::selection::{Selection, SelectionState};

/// Longest span one insights query may cover, in days. Larger ranges fail
/// outright; chunking them into sub-requests is out of scope.
const MAX_RANGE_DAYS: i64 = 93;
/// Window the API falls back to when no range is given.
const DEFAULT_RANGE_DAYS: i64 = 3;

/// How the caller asked for metrics, decided when the query is built: one
/// bare name gets the simplified value-series result, a list gets rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricRequest {
    Single(String),
    Many(Vec<String>),
}

impl MetricRequest {
    pub fn names(&self) -> &[String] {
        match self {
            MetricRequest::Single(name) => std::slice::from_ref(name),
            MetricRequest::Many(names) => names,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, MetricRequest::Single(_))
    }
}

/// Metric argument accepted by the period builders.
#[derive(Debug, Clone)]
pub enum MetricSpec {
    /// Leave the metric set untouched ("all available metrics" unless an
    /// earlier builder call narrowed it).
    All,
    Single(String),
    Many(Vec<String>),
}

impl From<&str> for MetricSpec {
    fn from(name: &str) -> Self {
        MetricSpec::Single(name.to_string())
    }
}

impl From<String> for MetricSpec {
    fn from(name: String) -> Self {
        MetricSpec::Single(name)
    }
}

impl From<Vec<String>> for MetricSpec {
    fn from(names: Vec<String>) -> Self {
        MetricSpec::Many(names)
    }
}

impl From<Vec<&str>> for MetricSpec {
    fn from(names: Vec<&str>) -> Self {
        MetricSpec::Many(names.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for MetricSpec {
    fn from(names: &[&str]) -> Self {
        MetricSpec::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

/// Time bucket a pivoted row is keyed by. `Lifetime` marks all-time
/// aggregates and orders after every dated bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeBucket {
    At(DateTime<Utc>),
    Lifetime,
}

impl TimeBucket {
    pub fn label(&self) -> String {
        match self {
            TimeBucket::At(instant) => instant.to_rfc3339(),
            TimeBucket::Lifetime => "lifetime".to_string(),
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One time-major row: an end time plus the metric values present for it.
/// A metric the server omitted for this bucket is simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    end_time: TimeBucket,
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn end_time(&self) -> &TimeBucket {
        &self.end_time
    }

    /// Value of one metric at this bucket, or `None` when the server omitted
    /// the bucket for that metric.
    pub fn value(&self, metric: &str) -> Option<&Value> {
        self.values.get(metric)
    }

    /// Plain key-to-value mapping of every populated field.
    pub fn serialize(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("end_time".to_string(), Value::String(self.end_time.label()));
        for (metric, value) in &self.values {
            record.insert(metric.clone(), value.clone());
        }
        record
    }
}

/// Pivoted result set: the shared field order (`end_time` first, then
/// metrics as first encountered) plus rows sorted by bucket ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    fields: Vec<String>,
    rows: Vec<Row>,
}

impl RowSet {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn serialize(&self) -> Vec<Map<String, Value>> {
        self.rows.iter().map(Row::serialize).collect()
    }
}

/// Result shape of a materialized insights query: a bare value series when
/// one metric was requested by name, full rows otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightsData {
    Values(Vec<Value>),
    Rows(RowSet),
}

impl InsightsData {
    pub fn as_values(&self) -> Option<&[Value]> {
        match self {
            InsightsData::Values(values) => Some(values),
            InsightsData::Rows(_) => None,
        }
    }

    pub fn as_rows(&self) -> Option<&RowSet> {
        match self {
            InsightsData::Rows(rows) => Some(rows),
            InsightsData::Values(_) => None,
        }
    }

    /// JSON rendition: an array of row records, or the raw value array for
    /// the single-metric shape.
    pub fn serialize(&self) -> Value {
        match self {
            InsightsData::Values(values) => Value::Array(values.clone()),
            InsightsData::Rows(rows) => {
                Value::Array(rows.serialize().into_iter().map(Value::Object).collect())
            }
        }
    }
}

/// Chainable analytics query anchored on a page or post. Materialization is
/// lazy and memoized per instance.
pub struct InsightsSelection {
    state: SelectionState,
    metrics: Option<MetricRequest>,
    cache: OnceCell<InsightsData>,
}

impl Clone for InsightsSelection {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            metrics: self.metrics.clone(),
            cache: OnceCell::new(),
        }
    }
}

impl Selection for InsightsSelection {
    fn state(&self) -> &SelectionState {
        &self.state
    }

    fn with_state(&self, state: SelectionState) -> Self {
        Self {
            state,
            metrics: self.metrics.clone(),
            cache: OnceCell::new(),
        }
    }
}

impl InsightsSelection {
    pub fn new(state: SelectionState) -> Self {
        Self {
            state,
            metrics: None,
            cache: OnceCell::new(),
        }
    }

    pub fn daily(&self, metrics: impl Into<MetricSpec>) -> Self {
        self.period(Period::Day, metrics.into())
    }

    pub fn weekly(&self, metrics: impl Into<MetricSpec>) -> Self {
        self.period(Period::Week, metrics.into())
    }

    /// The API's month is a 28 day window.
    pub fn monthly(&self, metrics: impl Into<MetricSpec>) -> Self {
        self.period(Period::Days28, metrics.into())
    }

    pub fn lifetime(&self, metrics: impl Into<MetricSpec>) -> Self {
        self.period(Period::Lifetime, metrics.into())
    }

    pub fn metrics(&self) -> Option<&MetricRequest> {
        self.metrics.as_ref()
    }

    fn period(&self, period: Period, metrics: MetricSpec) -> Self {
        let mut next = self.with_state(self.state.with_param("period", period.as_str()));
        match metrics {
            MetricSpec::All => {}
            MetricSpec::Single(name) => next.metrics = Some(MetricRequest::Single(name)),
            MetricSpec::Many(names) => next.metrics = Some(MetricRequest::Many(names)),
        }
        next
    }

    /// Requested span in whole days. Without an explicit range the API
    /// serves its implicit three day window; inverted ranges clamp to zero.
    fn span_days(&self) -> i64 {
        if !self.state.has_range() {
            return DEFAULT_RANGE_DAYS;
        }
        let seconds = (self.state.meta().until - self.state.meta().since).num_seconds();
        if seconds <= 0 {
            0
        } else {
            (seconds + 86_399) / 86_400
        }
    }

    /// The materialized query, fetched on first call and cached on this
    /// instance.
    pub async fn fetch(&self) -> GraphResult<&InsightsData> {
        self.cache.get_or_try_init(|| self.run()).await
    }

    async fn run(&self) -> GraphResult<InsightsData> {
        let days = self.span_days();
        if days > MAX_RANGE_DAYS {
            return Err(GraphError::RangeTooLarge { days });
        }

        let transport = self.state.transport();
        let results = match &self.metrics {
            Some(request) => {
                let subrequests: Vec<SubRequest> = request
                    .names()
                    .iter()
                    .map(|metric| SubRequest::new(metric.clone()))
                    .collect();
                let results = transport
                    .all("insights", &subrequests, self.state.params())
                    .await?;
                if results.len() != subrequests.len() {
                    return Err(GraphError::PartialBatch {
                        requested: subrequests.len(),
                        received: results.len(),
                    });
                }
                results
            }
            None => vec![transport.get("insights", self.state.params()).await?],
        };

        let mut datasets = Vec::new();
        for result in results {
            let envelope: Envelope = serde_json::from_value(result)?;
            for raw in envelope.data {
                datasets.push(serde_json::from_value::<InsightsDataset>(raw)?);
            }
        }
        debug!(datasets = datasets.len(), days, "pivoting insights datasets");

        // Pivot metric-major datasets into time-major buckets. The BTreeMap
        // key makes row order deterministic: ascending end time, lifetime
        // aggregates last.
        let mut fields = vec!["end_time".to_string()];
        let mut buckets: BTreeMap<TimeBucket, BTreeMap<String, Value>> = BTreeMap::new();
        for dataset in datasets {
            let InsightsDataset { name, values, .. } = dataset;
            if !fields.contains(&name) {
                fields.push(name.clone());
            }
            for entry in values {
                let bucket = match entry.end_time {
                    Some(raw) => TimeBucket::At(dates::parse(&raw)?),
                    None => TimeBucket::Lifetime,
                };
                buckets
                    .entry(bucket)
                    .or_default()
                    .insert(name.clone(), entry.value);
            }
        }

        let rows: Vec<Row> = buckets
            .into_iter()
            .map(|(end_time, values)| Row { end_time, values })
            .collect();

        match &self.metrics {
            Some(MetricRequest::Single(name)) => {
                let values = rows
                    .iter()
                    .filter_map(|row| row.value(name).cloned())
                    .collect();
                Ok(InsightsData::Values(values))
            }
            _ => Ok(InsightsData::Rows(RowSet { fields, rows })),
        }
    }

    /// Rows (or the bare value series) as plain JSON records.
    pub async fn serialize(&self) -> GraphResult<Value> {
        Ok(self.fetch().await?.serialize())
    }
}

impl fmt::Display for InsightsSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metrics = match &self.metrics {
            Some(request) => request.names().join(", "),
            None => "all available metrics".to_string(),
        };
        write!(f, "Insights for '{}' ({}", self.state.edge(), metrics)?;
        if self.state.has_range() {
            write!(
                f,
                " from {} to {}",
                self.state.meta().since.date_naive(),
                self.state.meta().until.date_naive()
            )?;
        }
        write!(f, ")")
    }
}
