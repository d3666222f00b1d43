// Wire models - serde records for the JSON surface of the graph read API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Continuation links attached to a collection page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// One page of a collection resource: the items plus optional continuations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

/// Profile fields of the account node itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub name: String,
}

/// Share counter nested inside a feed item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Shares {
    pub count: u64,
}

/// Nested `{"data": [...]}` envelope used for comments and likes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataList {
    #[serde(default)]
    pub data: Vec<Value>,
}

/// One raw feed item. Everything beyond id, type and the two timestamps is
/// optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_time: String,
    pub updated_time: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub shares: Option<Shares>,
    #[serde(default)]
    pub comments: Option<DataList>,
    #[serde(default)]
    pub likes: Option<DataList>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// One metric-major dataset: a named time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsDataset {
    pub name: String,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub values: Vec<InsightValue>,
}

/// One sample of a metric. Lifetime aggregates carry no end time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightValue {
    pub value: Value,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// Insights granularity tags as the API spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Day,
    Week,
    Days28,
    Lifetime,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Days28 => "days_28",
            Period::Lifetime => "lifetime",
        }
    }
}
