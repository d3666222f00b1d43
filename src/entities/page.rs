// Page entity - the root account object and its selection factories

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::GraphConfig;
use crate::error::GraphResult;
use crate::infrastructure::http::HttpGraph;
use crate::infrastructure::transport::{GraphTransport, RequestParams};
use crate::models::ProfileRecord;
use crate::selections::{InsightsSelection, PostSelection, SelectionState};

/// One authenticated account. Construction performs a single profile fetch;
/// afterwards the page is immutable and hands out selections anchored on
/// itself.
pub struct Page {
    transport: Arc<dyn GraphTransport>,
    raw: Value,
    id: String,
    name: String,
}

impl Page {
    /// Connect with an access token and stock configuration.
    pub async fn connect(token: &str) -> GraphResult<Self> {
        Self::from_config(&GraphConfig::with_token(token)).await
    }

    pub async fn from_config(config: &GraphConfig) -> GraphResult<Self> {
        let root: Arc<dyn GraphTransport> = Arc::new(HttpGraph::new(config)?);
        Self::with_transport(root.partial("me")).await
    }

    /// Build against any transport handle already scoped to the account.
    pub async fn with_transport(transport: Arc<dyn GraphTransport>) -> GraphResult<Self> {
        let raw = transport.get("", &RequestParams::new()).await?;
        let profile: ProfileRecord = serde_json::from_value(raw.clone())?;
        Ok(Self {
            transport,
            raw,
            id: profile.id,
            name: profile.name,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw profile payload as fetched at construction.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn token(&self) -> &str {
        self.transport.oauth_token()
    }

    /// Feed query anchored on this page.
    pub fn posts(&self) -> PostSelection {
        PostSelection::new(SelectionState::new(self.transport.clone(), self.name.clone()))
    }

    /// Analytics query anchored on this page.
    pub fn insights(&self) -> InsightsSelection {
        InsightsSelection::new(SelectionState::new(self.transport.clone(), self.name.clone()))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page {}: {}", self.id, self.name)
    }
}
