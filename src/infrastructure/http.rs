// HTTP graph transport - reqwest-backed implementation of GraphTransport

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::infrastructure::transport::{GraphTransport, RequestParams, SubRequest};

/// Authenticated HTTP client for one scope of the graph.
///
/// `partial` re-roots the handle at another node id; node ids are globally
/// addressable, so the new scope replaces the old one rather than nesting
/// under it.
pub struct HttpGraph {
    http: Client,
    root: String,
    token: String,
    scope: String,
}

impl HttpGraph {
    pub fn new(config: &GraphConfig) -> GraphResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| GraphError::Transport(err.into()))?;

        Ok(Self {
            http,
            root: format!(
                "{}/{}",
                config.api_base.trim_end_matches('/'),
                config.api_version
            ),
            token: config.access_token.clone(),
            scope: String::new(),
        })
    }

    fn url_for(&self, resource: &str) -> String {
        let mut url = self.root.clone();
        if !self.scope.is_empty() {
            url.push('/');
            url.push_str(&self.scope);
        }
        let resource = resource.trim_matches('/');
        if !resource.is_empty() {
            url.push('/');
            url.push_str(resource);
        }
        url
    }

    fn query_pairs(&self, params: &RequestParams) -> Vec<(String, String)> {
        let mut pairs = vec![("access_token".to_string(), self.token.clone())];
        for (key, value) in params.iter() {
            pairs.push((key.clone(), render_param(value)));
        }
        pairs
    }

    async fn request(&self, url: &str, pairs: &[(String, String)]) -> GraphResult<Value> {
        debug!(url, params = pairs.len(), "graph api request");
        let response = self.http.get(url).query(pairs).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
            return Err(api_error(status, &body));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Query-string rendition of one wire parameter.
fn render_param(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Map a non-2xx reply onto the structured API error, falling back to the
/// HTTP status when the body carries no error payload.
fn api_error(status: StatusCode, body: &Value) -> GraphError {
    let payload = body.get("error");
    GraphError::Api {
        code: payload
            .and_then(|err| err.get("code"))
            .and_then(Value::as_i64)
            .unwrap_or_else(|| i64::from(status.as_u16())),
        kind: payload
            .and_then(|err| err.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("http")
            .to_string(),
        message: payload
            .and_then(|err| err.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[async_trait]
impl GraphTransport for HttpGraph {
    async fn get(&self, resource: &str, params: &RequestParams) -> GraphResult<Value> {
        self.request(&self.url_for(resource), &self.query_pairs(params))
            .await
    }

    async fn follow(&self, url: &str) -> GraphResult<Value> {
        // Continuation URLs arrive fully formed, token and parameters included.
        self.request(url, &[]).await
    }

    async fn all(
        &self,
        resource: &str,
        requests: &[SubRequest],
        params: &RequestParams,
    ) -> GraphResult<Vec<Value>> {
        debug!(resource, count = requests.len(), "graph api batch");
        let fetches = requests.iter().map(|request| {
            let path = format!(
                "{}/{}",
                resource.trim_matches('/'),
                request.relative_url.trim_matches('/')
            );
            async move { self.get(&path, params).await }
        });
        try_join_all(fetches).await
    }

    async fn find(&self, query: &str, object_type: &str) -> GraphResult<Value> {
        let pairs = vec![
            ("access_token".to_string(), self.token.clone()),
            ("q".to_string(), query.to_string()),
            ("type".to_string(), object_type.to_string()),
        ];
        self.request(&format!("{}/search", self.root), &pairs).await
    }

    fn partial(&self, scope: &str) -> Arc<dyn GraphTransport> {
        Arc::new(Self {
            http: self.http.clone(),
            root: self.root.clone(),
            token: self.token.clone(),
            scope: scope.trim_matches('/').to_string(),
        })
    }

    fn oauth_token(&self) -> &str {
        &self.token
    }
}
