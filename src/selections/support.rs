// Test support - scripted in-memory transport that records every request

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{GraphError, GraphResult};
use crate::infrastructure::transport::{GraphTransport, RequestParams, SubRequest};

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get { resource: String },
    Follow { url: String },
    All { resource: String, subrequests: usize },
    Find { query: String, object_type: String },
    Partial { scope: String },
}

#[derive(Default)]
struct MockState {
    gets: VecDeque<Value>,
    follows: VecDeque<Value>,
    batches: VecDeque<Vec<Value>>,
    calls: Vec<Call>,
    last_params: Option<RequestParams>,
}

/// Scripted transport: responses are consumed in push order, every call is
/// recorded. Cloning shares the script and the call log, which is what
/// `partial` relies on.
#[derive(Clone)]
pub struct MockGraph {
    state: Arc<Mutex<MockState>>,
}

impl MockGraph {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn push_get(&self, page: Value) {
        self.state.lock().unwrap().gets.push_back(page);
    }

    pub fn push_follow(&self, page: Value) {
        self.state.lock().unwrap().follows.push_back(page);
    }

    pub fn push_batch(&self, results: Vec<Value>) {
        self.state.lock().unwrap().batches.push_back(results);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_params(&self) -> Option<RequestParams> {
        self.state.lock().unwrap().last_params.clone()
    }

    fn exhausted(what: &str) -> GraphError {
        GraphError::Transport(anyhow::anyhow!("mock has no scripted {what} response"))
    }
}

#[async_trait]
impl GraphTransport for MockGraph {
    async fn get(&self, resource: &str, params: &RequestParams) -> GraphResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Get {
            resource: resource.to_string(),
        });
        state.last_params = Some(params.clone());
        state.gets.pop_front().ok_or_else(|| Self::exhausted("get"))
    }

    async fn follow(&self, url: &str) -> GraphResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Follow {
            url: url.to_string(),
        });
        state
            .follows
            .pop_front()
            .ok_or_else(|| Self::exhausted("follow"))
    }

    async fn all(
        &self,
        resource: &str,
        requests: &[SubRequest],
        params: &RequestParams,
    ) -> GraphResult<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::All {
            resource: resource.to_string(),
            subrequests: requests.len(),
        });
        state.last_params = Some(params.clone());
        state
            .batches
            .pop_front()
            .ok_or_else(|| Self::exhausted("batch"))
    }

    async fn find(&self, query: &str, object_type: &str) -> GraphResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Find {
            query: query.to_string(),
            object_type: object_type.to_string(),
        });
        state.gets.pop_front().ok_or_else(|| Self::exhausted("find"))
    }

    fn partial(&self, scope: &str) -> Arc<dyn GraphTransport> {
        self.state.lock().unwrap().calls.push(Call::Partial {
            scope: scope.to_string(),
        });
        Arc::new(self.clone())
    }

    fn oauth_token(&self) -> &str {
        "mock-token"
    }
}
