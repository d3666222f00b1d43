// graph_insights - lazily evaluated query layer over a social graph read API

// Pure utilities: dates and text extraction
pub mod core;

// Serde wire models for the API's JSON surface
pub mod models;

// Transport interface, HTTP backend and URL helpers
pub mod infrastructure;

// Chainable selections (the query builders)
pub mod selections;

// Entity wrappers: Page, Post, Picture
pub mod entities;

// Common utilities
pub mod config;
pub mod error;

// Re-exports for convenience
pub use config::GraphConfig;
pub use entities::{Page, Picture, Post};
pub use error::{GraphError, GraphResult};
pub use infrastructure::{GraphTransport, HttpGraph, PageCursor, RequestParams, SubRequest};
pub use models::Period;
pub use selections::{
    InsightsData, InsightsSelection, MetricRequest, MetricSpec, PostSelection, Row, RowSet,
    Selection, SelectionState,
};
