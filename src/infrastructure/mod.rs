// Infrastructure - transport interface, HTTP backend and URL helpers

pub mod http;
pub mod transport;
pub mod urls;

pub use http::HttpGraph;
pub use transport::{GraphTransport, PageCursor, RequestParams, SubRequest};
