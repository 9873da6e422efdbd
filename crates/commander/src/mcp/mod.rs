//! MCP Server Module
//!
//! Exposes the incident tools to agent runtimes over the Model Context
//! Protocol, on either a local stdio pipe or an HTTP/SSE endpoint.

pub mod http;
pub mod protocol;
pub mod server;
pub mod stdio;

pub use self::http::{build_router, serve_http};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::{McpServer, PROTOCOL_VERSION, SERVER_NAME};
pub use stdio::serve_stdio;
