//! Client side of the REST contract, used by `confgate-cli`.
//!
//! # Data Flow
//! ```text
//! config get: NodeEndpoint → GET  /management/v1/configuration/ → pretty JSON
//! config set: HOCON text → JSON → POST /management/v1/configuration/ → "" or error
//! ```

pub mod endpoint;
pub mod http;

pub use endpoint::{EndpointError, NodeEndpoint};
pub use http::{ClientError, ConfigurationClient};
