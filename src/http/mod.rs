//! REST boundary for configuration management.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → request.rs (request ID assigned and echoed back)
//!     → server.rs (route dispatch, blocking pool for updates)
//!     → ConfigurationPresentation (present / present_by_path / update)
//!     → response.rs (JSON body or {"error": {code, message}})
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{bind_rest_endpoint, RestServer, StartError, CONF_URL};
