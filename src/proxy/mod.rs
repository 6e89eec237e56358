//! Proxy module
//!
//! Model-aware request forwarding: body inspection, upstream request
//! construction, and streaming of the upstream response.

pub mod headers;
pub mod inspect;
pub mod logging;
pub mod relay;
pub mod request;

pub use inspect::{extract_model_id, InspectError};
pub use logging::RequestContext;
pub use relay::{build_http_client, ModelRelay};
pub use request::{BuildError, RouteRequest, UpstreamRequest};
