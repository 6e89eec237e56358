//! API Documentation module
//!
//! Provides OpenAPI specification generation for the management API using utoipa.

mod openapi;

pub use openapi::ApiDoc;
