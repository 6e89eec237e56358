//! Inbound and outbound request representations

use axum::extract::OriginalUri;
use axum::http::{request::Parts, Method};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use thiserror::Error;

use super::headers::{build_upstream_headers, InvalidCredential};
use crate::registry::{Credential, ModelRecord};

/// The inbound request as received, with its body fully buffered.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RouteRequest {
    /// Capture a request from its parts and the already-read body.
    ///
    /// Uses the original URI when the router was nested, so the upstream
    /// sees the path the caller actually requested.
    pub fn from_parts(parts: &Parts, body: Bytes) -> Self {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or(&parts.uri);

        Self {
            method: parts.method.clone(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers: parts.headers.clone(),
            body,
        }
    }
}

/// Failure assembling the outbound request
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("model endpoint is empty")]
    InvalidEndpoint,

    #[error(transparent)]
    InvalidCredential(#[from] InvalidCredential),
}

/// The request sent to the resolved upstream endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Same buffer as the inbound body; cloning `Bytes` does not copy
    pub body: Bytes,
}

impl UpstreamRequest {
    /// Derive the outbound request from the inbound one and the resolved model
    pub fn build(
        route: &RouteRequest,
        model: &ModelRecord,
        credential: &Credential,
    ) -> Result<Self, BuildError> {
        let url = join_endpoint_and_path(&model.endpoint, &route.path, route.query.as_deref())?;
        let headers = build_upstream_headers(&route.headers, credential)?;

        Ok(Self {
            method: route.method.clone(),
            url,
            headers,
            body: route.body.clone(),
        })
    }
}

/// Combine the endpoint base with the inbound path and raw query.
///
/// Trailing slashes of the endpoint are stripped, a leading slash is added
/// to the path when missing, and a non-empty query is appended unchanged.
pub fn join_endpoint_and_path(
    endpoint: &str,
    path: &str,
    query: Option<&str>,
) -> Result<String, BuildError> {
    let base = endpoint.trim_end_matches('/');
    if base.is_empty() {
        return Err(BuildError::InvalidEndpoint);
    }

    let separator = if path.starts_with('/') { "" } else { "/" };
    match query.filter(|q| !q.is_empty()) {
        Some(query) => Ok(format!("{}{}{}?{}", base, separator, path, query)),
        None => Ok(format!("{}{}{}", base, separator, path)),
    }
}
