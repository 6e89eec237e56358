//! Header handling for relayed requests and responses
//!
//! All functions here are pure transformations over `HeaderMap` so the
//! hop-by-hop rules can be tested without any transport involved.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::registry::Credential;

/// Hop-by-hop headers that describe a single connection and are never relayed.
///
/// `HeaderName` is always lowercase, so comparing against these strings is
/// case-insensitive with respect to the wire form.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "proxy-connection",
    "keep-alive",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Headers tied to the inbound connection that the HTTP client recomputes
/// for the upstream target.
const INBOUND_TRANSPORT_HEADERS: &[&str] = &["host", "content-length"];

/// Check if a header is a hop-by-hop header that should not be forwarded
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Copy every header except the hop-by-hop set.
///
/// Multi-valued headers keep all of their values in their original order.
pub fn filter_hop_by_hop(source: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(source.len());

    for name in source.keys() {
        if is_hop_by_hop_header(name) {
            continue;
        }
        for value in source.get_all(name) {
            filtered.append(name.clone(), value.clone());
        }
    }

    filtered
}

/// Error building outbound headers
#[derive(Debug, thiserror::Error)]
#[error("credential cannot be encoded as an Authorization header")]
pub struct InvalidCredential;

/// Build the header set for the upstream request.
///
/// Applies the hop-by-hop filter, drops inbound transport headers,
/// re-asserts `Content-Type`, and injects `Authorization: Bearer <credential>`
/// only when the caller did not send an `Authorization` header and the
/// credential is not blank.
pub fn build_upstream_headers(
    incoming: &HeaderMap,
    credential: &Credential,
) -> Result<HeaderMap, InvalidCredential> {
    let mut headers = filter_hop_by_hop(incoming);
    for name in INBOUND_TRANSPORT_HEADERS {
        headers.remove(*name);
    }

    if let Some(content_type) = incoming.get(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, content_type.clone());
    }

    if !headers.contains_key(AUTHORIZATION) && !credential.is_blank() {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
            .map_err(|_| InvalidCredential)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
