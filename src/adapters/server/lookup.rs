//! WKD, VKS and HKP lookup handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::AppState;
use crate::core::errors::DirectoryError;
use crate::core::models::stored_key::{LookupKind, wkd_key};
use crate::core::services::search::{classify, strip_hex_prefix};

/// Read `key` from the store and answer with a download or a 404.
fn lookup(state: &AppState, kind: LookupKind, key: &str, shown_as: &str) -> Response {
    match state.store.get(kind, key) {
        Ok(Some(bytes)) => download(state, shown_as, bytes),
        Ok(None) | Err(DirectoryError::InvalidLookupKey { .. }) => not_found(shown_as),
        Err(e) => internal_error(e),
    }
}

/// An `application/pgp-keys` attachment that must not be cached.
pub(super) fn download(state: &AppState, name: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename={name}{}", state.settings.key_extension);
    (
        [
            (header::CONTENT_TYPE, "application/pgp-keys".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, max-age=0".to_string(),
            ),
            (header::PRAGMA, "no-cache".to_string()),
        ],
        bytes,
    )
        .into_response()
}

pub(super) fn not_found(value: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("No key found for {value}")).into_response()
}

fn internal_error(e: DirectoryError) -> Response {
    tracing::error!(error = %e, "key store read failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// GET /.well-known/openpgpkey/{domain}/hu/{hash}
pub async fn wkd_advanced(
    State(state): State<Arc<AppState>>,
    Path((domain, hash)): Path<(String, String)>,
) -> Response {
    lookup(&state, LookupKind::Wkd, &wkd_key(&domain, &hash), &hash)
}

/// GET /.well-known/openpgpkey/hu/{hash}
///
/// The direct method: the domain is the host the request was sent to.
pub async fn wkd_direct(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(hash): Path<String>,
) -> Response {
    let domain = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .and_then(|host| host.split(':').next())
        .unwrap_or_default();

    if domain.is_empty() {
        return not_found(&hash);
    }
    lookup(&state, LookupKind::Wkd, &wkd_key(domain, &hash), &hash)
}

/// GET /.well-known/openpgpkey/[{domain}/]policy
pub async fn wkd_policy() -> StatusCode {
    StatusCode::OK
}

/// GET /vks/v1/by-fingerprint/{fingerprint}
pub async fn vks_by_fingerprint(
    State(state): State<Arc<AppState>>,
    Path(fingerprint): Path<String>,
) -> Response {
    lookup(&state, LookupKind::Fingerprint, &fingerprint, &fingerprint)
}

/// GET /vks/v1/by-keyid/{keyid}
pub async fn vks_by_keyid(
    State(state): State<Arc<AppState>>,
    Path(keyid): Path<String>,
) -> Response {
    lookup(&state, LookupKind::KeyId, &keyid, &keyid)
}

/// GET /vks/v1/by-email/{email}
pub async fn vks_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Response {
    lookup(&state, LookupKind::Email, &email, &email)
}

#[derive(Debug, Deserialize)]
pub struct HkpQuery {
    pub op: Option<String>,
    pub search: Option<String>,
}

/// GET /pks/lookup?op=get&search=...
///
/// Only `get` is served; other operations on a known key answer 200 with
/// a plain-text notice.
pub async fn hkp_lookup(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HkpQuery>,
) -> Response {
    let op = query.op.as_deref().unwrap_or("get");
    let search = query.search.as_deref().unwrap_or_default().trim();

    let Some(target) = classify(search) else {
        return not_found(strip_hex_prefix(search));
    };

    match state.store.get(target.kind, &target.key) {
        Ok(Some(bytes)) if op == "get" => download(&state, &target.key, bytes),
        Ok(Some(_)) => format!("{op} operation not implemented").into_response(),
        Ok(None) | Err(DirectoryError::InvalidLookupKey { .. }) => {
            not_found(strip_hex_prefix(search))
        }
        Err(e) => internal_error(e),
    }
}
