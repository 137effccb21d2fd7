//! Home and search pages.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use super::AppState;
use crate::core::models::stored_key::LookupKind;
use crate::core::services::search::{classify, strip_hex_prefix};

const SEARCH_FORM: &str = r#"<form action="/search" method="GET">
            <input type="text" name="search" autofocus placeholder="Search by Email Address / Key ID / Fingerprint">
            <button type="submit">Search</button>
        </form>"#;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, content: &str) -> Html<String> {
    let title = escape(title);
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
</head>
<body>
    <div class="card">
        <h1><a class="brand" href="/">{title}</a></h1>
        {content}
    </div>
</body>
</html>
"#
    ))
}

/// GET /
pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    layout(&state.settings.app_name, SEARCH_FORM)
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// VKS route serving a key of `kind`.
fn key_url(kind: LookupKind, key: &str) -> String {
    let route = match kind {
        LookupKind::Fingerprint => "by-fingerprint",
        LookupKind::KeyId => "by-keyid",
        LookupKind::Email | LookupKind::Wkd => "by-email",
    };
    format!("/vks/v1/{route}/{key}")
}

/// GET /search?search=...
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Html<String> {
    let search = query.search.as_deref().unwrap_or_default().trim();
    let shown = escape(strip_hex_prefix(search));

    let found = classify(search).filter(|target| {
        state
            .store
            .contains(target.kind, &target.key)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "search lookup failed");
                false
            })
    });

    let content = match found {
        Some(target) => format!(
            r#"<p>A key was found for <span class="email">{shown}</span></p>
        <p><a href="{}">{shown}</a></p>"#,
            escape(&key_url(target.kind, &target.key))
        ),
        None => format!(
            r#"<p><strong>Error</strong>: No key found for <span class="email">{shown}</span></p>
        {SEARCH_FORM}"#
        ),
    };
    layout(&state.settings.app_name, &content)
}
