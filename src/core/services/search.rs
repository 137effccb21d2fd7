use crate::core::models::stored_key::{LookupKind, normalize_key};
use crate::core::services::identity::is_email;

/// Hex digits in a v4 fingerprint.
const FINGERPRINT_HEX_LEN: usize = 40;
/// Hex digits in a long key ID.
const KEY_ID_HEX_LEN: usize = 16;

/// Where a free-form search query should be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pub kind: LookupKind,
    pub key: String,
}

/// Classify an HKP/search query.
///
/// Emails go to the email subtree; otherwise an optional `0x` prefix is
/// dropped and 40 or 16 hex digits select fingerprint or key ID.
pub fn classify(query: &str) -> Option<SearchTarget> {
    let query = query.trim();
    if is_email(query) {
        return Some(SearchTarget {
            kind: LookupKind::Email,
            key: normalize_key(query),
        });
    }

    let hex = strip_hex_prefix(query);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let kind = match hex.len() {
        FINGERPRINT_HEX_LEN => LookupKind::Fingerprint,
        KEY_ID_HEX_LEN => LookupKind::KeyId,
        _ => return None,
    };
    Some(SearchTarget {
        kind,
        key: normalize_key(hex),
    })
}

/// `0xABCD` → `ABCD`.
pub fn strip_hex_prefix(query: &str) -> &str {
    query
        .strip_prefix("0x")
        .or_else(|| query.strip_prefix("0X"))
        .unwrap_or(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_query() {
        let target = classify("User-01@Example.com").unwrap();
        assert_eq!(target.kind, LookupKind::Email);
        assert_eq!(target.key, "user-01@example.com");
    }

    #[test]
    fn fingerprint_query_with_and_without_prefix() {
        let fp = "3D8B4357FD879A68B17CD63E515FD6D483835295";
        for query in [fp.to_string(), format!("0x{fp}")] {
            let target = classify(&query).unwrap();
            assert_eq!(target.kind, LookupKind::Fingerprint);
            assert_eq!(target.key, fp.to_lowercase());
        }
    }

    #[test]
    fn key_id_query() {
        let target = classify("0x0C78729346288572").unwrap();
        assert_eq!(target.kind, LookupKind::KeyId);
        assert_eq!(target.key, "0c78729346288572");
    }

    #[test]
    fn unrecognized_queries() {
        assert!(classify("").is_none());
        assert!(classify("jane").is_none());
        assert!(classify("0x1234").is_none());
        assert!(classify("zz8b4357fd879a68b17cd63e515fd6d483835295").is_none());
    }
}
