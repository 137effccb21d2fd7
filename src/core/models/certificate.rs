use std::collections::BTreeMap;

use serde::Deserialize;

/// A single certificate as delivered by the webkey service's flat listing.
///
/// `key_data` is either the key material itself or ASCII-armored text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CertificateRecord {
    pub domain: String,
    pub wkd_hash: String,
    pub fingerprint: String,
    pub key_id: String,
    #[serde(default)]
    pub primary_user: String,
    pub key_data: String,
}

impl CertificateRecord {
    /// Whether `key_data` is armored text rather than raw key material.
    pub fn is_armored(&self) -> bool {
        self.key_data.contains("-----BEGIN PGP")
    }
}

/// Lookup key → payload.
pub type KeyGroup = BTreeMap<String, String>;

/// The grouped listing: one map per lookup kind, already merged by the service.
///
/// `domain` nests `domain → hash → payload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroupedDirectory {
    #[serde(default)]
    pub fingerprint: Option<KeyGroup>,
    #[serde(default)]
    pub keyid: Option<KeyGroup>,
    #[serde(default)]
    pub email: Option<KeyGroup>,
    #[serde(default)]
    pub domain: Option<BTreeMap<String, KeyGroup>>,
}

impl GroupedDirectory {
    pub fn is_empty(&self) -> bool {
        let empty = |g: &Option<KeyGroup>| g.as_ref().is_none_or(|m| m.is_empty());
        empty(&self.fingerprint)
            && empty(&self.keyid)
            && empty(&self.email)
            && self
                .domain
                .as_ref()
                .is_none_or(|d| d.values().all(|hashes| hashes.is_empty()))
    }
}

/// A parsed webkey service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryListing {
    /// Array root: one record per certificate, aggregated locally.
    Flat(Vec<CertificateRecord>),
    /// Object root: pre-grouped payloads written as-is.
    Grouped(GroupedDirectory),
    /// `null`, `false`, `0`, `""`, `[]` or `{}`.
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_deserializes_without_primary_user() {
        let json = r#"{
            "domain": "example.com",
            "wkd_hash": "abc",
            "fingerprint": "AABB",
            "key_id": "1122",
            "key_data": "raw"
        }"#;
        let record: CertificateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.primary_user, "");
        assert!(!record.is_armored());
    }

    #[test]
    fn grouped_directory_with_only_empty_groups_is_empty() {
        let json = r#"{"fingerprint": {}, "domain": {"example.com": {}}}"#;
        let grouped: GroupedDirectory = serde_json::from_str(json).unwrap();
        assert!(grouped.is_empty());
    }

    #[test]
    fn grouped_directory_with_keys_is_not_empty() {
        let json = r#"{"email": {"jane@example.com": "key"}}"#;
        let grouped: GroupedDirectory = serde_json::from_str(json).unwrap();
        assert!(!grouped.is_empty());
    }
}
