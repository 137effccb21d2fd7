use std::collections::BTreeMap;

use crate::core::models::certificate::CertificateRecord;
use crate::core::models::stored_key::normalize_key;
use crate::core::services::identity::extract_email;

/// WKD destination of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WkdDestination {
    pub domain: String,
    pub hash: String,
}

/// Joins the key material of records that share a destination.
///
/// Certificates with several user IDs arrive as several records; appending
/// their payloads in arrival order rebuilds one exportable key per
/// destination.
#[derive(Debug, Default)]
pub struct KeyAggregator {
    by_wkd: BTreeMap<WkdDestination, Vec<u8>>,
    by_email: BTreeMap<String, Vec<u8>>,
}

impl KeyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `payload` under the record's WKD destination and, when its
    /// primary user ID carries an address, under that email.
    pub fn push(&mut self, record: &CertificateRecord, payload: &[u8]) {
        let destination = WkdDestination {
            domain: normalize_key(&record.domain),
            hash: normalize_key(&record.wkd_hash),
        };
        self.by_wkd
            .entry(destination)
            .or_default()
            .extend_from_slice(payload);

        // Case variants of one address share a stored entry.
        let email = normalize_key(&extract_email(&record.primary_user));
        if !email.is_empty() {
            self.by_email
                .entry(email)
                .or_default()
                .extend_from_slice(payload);
        }
    }

    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<WkdDestination, Vec<u8>>,
        BTreeMap<String, Vec<u8>>,
    ) {
        (self.by_wkd, self.by_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(domain: &str, hash: &str, user: &str) -> CertificateRecord {
        CertificateRecord {
            domain: domain.into(),
            wkd_hash: hash.into(),
            fingerprint: String::new(),
            key_id: String::new(),
            primary_user: user.into(),
            key_data: String::new(),
        }
    }

    #[test]
    fn same_destination_concatenates_in_order() {
        let mut agg = KeyAggregator::new();
        agg.push(&record("example.com", "abc", "Jane <jane@example.com>"), b"A");
        agg.push(&record("example.com", "abc", "Jane <jane@example.com>"), b"B");

        let wkd = WkdDestination {
            domain: "example.com".into(),
            hash: "abc".into(),
        };
        let (by_wkd, by_email) = agg.into_parts();
        assert_eq!(by_wkd[&wkd], b"AB".to_vec());
        assert_eq!(by_email["jane@example.com"], b"AB".to_vec());
    }

    #[test]
    fn distinct_destinations_stay_separate() {
        let mut agg = KeyAggregator::new();
        agg.push(&record("example.com", "abc", "a@example.com"), b"A");
        agg.push(&record("example.org", "abc", "b@example.org"), b"B");

        let (by_wkd, by_email) = agg.into_parts();
        assert_eq!(by_wkd.len(), 2);
        assert_eq!(by_email.len(), 2);
    }

    #[test]
    fn email_case_variants_merge() {
        let mut agg = KeyAggregator::new();
        agg.push(&record("example.com", "abc", "Jane <Jane@Example.com>"), b"A");
        agg.push(&record("example.com", "abc", "Jane <jane@example.com>"), b"B");

        let (_, by_email) = agg.into_parts();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email["jane@example.com"], b"AB".to_vec());
    }

    #[test]
    fn record_without_email_only_feeds_wkd() {
        let mut agg = KeyAggregator::new();
        agg.push(&record("example.com", "abc", "No Address"), b"A");

        let (by_wkd, by_email) = agg.into_parts();
        assert_eq!(by_wkd.len(), 1);
        assert!(by_email.is_empty());
    }
}
