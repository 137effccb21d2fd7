use serde_json::Value;

use crate::core::errors::{DirectoryError, Result};
use crate::core::models::certificate::{
    CertificateRecord, DirectoryListing, GroupedDirectory, KeyGroup,
};
use crate::core::models::stored_key::{LookupKind, StoredKeyEntry};
use crate::core::models::sync_report::SyncReport;
use crate::core::services::aggregator::KeyAggregator;
use crate::core::services::armor;
use crate::core::traits::fetcher::KeyFetcher;
use crate::core::traits::key_store::KeyStore;

/// Mirrors a webkey service listing into a `KeyStore`.
///
/// A run is fetch → parse → aggregate → re-armor → write. Writes already
/// made when a later step fails are kept.
pub struct SyncService<F: KeyFetcher, S: KeyStore> {
    pub fetcher: F,
    pub store: S,
}

impl<F: KeyFetcher, S: KeyStore> SyncService<F, S> {
    pub fn new(fetcher: F, store: S) -> Self {
        Self { fetcher, store }
    }

    /// Fetch and apply the listing at `url`.
    pub fn synchronize(&self, url: &str) -> Result<SyncReport> {
        let listing = self.fetch_listing(url)?;
        self.apply(listing)
    }

    /// Fetch the listing at `url` and parse it.
    pub fn fetch_listing(&self, url: &str) -> Result<DirectoryListing> {
        tracing::info!(url, "fetching webkey listing");
        let body = self.fetcher.fetch(url)?;
        tracing::debug!(bytes = body.len(), "webkey listing received");
        parse_listing(&body)
    }

    /// Write a parsed listing to the store.
    pub fn apply(&self, listing: DirectoryListing) -> Result<SyncReport> {
        let report = SyncReport::begin();
        let report = match listing {
            DirectoryListing::Flat(records) => self.apply_flat(&records, report)?,
            DirectoryListing::Grouped(grouped) => self.apply_grouped(&grouped, report)?,
            DirectoryListing::Empty => {
                tracing::info!("webkey listing is empty, nothing to sync");
                report
            }
        }
        .finish();

        tracing::info!(
            fingerprints = report.fingerprints,
            key_ids = report.key_ids,
            emails = report.emails,
            wkd = report.wkd_entries,
            elapsed_ms = report.elapsed_ms(),
            "sync finished"
        );
        Ok(report)
    }

    fn apply_flat(
        &self,
        records: &[CertificateRecord],
        mut report: SyncReport,
    ) -> Result<SyncReport> {
        let mut aggregator = KeyAggregator::new();

        for record in records {
            let original = record.key_data.as_bytes();
            self.write(LookupKind::Fingerprint, &record.fingerprint, original, &mut report)?;
            self.write(LookupKind::KeyId, &record.key_id, original, &mut report)?;

            let payload = if record.is_armored() {
                armor::decode_all(&record.key_data)?
            } else {
                original.to_vec()
            };
            if payload.is_empty() {
                tracing::warn!(
                    fingerprint = %record.fingerprint,
                    "record carries no public key material, not published by email or WKD"
                );
                continue;
            }
            aggregator.push(record, &payload);
        }

        let (by_wkd, by_email) = aggregator.into_parts();

        for (email, key) in &by_email {
            let armored = armor::encode(key);
            self.write(LookupKind::Email, email, armored.as_bytes(), &mut report)?;
        }

        for (dest, key) in &by_wkd {
            if dest.domain.is_empty() || dest.hash.is_empty() {
                tracing::warn!(
                    domain = %dest.domain,
                    hash = %dest.hash,
                    "skipping WKD entry without domain or hash"
                );
                continue;
            }
            let armored = armor::encode(key);
            self.store
                .put(&StoredKeyEntry::wkd(&dest.domain, &dest.hash, armored.into_bytes()))?;
            report.record(LookupKind::Wkd);
        }

        Ok(report)
    }

    fn apply_grouped(
        &self,
        grouped: &GroupedDirectory,
        mut report: SyncReport,
    ) -> Result<SyncReport> {
        let groups: [(LookupKind, &Option<KeyGroup>); 3] = [
            (LookupKind::Fingerprint, &grouped.fingerprint),
            (LookupKind::KeyId, &grouped.keyid),
            (LookupKind::Email, &grouped.email),
        ];

        for (kind, group) in groups {
            for (key, payload) in group.iter().flatten() {
                self.write(kind, key, payload.as_bytes(), &mut report)?;
            }
        }

        for (domain, hashes) in grouped.domain.iter().flatten() {
            for (hash, payload) in hashes {
                self.store
                    .put(&StoredKeyEntry::wkd(domain, hash, payload.as_bytes().to_vec()))?;
                report.record(LookupKind::Wkd);
            }
        }

        Ok(report)
    }

    /// Put one entry, skipping records that carry no key for this kind.
    fn write(
        &self,
        kind: LookupKind,
        key: &str,
        payload: &[u8],
        report: &mut SyncReport,
    ) -> Result<()> {
        if key.trim().is_empty() {
            tracing::warn!(%kind, "skipping entry without lookup key");
            return Ok(());
        }
        tracing::debug!(%kind, key, "writing key");
        self.store
            .put(&StoredKeyEntry::new(kind, key, payload.to_vec()))?;
        report.record(kind);
        Ok(())
    }
}

/// Parse a webkey service response.
///
/// An array root is the flat certificate list, an object root the grouped
/// directory. Falsy or empty roots parse to [`DirectoryListing::Empty`].
pub fn parse_listing(body: &[u8]) -> Result<DirectoryListing> {
    let value: Value = serde_json::from_slice(body).map_err(|e| DirectoryError::ParseError {
        detail: format!("response is not valid JSON: {e}"),
    })?;

    match value {
        Value::Null | Value::Bool(false) => Ok(DirectoryListing::Empty),
        Value::String(s) if s.is_empty() || s == "0" => Ok(DirectoryListing::Empty),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(DirectoryListing::Empty),
        Value::Array(items) if items.is_empty() => Ok(DirectoryListing::Empty),
        Value::Array(items) => {
            let records = serde_json::from_value::<Vec<CertificateRecord>>(Value::Array(items))
                .map_err(|e| DirectoryError::ParseError {
                    detail: format!("invalid certificate record: {e}"),
                })?;
            Ok(DirectoryListing::Flat(records))
        }
        Value::Object(map) => {
            let grouped = serde_json::from_value::<GroupedDirectory>(Value::Object(map))
                .map_err(|e| DirectoryError::ParseError {
                    detail: format!("invalid grouped directory: {e}"),
                })?;
            if grouped.is_empty() {
                Ok(DirectoryListing::Empty)
            } else {
                Ok(DirectoryListing::Grouped(grouped))
            }
        }
        other => Err(DirectoryError::ParseError {
            detail: format!("unexpected JSON root: {other}"),
        }),
    }
}
