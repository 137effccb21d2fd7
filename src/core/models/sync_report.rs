use chrono::{DateTime, Utc};

use super::stored_key::LookupKind;

/// Summary of one synchronization run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub fingerprints: usize,
    pub key_ids: usize,
    pub emails: usize,
    pub wkd_entries: usize,
}

impl SyncReport {
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            fingerprints: 0,
            key_ids: 0,
            emails: 0,
            wkd_entries: 0,
        }
    }

    /// Count one written entry of `kind`.
    pub fn record(&mut self, kind: LookupKind) {
        match kind {
            LookupKind::Fingerprint => self.fingerprints += 1,
            LookupKind::KeyId => self.key_ids += 1,
            LookupKind::Email => self.emails += 1,
            LookupKind::Wkd => self.wkd_entries += 1,
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn total(&self) -> usize {
        self.fingerprints + self.key_ids + self.emails + self.wkd_entries
    }

    /// Wall-clock duration of the run in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        self.finished_at
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }
}
