use std::fmt;

/// Which lookup a stored key answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupKind {
    Fingerprint,
    KeyId,
    Email,
    Wkd,
}

impl LookupKind {
    /// Subtree of the storage root holding this kind of key.
    pub fn subtree(self) -> &'static str {
        match self {
            LookupKind::Fingerprint => "vks/fingerprint",
            LookupKind::KeyId => "vks/keyid",
            LookupKind::Email => "vks/email",
            LookupKind::Wkd => "wkd",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupKind::Fingerprint => "fingerprint",
            LookupKind::KeyId => "keyid",
            LookupKind::Email => "email",
            LookupKind::Wkd => "wkd",
        };
        f.write_str(name)
    }
}

/// One blob persisted to the key store.
///
/// `key` is normalized to lowercase on construction; for [`LookupKind::Wkd`]
/// it is the hierarchical `domain/hash` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredKeyEntry {
    pub kind: LookupKind,
    pub key: String,
    pub payload: Vec<u8>,
}

impl StoredKeyEntry {
    pub fn new(kind: LookupKind, key: &str, payload: Vec<u8>) -> Self {
        Self {
            kind,
            key: normalize_key(key),
            payload,
        }
    }

    /// Entry for the WKD subtree at `domain/hash`.
    pub fn wkd(domain: &str, hash: &str, payload: Vec<u8>) -> Self {
        Self::new(LookupKind::Wkd, &wkd_key(domain, hash), payload)
    }
}

/// Lowercase a lookup key so reads and writes agree regardless of caller case.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Physical key of a WKD entry.
pub fn wkd_key(domain: &str, hash: &str) -> String {
    format!("{}/{}", domain.trim(), hash.trim())
}
