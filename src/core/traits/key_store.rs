use crate::core::errors::Result;
use crate::core::models::stored_key::{LookupKind, StoredKeyEntry};

/// Port for the blob storage behind every lookup protocol.
///
/// Keys are normalized by the implementation, so callers may pass them in
/// any case.
pub trait KeyStore: Send + Sync {
    /// Create or overwrite an entry.
    fn put(&self, entry: &StoredKeyEntry) -> Result<()>;

    /// Read an entry, `None` if it was never synced.
    fn get(&self, kind: LookupKind, key: &str) -> Result<Option<Vec<u8>>>;

    /// Whether an entry exists.
    fn contains(&self, kind: LookupKind, key: &str) -> Result<bool> {
        Ok(self.get(kind, key)?.is_some())
    }
}
