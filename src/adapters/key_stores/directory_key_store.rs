use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::core::errors::{DirectoryError, Result};
use crate::core::models::stored_key::{LookupKind, StoredKeyEntry, normalize_key};
use crate::core::traits::key_store::KeyStore;

/// Key store that keeps one file per lookup key under a storage root.
///
/// Layout:
/// ```text
/// <root>/vks/fingerprint/<fingerprint>
/// <root>/vks/keyid/<keyid>
/// <root>/vks/email/<email>
/// <root>/wkd/<domain>/<hash>
/// ```
///
/// Files are replaced atomically, so a concurrent reader sees either the old
/// or the new key, never a partial write.
#[derive(Debug, Clone)]
pub struct DirectoryKeyStore {
    root: PathBuf,
}

impl DirectoryKeyStore {
    /// Create a key store rooted at `root`. Nothing is created on disk until
    /// the first write.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve the file backing `key`, rejecting keys that would escape
    /// their subtree.
    pub fn path_for(&self, kind: LookupKind, key: &str) -> Result<PathBuf> {
        let key = normalize_key(key);
        let invalid = || DirectoryError::InvalidLookupKey {
            kind: kind.to_string(),
            key: key.clone(),
        };

        let mut path = self.root.join(kind.subtree());
        match kind {
            LookupKind::Wkd => {
                let (domain, hash) = key.split_once('/').ok_or_else(invalid)?;
                if !is_safe_segment(domain) || !is_safe_segment(hash) {
                    return Err(invalid());
                }
                path.push(domain);
                path.push(hash);
            }
            _ => {
                if !is_safe_segment(&key) {
                    return Err(invalid());
                }
                path.push(&key);
            }
        }
        Ok(path)
    }
}

/// A single path component: non-empty, no separators, not `.`/`..`.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

impl KeyStore for DirectoryKeyStore {
    fn put(&self, entry: &StoredKeyEntry) -> Result<()> {
        let path = self.path_for(entry.kind, &entry.key)?;
        let parent = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(&entry.payload)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn get(&self, kind: LookupKind, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(kind, key)?;
        if !path.is_file() {
            return Ok(None);
        }
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
