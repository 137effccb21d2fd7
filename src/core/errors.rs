/// All domain errors for the key directory.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error(
        "Failed to fetch keys from {url}: {reason}\n\n  \
         Check that the webkey service is reachable and the URL is correct.\n  \
         Nothing was written for this run."
    )]
    FetchFailed { url: String, reason: String },

    #[error(
        "Invalid response from webkey service: {detail}\n\n  \
         Expected a JSON array of certificates or a JSON object with\n  \
         'fingerprint', 'keyid', 'email' and 'domain' groups."
    )]
    ParseError { detail: String },

    #[error("Ascii armor integrity check failed")]
    ArmorIntegrity,

    #[error("Invalid ascii armor: {detail}")]
    ArmorEncoding { detail: String },

    #[error(
        "Invalid {kind} lookup key '{key}'\n\n  \
         Lookup keys must be non-empty and must not contain path separators or '..'."
    )]
    InvalidLookupKey { kind: String, key: String },

    #[error("{name} parameter is missing!")]
    MissingParameter { name: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("Lookup server error: {detail}")]
    ServerError { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DirectoryError>;
