use crate::core::errors::Result;

/// Port for retrieving the raw listing from a webkey service.
///
/// Implementations live in `adapters::http`; tests substitute a canned body.
pub trait KeyFetcher: Send + Sync {
    /// GET `url` and return the full response body.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
