pub mod fetcher;
pub mod key_store;
