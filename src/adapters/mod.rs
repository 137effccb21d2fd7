pub mod http;
pub mod key_stores;
pub mod server;
