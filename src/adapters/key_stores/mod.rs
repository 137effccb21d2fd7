pub mod directory_key_store;
