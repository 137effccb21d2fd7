pub mod aggregator;
pub mod armor;
pub mod identity;
pub mod search;
pub mod sync_service;
