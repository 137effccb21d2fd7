pub mod certificate;
pub mod stored_key;
pub mod sync_report;
