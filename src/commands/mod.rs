pub mod crawl;
pub mod export;
pub mod inventory;
pub mod matching;
pub mod query;
pub mod tracks;

// Re-export command functions for convenience
pub use crawl::{crawl, resolve_years};
pub use export::export_command;
pub use inventory::inventory_report;
pub use matching::match_command;
pub use query::{query_command, QueryArgs};
pub use tracks::tracks_command;
