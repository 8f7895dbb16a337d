//! Catalog maintenance jobs.
//!
//! Both jobs run to completion synchronously, one row at a time, and default
//! to dry-run: they report what they would change without touching the store.
//! In apply mode a failure on one row is logged and counted, never fatal.

pub mod dedup;
pub mod rename;

pub use dedup::{DedupJob, DedupReport};
pub use rename::{RenameDuplicateTitlesJob, RenameReport};
