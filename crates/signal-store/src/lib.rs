//! Signal Store
//!
//! SQLite persistence for articles, stock mentions, sentiment records and
//! alpha snapshots. Implements the ledger, article and alpha data-source
//! traits from `signal-core`.

pub mod alpha;
pub mod articles;
pub mod db;
pub mod error;
pub mod sentiment;

pub use db::SignalDb;
pub use error::{StoreError, StoreResult};
