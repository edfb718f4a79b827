//! Storage backends for the trade collection.
//!
//! The journal only sees [`TradeRepository`]: the whole collection is read
//! with `load` and written back wholesale with `save`, newest trade first.

pub mod json_file;
pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::models::TradeRecord;

pub use json_file::JsonFileRepository;
pub use memory::InMemoryRepository;
pub use sqlite::SqliteTradeRepository;

pub trait TradeRepository: Send + Sync {
    /// Short backend name used in log lines
    fn backend_name(&self) -> &str;

    /// The stored collection, newest first. An empty store yields an empty vec.
    fn load(&self) -> Result<Vec<TradeRecord>>;

    /// Replace the stored collection.
    fn save(&self, trades: &[TradeRecord]) -> Result<()>;
}
