use std::sync::Mutex;

use super::TradeRepository;
use crate::error::{JournalError, Result};
use crate::models::TradeRecord;

#[derive(Default)]
pub struct InMemoryRepository {
    trades: Mutex<Vec<TradeRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trades(trades: Vec<TradeRecord>) -> Self {
        Self {
            trades: Mutex::new(trades),
        }
    }
}

impl TradeRepository for InMemoryRepository {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<Vec<TradeRecord>> {
        let trades = self
            .trades
            .lock()
            .map_err(|e| JournalError::Storage(e.to_string()))?;
        Ok(trades.clone())
    }

    fn save(&self, trades: &[TradeRecord]) -> Result<()> {
        let mut stored = self
            .trades
            .lock()
            .map_err(|e| JournalError::Storage(e.to_string()))?;
        *stored = trades.to_vec();
        Ok(())
    }
}
