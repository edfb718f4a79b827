//! The trade collection and the views derived from it.

pub mod transfer;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::analytics::AnalyticsCache;
use crate::error::{JournalError, Result};
use crate::models::{Dashboard, EquityPoint, NewTrade, Stats, TradeRecord, TradeWithPL};
use crate::repository::TradeRepository;

pub use transfer::ImportSummary;

struct JournalState {
    trades: Arc<[TradeRecord]>,
    cache: AnalyticsCache,
}

pub struct TradeJournal {
    repository: Arc<dyn TradeRepository>,
    state: Mutex<JournalState>,
    load_error: Option<String>,
}

/// Identity for a newly logged trade
pub fn generate_trade_id() -> String {
    format!("TRADE-{}-{}", Utc::now().timestamp_millis(), uuid::Uuid::new_v4())
}

impl TradeJournal {
    /// Load the collection from `repository`.
    ///
    /// A failed load is not fatal: the journal starts empty and the failure
    /// is kept in [`TradeJournal::load_error`] so the caller can notify the user.
    /// Stored records that fail validation, or repeat an earlier id, are
    /// dropped and reported the same way.
    pub fn open(repository: Arc<dyn TradeRepository>) -> Self {
        let (trades, load_error) = match repository.load() {
            Ok(stored) => {
                let (trades, rejected) = transfer::screen_stored(stored);
                log::info!(
                    "Loaded {} trades from {} storage",
                    trades.len(),
                    repository.backend_name()
                );
                if rejected.is_empty() {
                    (trades, None)
                } else {
                    for reason in &rejected {
                        log::warn!("Skipping stored trade: {}", reason);
                    }
                    let message = format!(
                        "skipped {} invalid stored trades: {}",
                        rejected.len(),
                        rejected.join("; ")
                    );
                    (trades, Some(message))
                }
            }
            Err(e) => {
                log::error!(
                    "Error reading trades from {} storage: {}",
                    repository.backend_name(),
                    e
                );
                (Vec::new(), Some(e.to_string()))
            }
        };

        Self {
            repository,
            state: Mutex::new(JournalState {
                trades: Arc::from(trades),
                cache: AnalyticsCache::new(),
            }),
            load_error,
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, JournalState>> {
        self.state
            .lock()
            .map_err(|e| JournalError::Storage(format!("journal lock poisoned: {}", e)))
    }

    /// Snapshot of the collection, newest first
    pub fn current_trades(&self) -> Result<Arc<[TradeRecord]>> {
        Ok(Arc::clone(&self.lock_state()?.trades))
    }

    pub fn find_trade(&self, id: &str) -> Result<TradeRecord> {
        self.current_trades()?
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| JournalError::NotFound(format!("trade '{}'", id)))
    }

    /// Validate, assign an id, prepend and persist.
    ///
    /// The state lock is held across the save, so only one mutation is ever
    /// in flight. If the save fails the in-memory collection is unchanged.
    pub fn add_trade(&self, input: NewTrade) -> Result<TradeRecord> {
        input.validate()?;

        let mut state = self.lock_state()?;
        let record = input.into_record(generate_trade_id());

        let mut next = Vec::with_capacity(state.trades.len() + 1);
        next.push(record.clone());
        next.extend(state.trades.iter().cloned());

        if let Err(e) = self.repository.save(&next) {
            log::error!("Error saving trades to {} storage: {}", self.repository.backend_name(), e);
            return Err(e);
        }

        state.trades = Arc::from(next);
        log::info!("Logged trade {} ({} {})", record.id, record.trade_type.as_str(), record.symbol);

        Ok(record)
    }

    /// Merge an exported collection behind the current trades.
    /// Records whose id already exists are skipped.
    pub fn import_json(&self, json: &str) -> Result<ImportSummary> {
        let incoming = transfer::parse_import(json)?;

        let mut state = self.lock_state()?;
        let existing: HashSet<&str> = state.trades.iter().map(|t| t.id.as_str()).collect();

        let total = incoming.len();
        let fresh: Vec<TradeRecord> = incoming
            .into_iter()
            .filter(|t| !existing.contains(t.id.as_str()))
            .collect();
        let summary = ImportSummary {
            imported: fresh.len(),
            duplicates: total - fresh.len(),
        };

        if summary.imported > 0 {
            let mut next: Vec<TradeRecord> = state.trades.to_vec();
            next.extend(fresh);
            self.repository.save(&next)?;
            state.trades = Arc::from(next);
        }

        log::info!(
            "Imported {} trades ({} duplicates skipped)",
            summary.imported,
            summary.duplicates
        );
        Ok(summary)
    }

    pub fn export_json(&self) -> Result<String> {
        transfer::export_json(&self.current_trades()?)
    }

    /// All derived views for the current snapshot, memoized per snapshot
    pub fn dashboard(&self) -> Result<Arc<Dashboard>> {
        let mut state = self.lock_state()?;
        let snapshot = Arc::clone(&state.trades);
        Ok(state.cache.get_or_derive(&snapshot))
    }

    pub fn trades_with_pl(&self) -> Result<Vec<TradeWithPL>> {
        Ok(self.dashboard()?.trades_with_pl.clone())
    }

    pub fn stats(&self) -> Result<Stats> {
        Ok(self.dashboard()?.stats.clone())
    }

    pub fn equity_curve(&self) -> Result<Vec<EquityPoint>> {
        Ok(self.dashboard()?.equity_data.clone())
    }

    pub fn trade_with_pl(&self, id: &str) -> Result<TradeWithPL> {
        self.dashboard()?
            .trades_with_pl
            .iter()
            .find(|t| t.trade.id == id)
            .cloned()
            .ok_or_else(|| JournalError::NotFound(format!("trade '{}'", id)))
    }
}
