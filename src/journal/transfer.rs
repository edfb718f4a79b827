use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};
use crate::models::TradeRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
}

/// Pretty-printed JSON array of the collection, newest first
pub fn export_json(trades: &[TradeRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(trades)?)
}

/// Parse and validate an exported collection.
///
/// Any invalid record fails the whole import; so does an id appearing twice
/// within the document.
pub fn parse_import(json: &str) -> Result<Vec<TradeRecord>> {
    let trades: Vec<TradeRecord> = serde_json::from_str(json)
        .map_err(|e| JournalError::Validation(format!("unreadable trade export: {}", e)))?;

    let mut seen = HashSet::new();
    for (index, trade) in trades.iter().enumerate() {
        check_record(index, trade, &mut seen)?;
    }

    Ok(trades)
}

/// Split a stored collection into the records that pass ingestion and the
/// reasons the others were dropped. The first occurrence of an id wins.
pub fn screen_stored(trades: Vec<TradeRecord>) -> (Vec<TradeRecord>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut rejected = Vec::new();
    let mut kept = Vec::with_capacity(trades.len());

    for (index, trade) in trades.into_iter().enumerate() {
        match check_record(index, &trade, &mut seen) {
            Ok(()) => kept.push(trade),
            Err(e) => rejected.push(e.to_string()),
        }
    }

    (kept, rejected)
}

fn check_record(index: usize, trade: &TradeRecord, seen: &mut HashSet<String>) -> Result<()> {
    trade
        .validate()
        .map_err(|e| JournalError::Validation(format!("record {} ({}): {}", index, trade.id, e)))?;
    if !seen.insert(trade.id.clone()) {
        return Err(JournalError::Validation(format!(
            "record {}: duplicate trade id '{}'",
            index, trade.id
        )));
    }
    Ok(())
}
