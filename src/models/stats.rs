use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::trade::TradeRecord;

/// A trade annotated with its derived profit/loss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeWithPL {
    #[serde(flatten)]
    pub trade: TradeRecord,
    pub pl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(rename = "totalPL")]
    pub total_pl: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// `None` when there are no losing trades
    pub profit_factor: Option<f64>,
    pub avg_win: f64,
    pub avg_loss: f64,
}

impl Stats {
    pub fn empty() -> Self {
        Self {
            total_pl: 0.0,
            win_rate: 0.0,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            profit_factor: None,
            avg_win: 0.0,
            avg_loss: 0.0,
        }
    }

    pub fn breakeven_trades(&self) -> usize {
        self.total_trades - self.winning_trades - self.losing_trades
    }
}

/// One vertex of the cumulative P/L curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub name: String,
    pub equity: f64,
    pub date: NaiveDate,
}

/// Everything the dashboard shows, derived from one collection snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(rename = "tradesWithPL")]
    pub trades_with_pl: Vec<TradeWithPL>,
    pub stats: Stats,
    pub equity_data: Vec<EquityPoint>,
}
