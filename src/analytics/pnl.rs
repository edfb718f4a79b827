use crate::models::{TradeRecord, TradeType, TradeWithPL};

/// Signed profit/loss of one trade, at full precision.
pub fn calculate_pl(trade: &TradeRecord) -> f64 {
    match trade.trade_type {
        TradeType::Long => (trade.exit_price - trade.entry_price) * trade.size,
        TradeType::Short => (trade.entry_price - trade.exit_price) * trade.size,
    }
}

/// Annotate every trade with its P/L, newest date first.
///
/// The sort is stable, so trades sharing a date keep their relative
/// insertion order (time of day is not consulted).
pub fn with_pl(trades: &[TradeRecord]) -> Vec<TradeWithPL> {
    let mut annotated: Vec<TradeWithPL> = trades
        .iter()
        .map(|trade| TradeWithPL {
            pl: calculate_pl(trade),
            trade: trade.clone(),
        })
        .collect();

    annotated.sort_by(|a, b| b.trade.date.cmp(&a.trade.date));
    annotated
}
