use super::sum::ExactSum;
use crate::models::{EquityPoint, TradeWithPL};

/// Cumulative P/L curve, oldest trade first.
///
/// `trades` is newest-first; it is replayed in reverse so each point holds
/// the running total up to and including that trade.
pub fn equity_curve(trades: &[TradeWithPL]) -> Vec<EquityPoint> {
    let mut cumulative_pl = ExactSum::new();
    trades
        .iter()
        .rev()
        .enumerate()
        .map(|(index, trade)| {
            cumulative_pl.add(trade.pl);
            EquityPoint {
                name: format!("Trade {}", index + 1),
                equity: cumulative_pl.value(),
                date: trade.trade.date,
            }
        })
        .collect()
}
