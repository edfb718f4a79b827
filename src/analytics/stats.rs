use super::sum::ExactSum;
use crate::models::{Stats, TradeWithPL};

/// Aggregate performance over a P/L-annotated collection.
///
/// Every sum is exact and rounded once, so the result is the same for any
/// ordering of `trades`, and `total_pl` matches the last equity point.
pub fn calculate_stats(trades: &[TradeWithPL]) -> Stats {
    let total_trades = trades.len();
    if total_trades == 0 {
        return Stats::empty();
    }

    let total_pl = trades.iter().map(|t| t.pl).collect::<ExactSum>().value();

    let winners: Vec<f64> = trades.iter().map(|t| t.pl).filter(|pl| *pl > 0.0).collect();
    let losers: Vec<f64> = trades.iter().map(|t| t.pl).filter(|pl| *pl < 0.0).collect();

    let win_rate = (winners.len() as f64 / total_trades as f64) * 100.0;

    let total_gains = winners.iter().copied().collect::<ExactSum>().value();
    let total_losses = losers.iter().copied().collect::<ExactSum>().value().abs();

    let profit_factor = if total_losses > 0.0 {
        Some(total_gains / total_losses)
    } else {
        None
    };

    let avg_win = if winners.is_empty() {
        0.0
    } else {
        total_gains / winners.len() as f64
    };
    let avg_loss = if losers.is_empty() {
        0.0
    } else {
        total_losses / losers.len() as f64
    };

    Stats {
        total_pl,
        win_rate,
        total_trades,
        winning_trades: winners.len(),
        losing_trades: losers.len(),
        profit_factor,
        avg_win,
        avg_loss,
    }
}
