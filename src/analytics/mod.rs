//! Derived analytics over a trade collection.
//!
//! Everything here is a pure function of its trade slice: no I/O, no clock,
//! no ambient settings.

pub mod equity;
pub mod pnl;
pub mod stats;
pub mod sum;

use std::sync::Arc;

use crate::models::{Dashboard, TradeRecord};

pub use equity::equity_curve;
pub use pnl::{calculate_pl, with_pl};
pub use stats::calculate_stats;
pub use sum::ExactSum;

/// Derive the full dashboard from a newest-first trade collection.
pub fn derive_dashboard(trades: &[TradeRecord]) -> Dashboard {
    let trades_with_pl = with_pl(trades);
    let stats = calculate_stats(&trades_with_pl);
    let equity_data = equity_curve(&trades_with_pl);

    Dashboard {
        trades_with_pl,
        stats,
        equity_data,
    }
}

/// Memoizes the last derived dashboard, keyed on the identity of the
/// collection snapshot it was derived from.
#[derive(Default)]
pub struct AnalyticsCache {
    entry: Option<(Arc<[TradeRecord]>, Arc<Dashboard>)>,
}

impl AnalyticsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_derive(&mut self, snapshot: &Arc<[TradeRecord]>) -> Arc<Dashboard> {
        if let Some((cached_for, dashboard)) = &self.entry {
            if Arc::ptr_eq(cached_for, snapshot) {
                return Arc::clone(dashboard);
            }
        }

        log::debug!("Deriving analytics for {} trades", snapshot.len());
        let dashboard = Arc::new(derive_dashboard(snapshot));
        self.entry = Some((Arc::clone(snapshot), Arc::clone(&dashboard)));
        dashboard
    }
}
