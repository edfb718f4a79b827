use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Type;

use super::TradeRepository;
use crate::db::Database;
use crate::error::Result;
use crate::models::{TradeRecord, TradeType, TradingSession};

const SELECT_TRADES: &str = "SELECT id, symbol, trade_date, trade_time, trade_type, session,
        entry_price, exit_price, stop_loss, take_profit, size,
        emotions, strategy, notes, pre_trade_analysis, post_trade_analysis, image_url
    FROM trades ORDER BY seq DESC";

pub struct SqliteTradeRepository {
    db: Arc<Database>,
}

impl SqliteTradeRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn conversion_error<E>(index: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

/// Helper function to map a database row to a TradeRecord
fn map_row_to_trade(row: &rusqlite::Row) -> rusqlite::Result<TradeRecord> {
    let date: String = row.get(2)?;
    let time: String = row.get(3)?;
    let trade_type: String = row.get(4)?;
    let session: String = row.get(5)?;

    Ok(TradeRecord {
        id: row.get(0)?,
        symbol: row.get(1)?,
        date: date
            .parse::<NaiveDate>()
            .map_err(|e| conversion_error(2, e))?,
        time: NaiveTime::parse_from_str(&time, "%H:%M").map_err(|e| conversion_error(3, e))?,
        trade_type: trade_type
            .parse::<TradeType>()
            .map_err(|e| conversion_error(4, e))?,
        session: session
            .parse::<TradingSession>()
            .map_err(|e| conversion_error(5, e))?,
        entry_price: row.get(6)?,
        exit_price: row.get(7)?,
        stop_loss: row.get(8)?,
        take_profit: row.get(9)?,
        size: row.get(10)?,
        emotions: row.get(11)?,
        strategy: row.get(12)?,
        notes: row.get(13)?,
        pre_trade_analysis: row.get(14)?,
        post_trade_analysis: row.get(15)?,
        image_url: row.get(16)?,
    })
}

impl TradeRepository for SqliteTradeRepository {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    fn load(&self) -> Result<Vec<TradeRecord>> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(SELECT_TRADES)?;
        let trades = stmt
            .query_map([], map_row_to_trade)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(trades)
    }

    fn save(&self, trades: &[TradeRecord]) -> Result<()> {
        let conn = self.db.lock()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM trades", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO trades (
                    id, seq, symbol, trade_date, trade_time, trade_type, session,
                    entry_price, exit_price, stop_loss, take_profit, size,
                    emotions, strategy, notes, pre_trade_analysis, post_trade_analysis, image_url
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;

            // Slice is newest-first; the oldest trade gets seq 1
            let count = trades.len() as i64;
            for (index, trade) in trades.iter().enumerate() {
                stmt.execute(rusqlite::params![
                    trade.id,
                    count - index as i64,
                    trade.symbol,
                    trade.date.format("%Y-%m-%d").to_string(),
                    trade.time.format("%H:%M").to_string(),
                    trade.trade_type.as_str(),
                    trade.session.as_str(),
                    trade.entry_price,
                    trade.exit_price,
                    trade.stop_loss,
                    trade.take_profit,
                    trade.size,
                    trade.emotions,
                    trade.strategy,
                    trade.notes,
                    trade.pre_trade_analysis,
                    trade.post_trade_analysis,
                    trade.image_url,
                ])?;
            }
        }

        tx.commit()?;
        log::debug!("Saved {} trades to sqlite", trades.len());
        Ok(())
    }
}
