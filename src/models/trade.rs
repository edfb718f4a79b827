use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};

/// Trade direction. Determines the sign convention of the P/L formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    Long,
    Short,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Long => "Long",
            TradeType::Short => "Short",
        }
    }
}

impl FromStr for TradeType {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Long" => Ok(TradeType::Long),
            "Short" => Ok(TradeType::Short),
            other => Err(JournalError::Validation(format!("unknown trade type '{}'", other))),
        }
    }
}

/// Market session the trade was taken in. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradingSession {
    London,
    #[serde(rename = "New York")]
    NewYork,
    Tokyo,
    Sydney,
}

impl TradingSession {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingSession::London => "London",
            TradingSession::NewYork => "New York",
            TradingSession::Tokyo => "Tokyo",
            TradingSession::Sydney => "Sydney",
        }
    }
}

impl FromStr for TradingSession {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "London" => Ok(TradingSession::London),
            "New York" => Ok(TradingSession::NewYork),
            "Tokyo" => Ok(TradingSession::Tokyo),
            "Sydney" => Ok(TradingSession::Sydney),
            other => Err(JournalError::Validation(format!("unknown session '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub id: String,
    pub symbol: String,
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub time: NaiveTime,
    pub trade_type: TradeType,
    pub session: TradingSession,

    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub size: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_trade_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_trade_analysis: Option<String>,
    /// Embedded image payload or external URL, stored as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Input for logging a new trade (a record without its identity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub symbol: String,
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub time: NaiveTime,
    pub trade_type: TradeType,
    pub session: TradingSession,

    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub size: f64,

    #[serde(default)]
    pub emotions: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub pre_trade_analysis: Option<String>,
    #[serde(default)]
    pub post_trade_analysis: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewTrade {
    /// Reject records that would poison the derived statistics
    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.symbol,
            &[
                ("entryPrice", self.entry_price),
                ("exitPrice", self.exit_price),
                ("stopLoss", self.stop_loss),
                ("takeProfit", self.take_profit),
                ("size", self.size),
            ],
            self.size,
        )
    }

    /// Attach an identity. Empty optional text is normalized to `None` and
    /// the time is cut to the minute, the precision storage keeps.
    pub fn into_record(self, id: String) -> TradeRecord {
        TradeRecord {
            id,
            symbol: self.symbol.trim().to_string(),
            date: self.date,
            time: to_minute(self.time),
            trade_type: self.trade_type,
            session: self.session,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            size: self.size,
            emotions: non_empty(self.emotions),
            strategy: non_empty(self.strategy),
            notes: non_empty(self.notes),
            pre_trade_analysis: non_empty(self.pre_trade_analysis),
            post_trade_analysis: non_empty(self.post_trade_analysis),
            image_url: non_empty(self.image_url),
        }
    }
}

impl TradeRecord {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(JournalError::validation("id must not be empty"));
        }
        validate_fields(
            &self.symbol,
            &[
                ("entryPrice", self.entry_price),
                ("exitPrice", self.exit_price),
                ("stopLoss", self.stop_loss),
                ("takeProfit", self.take_profit),
                ("size", self.size),
            ],
            self.size,
        )
    }
}

fn validate_fields(symbol: &str, numbers: &[(&str, f64)], size: f64) -> Result<()> {
    if symbol.trim().is_empty() {
        return Err(JournalError::validation("symbol is required"));
    }
    for (name, value) in numbers {
        if !value.is_finite() {
            return Err(JournalError::Validation(format!(
                "{} must be a finite number, got {}",
                name, value
            )));
        }
    }
    if size <= 0.0 {
        return Err(JournalError::Validation(format!(
            "size must be greater than zero, got {}",
            size
        )));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Wall-clock time as `HH:MM`. `HH:MM:SS` is accepted on input and its
/// seconds are dropped.
mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S").map(super::to_minute))
            .map_err(|e| serde::de::Error::custom(format!("invalid time '{}': {}", raw, e)))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_deserialize_browser_storage_format() {
        let json = r#"{
            "id": "2024-03-01T09:30:00.000Z",
            "symbol": "XAUUSD",
            "date": "2024-03-01",
            "time": "09:30",
            "tradeType": "Short",
            "session": "New York",
            "entryPrice": 2050.5,
            "exitPrice": 2040.0,
            "stopLoss": 2060,
            "takeProfit": 2030,
            "size": 2,
            "notes": "faded the open"
        }"#;

        let trade: TradeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(trade.trade_type, TradeType::Short);
        assert_eq!(trade.session, TradingSession::NewYork);
        assert_eq!(trade.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(trade.notes.as_deref(), Some("faded the open"));
        assert!(trade.image_url.is_none());
        assert!(trade.validate().is_ok());
    }

    #[test]
    fn test_serialize_uses_camel_case_and_display_names() {
        let mut trade = record("t1", TradeType::Long, 1.0, 2.0, 1.0);
        trade.session = TradingSession::NewYork;
        let value = serde_json::to_value(&trade).unwrap();

        assert_eq!(value["tradeType"], "Long");
        assert_eq!(value["session"], "New York");
        assert_eq!(value["entryPrice"], 1.0);
        assert_eq!(value["time"], "09:30");
        assert!(value.get("emotions").is_none());
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        let json = r#"{"symbol":"X","date":"2024-01-01","time":"10:00","tradeType":"Sideways",
            "session":"Tokyo","entryPrice":1,"exitPrice":2,"stopLoss":0,"takeProfit":0,"size":1}"#;
        assert!(serde_json::from_str::<NewTrade>(json).is_err());
    }

    #[test]
    fn test_enum_tags_parse_from_display_names() {
        assert_eq!("Short".parse::<TradeType>().unwrap(), TradeType::Short);
        assert_eq!("New York".parse::<TradingSession>().unwrap(), TradingSession::NewYork);
        assert!("long".parse::<TradeType>().is_err());
        assert!("NewYork".parse::<TradingSession>().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_prices() {
        let trade = new_trade(TradeType::Long, f64::NAN, 110.0, 1.0);
        let err = trade.validate().unwrap_err();
        assert!(matches!(err, JournalError::Validation(ref m) if m.contains("entryPrice")));

        let trade = new_trade(TradeType::Long, 100.0, f64::INFINITY, 1.0);
        assert!(trade.validate().is_err());
    }

    #[test]
    fn test_validate_requires_positive_size() {
        assert!(new_trade(TradeType::Long, 100.0, 110.0, 0.0).validate().is_err());
        assert!(new_trade(TradeType::Short, 100.0, 110.0, -2.0).validate().is_err());
        assert!(new_trade(TradeType::Short, 100.0, 110.0, 0.01).validate().is_ok());
    }

    #[test]
    fn test_validate_requires_symbol() {
        let mut trade = new_trade(TradeType::Long, 100.0, 110.0, 1.0);
        trade.symbol = "   ".to_string();
        assert!(trade.validate().is_err());
    }

    #[test]
    fn test_into_record_drops_blank_text() {
        let mut trade = new_trade(TradeType::Long, 100.0, 110.0, 1.0);
        trade.symbol = " BTCUSD ".to_string();
        trade.emotions = Some("".to_string());
        trade.strategy = Some("breakout".to_string());

        let record = trade.into_record("id-1".to_string());
        assert_eq!(record.symbol, "BTCUSD");
        assert!(record.emotions.is_none());
        assert_eq!(record.strategy.as_deref(), Some("breakout"));
    }

    #[test]
    fn test_seconds_are_dropped_on_ingestion() {
        let mut trade = new_trade(TradeType::Long, 100.0, 110.0, 1.0);
        trade.time = NaiveTime::from_hms_milli_opt(14, 5, 42, 250).unwrap();

        let record = trade.into_record("id-1".to_string());
        assert_eq!(record.time, NaiveTime::from_hms_opt(14, 5, 0).unwrap());

        let reloaded: TradeRecord = serde_json::from_value(serde_json::to_value(&record).unwrap()).unwrap();
        assert_eq!(reloaded, record);

        let json = r#"{"id":"x","symbol":"X","date":"2024-01-01","time":"10:15:30","tradeType":"Long",
            "session":"Tokyo","entryPrice":1,"exitPrice":2,"stopLoss":0,"takeProfit":0,"size":1}"#;
        let parsed: TradeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(10, 15, 0).unwrap());
    }
}
