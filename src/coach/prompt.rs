use crate::models::{Language, TradeWithPL};

/// Planned reward-to-risk as `1:x.xx`, or `N/A` when stop or target is unset
pub fn risk_reward_ratio(trade: &TradeWithPL) -> String {
    let t = &trade.trade;
    if t.stop_loss > 0.0 && t.take_profit > 0.0 {
        let risk = (t.entry_price - t.stop_loss).abs();
        let reward = (t.take_profit - t.entry_price).abs();
        if risk > 0.0 {
            return format!("1:{:.2}", reward / risk);
        }
    }
    "N/A".to_string()
}

fn or_default<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or(fallback)
}

/// The coaching request for one trade.
pub fn build_prompt(trade: &TradeWithPL, language: Language) -> String {
    let t = &trade.trade;
    let outcome = if trade.pl >= 0.0 { "profit" } else { "loss" };
    let language_instruction = match language {
        Language::Fa => "Respond in Persian (Farsi).",
        Language::En => "Respond in English.",
    };

    format!(
        "You are a professional trading coach providing concise, actionable feedback.
Analyze the following trade and provide constructive insights. Focus on potential psychological biases, risk management (like R:R ratio), and strategy consistency.
Do not give financial advice. Keep the response under 150 words.
{language_instruction}

Trade Details:
- Symbol: {symbol}
- Type: {trade_type}
- Session: {session}
- Strategy: {strategy}
- Planned R:R Ratio: {rr}
- Outcome: A {outcome} of ${amount:.2}
- Trader's Emotions: \"{emotions}\"
- Pre-Trade Analysis: \"{pre}\"
- Post-Trade Analysis: \"{post}\"
- Trader's Notes: \"{notes}\"

Provide your analysis:",
        symbol = t.symbol,
        trade_type = t.trade_type.as_str(),
        session = t.session.as_str(),
        strategy = or_default(&t.strategy, "Not specified"),
        rr = risk_reward_ratio(trade),
        amount = trade.pl.abs(),
        emotions = or_default(&t.emotions, "Not specified"),
        pre = or_default(&t.pre_trade_analysis, "Not provided."),
        post = or_default(&t.post_trade_analysis, "Not provided."),
        notes = or_default(&t.notes, "No notes provided."),
    )
}
