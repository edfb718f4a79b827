//! Display formatting for amounts and dates.
//!
//! Analytics never round; rounding to cents happens here, at the edge.

use chrono::NaiveDate;

use crate::models::Language;

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

fn to_persian_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => PERSIAN_DIGITS[d as usize],
            None => c,
        })
        .collect()
}

/// Amount with two decimals, grouping and currency symbol, e.g. `-$1,234.50`.
pub fn format_currency(value: f64, currency: &str, language: Language) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    // "-0.00" reads as a loss that isn't one
    let negative = value < 0.0 && fixed != "0.00";

    let (group_sep, decimal_sep) = match language {
        Language::En => (',', '.'),
        Language::Fa => ('٬', '٫'),
    };
    let mut amount = format!("{}{}{}", group_thousands(whole, group_sep), decimal_sep, cents);
    if language == Language::Fa {
        amount = to_persian_digits(&amount);
    }

    let sign = if negative { "-" } else { "" };
    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, amount),
        None => format!("{}{} {}", sign, currency, amount),
    }
}

/// Calendar date for trade lists, e.g. `Mar 1, 2024`.
///
/// Persian output keeps the Gregorian calendar and renders `yyyy/mm/dd`
/// in Persian digits.
pub fn format_date(date: NaiveDate, language: Language) -> String {
    match language {
        Language::En => date.format("%b %-d, %Y").to_string(),
        Language::Fa => to_persian_digits(&date.format("%Y/%m/%d").to_string()),
    }
}
