//! Price parsing and rendering
//!
//! Prices are carried as integer cents with `None` as the explicit "unknown"
//! marker. Source pages deliver prices as integers, floats, or free-form
//! text ("$12.34", "1.234,56 €"), so parsing has to be liberal and must
//! degrade to unknown instead of failing.

/// Result of parsing a free-form price string.
///
/// `currency` is only set when the text itself carried a recognizable
/// currency symbol; the caller decides precedence against explicit
/// currency fields from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPrice {
    pub cents: i64,
    pub currency: Option<&'static str>,
}

/// Currency code for a known symbol.
pub fn currency_for_symbol(symbol: char) -> Option<&'static str> {
    match symbol {
        '$' => Some("USD"),
        '€' => Some("EUR"),
        '£' => Some("GBP"),
        _ => None,
    }
}

fn symbol_for_currency(code: &str) -> Option<char> {
    match code {
        "USD" => Some('$'),
        "EUR" => Some('€'),
        "GBP" => Some('£'),
        _ => None,
    }
}

/// Convert a major-unit amount (dollars, euros, ...) to cents.
pub fn major_units_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Parse a free-form price string into cents.
///
/// Strips currency symbols and grouping separators. The last `.` or `,`
/// counts as the decimal point when one or two digits follow it ("$4.5"
/// and "$4.50" both mean 450 cents); every other separator is treated as
/// a thousands separator. Anything that does not yield a non-negative
/// amount parses as `None` (unknown), never as an error.
pub fn parse_price_text(raw: &str) -> Option<ParsedPrice> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let currency = trimmed.chars().find_map(currency_for_symbol);

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let decimal_pos = cleaned
        .rfind(['.', ','])
        .filter(|pos| (1..=2).contains(&(cleaned.len() - pos - 1)));

    let normalized: String = match decimal_pos {
        Some(pos) => cleaned
            .char_indices()
            .filter_map(|(i, c)| match c {
                '.' | ',' if i == pos => Some('.'),
                '.' | ',' => None,
                other => Some(other),
            })
            .collect(),
        None => cleaned
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '-')
            .collect(),
    };

    let amount: f64 = normalized.parse().ok()?;
    let cents = major_units_to_cents(amount);
    if cents < 0 {
        return None;
    }

    Some(ParsedPrice { cents, currency })
}

/// Human-readable rendering of a price, `"unknown"` for the unknown marker.
pub fn format_cents(cents: Option<i64>, currency: &str) -> String {
    let Some(cents) = cents else {
        return "unknown".to_string();
    };
    let units = cents / 100;
    let rem = cents % 100;
    match symbol_for_currency(currency) {
        Some(symbol) => format!("{}{}.{:02}", symbol, units, rem),
        None => format!("{}.{:02} {}", units, rem, currency),
    }
}
