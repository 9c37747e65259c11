//! Revenue normalization for the free-text amount column.

/// Normalizes a currency-like amount into a non-negative revenue value.
///
/// Every character that is not an ASCII digit or a dot is stripped before
/// parsing, so `"$1,234.56 USD"` normalizes to `1234.56`. Absent, empty,
/// and unparseable amounts all normalize to `0.0`; a bad amount never
/// fails the row.
pub fn normalize_revenue(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    cleaned.parse::<f64>().unwrap_or(0.0)
}
