//! Formatting helpers for CLI output.

use chrono::NaiveDateTime;

/// Format a price in Indonesian Rupiah with dot thousand separators,
/// e.g. `Rp 1.234.567`.
pub fn format_price(price: i64) -> String {
  let digits = price.unsigned_abs().to_string();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push('.');
    }
    grouped.push(c);
  }

  if price < 0 {
    format!("-Rp {}", grouped)
  } else {
    format!("Rp {}", grouped)
  }
}

/// Format a backend timestamp as `DD/MM/YYYY HH:mm`. Unparsable input is
/// returned unchanged.
pub fn format_date(raw: &str) -> String {
  let parsed = chrono::DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.naive_local())
    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"));

  match parsed {
    Ok(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
    Err(_) => raw.to_string(),
  }
}
