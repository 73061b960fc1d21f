//! Display conversions shared by the per-entity view models.

use chrono::{DateTime, NaiveDate, Utc};

/// Epoch seconds to `Y-m-d` (UTC). Out-of-range values render empty.
pub fn epoch_to_ymd(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// `Y-m-d` to epoch seconds at UTC midnight.
pub fn ymd_to_epoch(value: &str) -> Option<i64> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// `amount` discounts show the store currency, `percent` shows `%`.
pub fn discount_symbol(discount_type: &str, currency_symbol: &str) -> String {
    match discount_type {
        "percent" => "%".to_string(),
        _ => currency_symbol.to_string(),
    }
}

/// Lowercase, ASCII-alphanumeric words joined by `-`.
pub fn slugify(value: &str) -> String {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Timestamp column to `Y-m-d H:i:s`.
pub fn datetime(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_round_trips_through_dates() {
        let epoch = ymd_to_epoch("2024-03-15").unwrap();
        assert_eq!(epoch, 1_710_460_800);
        assert_eq!(epoch_to_ymd(epoch), "2024-03-15");
        assert_eq!(epoch_to_ymd(epoch + 3_600), "2024-03-15");
    }

    #[test]
    fn bad_dates_are_none() {
        assert_eq!(ymd_to_epoch("15/03/2024"), None);
        assert_eq!(ymd_to_epoch(""), None);
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Men's Shoes & Boots"), "men-s-shoes-boots");
        assert_eq!(slugify("  Summer 2024 "), "summer-2024");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn discount_symbols() {
        assert_eq!(discount_symbol("amount", "$"), "$");
        assert_eq!(discount_symbol("percent", "$"), "%");
        assert_eq!(discount_symbol("amount", "€"), "€");
    }
}
