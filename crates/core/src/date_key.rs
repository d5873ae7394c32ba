//! Date keys identify the calendar day of a slot.
//!
//! Slots are stored under year-first keys (`2024-05-01`), but some writers
//! produced day-first keys (`01-05-2024`). Lookups therefore try the key as
//! given and then its swapped notation. This is a workaround for inconsistent
//! upstream formatting and only covers these two notations.

use chrono::NaiveDate;

pub const YEAR_FIRST: &str = "%Y-%m-%d";
pub const DAY_FIRST: &str = "%d-%m-%Y";

/// The same day in the other notation, or `None` when the key is in neither.
pub fn alternate(date_key: &str) -> Option<String> {
    let date_key = date_key.trim();
    if let Ok(date) = NaiveDate::parse_from_str(date_key, YEAR_FIRST) {
        return Some(date.format(DAY_FIRST).to_string());
    }
    if let Ok(date) = NaiveDate::parse_from_str(date_key, DAY_FIRST) {
        return Some(date.format(YEAR_FIRST).to_string());
    }
    None
}

/// Keys to try, in order of authority: the key as given, then its alternate.
pub fn candidates(date_key: &str) -> Vec<String> {
    let canonical = date_key.trim().to_string();
    let mut keys = vec![canonical.clone()];
    if let Some(alt) = alternate(&canonical) {
        if alt != canonical {
            keys.push(alt);
        }
    }
    keys
}

/// Slot times are written as `HH:mm`; older records used `HH.mm`.
pub fn normalize_time(time: &str) -> String {
    time.trim().replace('.', ":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_year_first_and_day_first() {
        assert_eq!(alternate("2024-05-01").as_deref(), Some("01-05-2024"));
        assert_eq!(alternate("01-05-2024").as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn unknown_notation_has_no_alternate() {
        assert_eq!(alternate("May 1st"), None);
        assert_eq!(candidates("May 1st"), vec!["May 1st".to_string()]);
    }

    #[test]
    fn candidates_put_given_key_first() {
        assert_eq!(
            candidates(" 2024-05-01 "),
            vec!["2024-05-01".to_string(), "01-05-2024".to_string()]
        );
    }

    #[test]
    fn normalizes_dotted_times() {
        assert_eq!(normalize_time(" 09.30 "), "09:30");
        assert_eq!(normalize_time("14:00"), "14:00");
    }
}
