//! Calendar codes used by the time filters.
//!
//! Months `january`..`june` map to 1..6 and weekdays `monday`..`sunday` map
//! to 0..6. Both tables reserve code 7 for `all`, meaning "no filter".

/// Code meaning "do not filter on this unit".
pub const ALL: u8 = 7;

static MONTHS: &[(&str, u8)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("all", ALL),
];

static DAYS: &[(&str, u8)] = &[
    ("monday", 0),
    ("tuesday", 1),
    ("wednesday", 2),
    ("thursday", 3),
    ("friday", 4),
    ("saturday", 5),
    ("sunday", 6),
    ("all", ALL),
];

fn to_code(table: &[(&str, u8)], name: &str) -> Option<u8> {
    let name = name.trim().to_ascii_lowercase();
    table.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

fn to_name(table: &[(&'static str, u8)], code: u8) -> Option<&'static str> {
    table.iter().find(|(_, c)| *c == code).map(|(n, _)| *n)
}

/// Returns the code for a month name, or `None` if it is not one of the
/// supported months (or `all`). Matching ignores case and surrounding spaces.
pub fn month_to_code(name: &str) -> Option<u8> {
    to_code(MONTHS, name)
}

/// Returns the month name for a code in 1..=7.
pub fn code_to_month(code: u8) -> Option<&'static str> {
    to_name(MONTHS, code)
}

/// Returns the code for a weekday name (monday = 0), or `None` if unknown.
pub fn day_to_code(name: &str) -> Option<u8> {
    to_code(DAYS, name)
}

/// Returns the weekday name for a code in 0..=7.
pub fn code_to_day(code: u8) -> Option<&'static str> {
    to_name(DAYS, code)
}

/// Month names accepted by [`month_to_code`], `all` last.
pub fn month_names() -> impl Iterator<Item = &'static str> {
    MONTHS.iter().map(|(n, _)| *n)
}

/// Weekday names accepted by [`day_to_code`], `all` last.
pub fn day_names() -> impl Iterator<Item = &'static str> {
    DAYS.iter().map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_round_trip() {
        for code in 1..=7 {
            let name = code_to_month(code).unwrap();
            assert_eq!(month_to_code(name), Some(code));
        }
    }

    #[test]
    fn test_day_round_trip() {
        for code in 0..=7 {
            let name = code_to_day(code).unwrap();
            assert_eq!(day_to_code(name), Some(code));
        }
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(month_to_code("january"), Some(1));
        assert_eq!(month_to_code("june"), Some(6));
        assert_eq!(month_to_code("all"), Some(ALL));
        assert_eq!(day_to_code("monday"), Some(0));
        assert_eq!(day_to_code("sunday"), Some(6));
        assert_eq!(code_to_day(4), Some("friday"));
    }

    #[test]
    fn test_unsupported_names_are_not_found() {
        assert_eq!(month_to_code("july"), None);
        assert_eq!(month_to_code("december"), None);
        assert_eq!(month_to_code(""), None);
        assert_eq!(day_to_code("funday"), None);
    }

    #[test]
    fn test_out_of_range_codes_are_not_found() {
        assert_eq!(code_to_month(0), None);
        assert_eq!(code_to_month(8), None);
        assert_eq!(code_to_day(8), None);
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        assert_eq!(month_to_code("  March "), Some(3));
        assert_eq!(day_to_code("WEDNESDAY"), Some(2));
    }

    #[test]
    fn test_name_lists_end_with_all() {
        assert_eq!(month_names().count(), 7);
        assert_eq!(month_names().last(), Some("all"));
        assert_eq!(day_names().count(), 8);
        assert_eq!(day_names().last(), Some("all"));
        assert_eq!(
            month_names().collect::<Vec<_>>().join(", "),
            "january, february, march, april, may, june, all"
        );
        assert!(day_names().all(|d| day_to_code(d).is_some()));
    }
}
