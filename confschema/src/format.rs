//! Named string-format predicates.
//!
//! Formats are advisory: a schema may tag a string with `"format": "email"`
//! and validation reports a mismatch, but an unknown format name always
//! passes so schemas written for richer dialects keep working. Every
//! predicate is total; malformed input returns `false`, never panics.
//!
//! Known formats: `email`, `uri`, `uri-reference`, `date`, `time`,
//! `date-time`, `hostname`, `ipv4`, `ipv6`, `uuid`, `color`, `regex`.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("invalid email pattern")
});

static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:\S*$").expect("invalid uri pattern")
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("invalid date pattern")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d:[0-5]\d$").expect("invalid time pattern")
});

static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})[Tt](?:[01]\d|2[0-3]):[0-5]\d:[0-5]\d(?:\.\d+)?(?:[Zz]|[+-](?:[01]\d|2[0-3]):[0-5]\d)?$",
    )
    .expect("invalid date-time pattern")
});

static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("invalid hostname pattern")
});

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("invalid uuid pattern")
});

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("invalid color pattern")
});

/// Check a string against a named format.
///
/// Unknown format names are treated as always valid.
pub fn check_format(name: &str, value: &str) -> bool {
    match name {
        "email" => EMAIL_RE.is_match(value),
        "uri" => URI_RE.is_match(value),
        "uri-reference" => is_uri_reference(value),
        "date" => is_date(value),
        "time" => TIME_RE.is_match(value),
        "date-time" => is_date_time(value),
        "hostname" => is_hostname(value),
        "ipv4" => value.parse::<Ipv4Addr>().is_ok(),
        "ipv6" => value.parse::<Ipv6Addr>().is_ok(),
        "uuid" => UUID_RE.is_match(value),
        "color" => COLOR_RE.is_match(value),
        "regex" => Regex::new(value).is_ok(),
        _ => true,
    }
}

/// Absolute URIs and relative references both pass; whitespace never does.
fn is_uri_reference(value: &str) -> bool {
    !value.chars().any(char::is_whitespace)
}

fn is_date(value: &str) -> bool {
    match DATE_RE.captures(value) {
        Some(captures) => valid_calendar_date(&captures[1], &captures[2], &captures[3]),
        None => false,
    }
}

fn is_date_time(value: &str) -> bool {
    match DATE_TIME_RE.captures(value) {
        Some(captures) => valid_calendar_date(&captures[1], &captures[2], &captures[3]),
        None => false,
    }
}

fn is_hostname(value: &str) -> bool {
    !value.is_empty() && value.len() <= 253 && HOSTNAME_RE.is_match(value)
}

/// The regex above guarantees digit groups; this checks month and day
/// ranges against the real calendar, leap years included.
fn valid_calendar_date(year: &str, month: &str, day: &str) -> bool {
    let (Ok(year), Ok(month), Ok(day)) = (
        year.parse::<i32>(),
        month.parse::<u32>(),
        day.parse::<u32>(),
    ) else {
        return false;
    };
    (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                29
            } else {
                28
            }
        }
    }
}
