//! String normalization for county assessor data.
//!
//! Every helper here is comparison-oriented: normalized addresses are never
//! used for mailing, and parse failures produce defaults instead of errors so
//! a single mangled cell never sinks a record.

use chrono::{Datelike, NaiveDate};

const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y", // 01/15/2020
    "%Y-%m-%d", // 2020-01-15
    "%m-%d-%Y", // 01-15-2020
    "%B %d, %Y", // January 15, 2020
    "%b %d, %Y", // Jan 15, 2020
    "%Y/%m/%d", // 2020/01/15
    "%d-%b-%Y", // 15-Jan-2020
    "%m/%d/%y", // 01/15/20
];

const BLANK_SENTINELS: &[&str] = &["", "N/A", "None", "null", "-"];

fn street_type(token: &str) -> Option<&'static str> {
    Some(match token {
        "AVENUE" | "AVE" | "AV" => "AVE",
        "BOULEVARD" | "BLVD" => "BLVD",
        "CIRCLE" | "CIR" => "CIR",
        "COURT" | "CT" => "CT",
        "DRIVE" | "DR" | "DRV" => "DR",
        "HIGHWAY" | "HWY" => "HWY",
        "LANE" | "LN" => "LN",
        "PARKWAY" | "PKWY" | "PKY" => "PKWY",
        "PLACE" | "PL" => "PL",
        "ROAD" | "RD" => "RD",
        "SQUARE" | "SQ" => "SQ",
        "STREET" | "ST" | "STR" => "ST",
        "TERRACE" | "TER" | "TERR" => "TER",
        "TRAIL" | "TRL" => "TRL",
        "WAY" => "WAY",
        _ => return None,
    })
}

fn directional(token: &str) -> Option<&'static str> {
    Some(match token {
        "NORTH" | "N" => "N",
        "SOUTH" | "S" => "S",
        "EAST" | "E" => "E",
        "WEST" | "W" => "W",
        "NORTHEAST" | "NE" => "NE",
        "NORTHWEST" | "NW" => "NW",
        "SOUTHEAST" | "SE" => "SE",
        "SOUTHWEST" | "SW" => "SW",
        _ => return None,
    })
}

fn is_unit_designator(token: &str) -> bool {
    matches!(token, "APT" | "APARTMENT" | "UNIT" | "SUITE" | "STE" | "#" | "LOT")
}

/// Canonicalize an address for equality and similarity comparison.
///
/// Uppercases, strips punctuation, collapses street-type and directional
/// tokens to postal abbreviations, and drops unit designators together with
/// the token that follows them ("APT 2B", "# 5", "LOT 12").
pub fn normalize_address(address: &str) -> String {
    if address.trim().is_empty() {
        return String::new();
    }

    let upper = address.to_uppercase();
    // '#' marks a unit even when glued to its number, so it gets padded into
    // its own token before '.' and ',' are dropped.
    let padded = upper.replace('#', " # ").replace(['.', ','], " ");

    let mut normalized = Vec::new();
    let mut skip_next = false;

    for token in padded.split_whitespace() {
        if skip_next {
            skip_next = false;
            continue;
        }

        if let Some(dir) = directional(token) {
            normalized.push(dir.to_string());
        } else if let Some(kind) = street_type(token) {
            normalized.push(kind.to_string());
        } else if is_unit_designator(token) {
            skip_next = true;
        } else {
            normalized.push(token.to_string());
        }
    }

    normalized.join(" ")
}

/// Parse county purchase/transfer dates, trying each known format in order.
///
/// Returns `None` for blanks, sentinel strings, and unrecognized formats; the
/// record builder treats that as an unknown purchase date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if BLANK_SENTINELS.contains(&trimmed) {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            // chrono's %Y accepts a bare two-digit year, which would swallow
            // MM/DD/YY input as year 20; leave those for the %y pattern.
            if date.year() < 1000 && *format != "%m/%d/%y" {
                continue;
            }
            return Some(date);
        }
    }

    tracing::warn!(value = trimmed, "could not parse date");
    None
}

/// Parse a currency cell like "$250,000.00" into a float.
///
/// Unparseable input becomes 0.0 rather than `None`. That conflates "no
/// value" with "zero value" and flows straight into the equity math; the
/// behavior is intentional and pinned by tests.
pub fn parse_currency(raw: &str) -> f64 {
    if raw.trim().is_empty() {
        return 0.0;
    }

    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Parse a general numeric cell, treating sentinel blanks as absent.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if BLANK_SENTINELS.contains(&trimmed) {
        return None;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    cleaned.parse::<f64>().ok()
}

/// Integer variant of [`parse_number`], truncating any fractional part.
pub fn parse_int(raw: &str) -> Option<i64> {
    parse_number(raw).map(|value| value as i64)
}

/// Heuristic owner-occupancy check comparing the property address with the
/// owner's mailing address.
///
/// Exact match after normalization wins, then an exact match on the street
/// line (before the first comma), then a fuzzy match so "100 Park Rd" still
/// pairs with "100 PARK ROAD STE 4".
pub fn is_owner_occupied(property_address: &str, mailing_address: &str, threshold: f64) -> bool {
    if property_address.trim().is_empty() || mailing_address.trim().is_empty() {
        return false;
    }

    let norm_property = normalize_address(property_address);
    let norm_mailing = normalize_address(mailing_address);

    if norm_property == norm_mailing {
        return true;
    }

    // Mailing addresses often carry a city/state tail the assessor's
    // property address lacks, so the street lines get compared alone.
    let property_street = normalize_address(street_line(property_address));
    let mailing_street = normalize_address(street_line(mailing_address));

    if property_street == mailing_street {
        return true;
    }

    strsim::normalized_levenshtein(&property_street, &mailing_street) >= threshold
}

fn street_line(address: &str) -> &str {
    address.split(',').next().unwrap_or(address).trim()
}

/// Years elapsed since the purchase date, floored at zero and rounded to two
/// decimals. Unknown purchase dates count as zero years owned.
pub fn years_owned(purchase_date: Option<NaiveDate>, today: NaiveDate) -> f64 {
    let Some(purchased) = purchase_date else {
        return 0.0;
    };

    let days = (today - purchased).num_days() as f64;
    round2((days / 365.25).max(0.0))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
