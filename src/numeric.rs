// Copyright 2026 Shoplens Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lenient parsers for the display strings carried by catalog items.
//!
//! Every parser returns `None` instead of an error: callers treat an
//! unparsable value as "does not satisfy the predicate".

use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Parses a currency-formatted price such as `₹1,299`, `$12.50` or `Rs. 80`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut start = trimmed.find(|c: char| c.is_ascii_digit())?;
    // "₹.50" keeps its decimal point; the dot in "Rs.80" belongs to the symbol.
    let mut prefix = trimmed[..start].chars().rev();
    if prefix.next() == Some('.') && !prefix.next().is_some_and(char::is_alphabetic) {
        start -= 1;
    }
    let (symbol, amount) = trimmed.split_at(start);
    if symbol.contains('-') {
        return None;
    }
    let cleaned: String = amount
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();
    parse_non_negative(&cleaned)
}

/// Parses a distance such as `1.2 km`, `800 m` or `2km` into kilometres.
/// A bare number is taken as kilometres.
pub fn parse_distance(raw: &str) -> Option<f64> {
    let lower = raw.trim().to_lowercase();
    let split = lower
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(lower.len());
    let (number, unit) = lower.split_at(split);
    let value = parse_non_negative(number)?;
    match unit.trim() {
        "" | "km" | "kms" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => Some(value),
        "m" | "meter" | "meters" | "metre" | "metres" => Some(value / 1000.0),
        "mi" | "mile" | "miles" => Some(value * 1.609_344),
        _ => None,
    }
}

/// Parses a relative time such as `2h ago`, `3 days ago` or `just now`
/// into the age it describes.
pub fn parse_age(raw: &str) -> Option<Duration> {
    let lower = raw.trim().to_lowercase();
    match lower.as_str() {
        "now" | "just now" => return Some(Duration::ZERO),
        "yesterday" => return Some(Duration::from_secs(DAY)),
        _ => {}
    }
    let body = lower.strip_suffix("ago").unwrap_or(&lower).trim();
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (number, unit) = body.split_at(split);
    let count: u64 = number.parse().ok()?;
    let unit_secs = match unit.trim() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
        "d" | "day" | "days" => DAY,
        "w" | "wk" | "wks" | "week" | "weeks" => 7 * DAY,
        "mo" | "month" | "months" => 30 * DAY,
        "y" | "yr" | "yrs" | "year" | "years" => 365 * DAY,
        _ => return None,
    };
    count.checked_mul(unit_secs).map(Duration::from_secs)
}

fn parse_non_negative(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let value: f64 = text.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_strips_symbol_and_separators() {
        assert_eq!(parse_price("₹120"), Some(120.0));
        assert_eq!(parse_price("₹1,299"), Some(1299.0));
        assert_eq!(parse_price("$12.50"), Some(12.5));
        assert_eq!(parse_price("Rs. 80"), Some(80.0));
        assert_eq!(parse_price(" 45 "), Some(45.0));
    }

    #[test]
    fn price_keeps_leading_decimal_point() {
        assert_eq!(parse_price("₹.50"), Some(0.5));
        assert_eq!(parse_price(".75"), Some(0.75));
        assert_eq!(parse_price("Rs.80"), Some(80.0));
    }

    #[test]
    fn price_rejects_garbage() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("Free"), None);
        assert_eq!(parse_price("₹12abc"), None);
        assert_eq!(parse_price("-₹5"), None);
        assert_eq!(parse_price("₹1.2.3"), None);
    }

    #[test]
    fn distance_normalizes_to_km() {
        assert_eq!(parse_distance("1.2 km"), Some(1.2));
        assert_eq!(parse_distance("2km"), Some(2.0));
        assert_eq!(parse_distance("800 m"), Some(0.8));
        assert_eq!(parse_distance("3"), Some(3.0));
        assert_eq!(parse_distance("near"), None);
        assert_eq!(parse_distance("5 parsecs"), None);
    }

    #[test]
    fn age_understands_common_shapes() {
        assert_eq!(parse_age("just now"), Some(Duration::ZERO));
        assert_eq!(parse_age("5m ago"), Some(Duration::from_secs(300)));
        assert_eq!(parse_age("2h ago"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_age("3 days ago"), Some(Duration::from_secs(3 * DAY)));
        assert_eq!(parse_age("1w ago"), Some(Duration::from_secs(7 * DAY)));
        assert_eq!(parse_age("yesterday"), Some(Duration::from_secs(DAY)));
        assert_eq!(parse_age("sometime"), None);
        assert_eq!(parse_age("ago"), None);
    }
}
