//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Strip everything from raw amount text that cannot be part of a decimal.
///
/// A `-` survives only in leading position and only the first `.` is kept.
pub fn sanitize_amount(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut seen_dot = false;
    for (idx, c) in raw.trim().chars().enumerate() {
        match c {
            '-' if idx == 0 => result.push(c),
            '.' if !seen_dot => {
                seen_dot = true;
                result.push(c);
            }
            '0'..='9' => result.push(c),
            _ => {}
        }
    }
    result
}

/// Parse raw amount text, coercing anything unparseable to zero
pub fn parse_amount(raw: &str) -> Decimal {
    let clean = sanitize_amount(raw);
    let clean = clean.trim_end_matches('.');
    Decimal::from_str(clean).unwrap_or(Decimal::ZERO)
}

/// Sum amounts, saturating at the representable range instead of overflowing
pub fn sum_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Format an amount with a fixed number of decimal places
pub fn format_amount(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded)
}

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push(',');
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let int_grouped: String = grouped.chars().rev().collect();
    format!("{}{}{}", sign, int_grouped, frac_part)
}

/// Append query parameters to a URL, skipping empty values
pub fn urlqs(base: &str, params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();

    if query.is_empty() {
        base.to_string()
    } else if base.contains('?') {
        format!("{}&{}", base, query.join("&"))
    } else {
        format!("{}?{}", base, query.join("&"))
    }
}

/// Generate a unique ID
pub fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{:x}-{}", now, COUNTER.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_leading_minus() {
        assert_eq!(sanitize_amount("-12.5abc"), "-12.5");
        assert_eq!(sanitize_amount("1-2"), "12");
        assert_eq!(sanitize_amount("1.2.3"), "1.23");
        assert_eq!(sanitize_amount("abc"), "");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-12.5abc"), Decimal::new(-125, 1));
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("-"), Decimal::ZERO);
        assert_eq!(parse_amount("7."), Decimal::new(7, 0));
        assert_eq!(parse_amount(" 30 "), Decimal::new(30, 0));
    }

    #[test]
    fn test_sum_amounts_saturates() {
        let max = parse_amount("79228162514264337593543950335");
        assert_eq!(max, Decimal::MAX);
        assert_eq!(sum_amounts([max, max]), Decimal::MAX);
        assert_eq!(sum_amounts([max, -max, Decimal::ONE]), Decimal::ONE);
        assert_eq!(sum_amounts(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(120, 0), 2), "120.00");
        assert_eq!(format_amount(Decimal::new(-25, 0), 2), "-25.00");
        assert_eq!(format_amount(Decimal::new(12345, 3), 2), "12.35");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number("-1234.50"), "-1,234.50");
        assert_eq!(format_number(12), "12");
    }

    #[test]
    fn test_urlqs() {
        assert_eq!(
            urlqs("/transaction/edit", &[("tid", ""), ("dest", "a b"), ("split", "1")]),
            "/transaction/edit?dest=a%20b&split=1"
        );
        assert_eq!(urlqs("/x?y=1", &[("z", "2")]), "/x?y=1&z=2");
        assert_eq!(urlqs("/x", &[]), "/x");
    }

    #[test]
    fn test_generate_id_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
