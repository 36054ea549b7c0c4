use chrono::NaiveDate;

/// Format an amount string as US-locale currency: leading `$`, comma thousands
/// separators, exactly two decimal places.
///
/// The numeric value is taken from the longest valid leading prefix of the
/// string. A string with no numeric prefix renders as `"$NaN"`; that artifact
/// is accepted upstream behavior and is pinned by a regression test.
pub fn format_currency(amount: &str) -> String {
    let value = parse_amount(amount);
    if value.is_nan() {
        return "$NaN".to_string();
    }

    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), "00"),
    };

    let grouped = group_thousands(int_part);
    if negative {
        format!("-${}.{}", grouped, frac_part)
    } else {
        format!("${}.{}", grouped, frac_part)
    }
}

/// Format a `YYYY-MM-DD` date string as a long US date, e.g. "March 15, 2024".
/// Unparseable input renders as `"Invalid Date"`.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => long_date(d),
        Err(_) => "Invalid Date".to_string(),
    }
}

/// Long US form of a date: "<Month name> <day>, <year>", day unpadded.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Parse the longest leading prefix of `input` that is a valid float, skipping
/// leading whitespace. Returns NaN when no prefix parses.
fn parse_amount(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let mut value = f64::NAN;
    for end in 1..=trimmed.len() {
        if !trimmed.is_char_boundary(end) {
            continue;
        }
        if let Ok(v) = trimmed[..end].parse::<f64>() {
            value = v;
        }
    }
    value
}

fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands_and_pads_decimals() {
        assert_eq!(format_currency("1000"), "$1,000.00");
        assert_eq!(format_currency("1234567.891"), "$1,234,567.89");
        assert_eq!(format_currency("0"), "$0.00");
        assert_eq!(format_currency("999.9"), "$999.90");
    }

    #[test]
    fn currency_non_numeric_renders_nan() {
        // Documented current behavior, not silently fixed.
        assert_eq!(format_currency("abc"), "$NaN");
        assert_eq!(format_currency(""), "$NaN");
    }

    #[test]
    fn currency_uses_longest_numeric_prefix() {
        assert_eq!(format_currency("1000abc"), "$1,000.00");
        assert_eq!(format_currency("  2.5"), "$2.50");
        assert_eq!(format_currency("1e3"), "$1,000.00");
    }

    #[test]
    fn currency_negative_amount() {
        assert_eq!(format_currency("-500"), "-$500.00");
    }

    #[test]
    fn date_long_us_form() {
        assert_eq!(format_date("2024-03-15"), "March 15, 2024");
        assert_eq!(format_date("2023-12-01"), "December 1, 2023");
    }

    #[test]
    fn date_invalid_input() {
        assert_eq!(format_date("not-a-date"), "Invalid Date");
        assert_eq!(format_date(""), "Invalid Date");
    }
}
