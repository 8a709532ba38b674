// src/amount.rs
//
// Decimal-string <-> smallest-unit conversion. User input stays a raw
// string until the moment it is needed on-chain; everything here is
// integer math so "1.1" with 9 decimals is exactly 1_100_000_000.

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Parse a user-entered decimal string into smallest units.
///
/// Returns `None` for anything that is not a plain non-negative decimal
/// number, for fractional parts longer than `decimals`, and on overflow.
/// `"0"` parses to `Some(0)`; callers treat zero as not-submittable.
pub fn parse_amount(raw: &str, decimals: u8) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    // "  .5" and "5." are accepted, "1.2.3" and "1e5" are not
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac_part.len() > decimals as usize {
        return None;
    }

    let scale = 10u64.checked_pow(decimals as u32)?;
    let int_units = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<u64>().ok()?.checked_mul(scale)?
    };

    let frac_units = if frac_part.is_empty() {
        0
    } else {
        // Right-pad the fraction to `decimals` digits: "5" @ 9 -> 500_000_000
        let padding = 10u64.checked_pow((decimals as usize - frac_part.len()) as u32)?;
        frac_part.parse::<u64>().ok()?.checked_mul(padding)?
    };

    int_units.checked_add(frac_units)
}

/// Format smallest units back into a decimal string, trimming trailing
/// zeros ("1500000000" @ 9 -> "1.5", "1000000000" @ 9 -> "1").
pub fn format_amount(units: u64, decimals: u8) -> String {
    let scale = 10u64.pow(decimals as u32);
    let int_part = units / scale;
    let frac_part = units % scale;
    if frac_part == 0 {
        return int_part.to_string();
    }
    let frac_str = format!("{:0width$}", frac_part, width = decimals as usize);
    format!("{}.{}", int_part, frac_str.trim_end_matches('0'))
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// USD display used for fee and gift-value rows.
pub fn format_usd(value: f64) -> String {
    if value > 0.0 && value < 0.01 {
        return "$<0.01".to_string();
    }
    format!("${:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_basic() {
        assert_eq!(parse_amount("1.5", 9), Some(1_500_000_000));
        assert_eq!(parse_amount("2.0", 9), Some(2_000_000_000));
        assert_eq!(parse_amount("0", 9), Some(0));
        assert_eq!(parse_amount("0.000000001", 9), Some(1));
        assert_eq!(parse_amount("12", 6), Some(12_000_000));
        assert_eq!(parse_amount(".5", 9), Some(500_000_000));
        assert_eq!(parse_amount("5.", 9), Some(5_000_000_000));
        assert_eq!(parse_amount(" 1.5 ", 9), Some(1_500_000_000));
    }

    #[test]
    fn test_parse_amount_rejects() {
        assert_eq!(parse_amount("", 9), None);
        assert_eq!(parse_amount(".", 9), None);
        assert_eq!(parse_amount("-1", 9), None);
        assert_eq!(parse_amount("1.2.3", 9), None);
        assert_eq!(parse_amount("1e5", 9), None);
        assert_eq!(parse_amount("abc", 9), None);
        // fraction longer than the mint's decimals
        assert_eq!(parse_amount("0.0000001", 6), None);
    }

    #[test]
    fn test_parse_amount_overflow() {
        assert_eq!(parse_amount("99999999999999999999", 9), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_500_000_000, 9), "1.5");
        assert_eq!(format_amount(1_000_000_000, 9), "1");
        assert_eq!(format_amount(1, 9), "0.000000001");
        assert_eq!(format_amount(0, 9), "0");
    }

    #[test]
    fn test_round_trip() {
        for raw in ["1.5", "0.25", "100", "0.000001"] {
            let units = parse_amount(raw, 9).unwrap();
            assert_eq!(parse_amount(&format_amount(units, 9), 9), Some(units));
        }
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1.234), "$1.23");
        assert_eq!(format_usd(0.001), "$<0.01");
        assert_eq!(format_usd(0.0), "$0.00");
    }
}
