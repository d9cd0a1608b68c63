//! Decimal number parsing and formatting for the number validation types.
//!
//! The dictionary distinguishes locale variants: the `comma_decimal` tags
//! accept and emit `,` as the decimal separator. Variants with a declared
//! precision round half-up (midpoint away from zero) to that many decimal
//! places.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::{DictionaryError, Result};

/// Parse a raw number string.
///
/// `decimals` is the declared fixed precision (`None` for unconstrained),
/// `comma` selects the comma-decimal locale.
pub fn parse_number(raw: &str, decimals: Option<u32>, comma: bool, tag: &str) -> Result<Decimal> {
    let normalized = if comma {
        raw.replace(',', ".")
    } else {
        raw.to_string()
    };
    let value =
        Decimal::from_str(normalized.trim()).map_err(|_| DictionaryError::MalformedValue {
            raw: raw.to_string(),
            tag: tag.to_string(),
        })?;
    Ok(match decimals {
        Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        None => value,
    })
}

/// Format a decimal back to the dictionary's textual form.
///
/// A declared precision pads with trailing zeros so `1.5` under a 2dp tag
/// renders as `1.50`.
pub fn format_number(value: &Decimal, decimals: Option<u32>, comma: bool) -> String {
    let mut value = *value;
    if let Some(dp) = decimals {
        value = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(dp);
    }
    let rendered = value.to_string();
    if comma {
        rendered.replace('.', ",")
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_decimal() {
        let v = parse_number("3.25", None, false, "number").unwrap();
        assert_eq!(v.to_string(), "3.25");
    }

    #[test]
    fn comma_variant_accepts_comma_separator() {
        let v = parse_number("3,25", Some(2), true, "number_2dp_comma_decimal").unwrap();
        assert_eq!(v.to_string(), "3.25");
    }

    #[test]
    fn rounds_half_up_to_declared_precision() {
        let v = parse_number("1.005", Some(2), false, "number_2dp").unwrap();
        assert_eq!(v.to_string(), "1.01");
        let v = parse_number("-1.005", Some(2), false, "number_2dp").unwrap();
        assert_eq!(v.to_string(), "-1.01");
    }

    #[test]
    fn format_pads_to_precision_and_locale() {
        let v = parse_number("1.5", Some(2), false, "number_2dp").unwrap();
        assert_eq!(format_number(&v, Some(2), false), "1.50");
        assert_eq!(format_number(&v, Some(2), true), "1,50");
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_number("abc", None, false, "number").unwrap_err();
        assert!(matches!(
            err,
            DictionaryError::MalformedValue { ref raw, ref tag } if raw == "abc" && tag == "number"
        ));
    }
}
