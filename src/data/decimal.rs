//! Locale-aware numeric fields
//!
//! Terminal files are written with a comma as decimal separator
//! ("12,34"). A dot is accepted too so hand-edited files still load.

use nom::{
    branch::alt,
    character::complete::{digit0, digit1, one_of},
    combinator::{all_consuming, opt, recognize},
    IResult, Parser,
};

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize((one_of("eE"), opt(one_of("+-")), digit1)).parse(input)
}

/// "12,34", "-0,5", "1e-3", "3" or ",5"
fn unsigned_decimal(input: &str) -> IResult<&str, &str> {
    recognize((
        alt((
            recognize((digit1, opt((one_of(",."), digit0)))),
            recognize((one_of(",."), digit1)),
        )),
        opt(exponent),
    ))
    .parse(input)
}

fn signed_decimal(input: &str) -> IResult<&str, &str> {
    recognize((opt(one_of("+-")), unsigned_decimal)).parse(input)
}

/// Parse one field into `f64`, or `None` if it is not a number
///
/// Surrounding whitespace is ignored. `NaN`/`inf` spellings are rejected.
pub fn parse_decimal(field: &str) -> Option<f64> {
    let field = field.trim();
    let (_, literal) = all_consuming(signed_decimal).parse(field).ok()?;
    literal.replace(',', ".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_decimal() {
        assert_eq!(parse_decimal("12,34"), Some(12.34));
        assert_eq!(parse_decimal("0,05"), Some(0.05));
    }

    #[test]
    fn test_dot_decimal_and_integers() {
        assert_eq!(parse_decimal("1.10"), Some(1.10));
        assert_eq!(parse_decimal("4000"), Some(4000.0));
        assert_eq!(parse_decimal("7,"), Some(7.0));
    }

    #[test]
    fn test_signs_and_exponents() {
        assert_eq!(parse_decimal("-0,012"), Some(-0.012));
        assert_eq!(parse_decimal("+3"), Some(3.0));
        assert_eq!(parse_decimal("1,5E+11"), Some(1.5e11));
        assert_eq!(parse_decimal(",5"), Some(0.5));
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(parse_decimal("  2,5 "), Some(2.5));
    }

    #[test]
    fn test_rejects_non_numbers() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("1,2,3"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("1 000"), None);
    }
}
