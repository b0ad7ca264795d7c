//! Scalar parsers: String, Bool, Number, RelativeNumber.

use crate::css::tokenizer::Token;
use crate::error::ValueError;
use crate::property::syntax::{split_dimension, trim_quotes, TokenStream};
use crate::property::{PropertyType, PropertyValue, RelativeNumber};

/// Resolve backslash escapes in a string value.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Quoted or bare text; surrounding whitespace and quotes are removed.
pub fn parse_string(_: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
    Ok(PropertyValue::String(unescape(trim_quotes(raw))))
}

/// Truthy if the value starts with `y` or `t` (any case), or with a non-zero
/// digit after optional sign and leading zeros. Everything else is false.
pub fn parse_bool(_: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
    let value = trim_quotes(raw);
    let value = value.strip_prefix(['+', '-']).unwrap_or(value);
    let truthy = match value.chars().next() {
        Some('y' | 'Y' | 't' | 'T') => true,
        Some(c) if c.is_ascii_digit() => value
            .trim_start_matches('0')
            .chars()
            .next()
            .is_some_and(|c| matches!(c, '1'..='9')),
        _ => false,
    };
    Ok(PropertyValue::Bool(truthy))
}

/// A number, optionally suffixed with `pt` or `px`.
pub fn parse_number(property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
    let mut stream = TokenStream::new(property_type, trim_quotes(raw))?;
    let value = stream.number()?;
    stream.finish()?;
    Ok(PropertyValue::Number(value))
}

/// `50%`, `auto` / `*`, or an absolute number.
pub fn parse_relative_number(
    property_type: &PropertyType,
    raw: &str,
) -> Result<PropertyValue, ValueError> {
    let mut stream = TokenStream::new(property_type, trim_quotes(raw))?;
    let value = if stream.eat_keyword("auto") || stream.eat(Token::Star) {
        RelativeNumber::Auto
    } else {
        match stream.peek() {
            Some(tok) if tok.token == Token::Dimension && stream.text(tok).ends_with('%') => {
                stream.advance();
                let (percent, _) = split_dimension(stream.text(tok))
                    .ok_or_else(|| stream.invalid("malformed percentage"))?;
                RelativeNumber::Percent(percent)
            }
            _ => RelativeNumber::Absolute(stream.number()?),
        }
    };
    stream.finish()?;
    Ok(PropertyValue::RelativeNumber(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bool_of(raw: &str) -> bool {
        parse_bool(&PropertyType::BOOL, raw).unwrap().get::<bool>().unwrap()
    }

    fn number_of(raw: &str) -> Result<f64, ValueError> {
        parse_number(&PropertyType::NUMBER, raw).map(|v| v.get::<f64>().unwrap())
    }

    fn relative(raw: &str) -> Result<RelativeNumber, ValueError> {
        parse_relative_number(&PropertyType::RELATIVE_NUMBER, raw)
            .map(|v| v.get::<RelativeNumber>().unwrap())
    }

    #[test]
    fn string_trims_and_unescapes() {
        let ty = PropertyType::STRING;
        assert_eq!(
            parse_string(&ty, r#" "Hello\nWorld" "#).unwrap(),
            PropertyValue::String("Hello\nWorld".into())
        );
        assert_eq!(parse_string(&ty, "plain").unwrap(), PropertyValue::String("plain".into()));
    }

    #[test]
    fn bool_truthiness() {
        for truthy in ["true", "YES", "y", "T", "1", "007", "+3", "'yes'"] {
            assert!(bool_of(truthy), "{truthy} should be true");
        }
        for falsy in ["false", "no", "0", "000", "", "maybe", "-0"] {
            assert!(!bool_of(falsy), "{falsy} should be false");
        }
    }

    #[test]
    fn number_units() {
        assert_eq!(number_of("12").unwrap(), 12.0);
        assert_eq!(number_of("12.5pt").unwrap(), 12.5);
        assert_eq!(number_of("-3px").unwrap(), -3.0);
        assert_eq!(number_of("\"4\"").unwrap(), 4.0);
        assert!(number_of("12em").is_err());
        assert!(number_of("1 2").is_err());
        assert!(number_of("abc").is_err());
    }

    #[test]
    fn relative_numbers() {
        assert_eq!(relative("50%").unwrap(), RelativeNumber::Percent(50.0));
        assert_eq!(relative("auto").unwrap(), RelativeNumber::Auto);
        assert_eq!(relative("*").unwrap(), RelativeNumber::Auto);
        assert_eq!(relative("120pt").unwrap(), RelativeNumber::Absolute(120.0));
        assert!(relative("50% 2").is_err());
    }
}
