//! Affine transform parser: `rotate(deg) scale(x[, y]) translate(x[, y])`,
//! applied left to right.

use crate::css::tokenizer::Token;
use crate::error::ValueError;
use crate::geometry::Transform;
use crate::property::syntax::TokenStream;
use crate::property::{PropertyType, PropertyValue};

fn arguments(stream: &mut TokenStream<'_>) -> Result<Vec<f64>, ValueError> {
    let mut values = Vec::new();
    while stream.peek_token() != Some(Token::ParenClose) {
        if !values.is_empty() {
            stream.eat(Token::Comma);
        }
        values.push(stream.loose_number()?);
    }
    stream.expect(Token::ParenClose)?;
    Ok(values)
}

fn step(stream: &mut TokenStream<'_>) -> Result<Transform, ValueError> {
    let Some(function) = stream.function_name() else {
        return Err(stream.invalid("expected rotate(...), scale(...) or translate(...)"));
    };
    let function = function.to_ascii_lowercase();
    let args = arguments(stream)?;
    match (function.as_str(), args.as_slice()) {
        ("rotate", [degrees]) => Ok(Transform::rotation(*degrees)),
        ("scale", [s]) => Ok(Transform::scale(*s, *s)),
        ("scale", [sx, sy]) => Ok(Transform::scale(*sx, *sy)),
        ("translate", [t]) => Ok(Transform::translation(*t, *t)),
        ("translate", [tx, ty]) => Ok(Transform::translation(*tx, *ty)),
        ("rotate" | "scale" | "translate", _) => Err(stream.invalid(format!(
            "wrong number of arguments to {function}: {}",
            args.len()
        ))),
        (other, _) => Err(stream.invalid(format!("unknown transform function '{other}'"))),
    }
}

pub fn parse_transform(
    property_type: &PropertyType,
    raw: &str,
) -> Result<PropertyValue, ValueError> {
    let mut stream = TokenStream::new(property_type, raw)?;
    if stream.eat_keyword("identity") || stream.eat_keyword("none") {
        stream.finish()?;
        return Ok(PropertyValue::Transform(Transform::IDENTITY));
    }

    let mut transform = step(&mut stream)?;
    while !stream.is_eof() {
        transform = transform.concat(step(&mut stream)?);
    }
    Ok(PropertyValue::Transform(transform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn transform(raw: &str) -> Transform {
        parse_transform(&PropertyType::TRANSFORM, raw)
            .unwrap_or_else(|e| panic!("{raw}: {e}"))
            .get::<Transform>()
            .unwrap()
    }

    #[test]
    fn single_steps() {
        assert_eq!(transform("scale(2)"), Transform::scale(2.0, 2.0));
        assert_eq!(transform("translate(10, -5)"), Transform::translation(10.0, -5.0));
        assert_eq!(transform("rotate(90deg)"), Transform::rotation(90.0));
        assert!(transform("identity").is_identity());
    }

    #[test]
    fn steps_apply_left_to_right() {
        let t = transform("scale(2, 3) translate(10 20)");
        assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(12.0, 23.0));
    }

    #[test]
    fn invalid_transforms() {
        let ty = PropertyType::TRANSFORM;
        assert!(parse_transform(&ty, "").is_err());
        assert!(parse_transform(&ty, "skew(10)").is_err());
        assert!(parse_transform(&ty, "rotate(1, 2)").is_err());
        assert!(parse_transform(&ty, "scale(2").is_err());
        assert!(parse_transform(&ty, "none scale(2)").is_err());
    }
}
