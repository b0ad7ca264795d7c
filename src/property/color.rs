//! Color values and the color parser.
//!
//! Accepted forms:
//!
//! - hex: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
//! - `rgb(r, g, b)` and `rgba(r, g, b, a)` with 0-255 channels and 0-1 alpha
//! - named colors (`red`, `lightgray`, `clear`, ...)
//! - adjustments wrapping any of the above: `lighten`, `darken`, `saturate`,
//!   `desaturate`, `fadein`, `fadeout` (relative, in percent) and
//!   `alpha` / `opacity` (absolute alpha)

use std::fmt;

use crate::css::tokenizer::Token;
use crate::error::ValueError;
use crate::property::syntax::{is_quoted, trim_quotes, TokenStream};
use crate::property::{PropertyType, PropertyValue};

/// An RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const CLEAR: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self { red, green, blue, alpha }
    }

    /// From 8-bit channels.
    pub fn rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::new(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            1.0,
        )
    }

    /// Parse 3, 4, 6 or 8 hex digits, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| f64::from(v) / 255.0);
        let short = |i: usize| {
            let digit = &hex[i..i + 1];
            channel(&format!("{digit}{digit}"))
        };
        match hex.len() {
            3 => Some(Self::new(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::new(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::new(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 1.0)),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Look up a named color (case-insensitive).
    pub fn named(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        let name = name.strip_suffix("color").unwrap_or(&name);
        let (r, g, b) = match name {
            "clear" | "transparent" => return Some(Color::CLEAR),
            "black" => (0, 0, 0),
            "white" => (255, 255, 255),
            "red" => (255, 0, 0),
            "green" => (0, 128, 0),
            "lime" => (0, 255, 0),
            "blue" => (0, 0, 255),
            "navy" => (0, 0, 128),
            "yellow" => (255, 255, 0),
            "cyan" | "aqua" => (0, 255, 255),
            "magenta" | "fuchsia" => (255, 0, 255),
            "orange" => (255, 165, 0),
            "purple" => (128, 0, 128),
            "brown" => (165, 42, 42),
            "gray" | "grey" => (128, 128, 128),
            "lightgray" | "lightgrey" => (211, 211, 211),
            "darkgray" | "darkgrey" => (169, 169, 169),
            "silver" => (192, 192, 192),
            "maroon" => (128, 0, 0),
            "olive" => (128, 128, 0),
            "teal" => (0, 128, 128),
            "pink" => (255, 192, 203),
            "gold" => (255, 215, 0),
            "indigo" => (75, 0, 130),
            "violet" => (238, 130, 238),
            "coral" => (255, 127, 80),
            "salmon" => (250, 128, 114),
            "tomato" => (255, 99, 71),
            "crimson" => (220, 20, 60),
            "khaki" => (240, 230, 140),
            "beige" => (245, 245, 220),
            "ivory" => (255, 255, 240),
            "steelblue" => (70, 130, 180),
            "skyblue" => (135, 206, 235),
            "royalblue" => (65, 105, 225),
            "slategray" | "slategrey" => (112, 128, 144),
            "whitesmoke" => (245, 245, 245),
            _ => return None,
        };
        Some(Self::rgb8(r, g, b))
    }

    /// Hue, saturation, brightness (all `0.0..=1.0`).
    pub fn to_hsb(self) -> (f64, f64, f64) {
        let max = self.red.max(self.green).max(self.blue);
        let min = self.red.min(self.green).min(self.blue);
        let delta = max - min;
        let saturation = if max > 0.0 { delta / max } else { 0.0 };
        let hue = if delta == 0.0 {
            0.0
        } else if max == self.red {
            ((self.green - self.blue) / delta).rem_euclid(6.0) / 6.0
        } else if max == self.green {
            ((self.blue - self.red) / delta + 2.0) / 6.0
        } else {
            ((self.red - self.green) / delta + 4.0) / 6.0
        };
        (hue, saturation, max)
    }

    pub fn from_hsb(hue: f64, saturation: f64, brightness: f64, alpha: f64) -> Self {
        let h = hue.rem_euclid(1.0) * 6.0;
        let c = brightness * saturation;
        let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let m = brightness - c;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Self::new(r + m, g + m, b + m, alpha)
    }

    pub fn adjust_brightness(self, percent: f64) -> Self {
        let (h, s, b) = self.to_hsb();
        Self::from_hsb(h, s, adjust(b, percent), self.alpha)
    }

    pub fn adjust_saturation(self, percent: f64) -> Self {
        let (h, s, b) = self.to_hsb();
        Self::from_hsb(h, adjust(s, percent), b, self.alpha)
    }

    pub fn adjust_alpha(self, percent: f64) -> Self {
        Self { alpha: adjust(self.alpha, percent), ..self }
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha: alpha.clamp(0.0, 1.0), ..self }
    }
}

/// `value` changed by `percent` of itself, clamped to `0.0..=1.0`.
fn adjust(value: f64, percent: f64) -> f64 {
    (value + value * percent / 100.0).clamp(0.0, 1.0)
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue),
            byte(self.alpha)
        )
    }
}

fn channel_list(stream: &mut TokenStream<'_>, count: usize) -> Result<Vec<f64>, ValueError> {
    let mut values = Vec::with_capacity(count);
    while stream.peek_token() != Some(Token::ParenClose) {
        if !values.is_empty() {
            stream.expect(Token::Comma)?;
        }
        values.push(stream.number()?);
    }
    stream.expect(Token::ParenClose)?;
    if values.len() != count {
        return Err(stream.invalid(format!("expected {count} components, got {}", values.len())));
    }
    Ok(values)
}

fn color_expr(stream: &mut TokenStream<'_>) -> Result<Color, ValueError> {
    let Some(tok) = stream.peek() else {
        return Err(stream.invalid("expected color, found end of input"));
    };
    let text = stream.text(tok);

    if tok.token == Token::HexColor {
        stream.advance();
        return Color::from_hex(text).ok_or_else(|| stream.invalid(format!("invalid hex color '{text}'")));
    }

    if let Some(function) = stream.function_name() {
        let function = function.to_ascii_lowercase();
        match function.as_str() {
            "rgb" => {
                let c = channel_list(stream, 3)?;
                return Ok(Color::new(c[0] / 255.0, c[1] / 255.0, c[2] / 255.0, 1.0));
            }
            "rgba" => {
                let c = channel_list(stream, 4)?;
                return Ok(Color::new(c[0] / 255.0, c[1] / 255.0, c[2] / 255.0, c[3].clamp(0.0, 1.0)));
            }
            _ => {}
        }
        let color = color_expr(stream)?;
        stream.expect(Token::Comma)?;
        let amount = stream.loose_number()?;
        stream.expect(Token::ParenClose)?;
        return match function.as_str() {
            "lighten" => Ok(color.adjust_brightness(amount)),
            "darken" => Ok(color.adjust_brightness(-amount)),
            "saturate" => Ok(color.adjust_saturation(amount)),
            "desaturate" => Ok(color.adjust_saturation(-amount)),
            "fadein" => Ok(color.adjust_alpha(amount)),
            "fadeout" => Ok(color.adjust_alpha(-amount)),
            "alpha" | "opacity" => Ok(color.with_alpha(amount)),
            other => Err(stream.invalid(format!("unknown color function '{other}'"))),
        };
    }

    if tok.token == Token::Ident {
        stream.advance();
        return Color::named(text).ok_or_else(|| stream.invalid(format!("unknown color '{text}'")));
    }

    Err(stream.invalid(format!("expected color, found '{text}'")))
}

/// Parse a color value.
pub fn parse_color(property_type: &PropertyType, raw: &str) -> Result<PropertyValue, ValueError> {
    if is_quoted(raw) {
        let name = trim_quotes(raw);
        return Color::named(name)
            .map(PropertyValue::Color)
            .ok_or_else(|| ValueError::invalid(property_type, format!("unknown color '{name}'")));
    }
    let mut stream = TokenStream::new(property_type, raw)?;
    let color = color_expr(&mut stream)?;
    stream.finish()?;
    Ok(PropertyValue::Color(color))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(raw: &str) -> Color {
        parse_color(&PropertyType::COLOR, raw)
            .unwrap_or_else(|e| panic!("{raw}: {e}"))
            .get::<Color>()
            .unwrap()
    }

    fn approx_eq(a: Color, b: Color) -> bool {
        [
            (a.red, b.red),
            (a.green, b.green),
            (a.blue, b.blue),
            (a.alpha, b.alpha),
        ]
        .iter()
        .all(|(x, y)| (x - y).abs() < 1e-6)
    }

    // ── Literal forms ────────────────────────────────────────────────

    #[test]
    fn hex_forms() {
        assert_eq!(color("#fff"), Color::WHITE);
        assert_eq!(color("#112233"), Color::rgb8(0x11, 0x22, 0x33));
        assert_eq!(color("#00000000"), Color::CLEAR);
        assert!(approx_eq(color("#f008"), Color::new(1.0, 0.0, 0.0, 0x88 as f64 / 255.0)));
        assert!(parse_color(&PropertyType::COLOR, "#12345").is_err());
    }

    #[test]
    fn rgb_functions() {
        assert_eq!(color("rgb(17, 34, 51)"), Color::rgb8(17, 34, 51));
        assert_eq!(color("RGBA(255, 0, 0, 0.5)"), Color::new(1.0, 0.0, 0.0, 0.5));
        assert!(parse_color(&PropertyType::COLOR, "rgb(1, 2)").is_err());
        assert!(parse_color(&PropertyType::COLOR, "rgba(1, 2, 3)").is_err());
    }

    #[test]
    fn named_colors() {
        assert_eq!(color("red"), Color::rgb8(255, 0, 0));
        assert_eq!(color("LightGray"), Color::rgb8(211, 211, 211));
        assert_eq!(color("'clear'"), Color::CLEAR);
        assert_eq!(color("blueColor"), Color::rgb8(0, 0, 255));
        assert!(parse_color(&PropertyType::COLOR, "notacolor").is_err());
    }

    // ── Adjustments ──────────────────────────────────────────────────

    #[test]
    fn lighten_scales_brightness() {
        let lightened = color("lighten(rgb(17, 34, 51), 50%)");
        assert!(approx_eq(lightened, Color::rgb8(17, 34, 51).adjust_brightness(50.0)));
        assert!(approx_eq(lightened, Color::new(0.1, 0.2, 0.3, 1.0)));
    }

    #[test]
    fn darken_and_fade() {
        let base = Color::rgb8(17, 34, 51);
        assert!(approx_eq(color("darken(#112233, 50)"), base.adjust_brightness(-50.0)));
        assert!(approx_eq(color("fadeout(#112233, 50%)"), Color { alpha: 0.5, ..base }));
        assert!(approx_eq(color("alpha(#112233, 0.25)"), Color { alpha: 0.25, ..base }));
    }

    #[test]
    fn nested_adjustments() {
        let base = Color::rgb8(17, 34, 51);
        let expected = base.adjust_alpha(-50.0).adjust_saturation(50.0);
        assert!(approx_eq(color("saturate(fadeout(#112233, 50%), 50%)"), expected));
    }

    #[test]
    fn unknown_function_fails() {
        assert!(parse_color(&PropertyType::COLOR, "glow(#fff, 10)").is_err());
    }

    #[test]
    fn hsb_round_trip_preserves_color() {
        let c = Color::rgb8(200, 100, 50);
        let (h, s, b) = c.to_hsb();
        assert!(approx_eq(Color::from_hsb(h, s, b, 1.0), c));
    }

    #[test]
    fn display_as_hex() {
        assert_eq!(Color::rgb8(0x11, 0x22, 0x33).to_string(), "#112233ff");
    }
}
