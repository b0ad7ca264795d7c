//! Core geometry value types: Point, Size, Offset, Rect, EdgeInsets, Transform.
//!
//! These are the typed results of the structured numeric property parsers.
//! Every type also implements [`FromStr`] for the brace-delimited string form
//! (`{1, 2}`, `{{x, y}, {w, h}}`) used as a coercion fallback for quoted values.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// Error returned when a brace-delimited geometry string cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} string '{input}': expected {expected} numeric components")]
pub struct GeometryParseError {
    pub kind: &'static str,
    pub input: String,
    pub expected: usize,
}

/// Read the numbers out of a brace-delimited string such as `{{1, 2}, {3, 4}}`.
///
/// All braces are ignored once the outer pair is confirmed; the component
/// count must equal `expected`.
fn brace_components(
    kind: &'static str,
    input: &str,
    expected: usize,
) -> Result<Vec<f64>, GeometryParseError> {
    let err = || GeometryParseError {
        kind,
        input: input.to_string(),
        expected,
    };
    let trimmed = input.trim();
    if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
        return Err(err());
    }
    let flat: String = trimmed.chars().filter(|c| *c != '{' && *c != '}').collect();
    let values = flat
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| err())?;
    if values.len() != expected {
        return Err(err());
    }
    Ok(values)
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A position in the host's coordinate space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build from one component (used for both axes) or two.
    pub fn from_components(values: &[f64]) -> Option<Self> {
        match *values {
            [v] => Some(Self::new(v, v)),
            [x, y] => Some(Self::new(x, y)),
            _ => None,
        }
    }
}

impl Add<Offset> for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Offset) -> Point {
        Point { x: self.x + rhs.horizontal, y: self.y + rhs.vertical }
    }
}

impl Sub for Point {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Point) -> Offset {
        Offset { horizontal: self.x - rhs.x, vertical: self.y - rhs.y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = brace_components("point", s, 2)?;
        Ok(Self::new(v[0], v[1]))
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A width/height pair.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Build from one component (square) or two.
    pub fn from_components(values: &[f64]) -> Option<Self> {
        match *values {
            [v] => Some(Self::new(v, v)),
            [width, height] => Some(Self::new(width, height)),
            _ => None,
        }
    }

    /// Total area (width * height).
    #[inline]
    pub fn area(self) -> f64 {
        self.width * self.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.width, self.height)
    }
}

impl FromStr for Size {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = brace_components("size", s, 2)?;
        Ok(Self::new(v[0], v[1]))
    }
}

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D displacement (horizontal, vertical).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Offset {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { horizontal: 0.0, vertical: 0.0 };

    /// Create a new offset.
    #[inline]
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self { horizontal, vertical }
    }

    /// Build from one component (both axes) or two.
    pub fn from_components(values: &[f64]) -> Option<Self> {
        match *values {
            [v] => Some(Self::new(v, v)),
            [h, v] => Some(Self::new(h, v)),
            _ => None,
        }
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.horizontal + rhs.horizontal, self.vertical + rhs.vertical)
    }
}

impl Neg for Offset {
    type Output = Offset;
    #[inline]
    fn neg(self) -> Offset {
        Offset::new(-self.horizontal, -self.vertical)
    }
}

impl Mul<f64> for Offset {
    type Output = Offset;
    #[inline]
    fn mul(self, rhs: f64) -> Offset {
        Offset::new(self.horizontal * rhs, self.vertical * rhs)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.horizontal, self.vertical)
    }
}

impl FromStr for Offset {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = brace_components("offset", s, 2)?;
        Ok(Self::new(v[0], v[1]))
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// A rectangle defined by origin and size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    /// Create a new rect.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build from exactly four components: x, y, width, height.
    pub fn from_components(values: &[f64]) -> Option<Self> {
        match *values {
            [x, y, width, height] => Some(Self::new(x, y, width, height)),
            _ => None,
        }
    }

    #[inline]
    pub const fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The rect shrunk by `insets` on each edge.
    #[inline]
    pub fn inset_by(self, insets: EdgeInsets) -> Rect {
        Rect {
            x: self.x + insets.left,
            y: self.y + insets.top,
            width: self.width - insets.left - insets.right,
            height: self.height - insets.top - insets.bottom,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.origin(), self.size())
    }
}

impl FromStr for Rect {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = brace_components("rect", s, 4)?;
        Ok(Self::new(v[0], v[1], v[2], v[3]))
    }
}

// ---------------------------------------------------------------------------
// EdgeInsets
// ---------------------------------------------------------------------------

/// Insets on four edges, in top/left/bottom/right order.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets { top: 0.0, left: 0.0, bottom: 0.0, right: 0.0 };

    /// Create new insets (top, left, bottom, right).
    #[inline]
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self { top, left, bottom, right }
    }

    /// Same inset on all four edges.
    #[inline]
    pub const fn all(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// `vertical` for top and bottom, `horizontal` for left and right.
    #[inline]
    pub const fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Build from one component (all edges), two (vertical, horizontal) or
    /// four (top, left, bottom, right).
    pub fn from_components(values: &[f64]) -> Option<Self> {
        match *values {
            [v] => Some(Self::all(v)),
            [vertical, horizontal] => Some(Self::symmetric(vertical, horizontal)),
            [top, left, bottom, right] => Some(Self::new(top, left, bottom, right)),
            _ => None,
        }
    }

    /// Total horizontal inset (left + right).
    #[inline]
    pub fn horizontal(self) -> f64 {
        self.left + self.right
    }

    /// Total vertical inset (top + bottom).
    #[inline]
    pub fn vertical(self) -> f64 {
        self.top + self.bottom
    }
}

impl fmt::Display for EdgeInsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}, {}, {}}}", self.top, self.left, self.bottom, self.right)
    }
}

impl FromStr for EdgeInsets {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = brace_components("insets", s, 4)?;
        Ok(Self::new(v[0], v[1], v[2], v[3]))
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// A 2D affine transform `[a b 0; c d 0; tx ty 1]`, applied to row vectors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    #[inline]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Rotation by `degrees`.
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Scale by `sx` horizontally and `sy` vertically.
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Translation by `(tx, ty)`.
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self` followed by `other`.
    pub fn concat(self, other: Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            tx: self.tx * other.a + self.ty * other.c + other.tx,
            ty: self.tx * other.b + self.ty * other.d + other.ty,
        }
    }

    /// Map a point through this transform.
    pub fn apply(self, point: Point) -> Point {
        Point::new(
            self.a * point.x + self.c * point.y + self.tx,
            self.b * point.x + self.d * point.y + self.ty,
        )
    }

    #[inline]
    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}, {}, {}]",
            self.a, self.b, self.c, self.d, self.tx, self.ty
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
