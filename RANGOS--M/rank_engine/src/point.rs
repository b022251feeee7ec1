use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable 2-D point. Only `y` takes part in rank computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate; the comparison key for ranks.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

/// Ordered sequence of points. Order only matters for reporting.
pub type PointSet = Vec<Point>;

/// Which side of the computation a point set plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetRole {
    /// Set A, the points ranks are measured against.
    Reference,
    /// Set B, the points whose ranks are computed.
    Query,
}

impl SetRole {
    /// Short letter used in console output.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Reference => 'A',
            Self::Query => 'B',
        }
    }
}

impl fmt::Display for SetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => write!(f, "reference set A"),
            Self::Query => write!(f, "query set B"),
        }
    }
}

/// Rejection raised while turning text into points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The text did not split into exactly two tokens.
    #[error("invalid format: expected 'x,y' or 'x y', found {0} token(s)")]
    TokenCount(usize),
    /// A token is not a number.
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    /// A token parsed to NaN or infinity.
    #[error("coordinate {0:?} is not finite")]
    NonFinite(String),
}

/// Parses `"x,y"` or `"x y"` into a point.
///
/// A comma anywhere in the text selects comma splitting; otherwise tokens are
/// split on whitespace. Non-finite coordinates are rejected so they never
/// reach the engine.
pub fn parse_point(text: &str) -> Result<Point, FormatError> {
    let text = text.trim();
    let tokens: Vec<&str> = if text.contains(',') {
        text.split(',').map(str::trim).collect()
    } else {
        text.split_whitespace().collect()
    };
    if tokens.len() != 2 {
        return Err(FormatError::TokenCount(tokens.len()));
    }
    let x = parse_coordinate(tokens[0])?;
    let y = parse_coordinate(tokens[1])?;
    Ok(Point::new(x, y))
}

fn parse_coordinate(token: &str) -> Result<f64, FormatError> {
    let value: f64 = token
        .parse()
        .map_err(|_| FormatError::InvalidNumber(token.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormatError::NonFinite(token.to_string()))
    }
}

/// Parses a list of points separated by `;` or newlines. Blank entries are skipped.
pub fn parse_point_list(text: &str) -> Result<PointSet, FormatError> {
    text.split([';', '\n'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_point)
        .collect()
}

/// Renders a labelled point listing, one `[i] (x, y)` line per point.
#[must_use]
pub fn render_points(points: &[Point], label: &str) -> String {
    let mut out = format!("{label} (x, y):\n");
    for (idx, point) in points.iter().enumerate() {
        out.push_str(&format!("  [{idx}] {point}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_and_space_forms() {
        assert_eq!(parse_point("1,2").unwrap(), Point::new(1.0, 2.0));
        assert_eq!(parse_point("1 2").unwrap(), Point::new(1.0, 2.0));
        assert_eq!(parse_point("  1.5 , -2 ").unwrap(), Point::new(1.5, -2.0));
        assert_eq!(parse_point("3\t4e-1").unwrap(), Point::new(3.0, 0.4));
    }

    #[test]
    fn rejects_wrong_token_count() {
        assert_eq!(parse_point("1"), Err(FormatError::TokenCount(1)));
        assert_eq!(parse_point("1,2,3"), Err(FormatError::TokenCount(3)));
        assert_eq!(parse_point("1 2 3"), Err(FormatError::TokenCount(3)));
        assert_eq!(parse_point(""), Err(FormatError::TokenCount(0)));
    }

    #[test]
    fn rejects_non_numeric_and_non_finite() {
        assert_eq!(
            parse_point("a,b"),
            Err(FormatError::InvalidNumber("a".into()))
        );
        assert_eq!(parse_point("1,"), Err(FormatError::InvalidNumber(String::new())));
        assert_eq!(
            parse_point("nan,1"),
            Err(FormatError::NonFinite("nan".into()))
        );
        assert_eq!(
            parse_point("0 inf"),
            Err(FormatError::NonFinite("inf".into()))
        );
    }

    #[test]
    fn parses_lists_with_mixed_separators() {
        let points = parse_point_list("0.5,3.0; 0.1 1.0\n\n0.3,0.2;").unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(0.5, 3.0),
                Point::new(0.1, 1.0),
                Point::new(0.3, 0.2)
            ]
        );
        assert!(parse_point_list("").unwrap().is_empty());
        assert!(parse_point_list("1,2;oops").is_err());
    }

    #[test]
    fn renders_indexed_listing() {
        let text = render_points(&[Point::new(0.5, 3.0)], "Set A");
        assert_eq!(text, "Set A (x, y):\n  [0] (0.5, 3.0)\n");
    }
}
