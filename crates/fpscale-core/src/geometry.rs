use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::factor::ScaleFactor;

/// Signed decimal with an optional fractional part, as KiCad writes them.
pub(crate) const NUMBER: &str = r"-?(?:\d+(?:\.\d*)?|\.\d+)";

/// Indent used for `(xy ..)` lines inside a rewritten `(pts ..)` block.
pub const POINT_INDENT: &str = "      ";

static XY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\(xy\s+({NUMBER})\s+({NUMBER})\)")).unwrap());

/// A 2D point in footprint units (millimeters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: ScaleFactor) -> Self {
        Self {
            x: factor.apply(self.x),
            y: factor.apply(self.y),
        }
    }
}

/// Serializes as a KiCad point entry with six decimals per axis.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(xy {:.6} {:.6})", self.x, self.y)
    }
}

/// Collect every `(xy X Y)` entry in `text`, in order of appearance.
pub fn extract_points(text: &str) -> Vec<Coordinate> {
    XY_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let x = caps[1].parse().ok()?;
            let y = caps[2].parse().ok()?;
            Some(Coordinate { x, y })
        })
        .collect()
}

pub fn scale_points(points: &[Coordinate], factor: ScaleFactor) -> Vec<Coordinate> {
    points.iter().map(|p| p.scaled(factor)).collect()
}

/// One point per line, each prefixed with `indent`. No trailing newline.
pub fn format_points(points: &[Coordinate], indent: &str) -> String {
    points
        .iter()
        .map(|p| format!("{indent}{p}"))
        .collect::<Vec<_>>()
        .join("\n")
}
