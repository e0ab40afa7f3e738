//! Output file naming for scaled footprints.
//!
//! Footprint libraries often carry the part size in the file name
//! (`Logo 5mm.kicad_mod`). When one is present the proposed name carries the
//! scaled size instead; otherwise `_scaled` is appended to the stem.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::factor::ScaleFactor;

static DIMENSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*mm").unwrap());

static DIMENSION_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\d+(?:\.\d+)?\s*mm").unwrap());

/// First millimeter dimension mentioned in `name`, e.g. `12.5` for
/// `"Badge 12.5mm"`.
pub fn dimension_hint(name: &str) -> Option<f64> {
    DIMENSION_RE
        .captures(name)
        .and_then(|caps| caps[1].parse().ok())
}

/// Propose a sibling path for the scaled copy of `input`.
pub fn propose_output_name(input: &Path, factor: ScaleFactor) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let file_name = match dimension_hint(&stem) {
        Some(dimension) => {
            let base = DIMENSION_STRIP_RE.replace_all(&stem, "");
            format!("{base} {:.1}mm{ext}", factor.apply(dimension))
        }
        None => format!("{stem}_scaled{ext}"),
    };

    input.with_file_name(file_name)
}
