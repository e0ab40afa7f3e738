//! Rescale KiCad footprint (`.kicad_mod`) files by a constant factor.
//!
//! The rewriter works on text patterns rather than a parsed S-expression
//! tree: polygon point lists, `(size W H)` and `(thickness T)` fields are
//! located with regular expressions, scaled, and re-serialized with fixed
//! precision. All other text is left byte-for-byte intact.
//!
//! ```
//! use fpscale_core::{ScaleFactor, rewrite_document};
//!
//! let factor = ScaleFactor::new(2.0).unwrap();
//! assert_eq!(rewrite_document("(size 1 1.5)", factor), "(size 2.000 3.000)");
//! ```

pub mod factor;
pub mod geometry;
pub mod naming;
pub mod rewrite;

pub use factor::{
    FactorError, FactorInput, FactorMode, ScaleFactor, parse_factor, parse_strict_factor,
};
pub use geometry::{Coordinate, POINT_INDENT, extract_points, format_points, scale_points};
pub use naming::{dimension_hint, propose_output_name};
pub use rewrite::{
    FootprintScaler, RewriteReport, is_same_file, read_footprint, rewrite_document,
    rewrite_document_with_report, write_footprint,
};
