use std::io::Write;
use std::path::Path;

use anyhow::Context;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use similar::TextDiff;

use crate::factor::ScaleFactor;
use crate::geometry::{NUMBER, POINT_INDENT, extract_points, format_points, scale_points};

/// `  (fp_poly (pts` header, a body made only of `(xy ..)` entries, and the
/// `) (stroke` trailer. Header and trailer are re-emitted untouched.
static POLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(  \(fp_poly\s+\(pts\s*\n)((?:\s*\(xy\s+{NUMBER}\s+{NUMBER}\))*)(\s*\)\s*\(stroke)"
    ))
    .unwrap()
});

static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\(size\s+({NUMBER})\s+({NUMBER})\)")).unwrap());

static THICKNESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\(thickness\s+({NUMBER})\)")).unwrap());

/// What a rewrite touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub polygons: usize,
    pub points: usize,
    pub sizes: usize,
    pub thicknesses: usize,
}

impl RewriteReport {
    pub fn is_empty(&self) -> bool {
        self.polygons == 0 && self.sizes == 0 && self.thicknesses == 0
    }
}

/// Scale every polygon point list, `(size W H)` and `(thickness T)` in a
/// footprint document. Everything else is passed through unchanged.
pub fn rewrite_document(text: &str, factor: ScaleFactor) -> String {
    rewrite_document_with_report(text, factor).0
}

pub fn rewrite_document_with_report(text: &str, factor: ScaleFactor) -> (String, RewriteReport) {
    let mut report = RewriteReport::default();

    let scaled = POLY_RE.replace_all(text, |caps: &Captures| {
        let points = scale_points(&extract_points(&caps[2]), factor);
        report.polygons += 1;
        report.points += points.len();
        let mut body = format_points(&points, POINT_INDENT);
        // Follow the line ending of the (pts header.
        if caps[1].ends_with("\r\n") {
            body = body.replace('\n', "\r\n");
        }
        format!("{}{}{}", &caps[1], body, &caps[3])
    });

    let scaled = SIZE_RE.replace_all(&scaled, |caps: &Captures| {
        match (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
            (Ok(w), Ok(h)) => {
                report.sizes += 1;
                format!("(size {:.3} {:.3})", factor.apply(w), factor.apply(h))
            }
            _ => caps[0].to_string(),
        }
    });

    let scaled = THICKNESS_RE.replace_all(&scaled, |caps: &Captures| {
        match caps[1].parse::<f64>() {
            Ok(t) => {
                report.thicknesses += 1;
                format!("(thickness {:.3})", factor.apply(t))
            }
            Err(_) => caps[0].to_string(),
        }
    });

    debug!(
        "Scaled by {factor}: {} polygons ({} points), {} sizes, {} thicknesses",
        report.polygons, report.points, report.sizes, report.thicknesses
    );

    (scaled.into_owned(), report)
}

pub fn read_footprint(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read footprint {}", path.display()))
}

/// Write `contents` to `path` atomically. Fails if `path` exists and
/// `overwrite` is false.
pub fn write_footprint(path: &Path, contents: &str, overwrite: bool) -> anyhow::Result<()> {
    let behavior = if overwrite {
        OverwriteBehavior::AllowOverwrite
    } else {
        OverwriteBehavior::DisallowOverwrite
    };
    AtomicFile::new(path, behavior)
        .write(|f| {
            f.write_all(contents.as_bytes())?;
            f.flush()
        })
        .map_err(|err| anyhow::anyhow!("Failed to write {}: {err}", path.display()))
}

/// True if both paths name the same file on disk. Paths that cannot be
/// resolved (e.g. an output that does not exist yet) are compared as given.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// File-level helper around [`rewrite_document`] for a fixed factor.
pub struct FootprintScaler {
    factor: ScaleFactor,
}

impl FootprintScaler {
    pub fn new(factor: ScaleFactor) -> Self {
        Self { factor }
    }

    pub fn scale_source(&self, source: &str) -> String {
        rewrite_document(source, self.factor)
    }

    /// Returns true if scaling would change the file.
    pub fn check_file(&self, file_path: &Path) -> anyhow::Result<bool> {
        let source = read_footprint(file_path)?;
        Ok(self.scale_source(&source) != source)
    }

    pub fn scale_file(
        &self,
        input: &Path,
        output: &Path,
        overwrite: bool,
    ) -> anyhow::Result<RewriteReport> {
        debug!("Scaling {} -> {}", input.display(), output.display());
        let source = read_footprint(input)?;
        let (scaled, report) = rewrite_document_with_report(&source, self.factor);
        write_footprint(output, &scaled, overwrite)?;
        Ok(report)
    }

    pub fn diff_file(&self, file_path: &Path) -> anyhow::Result<String> {
        let source = read_footprint(file_path)?;
        let scaled = self.scale_source(&source);
        let diff = TextDiff::from_lines(source.as_str(), scaled.as_str());
        Ok(format!(
            "{}",
            diff.unified_diff().context_radius(3).header(
                &format!("old/{}", file_path.display()),
                &format!("new/{}", file_path.display())
            )
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(v: f64) -> ScaleFactor {
        ScaleFactor::new(v).unwrap()
    }

    const SQUARE: &str = "\
(footprint \"Square\"
  (fp_poly
    (pts
      (xy 0 0)
      (xy 2 0) (xy 2 2)
      (xy 0 2)
    )
    (stroke (width 0) (type solid))
    (fill solid)
    (layer \"F.SilkS\")
  )
  (fp_text reference \"REF**\" (at 0 -1) (layer \"F.SilkS\")
    (effects (font (size 1 1) (thickness 0.15)))
  )
)
";

    #[test]
    fn test_end_to_end_square() {
        let (out, report) = rewrite_document_with_report(SQUARE, factor(2.0));
        let expected = "\
(footprint \"Square\"
  (fp_poly
    (pts
      (xy 0.000000 0.000000)
      (xy 4.000000 0.000000)
      (xy 4.000000 4.000000)
      (xy 0.000000 4.000000)
    )
    (stroke (width 0) (type solid))
    (fill solid)
    (layer \"F.SilkS\")
  )
  (fp_text reference \"REF**\" (at 0 -1) (layer \"F.SilkS\")
    (effects (font (size 2.000 2.000) (thickness 0.300)))
  )
)
";
        assert_eq!(out, expected);
        assert_eq!(
            report,
            RewriteReport {
                polygons: 1,
                points: 4,
                sizes: 1,
                thicknesses: 1,
            }
        );
    }

    #[test]
    fn test_passthrough_without_markers() {
        let doc = "(footprint \"Plain\"\n  (layer \"F.Cu\")\n  (at 1.23456789 -2)\n)\n";
        let (out, report) = rewrite_document_with_report(doc, factor(3.7));
        assert_eq!(out, doc);
        assert!(report.is_empty());
    }

    #[test]
    fn test_size_and_thickness_precision() {
        assert_eq!(rewrite_document("(size 1 1.5)", factor(3.0)), "(size 3.000 4.500)");
        assert_eq!(rewrite_document("(thickness 0.15)", factor(2.0)), "(thickness 0.300)");
        assert_eq!(
            rewrite_document("(size 1.27 0.8) x (thickness 0.1)", factor(1.0)),
            "(size 1.270 0.800) x (thickness 0.100)"
        );
    }

    #[test]
    fn test_empty_polygon() {
        let doc = "  (fp_poly\n    (pts\n    )\n    (stroke (width 0.1) (type solid))";
        assert_eq!(rewrite_document(doc, factor(5.0)), doc);
    }

    #[test]
    fn test_polygon_without_stroke_is_untouched() {
        let doc = "  (fp_poly (pts\n      (xy 1 1)\n    ) (layer \"F.SilkS\") (width 0.1))";
        let (out, report) = rewrite_document_with_report(doc, factor(2.0));
        assert_eq!(out, doc);
        assert_eq!(report.polygons, 0);
    }

    #[test]
    fn test_polygons_are_scaled_independently() {
        let doc = concat!(
            "  (fp_poly (pts\n",
            "      (xy 1 1)\n",
            "    ) (stroke (width 0))\n",
            "  (fp_line (start 1 1) (end 2 2))\n",
            "  (fp_poly (pts\n",
            "      (xy -1 0.5)\n",
            "      (xy 3 3)\n",
            "    ) (stroke (width 0))\n",
        );
        let (out, report) = rewrite_document_with_report(doc, factor(0.5));
        let expected = concat!(
            "  (fp_poly (pts\n",
            "      (xy 0.500000 0.500000)\n",
            "    ) (stroke (width 0))\n",
            "  (fp_line (start 1 1) (end 2 2))\n",
            "  (fp_poly (pts\n",
            "      (xy -0.500000 0.250000)\n",
            "      (xy 1.500000 1.500000)\n",
            "    ) (stroke (width 0))\n",
        );
        assert_eq!(out, expected);
        assert_eq!(report.polygons, 2);
        assert_eq!(report.points, 3);
    }

    #[test]
    fn test_polygon_at_column_zero_is_untouched() {
        let doc = "(fp_poly (pts\n      (xy 1 1)\n    ) (stroke (width 0))\n";
        assert_eq!(rewrite_document(doc, factor(2.0)), doc);
    }

    #[test]
    fn test_crlf_line_endings_are_kept() {
        let doc = "  (fp_poly\r\n    (pts\r\n      (xy 1 2) (xy 3 4)\r\n    )\r\n    (stroke (width 0))\r\n";
        let expected = concat!(
            "  (fp_poly\r\n",
            "    (pts\r\n",
            "      (xy 2.000000 4.000000)\r\n",
            "      (xy 6.000000 8.000000)\r\n",
            "    )\r\n",
            "    (stroke (width 0))\r\n",
        );
        let out = rewrite_document(doc, factor(2.0));
        assert_eq!(out, expected);
        assert!(!out.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_is_same_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("logo.kicad_mod");
        std::fs::write(&input, SQUARE)?;

        assert!(is_same_file(&input, &input));
        assert!(is_same_file(&input, &dir.path().join(".").join("logo.kicad_mod")));
        std::fs::create_dir(dir.path().join("sub"))?;
        assert!(is_same_file(
            &input,
            &dir.path().join("sub").join("..").join("logo.kicad_mod")
        ));
        assert!(!is_same_file(&input, &dir.path().join("other.kicad_mod")));
        Ok(())
    }

    #[test]
    fn test_scaler_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("in.kicad_mod");
        let output = dir.path().join("out.kicad_mod");
        std::fs::write(&input, SQUARE)?;

        let scaler = FootprintScaler::new(factor(2.0));
        assert!(scaler.check_file(&input)?);
        let plain = dir.path().join("plain.kicad_mod");
        std::fs::write(&plain, "(footprint \"Plain\" (layer \"F.Cu\"))\n")?;
        assert!(!scaler.check_file(&plain)?);

        let report = scaler.scale_file(&input, &output, false)?;
        assert_eq!(report.polygons, 1);
        assert_eq!(std::fs::read_to_string(&output)?, scaler.scale_source(SQUARE));

        // Existing output is kept unless overwriting is allowed.
        assert!(scaler.scale_file(&input, &output, false).is_err());
        assert!(scaler.scale_file(&input, &output, true).is_ok());

        let diff = scaler.diff_file(&input)?;
        assert!(diff.contains("-      (xy 2 0) (xy 2 2)"));
        assert!(diff.contains("+      (xy 4.000000 0.000000)"));
        assert!(diff.contains("+    (effects (font (size 2.000 2.000) (thickness 0.300)))"));
        Ok(())
    }
}
