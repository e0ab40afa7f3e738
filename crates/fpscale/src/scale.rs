use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use fpscale_core::{
    FactorInput, FactorMode, FootprintScaler, ScaleFactor, is_same_file, parse_strict_factor,
    propose_output_name,
};
use log::{debug, warn};

use crate::prompt::{InquirePrompter, Prompter};
use crate::tty;

#[derive(Args, Debug, Clone)]
#[command(about = "Scale a single footprint file")]
pub struct ScaleArgs {
    /// The .kicad_mod file to scale
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Scale factor, e.g. 2.0 for double size. Asked for when omitted.
    #[arg(short, long, value_parser = parse_strict_factor, allow_negative_numbers = true)]
    pub factor: Option<ScaleFactor>,

    /// Output path. Defaults to the input name with its size hint rescaled,
    /// or with a `_scaled` suffix.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Print the scaled footprint instead of writing a file
    #[arg(long, conflicts_with_all = ["output", "diff"])]
    pub stdout: bool,

    /// Show a diff instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub diff: bool,

    /// Check whether scaling would change the footprint without writing it.
    /// Exit with non-zero code if there is nothing to scale.
    #[arg(long, conflicts_with_all = ["output", "stdout", "diff"])]
    pub check: bool,

    /// Overwrite the output file if it already exists
    #[arg(long)]
    pub force: bool,
}

pub fn execute(args: ScaleArgs) -> Result<()> {
    let factor = match args.factor {
        Some(factor) => factor,
        None => prompt_factor()?,
    };
    debug!("Scaling {} by {factor}", args.input.display());
    let scaler = FootprintScaler::new(factor);

    if args.check {
        if !scaler.check_file(&args.input)? {
            bail!("Nothing to scale in {}", args.input.display());
        }
        println!("{} would be rescaled by {factor}", args.input.display());
        return Ok(());
    }
    if args.diff {
        print!("{}", scaler.diff_file(&args.input)?);
        return Ok(());
    }
    if args.stdout {
        let source = fpscale_core::read_footprint(&args.input)?;
        print!("{}", scaler.scale_source(&source));
        return Ok(());
    }

    let output = args
        .output
        .unwrap_or_else(|| propose_output_name(&args.input, factor));
    if is_same_file(&output, &args.input) {
        bail!(
            "Refusing to overwrite the input file {}",
            args.input.display()
        );
    }
    if output.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let report = scaler.scale_file(&args.input, &output, args.force)?;
    if report.is_empty() {
        warn!("no polygons, sizes or thicknesses found in {}", args.input.display());
        println!(
            "{} Nothing to scale in {}, copied unchanged",
            "!".yellow(),
            args.input.display()
        );
    } else {
        println!(
            "{} Scaled {} polygons ({} points), {} sizes, {} thicknesses by {factor}",
            "✓".green(),
            report.polygons,
            report.points,
            report.sizes,
            report.thicknesses
        );
    }
    println!("Saved to {}", output.display().to_string().bold());
    Ok(())
}

fn prompt_factor() -> Result<ScaleFactor> {
    if !tty::is_interactive() {
        bail!("--factor is required when not running interactively");
    }
    match InquirePrompter.scale_factor(FactorMode::Strict)? {
        FactorInput::Scale(factor) => Ok(factor),
        FactorInput::Exit => bail!("No scale factor given"),
    }
}
