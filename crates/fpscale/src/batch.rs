use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use fpscale_core::{
    FactorInput, FactorMode, ScaleFactor, is_same_file, propose_output_name, read_footprint,
    rewrite_document_with_report, write_footprint,
};
use log::debug;

use crate::prompt::{InquirePrompter, Prompter};
use crate::tty;

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Interactively scale footprints, one factor after another")]
pub struct BatchArgs {
    /// Footprint to start with. Asked for when omitted.
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,
}

/// Where the interactive loop currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    NoFile,
    FileSelected(PathBuf),
}

pub fn execute(args: BatchArgs) -> Result<()> {
    tty::require_interactive("fpscale batch")?;
    run(args.input, &mut InquirePrompter)
}

pub fn run(input: Option<PathBuf>, prompter: &mut impl Prompter) -> Result<()> {
    let mut state = match input {
        Some(path) => State::FileSelected(path),
        None => State::NoFile,
    };
    while let Some(next) = step(state, prompter)? {
        state = next;
    }
    Ok(())
}

/// Advance the loop by one prompt. `None` ends the session.
pub fn step(state: State, prompter: &mut impl Prompter) -> Result<Option<State>> {
    debug!("batch state: {state:?}");
    match state {
        State::NoFile => Ok(prompter.footprint_path()?.map(State::FileSelected)),
        State::FileSelected(path) => match prompter.scale_factor(FactorMode::Batch)? {
            FactorInput::Exit => Ok(Some(State::NoFile)),
            FactorInput::Scale(factor) => {
                if let Err(e) = scale_once(&path, factor, prompter) {
                    eprintln!("{} {e:#}", "Error:".red());
                }
                Ok(Some(State::FileSelected(path)))
            }
        },
    }
}

fn scale_once(input: &Path, factor: ScaleFactor, prompter: &mut impl Prompter) -> Result<()> {
    let source = read_footprint(input)?;
    let (scaled, report) = rewrite_document_with_report(&source, factor);

    let Some(output) = prompter.save_path(&propose_output_name(input, factor))? else {
        println!("{}", "Save cancelled".yellow());
        return Ok(());
    };
    if is_same_file(&output, input) {
        bail!("Refusing to overwrite the input file {}", input.display());
    }
    if output.exists() && !prompter.confirm_overwrite(&output)? {
        println!("{}", "Save cancelled".yellow());
        return Ok(());
    }

    write_footprint(&output, &scaled, true)?;
    println!(
        "{} Scaled {} polygons, {} sizes, {} thicknesses by {factor}",
        "✓".green(),
        report.polygons,
        report.sizes,
        report.thicknesses
    );
    println!("Saved to {}", output.display().to_string().bold());
    Ok(())
}
