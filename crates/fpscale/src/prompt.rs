use std::path::{Path, PathBuf};

use anyhow::Result;
use fpscale_core::{FactorInput, FactorMode, parse_factor};
use inquire::validator::Validation;
use inquire::{Confirm, CustomUserError, InquireError, Text};

/// Source of the answers the interactive drivers need.
pub trait Prompter {
    /// Footprint to work on. `None` ends the session.
    fn footprint_path(&mut self) -> Result<Option<PathBuf>>;

    /// A valid factor for `mode`; invalid answers are re-asked.
    fn scale_factor(&mut self, mode: FactorMode) -> Result<FactorInput>;

    /// Where to save the scaled copy. `None` cancels the save.
    fn save_path(&mut self, proposed: &Path) -> Result<Option<PathBuf>>;

    /// Whether an existing `path` may be replaced.
    fn confirm_overwrite(&mut self, path: &Path) -> Result<bool>;
}

/// Terminal prompts backed by `inquire`.
pub struct InquirePrompter;

fn validate_factor(
    mode: FactorMode,
) -> impl Fn(&str) -> Result<Validation, CustomUserError> + Clone {
    move |input: &str| {
        Ok(match parse_factor(input, mode) {
            Ok(_) => Validation::Valid,
            Err(e) => Validation::Invalid(e.to_string().into()),
        })
    }
}

fn validate_footprint(input: &str) -> Result<Validation, CustomUserError> {
    let input = input.trim();
    if input.is_empty() || Path::new(input).is_file() {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid(format!("{input} is not a file").into()))
    }
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

impl Prompter for InquirePrompter {
    fn footprint_path(&mut self) -> Result<Option<PathBuf>> {
        let answer = Text::new("Footprint to scale:")
            .with_help_message("Path to a .kicad_mod file, empty to quit")
            .with_validator(validate_footprint)
            .prompt();
        match answer {
            Ok(path) if path.trim().is_empty() => Ok(None),
            Ok(path) => Ok(Some(PathBuf::from(path.trim()))),
            Err(e) if is_cancel(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn scale_factor(&mut self, mode: FactorMode) -> Result<FactorInput> {
        let help = match mode {
            FactorMode::Strict => "e.g. 2.0 for double size",
            FactorMode::Batch => "e.g. 2.0 for double size, 0 to pick another file",
        };
        let answer = Text::new("Scale factor:")
            .with_help_message(help)
            .with_validator(validate_factor(mode))
            .prompt();
        match answer {
            Ok(input) => Ok(parse_factor(&input, mode)?),
            Err(e) if mode == FactorMode::Batch && is_cancel(&e) => Ok(FactorInput::Exit),
            Err(e) => Err(e.into()),
        }
    }

    fn save_path(&mut self, proposed: &Path) -> Result<Option<PathBuf>> {
        let default = proposed.display().to_string();
        let answer = Text::new("Save scaled footprint as:")
            .with_default(&default)
            .prompt();
        match answer {
            Ok(path) if path.trim().is_empty() => Ok(None),
            Ok(path) => Ok(Some(PathBuf::from(path.trim()))),
            Err(e) if is_cancel(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn confirm_overwrite(&mut self, path: &Path) -> Result<bool> {
        let answer = Confirm::new(&format!("{} already exists. Overwrite?", path.display()))
            .with_default(false)
            .prompt();
        match answer {
            Ok(yes) => Ok(yes),
            Err(e) if is_cancel(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
