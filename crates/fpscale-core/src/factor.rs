use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorError {
    #[error("'{0}' is not a valid number")]
    NotANumber(String),
    #[error("scale factor must be finite, got {0}")]
    NotFinite(f64),
    #[error("scale factor must be positive, got {0}")]
    NotPositive(f64),
    #[error("scale factor cannot be negative, got {0} (enter 0 to pick another file)")]
    Negative(f64),
}

/// A multiplicative factor applied to every coordinate and dimension of a
/// footprint. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(value: f64) -> Result<Self, FactorError> {
        if !value.is_finite() {
            return Err(FactorError::NotFinite(value));
        }
        if value <= 0.0 {
            return Err(FactorError::NotPositive(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn apply(self, value: f64) -> f64 {
        value * self.0
    }
}

impl FromStr for ScaleFactor {
    type Err = FactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_strict_factor(s)
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How user-entered factors are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorMode {
    /// Single-shot use: anything `<= 0` is rejected.
    Strict,
    /// Repeat loop: `0` means "done with this file", negatives are rejected.
    Batch,
}

/// Outcome of a factor prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactorInput {
    Scale(ScaleFactor),
    Exit,
}

pub fn parse_factor(input: &str, mode: FactorMode) -> Result<FactorInput, FactorError> {
    let value = parse_number(input)?;
    match mode {
        FactorMode::Strict => ScaleFactor::new(value).map(FactorInput::Scale),
        FactorMode::Batch if value == 0.0 => Ok(FactorInput::Exit),
        FactorMode::Batch if value < 0.0 => Err(FactorError::Negative(value)),
        FactorMode::Batch => ScaleFactor::new(value).map(FactorInput::Scale),
    }
}

/// Parse a factor for single-shot use. Usable directly as a clap value parser.
pub fn parse_strict_factor(input: &str) -> Result<ScaleFactor, FactorError> {
    ScaleFactor::new(parse_number(input)?)
}

fn parse_number(input: &str) -> Result<f64, FactorError> {
    let trimmed = input.trim();
    trimmed
        .parse()
        .map_err(|_| FactorError::NotANumber(trimmed.to_string()))
}
