//! Render parameters and their validation.

use crate::color::ColorFormula;
use crate::error::{FractalError, Result};
use crate::fractal::FractalKind;
use serde::{Deserialize, Serialize};

pub const MAX_ITERATION_CAP: u32 = 10_000;
pub const MAX_ESCAPE_THRESHOLD: f64 = 10_000.0;
pub const MAX_SUPERSAMPLING: u32 = 4;

pub const DEFAULT_ITERATION_CAP: u32 = 500;
pub const DEFAULT_ESCAPE_THRESHOLD: f64 = 4.0;

/// Everything that determines the generated pixel program.
///
/// Changing any field invalidates the compiled program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParameters {
    pub kind: FractalKind,
    pub iteration_cap: u32,
    pub escape_threshold: f64,
    pub smoothing: bool,
    pub color: ColorFormula,
    #[serde(default = "default_supersampling")]
    pub supersampling: u32,
}

fn default_supersampling() -> u32 {
    1
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            kind: FractalKind::default(),
            iteration_cap: DEFAULT_ITERATION_CAP,
            escape_threshold: DEFAULT_ESCAPE_THRESHOLD,
            smoothing: true,
            color: ColorFormula::default(),
            supersampling: 1,
        }
    }
}

impl RenderParameters {
    /// Check every invariant, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        validate_iteration_cap(self.iteration_cap)?;
        validate_escape_threshold(self.escape_threshold)?;
        validate_supersampling(self.supersampling)
    }

    pub fn with_kind(&self, kind: FractalKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }

    pub fn with_iteration_cap(&self, iteration_cap: u32) -> Result<Self> {
        validate_iteration_cap(iteration_cap)?;
        Ok(Self {
            iteration_cap,
            ..self.clone()
        })
    }

    pub fn with_escape_threshold(&self, escape_threshold: f64) -> Result<Self> {
        validate_escape_threshold(escape_threshold)?;
        Ok(Self {
            escape_threshold,
            ..self.clone()
        })
    }

    pub fn with_smoothing(&self, smoothing: bool) -> Self {
        Self {
            smoothing,
            ..self.clone()
        }
    }

    pub fn with_color(&self, color: ColorFormula) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }

    pub fn with_supersampling(&self, supersampling: u32) -> Result<Self> {
        validate_supersampling(supersampling)?;
        Ok(Self {
            supersampling,
            ..self.clone()
        })
    }
}

fn validate_iteration_cap(value: u32) -> Result<()> {
    if (1..=MAX_ITERATION_CAP).contains(&value) {
        Ok(())
    } else {
        Err(FractalError::InvalidParameter(format!(
            "iteration cap {value} outside [1, {MAX_ITERATION_CAP}]"
        )))
    }
}

fn validate_escape_threshold(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= MAX_ESCAPE_THRESHOLD {
        Ok(())
    } else {
        Err(FractalError::InvalidParameter(format!(
            "escape threshold {value} outside (0, {MAX_ESCAPE_THRESHOLD}]"
        )))
    }
}

fn validate_supersampling(value: u32) -> Result<()> {
    if (1..=MAX_SUPERSAMPLING).contains(&value) {
        Ok(())
    } else {
        Err(FractalError::InvalidParameter(format!(
            "supersampling {value} outside [1, {MAX_SUPERSAMPLING}]"
        )))
    }
}
