//! Colour mapping: turns the continuous escape value into an RGB colour.
//!
//! Built-in schemes are looked up by identifier; custom formula text and
//! imported GIMP gradients bypass the table and are spliced into the
//! generated program verbatim.

pub mod gamma;
pub mod ggr;
pub mod palette;

use crate::error::GgrError;
use palette::ColorMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use ggr::{parse_ggr, Gradient, GradientSegment};
pub use palette::StopEncoding;

/// Built-in colour schemes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorScheme {
    #[default]
    Hsv,
    Grayscale,
    Classic,
    ClassicCorrected,
    Fire,
    FireCorrected,
    Ocean,
    OceanCorrected,
    RainbowFlag,
    TransFlag,
    BiFlag,
}

pub const DEFAULT_COLOR_SCHEME: ColorScheme = ColorScheme::Hsv;

impl ColorScheme {
    pub const ALL: [ColorScheme; 11] = [
        ColorScheme::Hsv,
        ColorScheme::Grayscale,
        ColorScheme::Classic,
        ColorScheme::ClassicCorrected,
        ColorScheme::Fire,
        ColorScheme::FireCorrected,
        ColorScheme::Ocean,
        ColorScheme::OceanCorrected,
        ColorScheme::RainbowFlag,
        ColorScheme::TransFlag,
        ColorScheme::BiFlag,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ColorScheme::Hsv => "hsv",
            ColorScheme::Grayscale => "grayscale",
            ColorScheme::Classic => "classic",
            ColorScheme::ClassicCorrected => "classicCorrected",
            ColorScheme::Fire => "fire",
            ColorScheme::FireCorrected => "fireCorrected",
            ColorScheme::Ocean => "ocean",
            ColorScheme::OceanCorrected => "oceanCorrected",
            ColorScheme::RainbowFlag => "rainbowFlag",
            ColorScheme::TransFlag => "transFlag",
            ColorScheme::BiFlag => "biFlag",
        }
    }

    pub fn color_map(self) -> ColorMap {
        match self {
            ColorScheme::Hsv => palette::HSV,
            ColorScheme::Grayscale => palette::GRAYSCALE,
            ColorScheme::Classic => palette::CLASSIC_GRADIENT,
            ColorScheme::ClassicCorrected => palette::CLASSIC_CORRECTED,
            ColorScheme::Fire => palette::FIRE_GRADIENT,
            ColorScheme::FireCorrected => palette::FIRE_CORRECTED,
            ColorScheme::Ocean => palette::OCEAN_GRADIENT,
            ColorScheme::OceanCorrected => palette::OCEAN_CORRECTED,
            ColorScheme::RainbowFlag => palette::RAINBOW_FLAG_BANDS,
            ColorScheme::TransFlag => palette::TRANS_FLAG_BANDS,
            ColorScheme::BiFlag => palette::BI_FLAG_BANDS,
        }
    }

    pub fn formula(self) -> String {
        self.color_map().to_formula()
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColorScheme(pub String);

impl fmt::Display for UnknownColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown color scheme: {}", self.0)
    }
}

impl std::error::Error for UnknownColorScheme {}

impl FromStr for ColorScheme {
    type Err = UnknownColorScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::ALL
            .into_iter()
            .find(|scheme| scheme.id() == s)
            .ok_or_else(|| UnknownColorScheme(s.to_string()))
    }
}

impl ColorScheme {
    /// Resolve an identifier, falling back to [`DEFAULT_COLOR_SCHEME`].
    pub fn from_id_or_default(id: &str) -> ColorScheme {
        id.parse().unwrap_or_else(|_| {
            log::warn!("Unknown color scheme {id:?}, falling back to {DEFAULT_COLOR_SCHEME}");
            DEFAULT_COLOR_SCHEME
        })
    }
}

/// Look up a built-in scheme's formula, falling back to
/// [`DEFAULT_COLOR_SCHEME`] for unknown identifiers.
pub fn resolve_color_formula(id: &str) -> String {
    ColorScheme::from_id_or_default(id).formula()
}

/// The colour stage of a render: a table entry or literal GLSL text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorFormula {
    Scheme(ColorScheme),
    /// Spliced into the program as-is. Errors surface only at compile time.
    Custom(String),
}

impl Default for ColorFormula {
    fn default() -> Self {
        ColorFormula::Scheme(DEFAULT_COLOR_SCHEME)
    }
}

impl ColorFormula {
    /// Build a formula from a GIMP gradient file.
    pub fn from_ggr(text: &str, reverse: bool) -> Result<Self, GgrError> {
        let gradient = parse_ggr(text)?;
        Ok(ColorFormula::Custom(gradient.to_formula(reverse)?))
    }

    pub fn source(&self) -> String {
        match self {
            ColorFormula::Scheme(scheme) => scheme.formula(),
            ColorFormula::Custom(text) => text.clone(),
        }
    }
}
