//! Built-in colour maps and their GLSL rendering.
//!
//! A colour fragment runs inside `vec4 colorize(float escape)` with a
//! mutable `float v` (the escape value) and a `vec3 color` it must assign.
//! [`ColorMap::evaluate`] mirrors the emitted GLSL on the CPU.

use super::gamma::{display_ready, encode, linearize};
use crate::glsl::{float_literal, vec3_literal};
use std::fmt::Write;

/// How palette stops are converted before interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopEncoding {
    /// `channel / 255`, interpolated as-is.
    DisplayReady,
    /// Linearised with `^2.2`, interpolated, then re-encoded with `^(1/2.2)`.
    GammaCorrected,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorMap {
    /// Full-saturation hue rotation, period `1 / scale`.
    Hue { scale: f64 },
    /// Triangle wave between black and white, period `2 / scale`.
    Grayscale { scale: f64 },
    /// Cyclic piecewise-linear gradient through evenly spaced stops.
    Gradient {
        scale: f64,
        stops: &'static [[u8; 3]],
        encoding: StopEncoding,
    },
    /// Hard colour bands, no interpolation.
    Bands {
        scale: f64,
        bands: &'static [[u8; 3]],
    },
}

const CLASSIC: &[[u8; 3]] = &[
    [0, 7, 100],
    [32, 107, 203],
    [237, 255, 255],
    [255, 170, 0],
    [0, 2, 0],
];

const FIRE: &[[u8; 3]] = &[
    [0, 0, 0],
    [128, 0, 0],
    [255, 0, 0],
    [255, 128, 0],
    [255, 255, 0],
    [255, 255, 255],
];

const OCEAN: &[[u8; 3]] = &[
    [0, 0, 64],
    [0, 64, 128],
    [0, 128, 192],
    [64, 192, 255],
    [255, 255, 255],
];

const RAINBOW_FLAG: &[[u8; 3]] = &[
    [228, 3, 3],
    [255, 140, 0],
    [255, 237, 0],
    [0, 128, 38],
    [0, 77, 255],
    [117, 7, 135],
];

const TRANS_FLAG: &[[u8; 3]] = &[
    [91, 206, 250],
    [245, 169, 184],
    [255, 255, 255],
    [245, 169, 184],
    [91, 206, 250],
];

const BI_FLAG: &[[u8; 3]] = &[
    [214, 2, 112],
    [214, 2, 112],
    [155, 79, 150],
    [0, 56, 168],
    [0, 56, 168],
];

pub const HSV: ColorMap = ColorMap::Hue { scale: 0.01 };
pub const GRAYSCALE: ColorMap = ColorMap::Grayscale { scale: 0.05 };
pub const CLASSIC_GRADIENT: ColorMap = gradient(CLASSIC, StopEncoding::DisplayReady);
pub const CLASSIC_CORRECTED: ColorMap = gradient(CLASSIC, StopEncoding::GammaCorrected);
pub const FIRE_GRADIENT: ColorMap = gradient(FIRE, StopEncoding::DisplayReady);
pub const FIRE_CORRECTED: ColorMap = gradient(FIRE, StopEncoding::GammaCorrected);
pub const OCEAN_GRADIENT: ColorMap = gradient(OCEAN, StopEncoding::DisplayReady);
pub const OCEAN_CORRECTED: ColorMap = gradient(OCEAN, StopEncoding::GammaCorrected);
pub const RAINBOW_FLAG_BANDS: ColorMap = bands(RAINBOW_FLAG);
pub const TRANS_FLAG_BANDS: ColorMap = bands(TRANS_FLAG);
pub const BI_FLAG_BANDS: ColorMap = bands(BI_FLAG);

const fn gradient(stops: &'static [[u8; 3]], encoding: StopEncoding) -> ColorMap {
    ColorMap::Gradient {
        scale: 0.05,
        stops,
        encoding,
    }
}

const fn bands(bands: &'static [[u8; 3]]) -> ColorMap {
    ColorMap::Bands { scale: 0.05, bands }
}

impl ColorMap {
    /// Render the GLSL fragment for this map.
    pub fn to_formula(&self) -> String {
        let mut out = String::new();
        match *self {
            ColorMap::Hue { scale } => {
                let _ = writeln!(out, "v = mod(v * {}, 1.0);", float_literal(scale));
                out.push_str(
                    "color = clamp(abs(mod(vec3(v * 6.0) + vec3(0.0, 4.0, 2.0), vec3(6.0)) - vec3(3.0)) - vec3(1.0), vec3(0.0), vec3(1.0));\n",
                );
            }
            ColorMap::Grayscale { scale } => {
                let _ = writeln!(out, "v = mod(v * {}, 2.0);", float_literal(scale));
                out.push_str("if (v > 1.0) {\n    v = 2.0 - v;\n}\n");
                out.push_str("color = vec3(v);\n");
            }
            ColorMap::Gradient {
                scale,
                stops,
                encoding,
            } => write_gradient(&mut out, scale, stops, encoding),
            ColorMap::Bands { scale, bands } => write_bands(&mut out, scale, bands),
        }
        out
    }

    /// Evaluate the map for an escape value, exactly as the GLSL does.
    pub fn evaluate(&self, v: f64) -> [f64; 3] {
        match *self {
            ColorMap::Hue { scale } => {
                let h = glsl_mod(v * scale, 1.0) * 6.0;
                [0.0, 4.0, 2.0].map(|offset| {
                    ((glsl_mod(h + offset, 6.0) - 3.0).abs() - 1.0).clamp(0.0, 1.0)
                })
            }
            ColorMap::Grayscale { scale } => {
                let mut v = glsl_mod(v * scale, 2.0);
                if v > 1.0 {
                    v = 2.0 - v;
                }
                [v, v, v]
            }
            ColorMap::Gradient {
                scale,
                stops,
                encoding,
            } => {
                let v = glsl_mod(v * scale, 1.0);
                let n = stops.len();
                let segment = ((v * n as f64) as usize).min(n - 1);
                let t = (v - segment as f64 / n as f64) * n as f64;
                let from = convert(stops[segment], encoding);
                let to = convert(stops[(segment + 1) % n], encoding);
                let color: [f64; 3] = std::array::from_fn(|i| from[i] + (to[i] - from[i]) * t);
                match encoding {
                    StopEncoding::DisplayReady => color,
                    StopEncoding::GammaCorrected => color.map(encode),
                }
            }
            ColorMap::Bands { scale, bands } => {
                let v = glsl_mod(v * scale, 1.0);
                let band = ((v * bands.len() as f64) as usize).min(bands.len() - 1);
                bands[band].map(display_ready)
            }
        }
    }
}

/// GLSL `mod`: `x - y * floor(x / y)`, always non-negative for positive `y`.
fn glsl_mod(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

fn convert(rgb: [u8; 3], encoding: StopEncoding) -> [f64; 3] {
    match encoding {
        StopEncoding::DisplayReady => rgb.map(display_ready),
        StopEncoding::GammaCorrected => rgb.map(linearize),
    }
}

fn write_gradient(out: &mut String, scale: f64, stops: &[[u8; 3]], encoding: StopEncoding) {
    let n = stops.len();
    let width = 1.0 / n as f64;
    let _ = writeln!(out, "v = mod(v * {}, 1.0);", float_literal(scale));
    out.push_str("float t;\n");
    for segment in 0..n {
        let left = segment as f64 * width;
        let from = vec3_literal(convert(stops[segment], encoding));
        let to = vec3_literal(convert(stops[(segment + 1) % n], encoding));
        if segment > 0 {
            out.push_str(" else ");
        }
        if segment + 1 < n {
            let right = (segment + 1) as f64 * width;
            let _ = write!(out, "if (v < {}) {{\n", float_literal(right));
        } else {
            out.push_str("{\n");
        }
        if segment == 0 {
            let _ = writeln!(out, "    t = v * {};", float_literal(n as f64));
        } else {
            let _ = writeln!(
                out,
                "    t = (v - {}) * {};",
                float_literal(left),
                float_literal(n as f64)
            );
        }
        let _ = writeln!(out, "    color = mix({from}, {to}, t);");
        out.push('}');
    }
    out.push('\n');
    if encoding == StopEncoding::GammaCorrected {
        out.push_str("color = pow(color, vec3(1.0 / 2.2));\n");
    }
}

fn write_bands(out: &mut String, scale: f64, bands: &[[u8; 3]]) {
    let n = bands.len();
    let _ = writeln!(out, "v = mod(v * {}, 1.0);", float_literal(scale));
    for (index, band) in bands.iter().enumerate() {
        if index > 0 {
            out.push_str(" else ");
        }
        if index + 1 < n {
            let edge = (index + 1) as f64 / n as f64;
            let _ = write!(out, "if (v < {}) {{\n", float_literal(edge));
        } else {
            out.push_str("{\n");
        }
        let _ = writeln!(out, "    color = {};", vec3_literal(band.map(display_ready)));
        out.push('}');
    }
    out.push('\n');
}
