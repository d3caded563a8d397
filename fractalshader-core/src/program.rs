//! Pixel-program generation.
//!
//! [`PixelProgram`] is the intermediate form: loop bound, recurrence,
//! escape test, escape-value mode, colour fragment and sample grid. It is
//! rendered to GLSL in a single `Display` pass. Generation is pure; the
//! same inputs always give byte-identical text.
//!
//! Generated programs target `#version 450` as accepted by wgpu/naga:
//! one uniform block at set 0 binding 0 and a single colour output.

use crate::color::ColorFormula;
use crate::fractal::{FractalKind, IterationScheme};
use crate::glsl::float_literal;
use crate::params::RenderParameters;
use std::fmt;

/// Fixed vertex stage: one triangle covering the whole surface.
pub const VERTEX_SHADER: &str = "#version 450

void main() {
    float x = float((gl_VertexIndex & 1) << 2) - 1.0;
    float y = float((gl_VertexIndex & 2) << 1) - 1.0;
    gl_Position = vec4(x, y, 0.0, 1.0);
}
";

/// Generated GLSL source text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramSource(String);

impl ProgramSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ProgramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the continuous escape value `v` is derived on escape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscapeValue {
    /// `v = i + 1`
    Discrete,
    /// `v = i + 1 - log(log(d)) / log(2)`, `d` the squared magnitude at escape.
    Smooth,
}

impl EscapeValue {
    pub fn from_smoothing(smoothing: bool) -> Self {
        if smoothing {
            EscapeValue::Smooth
        } else {
            EscapeValue::Discrete
        }
    }

    /// CPU evaluation of the escape value for iteration index `iteration`
    /// and squared magnitude `d`.
    pub fn evaluate(self, iteration: u32, d: f64) -> f64 {
        let base = (iteration + 1) as f64;
        match self {
            EscapeValue::Discrete => base,
            EscapeValue::Smooth => base - d.ln().ln() / 2f64.ln(),
        }
    }
}

/// Structured form of a pixel program, prior to text rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelProgram {
    pub kind: FractalKind,
    pub scheme: &'static IterationScheme,
    pub loop_bound: u32,
    pub escape_radius_sq: f64,
    pub escape_value: EscapeValue,
    pub color: String,
    /// Samples per axis; 1 disables supersampling.
    pub supersampling: u32,
}

impl PixelProgram {
    pub fn new(
        kind: FractalKind,
        iteration_cap: u32,
        escape_threshold: f64,
        color: &ColorFormula,
        smoothing: bool,
    ) -> Self {
        Self {
            kind,
            scheme: kind.scheme(),
            loop_bound: iteration_cap,
            escape_radius_sq: escape_threshold * escape_threshold,
            escape_value: EscapeValue::from_smoothing(smoothing),
            color: color.source(),
            supersampling: 1,
        }
    }

    pub fn with_supersampling(mut self, samples_per_axis: u32) -> Self {
        self.supersampling = samples_per_axis.max(1);
        self
    }

    pub fn from_params(params: &RenderParameters) -> Self {
        Self::new(
            params.kind,
            params.iteration_cap,
            params.escape_threshold,
            &params.color,
            params.smoothing,
        )
        .with_supersampling(params.supersampling)
    }

    pub fn render(&self) -> ProgramSource {
        ProgramSource(self.to_string())
    }

    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#version 450")?;
        writeln!(f, "// {}", self.kind)?;
        writeln!(f)?;
        writeln!(f, "layout(location = 0) out vec4 outColor;")?;
        writeln!(f)?;
        writeln!(f, "layout(set = 0, binding = 0) uniform FractalUniforms {{")?;
        writeln!(f, "    vec2 canvasSize;")?;
        writeln!(f, "    vec2 c;")?;
        writeln!(f, "    vec3 viewport;")?;
        writeln!(f, "}};")?;
        writeln!(f)
    }

    fn write_colorize(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vec4 colorize(float escape) {{")?;
        writeln!(f, "    float v = escape;")?;
        writeln!(f, "    vec3 color = vec3(0.0, 0.0, 0.0);")?;
        for line in self.color.lines() {
            if line.trim().is_empty() {
                writeln!(f)?;
            } else {
                writeln!(f, "    {line}")?;
            }
        }
        writeln!(f, "    return vec4(color, 1.0);")?;
        writeln!(f, "}}")?;
        writeln!(f)
    }

    fn write_evaluate(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vec4 evaluate(vec2 pos) {{")?;
        writeln!(f, "    float x = pos.x;")?;
        writeln!(f, "    float y = pos.y;")?;
        for statement in self.scheme.init {
            writeln!(f, "    {statement}")?;
        }
        writeln!(
            f,
            "    for (int i = 0; i < {}; ++i) {{",
            self.loop_bound
        )?;
        writeln!(f, "        float d = z.x * z.x + z.y * z.y;")?;
        writeln!(
            f,
            "        if (d >= {}) {{",
            float_literal(self.escape_radius_sq)
        )?;
        match self.escape_value {
            EscapeValue::Discrete => {
                writeln!(f, "            return colorize(float(i + 1));")?;
            }
            EscapeValue::Smooth => {
                writeln!(
                    f,
                    "            return colorize(float(i + 1) - log(log(d)) / log(2.0));"
                )?;
            }
        }
        writeln!(f, "        }}")?;
        for statement in self.scheme.step {
            writeln!(f, "        {statement}")?;
        }
        writeln!(f, "    }}")?;
        writeln!(f, "    return vec4(0.0, 0.0, 0.0, 1.0);")?;
        writeln!(f, "}}")?;
        writeln!(f)
    }

    fn write_main(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "void main() {{")?;
        // gl_FragCoord has a top-left origin here; the viewport origin is bottom-left.
        writeln!(
            f,
            "    vec2 pixel = vec2(gl_FragCoord.x, canvasSize.y - gl_FragCoord.y);"
        )?;
        writeln!(f, "    float scale = viewport.z / canvasSize.y;")?;
        if self.supersampling <= 1 {
            writeln!(f, "    outColor = evaluate(viewport.xy + pixel * scale);")?;
        } else {
            let n = self.supersampling;
            let samples = float_literal(n as f64);
            writeln!(f, "    vec4 sum = vec4(0.0, 0.0, 0.0, 0.0);")?;
            writeln!(f, "    for (int sy = 0; sy < {n}; ++sy) {{")?;
            writeln!(f, "        for (int sx = 0; sx < {n}; ++sx) {{")?;
            writeln!(
                f,
                "            vec2 offset = (vec2(float(sx), float(sy)) + vec2(0.5, 0.5)) / {samples} - vec2(0.5, 0.5);"
            )?;
            writeln!(
                f,
                "            sum = sum + evaluate(viewport.xy + (pixel + offset) * scale);"
            )?;
            writeln!(f, "        }}")?;
            writeln!(f, "    }}")?;
            writeln!(
                f,
                "    outColor = sum / {};",
                float_literal((n * n) as f64)
            )?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for PixelProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        self.write_colorize(f)?;
        self.write_evaluate(f)?;
        self.write_main(f)
    }
}

/// Generate the fragment program for a fractal.
pub fn generate_program(
    kind: FractalKind,
    iteration_cap: u32,
    escape_threshold: f64,
    color: &ColorFormula,
    smoothing: bool,
) -> ProgramSource {
    PixelProgram::new(kind, iteration_cap, escape_threshold, color, smoothing).render()
}
