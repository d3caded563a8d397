//! Escape-time fractal formulas.
//!
//! Each [`FractalKind`] maps to an [`IterationScheme`]: the GLSL statements
//! that set up the orbit and advance it by one step. The program generator
//! wraps these in the escape loop, so a scheme never tests for escape itself.
//!
//! Names available to the statements:
//! - `x`, `y`: the pixel's complex coordinate
//! - `c`: the navigable complex parameter (uniform)
//! - `z`: the orbit, a `vec2` (re, im) that must be declared by `init`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported fractal families.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FractalKind {
    #[default]
    Mandelbrot,
    Julia,
    Phoenix,
    BurningShip,
    BurningShipJulia,
    Mandelbox,
    Mandelbar,
    MandelbarJulia,
}

/// How a fractal uses the complex parameter `c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamUsage {
    /// `c` is ignored.
    Unused,
    /// Both components of `c` feed the recurrence.
    Complex,
    /// Only `c.x` is read, as a scale factor.
    ScaleOnly,
}

/// GLSL fragments describing one fractal's recurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterationScheme {
    /// Statements run once before the loop. Must declare `vec2 z`.
    pub init: &'static [&'static str],
    /// Statements run once per iteration, after the escape test.
    pub step: &'static [&'static str],
    pub param: ParamUsage,
}

static MANDELBROT: IterationScheme = IterationScheme {
    init: &["vec2 z = vec2(0.0, 0.0);"],
    step: &["z = vec2(z.x * z.x - z.y * z.y + x, 2.0 * z.x * z.y + y);"],
    param: ParamUsage::Unused,
};

static JULIA: IterationScheme = IterationScheme {
    init: &["vec2 z = vec2(x, y);"],
    step: &["z = vec2(z.x * z.x - z.y * z.y + c.x, 2.0 * z.x * z.y + c.y);"],
    param: ParamUsage::Complex,
};

// z' = z^2 + Re(c) + Im(c) * z_prev
static PHOENIX: IterationScheme = IterationScheme {
    init: &["vec2 z = vec2(y, x);", "vec2 zPrev = vec2(0.0, 0.0);"],
    step: &[
        "vec2 zNext = vec2(z.x * z.x - z.y * z.y + c.x + c.y * zPrev.x, 2.0 * z.x * z.y + c.y * zPrev.y);",
        "zPrev = z;",
        "z = zNext;",
    ],
    param: ParamUsage::Complex,
};

static BURNING_SHIP: IterationScheme = IterationScheme {
    init: &["vec2 z = vec2(0.0, 0.0);"],
    step: &["z = vec2(z.x * z.x - z.y * z.y + x, 2.0 * abs(z.x) * abs(z.y) + y);"],
    param: ParamUsage::Unused,
};

static BURNING_SHIP_JULIA: IterationScheme = IterationScheme {
    init: &["vec2 z = vec2(x, -y);"],
    step: &["z = vec2(z.x * z.x - z.y * z.y - c.x, 2.0 * abs(z.x) * abs(z.y) - c.y);"],
    param: ParamUsage::Complex,
};

// Box fold, sphere fold, then scale by c.x and translate by the pixel.
static MANDELBOX: IterationScheme = IterationScheme {
    init: &["vec2 z = vec2(0.0, 0.0);"],
    step: &[
        "if (z.x > 1.0) { z.x = 2.0 - z.x; } else if (z.x < -1.0) { z.x = -2.0 - z.x; }",
        "if (z.y > 1.0) { z.y = 2.0 - z.y; } else if (z.y < -1.0) { z.y = -2.0 - z.y; }",
        "float m = z.x * z.x + z.y * z.y;",
        "if (m < 0.25) { z = z * 4.0; } else if (m < 1.0) { z = z / m; }",
        "z = z * c.x + vec2(x, y);",
    ],
    param: ParamUsage::ScaleOnly,
};

static MANDELBAR: IterationScheme = IterationScheme {
    init: &["vec2 z = vec2(0.0, 0.0);"],
    step: &["z = vec2(z.x * z.x - z.y * z.y + x, -2.0 * z.x * z.y + y);"],
    param: ParamUsage::Unused,
};

static MANDELBAR_JULIA: IterationScheme = IterationScheme {
    init: &["vec2 z = vec2(x, y);"],
    step: &["z = vec2(z.x * z.x - z.y * z.y + c.x, -2.0 * z.x * z.y + c.y);"],
    param: ParamUsage::Complex,
};

impl FractalKind {
    pub const ALL: [FractalKind; 8] = [
        FractalKind::Mandelbrot,
        FractalKind::Julia,
        FractalKind::Phoenix,
        FractalKind::BurningShip,
        FractalKind::BurningShipJulia,
        FractalKind::Mandelbox,
        FractalKind::Mandelbar,
        FractalKind::MandelbarJulia,
    ];

    /// Stable identifier used in persisted state and URLs.
    pub fn id(self) -> &'static str {
        match self {
            FractalKind::Mandelbrot => "mandelbrot",
            FractalKind::Julia => "julia",
            FractalKind::Phoenix => "phoenix",
            FractalKind::BurningShip => "burningShip",
            FractalKind::BurningShipJulia => "burningShipJulia",
            FractalKind::Mandelbox => "mandelbox",
            FractalKind::Mandelbar => "mandelbar",
            FractalKind::MandelbarJulia => "mandelbarJulia",
        }
    }

    /// Resolve an identifier, falling back to [`FractalKind::Mandelbrot`]
    /// for anything unrecognised.
    pub fn from_id_or_default(id: &str) -> FractalKind {
        match id.parse() {
            Ok(kind) => kind,
            Err(UnknownFractalKind(id)) => {
                log::warn!("Unknown fractal kind {id:?}, falling back to mandelbrot");
                FractalKind::default()
            }
        }
    }

    pub fn scheme(self) -> &'static IterationScheme {
        match self {
            FractalKind::Mandelbrot => &MANDELBROT,
            FractalKind::Julia => &JULIA,
            FractalKind::Phoenix => &PHOENIX,
            FractalKind::BurningShip => &BURNING_SHIP,
            FractalKind::BurningShipJulia => &BURNING_SHIP_JULIA,
            FractalKind::Mandelbox => &MANDELBOX,
            FractalKind::Mandelbar => &MANDELBAR,
            FractalKind::MandelbarJulia => &MANDELBAR_JULIA,
        }
    }

    /// Whether the complex parameter is a navigable input for this kind.
    pub fn uses_param(self) -> bool {
        self.scheme().param != ParamUsage::Unused
    }
}

impl fmt::Display for FractalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFractalKind(pub String);

impl fmt::Display for UnknownFractalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown fractal kind: {}", self.0)
    }
}

impl std::error::Error for UnknownFractalKind {}

impl FromStr for FractalKind {
    type Err = UnknownFractalKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FractalKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| UnknownFractalKind(s.to_string()))
    }
}
