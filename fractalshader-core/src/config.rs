//! Fractal configuration registry and session settings.

use crate::fractal::FractalKind;
use crate::params::RenderParameters;
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};

/// Per-fractal metadata and the hand-picked starting view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalConfig {
    pub kind: FractalKind,
    /// Human-readable name for UI display
    pub display_name: &'static str,
    /// Default centre (offset x, offset y)
    pub default_offset: (f64, f64),
    /// Default zoom in world units per screen height
    pub default_zoom: f64,
    /// Default complex parameter (re, im)
    pub default_param: (f64, f64),
}

impl FractalConfig {
    pub fn default_viewport(&self) -> Viewport {
        Viewport {
            offset_x: self.default_offset.0,
            offset_y: self.default_offset.1,
            zoom: self.default_zoom,
            param_re: self.default_param.0,
            param_im: self.default_param.1,
        }
    }
}

pub static FRACTAL_CONFIGS: &[FractalConfig] = &[
    FractalConfig {
        kind: FractalKind::Mandelbrot,
        display_name: "Mandelbrot Set",
        default_offset: (-0.5, 0.0),
        default_zoom: 2.5,
        default_param: (0.0, 0.0),
    },
    FractalConfig {
        kind: FractalKind::Julia,
        display_name: "Julia Set",
        default_offset: (0.0, 0.0),
        default_zoom: 2.5,
        default_param: (-0.8, 0.156),
    },
    FractalConfig {
        kind: FractalKind::Phoenix,
        display_name: "Phoenix",
        default_offset: (0.0, 0.0),
        default_zoom: 3.0,
        default_param: (0.5667, -0.5),
    },
    FractalConfig {
        kind: FractalKind::BurningShip,
        display_name: "Burning Ship",
        default_offset: (-0.45, -0.5),
        default_zoom: 2.5,
        default_param: (0.0, 0.0),
    },
    FractalConfig {
        kind: FractalKind::BurningShipJulia,
        display_name: "Burning Ship Julia",
        default_offset: (0.0, 0.0),
        default_zoom: 3.0,
        default_param: (1.755, 0.03),
    },
    FractalConfig {
        kind: FractalKind::Mandelbox,
        display_name: "Mandelbox",
        default_offset: (0.0, 0.0),
        default_zoom: 10.0,
        default_param: (-1.5, 0.0),
    },
    FractalConfig {
        kind: FractalKind::Mandelbar,
        display_name: "Mandelbar (Tricorn)",
        default_offset: (-0.25, 0.0),
        default_zoom: 3.0,
        default_param: (0.0, 0.0),
    },
    FractalConfig {
        kind: FractalKind::MandelbarJulia,
        display_name: "Mandelbar Julia",
        default_offset: (0.0, 0.0),
        default_zoom: 3.0,
        default_param: (-0.2, 0.9),
    },
];

/// Look up the configuration for a fractal kind.
pub fn get_config(kind: FractalKind) -> &'static FractalConfig {
    FRACTAL_CONFIGS
        .iter()
        .find(|config| config.kind == kind)
        .unwrap_or(&FRACTAL_CONFIGS[0])
}

/// Startup settings for a [`Session`](crate::session::Session).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSettings {
    pub params: RenderParameters,
    /// Animation ticks per second; 0 follows the display refresh.
    pub frame_rate: u32,
    /// Duration given to keyframes added from the current view.
    pub keyframe_duration_ms: u32,
    /// Pan step for keyboard navigation, as a fraction of the view height.
    pub pan_step: f64,
    /// Zoom factor per wheel notch or key press.
    pub zoom_step: f64,
    /// Parameter nudge per key press, relative to the zoom.
    pub param_step: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            params: RenderParameters::default(),
            frame_rate: 0,
            keyframe_duration_ms: 3000,
            pan_step: 0.1,
            zoom_step: 1.25,
            param_step: 0.001,
        }
    }
}
