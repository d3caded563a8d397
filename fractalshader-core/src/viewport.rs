use crate::config::get_config;
use crate::error::{FractalError, Result};
use crate::fractal::FractalKind;
use serde::{Deserialize, Serialize};

/// Navigable camera state.
///
/// - `offset_x`, `offset_y`: centre of the view in the complex plane
/// - `zoom`: visible height in world units (doubling it halves magnification)
/// - `param_re`, `param_im`: the complex parameter `c`
///
/// Every mutator validates its result and leaves `self` untouched on
/// failure, so the viewport never holds a non-finite value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub zoom: f64,
    pub param_re: f64,
    pub param_im: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::for_kind(FractalKind::default())
    }
}

impl Viewport {
    /// The hand-picked starting view for a fractal kind.
    pub fn for_kind(kind: FractalKind) -> Self {
        get_config(kind).default_viewport()
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("offset_x", self.offset_x),
            ("offset_y", self.offset_y),
            ("zoom", self.zoom),
            ("param_re", self.param_re),
            ("param_im", self.param_im),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(FractalError::InvalidParameter(format!(
                "{name} is not finite ({value})"
            )));
        }
        if self.zoom <= 0.0 {
            return Err(FractalError::InvalidParameter(format!(
                "zoom must be positive ({})",
                self.zoom
            )));
        }
        Ok(())
    }

    /// Replace `self` with `candidate` if it is valid.
    fn commit(&mut self, candidate: Viewport) -> Result<()> {
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Pan by a screen-space delta. Screen y grows downwards, world y upwards.
    pub fn pan_by(&mut self, dx_screen: f64, dy_screen: f64, surface_height: f64) -> Result<()> {
        self.commit(Viewport {
            offset_x: self.offset_x - dx_screen / surface_height * self.zoom,
            offset_y: self.offset_y + dy_screen / surface_height * self.zoom,
            ..*self
        })
    }

    /// Change the zoom while keeping the world point under
    /// `(screen_x, screen_y)` fixed.
    pub fn zoom_around(
        &mut self,
        screen_x: f64,
        screen_y: f64,
        surface_width: f64,
        surface_height: f64,
        new_zoom: f64,
    ) -> Result<()> {
        let from_center_x = (screen_x - surface_width * 0.5) / surface_height;
        let from_center_y = (surface_height * 0.5 - screen_y) / surface_height;
        let delta = self.zoom - new_zoom;
        self.commit(Viewport {
            offset_x: self.offset_x + from_center_x * delta,
            offset_y: self.offset_y + from_center_y * delta,
            zoom: new_zoom,
            ..*self
        })
    }

    /// Multiply the zoom by `factor` around a screen point.
    /// Factors above 1 zoom out.
    pub fn zoom_by(
        &mut self,
        factor: f64,
        screen_x: f64,
        screen_y: f64,
        surface_width: f64,
        surface_height: f64,
    ) -> Result<()> {
        self.zoom_around(
            screen_x,
            screen_y,
            surface_width,
            surface_height,
            self.zoom * factor,
        )
    }

    pub fn nudge_param(&mut self, d_real: f64, d_imag: f64) -> Result<()> {
        self.commit(Viewport {
            param_re: self.param_re + d_real,
            param_im: self.param_im + d_imag,
            ..*self
        })
    }

    pub fn reset_to_default(&mut self, kind: FractalKind) {
        *self = Viewport::for_kind(kind);
    }

    /// The complex-plane point under a screen pixel.
    pub fn world_at(
        &self,
        screen_x: f64,
        screen_y: f64,
        surface_width: f64,
        surface_height: f64,
    ) -> (f64, f64) {
        let x = self.offset_x + (screen_x - surface_width * 0.5) / surface_height * self.zoom;
        let y = self.offset_y + (surface_height * 0.5 - screen_y) / surface_height * self.zoom;
        (x, y)
    }

    /// The three viewport uniforms: bottom-left origin and zoom.
    pub fn shader_uniforms(&self, surface_width: f64, surface_height: f64) -> [f64; 3] {
        [
            self.offset_x - 0.5 * (surface_width / surface_height) * self.zoom,
            self.offset_y - 0.5 * self.zoom,
            self.zoom,
        ]
    }

    /// Linear interpolation of all five fields.
    pub fn lerp(&self, other: &Viewport, t: f64) -> Viewport {
        let mix = |a: f64, b: f64| a * (1.0 - t) + b * t;
        Viewport {
            offset_x: mix(self.offset_x, other.offset_x),
            offset_y: mix(self.offset_y, other.offset_y),
            zoom: mix(self.zoom, other.zoom),
            param_re: mix(self.param_re, other.param_re),
            param_im: mix(self.param_im, other.param_im),
        }
    }
}
