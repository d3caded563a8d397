//! Render-loop driver.
//!
//! A [`Session`] owns all mutable state: render parameters, the last good
//! compiled program, viewport, keyframes and the playback state machine.
//! Hosts forward input events and scheduler callbacks to it; nothing is
//! global. Everything runs to completion on the caller's thread.

use crate::animation::{Animation, AnimationPlayer, FrameSchedule, Keyframe};
use crate::color::{ColorFormula, ColorScheme};
use crate::config::SessionSettings;
use crate::error::{FractalError, Result};
use crate::fractal::FractalKind;
use crate::params::RenderParameters;
use crate::persistence::PersistedState;
use crate::program::{PixelProgram, ProgramSource, VERTEX_SHADER};
use crate::viewport::Viewport;

/// Turns program text into something drawable.
pub trait ShaderCompiler {
    type Program;

    /// Compile the fixed vertex stage and a generated fragment stage.
    /// Errors carry a human-readable diagnostic.
    fn compile(
        &mut self,
        vertex: &str,
        fragment: &ProgramSource,
    ) -> std::result::Result<Self::Program, String>;
}

/// Uniform values for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub canvas_size: [f64; 2],
    /// Bottom-left origin and zoom, see [`Viewport::shader_uniforms`].
    pub viewport: [f64; 3],
    /// The complex parameter, for kinds that read it.
    pub param: Option<[f64; 2]>,
}

/// Target the program draws into.
pub trait RenderSurface {
    type Program;

    fn set_surface_size(&mut self, width: u32, height: u32);
    fn set_uniforms(&mut self, uniforms: &FrameUniforms);
    fn draw_full_surface(&mut self, program: &Self::Program);
}

/// Arms the next animation tick. The host calls [`Session::on_tick`] when it fires.
pub trait Scheduler {
    fn request_tick(&mut self, schedule: FrameSchedule);
}

/// Direction of playback over the recorded keyframes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackMode {
    #[default]
    Forward,
    Reverse,
    /// Forward then backward. Always loops.
    PingPong,
}

pub struct Session<C, S, K>
where
    C: ShaderCompiler,
    S: RenderSurface<Program = C::Program>,
    K: Scheduler,
{
    compiler: C,
    surface: S,
    scheduler: K,
    settings: SessionSettings,
    params: RenderParameters,
    program: C::Program,
    source: ProgramSource,
    viewport: Viewport,
    animation: Animation,
    player: AnimationPlayer,
    surface_size: Option<(u32, u32)>,
}

fn compile_params<C: ShaderCompiler>(
    compiler: &mut C,
    params: &RenderParameters,
) -> Result<(C::Program, ProgramSource)> {
    params.validate()?;
    let source = PixelProgram::from_params(params).render();
    match compiler.compile(VERTEX_SHADER, &source) {
        Ok(program) => {
            log::info!(
                "Compiled {} program ({} bytes)",
                params.kind,
                source.as_str().len()
            );
            Ok((program, source))
        }
        Err(diagnostic) => {
            log::warn!("Shader compilation failed for {}: {}", params.kind, diagnostic);
            Err(FractalError::CompileFailure(diagnostic))
        }
    }
}

impl<C, S, K> Session<C, S, K>
where
    C: ShaderCompiler,
    S: RenderSurface<Program = C::Program>,
    K: Scheduler,
{
    /// Compile the initial program and start at the kind's default view.
    ///
    /// Fails if the settings are invalid or the initial program does not
    /// compile, since there is no previous program to fall back to.
    pub fn new(mut compiler: C, surface: S, scheduler: K, settings: SessionSettings) -> Result<Self> {
        let params = settings.params.clone();
        let (program, source) = compile_params(&mut compiler, &params)?;
        Ok(Self {
            compiler,
            surface,
            scheduler,
            viewport: Viewport::for_kind(params.kind),
            settings,
            params,
            program,
            source,
            animation: Animation::new(),
            player: AnimationPlayer::new(),
            surface_size: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn params(&self) -> &RenderParameters {
        &self.params
    }

    /// Source of the program currently in use.
    pub fn source(&self) -> &ProgramSource {
        &self.source
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface_size
    }

    pub fn is_animating(&self) -> bool {
        self.player.is_animating()
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &K {
        &self.scheduler
    }

    // ========================================================================
    // Surface and drawing
    // ========================================================================

    pub fn set_surface_size(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(FractalError::InvalidParameter(format!(
                "surface size {width}x{height} must be non-zero"
            )));
        }
        self.surface_size = Some((width, height));
        self.surface.set_surface_size(width, height);
        self.redraw();
        Ok(())
    }

    /// Uniforms for the current viewport, or `None` before a surface size is known.
    pub fn frame_uniforms(&self) -> Option<FrameUniforms> {
        let (width, height) = self.surface_size?;
        let (width, height) = (f64::from(width), f64::from(height));
        let param = self
            .params
            .kind
            .uses_param()
            .then_some([self.viewport.param_re, self.viewport.param_im]);
        Some(FrameUniforms {
            canvas_size: [width, height],
            viewport: self.viewport.shader_uniforms(width, height),
            param,
        })
    }

    /// Push uniforms and draw with the current program.
    pub fn redraw(&mut self) {
        let Some(uniforms) = self.frame_uniforms() else {
            log::debug!("Skipping redraw, surface size not set");
            return;
        };
        self.surface.set_uniforms(&uniforms);
        self.surface.draw_full_surface(&self.program);
    }

    fn dimensions(&self) -> Result<(f64, f64)> {
        self.surface_size
            .map(|(w, h)| (f64::from(w), f64::from(h)))
            .ok_or_else(|| FractalError::InvalidParameter("surface size not set".to_string()))
    }

    // ========================================================================
    // Render parameters
    // ========================================================================

    /// Validate, regenerate and compile. On failure the previous parameters
    /// and program stay current.
    pub fn set_params(&mut self, params: RenderParameters) -> Result<()> {
        let (program, source) = compile_params(&mut self.compiler, &params)?;
        self.install(params, program, source);
        self.redraw();
        Ok(())
    }

    fn install(&mut self, params: RenderParameters, program: C::Program, source: ProgramSource) {
        self.program = program;
        self.source = source;
        self.params = params;
    }

    /// Switch fractal and jump to its default view.
    pub fn set_fractal_kind(&mut self, kind: FractalKind) -> Result<()> {
        let params = self.params.with_kind(kind);
        let (program, source) = compile_params(&mut self.compiler, &params)?;
        self.install(params, program, source);
        self.viewport.reset_to_default(kind);
        self.redraw();
        Ok(())
    }

    /// Like [`set_fractal_kind`](Self::set_fractal_kind); unknown ids select mandelbrot.
    pub fn set_fractal_by_id(&mut self, id: &str) -> Result<()> {
        self.set_fractal_kind(FractalKind::from_id_or_default(id))
    }

    pub fn set_iteration_cap(&mut self, iteration_cap: u32) -> Result<()> {
        self.set_params(self.params.with_iteration_cap(iteration_cap)?)
    }

    pub fn set_escape_threshold(&mut self, escape_threshold: f64) -> Result<()> {
        self.set_params(self.params.with_escape_threshold(escape_threshold)?)
    }

    pub fn set_smoothing(&mut self, smoothing: bool) -> Result<()> {
        self.set_params(self.params.with_smoothing(smoothing))
    }

    pub fn set_supersampling(&mut self, samples_per_axis: u32) -> Result<()> {
        self.set_params(self.params.with_supersampling(samples_per_axis)?)
    }

    pub fn set_color(&mut self, color: ColorFormula) -> Result<()> {
        self.set_params(self.params.with_color(color))
    }

    /// Select a built-in scheme; unknown ids select the default scheme.
    pub fn set_color_by_id(&mut self, id: &str) -> Result<()> {
        self.set_color(ColorFormula::Scheme(ColorScheme::from_id_or_default(id)))
    }

    // ========================================================================
    // Navigation
    //
    // Ignored while animating: each returns Ok(false) without touching state.
    // ========================================================================

    /// Navigation that maps screen coordinates, so needs the surface size.
    fn navigate(&mut self, op: impl FnOnce(&mut Viewport, f64, f64) -> Result<()>) -> Result<bool> {
        if self.is_animating() {
            log::warn!("Ignoring navigation while animating");
            return Ok(false);
        }
        let (width, height) = self.dimensions()?;
        self.edit_view(|viewport| op(viewport, width, height))
    }

    fn edit_view(&mut self, op: impl FnOnce(&mut Viewport) -> Result<()>) -> Result<bool> {
        if self.is_animating() {
            log::warn!("Ignoring navigation while animating");
            return Ok(false);
        }
        op(&mut self.viewport)?;
        log::debug!(
            "Viewport now ({}, {}) zoom {}",
            self.viewport.offset_x,
            self.viewport.offset_y,
            self.viewport.zoom
        );
        self.redraw();
        Ok(true)
    }

    /// Pan by a screen-space drag delta in pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Result<bool> {
        self.navigate(|viewport, _, height| viewport.pan_by(dx, dy, height))
    }

    /// Pan by keyboard steps; one step is `pan_step` of the surface height.
    /// Positive steps move the view right and up.
    pub fn pan_steps(&mut self, steps_x: f64, steps_y: f64) -> Result<bool> {
        let step = self.settings.pan_step;
        self.navigate(|viewport, _, height| {
            viewport.pan_by(-steps_x * step * height, steps_y * step * height, height)
        })
    }

    pub fn zoom_around(&mut self, screen_x: f64, screen_y: f64, new_zoom: f64) -> Result<bool> {
        self.navigate(|viewport, width, height| {
            viewport.zoom_around(screen_x, screen_y, width, height, new_zoom)
        })
    }

    /// Zoom by `zoom_step` per step around a screen point. Positive steps zoom in.
    pub fn zoom_steps(&mut self, steps: i32, screen_x: f64, screen_y: f64) -> Result<bool> {
        let factor = self.settings.zoom_step.powi(steps.saturating_neg());
        self.navigate(|viewport, width, height| {
            viewport.zoom_by(factor, screen_x, screen_y, width, height)
        })
    }

    /// Nudge the complex parameter by `param_step` times the zoom per step.
    pub fn nudge_param(&mut self, steps_re: f64, steps_im: f64) -> Result<bool> {
        let step = self.settings.param_step;
        self.edit_view(|viewport| {
            let scale = step * viewport.zoom;
            viewport.nudge_param(steps_re * scale, steps_im * scale)
        })
    }

    pub fn reset_view(&mut self) -> Result<bool> {
        let kind = self.params.kind;
        self.edit_view(|viewport| {
            viewport.reset_to_default(kind);
            Ok(())
        })
    }

    /// Replace the viewport outright, for persistence layers.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        viewport.validate()?;
        self.viewport = viewport;
        self.redraw();
        Ok(())
    }

    // ========================================================================
    // Keyframes
    // ========================================================================

    /// Snapshot the current view as a new keyframe.
    pub fn add_keyframe(&mut self) {
        let duration = if self.animation.is_empty() {
            0
        } else {
            self.settings.keyframe_duration_ms
        };
        self.animation.push_snapshot(&self.viewport, duration);
        log::info!("Added keyframe {}", self.animation.len());
    }

    pub fn update_last_keyframe(&mut self) -> Result<()> {
        self.animation.update_last(&self.viewport)
    }

    pub fn adjust_last_keyframe_duration(&mut self, delta_ms: i64) -> Result<u32> {
        self.animation.adjust_last_duration(delta_ms)
    }

    pub fn remove_last_keyframe(&mut self) -> Option<Keyframe> {
        self.animation.remove_last()
    }

    pub fn clear_keyframes(&mut self) {
        self.animation.clear();
    }

    /// Replace the recorded keyframes. Rejected sequences leave the current one.
    pub fn set_keyframes(&mut self, animation: Animation) -> Result<()> {
        animation.validate()?;
        self.animation = animation;
        Ok(())
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Start playing the recorded keyframes.
    pub fn play(&mut self, mode: PlaybackMode, looping: bool, now_ms: f64) -> Result<()> {
        let (sequence, looping) = match mode {
            PlaybackMode::Forward => (self.animation.clone(), looping),
            PlaybackMode::Reverse => (self.animation.reversed(), looping),
            PlaybackMode::PingPong => (self.animation.ping_pong(), true),
        };
        let start = self.player.start(sequence.keyframes(), looping, now_ms)?;
        self.viewport = start;
        self.redraw();
        if self.player.is_animating() {
            self.request_tick();
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        self.player.stop();
    }

    /// Scheduler callback: one interpolation step, at most one redraw,
    /// then re-arm if still playing. Returns whether playback continues.
    pub fn on_tick(&mut self, now_ms: f64) -> bool {
        let tick = self.player.tick(now_ms);
        if let Some(viewport) = tick.viewport {
            self.viewport = viewport;
            self.redraw();
        }
        if tick.playing {
            self.request_tick();
        }
        tick.playing
    }

    fn request_tick(&mut self) {
        self.scheduler
            .request_tick(FrameSchedule::from_frame_rate(self.settings.frame_rate));
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState::new(self.params.kind, self.viewport, self.animation.clone())
    }

    /// Apply a persisted state and stop playback.
    ///
    /// The viewport and keyframes are validated before anything changes; a
    /// compile failure for the stored kind leaves the session as it was.
    pub fn restore(&mut self, state: PersistedState) -> Result<()> {
        state.viewport.validate()?;
        state.keyframes.validate()?;
        if state.fractal != self.params.kind {
            let params = self.params.with_kind(state.fractal);
            let (program, source) = compile_params(&mut self.compiler, &params)?;
            self.install(params, program, source);
        }
        self.player.stop();
        self.viewport = state.viewport;
        self.animation = state.keyframes;
        log::info!(
            "Restored state: fractal={}, {} keyframes",
            self.params.kind,
            self.animation.len()
        );
        self.redraw();
        Ok(())
    }
}
