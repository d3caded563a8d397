pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod fractal;
pub mod glsl;
pub mod params;
pub mod persistence;
pub mod program;
pub mod session;
pub mod viewport;

pub use animation::{ease, interpolate, Animation, AnimationPlayer, FrameSchedule, Keyframe, Tick};
pub use color::{
    parse_ggr, resolve_color_formula, ColorFormula, ColorScheme, Gradient, UnknownColorScheme,
    DEFAULT_COLOR_SCHEME,
};
pub use config::{get_config, FractalConfig, SessionSettings, FRACTAL_CONFIGS};
pub use error::{FractalError, GgrError, Result};
pub use fractal::{FractalKind, IterationScheme, ParamUsage, UnknownFractalKind};
pub use glsl::float_literal;
pub use params::{
    RenderParameters, DEFAULT_ESCAPE_THRESHOLD, DEFAULT_ITERATION_CAP, MAX_ESCAPE_THRESHOLD,
    MAX_ITERATION_CAP, MAX_SUPERSAMPLING,
};
pub use persistence::{decode_state, encode_state, PersistedState};
pub use program::{generate_program, EscapeValue, PixelProgram, ProgramSource, VERTEX_SHADER};
pub use session::{
    FrameUniforms, PlaybackMode, RenderSurface, Scheduler, Session, ShaderCompiler,
};
pub use viewport::Viewport;
