use fractalshader_core::{
    decode_state, encode_state, Animation, ColorFormula, ColorScheme, FractalError, FractalKind,
    FrameSchedule, FrameUniforms, Keyframe, PersistedState, PlaybackMode, ProgramSource,
    RenderSurface, Scheduler, Session, SessionSettings, ShaderCompiler, Viewport,
};
use std::time::Duration;

// ============================================================================
// Recording collaborators
// ============================================================================

/// Compiles anything unless it contains the poison marker.
#[derive(Default)]
struct RecordingCompiler {
    compiled: Vec<String>,
}

const POISON: &str = "syntax error here";

impl ShaderCompiler for RecordingCompiler {
    type Program = usize;

    fn compile(&mut self, _vertex: &str, fragment: &ProgramSource) -> Result<usize, String> {
        if fragment.as_str().contains(POISON) {
            return Err("0:12: unexpected identifier".to_string());
        }
        self.compiled.push(fragment.as_str().to_string());
        Ok(self.compiled.len())
    }
}

#[derive(Default)]
struct RecordingSurface {
    size: Option<(u32, u32)>,
    uniforms: Vec<FrameUniforms>,
    draws: Vec<usize>,
}

impl RenderSurface for RecordingSurface {
    type Program = usize;

    fn set_surface_size(&mut self, width: u32, height: u32) {
        self.size = Some((width, height));
    }

    fn set_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.uniforms.push(*uniforms);
    }

    fn draw_full_surface(&mut self, program: &usize) {
        self.draws.push(*program);
    }
}

#[derive(Default)]
struct RecordingScheduler {
    requests: Vec<FrameSchedule>,
}

impl Scheduler for RecordingScheduler {
    fn request_tick(&mut self, schedule: FrameSchedule) {
        self.requests.push(schedule);
    }
}

type TestSession = Session<RecordingCompiler, RecordingSurface, RecordingScheduler>;

fn session_with(settings: SessionSettings) -> TestSession {
    let mut session = Session::new(
        RecordingCompiler::default(),
        RecordingSurface::default(),
        RecordingScheduler::default(),
        settings,
    )
    .unwrap();
    session.set_surface_size(800, 600).unwrap();
    session
}

fn session() -> TestSession {
    session_with(SessionSettings::default())
}

fn keyframe_at_zoom(zoom: f64, duration_ms: u32) -> Keyframe {
    Keyframe {
        offset_x: -0.5,
        offset_y: 0.0,
        zoom,
        param_re: 0.0,
        param_im: 0.0,
        duration_ms,
    }
}

fn record_two_keyframes(session: &mut TestSession) {
    session.add_keyframe();
    session.zoom_around(400.0, 300.0, 1.0).unwrap();
    session.add_keyframe();
}

// ============================================================================
// Parameters and compilation
// ============================================================================

#[test]
fn new_session_compiles_default_program() {
    let session = session();
    assert_eq!(session.compiler().compiled.len(), 1);
    assert_eq!(session.params().kind, FractalKind::Mandelbrot);
    assert_eq!(*session.viewport(), Viewport::for_kind(FractalKind::Mandelbrot));
    assert_eq!(session.surface().size, Some((800, 600)));
    assert_eq!(session.surface().draws, vec![1]);
}

#[test]
fn compile_failure_keeps_last_good_program() {
    let mut session = session();
    session.set_iteration_cap(200).unwrap();
    let good_source = session.source().clone();
    let good_params = session.params().clone();

    let result = session.set_color(ColorFormula::Custom(POISON.to_string()));
    match result {
        Err(FractalError::CompileFailure(diagnostic)) => {
            assert!(diagnostic.contains("unexpected identifier"))
        }
        other => panic!("expected compile failure, got {other:?}"),
    }
    assert_eq!(session.source(), &good_source);
    assert_eq!(session.params(), &good_params);

    session.redraw();
    assert_eq!(session.surface().draws.last(), Some(&2));
}

#[test]
fn invalid_parameter_never_reaches_compiler() {
    let mut session = session();
    let compiled = session.compiler().compiled.len();
    assert!(matches!(
        session.set_iteration_cap(0),
        Err(FractalError::InvalidParameter(_))
    ));
    assert!(session.set_escape_threshold(f64::NAN).is_err());
    assert!(session.set_supersampling(9).is_err());
    assert_eq!(session.compiler().compiled.len(), compiled);
}

#[test]
fn changing_kind_resets_view() {
    let mut session = session();
    session.pan_by(50.0, 0.0).unwrap();
    session.set_fractal_kind(FractalKind::Julia).unwrap();
    assert_eq!(*session.viewport(), Viewport::for_kind(FractalKind::Julia));
    assert!(session.source().as_str().contains("// julia"));
}

#[test]
fn unknown_ids_fall_back_to_defaults() {
    let mut session = session();
    session.set_fractal_by_id("nope").unwrap();
    assert_eq!(session.params().kind, FractalKind::Mandelbrot);
    session.set_color_by_id("nope").unwrap();
    assert_eq!(
        session.params().color,
        ColorFormula::Scheme(ColorScheme::Hsv)
    );
}

#[test]
fn param_uniform_only_for_parameter_driven_kinds() {
    let mut session = session();
    assert_eq!(session.surface().uniforms.last().unwrap().param, None);
    session.set_fractal_kind(FractalKind::Julia).unwrap();
    let uniforms = session.surface().uniforms.last().unwrap();
    assert_eq!(uniforms.param, Some([-0.8, 0.156]));
    assert_eq!(uniforms.canvas_size, [800.0, 600.0]);
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn navigation_redraws_with_new_uniforms() {
    let mut session = session();
    let draws = session.surface().draws.len();
    assert!(session.pan_by(80.0, 0.0).unwrap());
    assert_eq!(session.surface().draws.len(), draws + 1);
    let expected = session.viewport().shader_uniforms(800.0, 600.0);
    assert_eq!(session.surface().uniforms.last().unwrap().viewport, expected);
}

#[test]
fn keyboard_steps_move_the_view() {
    let mut session = session();
    let start = *session.viewport();
    session.pan_steps(1.0, 1.0).unwrap();
    assert!(session.viewport().offset_x > start.offset_x);
    assert!(session.viewport().offset_y > start.offset_y);

    session.zoom_steps(1, 400.0, 300.0).unwrap();
    assert!((session.viewport().zoom - start.zoom / 1.25).abs() < 1e-12);
}

#[test]
fn navigation_before_surface_size_is_rejected() {
    let mut session = Session::new(
        RecordingCompiler::default(),
        RecordingSurface::default(),
        RecordingScheduler::default(),
        SessionSettings::default(),
    )
    .unwrap();
    assert!(session.pan_by(1.0, 1.0).is_err());
    assert!(session.surface().draws.is_empty());
    assert!(session.set_surface_size(0, 10).is_err());
}

#[test]
fn param_and_reset_work_before_surface_size() {
    let mut session = Session::new(
        RecordingCompiler::default(),
        RecordingSurface::default(),
        RecordingScheduler::default(),
        SessionSettings::default(),
    )
    .unwrap();
    session.set_fractal_kind(FractalKind::Julia).unwrap();
    assert!(session.nudge_param(1.0, 0.0).unwrap());
    assert!(session.viewport().param_re > -0.8);
    assert!(session.reset_view().unwrap());
    assert_eq!(*session.viewport(), Viewport::for_kind(FractalKind::Julia));
    assert!(session.surface().draws.is_empty());
}

#[test]
fn extreme_zoom_steps_are_rejected() {
    let mut session = session();
    let before = *session.viewport();
    assert!(session.zoom_steps(i32::MIN, 400.0, 300.0).is_err());
    assert!(session.zoom_steps(i32::MAX, 400.0, 300.0).is_err());
    assert_eq!(*session.viewport(), before);
}

#[test]
fn navigation_is_ignored_while_animating() {
    let mut session = session();
    record_two_keyframes(&mut session);
    session.play(PlaybackMode::Forward, false, 0.0).unwrap();
    assert!(session.is_animating());

    let before = *session.viewport();
    assert!(!session.pan_by(100.0, 100.0).unwrap());
    assert!(!session.zoom_around(10.0, 10.0, 0.5).unwrap());
    assert!(!session.nudge_param(1.0, 1.0).unwrap());
    assert!(!session.reset_view().unwrap());
    assert_eq!(*session.viewport(), before);

    session.stop();
    assert!(session.pan_by(100.0, 100.0).unwrap());
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn playback_requests_display_refresh_ticks() {
    let mut session = session();
    record_two_keyframes(&mut session);
    let duration = f64::from(session.settings().keyframe_duration_ms);

    session.play(PlaybackMode::Forward, false, 0.0).unwrap();
    assert_eq!(session.viewport().zoom, 2.5);
    assert_eq!(
        session.scheduler().requests,
        vec![FrameSchedule::DisplayRefresh]
    );

    let draws = session.surface().draws.len();
    assert!(session.on_tick(duration / 2.0));
    assert_eq!(session.surface().draws.len(), draws + 1);
    assert_eq!(session.scheduler().requests.len(), 2);

    assert!(!session.on_tick(duration));
    assert_eq!(session.viewport().zoom, 1.0);
    assert_eq!(session.scheduler().requests.len(), 2);
    assert!(!session.is_animating());
}

#[test]
fn fixed_frame_rate_uses_timer_delay() {
    let mut session = session_with(SessionSettings {
        frame_rate: 20,
        ..SessionSettings::default()
    });
    record_two_keyframes(&mut session);
    session.play(PlaybackMode::Forward, true, 0.0).unwrap();
    assert_eq!(
        session.scheduler().requests,
        vec![FrameSchedule::FixedDelay(Duration::from_millis(50))]
    );
}

#[test]
fn reverse_playback_starts_at_last_keyframe() {
    let mut session = session();
    record_two_keyframes(&mut session);
    session.play(PlaybackMode::Reverse, false, 0.0).unwrap();
    assert_eq!(session.viewport().zoom, 1.0);
}

#[test]
fn ping_pong_always_loops() {
    let mut session = session();
    record_two_keyframes(&mut session);
    let duration = f64::from(session.settings().keyframe_duration_ms);
    session.play(PlaybackMode::PingPong, false, 0.0).unwrap();

    assert!(session.on_tick(duration));
    assert_eq!(session.viewport().zoom, 1.0);
    assert!(session.on_tick(2.0 * duration));
    assert_eq!(session.viewport().zoom, 2.5);
    assert!(session.is_animating());
}

#[test]
fn playing_without_keyframes_fails() {
    let mut session = session();
    assert!(matches!(
        session.play(PlaybackMode::Forward, false, 0.0),
        Err(FractalError::InvalidArgument(_))
    ));
    assert!(session.scheduler().requests.is_empty());
}

#[test]
fn first_keyframe_is_entered_instantly() {
    let mut session = session();
    record_two_keyframes(&mut session);
    let frames = session.animation().keyframes();
    assert_eq!(frames[0].duration_ms, 0);
    assert_eq!(frames[1].duration_ms, session.settings().keyframe_duration_ms);
}

#[test]
fn keyframe_editing() {
    let mut session = session();
    record_two_keyframes(&mut session);
    session.pan_by(10.0, 0.0).unwrap();
    session.update_last_keyframe().unwrap();
    assert_eq!(
        session.animation().keyframes()[1].to_viewport(),
        *session.viewport()
    );
    assert_eq!(session.adjust_last_keyframe_duration(-1000).unwrap(), 2000);
    assert!(session.remove_last_keyframe().is_some());
    assert_eq!(session.animation().len(), 1);
    session.clear_keyframes();
    assert!(session.animation().is_empty());
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn state_roundtrips_through_url_hash() {
    let mut source = session();
    source.set_fractal_kind(FractalKind::Phoenix).unwrap();
    source.nudge_param(3.0, -2.0).unwrap();
    record_two_keyframes(&mut source);

    let encoded = encode_state(&source.persisted_state()).unwrap();
    let state = decode_state(&encoded).unwrap();

    let mut target = session();
    target.restore(state).unwrap();
    assert_eq!(target.params().kind, FractalKind::Phoenix);
    assert_eq!(target.viewport(), source.viewport());
    assert_eq!(target.animation(), source.animation());
}

#[test]
fn restore_rejects_invalid_viewport() {
    let mut session = session();
    let mut state = session.persisted_state();
    state.viewport.zoom = -1.0;
    state.fractal = FractalKind::Julia;
    assert!(matches!(
        session.restore(state),
        Err(FractalError::InvalidParameter(_))
    ));
    assert_eq!(session.params().kind, FractalKind::Mandelbrot);
}

#[test]
fn restore_rejects_invalid_keyframes() {
    let mut session = session();
    record_two_keyframes(&mut session);
    let recorded = session.animation().clone();
    let before = *session.viewport();

    let mut state = session.persisted_state();
    state.fractal = FractalKind::Julia;
    state.keyframes = Animation::from(vec![keyframe_at_zoom(-3.0, 0), keyframe_at_zoom(0.0, 100)]);
    let json = state.to_json().unwrap();
    let state = PersistedState::from_json(&json).unwrap();

    assert!(matches!(
        session.restore(state),
        Err(FractalError::InvalidParameter(_))
    ));
    assert_eq!(session.params().kind, FractalKind::Mandelbrot);
    assert_eq!(session.animation(), &recorded);
    assert_eq!(*session.viewport(), before);

    session.play(PlaybackMode::Forward, false, 0.0).unwrap();
    assert!(session.on_tick(100.0));
    assert!(session.viewport().validate().is_ok());
}

#[test]
fn set_keyframes_rejects_non_positive_zoom() {
    let mut session = session();
    record_two_keyframes(&mut session);
    let recorded = session.animation().clone();

    let bad = Animation::from(vec![keyframe_at_zoom(1.0, 0), keyframe_at_zoom(0.0, 100)]);
    assert!(session.set_keyframes(bad).is_err());
    assert_eq!(session.animation(), &recorded);

    let good = Animation::from(vec![keyframe_at_zoom(2.0, 0), keyframe_at_zoom(0.5, 100)]);
    session.set_keyframes(good.clone()).unwrap();
    assert_eq!(session.animation(), &good);
}

#[test]
fn set_viewport_validates() {
    let mut session = session();
    let bad = Viewport {
        zoom: f64::INFINITY,
        ..*session.viewport()
    };
    assert!(session.set_viewport(bad).is_err());
    let good = Viewport {
        zoom: 0.5,
        ..*session.viewport()
    };
    session.set_viewport(good).unwrap();
    assert_eq!(session.viewport().zoom, 0.5);
}
