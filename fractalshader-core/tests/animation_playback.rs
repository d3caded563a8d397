use fractalshader_core::{Animation, AnimationPlayer, FractalError, Keyframe, Viewport};

fn keyframe(offset_x: f64, zoom: f64, duration_ms: u32) -> Keyframe {
    Keyframe {
        offset_x,
        offset_y: 0.0,
        zoom,
        param_re: 0.0,
        param_im: 0.0,
        duration_ms,
    }
}

fn zoom_at(frames: &[Keyframe], now_ms: f64) -> f64 {
    let mut player = AnimationPlayer::new();
    player.start(frames, false, 0.0).unwrap();
    player
        .tick(now_ms)
        .viewport
        .expect("tick should move the viewport")
        .zoom
}

// ============================================================================
// Two-keyframe zoom
// ============================================================================

#[test]
fn two_keyframe_zoom_in_follows_ease_curve() {
    let frames = [keyframe(0.0, 2.5, 0), keyframe(0.0, 1.25, 1000)];

    let mut player = AnimationPlayer::new();
    let start = player.start(&frames, false, 0.0).unwrap();
    assert_eq!(start.zoom, 2.5);
    assert!(player.is_animating());

    assert_eq!(zoom_at(&frames, 0.0), 2.5);

    let midpoint = zoom_at(&frames, 500.0);
    let expected = 1.25 + 1.25 * 0.5f64.powi(16);
    assert!((midpoint - expected).abs() < 1e-12, "{midpoint} vs {expected}");
    assert!((midpoint - 1.875).abs() > 0.5);

    let tick = player.tick(1000.0);
    assert_eq!(tick.viewport.map(|v| v.zoom), Some(1.25));
    assert!(!tick.playing);
    assert!(!player.is_animating());
}

#[test]
fn zoom_out_is_back_loaded() {
    let frames = [keyframe(0.0, 1.25, 0), keyframe(0.0, 2.5, 1000)];
    let midpoint = zoom_at(&frames, 500.0);
    let expected = 1.25 + 1.25 * 0.5f64.powi(16);
    assert!((midpoint - expected).abs() < 1e-12);
}

#[test]
fn constant_zoom_pans_linearly() {
    let frames = [keyframe(0.0, 1.0, 0), keyframe(2.0, 1.0, 1000)];
    let mut player = AnimationPlayer::new();
    player.start(&frames, false, 0.0).unwrap();
    let viewport = player.tick(250.0).viewport.unwrap();
    assert!((viewport.offset_x - 0.5).abs() < 1e-12);
}

// ============================================================================
// Start contract
// ============================================================================

#[test]
fn start_without_keyframes_is_invalid_argument() {
    let mut player = AnimationPlayer::new();
    let result = player.start(&[], true, 0.0);
    assert!(matches!(result, Err(FractalError::InvalidArgument(_))));
    assert!(!player.is_animating());
}

#[test]
fn start_with_invalid_keyframe_keeps_current_playback() {
    let good = [keyframe(0.0, 2.0, 0), keyframe(0.0, 1.0, 1000)];
    let mut player = AnimationPlayer::new();
    player.start(&good, true, 0.0).unwrap();

    let bad = [keyframe(0.0, -3.0, 0), keyframe(0.0, 0.0, 100)];
    let result = player.start(&bad, false, 0.0);
    assert!(matches!(result, Err(FractalError::InvalidParameter(_))));
    assert!(player.is_animating());
    let zoom = player.tick(500.0).viewport.unwrap().zoom;
    assert!(zoom > 1.0 && zoom < 2.0);
}

#[test]
fn single_keyframe_snaps_and_stays_idle() {
    let only = keyframe(0.3, 0.75, 500);
    let mut player = AnimationPlayer::new();
    let viewport = player.start(&[only], true, 0.0).unwrap();
    assert_eq!(viewport, only.to_viewport());
    assert!(!player.is_animating());
    assert!(!player.tick(1_000.0).playing);
}

// ============================================================================
// Looping
// ============================================================================

#[test]
fn looping_restarts_at_first_segment_until_stopped() {
    let frames = [
        keyframe(0.0, 4.0, 0),
        keyframe(1.0, 2.0, 100),
        keyframe(2.0, 1.0, 100),
    ];
    let mut player = AnimationPlayer::new();
    player.start(&frames, true, 0.0).unwrap();

    let mut now = 0.0;
    for _ in 0..10 {
        now += 100.0;
        let tick = player.tick(now);
        assert_eq!(tick.viewport, Some(frames[1].to_viewport()));
        assert_eq!(player.segment_index(), Some(1));

        now += 100.0;
        let tick = player.tick(now);
        assert_eq!(tick.viewport, Some(frames[2].to_viewport()));
        assert!(tick.playing);
        assert_eq!(player.segment_index(), Some(0));
    }

    // Mid-way through the first segment again.
    let viewport = player.tick(now + 50.0).viewport.unwrap();
    assert!(viewport.zoom < 4.0 && viewport.zoom > 2.0);

    player.stop();
    assert!(!player.is_animating());
    assert_eq!(player.tick(now + 100.0).viewport, None);
}

#[test]
fn non_looping_ends_idle_on_last_keyframe() {
    let frames = [
        keyframe(0.0, 4.0, 0),
        keyframe(1.0, 2.0, 100),
        keyframe(2.0, 1.0, 100),
    ];
    let mut player = AnimationPlayer::new();
    player.start(&frames, false, 0.0).unwrap();
    assert!(player.tick(100.0).playing);
    let last = player.tick(200.0);
    assert_eq!(last.viewport, Some(frames[2].to_viewport()));
    assert!(!last.playing);
}

#[test]
fn late_tick_performs_only_one_step() {
    let frames = [
        keyframe(0.0, 4.0, 0),
        keyframe(1.0, 2.0, 100),
        keyframe(2.0, 1.0, 100),
    ];
    let mut player = AnimationPlayer::new();
    player.start(&frames, false, 0.0).unwrap();
    // Far past both segments: one snap per tick.
    assert_eq!(player.tick(10_000.0).viewport, Some(frames[1].to_viewport()));
    assert!(player.is_animating());
}

// ============================================================================
// Direction helpers
// ============================================================================

#[test]
fn reverse_keeps_asymmetric_segment_timings() {
    let forward = Animation::from(vec![
        keyframe(0.0, 4.0, 0),
        keyframe(1.0, 2.0, 100),
        keyframe(2.0, 1.0, 900),
    ]);
    let reversed = forward.reversed();
    let durations: Vec<u32> = reversed.keyframes().iter().map(|k| k.duration_ms).collect();
    assert_eq!(durations, vec![0, 900, 100]);
    let zooms: Vec<f64> = reversed.keyframes().iter().map(|k| k.zoom).collect();
    assert_eq!(zooms, vec![1.0, 2.0, 4.0]);

    // Playing it back: the 1 -> 2 leg takes 900 ms, the 2 -> 4 leg 100 ms.
    let mut player = AnimationPlayer::new();
    player.start(reversed.keyframes(), false, 0.0).unwrap();
    assert_ne!(player.tick(899.0).viewport.map(|v| v.zoom), Some(2.0));
    assert_eq!(player.tick(900.0).viewport.map(|v| v.zoom), Some(2.0));
    assert!(player.tick(999.0).playing);
    let end = player.tick(1000.0);
    assert_eq!(end.viewport.map(|v| v.zoom), Some(4.0));
    assert!(!end.playing);
}

#[test]
fn ping_pong_returns_to_start_without_duplicate_turn() {
    let forward = Animation::from(vec![
        keyframe(0.0, 4.0, 0),
        keyframe(1.0, 2.0, 100),
        keyframe(2.0, 1.0, 300),
    ]);
    let round_trip = forward.ping_pong();
    let positions: Vec<f64> = round_trip.keyframes().iter().map(|k| k.offset_x).collect();
    assert_eq!(positions, vec![0.0, 1.0, 2.0, 1.0, 0.0]);
    let durations: Vec<u32> = round_trip.keyframes().iter().map(|k| k.duration_ms).collect();
    assert_eq!(durations, vec![0, 100, 300, 300, 100]);

    let frames = round_trip.keyframes();
    assert!(frames[0].same_position(&frames[frames.len() - 1]));
}

#[test]
fn snapshot_captures_viewport() {
    let viewport = Viewport {
        offset_x: 0.25,
        offset_y: -0.5,
        zoom: 0.01,
        param_re: 0.1,
        param_im: 0.2,
    };
    let mut animation = Animation::new();
    animation.push_snapshot(&viewport, 1500);
    assert_eq!(animation.keyframes()[0].to_viewport(), viewport);
    assert_eq!(animation.keyframes()[0].duration_ms, 1500);
}
