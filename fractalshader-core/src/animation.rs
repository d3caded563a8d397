//! Keyframe animation: editing, direction helpers and the playback state machine.
//!
//! A keyframe's duration is the time taken to *arrive* at it from the
//! previous keyframe. The first keyframe is entered instantly, so its
//! duration is never used as a transition length.

use crate::error::{FractalError, Result};
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponent of the zoom easing curves.
const EASING_POWER: i32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub offset_x: f64,
    pub offset_y: f64,
    pub zoom: f64,
    pub param_re: f64,
    pub param_im: f64,
    pub duration_ms: u32,
}

impl Keyframe {
    pub fn from_viewport(viewport: &Viewport, duration_ms: u32) -> Self {
        Self {
            offset_x: viewport.offset_x,
            offset_y: viewport.offset_y,
            zoom: viewport.zoom,
            param_re: viewport.param_re,
            param_im: viewport.param_im,
            duration_ms,
        }
    }

    pub fn to_viewport(&self) -> Viewport {
        Viewport {
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            zoom: self.zoom,
            param_re: self.param_re,
            param_im: self.param_im,
        }
    }

    /// True when all five viewport fields match, ignoring duration.
    pub fn same_position(&self, other: &Keyframe) -> bool {
        self.to_viewport() == other.to_viewport()
    }

    /// Same checks as [`Viewport::validate`].
    pub fn validate(&self) -> Result<()> {
        self.to_viewport().validate()
    }

    fn with_duration(self, duration_ms: u32) -> Self {
        Self {
            duration_ms,
            ..self
        }
    }
}

fn validate_keyframes(keyframes: &[Keyframe]) -> Result<()> {
    for (index, keyframe) in keyframes.iter().enumerate() {
        keyframe.validate().map_err(|err| match err {
            FractalError::InvalidParameter(reason) => {
                FractalError::InvalidParameter(format!("keyframe {index}: {reason}"))
            }
            other => other,
        })?;
    }
    Ok(())
}

/// Ordered keyframe sequence. Insertion order is playback order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Animation {
    keyframes: Vec<Keyframe>,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Reject the sequence if any keyframe is not a usable viewport.
    pub fn validate(&self) -> Result<()> {
        validate_keyframes(&self.keyframes)
    }

    pub fn push(&mut self, keyframe: Keyframe) {
        self.keyframes.push(keyframe);
    }

    pub fn push_snapshot(&mut self, viewport: &Viewport, duration_ms: u32) {
        self.push(Keyframe::from_viewport(viewport, duration_ms));
    }

    /// Overwrite the last keyframe's position, keeping its duration.
    pub fn update_last(&mut self, viewport: &Viewport) -> Result<()> {
        let last = self.last_mut()?;
        *last = Keyframe::from_viewport(viewport, last.duration_ms);
        Ok(())
    }

    /// Lengthen or shorten the last keyframe's duration, saturating at 0.
    /// Returns the new duration.
    pub fn adjust_last_duration(&mut self, delta_ms: i64) -> Result<u32> {
        let last = self.last_mut()?;
        let adjusted = i64::from(last.duration_ms)
            .saturating_add(delta_ms)
            .clamp(0, i64::from(u32::MAX));
        last.duration_ms = adjusted as u32;
        Ok(last.duration_ms)
    }

    pub fn remove_last(&mut self) -> Option<Keyframe> {
        self.keyframes.pop()
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    fn last_mut(&mut self) -> Result<&mut Keyframe> {
        self.keyframes
            .last_mut()
            .ok_or_else(|| FractalError::InvalidArgument("animation has no keyframes".to_string()))
    }

    /// The sequence played backwards with the same per-segment timings.
    ///
    /// Durations shift by one position: the segment arriving at
    /// `reversed[j]` is the forward segment that left it, whose length is
    /// stored on the forward keyframe after it.
    pub fn reversed(&self) -> Animation {
        let n = self.keyframes.len();
        let keyframes = (0..n)
            .map(|j| {
                let keyframe = self.keyframes[n - 1 - j];
                let duration = if j == 0 {
                    0
                } else {
                    self.keyframes[n - j].duration_ms
                };
                keyframe.with_duration(duration)
            })
            .collect();
        Animation { keyframes }
    }

    /// Forward then backward, without repeating the turning keyframe.
    /// The result starts and ends on the same position, so it loops seamlessly.
    pub fn ping_pong(&self) -> Animation {
        let mut keyframes = self.keyframes.clone();
        keyframes.extend(self.reversed().keyframes.into_iter().skip(1));
        Animation { keyframes }
    }
}

impl From<Vec<Keyframe>> for Animation {
    fn from(keyframes: Vec<Keyframe>) -> Self {
        Self { keyframes }
    }
}

/// Ease a linear segment progress according to the zoom direction.
///
/// Zooming in decelerates (`1 - (1-t)^16`), zooming out accelerates
/// (`t^16`). Both keep the perceived zoom speed roughly constant.
pub fn ease(t: f64, from_zoom: f64, to_zoom: f64) -> f64 {
    if from_zoom > to_zoom {
        1.0 - (1.0 - t).powi(EASING_POWER)
    } else if from_zoom < to_zoom {
        t.powi(EASING_POWER)
    } else {
        t
    }
}

/// Interpolated viewport at linear progress `t` of the segment `from -> to`.
pub fn interpolate(from: &Keyframe, to: &Keyframe, t: f64) -> Viewport {
    let eased = ease(t, from.zoom, to.zoom);
    from.to_viewport().lerp(&to.to_viewport(), eased)
}

/// How the host should schedule the next animation tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameSchedule {
    /// Next display refresh.
    DisplayRefresh,
    /// Fixed-delay timer.
    FixedDelay(Duration),
}

impl FrameSchedule {
    /// 0 fps follows the display refresh.
    pub fn from_frame_rate(fps: u32) -> Self {
        if fps == 0 {
            FrameSchedule::DisplayRefresh
        } else {
            FrameSchedule::FixedDelay(Duration::from_millis(1000 / u64::from(fps)))
        }
    }
}

/// Transient playback position.
#[derive(Clone, Debug, PartialEq)]
struct Playhead {
    keyframes: Vec<Keyframe>,
    index: usize,
    segment_start_ms: f64,
    looping: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum PlayerState {
    #[default]
    Idle,
    Playing(Playhead),
}

/// Outcome of one player tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// New viewport to apply and redraw, `None` when nothing changed.
    pub viewport: Option<Viewport>,
    /// Whether another tick should be scheduled.
    pub playing: bool,
}

/// Playback state machine: `Idle -> Playing -> Idle`, or back to the
/// first segment when looping.
///
/// Time is supplied by the caller as milliseconds on any monotonic clock,
/// so the player never reads a clock itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationPlayer {
    state: PlayerState,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, PlayerState::Playing(_))
    }

    /// Index of the keyframe the current segment leaves from.
    pub fn segment_index(&self) -> Option<usize> {
        match &self.state {
            PlayerState::Playing(playhead) => Some(playhead.index),
            PlayerState::Idle => None,
        }
    }

    /// Begin playback and return the viewport to snap to.
    ///
    /// A single keyframe snaps and stays idle. Invalid keyframes are
    /// rejected without touching the current state.
    pub fn start(&mut self, keyframes: &[Keyframe], looping: bool, now_ms: f64) -> Result<Viewport> {
        let first = keyframes.first().ok_or_else(|| {
            FractalError::InvalidArgument("playback needs at least one keyframe".to_string())
        })?;
        validate_keyframes(keyframes)?;

        if keyframes.len() == 1 {
            log::info!("Single keyframe, snapping without playback");
            self.state = PlayerState::Idle;
            return Ok(first.to_viewport());
        }

        log::info!(
            "Playback started: {} keyframes, looping={}",
            keyframes.len(),
            looping
        );
        self.state = PlayerState::Playing(Playhead {
            keyframes: keyframes.to_vec(),
            index: 0,
            segment_start_ms: now_ms,
            looping,
        });
        Ok(first.to_viewport())
    }

    /// Safe from any state. Leaves the viewport where it is.
    pub fn stop(&mut self) {
        if self.is_animating() {
            log::info!("Playback stopped");
        }
        self.state = PlayerState::Idle;
    }

    /// Advance playback to `now_ms`. Performs at most one step.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        let PlayerState::Playing(playhead) = &mut self.state else {
            return Tick {
                viewport: None,
                playing: false,
            };
        };

        let from = playhead.keyframes[playhead.index];
        let to = playhead.keyframes[playhead.index + 1];
        let progress = if to.duration_ms == 0 {
            1.0
        } else {
            ((now_ms - playhead.segment_start_ms) / f64::from(to.duration_ms)).max(0.0)
        };

        if progress >= 1.0 {
            playhead.index += 1;
            playhead.segment_start_ms = now_ms;
            if playhead.index + 1 >= playhead.keyframes.len() {
                if playhead.looping {
                    log::debug!("Playback looped");
                    playhead.index = 0;
                } else {
                    log::info!("Playback finished");
                    self.state = PlayerState::Idle;
                    return Tick {
                        viewport: Some(to.to_viewport()),
                        playing: false,
                    };
                }
            }
            log::debug!("Reached keyframe, next segment {}", playhead.index);
            return Tick {
                viewport: Some(to.to_viewport()),
                playing: true,
            };
        }

        if from.same_position(&to) {
            return Tick {
                viewport: None,
                playing: true,
            };
        }

        Tick {
            viewport: Some(interpolate(&from, &to, progress)),
            playing: true,
        }
    }
}
