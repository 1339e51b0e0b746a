//! Camera flight animation
//!
//! The animator owns only the in-flight trajectory. It is handed target
//! coordinates by value and knows nothing about selection or the body
//! list. The host render loop drives it with `advance`.
//!
//! Lifecycle: `Idle -> Running -> {Completed, Cancelled} -> Idle`. The
//! terminal states are reported as [`AnimationEvent`]s and the animator is
//! back to idle by the time the caller sees them.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::TimingConfig;

/// Click-driven flight duration and guard window
pub const DIRECT_EASE_MS: u64 = 1250;
/// Search-driven flight duration and guard window
pub const TRIPLE_SPIN_MS: u64 = 3700;
/// Full turns made by a search-driven flight
pub const SPIN_TURNS: u32 = 3;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationError {
    #[error("a camera animation is already running")]
    AlreadyRunning,
}

/// Temporal profile of a flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationMode {
    /// Position and look-at ease only
    DirectEase,
    /// Eased move plus whole azimuthal turns that land with the move
    TripleSpin,
}

/// Camera pose as consumed by the renderer.
///
/// `extra_yaw` is an azimuthal rotation of `position` about the vertical
/// axis through `look_at`, applied on top of the stored position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    pub extra_yaw: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self {
            position,
            look_at,
            extra_yaw: 0.0,
        }
    }

    /// Pose that frames `target` from a fixed relative offset
    pub fn framing(target: Vec3, offset: Vec3) -> Self {
        Self::new(target + offset, target)
    }

    /// World-space camera position with `extra_yaw` applied
    pub fn effective_position(&self) -> Vec3 {
        self.look_at + Quat::from_rotation_y(self.extra_yaw) * (self.position - self.look_at)
    }

    /// Same view with the yaw folded into the position
    pub fn settled(&self) -> Self {
        Self::new(self.effective_position(), self.look_at)
    }
}

/// A request to fly the camera to a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimationRequest {
    pub target_position: Vec3,
    pub mode: AnimationMode,
    pub nominal_duration: Duration,
    pub spin_turns: u32,
}

impl CameraAnimationRequest {
    /// Request with the stock timing for `mode`
    pub fn new(target_position: Vec3, mode: AnimationMode) -> Self {
        Self::with_timing(target_position, mode, &TimingConfig::default())
    }

    pub fn with_timing(target_position: Vec3, mode: AnimationMode, timing: &TimingConfig) -> Self {
        Self {
            target_position,
            mode,
            nominal_duration: timing.duration_for(mode),
            spin_turns: timing.turns_for(mode),
        }
    }
}

/// Ease-in-out cubic over `[0, 1]`
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorPhase {
    Idle,
    Running,
}

/// Terminal transition of a flight; the animator is idle again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    Completed { epoch: u64, mode: AnimationMode },
    Cancelled { epoch: u64, mode: AnimationMode },
}

#[derive(Debug, Clone)]
struct Flight {
    epoch: u64,
    mode: AnimationMode,
    from: CameraPose,
    to: CameraPose,
    duration: Duration,
    elapsed: Duration,
    spin_turns: u32,
}

impl Flight {
    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }

    fn pose_at(&self, t: f32) -> CameraPose {
        let eased = ease_in_out(t);
        CameraPose {
            position: self.from.position.lerp(self.to.position, eased),
            look_at: self.from.look_at.lerp(self.to.look_at, eased),
            extra_yaw: eased * self.spin_turns as f32 * TAU,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraAnimator {
    pose: CameraPose,
    framing_offset: Vec3,
    flight: Option<Flight>,
    next_epoch: u64,
}

impl CameraAnimator {
    pub fn new(initial: CameraPose, framing_offset: Vec3) -> Self {
        Self {
            pose: initial,
            framing_offset,
            flight: None,
            next_epoch: 1,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn phase(&self) -> AnimatorPhase {
        if self.flight.is_some() {
            AnimatorPhase::Running
        } else {
            AnimatorPhase::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.flight.is_some()
    }

    /// Normalized progress of the running flight
    pub fn progress(&self) -> Option<f32> {
        self.flight.as_ref().map(Flight::progress)
    }

    /// Epoch of the running flight
    pub fn current_epoch(&self) -> Option<u64> {
        self.flight.as_ref().map(|f| f.epoch)
    }

    /// Start a flight from the current pose. Rejected, never queued, while
    /// another flight is running.
    pub fn start(&mut self, request: CameraAnimationRequest) -> Result<u64, AnimationError> {
        if self.flight.is_some() {
            return Err(AnimationError::AlreadyRunning);
        }

        let epoch = self.next_epoch;
        self.next_epoch += 1;

        let from = self.pose.settled();
        self.pose = from;
        self.flight = Some(Flight {
            epoch,
            mode: request.mode,
            from,
            to: CameraPose::framing(request.target_position, self.framing_offset),
            duration: request.nominal_duration,
            elapsed: Duration::ZERO,
            spin_turns: request.spin_turns,
        });

        debug!(epoch, mode = ?request.mode, target = ?request.target_position, "Camera flight started");
        Ok(epoch)
    }

    /// Advance the running flight by one frame. A no-op when idle.
    pub fn advance(&mut self, elapsed: Duration) -> Option<AnimationEvent> {
        let flight = self.flight.as_mut()?;
        flight.elapsed += elapsed;

        let t = flight.progress();
        self.pose = flight.pose_at(t);

        if t >= 1.0 {
            let (epoch, mode) = (flight.epoch, flight.mode);
            self.flight = None;
            debug!(epoch, ?mode, "Camera flight completed");
            return Some(AnimationEvent::Completed { epoch, mode });
        }
        None
    }

    /// Stop where we are: the pose freezes at its last interpolated value.
    /// Returns `None` if nothing was running.
    pub fn cancel(&mut self) -> Option<AnimationEvent> {
        let flight = self.flight.take()?;
        debug!(epoch = flight.epoch, progress = flight.progress(), "Camera flight cancelled");
        Some(AnimationEvent::Cancelled {
            epoch: flight.epoch,
            mode: flight.mode,
        })
    }

    /// Replace the pose directly, for manual orbit controls. Refused while
    /// a flight owns the camera.
    pub fn set_pose(&mut self, pose: CameraPose) -> Result<(), AnimationError> {
        if self.flight.is_some() {
            return Err(AnimationError::AlreadyRunning);
        }
        self.pose = pose;
        Ok(())
    }
}
