//! Selection controller
//!
//! The single authority that turns user intent (search pick, direct click,
//! cancel) into accept/reject decisions and camera flights, and the only
//! writer of [`SelectionState`].
//!
//! Two timelines clear `is_animating`: the animator's natural completion
//! and a guard task armed on the [`Scheduler`] for the mode's nominal
//! duration. Clearing is idempotent and each guard is tied to the epoch
//! of the flight that armed it, so a late guard can never clear a newer
//! flight.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::camera::{
    AnimationError, AnimationEvent, AnimationMode, CameraAnimationRequest, CameraAnimator,
    CameraPose,
};
use crate::config::{FocusAnchor, UniverseConfig};
use crate::registry::SceneRegistry;
use crate::schedule::{FrameScheduler, Scheduler, TaskHandle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_index: Option<usize>,
    pub is_animating: bool,
}

/// Why a selection request was dropped. Not an error: this is debounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Animating,
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Selection moved and a flight started
    Started { index: usize, mode: AnimationMode, epoch: u64 },
    /// Clicked the focused body again; selection cleared, no flight
    ToggledOff { index: usize },
    Ignored(IgnoreReason),
}

impl SelectionOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, SelectionOutcome::Ignored(_))
    }
}

/// Which timeline cleared `is_animating`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    Completed,
    GuardElapsed,
    Cancelled,
}

/// Read-side view for renderers. The index has already been validated
/// against the live body list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionSnapshot {
    pub selected_index: Option<usize>,
    pub is_animating: bool,
    pub camera_pose: CameraPose,
}

#[derive(Debug, Clone, Copy)]
struct Guard {
    handle: TaskHandle,
    epoch: u64,
}

pub struct SelectionController<S: Scheduler = FrameScheduler> {
    state: SelectionState,
    animator: CameraAnimator,
    scheduler: S,
    guard: Option<Guard>,
    /// Epoch of the most recently accepted flight
    epoch: Option<u64>,
    config: UniverseConfig,
    scene_time: Duration,
}

impl SelectionController<FrameScheduler> {
    pub fn new(config: UniverseConfig) -> Self {
        Self::with_scheduler(config, FrameScheduler::new())
    }
}

impl<S: Scheduler> SelectionController<S> {
    pub fn with_scheduler(config: UniverseConfig, scheduler: S) -> Self {
        let camera = &config.camera;
        let animator = CameraAnimator::new(
            CameraPose::new(camera.initial_position.into(), camera.initial_look_at.into()),
            camera.framing_offset.into(),
        );

        Self {
            state: SelectionState::default(),
            animator,
            scheduler,
            guard: None,
            epoch: None,
            config,
            scene_time: Duration::ZERO,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating
    }

    /// Selected index validated against `registry`; stale reads as none
    pub fn selected_index(&self, registry: &SceneRegistry) -> Option<usize> {
        registry.resolve(self.state.selected_index)
    }

    pub fn pose(&self) -> CameraPose {
        self.animator.pose()
    }

    pub fn animator(&self) -> &CameraAnimator {
        &self.animator
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn config(&self) -> &UniverseConfig {
        &self.config
    }

    /// Scene time accumulated from ticks, drives the orbital wobble
    pub fn scene_time(&self) -> Duration {
        self.scene_time
    }

    pub fn snapshot(&self, registry: &SceneRegistry) -> SelectionSnapshot {
        SelectionSnapshot {
            selected_index: self.selected_index(registry),
            is_animating: self.state.is_animating,
            camera_pose: self.animator.pose(),
        }
    }

    /// Search-driven pick: triple-spin flight
    pub fn select_via_search(&mut self, registry: &SceneRegistry, index: usize) -> SelectionOutcome {
        if let Some(reason) = self.check_request(registry, index) {
            debug!(index, ?reason, "Search selection ignored");
            return SelectionOutcome::Ignored(reason);
        }
        self.begin_flight(registry, index, AnimationMode::TripleSpin)
    }

    /// Direct pick: clicking the focused body deselects it, anything else
    /// gets a direct eased flight
    pub fn select_via_click(&mut self, registry: &SceneRegistry, index: usize) -> SelectionOutcome {
        if let Some(reason) = self.check_request(registry, index) {
            debug!(index, ?reason, "Click selection ignored");
            return SelectionOutcome::Ignored(reason);
        }

        if self.state.selected_index == Some(index) {
            // A flight that outlived its guard must not keep heading for
            // a body that is no longer selected
            self.disarm_guard();
            if self.animator.cancel().is_some() {
                debug!(index, "Stopped flight to deselected body");
            }
            self.state.selected_index = None;
            info!(index, "Selection toggled off");
            return SelectionOutcome::ToggledOff { index };
        }

        self.begin_flight(registry, index, AnimationMode::DirectEase)
    }

    /// Always accepted. Clears the selection and the animating flag now,
    /// disarms the guard, and freezes the camera where it is.
    pub fn cancel(&mut self) {
        self.disarm_guard();
        let event = self.animator.cancel();
        self.state.selected_index = None;
        self.clear_animating(ClearReason::Cancelled);
        info!(stopped_flight = event.is_some(), "Selection cancelled");
    }

    /// Manual orbit control; refused while a flight owns the camera
    pub fn set_camera_pose(&mut self, pose: CameraPose) -> Result<(), AnimationError> {
        self.animator.set_pose(pose)
    }

    /// Advance one frame. Returns the timeline that cleared the animating
    /// flag this frame, if any.
    pub fn tick(&mut self, elapsed: Duration) -> Option<ClearReason> {
        self.scene_time += elapsed;
        let mut cleared = None;

        if let Some(AnimationEvent::Completed { epoch, .. }) = self.animator.advance(elapsed) {
            if Some(epoch) == self.epoch && self.clear_animating(ClearReason::Completed) {
                cleared = Some(ClearReason::Completed);
            }
        }

        for handle in self.scheduler.advance(elapsed) {
            match self.guard {
                Some(guard) if guard.handle == handle => {
                    self.guard = None;
                    if Some(guard.epoch) == self.epoch
                        && self.clear_animating(ClearReason::GuardElapsed)
                    {
                        cleared = Some(ClearReason::GuardElapsed);
                    }
                }
                _ => debug!(task = handle.id(), "Stale guard fired, ignoring"),
            }
        }

        cleared
    }

    fn check_request(&self, registry: &SceneRegistry, index: usize) -> Option<IgnoreReason> {
        if self.state.is_animating {
            return Some(IgnoreReason::Animating);
        }
        if !registry.contains_index(index) {
            return Some(IgnoreReason::OutOfRange {
                index,
                len: registry.len(),
            });
        }
        None
    }

    fn begin_flight(
        &mut self,
        registry: &SceneRegistry,
        index: usize,
        mode: AnimationMode,
    ) -> SelectionOutcome {
        let Some(body) = registry.get(index) else {
            return SelectionOutcome::Ignored(IgnoreReason::OutOfRange {
                index,
                len: registry.len(),
            });
        };

        let target = match self.config.camera.focus {
            FocusAnchor::Base => body.base_position,
            FocusAnchor::Instantaneous => body.position_at(self.scene_time.as_secs_f32()),
        };

        // Only reachable when a guard cleared the flag before the flight
        // finished; the old flight stops where it is.
        if self.animator.is_running() {
            debug!("Superseding flight that outlived its guard window");
            self.animator.cancel();
        }

        let request = CameraAnimationRequest::with_timing(target, mode, &self.config.timing);
        let epoch = match self.animator.start(request) {
            Ok(epoch) => epoch,
            Err(_) => return SelectionOutcome::Ignored(IgnoreReason::Animating),
        };

        self.state.selected_index = Some(index);
        self.state.is_animating = true;
        self.epoch = Some(epoch);
        self.arm_guard(request.nominal_duration, epoch);

        info!(index, name = %body.name, ?mode, epoch, "Selection started");
        SelectionOutcome::Started { index, mode, epoch }
    }

    fn arm_guard(&mut self, window: Duration, epoch: u64) {
        self.disarm_guard();
        let handle = self.scheduler.schedule(window);
        self.guard = Some(Guard { handle, epoch });
    }

    fn disarm_guard(&mut self) {
        if let Some(guard) = self.guard.take() {
            self.scheduler.cancel(guard.handle);
        }
    }

    /// Returns true only for the clearer that actually flipped the flag
    fn clear_animating(&mut self, reason: ClearReason) -> bool {
        if !self.state.is_animating {
            debug!(?reason, "Animating already clear");
            return false;
        }
        self.state.is_animating = false;
        debug!(?reason, "Animating cleared");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::CommunityRecord;

    fn registry(n: usize) -> SceneRegistry {
        let records: Vec<_> = (0..n)
            .map(|i| CommunityRecord::new(i.to_string(), format!("Community {}", i)))
            .collect();
        SceneRegistry::from_records(&records, Default::default())
    }

    fn controller() -> SelectionController {
        SelectionController::new(UniverseConfig::default())
    }

    #[test]
    fn test_rejected_while_animating_is_no_op() {
        let registry = registry(5);
        let mut controller = controller();

        assert!(controller.select_via_search(&registry, 2).is_accepted());
        let before = controller.state();

        assert_eq!(
            controller.select_via_search(&registry, 3),
            SelectionOutcome::Ignored(IgnoreReason::Animating)
        );
        assert_eq!(
            controller.select_via_click(&registry, 2),
            SelectionOutcome::Ignored(IgnoreReason::Animating)
        );
        assert_eq!(controller.state(), before);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let registry = registry(3);
        let mut controller = controller();

        assert_eq!(
            controller.select_via_click(&registry, 3),
            SelectionOutcome::Ignored(IgnoreReason::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(controller.state(), SelectionState::default());
        assert!(!controller.animator().is_running());
    }

    #[test]
    fn test_click_twice_toggles_off() {
        let registry = registry(4);
        let mut controller = controller();

        assert!(matches!(
            controller.select_via_click(&registry, 1),
            SelectionOutcome::Started { index: 1, mode: AnimationMode::DirectEase, .. }
        ));
        assert!(controller.is_animating());

        assert_eq!(controller.tick(Duration::from_millis(1250)), Some(ClearReason::Completed));
        assert!(!controller.is_animating());

        let pose = controller.pose();
        assert_eq!(controller.select_via_click(&registry, 1), SelectionOutcome::ToggledOff { index: 1 });
        assert_eq!(controller.selected_index(&registry), None);
        assert!(!controller.is_animating());
        assert!(!controller.animator().is_running());
        assert_eq!(controller.pose(), pose);
    }

    #[test]
    fn test_completion_and_guard_race_is_idempotent() {
        let registry = registry(5);
        let mut controller = controller();
        controller.select_via_search(&registry, 0);

        // Same deadline: natural completion runs first, the guard sees a
        // clear flag and does nothing
        assert_eq!(controller.tick(Duration::from_millis(3700)), Some(ClearReason::Completed));
        assert!(!controller.is_animating());
        assert_eq!(controller.tick(Duration::from_millis(16)), None);
        assert_eq!(controller.selected_index(&registry), Some(0));
    }

    /// Host timer that runs fast or slow relative to the frame clock
    struct DriftScheduler {
        inner: FrameScheduler,
        factor: f64,
    }

    impl Scheduler for DriftScheduler {
        fn schedule(&mut self, delay: Duration) -> TaskHandle {
            self.inner.schedule(delay.mul_f64(self.factor))
        }

        fn cancel(&mut self, handle: TaskHandle) -> bool {
            self.inner.cancel(handle)
        }

        fn advance(&mut self, elapsed: Duration) -> Vec<TaskHandle> {
            self.inner.advance(elapsed)
        }

        fn is_pending(&self, handle: TaskHandle) -> bool {
            self.inner.is_pending(handle)
        }
    }

    fn drifting(factor: f64) -> SelectionController<DriftScheduler> {
        SelectionController::with_scheduler(
            UniverseConfig::default(),
            DriftScheduler {
                inner: FrameScheduler::new(),
                factor,
            },
        )
    }

    #[test]
    fn test_early_guard_reenables_input_and_new_pick_supersedes() {
        let registry = registry(5);
        let mut controller = drifting(0.5);
        controller.select_via_click(&registry, 2);

        assert_eq!(controller.tick(Duration::from_millis(625)), Some(ClearReason::GuardElapsed));
        assert!(!controller.is_animating());
        assert!(controller.animator().is_running());
        let first_epoch = controller.animator().current_epoch();

        assert!(matches!(
            controller.select_via_click(&registry, 3),
            SelectionOutcome::Started { index: 3, .. }
        ));
        assert!(controller.is_animating());
        assert_ne!(controller.animator().current_epoch(), first_epoch);

        // The superseded flight's completion never shows up
        assert_eq!(controller.tick(Duration::from_millis(625)), Some(ClearReason::GuardElapsed));
        assert_eq!(controller.tick(Duration::from_millis(625)), None);
        assert!(!controller.animator().is_running());
    }

    #[test]
    fn test_toggle_off_after_early_guard_stops_flight() {
        let registry = registry(5);
        let mut controller = drifting(0.5);
        controller.select_via_click(&registry, 2);

        assert_eq!(controller.tick(Duration::from_millis(625)), Some(ClearReason::GuardElapsed));
        assert!(controller.animator().is_running());

        assert_eq!(controller.select_via_click(&registry, 2), SelectionOutcome::ToggledOff { index: 2 });
        assert_eq!(controller.selected_index(&registry), None);
        assert!(!controller.is_animating());
        assert!(!controller.animator().is_running());

        let frozen = controller.pose();
        assert_eq!(controller.tick(Duration::from_millis(300)), None);
        assert_eq!(controller.pose(), frozen);
        assert_eq!(controller.scheduler().inner.pending_count(), 0);
    }

    #[test]
    fn test_stale_guard_does_not_clear_newer_flight() {
        let registry = registry(5);
        let mut controller = drifting(2.0);

        controller.select_via_click(&registry, 1);
        assert_eq!(controller.tick(Duration::from_millis(1250)), Some(ClearReason::Completed));
        assert_eq!(controller.scheduler().inner.pending_count(), 1);

        // The old guard is disarmed when the new flight arms its own
        controller.select_via_search(&registry, 3);
        assert_eq!(controller.scheduler().inner.pending_count(), 1);

        // Past the old guard's deadline, the new flight is still animating
        assert_eq!(controller.tick(Duration::from_millis(1250)), None);
        assert!(controller.is_animating());
        assert_eq!(controller.tick(Duration::from_millis(2450)), Some(ClearReason::Completed));
        assert!(!controller.is_animating());
    }

    #[test]
    fn test_cancel_clears_immediately_and_disarms_guard() {
        let registry = registry(5);
        let mut controller = controller();
        controller.select_via_click(&registry, 1);
        controller.tick(Duration::from_millis(400));

        controller.cancel();
        assert!(!controller.is_animating());
        assert_eq!(controller.selected_index(&registry), None);
        assert_eq!(controller.scheduler().pending_count(), 0);

        let frozen = controller.pose();
        assert_eq!(controller.tick(Duration::from_millis(2000)), None);
        assert_eq!(controller.pose(), frozen);

        // Cancel with nothing running is harmless
        controller.cancel();
        assert_eq!(controller.state(), SelectionState::default());
    }

    #[test]
    fn test_instantaneous_focus_targets_wobble_position() {
        let registry = registry(3);
        let mut config = UniverseConfig::default();
        config.camera.focus = FocusAnchor::Instantaneous;
        let mut controller = SelectionController::new(config);

        controller.tick(Duration::from_secs(4));
        controller.select_via_click(&registry, 2);
        controller.tick(Duration::from_millis(1250));

        let expected = registry.get(2).unwrap().position_at(4.0);
        assert!((controller.pose().look_at - expected).length() < 1e-4);
    }

    #[test]
    fn test_refresh_does_not_clear_but_reads_as_none() {
        let mut registry = registry(5);
        let mut controller = controller();
        controller.select_via_click(&registry, 4);
        controller.tick(Duration::from_millis(1250));

        registry.replace(&[CommunityRecord::new("a", "A"), CommunityRecord::new("b", "B")]);
        assert_eq!(controller.state().selected_index, Some(4));
        assert_eq!(controller.selected_index(&registry), None);
        assert_eq!(controller.snapshot(&registry).selected_index, None);
    }
}
