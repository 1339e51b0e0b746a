//! Universe facade
//!
//! One registry plus one selection controller. The home page and a user's
//! space are the same machinery pointed at different community lists.

use glam::Vec3;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::camera::CameraPose;
use crate::config::UniverseConfig;
use crate::orbit::CommunityRecord;
use crate::registry::SceneRegistry;
use crate::schedule::{FrameScheduler, Scheduler};
use crate::selection::{ClearReason, SelectionController, SelectionOutcome};

/// Which community list a universe shows
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UniverseKind {
    /// Every community
    #[default]
    Home,
    /// Communities a user belongs to
    UserSpace { owner: String },
}

/// How the renderer should style a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEmphasis {
    Normal,
    Selected,
    /// Another body is selected
    Dimmed,
}

/// Boundary output consumed by the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniverseView {
    pub selected_index: Option<usize>,
    pub is_animating: bool,
    pub camera_pose: CameraPose,
}

pub struct Universe<S: Scheduler = FrameScheduler> {
    kind: UniverseKind,
    registry: SceneRegistry,
    controller: SelectionController<S>,
}

impl Universe<FrameScheduler> {
    pub fn new(kind: UniverseKind, config: UniverseConfig) -> Self {
        Self::with_scheduler(kind, config, FrameScheduler::new())
    }
}

impl<S: Scheduler> Universe<S> {
    pub fn with_scheduler(kind: UniverseKind, config: UniverseConfig, scheduler: S) -> Self {
        Self {
            kind,
            registry: SceneRegistry::new(config.layout.clone()),
            controller: SelectionController::with_scheduler(config, scheduler),
        }
    }

    pub fn kind(&self) -> &UniverseKind {
        &self.kind
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &SelectionController<S> {
        &self.controller
    }

    /// Swap in a refetched community list. The selection is left alone;
    /// readers re-validate it against the new length.
    pub fn replace_communities(&mut self, records: &[CommunityRecord]) {
        self.registry.replace(records);
        info!(kind = ?self.kind, count = records.len(), "Communities replaced");
    }

    pub fn select_via_search(&mut self, index: usize) -> SelectionOutcome {
        self.controller.select_via_search(&self.registry, index)
    }

    pub fn select_via_click(&mut self, index: usize) -> SelectionOutcome {
        self.controller.select_via_click(&self.registry, index)
    }

    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    pub fn tick(&mut self, elapsed: Duration) -> Option<ClearReason> {
        self.controller.tick(elapsed)
    }

    /// Manual orbit control while idle
    pub fn set_camera_pose(&mut self, pose: CameraPose) -> bool {
        self.controller.set_camera_pose(pose).is_ok()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.controller.selected_index(&self.registry)
    }

    pub fn is_animating(&self) -> bool {
        self.controller.is_animating()
    }

    pub fn view(&self) -> UniverseView {
        let snapshot = self.controller.snapshot(&self.registry);
        UniverseView {
            selected_index: snapshot.selected_index,
            is_animating: snapshot.is_animating,
            camera_pose: snapshot.camera_pose,
        }
    }

    /// Assistive announcement for the current selection
    pub fn announcement(&self) -> Option<String> {
        let body = self.registry.get(self.selected_index()?)?;
        Some(format!("Now centered on {}", body.name))
    }

    pub fn emphasis(&self, index: usize) -> BodyEmphasis {
        match self.selected_index() {
            None => BodyEmphasis::Normal,
            Some(selected) if selected == index => BodyEmphasis::Selected,
            Some(_) => BodyEmphasis::Dimmed,
        }
    }

    /// Instantaneous body positions at the current scene time
    pub fn body_positions(&self) -> Vec<Vec3> {
        let seconds = self.controller.scene_time().as_secs_f32();
        self.registry
            .bodies()
            .iter()
            .map(|body| body.position_at(seconds))
            .collect()
    }

    pub fn search(&self, query: &str) -> Vec<usize> {
        self.registry.search(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::IgnoreReason;
    use std::f32::consts::TAU;

    fn records(n: usize) -> Vec<CommunityRecord> {
        (0..n)
            .map(|i| CommunityRecord::new(i.to_string(), format!("Community {}", i)))
            .collect()
    }

    fn universe(n: usize) -> Universe {
        let mut universe = Universe::new(UniverseKind::Home, UniverseConfig::default());
        universe.replace_communities(&records(n));
        universe
    }

    /// Drive the universe with 10ms frames
    fn run_for(universe: &mut Universe, ms: u64) {
        for _ in 0..(ms / 10) {
            universe.tick(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_search_selection_scenario() {
        let mut universe = universe(5);

        assert!(universe.select_via_search(2).is_accepted());
        let view = universe.view();
        assert_eq!(view.selected_index, Some(2));
        assert!(view.is_animating);

        run_for(&mut universe, 3690);
        assert!(universe.is_animating());
        run_for(&mut universe, 10);
        assert!(!universe.is_animating());

        let target = universe.registry().get(2).unwrap().base_position;
        let pose = universe.view().camera_pose;
        assert!((pose.look_at - target).length() < 1e-4);
        assert!((pose.effective_position() - (target + Vec3::new(0.0, 2.0, 6.0))).length() < 1e-3);
        assert!((pose.extra_yaw - 3.0 * TAU).abs() < 1e-3);
        assert_eq!(universe.announcement().as_deref(), Some("Now centered on Community 2"));
    }

    #[test]
    fn test_shrunk_list_reads_as_no_selection() {
        let mut universe = universe(5);
        universe.select_via_click(4);
        run_for(&mut universe, 1250);
        assert_eq!(universe.selected_index(), Some(4));

        universe.replace_communities(&records(3));
        assert_eq!(universe.selected_index(), None);
        assert_eq!(universe.view().selected_index, None);
        assert_eq!(universe.announcement(), None);
        assert!((0..3).all(|i| universe.emphasis(i) == BodyEmphasis::Normal));

        // A stale index is out of range for new requests too
        assert_eq!(
            universe.select_via_click(4),
            SelectionOutcome::Ignored(IgnoreReason::OutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn test_click_then_cancel_before_guard() {
        let mut universe = universe(5);
        universe.select_via_click(1);
        run_for(&mut universe, 500);
        assert!(universe.is_animating());

        universe.cancel();
        let view = universe.view();
        assert!(!view.is_animating);
        assert_eq!(view.selected_index, None);

        // Nothing moves after the cancel, including past the old window
        let frozen = view.camera_pose;
        run_for(&mut universe, 1000);
        assert_eq!(universe.view().camera_pose, frozen);
        assert!(!universe.is_animating());
    }

    #[test]
    fn test_cancel_mid_triple_spin() {
        let mut universe = universe(5);
        universe.select_via_search(0);
        universe.tick(Duration::from_millis(1850));
        universe.cancel();

        let pose = universe.view().camera_pose;
        assert!((pose.extra_yaw - 0.5 * 3.0 * TAU).abs() < 1e-4);

        universe.tick(Duration::from_millis(100));
        assert_eq!(universe.view().camera_pose, pose);
    }

    #[test]
    fn test_emphasis_and_toggle() {
        let mut universe = universe(3);
        universe.select_via_click(1);
        assert_eq!(universe.emphasis(1), BodyEmphasis::Selected);
        assert_eq!(universe.emphasis(0), BodyEmphasis::Dimmed);

        run_for(&mut universe, 1250);
        assert_eq!(universe.select_via_click(1), SelectionOutcome::ToggledOff { index: 1 });
        assert_eq!(universe.emphasis(0), BodyEmphasis::Normal);
        assert!(!universe.is_animating());
    }

    #[test]
    fn test_manual_pose_refused_during_flight() {
        let mut universe = universe(2);
        let manual = CameraPose::new(Vec3::new(0.0, 3.0, 10.0), Vec3::ZERO);
        assert!(universe.set_camera_pose(manual));

        universe.select_via_click(0);
        assert!(!universe.set_camera_pose(manual));
        run_for(&mut universe, 1250);
        assert!(universe.set_camera_pose(manual));
        assert_eq!(universe.view().camera_pose, manual);
    }

    #[test]
    fn test_user_space_shares_behaviour() {
        let mut universe = Universe::new(
            UniverseKind::UserSpace {
                owner: "ada".to_string(),
            },
            UniverseConfig::default(),
        );
        assert!(universe.registry().is_empty());
        assert!(!universe.select_via_search(0).is_accepted());

        universe.replace_communities(&records(2));
        assert!(universe.select_via_search(1).is_accepted());
        assert_eq!(universe.body_positions().len(), 2);
    }

    #[test]
    fn test_view_serializes_for_host() {
        let universe = universe(1);
        let json = serde_json::to_value(universe.view()).unwrap();
        assert_eq!(json["selected_index"], serde_json::Value::Null);
        assert_eq!(json["is_animating"], false);
        assert!(json["camera_pose"]["position"].is_array());
    }
}
