//! Starfield Core - Universe navigation and camera animation
//!
//! This crate provides the control logic behind the universe views:
//! - Deterministic orbit layout of communities as planets
//! - Selection arbitration (search pick, direct click, cancel)
//! - Camera flights with direct-ease and triple-spin profiles
//! - Guard-window scheduling driven by the host frame loop
//!
//! Rendering lives in `starfield-scene`; this crate has no engine
//! dependency and is driven entirely through `tick`.

pub mod camera;
pub mod config;
pub mod orbit;
pub mod registry;
pub mod schedule;
pub mod selection;
pub mod universe;

pub use camera::{
    ease_in_out, AnimationError, AnimationEvent, AnimationMode, AnimatorPhase,
    CameraAnimationRequest, CameraAnimator, CameraPose, DIRECT_EASE_MS, SPIN_TURNS,
    TRIPLE_SPIN_MS,
};
pub use config::{ConfigError, FocusAnchor, UniverseConfig};
pub use orbit::{BodyColor, CommunityId, CommunityRecord, OrbitBody};
pub use registry::{derive_visuals, SceneRegistry};
pub use schedule::{FrameScheduler, Scheduler, TaskHandle};
pub use selection::{
    ClearReason, IgnoreReason, SelectionController, SelectionOutcome, SelectionSnapshot,
    SelectionState,
};
pub use universe::{BodyEmphasis, Universe, UniverseKind, UniverseView};
