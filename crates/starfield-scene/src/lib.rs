//! Starfield Scene - Bevy rendering and input for the universe views
//!
//! This crate wires `starfield-core` into a Bevy app: it spawns one
//! planet per community, drives the universe from the frame loop, turns
//! pointer, keyboard and search input into selection requests, and
//! applies the resulting camera pose. Both the home page and a user's
//! space use the same plugin with a different [`UniverseKind`].

pub mod bodies;
pub mod camera;
pub mod input;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;
use starfield_core::{UniverseConfig, UniverseKind};

/// Plugin that sets up the universe scene
pub struct StarfieldScenePlugin {
    pub kind: UniverseKind,
    pub config: UniverseConfig,
}

impl Plugin for StarfieldScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(types::UniverseState::new(self.kind.clone(), self.config.clone()))
            .insert_resource(types::OrbitControls::from_config(&self.config.camera))
            .init_resource::<types::Announcement>()
            .init_resource::<types::SearchState>()
            .add_message::<types::CommunitiesLoaded>()
            .add_message::<types::SelectionRequest>()
            .configure_sets(
                Update,
                (
                    types::UniverseSystems::Input,
                    types::UniverseSystems::Apply,
                    types::UniverseSystems::Advance,
                    types::UniverseSystems::Present,
                )
                    .chain(),
            )
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(bodies::BodiesPlugin)
            .add_plugins(input::InputPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use types::*;
pub use camera::MainCamera;
