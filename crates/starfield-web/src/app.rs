//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use starfield_core::UniverseConfig;
use starfield_scene::StarfieldScenePlugin;

use crate::feed::{FeedConfig, FeedPlugin};

pub fn run() {
    let feed = FeedConfig::from_browser();
    let title = match &feed.kind {
        starfield_core::UniverseKind::Home => "Starfield - Communities".to_string(),
        starfield_core::UniverseKind::UserSpace { owner } => format!("Starfield - {}", owner),
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title,
                canvas: Some("#starfield-canvas".to_string()),
                fit_canvas_to_parent: true,
                prevent_default_event_handling: false,
                ..default()
            }),
            ..default()
        }))
        // DefaultPickingPlugins must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(StarfieldScenePlugin {
            kind: feed.kind.clone(),
            config: UniverseConfig::default(),
        })
        .add_plugins(FeedPlugin { config: feed })
        .run();
}
