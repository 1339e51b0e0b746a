//! Shared resources, messages and system sets for the universe scene

use bevy::prelude::*;
use starfield_core::config::CameraConfig;
use starfield_core::{CommunityRecord, Universe, UniverseConfig, UniverseKind};

/// The universe being shown, owned by the ECS world
#[derive(Resource, Deref, DerefMut)]
pub struct UniverseState(pub Universe);

impl UniverseState {
    pub fn new(kind: UniverseKind, config: UniverseConfig) -> Self {
        Self(Universe::new(kind, config))
    }
}

/// Frame phases. Input is applied before the universe advances, so a
/// cancel pressed between frames preempts the next interpolation step.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum UniverseSystems {
    /// Pointer, keyboard and search input become `SelectionRequest`s
    Input,
    /// Requests and community lists are applied to the universe
    Apply,
    /// Scene time and the camera flight advance
    Advance,
    /// Transforms, materials and announcements follow the universe
    Present,
}

/// A fresh community list from the backend. Replaces the bodies wholesale.
#[derive(Message, Debug, Clone)]
pub struct CommunitiesLoaded(pub Vec<CommunityRecord>);

/// User intent forwarded by the input adapter. Picks carry the registry
/// generation their index was read from.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRequest {
    Search { index: usize, generation: u64 },
    Click { index: usize, generation: u64 },
    Cancel,
}

/// Drag-to-rotate and scroll-to-zoom settings, applied only while no
/// flight owns the camera
#[derive(Debug, Clone, Resource)]
pub struct OrbitControls {
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitControls {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        }
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

/// "Now centered on ..." text for assistive announcement
#[derive(Debug, Clone, Resource, Default)]
pub struct Announcement {
    pub text: Option<String>,
    pub(crate) source: Option<(usize, u64)>,
}

/// Search box state
#[derive(Debug, Clone, Resource, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<usize>,
    /// Registry generation the results were computed against
    pub generation: u64,
}

impl SearchState {
    /// Recompute results if the query or the body list changed
    pub fn refresh(&mut self, universe: &Universe, query_changed: bool) {
        let generation = universe.registry().generation();
        if query_changed || generation != self.generation {
            self.results = universe.search(&self.query);
            self.generation = generation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_refreshes_on_new_list() {
        let mut universe = Universe::new(UniverseKind::Home, UniverseConfig::default());
        universe.replace_communities(&[
            CommunityRecord::new("1", "Rust Guild"),
            CommunityRecord::new("2", "Go Club"),
        ]);

        let mut search = SearchState {
            query: "rust".to_string(),
            ..Default::default()
        };
        search.refresh(&universe, true);
        assert_eq!(search.results, vec![0]);

        // Same query, reordered list: stale indices are recomputed
        universe.replace_communities(&[
            CommunityRecord::new("2", "Go Club"),
            CommunityRecord::new("1", "Rust Guild"),
        ]);
        search.refresh(&universe, false);
        assert_eq!(search.results, vec![1]);
    }
}
