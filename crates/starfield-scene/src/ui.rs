//! Search panel and selection announcement using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use starfield_core::UniverseKind;

use crate::types::{Announcement, SearchState, SelectionRequest, UniverseState, UniverseSystems};

/// Search results shown at once
const MAX_RESULTS: usize = 8;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, update_announcement.in_set(UniverseSystems::Present))
            // Main UI system runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// Recompute the announcement whenever the effective selection changes
fn update_announcement(universe: Res<UniverseState>, mut announcement: ResMut<Announcement>) {
    let source = universe
        .selected_index()
        .map(|index| (index, universe.registry().generation()));
    if source == announcement.source {
        return;
    }

    announcement.source = source;
    announcement.text = universe.announcement();
    if let Some(text) = &announcement.text {
        tracing::info!("{}", text);
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    universe: Res<UniverseState>,
    mut search: ResMut<SearchState>,
    announcement: Res<Announcement>,
    mut requests: MessageWriter<SelectionRequest>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let title = match universe.kind() {
        UniverseKind::Home => "Explore communities".to_string(),
        UniverseKind::UserSpace { owner } => format!("{}'s space", owner),
    };
    let is_animating = universe.is_animating();

    egui::Window::new(title)
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            if universe.registry().is_empty() {
                ui.label("No communities to show yet");
                return;
            }

            let response = ui.add(
                egui::TextEdit::singleline(&mut search.query).hint_text("Search communities"),
            );
            search.refresh(&universe, response.changed());

            let registry = universe.registry();
            for &index in search.results.iter().take(MAX_RESULTS) {
                let Some(body) = registry.get(index) else {
                    continue;
                };
                let selected = universe.selected_index() == Some(index);
                let button = ui.add_enabled(
                    !is_animating,
                    egui::Button::selectable(selected, body.name.as_str()),
                );
                if button.clicked() {
                    requests.write(SelectionRequest::Search {
                        index,
                        generation: search.generation,
                    });
                }
            }
            if search.results.len() > MAX_RESULTS {
                ui.weak(format!("{} more", search.results.len() - MAX_RESULTS));
            }

            ui.separator();
            match &announcement.text {
                Some(text) => {
                    ui.label(text);
                    ui.weak("Esc to stop and deselect");
                }
                None => {
                    ui.weak(format!("{} communities in orbit", registry.len()));
                }
            }
        });
}
