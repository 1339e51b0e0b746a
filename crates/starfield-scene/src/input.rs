//! Input adapter: pointer picks, Escape and search picks become selection
//! requests, which are then applied to the universe in one place

use bevy::prelude::*;
use starfield_core::{SelectionOutcome, Universe};

use crate::bodies::OrbitBodyEntity;
use crate::camera::MainCamera;
use crate::types::{SelectionRequest, UniverseState, UniverseSystems};

/// Pointer travel beyond which a touch is a drag rather than a tap
const TAP_SLOP_PX: f32 = 10.0;

/// Extra pick margin around a planet's visible radius
const PICK_MARGIN: f32 = 1.2;

/// Plugin for user input handling
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .add_systems(
                Update,
                (handle_body_pick, handle_escape).in_set(UniverseSystems::Input),
            )
            .add_systems(Update, apply_selection_requests.in_set(UniverseSystems::Apply));
    }
}

/// Track pointer state for tap detection
#[derive(Resource, Default)]
pub struct PointerState {
    /// Position where touch started
    start_position: Option<Vec2>,
    /// Whether this touch has moved significantly (is a drag, not a tap)
    is_dragging: bool,
    /// Cursor position when the left button went down
    press_position: Option<Vec2>,
}

/// Nearest body hit by a ray, given `(index, center, radius)` candidates
pub fn pick_body(
    origin: Vec3,
    direction: Vec3,
    bodies: impl IntoIterator<Item = (usize, Vec3, f32)>,
) -> Option<usize> {
    let mut closest: Option<(f32, usize)> = None;

    for (index, center, radius) in bodies {
        let t = (center - origin).dot(direction);
        if t < 0.0 {
            continue;
        }

        let closest_point = origin + direction * t;
        let hit_radius = radius * PICK_MARGIN;
        if (closest_point - center).length_squared() < hit_radius * hit_radius
            && closest.is_none_or(|(best, _)| t < best)
        {
            closest = Some((t, index));
        }
    }

    closest.map(|(_, index)| index)
}

/// Handle planet selection via mouse click or touch tap
fn handle_body_pick(
    mut requests: MessageWriter<SelectionRequest>,
    universe: Res<UniverseState>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    body_query: Query<(&OrbitBodyEntity, &GlobalTransform)>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    mut contexts: bevy_egui::EguiContexts,
    mut pointer: ResMut<PointerState>,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if egui_wants_pointer {
        return;
    }

    let mut selection_pos: Option<Vec2> = None;

    if let Some(touch) = touch_input.iter().next() {
        if touch_input.just_pressed(touch.id()) {
            pointer.start_position = Some(touch.position());
            pointer.is_dragging = false;
        } else if let Some(start) = pointer.start_position {
            if touch.position().distance(start) > TAP_SLOP_PX {
                pointer.is_dragging = true;
            }
        }
    }

    // Detect touch release (tap) - select if it wasn't a drag
    for touch in touch_input.iter_just_released() {
        if !pointer.is_dragging && pointer.start_position.is_some() {
            selection_pos = pointer.start_position.or(Some(touch.position()));
        }
        pointer.start_position = None;
        pointer.is_dragging = false;
    }

    // Mouse click (desktop). Dragging to orbit also starts with a press,
    // so only a release near the press position counts as a pick.
    let cursor = windows.single().ok().and_then(|window| window.cursor_position());
    if mouse_button.just_pressed(MouseButton::Left) {
        pointer.press_position = cursor;
    }
    if mouse_button.just_released(MouseButton::Left) {
        if let (Some(pressed), Some(released)) = (pointer.press_position.take(), cursor) {
            if pressed.distance(released) <= TAP_SLOP_PX {
                selection_pos = Some(released);
            }
        }
    }

    let Some(pos) = selection_pos else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, pos) else {
        return;
    };

    let generation = universe.registry().generation();
    let candidates = body_query
        .iter()
        .filter(|(body, _)| body.generation == generation)
        .map(|(body, transform)| (body.index, transform.translation(), body.radius));

    if let Some(index) = pick_body(ray.origin, *ray.direction, candidates) {
        requests.write(SelectionRequest::Click { index, generation });
    }
}

/// Escape stops the flight where it is and clears the selection
fn handle_escape(mut requests: MessageWriter<SelectionRequest>, keyboard: Res<ButtonInput<KeyCode>>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        requests.write(SelectionRequest::Cancel);
    }
}

/// The single place selection requests reach the universe
fn apply_selection_requests(
    mut requests: MessageReader<SelectionRequest>,
    mut universe: ResMut<UniverseState>,
) {
    for request in requests.read() {
        if let Some(SelectionOutcome::Ignored(reason)) = apply_request(&mut universe, *request) {
            tracing::debug!(?request, ?reason, "Selection request ignored");
        }
    }
}

/// Apply one request. Picks read from an older body list are dropped, since
/// their index may name a different community now.
pub fn apply_request(universe: &mut Universe, request: SelectionRequest) -> Option<SelectionOutcome> {
    let current = universe.registry().generation();
    match request {
        SelectionRequest::Search { generation, .. } | SelectionRequest::Click { generation, .. }
            if generation != current =>
        {
            tracing::debug!(?request, current, "Dropping pick from a replaced body list");
            None
        }
        SelectionRequest::Search { index, .. } => Some(universe.select_via_search(index)),
        SelectionRequest::Click { index, .. } => Some(universe.select_via_click(index)),
        SelectionRequest::Cancel => {
            universe.cancel();
            None
        }
    }
}
