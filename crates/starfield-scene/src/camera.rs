//! Camera pose application and manual orbit navigation

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use starfield_core::CameraPose;

use crate::types::{OrbitControls, UniverseState, UniverseSystems};

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, update_orbit_controls.in_set(UniverseSystems::Input))
            .add_systems(Update, apply_camera_pose.in_set(UniverseSystems::Present));
    }
}

/// Elevation limit, just short of the poles
const MAX_ELEVATION: f32 = 1.5;

/// Rotate and zoom a pose about its look-at point.
///
/// Any pending spin is folded into the position first, so the drag starts
/// from exactly what is on screen.
pub fn orbit_pose(
    pose: CameraPose,
    d_azimuth: f32,
    d_elevation: f32,
    zoom_factor: f32,
    controls: &OrbitControls,
) -> CameraPose {
    let settled = pose.settled();
    let offset = settled.position - settled.look_at;
    let distance = offset.length().max(f32::EPSILON);

    let azimuth = offset.z.atan2(offset.x) + d_azimuth;
    let elevation = ((offset.y / distance).clamp(-1.0, 1.0).asin() + d_elevation)
        .clamp(-MAX_ELEVATION, MAX_ELEVATION);
    let distance = (distance * zoom_factor).clamp(controls.min_distance, controls.max_distance);

    let position = settled.look_at
        + Vec3::new(
            distance * elevation.cos() * azimuth.cos(),
            distance * elevation.sin(),
            distance * elevation.cos() * azimuth.sin(),
        );
    CameraPose::new(position, settled.look_at)
}

/// Drag to rotate, scroll or pinch to zoom. Ignored while a flight owns
/// the camera.
fn update_orbit_controls(
    mut universe: ResMut<UniverseState>,
    controls: Res<OrbitControls>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut contexts: bevy_egui::EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }
    // Drain the scroll events even if we're not using them
    let scroll: f32 = mouse_wheel.read().map(|wheel| wheel.y).sum();

    if egui_wants_pointer || universe.controller().animator().is_running() {
        return;
    }

    let mut rotate = Vec2::ZERO;
    let mut zoom_factor = 1.0;

    if mouse_button.pressed(MouseButton::Left) {
        rotate += total_motion;
    }
    if scroll != 0.0 {
        zoom_factor *= 1.0 - scroll * controls.zoom_speed * 0.3;
    }

    // Touch support for mobile
    let touches: Vec<_> = touch_input.iter().collect();
    match touches.as_slice() {
        [touch] => rotate += touch.delta(),
        [t1, t2] => {
            let curr_dist = t1.position().distance(t2.position());
            let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            zoom_factor *= prev_dist / curr_dist.max(1.0);
        }
        _ => {}
    }

    if rotate == Vec2::ZERO && zoom_factor == 1.0 {
        return;
    }

    let pose = orbit_pose(
        universe.view().camera_pose,
        -rotate.x * controls.sensitivity,
        -rotate.y * controls.sensitivity,
        zoom_factor,
        &controls,
    );
    universe.set_camera_pose(pose);
}

/// Copy the universe's camera pose onto the render camera
fn apply_camera_pose(
    universe: Res<UniverseState>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };

    let pose = universe.view().camera_pose;
    transform.translation = pose.effective_position();
    transform.look_at(pose.look_at, Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_preserves_distance_and_target() {
        let controls = OrbitControls::default();
        let pose = CameraPose::new(Vec3::new(0.0, 2.0, 6.0) + Vec3::X, Vec3::X);
        let distance = (pose.position - pose.look_at).length();

        let rotated = orbit_pose(pose, 0.7, -0.2, 1.0, &controls);
        assert_eq!(rotated.look_at, Vec3::X);
        assert!(((rotated.position - rotated.look_at).length() - distance).abs() < 1e-4);
        assert!((rotated.position - pose.position).length() > 0.1);
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let controls = OrbitControls::default();
        let pose = CameraPose::new(Vec3::new(3.0, 4.0, -5.0), Vec3::new(0.5, 0.0, 0.5));
        let same = orbit_pose(pose, 0.0, 0.0, 1.0, &controls);
        assert!((same.position - pose.position).length() < 1e-4);
    }

    #[test]
    fn test_zoom_and_elevation_are_clamped() {
        let controls = OrbitControls::default();
        let pose = CameraPose::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);

        let near = orbit_pose(pose, 0.0, 0.0, 0.001, &controls);
        assert!(((near.position - near.look_at).length() - controls.min_distance).abs() < 1e-4);

        let far = orbit_pose(pose, 0.0, 0.0, 1000.0, &controls);
        assert!(((far.position - far.look_at).length() - controls.max_distance).abs() < 1e-3);

        let top = orbit_pose(pose, 0.0, 10.0, 1.0, &controls);
        assert!((top.position.y / 10.0 - MAX_ELEVATION.sin()).abs() < 1e-4);
    }

    #[test]
    fn test_pending_spin_is_folded_in() {
        let controls = OrbitControls::default();
        let pose = CameraPose {
            position: Vec3::new(0.0, 0.0, 10.0),
            look_at: Vec3::ZERO,
            extra_yaw: std::f32::consts::PI,
        };
        let result = orbit_pose(pose, 0.0, 0.0, 1.0, &controls);
        assert_eq!(result.extra_yaw, 0.0);
        assert!((result.position - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-3);
    }
}
