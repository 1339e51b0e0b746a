//! Scene setup - camera, lights, and the starfield backdrop

use bevy::prelude::*;

use crate::camera::MainCamera;
use crate::types::{UniverseState, UniverseSystems};

/// Marker component for backdrop stars
#[derive(Component)]
pub struct BackdropStar;

const STAR_COUNT: usize = 600;
const STAR_SHELL_RADIUS: f32 = 120.0;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb(0.01, 0.01, 0.04)))
            .add_systems(Startup, setup_scene)
            .add_systems(Update, advance_universe.in_set(UniverseSystems::Advance));
    }
}

/// Drive scene time, the camera flight and the input guard from the frame clock
fn advance_universe(time: Res<Time>, mut universe: ResMut<UniverseState>) {
    if let Some(reason) = universe.tick(time.delta()) {
        tracing::debug!(?reason, "Selection input re-enabled");
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    universe: Res<UniverseState>,
) {
    // Y is up; the camera starts at the configured pose
    let pose = universe.view().camera_pose;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.05,
            far: 500.0,
            ..default()
        }),
        Transform::from_translation(pose.effective_position()).looking_at(pose.look_at, Vec3::Y),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.7, 0.75, 1.0),
        brightness: 150.0,
        ..default()
    });

    // Central star lighting the planets
    commands.spawn((
        PointLight {
            intensity: 4_000_000.0,
            range: 80.0,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.95, 0.85),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 0.0),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 1500.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let star_mesh = meshes.add(Sphere::new(0.12));
    let star_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        emissive: LinearRgba::new(2.0, 2.0, 2.2, 1.0),
        unlit: true,
        ..default()
    });

    for position in star_shell(STAR_COUNT, STAR_SHELL_RADIUS) {
        commands.spawn((
            Mesh3d(star_mesh.clone()),
            MeshMaterial3d(star_material.clone()),
            Transform::from_translation(position),
            BackdropStar,
        ));
    }
}

/// Evenly spread points on a sphere (Fibonacci lattice)
pub fn star_shell(count: usize, radius: f32) -> Vec<Vec3> {
    let golden = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden * i as f32;
            Vec3::new(ring * theta.cos(), y, ring * theta.sin()) * radius
        })
        .collect()
}
