//! Planet entities: spawned per community, moved along their orbits, and
//! styled by selection

use bevy::prelude::*;
use starfield_core::{BodyEmphasis, OrbitBody};

use crate::types::{CommunitiesLoaded, UniverseState, UniverseSystems};

/// World units per unit of `OrbitBody::visual_size`
pub const SIZE_TO_RADIUS: f32 = 0.005;

/// Opacity of bodies dimmed behind a selection
const DIMMED_ALPHA: f32 = 0.3;

/// Marker component for planet entities
#[derive(Component)]
pub struct OrbitBodyEntity {
    /// Position in the body list the entity was spawned from
    pub index: usize,
    /// Registry generation the entity belongs to
    pub generation: u64,
    pub radius: f32,
    pub color: [f32; 3],
    pub emphasis: BodyEmphasis,
}

/// Plugin for planet entities
pub struct BodiesPlugin;

impl Plugin for BodiesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_community_lists.in_set(UniverseSystems::Apply))
            .add_systems(
                Update,
                (update_body_transforms, update_body_emphasis).in_set(UniverseSystems::Present),
            );
    }
}

pub fn body_radius(body: &OrbitBody) -> f32 {
    body.visual_size * SIZE_TO_RADIUS
}

/// Material parameters for an emphasis state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyStyle {
    pub alpha: f32,
    /// Emissive multiplier applied to the body color
    pub glow: f32,
    pub scale: f32,
}

pub fn body_style(emphasis: BodyEmphasis) -> BodyStyle {
    match emphasis {
        BodyEmphasis::Normal => BodyStyle {
            alpha: 1.0,
            glow: 0.15,
            scale: 1.0,
        },
        BodyEmphasis::Selected => BodyStyle {
            alpha: 1.0,
            glow: 0.8,
            scale: 1.25,
        },
        BodyEmphasis::Dimmed => BodyStyle {
            alpha: DIMMED_ALPHA,
            glow: 0.0,
            scale: 1.0,
        },
    }
}

fn apply_style(material: &mut StandardMaterial, color: [f32; 3], style: BodyStyle) {
    let [r, g, b] = color;
    material.base_color = Color::srgba(r, g, b, style.alpha);
    material.emissive = LinearRgba::new(r * style.glow, g * style.glow, b * style.glow, 1.0);
    material.alpha_mode = if style.alpha < 1.0 {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    };
}

/// Replace every planet when a new community list arrives
fn apply_community_lists(
    mut commands: Commands,
    mut loaded: MessageReader<CommunitiesLoaded>,
    mut universe: ResMut<UniverseState>,
    existing: Query<Entity, With<OrbitBodyEntity>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Only the newest list matters if several arrived in one frame
    let Some(CommunitiesLoaded(records)) = loaded.read().last() else {
        return;
    };

    universe.replace_communities(records);

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let generation = universe.registry().generation();
    let unit_sphere = meshes.add(Sphere::new(1.0));

    for (index, body) in universe.registry().bodies().iter().enumerate() {
        let radius = body_radius(body);
        let color = body.color.to_srgb_f32();
        let emphasis = universe.emphasis(index);

        let mut material = StandardMaterial {
            metallic: 0.1,
            perceptual_roughness: 0.6,
            ..default()
        };
        apply_style(&mut material, color, body_style(emphasis));

        commands.spawn((
            Mesh3d(unit_sphere.clone()),
            MeshMaterial3d(materials.add(material)),
            Transform::from_translation(body.base_position)
                .with_scale(Vec3::splat(radius * body_style(emphasis).scale)),
            OrbitBodyEntity {
                index,
                generation,
                radius,
                color,
                emphasis,
            },
        ));
    }

    tracing::info!(count = records.len(), generation, "Spawned community planets");
}

/// Move planets along their secondary orbits
fn update_body_transforms(
    universe: Res<UniverseState>,
    mut bodies: Query<(&OrbitBodyEntity, &mut Transform)>,
) {
    let positions = universe.body_positions();
    let generation = universe.registry().generation();

    for (body, mut transform) in bodies.iter_mut() {
        if body.generation != generation {
            continue;
        }
        if let Some(position) = positions.get(body.index) {
            transform.translation = *position;
        }
    }
}

/// Highlight the selected planet and dim the rest
fn update_body_emphasis(
    universe: Res<UniverseState>,
    mut bodies: Query<(
        &mut OrbitBodyEntity,
        &mut Transform,
        &MeshMaterial3d<StandardMaterial>,
    )>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (mut body, mut transform, material_handle) in bodies.iter_mut() {
        let emphasis = universe.emphasis(body.index);
        if emphasis == body.emphasis {
            continue;
        }

        let style = body_style(emphasis);
        if let Some(material) = materials.get_mut(&material_handle.0) {
            apply_style(material, body.color, style);
        }
        transform.scale = Vec3::splat(body.radius * style.scale);
        body.emphasis = emphasis;
    }
}
