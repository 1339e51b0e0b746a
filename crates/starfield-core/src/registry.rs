//! Scene registry: community records to render-ready orbit bodies

use glam::Vec3;
use tracing::info;

use crate::config::LayoutConfig;
use crate::orbit::{CommunityId, CommunityRecord, OrbitBody};

/// Derive deterministic visuals for a community list.
///
/// Placement uses golden-angle spacing with tiered radius and height, so
/// the same list in the same order always lands in the same spots. An
/// empty input gives an empty output.
pub fn derive_visuals(records: &[CommunityRecord], layout: &LayoutConfig) -> Vec<OrbitBody> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            // f64 keeps i * 137.5 exact for any realistic list length
            let angle = ((i as f64 * layout.golden_angle_deg as f64) % 360.0).to_radians() as f32;
            let radius = layout.base_radius + (i % layout.radius_tiers) as f32 * layout.radius_step;
            let height = (i % layout.height_tiers) as f32 - layout.height_offset;

            OrbitBody {
                id: record.id.clone(),
                name: record.name.clone(),
                base_position: Vec3::new(radius * angle.cos(), height, radius * angle.sin()),
                orbit_radius: layout.orbit_radius_base
                    + (i % layout.orbit_radius_tiers) as f32 * layout.orbit_radius_step,
                orbit_speed: layout.orbit_speed_base
                    + (i % layout.orbit_speed_tiers) as f32 * layout.orbit_speed_step,
                visual_size: layout.size_base + (i % layout.size_tiers) as f32 * layout.size_step,
                color: layout.palette[i % layout.palette.len()],
            }
        })
        .collect()
}

/// Ordered body list for the universe currently on screen.
///
/// The list is replaced wholesale on every refetch and never edited in
/// place; `generation` counts replacements.
#[derive(Debug, Clone, Default)]
pub struct SceneRegistry {
    bodies: Vec<OrbitBody>,
    generation: u64,
    layout: LayoutConfig,
}

impl SceneRegistry {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            bodies: Vec::new(),
            generation: 0,
            layout,
        }
    }

    pub fn from_records(records: &[CommunityRecord], layout: LayoutConfig) -> Self {
        let mut registry = Self::new(layout);
        registry.replace(records);
        registry
    }

    /// Rebuild the body list from a fresh community list
    pub fn replace(&mut self, records: &[CommunityRecord]) {
        self.bodies = derive_visuals(records, &self.layout);
        self.generation += 1;
        info!(
            count = self.bodies.len(),
            generation = self.generation,
            "Scene registry replaced"
        );
    }

    pub fn bodies(&self) -> &[OrbitBody] {
        &self.bodies
    }

    pub fn get(&self, index: usize) -> Option<&OrbitBody> {
        self.bodies.get(index)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// No bodies is a loading/empty UI state, not an error
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < self.bodies.len()
    }

    /// Re-validate a retained index against the live list
    pub fn resolve(&self, index: Option<usize>) -> Option<usize> {
        index.filter(|&i| self.contains_index(i))
    }

    pub fn index_of(&self, id: &CommunityId) -> Option<usize> {
        self.bodies.iter().position(|body| &body.id == id)
    }

    /// Indices of bodies whose name contains `query`, case-insensitively
    pub fn search(&self, query: &str) -> Vec<usize> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, body)| body.name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<CommunityRecord> {
        (0..n)
            .map(|i| CommunityRecord::new(i.to_string(), format!("Community {}", i)))
            .collect()
    }

    #[test]
    fn test_derive_visuals_is_deterministic() {
        let input = records(40);
        let layout = LayoutConfig::default();
        assert_eq!(derive_visuals(&input, &layout), derive_visuals(&input, &layout));
    }

    #[test]
    fn test_derive_visuals_formula() {
        let layout = LayoutConfig::default();
        let bodies = derive_visuals(&records(6), &layout);

        // Index 0: angle 0, radius 8, height -3
        assert!((bodies[0].base_position - Vec3::new(8.0, -3.0, 0.0)).length() < 1e-4);
        assert!((bodies[0].orbit_radius - 0.3).abs() < 1e-6);
        assert!((bodies[0].orbit_speed - 0.08).abs() < 1e-6);
        assert_eq!(bodies[0].visual_size, 80.0);
        assert_eq!(bodies[0].color, layout.palette[0]);

        // Index 5: angle 687.5 mod 360 = 327.5, radius 8 + 2*2, height 2
        let angle = 327.5_f32.to_radians();
        let expected = Vec3::new(12.0 * angle.cos(), 2.0, 12.0 * angle.sin());
        assert!((bodies[5].base_position - expected).length() < 1e-4);
        assert!((bodies[5].orbit_radius - 0.4).abs() < 1e-6);
        assert!((bodies[5].orbit_speed - 0.08).abs() < 1e-6);
        assert_eq!(bodies[5].visual_size, 80.0);
        assert_eq!(bodies[5].color, layout.palette[5]);
        assert_eq!(bodies[5].name, "Community 5");
    }

    #[test]
    fn test_base_positions_are_distinct() {
        let bodies = derive_visuals(&records(500), &LayoutConfig::default());
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let gap = (bodies[i].base_position - bodies[j].base_position).length();
                assert!(gap > 1e-3, "bodies {} and {} coincide", i, j);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(derive_visuals(&[], &LayoutConfig::default()).is_empty());
        let registry = SceneRegistry::from_records(&[], LayoutConfig::default());
        assert!(registry.is_empty());
        assert_eq!(registry.resolve(Some(0)), None);
    }

    #[test]
    fn test_replace_bumps_generation_and_resolves_stale_index() {
        let mut registry = SceneRegistry::from_records(&records(5), LayoutConfig::default());
        assert_eq!(registry.generation(), 1);
        assert_eq!(registry.resolve(Some(4)), Some(4));

        registry.replace(&records(3));
        assert_eq!(registry.generation(), 2);
        assert_eq!(registry.resolve(Some(4)), None);
        assert_eq!(registry.resolve(Some(2)), Some(2));
        assert_eq!(registry.resolve(None), None);
    }

    #[test]
    fn test_search_and_lookup() {
        let registry = SceneRegistry::from_records(
            &[
                CommunityRecord::new("1", "Night Sky Watchers"),
                CommunityRecord::new("2", "Sourdough"),
                CommunityRecord::new("3", "Skyline Photography"),
            ],
            LayoutConfig::default(),
        );

        assert_eq!(registry.search("sky"), vec![0, 2]);
        assert_eq!(registry.search("  DOUGH "), vec![1]);
        assert!(registry.search("   ").is_empty());
        assert!(registry.search("chess").is_empty());
        assert_eq!(registry.index_of(&CommunityId::from("3")), Some(2));
        assert_eq!(registry.index_of(&CommunityId::from("9")), None);
    }
}
