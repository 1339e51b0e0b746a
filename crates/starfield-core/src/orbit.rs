//! Orbiting body types and per-frame position math

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Backend community identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommunityId(pub String);

impl CommunityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommunityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CommunityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Community record as returned by the REST backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: CommunityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_count: Option<u32>,
}

impl CommunityRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CommunityId(id.into()),
            name: name.into(),
            description: None,
            member_count: None,
        }
    }
}

/// The backend sends numeric ids; older endpoints send strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<CommunityId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => CommunityId(n.to_string()),
        RawId::Text(s) => CommunityId(s),
    })
}

/// sRGB body color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BodyColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl BodyColor {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Normalized channels (0.0-1.0) for the renderer
    pub fn to_srgb_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl TryFrom<String> for BodyColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(format!("expected #rrggbb, got {:?}", value));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|e| format!("invalid color {:?}: {}", value, e))
    }
}

impl From<BodyColor> for String {
    fn from(color: BodyColor) -> Self {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    }
}

/// One community rendered as a planet.
///
/// Bodies are immutable; a refetch rebuilds the whole list. The index in
/// that list is the only handle the selection system keeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitBody {
    pub id: CommunityId,
    pub name: String,
    /// Orbit center
    pub base_position: Vec3,
    /// Radius of the small secondary circle around `base_position`
    pub orbit_radius: f32,
    /// Angular speed of the secondary circle in radians per second
    pub orbit_speed: f32,
    pub visual_size: f32,
    pub color: BodyColor,
}

impl OrbitBody {
    /// Position at `seconds` of scene time
    pub fn position_at(&self, seconds: f32) -> Vec3 {
        let phase = self.orbit_speed * seconds;
        self.base_position
            + Vec3::new(
                self.orbit_radius * phase.cos(),
                0.0,
                self.orbit_radius * phase.sin(),
            )
    }
}
