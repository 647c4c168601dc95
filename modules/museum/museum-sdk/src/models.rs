//! Public models for the museum module.
//!
//! Value types nested inside aggregates (variants, coordinates, theme state)
//! derive serde because they are persisted as JSON and travel over the wire
//! unchanged. Aggregates themselves are mapped to DTOs by the REST layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::interaction::{Interaction, InteractionKind};

/// Where an object can be placed inside a room.
///
/// Older clients and model output still send `LeftWall` / `RightWall`; both
/// collapse into `Wall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementSurface {
    #[serde(alias = "LeftWall", alias = "RightWall")]
    Wall,
    Floor,
}

impl PlacementSurface {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wall => "Wall",
            Self::Floor => "Floor",
        }
    }
}

impl fmt::Display for PlacementSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementSurface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Wall" | "LeftWall" | "RightWall" => Ok(Self::Wall),
            "Floor" => Ok(Self::Floor),
            other => Err(format!(
                "unknown placement surface '{other}', expected Wall or Floor"
            )),
        }
    }
}

/// One color/image variant of an object.
///
/// Catalog variants always carry `variant_id`; snapshots copied onto modified
/// objects carry none so they stay independent of later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<Uuid>,
    pub name: String,
    pub color: String,
    pub image_url: String,
}

impl ImageVariant {
    /// Copy of this variant without its identifier.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        Self {
            variant_id: None,
            name: self.name.clone(),
            color: self.color.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Canonical decorative object, either a preset or generated for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogObject {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub current_image_variant: ImageVariant,
    pub image_variants: Vec<ImageVariant>,
    pub is_user_made: bool,
    pub placement_surface: PlacementSurface,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl CatalogObject {
    #[must_use]
    pub fn find_variant(&self, variant_id: Uuid) -> Option<&ImageVariant> {
        self.image_variants
            .iter()
            .find(|v| v.variant_id == Some(variant_id))
    }

    /// Variant list with identifiers stripped, in catalog order.
    #[must_use]
    pub fn snapshot_variants(&self) -> Vec<ImageVariant> {
        self.image_variants.iter().map(ImageVariant::snapshot).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// Marks a modified object that was materialized from a theme template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub original_object_id: Uuid,
    pub user_id: Uuid,
    pub theme_id: u8,
    pub template_index: usize,
}

/// A placed, per-user copy of a catalog object.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedObject {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub current_image_variant: ImageVariant,
    pub image_variants: Vec<ImageVariant>,
    pub placement_surface: PlacementSurface,
    pub coordinates: Coordinates,
    pub is_reversed: bool,
    pub interaction: Interaction,
    pub original_object_id: Option<Uuid>,
    pub provenance: Option<Provenance>,
    pub is_user_made: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Input for placing a catalog object into a user's room.
///
/// The interaction arrives as raw parts; the service validates the payload
/// against the behavior before anything is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewModifiedObject {
    pub name: String,
    pub description: Option<String>,
    pub original_object_id: Uuid,
    pub current_image_variant_id: Uuid,
    pub coordinates: Coordinates,
    pub is_reversed: bool,
    pub placement_surface: PlacementSurface,
    pub item_function: Option<InteractionKind>,
    pub additional_data: Option<serde_json::Value>,
}

/// Partial update of a modified object.
///
/// `description` and `item_function` distinguish "not sent" (`None`) from
/// "set to null" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifiedObjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub coordinates: Option<Coordinates>,
    pub is_reversed: Option<bool>,
    pub placement_surface: Option<PlacementSurface>,
    pub item_function: Option<Option<InteractionKind>>,
    pub additional_data: Option<serde_json::Value>,
    pub current_image_variant_index: Option<usize>,
    pub image_variants_supplied: bool,
}

impl ModifiedObjectPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.coordinates.is_none()
            && self.is_reversed.is_none()
            && self.placement_surface.is_none()
            && self.item_function.is_none()
            && self.additional_data.is_none()
            && self.current_image_variant_index.is_none()
            && !self.image_variants_supplied
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Raining,
    Cloudy,
    Snowing,
    Night,
    Sunset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundMusic {
    pub name: String,
    pub url: String,
}

/// Visual/audio state applied to a user's room by the assigned theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeRuntimeState {
    pub floor_color: String,
    pub left_wall_color: String,
    pub right_wall_color: String,
    pub weather: Weather,
    pub background_music: BackgroundMusic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingResponse {
    pub question: String,
    pub answer: String,
}

/// Stored result of the onboarding theme analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiThemeAnalysis {
    pub choice: u8,
    pub reason: String,
    pub theme: String,
    #[serde(with = "time::serde::rfc3339")]
    pub analyzed_at: OffsetDateTime,
    pub responses: Vec<OnboardingResponse>,
}

/// Account profile without credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub theme_id: Option<u8>,
    pub theme_state: Option<ThemeRuntimeState>,
    pub invitation: Option<String>,
    pub object_ids: Vec<Uuid>,
    pub modified_object_ids: Vec<Uuid>,
    pub question_index: u32,
    pub onboarding_responses: Vec<OnboardingResponse>,
    pub ai_analysis: Option<AiThemeAnalysis>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl UserProfile {
    #[must_use]
    pub fn owns_modified(&self, id: Uuid) -> bool {
        self.modified_object_ids.contains(&id)
    }

    #[must_use]
    pub fn has_in_inventory(&self, id: Uuid) -> bool {
        self.object_ids.contains(&id)
    }
}
