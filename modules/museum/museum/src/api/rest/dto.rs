//! Wire shapes of the REST surface. Field names are camelCase.

use museum_sdk::{
    AiThemeAnalysis, BackgroundMusic, CatalogObject, Coordinates, ImageVariant, InteractionKind,
    ModifiedObject, ModifiedObjectPatch, NewModifiedObject, OnboardingResponse, PlacementSurface,
    Provenance, ThemeRuntimeState, UserProfile, Weather,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::service::{
    AnalysisOutcome, AuthSession, InventoryUpdate, PresetPatch, PresetVariantInput, ThemeChange,
};
use crate::domain::themes::ThemeDefinition;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ---- accounts ----

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl From<AuthSession> for AuthResponse {
    fn from(s: AuthSession) -> Self {
        Self {
            id: s.id,
            email: s.email,
            token: s.token,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifiedUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: VerifiedUser,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub theme_id: Option<u8>,
    pub theme_runtime_state: Option<ThemeRuntimeState>,
    pub invitation: Option<String>,
    pub object_ids: Vec<Uuid>,
    pub modified_object_ids: Vec<Uuid>,
    pub question_index: u32,
    pub onboarding_responses: Vec<OnboardingResponse>,
    pub ai_analysis: Option<AiThemeAnalysis>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<UserProfile> for ProfileDto {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            name: p.name,
            theme_id: p.theme_id,
            theme_runtime_state: p.theme_state,
            invitation: p.invitation,
            object_ids: p.object_ids,
            modified_object_ids: p.modified_object_ids,
            question_index: p.question_index,
            onboarding_responses: p.onboarding_responses,
            ai_analysis: p.ai_analysis,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ---- themes ----

/// Theme id as a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThemeIdInput {
    Number(i64),
    Text(String),
}

impl ThemeIdInput {
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeMusicRequest {
    pub theme_id: ThemeIdInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub floor_color: String,
    pub left_wall_color: String,
    pub right_wall_color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeChangeResponse {
    pub theme_id: u8,
    pub name: String,
    pub colors: ThemeColors,
    pub weather: Weather,
    pub background_music: BackgroundMusic,
    pub default_objects_added: usize,
}

impl From<ThemeChange> for ThemeChangeResponse {
    fn from(c: ThemeChange) -> Self {
        Self {
            theme_id: c.theme_id,
            name: c.name,
            colors: ThemeColors {
                floor_color: c.runtime.floor_color,
                left_wall_color: c.runtime.left_wall_color,
                right_wall_color: c.runtime.right_wall_color,
            },
            weather: c.runtime.weather,
            background_music: c.runtime.background_music,
            default_objects_added: c.default_objects_added,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeMusicResponse {
    pub message: &'static str,
    pub theme: ThemeRuntimeState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitationRequest {
    #[serde(default)]
    pub invitation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvitationResponse {
    pub message: &'static str,
    pub invitation: Option<String>,
}

// ---- onboarding ----

#[derive(Debug, Clone, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponsesSaved {
    pub message: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub responses: Vec<OnboardingResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDto {
    pub choice: u8,
    pub reason: String,
    #[serde(with = "time::serde::rfc3339")]
    pub analyzed_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeSummaryDto {
    pub id: u8,
    pub name: String,
    pub characteristics: Vec<String>,
    pub description: String,
}

impl From<ThemeDefinition> for ThemeSummaryDto {
    fn from(t: ThemeDefinition) -> Self {
        Self {
            id: t.id,
            name: t.name,
            characteristics: t.characteristics,
            description: t.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub analysis: AnalysisDto,
    pub theme: ThemeSummaryDto,
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(o: AnalysisOutcome) -> Self {
        Self {
            analysis: AnalysisDto {
                choice: o.analysis.choice,
                reason: o.analysis.reason,
                analyzed_at: o.analysis.analyzed_at,
            },
            theme: o.theme.into(),
        }
    }
}

// ---- catalog objects ----

#[derive(Debug, Clone, Deserialize)]
pub struct ContentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowUpResponse {
    pub question: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToInventoryRequest {
    pub object_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    pub object_ids: Vec<Uuid>,
    pub question_index: u32,
}

impl From<InventoryUpdate> for InventoryResponse {
    fn from(u: InventoryUpdate) -> Self {
        Self {
            object_ids: u.object_ids,
            question_index: u.question_index,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogObjectDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub current_image_variant: ImageVariant,
    pub image_variants: Vec<ImageVariant>,
    pub is_user_made: bool,
    pub on_type: PlacementSurface,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<CatalogObject> for CatalogObjectDto {
    fn from(o: CatalogObject) -> Self {
        Self {
            id: o.id,
            name: o.name,
            description: o.description,
            current_image_variant: o.current_image_variant,
            image_variants: o.image_variants,
            is_user_made: o.is_user_made,
            on_type: o.placement_surface,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetVariantRequest {
    #[serde(default)]
    pub variant_id: Option<Uuid>,
    pub name: String,
    pub color: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePresetRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub on_type: Option<PlacementSurface>,
    pub image_variants: Option<Vec<PresetVariantRequest>>,
    pub current_image_variant_id: Option<Uuid>,
}

impl From<UpdatePresetRequest> for PresetPatch {
    fn from(r: UpdatePresetRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            placement_surface: r.on_type,
            image_variants: r.image_variants.map(|variants| {
                variants
                    .into_iter()
                    .map(|v| PresetVariantInput {
                        variant_id: v.variant_id,
                        name: v.name,
                        color: v.color,
                        image_url: v.image_url,
                    })
                    .collect()
            }),
            current_image_variant_id: r.current_image_variant_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDeleted {
    pub message: &'static str,
    pub deleted_id: Uuid,
}

// ---- modified objects ----

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModifiedRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub original_object_id: Uuid,
    pub current_image_variant_id: Uuid,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub is_reversed: bool,
    pub on_type: PlacementSurface,
    #[serde(default)]
    pub item_function: Option<InteractionKind>,
    #[serde(default)]
    pub additional_data: Option<Value>,
}

impl From<CreateModifiedRequest> for NewModifiedObject {
    fn from(r: CreateModifiedRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            original_object_id: r.original_object_id,
            current_image_variant_id: r.current_image_variant_id,
            coordinates: r.coordinates,
            is_reversed: r.is_reversed,
            placement_surface: r.on_type,
            item_function: r.item_function,
            additional_data: r.additional_data,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchModifiedRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub coordinates: Option<Coordinates>,
    pub is_reversed: Option<bool>,
    pub on_type: Option<PlacementSurface>,
    #[serde(default, deserialize_with = "double_option")]
    pub item_function: Option<Option<InteractionKind>>,
    pub additional_data: Option<Value>,
    pub current_image_variant_index: Option<usize>,
    /// Never applied; only its presence matters, `null` included.
    #[serde(default, deserialize_with = "double_option")]
    pub image_variants: Option<Option<Value>>,
}

impl From<PatchModifiedRequest> for ModifiedObjectPatch {
    fn from(r: PatchModifiedRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            coordinates: r.coordinates,
            is_reversed: r.is_reversed,
            placement_surface: r.on_type,
            item_function: r.item_function,
            additional_data: r.additional_data,
            current_image_variant_index: r.current_image_variant_index,
            image_variants_supplied: r.image_variants.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedObjectDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub current_image_variant: ImageVariant,
    pub image_variants: Vec<ImageVariant>,
    pub on_type: PlacementSurface,
    pub coordinates: Coordinates,
    pub is_reversed: bool,
    pub item_function: Option<InteractionKind>,
    pub additional_data: Value,
    pub original_object_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    pub is_user_made: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ModifiedObject> for ModifiedObjectDto {
    fn from(o: ModifiedObject) -> Self {
        Self {
            id: o.id,
            name: o.name,
            description: o.description,
            current_image_variant: o.current_image_variant,
            image_variants: o.image_variants,
            on_type: o.placement_surface,
            coordinates: o.coordinates,
            is_reversed: o.is_reversed,
            item_function: o.interaction.kind(),
            additional_data: o.interaction.payload(),
            original_object_id: o.original_object_id,
            provenance: o.provenance,
            is_user_made: o.is_user_made,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_distinguishes_null_from_absent_item_function() {
        let absent: PatchModifiedRequest = serde_json::from_value(json!({ "name": "x" })).unwrap();
        assert!(absent.item_function.is_none());

        let null: PatchModifiedRequest =
            serde_json::from_value(json!({ "itemFunction": null })).unwrap();
        assert_eq!(null.item_function, Some(None));

        let patch: ModifiedObjectPatch = serde_json::from_value::<PatchModifiedRequest>(
            json!({ "itemFunction": "Board", "imageVariants": [] }),
        )
        .unwrap()
        .into();
        assert_eq!(patch.item_function, Some(Some(InteractionKind::Board)));
        assert!(patch.image_variants_supplied);
    }

    #[test]
    fn null_image_variants_still_count_as_supplied() {
        let patch: ModifiedObjectPatch = serde_json::from_value::<PatchModifiedRequest>(
            json!({ "name": "y", "imageVariants": null }),
        )
        .unwrap()
        .into();
        assert!(patch.image_variants_supplied);

        let patch: ModifiedObjectPatch =
            serde_json::from_value::<PatchModifiedRequest>(json!({ "name": "y" }))
                .unwrap()
                .into();
        assert!(!patch.image_variants_supplied);
    }

    #[test]
    fn null_description_clears_it() {
        let patch: ModifiedObjectPatch =
            serde_json::from_value::<PatchModifiedRequest>(json!({ "description": null }))
                .unwrap()
                .into();
        assert_eq!(patch.description, Some(None));
        assert!(!patch.is_empty());

        let patch: ModifiedObjectPatch =
            serde_json::from_value::<PatchModifiedRequest>(json!({ "description": "old lamp" }))
                .unwrap()
                .into();
        assert_eq!(patch.description, Some(Some("old lamp".to_owned())));
    }

    #[test]
    fn create_request_accepts_legacy_wall() {
        let req: CreateModifiedRequest = serde_json::from_value(json!({
            "name": "Frame",
            "originalObjectId": Uuid::nil(),
            "currentImageVariantId": Uuid::nil(),
            "coordinates": { "x": 0.1, "y": 0.2 },
            "onType": "RightWall",
            "itemFunction": null
        }))
        .unwrap();
        assert_eq!(req.on_type, PlacementSurface::Wall);
        assert!(!req.is_reversed);
        assert!(req.item_function.is_none());
    }

    #[test]
    fn theme_id_input_accepts_numbers_and_strings() {
        let n: ThemeMusicRequest = serde_json::from_value(json!({ "themeId": 3 })).unwrap();
        let s: ThemeMusicRequest = serde_json::from_value(json!({ "themeId": "4" })).unwrap();
        assert_eq!(n.theme_id.as_text(), "3");
        assert_eq!(s.theme_id.as_text(), "4");
    }
}
