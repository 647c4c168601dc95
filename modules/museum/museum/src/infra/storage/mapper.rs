//! Conversions between SeaORM models and the SDK types.
//!
//! JSON columns are decoded strictly: a row that no longer fits its type is
//! reported as a database error instead of being silently dropped.

use museum_sdk::{
    AiThemeAnalysis, CatalogObject, Coordinates, ImageVariant, Interaction, InteractionKind,
    ModifiedObject, OnboardingResponse, PlacementSurface, Provenance, ThemeRuntimeState,
    UserProfile,
};
use sea_orm::ActiveValue::Set;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::entity::{catalog_object, modified_object, user};
use crate::domain::error::DomainError;

fn decode<T: DeserializeOwned>(column: &'static str, value: Value) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::database(format!("corrupt '{column}' column: {e}")))
}

pub(super) fn encode<T: Serialize + ?Sized>(
    column: &'static str,
    value: &T,
) -> Result<Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::database(format!("cannot encode '{column}': {e}")))
}

fn surface(raw: &str) -> Result<PlacementSurface, DomainError> {
    raw.parse()
        .map_err(|e: String| DomainError::database(format!("corrupt 'placement_surface': {e}")))
}

pub fn catalog_from_model(m: catalog_object::Model) -> Result<CatalogObject, DomainError> {
    Ok(CatalogObject {
        id: m.id,
        name: m.name,
        description: m.description,
        current_image_variant: decode::<ImageVariant>(
            "current_image_variant",
            m.current_image_variant,
        )?,
        image_variants: decode::<Vec<ImageVariant>>("image_variants", m.image_variants)?,
        is_user_made: m.is_user_made,
        placement_surface: surface(&m.placement_surface)?,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn catalog_to_active(o: &CatalogObject) -> Result<catalog_object::ActiveModel, DomainError> {
    Ok(catalog_object::ActiveModel {
        id: Set(o.id),
        name: Set(o.name.clone()),
        description: Set(o.description.clone()),
        current_image_variant: Set(encode("current_image_variant", &o.current_image_variant)?),
        image_variants: Set(encode("image_variants", &o.image_variants)?),
        is_user_made: Set(o.is_user_made),
        placement_surface: Set(o.placement_surface.as_str().to_owned()),
        created_at: Set(o.created_at),
        updated_at: Set(o.updated_at),
    })
}

pub fn modified_from_model(m: modified_object::Model) -> Result<ModifiedObject, DomainError> {
    let kind = m
        .item_function
        .as_deref()
        .map(str::parse::<InteractionKind>)
        .transpose()
        .map_err(|e| DomainError::database(format!("corrupt 'item_function': {e}")))?;
    let interaction = Interaction::from_parts(kind, m.additional_data.as_ref())
        .map_err(|e| DomainError::database(format!("corrupt 'additional_data': {e}")))?;
    let provenance = m
        .provenance
        .map(|v| decode::<Provenance>("provenance", v))
        .transpose()?;

    Ok(ModifiedObject {
        id: m.id,
        name: m.name,
        description: m.description,
        current_image_variant: decode("current_image_variant", m.current_image_variant)?,
        image_variants: decode("image_variants", m.image_variants)?,
        placement_surface: surface(&m.placement_surface)?,
        coordinates: Coordinates {
            x: m.coord_x,
            y: m.coord_y,
        },
        is_reversed: m.is_reversed,
        interaction,
        original_object_id: m.original_object_id,
        provenance,
        is_user_made: m.is_user_made,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn modified_to_active(o: &ModifiedObject) -> Result<modified_object::ActiveModel, DomainError> {
    let provenance = o
        .provenance
        .as_ref()
        .map(|p| encode("provenance", p))
        .transpose()?;

    Ok(modified_object::ActiveModel {
        id: Set(o.id),
        name: Set(o.name.clone()),
        description: Set(o.description.clone()),
        current_image_variant: Set(encode("current_image_variant", &o.current_image_variant)?),
        image_variants: Set(encode("image_variants", &o.image_variants)?),
        placement_surface: Set(o.placement_surface.as_str().to_owned()),
        coord_x: Set(o.coordinates.x),
        coord_y: Set(o.coordinates.y),
        is_reversed: Set(o.is_reversed),
        item_function: Set(o.interaction.kind().map(|k| k.as_str().to_owned())),
        additional_data: Set(Some(o.interaction.payload())),
        original_object_id: Set(o.original_object_id),
        provenance: Set(provenance),
        is_user_made: Set(o.is_user_made),
        created_at: Set(o.created_at),
        updated_at: Set(o.updated_at),
    })
}

pub fn profile_from_model(
    m: user::Model,
    object_ids: Vec<Uuid>,
    modified_object_ids: Vec<Uuid>,
) -> Result<UserProfile, DomainError> {
    let theme_id = m
        .theme_id
        .map(|id| {
            u8::try_from(id).map_err(|_| DomainError::database(format!("corrupt 'theme_id': {id}")))
        })
        .transpose()?;
    let question_index = u32::try_from(m.question_index).map_err(|_| {
        DomainError::database(format!("corrupt 'question_index': {}", m.question_index))
    })?;
    let theme_state = m
        .theme_state
        .map(|v| decode::<ThemeRuntimeState>("theme_state", v))
        .transpose()?;
    let onboarding_responses = m
        .onboarding_responses
        .map(|v| decode::<Vec<OnboardingResponse>>("onboarding_responses", v))
        .transpose()?
        .unwrap_or_default();
    let ai_analysis = m
        .ai_analysis
        .map(|v| decode::<AiThemeAnalysis>("ai_analysis", v))
        .transpose()?;

    Ok(UserProfile {
        id: m.id,
        email: m.email,
        name: m.name,
        theme_id,
        theme_state,
        invitation: m.invitation,
        object_ids,
        modified_object_ids,
        question_index,
        onboarding_responses,
        ai_analysis,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use museum_sdk::{LinkPayload, Weather};
    use time::OffsetDateTime;

    fn variant(name: &str) -> ImageVariant {
        ImageVariant {
            variant_id: None,
            name: name.to_owned(),
            color: "#ffffff".to_owned(),
            image_url: format!("https://cdn/{name}.png"),
        }
    }

    #[test]
    fn modified_object_survives_the_row_form() {
        let now = OffsetDateTime::now_utc();
        let object = ModifiedObject {
            id: Uuid::new_v4(),
            name: "Clock".to_owned(),
            description: Some("grandma's".to_owned()),
            current_image_variant: variant("a"),
            image_variants: vec![variant("a"), variant("b")],
            placement_surface: PlacementSurface::Wall,
            coordinates: Coordinates { x: 0.25, y: 0.5 },
            is_reversed: true,
            interaction: Interaction::Link(LinkPayload {
                link: "https://example.com".to_owned(),
            }),
            original_object_id: Some(Uuid::new_v4()),
            provenance: None,
            is_user_made: false,
            created_at: now,
            updated_at: now,
        };

        let active = modified_to_active(&object).unwrap();
        let model = modified_object::Model {
            id: active.id.unwrap(),
            name: active.name.unwrap(),
            description: active.description.unwrap(),
            current_image_variant: active.current_image_variant.unwrap(),
            image_variants: active.image_variants.unwrap(),
            placement_surface: active.placement_surface.unwrap(),
            coord_x: active.coord_x.unwrap(),
            coord_y: active.coord_y.unwrap(),
            is_reversed: active.is_reversed.unwrap(),
            item_function: active.item_function.unwrap(),
            additional_data: active.additional_data.unwrap(),
            original_object_id: active.original_object_id.unwrap(),
            provenance: active.provenance.unwrap(),
            is_user_made: active.is_user_made.unwrap(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
        };
        assert_eq!(model.item_function.as_deref(), Some("Link"));
        assert_eq!(modified_from_model(model).unwrap(), object);
    }

    #[test]
    fn legacy_surface_rows_read_as_wall() {
        let now = OffsetDateTime::now_utc();
        let model = catalog_object::Model {
            id: Uuid::new_v4(),
            name: "Frame".to_owned(),
            description: None,
            current_image_variant: serde_json::to_value(variant("a")).unwrap(),
            image_variants: serde_json::to_value(vec![variant("a")]).unwrap(),
            is_user_made: false,
            placement_surface: "LeftWall".to_owned(),
            created_at: now,
            updated_at: now,
        };
        let object = catalog_from_model(model).unwrap();
        assert_eq!(object.placement_surface, PlacementSurface::Wall);
    }

    #[test]
    fn corrupt_theme_state_is_a_database_error() {
        let now = OffsetDateTime::now_utc();
        let model = user::Model {
            id: Uuid::new_v4(),
            email: "a@b.co".to_owned(),
            name: None,
            password_hash: "x".to_owned(),
            theme_id: Some(2),
            theme_state: Some(serde_json::json!({ "weather": "hail" })),
            invitation: None,
            question_index: 0,
            onboarding_responses: None,
            ai_analysis: None,
            created_at: now,
            updated_at: now,
        };
        let err = profile_from_model(model, vec![], vec![]).unwrap_err();
        assert!(matches!(err, DomainError::Database(_)));

        let state = ThemeRuntimeState {
            floor_color: "#fff".to_owned(),
            left_wall_color: "#eee".to_owned(),
            right_wall_color: "#ddd".to_owned(),
            weather: Weather::Night,
            background_music: museum_sdk::BackgroundMusic {
                name: "n".to_owned(),
                url: "/u.mp3".to_owned(),
            },
        };
        assert!(encode("theme_state", &state).is_ok());
    }
}
