use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use museum_sdk::{
    Coordinates, InteractionKind, ModifiedObjectPatch, NewModifiedObject, OnboardingResponse,
    PlacementSurface,
};
use serde_json::json;
use uuid::Uuid;

use super::test_support::{CannedText, FailingText, db, seed_object, seed_user, services, services_with};
use super::{NewPreset, PresetPatch, PresetVariantUpload};
use crate::domain::error::DomainError;
use crate::domain::onboarding::QUESTIONS;
use crate::domain::ports::ImageBytes;
use crate::domain::repos::{ModifiedRepository, UsersRepository};
use crate::domain::themes::ThemeCatalog;
use crate::infra::storage::{SeaModifiedRepository, SeaUsersRepository};

fn placement(original_object_id: Uuid, variant_id: Uuid) -> NewModifiedObject {
    NewModifiedObject {
        name: "My lamp".to_owned(),
        description: None,
        original_object_id,
        current_image_variant_id: variant_id,
        coordinates: Coordinates { x: 0.5, y: 0.25 },
        is_reversed: false,
        placement_surface: PlacementSurface::Floor,
        item_function: None,
        additional_data: None,
    }
}

fn answers(text: &str) -> Vec<OnboardingResponse> {
    QUESTIONS
        .iter()
        .map(|q| OnboardingResponse {
            question: (*q).to_owned(),
            answer: text.to_owned(),
        })
        .collect()
}

#[tokio::test]
async fn modified_object_create_update_delete() {
    let db = db().await;
    let owner = seed_user(&db).await;
    let stranger = seed_user(&db).await;
    let original = seed_object(&db, "Lamp", &["Brass", "Silver"], false).await;
    let svc = services(&db, ThemeCatalog::builtin());
    let second_variant = original.image_variants[1].variant_id.unwrap();

    let created = svc
        .modified
        .create(owner, placement(original.id, second_variant))
        .await
        .unwrap();
    assert_eq!(created.current_image_variant.name, "Silver");
    assert!(created.current_image_variant.variant_id.is_none());
    assert_eq!(created.description.as_deref(), Some("Lamp description"));
    assert!(created.provenance.is_none());

    let listed = svc.modified.list_for_owner(owner).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(svc.modified.list_for_owner(stranger).await.unwrap().is_empty());

    let patch = ModifiedObjectPatch {
        item_function: Some(Some(InteractionKind::Link)),
        additional_data: Some(json!({ "link": "https://example.com" })),
        current_image_variant_index: Some(0),
        ..ModifiedObjectPatch::default()
    };
    let updated = svc.modified.update(created.id, owner, patch).await.unwrap();
    assert_eq!(updated.interaction.kind(), Some(InteractionKind::Link));
    assert_eq!(updated.current_image_variant.name, "Brass");

    let forbidden = svc
        .modified
        .update(
            created.id,
            stranger,
            ModifiedObjectPatch {
                name: Some("mine now".to_owned()),
                ..ModifiedObjectPatch::default()
            },
        )
        .await;
    assert!(matches!(forbidden, Err(DomainError::Forbidden(_))));

    assert!(matches!(
        svc.modified.delete(created.id, stranger).await,
        Err(DomainError::Forbidden(_))
    ));
    svc.modified.delete(created.id, owner).await.unwrap();
    assert!(matches!(
        svc.modified.delete(created.id, owner).await,
        Err(DomainError::NotFound { .. })
    ));
    let profile = SeaUsersRepository::new()
        .find_profile(&db, owner)
        .await
        .unwrap()
        .unwrap();
    assert!(profile.modified_object_ids.is_empty());
}

#[tokio::test]
async fn modified_object_validation() {
    let db = db().await;
    let owner = seed_user(&db).await;
    let original = seed_object(&db, "Frame", &["Gold"], false).await;
    let svc = services(&db, ThemeCatalog::builtin());
    let variant_id = original.image_variants[0].variant_id.unwrap();

    let foreign_variant = svc
        .modified
        .create(owner, placement(original.id, Uuid::new_v4()))
        .await;
    assert!(matches!(
        foreign_variant,
        Err(DomainError::Validation { ref field, .. }) if field == "currentImageVariantId"
    ));

    let missing = svc
        .modified
        .create(owner, placement(Uuid::new_v4(), variant_id))
        .await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));

    let mut bad_board = placement(original.id, variant_id);
    bad_board.item_function = Some(InteractionKind::Board);
    bad_board.additional_data = Some(json!({
        "data": { "title": "t", "description": "d", "items": [
            { "writer": "a", "text": "b", "color": "c" },
            { "writer": "", "text": "b", "color": "c" }
        ] }
    }));
    let err = svc.modified.create(owner, bad_board).await.unwrap_err();
    assert!(
        matches!(err, DomainError::Validation { ref field, .. } if field == "additionalData.data.items[1].writer")
    );

    let created = svc
        .modified
        .create(owner, placement(original.id, variant_id))
        .await
        .unwrap();
    let empty = svc
        .modified
        .update(created.id, owner, ModifiedObjectPatch::default())
        .await;
    assert!(matches!(
        empty,
        Err(DomainError::Validation { ref message, .. }) if message == "Request body cannot be empty"
    ));
    let variants = svc
        .modified
        .update(
            created.id,
            owner,
            ModifiedObjectPatch {
                image_variants_supplied: true,
                ..ModifiedObjectPatch::default()
            },
        )
        .await;
    assert!(matches!(variants, Err(DomainError::Validation { ref field, .. }) if field == "imageVariants"));

    let link_without_payload = svc
        .modified
        .update(
            created.id,
            owner,
            ModifiedObjectPatch {
                item_function: Some(Some(InteractionKind::Link)),
                ..ModifiedObjectPatch::default()
            },
        )
        .await;
    assert!(matches!(link_without_payload, Err(DomainError::Validation { .. })));

    let out_of_range = svc
        .modified
        .update(
            created.id,
            owner,
            ModifiedObjectPatch {
                current_image_variant_index: Some(3),
                ..ModifiedObjectPatch::default()
            },
        )
        .await;
    assert!(matches!(out_of_range, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn inventory_add_rules() {
    let db = db().await;
    let user = seed_user(&db).await;
    let preset = seed_object(&db, "Preset vase", &["White"], false).await;
    let svc = services(&db, ThemeCatalog::builtin());

    let made = svc.objects.create_from_text("Grandma's clock", user).await.unwrap();
    assert!(made.is_user_made);
    assert_eq!(made.name, "Generated Object");
    assert_eq!(made.current_image_variant.name, "Default");
    assert!(made
        .current_image_variant
        .image_url
        .starts_with(&format!("http://cdn.test/uploads/objects/{user}/")));
    assert!(svc.objects.list_user_objects(user).await.unwrap().is_empty());

    let update = svc.objects.add_to_inventory(made.id, user).await.unwrap();
    assert_eq!(update.object_ids, vec![made.id]);
    assert_eq!(update.question_index, 1);

    let again = svc.objects.add_to_inventory(made.id, user).await;
    assert!(matches!(again, Err(DomainError::Conflict(ref m)) if m == "Object is already in inventory"));
    assert!(matches!(
        svc.objects.add_to_inventory(preset.id, user).await,
        Err(DomainError::Validation { .. })
    ));
    assert!(matches!(
        svc.objects.add_to_inventory(Uuid::new_v4(), user).await,
        Err(DomainError::NotFound { .. })
    ));

    let mine = svc.objects.list_user_objects(user).await.unwrap();
    assert_eq!(mine.len(), 1);
    let presets = svc.objects.list_presets().await.unwrap();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0].id, preset.id);
}

#[tokio::test]
async fn unusable_metadata_is_a_generation_error() {
    let db = db().await;
    let user = seed_user(&db).await;
    let svc = services_with(
        &db,
        ThemeCatalog::builtin(),
        Arc::new(CannedText("I could not think of anything.")),
    );

    let err = svc.objects.create_from_text("a scarf", user).await.unwrap_err();
    assert!(matches!(err, DomainError::Generation(_)));
    assert!(matches!(
        svc.objects.generate_follow_up_question("  ").await,
        Err(DomainError::Validation { .. })
    ));
    assert_eq!(
        svc.objects.generate_follow_up_question("a scarf").await.unwrap(),
        "I could not think of anything."
    );
}

#[tokio::test]
async fn theme_change_replaces_only_provisioned_objects() {
    let db = db().await;
    let user = seed_user(&db).await;
    let clock = seed_object(&db, "Clock", &["Oak"], false).await;
    let rug = seed_object(&db, "Rug", &["Red"], false).await;
    let plant = seed_object(&db, "Plant", &["Green"], false).await;
    let catalog = ThemeCatalog::builtin()
        .with_template_objects(&BTreeMap::from([
            ("1".to_owned(), vec![clock.id, rug.id]),
            ("4".to_owned(), vec![plant.id]),
        ]))
        .unwrap();
    let svc = services(&db, catalog);

    let first = svc.themes.change_theme(user, 1).await.unwrap();
    assert_eq!(first.default_objects_added, 2);
    assert_eq!(first.name, "Childlike");

    let own = svc
        .modified
        .create(
            user,
            placement(plant.id, plant.image_variants[0].variant_id.unwrap()),
        )
        .await
        .unwrap();

    let again = svc.themes.change_theme(user, 1).await.unwrap();
    assert_eq!(again.default_objects_added, 2);
    let objects = svc.modified.list_for_owner(user).await.unwrap();
    assert_eq!(objects.len(), 3);
    assert!(objects.iter().any(|o| o.id == own.id));

    let unready = svc.themes.change_theme(user, 4).await.unwrap();
    assert_eq!(unready.default_objects_added, 0);
    let remaining = svc.modified.list_for_owner(user).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, own.id);
    assert_eq!(
        SeaModifiedRepository::new()
            .list_by_ids(&db, &[own.id])
            .await
            .unwrap()
            .len(),
        1
    );

    let profile = SeaUsersRepository::new()
        .find_profile(&db, user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.theme_id, Some(4));
    assert_eq!(profile.theme_state.unwrap().floor_color, "#B7C9A8");

    assert!(matches!(
        svc.themes.change_theme(user, 6).await,
        Err(DomainError::Validation { .. })
    ));
    assert!(matches!(
        svc.themes.change_theme(Uuid::new_v4(), 2).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn theme_music_and_invitation() {
    let db = db().await;
    let user = seed_user(&db).await;
    let svc = services(&db, ThemeCatalog::builtin());

    svc.themes.change_theme(user, 2).await.unwrap();
    let state = svc.themes.change_theme_music(user, 5).await.unwrap();
    assert_eq!(state.background_music.name, "Letters Never Sent");
    assert_eq!(state.floor_color, "#E9D5DA");

    let saved = svc
        .themes
        .update_invitation(user, Some("Come visit".to_owned()))
        .await
        .unwrap();
    assert_eq!(saved.as_deref(), Some("Come visit"));
    let cleared = svc
        .themes
        .update_invitation(user, Some("   ".to_owned()))
        .await
        .unwrap();
    assert!(cleared.is_none());
    assert!(matches!(
        svc.themes.update_invitation(user, Some("x".repeat(501))).await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn accounts_signup_login_profile() {
    let db = db().await;
    let svc = services(&db, ThemeCatalog::builtin());

    let session = svc.accounts.signup("Ann@Example.com", "secret1").await.unwrap();
    assert_eq!(session.email, "ann@example.com");
    assert!(!session.token.is_empty());

    assert!(matches!(
        svc.accounts.signup("ann@example.com", "another").await,
        Err(DomainError::Conflict(_))
    ));
    assert!(matches!(
        svc.accounts.signup("bob@example.com", "short").await,
        Err(DomainError::Validation { ref field, .. }) if field == "password"
    ));

    let login = svc.accounts.login("ANN@example.com", "secret1").await.unwrap();
    assert_eq!(login.id, session.id);
    assert!(matches!(
        svc.accounts.login("ann@example.com", "wrong-password").await,
        Err(DomainError::Unauthorized(ref m)) if m == "Invalid email or password"
    ));
    assert!(matches!(
        svc.accounts.login("nobody@example.com", "secret1").await,
        Err(DomainError::Unauthorized(_))
    ));

    let profile = svc.accounts.profile(session.id).await.unwrap();
    assert_eq!(profile.question_index, 0);
    assert!(profile.object_ids.is_empty());
}

#[tokio::test]
async fn analysis_falls_back_to_keywords() {
    let db = db().await;
    let user = seed_user(&db).await;
    let svc = services_with(&db, ThemeCatalog::builtin(), Arc::new(FailingText));

    let outcome = svc
        .onboarding
        .analyze(user, answers("long walks in nature"))
        .await
        .unwrap();
    assert_eq!(outcome.analysis.choice, 4);
    assert_eq!(outcome.theme.name, "Nature");

    let stored = svc.onboarding.get_analysis(user).await.unwrap();
    assert_eq!(stored.theme, "Nature");
    assert_eq!(stored.responses.len(), 5);

    assert!(matches!(
        svc.onboarding.analyze(user, answers("x")[..4].to_vec()).await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn analysis_uses_model_choice_and_profile_responses() {
    let db = db().await;
    let user = seed_user(&db).await;
    let svc = services_with(
        &db,
        ThemeCatalog::builtin(),
        Arc::new(CannedText("{\"choice\": 2, \"reason\": \"So much feeling.\"}")),
    );

    assert!(matches!(
        svc.onboarding.get_analysis(user).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        svc.onboarding.analyze_from_profile(user).await,
        Err(DomainError::Validation { .. })
    ));
    assert!(matches!(
        svc.onboarding.save_responses(user, answers("hi")[..3].to_vec()).await,
        Err(DomainError::Validation { ref message, .. }) if message == "Incomplete responses"
    ));

    svc.onboarding
        .save_responses(user, answers("family"))
        .await
        .unwrap();
    let outcome = svc.onboarding.analyze_from_profile(user).await.unwrap();
    assert_eq!(outcome.analysis.choice, 2);
    assert_eq!(outcome.analysis.reason, "So much feeling.");
}

#[tokio::test]
async fn preset_administration() {
    let db = db().await;
    let user = seed_user(&db).await;
    let svc = services(&db, ThemeCatalog::builtin());

    let upload = |name: &str| PresetVariantUpload {
        name: name.to_owned(),
        color: "#112233".to_owned(),
        file: ImageBytes {
            bytes: Bytes::from_static(b"\xff\xd8\xff"),
            mime_type: "image/jpeg".to_owned(),
        },
    };
    let preset = svc
        .presets
        .create(NewPreset {
            name: " Tea cup ".to_owned(),
            description: None,
            placement_surface: PlacementSurface::Floor,
            variants: vec![upload("Blue Sky"), upload("Red")],
        })
        .await
        .unwrap();
    assert_eq!(preset.name, "Tea cup");
    assert!(!preset.is_user_made);
    assert_eq!(preset.current_image_variant, preset.image_variants[0]);
    assert!(preset.image_variants[0].image_url.contains("/presets/"));
    assert!(preset.image_variants[0].image_url.ends_with("-0-Blue_Sky.jpg"));

    let second = preset.image_variants[1].variant_id.unwrap();
    let updated = svc
        .presets
        .update(
            preset.id,
            PresetPatch {
                current_image_variant_id: Some(second),
                placement_surface: Some(PlacementSurface::Wall),
                ..PresetPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.current_image_variant.name, "Red");
    assert_eq!(updated.placement_surface, PlacementSurface::Wall);

    let made = svc.objects.create_from_text("my scarf", user).await.unwrap();
    assert!(matches!(
        svc.presets.delete(made.id).await,
        Err(DomainError::Forbidden(_))
    ));
    assert_eq!(svc.presets.delete(preset.id).await.unwrap(), preset.id);
    assert!(matches!(
        svc.presets.delete(preset.id).await,
        Err(DomainError::NotFound { .. })
    ));
}
