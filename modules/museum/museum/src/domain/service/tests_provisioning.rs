use std::collections::BTreeMap;

use museum_sdk::{CatalogObject, Coordinates, PlacementSurface};
use time::OffsetDateTime;
use tracing_test::traced_test;
use uuid::Uuid;

use super::ProvisionOutcome;
use super::test_support::{db, seed_object, seed_user, services, variant};
use crate::domain::repos::{CatalogRepository, ModifiedRepository, UsersRepository};
use crate::domain::themes::ThemeCatalog;
use crate::infra::storage::{SeaCatalogRepository, SeaModifiedRepository, SeaUsersRepository};

fn catalog_with(theme_id: u8, ids: Vec<Uuid>) -> ThemeCatalog {
    ThemeCatalog::builtin()
        .with_template_objects(&BTreeMap::from([(theme_id.to_string(), ids)]))
        .unwrap()
}

#[tokio::test]
#[traced_test]
async fn missing_template_object_is_skipped_and_the_rest_provisioned() {
    let db = db().await;
    let user_id = seed_user(&db).await;
    let original = seed_object(&db, "Desk lamp", &["Brass", "Silver"], false).await;
    let svc = services(&db, catalog_with(3, vec![original.id, Uuid::new_v4()]));

    let outcome = svc
        .provisioning
        .provision_default_objects(&db, 3, user_id)
        .await
        .unwrap();

    let ProvisionOutcome::Created(ids) = outcome else {
        panic!("expected objects to be created, got {outcome:?}");
    };
    assert_eq!(ids.len(), 1);
    assert!(logs_contain("template object not found in catalog; skipping"));

    let placed = SeaModifiedRepository::new()
        .find(&db, ids[0])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(placed.name, "Desk lamp");
    assert_eq!(placed.original_object_id, Some(original.id));
    assert_eq!(placed.coordinates, Coordinates { x: 0.75, y: 0.4 });
    assert!(!placed.is_user_made);
    assert!(placed.image_variants.iter().all(|v| v.variant_id.is_none()));
    assert_eq!(placed.image_variants.len(), 2);
    let provenance = placed.provenance.unwrap();
    assert_eq!(provenance.theme_id, 3);
    assert_eq!(provenance.template_index, 0);
    assert_eq!(provenance.user_id, user_id);

    let profile = SeaUsersRepository::new()
        .find_profile(&db, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.modified_object_ids, ids);
}

#[tokio::test]
#[traced_test]
async fn unready_theme_creates_nothing() {
    let db = db().await;
    let user_id = seed_user(&db).await;
    let svc = services(&db, ThemeCatalog::builtin());

    let outcome = svc
        .provisioning
        .provision_default_objects(&db, 2, user_id)
        .await
        .unwrap();

    assert!(matches!(
        &outcome,
        ProvisionOutcome::NothingCreated { reason } if reason.starts_with("Theme configuration not finalized")
    ));
    assert!(logs_contain("placeholder"));
    let profile = SeaUsersRepository::new()
        .find_profile(&db, user_id)
        .await
        .unwrap()
        .unwrap();
    assert!(profile.modified_object_ids.is_empty());
}

#[tokio::test]
async fn unknown_theme_and_all_missing_objects_report_reasons() {
    let db = db().await;
    let user_id = seed_user(&db).await;
    let svc = services(&db, catalog_with(1, vec![Uuid::new_v4(), Uuid::new_v4()]));

    let unknown = svc
        .provisioning
        .provision_default_objects(&db, 9, user_id)
        .await
        .unwrap();
    assert_eq!(
        unknown,
        ProvisionOutcome::NothingCreated {
            reason: "Invalid theme ID".to_owned()
        }
    );

    let missing = svc
        .provisioning
        .provision_default_objects(&db, 1, user_id)
        .await
        .unwrap();
    assert_eq!(
        missing,
        ProvisionOutcome::NothingCreated {
            reason: "Failed to create any default objects".to_owned()
        }
    );
    assert_eq!(missing.created_count(), 0);
}

#[tokio::test]
#[traced_test]
async fn object_without_variants_is_skipped() {
    let db = db().await;
    let user_id = seed_user(&db).await;
    let now = OffsetDateTime::now_utc();
    let bare = CatalogObject {
        id: Uuid::new_v4(),
        name: "Bare".to_owned(),
        description: None,
        current_image_variant: variant("ghost"),
        image_variants: Vec::new(),
        is_user_made: false,
        placement_surface: PlacementSurface::Wall,
        created_at: now,
        updated_at: now,
    };
    SeaCatalogRepository::new().insert(&db, &bare).await.unwrap();
    let plant = seed_object(&db, "Plant", &["Green"], false).await;
    let svc = services(&db, catalog_with(4, vec![bare.id, plant.id]));

    let outcome = svc
        .provisioning
        .provision_default_objects(&db, 4, user_id)
        .await
        .unwrap();

    assert_eq!(outcome.created_count(), 1);
    assert!(logs_contain("template object has no image variants; skipping"));
}

#[tokio::test]
async fn provisioning_twice_creates_duplicates() {
    let db = db().await;
    let user_id = seed_user(&db).await;
    let a = seed_object(&db, "Clock", &["Oak"], false).await;
    let b = seed_object(&db, "Rug", &["Red"], false).await;
    let svc = services(&db, catalog_with(5, vec![a.id, b.id]));

    for _ in 0..2 {
        let outcome = svc
            .provisioning
            .provision_default_objects(&db, 5, user_id)
            .await
            .unwrap();
        assert_eq!(outcome.created_count(), 2);
    }
    let profile = SeaUsersRepository::new()
        .find_profile(&db, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.modified_object_ids.len(), 4);
}
