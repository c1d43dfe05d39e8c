//! Behavioral coverage for the organization service.

use std::sync::Arc;

use rstest::rstest;
use uuid::Uuid;

use crate::domain::ports::{OrganizationRepository, OrganizationRepositoryError};
use crate::domain::{
    Coordinate, Error, ErrorCode, NewOrganization, OrganizationService, OrganizationUpdate,
};
use crate::test_support::InMemoryOrganizationRepository;

fn service() -> (OrganizationService, Arc<InMemoryOrganizationRepository>) {
    let repository = Arc::new(InMemoryOrganizationRepository::new());
    (OrganizationService::new(repository.clone()), repository)
}

fn new_organization(name: &str) -> NewOrganization {
    NewOrganization {
        name: name.into(),
        coordinate: None,
        address: None,
        description: None,
        image_urls: Vec::new(),
    }
}

#[tokio::test]
async fn create_returns_generated_id_and_ordered_timestamps() {
    let (service, _repository) = service();

    let first = service
        .create(new_organization("Acme Corp"))
        .await
        .expect("create first");
    let second = service
        .create(new_organization("Globex"))
        .await
        .expect("create second");

    assert_ne!(first.id, Uuid::nil());
    assert_ne!(first.id, second.id);
    assert!(first.created_at <= first.updated_at);
}

#[tokio::test]
async fn get_missing_returns_none_not_error() {
    let (service, _repository) = service();

    let result = service.get(Uuid::new_v4()).await.expect("get");

    assert!(result.is_none());
}

#[tokio::test]
async fn list_orders_most_recent_first() {
    let (service, _repository) = service();
    let first = service
        .create(new_organization("First"))
        .await
        .expect("create");
    let second = service
        .create(new_organization("Second"))
        .await
        .expect("create");

    let listed = service.list().await.expect("list");

    let ids: Vec<_> = listed.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn get_by_ids_omits_missing_and_keeps_creation_order() {
    let (service, _repository) = service();
    let first = service
        .create(new_organization("First"))
        .await
        .expect("create");
    let second = service
        .create(new_organization("Second"))
        .await
        .expect("create");
    let missing = Uuid::new_v4();

    let found = service
        .get_by_ids(&[first.id, missing, second.id])
        .await
        .expect("batch lookup");

    let ids: Vec<_> = found.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn coordinates_lists_only_organizations_with_a_coordinate() {
    let (service, _repository) = service();
    let mut with_coordinate = new_organization("Located");
    with_coordinate.coordinate = Some(Coordinate::new(13.7388, 100.5322).expect("coordinate"));
    let located = service.create(with_coordinate).await.expect("create");
    service
        .create(new_organization("Unlocated"))
        .await
        .expect("create");

    let coordinates = service.coordinates().await.expect("coordinates");

    assert_eq!(coordinates.len(), 1);
    assert_eq!(coordinates[0].id, located.id);
    assert_eq!(coordinates[0].coordinate.latitude(), 13.7388);
}

#[tokio::test]
async fn update_of_single_field_leaves_others_untouched() {
    let (service, _repository) = service();
    let created = service
        .create(NewOrganization {
            name: "Acme Corp".into(),
            coordinate: Some(Coordinate::new(13.7388, 100.5322).expect("coordinate")),
            address: Some("1 Main St".into()),
            description: Some("widgets".into()),
            image_urls: vec!["https://example.com/a.png".into()],
        })
        .await
        .expect("create");

    let updated = service
        .update(
            created.id,
            OrganizationUpdate {
                name: Some("Acme Ltd".into()),
                ..OrganizationUpdate::default()
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.name, "Acme Ltd");
    assert_eq!(updated.coordinate, created.coordinate);
    assert_eq!(updated.address, created.address);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.image_urls, created.image_urls);
}

#[tokio::test]
async fn overlapping_updates_lose_the_earlier_write() {
    // The read-merge-write sequence is not atomic: two writers that read
    // the same revision persist whole entities, so the last one wins and
    // the earlier writer's change is silently dropped.
    let (service, repository) = service();
    let created = service
        .create(new_organization("Acme Corp"))
        .await
        .expect("create");

    let mut first_writer = service
        .get(created.id)
        .await
        .expect("get")
        .expect("present");
    let mut second_writer = first_writer.clone();

    first_writer.apply(OrganizationUpdate {
        name: Some("Acme Ltd".into()),
        ..OrganizationUpdate::default()
    });
    second_writer.apply(OrganizationUpdate {
        address: Some("2 Side St".into()),
        ..OrganizationUpdate::default()
    });

    repository
        .update(&first_writer)
        .await
        .expect("first write")
        .expect("row present");
    repository
        .update(&second_writer)
        .await
        .expect("second write")
        .expect("row present");

    let stored = service
        .get(created.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(stored.address.as_deref(), Some("2 Side St"));
    // The rename from the first writer is gone.
    assert_eq!(stored.name, "Acme Corp");
}

#[tokio::test]
async fn update_missing_organization_is_not_found() {
    let (service, _repository) = service();

    let err = service
        .update(Uuid::new_v4(), OrganizationUpdate::default())
        .await
        .expect_err("update should fail");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_succeeds_once_then_reports_not_found() {
    let (service, _repository) = service();
    let created = service
        .create(new_organization("Ephemeral"))
        .await
        .expect("create");

    service.delete(created.id).await.expect("first delete");

    let err = service
        .delete(created.id)
        .await
        .expect_err("second delete should fail");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_of_unknown_id_is_not_found() {
    let (service, _repository) = service();

    let err = service
        .delete(Uuid::new_v4())
        .await
        .expect_err("delete should fail");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn deleted_organization_disappears_from_reads() {
    let (service, _repository) = service();
    let created = service
        .create(new_organization("Gone"))
        .await
        .expect("create");

    service.delete(created.id).await.expect("delete");

    assert!(service.get(created.id).await.expect("get").is_none());
    assert!(service.list().await.expect("list").is_empty());
}

#[rstest]
#[case("acme")]
#[case("ACME")]
#[case("me co")]
#[tokio::test]
async fn search_is_case_insensitive_and_substring_based(#[case] query: &str) {
    let (service, _repository) = service();
    service
        .create(new_organization("Acme Corp"))
        .await
        .expect("create");

    let found = service.search(query, None).await.expect("search");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Acme Corp");
}

#[tokio::test]
async fn search_orders_alphabetically_and_honors_limit() {
    let (service, _repository) = service();
    for name in ["Zeta Labs", "Alpha Labs", "Midway Labs"] {
        service
            .create(new_organization(name))
            .await
            .expect("create");
    }

    let capped = service.search("labs", Some(2)).await.expect("search");
    let names: Vec<_> = capped.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha Labs", "Midway Labs"]);

    // Zero and negative limits mean unbounded.
    let unbounded = service.search("labs", Some(0)).await.expect("search");
    assert_eq!(unbounded.len(), 3);
}

#[tokio::test]
async fn connection_failures_surface_as_service_unavailable() {
    let (service, repository) = service();
    repository.set_failure(OrganizationRepositoryError::connection("pool exhausted"));

    let err: Error = service.list().await.expect_err("list should fail");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn query_failures_surface_as_internal_errors() {
    let (service, repository) = service();
    repository.set_failure(OrganizationRepositoryError::query("relation missing"));

    let err = service.list().await.expect_err("list should fail");

    assert_eq!(err.code(), ErrorCode::InternalError);
}
