mod common;

use std::time::Duration;

use artfusion::forms::ArtworkDraft;
use artfusion::roles::Role;
use artfusion::store::{Collection, LoadPhase, RefreshOutcome};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

#[tokio::test]
async fn test_artwork_create_refreshes_mounted_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/artworks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/artworks/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([artwork_json(3, "Dune", 4)])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/artworks/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(artwork_json(3, "Dune", 4)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gallery, _) = signed_in(&mock_server, Role::Artist).await;
    let artworks = gallery.artwork_list();
    assert_eq!(artworks.refresh().await, RefreshOutcome::Applied);
    assert!(artworks.is_empty().await);

    let mut changes = artworks.changes();
    let draft = ArtworkDraft {
        title: "Dune".to_string(),
        description: "Oil on canvas".to_string(),
        quantity_available: 4,
        price: "80.00".to_string(),
        image: None,
    };
    gallery.artworks().create(&draft).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), changes.changed())
        .await
        .expect("artwork list was not refreshed")
        .unwrap();

    let items = artworks.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Dune");
    assert_eq!(artworks.phase().await, LoadPhase::Resolved);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([event_json(1, "Vernissage")])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let (gallery, _) = anonymous(&mock_server).await;
    let events = gallery.event_list();

    assert_eq!(events.refresh().await, RefreshOutcome::Applied);
    assert_eq!(events.refresh().await, RefreshOutcome::Failed);

    assert_eq!(events.len().await, 1);
    assert_eq!(events.phase().await, LoadPhase::Failed);
    assert!(events.last_error().await.unwrap().contains("Bad Gateway"));
}

#[tokio::test]
async fn test_slow_response_is_superseded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/workshops/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/workshops/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 4,
            "title": "Watercolor basics",
            "description": "Intro session",
            "start_date": "2025-07-01T10:00:00Z",
            "end_date": "2025-07-01T12:00:00Z",
            "location": "Studio B",
            "capacity": 12,
            "price": "40.00",
            "level": "beginner",
            "duration": "02:00:00",
            "materials_provided": "Paper, brushes",
            "instructor": "M. Duval"
        }])))
        .mount(&mock_server)
        .await;

    let (gallery, _) = anonymous(&mock_server).await;
    let workshops = gallery.workshop_list();

    let slow = {
        let workshops = workshops.clone();
        tokio::spawn(async move { workshops.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(workshops.refresh().await, RefreshOutcome::Applied);
    assert_eq!(slow.await.unwrap(), RefreshOutcome::Superseded);

    let items = workshops.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].instructor, "M. Duval");
}

#[tokio::test]
async fn test_unmounted_list_ignores_invalidations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/comments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([comment_json(1, 7, "Lovely")])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (gallery, _) = anonymous(&mock_server).await;
    let comments = gallery.comment_list();
    comments.unmount();

    gallery.bus().invalidate(Collection::Comments);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(comments.refresh().await, RefreshOutcome::Unmounted);
    assert!(comments.is_empty().await);
}
