#![allow(dead_code)]

use std::sync::Arc;

use artfusion::config::ClientOptions;
use artfusion::models::User;
use artfusion::roles::Role;
use artfusion::session::{MemorySessionStore, StoredSession};
use artfusion::Gallery;
use serde_json::{json, Value};
use wiremock::MockServer;

pub fn options(server: &MockServer) -> ClientOptions {
    ClientOptions::default()
        .with_api_url(&server.uri())
        .with_persist_session(false)
}

pub async fn anonymous(server: &MockServer) -> (Gallery, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let gallery = Gallery::with_store(options(server), store.clone())
        .await
        .unwrap();
    (gallery, store)
}

pub async fn signed_in(server: &MockServer, role: Role) -> (Gallery, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::with_session(StoredSession {
        access_token: "stored-token".to_string(),
        refresh_token: None,
        user: Some(user(role)),
    }));
    let gallery = Gallery::with_store(options(server), store.clone())
        .await
        .unwrap();
    (gallery, store)
}

pub fn user(role: Role) -> User {
    match role {
        Role::Artist => User {
            id: 1,
            email: "ines@example.com".to_string(),
            first_name: "Inès".to_string(),
            last_name: "Garnier".to_string(),
            category: Role::Artist,
            phone: None,
            profile_picture: None,
            artistic_nickname: Some("Ines G.".to_string()),
        },
        Role::Visiteur => User {
            id: 2,
            email: "leo@example.com".to_string(),
            first_name: "Léo".to_string(),
            last_name: "Martin".to_string(),
            category: Role::Visiteur,
            phone: None,
            profile_picture: None,
            artistic_nickname: None,
        },
    }
}

pub fn user_json(role: Role) -> Value {
    serde_json::to_value(user(role)).unwrap()
}

pub fn event_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Opening night",
        "start_date": "2025-06-01T18:00:00Z",
        "end_date": "2025-06-01T22:00:00Z",
        "location": "Main hall",
        "image": null,
        "capacity": 80,
        "price": "15.00",
        "average_rating": 4.5,
        "ratings": [{"id": 1, "value": 5, "comment": "Superb", "created_at": "2025-06-02T09:00:00Z"}]
    })
}

pub fn artwork_json(id: i64, title: &str, available: u32) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Oil on canvas",
        "quantity_available": available,
        "price": "120.00",
        "image": null,
        "color_palette": null,
        "created_at": "2025-05-01T10:00:00Z"
    })
}

pub fn comment_json(id: i64, artwork: i64, content: &str) -> Value {
    json!({
        "id": id,
        "artwork": artwork,
        "user": {"id": 2, "first_name": "Léo", "last_name": "Martin", "category": "Visiteur"},
        "content": content,
        "moderation_status": "approved",
        "moderation_reason": null,
        "created_at": "2025-05-03T12:00:00Z"
    })
}
