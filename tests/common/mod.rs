#![allow(dead_code)]

use std::time::Duration;

use event_hub_lib::{ClientConfig, EventStore};
use httpmock::MockServer;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const AI_ID: &str = "user-ai-responder";

/// A store pointed at `server`, with its session file in a fresh temp dir.
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn store_for(server: &MockServer) -> (EventStore, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = EventStore::new(config_for(server, &dir)).expect("store");
    (store, dir)
}

pub fn config_for(server: &MockServer, dir: &TempDir) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(server.url("/api"))
        .with_data_dir(dir.path())
        .with_ai_reply_delay(Duration::ZERO)
}

pub fn user_json(id: &str, token: &str) -> Value {
    json!({
        "_id": id,
        "name": format!("User {id}"),
        "email": format!("{id}@example.com"),
        "token": token,
    })
}

pub fn comment_json(id: &str, author: &str, text: &str) -> Value {
    json!({
        "_id": id,
        "user": { "id": author, "name": author, "email": "" },
        "text": text,
        "timestamp": "2025-05-01T12:00:00Z",
    })
}

pub fn event_json(id: &str, title: &str) -> Value {
    event_with(id, title, json!([]), json!([]))
}

pub fn event_with(id: &str, title: &str, attendees: Value, comments: Value) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": format!("{title} description"),
        "date": "2025-06-01",
        "time": "18:00",
        "location": "Main Hall",
        "imageUrl": "https://picsum.photos/seed/x/1200/600",
        "creator": { "_id": "u1", "name": "User u1" },
        "attendees": attendees,
        "comments": comments,
        "tickets": [{ "type": "General Admission", "price": 0 }],
        "createdAt": "2025-05-01T10:00:00Z",
        "updatedAt": "2025-05-01T10:00:00Z",
    })
}
