//! Integration tests for `mirror-db` against a live `Dragonfly` instance.
//!
//! Run with:
//!
//! ```bash
//! docker run -d -p 6379:6379 docker.dragonflydb.io/dragonflydb/dragonfly
//! cargo test -p mirror-db -- --ignored
//! ```
//!
//! All tests are marked `#[ignore]` so they are skipped during normal
//! `cargo test` runs. Each test flushes the instance, so run them with
//! `--test-threads=1`.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::time::Duration;

use fred::prelude::*;
use mirror_db::{
    DragonflyStore, Mirror, MirrorError, MirrorStore, Notification, SELF_USER_KEY, StoreConfig,
    all_channels, clean_entity,
};
use mirror_types::{EntityKind, EntityRecord, HostSession, HostSnapshot};
use serde_json::{Value as Json, json};

/// Dragonfly connection URL for the local Docker instance.
const DRAGONFLY_URL: &str = "redis://localhost:6379";

fn entity(value: Json) -> EntityRecord {
    EntityRecord::try_from(value).expect("valid entity")
}

async fn setup() -> Mirror<DragonflyStore> {
    let store = DragonflyStore::connect(DRAGONFLY_URL)
        .await
        .expect("Failed to connect to Dragonfly -- is Docker running?");
    store.flush_all().await.expect("Failed to flush");
    Mirror::new(store)
}

// =============================================================================
// Connection
// =============================================================================

#[tokio::test]
async fn invalid_url_is_a_config_error() {
    let result = DragonflyStore::connect("not a url").await;
    assert!(matches!(result, Err(MirrorError::Config(_))));
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance (docker compose up -d)"]
async fn dragonfly_connect_with_config() {
    let config = StoreConfig::new(DRAGONFLY_URL).with_connect_timeout(2_000);
    let store = DragonflyStore::connect_with(&config)
        .await
        .expect("Failed to connect to Dragonfly");
    store.close().await.expect("Failed to close");
}

// =============================================================================
// Set / delete
// =============================================================================

#[tokio::test]
#[ignore = "requires live Dragonfly instance (docker compose up -d)"]
async fn dragonfly_set_and_delete_roundtrip() {
    let mirror = setup().await;
    let guild = entity(json!({
        "id": "g1", "name": "Rustaceans", "large": true, "memberCount": 1200,
        "roles": ["admin"], "icon": null,
    }));

    mirror.set_guild(&guild).await.expect("Failed to set guild");
    let stored = mirror
        .fetch(EntityKind::Guild, &guild)
        .await
        .expect("Failed to read guild");
    assert_eq!(stored, Some(clean_entity(&guild).encode()));

    mirror.delete_guild(&guild).await.expect("Failed to delete guild");
    let stored = mirror
        .fetch(EntityKind::Guild, &guild)
        .await
        .expect("Failed to read guild");
    assert_eq!(stored, None);

    mirror.store().flush_all().await.expect("Failed to flush");
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance (docker compose up -d)"]
async fn dragonfly_message_ttl() {
    let mirror = setup().await;
    let message = entity(json!({"id": "m1", "content": "hi"}));

    let session = HostSession::new("me1").with_message_cache_lifetime(Some(120));
    mirror
        .set_message(&session, &message)
        .await
        .expect("Failed to set message");
    let ttl = mirror.store().ttl("message:m1").await.expect("Failed to read TTL");
    assert!(matches!(ttl, Some(t) if (118..=120).contains(&t)), "ttl = {ttl:?}");

    let other = entity(json!({"id": "m2", "content": "hey"}));
    mirror
        .set_message(&HostSession::new("me1"), &other)
        .await
        .expect("Failed to set message");
    let ttl = mirror.store().ttl("message:m2").await.expect("Failed to read TTL");
    assert_eq!(ttl, None);

    mirror.store().flush_all().await.expect("Failed to flush");
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance (docker compose up -d)"]
async fn dragonfly_own_user_refreshes_me() {
    let mirror = setup().await;
    let session = HostSession::new("me1");
    let me = entity(json!({"id": "me1", "username": "Bot"}));

    let outcome = mirror.set_user(&session, &me).await.expect("Failed to set user");
    outcome.wait_self_copy().await.expect("Failed to write user:me");

    let stored = mirror
        .store()
        .hash_get_all(SELF_USER_KEY)
        .await
        .expect("Failed to read user:me");
    assert_eq!(stored, Some(clean_entity(&me).encode()));

    mirror.store().flush_all().await.expect("Failed to flush");
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance (docker compose up -d)"]
async fn dragonfly_wrong_type_fails_without_publish() {
    let mirror = setup().await;
    let _: () = mirror
        .store()
        .client()
        .set("channel:c1", "plain", None, None, false)
        .await
        .expect("Failed to seed string key");

    let result = mirror
        .set_channel(&entity(json!({"id": "c1", "name": "general"})))
        .await;
    assert!(matches!(result, Err(MirrorError::Store(_))));

    mirror.store().flush_all().await.expect("Failed to flush");
}

// =============================================================================
// Pub/sub
// =============================================================================

#[tokio::test]
#[ignore = "requires live Dragonfly instance (docker compose up -d)"]
async fn dragonfly_mutations_are_published() {
    let mirror = setup().await;

    let subscriber = mirror.store().client().clone_new();
    subscriber.init().await.expect("Failed to connect subscriber");
    let mut messages = subscriber.message_rx();
    subscriber
        .subscribe(all_channels())
        .await
        .expect("Failed to subscribe");

    mirror
        .set_emoji(&entity(json!({"id": "e1", "name": "ferris"})))
        .await
        .expect("Failed to set emoji");
    mirror.delete_emoji("e1").await.expect("Failed to delete emoji");

    let mut received = Vec::new();
    for _ in 0..2 {
        let message = tokio::time::timeout(Duration::from_secs(5), messages.recv())
            .await
            .expect("Timed out waiting for notification")
            .expect("Subscriber closed");
        let payload = message.value.as_string().expect("String payload");
        received.push(Notification::parse(&message.channel, &payload).expect("Known channel"));
    }

    assert_eq!(
        received,
        vec![
            Notification::set(EntityKind::Emoji, "e1".into()),
            Notification::delete(EntityKind::Emoji, "e1".into()),
        ]
    );

    subscriber.quit().await.expect("Failed to close subscriber");
    mirror.store().flush_all().await.expect("Failed to flush");
}

// =============================================================================
// Snapshot
// =============================================================================

#[tokio::test]
#[ignore = "requires live Dragonfly instance (docker compose up -d)"]
async fn dragonfly_init_snapshot() {
    let mirror = setup().await;
    let snapshot = HostSnapshot::new(entity(json!({"id": "me1", "username": "Bot"})))
        .with_users(vec![
            entity(json!({"id": "u1", "name": "Ann"})),
            entity(json!({"id": "u2", "name": "Ben"})),
        ])
        .with_guilds(vec![entity(json!({"id": "g1", "name": "Rustaceans"}))]);

    let report = mirror.init(&snapshot).await.expect("Failed to init");
    assert_eq!(report.total, 4);

    for key in ["user:u1", "user:u2", "guild:g1", SELF_USER_KEY] {
        let stored = mirror
            .store()
            .hash_get_all(key)
            .await
            .expect("Failed to read hash");
        assert!(stored.is_some(), "missing {key}");
    }

    mirror.store().flush_all().await.expect("Failed to flush");
}
