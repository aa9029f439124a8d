mod common;

use chrono::{Duration, Utc};
use emochat::store::{ChatStore, ConversationPatch, Error, NewMessage, Role, UserSettings};
use testcontainers::clients::Cli;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

async fn new_user(store: &ChatStore, prefix: &str) -> Uuid {
    store
        .create_user("Test User", &common::unique_email(prefix), "not-a-real-hash")
        .await
        .expect("Failed to create user")
        .id
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let email = common::unique_email("dup");
    store.create_user("First", &email, "hash").await.unwrap();

    assert!(store.email_exists(&email).await.unwrap());
    let err = store.create_user("Second", &email, "hash").await.unwrap_err();
    assert!(matches!(err, Error::DuplicateError(_)));

    let found = store.find_active_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.name, "First");
    assert!(found.last_login.is_none());

    store.record_login(found.id).await.unwrap();
    let reloaded = store.find_user_by_id(found.id).await.unwrap().unwrap();
    assert!(reloaded.last_login.is_some());
}

#[tokio::test]
async fn test_message_order_is_gapless_and_titles_conversation() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = new_user(&store, "order").await;
    let conversation = store.create_conversation(user, "New Chat").await.unwrap();

    let long_first = "I have been feeling really overwhelmed at work lately and I don't know why";
    let first = store
        .add_message(user, conversation.id, NewMessage::user(long_first))
        .await
        .unwrap();
    let second = store
        .add_message(user, conversation.id, NewMessage::ai("That sounds hard."))
        .await
        .unwrap();
    assert_eq!(first.message_order, 1);
    assert_eq!(second.message_order, 2);

    let bulk = store
        .add_messages(
            user,
            conversation.id,
            vec![NewMessage::user("thanks"), NewMessage::ai("Any time.")],
        )
        .await
        .unwrap();
    let orders: Vec<i32> = bulk.iter().map(|m| m.message_order).collect();
    assert_eq!(orders, vec![3, 4]);

    let messages = store.list_messages(user, conversation.id).await.unwrap();
    let orders: Vec<i32> = messages.iter().map(|m| m.message_order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4]);
    assert_eq!(messages[1].role, Role::Ai);

    let reloaded = store
        .get_conversation(user, conversation.id)
        .await
        .unwrap()
        .unwrap();
    let expected_title: String = long_first.chars().take(50).collect::<String>() + "...";
    assert_eq!(reloaded.title, expected_title);
    assert!(reloaded.updated_at >= conversation.updated_at);
}

#[tokio::test]
async fn test_concurrent_inserts_never_share_an_order() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = new_user(&store, "concurrent").await;
    let conversation = store.create_conversation(user, "Busy").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        let id = conversation.id;
        handles.push(tokio::spawn(async move {
            store
                .add_message(user, id, NewMessage::user(format!("message {}", i)))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("insert failed");
    }

    let messages = store.list_messages(user, conversation.id).await.unwrap();
    let orders: Vec<i32> = messages.iter().map(|m| m.message_order).collect();
    assert_eq!(orders, (1..=10).collect::<Vec<i32>>());

    // An explicit title is never replaced by the first message
    let reloaded = store
        .get_conversation(user, conversation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.title, "Busy");
}

#[tokio::test]
async fn test_invalid_bulk_insert_writes_nothing() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = new_user(&store, "bulk").await;
    let conversation = store.create_conversation(user, "New Chat").await.unwrap();

    let err = store
        .add_messages(
            user,
            conversation.id,
            vec![NewMessage::user("fine"), NewMessage::ai("   ")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));

    assert_err!(store.add_messages(user, conversation.id, vec![]).await);

    assert!(store
        .list_messages(user, conversation.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_ownership_and_cascade_delete() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let owner = new_user(&store, "owner").await;
    let stranger = new_user(&store, "stranger").await;
    let conversation = store.create_conversation(owner, "Mine").await.unwrap();
    store
        .add_message(owner, conversation.id, NewMessage::user("secret"))
        .await
        .unwrap();

    // Someone else's conversation looks like a missing one
    assert!(store
        .get_conversation(stranger, conversation.id)
        .await
        .unwrap()
        .is_none());
    assert!(matches!(
        store.list_messages(stranger, conversation.id).await,
        Err(Error::NotFoundError(_))
    ));
    assert!(matches!(
        store
            .add_message(stranger, conversation.id, NewMessage::user("hi"))
            .await,
        Err(Error::NotFoundError(_))
    ));
    assert!(!store
        .delete_conversation(stranger, conversation.id)
        .await
        .unwrap());

    let summaries = store.list_conversations(owner).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].message_count, 1);

    assert!(store.delete_conversation(owner, conversation.id).await.unwrap());
    assert!(matches!(
        store.list_messages(owner, conversation.id).await,
        Err(Error::NotFoundError(_))
    ));
    let counts = store.table_row_counts().await.unwrap();
    let messages = counts.iter().find(|(t, _)| t == "messages").unwrap();
    assert_eq!(messages.1, 0);
}

#[tokio::test]
async fn test_update_and_archive_conversation() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = new_user(&store, "archive").await;
    let conversation = store.create_conversation(user, "New Chat").await.unwrap();

    let renamed = store
        .update_conversation(
            user,
            conversation.id,
            ConversationPatch::default().with_title("Evening thoughts"),
        )
        .await
        .unwrap();
    assert_eq!(renamed.title, "Evening thoughts");
    assert!(!renamed.is_archived);

    store
        .update_conversation(
            user,
            conversation.id,
            ConversationPatch::default().with_archived(true),
        )
        .await
        .unwrap();

    // Archived conversations drop out of the listing
    assert!(store.list_conversations(user).await.unwrap().is_empty());

    let err = store
        .update_conversation(
            user,
            Uuid::new_v4(),
            ConversationPatch::default().with_title("x"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFoundError(_)));
}

#[tokio::test]
async fn test_settings_and_sessions() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = new_user(&store, "settings").await;
    assert_eq!(store.get_settings(user).await.unwrap(), UserSettings::default());

    let custom = UserSettings {
        preferred_model: "gemini-1.5-flash".to_string(),
        use_builtin_key: false,
    };
    store.upsert_settings(user, &custom).await.unwrap();
    store.upsert_settings(user, &custom).await.unwrap();
    assert_eq!(store.get_settings(user).await.unwrap(), custom);

    let live = store
        .create_session(user, "live-token", Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    assert!(!live.is_expired(Utc::now()));
    store
        .create_session(user, "stale-token", Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    assert!(store.touch_session("live-token").await.unwrap());
    assert!(!store.touch_session("unknown-token").await.unwrap());

    assert_eq!(store.delete_expired_sessions().await.unwrap(), 1);
    assert!(store.touch_session("live-token").await.unwrap());
    assert!(!store.touch_session("stale-token").await.unwrap());
}

#[tokio::test]
async fn test_schema_is_idempotent_and_describable() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    // Re-running the schema is a no-op
    assert_ok!(store.apply_schema().await);

    let tables = store.describe_tables().await.unwrap();
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    for expected in ["conversations", "messages", "sessions", "user_settings", "users"] {
        assert!(names.contains(&expected), "missing table {}", expected);
    }

    let messages = tables.iter().find(|t| t.name == "messages").unwrap();
    assert!(messages.columns.iter().any(|c| c.name == "message_order"));
}
