//! End-to-end profile sync against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use creatorlink_client::{
    CreatorApi, CreatorClient, CredentialKind, CredentialStore, LogNavigator,
    MemoryCredentialStore, RequestGateway, TokenResolver,
};
use creatorlink_core::{PlatformType, ProfileEdit};
use creatorlink_sync::{IngestionPoller, ProfileSync, SyncError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn profile_sync(base_url: &str) -> (ProfileSync, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    store.set(CredentialKind::Access, "user-token").unwrap();
    let gateway = RequestGateway::new(
        base_url,
        5,
        TokenResolver::new(store.clone()),
        Arc::new(LogNavigator),
    )
    .expect("failed to build test gateway");
    let api: Arc<dyn CreatorApi> = Arc::new(CreatorClient::new(Arc::new(gateway)));
    let poller = IngestionPoller::new(Arc::clone(&api))
        .with_interval(Duration::from_millis(20))
        .with_max_attempts(5);
    (ProfileSync::new(api, "b-1", poller), store)
}

fn instagram(url: &str, subscribers: &str) -> serde_json::Value {
    json!({ "type": "instagram", "profileUrl": url, "subscribers": subscribers })
}

async fn mount_profile(server: &MockServer, body: serde_json::Value, priority: u8, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/bloggers/b-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .with_priority(priority);
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

#[tokio::test]
async fn relink_polls_until_ingested() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        json!({ "id": "b-1", "name": "Jane", "social": [instagram("https://instagram.com/jane", "100")] }),
        1,
        Some(1),
    )
    .await;
    mount_profile(
        &server,
        json!({
            "id": "b-1",
            "social": [instagram("https://instagram.com/jane", "100")],
            "socialMediaDrafts": [instagram("https://instagram.com/jane_new", "0")]
        }),
        2,
        Some(2),
    )
    .await;
    mount_profile(
        &server,
        json!({ "id": "b-1", "name": "Jane", "social": [instagram("https://instagram.com/jane_new", "8100")] }),
        3,
        None,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/integrations/instagram"))
        .and(body_json(json!({
            "bloggerId": "b-1",
            "identifier": "jane_new",
            "profileUrl": "https://instagram.com/jane_new"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let (sync, _) = profile_sync(&server.uri());
    sync.load().await.unwrap();

    let link = sync
        .update_platform(PlatformType::Instagram, "https://instagram.com/jane_new")
        .await
        .unwrap();

    assert_eq!(link.identifier, "jane_new");
    assert_eq!(link.snapshot.unwrap().subscribers.as_deref(), Some("8100"));
    let requests = server.received_requests().await.unwrap();
    let fetches = requests
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(fetches, 4);
}

#[tokio::test]
async fn relink_times_out_and_keeps_old_account() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        json!({ "id": "b-1", "social": [instagram("https://instagram.com/jane", "100")] }),
        1,
        Some(1),
    )
    .await;
    mount_profile(
        &server,
        json!({
            "id": "b-1",
            "social": [instagram("https://instagram.com/jane", "100")],
            "socialMediaDrafts": [instagram("https://instagram.com/jane_new", "0")]
        }),
        2,
        None,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/integrations/instagram"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let (sync, _) = profile_sync(&server.uri());
    sync.load().await.unwrap();

    let err = sync
        .update_platform(PlatformType::Instagram, "https://instagram.com/jane_new")
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::IngestionTimeout { attempts: 5, .. }));
    let view = sync.view().unwrap();
    let link = view.platform(PlatformType::Instagram).unwrap();
    assert_eq!(link.profile_url, "https://instagram.com/jane");
    assert!(!link.is_loading);
}

#[tokio::test]
async fn refused_link_removes_pending_entry() {
    let server = MockServer::start().await;
    mount_profile(&server, json!({ "id": "b-1", "social": [] }), 1, None).await;
    Mock::given(method("POST"))
        .and(path("/integrations/vk"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "statusCode": 409,
            "message": "Account already linked to another creator"
        })))
        .mount(&server)
        .await;

    let (sync, _) = profile_sync(&server.uri());
    sync.load().await.unwrap();

    let err = sync
        .add_platform(PlatformType::Vk, "https://vk.com/jane")
        .await
        .unwrap_err();

    assert_eq!(
        err.user_message().as_deref(),
        Some("Account already linked to another creator")
    );
    assert!(sync.view().unwrap().platform(PlatformType::Vk).is_none());
}

#[tokio::test]
async fn expired_session_signs_out_silently() {
    let server = MockServer::start().await;
    mount_profile(&server, json!({ "id": "b-1", "name": "Jane" }), 1, Some(1)).await;
    Mock::given(method("PATCH"))
        .and(path("/bloggers/b-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })))
        .mount(&server)
        .await;

    let (sync, store) = profile_sync(&server.uri());
    sync.load().await.unwrap();

    let err = sync
        .update_profile(&ProfileEdit {
            name: Some("B".to_string()),
            ..ProfileEdit::default()
        })
        .await
        .unwrap_err();

    assert!(err.user_message().is_none());
    assert!(store.get(CredentialKind::Access).is_none());
    assert_eq!(sync.view().unwrap().name.as_deref(), Some("Jane"));
}
