//! Integration tests for `CreatorClient` endpoints using wiremock.

use std::sync::Arc;

use creatorlink_client::{
    CreatorApi, CreatorClient, CredentialKind, CredentialStore, LinkRequest, LogNavigator,
    MemoryCredentialStore, RequestGateway, TokenResolver,
};
use creatorlink_core::{PlatformType, PriceEdit, ProfileEdit};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CreatorClient {
    let store = Arc::new(MemoryCredentialStore::new());
    store.set(CredentialKind::Access, "user-token").unwrap();
    let gateway = RequestGateway::new(
        base_url,
        5,
        TokenResolver::new(store),
        Arc::new(LogNavigator),
    )
    .expect("failed to build test gateway");
    CreatorClient::new(Arc::new(gateway))
}

#[tokio::test]
async fn fetch_profile_decodes_published_and_drafts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bloggers/b-1"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "b-1",
            "name": "Jane",
            "social": [{ "type": "youtube", "profileUrl": "https://youtube.com/@jane", "subscribers": "5400" }],
            "socialMediaDrafts": [{ "type": "vk", "profileUrl": "https://vk.com/jane", "subscribers": "0" }],
            "profileDraft": { "name": "Jane Doe" }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let profile = client.fetch_profile("b-1", None).await.unwrap();
    assert_eq!(profile.published.name.as_deref(), Some("Jane"));
    assert_eq!(profile.published.social[0].platform_type, PlatformType::Youtube);
    assert_eq!(profile.drafts.social_media_drafts.len(), 1);
    assert!(profile.drafts.has_pending_changes());
}

#[tokio::test]
async fn fetch_profile_with_empty_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_profile("b-1", None).await.unwrap_err();
    assert_eq!(err.status_code, 500);
    assert_eq!(err.message, "Empty profile response");
}

#[tokio::test]
async fn link_platform_posts_to_platform_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/integrations/tiktok"))
        .and(body_json(json!({
            "bloggerId": "b-1",
            "identifier": "dancer",
            "profileUrl": "https://tiktok.com/@dancer"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .link_platform(
            &LinkRequest {
                platform: PlatformType::Tiktok,
                blogger_id: "b-1".to_owned(),
                identifier: "dancer".to_owned(),
                profile_url: "https://tiktok.com/@dancer".to_owned(),
            },
            None,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn edits_patch_sparse_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/bloggers/b-1"))
        .and(body_json(json!({ "name": "New name" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/bloggers/b-1/prices/instagram"))
        .and(body_json(json!({ "storyPrice": 300 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .submit_profile_edit(
            "b-1",
            &ProfileEdit {
                name: Some("New name".to_owned()),
                ..ProfileEdit::default()
            },
        )
        .await
        .unwrap();
    client
        .submit_price_edit(
            "b-1",
            PlatformType::Instagram,
            &PriceEdit {
                story_price: Some(300),
                ..PriceEdit::default()
            },
        )
        .await
        .unwrap();
}
