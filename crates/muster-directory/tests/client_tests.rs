//! Integration tests for the directory HTTP client using wiremock.

mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{page_json, user_json};
use muster_directory::{DirectoryClient, DirectoryError, DirectoryStore};

#[tokio::test]
async fn list_users_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![user_json("k2", "1002", "b@example.org")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![user_json("k1", "1001", "a@example.org")],
            Some("page-2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = DirectoryClient::new(server.uri(), "token").unwrap();
    let users = client.list_users().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, "k1");
    assert_eq!(users[1].id, "k2");
}

#[tokio::test]
async fn transient_status_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = DirectoryClient::new(server.uri(), "token").unwrap();
    let users = client.list_users().await.unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn api_error_body_is_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/users/k1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"message": "insufficient scope"}
        })))
        .mount(&server)
        .await;

    let client = DirectoryClient::new(server.uri(), "token").unwrap();
    let err = client.set_suspended("k1", true).await.unwrap_err();
    match err {
        DirectoryError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "insufficient scope");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn suspend_patches_only_the_suspended_field() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/users/k1"))
        .and(body_partial_json(json!({"suspended": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_json("k1", "1001", "a@example.org")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = DirectoryClient::new(server.uri(), "token").unwrap();
    client.set_suspended("k1", true).await.unwrap();
}

#[tokio::test]
async fn insert_posts_new_user_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_partial_json(json!({
            "primaryEmail": "ada@example.org",
            "orgUnitPath": "/staff/assigned",
            "includeInGlobalAddressList": false
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_json("new-1", "1001", "ada@example.org")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = DirectoryClient::new(server.uri(), "token").unwrap();
    let created = client
        .insert_user(muster_directory::NewUser {
            primary_email: "ada@example.org".into(),
            name: muster_directory::UserName {
                given_name: "Ada".into(),
                family_name: "Lovelace".into(),
                full_name: "Ada Lovelace".into(),
            },
            org_unit_path: "/staff/assigned".into(),
            suspended: false,
            external_ids: vec![muster_directory::ExternalId {
                kind: "organization".into(),
                value: "1001".into(),
            }],
            password: "one-shot".into(),
            include_in_global_address_list: false,
        })
        .await
        .unwrap();

    assert_eq!(created.id, "new-1");
}

#[tokio::test]
async fn test_connection_checks_listing_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("maxResults", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = DirectoryClient::new(server.uri(), "token").unwrap();
    client.test_connection().await.unwrap();
}
