//! Integration tests for session bootstrap and project listing.
//!
//! A wiremock server stands in for the Neptune API.

mod common;

use neptune_lib::{ApiError, LookupError, NeptuneError, Project, Session};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECTS_PATH: &str = "/api/backend/v1/projects";

fn projects_body() -> serde_json::Value {
    json!({
        "entries": [
            {"id": "b3f1e1c2", "name": "Google-AI-Object-Detection-Challenge"},
            {"id": "77aa01de", "name": "sandbox", "organizationName": "neptune-ml"}
        ]
    })
}

#[tokio::test]
async fn test_get_projects_with_given_namespace() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROJECTS_PATH))
        .and(query_param("namespace", "custom_namespace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(projects_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::new(common::credentials(&mock_server.uri(), "default")).unwrap();
    let projects = session.get_projects(Some("custom_namespace")).await.unwrap();

    let keys: HashSet<&str> = projects.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        HashSet::from([
            "custom_namespace/Google-AI-Object-Detection-Challenge",
            "custom_namespace/sandbox",
        ])
    );

    let expected = Project::new(
        Arc::clone(session.client()),
        "77aa01de",
        "custom_namespace",
        "sandbox",
    );
    assert_eq!(projects["custom_namespace/sandbox"], expected);

    for project in projects.values() {
        assert!(Arc::ptr_eq(project.client(), session.client()));
        assert_eq!(project.namespace(), "custom_namespace");
    }
}

#[tokio::test]
async fn test_get_projects_defaults_to_credentials_namespace() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROJECTS_PATH))
        .and(query_param("namespace", "default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(projects_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::new(common::credentials(&mock_server.uri(), "default")).unwrap();
    let projects = session.get_projects(None).await.unwrap();

    assert_eq!(projects.len(), 2);
    assert!(projects.contains_key("default/sandbox"));
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let mock_server = MockServer::start().await;
    let credentials = common::credentials(&mock_server.uri(), "default");

    Mock::given(method("GET"))
        .and(path(PROJECTS_PATH))
        .and(header(
            "authorization",
            format!("Bearer {}", credentials.api_token()).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entries": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::new(credentials).unwrap();
    let projects = session.get_projects(None).await.unwrap();
    assert!(projects.is_empty());
}

#[tokio::test]
async fn test_each_call_goes_to_the_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROJECTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(projects_body()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let session = Session::new(common::credentials(&mock_server.uri(), "default")).unwrap();
    let first = session.get_projects(None).await.unwrap();
    let second = session.get_projects(None).await.unwrap();

    // fresh values, equal because they share the client
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_server_error_propagates_as_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROJECTS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Internal server error"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::new(common::credentials(&mock_server.uri(), "default")).unwrap();
    let error = session.get_projects(None).await.unwrap_err();

    match error {
        NeptuneError::Api(ApiError::StatusError { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal server error");
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_propagates_as_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROJECTS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::new(common::credentials(&mock_server.uri(), "default")).unwrap();
    let error = session.get_projects(None).await.unwrap_err();

    assert!(error.is_api_error());
    match error {
        NeptuneError::Api(e) => assert_eq!(e.status(), Some(401)),
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_network_failure_propagates_as_api_error() {
    // reserve a free port, then release it so connections are refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let session = Session::new(common::credentials(&address, "default")).unwrap();
    let error = session.get_projects(None).await.unwrap_err();

    assert!(matches!(error, NeptuneError::Api(ApiError::HttpError(_))));
}

#[tokio::test]
async fn test_malformed_response_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROJECTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let session = Session::new(common::credentials(&mock_server.uri(), "default")).unwrap();
    let error = session.get_projects(None).await.unwrap_err();

    assert!(matches!(error, NeptuneError::Api(ApiError::JsonError(_))));
}

#[tokio::test]
async fn test_get_project_by_full_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROJECTS_PATH))
        .and(query_param("namespace", "neptune-ml"))
        .respond_with(ResponseTemplate::new(200).set_body_json(projects_body()))
        .mount(&mock_server)
        .await;

    let session = Session::new(common::credentials(&mock_server.uri(), "default")).unwrap();

    let project = session.get_project("neptune-ml/sandbox").await.unwrap();
    assert_eq!(project.id(), "77aa01de");
    assert_eq!(project.full_id(), "neptune-ml/sandbox");

    let error = session.get_project("neptune-ml/missing").await.unwrap_err();
    assert!(error.is_not_found());
    assert!(matches!(
        error,
        NeptuneError::Lookup(LookupError::ProjectNotFound { ref full_id }) if full_id == "neptune-ml/missing"
    ));
}
