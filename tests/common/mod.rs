//! Shared fixtures for tests that run against a mockito stand-in for GitHub

#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{Value, json};

use hubcap::github::{ClientConfig, GithubClient};

/// Client pointed at the mock server, with a token so GraphQL views work
pub fn client(server: &ServerGuard) -> GithubClient {
    GithubClient::new(
        ClientConfig::default()
            .with_base_url(server.url())
            .with_token("test-token"),
    )
    .expect("Failed to create client")
}

/// Client pointed at the mock server, without a token
pub fn anonymous_client(server: &ServerGuard) -> GithubClient {
    GithubClient::new(ClientConfig::default().with_base_url(server.url()))
        .expect("Failed to create client")
}

pub fn repo_json(owner: &str, name: &str) -> Value {
    json!({
        "id": 1,
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "owner": {"login": owner, "type": "Organization"},
        "private": false,
        "default_branch": "main"
    })
}

/// `GET path` (any query) answering `body` as JSON
pub fn get_json(server: &mut ServerGuard, path: &str, body: &Value) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
}

/// `GET path` (any query) answering 404 like the REST API does
pub fn get_not_found(server: &mut ServerGuard, path: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Not Found","documentation_url":"https://docs.github.com/rest"}"#)
}

/// Mocks `GET /repos/{owner}/{name}` for the repository lookup
pub fn mock_repo(server: &mut ServerGuard, owner: &str, name: &str) -> Mock {
    get_json(
        server,
        &format!("/repos/{}/{}", owner, name),
        &repo_json(owner, name),
    )
    .create()
}

/// `POST /graphql` whose body matches `body_regex`
pub fn graphql(server: &mut ServerGuard, body_regex: &str, response: &Value) -> Mock {
    server
        .mock("POST", "/graphql")
        .match_body(Matcher::Regex(body_regex.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(response.to_string())
}

/// A contents-API entry as listed in a directory
pub fn entry(path: &str, kind: &str) -> Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    json!({
        "name": name,
        "path": path,
        "type": kind,
        "sha": "0000000000000000000000000000000000000000",
        "size": 0
    })
}

/// A contents-API file with a base64 payload
pub fn file(path: &str, base64: &str) -> Value {
    let mut file = entry(path, "file");
    file["encoding"] = json!("base64");
    file["content"] = json!(base64);
    file
}

pub fn branch(name: &str) -> Value {
    json!({
        "name": name,
        "commit": {"sha": "c0ffee"},
        "protected": false
    })
}
