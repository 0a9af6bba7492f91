//! Tests for PathRouter against a mock GitHub

mod common;

use mockito::Matcher;
use serde_json::json;

use hubcap::router::{PathRouter, Resolved};

fn mock_src(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/repos/acme/widget/contents/src")
        .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                common::entry("src/lib.rs", "file"),
                common::entry("src/router.rs", "file"),
            ])
            .to_string(),
        )
}

fn mock_main(server: &mut mockito::ServerGuard) -> mockito::Mock {
    common::get_json(
        server,
        "/repos/acme/widget/branches/main",
        &common::branch("main"),
    )
}

#[test]
fn test_tree_marker_is_optional() {
    let mut server = mockito::Server::new();
    let repo = common::get_json(&mut server, "/repos/acme/widget", &common::repo_json("acme", "widget"))
        .expect(3)
        .create();
    let main = mock_main(&mut server).expect(3).create();
    let src = mock_src(&mut server).expect(3).create();

    let router = PathRouter::new(common::client(&server));
    let with_marker = router.route("acme/widget/tree/main/src").unwrap().keys().unwrap();
    let without_marker = router.route("acme/widget/main/src").unwrap().keys().unwrap();
    let browser_url = router
        .route("https://github.com/acme/widget/tree/main/src/")
        .unwrap()
        .keys()
        .unwrap();

    assert_eq!(with_marker, vec!["lib.rs", "router.rs"]);
    assert_eq!(with_marker, without_marker);
    assert_eq!(with_marker, browser_url);

    repo.assert();
    main.assert();
    src.assert();
}

#[test]
fn test_blob_url_resolves_to_file_contents() {
    let mut server = mockito::Server::new();
    let _repo = common::mock_repo(&mut server, "acme", "widget");
    let _main = mock_main(&mut server).create();
    let _readme = common::get_json(
        &mut server,
        "/repos/acme/widget/contents/README.md",
        &common::file("README.md", "IyBXaWRnZXQK"),
    )
    .create();

    let router = PathRouter::new(common::client(&server));
    match router
        .route("https://github.com/acme/widget/blob/main/README.md")
        .unwrap()
    {
        Resolved::File(bytes) => assert_eq!(bytes, b"# Widget\n".to_vec()),
        other => panic!("expected file contents, got {:?}", other),
    }
}

#[test]
fn test_repository_and_branch_listing() {
    let mut server = mockito::Server::new();
    let _repo = common::mock_repo(&mut server, "acme", "widget");
    let _branches = common::get_json(
        &mut server,
        "/repos/acme/widget/branches",
        &json!([common::branch("main"), common::branch("release/1.0")]),
    )
    .create();

    let router = PathRouter::new(common::client(&server));

    let collections = router.route("acme/widget").unwrap().keys().unwrap();
    assert!(collections.contains(&"issues".to_string()));
    assert!(collections.contains(&"discussions".to_string()));
    assert!(collections.contains(&"workflow_runs".to_string()));

    let branches = router.route("acme/widget/tree").unwrap();
    assert_eq!(branches.kind(), "branches");
    assert_eq!(branches.keys().unwrap(), vec!["main", "release/1.0"]);
}

#[test]
fn test_issues_route() {
    let mut server = mockito::Server::new();
    let _repo = common::mock_repo(&mut server, "acme", "widget");
    let _issues = common::get_json(
        &mut server,
        "/repos/acme/widget/issues",
        &json!([
            {"number": 4, "title": "Crash", "body": "It crashes", "state": "open"},
            {"number": 5, "title": "Typo", "body": null, "state": "open"},
        ]),
    )
    .create();

    let router = PathRouter::new(common::client(&server));
    assert_eq!(router.route("acme/widget/issues").unwrap().keys().unwrap(), vec!["4", "5"]);

    match router.route("acme/widget/issues/4/body").unwrap() {
        Resolved::Text(body) => assert_eq!(body, "It crashes"),
        other => panic!("expected text, got {:?}", other),
    }
    assert!(router.route("acme/widget/issues/99").unwrap_err().is_not_found());
    assert!(router.route("acme/widget/issues/abc").unwrap_err().is_not_found());
}

#[test]
fn test_generic_collections() {
    let mut server = mockito::Server::new();
    let _repo = common::mock_repo(&mut server, "acme", "widget");
    let _runs = common::get_json(
        &mut server,
        "/repos/acme/widget/actions/runs",
        &json!({
            "total_count": 2,
            "workflow_runs": [
                {"id": 30433642, "name": "CI", "status": "completed", "conclusion": "success"},
                {"id": 30433643, "name": "CI", "status": "in_progress", "conclusion": null},
            ]
        }),
    )
    .create();
    let _pull = common::get_json(
        &mut server,
        "/repos/acme/widget/pulls/3",
        &json!({"number": 3, "title": "Add router", "head": {"ref": "feature/router"}}),
    )
    .create();

    let router = PathRouter::new(common::client(&server));
    assert_eq!(
        router.route("acme/widget/workflow_runs").unwrap().keys().unwrap(),
        vec!["30433642", "30433643"]
    );

    match router.route("acme/widget/pulls/3/head/ref").unwrap() {
        Resolved::Json(value) => assert_eq!(value, json!("feature/router")),
        other => panic!("expected json, got {:?}", other),
    }
}

#[test]
fn test_abbreviated_commit_sha_is_not_a_key() {
    let mut server = mockito::Server::new();
    let _repo = common::mock_repo(&mut server, "acme", "widget");
    let _commit = common::get_json(
        &mut server,
        "/repos/acme/widget/commits/c0ffee",
        &json!({"sha": "c0ffee1234567890", "commit": {"message": "Initial"}}),
    )
    .create();

    let router = PathRouter::new(common::client(&server));
    let err = router.route("acme/widget/commits/c0ffee").unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
}

#[test]
fn test_nonexistent_repository_is_not_found() {
    let mut server = mockito::Server::new();
    let _missing = common::get_not_found(&mut server, "/repos/acme/ghost").create();

    let router = PathRouter::new(common::client(&server));
    let err = router.route("acme/ghost/tree/main").unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
}

#[test]
fn test_account_route_is_lazy() {
    let server = mockito::Server::new();
    let router = PathRouter::new(common::client(&server));
    // No mocks: building the account view must not touch the network
    assert_eq!(router.route("acme").unwrap().kind(), "account");
    assert!(router.route("").unwrap_err().is_configuration());
}

#[test]
fn test_parent_segment_in_tree_path_is_not_found() {
    let mut server = mockito::Server::new();
    let _repo = common::mock_repo(&mut server, "acme", "widget");
    let _main = mock_main(&mut server).create();

    let router = PathRouter::new(common::client(&server));
    let err = router.route("acme/widget/main/../x").unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
}

#[test]
fn test_empty_repository_segment_is_rejected() {
    let server = mockito::Server::new();
    let router = PathRouter::new(common::client(&server));
    assert!(router.route("acme/.git/issues").unwrap_err().is_configuration());
}
