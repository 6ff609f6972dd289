//! Tests for project catalog handlers.

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{World, login, test_app};

fn body(title: &str, authors: &str) -> Value {
    json!({ "title": title, "description": "A study", "authors": authors })
}

async fn create(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    cookie: Cookie<'static>,
    payload: Value,
) -> Value {
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/projects")
        .cookie(cookie)
        .set_json(payload)
        .to_request();
    let res = actix_test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    actix_test::read_body_json(res).await
}

#[actix_web::test]
async fn create_requires_session() {
    let app = actix_test::init_service(test_app(World::new().state())).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/projects")
        .set_json(body("Robots", "Ana"))
        .to_request();

    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_reports_unmatched_authors() {
    let world = World::new();
    let ana = world.seed_user("Ana", "ana@example.org", false);
    let bruno = world.seed_user("Bruno", "bruno@example.org", false);
    let app = actix_test::init_service(test_app(world.state())).await;
    let cookie = login(&app, "ana@example.org").await;

    let value = create(&app, cookie, body("Robots", "ana, Bruno, Carlos")).await;

    assert_eq!(value["unmatchedAuthors"], json!(["Carlos"]));
    let ids = value["project"]["authorIds"].as_array().expect("ids");
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&json!(ana.id().to_string())));
    assert!(ids.contains(&json!(bruno.id().to_string())));
    assert_eq!(value["project"]["revision"], 1);
}

#[actix_web::test]
async fn create_rejects_blank_title() {
    let world = World::new();
    world.seed_user("Ana", "ana@example.org", false);
    let app = actix_test::init_service(test_app(world.state())).await;
    let cookie = login(&app, "ana@example.org").await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/projects")
        .cookie(cookie)
        .set_json(body("  ", "Ana"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(res).await;
    assert_eq!(value["details"], json!({ "field": "title", "code": "empty" }));
}

#[actix_web::test]
async fn anonymous_detail_cannot_edit() {
    let world = World::new();
    world.seed_user("Ana", "ana@example.org", false);
    let app = actix_test::init_service(test_app(world.state())).await;
    let cookie = login(&app, "ana@example.org").await;
    let created = create(&app, cookie.clone(), body("Robots", "Ana")).await;
    let id = created["project"]["id"].as_str().expect("id").to_owned();

    let anonymous: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/projects/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(anonymous["canEdit"], false);
    assert_eq!(anonymous["isFavorite"], false);
    assert_eq!(anonymous["authors"][0]["displayName"], "Ana");

    let author: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/projects/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(author["canEdit"], true);
}

#[actix_web::test]
async fn detail_rejects_malformed_id() {
    let app = actix_test::init_service(test_app(World::new().state())).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/projects/not-a-uuid")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(res).await;
    assert_eq!(value["details"]["field"], "id");
    assert_eq!(value["details"]["code"], "invalid_uuid");
}

#[actix_web::test]
async fn search_is_paginated_and_filtered() {
    let world = World::new();
    world.seed_user("Ana", "ana@example.org", false);
    let app = actix_test::init_service(test_app(world.state())).await;
    let cookie = login(&app, "ana@example.org").await;
    for n in 0..12 {
        create(&app, cookie.clone(), body(&format!("Robot {n}"), "Ana")).await;
        world.clock.advance(chrono::Duration::minutes(1));
    }
    create(&app, cookie, body("Bridges", "Ana")).await;

    let page: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/projects?q=ROBOT&page=2")
            .to_request(),
    )
    .await;
    assert_eq!(page["total"], 12);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["items"].as_array().expect("items").len(), 2);
    assert_eq!(page["items"][0]["title"], "Robot 1");

    let beyond: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/projects?page=9")
            .to_request(),
    )
    .await;
    assert!(beyond["items"].as_array().expect("items").is_empty());
    assert_eq!(beyond["total"], 13);
}

#[actix_web::test]
async fn edit_is_limited_to_authors_and_checks_revision() {
    let world = World::new();
    world.seed_user("Ana", "ana@example.org", false);
    world.seed_user("Bruno", "bruno@example.org", false);
    let app = actix_test::init_service(test_app(world.state())).await;
    let ana = login(&app, "ana@example.org").await;
    let bruno = login(&app, "bruno@example.org").await;
    let created = create(&app, ana.clone(), body("Robots", "Ana")).await;
    let uri = format!(
        "/api/v1/projects/{}",
        created["project"]["id"].as_str().expect("id")
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&uri)
            .cookie(bruno)
            .set_json(body("Hijacked", "Bruno"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let mut stale = body("Robots v2", "Ana, Bruno");
    stale["expectedRevision"] = json!(7);
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&uri)
            .cookie(ana.clone())
            .set_json(stale)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let mut fresh = body("Robots v2", "Ana, Bruno");
    fresh["expectedRevision"] = json!(1);
    let updated: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::put()
            .uri(&uri)
            .cookie(ana)
            .set_json(fresh)
            .to_request(),
    )
    .await;
    assert_eq!(updated["project"]["revision"], 2);
    assert_eq!(updated["project"]["title"], "Robots v2");
    assert_eq!(
        updated["project"]["authorIds"]
            .as_array()
            .expect("ids")
            .len(),
        2
    );
}

#[actix_web::test]
async fn admin_can_delete_any_project() {
    let world = World::new();
    world.seed_user("Ana", "ana@example.org", false);
    world.seed_user("Root", "root@example.org", true);
    let app = actix_test::init_service(test_app(world.state())).await;
    let ana = login(&app, "ana@example.org").await;
    let root = login(&app, "root@example.org").await;
    let created = create(&app, ana, body("Robots", "Ana")).await;
    let uri = format!(
        "/api/v1/projects/{}",
        created["project"]["id"].as_str().expect("id")
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&uri)
            .cookie(root)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri(&uri).to_request())
            .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
