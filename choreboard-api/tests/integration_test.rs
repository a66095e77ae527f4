//! Integration tests for the ChoreBoard API
//!
//! These tests drive the full router end-to-end:
//! - Identity enforcement
//! - Session sync and the current-user endpoint
//! - Home lifecycle (create → join → ranking)
//! - Task lifecycle (create → list → update → complete)
//! - Authorization rules (creator-only edit, assignee-only completion)
//!
//! They require a running PostgreSQL database and are skipped when
//! DATABASE_URL is not set. Every test works with freshly generated users
//! and homes, so the suite can run in parallel against a shared database.

mod common;

use axum::http::StatusCode;
use common::{authed_request, body_json, create_home, sync_user, unique_user_id, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let request = axum::http::Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_v1_requires_identity() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let request = axum::http::Request::builder()
        .uri("/v1/users/me")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_session_sync_creates_user() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let ana = unique_user_id("ana");
    let user = sync_user(&ctx, &ana).await;

    assert_eq!(user["id"], ana.as_str());
    assert_eq!(user["points"], 0);
    assert!(user["homeId"].is_null());

    // The record is now visible via /users/me
    let response = ctx.send(authed_request("GET", "/v1/users/me", &ana, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["id"], ana.as_str());
}

#[tokio::test]
async fn test_me_without_record_is_404() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let ghost = unique_user_id("ghost");
    let response = ctx
        .send(authed_request("GET", "/v1/users/me", &ghost, None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_home_lifecycle() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let ana = unique_user_id("ana");
    sync_user(&ctx, &ana).await;

    // Create
    let response = ctx
        .send(authed_request(
            "POST",
            "/v1/homes",
            &ana,
            Some(json!({ "name": "Silva" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Home successfully created!");
    let home_id = body["home"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["home"]["createdBy"], ana.as_str());

    // Read aggregate: creator is implicitly a member
    let response = ctx
        .send(authed_request(
            "GET",
            &format!("/v1/homes/{home_id}"),
            &ana,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let home = body_json(response).await;
    assert_eq!(home["name"], "Silva");
    assert_eq!(home["creator"]["id"], ana.as_str());
    assert_eq!(home["members"].as_array().unwrap().len(), 1);

    // Side effect: creator's homeId points at the new home
    let response = ctx.send(authed_request("GET", "/v1/users/me", &ana, None)).await;
    let me = body_json(response).await;
    assert_eq!(me["homeId"], home_id.as_str());
}

#[tokio::test]
async fn test_get_unknown_home_is_404() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let ana = unique_user_id("ana");
    sync_user(&ctx, &ana).await;

    let response = ctx
        .send(authed_request("GET", "/v1/homes/no-such-home", &ana, None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .send(authed_request(
            "POST",
            "/v1/homes/no-such-home/join",
            &ana,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_home_and_ranking() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let ana = unique_user_id("ana");
    let bruno = unique_user_id("bruno");
    sync_user(&ctx, &ana).await;
    sync_user(&ctx, &bruno).await;

    let home = create_home(&ctx, &ana, "Silva").await;
    let home_id = home["id"].as_str().unwrap();

    let response = ctx
        .send(authed_request(
            "POST",
            &format!("/v1/homes/{home_id}/join"),
            &bruno,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "User added to your home!");

    let response = ctx
        .send(authed_request(
            "GET",
            &format!("/v1/homes/{home_id}/ranking"),
            &ana,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let ranking = body_json(response).await;
    assert_eq!(ranking.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_task_requires_home() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let homeless = unique_user_id("homeless");
    sync_user(&ctx, &homeless).await;

    let response = ctx
        .send(authed_request(
            "POST",
            "/v1/tasks",
            &homeless,
            Some(json!({ "title": "Sweep", "assignedTo": homeless })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .send(authed_request("GET", "/v1/tasks", &homeless, None))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_task_validation() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let ana = unique_user_id("ana");
    sync_user(&ctx, &ana).await;
    create_home(&ctx, &ana, "Silva").await;

    let response = ctx
        .send(authed_request(
            "POST",
            "/v1/tasks",
            &ana,
            Some(json!({ "title": "Sweep", "assignedTo": ana, "points": 0 })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_task_lifecycle_awards_points() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    // Home "Silva": Ana assigns the dishes to Bruno for 10 points
    let ana = unique_user_id("ana");
    let bruno = unique_user_id("bruno");
    sync_user(&ctx, &ana).await;
    sync_user(&ctx, &bruno).await;

    let home = create_home(&ctx, &ana, "Silva").await;
    let home_id = home["id"].as_str().unwrap();

    ctx.send(authed_request(
        "POST",
        &format!("/v1/homes/{home_id}/join"),
        &bruno,
        None,
    ))
    .await;

    let response = ctx
        .send(authed_request(
            "POST",
            "/v1/tasks",
            &ana,
            Some(json!({
                "title": "Wash dishes",
                "assignedTo": bruno,
                "points": 10
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await;
    assert_eq!(task["status"], "pending");
    let task_id = task["id"].as_i64().unwrap();

    // Both home listing and Bruno's personal listing see it, with relations
    let response = ctx.send(authed_request("GET", "/v1/tasks", &ana, None)).await;
    let tasks = body_json(response).await;
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["creator"]["id"], ana.as_str());
    assert_eq!(tasks[0]["assignee"]["id"], bruno.as_str());
    assert_eq!(tasks[0]["home"]["id"], home_id);

    let response = ctx
        .send(authed_request("GET", "/v1/tasks/my", &bruno, None))
        .await;
    let my_tasks = body_json(response).await;
    assert_eq!(my_tasks.as_array().unwrap().len(), 1);

    // Bruno completes it
    let response = ctx
        .send(authed_request(
            "POST",
            &format!("/v1/tasks/{task_id}/complete"),
            &bruno,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["task"]["status"], "completed");
    assert!(!body["task"]["completedAt"].is_null());
    assert_eq!(body["message"], "Task completed successfully! Points awarded!");

    // Points credited exactly once
    let response = ctx
        .send(authed_request("GET", "/v1/users/me", &bruno, None))
        .await;
    let me = body_json(response).await;
    assert_eq!(me["points"], 10);

    let response = ctx
        .send(authed_request(
            "POST",
            &format!("/v1/tasks/{task_id}/complete"),
            &bruno,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Ranking: Bruno above Ana
    let response = ctx
        .send(authed_request(
            "GET",
            &format!("/v1/homes/{home_id}/ranking"),
            &ana,
            None,
        ))
        .await;
    let ranking = body_json(response).await;
    assert_eq!(ranking[0]["id"], bruno.as_str());
    assert_eq!(ranking[0]["points"], 10);
    assert_eq!(ranking[1]["id"], ana.as_str());
}

#[tokio::test]
async fn test_non_assignee_cannot_complete() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let ana = unique_user_id("ana");
    let bruno = unique_user_id("bruno");
    let carol = unique_user_id("carol");
    for id in [&ana, &bruno, &carol] {
        sync_user(&ctx, id).await;
    }

    let home = create_home(&ctx, &ana, "Silva").await;
    let home_id = home["id"].as_str().unwrap();
    for id in [&bruno, &carol] {
        ctx.send(authed_request(
            "POST",
            &format!("/v1/homes/{home_id}/join"),
            id,
            None,
        ))
        .await;
    }

    let response = ctx
        .send(authed_request(
            "POST",
            "/v1/tasks",
            &ana,
            Some(json!({ "title": "Mow lawn", "assignedTo": bruno, "points": 20 })),
        ))
        .await;
    let task = body_json(response).await;
    let task_id = task["id"].as_i64().unwrap();

    // Carol is a member but not the assignee
    let response = ctx
        .send(authed_request(
            "POST",
            &format!("/v1/tasks/{task_id}/complete"),
            &carol,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Task unchanged, no points moved
    let response = ctx.send(authed_request("GET", "/v1/tasks", &ana, None)).await;
    let tasks = body_json(response).await;
    assert_eq!(tasks[0]["status"], "pending");

    let response = ctx
        .send(authed_request("GET", "/v1/users/me", &carol, None))
        .await;
    let me = body_json(response).await;
    assert_eq!(me["points"], 0);
}

#[tokio::test]
async fn test_update_task_creator_only() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let ana = unique_user_id("ana");
    let bruno = unique_user_id("bruno");
    sync_user(&ctx, &ana).await;
    sync_user(&ctx, &bruno).await;

    let home = create_home(&ctx, &ana, "Silva").await;
    let home_id = home["id"].as_str().unwrap();
    ctx.send(authed_request(
        "POST",
        &format!("/v1/homes/{home_id}/join"),
        &bruno,
        None,
    ))
    .await;

    let response = ctx
        .send(authed_request(
            "POST",
            "/v1/tasks",
            &ana,
            Some(json!({
                "title": "Vacuum",
                "description": "Living room",
                "assignedTo": bruno
            })),
        ))
        .await;
    let task = body_json(response).await;
    let task_id = task["id"].as_i64().unwrap();

    // Bruno is the assignee, not the creator
    let response = ctx
        .send(authed_request(
            "PATCH",
            &format!("/v1/tasks/{task_id}"),
            &bruno,
            Some(json!({ "title": "Something else" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The creator may edit; null clears the description
    let response = ctx
        .send(authed_request(
            "PATCH",
            &format!("/v1/tasks/{task_id}"),
            &ana,
            Some(json!({
                "title": "Vacuum everywhere",
                "description": null,
                "priority": "high"
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "Vacuum everywhere");
    assert!(updated["description"].is_null());
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["status"], "pending");

    // Unknown task id
    let response = ctx
        .send(authed_request(
            "PATCH",
            "/v1/tasks/2147483647",
            &ana,
            Some(json!({ "title": "Nope" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
