mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::TestApp;
use erp::model::role::Role;
use erp::store::TeamStore;

#[actix_web::test]
async fn head_manager_builds_and_scopes_teams() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let head = ctx.user("head", Role::HeadManager).await;
    let rival = ctx.user("rival", Role::HeadManager).await;
    let mara = ctx.user("mara", Role::Manager).await;
    let mike = ctx.user("mike", Role::Manager).await;
    let (eve, _) = ctx.employee("eve", "1000").await;

    // Members must be employees.
    let req = test::TestRequest::post()
        .uri("/erp/head_manager/teams")
        .insert_header(ctx.auth(&head))
        .set_json(json!({"name": "Core", "manager_ids": [mara.id], "member_ids": [mike.id]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["errors"]["members"].is_string());

    let req = test::TestRequest::post()
        .uri("/erp/head_manager/teams")
        .insert_header(ctx.auth(&head))
        .set_json(json!({"name": "Core", "manager_ids": [mara.id], "member_ids": [eve.id]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let team: serde_json::Value = test::read_body_json(resp).await;
    let team_id = team["id"].as_u64().unwrap();
    assert_eq!(team["head_manager_id"], head.id);

    // Another head manager cannot see or touch it.
    let req = test::TestRequest::put()
        .uri(&format!("/erp/head_manager/teams/{team_id}"))
        .insert_header(ctx.auth(&rival))
        .set_json(json!({"name": "Mine now"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/erp/head_manager/teams")
        .insert_header(ctx.auth(&rival))
        .to_request();
    let theirs: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert!(theirs.is_empty());

    // assign-manager replaces the whole manager set.
    let req = test::TestRequest::post()
        .uri("/erp/head_manager/assign-manager")
        .insert_header(ctx.auth(&head))
        .set_json(json!({"team_id": team_id, "manager_ids": [mike.id]}))
        .to_request();
    let team: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(team["manager_ids"], json!([mike.id]));

    let req = test::TestRequest::put()
        .uri(&format!("/erp/head_manager/teams/{team_id}"))
        .insert_header(ctx.auth(&head))
        .set_json(json!({"name": "Core Platform", "manager_ids": [mara.id, mike.id]}))
        .to_request();
    let team: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(team["name"], "Core Platform");
    assert_eq!(team["member_ids"], json!([eve.id]));

    let req = test::TestRequest::get()
        .uri("/erp/head_manager/dashboard")
        .insert_header(ctx.auth(&head))
        .to_request();
    let dash: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dash["total_teams"], 1);
    assert_eq!(dash["total_managers"], 2);
    assert_eq!(dash["total_reports"], 0);
}

#[actix_web::test]
async fn managers_file_tasks_only_on_their_teams() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let head = ctx.user("head", Role::HeadManager).await;
    let mara = ctx.user("mara", Role::Manager).await;
    let outsider = ctx.user("otto", Role::Manager).await;
    let (eve, _) = ctx.employee("eve", "1000").await;
    let (ed, _) = ctx.employee("ed", "1000").await;

    let req = test::TestRequest::post()
        .uri("/erp/head_manager/teams")
        .insert_header(ctx.auth(&head))
        .set_json(json!({"name": "Ops", "manager_ids": [mara.id], "member_ids": [eve.id, ed.id]}))
        .to_request();
    let team: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let team_id = team["id"].as_u64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/erp/manager/teams/{team_id}/tasks"))
        .insert_header(ctx.auth(&outsider))
        .set_json(json!({"title": "Sneaky", "description": "x"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/erp/manager/teams/{team_id}/tasks"))
        .insert_header(ctx.auth(&mara))
        .set_json(json!({"title": "", "description": ""}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    for title in ["First", "Second"] {
        let req = test::TestRequest::post()
            .uri(&format!("/erp/manager/teams/{team_id}/tasks"))
            .insert_header(ctx.auth(&mara))
            .set_json(json!({"title": title, "description": "do it"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/erp/manager/tasks")
        .insert_header(ctx.auth(&mara))
        .to_request();
    let tasks: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "Second");

    let req = test::TestRequest::get()
        .uri("/erp/manager/dashboard")
        .insert_header(ctx.auth(&mara))
        .to_request();
    let dash: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dash["teams"].as_array().unwrap().len(), 1);
    assert_eq!(dash["total_team_members"], 2);
    assert_eq!(dash["total_reports"], 2);

    // Deleting the team removes its reports.
    let req = test::TestRequest::delete()
        .uri(&format!("/erp/head_manager/teams/{team_id}"))
        .insert_header(ctx.auth(&head))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    assert!(ctx.store.reports_for_teams(&[team_id]).await.unwrap().is_empty());
}
