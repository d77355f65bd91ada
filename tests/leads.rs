mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::{TestApp, location};
use erp::model::role::Role;
use erp::store::LeadStore;

#[actix_web::test]
async fn sales_pipeline_end_to_end() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let sam = ctx.user("sam", Role::Sales).await;
    let sue = ctx.user("sue", Role::Sales).await;
    let boss = ctx.user("boss", Role::HeadSales).await;
    let support = ctx.user("helpdesk", Role::Support).await;

    // Create with defaults, assigned to the caller.
    let req = test::TestRequest::post()
        .uri("/erp/sales/leads")
        .insert_header(ctx.auth(&sam))
        .set_json(json!({"name": "Acme rollout", "company": "Acme", "phone": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let lead: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(lead["status"], "Open");
    assert_eq!(lead["priority"], "Medium");
    assert_eq!(lead["assigned_to"], sam.id);
    assert!(lead["phone"].is_null());
    let lead_id = lead["id"].as_u64().unwrap();

    let req = test::TestRequest::post()
        .uri("/erp/sales/leads")
        .insert_header(ctx.auth(&sam))
        .set_json(json!({"name": "Globex", "status": "Closed", "priority": "High"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    // Newest first.
    let req = test::TestRequest::get()
        .uri("/erp/sales/leads")
        .insert_header(ctx.auth(&sam))
        .to_request();
    let mine: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0]["name"], "Globex");

    let req = test::TestRequest::get()
        .uri("/erp/sales/dashboard")
        .insert_header(ctx.auth(&sam))
        .to_request();
    let dash: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dash["total_leads"], 2);
    assert_eq!(dash["open_leads"], 1);
    assert_eq!(dash["closed_leads"], 1);

    // Only the assignee edits.
    let req = test::TestRequest::put()
        .uri(&format!("/erp/sales/leads/{lead_id}"))
        .insert_header(ctx.auth(&sue))
        .set_json(json!({"status": "In Progress"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/unauthorized");

    let req = test::TestRequest::put()
        .uri(&format!("/erp/sales/leads/{lead_id}"))
        .insert_header(ctx.auth(&sam))
        .set_json(json!({"status": "In Progress", "notes": "called twice"}))
        .to_request();
    let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["status"], "In Progress");
    assert_eq!(updated["notes"], "called twice");

    // Head sales reassigns, but only to sales identities.
    let req = test::TestRequest::put()
        .uri(&format!("/erp/head_sales/leads/{lead_id}/assign"))
        .insert_header(ctx.auth(&boss))
        .set_json(json!({"assigned_to": support.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["errors"]["assigned_to"].is_string());

    let req = test::TestRequest::put()
        .uri(&format!("/erp/head_sales/leads/{lead_id}/assign"))
        .insert_header(ctx.auth(&boss))
        .set_json(json!({"assigned_to": sue.id}))
        .to_request();
    let reassigned: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(reassigned["assigned_to"], sue.id);

    let req = test::TestRequest::get()
        .uri("/erp/head_sales/leads")
        .insert_header(ctx.auth(&boss))
        .to_request();
    let all: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all.len(), 2);

    let req = test::TestRequest::delete()
        .uri(&format!("/erp/head_sales/leads/{lead_id}"))
        .insert_header(ctx.auth(&boss))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("/erp/head_sales/leads/{lead_id}"))
        .insert_header(ctx.auth(&boss))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_a_salesperson_unassigns_their_leads() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let admin = ctx.user("root", Role::Admin).await;
    let sam = ctx.user("sam", Role::Sales).await;

    let req = test::TestRequest::post()
        .uri("/erp/sales/leads")
        .insert_header(ctx.auth(&sam))
        .set_json(json!({"name": "Initech"}))
        .to_request();
    let lead: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let lead_id = lead["id"].as_u64().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/erp/admin/users/{}", sam.id))
        .insert_header(ctx.auth(&admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let lead = ctx.store.get_lead(lead_id).await.unwrap().unwrap();
    assert_eq!(lead.assigned_to, None);
}
