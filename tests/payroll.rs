mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::{TestApp, dec, dec_field};
use erp::model::role::Role;

#[actix_web::test]
async fn payroll_resave_picks_up_a_raise() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let hr = ctx.user("hr_anna", Role::Hr).await;
    let accountant = ctx.user("acc_bob", Role::Account).await;
    let (_, employee) = ctx.employee("worker", "50000.00").await;

    let req = test::TestRequest::post()
        .uri("/erp/hr/payrolls")
        .insert_header(ctx.auth(&accountant))
        .set_json(json!({"employee_id": employee.id, "month": "October", "year": 2025}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let payroll: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(dec_field(&payroll, "hra"), dec("10000.00"));
    assert_eq!(dec_field(&payroll, "allowances"), dec("5000.00"));
    assert_eq!(dec_field(&payroll, "deductions"), dec("2500.00"));
    assert_eq!(dec_field(&payroll, "net_salary"), dec("62500.00"));
    let payroll_id = payroll["id"].as_u64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/erp/hr/employees/{}", employee.id))
        .insert_header(ctx.auth(&hr))
        .set_json(json!({"basic_salary": "60000.00"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Untouched row keeps the old figures until it is saved again.
    let req = test::TestRequest::get()
        .uri(&format!("/erp/hr/payrolls/{payroll_id}"))
        .insert_header(ctx.auth(&hr))
        .to_request();
    let stale: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dec_field(&stale, "net_salary"), dec("62500.00"));

    let req = test::TestRequest::put()
        .uri(&format!("/erp/hr/payrolls/{payroll_id}"))
        .insert_header(ctx.auth(&hr))
        .set_json(json!({"month": "November"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let repriced: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(repriced["month"], "November");
    assert_eq!(dec_field(&repriced, "basic_salary"), dec("60000.00"));
    assert_eq!(dec_field(&repriced, "hra"), dec("12000.00"));
    assert_eq!(dec_field(&repriced, "net_salary"), dec("75000.00"));
}

#[actix_web::test]
async fn odd_cents_round_once_on_the_net() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let hr = ctx.user("hr_cents", Role::HeadHr).await;
    let (_, employee) = ctx.employee("cents", "33333.33").await;

    let req = test::TestRequest::post()
        .uri("/erp/hr/payrolls")
        .insert_header(ctx.auth(&hr))
        .set_json(json!({"employee_id": employee.id, "month": "May", "year": 2024}))
        .to_request();
    let payroll: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dec_field(&payroll, "hra"), dec("6666.67"));
    assert_eq!(dec_field(&payroll, "allowances"), dec("3333.33"));
    assert_eq!(dec_field(&payroll, "deductions"), dec("1666.67"));
    // 1.25 * 33333.33 = 41666.6625
    assert_eq!(dec_field(&payroll, "net_salary"), dec("41666.66"));
}

#[actix_web::test]
async fn invalid_payroll_reports_every_field() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let hr = ctx.user("hr_val", Role::Hr).await;

    let req = test::TestRequest::post()
        .uri("/erp/hr/payrolls")
        .insert_header(ctx.auth(&hr))
        .set_json(json!({"employee_id": 999, "month": "", "year": 1800}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    for field in ["employee_id", "month", "year"] {
        assert!(body["errors"][field].is_string(), "{field} missing in {body}");
    }
}

#[actix_web::test]
async fn payroll_listing_filters_and_delete() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let hr = ctx.user("hr_list", Role::Hr).await;
    let (_, first) = ctx.employee("first", "1000").await;
    let (_, second) = ctx.employee("second", "2000").await;

    let mut ids = Vec::new();
    for (employee_id, month) in [(first.id, "January"), (first.id, "February"), (second.id, "January")] {
        let req = test::TestRequest::post()
            .uri("/erp/hr/payrolls")
            .insert_header(ctx.auth(&hr))
            .set_json(json!({"employee_id": employee_id, "month": month, "year": 2025}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        ids.push(body["id"].as_u64().unwrap());
    }

    let req = test::TestRequest::get()
        .uri(&format!("/erp/hr/payrolls?employee_id={}", first.id))
        .insert_header(ctx.auth(&hr))
        .to_request();
    let listed: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 2);

    let req = test::TestRequest::delete()
        .uri(&format!("/erp/hr/payrolls/{}", ids[0]))
        .insert_header(ctx.auth(&hr))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/erp/hr/payrolls/{}", ids[0]))
        .insert_header(ctx.auth(&hr))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_report_sums_net_salaries() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let admin = ctx.user("root", Role::Admin).await;
    let hr = ctx.user("hr_sum", Role::Hr).await;
    let (_, a) = ctx.employee("sum_a", "40000").await;
    let (_, b) = ctx.employee("sum_b", "8000").await;

    for employee_id in [a.id, b.id] {
        let req = test::TestRequest::post()
            .uri("/erp/hr/payrolls")
            .insert_header(ctx.auth(&hr))
            .set_json(json!({"employee_id": employee_id, "month": "June", "year": 2025}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/erp/admin/reports")
        .insert_header(ctx.auth(&admin))
        .to_request();
    let report: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(report["total_employees"], 2);
    assert_eq!(report["total_payrolls"], 2);
    // 50000.00 + 10000.00
    assert_eq!(dec_field(&report, "total_salary"), dec("60000.00"));
}
