mod common;

use actix_web::{http::StatusCode, test};
use strum::IntoEnumIterator;

use common::{TestApp, location};
use erp::auth::gate::Operation;
use erp::model::role::Role;
use erp::store::UserStore;
use erp::model::user::UserChanges;

/// Read-only endpoints and the operation guarding each.
const GUARDED: &[(&str, Operation)] = &[
    ("/erp/admin/users", Operation::ManageUsers),
    ("/erp/admin/reports", Operation::AdminReports),
    ("/erp/hr/reports", Operation::HrReports),
    ("/erp/hr/employees", Operation::ManageEmployees),
    ("/erp/hr/payrolls", Operation::ManagePayrolls),
    ("/erp/head_manager/teams", Operation::ManageTeams),
    ("/erp/manager/tasks", Operation::ViewTasks),
    ("/erp/sales/leads", Operation::ManageOwnLeads),
    ("/erp/head_sales/leads", Operation::OverseeLeads),
    ("/erp/profile", Operation::Profile),
];

#[actix_web::test]
async fn every_role_against_every_guarded_endpoint() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;

    for role in Role::iter() {
        let user = ctx.user(&format!("user_{role}"), role).await;

        for (path, op) in GUARDED {
            let req = test::TestRequest::get()
                .uri(path)
                .insert_header(ctx.auth(&user))
                .to_request();
            let resp = test::call_service(&app, req).await;

            if op.allowed().contains(&role) {
                assert_eq!(resp.status(), StatusCode::OK, "{role} on {path}");
            } else {
                assert_eq!(resp.status(), StatusCode::FOUND, "{role} on {path}");
                assert_eq!(location(&resp), "/unauthorized", "{role} on {path}");
            }
        }
    }
}

#[actix_web::test]
async fn dashboards_admit_only_their_own_role() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;

    let mut callers = Vec::new();
    for role in Role::iter() {
        callers.push((role, ctx.user(&format!("dash_{role}"), role).await));
    }

    for (role, user) in &callers {
        for target in Role::iter() {
            let req = test::TestRequest::get()
                .uri(&format!("/erp/{target}/dashboard"))
                .insert_header(ctx.auth(user))
                .to_request();
            let resp = test::call_service(&app, req).await;

            if target == *role {
                assert_eq!(resp.status(), StatusCode::OK, "{role} on {target}");
                let body: serde_json::Value = test::read_body_json(resp).await;
                assert_eq!(body["user"]["role"], role.to_string());
            } else {
                assert_eq!(resp.status(), StatusCode::FOUND, "{role} on {target}");
                assert_eq!(location(&resp), "/unauthorized");
            }
        }
    }
}

#[actix_web::test]
async fn missing_or_bad_token_redirects_to_login() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;

    let req = test::TestRequest::get().uri("/erp/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login");

    let req = test::TestRequest::get()
        .uri("/erp/admin/users")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login");
}

#[actix_web::test]
async fn deactivation_and_role_changes_apply_to_issued_tokens() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let user = ctx.user("mover", Role::Hr).await;
    let header = ctx.auth(&user);

    ctx.store
        .update_user(
            user.id,
            UserChanges {
                role: Some(Role::Support),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/erp/hr/employees")
        .insert_header(header.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/unauthorized");

    ctx.store
        .update_user(
            user.id,
            UserChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/erp/profile")
        .insert_header(header)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/auth/login");
}

#[actix_web::test]
async fn home_redirects_to_own_dashboard_and_unknown_roles_are_404() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;
    let user = ctx.user("lead_tech", Role::HeadTech).await;

    let req = test::TestRequest::get()
        .uri("/erp/home")
        .insert_header(ctx.auth(&user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/erp/head_tech/dashboard");

    let req = test::TestRequest::get()
        .uri("/erp/superuser/dashboard")
        .insert_header(ctx.auth(&user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unauthorized_page_is_forbidden_with_empty_context() {
    let ctx = TestApp::new();
    let app = test::init_service(ctx.app()).await;

    let req = test::TestRequest::get().uri("/unauthorized").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({}));
}
