use crate::{
    api::{dashboard, employee, lead, payroll, profile, reports, team, users},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{
    middleware::{Condition, from_fn},
    web,
};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let burst = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(burst)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let enabled = config.rate_limit_enabled;
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Condition::new(enabled, login_limiter.clone()))
                    .route(web::get().to(handlers::login_required))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Condition::new(enabled, login_limiter.clone()))
                    .route(web::post().to(handlers::register)),
            )
            .service(web::resource("/logout").route(web::post().to(handlers::logout))),
    )
    .service(web::resource("/unauthorized").route(web::get().to(handlers::unauthorized)));

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Condition::new(enabled, protected_limiter)) // rate limiting
            .service(web::resource("/home").route(web::get().to(dashboard::home)))
            .service(
                web::resource("/profile")
                    .route(web::get().to(profile::get_profile))
                    .route(web::put().to(profile::update_profile)),
            )
            // admin
            .service(
                web::resource("/admin/users")
                    .route(web::get().to(users::list_users))
                    .route(web::post().to(users::create_user)),
            )
            .service(
                web::resource("/admin/users/{id}")
                    .route(web::put().to(users::update_user))
                    .route(web::delete().to(users::delete_user)),
            )
            .service(
                web::resource("/admin/employees").route(web::post().to(users::attach_employee)),
            )
            .service(web::resource("/admin/reports").route(web::get().to(reports::admin_reports)))
            // hr
            .service(web::resource("/hr/reports").route(web::get().to(reports::hr_reports)))
            .service(
                web::resource("/hr/employees")
                    .route(web::get().to(employee::list_employees))
                    .route(web::post().to(employee::create_employee)),
            )
            .service(
                web::resource("/hr/employees/{id}")
                    .route(web::get().to(employee::get_employee))
                    .route(web::put().to(employee::update_employee))
                    .route(web::delete().to(employee::delete_employee)),
            )
            .service(
                web::resource("/hr/payrolls")
                    .route(web::get().to(payroll::list_payrolls))
                    .route(web::post().to(payroll::create_payroll)),
            )
            .service(
                web::resource("/hr/payrolls/{id}")
                    .route(web::get().to(payroll::get_payroll))
                    .route(web::put().to(payroll::update_payroll))
                    .route(web::delete().to(payroll::delete_payroll)),
            )
            // head manager
            .service(
                web::resource("/head_manager/teams")
                    .route(web::get().to(team::list_teams))
                    .route(web::post().to(team::create_team)),
            )
            .service(
                web::resource("/head_manager/teams/{id}")
                    .route(web::put().to(team::update_team))
                    .route(web::delete().to(team::delete_team)),
            )
            .service(
                web::resource("/head_manager/assign-manager")
                    .route(web::post().to(team::assign_managers)),
            )
            // manager
            .service(
                web::resource("/manager/teams/{id}/tasks").route(web::post().to(team::assign_task)),
            )
            .service(web::resource("/manager/tasks").route(web::get().to(team::list_tasks)))
            // sales
            .service(
                web::resource("/sales/leads")
                    .route(web::get().to(lead::my_leads))
                    .route(web::post().to(lead::create_lead)),
            )
            .service(web::resource("/sales/leads/{id}").route(web::put().to(lead::update_lead)))
            .service(web::resource("/head_sales/leads").route(web::get().to(lead::all_leads)))
            .service(
                web::resource("/head_sales/leads/{id}/assign")
                    .route(web::put().to(lead::assign_lead)),
            )
            .service(
                web::resource("/head_sales/leads/{id}").route(web::delete().to(lead::delete_lead)),
            )
            // keep last: the role segment is a wildcard
            .service(
                web::resource("/{role}/dashboard").route(web::get().to(dashboard::dashboard)),
            ),
    );
}

// LOGIN
//  └─ access_token (ACCESS_TOKEN_TTL, default 15 min)

// API REQUEST
//  └─ Authorization: Bearer access_token
//       └─ identity re-read from the store, then the handler's role gate
