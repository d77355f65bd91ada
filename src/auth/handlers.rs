use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{jwt::generate_access_token, password::verify_credentials},
    config::Config,
    error::AppError,
    model::{role::Role, user::User},
    models::{LoginReqDto, LoginResponse, RegisterReq},
    services::users::{self, Registration},
    store::{Store, UserStore},
    utils::username_index::UsernameIndex,
};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials or inactive account")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Username or password required"
        })));
    }

    debug!("Verifying credentials");
    let Some(identity) =
        verify_credentials(store.get_ref(), user.username.trim(), &user.password).await?
    else {
        info!("Invalid credentials");
        return Ok(HttpResponse::Unauthorized().json(json!({
            "error": "Invalid credentials"
        })));
    };

    let access_token =
        generate_access_token(&identity, &config.jwt_secret, config.access_token_ttl)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))?;

    // Non-fatal: a failed timestamp write must not block the login.
    if let Err(e) = store.record_login(identity.id, Utc::now()).await {
        error!(user_id = identity.id, error = %e, "Failed to update last_login_at");
    }

    info!(user_id = identity.id, role = %identity.role, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        role: identity.role,
        dashboard: identity.role.dashboard_path(&config.api_prefix),
    }))
}

/// Target of the unauthenticated redirect.
pub async fn login_required() -> impl Responder {
    HttpResponse::Unauthorized().json(json!({ "error": "login required" }))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Customer identity created", body = User),
        (status = 400, description = "Field errors")
    ),
    tag = "Auth"
)]
pub async fn register(
    user: web::Json<RegisterReq>,
    store: web::Data<dyn Store>,
    index: web::Data<UsernameIndex>,
) -> Result<HttpResponse, AppError> {
    let user = user.into_inner();

    // Self-registration never picks its own role.
    let created = users::create_user(
        store.get_ref(),
        &index,
        Registration {
            username: user.username.trim().to_string(),
            password: user.password,
            role: Role::Customer,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        },
    )
    .await?;

    info!(user_id = created.id, "User registered");
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Client discards its token")),
    tag = "Auth"
)]
pub async fn logout() -> impl Responder {
    // Tokens are stateless, nothing to revoke server side.
    HttpResponse::NoContent().finish()
}

/// Denial page for authenticated callers with the wrong role.
pub async fn unauthorized() -> impl Responder {
    HttpResponse::Forbidden().json(json!({}))
}
