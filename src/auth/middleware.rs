use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::{debug, error};

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::store::{EmployeeStore, Store, UserStore};

fn reject(req: ServiceRequest, err: AppError) -> ServiceResponse<BoxBody> {
    req.into_response(err.error_response())
}

/// Resolves the bearer token to a live identity.
///
/// The identity is loaded from the store on every request, so a role change
/// or deactivation applies to tokens that are already out.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let (Some(config), Some(store)) = (
        req.app_data::<Data<Config>>().cloned(),
        req.app_data::<Data<dyn Store>>().cloned(),
    ) else {
        error!("Auth middleware mounted without config or store");
        return Ok(reject(req, AppError::Internal("app data missing".into())));
    };

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned);

    let Some(token) = token else {
        debug!(path = req.path(), "Missing bearer token");
        return Ok(reject(req, AppError::Unauthenticated));
    };

    let claims = match verify_token(&token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Invalid or expired token");
            return Ok(reject(req, AppError::Unauthenticated));
        }
    };

    let user = match store.get_user(claims.user_id).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => {
            debug!(user_id = claims.user_id, "Token for missing or inactive identity");
            return Ok(reject(req, AppError::Unauthenticated));
        }
        Err(e) => return Ok(reject(req, e.into())),
    };

    let employee_id = match store.employee_for_user(user.id).await {
        Ok(employee) => employee.map(|e| e.id),
        Err(e) => return Ok(reject(req, e.into())),
    };

    req.extensions_mut()
        .insert(AuthUser::new(&user, employee_id));

    next.call(req).await
}
