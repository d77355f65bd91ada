//! Shared wiring for the HTTP-level tests: the real route table on top of a
//! `MemoryStore`, with rate limiting off.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use actix_web::{
    App, Error,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, LOCATION},
    middleware::NormalizePath,
    web::Data,
};
use rust_decimal::Decimal;

use erp::auth::jwt::generate_access_token;
use erp::config::Config;
use erp::model::{
    employee::{Employee, EmployeeFields},
    role::Role,
    user::User,
};
use erp::routes;
use erp::services::{
    employees,
    users::{self, Registration},
};
use erp::store::{MemoryStore, Store};
use erp::utils::username_index::UsernameIndex;

pub const PASSWORD: &str = "pass-1234";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub index: UsernameIndex,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            index: UsernameIndex::new(),
            config: Config::for_memory("test-secret"),
        }
    }

    /// The app only holds clones of the shared state, never `&self`.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = Error,
            InitError = (),
        > + use<>,
    > {
        let store: Arc<dyn Store> = self.store.clone();
        let config = self.config.clone();

        App::new()
            .wrap(NormalizePath::trim())
            .app_data(Data::from(store))
            .app_data(Data::new(self.index.clone()))
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, &config))
    }

    /// Creates an active identity with [`PASSWORD`].
    pub async fn user(&self, username: &str, role: Role) -> User {
        users::create_user(
            self.store.as_ref(),
            &self.index,
            Registration {
                username: username.to_string(),
                password: PASSWORD.to_string(),
                role,
                first_name: String::new(),
                last_name: String::new(),
                email: None,
            },
        )
        .await
        .unwrap()
    }

    /// Identity with role `employee` plus its employee record.
    pub async fn employee(&self, username: &str, basic_salary: &str) -> (User, Employee) {
        employees::hire(
            self.store.as_ref(),
            &self.index,
            Registration {
                username: username.to_string(),
                password: PASSWORD.to_string(),
                role: Role::Employee,
                first_name: "Test".into(),
                last_name: "Employee".into(),
                email: None,
            },
            EmployeeFields {
                department: "Engineering".into(),
                designation: "Developer".into(),
                contact_number: "+15550100".into(),
                basic_salary: dec(basic_salary),
                photo: None,
            },
        )
        .await
        .unwrap()
    }

    pub fn token(&self, user: &User) -> String {
        generate_access_token(user, &self.config.jwt_secret, self.config.access_token_ttl).unwrap()
    }

    /// `Authorization` header for `user`.
    pub fn auth(&self, user: &User) -> (actix_web::http::header::HeaderName, String) {
        (AUTHORIZATION, format!("Bearer {}", self.token(user)))
    }
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Decimal column of a JSON body, compared by value rather than scale.
pub fn dec_field(body: &serde_json::Value, field: &str) -> Decimal {
    dec(body[field].as_str().unwrap_or_else(|| panic!("{field} missing in {body}")))
}

pub fn location<B>(resp: &ServiceResponse<B>) -> &str {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
