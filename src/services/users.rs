use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::error::{AppError, FieldErrors};
use crate::model::role::Role;
use crate::model::user::{NewUser, User, UserChanges};
use crate::services::validate;
use crate::store::{Store, StoreError, UserStore};
use crate::utils::username_index::UsernameIndex;

const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Identity to be created. The password is still in clear text here.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl Registration {
    pub fn validate_into(&self, errors: &mut FieldErrors) {
        validate::username(errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", "This field is required.");
        }
        validate::max_len(errors, "first_name", &self.first_name, validate::NAME_MAX);
        validate::max_len(errors, "last_name", &self.last_name, validate::NAME_MAX);
        let email = validate::blank_to_none(self.email.clone());
        validate::email(errors, "email", email.as_deref());
    }
}

/// Admin edit of an identity. `None` keeps the current value; an empty
/// password keeps the current password.
#[derive(Debug, Clone, Default)]
pub struct UserEdit {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<Option<String>>,
    pub is_active: Option<bool>,
}

fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

fn username_conflict(err: StoreError) -> AppError {
    match err {
        StoreError::Conflict(_) => AppError::validation("username", USERNAME_TAKEN),
        other => other.into(),
    }
}

pub async fn create_user(
    store: &dyn Store,
    index: &UsernameIndex,
    registration: Registration,
) -> Result<User, AppError> {
    let mut errors = FieldErrors::new();
    registration.validate_into(&mut errors);
    errors.into_result()?;

    if !index.is_available(store, &registration.username).await? {
        return Err(AppError::validation("username", USERNAME_TAKEN));
    }

    let user = store
        .create_user(NewUser {
            password_hash: hash(&registration.password)?,
            username: registration.username,
            role: registration.role,
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: validate::blank_to_none(registration.email),
            is_active: true,
        })
        .await
        .map_err(username_conflict)?;

    index.record(&user.username).await;
    info!(user_id = user.id, role = %user.role, "Identity created");
    Ok(user)
}

pub async fn update_user(
    store: &dyn Store,
    index: &UsernameIndex,
    id: u64,
    edit: UserEdit,
) -> Result<User, AppError> {
    let current = store.get_user(id).await?.ok_or(AppError::NotFound("User"))?;

    let mut errors = FieldErrors::new();
    if let Some(username) = &edit.username {
        validate::username(&mut errors, "username", username);
    }
    if let Some(first_name) = &edit.first_name {
        validate::max_len(&mut errors, "first_name", first_name, validate::NAME_MAX);
    }
    if let Some(last_name) = &edit.last_name {
        validate::max_len(&mut errors, "last_name", last_name, validate::NAME_MAX);
    }
    let email = edit.email.map(validate::blank_to_none);
    if let Some(email) = &email {
        validate::email(&mut errors, "email", email.as_deref());
    }
    errors.into_result()?;

    let renamed = edit
        .username
        .as_ref()
        .filter(|name| !name.eq_ignore_ascii_case(&current.username));
    if let Some(name) = renamed {
        if !index.is_available(store, name).await? {
            return Err(AppError::validation("username", USERNAME_TAKEN));
        }
    }

    let password_hash = match edit.password.as_deref() {
        Some(p) if !p.is_empty() => Some(hash(p)?),
        _ => None,
    };

    let updated = store
        .update_user(
            id,
            UserChanges {
                username: edit.username,
                password_hash,
                role: edit.role,
                first_name: edit.first_name,
                last_name: edit.last_name,
                email,
                is_active: edit.is_active,
            },
        )
        .await
        .map_err(username_conflict)?
        .ok_or(AppError::NotFound("User"))?;

    if updated.username != current.username {
        index.forget(&current.username).await;
        index.record(&updated.username).await;
    }
    if updated.role != current.role {
        info!(user_id = id, from = %current.role, to = %updated.role, "Role changed");
    }
    Ok(updated)
}

/// Deletes the identity together with its employee record, payrolls and
/// headed teams.
pub async fn delete_user(store: &dyn Store, index: &UsernameIndex, id: u64) -> Result<(), AppError> {
    let user = store.get_user(id).await?.ok_or(AppError::NotFound("User"))?;
    if !store.delete_user(id).await? {
        return Err(AppError::NotFound("User"));
    }
    index.forget(&user.username).await;
    info!(user_id = id, "Identity deleted");
    Ok(())
}

/// Creates the configured admin unless an identity with that username exists.
/// Returns whether one was created.
pub async fn ensure_bootstrap_admin(
    store: &dyn Store,
    index: &UsernameIndex,
    username: &str,
    password: &str,
) -> Result<bool, AppError> {
    if let Some(existing) = store.find_user_by_username(username).await? {
        if existing.role != Role::Admin {
            warn!(user_id = existing.id, role = %existing.role, "Bootstrap admin username belongs to a non-admin identity");
        }
        return Ok(false);
    }

    create_user(
        store,
        index,
        Registration {
            username: username.to_string(),
            password: password.to_string(),
            role: Role::Admin,
            first_name: String::new(),
            last_name: String::new(),
            email: None,
        },
    )
    .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registration(username: &str, role: Role) -> Registration {
        Registration {
            username: username.into(),
            password: "pw".into(),
            role,
            first_name: "First".into(),
            last_name: "Last".into(),
            email: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_a_field_error() {
        let store = MemoryStore::new();
        let index = UsernameIndex::new();

        let user = create_user(&store, &index, registration("ops", Role::Tech)).await.unwrap();
        assert_eq!(user.email, None);
        assert_ne!(user.password_hash, "pw");

        let err = create_user(&store, &index, registration("OPS", Role::Tech))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(errors.get("username"), Some(USERNAME_TAKEN)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_violations_are_reported_together() {
        let store = MemoryStore::new();
        let index = UsernameIndex::new();
        let mut bad = registration("bad name", Role::Tech);
        bad.password.clear();
        bad.email = Some("nope".into());

        let Err(AppError::Validation(errors)) = create_user(&store, &index, bad).await else {
            panic!("expected validation failure");
        };
        assert!(errors.get("username").is_some());
        assert!(errors.get("password").is_some());
        assert!(errors.get("email").is_some());
    }

    #[tokio::test]
    async fn rename_updates_the_index() {
        let store = MemoryStore::new();
        let index = UsernameIndex::new();
        let user = create_user(&store, &index, registration("old", Role::Hr)).await.unwrap();

        let edit = UserEdit {
            username: Some("new".into()),
            role: Some(Role::HeadHr),
            password: Some(String::new()),
            email: Some(Some(String::new())),
            ..Default::default()
        };
        let updated = update_user(&store, &index, user.id, edit).await.unwrap();
        assert_eq!(updated.role, Role::HeadHr);
        assert_eq!(updated.password_hash, user.password_hash);
        assert_eq!(updated.email, None);

        assert!(index.is_available(&store, "old").await.unwrap());
        assert!(!index.is_available(&store, "new").await.unwrap());
    }

    #[tokio::test]
    async fn bootstrap_admin_is_created_once() {
        let store = MemoryStore::new();
        let index = UsernameIndex::new();
        assert!(ensure_bootstrap_admin(&store, &index, "root", "pw").await.unwrap());
        assert!(!ensure_bootstrap_admin(&store, &index, "root", "pw").await.unwrap());
        let admins = store.list_users(Some(Role::Admin)).await.unwrap();
        assert_eq!(admins.len(), 1);
    }

    #[tokio::test]
    async fn missing_identity_is_not_found() {
        let store = MemoryStore::new();
        let index = UsernameIndex::new();
        assert!(matches!(
            delete_user(&store, &index, 42).await,
            Err(AppError::NotFound("User"))
        ));
    }
}
