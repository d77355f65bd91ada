use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::warn;

use crate::model::user::User;
use crate::store::{Store, StoreResult, UserStore};

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

pub fn verify_password(password: &str, hashed: &str) -> Result<(), argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    argon2.verify_password(password.as_bytes(), &parsed)
}

/// Credential check: the identity when the password matches and the account
/// is active, `None` otherwise.
pub async fn verify_credentials(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> StoreResult<Option<User>> {
    let Some(user) = store.find_user_by_username(username).await? else {
        return Ok(None);
    };

    if let Err(e) = verify_password(password, &user.password_hash) {
        if !matches!(e, argon2::password_hash::Error::Password) {
            warn!(user_id = user.id, error = %e, "Stored password hash is unreadable");
        }
        return Ok(None);
    }

    if !user.is_active {
        return Ok(None);
    }
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password("hunter2").unwrap();
        assert!(hashed.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hashed).is_ok());
        assert!(verify_password("hunter3", &hashed).is_err());
    }

    #[test]
    fn garbage_hash_is_an_error_not_a_panic() {
        assert!(verify_password("x", "plaintext").is_err());
    }
}
