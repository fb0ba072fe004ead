//! Admin authentication service.
//!
//! Passwords are hashed with Argon2id and stored as PHC strings. The first
//! admin registered on an empty database becomes a super admin; after that
//! only super admins can register accounts.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::RngCore;
use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{AdminRole, Email};

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::platform::API_KEY_PREFIX;
use crate::models::{AdminUser, CurrentAdmin};

/// Minimum password length for admin accounts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length accepted (bounds hashing cost).
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// New admin account request.
#[derive(Debug)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Option<AdminRole>,
}

/// Authentication service for admin accounts.
pub struct AuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Register an admin.
    ///
    /// With no admins in the database anyone may register, and the account
    /// is forced to `super_admin`. Otherwise `actor` must be a super admin;
    /// the requested role defaults to `admin`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RegistrationClosed` when the caller may not register,
    /// validation errors for bad input, and `AuthError::UserAlreadyExists`
    /// when the email is taken.
    #[instrument(skip(self, registration, actor), fields(email = %registration.email))]
    pub async fn register(
        &self,
        registration: Registration<'_>,
        actor: Option<&CurrentAdmin>,
    ) -> Result<AdminUser, AuthError> {
        let bootstrap = self.users.count().await? == 0;
        let role = if bootstrap {
            AdminRole::SuperAdmin
        } else {
            match actor {
                Some(admin) if admin.role == AdminRole::SuperAdmin => {
                    registration.role.unwrap_or(AdminRole::Admin)
                }
                _ => return Err(AuthError::RegistrationClosed),
            }
        };

        let name = registration.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;
        let password_hash = hash_password(registration.password)?;

        let user = self
            .users
            .create(&email, name, role, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(admin_id = %user.id, role = %user.role, bootstrap, "Admin registered");
        Ok(user)
    }

    /// Verify credentials and record the login time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;
        self.users.touch_last_login(user.id).await?;

        Ok(user)
    }
}

/// Check password length rules.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` describing the broken rule.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Random bytes from the thread RNG, hex encoded.
fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A freshly generated API key and its plaintext secret.
#[derive(Debug)]
pub struct IssuedApiKey {
    /// Public identifier, `gng_` followed by 64 hex digits.
    pub key: String,
    pub secret: String,
    /// Argon2id hash of `secret`; the plaintext is never stored.
    pub secret_hash: String,
}

/// Generate a new API key pair.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if the secret cannot be hashed.
pub fn issue_api_key() -> Result<IssuedApiKey, AuthError> {
    let key = format!("{API_KEY_PREFIX}{}", random_hex(32));
    let secret = random_hex(32);
    let secret_hash = hash_password(&secret)?;
    Ok(IssuedApiKey {
        key,
        secret,
        secret_hash,
    })
}

/// Verify a password against a stored PHC hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("marigold-garland-42").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("marigold-garland-42", &hash).is_ok());
        assert!(matches!(
            verify_password("marigold-garland-43", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_issued_api_key_shape() {
        let issued = issue_api_key().unwrap();
        assert!(issued.key.starts_with(API_KEY_PREFIX));
        assert_eq!(issued.key.len(), API_KEY_PREFIX.len() + 64);
        assert_eq!(issued.secret.len(), 64);
        assert!(issued.secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(verify_password(&issued.secret, &issued.secret_hash).is_ok());
        assert_ne!(issue_api_key().unwrap().key, issued.key);
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_length_rules() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_auth_error_statuses() {
        use axum::http::StatusCode;
        assert_eq!(AuthError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::UserAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(AuthError::RegistrationClosed.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::WeakPassword("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::PasswordHash.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
