//! Admin user management commands.
//!
//! ```bash
//! gm-cli admin create -e ops@giftmart.in -n "Ops Team" -r super_admin -p '<password>'
//! ```

use secrecy::SecretString;
use thiserror::Error;

use giftmart_admin::db::{self, AdminUserRepository, RepositoryError};
use giftmart_admin::services::auth::{AuthError, hash_password, validate_password};
use giftmart_core::{AdminRole, AdminUserId, Email};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("{0}")]
    Password(#[from] AuthError),
}

/// Create a new admin user with a password.
///
/// # Errors
///
/// Returns an error for a bad role, email or password, a missing database
/// URL, or an email that is already registered.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<AdminUserId, AdminError> {
    dotenvy::dotenv().ok();

    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let database_url = std::env::var("GM_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingEnvVar("GM_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let admin = AdminUserRepository::new(&pool)
        .create(&email, name.trim(), role, &password_hash)
        .await?;

    tracing::info!(
        "Admin user created. ID: {}, Email: {}, Role: {}",
        admin.id,
        admin.email,
        admin.role
    );
    Ok(admin.id)
}
