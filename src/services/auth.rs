//! Accounts, login sessions and flash messages
//!
//! Passwords are stored as hex HMAC-SHA256 digests keyed by a per-user random
//! salt. Session tokens are random UUIDs kept in the `sessions` table and
//! sent to the browser in the `sessionid` cookie.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use sha2::Sha256;
use tracing::{debug, info};

use crate::entities::{profiles, sessions, users};
use crate::error::AuthError;
use crate::models::common::{FlashLevel, FlashMessage};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "sessionid";

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 150;
const MIN_PASSWORD_LENGTH: usize = 8;

const SECRET_COMPARISON_KEY: &str = "papertrade-secret-comparison";

lazy_static::lazy_static! {
    static ref USERNAME_PATTERN: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9@.+_-]+$").expect("valid username regex");
}

/// The logged-in user attached to each authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub session_id: i32,
}

pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let length = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&length) {
        return Err(AuthError::Validation(format!(
            "Username must be between {} and {} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(AuthError::Validation(
            "Username may only contain letters, digits and @/./+/-/_".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str, confirmation: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password != confirmation {
        return Err(AuthError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

fn password_mac(salt: &str, password: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(password.as_bytes());
    mac
}

pub fn hash_password(salt: &str, password: &str) -> String {
    hex::encode(password_mac(salt, password).finalize().into_bytes())
}

/// Constant-time comparison against a stored digest
pub fn verify_password(salt: &str, password: &str, stored_hash: &str) -> bool {
    match hex::decode(stored_hash) {
        Ok(expected) => password_mac(salt, password).verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

/// Compare two secrets in constant time
///
/// Both sides are reduced to fixed-length MACs first, so neither the content
/// nor the length of `expected` leaks through timing.
pub fn secrets_match(expected: &str, provided: &str) -> bool {
    let expected = password_mac(SECRET_COMPARISON_KEY, expected)
        .finalize()
        .into_bytes();
    password_mac(SECRET_COMPARISON_KEY, provided)
        .verify_slice(&expected)
        .is_ok()
}

fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Create a user and its profile funded with `starting_balance`
pub async fn register_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    starting_balance: Decimal,
) -> Result<users::Model, AuthError> {
    validate_username(username)?;

    let txn = db.begin().await?;

    let existing = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(AuthError::UsernameTaken);
    }

    let salt = new_token();
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(&salt, password)),
        password_salt: Set(salt),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    create_profile(&txn, user.id, starting_balance).await?;
    txn.commit().await?;

    info!(user_id = user.id, username = %user.username, "Registered user");
    Ok(user)
}

pub async fn create_profile<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    balance: Decimal,
) -> Result<profiles::Model, sea_orm::DbErr> {
    profiles::ActiveModel {
        user_id: Set(user_id),
        balance: Set(balance),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<users::Model, AuthError> {
    let user = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&user.password_salt, password, &user.password_hash) {
        debug!(username, "Password mismatch");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user)
}

pub async fn create_session(
    db: &DatabaseConnection,
    user_id: i32,
    ttl_hours: i64,
) -> Result<sessions::Model, sea_orm::DbErr> {
    let now = Utc::now().fixed_offset();
    sessions::ActiveModel {
        token: Set(new_token()),
        user_id: Set(user_id),
        flash_level: Set(None),
        flash_message: Set(None),
        created_at: Set(now),
        expires_at: Set(now + Duration::hours(ttl_hours)),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Resolve a session cookie to its user; expired sessions are removed
pub async fn find_session_user(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<CurrentUser>, sea_orm::DbErr> {
    let found = sessions::Entity::find()
        .filter(sessions::Column::Token.eq(token))
        .find_also_related(users::Entity)
        .one(db)
        .await?;

    let Some((session, Some(user))) = found else {
        return Ok(None);
    };

    if session.expires_at < Utc::now().fixed_offset() {
        debug!(user_id = user.id, "Session expired");
        sessions::Entity::delete_by_id(session.id).exec(db).await?;
        return Ok(None);
    }

    Ok(Some(CurrentUser {
        id: user.id,
        username: user.username,
        session_id: session.id,
    }))
}

pub async fn delete_session(db: &DatabaseConnection, token: &str) -> Result<(), sea_orm::DbErr> {
    sessions::Entity::delete_many()
        .filter(sessions::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(())
}

/// Queue a message for the next rendered page, replacing any pending one
pub async fn set_flash(
    db: &DatabaseConnection,
    session_id: i32,
    flash: FlashMessage,
) -> Result<(), sea_orm::DbErr> {
    let Some(session) = sessions::Entity::find_by_id(session_id).one(db).await? else {
        return Ok(());
    };

    let mut active: sessions::ActiveModel = session.into();
    active.flash_level = Set(Some(flash.level.to_string()));
    active.flash_message = Set(Some(flash.message));
    active.update(db).await?;
    Ok(())
}

/// Pop the pending flash message, if any
pub async fn take_flash(
    db: &DatabaseConnection,
    session_id: i32,
) -> Result<Option<FlashMessage>, sea_orm::DbErr> {
    let Some(session) = sessions::Entity::find_by_id(session_id).one(db).await? else {
        return Ok(None);
    };

    let Some(message) = session.flash_message.clone() else {
        return Ok(None);
    };
    let level = session
        .flash_level
        .as_deref()
        .and_then(|level| level.parse().ok())
        .unwrap_or(FlashLevel::Info);

    let mut active: sessions::ActiveModel = session.into();
    active.flash_level = Set(None);
    active.flash_message = Set(None);
    active.update(db).await?;

    Ok(Some(FlashMessage { level, message }))
}

/// Accept only local redirect targets for `next`
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("salt", "password123");
        assert_eq!(hash.len(), 64);
        assert!(verify_password("salt", "password123", &hash));
        assert!(!verify_password("salt", "password124", &hash));
        assert!(!verify_password("pepper", "password123", &hash));
        assert!(!verify_password("salt", "password123", "not-hex"));
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("admin-key", "admin-key"));
        assert!(!secrets_match("admin-key", "admin-kez"));
        assert!(!secrets_match("admin-key", "admin-key-longer"));
        assert!(!secrets_match("admin-key", ""));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("testuser").is_ok());
        assert!(validate_username("a.b+c@d-e_f").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123", "password123").is_ok());
        assert!(validate_password("short", "short").is_err());
        assert!(validate_password("password123", "password321").is_err());
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/portfolio")), "/portfolio");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
