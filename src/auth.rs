//! Account sign-up/sign-in and the `Session` extractor.
//!
//! Handlers that need a user take a `Session` argument; nothing reads the
//! current user from ambient state.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::cache::{Session, SessionCache};
use crate::db::{self, KvStore};
use crate::error::{AppError, Result};
use crate::models::{UserProfile, UserRecord};
use crate::pricing::QuoteBuilder;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;

fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Compare digests without short-circuiting on the first differing byte
fn digest_matches(candidate: &str, stored: &str) -> bool {
    candidate.as_bytes().ct_eq(stored.as_bytes()).into()
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::BadRequest(format!("'{}' is not an email address", email))),
    }
}

/// New account details
#[derive(Debug, Clone)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub name: String,
    pub country_code: String,
}

/// Create an account and open a session for it
pub async fn sign_up(
    store: &dyn KvStore,
    sessions: &SessionCache,
    pricing: &QuoteBuilder,
    form: SignUp,
) -> Result<(Arc<Session>, UserProfile)> {
    let email = normalize_email(&form.email)?;
    if form.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    let country = pricing.country(&form.country_code)?;

    let salt = Uuid::new_v4().simple().to_string();
    let user = UserRecord {
        id: Uuid::new_v4(),
        password_hash: digest_password(&salt, &form.password),
        password_salt: salt,
        email,
        name: name.to_string(),
        country_code: country.code.clone(),
        avatar: String::new(),
        joined_at: Utc::now(),
    };
    db::insert_user(store, &user).await?;
    info!("New account {} from {}", user.id, user.country_code);

    let session = sessions.issue(user.id, &user.email).await;
    Ok((session, UserProfile::from(&user)))
}

/// Check credentials and open a session
pub async fn sign_in(
    store: &dyn KvStore,
    sessions: &SessionCache,
    email: &str,
    password: &str,
) -> Result<(Arc<Session>, UserProfile)> {
    let email = normalize_email(email).map_err(|_| AppError::Unauthorized)?;
    let user = db::find_user(store, &email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !digest_matches(&digest_password(&user.password_salt, password), &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let session = sessions.issue(user.id, &user.email).await;
    Ok((session, UserProfile::from(&user)))
}

/// Load the account behind a session
pub async fn current_user(store: &dyn KvStore, session: &Session) -> Result<UserRecord> {
    db::find_user(store, &session.email)
        .await?
        .filter(|u| u.id == session.user_id)
        .ok_or(AppError::Unauthorized)
}

/// Change display name and/or browsing country
pub async fn update_profile(
    store: &dyn KvStore,
    pricing: &QuoteBuilder,
    session: &Session,
    name: Option<String>,
    country_code: Option<String>,
) -> Result<UserProfile> {
    let mut user = current_user(store, session).await?;

    if let Some(name) = name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name is required".to_string()));
        }
        user.name = name.to_string();
    }
    if let Some(code) = country_code {
        user.country_code = pricing.country(&code)?.code.clone();
    }

    db::save_user(store, &user).await?;
    Ok(UserProfile::from(&user))
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        let session = state
            .sessions
            .get(token)
            .await
            .ok_or(AppError::Unauthorized)?;
        Ok((*session).clone())
    }
}
