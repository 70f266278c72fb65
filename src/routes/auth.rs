//! Account route handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{self, SignUp};
use crate::cache::Session;
use crate::error::Result;
use crate::models::UserProfile;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    crate::pricing::models::BASE_COUNTRY.to_string()
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub user: UserProfile,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let form = SignUp {
        email: req.email,
        password: req.password,
        name: req.name,
        country_code: req.country,
    };
    let (session, user) =
        auth::sign_up(state.store.as_ref(), &state.sessions, &state.pricing, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            access_token: session.token.clone(),
            user,
        }),
    ))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SessionResponse>> {
    let (session, user) =
        auth::sign_in(state.store.as_ref(), &state.sessions, &req.email, &req.password).await?;
    Ok(Json(SessionResponse {
        access_token: session.token.clone(),
        user,
    }))
}

pub async fn sign_out(State(state): State<AppState>, session: Session) -> StatusCode {
    state.sessions.revoke(&session.token).await;
    StatusCode::NO_CONTENT
}

pub async fn profile(State(state): State<AppState>, session: Session) -> Result<Json<UserProfile>> {
    let user = auth::current_user(state.store.as_ref(), &session).await?;
    Ok(Json(UserProfile::from(&user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>> {
    let user = auth::update_profile(
        state.store.as_ref(),
        &state.pricing,
        &session,
        req.name,
        req.country,
    )
    .await?;
    Ok(Json(user))
}
