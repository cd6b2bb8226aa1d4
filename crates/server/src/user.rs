//! Account endpoints: registration, login and the caller's profile.

use api_types::user::{ProfileUpdate, TokenRequest, TokenResponse, UserCreate, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Account, RegisterCmd};

use crate::{ApiJson, ServerError, server::ServerState};

fn user_view(account: Account) -> UserView {
    UserView {
        id: account.id,
        email: account.email,
        name: account.name,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<UserCreate>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let account = state
        .engine
        .register(RegisterCmd {
            email: payload.email,
            password: payload.password,
            name: payload.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user_view(account))))
}

pub async fn token(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TokenRequest>,
) -> Result<Json<TokenResponse>, ServerError> {
    let token = state
        .engine
        .authenticate(payload.email.as_deref(), payload.password.as_deref())
        .await?;

    Ok(Json(TokenResponse { token }))
}

pub async fn profile(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let account = state.engine.profile(account.id).await?;
    Ok(Json(user_view(account)))
}

pub async fn update_profile(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<ProfileUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let account = state
        .engine
        .update_profile(
            account.id,
            engine::ProfileUpdate {
                name: payload.name,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(user_view(account)))
}
