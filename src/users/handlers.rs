use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest, UpdateUserRequest};
use crate::{
    auth::{AdminPrincipal, Principal},
    error::AppResult,
    extract::{JsonBody, UserId},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(register))
        .route("/user/login", post(login))
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    // Public sign-up always yields a plain USER account.
    let (user, token) = state.users.register(payload, None).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let (user, token) = state.users.login(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, principal), fields(caller = %principal.id))]
pub async fn get_user(
    State(state): State<AppState>,
    principal: Principal,
    UserId(id): UserId,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(state.users.get(id).await?.into()))
}

#[instrument(skip(state, principal, payload), fields(caller = %principal.id))]
pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    UserId(id): UserId,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(state.users.update(id, payload).await?.into()))
}

#[instrument(skip(state, admin), fields(caller = %admin.0.id))]
pub async fn list_users(
    State(state): State<AppState>,
    admin: AdminPrincipal,
) -> AppResult<Json<Vec<PublicUser>>> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, admin), fields(caller = %admin.0.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminPrincipal,
    UserId(id): UserId,
) -> AppResult<StatusCode> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
