use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;

use super::dto::{ListQuery, UserResponse};
use super::extractors::UserForm;
use super::services;
use crate::error::ApiError;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, form))]
pub async fn create_user(
    State(state): State<AppState>,
    form: UserForm,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = services::create_user(&state.db, form.0).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, query))]
pub async fn list_users(
    State(state): State<AppState>,
    query: Option<Query<ListQuery>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let Query(query) = query.unwrap_or(Query(ListQuery::default()));
    let users = services::list_users(&state.db, &query).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = services::parse_id(&id)?;
    let user = services::get_user(&state.db, id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, form))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: UserForm,
) -> Result<Json<UserResponse>, ApiError> {
    let id = services::parse_id(&id)?;
    let user = services::update_user(&state.db, id, form.0).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = services::parse_id(&id)?;
    services::delete_user(&state.db, id).await?;
    Ok(Json(json!({ "ok": true })))
}
