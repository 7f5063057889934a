use axum::Router;

use crate::state::AppState;

pub mod dto;
mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
