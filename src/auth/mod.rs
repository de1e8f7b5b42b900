use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod password;
pub mod repo;
mod repo_types;
pub mod services;
pub mod session;

pub use repo_types::User;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
