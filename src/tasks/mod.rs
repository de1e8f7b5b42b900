use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;
mod repo_types;

pub use repo_types::Task;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
