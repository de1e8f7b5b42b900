use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::auth::session::CurrentUser;
use crate::state::AppState;
use crate::tasks::dto::{NewTaskForm, Pagination};
use crate::tasks::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(tasks_page).post(add_task))
        .route("/tasks/:id/delete", post(delete_task))
}

#[instrument(skip(state, user))]
pub async fn tasks_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(p): Query<Pagination>,
) -> Result<Html<String>, (StatusCode, String)> {
    let tasks = repo::list_by_user(&state.db, user.id, p.limit, p.offset)
        .await
        .map_err(internal)?;

    let mut ctx = tera::Context::new();
    ctx.insert("title", "Tasks");
    ctx.insert("user", &PublicUser::from(user));
    ctx.insert("tasks", &tasks);
    state
        .templates
        .render("tasks.html", &ctx)
        .map(Html)
        .map_err(internal)
}

#[instrument(skip(state, user, form))]
pub async fn add_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NewTaskForm>,
) -> Response {
    let text = form.text.trim();
    if text.is_empty() {
        return Redirect::to("/tasks").into_response();
    }

    match repo::create(&state.db, user.id, text).await {
        Ok(task) => {
            info!(task_id = %task.id, user_id = %user.id, "task created");
            Redirect::to("/tasks").into_response()
        }
        Err(e) => {
            error!(error = %e, user_id = %user.id, "create task failed");
            internal(e).into_response()
        }
    }
}

#[instrument(skip(state, user))]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Response {
    match repo::delete(&state.db, user.id, id).await {
        Ok(true) => {
            info!(task_id = %id, user_id = %user.id, "task deleted");
        }
        Ok(false) => {
            // Unknown id or a task owned by someone else; nothing to do.
            warn!(task_id = %id, user_id = %user.id, "delete matched no task");
        }
        Err(e) => {
            error!(error = %e, task_id = %id, "delete task failed");
            return internal(e).into_response();
        }
    }
    Redirect::to("/tasks").into_response()
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
