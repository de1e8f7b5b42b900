use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use tracing::{error, instrument};

use crate::state::AppState;

#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    let mut ctx = tera::Context::new();
    ctx.insert("title", "Home");
    state.templates.render("index.html", &ctx).map(Html).map_err(|e| {
        error!(error = %e, "render index failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "template error".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn index_renders() {
        let state = AppState::fake();
        let Html(body) = index(State(state)).await.expect("index should render");
        assert!(body.contains("<title>Home</title>"));
    }
}
