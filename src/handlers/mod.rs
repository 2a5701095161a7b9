mod polls;
mod vote;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use log::error;
use std::sync::Arc;
use thiserror::Error;

use crate::db::EntityStore;
use crate::error::StoreError;
use crate::views::NotFoundView;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

/// Routes:
/// - `GET  /polls/` - latest published questions
/// - `GET  /polls/:question_id/` - voting form
/// - `GET  /polls/:question_id/results/` - vote counts and ratios
/// - `POST /polls/:question_id/vote/` - record a vote
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::permanent("/polls/") }))
        .route("/polls", get(|| async { Redirect::permanent("/polls/") }))
        .route("/polls/", get(polls::index))
        .route("/polls/:question_id/", get(polls::detail))
        .route("/polls/:question_id/results/", get(polls::results))
        .route("/polls/:question_id/vote/", post(vote::vote))
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => {
                let body = NotFoundView::new(message)
                    .render()
                    .unwrap_or_else(|_| message.to_string());
                (StatusCode::NOT_FOUND, Html(body)).into_response()
            }
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

fn render<T: Template>(view: T) -> Result<Html<String>, AppError> {
    Ok(Html(view.render()?))
}
