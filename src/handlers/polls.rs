use axum::extract::{Path, State};
use axum::response::Html;
use chrono::Utc;
use log::info;

use super::{render, AppError, AppState};
use crate::models::QuestionId;
use crate::views::{DetailView, IndexView, ResultsView};

const LATEST_LIMIT: u32 = 5;
pub(super) const QUESTION_NOT_FOUND: &str = "No question matches the given query.";

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let now = Utc::now();
    let questions = state.store.latest_published_questions(now, LATEST_LIMIT).await?;
    info!("Listing {} published question(s)", questions.len());
    render(IndexView::new(&questions, now))
}

/// Voting form; future-dated questions are treated as missing.
pub async fn detail(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let question_id = QuestionId(question_id);
    let question = state
        .store
        .get_published_question(&question_id, Utc::now())
        .await?
        .ok_or(AppError::NotFound(QUESTION_NOT_FOUND))?;
    let choices = state.store.list_choices(&question.id).await?;
    render(DetailView::new(&question, &choices))
}

pub async fn results(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let question_id = QuestionId(question_id);
    let question = state
        .store
        .get_question(&question_id)
        .await?
        .ok_or(AppError::NotFound(QUESTION_NOT_FOUND))?;
    let choices = state.store.list_choices(&question.id).await?;
    render(ResultsView::new(&question, &choices))
}
