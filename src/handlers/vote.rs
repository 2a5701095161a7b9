use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use log::{info, warn};
use serde::Deserialize;

use super::polls::QUESTION_NOT_FOUND;
use super::{render, AppError, AppState};
use crate::error::VoteError;
use crate::models::QuestionId;
use crate::views::{DetailView, NO_CHOICE_MESSAGE};
use crate::voting::cast_vote;

#[derive(Debug, Deserialize)]
pub struct VoteForm {
    pub choice: Option<String>,
}

/// Records a vote and redirects to the results page, or re-renders the form.
///
/// A body that is not a urlencoded form counts as no choice, so the question
/// lookup still decides between 404 and the re-rendered form.
pub async fn vote(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    form: Result<Form<VoteForm>, FormRejection>,
) -> Result<Response, AppError> {
    let question_id = QuestionId(question_id);
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!("Unreadable vote form for question {}: {}", question_id, rejection);
            VoteForm { choice: None }
        }
    };

    match cast_vote(state.store.as_ref(), &question_id, form.choice.as_deref()).await {
        Ok(voted) => {
            info!("Recorded vote: question_id={}, choice_id={:?}", voted, form.choice);
            Ok(Redirect::to(&format!("/polls/{}/results/", voted)).into_response())
        }
        Err(VoteError::NoChoiceSelected) => {
            warn!("Rejected vote without a valid choice for question {}", question_id);
            let question = state
                .store
                .get_question(&question_id)
                .await?
                .ok_or(AppError::NotFound(QUESTION_NOT_FOUND))?;
            let choices = state.store.list_choices(&question.id).await?;
            let view = DetailView::new(&question, &choices).with_error(NO_CHOICE_MESSAGE);
            Ok(render(view)?.into_response())
        }
        Err(VoteError::QuestionNotFound) => Err(AppError::NotFound(QUESTION_NOT_FOUND)),
        Err(VoteError::Store(e)) => Err(AppError::Store(e)),
    }
}
