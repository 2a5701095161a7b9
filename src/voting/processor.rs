use crate::db::EntityStore;
use crate::error::VoteError;
use crate::models::{ChoiceId, QuestionId};
use crate::voting::tally::apply_vote;

/// Records one vote for `raw_choice_id` on the given question.
///
/// `raw_choice_id` is the unvalidated form value. A missing, empty, or foreign
/// choice is rejected with [`VoteError::NoChoiceSelected`] before anything is
/// written. On success the question id is returned so the caller can redirect
/// to its results.
pub async fn cast_vote(
    store: &dyn EntityStore,
    question_id: &QuestionId,
    raw_choice_id: Option<&str>,
) -> Result<QuestionId, VoteError> {
    let mut question = store
        .get_question(question_id)
        .await?
        .ok_or(VoteError::QuestionNotFound)?;

    let choice_id = match raw_choice_id.map(str::trim) {
        Some(raw) if !raw.is_empty() => ChoiceId(raw.to_string()),
        _ => return Err(VoteError::NoChoiceSelected),
    };
    let selected = store
        .get_choice(&choice_id, &question.id)
        .await?
        .ok_or(VoteError::NoChoiceSelected)?;

    let mut choices = store.list_choices(&question.id).await?;
    apply_vote(&mut question, &mut choices, &selected.id);
    store.save_vote_outcome(&question, &choices).await?;

    Ok(question.id)
}
