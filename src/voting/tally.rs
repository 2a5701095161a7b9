use crate::models::{Choice, ChoiceId, Question};

/// Percentage share of `votes` out of `total`, rounded half to even.
///
/// Returns `0.0` for a question nobody has voted on yet.
pub fn ratio(votes: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (votes as f64 / total as f64 * 100.0).round_ties_even()
}

/// Counts one vote for `selected` and refreshes the ratio of every choice.
///
/// All ratios are recomputed, not only the selected one, so a stale ratio left
/// by an earlier partial write is corrected on the next vote.
pub fn apply_vote(question: &mut Question, choices: &mut [Choice], selected: &ChoiceId) {
    for choice in choices.iter_mut() {
        if choice.id == *selected {
            choice.votes += 1;
        }
    }
    question.votes += 1;

    for choice in choices.iter_mut() {
        choice.ratio = ratio(choice.votes, question.votes);
    }
}
