//! View models for the poll pages.
//!
//! Each view turns domain records into the strings and flags its askama
//! template needs, so handlers never build HTML themselves.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::models::{Choice, Question};

pub const NO_CHOICE_MESSAGE: &str = "You didn't select a choice.";

pub struct QuestionRow {
    pub id: String,
    pub text: String,
    pub recent: bool,
}

#[derive(Template)]
#[template(path = "polls/index.html")]
pub struct IndexView {
    pub questions: Vec<QuestionRow>,
}

impl IndexView {
    pub fn new(questions: &[Question], now: DateTime<Utc>) -> Self {
        Self {
            questions: questions
                .iter()
                .map(|q| QuestionRow {
                    id: q.id.to_string(),
                    text: q.text.clone(),
                    recent: q.was_published_recently(now),
                })
                .collect(),
        }
    }
}

pub struct ChoiceRow {
    pub id: String,
    pub text: String,
}

/// Voting form, optionally carrying a validation message.
#[derive(Template)]
#[template(path = "polls/detail.html")]
pub struct DetailView {
    pub question_id: String,
    pub question_text: String,
    pub choices: Vec<ChoiceRow>,
    pub error_message: String,
}

impl DetailView {
    pub fn new(question: &Question, choices: &[Choice]) -> Self {
        Self {
            question_id: question.id.to_string(),
            question_text: question.text.clone(),
            choices: choices
                .iter()
                .map(|c| ChoiceRow {
                    id: c.id.to_string(),
                    text: c.text.clone(),
                })
                .collect(),
            error_message: String::new(),
        }
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

pub struct ResultRow {
    pub text: String,
    pub votes: i64,
    pub votes_label: &'static str,
    pub ratio: String,
}

#[derive(Template)]
#[template(path = "polls/results.html")]
pub struct ResultsView {
    pub question_id: String,
    pub question_text: String,
    pub total_votes: i64,
    pub total_label: &'static str,
    pub choices: Vec<ResultRow>,
}

fn votes_label(count: i64) -> &'static str {
    if count == 1 { "vote" } else { "votes" }
}

impl ResultsView {
    pub fn new(question: &Question, choices: &[Choice]) -> Self {
        Self {
            question_id: question.id.to_string(),
            question_text: question.text.clone(),
            total_votes: question.votes,
            total_label: votes_label(question.votes),
            choices: choices
                .iter()
                .map(|c| ResultRow {
                    text: c.text.clone(),
                    votes: c.votes,
                    votes_label: votes_label(c.votes),
                    ratio: format!("{:.0}", c.ratio),
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "polls/not_found.html")]
pub struct NotFoundView {
    pub message: String,
}

impl NotFoundView {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
