use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

use super::EntityStore;
use crate::error::StoreError;
use crate::models::{Choice, ChoiceId, Question, QuestionId};

/// Test double keeping records in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    questions: Mutex<Vec<Question>>,
    choices: Mutex<Vec<Choice>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save_vote_outcome` calls so far.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, StoreError> {
        Ok(self.questions.lock().unwrap().iter().find(|q| &q.id == id).cloned())
    }

    async fn get_published_question(
        &self,
        id: &QuestionId,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError> {
        Ok(self.get_question(id).await?.filter(|q| q.is_published(now)))
    }

    async fn latest_published_questions(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Question>, StoreError> {
        let mut published: Vec<Question> = self
            .questions
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.is_published(now))
            .cloned()
            .collect();
        published.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        published.truncate(limit as usize);
        Ok(published)
    }

    async fn get_choice(
        &self,
        id: &ChoiceId,
        question_id: &QuestionId,
    ) -> Result<Option<Choice>, StoreError> {
        Ok(self
            .choices
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == id && &c.question_id == question_id)
            .cloned())
    }

    async fn list_choices(&self, question_id: &QuestionId) -> Result<Vec<Choice>, StoreError> {
        Ok(self
            .choices
            .lock()
            .unwrap()
            .iter()
            .filter(|c| &c.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn save_vote_outcome(&self, question: &Question, choices: &[Choice]) -> Result<(), StoreError> {
        let mut questions = self.questions.lock().unwrap();
        let mut stored_choices = self.choices.lock().unwrap();

        if let Some(stored) = questions.iter_mut().find(|q| q.id == question.id) {
            stored.votes = question.votes;
        }
        for choice in choices {
            if let Some(stored) = stored_choices.iter_mut().find(|c| c.id == choice.id) {
                stored.votes = choice.votes;
                stored.ratio = choice.ratio;
            }
        }

        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    async fn create_question(&self, text: &str, pub_date: DateTime<Utc>) -> Result<Question, StoreError> {
        let question = Question::new(text.to_string(), pub_date);
        self.questions.lock().unwrap().push(question.clone());
        Ok(question)
    }

    async fn add_choice(&self, question_id: &QuestionId, text: &str) -> Result<Choice, StoreError> {
        let choice = Choice::new(question_id.clone(), text.to_string());
        self.choices.lock().unwrap().push(choice.clone());
        Ok(choice)
    }
}
