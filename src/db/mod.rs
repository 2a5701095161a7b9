#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use sqlx::{migrate::MigrateDatabase, sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow}, Row, Sqlite};

use crate::error::StoreError;
use crate::models::{Choice, ChoiceId, Question, QuestionId};

/// Persistence boundary for questions and choices.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Any question, published or not.
    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, StoreError>;

    /// A question whose publication time is not after `now`.
    async fn get_published_question(
        &self,
        id: &QuestionId,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError>;

    /// Published questions, newest first, at most `limit` of them.
    async fn latest_published_questions(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Question>, StoreError>;

    /// A choice only if it belongs to `question_id`.
    async fn get_choice(
        &self,
        id: &ChoiceId,
        question_id: &QuestionId,
    ) -> Result<Option<Choice>, StoreError>;

    async fn list_choices(&self, question_id: &QuestionId) -> Result<Vec<Choice>, StoreError>;

    /// Writes the question counter and every choice's counter and ratio in one unit.
    async fn save_vote_outcome(&self, question: &Question, choices: &[Choice]) -> Result<(), StoreError>;

    async fn create_question(&self, text: &str, pub_date: DateTime<Utc>) -> Result<Question, StoreError>;

    async fn add_choice(&self, question_id: &QuestionId, text: &str) -> Result<Choice, StoreError>;
}

pub struct Database {
    pool: SqlitePool,
}

// Fixed precision keeps lexical order equal to chronological order.
fn to_db_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_db_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad pub_date '{}': {}", raw, e)))
}

fn question_from_row(row: &SqliteRow) -> Result<Question, StoreError> {
    let pub_date = parse_db_timestamp(&row.get::<String, _>("pub_date"))?;
    Ok(Question {
        id: QuestionId(row.get::<String, _>("id")),
        text: row.get::<String, _>("question_text"),
        pub_date,
        votes: row.get::<i64, _>("votes"),
    })
}

fn choice_from_row(row: &SqliteRow) -> Choice {
    Choice {
        id: ChoiceId(row.get::<String, _>("id")),
        question_id: QuestionId(row.get::<String, _>("question_id")),
        text: row.get::<String, _>("choice_text"),
        votes: row.get::<i64, _>("votes"),
        ratio: row.get::<f64, _>("ratio"),
    }
}

impl Database {
    pub async fn new(db_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Private in-memory database; a single connection so every query sees the same data.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<std::time::Duration>)
            .max_lifetime(None::<std::time::Duration>)
            .connect("sqlite::memory:")
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                id TEXT PRIMARY KEY,
                question_text TEXT NOT NULL,
                pub_date TEXT NOT NULL,
                votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS choices (
                id TEXT PRIMARY KEY,
                question_id TEXT NOT NULL,
                choice_text TEXT NOT NULL,
                votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0),
                ratio REAL NOT NULL DEFAULT 0,
                position INTEGER NOT NULL,
                FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS questions_pub_date ON questions (pub_date)")
            .execute(pool)
            .await?;

        debug!("Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl EntityStore for Database {
    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, question_text, pub_date, votes
            FROM questions
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(question_from_row).transpose()
    }

    async fn get_published_question(
        &self,
        id: &QuestionId,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, question_text, pub_date, votes
            FROM questions
            WHERE id = ? AND pub_date <= ?
            "#,
        )
        .bind(id.as_str())
        .bind(to_db_timestamp(now))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(question_from_row).transpose()
    }

    async fn latest_published_questions(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Question>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, question_text, pub_date, votes
            FROM questions
            WHERE pub_date <= ?
            ORDER BY pub_date DESC
            LIMIT ?
            "#,
        )
        .bind(to_db_timestamp(now))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(question_from_row)
        .collect()
    }

    async fn get_choice(
        &self,
        id: &ChoiceId,
        question_id: &QuestionId,
    ) -> Result<Option<Choice>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, question_id, choice_text, votes, ratio
            FROM choices
            WHERE id = ? AND question_id = ?
            "#,
        )
        .bind(id.as_str())
        .bind(question_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(choice_from_row))
    }

    async fn list_choices(&self, question_id: &QuestionId) -> Result<Vec<Choice>, StoreError> {
        let choices = sqlx::query(
            r#"
            SELECT id, question_id, choice_text, votes, ratio
            FROM choices
            WHERE question_id = ?
            ORDER BY position
            "#,
        )
        .bind(question_id.as_str())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(choice_from_row)
        .collect();

        Ok(choices)
    }

    async fn save_vote_outcome(&self, question: &Question, choices: &[Choice]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE questions SET votes = ? WHERE id = ?")
            .bind(question.votes)
            .bind(question.id.as_str())
            .execute(&mut *tx)
            .await?;

        for choice in choices {
            sqlx::query("UPDATE choices SET votes = ?, ratio = ? WHERE id = ? AND question_id = ?")
                .bind(choice.votes)
                .bind(choice.ratio)
                .bind(choice.id.as_str())
                .bind(question.id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!("Saved vote outcome for question {} ({} votes)", question.id, question.votes);
        Ok(())
    }

    async fn create_question(&self, text: &str, pub_date: DateTime<Utc>) -> Result<Question, StoreError> {
        let question = Question::new(text.to_string(), pub_date);

        sqlx::query(
            r#"
            INSERT INTO questions (id, question_text, pub_date, votes)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(question.id.as_str())
        .bind(&question.text)
        .bind(to_db_timestamp(question.pub_date))
        .bind(question.votes)
        .execute(&self.pool)
        .await?;

        Ok(question)
    }

    async fn add_choice(&self, question_id: &QuestionId, text: &str) -> Result<Choice, StoreError> {
        let choice = Choice::new(question_id.clone(), text.to_string());

        let position: i64 = sqlx::query("SELECT COUNT(*) AS n FROM choices WHERE question_id = ?")
            .bind(question_id.as_str())
            .fetch_one(&self.pool)
            .await?
            .get("n");

        sqlx::query(
            r#"
            INSERT INTO choices (id, question_id, choice_text, votes, ratio, position)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(choice.id.as_str())
        .bind(question_id.as_str())
        .bind(&choice.text)
        .bind(choice.votes)
        .bind(choice.ratio)
        .bind(position)
        .execute(&self.pool)
        .await?;

        Ok(choice)
    }
}
