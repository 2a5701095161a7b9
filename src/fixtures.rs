use chrono::{DateTime, Datelike, Utc};
use log::info;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::db::EntityStore;
use crate::error::StoreError;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid fixture file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("pub_date {pub_date} of '{question}' is outside years 0000-9999")]
    DateOutOfRange {
        question: String,
        pub_date: DateTime<Utc>,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One question and its choices, as written in a fixture file.
#[derive(Debug, Deserialize)]
pub struct QuestionFixture {
    pub question: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub choices: Vec<String>,
}

pub fn parse(raw: &str) -> Result<Vec<QuestionFixture>, FixtureError> {
    Ok(serde_json::from_str(raw)?)
}

// Stored timestamps are compared as text, which only orders four-digit years.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

/// Creates every question and choice in `fixtures`, returning how many questions were added.
///
/// Nothing is written if any `pub_date` falls outside [`YEAR_RANGE`].
pub async fn load(store: &dyn EntityStore, fixtures: &[QuestionFixture]) -> Result<usize, FixtureError> {
    if let Some(bad) = fixtures.iter().find(|f| !YEAR_RANGE.contains(&f.pub_date.year())) {
        return Err(FixtureError::DateOutOfRange {
            question: bad.question.clone(),
            pub_date: bad.pub_date,
        });
    }

    for fixture in fixtures {
        let question = store.create_question(&fixture.question, fixture.pub_date).await?;
        for text in &fixture.choices {
            store.add_choice(&question.id, text).await?;
        }
        info!("Loaded question {} with {} choice(s)", question.id, fixture.choices.len());
    }
    Ok(fixtures.len())
}

pub async fn load_file(store: &dyn EntityStore, path: &Path) -> Result<usize, FixtureError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load(store, &parse(&raw)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"[
        {
            "question": "What should we watch on Friday?",
            "pub_date": "2024-03-01T18:00:00Z",
            "choices": ["Alien", "Brazil", "Casablanca"]
        },
        { "question": "Popcorn or nachos?", "pub_date": "2024-03-02T18:00:00Z" }
    ]"#;

    #[tokio::test]
    async fn loads_questions_and_choices() {
        let store = MemoryStore::new();
        let fixtures = parse(SAMPLE).unwrap();

        let loaded = load(&store, &fixtures).await.unwrap();

        assert_eq!(loaded, 2);
        let now = "2024-03-03T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let questions = store.latest_published_questions(now, 5).await.unwrap();
        assert_eq!(questions[0].text, "Popcorn or nachos?");
        assert_eq!(questions[1].text, "What should we watch on Friday?");
        assert!(store.list_choices(&questions[0].id).await.unwrap().is_empty());
        assert_eq!(store.list_choices(&questions[1].id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn rejects_five_digit_years_before_writing() {
        let store = MemoryStore::new();
        let fixtures = vec![
            QuestionFixture {
                question: "Fine".to_string(),
                pub_date: Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
                choices: vec!["A".to_string()],
            },
            QuestionFixture {
                question: "Far future".to_string(),
                pub_date: Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap(),
                choices: Vec::new(),
            },
        ];

        let err = load(&store, &fixtures).await.unwrap_err();

        assert!(matches!(err, FixtureError::DateOutOfRange { ref question, .. } if question == "Far future"));
        let now = "9999-12-31T23:59:59Z".parse::<DateTime<Utc>>().unwrap();
        assert!(store.latest_published_questions(now, 5).await.unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse("[{\"question\": 1}]"), Err(FixtureError::Parse(_))));
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let store = MemoryStore::new();
        let err = load_file(&store, Path::new("/nonexistent/fixtures.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, FixtureError::Io { .. }));
    }
}
