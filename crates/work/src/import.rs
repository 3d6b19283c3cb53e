//! Quiz import from raw text.
//!
//! Structuring free text into questions is delegated to a collaborator
//! (an LLM-backed one in production); the engine only validates required
//! fields and routes the result through the same cap and week-numbering
//! path as a hand-built quiz.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use skilltrack_core::{Actor, AnswerLetter, CourseId, EngineError, Quiz, Result, Role};
use skilltrack_storage::Storage;
use tokio::sync::Mutex;
use tracing::info;

use crate::items::{insert_quiz, QuestionSpec};

/// A question as recovered from raw text.
#[derive(Debug, Clone)]
pub struct ParsedQuestion {
    /// Question text
    pub text: String,

    /// The four options
    pub options: [String; 4],

    /// The correct option
    pub correct: AnswerLetter,
}

/// Turns raw text into structured questions.
#[async_trait]
pub trait QuizStructurer: Send + Sync {
    /// Recover questions from raw text. Failure to structure is reported
    /// as a [`EngineError::Validation`] by implementors.
    async fn structure(&self, raw: &str) -> Result<Vec<ParsedQuestion>>;
}

/// Quiz import service.
pub struct QuizImporter<S: Storage, Q: QuizStructurer> {
    storage: Arc<Mutex<S>>,
    structurer: Q,
}

impl<S: Storage, Q: QuizStructurer> QuizImporter<S, Q> {
    /// Create a new importer.
    pub fn new(storage: S, structurer: Q) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            structurer,
        }
    }

    /// Import a quiz from raw text into a course.
    pub async fn import_quiz(
        &mut self,
        actor: Actor,
        course_id: CourseId,
        title: String,
        deadline: Option<NaiveDate>,
        raw: &str,
    ) -> Result<Quiz> {
        if actor.role != Role::Trainer {
            return Err(EngineError::Authorization("only trainers import quizzes".into()));
        }
        if raw.trim().is_empty() {
            return Err(EngineError::Validation("nothing to import".into()));
        }

        let parsed = self.structurer.structure(raw).await?;
        let questions = parsed
            .into_iter()
            .map(|q| QuestionSpec {
                text: q.text,
                options: q.options,
                correct: q.correct,
            })
            .collect();

        let mut storage = self.storage.lock().await;
        let course = storage
            .load_course(course_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("course {course_id}")))?;

        let quiz = insert_quiz(&mut *storage, &course, title, deadline, questions).await?;
        storage
            .commit(&format!("import quiz into course {course_id}"))
            .await?;

        info!(%course_id, quiz_id = %quiz.id, questions = quiz.questions.len(), "imported quiz");
        Ok(quiz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltrack_core::{Course, ProgramDuration, UserId};
    use skilltrack_storage::MemoryStorage;

    struct StubStructurer {
        questions: usize,
    }

    #[async_trait]
    impl QuizStructurer for StubStructurer {
        async fn structure(&self, _raw: &str) -> Result<Vec<ParsedQuestion>> {
            if self.questions == 0 {
                return Err(EngineError::Validation("could not structure text".into()));
            }
            Ok((0..self.questions)
                .map(|i| ParsedQuestion {
                    text: format!("question {i}"),
                    options: ["a".into(), "b".into(), "c".into(), "d".into()],
                    correct: AnswerLetter::B,
                })
                .collect())
        }
    }

    fn course(quiz_limit: Option<u32>) -> Course {
        Course {
            id: CourseId::new(),
            name: "Rust Basics".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            mentor_name: "Priya".into(),
            duration: ProgramDuration::default(),
            assignment_limit: None,
            quiz_limit,
            created_at: chrono::Utc::now(),
        }
    }

    fn trainer() -> Actor {
        Actor::new(UserId::new(), Role::Trainer)
    }

    #[tokio::test]
    async fn imported_quiz_lands_in_the_course() {
        let mut storage = MemoryStorage::new();
        let c = course(None);
        storage.save_course(&c).await.unwrap();

        let reader = storage.clone();
        let mut importer = QuizImporter::new(storage, StubStructurer { questions: 3 });
        let quiz = importer
            .import_quiz(trainer(), c.id, "Imported".into(), None, "raw text")
            .await
            .unwrap();

        assert_eq!(quiz.questions.len(), 3);
        assert_eq!(quiz.week_number, 1);
        assert_eq!(reader.list_quizzes_in_course(c.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn structurer_failure_surfaces_as_validation() {
        let mut storage = MemoryStorage::new();
        let c = course(None);
        storage.save_course(&c).await.unwrap();

        let mut importer = QuizImporter::new(storage, StubStructurer { questions: 0 });
        let err = importer
            .import_quiz(trainer(), c.id, "Imported".into(), None, "raw text")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn import_respects_the_quiz_cap() {
        let mut storage = MemoryStorage::new();
        let c = course(Some(1));
        storage.save_course(&c).await.unwrap();

        let mut importer = QuizImporter::new(storage, StubStructurer { questions: 1 });
        importer
            .import_quiz(trainer(), c.id, "First".into(), None, "raw")
            .await
            .unwrap();
        let err = importer
            .import_quiz(trainer(), c.id, "Second".into(), None, "raw")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::LimitReached { .. }));
    }
}
