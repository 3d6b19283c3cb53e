//! Shared course work items: assignments and quizzes.
//!
//! Unlike tasks these are not per-user; one Assignment/Quiz row serves the
//! whole course and completion is tracked through submissions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{AssignmentId, CourseId, QuestionId, QuizId};
use crate::Time;

/// A course assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique identifier
    pub id: AssignmentId,

    /// Owning course
    pub course_id: CourseId,

    /// Title
    pub title: String,

    /// Week the assignment belongs to, 1-based (auto-assigned on create)
    pub week_number: u32,

    /// Deadline, if any. Late submissions are accepted regardless.
    pub due_date: Option<NaiveDate>,

    /// Whether students can see it
    pub is_released: bool,

    /// Creation timestamp
    pub created_at: Time,
}

/// A course quiz with embedded questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier
    pub id: QuizId,

    /// Owning course
    pub course_id: CourseId,

    /// Title
    pub title: String,

    /// Week the quiz belongs to, 1-based (auto-assigned on create)
    pub week_number: u32,

    /// Deadline, if any
    pub deadline: Option<NaiveDate>,

    /// The questions, in presentation order
    pub questions: Vec<Question>,

    /// Creation timestamp
    pub created_at: Time,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier
    pub id: QuestionId,

    /// Question text
    pub text: String,

    /// The four options, indexed A..D
    pub options: [String; 4],

    /// The correct option
    pub correct: AnswerLetter,
}

/// One of the four quiz answer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLetter {
    /// Option A
    A,
    /// Option B
    B,
    /// Option C
    C,
    /// Option D
    D,
}

impl AnswerLetter {
    /// Index into [`Question::options`].
    pub fn index(self) -> usize {
        match self {
            AnswerLetter::A => 0,
            AnswerLetter::B => 1,
            AnswerLetter::C => 2,
            AnswerLetter::D => 3,
        }
    }
}

impl std::fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnswerLetter::A => "A",
            AnswerLetter::B => "B",
            AnswerLetter::C => "C",
            AnswerLetter::D => "D",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for AnswerLetter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(AnswerLetter::A),
            "B" => Ok(AnswerLetter::B),
            "C" => Ok(AnswerLetter::C),
            "D" => Ok(AnswerLetter::D),
            other => Err(format!("not an answer letter: {other:?}")),
        }
    }
}
