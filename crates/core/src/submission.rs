//! Submission records for the three work-item kinds.

use serde::{Deserialize, Serialize};

use crate::id::{
    AssignmentId, QuizId, QuizSubmissionId, SubmissionId, TaskId, TaskSubmissionId, UserId,
};
use crate::Time;

/// A student's hand-in for a course assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Unique identifier
    pub id: SubmissionId,

    /// The assignment submitted against
    pub assignment_id: AssignmentId,

    /// Submitting student
    pub student_id: UserId,

    /// Relative URL of the uploaded file
    pub file_url: Option<String>,

    /// When it was handed in
    pub submitted_at: Time,

    /// Trainer feedback
    pub feedback: Option<String>,

    /// Trainer-assigned grade, free text ("A", "90/100", ...)
    pub grade: Option<String>,

    /// Review status, free text ("Pending", "Approved", ...)
    pub status: String,
}

impl Submission {
    /// Create a pending submission dated now.
    pub fn new(assignment_id: AssignmentId, student_id: UserId, file_url: Option<String>) -> Self {
        Self {
            id: SubmissionId::new(),
            assignment_id,
            student_id,
            file_url,
            submitted_at: chrono::Utc::now(),
            feedback: None,
            grade: None,
            status: "Pending".to_string(),
        }
    }
}

/// An intern's hand-in for a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSubmission {
    /// Unique identifier
    pub id: TaskSubmissionId,

    /// The task completed
    pub task_id: TaskId,

    /// Submitting user
    pub student_id: UserId,

    /// Relative URL of the uploaded file, if one was attached
    pub file_url: Option<String>,

    /// When it was handed in (refreshed on re-completion)
    pub submitted_at: Time,

    /// Trainer feedback
    pub feedback: Option<String>,

    /// Trainer-assigned grade, free text
    pub grade: Option<String>,

    /// Review status, free text
    pub status: String,
}

impl TaskSubmission {
    /// Create a pending task submission dated now.
    pub fn new(task_id: TaskId, student_id: UserId, file_url: Option<String>) -> Self {
        Self {
            id: TaskSubmissionId::new(),
            task_id,
            student_id,
            file_url,
            submitted_at: chrono::Utc::now(),
            feedback: None,
            grade: None,
            status: "Pending".to_string(),
        }
    }
}

/// A scored quiz attempt. One per (student, quiz).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSubmission {
    /// Unique identifier
    pub id: QuizSubmissionId,

    /// The quiz attempted
    pub quiz_id: QuizId,

    /// Submitting student
    pub student_id: UserId,

    /// Correct answers
    pub score: u32,

    /// Questions in the quiz at submission time
    pub total_questions: u32,

    /// When it was handed in
    pub submitted_at: Time,
}

impl QuizSubmission {
    /// Record a scored attempt dated now.
    pub fn new(quiz_id: QuizId, student_id: UserId, score: u32, total_questions: u32) -> Self {
        Self {
            id: QuizSubmissionId::new(),
            quiz_id,
            student_id,
            score,
            total_questions,
            submitted_at: chrono::Utc::now(),
        }
    }

    /// Score as a percentage; None when the quiz had no questions.
    pub fn percentage(&self) -> Option<f32> {
        if self.total_questions == 0 {
            None
        } else {
            Some(self.score as f32 / self.total_questions as f32 * 100.0)
        }
    }
}
