//! Work-item lifecycle: creation, assignment fan-out, submissions,
//! grading and quiz import.

#![warn(missing_docs)]

pub mod import;
pub mod items;
pub mod submissions;

pub use import::{ParsedQuestion, QuizImporter, QuizStructurer};
pub use items::{
    AssignmentSpec, BasicWorkItemManager, QuestionSpec, QuizSpec, TaskSpec, TaskTemplateUpdate,
    WorkItemManager,
};
pub use submissions::{BasicSubmissionManager, SubmissionManager, Upload};
