//! SkillTrack core data models.
//!
//! This crate defines the entities shared by every service in the
//! progress engine: users, catalog items (courses and internships),
//! enrollments, per-user tasks, work items, submissions and certificates.

#![warn(missing_docs)]

// Core identities
mod id;

// People and access
mod user;

// Catalog (courses, internships, resources)
mod catalog;
mod duration;

// Memberships
mod enrollment;

// Work items and per-user instances
mod task;
mod work_item;
mod submission;

// Completion artifacts
mod certificate;

// Parsing helpers
mod grade;

// Errors
mod error;

// Re-exports
pub use id::*;

pub use user::{Actor, Role, User};

pub use catalog::{Course, Internship, Resource, ScopeId};
pub use duration::{DurationUnit, ProgramDuration};

pub use enrollment::{Enrollment, ProgressRecord, ProgressStatus};

pub use task::{Task, TaskPriority, TaskStatus};
pub use work_item::{AnswerLetter, Assignment, Question, Quiz};
pub use submission::{QuizSubmission, Submission, TaskSubmission};

pub use certificate::Certificate;

pub use grade::grade_to_points;

pub use error::{EngineError, LimitKind, MissingItems, Result};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
