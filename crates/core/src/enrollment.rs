//! Memberships: enrollments and the legacy per-course progress record.

use serde::{Deserialize, Serialize};

use crate::catalog::ScopeId;
use crate::id::{CourseId, EnrollmentId, ProgressRecordId, UserId};
use crate::Time;

/// Membership of a user in exactly one course or internship.
///
/// At most one row may exist per (user, scope); services check before
/// inserting and the storage layer rejects duplicates as a backstop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unique identifier
    pub id: EnrollmentId,

    /// The enrolled user
    pub user_id: UserId,

    /// The course or internship joined
    pub scope: ScopeId,

    /// When the membership was created
    pub enrolled_at: Time,
}

impl Enrollment {
    /// Create a membership dated now.
    pub fn new(user_id: UserId, scope: ScopeId) -> Self {
        Self {
            id: EnrollmentId::new(),
            user_id,
            scope,
            enrolled_at: chrono::Utc::now(),
        }
    }
}

/// Legacy per-course progress row.
///
/// Kept for two reasons: the enrollment resolver unions these course ids
/// with Enrollment rows, and trainers read the denormalized counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Unique identifier
    pub id: ProgressRecordId,

    /// Tracked user
    pub user_id: UserId,

    /// Tracked course
    pub course_id: CourseId,

    /// Last computed percentage, 0..=100
    pub progress: u8,

    /// Coarse status
    pub status: ProgressStatus,

    /// Denormalized count of submitted assignments
    pub assignments_completed: u32,

    /// Denormalized count of assignments in the course
    pub total_assignments: u32,

    /// Last write timestamp
    pub updated_at: Time,
}

impl ProgressRecord {
    /// Create a fresh record for a new enrollment.
    pub fn new(user_id: UserId, course_id: CourseId) -> Self {
        Self {
            id: ProgressRecordId::new(),
            user_id,
            course_id,
            progress: 0,
            status: ProgressStatus::Enrolled,
            assignments_completed: 0,
            total_assignments: 0,
            updated_at: chrono::Utc::now(),
        }
    }
}

/// Coarse progress status shown to trainers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStatus {
    /// Just enrolled, nothing computed yet
    Enrolled,
    /// Below 100%
    OnTrack,
    /// Reached 100%
    Completed,
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProgressStatus::Enrolled => "Enrolled",
            ProgressStatus::OnTrack => "On Track",
            ProgressStatus::Completed => "Completed",
        };
        f.write_str(s)
    }
}
