//! Unique identifiers for SkillTrack entities.
//!
//! All ids are ULIDs. They are `Ord` because the unlock sequencer relies
//! on a total (week_number, id) ordering within an internship group.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(Ulid);

        impl $name {
            /// Generate a new id.
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a User
    UserId
);
entity_id!(
    /// Unique identifier for a Course
    CourseId
);
entity_id!(
    /// Unique identifier for an Internship
    InternshipId
);
entity_id!(
    /// Unique identifier for an Enrollment
    EnrollmentId
);
entity_id!(
    /// Unique identifier for a legacy per-course progress record
    ProgressRecordId
);
entity_id!(
    /// Unique identifier for a per-user Task instance
    TaskId
);
entity_id!(
    /// Unique identifier for an Assignment
    AssignmentId
);
entity_id!(
    /// Unique identifier for a Quiz
    QuizId
);
entity_id!(
    /// Unique identifier for a quiz Question
    QuestionId
);
entity_id!(
    /// Unique identifier for an assignment Submission
    SubmissionId
);
entity_id!(
    /// Unique identifier for a TaskSubmission
    TaskSubmissionId
);
entity_id!(
    /// Unique identifier for a QuizSubmission
    QuizSubmissionId
);
entity_id!(
    /// Unique identifier for a Certificate
    CertificateId
);
entity_id!(
    /// Unique identifier for a course/internship Resource
    ResourceId
);
