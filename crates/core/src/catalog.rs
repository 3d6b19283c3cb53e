//! Catalog entities: courses, internships and their attached resources.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::duration::ProgramDuration;
use crate::id::{CourseId, InternshipId, ResourceId};
use crate::Time;

/// The course or internship a work item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeId {
    /// A course scope
    Course(CourseId),
    /// An internship scope
    Internship(InternshipId),
}

impl ScopeId {
    /// Course id, if this is a course scope.
    pub fn course(self) -> Option<CourseId> {
        match self {
            ScopeId::Course(id) => Some(id),
            ScopeId::Internship(_) => None,
        }
    }

    /// Internship id, if this is an internship scope.
    pub fn internship(self) -> Option<InternshipId> {
        match self {
            ScopeId::Internship(id) => Some(id),
            ScopeId::Course(_) => None,
        }
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeId::Course(id) => write!(f, "course:{id}"),
            ScopeId::Internship(id) => write!(f, "internship:{id}"),
        }
    }
}

/// A course offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// Course name
    pub name: String,

    /// First day of the course
    pub start_date: NaiveDate,

    /// Mentor display name. Denormalized on purpose: mentors are matched
    /// by name, not by foreign key, so deleting a trainer never orphans
    /// the course.
    pub mentor_name: String,

    /// Program length
    pub duration: ProgramDuration,

    /// Trainer-defined assignment cap (set once; None = unlimited)
    pub assignment_limit: Option<u32>,

    /// Trainer-defined quiz cap (set once; None = unlimited)
    pub quiz_limit: Option<u32>,

    /// Creation timestamp
    pub created_at: Time,
}

/// An internship program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Internship {
    /// Unique identifier
    pub id: InternshipId,

    /// Program title
    pub title: String,

    /// Mentor display name (denormalized, see [`Course::mentor_name`])
    pub mentor_name: String,

    /// Program length
    pub duration: ProgramDuration,

    /// Trainer-defined cap on weekly task rounds (set once; None = derive
    /// from duration)
    pub task_limit: Option<u32>,

    /// Creation timestamp
    pub created_at: Time,
}

/// A learning resource attached to a course or internship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier
    pub id: ResourceId,

    /// Owning scope
    pub scope: ScopeId,

    /// Resource title
    pub title: String,

    /// Free-text kind ("book", "youtube", "article", a MIME type, ...)
    pub kind: String,

    /// Relative URL
    pub url: String,

    /// Creation timestamp
    pub created_at: Time,
}
