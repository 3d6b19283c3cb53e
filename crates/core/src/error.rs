//! Domain error type shared by all engine services.

use crate::catalog::ScopeId;

/// Result alias over [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Which trainer-defined cap a conflicting write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Course assignment cap
    Assignments,
    /// Course quiz cap
    Quizzes,
    /// Internship weekly task-round cap
    Tasks,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LimitKind::Assignments => "assignment",
            LimitKind::Quizzes => "quiz",
            LimitKind::Tasks => "task",
        };
        f.write_str(s)
    }
}

/// Item counts still outstanding when a certificate was requested early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissingItems {
    /// Assignments short of the required total
    pub assignments: u32,
    /// Quizzes short of the required total
    pub quizzes: u32,
    /// Tasks short of the required total
    pub tasks: u32,
}

impl MissingItems {
    /// True when nothing is outstanding.
    pub fn is_empty(&self) -> bool {
        self.assignments == 0 && self.quizzes == 0 && self.tasks == 0
    }
}

impl std::fmt::Display for MissingItems {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} assignment(s), {} quiz(zes), {} task(s) outstanding",
            self.assignments, self.quizzes, self.tasks
        )
    }
}

/// Errors produced by engine operations. Write operations reject before
/// mutating; read-only aggregation degrades instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A required field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The caller's role or ownership does not permit the operation.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A duplicate write, or a trainer-defined cap was hit. Carries the
    /// specific limit so the response can name it.
    #[error("limit reached: at most {limit} {kind}(s) allowed in {scope}")]
    LimitReached {
        /// Which cap
        kind: LimitKind,
        /// The cap value
        limit: u32,
        /// The scope carrying the cap
        scope: ScopeId,
    },

    /// A duplicate enrollment or quiz submission.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Certificate requested below full completion.
    #[error("certificate locked: {0}")]
    State(MissingItems),

    /// Storage layer failure.
    #[error("storage error: {0}")]
    Storage(String),
}
