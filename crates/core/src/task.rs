//! Per-user task instances.
//!
//! There is no shared task template entity: a "template" is the first-seen
//! task sharing a (scope, title). The propagator in the enrollment crate
//! clones from that representative when a new user joins the scope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::ScopeId;
use crate::id::{TaskId, UserId};
use crate::Time;

/// A work task assigned to one user inside one scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Owning course or internship
    pub scope: ScopeId,

    /// Task title. (scope, title) identifies the inferred template; the
    /// store rejects a second task with the same (user, scope, title).
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Week the task belongs to, 1-based
    pub week_number: u32,

    /// Deadline, if any. A missing deadline counts as elapsed for the
    /// unlock sequencer (fail-open).
    pub due_date: Option<NaiveDate>,

    /// Current status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// User the instance belongs to
    pub assigned_to: UserId,

    /// Trainer who created the work
    pub assigned_by: UserId,

    /// Creation timestamp
    pub created_at: Time,
}

impl Task {
    /// Clone this task as a fresh Pending instance for another user.
    /// Everything except identity, ownership and status carries over.
    pub fn reassigned_to(&self, user_id: UserId) -> Self {
        Self {
            id: TaskId::new(),
            scope: self.scope,
            title: self.title.clone(),
            description: self.description.clone(),
            week_number: self.week_number,
            due_date: self.due_date,
            status: TaskStatus::Pending,
            priority: self.priority,
            assigned_to: user_id,
            assigned_by: self.assigned_by,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Assigned, not started
    Pending,
    /// Being worked on
    InProgress,
    /// Handed in, awaiting review
    Submitted,
    /// Done
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Submitted => "Submitted",
            TaskStatus::Completed => "Completed",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(' ', "").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "inprogress" => Ok(TaskStatus::InProgress),
            "submitted" => Ok(TaskStatus::Submitted),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    /// Can slip
    Low,
    /// Default
    Medium,
    /// Blocks the week
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}
