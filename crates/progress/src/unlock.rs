//! Sequential task unlocking.
//!
//! Within one internship, tasks unlock in (week_number, id) order: the
//! first is always open, each later one opens once its predecessor's due
//! date has elapsed. Completion of the predecessor is deliberately not
//! required, and a task without a due date never blocks its successor.
//! The view is recomputed on every read and never persisted.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use skilltrack_core::{InternshipId, Result, ScopeId, Task, TaskId, TaskStatus, UserId};
use skilltrack_storage::Storage;

/// Unlock state of one task in its sequence.
#[derive(Debug, Clone, Serialize)]
pub struct SequencedTask {
    /// The task
    pub task_id: TaskId,

    /// Week the task belongs to
    pub week_number: u32,

    /// Whether the sequence has reached this task
    pub is_unlocked: bool,

    /// Whether the task itself is done
    pub is_submitted: bool,
}

/// Compute unlock state for a batch of tasks as of `today`.
///
/// Tasks are grouped by internship; tasks outside internship scopes are
/// ignored. Each group is ordered by (week_number, id) and sequenced
/// independently. Output keeps that order, groups in internship-id order.
pub fn sequence_tasks(tasks: &[Task], today: NaiveDate) -> Vec<SequencedTask> {
    let mut groups: BTreeMap<InternshipId, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(internship_id) = task.scope.internship() {
            groups.entry(internship_id).or_default().push(task);
        }
    }

    let mut out = Vec::with_capacity(tasks.len());
    for group in groups.into_values() {
        let mut group = group;
        group.sort_by_key(|t| (t.week_number, t.id));

        let mut previous_elapsed = true; // first task is always unlocked
        for task in group {
            out.push(SequencedTask {
                task_id: task.id,
                week_number: task.week_number,
                is_unlocked: previous_elapsed,
                is_submitted: task.status == TaskStatus::Completed,
            });
            // Missing due date counts as elapsed (fail-open).
            previous_elapsed = match task.due_date {
                Some(due) => today > due,
                None => true,
            };
        }
    }
    out
}

/// One row of the member-facing task board: sequencing state joined with
/// the member's submission, if any.
#[derive(Debug, Clone, Serialize)]
pub struct TaskBoardRow {
    /// The task
    pub task_id: TaskId,

    /// Task title
    pub title: String,

    /// Week the task belongs to
    pub week_number: u32,

    /// Whether the sequence has reached this task
    pub is_unlocked: bool,

    /// Whether the task itself is done
    pub is_submitted: bool,

    /// Grade from the member's submission, if graded
    pub grade: Option<String>,

    /// Feedback from the member's submission, if any
    pub feedback: Option<String>,
}

/// Task board service.
#[async_trait]
pub trait UnlockSequencer: Send + Sync {
    /// Build the task board for a user's internship tasks as of `today`.
    async fn task_board(&self, user_id: UserId, today: NaiveDate) -> Result<Vec<TaskBoardRow>>;
}

/// Basic sequencer implementation over a storage handle.
pub struct BasicUnlockSequencer<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> BasicUnlockSequencer<S> {
    /// Create a new sequencer.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }
}

#[async_trait]
impl<S: Storage + 'static> UnlockSequencer for BasicUnlockSequencer<S> {
    async fn task_board(&self, user_id: UserId, today: NaiveDate) -> Result<Vec<TaskBoardRow>> {
        let tasks = self.storage.list_tasks_for_user(user_id).await?;
        let sequenced = sequence_tasks(&tasks, today);

        let mut rows = Vec::with_capacity(sequenced.len());
        for entry in sequenced {
            let task = tasks
                .iter()
                .find(|t| t.id == entry.task_id)
                .ok_or_else(|| skilltrack_core::EngineError::NotFound(format!(
                    "task {}", entry.task_id
                )))?;
            let submission = self
                .storage
                .find_task_submission(entry.task_id, user_id)
                .await?;
            rows.push(TaskBoardRow {
                task_id: entry.task_id,
                title: task.title.clone(),
                week_number: entry.week_number,
                is_unlocked: entry.is_unlocked,
                is_submitted: entry.is_submitted,
                grade: submission.as_ref().and_then(|s| s.grade.clone()),
                feedback: submission.and_then(|s| s.feedback),
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltrack_core::TaskPriority;

    fn task(
        scope: ScopeId,
        week: u32,
        due: Option<(i32, u32, u32)>,
        status: TaskStatus,
    ) -> Task {
        Task {
            id: TaskId::new(),
            scope,
            title: format!("week {week}"),
            description: String::new(),
            week_number: week,
            due_date: due.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            status,
            priority: TaskPriority::Medium,
            assigned_to: UserId::new(),
            assigned_by: UserId::new(),
            created_at: chrono::Utc::now(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn first_task_is_always_unlocked() {
        let scope = ScopeId::Internship(InternshipId::new());
        let tasks = vec![task(scope, 1, Some((2026, 9, 1)), TaskStatus::Pending)];
        let view = sequence_tasks(&tasks, day(2026, 8, 1));
        assert!(view[0].is_unlocked);
        assert!(!view[0].is_submitted);
    }

    #[tokio::test]
    async fn successor_waits_for_predecessor_due_date() {
        let scope = ScopeId::Internship(InternshipId::new());
        let tasks = vec![
            task(scope, 1, Some((2026, 8, 10)), TaskStatus::Pending),
            task(scope, 2, Some((2026, 8, 17)), TaskStatus::Pending),
        ];

        // On the due date itself the successor is still locked.
        let view = sequence_tasks(&tasks, day(2026, 8, 10));
        assert!(!view[1].is_unlocked);

        // Strictly past it, the successor opens even though week 1 was
        // never completed.
        let view = sequence_tasks(&tasks, day(2026, 8, 11));
        assert!(view[1].is_unlocked);
    }

    #[tokio::test]
    async fn missing_due_date_fails_open() {
        let scope = ScopeId::Internship(InternshipId::new());
        let tasks = vec![
            task(scope, 1, None, TaskStatus::Pending),
            task(scope, 2, Some((2026, 12, 31)), TaskStatus::Pending),
        ];
        let view = sequence_tasks(&tasks, day(2026, 8, 1));
        assert!(view[1].is_unlocked);
    }

    #[tokio::test]
    async fn group_boundary_restarts_the_sequence() {
        let a = ScopeId::Internship(InternshipId::new());
        let b = ScopeId::Internship(InternshipId::new());
        let tasks = vec![
            task(a, 1, Some((2026, 12, 31)), TaskStatus::Pending),
            task(a, 2, None, TaskStatus::Pending),
            task(b, 1, None, TaskStatus::Completed),
        ];
        let view = sequence_tasks(&tasks, day(2026, 8, 1));

        let by_week: Vec<(u32, bool, bool)> = view
            .iter()
            .map(|v| (v.week_number, v.is_unlocked, v.is_submitted))
            .collect();

        // Each group's first task is unlocked; a's week 2 is blocked by
        // the far-future due date of week 1.
        assert_eq!(by_week.iter().filter(|(w, u, _)| *w == 1 && *u).count(), 2);
        assert!(by_week.contains(&(2, false, false)));
        assert!(by_week.contains(&(1, true, true)));
    }

    #[tokio::test]
    async fn ties_in_week_number_break_by_id() {
        let scope = ScopeId::Internship(InternshipId::new());
        let mut first = task(scope, 1, Some((2026, 12, 31)), TaskStatus::Pending);
        let mut second = task(scope, 1, None, TaskStatus::Pending);
        if second.id < first.id {
            std::mem::swap(&mut first, &mut second);
        }
        let first_id = first.id;

        // Input order must not matter.
        let view = sequence_tasks(&[second.clone(), first.clone()], day(2026, 8, 1));
        assert_eq!(view[0].task_id, first_id);
        assert!(view[0].is_unlocked);
        assert!(!view[1].is_unlocked);
    }

    #[tokio::test]
    async fn board_joins_submission_grade() {
        use skilltrack_core::TaskSubmission;

        let mut storage = skilltrack_storage::MemoryStorage::new();
        let scope = ScopeId::Internship(InternshipId::new());
        let user_id = UserId::new();

        let mut t = task(scope, 1, None, TaskStatus::Completed);
        t.assigned_to = user_id;
        storage.save_task(&t).await.unwrap();

        let mut submission = TaskSubmission::new(t.id, user_id, Some("file://report.pdf".into()));
        submission.grade = Some("A".into());
        submission.feedback = Some("solid".into());
        storage.save_task_submission(&submission).await.unwrap();

        let sequencer = BasicUnlockSequencer::new(storage);
        let board = sequencer.task_board(user_id, day(2026, 8, 1)).await.unwrap();
        assert_eq!(board.len(), 1);
        assert!(board[0].is_submitted);
        assert_eq!(board[0].grade.as_deref(), Some("A"));
        assert_eq!(board[0].feedback.as_deref(), Some("solid"));
    }
}
