//! Task template propagation.
//!
//! Templates are inferred, not stored: the representative of each distinct
//! (scope, title) is the earliest-created task carrying it, whoever it
//! belongs to. Joining a scope clones one Pending instance per template
//! the user does not already hold.

use std::collections::BTreeMap;

use skilltrack_core::{Result, ScopeId, Task, UserId};
use skilltrack_storage::{Storage, StorageError};
use tracing::debug;

/// Give `user_id` one task per distinct (scope, title) observed in the
/// scope. Returns how many instances were created.
///
/// Idempotent: titles the user already holds are skipped, and a losing
/// race against a concurrent propagation for the same user is treated as
/// already-done rather than an error. A scope with no tasks is a no-op.
pub async fn propagate_templates<S: Storage>(
    storage: &mut S,
    user_id: UserId,
    scope: ScopeId,
) -> Result<u32> {
    let existing = storage.list_tasks_in_scope(scope).await?;
    if existing.is_empty() {
        return Ok(0);
    }

    // Earliest instance per title is the representative; a peer's task is
    // as good a template as the creator's own.
    let mut representatives: BTreeMap<String, Task> = BTreeMap::new();
    for task in existing {
        match representatives.get(&task.title) {
            Some(seen) if seen.created_at <= task.created_at => {}
            _ => {
                representatives.insert(task.title.clone(), task);
            }
        }
    }

    let held: Vec<String> = storage
        .list_tasks_for_user(user_id)
        .await?
        .into_iter()
        .filter(|t| t.scope == scope)
        .map(|t| t.title)
        .collect();

    let mut created = 0;
    for (title, representative) in representatives {
        if held.contains(&title) {
            continue;
        }
        match storage.save_task(&representative.reassigned_to(user_id)).await {
            Ok(()) => created += 1,
            Err(StorageError::Constraint(_)) => {
                debug!(%user_id, %scope, title, "task already propagated, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    debug!(%user_id, %scope, created, "propagated task templates");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltrack_core::{InternshipId, TaskId, TaskPriority, TaskStatus};
    use skilltrack_storage::MemoryStorage;

    fn task(scope: ScopeId, title: &str, assigned_to: UserId, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(),
            scope,
            title: title.to_string(),
            description: format!("{title} details"),
            week_number: 1,
            due_date: None,
            status,
            priority: TaskPriority::High,
            assigned_to,
            assigned_by: UserId::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn new_member_receives_one_task_per_title() {
        let mut storage = MemoryStorage::new();
        let scope = ScopeId::Internship(InternshipId::new());
        let veteran = UserId::new();

        storage
            .save_task(&task(scope, "Week 1 report", veteran, TaskStatus::Completed))
            .await
            .unwrap();
        storage
            .save_task(&task(scope, "Week 2 demo", veteran, TaskStatus::InProgress))
            .await
            .unwrap();

        let newcomer = UserId::new();
        let created = propagate_templates(&mut storage, newcomer, scope)
            .await
            .unwrap();
        assert_eq!(created, 2);

        let received = storage.list_tasks_for_user(newcomer).await.unwrap();
        assert_eq!(received.len(), 2);
        // Status resets even when the template source was finished.
        assert!(received.iter().all(|t| t.status == TaskStatus::Pending));
        assert!(received.iter().all(|t| t.assigned_to == newcomer));
    }

    #[tokio::test]
    async fn repeated_propagation_creates_nothing() {
        let mut storage = MemoryStorage::new();
        let scope = ScopeId::Internship(InternshipId::new());

        storage
            .save_task(&task(scope, "Week 1 report", UserId::new(), TaskStatus::Pending))
            .await
            .unwrap();

        let newcomer = UserId::new();
        assert_eq!(
            propagate_templates(&mut storage, newcomer, scope).await.unwrap(),
            1
        );
        assert_eq!(
            propagate_templates(&mut storage, newcomer, scope).await.unwrap(),
            0
        );
        assert_eq!(storage.list_tasks_for_user(newcomer).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_scope_is_a_no_op() {
        let mut storage = MemoryStorage::new();
        let scope = ScopeId::Internship(InternshipId::new());
        assert_eq!(
            propagate_templates(&mut storage, UserId::new(), scope)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn peer_task_serves_as_template() {
        let mut storage = MemoryStorage::new();
        let scope = ScopeId::Internship(InternshipId::new());

        // Only a peer holds the task; there is no creator-owned copy.
        let peer = UserId::new();
        let original = task(scope, "Week 1 report", peer, TaskStatus::Submitted);
        storage.save_task(&original).await.unwrap();

        let newcomer = UserId::new();
        propagate_templates(&mut storage, newcomer, scope).await.unwrap();

        let received = &storage.list_tasks_for_user(newcomer).await.unwrap()[0];
        assert_eq!(received.title, original.title);
        assert_eq!(received.description, original.description);
        assert_eq!(received.priority, original.priority);
        assert_eq!(received.assigned_by, original.assigned_by);
        assert_eq!(received.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn other_scopes_do_not_leak_in() {
        let mut storage = MemoryStorage::new();
        let scope = ScopeId::Internship(InternshipId::new());
        let other = ScopeId::Internship(InternshipId::new());

        storage
            .save_task(&task(other, "Elsewhere", UserId::new(), TaskStatus::Pending))
            .await
            .unwrap();

        let newcomer = UserId::new();
        assert_eq!(
            propagate_templates(&mut storage, newcomer, scope).await.unwrap(),
            0
        );
    }
}
