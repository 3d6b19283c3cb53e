//! The enroll/withdraw flow.

use std::sync::Arc;

use async_trait::async_trait;
use skilltrack_core::{
    Actor, Enrollment, EnrollmentId, EngineError, ProgressRecord, Result, Role, ScopeId,
};
use skilltrack_storage::Storage;
use tokio::sync::Mutex;
use tracing::info;

use crate::propagator::propagate_templates;

/// Enrollment write service.
#[async_trait]
pub trait EnrollmentManager: Send + Sync {
    /// Enroll the caller into a course or internship.
    ///
    /// Courses take students, internships take interns. A second
    /// enrollment in the same scope is a conflict. Course enrollment also
    /// seeds the legacy progress record, and either kind backfills the
    /// scope's task templates onto the new member.
    async fn enroll(&mut self, actor: Actor, scope: ScopeId) -> Result<Enrollment>;

    /// Remove an enrollment. Allowed for its owner or an admin. The
    /// member's tasks and submissions stay; only the membership goes.
    async fn withdraw(&mut self, actor: Actor, enrollment_id: EnrollmentId) -> Result<()>;
}

/// Basic enrollment manager implementation.
pub struct BasicEnrollmentManager<S: Storage> {
    storage: Arc<Mutex<S>>,
}

impl<S: Storage> BasicEnrollmentManager<S> {
    /// Create a new enrollment manager.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }
}

impl<S: Storage> BasicEnrollmentManager<S> {
    async fn enroll_inner(&self, actor: Actor, scope: ScopeId) -> Result<Enrollment> {
        let mut storage = self.storage.lock().await;

        match scope {
            ScopeId::Course(course_id) => {
                if actor.role != Role::Student {
                    return Err(EngineError::Authorization(
                        "only students enroll in courses".into(),
                    ));
                }
                storage
                    .load_course(course_id)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("course {course_id}")))?;
            }
            ScopeId::Internship(internship_id) => {
                if actor.role != Role::Intern {
                    return Err(EngineError::Authorization(
                        "only interns join internships".into(),
                    ));
                }
                storage
                    .load_internship(internship_id)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("internship {internship_id}")))?;
            }
        }

        let already = storage
            .list_enrollments_for_user(actor.user_id)
            .await?
            .into_iter()
            .any(|e| e.scope == scope);
        if already {
            return Err(EngineError::Conflict(format!(
                "user {} is already enrolled in {scope}",
                actor.user_id
            )));
        }

        let enrollment = Enrollment::new(actor.user_id, scope);
        storage.save_enrollment(&enrollment).await?;

        if let Some(course_id) = scope.course() {
            let seeded = storage
                .find_progress_record(actor.user_id, course_id)
                .await?;
            if seeded.is_none() {
                storage
                    .save_progress_record(&ProgressRecord::new(actor.user_id, course_id))
                    .await?;
            }
        }

        let propagated = propagate_templates(&mut *storage, actor.user_id, scope).await?;
        storage.commit(&format!("enroll {} in {scope}", actor.user_id)).await?;

        info!(user_id = %actor.user_id, %scope, propagated, "enrolled");
        Ok(enrollment)
    }
}

#[async_trait]
impl<S: Storage + 'static> EnrollmentManager for BasicEnrollmentManager<S> {
    async fn enroll(&mut self, actor: Actor, scope: ScopeId) -> Result<Enrollment> {
        match self.enroll_inner(actor, scope).await {
            Ok(enrollment) => Ok(enrollment),
            Err(e) => {
                self.storage.lock().await.rollback().await?;
                Err(e)
            }
        }
    }

    async fn withdraw(&mut self, actor: Actor, enrollment_id: EnrollmentId) -> Result<()> {
        let mut storage = self.storage.lock().await;

        let enrollment = storage
            .load_enrollment(enrollment_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("enrollment {enrollment_id}")))?;

        if enrollment.user_id != actor.user_id && actor.role != Role::Admin {
            return Err(EngineError::Authorization(
                "only the member or an admin can withdraw an enrollment".into(),
            ));
        }

        storage.delete_enrollment(enrollment_id).await?;
        storage
            .commit(&format!("withdraw {} from {}", enrollment.user_id, enrollment.scope))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltrack_core::{
        Course, CourseId, InternshipId, ProgramDuration, Task, TaskId, TaskPriority, TaskStatus,
        UserId,
    };
    use skilltrack_storage::MemoryStorage;

    fn sample_course() -> Course {
        Course {
            id: CourseId::new(),
            name: "Rust Basics".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            mentor_name: "Priya".into(),
            duration: ProgramDuration::default(),
            assignment_limit: None,
            quiz_limit: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn course_enroll_seeds_progress_record() {
        let mut storage = MemoryStorage::new();
        let course = sample_course();
        storage.save_course(&course).await.unwrap();

        let reader = storage.clone();
        let mut manager = BasicEnrollmentManager::new(storage);
        let actor = Actor::new(UserId::new(), Role::Student);

        manager
            .enroll(actor, ScopeId::Course(course.id))
            .await
            .unwrap();

        let record = reader
            .find_progress_record(actor.user_id, course.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.progress, 0);
    }

    #[tokio::test]
    async fn duplicate_enrollment_is_a_conflict() {
        let mut storage = MemoryStorage::new();
        let course = sample_course();
        storage.save_course(&course).await.unwrap();

        let mut manager = BasicEnrollmentManager::new(storage);
        let actor = Actor::new(UserId::new(), Role::Student);
        let scope = ScopeId::Course(course.id);

        manager.enroll(actor, scope).await.unwrap();
        let err = manager.enroll(actor, scope).await.unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[tokio::test]
    async fn role_gates_the_scope_kind() {
        let mut storage = MemoryStorage::new();
        let course = sample_course();
        storage.save_course(&course).await.unwrap();

        let mut manager = BasicEnrollmentManager::new(storage);
        let intern = Actor::new(UserId::new(), Role::Intern);

        let err = manager
            .enroll(intern, ScopeId::Course(course.id))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Authorization(_)));
    }

    #[tokio::test]
    async fn missing_scope_is_not_found() {
        let mut manager = BasicEnrollmentManager::new(MemoryStorage::new());
        let actor = Actor::new(UserId::new(), Role::Intern);

        let err = manager
            .enroll(actor, ScopeId::Internship(InternshipId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn enroll_backfills_existing_templates() {
        let mut storage = MemoryStorage::new();
        let internship_id = InternshipId::new();
        let scope = ScopeId::Internship(internship_id);
        storage
            .save_internship(&skilltrack_core::Internship {
                id: internship_id,
                title: "Backend".into(),
                mentor_name: "Priya".into(),
                duration: ProgramDuration::default(),
                task_limit: None,
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
        storage
            .save_task(&Task {
                id: TaskId::new(),
                scope,
                title: "Week 1 report".into(),
                description: String::new(),
                week_number: 1,
                due_date: None,
                status: TaskStatus::Completed,
                priority: TaskPriority::Medium,
                assigned_to: UserId::new(),
                assigned_by: UserId::new(),
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let reader = storage.clone();
        let mut manager = BasicEnrollmentManager::new(storage);
        let actor = Actor::new(UserId::new(), Role::Intern);
        manager.enroll(actor, scope).await.unwrap();

        let tasks = reader.list_tasks_for_user(actor.user_id).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn withdraw_requires_owner_or_admin() {
        let mut storage = MemoryStorage::new();
        let course = sample_course();
        storage.save_course(&course).await.unwrap();

        let reader = storage.clone();
        let mut manager = BasicEnrollmentManager::new(storage);
        let owner = Actor::new(UserId::new(), Role::Student);
        let enrollment = manager
            .enroll(owner, ScopeId::Course(course.id))
            .await
            .unwrap();

        let stranger = Actor::new(UserId::new(), Role::Student);
        let err = manager.withdraw(stranger, enrollment.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Authorization(_)));

        manager.withdraw(owner, enrollment.id).await.unwrap();
        assert!(reader
            .list_enrollments_for_user(owner.user_id)
            .await
            .unwrap()
            .is_empty());
    }
}
