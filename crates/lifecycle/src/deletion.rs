//! Ordered cascade deletes.
//!
//! Order matters: submissions go before the task that owns them, every
//! dependent row before the entity itself. Each delete runs as one
//! transaction; on any failure the store is rolled back to its last
//! committed state.

use std::sync::Arc;

use async_trait::async_trait;
use skilltrack_core::{Actor, CourseId, EngineError, InternshipId, Result, Role, ScopeId, UserId};
use skilltrack_storage::Storage;
use tokio::sync::Mutex;
use tracing::info;

/// Cascade deletion service. Admin only.
#[async_trait]
pub trait DeletionCoordinator: Send + Sync {
    /// Delete a user and every row referencing them, on either side:
    /// rows they own (enrollments, progress, certificates, submissions,
    /// their tasks) and rows they created (tasks they assigned, with
    /// those tasks' submissions).
    async fn delete_user(&mut self, actor: Actor, user_id: UserId) -> Result<()>;

    /// Delete a course and everything scoped to it.
    async fn delete_course(&mut self, actor: Actor, course_id: CourseId) -> Result<()>;

    /// Delete an internship and everything scoped to it.
    async fn delete_internship(
        &mut self,
        actor: Actor,
        internship_id: InternshipId,
    ) -> Result<()>;
}

fn require_admin(actor: Actor) -> Result<()> {
    if actor.role == Role::Admin {
        Ok(())
    } else {
        Err(EngineError::Authorization("deletion requires admin role".into()))
    }
}

/// Basic deletion coordinator implementation.
pub struct BasicDeletionCoordinator<S: Storage> {
    storage: Arc<Mutex<S>>,
}

impl<S: Storage> BasicDeletionCoordinator<S> {
    /// Create a new deletion coordinator.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    async fn rollback_on<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.storage.lock().await.rollback().await?;
        }
        result
    }

    async fn delete_user_inner(&self, user_id: UserId) -> Result<()> {
        let mut storage = self.storage.lock().await;
        storage
            .load_user(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;

        // Target side: rows the user owns.
        for enrollment in storage.list_enrollments_for_user(user_id).await? {
            storage.delete_enrollment(enrollment.id).await?;
        }
        storage.delete_progress_for_user(user_id).await?;
        storage.delete_certificates_for_user(user_id).await?;
        storage.delete_submissions_for_student(user_id).await?;
        storage.delete_quiz_submissions_for_student(user_id).await?;
        storage.delete_task_submissions_for_student(user_id).await?;
        for task in storage.list_tasks_for_user(user_id).await? {
            storage.delete_task_submissions_for_task(task.id).await?;
            storage.delete_task(task.id).await?;
        }

        // Creator side: tasks the user assigned to others.
        for task in storage.list_tasks_by_creator(user_id).await? {
            storage.delete_task_submissions_for_task(task.id).await?;
            storage.delete_task(task.id).await?;
        }

        storage.delete_user(user_id).await?;
        storage.commit(&format!("delete user {user_id}")).await?;
        info!(%user_id, "deleted user");
        Ok(())
    }

    async fn delete_scope_rows(
        storage: &mut S,
        scope: ScopeId,
    ) -> Result<()> {
        for enrollment in storage.list_enrollments_in_scope(scope).await? {
            storage.delete_enrollment(enrollment.id).await?;
        }
        storage.delete_resources_in_scope(scope).await?;
        for task in storage.list_tasks_in_scope(scope).await? {
            storage.delete_task_submissions_for_task(task.id).await?;
            storage.delete_task(task.id).await?;
        }
        Ok(())
    }

    async fn delete_course_inner(&self, course_id: CourseId) -> Result<()> {
        let mut storage = self.storage.lock().await;
        storage
            .load_course(course_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("course {course_id}")))?;

        Self::delete_scope_rows(&mut *storage, ScopeId::Course(course_id)).await?;
        storage.delete_progress_in_course(course_id).await?;
        storage.delete_certificates_for_course(course_id).await?;

        for assignment in storage.list_assignments_in_course(course_id).await? {
            storage.delete_submissions_for_assignment(assignment.id).await?;
            storage.delete_assignment(assignment.id).await?;
        }
        for quiz in storage.list_quizzes_in_course(course_id).await? {
            storage.delete_quiz_submissions_for_quiz(quiz.id).await?;
            storage.delete_quiz(quiz.id).await?;
        }

        storage.delete_course(course_id).await?;
        storage.commit(&format!("delete course {course_id}")).await?;
        info!(%course_id, "deleted course");
        Ok(())
    }

    async fn delete_internship_inner(&self, internship_id: InternshipId) -> Result<()> {
        let mut storage = self.storage.lock().await;
        storage
            .load_internship(internship_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("internship {internship_id}")))?;

        Self::delete_scope_rows(&mut *storage, ScopeId::Internship(internship_id)).await?;
        storage.delete_internship(internship_id).await?;
        storage
            .commit(&format!("delete internship {internship_id}"))
            .await?;
        info!(%internship_id, "deleted internship");
        Ok(())
    }
}

#[async_trait]
impl<S: Storage + 'static> DeletionCoordinator for BasicDeletionCoordinator<S> {
    async fn delete_user(&mut self, actor: Actor, user_id: UserId) -> Result<()> {
        require_admin(actor)?;
        let result = self.delete_user_inner(user_id).await;
        self.rollback_on(result).await
    }

    async fn delete_course(&mut self, actor: Actor, course_id: CourseId) -> Result<()> {
        require_admin(actor)?;
        let result = self.delete_course_inner(course_id).await;
        self.rollback_on(result).await
    }

    async fn delete_internship(
        &mut self,
        actor: Actor,
        internship_id: InternshipId,
    ) -> Result<()> {
        require_admin(actor)?;
        let result = self.delete_internship_inner(internship_id).await;
        self.rollback_on(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltrack_core::{
        Assignment, AssignmentId, Certificate, Course, Enrollment, ProgramDuration,
        ProgressRecord, QuizSubmission, Role, Submission, Task, TaskId, TaskPriority, TaskStatus,
        TaskSubmission, User,
    };
    use skilltrack_storage::MemoryStorage;

    fn admin() -> Actor {
        Actor::new(UserId::new(), Role::Admin)
    }

    fn task(scope: ScopeId, title: &str, assigned_to: UserId, assigned_by: UserId) -> Task {
        Task {
            id: TaskId::new(),
            scope,
            title: title.into(),
            description: String::new(),
            week_number: 1,
            due_date: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            assigned_to,
            assigned_by,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn deleting_a_user_leaves_no_referencing_rows() {
        let mut storage = MemoryStorage::new();

        let user = User::new("Asha", Role::Student);
        storage.save_user(&user).await.unwrap();
        let course_id = CourseId::new();
        let scope = ScopeId::Course(course_id);

        storage
            .save_enrollment(&Enrollment::new(user.id, scope))
            .await
            .unwrap();
        storage
            .save_progress_record(&ProgressRecord::new(user.id, course_id))
            .await
            .unwrap();
        storage
            .save_certificate(&Certificate::new(user.id, course_id, "file://c.pdf"))
            .await
            .unwrap();
        storage
            .save_submission(&Submission::new(AssignmentId::new(), user.id, None))
            .await
            .unwrap();
        storage
            .save_quiz_submission(&QuizSubmission::new(
                skilltrack_core::QuizId::new(),
                user.id,
                1,
                2,
            ))
            .await
            .unwrap();

        // A task assigned to the user, with their submission.
        let own_task = task(scope, "Own task", user.id, UserId::new());
        storage.save_task(&own_task).await.unwrap();
        storage
            .save_task_submission(&TaskSubmission::new(own_task.id, user.id, None))
            .await
            .unwrap();

        // A task the user created for someone else, with that person's
        // submission; both must go too.
        let peer = UserId::new();
        let created_task = task(scope, "Created task", peer, user.id);
        storage.save_task(&created_task).await.unwrap();
        storage
            .save_task_submission(&TaskSubmission::new(created_task.id, peer, None))
            .await
            .unwrap();

        let reader = storage.clone();
        let mut coordinator = BasicDeletionCoordinator::new(storage);
        coordinator.delete_user(admin(), user.id).await.unwrap();

        assert!(reader.load_user(user.id).await.unwrap().is_none());
        assert!(reader.list_enrollments_for_user(user.id).await.unwrap().is_empty());
        assert!(reader.list_progress_for_user(user.id).await.unwrap().is_empty());
        assert!(reader.find_certificate(user.id, course_id).await.unwrap().is_none());
        assert!(reader.list_submissions_for_student(user.id).await.unwrap().is_empty());
        assert!(reader
            .list_quiz_submissions_for_student(user.id)
            .await
            .unwrap()
            .is_empty());
        assert!(reader
            .list_task_submissions_for_student(user.id)
            .await
            .unwrap()
            .is_empty());
        assert!(reader.list_tasks_for_user(user.id).await.unwrap().is_empty());
        assert!(reader.list_tasks_by_creator(user.id).await.unwrap().is_empty());
        // The peer's submission against the creator's task went with it.
        assert!(reader
            .list_task_submissions_for_student(peer)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn deleting_a_course_sweeps_its_work_items() {
        let mut storage = MemoryStorage::new();
        let course = Course {
            id: CourseId::new(),
            name: "Rust Basics".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            mentor_name: "Priya".into(),
            duration: ProgramDuration::default(),
            assignment_limit: None,
            quiz_limit: None,
            created_at: chrono::Utc::now(),
        };
        storage.save_course(&course).await.unwrap();

        let student = UserId::new();
        let scope = ScopeId::Course(course.id);
        storage
            .save_enrollment(&Enrollment::new(student, scope))
            .await
            .unwrap();

        let assignment = Assignment {
            id: AssignmentId::new(),
            course_id: course.id,
            title: "Assignment 1".into(),
            week_number: 1,
            due_date: None,
            is_released: true,
            created_at: chrono::Utc::now(),
        };
        storage.save_assignment(&assignment).await.unwrap();
        storage
            .save_submission(&Submission::new(assignment.id, student, None))
            .await
            .unwrap();

        let t = task(scope, "Course task", student, UserId::new());
        storage.save_task(&t).await.unwrap();
        storage
            .save_task_submission(&TaskSubmission::new(t.id, student, None))
            .await
            .unwrap();

        let reader = storage.clone();
        let mut coordinator = BasicDeletionCoordinator::new(storage);
        coordinator.delete_course(admin(), course.id).await.unwrap();

        assert!(reader.load_course(course.id).await.unwrap().is_none());
        assert!(reader
            .list_assignments_in_course(course.id)
            .await
            .unwrap()
            .is_empty());
        assert!(reader.list_submissions_for_student(student).await.unwrap().is_empty());
        assert!(reader.list_tasks_in_scope(scope).await.unwrap().is_empty());
        assert!(reader
            .list_task_submissions_for_student(student)
            .await
            .unwrap()
            .is_empty());
        assert!(reader.list_enrollments_in_scope(scope).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_admins_may_delete() {
        let mut storage = MemoryStorage::new();
        let user = User::new("Asha", Role::Student);
        storage.save_user(&user).await.unwrap();

        let mut coordinator = BasicDeletionCoordinator::new(storage);
        let trainer = Actor::new(UserId::new(), Role::Trainer);
        let err = coordinator.delete_user(trainer, user.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Authorization(_)));
    }

    #[tokio::test]
    async fn deleting_a_missing_internship_is_not_found() {
        let mut coordinator = BasicDeletionCoordinator::new(MemoryStorage::new());
        let err = coordinator
            .delete_internship(admin(), InternshipId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
