//! Certificate eligibility and issuance.
//!
//! Eligibility is checked in compound form: the rounded percentage must
//! be 100 and every per-kind counter must have reached its total, so a
//! flattering rounding can never unlock a certificate early. Rendering
//! is delegated to a collaborator; the engine only stores the artifact
//! and the row.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use skilltrack_core::{
    Certificate, CourseId, EngineError, InternshipId, MissingItems, Result, UserId,
};
use skilltrack_storage::{FileStore, Storage};
use tokio::sync::Mutex;
use tracing::info;

use crate::aggregator::{course_snapshot, internship_snapshot};

/// Everything the renderer needs to draw one certificate.
#[derive(Debug, Clone)]
pub struct CertificateInput {
    /// Recipient display name
    pub user_name: String,

    /// Course or internship title
    pub title: String,

    /// Mentor display name
    pub mentor_name: String,

    /// Program start, when known
    pub start_date: Option<NaiveDate>,

    /// Program end, when known
    pub end_date: Option<NaiveDate>,

    /// Verification code printed on the artifact
    pub verification_code: String,

    /// Issue date
    pub issue_date: NaiveDate,
}

/// Renders certificate artifacts. The engine never interprets the bytes.
#[async_trait]
pub trait CertificateRenderer: Send + Sync {
    /// Render the certificate to an artifact (typically a PDF).
    async fn render(&self, input: &CertificateInput) -> Result<Vec<u8>>;
}

/// Certificate issuance service.
pub struct CertificateService<S: Storage, R: CertificateRenderer, F: FileStore> {
    storage: Arc<Mutex<S>>,
    renderer: R,
    files: F,
}

impl<S: Storage, R: CertificateRenderer, F: FileStore> CertificateService<S, R, F> {
    /// Create a new certificate service.
    pub fn new(storage: S, renderer: R, files: F) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            renderer,
            files,
        }
    }

    /// Issue (or re-issue) the course certificate for a user.
    ///
    /// Re-issuing overwrites the stored row and artifact instead of
    /// duplicating either. Below full completion the error carries how
    /// many items of each kind are still outstanding.
    pub async fn issue_course_certificate(
        &mut self,
        user_id: UserId,
        course_id: CourseId,
        today: NaiveDate,
    ) -> Result<Certificate> {
        let mut storage = self.storage.lock().await;

        let user = storage
            .load_user(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;
        let course = storage
            .load_course(course_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("course {course_id}")))?;

        let snapshot = course_snapshot(&*storage, user_id, course_id).await?;
        let missing = MissingItems {
            assignments: snapshot
                .assignment_total
                .saturating_sub(snapshot.assignments_completed),
            quizzes: snapshot.quiz_total.saturating_sub(snapshot.quizzes_completed),
            tasks: snapshot.task_total.saturating_sub(snapshot.tasks_completed),
        };
        if snapshot.percentage != 100 || !missing.is_empty() {
            return Err(EngineError::State(missing));
        }

        // Keep the existing row's identity on re-issue.
        let mut certificate = match storage.find_certificate(user_id, course_id).await? {
            Some(existing) => existing,
            None => Certificate::new(user_id, course_id, ""),
        };

        let end_date = course
            .start_date
            .checked_add_days(Days::new(course.duration.days() as u64));
        let input = CertificateInput {
            user_name: user.name.clone(),
            title: course.name.clone(),
            mentor_name: course.mentor_name.clone(),
            start_date: Some(course.start_date),
            end_date,
            verification_code: certificate.verification_code(),
            issue_date: today,
        };
        let artifact = self.renderer.render(&input).await?;
        let url = self
            .files
            .store(&format!("certificate_{user_id}_{course_id}.pdf"), &artifact)
            .await?;

        certificate.url = url;
        certificate.issued_at = chrono::Utc::now();
        storage.save_certificate(&certificate).await?;
        storage
            .commit(&format!("issue certificate for {user_id} in {course_id}"))
            .await?;

        info!(%user_id, %course_id, "issued course certificate");
        Ok(certificate)
    }

    /// Render an internship certificate and return the stored artifact's
    /// URL. No row is kept; the artifact is regenerated on demand.
    ///
    /// Eligible when every assigned task has a submission and at least
    /// one task exists. An intern with no tasks yet is reported short by
    /// the cap (or the duration-derived count when no cap is set).
    pub async fn internship_certificate(
        &mut self,
        user_id: UserId,
        internship_id: InternshipId,
        today: NaiveDate,
    ) -> Result<String> {
        let storage = self.storage.lock().await;

        let user = storage
            .load_user(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;
        let internship = storage
            .load_internship(internship_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("internship {internship_id}")))?;

        let snapshot = internship_snapshot(&*storage, user_id, internship_id).await?;
        if snapshot.percentage != 100 || snapshot.task_total == 0 {
            let outstanding = if snapshot.task_total == 0 {
                internship
                    .task_limit
                    .unwrap_or_else(|| internship.duration.required_tasks())
                    .max(1)
            } else {
                snapshot.task_total - snapshot.tasks_submitted
            };
            return Err(EngineError::State(MissingItems {
                tasks: outstanding,
                ..MissingItems::default()
            }));
        }

        let input = CertificateInput {
            user_name: user.name.clone(),
            title: internship.title.clone(),
            mentor_name: internship.mentor_name.clone(),
            start_date: None,
            end_date: None,
            verification_code: format!("ANLG-{user_id}-{internship_id}"),
            issue_date: today,
        };
        let artifact = self.renderer.render(&input).await?;
        let url = self
            .files
            .store(
                &format!("certificate_{user_id}_{internship_id}.pdf"),
                &artifact,
            )
            .await?;

        info!(%user_id, %internship_id, "rendered internship certificate");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltrack_core::{
        Assignment, AssignmentId, Course, ProgramDuration, Role, ScopeId, Submission, Task,
        TaskId, TaskPriority, TaskStatus, TaskSubmission, User,
    };
    use skilltrack_storage::{LocalFileStore, MemoryStorage};

    struct StubRenderer;

    #[async_trait]
    impl CertificateRenderer for StubRenderer {
        async fn render(&self, input: &CertificateInput) -> Result<Vec<u8>> {
            Ok(format!("CERT {} {}", input.user_name, input.verification_code).into_bytes())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_course() -> Course {
        Course {
            id: CourseId::new(),
            name: "Rust Basics".into(),
            start_date: day(2026, 1, 5),
            mentor_name: "Priya".into(),
            duration: ProgramDuration::default(),
            assignment_limit: None,
            quiz_limit: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn incomplete_course_reports_missing_items() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = MemoryStorage::new();

        let user = User::new("Asha", Role::Student);
        storage.save_user(&user).await.unwrap();
        let course = sample_course();
        storage.save_course(&course).await.unwrap();

        for week in 1..=2 {
            storage
                .save_assignment(&Assignment {
                    id: AssignmentId::new(),
                    course_id: course.id,
                    title: format!("Assignment {week}"),
                    week_number: week,
                    due_date: None,
                    is_released: true,
                    created_at: chrono::Utc::now(),
                })
                .await
                .unwrap();
        }

        let mut service = CertificateService::new(
            storage,
            StubRenderer,
            LocalFileStore::new(dir.path()),
        );
        let err = service
            .issue_course_certificate(user.id, course.id, day(2026, 8, 23))
            .await
            .unwrap_err();
        match err {
            EngineError::State(missing) => assert_eq!(missing.assignments, 2),
            other => panic!("expected State, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reissue_overwrites_instead_of_duplicating() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = MemoryStorage::new();

        let user = User::new("Asha", Role::Student);
        storage.save_user(&user).await.unwrap();
        let course = sample_course();
        storage.save_course(&course).await.unwrap();

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
            .save_submission(&Submission::new(assignment.id, user.id, None))
            .await
            .unwrap();

        let reader = storage.clone();
        let mut service = CertificateService::new(
            storage,
            StubRenderer,
            LocalFileStore::new(dir.path()),
        );

        let first = service
            .issue_course_certificate(user.id, course.id, day(2026, 8, 23))
            .await
            .unwrap();
        let second = service
            .issue_course_certificate(user.id, course.id, day(2026, 8, 24))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let stored = reader
            .find_certificate(user.id, course.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, first.id);
    }

    #[tokio::test]
    async fn internship_certificate_needs_every_assigned_task_submitted() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = MemoryStorage::new();

        let user = User::new("Ben", Role::Intern);
        storage.save_user(&user).await.unwrap();
        let internship = skilltrack_core::Internship {
            id: InternshipId::new(),
            title: "Backend".into(),
            mentor_name: "Priya".into(),
            duration: ProgramDuration::default(),
            task_limit: Some(2),
            created_at: chrono::Utc::now(),
        };
        storage.save_internship(&internship).await.unwrap();

        let scope = ScopeId::Internship(internship.id);
        for week in 1..=2 {
            let task = Task {
                id: TaskId::new(),
                scope,
                title: format!("Week {week}"),
                description: String::new(),
                week_number: week,
                due_date: None,
                status: TaskStatus::Completed,
                priority: TaskPriority::Medium,
                assigned_to: user.id,
                assigned_by: UserId::new(),
                created_at: chrono::Utc::now(),
            };
            storage.save_task(&task).await.unwrap();
            if week == 1 {
                storage
                    .save_task_submission(&TaskSubmission::new(task.id, user.id, None))
                    .await
                    .unwrap();
            }
        }

        let mut service = CertificateService::new(
            storage,
            StubRenderer,
            LocalFileStore::new(dir.path()),
        );

        let err = service
            .internship_certificate(user.id, internship.id, day(2026, 8, 23))
            .await
            .unwrap_err();
        match err {
            EngineError::State(missing) => assert_eq!(missing.tasks, 1),
            other => panic!("expected State, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn internship_certificate_ignores_rounds_never_assigned() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = MemoryStorage::new();

        let user = User::new("Ben", Role::Intern);
        storage.save_user(&user).await.unwrap();
        // Duration implies more rounds than were ever handed out; only
        // the user's actual tasks count.
        let internship = skilltrack_core::Internship {
            id: InternshipId::new(),
            title: "Backend".into(),
            mentor_name: "Priya".into(),
            duration: ProgramDuration::default(),
            task_limit: None,
            created_at: chrono::Utc::now(),
        };
        storage.save_internship(&internship).await.unwrap();

        let scope = ScopeId::Internship(internship.id);
        for week in 1..=2 {
            let task = Task {
                id: TaskId::new(),
                scope,
                title: format!("Week {week}"),
                description: String::new(),
                week_number: week,
                due_date: None,
                status: TaskStatus::Completed,
                priority: TaskPriority::Medium,
                assigned_to: user.id,
                assigned_by: UserId::new(),
                created_at: chrono::Utc::now(),
            };
            storage.save_task(&task).await.unwrap();
            storage
                .save_task_submission(&TaskSubmission::new(task.id, user.id, None))
                .await
                .unwrap();
        }

        let mut service = CertificateService::new(
            storage,
            StubRenderer,
            LocalFileStore::new(dir.path()),
        );
        let url = service
            .internship_certificate(user.id, internship.id, day(2026, 8, 23))
            .await
            .unwrap();
        assert!(url.contains(&format!("certificate_{}_{}", user.id, internship.id)));
    }

    #[tokio::test]
    async fn internship_certificate_rejects_an_intern_with_no_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = MemoryStorage::new();

        let user = User::new("Ben", Role::Intern);
        storage.save_user(&user).await.unwrap();
        let internship = skilltrack_core::Internship {
            id: InternshipId::new(),
            title: "Backend".into(),
            mentor_name: "Priya".into(),
            duration: ProgramDuration::default(),
            task_limit: Some(4),
            created_at: chrono::Utc::now(),
        };
        storage.save_internship(&internship).await.unwrap();

        let mut service = CertificateService::new(
            storage,
            StubRenderer,
            LocalFileStore::new(dir.path()),
        );
        let err = service
            .internship_certificate(user.id, internship.id, day(2026, 8, 23))
            .await
            .unwrap_err();
        match err {
            EngineError::State(missing) => assert_eq!(missing.tasks, 4),
            other => panic!("expected State, got {other:?}"),
        }
    }
}
