//! SQLite storage backend.
//!
//! Entities are stored as JSON rows in a single `entities` table keyed by
//! id and entity type, so the schema never has to chase the model. Query
//! predicates that SQL cannot see (they live inside the JSON) are applied
//! after deserialization.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use skilltrack_core::{
    Assignment, AssignmentId, Certificate, Course, CourseId, Enrollment, EnrollmentId, Internship,
    InternshipId, ProgressRecord, Quiz, QuizId, QuizSubmission, Resource, ResourceId, ScopeId,
    Submission, SubmissionId, Task, TaskId, TaskSubmission, TaskSubmissionId, User, UserId,
};
use sqlx::Row;
use std::path::Path;
use tracing::warn;

use super::trait_::{Result, Storage, StorageError};

/// SQLite storage implementation.
#[derive(Clone)]
pub struct SqliteStorage {
    /// Database connection pool
    pool: sqlx::SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance.
    pub async fn new(db_path: &str) -> Result<Self> {
        let pool = sqlx::SqlitePool::connect(db_path)
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;

        let storage = Self { pool };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// Create a new SQLite storage instance from a path.
    pub async fn new_from_path(path: &Path) -> Result<Self> {
        Self::new(path.to_str().unwrap_or(":memory:")).await
    }

    /// Create an in-memory SQLite storage for testing.
    pub async fn in_memory() -> Result<Self> {
        Self::new(":memory:").await
    }

    /// Initialize the database schema.
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS entities (
                id TEXT PRIMARY KEY,
                entity_type TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Other(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_entities_type ON entities(entity_type)")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;

        Ok(())
    }

    async fn save_entity<T: Serialize + Sync>(
        &self,
        id: String,
        entity_type: &str,
        entity: &T,
    ) -> Result<()> {
        let data = serde_json::to_string(entity)?;
        let now = chrono::Utc::now();

        sqlx::query(
            "INSERT OR REPLACE INTO entities (id, entity_type, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(entity_type)
        .bind(data)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Other(e.to_string()))?;

        Ok(())
    }

    async fn load_entity<T: DeserializeOwned>(
        &self,
        id: String,
        entity_type: &str,
    ) -> Result<Option<T>> {
        let row = sqlx::query("SELECT data FROM entities WHERE id = ? AND entity_type = ?")
            .bind(id)
            .bind(entity_type)
            .fetch_one(&self.pool)
            .await;

        match row {
            Ok(row) => {
                let data: String = row.try_get("data").unwrap_or_default();
                Ok(Some(serde_json::from_str(&data)?))
            }
            Err(sqlx::Error::RowNotFound) => Ok(None),
            Err(e) => Err(StorageError::Other(e.to_string())),
        }
    }

    async fn list_entities<T: DeserializeOwned>(&self, entity_type: &str) -> Result<Vec<T>> {
        let rows = sqlx::query(
            "SELECT data FROM entities WHERE entity_type = ? ORDER BY updated_at DESC",
        )
        .bind(entity_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Other(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let data: String = row.try_get("data").unwrap_or_default();
                serde_json::from_str(&data).map_err(StorageError::Json)
            })
            .collect()
    }

    async fn delete_entity(&self, id: String, entity_type: &str) -> Result<()> {
        sqlx::query("DELETE FROM entities WHERE id = ? AND entity_type = ?")
            .bind(id)
            .bind(entity_type)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;

        Ok(())
    }

    /// Load all entities of a type, keep those matching the predicate.
    async fn filter_entities<T, F>(&self, entity_type: &str, pred: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let all: Vec<T> = self.list_entities(entity_type).await?;
        Ok(all.into_iter().filter(|e| pred(e)).collect())
    }

    /// Delete all entities of a type matching the predicate.
    async fn delete_entities_where<T, F, I>(
        &self,
        entity_type: &str,
        pred: F,
        id_of: I,
    ) -> Result<()>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
        I: Fn(&T) -> String,
    {
        let doomed: Vec<T> = self.filter_entities(entity_type, pred).await?;
        for entity in &doomed {
            self.delete_entity(id_of(entity), entity_type).await?;
        }
        Ok(())
    }
}

const USER: &str = "user";
const COURSE: &str = "course";
const INTERNSHIP: &str = "internship";
const ENROLLMENT: &str = "enrollment";
const PROGRESS: &str = "progress_record";
const TASK: &str = "task";
const ASSIGNMENT: &str = "assignment";
const QUIZ: &str = "quiz";
const SUBMISSION: &str = "submission";
const TASK_SUBMISSION: &str = "task_submission";
const QUIZ_SUBMISSION: &str = "quiz_submission";
const CERTIFICATE: &str = "certificate";
const RESOURCE: &str = "resource";

#[async_trait]
impl Storage for SqliteStorage {
    // === User operations ===

    async fn save_user(&mut self, user: &User) -> Result<()> {
        self.save_entity(user.id.to_string(), USER, user).await
    }

    async fn load_user(&self, id: UserId) -> Result<Option<User>> {
        self.load_entity(id.to_string(), USER).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.list_entities(USER).await
    }

    async fn delete_user(&mut self, id: UserId) -> Result<()> {
        self.delete_entity(id.to_string(), USER).await
    }

    // === Course operations ===

    async fn save_course(&mut self, course: &Course) -> Result<()> {
        self.save_entity(course.id.to_string(), COURSE, course).await
    }

    async fn load_course(&self, id: CourseId) -> Result<Option<Course>> {
        self.load_entity(id.to_string(), COURSE).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.list_entities(COURSE).await
    }

    async fn delete_course(&mut self, id: CourseId) -> Result<()> {
        self.delete_entity(id.to_string(), COURSE).await
    }

    // === Internship operations ===

    async fn save_internship(&mut self, internship: &Internship) -> Result<()> {
        self.save_entity(internship.id.to_string(), INTERNSHIP, internship)
            .await
    }

    async fn load_internship(&self, id: InternshipId) -> Result<Option<Internship>> {
        self.load_entity(id.to_string(), INTERNSHIP).await
    }

    async fn list_internships(&self) -> Result<Vec<Internship>> {
        self.list_entities(INTERNSHIP).await
    }

    async fn delete_internship(&mut self, id: InternshipId) -> Result<()> {
        self.delete_entity(id.to_string(), INTERNSHIP).await
    }

    // === Enrollment operations ===

    async fn save_enrollment(&mut self, enrollment: &Enrollment) -> Result<()> {
        let duplicates: Vec<Enrollment> = self
            .filter_entities(ENROLLMENT, |e: &Enrollment| {
                e.id != enrollment.id
                    && e.user_id == enrollment.user_id
                    && e.scope == enrollment.scope
            })
            .await?;
        if !duplicates.is_empty() {
            return Err(StorageError::Constraint(format!(
                "user {} already enrolled in {}",
                enrollment.user_id, enrollment.scope
            )));
        }
        self.save_entity(enrollment.id.to_string(), ENROLLMENT, enrollment)
            .await
    }

    async fn load_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>> {
        self.load_entity(id.to_string(), ENROLLMENT).await
    }

    async fn list_enrollments_for_user(&self, user_id: UserId) -> Result<Vec<Enrollment>> {
        self.filter_entities(ENROLLMENT, |e: &Enrollment| e.user_id == user_id)
            .await
    }

    async fn list_enrollments_in_scope(&self, scope: ScopeId) -> Result<Vec<Enrollment>> {
        self.filter_entities(ENROLLMENT, |e: &Enrollment| e.scope == scope)
            .await
    }

    async fn delete_enrollment(&mut self, id: EnrollmentId) -> Result<()> {
        self.delete_entity(id.to_string(), ENROLLMENT).await
    }

    // === Progress record operations ===

    async fn save_progress_record(&mut self, record: &ProgressRecord) -> Result<()> {
        self.save_entity(record.id.to_string(), PROGRESS, record).await
    }

    async fn find_progress_record(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>> {
        let matches = self
            .filter_entities(PROGRESS, |r: &ProgressRecord| {
                r.user_id == user_id && r.course_id == course_id
            })
            .await?;
        Ok(matches.into_iter().next())
    }

    async fn list_progress_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>> {
        self.filter_entities(PROGRESS, |r: &ProgressRecord| r.user_id == user_id)
            .await
    }

    async fn list_progress_in_course(&self, course_id: CourseId) -> Result<Vec<ProgressRecord>> {
        self.filter_entities(PROGRESS, |r: &ProgressRecord| r.course_id == course_id)
            .await
    }

    async fn delete_progress_for_user(&mut self, user_id: UserId) -> Result<()> {
        self.delete_entities_where(
            PROGRESS,
            |r: &ProgressRecord| r.user_id == user_id,
            |r| r.id.to_string(),
        )
        .await
    }

    async fn delete_progress_in_course(&mut self, course_id: CourseId) -> Result<()> {
        self.delete_entities_where(
            PROGRESS,
            |r: &ProgressRecord| r.course_id == course_id,
            |r| r.id.to_string(),
        )
        .await
    }

    // === Task operations ===

    async fn save_task(&mut self, task: &Task) -> Result<()> {
        let duplicates: Vec<Task> = self
            .filter_entities(TASK, |t: &Task| {
                t.id != task.id
                    && t.assigned_to == task.assigned_to
                    && t.scope == task.scope
                    && t.title == task.title
            })
            .await?;
        if !duplicates.is_empty() {
            return Err(StorageError::Constraint(format!(
                "task {:?} already assigned to {} in {}",
                task.title, task.assigned_to, task.scope
            )));
        }
        self.save_entity(task.id.to_string(), TASK, task).await
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<Task>> {
        self.load_entity(id.to_string(), TASK).await
    }

    async fn list_tasks_for_user(&self, user_id: UserId) -> Result<Vec<Task>> {
        self.filter_entities(TASK, |t: &Task| t.assigned_to == user_id)
            .await
    }

    async fn list_tasks_in_scope(&self, scope: ScopeId) -> Result<Vec<Task>> {
        self.filter_entities(TASK, |t: &Task| t.scope == scope).await
    }

    async fn list_tasks_by_creator(&self, trainer_id: UserId) -> Result<Vec<Task>> {
        self.filter_entities(TASK, |t: &Task| t.assigned_by == trainer_id)
            .await
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.delete_entity(id.to_string(), TASK).await
    }

    // === Assignment operations ===

    async fn save_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        self.save_entity(assignment.id.to_string(), ASSIGNMENT, assignment)
            .await
    }

    async fn load_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>> {
        self.load_entity(id.to_string(), ASSIGNMENT).await
    }

    async fn list_assignments_in_course(&self, course_id: CourseId) -> Result<Vec<Assignment>> {
        self.filter_entities(ASSIGNMENT, |a: &Assignment| a.course_id == course_id)
            .await
    }

    async fn delete_assignment(&mut self, id: AssignmentId) -> Result<()> {
        self.delete_entity(id.to_string(), ASSIGNMENT).await
    }

    // === Quiz operations ===

    async fn save_quiz(&mut self, quiz: &Quiz) -> Result<()> {
        self.save_entity(quiz.id.to_string(), QUIZ, quiz).await
    }

    async fn load_quiz(&self, id: QuizId) -> Result<Option<Quiz>> {
        self.load_entity(id.to_string(), QUIZ).await
    }

    async fn list_quizzes_in_course(&self, course_id: CourseId) -> Result<Vec<Quiz>> {
        self.filter_entities(QUIZ, |q: &Quiz| q.course_id == course_id)
            .await
    }

    async fn delete_quiz(&mut self, id: QuizId) -> Result<()> {
        self.delete_entity(id.to_string(), QUIZ).await
    }

    // === Assignment submission operations ===

    async fn save_submission(&mut self, submission: &Submission) -> Result<()> {
        self.save_entity(submission.id.to_string(), SUBMISSION, submission)
            .await
    }

    async fn load_submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
        self.load_entity(id.to_string(), SUBMISSION).await
    }

    async fn list_submissions_for_student(&self, student_id: UserId) -> Result<Vec<Submission>> {
        self.filter_entities(SUBMISSION, |s: &Submission| s.student_id == student_id)
            .await
    }

    async fn list_submissions_for_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<Vec<Submission>> {
        self.filter_entities(SUBMISSION, |s: &Submission| s.assignment_id == assignment_id)
            .await
    }

    async fn delete_submissions_for_student(&mut self, student_id: UserId) -> Result<()> {
        self.delete_entities_where(
            SUBMISSION,
            |s: &Submission| s.student_id == student_id,
            |s| s.id.to_string(),
        )
        .await
    }

    async fn delete_submissions_for_assignment(
        &mut self,
        assignment_id: AssignmentId,
    ) -> Result<()> {
        self.delete_entities_where(
            SUBMISSION,
            |s: &Submission| s.assignment_id == assignment_id,
            |s| s.id.to_string(),
        )
        .await
    }

    // === Task submission operations ===

    async fn save_task_submission(&mut self, submission: &TaskSubmission) -> Result<()> {
        self.save_entity(submission.id.to_string(), TASK_SUBMISSION, submission)
            .await
    }

    async fn load_task_submission(
        &self,
        id: TaskSubmissionId,
    ) -> Result<Option<TaskSubmission>> {
        self.load_entity(id.to_string(), TASK_SUBMISSION).await
    }

    async fn find_task_submission(
        &self,
        task_id: TaskId,
        student_id: UserId,
    ) -> Result<Option<TaskSubmission>> {
        let matches = self
            .filter_entities(TASK_SUBMISSION, |s: &TaskSubmission| {
                s.task_id == task_id && s.student_id == student_id
            })
            .await?;
        Ok(matches.into_iter().next())
    }

    async fn list_task_submissions_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<TaskSubmission>> {
        self.filter_entities(TASK_SUBMISSION, |s: &TaskSubmission| {
            s.student_id == student_id
        })
        .await
    }

    async fn list_task_submissions_for_task(
        &self,
        task_id: TaskId,
    ) -> Result<Vec<TaskSubmission>> {
        self.filter_entities(TASK_SUBMISSION, |s: &TaskSubmission| s.task_id == task_id)
            .await
    }

    async fn delete_task_submissions_for_student(&mut self, student_id: UserId) -> Result<()> {
        self.delete_entities_where(
            TASK_SUBMISSION,
            |s: &TaskSubmission| s.student_id == student_id,
            |s| s.id.to_string(),
        )
        .await
    }

    async fn delete_task_submissions_for_task(&mut self, task_id: TaskId) -> Result<()> {
        self.delete_entities_where(
            TASK_SUBMISSION,
            |s: &TaskSubmission| s.task_id == task_id,
            |s| s.id.to_string(),
        )
        .await
    }

    // === Quiz submission operations ===

    async fn save_quiz_submission(&mut self, submission: &QuizSubmission) -> Result<()> {
        self.save_entity(submission.id.to_string(), QUIZ_SUBMISSION, submission)
            .await
    }

    async fn find_quiz_submission(
        &self,
        quiz_id: QuizId,
        student_id: UserId,
    ) -> Result<Option<QuizSubmission>> {
        let matches = self
            .filter_entities(QUIZ_SUBMISSION, |s: &QuizSubmission| {
                s.quiz_id == quiz_id && s.student_id == student_id
            })
            .await?;
        Ok(matches.into_iter().next())
    }

    async fn list_quiz_submissions_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<QuizSubmission>> {
        self.filter_entities(QUIZ_SUBMISSION, |s: &QuizSubmission| {
            s.student_id == student_id
        })
        .await
    }

    async fn list_quiz_submissions_for_quiz(
        &self,
        quiz_id: QuizId,
    ) -> Result<Vec<QuizSubmission>> {
        self.filter_entities(QUIZ_SUBMISSION, |s: &QuizSubmission| s.quiz_id == quiz_id)
            .await
    }

    async fn delete_quiz_submissions_for_student(&mut self, student_id: UserId) -> Result<()> {
        self.delete_entities_where(
            QUIZ_SUBMISSION,
            |s: &QuizSubmission| s.student_id == student_id,
            |s| s.id.to_string(),
        )
        .await
    }

    async fn delete_quiz_submissions_for_quiz(&mut self, quiz_id: QuizId) -> Result<()> {
        self.delete_entities_where(
            QUIZ_SUBMISSION,
            |s: &QuizSubmission| s.quiz_id == quiz_id,
            |s| s.id.to_string(),
        )
        .await
    }

    // === Certificate operations ===

    async fn save_certificate(&mut self, certificate: &Certificate) -> Result<()> {
        self.save_entity(certificate.id.to_string(), CERTIFICATE, certificate)
            .await
    }

    async fn find_certificate(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Certificate>> {
        let matches = self
            .filter_entities(CERTIFICATE, |c: &Certificate| {
                c.user_id == user_id && c.course_id == course_id
            })
            .await?;
        Ok(matches.into_iter().next())
    }

    async fn delete_certificates_for_user(&mut self, user_id: UserId) -> Result<()> {
        self.delete_entities_where(
            CERTIFICATE,
            |c: &Certificate| c.user_id == user_id,
            |c| c.id.to_string(),
        )
        .await
    }

    async fn delete_certificates_for_course(&mut self, course_id: CourseId) -> Result<()> {
        self.delete_entities_where(
            CERTIFICATE,
            |c: &Certificate| c.course_id == course_id,
            |c| c.id.to_string(),
        )
        .await
    }

    // === Resource operations ===

    async fn save_resource(&mut self, resource: &Resource) -> Result<()> {
        self.save_entity(resource.id.to_string(), RESOURCE, resource)
            .await
    }

    async fn list_resources_in_scope(&self, scope: ScopeId) -> Result<Vec<Resource>> {
        self.filter_entities(RESOURCE, |r: &Resource| r.scope == scope)
            .await
    }

    async fn delete_resource(&mut self, id: ResourceId) -> Result<()> {
        self.delete_entity(id.to_string(), RESOURCE).await
    }

    async fn delete_resources_in_scope(&mut self, scope: ScopeId) -> Result<()> {
        self.delete_entities_where(
            RESOURCE,
            |r: &Resource| r.scope == scope,
            |r| r.id.to_string(),
        )
        .await
    }

    // === Transaction support ===

    async fn commit(&mut self, _message: &str) -> Result<()> {
        // SQLite writes are durable per statement.
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        warn!("rollback requested but SQLite backend writes through; manual cleanup needed");
        Ok(())
    }
}
