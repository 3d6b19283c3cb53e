//! Storage trait abstraction.

use async_trait::async_trait;
use skilltrack_core::{
    Assignment, AssignmentId, Certificate, Course, CourseId, Enrollment, EnrollmentId, Internship,
    InternshipId, ProgressRecord, Quiz, QuizId, QuizSubmission, Resource, ResourceId, ScopeId,
    Submission, SubmissionId, Task, TaskId, TaskSubmission, TaskSubmissionId, User, UserId,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness constraint violated
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<StorageError> for skilltrack_core::EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => skilltrack_core::EngineError::NotFound(what),
            StorageError::Constraint(what) => skilltrack_core::EngineError::Conflict(what),
            other => skilltrack_core::EngineError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction for SkillTrack data.
///
/// The store does not cascade deletes; the lifecycle crate sequences them
/// explicitly. One invariant is enforced here as a backstop against
/// concurrent template propagation: saving a new Task whose
/// (assigned_to, scope, title) already exists is a constraint violation.
#[async_trait]
pub trait Storage: Send + Sync {
    // === User operations ===

    /// Save a user (create or update).
    async fn save_user(&mut self, user: &User) -> Result<()>;

    /// Load a user by ID.
    async fn load_user(&self, id: UserId) -> Result<Option<User>>;

    /// List all users.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Delete a user row. Dependent rows are the caller's problem.
    async fn delete_user(&mut self, id: UserId) -> Result<()>;

    // === Course operations ===

    /// Save a course (create or update).
    async fn save_course(&mut self, course: &Course) -> Result<()>;

    /// Load a course by ID.
    async fn load_course(&self, id: CourseId) -> Result<Option<Course>>;

    /// List all courses.
    async fn list_courses(&self) -> Result<Vec<Course>>;

    /// Delete a course row.
    async fn delete_course(&mut self, id: CourseId) -> Result<()>;

    // === Internship operations ===

    /// Save an internship (create or update).
    async fn save_internship(&mut self, internship: &Internship) -> Result<()>;

    /// Load an internship by ID.
    async fn load_internship(&self, id: InternshipId) -> Result<Option<Internship>>;

    /// List all internships.
    async fn list_internships(&self) -> Result<Vec<Internship>>;

    /// Delete an internship row.
    async fn delete_internship(&mut self, id: InternshipId) -> Result<()>;

    // === Enrollment operations ===

    /// Save an enrollment.
    async fn save_enrollment(&mut self, enrollment: &Enrollment) -> Result<()>;

    /// Load an enrollment by ID.
    async fn load_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>>;

    /// List a user's enrollments.
    async fn list_enrollments_for_user(&self, user_id: UserId) -> Result<Vec<Enrollment>>;

    /// List enrollments in a scope.
    async fn list_enrollments_in_scope(&self, scope: ScopeId) -> Result<Vec<Enrollment>>;

    /// Delete an enrollment row.
    async fn delete_enrollment(&mut self, id: EnrollmentId) -> Result<()>;

    // === Progress record operations ===

    /// Save a legacy progress record.
    async fn save_progress_record(&mut self, record: &ProgressRecord) -> Result<()>;

    /// Find the progress record for a (user, course) pair.
    async fn find_progress_record(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>>;

    /// List a user's progress records.
    async fn list_progress_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>>;

    /// List progress records in a course.
    async fn list_progress_in_course(&self, course_id: CourseId) -> Result<Vec<ProgressRecord>>;

    /// Delete all progress records of a user.
    async fn delete_progress_for_user(&mut self, user_id: UserId) -> Result<()>;

    /// Delete all progress records in a course.
    async fn delete_progress_in_course(&mut self, course_id: CourseId) -> Result<()>;

    // === Task operations ===

    /// Save a task. Inserting a second task with the same
    /// (assigned_to, scope, title) fails with [`StorageError::Constraint`].
    async fn save_task(&mut self, task: &Task) -> Result<()>;

    /// Load a task by ID.
    async fn load_task(&self, id: TaskId) -> Result<Option<Task>>;

    /// List every task assigned to a user, across scopes.
    async fn list_tasks_for_user(&self, user_id: UserId) -> Result<Vec<Task>>;

    /// List every task in a scope, across users.
    async fn list_tasks_in_scope(&self, scope: ScopeId) -> Result<Vec<Task>>;

    /// List every task created by a trainer.
    async fn list_tasks_by_creator(&self, trainer_id: UserId) -> Result<Vec<Task>>;

    /// Delete a task row.
    async fn delete_task(&mut self, id: TaskId) -> Result<()>;

    // === Assignment operations ===

    /// Save an assignment.
    async fn save_assignment(&mut self, assignment: &Assignment) -> Result<()>;

    /// Load an assignment by ID.
    async fn load_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>>;

    /// List assignments in a course.
    async fn list_assignments_in_course(&self, course_id: CourseId) -> Result<Vec<Assignment>>;

    /// Delete an assignment row.
    async fn delete_assignment(&mut self, id: AssignmentId) -> Result<()>;

    // === Quiz operations ===

    /// Save a quiz (questions embedded).
    async fn save_quiz(&mut self, quiz: &Quiz) -> Result<()>;

    /// Load a quiz by ID.
    async fn load_quiz(&self, id: QuizId) -> Result<Option<Quiz>>;

    /// List quizzes in a course.
    async fn list_quizzes_in_course(&self, course_id: CourseId) -> Result<Vec<Quiz>>;

    /// Delete a quiz row.
    async fn delete_quiz(&mut self, id: QuizId) -> Result<()>;

    // === Assignment submission operations ===

    /// Save an assignment submission.
    async fn save_submission(&mut self, submission: &Submission) -> Result<()>;

    /// Load an assignment submission by ID.
    async fn load_submission(&self, id: SubmissionId) -> Result<Option<Submission>>;

    /// List a student's assignment submissions.
    async fn list_submissions_for_student(&self, student_id: UserId) -> Result<Vec<Submission>>;

    /// List submissions against an assignment.
    async fn list_submissions_for_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<Vec<Submission>>;

    /// Delete all assignment submissions of a student.
    async fn delete_submissions_for_student(&mut self, student_id: UserId) -> Result<()>;

    /// Delete all submissions against an assignment.
    async fn delete_submissions_for_assignment(&mut self, assignment_id: AssignmentId)
        -> Result<()>;

    // === Task submission operations ===

    /// Save a task submission (create or update).
    async fn save_task_submission(&mut self, submission: &TaskSubmission) -> Result<()>;

    /// Load a task submission by ID.
    async fn load_task_submission(&self, id: TaskSubmissionId) -> Result<Option<TaskSubmission>>;

    /// Find the submission for a (task, student) pair.
    async fn find_task_submission(
        &self,
        task_id: TaskId,
        student_id: UserId,
    ) -> Result<Option<TaskSubmission>>;

    /// List a student's task submissions.
    async fn list_task_submissions_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<TaskSubmission>>;

    /// List submissions against a task.
    async fn list_task_submissions_for_task(&self, task_id: TaskId)
        -> Result<Vec<TaskSubmission>>;

    /// Delete all task submissions of a student.
    async fn delete_task_submissions_for_student(&mut self, student_id: UserId) -> Result<()>;

    /// Delete all submissions against a task.
    async fn delete_task_submissions_for_task(&mut self, task_id: TaskId) -> Result<()>;

    // === Quiz submission operations ===

    /// Save a quiz submission.
    async fn save_quiz_submission(&mut self, submission: &QuizSubmission) -> Result<()>;

    /// Find the submission for a (quiz, student) pair.
    async fn find_quiz_submission(
        &self,
        quiz_id: QuizId,
        student_id: UserId,
    ) -> Result<Option<QuizSubmission>>;

    /// List a student's quiz submissions.
    async fn list_quiz_submissions_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<QuizSubmission>>;

    /// List submissions against a quiz.
    async fn list_quiz_submissions_for_quiz(&self, quiz_id: QuizId)
        -> Result<Vec<QuizSubmission>>;

    /// Delete all quiz submissions of a student.
    async fn delete_quiz_submissions_for_student(&mut self, student_id: UserId) -> Result<()>;

    /// Delete all submissions against a quiz.
    async fn delete_quiz_submissions_for_quiz(&mut self, quiz_id: QuizId) -> Result<()>;

    // === Certificate operations ===

    /// Save a certificate (create or overwrite).
    async fn save_certificate(&mut self, certificate: &Certificate) -> Result<()>;

    /// Find the certificate for a (user, course) pair.
    async fn find_certificate(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Certificate>>;

    /// Delete all certificates of a user.
    async fn delete_certificates_for_user(&mut self, user_id: UserId) -> Result<()>;

    /// Delete all certificates for a course.
    async fn delete_certificates_for_course(&mut self, course_id: CourseId) -> Result<()>;

    // === Resource operations ===

    /// Save a resource.
    async fn save_resource(&mut self, resource: &Resource) -> Result<()>;

    /// List resources in a scope.
    async fn list_resources_in_scope(&self, scope: ScopeId) -> Result<Vec<Resource>>;

    /// Delete a resource row.
    async fn delete_resource(&mut self, id: ResourceId) -> Result<()>;

    /// Delete all resources in a scope.
    async fn delete_resources_in_scope(&mut self, scope: ScopeId) -> Result<()>;

    // === Transaction support ===

    /// Commit pending changes with a message.
    async fn commit(&mut self, message: &str) -> Result<()>;

    /// Roll back to the last committed state.
    async fn rollback(&mut self) -> Result<()>;
}
