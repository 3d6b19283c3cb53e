//! In-memory storage backend.
//!
//! Clones share state, so several services can hold handles to the same
//! store. Commit snapshots the tables; rollback restores the snapshot,
//! which gives deletion coordinators real all-or-nothing semantics even
//! without a database underneath. This is also the test backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use skilltrack_core::{
    Assignment, AssignmentId, Certificate, CertificateId, Course, CourseId, Enrollment,
    EnrollmentId, Internship, InternshipId, ProgressRecord, ProgressRecordId, Quiz, QuizId,
    QuizSubmission, QuizSubmissionId, Resource, ResourceId, ScopeId, Submission, SubmissionId,
    Task, TaskId, TaskSubmission, TaskSubmissionId, User, UserId,
};
use tokio::sync::Mutex;

use super::trait_::{Result, Storage, StorageError};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    courses: HashMap<CourseId, Course>,
    internships: HashMap<InternshipId, Internship>,
    enrollments: HashMap<EnrollmentId, Enrollment>,
    progress: HashMap<ProgressRecordId, ProgressRecord>,
    tasks: HashMap<TaskId, Task>,
    assignments: HashMap<AssignmentId, Assignment>,
    quizzes: HashMap<QuizId, Quiz>,
    submissions: HashMap<SubmissionId, Submission>,
    task_submissions: HashMap<TaskSubmissionId, TaskSubmission>,
    quiz_submissions: HashMap<QuizSubmissionId, QuizSubmission>,
    certificates: HashMap<CertificateId, Certificate>,
    resources: HashMap<ResourceId, Resource>,
}

#[derive(Debug, Default)]
struct State {
    live: Tables,
    committed: Tables,
}

/// Shared in-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<State>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    // === User operations ===

    async fn save_user(&mut self, user: &User) -> Result<()> {
        let mut state = self.state.lock().await;
        state.live.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn load_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.state.lock().await.live.users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.state.lock().await.live.users.values().cloned().collect())
    }

    async fn delete_user(&mut self, id: UserId) -> Result<()> {
        self.state.lock().await.live.users.remove(&id);
        Ok(())
    }

    // === Course operations ===

    async fn save_course(&mut self, course: &Course) -> Result<()> {
        let mut state = self.state.lock().await;
        state.live.courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn load_course(&self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.state.lock().await.live.courses.get(&id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        Ok(self.state.lock().await.live.courses.values().cloned().collect())
    }

    async fn delete_course(&mut self, id: CourseId) -> Result<()> {
        self.state.lock().await.live.courses.remove(&id);
        Ok(())
    }

    // === Internship operations ===

    async fn save_internship(&mut self, internship: &Internship) -> Result<()> {
        let mut state = self.state.lock().await;
        state.live.internships.insert(internship.id, internship.clone());
        Ok(())
    }

    async fn load_internship(&self, id: InternshipId) -> Result<Option<Internship>> {
        Ok(self.state.lock().await.live.internships.get(&id).cloned())
    }

    async fn list_internships(&self) -> Result<Vec<Internship>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .internships
            .values()
            .cloned()
            .collect())
    }

    async fn delete_internship(&mut self, id: InternshipId) -> Result<()> {
        self.state.lock().await.live.internships.remove(&id);
        Ok(())
    }

    // === Enrollment operations ===

    async fn save_enrollment(&mut self, enrollment: &Enrollment) -> Result<()> {
        let mut state = self.state.lock().await;
        let duplicate = state.live.enrollments.values().any(|e| {
            e.id != enrollment.id
                && e.user_id == enrollment.user_id
                && e.scope == enrollment.scope
        });
        if duplicate {
            return Err(StorageError::Constraint(format!(
                "user {} already enrolled in {}",
                enrollment.user_id, enrollment.scope
            )));
        }
        state.live.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(())
    }

    async fn load_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>> {
        Ok(self.state.lock().await.live.enrollments.get(&id).cloned())
    }

    async fn list_enrollments_for_user(&self, user_id: UserId) -> Result<Vec<Enrollment>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .enrollments
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_enrollments_in_scope(&self, scope: ScopeId) -> Result<Vec<Enrollment>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .enrollments
            .values()
            .filter(|e| e.scope == scope)
            .cloned()
            .collect())
    }

    async fn delete_enrollment(&mut self, id: EnrollmentId) -> Result<()> {
        self.state.lock().await.live.enrollments.remove(&id);
        Ok(())
    }

    // === Progress record operations ===

    async fn save_progress_record(&mut self, record: &ProgressRecord) -> Result<()> {
        let mut state = self.state.lock().await;
        state.live.progress.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_progress_record(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .progress
            .values()
            .find(|r| r.user_id == user_id && r.course_id == course_id)
            .cloned())
    }

    async fn list_progress_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .progress
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_progress_in_course(&self, course_id: CourseId) -> Result<Vec<ProgressRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .progress
            .values()
            .filter(|r| r.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn delete_progress_for_user(&mut self, user_id: UserId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .progress
            .retain(|_, r| r.user_id != user_id);
        Ok(())
    }

    async fn delete_progress_in_course(&mut self, course_id: CourseId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .progress
            .retain(|_, r| r.course_id != course_id);
        Ok(())
    }

    // === Task operations ===

    async fn save_task(&mut self, task: &Task) -> Result<()> {
        let mut state = self.state.lock().await;
        let duplicate = state.live.tasks.values().any(|t| {
            t.id != task.id
                && t.assigned_to == task.assigned_to
                && t.scope == task.scope
                && t.title == task.title
        });
        if duplicate {
            return Err(StorageError::Constraint(format!(
                "task {:?} already assigned to {} in {}",
                task.title, task.assigned_to, task.scope
            )));
        }
        state.live.tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.state.lock().await.live.tasks.get(&id).cloned())
    }

    async fn list_tasks_for_user(&self, user_id: UserId) -> Result<Vec<Task>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .tasks
            .values()
            .filter(|t| t.assigned_to == user_id)
            .cloned()
            .collect())
    }

    async fn list_tasks_in_scope(&self, scope: ScopeId) -> Result<Vec<Task>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .tasks
            .values()
            .filter(|t| t.scope == scope)
            .cloned()
            .collect())
    }

    async fn list_tasks_by_creator(&self, trainer_id: UserId) -> Result<Vec<Task>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .tasks
            .values()
            .filter(|t| t.assigned_by == trainer_id)
            .cloned()
            .collect())
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.state.lock().await.live.tasks.remove(&id);
        Ok(())
    }

    // === Assignment operations ===

    async fn save_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        let mut state = self.state.lock().await;
        state.live.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn load_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>> {
        Ok(self.state.lock().await.live.assignments.get(&id).cloned())
    }

    async fn list_assignments_in_course(&self, course_id: CourseId) -> Result<Vec<Assignment>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .assignments
            .values()
            .filter(|a| a.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn delete_assignment(&mut self, id: AssignmentId) -> Result<()> {
        self.state.lock().await.live.assignments.remove(&id);
        Ok(())
    }

    // === Quiz operations ===

    async fn save_quiz(&mut self, quiz: &Quiz) -> Result<()> {
        let mut state = self.state.lock().await;
        state.live.quizzes.insert(quiz.id, quiz.clone());
        Ok(())
    }

    async fn load_quiz(&self, id: QuizId) -> Result<Option<Quiz>> {
        Ok(self.state.lock().await.live.quizzes.get(&id).cloned())
    }

    async fn list_quizzes_in_course(&self, course_id: CourseId) -> Result<Vec<Quiz>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .quizzes
            .values()
            .filter(|q| q.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn delete_quiz(&mut self, id: QuizId) -> Result<()> {
        self.state.lock().await.live.quizzes.remove(&id);
        Ok(())
    }

    // === Assignment submission operations ===

    async fn save_submission(&mut self, submission: &Submission) -> Result<()> {
        let mut state = self.state.lock().await;
        state.live.submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn load_submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
        Ok(self.state.lock().await.live.submissions.get(&id).cloned())
    }

    async fn list_submissions_for_student(&self, student_id: UserId) -> Result<Vec<Submission>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .submissions
            .values()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_submissions_for_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<Vec<Submission>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .submissions
            .values()
            .filter(|s| s.assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    async fn delete_submissions_for_student(&mut self, student_id: UserId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .submissions
            .retain(|_, s| s.student_id != student_id);
        Ok(())
    }

    async fn delete_submissions_for_assignment(
        &mut self,
        assignment_id: AssignmentId,
    ) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .submissions
            .retain(|_, s| s.assignment_id != assignment_id);
        Ok(())
    }

    // === Task submission operations ===

    async fn save_task_submission(&mut self, submission: &TaskSubmission) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .live
            .task_submissions
            .insert(submission.id, submission.clone());
        Ok(())
    }

    async fn load_task_submission(
        &self,
        id: TaskSubmissionId,
    ) -> Result<Option<TaskSubmission>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .task_submissions
            .get(&id)
            .cloned())
    }

    async fn find_task_submission(
        &self,
        task_id: TaskId,
        student_id: UserId,
    ) -> Result<Option<TaskSubmission>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .task_submissions
            .values()
            .find(|s| s.task_id == task_id && s.student_id == student_id)
            .cloned())
    }

    async fn list_task_submissions_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<TaskSubmission>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .task_submissions
            .values()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_task_submissions_for_task(
        &self,
        task_id: TaskId,
    ) -> Result<Vec<TaskSubmission>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .task_submissions
            .values()
            .filter(|s| s.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn delete_task_submissions_for_student(&mut self, student_id: UserId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .task_submissions
            .retain(|_, s| s.student_id != student_id);
        Ok(())
    }

    async fn delete_task_submissions_for_task(&mut self, task_id: TaskId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .task_submissions
            .retain(|_, s| s.task_id != task_id);
        Ok(())
    }

    // === Quiz submission operations ===

    async fn save_quiz_submission(&mut self, submission: &QuizSubmission) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .live
            .quiz_submissions
            .insert(submission.id, submission.clone());
        Ok(())
    }

    async fn find_quiz_submission(
        &self,
        quiz_id: QuizId,
        student_id: UserId,
    ) -> Result<Option<QuizSubmission>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .quiz_submissions
            .values()
            .find(|s| s.quiz_id == quiz_id && s.student_id == student_id)
            .cloned())
    }

    async fn list_quiz_submissions_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<QuizSubmission>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .quiz_submissions
            .values()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_quiz_submissions_for_quiz(
        &self,
        quiz_id: QuizId,
    ) -> Result<Vec<QuizSubmission>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .quiz_submissions
            .values()
            .filter(|s| s.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn delete_quiz_submissions_for_student(&mut self, student_id: UserId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .quiz_submissions
            .retain(|_, s| s.student_id != student_id);
        Ok(())
    }

    async fn delete_quiz_submissions_for_quiz(&mut self, quiz_id: QuizId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .quiz_submissions
            .retain(|_, s| s.quiz_id != quiz_id);
        Ok(())
    }

    // === Certificate operations ===

    async fn save_certificate(&mut self, certificate: &Certificate) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .live
            .certificates
            .insert(certificate.id, certificate.clone());
        Ok(())
    }

    async fn find_certificate(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Certificate>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .certificates
            .values()
            .find(|c| c.user_id == user_id && c.course_id == course_id)
            .cloned())
    }

    async fn delete_certificates_for_user(&mut self, user_id: UserId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .certificates
            .retain(|_, c| c.user_id != user_id);
        Ok(())
    }

    async fn delete_certificates_for_course(&mut self, course_id: CourseId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .certificates
            .retain(|_, c| c.course_id != course_id);
        Ok(())
    }

    // === Resource operations ===

    async fn save_resource(&mut self, resource: &Resource) -> Result<()> {
        let mut state = self.state.lock().await;
        state.live.resources.insert(resource.id, resource.clone());
        Ok(())
    }

    async fn list_resources_in_scope(&self, scope: ScopeId) -> Result<Vec<Resource>> {
        Ok(self
            .state
            .lock()
            .await
            .live
            .resources
            .values()
            .filter(|r| r.scope == scope)
            .cloned()
            .collect())
    }

    async fn delete_resource(&mut self, id: ResourceId) -> Result<()> {
        self.state.lock().await.live.resources.remove(&id);
        Ok(())
    }

    async fn delete_resources_in_scope(&mut self, scope: ScopeId) -> Result<()> {
        self.state
            .lock()
            .await
            .live
            .resources
            .retain(|_, r| r.scope != scope);
        Ok(())
    }

    // === Transaction support ===

    async fn commit(&mut self, _message: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.committed = state.live.clone();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.live = state.committed.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltrack_core::{Role, TaskPriority, TaskStatus};

    fn sample_task(user_id: UserId, scope: ScopeId, title: &str) -> Task {
        Task {
            id: TaskId::new(),
            scope,
            title: title.to_string(),
            description: String::new(),
            week_number: 1,
            due_date: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            assigned_to: user_id,
            assigned_by: UserId::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let mut storage = MemoryStorage::new();
        let user = User::new("Asha", Role::Student);
        storage.save_user(&user).await.unwrap();

        let loaded = storage.load_user(user.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Asha");
        assert!(storage.load_user(UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mut writer = MemoryStorage::new();
        let reader = writer.clone();

        let user = User::new("Ben", Role::Intern);
        writer.save_user(&user).await.unwrap();
        assert!(reader.load_user(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_task_title_is_rejected() {
        let mut storage = MemoryStorage::new();
        let user_id = UserId::new();
        let scope = ScopeId::Internship(InternshipId::new());

        storage
            .save_task(&sample_task(user_id, scope, "Week 1 report"))
            .await
            .unwrap();
        let err = storage
            .save_task(&sample_task(user_id, scope, "Week 1 report"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)));

        // Same title for a different user is fine.
        storage
            .save_task(&sample_task(UserId::new(), scope, "Week 1 report"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_enrollment_is_rejected() {
        let mut storage = MemoryStorage::new();
        let user_id = UserId::new();
        let scope = ScopeId::Course(CourseId::new());

        storage
            .save_enrollment(&Enrollment::new(user_id, scope))
            .await
            .unwrap();
        let err = storage
            .save_enrollment(&Enrollment::new(user_id, scope))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)));
    }

    #[tokio::test]
    async fn rollback_restores_last_commit() {
        let mut storage = MemoryStorage::new();
        let keeper = User::new("Keep", Role::Student);
        storage.save_user(&keeper).await.unwrap();
        storage.commit("seed").await.unwrap();

        let goner = User::new("Gone", Role::Student);
        storage.save_user(&goner).await.unwrap();
        storage.delete_user(keeper.id).await.unwrap();
        storage.rollback().await.unwrap();

        assert!(storage.load_user(keeper.id).await.unwrap().is_some());
        assert!(storage.load_user(goner.id).await.unwrap().is_none());
    }
}
