//! Member-facing submission paths and trainer grading.

use std::sync::Arc;

use async_trait::async_trait;
use skilltrack_core::{
    Actor, AnswerLetter, AssignmentId, CourseId, EngineError, ProgressStatus, QuizId,
    QuizSubmission, Result, Role, Submission, SubmissionId, TaskId, TaskStatus, TaskSubmission,
    TaskSubmissionId, UserId,
};
use skilltrack_progress::aggregator::course_snapshot;
use skilltrack_storage::{allowed_file, FileStore, Storage};
use tokio::sync::Mutex;
use tracing::info;

/// An uploaded file as received from the caller.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename; its extension is checked against the allow-list
    pub filename: String,

    /// File contents
    pub contents: Vec<u8>,
}

/// Submission write service.
#[async_trait]
pub trait SubmissionManager: Send + Sync {
    /// Hand in a file against an assignment. Late submissions are
    /// accepted; the file extension must be allow-listed.
    async fn submit_assignment(
        &mut self,
        actor: Actor,
        assignment_id: AssignmentId,
        upload: Upload,
    ) -> Result<Submission>;

    /// Attempt a quiz. One attempt per (student, quiz); the score counts
    /// exact matches against the stored correct letters.
    async fn submit_quiz(
        &mut self,
        actor: Actor,
        quiz_id: QuizId,
        answers: Vec<AnswerLetter>,
    ) -> Result<QuizSubmission>;

    /// Mark one of the caller's own tasks completed, optionally attaching
    /// a file. Re-completing refreshes the existing submission instead of
    /// duplicating it.
    async fn complete_task(
        &mut self,
        actor: Actor,
        task_id: TaskId,
        upload: Option<Upload>,
    ) -> Result<TaskSubmission>;

    /// Grade an assignment submission.
    async fn grade_submission(
        &mut self,
        actor: Actor,
        submission_id: SubmissionId,
        grade: String,
        feedback: Option<String>,
    ) -> Result<Submission>;

    /// Grade a task submission. When a status is given it is written to
    /// both the submission and the owning task.
    async fn grade_task_submission(
        &mut self,
        actor: Actor,
        submission_id: TaskSubmissionId,
        grade: String,
        feedback: Option<String>,
        status: Option<TaskStatus>,
    ) -> Result<TaskSubmission>;
}

fn check_upload(upload: &Upload) -> Result<()> {
    if allowed_file(&upload.filename) {
        Ok(())
    } else {
        Err(EngineError::Validation(format!(
            "file type not allowed: {:?}",
            upload.filename
        )))
    }
}

/// Recompute and persist the denormalized course progress row.
async fn refresh_progress<S: Storage + ?Sized>(
    storage: &mut S,
    user_id: UserId,
    course_id: CourseId,
) -> Result<()> {
    let snapshot = course_snapshot(storage, user_id, course_id).await?;
    let mut record = storage
        .find_progress_record(user_id, course_id)
        .await?
        .unwrap_or_else(|| skilltrack_core::ProgressRecord::new(user_id, course_id));

    record.progress = snapshot.percentage;
    record.status = if snapshot.percentage == 100 {
        ProgressStatus::Completed
    } else if snapshot.percentage > 0 {
        ProgressStatus::OnTrack
    } else {
        ProgressStatus::Enrolled
    };
    record.assignments_completed = snapshot.assignments_completed;
    record.total_assignments = snapshot.assignment_total;
    record.updated_at = chrono::Utc::now();
    storage.save_progress_record(&record).await?;
    Ok(())
}

/// Basic submission manager implementation.
pub struct BasicSubmissionManager<S: Storage, F: FileStore> {
    storage: Arc<Mutex<S>>,
    files: F,
}

impl<S: Storage, F: FileStore> BasicSubmissionManager<S, F> {
    /// Create a new submission manager.
    pub fn new(storage: S, files: F) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            files,
        }
    }

    async fn rollback_on<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.storage.lock().await.rollback().await?;
        }
        result
    }

    async fn submit_assignment_inner(
        &self,
        actor: Actor,
        assignment_id: AssignmentId,
        upload: Upload,
    ) -> Result<Submission> {
        if actor.role != Role::Student {
            return Err(EngineError::Authorization(
                "only students submit assignments".into(),
            ));
        }
        check_upload(&upload)?;

        let mut storage = self.storage.lock().await;
        let assignment = storage
            .load_assignment(assignment_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("assignment {assignment_id}")))?;

        let url = self
            .files
            .store(
                &format!("{}_{}_{}", actor.user_id, assignment_id, upload.filename),
                &upload.contents,
            )
            .await?;

        let submission = Submission::new(assignment_id, actor.user_id, Some(url));
        storage.save_submission(&submission).await?;
        refresh_progress(&mut *storage, actor.user_id, assignment.course_id).await?;
        storage
            .commit(&format!("submit assignment {assignment_id}"))
            .await?;

        info!(user_id = %actor.user_id, %assignment_id, "assignment submitted");
        Ok(submission)
    }

    async fn submit_quiz_inner(
        &self,
        actor: Actor,
        quiz_id: QuizId,
        answers: Vec<AnswerLetter>,
    ) -> Result<QuizSubmission> {
        if actor.role != Role::Student {
            return Err(EngineError::Authorization("only students attempt quizzes".into()));
        }

        let mut storage = self.storage.lock().await;
        let quiz = storage
            .load_quiz(quiz_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("quiz {quiz_id}")))?;

        if storage
            .find_quiz_submission(quiz_id, actor.user_id)
            .await?
            .is_some()
        {
            return Err(EngineError::Conflict(format!(
                "quiz {quiz_id} was already attempted"
            )));
        }
        if answers.len() != quiz.questions.len() {
            return Err(EngineError::Validation(format!(
                "expected {} answers, got {}",
                quiz.questions.len(),
                answers.len()
            )));
        }

        let score = quiz
            .questions
            .iter()
            .zip(&answers)
            .filter(|(question, answer)| question.correct == **answer)
            .count() as u32;
        let submission =
            QuizSubmission::new(quiz_id, actor.user_id, score, quiz.questions.len() as u32);
        storage.save_quiz_submission(&submission).await?;
        refresh_progress(&mut *storage, actor.user_id, quiz.course_id).await?;
        storage.commit(&format!("submit quiz {quiz_id}")).await?;

        info!(user_id = %actor.user_id, %quiz_id, score, "quiz submitted");
        Ok(submission)
    }

    async fn complete_task_inner(
        &self,
        actor: Actor,
        task_id: TaskId,
        upload: Option<Upload>,
    ) -> Result<TaskSubmission> {
        let mut storage = self.storage.lock().await;
        let mut task = storage
            .load_task(task_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("task {task_id}")))?;
        if task.assigned_to != actor.user_id {
            return Err(EngineError::Authorization(
                "a task can only be completed by its assignee".into(),
            ));
        }

        let file_url = match &upload {
            Some(upload) => {
                check_upload(upload)?;
                Some(
                    self.files
                        .store(
                            &format!("{}_{}_{}", actor.user_id, task_id, upload.filename),
                            &upload.contents,
                        )
                        .await?,
                )
            }
            None => None,
        };

        task.status = TaskStatus::Completed;
        storage.save_task(&task).await?;

        let submission = match storage.find_task_submission(task_id, actor.user_id).await? {
            Some(mut existing) => {
                existing.submitted_at = chrono::Utc::now();
                if file_url.is_some() {
                    existing.file_url = file_url;
                }
                existing
            }
            None => TaskSubmission::new(task_id, actor.user_id, file_url),
        };
        storage.save_task_submission(&submission).await?;

        if let Some(course_id) = task.scope.course() {
            refresh_progress(&mut *storage, actor.user_id, course_id).await?;
        }
        storage.commit(&format!("complete task {task_id}")).await?;

        info!(user_id = %actor.user_id, %task_id, "task completed");
        Ok(submission)
    }

    async fn grade_submission_inner(
        &self,
        actor: Actor,
        submission_id: SubmissionId,
        grade: String,
        feedback: Option<String>,
    ) -> Result<Submission> {
        if actor.role != Role::Trainer {
            return Err(EngineError::Authorization("only trainers grade".into()));
        }

        let mut storage = self.storage.lock().await;
        let mut submission = storage
            .load_submission(submission_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("submission {submission_id}")))?;

        submission.grade = Some(grade);
        submission.feedback = feedback;
        submission.status = "Reviewed".to_string();
        storage.save_submission(&submission).await?;
        storage
            .commit(&format!("grade submission {submission_id}"))
            .await?;
        Ok(submission)
    }

    async fn grade_task_submission_inner(
        &self,
        actor: Actor,
        submission_id: TaskSubmissionId,
        grade: String,
        feedback: Option<String>,
        status: Option<TaskStatus>,
    ) -> Result<TaskSubmission> {
        if actor.role != Role::Trainer {
            return Err(EngineError::Authorization("only trainers grade".into()));
        }

        let mut storage = self.storage.lock().await;
        let mut submission = storage
            .load_task_submission(submission_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("task submission {submission_id}")))?;

        submission.grade = Some(grade);
        submission.feedback = feedback;
        if let Some(status) = status {
            submission.status = status.to_string();
            // The owning task tracks the review outcome.
            if let Some(mut task) = storage.load_task(submission.task_id).await? {
                task.status = status;
                storage.save_task(&task).await?;
            }
        }
        storage.save_task_submission(&submission).await?;
        storage
            .commit(&format!("grade task submission {submission_id}"))
            .await?;
        Ok(submission)
    }
}

#[async_trait]
impl<S: Storage + 'static, F: FileStore + 'static> SubmissionManager
    for BasicSubmissionManager<S, F>
{
    async fn submit_assignment(
        &mut self,
        actor: Actor,
        assignment_id: AssignmentId,
        upload: Upload,
    ) -> Result<Submission> {
        let result = self.submit_assignment_inner(actor, assignment_id, upload).await;
        self.rollback_on(result).await
    }

    async fn submit_quiz(
        &mut self,
        actor: Actor,
        quiz_id: QuizId,
        answers: Vec<AnswerLetter>,
    ) -> Result<QuizSubmission> {
        let result = self.submit_quiz_inner(actor, quiz_id, answers).await;
        self.rollback_on(result).await
    }

    async fn complete_task(
        &mut self,
        actor: Actor,
        task_id: TaskId,
        upload: Option<Upload>,
    ) -> Result<TaskSubmission> {
        let result = self.complete_task_inner(actor, task_id, upload).await;
        self.rollback_on(result).await
    }

    async fn grade_submission(
        &mut self,
        actor: Actor,
        submission_id: SubmissionId,
        grade: String,
        feedback: Option<String>,
    ) -> Result<Submission> {
        let result = self
            .grade_submission_inner(actor, submission_id, grade, feedback)
            .await;
        self.rollback_on(result).await
    }

    async fn grade_task_submission(
        &mut self,
        actor: Actor,
        submission_id: TaskSubmissionId,
        grade: String,
        feedback: Option<String>,
        status: Option<TaskStatus>,
    ) -> Result<TaskSubmission> {
        let result = self
            .grade_task_submission_inner(actor, submission_id, grade, feedback, status)
            .await;
        self.rollback_on(result).await
    }
}
