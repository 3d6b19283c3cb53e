//! Work-item creation and template maintenance.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use skilltrack_core::{
    Actor, Assignment, AssignmentId, Course, CourseId, EngineError, LimitKind, Question,
    QuestionId, Quiz, QuizId, Result, Role, ScopeId, Task, TaskId, TaskPriority, TaskStatus,
};
use skilltrack_storage::{Storage, StorageError};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Fields for a new assignment. The week number is assigned
/// automatically, one past the current count.
#[derive(Debug, Clone)]
pub struct AssignmentSpec {
    /// Title
    pub title: String,

    /// Deadline, if any
    pub due_date: Option<NaiveDate>,
}

/// Fields for one quiz question.
#[derive(Debug, Clone)]
pub struct QuestionSpec {
    /// Question text
    pub text: String,

    /// The four options
    pub options: [String; 4],

    /// The correct option
    pub correct: skilltrack_core::AnswerLetter,
}

/// Fields for a new quiz.
#[derive(Debug, Clone)]
pub struct QuizSpec {
    /// Title
    pub title: String,

    /// Deadline, if any
    pub deadline: Option<NaiveDate>,

    /// Questions, in presentation order
    pub questions: Vec<QuestionSpec>,
}

/// Fields for a new task round.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Title, unique per (user, scope)
    pub title: String,

    /// Description
    pub description: String,

    /// Week the round belongs to, 1-based
    pub week_number: u32,

    /// Deadline, if any
    pub due_date: Option<NaiveDate>,

    /// Priority
    pub priority: TaskPriority,
}

/// Partial update applied to every sister instance of a task template.
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskTemplateUpdate {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New deadline
    pub due_date: Option<NaiveDate>,

    /// New priority
    pub priority: Option<TaskPriority>,
}

/// Trainer-facing work-item write service.
#[async_trait]
pub trait WorkItemManager: Send + Sync {
    /// Create a released assignment in a course.
    async fn create_assignment(
        &mut self,
        actor: Actor,
        course_id: CourseId,
        spec: AssignmentSpec,
    ) -> Result<Assignment>;

    /// Create a quiz in a course.
    async fn create_quiz(
        &mut self,
        actor: Actor,
        course_id: CourseId,
        spec: QuizSpec,
    ) -> Result<Quiz>;

    /// Fan a task round out to every enrolled member of the scope. When
    /// nobody is enrolled yet, a single self-assigned instance is created
    /// so the template exists for later propagation.
    async fn assign_task(
        &mut self,
        actor: Actor,
        scope: ScopeId,
        spec: TaskSpec,
    ) -> Result<Vec<Task>>;

    /// Apply an update to every sister instance of a template, identified
    /// by (scope, title, week). Returns how many instances changed.
    async fn update_task_template(
        &mut self,
        actor: Actor,
        scope: ScopeId,
        title: &str,
        week_number: u32,
        update: TaskTemplateUpdate,
    ) -> Result<u32>;

    /// Delete every sister instance of a template, each instance's
    /// submissions first. Returns how many instances went.
    async fn delete_task_template(
        &mut self,
        actor: Actor,
        scope: ScopeId,
        title: &str,
        week_number: u32,
    ) -> Result<u32>;

    /// Set a scope's cap if it is still unset. Returns whether the value
    /// was applied; a cap that is already set is left alone.
    async fn set_limit_once(
        &mut self,
        actor: Actor,
        scope: ScopeId,
        kind: LimitKind,
        value: i64,
    ) -> Result<bool>;
}

fn require_trainer(actor: Actor) -> Result<()> {
    if actor.role == Role::Trainer {
        Ok(())
    } else {
        Err(EngineError::Authorization(format!(
            "requires trainer role, caller is {}",
            actor.role
        )))
    }
}

fn validate_questions(questions: &[QuestionSpec]) -> Result<()> {
    if questions.is_empty() {
        return Err(EngineError::Validation("a quiz needs at least one question".into()));
    }
    for (i, q) in questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            return Err(EngineError::Validation(format!("question {} has no text", i + 1)));
        }
        if q.options.iter().any(|o| o.trim().is_empty()) {
            return Err(EngineError::Validation(format!(
                "question {} has an empty option",
                i + 1
            )));
        }
    }
    Ok(())
}

/// Insert a quiz under the course's cap, week auto-assigned. Shared by
/// the manager and the importer.
pub(crate) async fn insert_quiz<S: Storage + ?Sized>(
    storage: &mut S,
    course: &Course,
    title: String,
    deadline: Option<NaiveDate>,
    questions: Vec<QuestionSpec>,
) -> Result<Quiz> {
    validate_questions(&questions)?;

    let existing = storage.list_quizzes_in_course(course.id).await?;
    if let Some(limit) = course.quiz_limit {
        if existing.len() as u32 >= limit {
            return Err(EngineError::LimitReached {
                kind: LimitKind::Quizzes,
                limit,
                scope: ScopeId::Course(course.id),
            });
        }
    }

    let quiz = Quiz {
        id: QuizId::new(),
        course_id: course.id,
        title,
        week_number: existing.len() as u32 + 1,
        deadline,
        questions: questions
            .into_iter()
            .map(|q| Question {
                id: QuestionId::new(),
                text: q.text,
                options: q.options,
                correct: q.correct,
            })
            .collect(),
        created_at: chrono::Utc::now(),
    };
    storage.save_quiz(&quiz).await?;
    Ok(quiz)
}

/// Basic work-item manager implementation.
pub struct BasicWorkItemManager<S: Storage> {
    storage: Arc<Mutex<S>>,
}

impl<S: Storage> BasicWorkItemManager<S> {
    /// Create a new work-item manager.
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

    async fn create_assignment_inner(
        &self,
        actor: Actor,
        course_id: CourseId,
        spec: AssignmentSpec,
    ) -> Result<Assignment> {
        require_trainer(actor)?;
        let mut storage = self.storage.lock().await;

        let course = storage
            .load_course(course_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("course {course_id}")))?;

        let existing = storage.list_assignments_in_course(course_id).await?;
        if let Some(limit) = course.assignment_limit {
            if existing.len() as u32 >= limit {
                return Err(EngineError::LimitReached {
                    kind: LimitKind::Assignments,
                    limit,
                    scope: ScopeId::Course(course_id),
                });
            }
        }

        let assignment = Assignment {
            id: AssignmentId::new(),
            course_id,
            title: spec.title,
            week_number: existing.len() as u32 + 1,
            due_date: spec.due_date,
            is_released: true,
            created_at: chrono::Utc::now(),
        };
        storage.save_assignment(&assignment).await?;

        // Keep the denormalized trainer view in step.
        for mut record in storage.list_progress_in_course(course_id).await? {
            record.total_assignments += 1;
            record.updated_at = chrono::Utc::now();
            storage.save_progress_record(&record).await?;
        }

        storage
            .commit(&format!("create assignment in course {course_id}"))
            .await?;
        info!(%course_id, assignment_id = %assignment.id, "created assignment");
        Ok(assignment)
    }

    async fn assign_task_inner(
        &self,
        actor: Actor,
        scope: ScopeId,
        spec: TaskSpec,
    ) -> Result<Vec<Task>> {
        require_trainer(actor)?;
        if spec.title.trim().is_empty() {
            return Err(EngineError::Validation("task title is required".into()));
        }
        let mut storage = self.storage.lock().await;

        let existing = storage.list_tasks_in_scope(scope).await?;
        if let Some(internship_id) = scope.internship() {
            let internship = storage
                .load_internship(internship_id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("internship {internship_id}")))?;
            let cap = internship
                .task_limit
                .unwrap_or_else(|| internship.duration.required_tasks());

            let weeks: BTreeSet<u32> = existing.iter().map(|t| t.week_number).collect();
            if !weeks.contains(&spec.week_number) && weeks.len() as u32 >= cap {
                return Err(EngineError::LimitReached {
                    kind: LimitKind::Tasks,
                    limit: cap,
                    scope,
                });
            }
        } else if let Some(course_id) = scope.course() {
            storage
                .load_course(course_id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("course {course_id}")))?;
        }

        let mut recipients: Vec<_> = storage
            .list_enrollments_in_scope(scope)
            .await?
            .into_iter()
            .map(|e| e.user_id)
            .collect();
        if recipients.is_empty() {
            // Nobody aboard yet; hold the template on the trainer.
            recipients.push(actor.user_id);
        }

        let template = Task {
            id: TaskId::new(),
            scope,
            title: spec.title,
            description: spec.description,
            week_number: spec.week_number,
            due_date: spec.due_date,
            status: TaskStatus::Pending,
            priority: spec.priority,
            assigned_to: actor.user_id,
            assigned_by: actor.user_id,
            created_at: chrono::Utc::now(),
        };

        let mut created = Vec::new();
        for user_id in recipients {
            let instance = if user_id == template.assigned_to {
                template.clone()
            } else {
                template.reassigned_to(user_id)
            };
            match storage.save_task(&instance).await {
                Ok(()) => created.push(instance),
                Err(StorageError::Constraint(_)) => {
                    debug!(%user_id, %scope, title = template.title, "already holds this task");
                }
                Err(e) => return Err(e.into()),
            }
        }

        storage.commit(&format!("assign task round in {scope}")).await?;
        info!(%scope, count = created.len(), "assigned task round");
        Ok(created)
    }

    async fn update_template_inner(
        &self,
        actor: Actor,
        scope: ScopeId,
        title: &str,
        week_number: u32,
        update: TaskTemplateUpdate,
    ) -> Result<u32> {
        require_trainer(actor)?;
        let mut storage = self.storage.lock().await;

        let sisters: Vec<Task> = storage
            .list_tasks_in_scope(scope)
            .await?
            .into_iter()
            .filter(|t| t.title == title && t.week_number == week_number)
            .collect();
        if sisters.is_empty() {
            return Err(EngineError::NotFound(format!(
                "no task {title:?} in week {week_number} of {scope}"
            )));
        }

        let mut changed = 0;
        for mut task in sisters {
            if let Some(title) = &update.title {
                task.title = title.clone();
            }
            if let Some(description) = &update.description {
                task.description = description.clone();
            }
            if let Some(due_date) = update.due_date {
                task.due_date = Some(due_date);
            }
            if let Some(priority) = update.priority {
                task.priority = priority;
            }
            storage.save_task(&task).await?;
            changed += 1;
        }

        storage
            .commit(&format!("update task template {title:?} in {scope}"))
            .await?;
        Ok(changed)
    }

    async fn delete_template_inner(
        &self,
        actor: Actor,
        scope: ScopeId,
        title: &str,
        week_number: u32,
    ) -> Result<u32> {
        require_trainer(actor)?;
        let mut storage = self.storage.lock().await;

        let sisters: Vec<Task> = storage
            .list_tasks_in_scope(scope)
            .await?
            .into_iter()
            .filter(|t| t.title == title && t.week_number == week_number)
            .collect();

        let mut deleted = 0;
        for task in sisters {
            // Submissions first, then the owning task.
            storage.delete_task_submissions_for_task(task.id).await?;
            storage.delete_task(task.id).await?;
            deleted += 1;
        }

        storage
            .commit(&format!("delete task template {title:?} in {scope}"))
            .await?;
        info!(%scope, title, deleted, "deleted task template");
        Ok(deleted)
    }
}

#[async_trait]
impl<S: Storage + 'static> WorkItemManager for BasicWorkItemManager<S> {
    async fn create_assignment(
        &mut self,
        actor: Actor,
        course_id: CourseId,
        spec: AssignmentSpec,
    ) -> Result<Assignment> {
        let result = self.create_assignment_inner(actor, course_id, spec).await;
        self.rollback_on(result).await
    }

    async fn create_quiz(
        &mut self,
        actor: Actor,
        course_id: CourseId,
        spec: QuizSpec,
    ) -> Result<Quiz> {
        require_trainer(actor)?;
        let mut storage = self.storage.lock().await;

        let course = storage
            .load_course(course_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("course {course_id}")))?;

        let quiz = insert_quiz(&mut *storage, &course, spec.title, spec.deadline, spec.questions)
            .await?;
        storage.commit(&format!("create quiz in course {course_id}")).await?;
        info!(%course_id, quiz_id = %quiz.id, "created quiz");
        Ok(quiz)
    }

    async fn assign_task(
        &mut self,
        actor: Actor,
        scope: ScopeId,
        spec: TaskSpec,
    ) -> Result<Vec<Task>> {
        let result = self.assign_task_inner(actor, scope, spec).await;
        self.rollback_on(result).await
    }

    async fn update_task_template(
        &mut self,
        actor: Actor,
        scope: ScopeId,
        title: &str,
        week_number: u32,
        update: TaskTemplateUpdate,
    ) -> Result<u32> {
        let result = self
            .update_template_inner(actor, scope, title, week_number, update)
            .await;
        self.rollback_on(result).await
    }

    async fn delete_task_template(
        &mut self,
        actor: Actor,
        scope: ScopeId,
        title: &str,
        week_number: u32,
    ) -> Result<u32> {
        let result = self
            .delete_template_inner(actor, scope, title, week_number)
            .await;
        self.rollback_on(result).await
    }

    async fn set_limit_once(
        &mut self,
        actor: Actor,
        scope: ScopeId,
        kind: LimitKind,
        value: i64,
    ) -> Result<bool> {
        require_trainer(actor)?;
        if value < 0 {
            return Err(EngineError::Validation(format!(
                "a {kind} limit cannot be negative"
            )));
        }
        let value = value as u32;
        let mut storage = self.storage.lock().await;

        let applied = match (scope, kind) {
            (ScopeId::Course(course_id), LimitKind::Assignments | LimitKind::Quizzes) => {
                let mut course = storage
                    .load_course(course_id)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("course {course_id}")))?;
                let slot = match kind {
                    LimitKind::Assignments => &mut course.assignment_limit,
                    _ => &mut course.quiz_limit,
                };
                if slot.is_some() {
                    false
                } else {
                    *slot = Some(value);
                    storage.save_course(&course).await?;
                    true
                }
            }
            (ScopeId::Internship(internship_id), LimitKind::Tasks) => {
                let mut internship = storage
                    .load_internship(internship_id)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("internship {internship_id}")))?;
                if internship.task_limit.is_some() {
                    false
                } else {
                    internship.task_limit = Some(value);
                    storage.save_internship(&internship).await?;
                    true
                }
            }
            _ => {
                return Err(EngineError::Validation(format!(
                    "a {kind} limit does not apply to {scope}"
                )))
            }
        };

        if applied {
            storage.commit(&format!("set {kind} limit on {scope}")).await?;
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltrack_core::{AnswerLetter, Enrollment, ProgramDuration, ProgressRecord, UserId};
    use skilltrack_storage::MemoryStorage;

    fn trainer() -> Actor {
        Actor::new(UserId::new(), Role::Trainer)
    }

    fn course() -> Course {
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

    fn internship(task_limit: Option<u32>) -> skilltrack_core::Internship {
        skilltrack_core::Internship {
            id: skilltrack_core::InternshipId::new(),
            title: "Backend".into(),
            mentor_name: "Priya".into(),
            duration: ProgramDuration::default(),
            task_limit,
            created_at: chrono::Utc::now(),
        }
    }

    fn spec(title: &str) -> AssignmentSpec {
        AssignmentSpec {
            title: title.into(),
            due_date: None,
        }
    }

    fn task_spec(title: &str, week: u32) -> TaskSpec {
        TaskSpec {
            title: title.into(),
            description: String::new(),
            week_number: week,
            due_date: None,
            priority: TaskPriority::Medium,
        }
    }

    #[tokio::test]
    async fn assignment_weeks_are_sequential_and_capped() {
        let mut storage = MemoryStorage::new();
        let mut c = course();
        c.assignment_limit = Some(2);
        storage.save_course(&c).await.unwrap();

        let mut manager = BasicWorkItemManager::new(storage);
        let a1 = manager
            .create_assignment(trainer(), c.id, spec("One"))
            .await
            .unwrap();
        let a2 = manager
            .create_assignment(trainer(), c.id, spec("Two"))
            .await
            .unwrap();
        assert_eq!((a1.week_number, a2.week_number), (1, 2));
        assert!(a1.is_released);

        let err = manager
            .create_assignment(trainer(), c.id, spec("Three"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::LimitReached {
                kind: LimitKind::Assignments,
                limit: 2,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn creating_an_assignment_bumps_progress_totals() {
        let mut storage = MemoryStorage::new();
        let c = course();
        storage.save_course(&c).await.unwrap();
        let student = UserId::new();
        storage
            .save_progress_record(&ProgressRecord::new(student, c.id))
            .await
            .unwrap();

        let reader = storage.clone();
        let mut manager = BasicWorkItemManager::new(storage);
        manager
            .create_assignment(trainer(), c.id, spec("One"))
            .await
            .unwrap();

        let record = reader
            .find_progress_record(student, c.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.total_assignments, 1);
    }

    #[tokio::test]
    async fn quiz_questions_are_validated() {
        let mut storage = MemoryStorage::new();
        let c = course();
        storage.save_course(&c).await.unwrap();

        let mut manager = BasicWorkItemManager::new(storage);
        let bad = QuizSpec {
            title: "Week 1".into(),
            deadline: None,
            questions: vec![QuestionSpec {
                text: "  ".into(),
                options: ["a".into(), "b".into(), "c".into(), "d".into()],
                correct: AnswerLetter::A,
            }],
        };
        let err = manager.create_quiz(trainer(), c.id, bad).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn task_round_fans_out_to_enrolled_members() {
        let mut storage = MemoryStorage::new();
        let i = internship(None);
        storage.save_internship(&i).await.unwrap();
        let scope = ScopeId::Internship(i.id);

        let members = [UserId::new(), UserId::new()];
        for user_id in members {
            storage
                .save_enrollment(&Enrollment::new(user_id, scope))
                .await
                .unwrap();
        }

        let mut manager = BasicWorkItemManager::new(storage);
        let created = manager
            .assign_task(trainer(), scope, task_spec("Week 1 report", 1))
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        let assigned: BTreeSet<_> = created.iter().map(|t| t.assigned_to).collect();
        assert_eq!(assigned, members.iter().copied().collect());
    }

    #[tokio::test]
    async fn empty_scope_gets_a_self_assigned_template() {
        let mut storage = MemoryStorage::new();
        let i = internship(None);
        storage.save_internship(&i).await.unwrap();

        let mut manager = BasicWorkItemManager::new(storage);
        let actor = trainer();
        let created = manager
            .assign_task(actor, ScopeId::Internship(i.id), task_spec("Week 1", 1))
            .await
            .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].assigned_to, actor.user_id);
    }

    #[tokio::test]
    async fn task_rounds_are_capped_by_distinct_weeks() {
        let mut storage = MemoryStorage::new();
        let i = internship(Some(1));
        storage.save_internship(&i).await.unwrap();
        let scope = ScopeId::Internship(i.id);

        let mut manager = BasicWorkItemManager::new(storage);
        manager
            .assign_task(trainer(), scope, task_spec("Week 1 report", 1))
            .await
            .unwrap();
        // Another round in the same week is fine.
        manager
            .assign_task(trainer(), scope, task_spec("Week 1 demo", 1))
            .await
            .unwrap();
        // A new week exceeds the cap.
        let err = manager
            .assign_task(trainer(), scope, task_spec("Week 2 report", 2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::LimitReached {
                kind: LimitKind::Tasks,
                limit: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn template_updates_reach_every_sister() {
        let mut storage = MemoryStorage::new();
        let i = internship(None);
        storage.save_internship(&i).await.unwrap();
        let scope = ScopeId::Internship(i.id);
        for user_id in [UserId::new(), UserId::new()] {
            storage
                .save_enrollment(&Enrollment::new(user_id, scope))
                .await
                .unwrap();
        }

        let reader = storage.clone();
        let mut manager = BasicWorkItemManager::new(storage);
        manager
            .assign_task(trainer(), scope, task_spec("Week 1", 1))
            .await
            .unwrap();

        let changed = manager
            .update_task_template(
                trainer(),
                scope,
                "Week 1",
                1,
                TaskTemplateUpdate {
                    priority: Some(TaskPriority::High),
                    ..TaskTemplateUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(changed, 2);

        let tasks = reader.list_tasks_in_scope(scope).await.unwrap();
        assert!(tasks.iter().all(|t| t.priority == TaskPriority::High));
    }

    #[tokio::test]
    async fn template_delete_takes_submissions_first() {
        use skilltrack_core::TaskSubmission;

        let mut storage = MemoryStorage::new();
        let i = internship(None);
        storage.save_internship(&i).await.unwrap();
        let scope = ScopeId::Internship(i.id);
        let member = UserId::new();
        storage
            .save_enrollment(&Enrollment::new(member, scope))
            .await
            .unwrap();

        let reader = storage.clone();
        let mut manager = BasicWorkItemManager::new(storage);
        let created = manager
            .assign_task(trainer(), scope, task_spec("Week 1", 1))
            .await
            .unwrap();

        let mut writer = reader.clone();
        writer
            .save_task_submission(&TaskSubmission::new(created[0].id, member, None))
            .await
            .unwrap();

        let deleted = manager
            .delete_task_template(trainer(), scope, "Week 1", 1)
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(reader.list_tasks_in_scope(scope).await.unwrap().is_empty());
        assert!(reader
            .list_task_submissions_for_student(member)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn limits_are_set_once() {
        let mut storage = MemoryStorage::new();
        let c = course();
        storage.save_course(&c).await.unwrap();

        let reader = storage.clone();
        let mut manager = BasicWorkItemManager::new(storage);
        let scope = ScopeId::Course(c.id);

        assert!(manager
            .set_limit_once(trainer(), scope, LimitKind::Assignments, 3)
            .await
            .unwrap());
        // Second write is ignored, not an error.
        assert!(!manager
            .set_limit_once(trainer(), scope, LimitKind::Assignments, 7)
            .await
            .unwrap());
        assert_eq!(
            reader.load_course(c.id).await.unwrap().unwrap().assignment_limit,
            Some(3)
        );

        let err = manager
            .set_limit_once(trainer(), scope, LimitKind::Quizzes, -1)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn students_cannot_create_work_items() {
        let mut storage = MemoryStorage::new();
        let c = course();
        storage.save_course(&c).await.unwrap();

        let mut manager = BasicWorkItemManager::new(storage);
        let student = Actor::new(UserId::new(), Role::Student);
        let err = manager
            .create_assignment(student, c.id, spec("One"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Authorization(_)));
    }
}
