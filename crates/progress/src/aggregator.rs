//! Progress aggregation.
//!
//! Percentages are derived on read from stored rows; the denormalized
//! ProgressRecord counters are refreshed elsewhere, by the submission
//! paths. Malformed data (an unreadable grade) is skipped and logged,
//! never fatal to a read.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use skilltrack_core::{
    grade_to_points, CourseId, EngineError, InternshipId, Result, ScopeId, TaskStatus, UserId,
};
use skilltrack_storage::Storage;
use tracing::warn;

/// Completion rank, awarded only at 100% progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rank {
    /// Mean score >= 90
    Distinction,
    /// Mean score >= 75
    Merit,
    /// Completed
    Pass,
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rank::Distinction => "DISTINCTION",
            Rank::Merit => "MERIT",
            Rank::Pass => "PASS",
        };
        f.write_str(s)
    }
}

impl Rank {
    fn from_mean(mean: f32) -> Self {
        if mean >= 90.0 {
            Rank::Distinction
        } else if mean >= 75.0 {
            Rank::Merit
        } else {
            Rank::Pass
        }
    }
}

/// A user's position in one course.
#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    /// The course
    pub course_id: CourseId,

    /// Completion percentage, 0..=100
    pub percentage: u8,

    /// Distinct assignments submitted
    pub assignments_completed: u32,

    /// Assignment slots counted against the denominator
    pub assignment_total: u32,

    /// Distinct quizzes submitted
    pub quizzes_completed: u32,

    /// Quiz slots counted against the denominator
    pub quiz_total: u32,

    /// Tasks with Completed status
    pub tasks_completed: u32,

    /// Tasks assigned to the user in the course
    pub task_total: u32,

    /// Mean of readable assignment grades, None when nothing is graded
    pub overall_grade: Option<f32>,

    /// Completion rank; only present at 100%
    pub rank: Option<Rank>,
}

/// A user's position in one internship.
#[derive(Debug, Clone, Serialize)]
pub struct InternshipProgress {
    /// The internship
    pub internship_id: InternshipId,

    /// Completion percentage, 0..=100. Zero tasks is 0, never 100.
    pub percentage: u8,

    /// Tasks with a recorded submission
    pub tasks_submitted: u32,

    /// Tasks assigned to the user in the internship
    pub task_total: u32,
}

/// Cross-internship summary shown on the intern dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct InternStats {
    /// Task submissions dated today
    pub tasks_done_today: u32,

    /// Mean progress across the user's internships, against the
    /// duration-derived (or capped) required task count
    pub average_progress: f32,
}

fn floor_percentage(numerator: u32, denominator: u32) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let pct = numerator as u64 * 100 / denominator.max(1) as u64;
    pct.min(100) as u8
}

/// Compute a user's course progress from stored rows.
pub async fn course_snapshot<S: Storage + ?Sized>(
    storage: &S,
    user_id: UserId,
    course_id: CourseId,
) -> Result<CourseProgress> {
    let course = storage
        .load_course(course_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("course {course_id}")))?;

    let assignments = storage.list_assignments_in_course(course_id).await?;
    let quizzes = storage.list_quizzes_in_course(course_id).await?;

    // A declared-but-unfilled limit still counts against the denominator;
    // items beyond the limit are never undercounted.
    let assignment_total =
        (assignments.len() as u32).max(course.assignment_limit.unwrap_or(0));
    let quiz_total = (quizzes.len() as u32).max(course.quiz_limit.unwrap_or(0));

    let assignment_ids: BTreeSet<_> = assignments.iter().map(|a| a.id).collect();
    let quiz_ids: BTreeSet<_> = quizzes.iter().map(|q| q.id).collect();

    let submissions: Vec<_> = storage
        .list_submissions_for_student(user_id)
        .await?
        .into_iter()
        .filter(|s| assignment_ids.contains(&s.assignment_id))
        .collect();
    let assignments_completed = submissions
        .iter()
        .map(|s| s.assignment_id)
        .collect::<BTreeSet<_>>()
        .len() as u32;

    let quizzes_completed = storage
        .list_quiz_submissions_for_student(user_id)
        .await?
        .into_iter()
        .filter(|s| quiz_ids.contains(&s.quiz_id))
        .map(|s| s.quiz_id)
        .collect::<BTreeSet<_>>()
        .len() as u32;

    let scope = ScopeId::Course(course_id);
    let tasks: Vec<_> = storage
        .list_tasks_for_user(user_id)
        .await?
        .into_iter()
        .filter(|t| t.scope == scope)
        .collect();
    let task_total = tasks.len() as u32;
    let tasks_completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count() as u32;

    let numerator = assignments_completed + quizzes_completed + tasks_completed;
    let denominator = assignment_total + quiz_total + task_total;
    let percentage = floor_percentage(numerator, denominator);

    let mut grade_points = Vec::new();
    for submission in &submissions {
        if let Some(grade) = &submission.grade {
            match grade_to_points(grade) {
                Some(points) => grade_points.push(points),
                None => warn!(%user_id, %course_id, grade, "skipping unreadable grade"),
            }
        }
    }
    let overall_grade = if grade_points.is_empty() {
        None
    } else {
        Some(grade_points.iter().sum::<f32>() / grade_points.len() as f32)
    };

    let rank = if percentage == 100 {
        let mut scores = grade_points;
        for submission in storage.list_quiz_submissions_for_student(user_id).await? {
            if quiz_ids.contains(&submission.quiz_id) {
                if let Some(pct) = submission.percentage() {
                    scores.push(pct);
                }
            }
        }
        if scores.is_empty() {
            Some(Rank::Pass)
        } else {
            Some(Rank::from_mean(scores.iter().sum::<f32>() / scores.len() as f32))
        }
    } else {
        None
    };

    Ok(CourseProgress {
        course_id,
        percentage,
        assignments_completed,
        assignment_total,
        quizzes_completed,
        quiz_total,
        tasks_completed,
        task_total,
        overall_grade,
        rank,
    })
}

/// Compute a user's internship progress from stored rows.
pub async fn internship_snapshot<S: Storage + ?Sized>(
    storage: &S,
    user_id: UserId,
    internship_id: InternshipId,
) -> Result<InternshipProgress> {
    storage
        .load_internship(internship_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("internship {internship_id}")))?;

    let scope = ScopeId::Internship(internship_id);
    let tasks: Vec<_> = storage
        .list_tasks_for_user(user_id)
        .await?
        .into_iter()
        .filter(|t| t.scope == scope)
        .collect();
    let task_total = tasks.len() as u32;

    let mut tasks_submitted = 0;
    for task in &tasks {
        if storage.find_task_submission(task.id, user_id).await?.is_some() {
            tasks_submitted += 1;
        }
    }

    Ok(InternshipProgress {
        internship_id,
        percentage: floor_percentage(tasks_submitted, task_total),
        tasks_submitted,
        task_total,
    })
}

/// Progress read service.
#[async_trait]
pub trait ProgressAggregator: Send + Sync {
    /// A user's progress in one course.
    async fn course_progress(&self, user_id: UserId, course_id: CourseId)
        -> Result<CourseProgress>;

    /// A user's progress in one internship.
    async fn internship_progress(
        &self,
        user_id: UserId,
        internship_id: InternshipId,
    ) -> Result<InternshipProgress>;

    /// Cross-internship dashboard stats for an intern.
    async fn intern_stats(&self, user_id: UserId, today: NaiveDate) -> Result<InternStats>;
}

/// Basic aggregator implementation over a storage handle.
pub struct BasicProgressAggregator<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> BasicProgressAggregator<S> {
    /// Create a new aggregator.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }
}

#[async_trait]
impl<S: Storage + 'static> ProgressAggregator for BasicProgressAggregator<S> {
    async fn course_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<CourseProgress> {
        course_snapshot(&*self.storage, user_id, course_id).await
    }

    async fn internship_progress(
        &self,
        user_id: UserId,
        internship_id: InternshipId,
    ) -> Result<InternshipProgress> {
        internship_snapshot(&*self.storage, user_id, internship_id).await
    }

    async fn intern_stats(&self, user_id: UserId, today: NaiveDate) -> Result<InternStats> {
        let submissions = self
            .storage
            .list_task_submissions_for_student(user_id)
            .await?;
        let tasks_done_today = submissions
            .iter()
            .filter(|s| s.submitted_at.date_naive() == today)
            .count() as u32;

        let mut percentages = Vec::new();
        for enrollment in self.storage.list_enrollments_for_user(user_id).await? {
            let Some(internship_id) = enrollment.scope.internship() else {
                continue;
            };
            let Some(internship) = self.storage.load_internship(internship_id).await? else {
                warn!(%internship_id, "enrollment points at a missing internship, skipping");
                continue;
            };
            let required = internship
                .task_limit
                .unwrap_or_else(|| internship.duration.required_tasks());

            let scope = ScopeId::Internship(internship_id);
            let mut submitted = 0u32;
            for task in self.storage.list_tasks_for_user(user_id).await? {
                if task.scope == scope
                    && submissions.iter().any(|s| s.task_id == task.id)
                {
                    submitted += 1;
                }
            }
            percentages.push(floor_percentage(submitted, required) as f32);
        }

        let average_progress = if percentages.is_empty() {
            0.0
        } else {
            percentages.iter().sum::<f32>() / percentages.len() as f32
        };

        Ok(InternStats {
            tasks_done_today,
            average_progress,
        })
    }
}
