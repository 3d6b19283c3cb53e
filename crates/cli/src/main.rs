//! SkillTrack CLI - learning progress and unlock engine.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use clap::{Parser, Subcommand};
use skilltrack_core::{Actor, ProgramDuration, Role, ScopeId, TaskPriority, User};
use skilltrack_enrollment::{BasicEnrollmentManager, EnrollmentManager};
use skilltrack_lifecycle::{BasicDeletionCoordinator, DeletionCoordinator};
use skilltrack_progress::{
    BasicProgressAggregator, BasicStreakTracker, BasicUnlockSequencer, CertificateInput,
    CertificateRenderer, CertificateService, ProgressAggregator, StreakTracker, UnlockSequencer,
};
use skilltrack_storage::{LocalFileStore, SqliteStorage, Storage};
use skilltrack_work::{AssignmentSpec, BasicWorkItemManager, TaskSpec, WorkItemManager};
use tracing::Level;

#[derive(Parser)]
#[command(name = "skilltrack")]
#[command(about = "Learning progress and unlock engine", long_about = None)]
struct Cli {
    /// SQLite database URL
    #[arg(long, default_value = "sqlite://skilltrack.db?mode=rwc")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a user
    AddUser {
        /// Display name
        name: String,
        /// Role: student, trainer, intern or admin
        #[arg(long, default_value = "student")]
        role: String,
    },
    /// Add a course
    AddCourse {
        /// Course name
        name: String,
        /// Mentor display name
        #[arg(long)]
        mentor: String,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Program length, e.g. "2 months" or "6 weeks"
        #[arg(long, default_value = "2 months")]
        duration: String,
    },
    /// Add an internship
    AddInternship {
        /// Program title
        title: String,
        /// Mentor display name
        #[arg(long)]
        mentor: String,
        /// Program length, e.g. "2 months"
        #[arg(long, default_value = "2 months")]
        duration: String,
    },
    /// Create a released assignment in a course
    AddAssignment {
        /// Course ID
        course: String,
        /// Assignment title
        title: String,
        /// Acting trainer's user ID
        #[arg(long = "as")]
        trainer: String,
    },
    /// Fan a task round out to a scope's members
    AssignTask {
        /// Task title
        title: String,
        /// Week the round belongs to
        #[arg(long)]
        week: u32,
        /// Course ID
        #[arg(long, conflicts_with = "internship")]
        course: Option<String>,
        /// Internship ID
        #[arg(long)]
        internship: Option<String>,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Acting trainer's user ID
        #[arg(long = "as")]
        trainer: String,
    },
    /// Enroll a user into a course or internship
    Enroll {
        /// User ID
        user: String,
        /// Course ID
        #[arg(long, conflicts_with = "internship")]
        course: Option<String>,
        /// Internship ID
        #[arg(long)]
        internship: Option<String>,
    },
    /// Show a user's task board (advances their streak)
    Board {
        /// User ID
        user: String,
    },
    /// Show a user's progress in a course
    Progress {
        /// User ID
        user: String,
        /// Course ID
        course: String,
    },
    /// Show an intern's dashboard stats (advances their streak)
    Stats {
        /// User ID
        user: String,
    },
    /// Issue a course certificate
    Certificate {
        /// User ID
        user: String,
        /// Course ID
        course: String,
    },
    /// Delete a user and every row referencing them
    DeleteUser {
        /// User ID
        id: String,
    },
    /// Delete a course and everything scoped to it
    DeleteCourse {
        /// Course ID
        id: String,
    },
    /// Delete an internship and everything scoped to it
    DeleteInternship {
        /// Internship ID
        id: String,
    },
    /// List users
    Users,
}

/// Plain-text renderer; real deployments plug in a PDF renderer here.
struct PlainTextRenderer;

#[async_trait]
impl CertificateRenderer for PlainTextRenderer {
    async fn render(&self, input: &CertificateInput) -> skilltrack_core::Result<Vec<u8>> {
        let text = format!(
            "CERTIFICATE OF COMPLETION\n\n{}\n{}\nMentor: {}\nIssued: {}\nVerification: {}\n",
            input.user_name, input.title, input.mentor_name, input.issue_date,
            input.verification_code,
        );
        Ok(text.into_bytes())
    }
}

async fn load_actor(storage: &SqliteStorage, id: &str) -> Result<Actor> {
    let user_id = id.parse().map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
    let user: User = storage
        .load_user(user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found"))?;
    Ok(Actor::new(user.id, user.role))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    let mut storage = SqliteStorage::new(&cli.db).await?;

    match cli.command {
        Commands::AddUser { name, role } => {
            let role: Role = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let user = User::new(name, role);
            storage.save_user(&user).await?;
            storage.commit("Add user").await?;
            println!("Added user: {} - {} ({})", user.id, user.name, user.role);
        }
        Commands::AddCourse {
            name,
            mentor,
            start,
            duration,
        } => {
            let course = skilltrack_core::Course {
                id: skilltrack_core::CourseId::new(),
                name,
                start_date: start.parse()?,
                mentor_name: mentor,
                duration: duration
                    .parse::<ProgramDuration>()
                    .map_err(|e| anyhow::anyhow!(e))?,
                assignment_limit: None,
                quiz_limit: None,
                created_at: Utc::now(),
            };
            storage.save_course(&course).await?;
            storage.commit("Add course").await?;
            println!("Added course: {} - {}", course.id, course.name);
        }
        Commands::AddInternship {
            title,
            mentor,
            duration,
        } => {
            let internship = skilltrack_core::Internship {
                id: skilltrack_core::InternshipId::new(),
                title,
                mentor_name: mentor,
                duration: duration
                    .parse::<ProgramDuration>()
                    .map_err(|e| anyhow::anyhow!(e))?,
                task_limit: None,
                created_at: Utc::now(),
            };
            storage.save_internship(&internship).await?;
            storage.commit("Add internship").await?;
            println!("Added internship: {} - {}", internship.id, internship.title);
        }
        Commands::AddAssignment {
            course,
            title,
            trainer,
        } => {
            let actor = load_actor(&storage, &trainer).await?;
            let course_id = course
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid course ID"))?;

            let mut manager = BasicWorkItemManager::new(storage);
            let assignment = manager
                .create_assignment(
                    actor,
                    course_id,
                    AssignmentSpec {
                        title,
                        due_date: None,
                    },
                )
                .await?;
            println!(
                "Added assignment: {} (week {})",
                assignment.id, assignment.week_number
            );
        }
        Commands::AssignTask {
            title,
            week,
            course,
            internship,
            due,
            trainer,
        } => {
            let actor = load_actor(&storage, &trainer).await?;
            let scope = match (course, internship) {
                (Some(id), None) => ScopeId::Course(
                    id.parse().map_err(|_| anyhow::anyhow!("Invalid course ID"))?,
                ),
                (None, Some(id)) => ScopeId::Internship(
                    id.parse()
                        .map_err(|_| anyhow::anyhow!("Invalid internship ID"))?,
                ),
                _ => anyhow::bail!("exactly one of --course or --internship is required"),
            };
            let due_date = due.map(|d| d.parse()).transpose()?;

            let mut manager = BasicWorkItemManager::new(storage);
            let created = manager
                .assign_task(
                    actor,
                    scope,
                    TaskSpec {
                        title,
                        description: String::new(),
                        week_number: week,
                        due_date,
                        priority: TaskPriority::Medium,
                    },
                )
                .await?;
            println!("Assigned to {} member(s)", created.len());
        }
        Commands::Enroll {
            user,
            course,
            internship,
        } => {
            let actor = load_actor(&storage, &user).await?;
            let scope = match (course, internship) {
                (Some(id), None) => ScopeId::Course(
                    id.parse().map_err(|_| anyhow::anyhow!("Invalid course ID"))?,
                ),
                (None, Some(id)) => ScopeId::Internship(
                    id.parse()
                        .map_err(|_| anyhow::anyhow!("Invalid internship ID"))?,
                ),
                _ => anyhow::bail!("exactly one of --course or --internship is required"),
            };
            let mut manager = BasicEnrollmentManager::new(storage);
            let enrollment = manager.enroll(actor, scope).await?;
            println!("Enrolled: {} in {}", enrollment.user_id, enrollment.scope);
        }
        Commands::Board { user } => {
            let actor = load_actor(&storage, &user).await?;
            let today = Utc::now().date_naive();

            let mut streaks = BasicStreakTracker::new(storage.clone());
            let streak = streaks.record_activity(actor.user_id, today).await?;

            let sequencer = BasicUnlockSequencer::new(storage);
            let board = sequencer.task_board(actor.user_id, today).await?;

            println!("Task board ({} tasks, streak {})", board.len(), streak);
            for row in board {
                let lock = if row.is_unlocked { "open" } else { "locked" };
                let done = if row.is_submitted { "done" } else { "-" };
                println!(
                    "  week {:>2} | {:>6} | {:>4} | {}",
                    row.week_number, lock, done, row.title,
                );
                if let Some(grade) = row.grade {
                    println!("           grade: {grade}");
                }
            }
        }
        Commands::Progress { user, course } => {
            let actor = load_actor(&storage, &user).await?;
            let course_id = course
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid course ID"))?;

            let aggregator = BasicProgressAggregator::new(storage);
            let snapshot = aggregator.course_progress(actor.user_id, course_id).await?;

            println!("Progress: {}%", snapshot.percentage);
            println!(
                "  Assignments: {}/{}",
                snapshot.assignments_completed, snapshot.assignment_total
            );
            println!(
                "  Quizzes: {}/{}",
                snapshot.quizzes_completed, snapshot.quiz_total
            );
            println!("  Tasks: {}/{}", snapshot.tasks_completed, snapshot.task_total);
            match snapshot.overall_grade {
                Some(grade) => println!("  Overall grade: {grade:.1}"),
                None => println!("  Overall grade: N/A"),
            }
            if let Some(rank) = snapshot.rank {
                println!("  Rank: {rank}");
            }
        }
        Commands::Stats { user } => {
            let actor = load_actor(&storage, &user).await?;
            let today = Utc::now().date_naive();

            let mut streaks = BasicStreakTracker::new(storage.clone());
            let streak = streaks.record_activity(actor.user_id, today).await?;

            let aggregator = BasicProgressAggregator::new(storage);
            let stats = aggregator.intern_stats(actor.user_id, today).await?;

            println!("Stats for {}", actor.user_id);
            println!("  Streak: {streak} day(s)");
            println!("  Tasks done today: {}", stats.tasks_done_today);
            println!("  Average progress: {:.1}%", stats.average_progress);
        }
        Commands::Certificate { user, course } => {
            let actor = load_actor(&storage, &user).await?;
            let course_id = course
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid course ID"))?;

            let mut service = CertificateService::new(
                storage,
                PlainTextRenderer,
                LocalFileStore::new("uploads"),
            );
            let certificate = service
                .issue_course_certificate(actor.user_id, course_id, Utc::now().date_naive())
                .await?;
            println!("Issued: {} -> {}", certificate.verification_code(), certificate.url);
        }
        Commands::DeleteUser { id } => {
            let user_id = id.parse().map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
            let operator = Actor::new(skilltrack_core::UserId::new(), Role::Admin);
            let mut coordinator = BasicDeletionCoordinator::new(storage);
            coordinator.delete_user(operator, user_id).await?;
            println!("Deleted user {user_id}");
        }
        Commands::DeleteCourse { id } => {
            let course_id = id.parse().map_err(|_| anyhow::anyhow!("Invalid course ID"))?;
            let operator = Actor::new(skilltrack_core::UserId::new(), Role::Admin);
            let mut coordinator = BasicDeletionCoordinator::new(storage);
            coordinator.delete_course(operator, course_id).await?;
            println!("Deleted course {course_id}");
        }
        Commands::DeleteInternship { id } => {
            let internship_id = id
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid internship ID"))?;
            let operator = Actor::new(skilltrack_core::UserId::new(), Role::Admin);
            let mut coordinator = BasicDeletionCoordinator::new(storage);
            coordinator.delete_internship(operator, internship_id).await?;
            println!("Deleted internship {internship_id}");
        }
        Commands::Users => {
            let users = storage.list_users().await?;
            println!("Users ({})", users.len());
            for user in users {
                println!(
                    "  {} | {:>7} | streak {:>3} | {}",
                    user.id, user.role, user.current_streak, user.name,
                );
            }
        }
    }

    Ok(())
}
