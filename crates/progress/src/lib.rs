//! Derived progress state: unlock sequencing, aggregation, streaks and
//! certificate eligibility.
//!
//! Everything here is computed from stored rows on read; the only writes
//! are the streak update and certificate issuance.

#![warn(missing_docs)]

pub mod aggregator;
pub mod eligibility;
pub mod streak;
pub mod unlock;

pub use aggregator::{
    BasicProgressAggregator, CourseProgress, InternStats, InternshipProgress, ProgressAggregator,
    Rank,
};
pub use eligibility::{CertificateInput, CertificateRenderer, CertificateService};
pub use streak::{BasicStreakTracker, StreakTracker};
pub use unlock::{sequence_tasks, BasicUnlockSequencer, SequencedTask, TaskBoardRow, UnlockSequencer};
