//! Membership resolution.
//!
//! Two writers historically recorded course membership: Enrollment rows
//! and the legacy per-course ProgressRecord. The resolver unions both so
//! neither generation of data is dropped. Internships only ever had
//! Enrollment rows.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use skilltrack_core::{CourseId, InternshipId, Result, UserId};
use skilltrack_storage::Storage;

/// Everything a user is a member of.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memberships {
    /// Courses the user belongs to, deduplicated, in id order
    pub courses: Vec<CourseId>,

    /// Internships the user belongs to, deduplicated, in id order
    pub internships: Vec<InternshipId>,
}

impl Memberships {
    /// True when the user belongs to nothing.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() && self.internships.is_empty()
    }
}

/// Membership resolution service.
#[async_trait]
pub trait EnrollmentResolver: Send + Sync {
    /// Resolve every course and internship the user belongs to.
    ///
    /// An unknown user simply resolves to empty memberships.
    async fn memberships(&self, user_id: UserId) -> Result<Memberships>;
}

/// Basic resolver implementation over a storage handle.
pub struct BasicEnrollmentResolver<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> BasicEnrollmentResolver<S> {
    /// Create a new resolver.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }
}

#[async_trait]
impl<S: Storage + 'static> EnrollmentResolver for BasicEnrollmentResolver<S> {
    async fn memberships(&self, user_id: UserId) -> Result<Memberships> {
        let mut courses = BTreeSet::new();
        let mut internships = BTreeSet::new();

        for enrollment in self.storage.list_enrollments_for_user(user_id).await? {
            match enrollment.scope.course() {
                Some(course_id) => {
                    courses.insert(course_id);
                }
                None => {
                    if let Some(internship_id) = enrollment.scope.internship() {
                        internships.insert(internship_id);
                    }
                }
            }
        }

        for record in self.storage.list_progress_for_user(user_id).await? {
            courses.insert(record.course_id);
        }

        Ok(Memberships {
            courses: courses.into_iter().collect(),
            internships: internships.into_iter().collect(),
        })
    }
}
