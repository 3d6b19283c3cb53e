//! Completion certificates.

use serde::{Deserialize, Serialize};

use crate::id::{CertificateId, CourseId, UserId};
use crate::Time;

/// A rendered completion certificate. At most one per (user, course);
/// re-issuing overwrites the existing row rather than duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    /// Unique identifier
    pub id: CertificateId,

    /// Certified user
    pub user_id: UserId,

    /// Certified course
    pub course_id: CourseId,

    /// Relative URL of the rendered artifact
    pub url: String,

    /// Issue timestamp (refreshed on re-issue)
    pub issued_at: Time,
}

impl Certificate {
    /// Create a certificate issued now.
    pub fn new(user_id: UserId, course_id: CourseId, url: impl Into<String>) -> Self {
        Self {
            id: CertificateId::new(),
            user_id,
            course_id,
            url: url.into(),
            issued_at: chrono::Utc::now(),
        }
    }

    /// Human-readable verification code printed on the artifact.
    pub fn verification_code(&self) -> String {
        format!("ANLG-{}", self.id)
    }
}
