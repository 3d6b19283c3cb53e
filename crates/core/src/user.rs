//! Users and the caller identity supplied by the auth collaborator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::UserId;
use crate::Time;

/// A platform user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Access role
    pub role: Role,

    /// Calendar date (UTC) of the most recent recorded activity
    pub last_activity_date: Option<NaiveDate>,

    /// Consecutive-day activity count
    pub current_streak: u32,

    /// Creation timestamp
    pub created_at: Time,
}

impl User {
    /// Create a user with no recorded activity.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            role,
            last_activity_date: None,
            current_streak: 0,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Access roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Course learner
    Student,
    /// Course/internship mentor
    Trainer,
    /// Internship participant
    Intern,
    /// Platform administrator
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Student => "STUDENT",
            Role::Trainer => "TRAINER",
            Role::Intern => "INTERN",
            Role::Admin => "ADMIN",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STUDENT" => Ok(Role::Student),
            "TRAINER" => Ok(Role::Trainer),
            "INTERN" => Ok(Role::Intern),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Caller identity, supplied per call by the auth collaborator.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    /// Authenticated user id
    pub user_id: UserId,

    /// Role claimed by the session
    pub role: Role,
}

impl Actor {
    /// Convenience constructor.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
