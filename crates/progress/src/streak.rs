//! Daily activity streaks.
//!
//! The streak is advanced by dashboard and stat reads, not by a
//! scheduler: whenever a tracked read happens, the user's last activity
//! date is compared against today's UTC date and the counter updated.
//! Same-day repeats are no-ops, so reads stay idempotent within a day.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use skilltrack_core::{EngineError, Result, UserId};
use skilltrack_storage::Storage;
use tokio::sync::Mutex;

/// Streak update service.
#[async_trait]
pub trait StreakTracker: Send + Sync {
    /// Record activity for `user_id` on `today` and return the resulting
    /// streak length.
    async fn record_activity(&mut self, user_id: UserId, today: NaiveDate) -> Result<u32>;
}

/// Basic streak tracker implementation.
pub struct BasicStreakTracker<S: Storage> {
    storage: Arc<Mutex<S>>,
}

impl<S: Storage> BasicStreakTracker<S> {
    /// Create a new streak tracker.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }
}

#[async_trait]
impl<S: Storage + 'static> StreakTracker for BasicStreakTracker<S> {
    async fn record_activity(&mut self, user_id: UserId, today: NaiveDate) -> Result<u32> {
        let mut storage = self.storage.lock().await;
        let mut user = storage
            .load_user(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;

        let yesterday = today.checked_sub_days(Days::new(1));
        match user.last_activity_date {
            Some(last) if last == today => return Ok(user.current_streak),
            Some(last) if Some(last) == yesterday => user.current_streak += 1,
            _ => user.current_streak = 1,
        }
        user.last_activity_date = Some(today);
        storage.save_user(&user).await?;
        Ok(user.current_streak)
    }
}
