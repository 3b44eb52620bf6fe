//! Scheduled-post tracking.
//!
//! The tool cannot post on its own (no authentication), so scheduling is
//! advisory: `due_now` tells the operator what to post, and `mark_posted`
//! records that they did.

use crate::store::{JsonStore, HISTORY_DOC, SCHEDULE_DOC};
use chrono::{DateTime, Utc};
use redscout_core::{PostStatus, ScheduledPost, ScoutError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ScheduleDocument {
    posts: Vec<ScheduledPost>,
}

#[derive(Debug, Default)]
pub struct ScheduleTracker {
    posts: Vec<ScheduledPost>,
    history: Vec<ScheduledPost>,
}

impl ScheduleTracker {
    pub async fn load(store: &JsonStore) -> Self {
        let posts: ScheduleDocument = store
            .load_or(SCHEDULE_DOC, ScheduleDocument::default())
            .await;
        let history: ScheduleDocument = store
            .load_or(HISTORY_DOC, ScheduleDocument::default())
            .await;
        Self {
            posts: posts.posts,
            history: history.posts,
        }
    }

    pub async fn save(&self, store: &JsonStore) -> Result<(), ScoutError> {
        store
            .save(
                SCHEDULE_DOC,
                &ScheduleDocument {
                    posts: self.posts.clone(),
                },
            )
            .await?;
        store
            .save(
                HISTORY_DOC,
                &ScheduleDocument {
                    posts: self.history.clone(),
                },
            )
            .await
    }

    pub fn add(
        &mut self,
        subreddit: String,
        title: String,
        content: String,
        scheduled_at: DateTime<Utc>,
    ) -> Result<&ScheduledPost, ScoutError> {
        if subreddit.is_empty() || title.is_empty() {
            return Err(ScoutError::invalid_input(
                "a scheduled post needs a subreddit and a title",
            ));
        }

        self.posts.push(ScheduledPost {
            id: Uuid::new_v4().to_string(),
            subreddit,
            title,
            content,
            scheduled_at,
            created_at: Utc::now(),
            status: PostStatus::Pending,
            cancelled_at: None,
            posted_at: None,
            external_url: None,
        });
        Ok(self.posts.last().expect("just pushed"))
    }

    pub fn list(&self) -> &[ScheduledPost] {
        &self.posts
    }

    pub fn history(&self) -> &[ScheduledPost] {
        &self.history
    }

    /// Pending posts whose scheduled time has arrived.
    pub fn due_now(&self, now: DateTime<Utc>) -> Vec<&ScheduledPost> {
        self.posts
            .iter()
            .filter(|p| p.status == PostStatus::Pending && p.scheduled_at <= now)
            .collect()
    }

    /// `pending -> cancelled`. Terminal; any other starting state is
    /// rejected.
    pub fn cancel(&mut self, id: &str, now: DateTime<Utc>) -> Result<&ScheduledPost, ScoutError> {
        let post = self.find_mut(id)?;
        if post.status != PostStatus::Pending {
            return Err(ScoutError::invalid_input(format!(
                "post {} is not pending and cannot be cancelled",
                id
            )));
        }
        post.status = PostStatus::Cancelled;
        post.cancelled_at = Some(now);
        Ok(post)
    }

    /// `pending -> posted`. The record moves to the posted history and the
    /// returned copy carries the final state.
    pub fn mark_posted(
        &mut self,
        id: &str,
        external_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ScheduledPost, ScoutError> {
        let index = self
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ScoutError::not_found(format!("scheduled post {}", id)))?;
        if self.posts[index].status != PostStatus::Pending {
            return Err(ScoutError::invalid_input(format!(
                "post {} is not pending and cannot be marked posted",
                id
            )));
        }

        let mut post = self.posts.remove(index);
        post.status = PostStatus::Posted;
        post.posted_at = Some(now);
        post.external_url = external_url;
        self.history.push(post.clone());
        Ok(post)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut ScheduledPost, ScoutError> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ScoutError::not_found(format!("scheduled post {}", id)))
    }
}
