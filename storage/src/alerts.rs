//! Durable keyword-alert definitions.

use crate::store::{JsonStore, ALERTS_DOC};
use chrono::Utc;
use redscout_core::{KeywordAlert, ScoutError};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AlertDocument {
    alerts: Vec<KeywordAlert>,
}

#[derive(Debug, Default)]
pub struct AlertRegistry {
    alerts: Vec<KeywordAlert>,
}

impl AlertRegistry {
    pub async fn load(store: &JsonStore) -> Self {
        let doc: AlertDocument = store.load_or(ALERTS_DOC, AlertDocument::default()).await;
        Self { alerts: doc.alerts }
    }

    pub async fn save(&self, store: &JsonStore) -> Result<(), ScoutError> {
        store
            .save(
                ALERTS_DOC,
                &AlertDocument {
                    alerts: self.alerts.clone(),
                },
            )
            .await
    }

    /// Register a new alert. Keywords match case-insensitively; they are
    /// normalized to lowercase here so the check cycle compares directly.
    pub fn add(
        &mut self,
        keywords: Vec<String>,
        subreddits: Vec<String>,
    ) -> Result<&KeywordAlert, ScoutError> {
        if keywords.is_empty() {
            return Err(ScoutError::invalid_input("an alert needs at least one keyword"));
        }
        if subreddits.is_empty() {
            return Err(ScoutError::invalid_input(
                "an alert needs at least one subreddit",
            ));
        }

        let alert = KeywordAlert {
            id: Uuid::new_v4().to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            subreddits,
            enabled: true,
            created_at: Utc::now(),
            last_checked_at: None,
            match_count: 0,
        };
        info!("Registered alert {} ({:?})", alert.id, alert.keywords);
        self.alerts.push(alert);
        Ok(self.alerts.last().expect("just pushed"))
    }

    pub fn list(&self) -> &[KeywordAlert] {
        &self.alerts
    }

    pub fn enabled_mut(&mut self) -> impl Iterator<Item = &mut KeywordAlert> {
        self.alerts.iter_mut().filter(|a| a.enabled)
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<&KeywordAlert, ScoutError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ScoutError::not_found(format!("alert {}", id)))?;
        alert.enabled = enabled;
        Ok(alert)
    }

    pub fn remove(&mut self, id: &str) -> Result<KeywordAlert, ScoutError> {
        let index = self
            .alerts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| ScoutError::not_found(format!("alert {}", id)))?;
        Ok(self.alerts.remove(index))
    }
}
