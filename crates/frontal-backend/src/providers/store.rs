//! Daily progress records kept in a Supabase (PostgREST) table.

use async_trait::async_trait;
use chrono::NaiveDate;
use frontal_bridge::{config::StoreConfig, progress::ProgressRecord};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("progress store is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("store answered with {status}: {message}")]
    Api { status: StatusCode, message: String },
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn insert_progress_record(&self, record: &ProgressRecord) -> Result<(), StoreError>;

    async fn query_progress_by_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ProgressRecord>, StoreError>;

    /// Every record of the user, oldest first.
    async fn query_progress_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<ProgressRecord>, StoreError>;
}

/// Query string selecting one user's records for a single day.
pub(crate) fn by_date_query(user_id: &str, date: NaiveDate) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("user_id", format!("eq.{user_id}")),
        ("date", format!("eq.{}", date.format("%Y-%m-%d"))),
    ]
}

/// Query string selecting all of one user's records in date order.
pub(crate) fn history_query(user_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("user_id", format!("eq.{user_id}")),
        ("order", "date.asc".to_string()),
    ]
}

pub struct SupabaseStore {
    client: reqwest::Client,
    config: StoreConfig,
}

impl SupabaseStore {
    pub fn new(client: reqwest::Client, config: StoreConfig) -> Self {
        Self { client, config }
    }

    fn request(&self, method: reqwest::Method) -> Result<reqwest::RequestBuilder, StoreError> {
        let (Some(url), Some(key)) = (self.config.url.as_deref(), self.config.anon_key.as_deref())
        else {
            return Err(StoreError::NotConfigured);
        };
        let table_url = format!(
            "{}/rest/v1/{}",
            url.trim_end_matches('/'),
            self.config.progress_table
        );

        Ok(self
            .client
            .request(method, table_url)
            .header("apikey", key)
            .bearer_auth(key))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await?;
        Err(StoreError::Api {
            status,
            message: super::error_message(&body),
        })
    }

    async fn select(
        &self,
        query: Vec<(&'static str, String)>,
    ) -> Result<Vec<ProgressRecord>, StoreError> {
        let response = self
            .request(reqwest::Method::GET)?
            .query(&query)
            .send()
            .await?;
        let records = Self::check(response).await?.json().await?;
        Ok(records)
    }
}

#[async_trait]
impl ProgressStore for SupabaseStore {
    async fn insert_progress_record(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::POST)?
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await?;
        Self::check(response).await?;
        log::info!("Saved progress of {} for {}", record.user_id, record.date);
        Ok(())
    }

    async fn query_progress_by_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ProgressRecord>, StoreError> {
        self.select(by_date_query(user_id, date)).await
    }

    async fn query_progress_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<ProgressRecord>, StoreError> {
        self.select(history_query(user_id)).await
    }
}
