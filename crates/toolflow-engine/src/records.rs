//! Outbound "create record" call made when the wizard submits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;
use toolflow_core::{WizardData, WizardVariant};
use tracing::{debug, info};

use crate::config::BackendConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend rejected the record ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Backend response did not include a record id")]
    MissingId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Published,
    Unlisted,
    PendingReview,
}

/// Payload handed to a [`RecordStore`] when the wizard submits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub variant: WizardVariant,
    pub status: RecordStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: WizardData,
}

impl Submission {
    pub fn new(variant: WizardVariant, data: WizardData) -> Self {
        let status = match variant {
            // Tool submissions always go through moderation.
            WizardVariant::ToolSubmission => RecordStatus::PendingReview,
            WizardVariant::Workflow if data.publish.publish_immediately && data.is_public => {
                RecordStatus::Published
            }
            WizardVariant::Workflow => RecordStatus::Unlisted,
        };
        Self {
            variant,
            status,
            submitted_at: Utc::now(),
            data,
        }
    }
}

/// Creates records in the hosted data store, returning the generated id.
pub trait RecordStore: Send + Sync + 'static {
    fn create(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;
}

#[derive(Debug, Deserialize)]
struct CreatedRow {
    id: Value,
}

/// PostgREST-style REST client: `POST {base_url}/rest/v1/{table}`.
pub struct RestRecordStore {
    config: BackendConfig,
    http: reqwest::Client,
}

impl RestRecordStore {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self, variant: WizardVariant) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table_for(variant)
        )
    }
}

impl RecordStore for RestRecordStore {
    async fn create(&self, submission: &Submission) -> Result<String, StoreError> {
        let url = self.endpoint(submission.variant);
        debug!(url = %url, variant = %submission.variant, "creating record");

        let mut request = self
            .http
            .post(&url)
            .header("Prefer", "return=representation")
            .json(submission);
        if let Some(key) = &self.config.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<CreatedRow> = response.json().await?;
        let id = rows
            .into_iter()
            .next()
            .map(|row| match row.id {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .ok_or(StoreError::MissingId)?;

        info!(record_id = %id, variant = %submission.variant, "record created");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn store_for(server: &mockito::Server, api_key: Option<&str>) -> RestRecordStore {
        RestRecordStore::new(BackendConfig {
            base_url: server.url(),
            api_key: api_key.map(str::to_string),
            ..Default::default()
        })
    }

    fn named_workflow() -> Submission {
        let data = WizardData {
            name: "My Workflow".to_string(),
            ..Default::default()
        };
        Submission::new(WizardVariant::Workflow, data)
    }

    #[tokio::test]
    async fn create_sends_auth_headers_and_returns_numeric_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/workflows")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .match_header("prefer", "return=representation")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "name": "My Workflow",
                "variant": "workflow",
                "status": "unlisted",
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 42}]"#)
            .create_async()
            .await;

        let id = store_for(&server, Some("anon-key"))
            .create(&named_workflow())
            .await
            .unwrap();
        assert_eq!(id, "42");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_returns_string_id_and_skips_auth_without_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/tools")
            .match_header("apikey", Matcher::Missing)
            .match_header("authorization", Matcher::Missing)
            .with_status(201)
            .with_body(r#"[{"id": "0190a1b2-tool"}]"#)
            .create_async()
            .await;

        let submission = Submission::new(WizardVariant::ToolSubmission, WizardData::default());
        let id = store_for(&server, None).create(&submission).await.unwrap();
        assert_eq!(id, "0190a1b2-tool");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_representation_is_missing_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/workflows")
            .with_status(201)
            .with_body("[]")
            .create_async()
            .await;

        let err = store_for(&server, Some("k"))
            .create(&named_workflow())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingId));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_insert_reports_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/workflows")
            .with_status(409)
            .with_body(r#"{"message":"duplicate key value"}"#)
            .expect(1)
            .create_async()
            .await;

        let err = store_for(&server, Some("k"))
            .create(&named_workflow())
            .await
            .unwrap_err();
        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status, 409);
                assert!(body.contains("duplicate key value"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[test]
    fn endpoint_routes_by_variant() {
        let store = RestRecordStore::new(BackendConfig {
            base_url: "https://db.example.com/".to_string(),
            ..Default::default()
        });
        assert_eq!(
            store.endpoint(WizardVariant::Workflow),
            "https://db.example.com/rest/v1/workflows"
        );
        assert_eq!(
            store.endpoint(WizardVariant::ToolSubmission),
            "https://db.example.com/rest/v1/tools"
        );
    }

    #[test]
    fn submission_body_is_flat() {
        let data = WizardData {
            name: "My Workflow".to_string(),
            category: "Content Creation".to_string(),
            ..Default::default()
        };
        let submission = Submission::new(WizardVariant::Workflow, data);
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["name"], "My Workflow");
        assert_eq!(json["category"], "Content Creation");
        assert_eq!(json["variant"], "workflow");
        assert!(json["nodes"].is_array());
        assert!(json.get("data").is_none());
    }

    #[test]
    fn status_follows_variant_and_visibility() {
        let public = WizardData {
            is_public: true,
            ..Default::default()
        };
        assert_eq!(
            Submission::new(WizardVariant::Workflow, public.clone()).status,
            RecordStatus::Published
        );
        assert_eq!(
            Submission::new(WizardVariant::Workflow, WizardData::default()).status,
            RecordStatus::Unlisted
        );
        assert_eq!(
            Submission::new(WizardVariant::ToolSubmission, public).status,
            RecordStatus::PendingReview
        );
    }
}
