// src/store/http.rs
// Client for the document-store data API. Thin and retry-free: acquisition
// owns retry policy, this core treats every call as one shot.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::StoreSettings;
use crate::error::StoreError;
use crate::store::DocumentStore;
use crate::types::{DedupKey, UnifiedRecord, TOPIC_UNASSIGNED};

#[derive(Clone)]
pub struct HttpStore {
    base: String,
    database: String,
    client: Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct InsertRequest<'a> {
    documents: &'a [serde_json::Value],
}

#[derive(Deserialize)]
struct InsertResponse {
    inserted: usize,
}

#[derive(Serialize)]
struct FindRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projection: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct FindResponse {
    documents: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Serialize)]
struct KeysRequest<'a> {
    keys: &'a [DedupKey],
}

#[derive(Deserialize)]
struct KeysResponse {
    keys: Vec<DedupKey>,
}

#[derive(Deserialize)]
struct UpdateResponse {
    updated: usize,
}

impl HttpStore {
    pub fn new(settings: &StoreSettings) -> Self {
        Self {
            base: settings.endpoint.trim_end_matches('/').to_string(),
            database: settings.database.clone(),
            client: Client::new(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    fn url(&self, collection: &str, op: &str) -> String {
        format!("{}/db/{}/{}/{}", self.base, self.database, collection, op)
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        body: &B,
    ) -> Result<R, StoreError> {
        let rsp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;
        if !rsp.status().is_success() {
            return Err(StoreError::Rejected(format!(
                "{} -> {}",
                url,
                rsp.status()
            )));
        }
        Ok(rsp.json::<R>().await?)
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/health", self.base);
        let rsp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;
        if !rsp.status().is_success() {
            return Err(StoreError::Unreachable(format!(
                "health check returned {}",
                rsp.status()
            )));
        }
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<serde_json::Value>,
    ) -> Result<usize, StoreError> {
        let rsp: InsertResponse = self
            .post(self.url(collection, "insert"), &InsertRequest { documents: &docs })
            .await?;
        Ok(rsp.inserted)
    }

    async fn find_docs(&self, collection: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        let rsp: FindResponse = self
            .post(
                self.url(collection, "find"),
                &FindRequest {
                    filter: None,
                    projection: None,
                },
            )
            .await?;
        Ok(rsp.documents)
    }

    async fn find_texts(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let rsp: FindResponse = self
            .post(
                self.url(collection, "find"),
                &FindRequest {
                    filter: None,
                    projection: Some(vec!["text".to_string()]),
                },
            )
            .await?;
        Ok(rsp
            .documents
            .iter()
            .filter_map(|d| d.get("text").and_then(|t| t.as_str()).map(str::to_string))
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let url = self.url(collection, "count");
        let rsp = self.client.get(&url).timeout(self.timeout).send().await?;
        if !rsp.status().is_success() {
            return Err(StoreError::Rejected(format!(
                "{} -> {}",
                url,
                rsp.status()
            )));
        }
        Ok(rsp.json::<CountResponse>().await?.count)
    }

    async fn known_dedup_keys(
        &self,
        collection: &str,
        keys: &[DedupKey],
    ) -> Result<HashSet<DedupKey>, StoreError> {
        let rsp: KeysResponse = self
            .post(self.url(collection, "keys"), &KeysRequest { keys })
            .await?;
        Ok(rsp.keys.into_iter().collect())
    }

    async fn find_unassigned(&self, collection: &str) -> Result<Vec<UnifiedRecord>, StoreError> {
        let rsp: FindResponse = self
            .post(
                self.url(collection, "find"),
                &FindRequest {
                    filter: Some(serde_json::json!({ "topic_id": TOPIC_UNASSIGNED })),
                    projection: None,
                },
            )
            .await?;
        // Lenient read: skip documents that predate the unified schema.
        Ok(rsp
            .documents
            .into_iter()
            .filter_map(|d| serde_json::from_value::<UnifiedRecord>(d).ok())
            .collect())
    }

    async fn update_topics(
        &self,
        collection: &str,
        records: &[UnifiedRecord],
    ) -> Result<usize, StoreError> {
        let docs: Vec<serde_json::Value> = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?;
        let rsp: UpdateResponse = self
            .post(
                self.url(collection, "update-topics"),
                &InsertRequest { documents: &docs },
            )
            .await?;
        Ok(rsp.updated)
    }
}
