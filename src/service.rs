//! Search service capability
//!
//! Defines the remote people-search interface the rest of the
//! application talks to: the request parameter types and their flat
//! key/value encoding, the wire models, and the default HTTP
//! implementation backed by the search API.

use crate::error::ServiceError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Parameters for a paged user search.
#[derive(Debug, Clone, PartialEq)]
pub struct FindParams {
    pub query: Option<String>,
    pub wildcard: Option<bool>,
    pub field: Option<String>,
    pub distance: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub skip: u64,
    pub limit: u64,
}

impl FindParams {
    /// Encode as flat key/value pairs. Absent options are omitted
    /// entirely, never sent as empty values.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(query) = &self.query {
            pairs.push(("query", query.clone()));
        }
        if let Some(wildcard) = self.wildcard {
            // The service reads the short key; both spellings travel
            // together for deployments that match on the long one.
            pairs.push(("w", wildcard.to_string()));
            pairs.push(("wildcard", wildcard.to_string()));
        }
        if let Some(field) = &self.field {
            pairs.push(("field", field.clone()));
        }
        if let Some(distance) = &self.distance {
            pairs.push(("distance", distance.clone()));
        }
        if let Some(lat) = self.lat {
            pairs.push(("lat", lat.to_string()));
        }
        if let Some(lon) = self.lon {
            pairs.push(("lon", lon.to_string()));
        }
        pairs.push(("s", self.skip.to_string()));
        pairs.push(("l", self.limit.to_string()));
        pairs
    }
}

/// Parameters for a facet aggregation: the search criteria without
/// pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateParams {
    pub query: Option<String>,
    pub wildcard: Option<bool>,
    pub field: Option<String>,
    pub distance: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl AggregateParams {
    /// Encode as flat key/value pairs, omitting absent options.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(query) = &self.query {
            pairs.push(("query", query.clone()));
        }
        if let Some(wildcard) = self.wildcard {
            pairs.push(("w", wildcard.to_string()));
            pairs.push(("wildcard", wildcard.to_string()));
        }
        if let Some(field) = &self.field {
            pairs.push(("field", field.clone()));
        }
        if let Some(distance) = &self.distance {
            pairs.push(("distance", distance.clone()));
        }
        if let Some(lat) = self.lat {
            pairs.push(("lat", lat.to_string()));
        }
        if let Some(lon) = self.lon {
            pairs.push(("lon", lon.to_string()));
        }
        pairs
    }
}

/// One page of user search hits.
///
/// The record shape is server-defined, so records stay raw JSON values
/// (the service also injects a per-hit `score` field, which passes
/// through untouched). `users` is omitted from the payload when there
/// are no hits and must decode as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub total: u64,
}

/// One facet value with its document count. `key` is omitted from the
/// payload for empty keys and decodes as JSON null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bucket {
    #[serde(default)]
    pub key: Value,
    #[serde(default)]
    pub count: u64,
}

/// Remote people-search capability.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run a paged user search.
    async fn find(&self, params: &FindParams) -> Result<SearchResults, ServiceError>;

    /// Fetch nickname suggestions for a partial input.
    async fn autocomplete(&self, nick: &str) -> Result<Vec<String>, ServiceError>;

    /// Fetch facet buckets over the full filtered set.
    async fn aggregate(&self, params: &AggregateParams) -> Result<Vec<Bucket>, ServiceError>;
}

/// Default [`SearchService`] implementation over HTTP.
pub struct HttpSearchService {
    client: reqwest::Client,
    base: Url,
}

impl HttpSearchService {
    /// Create a service client for the given API base URL.
    pub fn new(base: &str) -> Result<Self, ServiceError> {
        let mut base: Url = base.parse()?;
        // Normalize so Url::join treats the base path as a directory
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        Ok(Self {
            client: crate::http::client_with_timeout(Duration::from_secs(30)),
            base,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let url = self.base.join(endpoint)?;
        debug!("GET {} ({} params)", url, params.len());

        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SearchService for HttpSearchService {
    async fn find(&self, params: &FindParams) -> Result<SearchResults, ServiceError> {
        self.get_json("api/users", &params.to_query()).await
    }

    async fn autocomplete(&self, nick: &str) -> Result<Vec<String>, ServiceError> {
        self.get_json("api/autocomplete", &[("nick", nick.to_string())])
            .await
    }

    async fn aggregate(&self, params: &AggregateParams) -> Result<Vec<Bucket>, ServiceError> {
        self.get_json("api/aggregations", &params.to_query()).await
    }
}
