//! Blocking client for the investigation tree endpoints.

use crate::config::ApiConfig;
use crate::ir::{SeasonsResponse, TreeResponse, TreeType, decode_json};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no API base URL configured")]
    MissingBaseUrl,
    #[error("client build failed: {0}")]
    BuildClient(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("http status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Filters of one investigation tree request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeQuery {
    pub season: String,
    pub tree_type: TreeType,
    pub administration_id: Option<String>,
    pub department_id: Option<String>,
    pub section_id: Option<String>,
}

impl TreeQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("season", self.season.clone()),
            ("tree_type", self.tree_type.as_str().to_string()),
        ];
        let optional = [
            ("administration_id", &self.administration_id),
            ("department_id", &self.department_id),
            ("section_id", &self.section_id),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_ref().filter(|v| !v.trim().is_empty()) {
                pairs.push((key, value.clone()));
            }
        }
        pairs
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    tree_path: String,
    seasons_path: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ApiError::MissingBaseUrl)?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms.max(1)))
            .build()
            .map_err(ApiError::BuildClient)?;
        Ok(Self {
            http,
            base_url,
            tree_path: config.tree_path.clone(),
            seasons_path: config.seasons_path.clone(),
        })
    }

    pub fn fetch_tree(&self, query: &TreeQuery) -> Result<TreeResponse, ApiError> {
        tracing::info!(season = %query.season, tree_type = %query.tree_type, "fetching investigation tree");
        self.get(&self.tree_path, &query.query_pairs())
    }

    pub fn fetch_seasons(&self) -> Result<SeasonsResponse, ApiError> {
        self.get(&self.seasons_path, &[])
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let result = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .map_err(|source| ApiError::Request {
                url: url.clone(),
                source,
            })
            .and_then(|response| {
                let status = response.status();
                let body = response.text().map_err(|source| ApiError::Request {
                    url: url.clone(),
                    source,
                })?;
                if !status.is_success() {
                    let message = extract_detail(&body).unwrap_or_else(|| {
                        status
                            .canonical_reason()
                            .unwrap_or("request failed")
                            .to_string()
                    });
                    return Err(ApiError::Status {
                        status: status.as_u16(),
                        message,
                    });
                }
                decode_json(&body).map_err(|err| ApiError::Decode {
                    url: url.clone(),
                    message: err.to_string(),
                })
            });
        if let Err(err) = &result {
            tracing::error!(%url, error = %err, "API request failed");
        }
        result
    }
}

/// Human-readable `detail` of an error body: a string, or the `msg` fields of
/// a validation error list.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_skip_absent_ids() {
        let query = TreeQuery {
            season: "2025-Q4".to_string(),
            tree_type: TreeType::DomainDistributionPercentage,
            department_id: Some("17".to_string()),
            section_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.query_pairs(),
            vec![
                ("season", "2025-Q4".to_string()),
                ("tree_type", "domain_distribution_percentage".to_string()),
                ("department_id", "17".to_string()),
            ]
        );
    }

    #[test]
    fn extracts_string_and_list_details() {
        assert_eq!(
            extract_detail(r#"{"detail": "Season not found"}"#).as_deref(),
            Some("Season not found")
        );
        assert_eq!(
            extract_detail(r#"{"detail": [{"msg": "field required"}, {"msg": "bad tree_type"}]}"#)
                .as_deref(),
            Some("field required; bad tree_type")
        );
        assert_eq!(extract_detail("<html>502</html>"), None);
        assert_eq!(extract_detail(r#"{"error": "x"}"#), None);
    }

    #[test]
    fn client_requires_base_url() {
        let err = ApiClient::new(&ApiConfig::default()).err().unwrap();
        assert!(matches!(err, ApiError::MissingBaseUrl));
    }

    #[test]
    fn status_error_message_carries_detail() {
        let err = ApiError::Status {
            status: 404,
            message: "Season not found".to_string(),
        };
        assert_eq!(err.to_string(), "http status 404: Season not found");
    }
}
