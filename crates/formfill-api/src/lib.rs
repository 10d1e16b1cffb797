// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use formfill_app::{
    AnalyticsPayload, AnalyticsTab, ApiError, ApiRequest, ApiResponse, DatabaseStats,
    DuplicateReport, Record, StaleReport, UsageStats,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub llm_provider: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(trimmed).with_context(|| format!("parse api.base_url {trimmed:?}"))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            bail!("api.base_url must be an http(s) URL, got {trimmed:?}");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url: parsed,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn list_identifiers(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&["api", "uuids"])?;
        self.send(self.http.get(url), None, "identifier list")
    }

    pub fn fetch_record(&self, uuid: &str) -> Result<Record, ApiError> {
        let url = self.endpoint(&["api", "get-form-data"])?;
        let request = self.http.post(url).json(&serde_json::json!({ "uuid": uuid }));
        self.send(request, Some(uuid), "record")
    }

    pub fn update_record(&self, record: &Record) -> Result<Record, ApiError> {
        let url = self.endpoint(&["api", "update-form-data", &record.uuid])?;
        self.send(self.http.put(url).json(record), Some(&record.uuid), "saved record")
    }

    pub fn database_stats(&self) -> Result<DatabaseStats, ApiError> {
        let url = self.endpoint(&["api", "database-stats"])?;
        self.send(self.http.get(url), None, "database stats")
    }

    pub fn duplicates(&self) -> Result<DuplicateReport, ApiError> {
        let url = self.endpoint(&["api", "duplicates"])?;
        self.send(self.http.get(url), None, "duplicate report")
    }

    pub fn stale_records(&self, days: u32) -> Result<StaleReport, ApiError> {
        let mut url = self.endpoint(&["api", "stale-records"])?;
        url.query_pairs_mut().append_pair("days", &days.to_string());
        self.send(self.http.get(url), None, "stale record report")
    }

    pub fn user_stats(&self) -> Result<UsageStats, ApiError> {
        let url = self.endpoint(&["api", "user-stats"])?;
        self.send(self.http.get(url), None, "usage stats")
    }

    pub fn health(&self) -> Result<Health, ApiError> {
        let url = self.endpoint(&["api", "health"])?;
        self.send(self.http.get(url), None, "health check")
    }

    pub fn analytics(&self, tab: AnalyticsTab, stale_days: u32) -> Result<AnalyticsPayload, ApiError> {
        match tab {
            AnalyticsTab::Overview => self.database_stats().map(AnalyticsPayload::Overview),
            AnalyticsTab::Duplicates => self.duplicates().map(AnalyticsPayload::Duplicates),
            AnalyticsTab::Stale => self.stale_records(stale_days).map(AnalyticsPayload::Stale),
            AnalyticsTab::Usage => self.user_stats().map(AnalyticsPayload::Usage),
        }
    }

    /// Performs one session request and tags the result so the session can
    /// match it against what it is still waiting for.
    pub fn execute(&self, request: &ApiRequest) -> ApiResponse {
        match request {
            ApiRequest::ListIdentifiers => ApiResponse::Identifiers(self.list_identifiers()),
            ApiRequest::FetchRecord(fetch) => ApiResponse::Record {
                generation: fetch.generation,
                result: self.fetch_record(&fetch.uuid),
            },
            ApiRequest::SaveRecord(save) => ApiResponse::Saved {
                token: save.token,
                result: self.update_record(&save.record),
            },
            ApiRequest::LoadAnalytics {
                request,
                stale_days,
            } => ApiResponse::Analytics {
                tab: request.tab,
                token: request.token,
                result: self.analytics(request.tab, *stale_days),
            },
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::NetworkFailure(format!("{} cannot take a path", self.base_url()))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        uuid: Option<&str>,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url(), self.timeout, &error))?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "backend responded");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body, uuid));
        }

        response
            .json()
            .map_err(|error| ApiError::NetworkFailure(format!("decode {what}: {error}")))
    }
}

fn connection_error(base_url: &str, timeout: Duration, error: &reqwest::Error) -> ApiError {
    if error.is_timeout() {
        return ApiError::NetworkFailure(format!(
            "{base_url} did not answer within {}s",
            timeout.as_secs_f32()
        ));
    }
    ApiError::NetworkFailure(format!(
        "cannot reach {base_url} -- is the backend running? ({error})"
    ))
}

fn clean_error_response(status: StatusCode, body: &str, uuid: Option<&str>) -> ApiError {
    let detail = error_detail(body);
    let code = status.as_u16();

    match code {
        404 => ApiError::NotFound(uuid.map_or_else(|| detail.clone(), str::to_owned)),
        400 | 409 | 422 => ApiError::ValidationFailure(if detail.is_empty() {
            format!("status {code}")
        } else {
            detail
        }),
        // The record endpoint reports a missing identifier as a 500 whose
        // detail is the inner "404: ..." error.
        500..=599 if detail.starts_with("404") => {
            ApiError::NotFound(uuid.map_or_else(|| detail.clone(), str::to_owned))
        }
        _ if detail.is_empty() => ApiError::NetworkFailure(format!("server returned {code}")),
        _ => ApiError::NetworkFailure(format!("server error ({code}): {detail}")),
    }
}

/// Pulls a human-readable message out of an error body: FastAPI's
/// `{"detail": "..."}`, its validation list `{"detail": [{"msg": ...}]}`, or a
/// short plain-text body.
fn error_detail(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body)
        && let Some(detail) = map.get("detail")
    {
        return match detail {
            Value::String(text) => text.trim().to_owned(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| {
                    let message = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(Value::as_array)
                        .and_then(|loc| loc.last())
                        .and_then(Value::as_str);
                    Some(match field {
                        Some(field) => format!("{field}: {message}"),
                        None => message.to_owned(),
                    })
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        };
    }

    let trimmed = body.trim();
    if trimmed.len() < 100 && !trimmed.contains('{') {
        return trimmed.to_owned();
    }
    String::new()
}
