// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::prefs::Preferences;
use anyhow::{Context, Result};
use formfill_api::Client;
use formfill_app::{ApiRequest, ApiResponse, Theme};
use formfill_tui::{AppRuntime, InternalEvent};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;

/// Runs every backend request on its own worker thread. Completion order is
/// whatever the network gives; the session sorts out staleness.
pub struct HttpRuntime {
    client: Client,
    preferences: Preferences,
}

impl HttpRuntime {
    pub fn new(client: Client, preferences: Preferences) -> Self {
        Self {
            client,
            preferences,
        }
    }
}

impl AppRuntime for HttpRuntime {
    fn execute(&mut self, request: &ApiRequest) -> ApiResponse {
        self.client.execute(request)
    }

    fn set_theme_preference(&mut self, theme: Theme) -> Result<()> {
        self.preferences.set_theme(theme)
    }

    fn spawn_request(&mut self, request: ApiRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("formfill-request".to_owned())
            .spawn(move || {
                let response = client.execute(&request);
                if tx.send(InternalEvent::Response(response)).is_err() {
                    debug!("ui closed before response arrived");
                }
            })
            .context("spawn request worker")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::HttpRuntime;
    use crate::prefs::Preferences;
    use anyhow::Result;
    use formfill_api::Client;
    use formfill_app::fetcher::FetchRequest;
    use formfill_app::{ApiRequest, ApiResponse, Generation, Theme};
    use formfill_testkit::{MockBackend, MockResponse, sample_record};
    use formfill_tui::{AppRuntime, InternalEvent};
    use serde_json::json;
    use std::sync::mpsc;
    use std::time::Duration;

    fn runtime(base_url: &str, temp: &tempfile::TempDir) -> Result<HttpRuntime> {
        let client = Client::new(base_url, Duration::from_secs(2))?;
        let prefs = Preferences::load(&temp.path().join("preferences.toml"))?;
        Ok(HttpRuntime::new(client, prefs))
    }

    #[test]
    fn spawned_requests_report_back_through_channel() -> Result<()> {
        let backend = MockBackend::serve(1, |_| {
            MockResponse::ok(&serde_json::to_value(sample_record()).unwrap_or(json!({})))
        })?;
        let temp = tempfile::tempdir()?;
        let mut runtime = runtime(backend.base_url(), &temp)?;

        let (tx, rx) = mpsc::channel();
        runtime.spawn_request(
            ApiRequest::FetchRecord(FetchRequest {
                generation: Generation::new(4),
                uuid: "abc-123".to_owned(),
            }),
            tx,
        )?;

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        match event {
            InternalEvent::Response(ApiResponse::Record { generation, result }) => {
                assert_eq!(generation, Generation::new(4));
                assert_eq!(result?, sample_record());
            }
            other => panic!("unexpected event {other:?}"),
        }
        backend.finish()?;
        Ok(())
    }

    #[test]
    fn theme_preference_is_written_to_disk() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut runtime = runtime("http://127.0.0.1:1", &temp)?;
        runtime.set_theme_preference(Theme::Dark)?;

        let reloaded = Preferences::load(&temp.path().join("preferences.toml"))?;
        assert_eq!(reloaded.theme(), Theme::Dark);
        Ok(())
    }
}
