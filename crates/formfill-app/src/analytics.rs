// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AnalyticsPayload, AnalyticsTab, ApiError, Delivery, RequestToken};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsRequest {
    pub tab: AnalyticsTab,
    pub token: RequestToken,
}

/// Per-tab state. `token` is the outstanding request, if any; a response is
/// accepted only when it carries exactly this token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabState {
    pub payload: Option<AnalyticsPayload>,
    pub loading: bool,
    pub error: Option<String>,
    token: Option<RequestToken>,
}

#[derive(Debug, Default)]
pub struct AnalyticsPanel {
    open: bool,
    active: AnalyticsTab,
    tabs: [TabState; 4],
    last_token: RequestToken,
}

impl AnalyticsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active_tab(&self) -> AnalyticsTab {
        self.active
    }

    pub fn tab(&self, tab: AnalyticsTab) -> &TabState {
        &self.tabs[tab.index()]
    }

    pub fn active(&self) -> &TabState {
        self.tab(self.active)
    }

    /// Panel-level spinner: mirrors the active tab only.
    pub fn is_loading(&self) -> bool {
        self.open && self.active().loading
    }

    pub fn open(&mut self) -> Option<AnalyticsRequest> {
        if self.open {
            return None;
        }
        self.open = true;
        Some(self.begin_fetch(self.active))
    }

    /// Destroys every payload and invalidates every outstanding request.
    pub fn close(&mut self) {
        self.open = false;
        self.tabs = Default::default();
    }

    pub fn switch_to(&mut self, tab: AnalyticsTab) -> Option<AnalyticsRequest> {
        if !self.open || tab == self.active {
            return None;
        }
        self.abandon(self.active);
        self.active = tab;
        Some(self.begin_fetch(tab))
    }

    pub fn rotate(&mut self, delta: isize) -> Option<AnalyticsRequest> {
        self.switch_to(self.active.rotate(delta))
    }

    pub fn complete(
        &mut self,
        tab: AnalyticsTab,
        token: RequestToken,
        result: Result<AnalyticsPayload, ApiError>,
    ) -> Delivery {
        if !self.open || tab != self.active || self.tabs[tab.index()].token != Some(token) {
            debug!(
                tab = tab.label(),
                token = token.get(),
                "discarding analytics response for inactive tab"
            );
            return Delivery::Stale;
        }

        let state = &mut self.tabs[tab.index()];
        state.token = None;
        state.loading = false;
        match result {
            Ok(payload) if payload.tab() == tab => {
                state.payload = Some(payload);
                state.error = None;
            }
            Ok(payload) => {
                state.error = Some(format!(
                    "{} tab received {} data",
                    tab.label(),
                    payload.tab().label()
                ));
            }
            Err(error) => {
                state.error = Some(format!("failed to load {}: {error}", tab.label()));
            }
        }
        Delivery::Applied
    }

    fn begin_fetch(&mut self, tab: AnalyticsTab) -> AnalyticsRequest {
        self.last_token = self.last_token.next();
        let state = &mut self.tabs[tab.index()];
        state.token = Some(self.last_token);
        state.loading = true;
        state.error = None;
        AnalyticsRequest {
            tab,
            token: self.last_token,
        }
    }

    fn abandon(&mut self, tab: AnalyticsTab) {
        let state = &mut self.tabs[tab.index()];
        state.token = None;
        state.loading = false;
    }
}
