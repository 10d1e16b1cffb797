// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The client session: one selector, one record fetcher, one edit session,
//! and the analytics panel, driven from a single thread.
//!
//! Inputs arrive three ways: user [`Command`]s, backend [`ApiResponse`]s, and
//! clock advances. Each returns the [`SessionEvent`]s it produced, including
//! the [`ApiRequest`]s the caller must issue. The session never performs I/O.

use crate::analytics::{AnalyticsPanel, AnalyticsRequest};
use crate::edit::{EditSession, EditTimings, SaveOutcome, SaveRequest, SaveTrigger};
use crate::fetcher::{FetchOutcome, FetchRequest, FetchTimings, RecordFetcher, Selection};
use crate::pointer::{Point, PointerHub, Region};
use crate::selection::SelectionInput;
use crate::timers::{FiredTimer, Scheduler, TimerTask};
use crate::{
    AnalyticsPayload, AnalyticsTab, ApiError, Delivery, EditError, Generation, Record,
    RecordField, RequestToken, SaveStatus, SaveToken,
};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_STALE_DAYS: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub autosave_delay: Duration,
    pub saved_reset_delay: Duration,
    pub progress_interval: Duration,
    pub loading_grace: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        let fetch = FetchTimings::default();
        let edit = EditTimings::default();
        Self {
            autosave_delay: edit.autosave_delay,
            saved_reset_delay: edit.saved_reset_delay,
            progress_interval: fetch.progress_interval,
            loading_grace: fetch.loading_grace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    ListIdentifiers,
    FetchRecord(FetchRequest),
    SaveRecord(SaveRequest),
    LoadAnalytics {
        request: AnalyticsRequest,
        stale_days: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Identifiers(Result<Vec<String>, ApiError>),
    Record {
        generation: Generation,
        result: Result<Record, ApiError>,
    },
    Saved {
        token: SaveToken,
        result: Result<Record, ApiError>,
    },
    Analytics {
        tab: AnalyticsTab,
        token: RequestToken,
        result: Result<AnalyticsPayload, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TypeText(String),
    ToggleDropdown,
    HighlightCandidate(isize),
    ChooseHighlighted,
    Choose(String),
    PointerDown(Point),
    ReloadIdentifiers,
    EnterEdit,
    ChangeField(RecordField, String),
    Save,
    CancelEdit,
    OpenAnalytics,
    CloseAnalytics,
    SwitchTab(AnalyticsTab),
    RotateTab(isize),
    DismissBanner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Requested(ApiRequest),
    SelectionChanged(String),
    RecordShown(String),
    RecordUpdated(Record),
    SaveStatusChanged(SaveStatus),
    AnalyticsUpdated(AnalyticsTab),
    BannerRaised(String),
    Rejected(EditError),
}

pub struct Session {
    selection: SelectionInput,
    fetcher: RecordFetcher,
    edit: EditSession,
    analytics: AnalyticsPanel,
    scheduler: Scheduler,
    pointer: PointerHub,
    banner: Option<String>,
    stale_days: u32,
    /// Saves the backend has not answered yet, by token and identifier.
    /// Outlives edit-session teardown so a reselected record cannot start
    /// a second concurrent save.
    saves_in_flight: Vec<(SaveToken, String)>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionTimings::default(), DEFAULT_STALE_DAYS)
    }
}

impl Session {
    pub fn new(timings: SessionTimings, stale_days: u32) -> Self {
        Self {
            selection: SelectionInput::new(),
            fetcher: RecordFetcher::new(FetchTimings {
                progress_interval: timings.progress_interval,
                loading_grace: timings.loading_grace,
            }),
            edit: EditSession::new(EditTimings {
                autosave_delay: timings.autosave_delay,
                saved_reset_delay: timings.saved_reset_delay,
            }),
            analytics: AnalyticsPanel::new(),
            scheduler: Scheduler::new(),
            pointer: PointerHub::new(),
            banner: None,
            stale_days: stale_days.max(1),
            saves_in_flight: Vec::new(),
        }
    }

    pub fn selection(&self) -> &SelectionInput {
        &self.selection
    }

    pub fn fetcher(&self) -> &RecordFetcher {
        &self.fetcher
    }

    pub fn edit(&self) -> &EditSession {
        &self.edit
    }

    pub fn analytics(&self) -> &AnalyticsPanel {
        &self.analytics
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn pointer_hub(&self) -> &PointerHub {
        &self.pointer
    }

    /// The record the form displays.
    pub fn record(&self) -> &Record {
        self.edit.view()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.edit.status()
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Mounts the selector and asks for the identifier list. Call once.
    pub fn start(&mut self) -> Vec<SessionEvent> {
        self.selection.mount(&self.pointer);
        vec![SessionEvent::Requested(ApiRequest::ListIdentifiers)]
    }

    /// Cancels every outstanding timer and releases the pointer listener.
    pub fn teardown(&mut self) {
        self.edit.teardown(&mut self.scheduler);
        self.fetcher.stop_timers(&mut self.scheduler);
        self.scheduler.cancel_all();
        self.saves_in_flight.clear();
        self.selection.unmount();
        self.analytics.close();
    }

    pub fn set_selector_region(&mut self, region: Region) {
        self.selection.set_region(region);
    }

    pub fn dispatch(&mut self, command: Command) -> Vec<SessionEvent> {
        match command {
            Command::TypeText(text) => {
                let identifier = self.selection.type_text(text);
                self.select(identifier)
            }
            Command::ToggleDropdown => {
                self.selection.toggle();
                Vec::new()
            }
            Command::HighlightCandidate(delta) => {
                self.selection.move_highlight(delta);
                Vec::new()
            }
            Command::ChooseHighlighted => match self.selection.choose_highlighted() {
                Some(identifier) => self.select(identifier),
                None => Vec::new(),
            },
            Command::Choose(identifier) => {
                let identifier = self.selection.choose(identifier);
                self.select(identifier)
            }
            Command::PointerDown(point) => {
                self.selection.pointer_down(&self.pointer, point);
                Vec::new()
            }
            Command::ReloadIdentifiers => {
                vec![SessionEvent::Requested(ApiRequest::ListIdentifiers)]
            }
            Command::EnterEdit => {
                if self.fetcher.is_awaiting_response() {
                    return reject(EditError::Loading);
                }
                let result = self.edit.enter_edit();
                self.status_or_rejection(result)
            }
            Command::ChangeField(field, value) => {
                if self.fetcher.is_awaiting_response() {
                    return reject(EditError::Loading);
                }
                let before = self.edit.status();
                match self.edit.change_field(&mut self.scheduler, field, value) {
                    Ok(()) => self.status_change_since(before),
                    Err(error) => reject(error),
                }
            }
            Command::Save => self.start_save(SaveTrigger::Manual),
            Command::CancelEdit => {
                let result = self.edit.cancel(&mut self.scheduler);
                self.status_or_rejection(result)
            }
            Command::OpenAnalytics => self.analytics_requested(|panel| panel.open()),
            Command::CloseAnalytics => {
                self.analytics.close();
                Vec::new()
            }
            Command::SwitchTab(tab) => self.analytics_requested(|panel| panel.switch_to(tab)),
            Command::RotateTab(delta) => self.analytics_requested(|panel| panel.rotate(delta)),
            Command::DismissBanner => {
                self.banner = None;
                self.fetcher.dismiss_error();
                Vec::new()
            }
        }
    }

    pub fn deliver(&mut self, response: ApiResponse) -> Vec<SessionEvent> {
        match response {
            ApiResponse::Identifiers(result) => {
                self.selection.load_candidates(result);
                match self.selection.load_error().map(str::to_owned) {
                    Some(message) => {
                        warn!(%message, "identifier list unavailable");
                        self.raise(message)
                    }
                    None => {
                        debug!(count = self.selection.candidates().len(), "identifiers loaded");
                        Vec::new()
                    }
                }
            }
            ApiResponse::Record { generation, result } => {
                match self.fetcher.complete(&mut self.scheduler, generation, result) {
                    FetchOutcome::Loaded(record) => {
                        info!(uuid = %record.uuid, "record loaded");
                        let uuid = record.uuid.clone();
                        let before = self.edit.status();
                        self.edit.replace_baseline(&mut self.scheduler, record);
                        let mut events = vec![SessionEvent::RecordShown(uuid)];
                        events.extend(self.status_change_since(before));
                        events
                    }
                    FetchOutcome::Failed(error) => {
                        warn!(%error, "record fetch failed");
                        self.raise(fetch_failure_message(&error))
                    }
                    FetchOutcome::Stale => Vec::new(),
                }
            }
            ApiResponse::Saved { token, result } => {
                self.saves_in_flight.retain(|(pending, _)| *pending != token);
                match self.edit.complete_save(&mut self.scheduler, token, result) {
                    SaveOutcome::Saved(record) => {
                        info!(uuid = %record.uuid, "record saved");
                        vec![
                            SessionEvent::SaveStatusChanged(SaveStatus::Saved),
                            SessionEvent::RecordUpdated(record),
                        ]
                    }
                    SaveOutcome::Failed(error) => {
                        warn!(%error, "save failed; draft kept");
                        let mut events = vec![SessionEvent::SaveStatusChanged(SaveStatus::Error)];
                        events.extend(self.raise(format!("save failed: {error}")));
                        events
                    }
                    SaveOutcome::Stale => Vec::new(),
                }
            }
            ApiResponse::Analytics { tab, token, result } => {
                if let Err(error) = &result {
                    warn!(tab = tab.label(), %error, "analytics fetch failed");
                }
                match self.analytics.complete(tab, token, result) {
                    Delivery::Applied => vec![SessionEvent::AnalyticsUpdated(tab)],
                    Delivery::Stale => Vec::new(),
                }
            }
        }
    }

    /// Fires every timer due at or before `now`, in deadline order.
    pub fn advance_to(&mut self, now: Duration) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(fired) = self.scheduler.pop_due(now) {
            events.extend(self.fire(fired));
        }
        self.scheduler.settle_at(now);
        events
    }

    pub fn advance_by(&mut self, delta: Duration) -> Vec<SessionEvent> {
        self.advance_to(self.scheduler.now() + delta)
    }

    fn fire(&mut self, fired: FiredTimer) -> Vec<SessionEvent> {
        match fired.task {
            TimerTask::ProgressTick => {
                self.fetcher.on_progress_tick(fired.id);
                Vec::new()
            }
            TimerTask::LoadingGrace(generation) => {
                self.fetcher.on_loading_grace(fired.id, generation);
                Vec::new()
            }
            TimerTask::Autosave => {
                debug!(at = ?fired.at, "autosave timer fired");
                if self.edit.claim_autosave(fired.id) {
                    self.start_save(SaveTrigger::Autosave)
                } else {
                    Vec::new()
                }
            }
            TimerTask::SavedReset => {
                if self.edit.on_saved_reset(fired.id) {
                    vec![SessionEvent::SaveStatusChanged(SaveStatus::Idle)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn select(&mut self, identifier: String) -> Vec<SessionEvent> {
        let before = self.edit.status();
        if before != SaveStatus::Idle {
            info!(status = %before, "new selection discards the edit session");
        }
        self.edit.teardown(&mut self.scheduler);
        self.banner = None;

        let mut events = vec![SessionEvent::SelectionChanged(identifier.clone())];
        match self.fetcher.select(&mut self.scheduler, &identifier) {
            Selection::Cleared(record) => {
                self.edit.replace_baseline(&mut self.scheduler, record);
                events.push(SessionEvent::RecordShown(String::new()));
            }
            Selection::Fetch(request) => {
                info!(uuid = %request.uuid, generation = request.generation.get(), "fetching record");
                events.push(SessionEvent::Requested(ApiRequest::FetchRecord(request)));
            }
        }
        events.extend(self.status_change_since(before));
        events
    }

    fn start_save(&mut self, trigger: SaveTrigger) -> Vec<SessionEvent> {
        let conflicting = self.edit.draft().is_some_and(|draft| {
            self.saves_in_flight
                .iter()
                .any(|(_, uuid)| *uuid == draft.uuid)
        });
        if conflicting {
            return reject(EditError::SaveInFlight);
        }
        match self.edit.save(&mut self.scheduler, trigger) {
            Ok(request) => {
                self.saves_in_flight
                    .push((request.token, request.record.uuid.clone()));
                vec![
                    SessionEvent::SaveStatusChanged(SaveStatus::Saving),
                    SessionEvent::Requested(ApiRequest::SaveRecord(request)),
                ]
            }
            Err(error) => reject(error),
        }
    }

    fn analytics_requested(
        &mut self,
        action: impl FnOnce(&mut AnalyticsPanel) -> Option<AnalyticsRequest>,
    ) -> Vec<SessionEvent> {
        match action(&mut self.analytics) {
            Some(request) => vec![SessionEvent::Requested(ApiRequest::LoadAnalytics {
                request,
                stale_days: self.stale_days,
            })],
            None => Vec::new(),
        }
    }

    fn status_or_rejection(&mut self, result: Result<(), EditError>) -> Vec<SessionEvent> {
        match result {
            Ok(()) => vec![SessionEvent::SaveStatusChanged(self.edit.status())],
            Err(error) => reject(error),
        }
    }

    fn status_change_since(&self, before: SaveStatus) -> Vec<SessionEvent> {
        let after = self.edit.status();
        if after == before {
            Vec::new()
        } else {
            vec![SessionEvent::SaveStatusChanged(after)]
        }
    }

    fn raise(&mut self, message: String) -> Vec<SessionEvent> {
        self.banner = Some(message.clone());
        vec![SessionEvent::BannerRaised(message)]
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn reject(error: EditError) -> Vec<SessionEvent> {
    warn!(%error, "edit command rejected");
    vec![SessionEvent::Rejected(error)]
}

fn fetch_failure_message(error: &ApiError) -> String {
    match error {
        ApiError::NotFound(_) => {
            format!("{error}; check that the identifier exists or pick another")
        }
        _ => format!("failed to fetch record: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiRequest, ApiResponse, Command, Session, SessionEvent};
    use crate::{ApiError, EditError, Record, SaveStatus};

    #[test]
    fn start_mounts_selector_and_requests_identifiers() {
        let mut session = Session::default();
        let events = session.start();
        assert_eq!(events, vec![SessionEvent::Requested(ApiRequest::ListIdentifiers)]);
        assert!(session.selection().is_mounted());
        assert_eq!(session.pointer_hub().listener_count(), 1);

        session.teardown();
        assert_eq!(session.pointer_hub().listener_count(), 0);
    }

    #[test]
    fn identifier_failure_raises_banner_without_retry() {
        let mut session = Session::default();
        session.start();
        let events = session.deliver(ApiResponse::Identifiers(Err(ApiError::NetworkFailure(
            "connection refused".to_owned(),
        ))));
        assert!(matches!(events.as_slice(), [SessionEvent::BannerRaised(_)]));
        assert!(session.selection().candidates().is_empty());
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, SessionEvent::Requested(_)))
        );
    }

    #[test]
    fn edit_commands_without_a_record_are_rejected() {
        let mut session = Session::default();
        assert_eq!(
            session.dispatch(Command::EnterEdit),
            vec![SessionEvent::Rejected(EditError::NothingSelected)]
        );
        assert_eq!(
            session.dispatch(Command::Save),
            vec![SessionEvent::Rejected(EditError::NotEditing(SaveStatus::Idle))]
        );
    }

    #[test]
    fn dismissing_banner_clears_fetch_error() {
        let mut session = Session::default();
        let events = session.dispatch(Command::TypeText("ghost".to_owned()));
        let generation = events
            .iter()
            .find_map(|event| match event {
                SessionEvent::Requested(ApiRequest::FetchRecord(request)) => {
                    Some(request.generation)
                }
                _ => None,
            })
            .expect("fetch requested");
        session.deliver(ApiResponse::Record {
            generation,
            result: Err(ApiError::NotFound("ghost".to_owned())),
        });
        assert!(session.banner().is_some());
        assert!(session.fetcher().error().is_some());

        session.dispatch(Command::DismissBanner);
        assert!(session.banner().is_none());
        assert!(session.fetcher().error().is_none());
        assert_eq!(session.record(), &Record::default());
    }
}
