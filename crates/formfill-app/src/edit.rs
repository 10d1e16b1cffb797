// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Draft editing with debounced autosave.
//!
//! ```text
//! Idle --enter_edit--> Editing --save/autosave--> Saving --ok--> Saved --2s--> Idle
//!                       ^   |                        |
//!                       |   +--cancel--> Idle        +--err--> Error --change/save/cancel
//!                       +------------------------------------------+
//! ```

use crate::timers::{Scheduler, TimerHandle, TimerTask, cancel_slot, claim_fired};
use crate::{ApiError, EditError, Record, RecordField, SaveStatus, SaveToken, TimerId};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTimings {
    pub autosave_delay: Duration,
    pub saved_reset_delay: Duration,
}

impl Default for EditTimings {
    fn default() -> Self {
        Self {
            autosave_delay: Duration::from_secs(30),
            saved_reset_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Manual,
    Autosave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub token: SaveToken,
    pub trigger: SaveTrigger,
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(Record),
    Failed(ApiError),
    Stale,
}

#[derive(Debug, Default)]
pub struct EditSession {
    timings: EditTimings,
    baseline: Record,
    draft: Option<Record>,
    status: SaveStatus,
    autosave: Option<TimerHandle>,
    reset: Option<TimerHandle>,
    in_flight: Option<SaveToken>,
    last_token: SaveToken,
    last_error: Option<ApiError>,
}

impl EditSession {
    pub fn new(timings: EditTimings) -> Self {
        Self {
            timings,
            ..Self::default()
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn baseline(&self) -> &Record {
        &self.baseline
    }

    pub fn draft(&self) -> Option<&Record> {
        self.draft.as_ref()
    }

    /// What the form shows: the draft while one exists, else the baseline.
    pub fn view(&self) -> &Record {
        self.draft.as_ref().unwrap_or(&self.baseline)
    }

    pub fn is_dirty(&self) -> bool {
        self.draft
            .as_ref()
            .is_some_and(|draft| draft != &self.baseline)
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_some()
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Installs a freshly fetched (or cleared) record. Any session in
    /// progress is torn down first so no timer can save a draft against a
    /// record that is no longer shown.
    pub fn replace_baseline(&mut self, scheduler: &mut Scheduler, record: Record) {
        self.teardown(scheduler);
        self.baseline = record;
    }

    /// Cancels every timer, forgets any in-flight save, and drops the draft.
    pub fn teardown(&mut self, scheduler: &mut Scheduler) {
        cancel_slot(scheduler, &mut self.autosave);
        cancel_slot(scheduler, &mut self.reset);
        if let Some(token) = self.in_flight.take() {
            debug!(token = token.get(), "abandoning in-flight save");
        }
        self.draft = None;
        self.last_error = None;
        self.status = SaveStatus::Idle;
    }

    pub fn enter_edit(&mut self) -> Result<(), EditError> {
        if self.status != SaveStatus::Idle {
            return Err(EditError::NotIdle(self.status));
        }
        if self.baseline.uuid.is_empty() {
            return Err(EditError::NothingSelected);
        }
        self.draft = Some(self.baseline.clone());
        self.status = SaveStatus::Editing;
        Ok(())
    }

    /// Updates the draft and restarts the autosave countdown from zero.
    pub fn change_field(
        &mut self,
        scheduler: &mut Scheduler,
        field: RecordField,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        if !matches!(self.status, SaveStatus::Editing | SaveStatus::Error) {
            return Err(EditError::NotEditing(self.status));
        }
        let Some(draft) = self.draft.as_mut() else {
            return Err(EditError::NotEditing(self.status));
        };
        draft.set_field(field, value);
        self.status = SaveStatus::Editing;

        cancel_slot(scheduler, &mut self.autosave);
        self.autosave = Some(scheduler.schedule(self.timings.autosave_delay, TimerTask::Autosave));
        Ok(())
    }

    pub fn save(
        &mut self,
        scheduler: &mut Scheduler,
        trigger: SaveTrigger,
    ) -> Result<SaveRequest, EditError> {
        match self.status {
            SaveStatus::Editing | SaveStatus::Error => {}
            SaveStatus::Saving => return Err(EditError::SaveInFlight),
            other => return Err(EditError::NotEditing(other)),
        }
        let Some(draft) = self.draft.clone() else {
            return Err(EditError::NotEditing(self.status));
        };

        cancel_slot(scheduler, &mut self.autosave);
        self.last_token = self.last_token.next();
        self.in_flight = Some(self.last_token);
        self.status = SaveStatus::Saving;
        self.last_error = None;
        info!(uuid = %draft.uuid, ?trigger, "saving draft");

        Ok(SaveRequest {
            token: self.last_token,
            trigger,
            record: draft,
        })
    }

    /// True when `fired` is the live autosave timer. The caller then issues
    /// the save itself.
    pub fn claim_autosave(&mut self, fired: TimerId) -> bool {
        claim_fired(&mut self.autosave, fired)
    }

    pub fn complete_save(
        &mut self,
        scheduler: &mut Scheduler,
        token: SaveToken,
        result: Result<Record, ApiError>,
    ) -> SaveOutcome {
        if self.in_flight != Some(token) {
            debug!(token = token.get(), "discarding save response for abandoned draft");
            return SaveOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(saved) => {
                self.baseline = saved.clone();
                self.draft = None;
                self.status = SaveStatus::Saved;
                cancel_slot(scheduler, &mut self.reset);
                self.reset =
                    Some(scheduler.schedule(self.timings.saved_reset_delay, TimerTask::SavedReset));
                SaveOutcome::Saved(saved)
            }
            Err(error) => {
                self.status = SaveStatus::Error;
                self.last_error = Some(error.clone());
                SaveOutcome::Failed(error)
            }
        }
    }

    pub fn on_saved_reset(&mut self, fired: TimerId) -> bool {
        if !claim_fired(&mut self.reset, fired) || self.status != SaveStatus::Saved {
            return false;
        }
        self.status = SaveStatus::Idle;
        true
    }

    pub fn cancel(&mut self, scheduler: &mut Scheduler) -> Result<(), EditError> {
        if !matches!(self.status, SaveStatus::Editing | SaveStatus::Error) {
            return Err(EditError::NotEditing(self.status));
        }
        cancel_slot(scheduler, &mut self.autosave);
        self.draft = None;
        self.last_error = None;
        self.status = SaveStatus::Idle;
        Ok(())
    }
}
