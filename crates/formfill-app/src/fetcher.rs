// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::timers::{Scheduler, TimerHandle, TimerTask, cancel_slot, claim_fired};
use crate::{ApiError, Generation, Record, TimerId};
use std::time::Duration;
use tracing::debug;

pub const PROGRESS_STEP: u8 = 10;
pub const PROGRESS_CAP: u8 = 90;
pub const PROGRESS_DONE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimings {
    pub progress_interval: Duration,
    pub loading_grace: Duration,
}

impl Default for FetchTimings {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(200),
            loading_grace: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: Generation,
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Empty identifier: nothing to fetch, show this blank record.
    Cleared(Record),
    Fetch(FetchRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(Record),
    Failed(ApiError),
    Stale,
}

/// Turns identifiers into records. Every selection bumps the generation;
/// responses carrying an older generation are dropped without touching any
/// state.
#[derive(Debug, Default)]
pub struct RecordFetcher {
    timings: FetchTimings,
    generation: Generation,
    uuid: String,
    loading: bool,
    awaiting: bool,
    progress: u8,
    error: Option<ApiError>,
    ticker: Option<TimerHandle>,
    grace: Option<TimerHandle>,
}

impl RecordFetcher {
    pub fn new(timings: FetchTimings) -> Self {
        Self {
            timings,
            ..Self::default()
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn selected_uuid(&self) -> &str {
        &self.uuid
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True from `select` until the latest generation's response lands.
    /// Unlike `is_loading` this excludes the grace period.
    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn select(&mut self, scheduler: &mut Scheduler, uuid: &str) -> Selection {
        self.stop_timers(scheduler);
        self.generation = self.generation.next();
        self.uuid = uuid.to_owned();
        self.error = None;
        self.progress = 0;

        if uuid.is_empty() {
            self.loading = false;
            self.awaiting = false;
            debug!(generation = self.generation.get(), "selection cleared");
            return Selection::Cleared(Record::empty(uuid));
        }

        self.loading = true;
        self.awaiting = true;
        self.ticker = Some(
            scheduler.schedule_repeating(self.timings.progress_interval, TimerTask::ProgressTick),
        );
        Selection::Fetch(FetchRequest {
            generation: self.generation,
            uuid: uuid.to_owned(),
        })
    }

    pub fn complete(
        &mut self,
        scheduler: &mut Scheduler,
        generation: Generation,
        result: Result<Record, ApiError>,
    ) -> FetchOutcome {
        if generation != self.generation {
            debug!(
                stale = generation.get(),
                latest = self.generation.get(),
                "discarding superseded record response"
            );
            return FetchOutcome::Stale;
        }

        self.awaiting = false;
        cancel_slot(scheduler, &mut self.ticker);
        cancel_slot(scheduler, &mut self.grace);
        self.grace = Some(
            scheduler.schedule(self.timings.loading_grace, TimerTask::LoadingGrace(generation)),
        );

        match result {
            Ok(record) => {
                self.progress = PROGRESS_DONE;
                FetchOutcome::Loaded(record)
            }
            Err(error) => {
                self.error = Some(error.clone());
                FetchOutcome::Failed(error)
            }
        }
    }

    pub fn on_progress_tick(&mut self, fired: TimerId) {
        let ours = self
            .ticker
            .as_ref()
            .is_some_and(|handle| handle.id() == fired);
        if ours && self.loading {
            self.progress = self.progress.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
        }
    }

    pub fn on_loading_grace(&mut self, fired: TimerId, generation: Generation) {
        if !claim_fired(&mut self.grace, fired) || generation != self.generation {
            return;
        }
        self.loading = false;
        self.progress = 0;
    }

    pub fn stop_timers(&mut self, scheduler: &mut Scheduler) {
        cancel_slot(scheduler, &mut self.ticker);
        cancel_slot(scheduler, &mut self.grace);
    }
}
