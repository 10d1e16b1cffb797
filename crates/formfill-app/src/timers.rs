// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Virtual-time scheduler for the session's timers.
//!
//! Deadlines are measured as offsets on a monotonic clock that the owner
//! advances explicitly. The UI loop feeds it wall-clock elapsed time; tests
//! feed it whatever they like. Nothing fires on its own.

use crate::{Generation, TimerId};
use std::collections::BTreeMap;
use std::time::Duration;

/// What a timer does when it fires. The session routes each task to the
/// component that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    ProgressTick,
    LoadingGrace(Generation),
    Autosave,
    SavedReset,
}

/// Owned handle to a scheduled task. Not `Clone`: whoever holds it is the
/// only one able to cancel it.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a timer handle leaves the timer armed with no way to cancel it"]
pub struct TimerHandle {
    id: TimerId,
}

impl TimerHandle {
    pub const fn id(&self) -> TimerId {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub task: TimerTask,
    pub at: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    deadline: Duration,
    interval: Option<Duration>,
    task: TimerTask,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: TimerId,
    entries: BTreeMap<TimerId, Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, task: TimerTask) -> TimerHandle {
        self.insert(self.now + delay, None, task)
    }

    /// Arms a periodic task. The first firing is one `interval` from now.
    pub fn schedule_repeating(&mut self, interval: Duration, task: TimerTask) -> TimerHandle {
        let interval = interval.max(Duration::from_millis(1));
        self.insert(self.now + interval, Some(interval), task)
    }

    /// Returns false when the timer had already fired (one-shot) or been
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle.id).is_some()
    }

    pub fn is_pending(&self, handle: &TimerHandle) -> bool {
        self.entries.contains_key(&handle.id)
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.values().map(|entry| entry.deadline).min()
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Pops the earliest task due at or before `until`, moving the clock to
    /// its deadline. Repeating tasks are re-armed before they are returned,
    /// so a handler may cancel them.
    pub fn pop_due(&mut self, until: Duration) -> Option<FiredTimer> {
        let (id, entry) = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.deadline <= until)
            .min_by_key(|(id, entry)| (entry.deadline, **id))
            .map(|(id, entry)| (*id, *entry))?;

        self.now = self.now.max(entry.deadline);
        match entry.interval {
            Some(interval) => {
                if let Some(slot) = self.entries.get_mut(&id) {
                    slot.deadline = entry.deadline + interval;
                }
            }
            None => {
                self.entries.remove(&id);
            }
        }

        Some(FiredTimer {
            id,
            task: entry.task,
            at: entry.deadline,
        })
    }

    /// Moves the clock forward without firing anything. Callers drain
    /// `pop_due` first.
    pub fn settle_at(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    fn insert(&mut self, deadline: Duration, interval: Option<Duration>, task: TimerTask) -> TimerHandle {
        self.next_id = self.next_id.next();
        let id = self.next_id;
        self.entries.insert(
            id,
            Entry {
                deadline,
                interval,
                task,
            },
        );
        TimerHandle { id }
    }
}

/// Cancels the timer in `slot`, if any, leaving `None` behind.
pub fn cancel_slot(scheduler: &mut Scheduler, slot: &mut Option<TimerHandle>) {
    if let Some(handle) = slot.take() {
        scheduler.cancel(handle);
    }
}

/// Clears `slot` when it holds the timer that just fired. Returns whether it
/// did, which tells a component the firing is its own.
pub fn claim_fired(slot: &mut Option<TimerHandle>, fired: TimerId) -> bool {
    if slot.as_ref().is_some_and(|handle| handle.id() == fired) {
        *slot = None;
        return true;
    }
    false
}
