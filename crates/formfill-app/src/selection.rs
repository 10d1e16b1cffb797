// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ApiError;
use crate::pointer::{Point, PointerHub, PointerSubscription, Region};

/// Free-text identifier input with a dropdown of known identifiers.
///
/// Every text edit is forwarded as a selection immediately; there is no
/// debounce, and any text counts as a candidate identifier.
#[derive(Debug, Default)]
pub struct SelectionInput {
    text: String,
    candidates: Vec<String>,
    open: bool,
    highlighted: Option<usize>,
    load_error: Option<String>,
    region: Region,
    subscription: Option<PointerSubscription>,
}

impl SelectionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn mount(&mut self, hub: &PointerHub) {
        if self.subscription.is_none() {
            self.subscription = Some(hub.subscribe(self.region));
        }
    }

    pub fn unmount(&mut self) {
        self.subscription = None;
        self.open = false;
    }

    /// Bounding region of the whole control: input, button, and the open
    /// dropdown list.
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
        if let Some(subscription) = &self.subscription {
            subscription.set_region(region);
        }
    }

    pub fn load_candidates(&mut self, result: Result<Vec<String>, ApiError>) {
        match result {
            Ok(candidates) => {
                self.candidates = candidates;
                self.load_error = None;
            }
            Err(error) => {
                self.candidates.clear();
                self.load_error = Some(format!("failed to load identifiers: {error}"));
            }
        }
        self.highlighted = None;
    }

    /// Replaces the text and returns it as the selected identifier.
    pub fn type_text(&mut self, text: impl Into<String>) -> String {
        self.text = text.into();
        self.text.clone()
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        if !self.open {
            self.highlighted = None;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }

    pub fn choose(&mut self, identifier: impl Into<String>) -> String {
        self.text = identifier.into();
        self.close();
        self.text.clone()
    }

    pub fn choose_highlighted(&mut self) -> Option<String> {
        if !self.open {
            return None;
        }
        let identifier = self.highlighted.and_then(|index| self.candidates.get(index))?.clone();
        Some(self.choose(identifier))
    }

    pub fn move_highlight(&mut self, delta: isize) {
        if self.candidates.is_empty() {
            self.highlighted = None;
            return;
        }
        self.open = true;
        let len = self.candidates.len() as isize;
        let next = match self.highlighted {
            Some(current) => (current as isize + delta).rem_euclid(len),
            None if delta < 0 => len - 1,
            None => 0,
        };
        self.highlighted = Some(next as usize);
    }

    /// Closes the dropdown when the press lands outside the control. Returns
    /// whether it closed. Unmounted controls ignore pointer events.
    pub fn pointer_down(&mut self, hub: &PointerHub, point: Point) -> bool {
        let Some(subscription) = &self.subscription else {
            return false;
        };
        if !self.open || !hub.outside(point).contains(&subscription.id()) {
            return false;
        }
        self.close();
        true
    }
}
