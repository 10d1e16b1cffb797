// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Pointer-down fan-out for "click outside" handling.
//!
//! Listeners register a bounding region and get back a [`PointerSubscription`].
//! The subscription is the only way to stay registered: dropping it removes
//! the listener, so an unmounted control can never observe pointer events.

use crate::ListenerId;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        let right = u32::from(self.x) + u32::from(self.width);
        let bottom = u32::from(self.y) + u32::from(self.height);
        point.x >= self.x
            && u32::from(point.x) < right
            && point.y >= self.y
            && u32::from(point.y) < bottom
    }
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: ListenerId,
    listeners: BTreeMap<ListenerId, Region>,
}

#[derive(Debug, Default, Clone)]
pub struct PointerHub {
    inner: Rc<RefCell<HubInner>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, region: Region) -> PointerSubscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id = inner.next_id.next();
        let id = inner.next_id;
        inner.listeners.insert(id, region);
        PointerSubscription {
            id,
            hub: Rc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Listeners whose region does not contain `point`.
    pub fn outside(&self, point: Point) -> Vec<ListenerId> {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|(_, region)| !region.contains(point))
            .map(|(id, _)| *id)
            .collect()
    }
}

#[derive(Debug)]
pub struct PointerSubscription {
    id: ListenerId,
    hub: Weak<RefCell<HubInner>>,
}

impl PointerSubscription {
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    pub fn set_region(&self, region: Region) {
        if let Some(hub) = self.hub.upgrade()
            && let Some(slot) = hub.borrow_mut().listeners.get_mut(&self.id)
        {
            *slot = region;
        }
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.borrow_mut().listeners.remove(&self.id);
        }
    }
}
