// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A form record keyed by `uuid`. Every field defaults to the empty string,
/// including fields the backend sends as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "empty_if_null")]
    pub uuid: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub name: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub email: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub phone: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub address: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub company: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub position: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub notes: String,
}

impl Record {
    pub fn empty(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Self::default()
        }
    }

    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::Name => &self.name,
            RecordField::Email => &self.email,
            RecordField::Phone => &self.phone,
            RecordField::Address => &self.address,
            RecordField::Company => &self.company,
            RecordField::Position => &self.position,
            RecordField::Notes => &self.notes,
        }
    }

    pub fn set_field(&mut self, field: RecordField, value: impl Into<String>) {
        let slot = match field {
            RecordField::Name => &mut self.name,
            RecordField::Email => &mut self.email,
            RecordField::Phone => &mut self.phone,
            RecordField::Address => &mut self.address,
            RecordField::Company => &mut self.company,
            RecordField::Position => &mut self.position,
            RecordField::Notes => &mut self.notes,
        };
        *slot = value.into();
    }
}

/// Editable record fields. The identifier is deliberately absent: it is the
/// key, not a value the draft may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Name,
    Email,
    Phone,
    Address,
    Company,
    Position,
    Notes,
}

impl RecordField {
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::Company,
        Self::Position,
        Self::Notes,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Address => "Address",
            Self::Company => "Company",
            Self::Position => "Position",
            Self::Notes => "Notes",
        }
    }

    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::Notes)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Editing,
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Editing => "editing",
            Self::Saving => "saving",
            Self::Saved => "saved",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnalyticsTab {
    #[default]
    Overview,
    Duplicates,
    Stale,
    Usage,
}

impl AnalyticsTab {
    pub const ALL: [Self; 4] = [Self::Overview, Self::Duplicates, Self::Stale, Self::Usage];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Duplicates => "duplicates",
            Self::Stale => "stale",
            Self::Usage => "usage",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Overview => 0,
            Self::Duplicates => 1,
            Self::Stale => 2,
            Self::Usage => 3,
        }
    }

    pub fn rotate(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let next = (self.index() as isize + delta).rem_euclid(len) as usize;
        Self::ALL[next]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStats {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub duplicate_count: u64,
    #[serde(default)]
    pub stale_count: u64,
    #[serde(default)]
    pub active_records: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub uuid1: String,
    pub uuid2: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    #[serde(default)]
    pub duplicates: Vec<DuplicatePair>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedRecord {
    pub uuid: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleAnalysis {
    #[serde(default)]
    pub stale_records: Vec<FlaggedRecord>,
    #[serde(default)]
    pub important_but_inactive: Vec<FlaggedRecord>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleReport {
    #[serde(default)]
    pub analysis: Option<StaleAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionPattern {
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub insight: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInsights {
    #[serde(default)]
    pub preferred_fields: Vec<String>,
    #[serde(default)]
    pub correction_patterns: Vec<CorrectionPattern>,
    #[serde(default)]
    pub time_saving_tips: Vec<String>,
    #[serde(default)]
    pub predicted_defaults: BTreeMap<String, String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default)]
    pub total_interactions: u64,
    #[serde(default)]
    pub total_corrections: u64,
    #[serde(default)]
    pub total_views: u64,
    #[serde(default)]
    pub intelligent_analysis: UsageInsights,
}

/// Tab-specific analytics data, passed through to presentation untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsPayload {
    Overview(DatabaseStats),
    Duplicates(DuplicateReport),
    Stale(StaleReport),
    Usage(UsageStats),
}

impl AnalyticsPayload {
    pub const fn tab(&self) -> AnalyticsTab {
        match self {
            Self::Overview(_) => AnalyticsTab::Overview,
            Self::Duplicates(_) => AnalyticsTab::Duplicates,
            Self::Stale(_) => AnalyticsTab::Stale,
            Self::Usage(_) => AnalyticsTab::Usage,
        }
    }
}
