// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use formfill_app::Record;
use serde_json::{Value, json};
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

const FIRST_NAMES: [&str; 12] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Robin", "Rowan",
];
const LAST_NAMES: [&str; 12] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Turner", "Brooks",
];
const COMPANIES: [&str; 8] = [
    "Acme", "Globex", "Initech", "Umbrella", "Hooli", "Vandelay", "Stark", "Wayne",
];
const POSITIONS: [&str; 6] = [
    "Engineer",
    "Analyst",
    "Manager",
    "Designer",
    "Director",
    "Consultant",
];
const STREETS: [&str; 8] = [
    "Cedar", "Maple", "Oak", "Pine", "Willow", "Elm", "Birch", "Juniper",
];

/// SplitMix64. Small, seedable, and good enough for fixture variety.
#[derive(Debug, Clone)]
struct SplitMix {
    state: u64,
}

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, bound: usize) -> usize {
        match u64::try_from(bound) {
            Ok(0 | 1) | Err(_) => 0,
            Ok(bound) => usize::try_from(self.next_u64() % bound).unwrap_or(0),
        }
    }
}

/// Seeded record generator. The same seed always yields the same records.
#[derive(Debug, Clone)]
pub struct RecordFaker {
    rng: SplitMix,
}

impl RecordFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SplitMix { state: seed },
        }
    }

    pub fn uuid(&mut self) -> String {
        let high = self.rng.next_u64();
        let low = self.rng.next_u64();
        format!(
            "{:08x}-{:04x}-4{:03x}-a{:03x}-{:012x}",
            high >> 32,
            (high >> 16) & 0xffff,
            high & 0x0fff,
            (low >> 48) & 0x0fff,
            low & 0xffff_ffff_ffff
        )
    }

    pub fn record(&mut self) -> Record {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let company = self.pick(&COMPANIES);
        Record {
            uuid: self.uuid(),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}@{}.example",
                first.to_lowercase(),
                last.to_lowercase(),
                company.to_lowercase()
            ),
            phone: format!("555-{:04}", self.rng.below(10_000)),
            address: format!("{} {} St", 100 + self.rng.below(9_900), self.pick(&STREETS)),
            company: company.to_owned(),
            position: self.pick(&POSITIONS).to_owned(),
            notes: String::new(),
        }
    }

    /// Fisher-Yates, driven by the same seed as the records.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for upper in (1..items.len()).rev() {
            items.swap(upper, self.rng.below(upper + 1));
        }
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.below(values.len())]
    }
}

pub fn sample_record() -> Record {
    Record {
        uuid: "abc-123".to_owned(),
        name: "Jane Doe".to_owned(),
        email: "jane@x.com".to_owned(),
        phone: "555-0100".to_owned(),
        address: "12 Cedar St".to_owned(),
        company: "Acme".to_owned(),
        position: "Engineer".to_owned(),
        notes: "prefers email".to_owned(),
    }
}

pub fn database_stats_json() -> Value {
    json!({
        "total_records": 42,
        "duplicate_count": 3,
        "stale_count": 5,
        "active_records": 37
    })
}

pub fn duplicates_json() -> Value {
    json!({
        "duplicates": [
            {
                "uuid1": "abc-123",
                "uuid2": "abd-124",
                "confidence": 0.92,
                "reason": "same email",
                "type": "exact"
            }
        ]
    })
}

pub fn stale_records_json() -> Value {
    json!({
        "analysis": {
            "stale_records": [{"uuid": "old-1", "reason": "untouched for a year"}],
            "important_but_inactive": [],
            "recommendations": ["archive old-1"],
            "summary": "one stale record"
        }
    })
}

pub fn user_stats_json() -> Value {
    json!({
        "total_interactions": 12,
        "total_corrections": 2,
        "total_views": 9,
        "intelligent_analysis": {
            "preferred_fields": ["email"],
            "correction_patterns": [{"pattern": "phone format", "insight": "dashes"}],
            "time_saving_tips": [],
            "predicted_defaults": {"company": "Acme"},
            "summary": "mostly reads"
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).context("decode recorded request body")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn ok(body: &Value) -> Self {
        Self::json(200, body)
    }

    /// A FastAPI-style `{"detail": ...}` error body.
    pub fn detail(status: u16, detail: &str) -> Self {
        Self::json(status, &json!({ "detail": detail }))
    }
}

/// A tiny_http server on an ephemeral port that answers up to `expected`
/// requests with `handler` and records what it saw.
pub struct MockBackend {
    base_url: String,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl MockBackend {
    pub fn serve<F>(expected: usize, handler: F) -> Result<Self>
    where
        F: Fn(&RecordedRequest) -> MockResponse + Send + 'static,
    {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock backend: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let mut seen = Vec::with_capacity(expected);
            while seen.len() < expected {
                let mut request = match server.recv_timeout(Duration::from_secs(5)) {
                    Ok(Some(request)) => request,
                    Ok(None) | Err(_) => break,
                };
                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    body.clear();
                }
                let recorded = RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_owned(),
                    body,
                };
                let reply = handler(&recorded);
                let mut response =
                    Response::from_string(reply.body).with_status_code(reply.status);
                if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
                    response = response.with_header(header);
                }
                let _ = request.respond(response);
                seen.push(recorded);
            }
            seen
        });

        Ok(Self { base_url, handle })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for the server thread and returns every request it answered.
    pub fn finish(self) -> Result<Vec<RecordedRequest>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("mock backend thread panicked"))
    }
}

/// A base URL nothing listens on.
pub fn unreachable_base_url() -> &'static str {
    "http://127.0.0.1:1"
}

#[cfg(test)]
mod tests {
    use super::{RecordFaker, sample_record};

    #[test]
    fn faker_is_deterministic_per_seed() {
        let mut a = RecordFaker::new(7);
        let mut b = RecordFaker::new(7);
        assert_eq!(a.record(), b.record());
        assert_ne!(RecordFaker::new(8).record(), RecordFaker::new(7).record());
    }

    #[test]
    fn faker_fills_every_field_but_notes() {
        let record = RecordFaker::new(3).record();
        assert_eq!(record.uuid.len(), 36);
        assert!(record.email.contains('@'));
        assert!(!record.company.is_empty());
        assert!(record.notes.is_empty());
    }

    #[test]
    fn shuffle_keeps_every_item() {
        let mut items: Vec<u32> = (0..10).collect();
        RecordFaker::new(11).shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn sample_record_matches_worked_example() {
        let record = sample_record();
        assert_eq!(record.uuid, "abc-123");
        assert_eq!(record.name, "Jane Doe");
    }
}
