// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use formfill_app::analytics::AnalyticsRequest;
use formfill_app::edit::{SaveRequest, SaveTrigger};
use formfill_app::fetcher::FetchRequest;
use formfill_app::pointer::{Point, Region};
use formfill_app::{
    AnalyticsPayload, AnalyticsTab, ApiError, ApiRequest, ApiResponse, Command, DatabaseStats,
    DuplicateReport, EditError, Record, RecordField, SaveStatus, Session, SessionEvent,
    SessionTimings,
};
use formfill_testkit::RecordFaker;
use std::time::Duration;

fn jane() -> Record {
    Record {
        uuid: "abc-123".to_owned(),
        name: "Jane Doe".to_owned(),
        email: "jane@x.com".to_owned(),
        ..Record::default()
    }
}

fn bob() -> Record {
    Record {
        uuid: "def-456".to_owned(),
        name: "Bob Roe".to_owned(),
        company: "Acme".to_owned(),
        ..Record::default()
    }
}

fn requests(events: &[SessionEvent]) -> Vec<ApiRequest> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Requested(request) => Some(request.clone()),
            _ => None,
        })
        .collect()
}

fn fetch_of(events: &[SessionEvent]) -> FetchRequest {
    requests(events)
        .into_iter()
        .find_map(|request| match request {
            ApiRequest::FetchRecord(fetch) => Some(fetch),
            _ => None,
        })
        .expect("a record fetch should be requested")
}

fn save_of(events: &[SessionEvent]) -> SaveRequest {
    requests(events)
        .into_iter()
        .find_map(|request| match request {
            ApiRequest::SaveRecord(save) => Some(save),
            _ => None,
        })
        .expect("a save should be requested")
}

fn analytics_of(events: &[SessionEvent]) -> AnalyticsRequest {
    requests(events)
        .into_iter()
        .find_map(|request| match request {
            ApiRequest::LoadAnalytics { request, .. } => Some(request),
            _ => None,
        })
        .expect("an analytics fetch should be requested")
}

fn loaded(session: &mut Session, record: Record) {
    let events = session.dispatch(Command::Choose(record.uuid.clone()));
    let fetch = fetch_of(&events);
    session.deliver(ApiResponse::Record {
        generation: fetch.generation,
        result: Ok(record),
    });
}

#[test]
fn latest_selection_wins_when_responses_arrive_in_order() {
    let mut session = Session::default();
    let first = fetch_of(&session.dispatch(Command::TypeText("abc-123".to_owned())));
    let second = fetch_of(&session.dispatch(Command::TypeText("def-456".to_owned())));

    session.deliver(ApiResponse::Record {
        generation: first.generation,
        result: Ok(jane()),
    });
    assert_eq!(session.record(), &Record::default());
    assert!(session.fetcher().is_loading());

    session.deliver(ApiResponse::Record {
        generation: second.generation,
        result: Ok(bob()),
    });
    assert_eq!(session.record(), &bob());
}

#[test]
fn latest_selection_wins_when_responses_arrive_reversed() {
    let mut session = Session::default();
    let first = fetch_of(&session.dispatch(Command::TypeText("abc-123".to_owned())));
    let second = fetch_of(&session.dispatch(Command::TypeText("def-456".to_owned())));

    session.deliver(ApiResponse::Record {
        generation: second.generation,
        result: Ok(bob()),
    });
    let late = session.deliver(ApiResponse::Record {
        generation: first.generation,
        result: Err(ApiError::NotFound("abc-123".to_owned())),
    });

    assert!(late.is_empty());
    assert_eq!(session.record(), &bob());
    assert!(session.fetcher().error().is_none());
    assert!(session.banner().is_none());
}

#[test]
fn empty_identifier_clears_without_a_request() {
    let mut session = Session::default();
    loaded(&mut session, jane());

    let events = session.dispatch(Command::TypeText(String::new()));
    assert!(requests(&events).is_empty());
    assert_eq!(session.record(), &Record::default());
    assert!(!session.fetcher().is_loading());
    assert_eq!(session.scheduler().pending_count(), 0);
}

#[test]
fn progress_reaches_full_then_clears_after_grace() {
    let mut session = Session::default();
    let fetch = fetch_of(&session.dispatch(Command::TypeText("abc-123".to_owned())));

    session.advance_by(Duration::from_millis(400));
    assert_eq!(session.fetcher().progress(), 20);
    session.advance_by(Duration::from_secs(5));
    assert_eq!(session.fetcher().progress(), 90);

    session.deliver(ApiResponse::Record {
        generation: fetch.generation,
        result: Ok(jane()),
    });
    assert_eq!(session.fetcher().progress(), 100);
    assert_eq!(session.record(), &jane());

    session.advance_by(Duration::from_millis(300));
    assert!(!session.fetcher().is_loading());
    assert_eq!(session.fetcher().progress(), 0);
}

#[test]
fn rapid_edits_produce_one_autosave_with_latest_values() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    session.dispatch(Command::EnterEdit);

    let mut saves = Vec::new();
    for value in ["J", "Ja", "Jan", "Jane S", "Jane Smith"] {
        session.dispatch(Command::ChangeField(RecordField::Name, value.to_owned()));
        let events = session.advance_by(Duration::from_secs(29));
        saves.extend(requests(&events));
    }
    assert!(saves.is_empty());

    let events = session.advance_by(Duration::from_secs(1));
    let save = save_of(&events);
    assert_eq!(save.trigger, SaveTrigger::Autosave);
    assert_eq!(save.record.name, "Jane Smith");
    assert_eq!(session.save_status(), SaveStatus::Saving);
    assert_eq!(requests(&events).len(), 1);

    let later = session.advance_by(Duration::from_secs(60));
    assert!(requests(&later).is_empty());
}

#[test]
fn manual_save_cancels_pending_autosave() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Email, "jane@y.com".to_owned()));
    session.advance_by(Duration::from_secs(10));

    let save = save_of(&session.dispatch(Command::Save));
    assert_eq!(save.trigger, SaveTrigger::Manual);
    assert!(!session.edit().autosave_pending());

    let events = session.advance_by(Duration::from_secs(30));
    assert!(requests(&events).is_empty());
}

#[test]
fn cancel_restores_the_baseline() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Name, "Nobody".to_owned()));
    session.dispatch(Command::ChangeField(RecordField::Notes, "scratch".to_owned()));

    let events = session.dispatch(Command::CancelEdit);
    assert_eq!(events, vec![SessionEvent::SaveStatusChanged(SaveStatus::Idle)]);
    assert_eq!(session.record(), &jane());
    assert!(requests(&session.advance_by(Duration::from_secs(60))).is_empty());
}

#[test]
fn save_success_shows_saved_then_returns_to_idle() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Name, "Jane Smith".to_owned()));
    let save = save_of(&session.dispatch(Command::Save));

    let mut stored = save.record.clone();
    stored.phone = "555-0100".to_owned();
    let events = session.deliver(ApiResponse::Saved {
        token: save.token,
        result: Ok(stored.clone()),
    });
    assert!(events.contains(&SessionEvent::RecordUpdated(stored.clone())));
    assert_eq!(session.save_status(), SaveStatus::Saved);
    assert_eq!(session.record(), &stored);

    session.advance_by(Duration::from_millis(1_999));
    assert_eq!(session.save_status(), SaveStatus::Saved);
    let events = session.advance_by(Duration::from_millis(1));
    assert_eq!(events, vec![SessionEvent::SaveStatusChanged(SaveStatus::Idle)]);
}

#[test]
fn save_failure_keeps_draft_and_offers_retry() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Email, "bad".to_owned()));
    let save = save_of(&session.dispatch(Command::Save));

    session.deliver(ApiResponse::Saved {
        token: save.token,
        result: Err(ApiError::ValidationFailure("invalid email".to_owned())),
    });
    assert_eq!(session.save_status(), SaveStatus::Error);
    assert_eq!(session.record().email, "bad");
    assert!(session.banner().is_some_and(|banner| banner.contains("invalid email")));
    assert!(requests(&session.advance_by(Duration::from_secs(60))).is_empty());

    let retry = save_of(&session.dispatch(Command::Save));
    assert_ne!(retry.token, save.token);
    assert_eq!(retry.record.email, "bad");
}

#[test]
fn selecting_another_record_abandons_the_draft() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Name, "Draft".to_owned()));

    let fetch = fetch_of(&session.dispatch(Command::Choose("def-456".to_owned())));
    assert_eq!(session.save_status(), SaveStatus::Idle);
    assert!(!session.edit().autosave_pending());
    assert_eq!(session.record(), &jane());

    session.deliver(ApiResponse::Record {
        generation: fetch.generation,
        result: Ok(bob()),
    });
    assert_eq!(session.record(), &bob());
    assert!(requests(&session.advance_by(Duration::from_secs(60))).is_empty());
}

#[test]
fn slow_analytics_response_for_previous_tab_is_discarded() {
    let mut session = Session::default();
    let overview = analytics_of(&session.dispatch(Command::OpenAnalytics));
    let duplicates =
        analytics_of(&session.dispatch(Command::SwitchTab(AnalyticsTab::Duplicates)));

    session.deliver(ApiResponse::Analytics {
        tab: duplicates.tab,
        token: duplicates.token,
        result: Ok(AnalyticsPayload::Duplicates(DuplicateReport::default())),
    });
    let late = session.deliver(ApiResponse::Analytics {
        tab: overview.tab,
        token: overview.token,
        result: Ok(AnalyticsPayload::Overview(DatabaseStats {
            total_records: 7,
            ..DatabaseStats::default()
        })),
    });

    assert!(late.is_empty());
    assert_eq!(session.analytics().active_tab(), AnalyticsTab::Duplicates);
    assert!(matches!(
        session.analytics().active().payload,
        Some(AnalyticsPayload::Duplicates(_))
    ));
}

#[test]
fn stale_tab_request_carries_configured_window() {
    let mut session = Session::new(SessionTimings::default(), 90);
    session.dispatch(Command::OpenAnalytics);
    let events = session.dispatch(Command::SwitchTab(AnalyticsTab::Stale));
    assert!(matches!(
        requests(&events).as_slice(),
        [ApiRequest::LoadAnalytics { stale_days: 90, .. }]
    ));
}

#[test]
fn pointer_outside_closes_dropdown_only_while_mounted() {
    let mut session = Session::default();
    session.start();
    session.deliver(ApiResponse::Identifiers(Ok(vec![
        "abc-123".to_owned(),
        "def-456".to_owned(),
    ])));
    session.set_selector_region(Region::new(0, 0, 40, 8));

    session.dispatch(Command::ToggleDropdown);
    session.dispatch(Command::PointerDown(Point::new(10, 3)));
    assert!(session.selection().is_open());
    session.dispatch(Command::PointerDown(Point::new(60, 20)));
    assert!(!session.selection().is_open());

    session.teardown();
    assert_eq!(session.pointer_hub().listener_count(), 0);
    assert_eq!(session.scheduler().pending_count(), 0);
}

#[test]
fn dropdown_choice_fetches_the_highlighted_identifier() {
    let mut session = Session::default();
    session.start();
    session.deliver(ApiResponse::Identifiers(Ok(vec![
        "abc-123".to_owned(),
        "def-456".to_owned(),
    ])));

    session.dispatch(Command::HighlightCandidate(1));
    session.dispatch(Command::HighlightCandidate(1));
    let fetch = fetch_of(&session.dispatch(Command::ChooseHighlighted));
    assert_eq!(fetch.uuid, "def-456");
    assert_eq!(session.selection().text(), "def-456");
    assert!(!session.selection().is_open());
}

#[test]
fn worked_example_edit_and_autosave() {
    let mut session = Session::default();
    session.start();
    session.deliver(ApiResponse::Identifiers(Ok(vec!["abc-123".to_owned()])));

    let fetch = fetch_of(&session.dispatch(Command::Choose("abc-123".to_owned())));
    assert_eq!(fetch.uuid, "abc-123");
    session.deliver(ApiResponse::Record {
        generation: fetch.generation,
        result: Ok(jane()),
    });
    assert_eq!(session.record().name, "Jane Doe");

    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Name, "Jane Smith".to_owned()));
    assert_eq!(session.save_status(), SaveStatus::Editing);

    let save = save_of(&session.advance_by(Duration::from_secs(30)));
    assert_eq!(save.record.name, "Jane Smith");
    assert_eq!(save.record.email, "jane@x.com");

    session.deliver(ApiResponse::Saved {
        token: save.token,
        result: Ok(save.record.clone()),
    });
    assert_eq!(session.save_status(), SaveStatus::Saved);
    session.advance_by(Duration::from_secs(2));
    assert_eq!(session.save_status(), SaveStatus::Idle);
    assert_eq!(session.record().name, "Jane Smith");
}

#[test]
fn latest_selection_wins_for_any_response_order() {
    for seed in 1..=25 {
        let mut faker = RecordFaker::new(seed);
        let records: Vec<Record> = (0..5).map(|_| faker.record()).collect();
        let mut session = Session::default();

        let mut pending: Vec<(FetchRequest, Record)> = records
            .iter()
            .map(|record| {
                let events = session.dispatch(Command::TypeText(record.uuid.clone()));
                (fetch_of(&events), record.clone())
            })
            .collect();
        faker.shuffle(&mut pending);

        for (fetch, record) in pending {
            session.deliver(ApiResponse::Record {
                generation: fetch.generation,
                result: Ok(record),
            });
        }
        assert_eq!(session.record(), &records[4], "seed {seed}");
    }
}

#[test]
fn reselecting_a_record_cannot_start_a_second_concurrent_save() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Name, "Jane Smith".to_owned()));
    let first = save_of(&session.dispatch(Command::Save));

    loaded(&mut session, bob());
    loaded(&mut session, jane());
    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Name, "Jane Q".to_owned()));

    let events = session.dispatch(Command::Save);
    assert_eq!(events, vec![SessionEvent::Rejected(EditError::SaveInFlight)]);
    assert_eq!(session.save_status(), SaveStatus::Editing);

    let late = session.deliver(ApiResponse::Saved {
        token: first.token,
        result: Ok(first.record.clone()),
    });
    assert!(late.is_empty());

    let second = save_of(&session.dispatch(Command::Save));
    assert_ne!(second.token, first.token);
    assert_eq!(second.record.name, "Jane Q");
}

#[test]
fn save_in_flight_for_another_record_does_not_block() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Name, "Jane Smith".to_owned()));
    save_of(&session.dispatch(Command::Save));

    loaded(&mut session, bob());
    session.dispatch(Command::EnterEdit);
    session.dispatch(Command::ChangeField(RecordField::Company, "Initech".to_owned()));
    let save = save_of(&session.dispatch(Command::Save));
    assert_eq!(save.record.uuid, "def-456");
}

#[test]
fn editing_is_refused_while_the_next_record_loads() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    let fetch = fetch_of(&session.dispatch(Command::Choose("def-456".to_owned())));

    assert_eq!(
        session.dispatch(Command::EnterEdit),
        vec![SessionEvent::Rejected(EditError::Loading)]
    );
    assert_eq!(
        session.dispatch(Command::ChangeField(RecordField::Name, "x".to_owned())),
        vec![SessionEvent::Rejected(EditError::Loading)]
    );
    assert_eq!(session.save_status(), SaveStatus::Idle);

    session.deliver(ApiResponse::Record {
        generation: fetch.generation,
        result: Ok(bob()),
    });
    assert!(session.fetcher().is_loading());
    assert_eq!(
        session.dispatch(Command::EnterEdit),
        vec![SessionEvent::SaveStatusChanged(SaveStatus::Editing)]
    );
    assert_eq!(session.edit().draft(), Some(&bob()));
}

#[test]
fn failed_fetch_reopens_editing_of_the_shown_record() {
    let mut session = Session::default();
    loaded(&mut session, jane());
    let fetch = fetch_of(&session.dispatch(Command::TypeText("ghost".to_owned())));
    session.deliver(ApiResponse::Record {
        generation: fetch.generation,
        result: Err(ApiError::NotFound("ghost".to_owned())),
    });

    assert_eq!(
        session.dispatch(Command::EnterEdit),
        vec![SessionEvent::SaveStatusChanged(SaveStatus::Editing)]
    );
    assert_eq!(session.edit().draft(), Some(&jane()));
}
