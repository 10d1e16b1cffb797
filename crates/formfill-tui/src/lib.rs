// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use formfill_app::analytics::AnalyticsPanel;
use formfill_app::pointer::{Point, Region};
use formfill_app::{
    AnalyticsPayload, AnalyticsTab, ApiRequest, ApiResponse, Command, DatabaseStats,
    DuplicateReport, RecordField, SaveStatus, Session, SessionEvent, StaleReport, Theme,
    UsageStats,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Tabs, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, warn};

const DROPDOWN_MAX_ROWS: u16 = 8;
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const POLL_INTERVAL: Duration = Duration::from_millis(120);

/// The backend seam. `execute` performs one request synchronously;
/// `spawn_request` delivers the tagged response through `tx`, on whatever
/// thread the implementation chooses.
pub trait AppRuntime {
    fn execute(&mut self, request: &ApiRequest) -> ApiResponse;
    fn set_theme_preference(&mut self, theme: Theme) -> Result<()>;
    fn spawn_request(&mut self, request: ApiRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let response = self.execute(&request);
        tx.send(InternalEvent::Response(response))
            .map_err(|_| anyhow!("response channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Response(ApiResponse),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    theme: Theme,
    focused_field: usize,
    status_line: Option<String>,
    status_token: u64,
    last_saved_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    text: Color,
    background: Color,
    accent: Color,
    muted: Color,
    error: Color,
}

impl Palette {
    const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                text: Color::Black,
                background: Color::White,
                accent: Color::Blue,
                muted: Color::DarkGray,
                error: Color::Red,
            },
            Theme::Dark => Self {
                text: Color::White,
                background: Color::Black,
                accent: Color::Cyan,
                muted: Color::Gray,
                error: Color::LightRed,
            },
        }
    }

    fn base(self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenAreas {
    header: Rect,
    selector: Rect,
    progress: Rect,
    banner: Rect,
    form: Rect,
    status: Rect,
}

pub fn run_app<R: AppRuntime>(session: &mut Session, runtime: &mut R, theme: Theme) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        theme,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();
    let clock = Instant::now();

    boot(session, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    let mut area = Rect::default();
    loop {
        process_internal_events(session, runtime, &mut view_data, &internal_tx, &internal_rx);
        let fired = session.advance_to(clock.elapsed());
        apply_session_events(fired, runtime, &mut view_data, &internal_tx);

        match terminal.size() {
            Ok(size) => {
                area = Rect::new(0, 0, size.width, size.height);
                session.set_selector_region(selector_region(session, area));
            }
            Err(error) => {
                result = Err(error).context("query terminal size");
                break;
            }
        }

        if let Err(error) = terminal.draw(|frame| render(frame, session, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(poll_timeout(session)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) => {
                if handle_key_event(session, runtime, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(Event::Mouse(mouse)) => {
                handle_mouse_event(session, runtime, &mut view_data, &internal_tx, mouse, area);
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    session.teardown();
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen)
        .context("leave alternate screen")?;
    result
}

fn boot<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let events = session.start();
    apply_session_events(events, runtime, view_data, tx);
}

fn process_internal_events<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Response(response) => {
                let events = session.deliver(response);
                apply_session_events(events, runtime, view_data, tx);
            }
        }
    }
}

fn apply_session_events<R: AppRuntime>(
    events: Vec<SessionEvent>,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    for event in events {
        match event {
            SessionEvent::Requested(request) => {
                debug!(?request, "dispatching backend request");
                if let Err(error) = runtime.spawn_request(request, tx.clone()) {
                    warn!(%error, "backend request not started");
                    emit_status(view_data, tx, format!("request not sent: {error}"));
                }
            }
            SessionEvent::RecordShown(uuid) => {
                view_data.focused_field = 0;
                if !uuid.is_empty() {
                    emit_status(view_data, tx, format!("loaded {uuid}"));
                }
            }
            SessionEvent::RecordUpdated(record) => {
                view_data.last_saved_at =
                    Some(OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()));
                emit_status(view_data, tx, format!("saved {}", record.uuid));
            }
            SessionEvent::Rejected(error) => emit_status(view_data, tx, error.to_string()),
            SessionEvent::SelectionChanged(_)
            | SessionEvent::SaveStatusChanged(_)
            | SessionEvent::AnalyticsUpdated(_)
            | SessionEvent::BannerRaised(_) => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn run_command<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: Command,
) {
    let events = session.dispatch(command);
    apply_session_events(events, runtime, view_data, tx);
}

fn is_editing(session: &Session) -> bool {
    matches!(
        session.save_status(),
        SaveStatus::Editing | SaveStatus::Error
    )
}

fn focused_field(view_data: &ViewData) -> RecordField {
    RecordField::ALL[view_data.focused_field % RecordField::ALL.len()]
}

fn move_focus(view_data: &mut ViewData, delta: isize) {
    let len = RecordField::ALL.len() as isize;
    view_data.focused_field = (view_data.focused_field as isize + delta).rem_euclid(len) as usize;
}

fn plain_char(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(c)
        }
        _ => None,
    }
}

fn is_ctrl(key: KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Returns true when the app should quit.
fn handle_key_event<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if is_ctrl(key, 'c') {
        return true;
    }

    if key.code == KeyCode::F(6) {
        view_data.theme = view_data.theme.toggled();
        match runtime.set_theme_preference(view_data.theme) {
            Ok(()) => emit_status(
                view_data,
                internal_tx,
                format!("theme {}", view_data.theme.label()),
            ),
            Err(error) => emit_status(
                view_data,
                internal_tx,
                format!("theme not saved: {error}"),
            ),
        }
        return false;
    }

    if session.analytics().is_open() {
        handle_analytics_key(session, runtime, view_data, internal_tx, key);
        return false;
    }

    if key.code == KeyCode::F(5) {
        run_command(session, runtime, view_data, internal_tx, Command::OpenAnalytics);
        return false;
    }
    if is_ctrl(key, 'e') {
        run_command(session, runtime, view_data, internal_tx, Command::EnterEdit);
        return false;
    }
    if is_ctrl(key, 's') {
        run_command(session, runtime, view_data, internal_tx, Command::Save);
        return false;
    }

    if key.code == KeyCode::Esc {
        let command = if is_editing(session) {
            Command::CancelEdit
        } else if session.selection().is_open() {
            Command::ToggleDropdown
        } else {
            Command::DismissBanner
        };
        run_command(session, runtime, view_data, internal_tx, command);
        return false;
    }

    if is_editing(session) {
        handle_form_key(session, runtime, view_data, internal_tx, key);
    } else {
        handle_selector_key(session, runtime, view_data, internal_tx, key);
    }
    false
}

fn handle_analytics_key<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Esc | KeyCode::F(5) => Command::CloseAnalytics,
        KeyCode::Left | KeyCode::BackTab => Command::RotateTab(-1),
        KeyCode::Right | KeyCode::Tab => Command::RotateTab(1),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            Command::SwitchTab(AnalyticsTab::ALL[index])
        }
        _ => return,
    };
    run_command(session, runtime, view_data, internal_tx, command);
}

fn handle_form_key<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let field = focused_field(view_data);
    let mut value = session.record().field(field).to_owned();
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            move_focus(view_data, 1);
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            move_focus(view_data, -1);
            return;
        }
        KeyCode::Enter if field.is_multiline() => value.push('\n'),
        KeyCode::Enter => {
            move_focus(view_data, 1);
            return;
        }
        KeyCode::Backspace => {
            if value.pop().is_none() {
                return;
            }
        }
        _ => match plain_char(key) {
            Some(c) => value.push(c),
            None => return,
        },
    }
    run_command(
        session,
        runtime,
        view_data,
        internal_tx,
        Command::ChangeField(field, value),
    );
}

fn handle_selector_key<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Down => Command::HighlightCandidate(1),
        KeyCode::Up => Command::HighlightCandidate(-1),
        KeyCode::Enter => Command::ChooseHighlighted,
        KeyCode::F(2) => Command::ToggleDropdown,
        KeyCode::F(3) => Command::ReloadIdentifiers,
        KeyCode::Backspace => {
            let mut text = session.selection().text().to_owned();
            if text.pop().is_none() {
                return;
            }
            Command::TypeText(text)
        }
        _ => match plain_char(key) {
            Some(c) => {
                let mut text = session.selection().text().to_owned();
                text.push(c);
                Command::TypeText(text)
            }
            None => return,
        },
    };
    run_command(session, runtime, view_data, internal_tx, command);
}

/// Wakes early when a session timer is due sooner than the next poll.
fn poll_timeout(session: &Session) -> Duration {
    session
        .scheduler()
        .next_deadline()
        .map_or(POLL_INTERVAL, |deadline| {
            deadline.saturating_sub(session.now()).min(POLL_INTERVAL)
        })
}

fn handle_mouse_event<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
    area: Rect,
) {
    let MouseEventKind::Down(_) = mouse.kind else {
        return;
    };
    if let Some(candidate) = dropdown_candidate_at(session, area, mouse.column, mouse.row) {
        run_command(session, runtime, view_data, internal_tx, Command::Choose(candidate));
        return;
    }
    session.dispatch(Command::PointerDown(Point::new(mouse.column, mouse.row)));
}

fn dropdown_candidate_at(session: &Session, area: Rect, column: u16, row: u16) -> Option<String> {
    let selection = session.selection();
    if !selection.is_open() {
        return None;
    }
    let list = dropdown_area(screen_layout(area).selector, selection.candidates().len(), area);
    let inner = Block::default().borders(Borders::ALL).inner(list);
    if !inner.contains(Position::new(column, row)) {
        return None;
    }
    selection
        .candidates()
        .get(usize::from(row - inner.y))
        .cloned()
}

fn screen_layout(area: Rect) -> ScreenAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(area);
    ScreenAreas {
        header: rows[0],
        selector: rows[1],
        progress: rows[2],
        banner: rows[3],
        form: rows[4],
        status: rows[5],
    }
}

fn dropdown_area(selector: Rect, candidates: usize, frame: Rect) -> Rect {
    let wanted = u16::try_from(candidates.max(1))
        .unwrap_or(u16::MAX)
        .min(DROPDOWN_MAX_ROWS)
        + 2;
    let top = selector.y.saturating_add(selector.height);
    let available = frame.y.saturating_add(frame.height).saturating_sub(top);
    Rect::new(selector.x, top, selector.width, wanted.min(available))
}

/// The pointer region of the identifier control: the input plus the
/// dropdown while it is open.
fn selector_region(session: &Session, area: Rect) -> Region {
    let selector = screen_layout(area).selector;
    let height = if session.selection().is_open() {
        selector.height + dropdown_area(selector, session.selection().candidates().len(), area).height
    } else {
        selector.height
    };
    Region::new(selector.x, selector.y, selector.width, height)
}

fn render(frame: &mut ratatui::Frame<'_>, session: &Session, view_data: &ViewData) {
    let palette = Palette::for_theme(view_data.theme);
    let full = frame.area();
    frame.render_widget(Block::default().style(palette.base()), full);
    let areas = screen_layout(full);

    let header = Paragraph::new(header_text(session, view_data)).block(
        Block::default()
            .title("formfill")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent)),
    );
    frame.render_widget(header, areas.header);

    let selector = Paragraph::new(format!("{}▏", session.selection().text())).block(
        Block::default()
            .title("identifier (F2 list, F3 reload)")
            .borders(Borders::ALL),
    );
    frame.render_widget(selector, areas.selector);

    if session.fetcher().is_loading() {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(palette.accent).bg(palette.background))
            .percent(u16::from(session.fetcher().progress().min(100)));
        frame.render_widget(gauge, areas.progress);
    }

    if let Some(banner) = session.banner() {
        let banner = Paragraph::new(format!("{banner} (esc to dismiss)"))
            .style(Style::default().fg(palette.error).add_modifier(Modifier::BOLD));
        frame.render_widget(banner, areas.banner);
    }

    let form = Paragraph::new(form_lines(session, view_data, palette))
        .wrap(Wrap { trim: false })
        .block(Block::default().title(form_title(session)).borders(Borders::ALL));
    frame.render_widget(form, areas.form);

    let status = Paragraph::new(status_text(session, view_data))
        .style(Style::default().fg(palette.muted))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, areas.status);

    if session.selection().is_open() {
        let area = dropdown_area(
            areas.selector,
            session.selection().candidates().len(),
            full,
        );
        frame.render_widget(Clear, area);
        frame.render_widget(
            dropdown_list(session, palette).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    if session.analytics().is_open() {
        let area = centered_rect(80, 70, full);
        frame.render_widget(Clear, area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);
        let panel = session.analytics();
        let tabs = Tabs::new(AnalyticsTab::ALL.iter().map(|tab| tab.label()).collect::<Vec<_>>())
            .block(Block::default().title("analytics").borders(Borders::ALL))
            .style(palette.base())
            .highlight_style(
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .select(panel.active_tab().index());
        frame.render_widget(tabs, rows[0]);
        let body = Paragraph::new(render_analytics_text(panel))
            .style(palette.base())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(body, rows[1]);
    }
}

fn header_text(session: &Session, view_data: &ViewData) -> String {
    let record = session.record();
    let showing = if record.uuid.is_empty() {
        "no record selected".to_owned()
    } else {
        format!("record {}", record.uuid)
    };
    format!(
        "{showing} | theme {} (F6) | analytics (F5)",
        view_data.theme.label()
    )
}

fn form_title(session: &Session) -> String {
    if is_editing(session) {
        "record (editing)".to_owned()
    } else {
        "record".to_owned()
    }
}

fn form_lines(session: &Session, view_data: &ViewData, palette: Palette) -> Vec<Line<'static>> {
    let editing = is_editing(session);
    let focused = focused_field(view_data);
    let record = session.record();
    RecordField::ALL
        .iter()
        .map(|field| {
            let label_style = if editing && *field == focused {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.muted)
            };
            let value_style = if editing {
                Style::default().fg(palette.text)
            } else {
                Style::default().fg(palette.muted)
            };
            let marker = if editing && *field == focused { ">" } else { " " };
            let value = record.field(*field).replace('\n', " / ");
            Line::from(vec![
                Span::styled(format!("{marker} {:<9}", field.label()), label_style),
                Span::styled(value, value_style),
            ])
        })
        .collect()
}

fn dropdown_list(session: &Session, palette: Palette) -> List<'static> {
    let selection = session.selection();
    if selection.candidates().is_empty() {
        let message = selection
            .load_error()
            .map_or_else(|| "No identifiers available".to_owned(), str::to_owned);
        return List::new(vec![ListItem::new(message)])
            .style(Style::default().fg(palette.muted).bg(palette.background));
    }
    let items = selection
        .candidates()
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let style = if selection.highlighted() == Some(index) {
                Style::default()
                    .fg(palette.background)
                    .bg(palette.accent)
            } else {
                palette.base()
            };
            ListItem::new(candidate.clone()).style(style)
        })
        .collect::<Vec<_>>();
    List::new(items).style(palette.base())
}

fn status_text(session: &Session, view_data: &ViewData) -> String {
    let status = session.save_status().label().to_uppercase();
    let hints = if is_editing(session) {
        "tab/shift+tab field | ctrl+s save | esc cancel | ctrl+c quit"
    } else {
        "type id | up/down enter | ctrl+e edit | f5 analytics | f6 theme | ctrl+c quit"
    };
    let mut parts = vec![status];
    if session.edit().is_dirty() {
        parts.push("unsaved changes".to_owned());
    }
    if session.edit().autosave_pending() {
        parts.push("autosave pending".to_owned());
    }
    if let Some(saved_at) = view_data.last_saved_at
        && let Ok(formatted) = saved_at.format(format_description!("[hour]:[minute]:[second]"))
    {
        parts.push(format!("last saved {formatted}"));
    }
    if let Some(status_line) = &view_data.status_line {
        parts.push(status_line.clone());
    }
    parts.push(hints.to_owned());
    parts.join(" | ")
}

fn render_analytics_text(panel: &AnalyticsPanel) -> String {
    let tab = panel.active_tab();
    let state = panel.active();
    if state.loading {
        return format!("loading {}...", tab.label());
    }
    if let Some(error) = &state.error {
        return error.clone();
    }
    match &state.payload {
        Some(AnalyticsPayload::Overview(stats)) => render_overview(stats),
        Some(AnalyticsPayload::Duplicates(report)) => render_duplicates(report),
        Some(AnalyticsPayload::Stale(report)) => render_stale(report),
        Some(AnalyticsPayload::Usage(stats)) => render_usage(stats),
        None => "no data".to_owned(),
    }
}

fn render_overview(stats: &DatabaseStats) -> String {
    format!(
        "total records   {}\nactive records  {}\nduplicates      {}\nstale           {}",
        stats.total_records, stats.active_records, stats.duplicate_count, stats.stale_count
    )
}

fn render_duplicates(report: &DuplicateReport) -> String {
    if report.duplicates.is_empty() {
        return "no duplicates found".to_owned();
    }
    report
        .duplicates
        .iter()
        .map(|pair| {
            format!(
                "{} ~ {}  {:>3.0}%  {}  {}",
                pair.uuid1,
                pair.uuid2,
                pair.confidence * 100.0,
                pair.kind,
                pair.reason
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_stale(report: &StaleReport) -> String {
    let Some(analysis) = &report.analysis else {
        return "no stale-record analysis available".to_owned();
    };
    let mut lines = Vec::new();
    if !analysis.summary.is_empty() {
        lines.push(analysis.summary.clone());
    }
    for (title, records) in [
        ("stale", &analysis.stale_records),
        ("important but inactive", &analysis.important_but_inactive),
    ] {
        if records.is_empty() {
            continue;
        }
        lines.push(format!("{title}:"));
        for record in records {
            let name = record.name.as_deref().unwrap_or("");
            lines.push(format!("  {} {name} {}", record.uuid, record.reason));
        }
    }
    if !analysis.recommendations.is_empty() {
        lines.push("recommendations:".to_owned());
        lines.extend(analysis.recommendations.iter().map(|tip| format!("  - {tip}")));
    }
    if lines.is_empty() {
        return "nothing stale".to_owned();
    }
    lines.join("\n")
}

fn render_usage(stats: &UsageStats) -> String {
    let insights = &stats.intelligent_analysis;
    let mut lines = vec![format!(
        "interactions {} | corrections {} | views {}",
        stats.total_interactions, stats.total_corrections, stats.total_views
    )];
    if !insights.summary.is_empty() {
        lines.push(insights.summary.clone());
    }
    if !insights.preferred_fields.is_empty() {
        lines.push(format!(
            "preferred fields: {}",
            insights.preferred_fields.join(", ")
        ));
    }
    for pattern in &insights.correction_patterns {
        lines.push(format!("correction: {} ({})", pattern.pattern, pattern.insight));
    }
    for tip in &insights.time_saving_tips {
        lines.push(format!("tip: {tip}"));
    }
    for (field, value) in &insights.predicted_defaults {
        lines.push(format!("default {field} = {value}"));
    }
    lines.join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
