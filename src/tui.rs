use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use crate::app::{App, ProgressEvent, ProgressSink};
use crate::catalog::{Catalog, CatalogClient};
use crate::detail::DatasetDetail;
use crate::domain::{DatasetId, Structure, TaskCategory};
use crate::error::CatalogError;
use crate::filter::{FilterOptions, Selection, apply_filters};
use crate::table::{BadgeKind, DisplayRow, NO_LINKS, NO_RESULTS, TableView, render_rows};

const EVENTS_MAX: usize = 6;
const PAGE: isize = 10;
const LIST_HINT: &str = "↑/↓ move  Enter open  o/s/y organ/staining/year  c/t cell/tissue  \
1-5 task  / name  r reset  q quit";
const DETAIL_HINT: &str = "↑/↓ scroll  PgUp/PgDn page  Esc back";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Browse,
    Search,
}

enum Action {
    None,
    Open(String),
    Quit,
}

enum Pending {
    Catalog(Receiver<Result<Catalog, CatalogError>>),
    Detail(Receiver<Result<DatasetDetail, CatalogError>>),
}

/// Filter state of the browser over one loaded catalog. Every change runs the
/// filter and the table renderer again; the cursor follows the selected
/// dataset when it survives the new filter.
pub struct BrowserState {
    catalog: Catalog,
    options: FilterOptions,
    selection: Selection,
    view: TableView,
    cursor: usize,
}

impl BrowserState {
    pub fn new(catalog: Catalog) -> Self {
        let options = FilterOptions::from_datasets(catalog.datasets());
        let mut state = Self {
            catalog,
            options,
            selection: Selection::default(),
            view: TableView::NoResults,
            cursor: 0,
        };
        state.refresh();
        state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn total(&self) -> usize {
        self.catalog.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&DisplayRow> {
        self.view.rows().get(self.cursor)
    }

    pub fn cycle_organ(&mut self) {
        self.selection.organ = cycle(self.selection.organ.as_deref(), &self.options.organs);
        self.refresh();
    }

    pub fn cycle_staining(&mut self) {
        self.selection.staining =
            cycle(self.selection.staining.as_deref(), &self.options.staining);
        self.refresh();
    }

    pub fn cycle_year(&mut self) {
        self.selection.year = cycle(self.selection.year.as_deref(), &self.options.years);
        self.refresh();
    }

    pub fn toggle_structure(&mut self, structure: Structure) {
        if !self.selection.structure.remove(&structure) {
            self.selection.structure.insert(structure);
        }
        self.refresh();
    }

    pub fn toggle_task(&mut self, task: TaskCategory) {
        if !self.selection.tasks.remove(&task) {
            self.selection.tasks.insert(task);
        }
        self.refresh();
    }

    pub fn push_query(&mut self, ch: char) {
        self.selection
            .name_query
            .get_or_insert_with(String::new)
            .push(ch);
        self.refresh();
    }

    pub fn pop_query(&mut self) {
        if let Some(query) = self.selection.name_query.as_mut() {
            query.pop();
            if query.is_empty() {
                self.selection.name_query = None;
            }
        }
        self.refresh();
    }

    pub fn reset(&mut self) {
        self.selection = Selection::default();
        self.refresh();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.view.rows().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    fn refresh(&mut self) {
        let selected = self.selected().map(|row| row.id.clone());
        self.view = render_rows(&apply_filters(self.catalog.datasets(), &self.selection));
        let position = selected.and_then(|id| self.view.rows().iter().position(|row| row.id == id));
        self.cursor = position.unwrap_or(0);
    }
}

/// Next value after `current` in `values`; wraps back to no selection.
fn cycle(current: Option<&str>, values: &[String]) -> Option<String> {
    let next = match current {
        None => values.first(),
        Some(current) => values
            .iter()
            .position(|value| value == current)
            .and_then(|index| values.get(index + 1)),
    };
    next.cloned()
}

#[derive(Debug, Clone, Default)]
struct ProgressState {
    phase: String,
    status: String,
    events: VecDeque<String>,
    busy: bool,
}

struct TuiProgress {
    state: Arc<Mutex<ProgressState>>,
}

impl ProgressSink for TuiProgress {
    fn event(&self, event: ProgressEvent) {
        if let Ok(mut state) = self.state.lock() {
            let message = event.message.trim().to_string();
            if let Some((phase, payload)) = parse_phase(&message) {
                state.phase = phase.to_string();
                state.status = payload.to_string();
            } else {
                state.status = message.clone();
            }
            let line = match event.elapsed {
                Some(elapsed) => format!("[{}] {message} ({} ms)", timestamp(), elapsed.as_millis()),
                None => format!("[{}] {message}", timestamp()),
            };
            push_event(&mut state.events, line);
        }
    }
}

pub struct Tui {
    progress: Arc<Mutex<ProgressState>>,
    screen: Screen,
    input_mode: InputMode,
    detail: Option<DatasetDetail>,
    detail_scroll: u16,
    table_state: TableState,
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

impl Tui {
    pub fn new() -> Self {
        Self {
            progress: Arc::new(Mutex::new(ProgressState {
                status: "ready".to_string(),
                ..ProgressState::default()
            })),
            screen: Screen::List,
            input_mode: InputMode::Browse,
            detail: None,
            detail_scroll: 0,
            table_state: TableState::default(),
        }
    }

    /// Loads the catalog in the background and runs the browser until the
    /// user quits. Failing to load the catalog ends the session with that
    /// error; a failed detail lookup only shows up in the status line.
    pub fn browse<C: CatalogClient + 'static>(&mut self, app: App<C>) -> miette::Result<()> {
        let app = Arc::new(app);

        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let result = self.event_loop(&mut terminal, &app);

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        result
    }

    fn event_loop<C: CatalogClient + 'static>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        app: &Arc<App<C>>,
    ) -> miette::Result<()> {
        let mut pending = Some(self.spawn_catalog(app));
        let mut browser: Option<BrowserState> = None;
        let mut tick = 0usize;

        loop {
            if let Some(job) = pending.take() {
                pending = match job {
                    Pending::Catalog(rx) => match rx.try_recv() {
                        Ok(result) => {
                            self.set_busy(false);
                            browser = Some(BrowserState::new(result?));
                            None
                        }
                        Err(TryRecvError::Empty) => Some(Pending::Catalog(rx)),
                        Err(TryRecvError::Disconnected) => {
                            return Err(miette::Report::msg("catalog loader stopped"));
                        }
                    },
                    Pending::Detail(rx) => match rx.try_recv() {
                        Ok(Ok(detail)) => {
                            self.set_busy(false);
                            self.detail = Some(detail);
                            self.detail_scroll = 0;
                            self.screen = Screen::Detail;
                            None
                        }
                        Ok(Err(err)) => {
                            self.set_busy(false);
                            self.set_status(format!("error: {err}"));
                            None
                        }
                        Err(TryRecvError::Empty) => Some(Pending::Detail(rx)),
                        Err(TryRecvError::Disconnected) => {
                            self.set_busy(false);
                            self.set_status("detail loader stopped".to_string());
                            None
                        }
                    },
                };
            }

            let progress = self
                .progress
                .lock()
                .map(|state| state.clone())
                .unwrap_or_default();
            terminal
                .draw(|frame| draw_ui(frame, self, browser.as_ref(), &progress, tick))
                .into_diagnostic()?;

            if event::poll(Duration::from_millis(120)).into_diagnostic()?
                && let Event::Key(key) = event::read().into_diagnostic()?
                && key.kind == KeyEventKind::Press
            {
                match self.handle_key(key, browser.as_mut()) {
                    Action::Quit => break,
                    Action::Open(id) if pending.is_none() => {
                        pending = Some(self.spawn_detail(app, id));
                    }
                    Action::Open(_) | Action::None => {}
                }
            }

            tick = tick.wrapping_add(1);
        }
        Ok(())
    }

    fn spawn_catalog<C: CatalogClient + 'static>(&self, app: &Arc<App<C>>) -> Pending {
        let (tx, rx) = mpsc::channel();
        let worker = Arc::clone(app);
        let sink = TuiProgress {
            state: self.progress.clone(),
        };
        self.set_busy(true);
        thread::spawn(move || tx.send(worker.catalog(&sink)));
        Pending::Catalog(rx)
    }

    fn spawn_detail<C: CatalogClient + 'static>(&self, app: &Arc<App<C>>, id: String) -> Pending {
        let (tx, rx) = mpsc::channel();
        let worker = Arc::clone(app);
        let sink = TuiProgress {
            state: self.progress.clone(),
        };
        self.set_busy(true);
        thread::spawn(move || {
            let result =
                DatasetId::from_catalog(&id).and_then(|id| worker.detail(&id, &sink));
            tx.send(result)
        });
        Pending::Detail(rx)
    }

    fn handle_key(&mut self, key: KeyEvent, browser: Option<&mut BrowserState>) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        let Some(browser) = browser else {
            return match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                _ => Action::None,
            };
        };

        if self.screen == Screen::Detail {
            match key.code {
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => {
                    self.screen = Screen::List;
                }
                KeyCode::Up | KeyCode::Char('k') => self.scroll_detail(-1),
                KeyCode::Down | KeyCode::Char('j') => self.scroll_detail(1),
                KeyCode::PageUp => self.scroll_detail(-(PAGE as i32)),
                KeyCode::PageDown => self.scroll_detail(PAGE as i32),
                _ => {}
            }
            return Action::None;
        }

        if self.input_mode == InputMode::Search {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Browse,
                KeyCode::Backspace => browser.pop_query(),
                KeyCode::Char(ch) => browser.push_query(ch),
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Enter => {
                return match browser.selected() {
                    Some(row) => Action::Open(row.id.clone()),
                    None => Action::None,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => browser.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => browser.move_cursor(1),
            KeyCode::PageUp => browser.move_cursor(-PAGE),
            KeyCode::PageDown => browser.move_cursor(PAGE),
            KeyCode::Home => browser.move_cursor(isize::MIN / 2),
            KeyCode::End => browser.move_cursor(isize::MAX / 2),
            KeyCode::Char('o') => browser.cycle_organ(),
            KeyCode::Char('s') => browser.cycle_staining(),
            KeyCode::Char('y') => browser.cycle_year(),
            KeyCode::Char('c') => browser.toggle_structure(Structure::Cell),
            KeyCode::Char('t') => browser.toggle_structure(Structure::Tissue),
            KeyCode::Char(ch @ '1'..='5') => {
                let index = ch as usize - '1' as usize;
                browser.toggle_task(TaskCategory::ALL[index]);
            }
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('r') => browser.reset(),
            _ => {}
        }
        Action::None
    }

    fn scroll_detail(&mut self, delta: i32) {
        let next = (self.detail_scroll as i32 + delta).clamp(0, u16::MAX as i32);
        self.detail_scroll = next as u16;
    }

    fn set_busy(&self, busy: bool) {
        if let Ok(mut state) = self.progress.lock() {
            state.busy = busy;
        }
    }

    fn set_status(&self, status: String) {
        if let Ok(mut state) = self.progress.lock() {
            push_event(&mut state.events, format!("[{}] {status}", timestamp()));
            state.status = status;
        }
    }
}

fn draw_ui(
    frame: &mut ratatui::Frame,
    tui: &mut Tui,
    browser: Option<&BrowserState>,
    progress: &ProgressState,
    tick: usize,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(draw_header(browser, progress, tick), chunks[0]);

    match (browser, tui.screen, tui.detail.as_ref()) {
        (None, _, _) => frame.render_widget(draw_loading(progress), chunks[1]),
        (Some(_), Screen::Detail, Some(detail)) => {
            frame.render_widget(draw_detail(detail, tui.detail_scroll), chunks[1]);
        }
        (Some(browser), _, _) => {
            let selected = (!browser.view().rows().is_empty()).then_some(browser.cursor());
            tui.table_state.select(selected);
            frame.render_stateful_widget(draw_table(browser), chunks[1], &mut tui.table_state);
        }
    }

    frame.render_widget(
        draw_footer(tui.screen, tui.input_mode, browser, progress),
        chunks[2],
    );
}

fn draw_header(
    browser: Option<&BrowserState>,
    progress: &ProgressState,
    tick: usize,
) -> Paragraph<'static> {
    let hb = if progress.busy && tick % 2 == 0 { "*" } else { " " };
    let count = browser
        .map(|browser| format!("{} / {} datasets", browser.view().rows().len(), browser.total()))
        .unwrap_or_else(|| "loading".to_string());
    let header_line = Line::from(vec![
        Span::styled(
            "PATHDS",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(env!("CARGO_PKG_VERSION"), Style::default().fg(Color::Gray)),
        Span::raw("   "),
        Span::styled(count, Style::default().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(hb, Style::default().fg(Color::Green)),
    ]);

    let filter_line = match browser {
        Some(browser) => {
            let selection = browser.selection();
            let mut spans = Vec::new();
            for (label, value) in [
                ("Organ", or_all(selection.organ.as_deref())),
                ("Staining", or_all(selection.staining.as_deref())),
                ("Structure", selection.structure_summary()),
                ("Task", selection.task_summary()),
                ("Year", or_all(selection.year.as_deref())),
            ] {
                spans.push(Span::styled(
                    format!("{label}: "),
                    Style::default().fg(Color::Gray),
                ));
                spans.push(Span::raw(format!("{value}   ")));
            }
            if let Some(query) = &selection.name_query {
                spans.push(Span::styled("Name: ", Style::default().fg(Color::Gray)));
                spans.push(Span::raw(format!("\"{query}\"")));
            }
            Line::from(spans)
        }
        None => Line::from(Span::styled(
            "Filters become available once the catalog is loaded",
            Style::default().fg(Color::Gray),
        )),
    };

    Paragraph::new(vec![header_line, filter_line])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::BOTTOM))
}

fn draw_table(browser: &BrowserState) -> Table<'static> {
    let header = Row::new(vec![
        "Dataset",
        "Organ",
        "Structure",
        "Task",
        "Staining",
        "Links",
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row<'static>> = match browser.view() {
        TableView::NoResults => vec![Row::new(vec![Cell::from(Span::styled(
            NO_RESULTS,
            Style::default().fg(Color::Gray),
        ))])],
        TableView::Rows(rows) => rows.iter().map(table_row).collect(),
    };

    Table::new(
        rows,
        [
            Constraint::Percentage(34),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(18),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ")
}

fn table_row(row: &DisplayRow) -> Row<'static> {
    let name = match &row.year {
        Some(year) => format!("{} ({year})", row.name),
        None => row.name.clone(),
    };
    let links = if row.links.is_empty() {
        Cell::from(Span::styled(NO_LINKS, Style::default().fg(Color::Gray)))
    } else {
        let titles: Vec<&str> = row.links.iter().map(|link| link.kind.title()).collect();
        Cell::from(titles.join(", "))
    };
    Row::new(vec![
        Cell::from(name),
        Cell::from(badge_text(row, BadgeKind::Organ)),
        Cell::from(badge_text(row, BadgeKind::Structure)),
        Cell::from(badge_text(row, BadgeKind::Task)),
        Cell::from(badge_text(row, BadgeKind::Staining)),
        links,
    ])
}

fn badge_text(row: &DisplayRow, kind: BadgeKind) -> String {
    row.badges
        .iter()
        .find(|badge| badge.kind == kind)
        .map(|badge| badge.text.clone())
        .unwrap_or_default()
}

fn draw_detail(detail: &DatasetDetail, scroll: u16) -> Paragraph<'static> {
    let dataset = &detail.dataset;
    let title = match &dataset.year {
        Some(year) => format!("{} ({year})", dataset.name),
        None => dataset.name.clone(),
    };
    let mut lines = vec![
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if detail.basic_info.is_empty() {
        lines.push(Line::from(Span::styled(
            "No basic information",
            Style::default().fg(Color::Gray),
        )));
    }
    for item in &detail.basic_info {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", item.label), Style::default().fg(Color::Gray)),
            Span::raw(item.value.clone()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "DETAILS",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    match &detail.body {
        Some(body) => lines.extend(body.lines().map(|line| Line::from(line.to_string()))),
        None => lines.push(Line::from(Span::styled(
            "No detailed description",
            Style::default().fg(Color::Gray),
        ))),
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
}

fn draw_loading(progress: &ProgressState) -> Paragraph<'static> {
    let mut lines = vec![
        Line::from(Span::styled(
            "LOADING CATALOG",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(progress.status.clone()),
        Line::from(""),
    ];
    for event in &progress.events {
        lines.push(Line::from(Span::styled(
            event.clone(),
            Style::default().fg(Color::Gray),
        )));
    }
    Paragraph::new(lines).wrap(Wrap { trim: true })
}

fn draw_footer(
    screen: Screen,
    input_mode: InputMode,
    browser: Option<&BrowserState>,
    progress: &ProgressState,
) -> Paragraph<'static> {
    let first = match (screen, input_mode) {
        (Screen::List, InputMode::Search) => {
            let query = browser
                .and_then(|browser| browser.selection().name_query.clone())
                .unwrap_or_default();
            Line::from(vec![
                Span::styled("Name: ", Style::default().fg(Color::Cyan)),
                Span::raw(format!("{query}_")),
            ])
        }
        (Screen::List, InputMode::Browse) => {
            Line::from(Span::styled(LIST_HINT, Style::default().fg(Color::Gray)))
        }
        (Screen::Detail, _) => {
            Line::from(Span::styled(DETAIL_HINT, Style::default().fg(Color::Gray)))
        }
    };
    let phase_color = if progress.busy {
        Color::Yellow
    } else {
        Color::Green
    };
    let status = Line::from(vec![
        Span::styled(
            format!("{:<9}", phase_label(&progress.phase)),
            Style::default().fg(phase_color),
        ),
        Span::raw(progress.status.clone()),
    ]);
    Paragraph::new(vec![first, status]).block(Block::default().borders(Borders::TOP))
}

fn phase_label(phase: &str) -> &str {
    if phase.is_empty() { "Ready" } else { phase }
}

fn or_all(value: Option<&str>) -> String {
    value.unwrap_or("All").to_string()
}

fn parse_phase(message: &str) -> Option<(&str, &str)> {
    let rest = message.strip_prefix("phase=")?;
    let (phase, payload) = rest.split_once(';')?;
    Some((phase, payload.trim()))
}

fn push_event(buffer: &mut VecDeque<String>, item: String) {
    buffer.push_back(item);
    while buffer.len() > EVENTS_MAX {
        buffer.pop_front();
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DatasetRecord, RawTask};
    use crate::normalize::decorate;

    fn dataset(id: &str, name: &str, organs: &str, task: &str) -> crate::domain::Dataset {
        decorate(DatasetRecord {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            organs: Some(organs.to_string()),
            task: Some(RawTask::One(task.to_string())),
            ..DatasetRecord::default()
        })
        .unwrap()
    }

    fn browser() -> BrowserState {
        BrowserState::new(Catalog::new(vec![
            dataset("a", "Alpha", "Breast", "segmentation"),
            dataset("b", "Beta", "Lung", "classification"),
            dataset("c", "Gamma", "Breast", "detection + classification"),
        ]))
    }

    fn ids(state: &BrowserState) -> Vec<&str> {
        state.view().rows().iter().map(|row| row.id.as_str()).collect()
    }

    #[test]
    fn cycling_walks_options_then_clears() {
        let mut state = browser();
        state.cycle_organ();
        assert_eq!(state.selection().organ.as_deref(), Some("Breast"));
        assert_eq!(ids(&state), vec!["a", "c"]);
        state.cycle_organ();
        assert_eq!(state.selection().organ.as_deref(), Some("Lung"));
        state.cycle_organ();
        assert_eq!(state.selection().organ, None);
        assert_eq!(state.view().rows().len(), 3);
    }

    #[test]
    fn toggling_tasks_narrows_and_restores() {
        let mut state = browser();
        state.toggle_task(TaskCategory::Classification);
        assert_eq!(ids(&state), vec!["b", "c"]);
        state.toggle_task(TaskCategory::Detection);
        assert_eq!(ids(&state), vec!["c"]);
        state.toggle_task(TaskCategory::Detection);
        state.toggle_task(TaskCategory::Classification);
        assert_eq!(ids(&state), vec!["a", "b", "c"]);
    }

    #[test]
    fn cursor_follows_selected_row() {
        let mut state = browser();
        state.move_cursor(2);
        assert_eq!(state.selected().map(|row| row.id.as_str()), Some("c"));
        state.cycle_organ();
        assert_eq!(state.selected().map(|row| row.id.as_str()), Some("c"));
        state.move_cursor(-10);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn name_query_edits_and_reset() {
        let mut state = browser();
        state.push_query('g');
        state.push_query('a');
        assert_eq!(ids(&state), vec!["c"]);
        state.pop_query();
        state.pop_query();
        assert_eq!(state.selection().name_query, None);
        state.push_query('z');
        assert!(matches!(state.view(), TableView::NoResults));
        assert!(state.selected().is_none());
        state.reset();
        assert_eq!(state.selection(), &Selection::default());
        assert_eq!(state.view().rows().len(), 3);
    }

    #[test]
    fn phase_messages_are_split() {
        assert_eq!(
            parse_phase("phase=Fetch; loading x"),
            Some(("Fetch", "loading x"))
        );
        assert_eq!(parse_phase("plain"), None);
    }
}
