use crate::dates::{date_range, format_date_key, is_same_day, is_weekend, parse_date_key};
use crate::geometry::{bar_rect, month_segments, today_offset, BarRect};
use crate::model::{generate_id, Plan, Task, TaskPatch, ViewWindow, DEFAULT_COLOR};
use crate::notice;
use crate::storage::{save_plan, save_view, StoreLocation, StoreScope};
use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, NaiveDate, Weekday};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

/// Terminal columns per calendar day in the chart pane.
const CELL_W: i64 = 4;
/// Width of the fixed task-name pane.
const NAME_W: u16 = 30;
/// Cells kept between a freshly created bar and the pane's left edge.
const SCROLL_MARGIN_CELLS: i64 = 2;

pub fn run(plan: Plan, view: ViewWindow, location: StoreLocation) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(plan, view, location);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    plan: Plan,
    view: ViewWindow,
    location: StoreLocation,
    selected: usize,
    row_offset: usize,
    scroll_day: i64,
    last_save: Instant,
    status: String,
    mode: Mode,
    unread_notices: bool,
}

enum Mode {
    Normal,
    Creating(TaskForm),
    Editing { task_id: String, form: TaskForm },
    ConfirmDelete { task_id: String },
}

struct TaskForm {
    name: FieldValue,
    start: FieldValue,
    end: FieldValue,
    progress: FieldValue,
    color: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Name,
    Start,
    End,
    Progress,
    Color,
}

enum FormAction {
    Create,
    Edit(String),
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(plan: Plan, view: ViewWindow, location: StoreLocation) -> Self {
        let status = format!("Loaded plan from {}", location.dir.display());
        let unread_notices = notice::unread_notices(&location);
        App {
            plan,
            view,
            location,
            selected: 0,
            row_offset: 0,
            scroll_day: 0,
            last_save: Instant::now(),
            status,
            mode: Mode::Normal,
            unread_notices,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Creating(_) | Mode::Editing { .. } => self.handle_form_key(key),
            Mode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.plan.tasks.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('K') => self.move_selected(-1)?,
            KeyCode::Char('J') => self.move_selected(1)?,
            KeyCode::Left | KeyCode::Char('h') => self.shift_window(-1)?,
            KeyCode::Right | KeyCode::Char('l') => self.shift_window(1)?,
            KeyCode::Char('H') => self.shift_window(-7)?,
            KeyCode::Char('L') => self.shift_window(7)?,
            KeyCode::Char('[') => self.scroll_day = (self.scroll_day - 1).max(0),
            KeyCode::Char(']') => self.scroll_day += 1,
            KeyCode::Char('t') => {
                self.view.center_on_today();
                self.persist_view("Centered on today")?;
            }
            KeyCode::Char('v') => {
                self.view.cycle_days();
                self.persist_view(format!("Showing {} days", self.view.days))?;
            }
            KeyCode::Char('s') => {
                let link = self.view.share_link(crate::commands::APP_URL);
                self.status = format!("Share link: {}", link);
            }
            KeyCode::Char('o') => {
                notice::mark_notices_read(&self.location)?;
                self.unread_notices = false;
                self.status = format!("Notices: {}", notice::NOTICE_URL);
            }
            KeyCode::Char('n') => {
                self.mode = Mode::Creating(TaskForm::new());
                self.status = "Creating task (Tab moves, Enter saves, Esc cancels)".into();
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.current_task() {
                    let task_id = task.id.clone();
                    let form = TaskForm::from_task(task);
                    self.mode = Mode::Editing { task_id, form };
                } else {
                    self.status = "No task selected to edit".into();
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.current_task() {
                    self.mode = Mode::ConfirmDelete {
                        task_id: task.id.clone(),
                    };
                } else {
                    self.status = "No task selected to delete".into();
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut close_form = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match &mut mode {
            Mode::Creating(form) => {
                close_form = self.process_form_key(FormAction::Create, form, key)?;
            }
            Mode::Editing { task_id, form } => {
                let id = task_id.clone();
                close_form = self.process_form_key(FormAction::Edit(id), form, key)?;
            }
            Mode::ConfirmDelete { .. } | Mode::Normal => {}
        }
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let task_id = match &self.mode {
            Mode::ConfirmDelete { task_id } => task_id.clone(),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.plan.remove(&task_id);
                self.selected = self
                    .selected
                    .min(self.plan.tasks.len().saturating_sub(1));
                self.persist(format!("Deleted {}", task_id))?;
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        Ok(false)
    }

    fn process_form_key(
        &mut self,
        action: FormAction,
        form: &mut TaskForm,
        key: KeyEvent,
    ) -> Result<bool> {
        let mut close_form = false;
        match key.code {
            KeyCode::Esc => {
                close_form = true;
                self.status = "Canceled".into();
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.active_field_mut().move_left(),
            KeyCode::Right => form.active_field_mut().move_right(),
            KeyCode::Enter => close_form = self.try_submit(action, form)?,
            KeyCode::Backspace => form.active_field_mut().backspace(),
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    form.active_field_mut().insert_char(c);
                }
            }
            _ => {}
        }
        Ok(close_form)
    }

    fn try_submit(&mut self, action: FormAction, form: &mut TaskForm) -> Result<bool> {
        let outcome = match action {
            FormAction::Create => self.create_task_from_form(form),
            FormAction::Edit(task_id) => self.edit_task_from_form(&task_id, form),
        };
        match outcome {
            Ok(()) => Ok(true),
            Err(err) => {
                self.status = format!("Could not save: {}", err);
                Ok(false)
            }
        }
    }

    fn create_task_from_form(&mut self, form: &TaskForm) -> Result<()> {
        let id = generate_id();
        let name = if form.name.value.trim().is_empty() {
            format!("New task {}", self.plan.tasks.len() + 1)
        } else {
            form.name.value.trim().to_string()
        };
        self.plan.add(Task::with_defaults(id.clone(), name));
        let patch = form.to_patch()?;
        self.plan.update(&id, &patch);
        self.selected = self.plan.tasks.len().saturating_sub(1);
        self.ensure_bar_visible(&id);
        self.persist(format!("Created {}", id))?;
        Ok(())
    }

    fn edit_task_from_form(&mut self, task_id: &str, form: &TaskForm) -> Result<()> {
        let patch = form.to_patch()?;
        self.plan.update(task_id, &patch);
        self.persist(format!("Updated {}", task_id))?;
        Ok(())
    }

    /// Scrolls the chart pane so the task's bar sits a small margin from
    /// the left edge, mirroring the scroll-into-view after creation.
    fn ensure_bar_visible(&mut self, task_id: &str) {
        let Some(task) = self.plan.get(task_id) else {
            return;
        };
        let Some(rect) = self.task_rect(task) else {
            return;
        };
        self.scroll_day = (rect.left / CELL_W - SCROLL_MARGIN_CELLS).max(0);
    }

    fn task_rect(&self, task: &Task) -> Option<BarRect> {
        bar_rect(
            task.start,
            task.end,
            self.view.start,
            self.view.days as i64,
            CELL_W,
        )
    }

    fn shift_window(&mut self, delta: i64) -> Result<()> {
        self.view.shift(delta);
        self.persist_view(format!(
            "Window {} +{}d",
            format_date_key(self.view.start),
            self.view.days
        ))
    }

    fn move_selected(&mut self, delta: isize) -> Result<()> {
        let Some(task) = self.current_task() else {
            self.status = "No task selected to move".into();
            return Ok(());
        };
        let id = task.id.clone();
        let before = self.plan.index_of(&id);
        self.plan.move_task(&id, delta);
        if self.plan.index_of(&id) == before {
            return Ok(());
        }
        self.selected = self.plan.index_of(&id).unwrap_or(self.selected);
        self.persist(format!("Moved {}", id))?;
        Ok(())
    }

    fn current_task(&self) -> Option<&Task> {
        self.plan.tasks.get(self.selected)
    }

    fn persist(&mut self, message: impl Into<String>) -> Result<()> {
        save_plan(&self.location, &self.plan)?;
        self.last_save = Instant::now();
        self.status = message.into();
        Ok(())
    }

    fn persist_view(&mut self, message: impl Into<String>) -> Result<()> {
        save_view(&self.location, &self.view)?;
        self.last_save = Instant::now();
        self.status = message.into();
        Ok(())
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        self.draw_gantt(f, layout[1]);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Creating(form) => draw_form(f, "New Task", form),
            Mode::Editing { form, .. } => draw_form(f, "Edit Task", form),
            Mode::ConfirmDelete { task_id } => self.draw_confirm(f, task_id),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let scope = match self.location.scope {
            StoreScope::Project => "project",
            StoreScope::Global => "global",
        };
        let mut spans = vec![
            Span::styled(
                "taskport ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(scope, Style::default().fg(Color::Green)),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.dir.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!(
                    "{} +{}d",
                    format_date_key(self.view.start),
                    self.view.days
                ),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(Color::Gray),
            ),
        ];
        if self.unread_notices {
            spans.push(Span::raw("  •  "));
            spans.push(Span::styled(
                "● notices",
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_gantt(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(NAME_W), Constraint::Min(10)])
            .split(area);

        let header_rows = 2usize;
        let viewport = (area.height as usize).saturating_sub(header_rows);
        self.selected = self
            .selected
            .min(self.plan.tasks.len().saturating_sub(1));
        self.row_offset = adjust_offset(
            self.selected,
            self.row_offset,
            viewport,
            1,
            self.plan.tasks.len(),
        );

        let visible_days = (panes[1].width as i64 / CELL_W).max(1);
        let max_scroll = (self.view.days as i64 - visible_days).max(0);
        self.scroll_day = self.scroll_day.clamp(0, max_scroll);

        self.draw_name_pane(f, panes[0], viewport);
        self.draw_chart_pane(f, panes[1], viewport, visible_days);
    }

    fn draw_name_pane(&self, f: &mut ratatui::Frame<'_>, area: Rect, viewport: usize) {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{:<width$}", "Task", width = NAME_W as usize),
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            )),
        ];
        for (idx, task) in self
            .plan
            .tasks
            .iter()
            .enumerate()
            .skip(self.row_offset)
            .take(viewport)
        {
            let selected = idx == self.selected;
            let swatch_style = Style::default().fg(task_color(task));
            let name_width = NAME_W as usize - 8;
            let mut row_style = Style::default().fg(Color::White);
            if selected {
                row_style = row_style
                    .bg(Color::Rgb(60, 64, 76))
                    .add_modifier(Modifier::BOLD);
            }
            lines.push(Line::from(vec![
                Span::styled("▪ ", swatch_style),
                Span::styled(
                    format!("{:<width$}", truncate_text(&task.name, name_width), width = name_width),
                    row_style,
                ),
                Span::styled(
                    format!(" {:>3}% ", task.progress),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
        if self.plan.tasks.is_empty() {
            lines.push(Line::from(Span::styled(
                "No tasks — press n",
                Style::default().fg(Color::DarkGray),
            )));
        }
        f.render_widget(Paragraph::new(lines), area);
    }

    fn draw_chart_pane(
        &self,
        f: &mut ratatui::Frame<'_>,
        area: Rect,
        viewport: usize,
        visible_days: i64,
    ) {
        let days = date_range(self.view.start, self.view.days);
        let today_off = today_offset(self.view.start, self.view.days as i64);
        let first = self.scroll_day;
        let last = (first + visible_days + 1).min(self.view.days as i64);

        let mut lines = vec![
            self.month_header_line(&days, first, last),
            self.day_header_line(&days, first, last),
        ];
        for task in self.plan.tasks.iter().skip(self.row_offset).take(viewport) {
            lines.push(self.task_row_line(task, today_off, first, last));
        }
        f.render_widget(Paragraph::new(lines), area);
    }

    fn month_header_line(&self, days: &[NaiveDate], first: i64, last: i64) -> Line<'static> {
        let mut spans = Vec::new();
        let mut day_idx: i64 = 0;
        for segment in month_segments(days) {
            let seg_start = day_idx;
            let seg_end = day_idx + segment.span as i64;
            day_idx = seg_end;
            let lo = seg_start.max(first);
            let hi = seg_end.min(last);
            if lo >= hi {
                continue;
            }
            let width = ((hi - lo) * CELL_W) as usize;
            let label = if lo == seg_start {
                truncate_text(&segment.label, width)
            } else {
                // Segment starts off-screen to the left; keep the grid width.
                String::new()
            };
            spans.push(Span::styled(
                format!("{:<width$}", label, width = width),
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    }

    fn day_header_line(&self, days: &[NaiveDate], first: i64, last: i64) -> Line<'static> {
        let today = Local::now().date_naive();
        let mut spans = Vec::new();
        for i in first..last {
            let Some(day) = days.get(i as usize) else {
                break;
            };
            let mut style = Style::default().fg(Color::Gray);
            if is_weekend(*day) {
                style = style.bg(Color::Rgb(32, 34, 42));
            }
            if is_same_day(*day, today) {
                style = Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(
                format!("{:>2} {}", day.day(), weekday_letter(*day)),
                style,
            ));
        }
        Line::from(spans)
    }

    fn task_row_line(
        &self,
        task: &Task,
        today_off: Option<i64>,
        first: i64,
        last: i64,
    ) -> Line<'static> {
        let rect = self.task_rect(task);
        let color = task_color(task);
        let filled_px = rect
            .map(|r| r.width * task.progress as i64 / 100)
            .unwrap_or(0);

        let mut spans = Vec::new();
        for i in first..last {
            if i >= self.view.days as i64 {
                break;
            }
            let covered = rect
                .map(|r| i * CELL_W >= r.left && i * CELL_W < r.left + r.width)
                .unwrap_or(false);
            if covered {
                let r = rect.unwrap_or(BarRect { left: 0, width: 0 });
                let cell: String = (0..CELL_W)
                    .map(|p| {
                        let px = i * CELL_W + p - r.left;
                        if px >= r.width {
                            ' '
                        } else if px < filled_px {
                            '█'
                        } else {
                            '░'
                        }
                    })
                    .collect();
                spans.push(Span::styled(cell, Style::default().fg(color)));
            } else {
                let (mark, style) = if today_off == Some(i) {
                    ("│", Style::default().fg(Color::LightRed))
                } else {
                    ("│", Style::default().fg(Color::Rgb(44, 46, 54)))
                };
                let mut fill = Style::default();
                let day = self.view.start + chrono::Duration::days(i);
                if is_weekend(day) {
                    fill = fill.bg(Color::Rgb(26, 28, 34));
                }
                spans.push(Span::styled(mark.to_string(), style));
                spans.push(Span::styled(
                    " ".repeat(CELL_W as usize - 1),
                    fill,
                ));
            }
        }
        Line::from(spans)
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help = Line::from(vec![
            Span::styled("↑↓", Style::default().fg(Color::LightCyan)),
            Span::raw(" select  "),
            Span::styled("J/K", Style::default().fg(Color::LightGreen)),
            Span::raw(" reorder  "),
            Span::styled("←→/H/L", Style::default().fg(Color::LightCyan)),
            Span::raw(" window  "),
            Span::styled("t", Style::default().fg(Color::LightYellow)),
            Span::raw(" today  "),
            Span::styled("v", Style::default().fg(Color::LightYellow)),
            Span::raw(" span  "),
            Span::styled("n", Style::default().fg(Color::LightMagenta)),
            Span::raw(" new  "),
            Span::styled("e", Style::default().fg(Color::LightYellow)),
            Span::raw(" edit  "),
            Span::styled("d", Style::default().fg(Color::LightRed)),
            Span::raw(" delete  "),
            Span::styled("s", Style::default().fg(Color::LightGreen)),
            Span::raw(" share  "),
            Span::styled("o", Style::default().fg(Color::LightBlue)),
            Span::raw(" notices  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ]);
        let help_bar = Paragraph::new(help).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, bottom[0]);

        let detail = Paragraph::new(self.detail_line())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title("Selected"),
            );
        f.render_widget(detail, bottom[1]);
    }

    fn detail_line(&self) -> Line<'static> {
        let Some(task) = self.current_task() else {
            return Line::from("No task selected");
        };
        Line::from(vec![
            Span::styled(
                task.name.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!(
                    "{} → {} ({}d)",
                    format_date_key(task.start),
                    format_date_key(task.end),
                    task.duration_days()
                ),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{}%", task.progress),
                Style::default().fg(Color::LightGreen),
            ),
            Span::raw("  "),
            Span::styled(task.color.clone(), Style::default().fg(task_color(task))),
        ])
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, task_id: &str) {
        let area = centered_rect(50, 30, f.size());
        let name = self
            .plan
            .get(task_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| task_id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", name),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

impl TaskForm {
    fn new() -> Self {
        TaskForm {
            name: FieldValue::new(""),
            start: FieldValue::new(""),
            end: FieldValue::new(""),
            progress: FieldValue::new(""),
            color: FieldValue::new(DEFAULT_COLOR),
            field: FormField::Name,
        }
    }

    fn from_task(task: &Task) -> Self {
        TaskForm {
            name: FieldValue::new(&task.name),
            start: FieldValue::new(&format_date_key(task.start)),
            end: FieldValue::new(&format_date_key(task.end)),
            progress: FieldValue::new(&task.progress.to_string()),
            color: FieldValue::new(&task.color),
            field: FormField::Name,
        }
    }

    /// Empty fields stay untouched; dates must parse, progress clamps.
    fn to_patch(&self) -> Result<TaskPatch> {
        let name = non_empty(&self.name.value).map(str::to_string);
        let start = non_empty(&self.start.value)
            .map(parse_date_key)
            .transpose()
            .map_err(|err| anyhow!(err))?;
        let end = non_empty(&self.end.value)
            .map(parse_date_key)
            .transpose()
            .map_err(|err| anyhow!(err))?;
        let progress = non_empty(&self.progress.value)
            .map(|raw| {
                raw.parse::<u32>()
                    .map(|n| n.min(100) as u8)
                    .map_err(|_| anyhow!("progress must be a number: {}", raw))
            })
            .transpose()?;
        let color = non_empty(&self.color.value).map(str::to_string);
        Ok(TaskPatch {
            name,
            start,
            end,
            progress,
            color,
        })
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Start,
            FormField::Start => FormField::End,
            FormField::End => FormField::Progress,
            FormField::Progress => FormField::Color,
            FormField::Color => FormField::Name,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Color,
            FormField::Start => FormField::Name,
            FormField::End => FormField::Start,
            FormField::Progress => FormField::End,
            FormField::Color => FormField::Progress,
        };
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Name => &mut self.name,
            FormField::Start => &mut self.start,
            FormField::End => &mut self.end,
            FormField::Progress => &mut self.progress,
            FormField::Color => &mut self.color,
        }
    }
}

fn draw_form(f: &mut ratatui::Frame<'_>, title: &str, form: &TaskForm) {
    let area = centered_rect(60, 50, f.size());
    let mut fields = Vec::new();
    fields.push(field_line("Name", &form.name, form.field == FormField::Name));
    fields.push(field_line(
        "Start (YYYY-MM-DD)",
        &form.start,
        form.field == FormField::Start,
    ));
    fields.push(field_line(
        "End (YYYY-MM-DD)",
        &form.end,
        form.field == FormField::End,
    ));
    fields.push(field_line(
        "Progress (0-100)",
        &form.progress,
        form.field == FormField::Progress,
    ));
    fields.push(field_line(
        "Color (#rrggbb)",
        &form.color,
        form.field == FormField::Color,
    ));
    fields.push(Line::from(""));
    fields.push(Line::from(Span::styled(
        "Enter to save • Esc to cancel • Tab/Shift-Tab to move",
        Style::default().fg(Color::Gray),
    )));
    let dialog = Paragraph::new(fields)
        .block(
            Block::default()
                .title(Span::styled(
                    title.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn field_line(label: &str, field: &FieldValue, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn weekday_letter(day: NaiveDate) -> char {
    match day.weekday() {
        Weekday::Mon => 'M',
        Weekday::Tue => 'T',
        Weekday::Wed => 'W',
        Weekday::Thu => 'T',
        Weekday::Fri => 'F',
        Weekday::Sat => 'S',
        Weekday::Sun => 'S',
    }
}

fn task_color(task: &Task) -> Color {
    color_from_hex(&task.color).unwrap_or(Color::Cyan)
}

fn color_from_hex(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn prev_char(cursor: usize, text: &str) -> usize {
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_char(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_to_rgb() {
        assert_eq!(color_from_hex("#60a5fa"), Some(Color::Rgb(0x60, 0xa5, 0xfa)));
        assert_eq!(color_from_hex("60a5fa"), None);
        assert_eq!(color_from_hex("#xyzxyz"), None);
        assert_eq!(color_from_hex("#fff"), None);
    }

    #[test]
    fn truncation_keeps_short_names_intact() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a rather long task name", 10), "a rathe...");
        assert_eq!(truncate_text("anything", 0), "");
    }

    #[test]
    fn field_editing_moves_by_character() {
        let mut field = FieldValue::new("ab");
        field.move_left();
        field.insert_char('x');
        assert_eq!(field.value, "axb");
        field.backspace();
        assert_eq!(field.value, "ab");
        assert_eq!(field.cursor, 1);
    }

    #[test]
    fn offset_tracks_the_selection_into_view() {
        // Selection below the viewport pulls the offset down.
        assert_eq!(adjust_offset(9, 0, 5, 1, 20), 6);
        // Selection above pulls it back up.
        assert_eq!(adjust_offset(1, 6, 5, 1, 20), 0);
        assert_eq!(adjust_offset(0, 0, 0, 1, 20), 0);
    }
}
