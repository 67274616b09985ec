use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::format_date_key;

pub type TaskId = String;

pub const DEFAULT_COLOR: &str = "#60a5fa";
pub const DEFAULT_SPAN_DAYS: i64 = 3;

/// Allowed visible-window widths, in days.
pub const VIEW_DAY_CHOICES: [u32; 4] = [30, 60, 90, 120];
pub const DEFAULT_VIEW_DAYS: u32 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: u8,
    pub color: String,
}

/// Field-level patch for [`Plan::update`]; `None` leaves a field untouched.
#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub progress: Option<u8>,
    pub color: Option<String>,
}

/// Ordered task collection; the order is the display order.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub tasks: Vec<Task>,
}

impl Task {
    /// A task with the standard defaults: today through today+3, no progress.
    pub fn with_defaults(id: TaskId, name: String) -> Self {
        let today = Local::now().date_naive();
        Task {
            id,
            name,
            start: today,
            end: today + Duration::days(DEFAULT_SPAN_DAYS),
            progress: 0,
            color: DEFAULT_COLOR.to_string(),
        }
    }

    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl Plan {
    /// Appends a task; id uniqueness is the caller's responsibility.
    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Merges the patch into the matching task; unknown ids are a no-op.
    ///
    /// The `start <= end` invariant is restored after merging: a start
    /// pushed past the end raises the end, an end pulled before the start
    /// lowers the start. Progress clamps into 0..=100.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        if let Some(name) = &patch.name {
            task.name = name.clone();
        }
        if let Some(color) = &patch.color {
            task.color = color.clone();
        }
        if let Some(progress) = patch.progress {
            task.progress = progress.min(100);
        }
        if let Some(start) = patch.start {
            task.start = start;
            if task.end < start {
                task.end = start;
            }
        }
        if let Some(end) = patch.end {
            task.end = end;
            if task.start > end {
                if patch.start.is_some() {
                    // Both endpoints in one patch: start wins.
                    task.end = task.start;
                } else {
                    task.start = end;
                }
            }
        }
    }

    /// Removes the matching task; unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Shifts the task one position per `delta` step, clamped at the ends.
    pub fn move_task(&mut self, id: &str, delta: isize) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let max = self.tasks.len().saturating_sub(1) as isize;
        let target = (idx as isize + delta).clamp(0, max) as usize;
        if target == idx {
            return;
        }
        let task = self.tasks.remove(idx);
        self.tasks.insert(target, task);
    }
}

/// First-run seed collection, anchored on the current date.
pub fn sample_plan() -> Plan {
    let base = Local::now().date_naive();
    let seed = |name: &str, start: i64, end: i64, progress: u8, color: &str| Task {
        id: generate_id(),
        name: name.to_string(),
        start: base + Duration::days(start),
        end: base + Duration::days(end),
        progress,
        color: color.to_string(),
    };
    Plan {
        tasks: vec![
            seed("Requirements & draft", 0, 2, 80, "#60a5fa"),
            seed("Type definitions", 1, 4, 50, "#34d399"),
            seed("Gantt scaffolding", 3, 9, 30, "#f472b6"),
            seed("CRUD & polish", 7, 12, 10, "#f59e0b"),
        ],
    }
}

pub fn generate_id() -> String {
    use rand::{distributions::Alphanumeric, Rng};
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

/// The currently displayed date range.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    pub start: NaiveDate,
    pub days: u32,
}

impl Default for ViewWindow {
    fn default() -> Self {
        ViewWindow::centered_on(Local::now().date_naive(), DEFAULT_VIEW_DAYS)
    }
}

impl ViewWindow {
    pub fn centered_on(date: NaiveDate, days: u32) -> Self {
        let days = snap_view_days(days);
        ViewWindow {
            start: date - Duration::days(days as i64 / 2),
            days,
        }
    }

    pub fn center_on_today(&mut self) {
        *self = ViewWindow::centered_on(Local::now().date_naive(), self.days);
    }

    pub fn shift(&mut self, delta_days: i64) {
        if let Some(start) = self.start.checked_add_signed(Duration::days(delta_days)) {
            self.start = start;
        }
    }

    pub fn set_days(&mut self, days: u32) {
        self.days = snap_view_days(days);
    }

    /// Rotates through [`VIEW_DAY_CHOICES`].
    pub fn cycle_days(&mut self) {
        let idx = VIEW_DAY_CHOICES
            .iter()
            .position(|&d| d == self.days)
            .unwrap_or(0);
        self.days = VIEW_DAY_CHOICES[(idx + 1) % VIEW_DAY_CHOICES.len()];
    }

    /// The window as query parameters on the application URL.
    pub fn share_link(&self, base_url: &str) -> String {
        format!(
            "{}?start={}&days={}",
            base_url,
            format_date_key(self.start),
            self.days
        )
    }
}

fn snap_view_days(days: u32) -> u32 {
    VIEW_DAY_CHOICES
        .into_iter()
        .min_by_key(|choice| choice.abs_diff(days))
        .unwrap_or(DEFAULT_VIEW_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(id: &str, start: NaiveDate, end: NaiveDate) -> Task {
        Task {
            id: id.to_string(),
            name: format!("task {id}"),
            start,
            end,
            progress: 0,
            color: DEFAULT_COLOR.to_string(),
        }
    }

    fn three_task_plan() -> Plan {
        let mut plan = Plan::default();
        plan.add(task("a", d(2026, 3, 1), d(2026, 3, 4)));
        plan.add(task("b", d(2026, 3, 2), d(2026, 3, 6)));
        plan.add(task("c", d(2026, 3, 5), d(2026, 3, 9)));
        plan
    }

    #[test]
    fn update_raises_end_when_start_passes_it() {
        let mut plan = three_task_plan();
        plan.update(
            "a",
            &TaskPatch {
                start: Some(d(2026, 3, 10)),
                ..TaskPatch::default()
            },
        );
        let a = plan.get("a").unwrap();
        assert_eq!(a.start, d(2026, 3, 10));
        assert_eq!(a.end, d(2026, 3, 10));
    }

    #[test]
    fn update_lowers_start_when_end_drops_below_it() {
        let mut plan = three_task_plan();
        plan.update(
            "b",
            &TaskPatch {
                end: Some(d(2026, 2, 20)),
                ..TaskPatch::default()
            },
        );
        let b = plan.get("b").unwrap();
        assert_eq!(b.start, d(2026, 2, 20));
        assert_eq!(b.end, d(2026, 2, 20));
    }

    #[test]
    fn update_with_both_endpoints_lets_start_win() {
        let mut plan = three_task_plan();
        plan.update(
            "a",
            &TaskPatch {
                start: Some(d(2026, 3, 20)),
                end: Some(d(2026, 3, 15)),
                ..TaskPatch::default()
            },
        );
        let a = plan.get("a").unwrap();
        assert!(a.start <= a.end);
        assert_eq!(a.start, d(2026, 3, 20));
        assert_eq!(a.end, d(2026, 3, 20));
    }

    #[test]
    fn update_clamps_progress() {
        let mut plan = three_task_plan();
        plan.update(
            "c",
            &TaskPatch {
                progress: Some(250),
                ..TaskPatch::default()
            },
        );
        assert_eq!(plan.get("c").unwrap().progress, 100);
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let mut plan = three_task_plan();
        let before = plan.clone();
        plan.update(
            "zzz",
            &TaskPatch {
                name: Some("ghost".into()),
                ..TaskPatch::default()
            },
        );
        assert_eq!(plan, before);
    }

    #[test]
    fn move_first_up_and_last_down_are_no_ops() {
        let mut plan = three_task_plan();
        let before = plan.clone();
        plan.move_task("a", -1);
        assert_eq!(plan, before);
        plan.move_task("c", 1);
        assert_eq!(plan, before);
        plan.move_task("zzz", 1);
        assert_eq!(plan, before);
    }

    #[test]
    fn move_swaps_adjacent_tasks() {
        let mut plan = three_task_plan();
        plan.move_task("b", 1);
        let order: Vec<&str> = plan.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
        plan.move_task("b", -1);
        let order: Vec<&str> = plan.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_is_total() {
        let mut plan = three_task_plan();
        plan.remove("b");
        assert!(plan.get("b").is_none());
        assert_eq!(plan.tasks.len(), 2);
        plan.remove("b");
        assert_eq!(plan.tasks.len(), 2);
    }

    #[test]
    fn window_days_snap_to_the_allowed_choices() {
        let mut window = ViewWindow::centered_on(d(2026, 3, 16), 45);
        assert_eq!(window.days, 30);
        window.set_days(1000);
        assert_eq!(window.days, 120);
        window.cycle_days();
        assert_eq!(window.days, 30);
    }

    #[test]
    fn centered_window_puts_the_anchor_in_the_middle() {
        let window = ViewWindow::centered_on(d(2026, 3, 16), 30);
        assert_eq!(window.start, d(2026, 3, 1));
        assert_eq!(window.days, 30);
    }

    #[test]
    fn share_link_carries_start_and_days() {
        let window = ViewWindow {
            start: d(2026, 3, 1),
            days: 60,
        };
        assert_eq!(
            window.share_link("https://taskport.example"),
            "https://taskport.example?start=2026-03-01&days=60"
        );
    }

    #[test]
    fn sample_plan_respects_the_date_invariant() {
        for task in sample_plan().tasks {
            assert!(task.start <= task.end);
            assert!(task.progress <= 100);
        }
    }
}
