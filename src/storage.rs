use crate::model::{sample_plan, Plan, ViewWindow};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const TASKS_SLOT: &str = "tasks.yml";
pub const VIEW_SLOT: &str = "view.yml";
pub const NOTICE_SLOT: &str = "notice.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    Project,
    Global,
}

/// Directory holding the independent persistence slots.
#[derive(Debug, Clone)]
pub struct StoreLocation {
    pub dir: PathBuf,
    pub scope: StoreScope,
}

impl StoreLocation {
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(slot)
    }
}

pub fn init_project_store() -> Result<StoreLocation> {
    let cwd = env::current_dir()?;
    let dir = cwd.join(".taskport");
    fs::create_dir_all(&dir).context("failed to create .taskport directory")?;
    let location = StoreLocation {
        dir,
        scope: StoreScope::Project,
    };
    if !location.slot_path(TASKS_SLOT).exists() {
        save_plan(&location, &sample_plan())?;
    }
    if !location.slot_path(VIEW_SLOT).exists() {
        save_view(&location, &ViewWindow::default())?;
    }
    Ok(location)
}

/// Nearest project `.taskport/` walking up from `start`, else the global one.
pub fn locate_store(start: &Path) -> Result<StoreLocation> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(".taskport");
        if candidate.is_dir() {
            return Ok(StoreLocation {
                dir: candidate,
                scope: StoreScope::Project,
            });
        }
        dir = current.parent();
    }
    let dirs = ProjectDirs::from("", "", "taskport").context("locating data directory")?;
    Ok(StoreLocation {
        dir: dirs.data_dir().to_path_buf(),
        scope: StoreScope::Global,
    })
}

/// Loads the task collection; an absent or corrupt slot yields the seed
/// collection instead of an error.
pub fn load_plan(location: &StoreLocation) -> Result<Plan> {
    match load_slot(location, TASKS_SLOT)? {
        Some(plan) => Ok(plan),
        None => {
            let plan = sample_plan();
            save_plan(location, &plan)?;
            Ok(plan)
        }
    }
}

/// Loads the visible window, defaulting to 30 days centered on today.
pub fn load_view(location: &StoreLocation) -> Result<ViewWindow> {
    match load_slot(location, VIEW_SLOT)? {
        Some(view) => Ok(view),
        None => {
            let view = ViewWindow::default();
            save_view(location, &view)?;
            Ok(view)
        }
    }
}

pub fn save_plan(location: &StoreLocation, plan: &Plan) -> Result<()> {
    save_slot(location, TASKS_SLOT, plan)
}

pub fn save_view(location: &StoreLocation, view: &ViewWindow) -> Result<()> {
    save_slot(location, VIEW_SLOT, view)
}

/// Reads one slot; `Ok(None)` for both missing files and unparseable
/// contents, so corrupt state degrades to defaults.
pub fn load_slot<T: DeserializeOwned>(location: &StoreLocation, slot: &str) -> Result<Option<T>> {
    let path = location.slot_path(slot);
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    Ok(serde_yaml::from_str(&data).ok())
}

pub fn save_slot<T: Serialize>(location: &StoreLocation, slot: &str, value: &T) -> Result<()> {
    fs::create_dir_all(&location.dir).with_context(|| format!("creating {:?}", location.dir))?;
    let serialized =
        serde_yaml::to_string(value).with_context(|| format!("serializing {}", slot))?;
    let path = location.slot_path(slot);
    fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use chrono::NaiveDate;

    fn temp_location(tag: &str) -> StoreLocation {
        let dir = env::temp_dir().join(format!("taskport-test-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        StoreLocation {
            dir,
            scope: StoreScope::Project,
        }
    }

    #[test]
    fn plan_round_trips_through_the_slot() {
        let location = temp_location("roundtrip");
        let mut plan = Plan::default();
        plan.add(Task {
            id: "ab12cd".into(),
            name: "ship it".into(),
            start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            progress: 40,
            color: "#34d399".into(),
        });
        save_plan(&location, &plan).unwrap();
        assert_eq!(load_plan(&location).unwrap(), plan);
        let _ = fs::remove_dir_all(&location.dir);
    }

    #[test]
    fn corrupt_slot_falls_back_to_the_seed_plan() {
        let location = temp_location("corrupt");
        fs::create_dir_all(&location.dir).unwrap();
        fs::write(location.slot_path(TASKS_SLOT), "{{{ not yaml").unwrap();
        let plan = load_plan(&location).unwrap();
        assert_eq!(plan.tasks.len(), 4);
        let _ = fs::remove_dir_all(&location.dir);
    }

    #[test]
    fn missing_view_slot_defaults_to_a_centered_month() {
        let location = temp_location("view");
        let view = load_view(&location).unwrap();
        assert_eq!(view.days, 30);
        // The default saves itself, so a reload sees the same window.
        assert_eq!(load_view(&location).unwrap(), view);
        let _ = fs::remove_dir_all(&location.dir);
    }
}
