use crate::dates::{format_date_key, parse_date_key};
use crate::model::{generate_id, Plan, Task, TaskPatch};
use crate::notice;
use crate::storage::{
    init_project_store, load_plan, load_view, locate_store, save_plan, save_view, StoreLocation,
    StoreScope,
};
use crate::ui;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::env;
use std::io::{self, Write};

pub const APP_URL: &str = "https://taskport.example";

pub fn init() -> Result<()> {
    let location = init_project_store()?;
    println!("Initialized task store at {}", location.dir.display());
    Ok(())
}

pub fn list() -> Result<()> {
    let (plan, location) = load_current()?;
    let scope = match location.scope {
        StoreScope::Project => "project",
        StoreScope::Global => "global",
    };
    println!("Tasks ({}, {} total)", scope, plan.tasks.len());
    for task in &plan.tasks {
        println!(
            "  {}  {} .. {}  {:>3}%  {}  {}",
            task.id,
            format_date_key(task.start),
            format_date_key(task.end),
            task.progress,
            task.color,
            task.name,
        );
    }
    Ok(())
}

pub fn add(
    name: String,
    start: Option<String>,
    end: Option<String>,
    progress: Option<u8>,
    color: Option<String>,
) -> Result<()> {
    let (mut plan, location) = load_current()?;
    let id = generate_id();
    let task = Task::with_defaults(id.clone(), name);
    plan.add(task);
    let patch = TaskPatch {
        name: None,
        start: parse_date_arg(start.as_deref())?,
        end: parse_date_arg(end.as_deref())?,
        progress,
        color,
    };
    plan.update(&id, &patch);
    save_plan(&location, &plan)?;
    println!("Added task {}", id);
    Ok(())
}

pub fn edit(
    id: String,
    name: Option<String>,
    start: Option<String>,
    end: Option<String>,
    progress: Option<u8>,
    color: Option<String>,
) -> Result<()> {
    let (mut plan, location) = load_current()?;
    if plan.get(&id).is_none() {
        bail!("task {} not found", id);
    }
    let patch = TaskPatch {
        name,
        start: parse_date_arg(start.as_deref())?,
        end: parse_date_arg(end.as_deref())?,
        progress,
        color,
    };
    plan.update(&id, &patch);
    save_plan(&location, &plan)?;
    println!("Updated task {}", id);
    Ok(())
}

pub fn remove(id: String, yes: bool) -> Result<()> {
    let (mut plan, location) = load_current()?;
    let Some(task) = plan.get(&id) else {
        println!("Task {} not found; nothing to remove", id);
        return Ok(());
    };
    if !yes && !confirm(&format!("Delete \"{}\"? [y/N] ", task.name))? {
        println!("Canceled");
        return Ok(());
    }
    plan.remove(&id);
    save_plan(&location, &plan)?;
    println!("Removed task {}", id);
    Ok(())
}

pub fn move_task(id: String, up: bool, down: bool) -> Result<()> {
    if up == down {
        bail!("pass exactly one of --up or --down");
    }
    let (mut plan, location) = load_current()?;
    plan.move_task(&id, if up { -1 } else { 1 });
    save_plan(&location, &plan)?;
    println!("Moved task {}", id);
    Ok(())
}

pub fn view(
    start: Option<String>,
    days: Option<u32>,
    center_today: bool,
    shift: Option<i64>,
) -> Result<()> {
    let location = current_location()?;
    let mut window = load_view(&location)?;
    if let Some(start) = parse_date_arg(start.as_deref())? {
        window.start = start;
    }
    if let Some(days) = days {
        window.set_days(days);
    }
    if center_today {
        window.center_on_today();
    }
    if let Some(delta) = shift {
        window.shift(delta);
    }
    save_view(&location, &window)?;
    println!(
        "Window: {} for {} days",
        format_date_key(window.start),
        window.days
    );
    Ok(())
}

pub fn share() -> Result<()> {
    let location = current_location()?;
    let window = load_view(&location)?;
    println!("{}", window.share_link(APP_URL));
    Ok(())
}

pub fn notices() -> Result<()> {
    let location = current_location()?;
    if notice::unread_notices(&location) {
        println!("{} (new)", notice::NOTICE_URL);
    } else {
        println!("{}", notice::NOTICE_URL);
    }
    notice::mark_notices_read(&location)?;
    Ok(())
}

pub fn tui() -> Result<()> {
    let (plan, location) = load_current()?;
    let window = load_view(&location)?;
    ui::run(plan, window, location)
}

fn load_current() -> Result<(Plan, StoreLocation)> {
    let location = current_location()?;
    let plan = load_plan(&location)?;
    Ok((plan, location))
}

fn current_location() -> Result<StoreLocation> {
    let cwd = env::current_dir()?;
    locate_store(&cwd)
}

fn parse_date_arg(input: Option<&str>) -> Result<Option<NaiveDate>> {
    match input {
        Some(raw) => {
            let date = parse_date_key(raw).with_context(|| format!("parsing date {:?}", raw))?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
