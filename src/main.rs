mod cli;
mod commands;
mod dates;
mod geometry;
mod model;
mod notice;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::List => commands::list(),
        cli::Command::Add {
            name,
            start,
            end,
            progress,
            color,
        } => commands::add(name, start, end, progress, color),
        cli::Command::Edit {
            id,
            name,
            start,
            end,
            progress,
            color,
        } => commands::edit(id, name, start, end, progress, color),
        cli::Command::Remove { id, yes } => commands::remove(id, yes),
        cli::Command::Move { id, up, down } => commands::move_task(id, up, down),
        cli::Command::View {
            start,
            days,
            center_today,
            shift,
        } => commands::view(start, days, center_today, shift),
        cli::Command::Share => commands::share(),
        cli::Command::Notices => commands::notices(),
        cli::Command::Tui => commands::tui(),
    }
}
