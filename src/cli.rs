use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "taskport", version, about = "Terminal Gantt-chart task editor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a project task store in the current directory
    Init,
    /// List tasks in display order
    List,
    /// Add a new task (defaults: today through today+3)
    Add {
        /// Task name
        name: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Progress percentage, clamped to 0..=100
        #[arg(long)]
        progress: Option<u8>,
        /// Bar color (hex, e.g. #60a5fa)
        #[arg(long)]
        color: Option<String>,
    },
    /// Edit fields of an existing task
    Edit {
        /// Task id to edit
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// New end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// New progress percentage
        #[arg(long)]
        progress: Option<u8>,
        /// New bar color
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a task
    Remove {
        /// Task id to remove
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Move a task one position in display order
    Move {
        /// Task id to move
        id: String,
        /// Move one position earlier
        #[arg(long, conflicts_with = "down")]
        up: bool,
        /// Move one position later
        #[arg(long)]
        down: bool,
    },
    /// Adjust the visible window
    View {
        /// Window start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Window width in days (30, 60, 90 or 120)
        #[arg(long)]
        days: Option<u32>,
        /// Center the window on today
        #[arg(long)]
        center_today: bool,
        /// Shift the window by a signed day count
        #[arg(long, allow_hyphen_values = true)]
        shift: Option<i64>,
    },
    /// Print a shareable link for the current window
    Share,
    /// Open the release notes and mark them read
    Notices,
    /// Launch the interactive Gantt editor
    Tui,
}
