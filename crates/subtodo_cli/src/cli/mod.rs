use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task, optionally as a subtask of an existing one
    ///
    /// Example: subtodo add "Buy milk"
    /// Example: subtodo add "Skimmed" --parent task-1700000000000000000
    Add {
        text: Option<String>,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Flip a task's completed state
    ///
    /// Example: subtodo toggle task-1700000000000000000
    Toggle {
        id: String,
    },
    /// Delete a task together with its subtasks
    ///
    /// Example: subtodo delete task-1700000000000000000
    Delete {
        id: String,
    },
    /// Move a task onto another task
    ///
    /// A subtask becomes a sibling of a subtask target, or a child of a
    /// top-level target. A top-level task moves, subtasks in tow, to sit
    /// immediately before the target.
    ///
    /// Example: subtodo move task-2 task-1
    Move {
        id: String,
        target: String,
    },
    /// Set the active display filter (all, active, completed)
    ///
    /// In an interactive session the filter sticks until changed again.
    ///
    /// Example: subtodo filter active
    Filter {
        value: String,
    },
    /// List visible tasks
    ///
    /// Example: subtodo list
    /// Example: subtodo list completed
    List {
        filter: Option<String>,
    },
}
