//! Task list commands for CLI.

use clap::Subcommand;
use pomotrack_core::{TaskList, TodoItem};

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the top of the list
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List tasks, newest first
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a task between done and not done
    Done {
        /// Task ID
        id: u64,
    },
    /// Replace a task's text
    Edit {
        /// Task ID
        id: u64,
        /// New text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Delete a task
    Remove {
        /// Task ID
        id: u64,
    },
}

fn print_item(item: &TodoItem) {
    let mark = if item.completed { "x" } else { " " };
    println!("[{mark}] {:>3}  {}", item.id, item.text);
}

pub fn run(action: TaskAction) -> CliResult {
    let mut tasks = TaskList::load(open_store()?);

    match action {
        TaskAction::Add { text } => match tasks.add(&text.join(" "))? {
            Some(item) => println!("Task added: {}", item.id),
            None => return Err("task text is empty".into()),
        },
        TaskAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(tasks.items())?);
            } else if tasks.is_empty() {
                println!("No tasks yet. Add one to get started!");
            } else {
                for item in tasks.items() {
                    print_item(item);
                }
            }
        }
        TaskAction::Done { id } => match tasks.toggle_complete(id)? {
            Some(true) => println!("Task {id} marked done"),
            Some(false) => println!("Task {id} marked not done"),
            None => println!("Task not found: {id}"),
        },
        TaskAction::Edit { id, text } => {
            if tasks.edit(id, &text.join(" "))? {
                println!("Task {id} updated");
            } else {
                println!("Task unchanged: {id}");
            }
        }
        TaskAction::Remove { id } => {
            if tasks.remove(id)? {
                println!("Task deleted: {id}");
            } else {
                println!("Task not found: {id}");
            }
        }
    }
    Ok(())
}
