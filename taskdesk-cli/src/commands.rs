use anyhow::{bail, Result};
use clap::Parser;
use taskdesk_sdk::api::types::tasks::{SortBy, TaskCategory, TaskPriority, TaskStatus};

/// One line of input.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub enum Command {
    /// Log in with email and password.
    Login(LoginArgs),
    /// Create an account and log in.
    Register(RegisterArgs),
    /// End the session.
    Logout,
    /// Show the current user.
    Whoami,
    /// Renew the credential now.
    Refresh,
    /// Show the session state, busy flags and cache size.
    Status,
    /// List tasks.
    Tasks(TasksArgs),
    /// Show one task.
    Task(IdArgs),
    /// Create a task.
    Create(CreateArgs),
    /// Update fields of a task.
    Update(UpdateArgs),
    /// Move a task to another status.
    SetStatus(SetStatusArgs),
    /// Delete a task.
    Delete(IdArgs),
    /// Show the dashboard summary.
    Summary,
    /// Exit.
    #[command(alias = "exit")]
    Quit,
}

#[derive(Parser, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub(crate) email: String,
    #[arg(short, long)]
    pub(crate) password: String,
}

#[derive(Parser, Debug)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub(crate) name: String,
    #[arg(short, long)]
    pub(crate) email: String,
    #[arg(short, long)]
    pub(crate) password: String,
}

#[derive(Parser, Debug)]
pub struct TasksArgs {
    #[arg(long)]
    pub(crate) status: Option<TaskStatus>,
    #[arg(long)]
    pub(crate) priority: Option<TaskPriority>,
    #[arg(long)]
    pub(crate) category: Option<TaskCategory>,
    /// Matches title or description, ignoring case
    #[arg(short, long)]
    pub(crate) search: Option<String>,
    /// Earliest due date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) from: Option<String>,
    /// Latest due date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) to: Option<String>,
    /// title, dueDate, priority, status or createdAt
    #[arg(long)]
    pub(crate) sort_by: Option<SortBy>,
    #[arg(long)]
    pub(crate) desc: bool,
    /// Filter the tasks already loaded instead of fetching
    #[arg(long)]
    pub(crate) local: bool,
    /// Clear the stored filter first
    #[arg(long)]
    pub(crate) reset: bool,
}

#[derive(Parser, Debug)]
pub struct IdArgs {
    pub(crate) id: i64,
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    #[arg(short, long)]
    pub(crate) title: String,
    #[arg(short, long)]
    pub(crate) description: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) due: Option<String>,
    #[arg(short, long, default_value = "medium")]
    pub(crate) priority: TaskPriority,
    #[arg(short, long, default_value = "work")]
    pub(crate) category: TaskCategory,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    pub(crate) id: i64,
    #[arg(short, long)]
    pub(crate) title: Option<String>,
    #[arg(short, long)]
    pub(crate) description: Option<String>,
    #[arg(long)]
    pub(crate) due: Option<String>,
    #[arg(short, long)]
    pub(crate) priority: Option<TaskPriority>,
    #[arg(short, long)]
    pub(crate) category: Option<TaskCategory>,
}

#[derive(Parser, Debug)]
pub struct SetStatusArgs {
    pub(crate) id: i64,
    pub(crate) status: TaskStatus,
}

/// Splits a line into words. Single and double quotes group words.
pub fn split(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut quote = None;
    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.get_or_insert_with(String::new).push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                current.get_or_insert_with(String::new);
            }
            (None, c) if c.is_whitespace() => words.extend(current.take()),
            (None, c) => current.get_or_insert_with(String::new).push(c),
        }
    }
    if quote.is_some() {
        bail!("unterminated quote");
    }
    words.extend(current);
    Ok(words)
}
