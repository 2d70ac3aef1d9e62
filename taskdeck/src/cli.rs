//! Subcommands of the `taskdeck` binary and their execution.
//!
//! Each command builds the view-model it needs from the current session,
//! runs one operation, and writes plain text to the given writer. Errors
//! are returned to `main`, which prints them and sets the exit code.

use std::io::Write;

use chrono::{NaiveDate, Utc};
use clap::{Subcommand, ValueEnum};

use taskdeck_proto::response::TaskPage;
use taskdeck_proto::task::parse_due_date;
use taskdeck_proto::{NewTag, NewTask, Tag, TagPatch, Task, TaskFilter, TaskPatch, TaskStats};

use crate::api::ApiError;
use crate::config::{ClientConfig, ConfigError};
use crate::session::{SessionError, SessionStorage, SessionStore};
use crate::tags::TagViewModel;
use crate::tasks::TaskViewModel;

/// Errors surfaced to the user by a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Signin, signup, or persisting the session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A task or tag operation failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a new account (does not sign in).
    Signup {
        /// Account name.
        #[arg(long)]
        username: String,
        /// Contact email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in and remember the session.
    Signin {
        /// Account name.
        #[arg(long)]
        username: String,
        /// Account password.
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the saved session.
    Signout,
    /// Show who is signed in.
    Whoami,
    /// Work with tasks.
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// Work with tags.
    #[command(subcommand)]
    Tags(TagCommand),
}

/// `taskdeck tasks ...`
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// List tasks.
    List {
        /// Only tasks carrying this tag id.
        #[arg(long)]
        tag: Option<String>,
        /// Only completed tasks.
        #[arg(long, conflicts_with = "pending")]
        completed: bool,
        /// Only pending tasks.
        #[arg(long)]
        pending: bool,
        /// Server-side sort key.
        #[arg(long)]
        sort: Option<String>,
        /// Page size.
        #[arg(long)]
        limit: Option<u32>,
        /// Page number, starting at 1.
        #[arg(long)]
        page: Option<u32>,
    },
    /// Create a task.
    Add {
        /// Task title.
        title: String,
        /// Free-form description.
        #[arg(long)]
        description: Option<String>,
        /// Due date, `YYYY-MM-DD`.
        #[arg(long, value_parser = parse_due_date)]
        due: Option<NaiveDate>,
        /// Tag id to attach.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Change fields of a task.
    Edit {
        /// Task id.
        id: String,
        /// New title.
        #[arg(long)]
        title: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
        /// New due date, `YYYY-MM-DD`.
        #[arg(long, value_parser = parse_due_date)]
        due: Option<NaiveDate>,
        /// New tag id.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Flip a task between completed and pending.
    Toggle {
        /// Task id.
        id: String,
    },
    /// Delete a task.
    Rm {
        /// Task id.
        id: String,
    },
    /// Delete every completed task.
    ClearCompleted,
    /// Show completion statistics.
    Stats,
    /// List tasks in one completion state.
    Status {
        /// Which state to list.
        #[arg(value_enum)]
        status: Status,
    },
}

/// Completion state selector for `tasks status`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Completed tasks.
    Completed,
    /// Tasks still open.
    Pending,
}

/// `taskdeck tags ...`
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TagCommand {
    /// List tags.
    List,
    /// Create a tag.
    Add {
        /// Tag name.
        name: String,
        /// Display color, e.g. `#22C55E`.
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename or recolor a tag.
    Edit {
        /// Tag id.
        id: String,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New color.
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a tag.
    Rm {
        /// Tag id.
        id: String,
    },
    /// List the tasks carrying a tag.
    Todos {
        /// Tag id.
        id: String,
    },
}

/// Runs one command against `store`, writing its output to `out`.
///
/// # Errors
///
/// Returns the failing operation's error; nothing partial is written for
/// a failed operation.
pub async fn run<S: SessionStorage>(
    command: Command,
    store: &mut SessionStore<S>,
    config: &ClientConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::Signup {
            username,
            email,
            password,
        } => {
            store.sign_up(&username, &email, &password).await?;
            writeln!(out, "Account created for {username}. Sign in to continue.")?;
        }
        Command::Signin { username, password } => {
            let session = store.sign_in(&username, &password).await?;
            let name = session.user().map_or(username.as_str(), |u| u.username.as_str());
            writeln!(out, "Signed in as {name}.")?;
        }
        Command::Signout => {
            store.sign_out();
            writeln!(out, "Signed out.")?;
        }
        Command::Whoami => match store.session().user() {
            Some(user) => match &user.email {
                Some(email) => writeln!(out, "{} <{email}>", user.username)?,
                None => writeln!(out, "{}", user.username)?,
            },
            None => writeln!(out, "Not signed in.")?,
        },
        Command::Tasks(cmd) => run_tasks(cmd, store, config, out).await?,
        Command::Tags(cmd) => run_tags(cmd, store, out).await?,
    }
    Ok(())
}

async fn run_tasks<S: SessionStorage>(
    command: TaskCommand,
    store: &SessionStore<S>,
    config: &ClientConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let vm = TaskViewModel::new(store.api().clone(), store.session().clone())
        .with_max_title_len(config.max_title_len);
    let today = Utc::now().date_naive();

    match command {
        TaskCommand::List {
            tag,
            completed,
            pending,
            sort,
            limit,
            page,
        } => {
            let filter = TaskFilter {
                tag,
                completed: completion_filter(completed, pending),
                sort,
                limit,
                page,
            };
            let paged = filter.limit.is_some() || filter.page.is_some();
            vm.load_filtered(&filter).await?;
            let tags = tag_names(store).await;
            write_tasks(out, &vm.tasks(), &tags, today)?;
            if let Some(page) = vm.page().filter(|_| paged) {
                write_page(out, &page)?;
            }
        }
        TaskCommand::Add {
            title,
            description,
            due,
            tag,
        } => {
            let mut task = NewTask::new(&title);
            if let Some(d) = description {
                task = task.with_description(&d);
            }
            if let Some(d) = due {
                task = task.with_due_date(d);
            }
            if let Some(t) = tag {
                task = task.with_tag(&t);
            }
            let created = vm.create(task).await?;
            writeln!(out, "Created task {}: {}", created.id, created.title)?;
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            due,
            tag,
        } => {
            let patch = TaskPatch {
                title,
                description,
                due_date: due,
                tag_id: tag,
                completed: None,
            };
            if patch.is_empty() {
                writeln!(out, "Nothing to change.")?;
                return Ok(());
            }
            let updated = vm.update(&id, patch).await?;
            writeln!(out, "{}", format_task(&updated, None, today))?;
        }
        TaskCommand::Toggle { id } => {
            let toggled = vm.toggle_completion(&id).await?;
            let state = if toggled.completed { "completed" } else { "pending" };
            writeln!(out, "Task {} is now {state}.", toggled.id)?;
        }
        TaskCommand::Rm { id } => {
            vm.remove(&id).await?;
            writeln!(out, "Deleted task {id}.")?;
        }
        TaskCommand::ClearCompleted => {
            let deleted = vm.clear_completed().await?;
            writeln!(out, "Deleted {deleted} completed task(s).")?;
        }
        TaskCommand::Stats => {
            let stats = vm.stats().await?;
            write_stats(out, &stats)?;
        }
        TaskCommand::Status { status } => {
            let tasks = vm.by_status(status == Status::Completed).await?;
            let tags = tag_names(store).await;
            write_tasks(out, &tasks, &tags, today)?;
        }
    }
    Ok(())
}

async fn run_tags<S: SessionStorage>(
    command: TagCommand,
    store: &SessionStore<S>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let vm = TagViewModel::new(store.api().clone(), store.session().clone());

    match command {
        TagCommand::List => {
            vm.load().await?;
            let tags = vm.tags();
            if tags.is_empty() {
                writeln!(out, "No tags.")?;
            }
            for tag in tags {
                writeln!(out, "{}  {}  {}", tag.id, tag.name, tag.color)?;
            }
        }
        TagCommand::Add { name, color } => {
            let mut tag = NewTag::new(&name);
            if let Some(c) = color {
                tag = tag.with_color(&c);
            }
            let created = vm.create(tag).await?;
            writeln!(out, "Created tag {}: {}", created.id, created.name)?;
        }
        TagCommand::Edit { id, name, color } => {
            let patch = TagPatch { name, color };
            if patch.is_empty() {
                writeln!(out, "Nothing to change.")?;
                return Ok(());
            }
            let updated = vm.update(&id, patch).await?;
            writeln!(out, "{}  {}  {}", updated.id, updated.name, updated.color)?;
        }
        TagCommand::Rm { id } => {
            vm.remove(&id).await?;
            writeln!(out, "Deleted tag {id}.")?;
        }
        TagCommand::Todos { id } => {
            let found = vm.tasks_by_tag(&id).await?;
            writeln!(out, "#{}", found.tag.name)?;
            let tags = [found.tag];
            write_tasks(out, &found.todos, &tags, Utc::now().date_naive())?;
        }
    }
    Ok(())
}

const fn completion_filter(completed: bool, pending: bool) -> Option<bool> {
    match (completed, pending) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// The user's tags for labelling task lines. A failure only costs the
/// labels of id-only references, so it is logged and not returned.
async fn tag_names<S: SessionStorage>(store: &SessionStore<S>) -> Vec<Tag> {
    let vm = TagViewModel::new(store.api().clone(), store.session().clone());
    if let Err(e) = vm.load().await {
        tracing::warn!(error = %e, "could not load tags for task labels");
    }
    vm.tags()
}

fn write_tasks(
    out: &mut impl Write,
    tasks: &[Task],
    tags: &[Tag],
    today: NaiveDate,
) -> std::io::Result<()> {
    if tasks.is_empty() {
        return writeln!(out, "No tasks.");
    }
    for task in tasks {
        let tag = task.tag.as_ref().and_then(|r| r.resolve(tags));
        writeln!(out, "{}", format_task(task, tag.map(|t| t.name.as_str()), today))?;
    }
    Ok(())
}

/// Writes `Page N of M`, plus the match count when the server sent one.
/// Nothing is written unless both page numbers are known.
fn write_page(out: &mut impl Write, page: &TaskPage) -> std::io::Result<()> {
    let (Some(current), Some(pages)) = (page.page, page.total_pages) else {
        return Ok(());
    };
    match page.total {
        Some(total) => writeln!(out, "Page {current} of {pages} ({total} tasks)"),
        None => writeln!(out, "Page {current} of {pages}"),
    }
}

fn write_stats(out: &mut impl Write, stats: &TaskStats) -> std::io::Result<()> {
    writeln!(
        out,
        "{} total, {} completed, {} pending ({:.0}% done)",
        stats.total, stats.completed, stats.pending, stats.completion_rate
    )?;
    for stat in &stats.tag_stats {
        writeln!(
            out,
            "  #{}: {}/{} completed",
            stat.tag.name, stat.completed, stat.total
        )?;
    }
    Ok(())
}

/// One-line rendering of a task: completion box, id, title, then due
/// date and tag when present.
#[must_use]
pub fn format_task(task: &Task, tag_name: Option<&str>, today: NaiveDate) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let overdue = if task.is_overdue(today) { " (overdue)" } else { "" };
    let due = task
        .due_date
        .map(|d| format!("  due {d}{overdue}"))
        .unwrap_or_default();
    let tag = tag_name.map(|n| format!("  #{n}")).unwrap_or_default();
    format!("{mark} {}  {}{due}{tag}", task.id, task.title)
}
