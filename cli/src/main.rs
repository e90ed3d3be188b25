//! todo - terminal client for a remote to-do list
//!
//! Usage:
//!   todo list [--completed <true|false>] [--priority <low|medium|high>]
//!   todo add <title> [--priority <p>] [--due <YYYY-MM-DD>]
//!   todo done <id> | todo rm <id>
//!   todo edit <id> [--title <t>] [--priority <p>] [--due <d> | --clear-due]

mod render;

use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use todo_sync::{ClientConfig, FilterState, Priority, TodoId, TodoSync, Transport};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Manage a to-do list stored on a remote server")]
struct Cli {
    /// Base URL of the API; overrides TODO_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the list, optionally filtered
    List {
        #[arg(long)]
        completed: Option<bool>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Add a to-do
    Add {
        title: String,
        #[arg(long, default_value_t = Priority::Low)]
        priority: Priority,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Toggle a to-do's completion
    Done { id: String },
    /// Delete a to-do
    Rm { id: String },
    /// Change a to-do's title, priority or due date
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        #[arg(long)]
        clear_due: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    debug!(base_url = %config.base_url, timeout = ?config.timeout, "client configured");
    let mut sync = TodoSync::from_config(&config);

    let filter = match &cli.command {
        Commands::List { completed, priority } => FilterState {
            completed: *completed,
            priority: *priority,
        },
        _ => FilterState::default(),
    };
    sync.set_filter(filter);
    if sync.state().error().is_some() {
        print!("{}", render::render(sync.state()));
        return Ok(ExitCode::FAILURE);
    }

    let outcome = apply(&mut sync, cli.command);
    if let Err(reason) = &outcome {
        eprintln!("{reason}");
    }
    print!("{}", render::render(sync.state()));
    Ok(if outcome.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Run one command against an already-fetched list. `Err` carries the line
/// reported on stderr.
fn apply<T: Transport>(sync: &mut TodoSync<T>, command: Commands) -> Result<(), String> {
    match command {
        Commands::List { .. } => Ok(()),
        Commands::Add { title, priority, due } => {
            let draft = sync.draft_mut();
            draft.title = title;
            draft.priority = priority;
            draft.due_date = due;
            if sync.create() {
                return Ok(());
            }
            match sync.take_notice() {
                Some(notice) => Err(format!("Could not add the to-do: {notice}")),
                None => Err("Nothing to add: the title is empty.".to_string()),
            }
        }
        Commands::Done { id } => {
            let id = TodoId::from(id);
            if sync.toggle(&id) {
                Ok(())
            } else {
                Err(format!("Could not update to-do {id}."))
            }
        }
        Commands::Rm { id } => {
            let id = TodoId::from(id);
            if sync.delete(&id) {
                Ok(())
            } else {
                Err(format!("Could not delete to-do {id}."))
            }
        }
        Commands::Edit {
            id,
            title,
            priority,
            due,
            clear_due,
        } => {
            let id = TodoId::from(id);
            if !sync.start_edit(&id) {
                return Err(format!("No to-do with id {id} in the list."));
            }
            if let Some(buffer) = sync.edit_buffer_mut() {
                if let Some(title) = title {
                    buffer.title = title;
                }
                if let Some(priority) = priority {
                    buffer.priority = priority;
                }
                if clear_due {
                    buffer.due_date = None;
                } else if due.is_some() {
                    buffer.due_date = due;
                }
            }
            if sync.save_edit() {
                Ok(())
            } else if sync.state().edit().is_editing() {
                Err(format!("Could not update to-do {id}."))
            } else {
                Err("Edit discarded: the title is empty.".to_string())
            }
        }
    }
}
