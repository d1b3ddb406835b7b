//! `calorie` command-line host.
//!
//! # Responsibility
//! - Validate user input into tracker commands.
//! - Open the SQLite-backed store and render results as text.

use calorie_core::db::open_db;
use calorie_core::{
    entry_from_input, init_logging, limit_from_input, Command, DayStore, DayTracker, Entry,
    EntryId, EntryKind, KeyValueStore, SqliteKeyValueStore,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

mod config;
mod config_cmd;
mod render;

use config::Config;
use config_cmd::ConfigCommand;
use render::TextRenderer;

#[derive(Parser)]
#[command(name = "calorie")]
#[command(version)]
#[command(about = "Track meals and workouts against a daily calorie limit", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every entry and today's totals
    Status,

    /// Log and manage meals
    Meal(EntryCommand),

    /// Log and manage workouts
    Workout(EntryCommand),

    /// Set the daily calorie limit
    Limit { value: String },

    /// Clear all meals and workouts (the limit is kept)
    Reset,

    /// Manage configuration
    Config(ConfigCommand),
}

#[derive(Args)]
struct EntryCommand {
    #[command(subcommand)]
    action: EntryAction,
}

#[derive(Subcommand)]
enum EntryAction {
    /// Add an entry
    Add {
        name: String,
        #[arg(allow_hyphen_values = true)]
        calories: String,
    },

    /// Remove an entry by id
    Remove { id: String },

    /// List entries, optionally filtered by name
    List {
        #[arg(long, short)]
        filter: Option<String>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Status => "status",
            Commands::Meal(_) => "meal",
            Commands::Workout(_) => "workout",
            Commands::Limit { .. } => "limit",
            Commands::Reset => "reset",
            Commands::Config(_) => "config",
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    if let Commands::Config(cmd) = &cli.command {
        return cmd.run(&config, &mut io::stdout().lock());
    }

    start_logging(&config);
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    let db_path = &config.database_path.value;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = open_db(db_path)?;
    let store = DayStore::new(SqliteKeyValueStore::try_new(&conn)?);

    // Only `status` shows the entries replayed during load.
    let replay = matches!(cli.command, Commands::Status);
    let mut tracker = DayTracker::load(store, TextRenderer::new(io::stdout().lock(), replay));
    tracker.view_mut().set_echo_entries(true);

    execute(cli.command, &mut tracker)?;

    let (_, view) = tracker.into_parts();
    view.finish()?;
    Ok(())
}

fn start_logging(config: &Config) {
    let log_dir = &config.log_dir.value;
    let absolute = if log_dir.is_absolute() {
        log_dir.clone()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(log_dir),
            Err(_) => log_dir.clone(),
        }
    };

    if let Err(err) = init_logging(&config.log_level.value, &absolute.to_string_lossy()) {
        eprintln!("Warning: logging disabled: {err}");
        return;
    }

    info!(
        "event=config_load module=cli status=ok config_file={} database_source={} log_dir_source={} log_level_source={}",
        config
            .config_file
            .as_deref()
            .map_or_else(|| "none".to_string(), |path| path.display().to_string()),
        config.database_path.source,
        config.log_dir.source,
        config.log_level.source
    );
}

fn execute<K: KeyValueStore, W: Write>(
    command: Commands,
    tracker: &mut DayTracker<K, TextRenderer<W>>,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Status => {}
        Commands::Meal(cmd) => execute_entry(EntryKind::Meal, cmd.action, tracker)?,
        Commands::Workout(cmd) => execute_entry(EntryKind::Workout, cmd.action, tracker)?,
        Commands::Limit { value } => Command::SetLimit(limit_from_input(&value)?).apply(tracker)?,
        Commands::Reset => Command::ResetDay.apply(tracker)?,
        Commands::Config(_) => {}
    }
    Ok(())
}

fn execute_entry<K: KeyValueStore, W: Write>(
    kind: EntryKind,
    action: EntryAction,
    tracker: &mut DayTracker<K, TextRenderer<W>>,
) -> Result<(), Box<dyn Error>> {
    match action {
        EntryAction::Add { name, calories } => {
            let entry = entry_from_input(&name, &calories)?;
            Command::add(kind, entry).apply(tracker)?;
        }
        EntryAction::Remove { id } => {
            let removed = tracker.remove_entry(kind, &EntryId::new(id.as_str()))?;
            if removed.is_none() {
                tracker
                    .view_mut()
                    .print_message(&format!("no {kind} with id {id}"));
            }
        }
        EntryAction::List { filter } => {
            let matches = tracker
                .filter_entries(kind, filter.as_deref().unwrap_or_default())
                .into_iter()
                .cloned()
                .collect::<Vec<Entry>>();
            for entry in &matches {
                tracker.view_mut().print_entry(kind, entry);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, EntryAction};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_calories_reach_validation() {
        let cli = Cli::try_parse_from(["calorie", "meal", "add", "Eggs", "-5"]).unwrap();
        match cli.command {
            Commands::Meal(cmd) => match cmd.action {
                EntryAction::Add { calories, .. } => assert_eq!(calories, "-5"),
                _ => panic!("expected add"),
            },
            _ => panic!("expected meal command"),
        }
    }
}
