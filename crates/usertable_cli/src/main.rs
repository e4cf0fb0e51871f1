//! Terminal front-end for the user table.
//!
//! # Responsibility
//! - Resolve configuration from `USERTABLE_*` variables, then apply flags.
//! - Run the startup load, then one command, and print the outcome.

use clap::{Parser, Subcommand};
use log::info;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use usertable_core::config::parse_timeout_ms;
use usertable_core::db::open_db;
use usertable_core::{
    core_version, init_logging, ClientConfig, CommandOutcome, CommandService, EntryForm, HttpUsersApi,
    NotificationLevel, Record, RecordKey, RecordStore, SqliteMirrorRepository,
};

#[derive(Debug, Parser)]
#[command(name = "usertable", version, about = "Manage users through the users API")]
struct Cli {
    /// Backend base URL.
    #[arg(long)]
    api_url: Option<String>,
    /// Local mirror database file.
    #[arg(long = "db")]
    db_path: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Request timeout in milliseconds (unbounded when unset).
    #[arg(long)]
    timeout_ms: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current user list.
    List,
    /// Create a user from `name=value` fields.
    Add {
        #[arg(long = "field", short = 'f', value_parser = parse_field, required = true)]
        fields: Vec<(String, Value)>,
    },
    /// Delete the user with KEY.
    Delete { key: String },
    /// Duplicate the user with KEY under a new key.
    Copy { key: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(message) => {
            eprintln!("usertable: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool, String> {
    let base = ClientConfig::from_env().map_err(|err| err.to_string())?;
    let config = apply_flags(&cli, base)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, &log_dir.to_string_lossy())?;
    }
    info!(
        "event=cli_start module=cli version={} command={:?} api_url={} db_path={}",
        core_version(),
        cli.command,
        config.api_base_url,
        config.db_path.display()
    );

    let api = HttpUsersApi::new(&config.api_base_url, config.request_timeout)
        .map_err(|err| err.to_string())?;
    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let mut commands = CommandService::new(api, RecordStore::new(SqliteMirrorRepository::new(&conn)));

    let loaded = commands.start();
    report(&loaded);

    let outcome = match cli.command {
        Command::List => {
            print_records(commands.records());
            return Ok(loaded.is_success());
        }
        Command::Add { fields } => {
            let mut form = EntryForm::new();
            for (name, value) in fields {
                form.set_field(name, value);
            }
            commands.add(&mut form)
        }
        Command::Delete { key } => commands.delete(&parse_key(&key)?),
        Command::Copy { key } => commands.copy(&parse_key(&key)?),
    };
    report(&outcome);
    if let Some(record) = &outcome.record {
        print_records(std::slice::from_ref(record));
    }
    Ok(outcome.is_success())
}

/// Overrides environment-resolved settings with explicit flags.
fn apply_flags(cli: &Cli, mut config: ClientConfig) -> Result<ClientConfig, String> {
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.trim().to_string();
    }
    if let Some(path) = &cli.db_path {
        config.db_path = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = usertable_core::logging::normalize_level(level)?;
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(raw) = &cli.timeout_ms {
        config.request_timeout = Some(parse_timeout_ms(raw).map_err(|err| err.to_string())?);
    }
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("field name cannot be empty in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

fn parse_key(raw: &str) -> Result<RecordKey, String> {
    RecordKey::new(raw).ok_or_else(|| "key cannot be empty".to_string())
}

fn report(outcome: &CommandOutcome) {
    match outcome.notification.level {
        NotificationLevel::Success => println!("{}", outcome.notification.message),
        NotificationLevel::Error => eprintln!("{}", outcome.notification.message),
    }
}

fn print_records(records: &[Record]) {
    for record in records {
        let fields = serde_json::to_string(record.fields()).unwrap_or_default();
        println!("{}\t{}", record.key(), fields);
    }
}
