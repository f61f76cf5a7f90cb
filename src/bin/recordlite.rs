use clap::{Parser, Subcommand};
use recordlite::cli::{self as prog_cli, Command, Session};
use recordlite::config::AppConfig;
use recordlite::service::RecordService;
use recordlite::store::MemoryStore;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "recordlite", version, about = "Versioned record store CLI", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). If omitted, the usual locations are searched.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Override the WAL path. Takes precedence over config/env.")]
    db: Option<PathBuf>,
    #[arg(long, help = "Username stamped into audit fields (default ANONYMOUS)")]
    user: Option<String>,
    #[arg(long, help = "Output format: human|plain|json (default human)")]
    format: Option<String>,
    #[arg(long, help = "Write logs to this directory instead of the log4rs config")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Insert a record from a JSON object")]
    Insert {
        #[arg(help = "Record JSON, e.g. {\"name\":\"alice\"}")]
        json: String,
    },
    #[command(about = "Fetch one record by id")]
    Get {
        #[arg(help = "24-hex-character record id")]
        id: String,
    },
    #[command(about = "Search records with query parameters")]
    Find {
        #[arg(default_value = "", help = "Query string, e.g. createdOn=2020-01-01&sortBy=createdTs&sortOrder=desc")]
        query: String,
    },
    #[command(about = "Count records matching query parameters")]
    Count {
        #[arg(default_value = "", help = "Query string; page/count/sort keys are ignored")]
        query: String,
    },
    #[command(about = "Update a record; the JSON must carry the version last read")]
    Update {
        #[arg(help = "24-hex-character record id")]
        id: String,
        #[arg(help = "Record JSON including \"version\"")]
        json: String,
    },
    #[command(about = "Delete a record by id")]
    Delete {
        #[arg(help = "24-hex-character record id")]
        id: String,
    },
}

impl From<Commands> for Command {
    fn from(c: Commands) -> Self {
        match c {
            Commands::Insert { json } => Self::Insert { json },
            Commands::Get { id } => Self::Get { id },
            Commands::Find { query } => Self::Find { query },
            Commands::Count { query } => Self::Count { query },
            Commands::Update { id, json } => Self::Update { id, json },
            Commands::Delete { id } => Self::Delete { id },
        }
    }
}

fn init_logging(cfg: &AppConfig) {
    let result = match &cfg.log_config {
        Some(path) if cfg.log_dir.is_none() => recordlite::logger::init_file(path),
        _ => recordlite::logger::configure_logging(cfg.log_dir.as_deref(), cfg.log_level.as_deref(), cfg.log_retention),
    };
    if let Err(e) = result {
        eprintln!("warning: logging disabled: {e}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut cfg = AppConfig::load(cli.config.as_deref());
    cfg.overlay(AppConfig {
        db_path: cli.db,
        log_dir: cli.log_dir,
        log_level: cli.log_level,
        user: cli.user,
        ..AppConfig::default()
    });
    init_logging(&cfg);

    let store = match MemoryStore::open(cfg.db_path()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot open {}: {e}", cfg.db_path().display());
            return ExitCode::FAILURE;
        }
    };
    let service = RecordService::new(store);
    let user = cfg.acting_user();
    let session = Session { service: &service, user: &user, base_path: cfg.base_path() };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mode = prog_cli::parse_output_mode(cli.format.as_deref());
    match prog_cli::run_with_format(&session, cli.command.into(), mode, &mut out) {
        Ok(()) => {
            let _ = out.flush();
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("command failed: {e}");
            eprintln!("error: {e}");
            if e.is_conflict() { ExitCode::from(3) } else { ExitCode::FAILURE }
        }
    }
}
