//! Quill CLI - run Markdown command documents against a metadata catalog.
//!
//! - `quill FILE` processes a document (`--directive` picks display,
//!   validate or process)
//! - `quill commands` lists the commands a document may use
//! - `quill init` writes a default `quill.toml`

mod commands;
mod format;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::ArgMatches;

use quill_catalog::{Credentials, HttpCatalog, MemoryCatalog};
use quill_core::{CatalogClient, Directive};
use quill_engine::{CatalogConfig, CommandTable, QuillConfig, CONFIG_FILE_NAME};
use quill_executor::{DocumentProcessor, Executor, Registry};

use commands::build_cli;
use format::{format_commands, format_error, format_report, OutputMode};

fn main() {
    let mut cli = build_cli();
    let matches = cli.clone().get_matches();
    init_logging(matches.get_count("verbose"));

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let result = match matches.subcommand() {
        Some(("init", _)) => run_init(&matches),
        Some(("commands", sub)) => run_commands(&matches, sub, mode),
        _ => match matches.get_one::<String>("file") {
            Some(file) => run_document(&matches, Path::new(file), mode),
            None => {
                let _ = cli.print_help();
                process::exit(2);
            }
        },
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .init();
}

fn config_path(matches: &ArgMatches) -> (PathBuf, bool) {
    match matches.get_one::<String>("config") {
        Some(p) => (PathBuf::from(p), true),
        None => (PathBuf::from(CONFIG_FILE_NAME), false),
    }
}

/// Load the config file and apply command-line overrides.
fn load_config(matches: &ArgMatches) -> Result<QuillConfig> {
    let (path, explicit) = config_path(matches);
    let mut config = if explicit {
        QuillConfig::from_file(&path)?
    } else {
        QuillConfig::load_or_default(&path)?
    };
    if let Some(level) = matches.try_get_one::<String>("usage-level").ok().flatten() {
        config.usage_level = level.clone();
        config.usage_level()?;
    }
    if let Some(dir) = matches.try_get_one::<String>("output-dir").ok().flatten() {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(config)
}

fn load_table(config: &QuillConfig) -> Result<CommandTable> {
    CommandTable::load(config.commands.as_deref()).context("loading the command table")
}

fn http_catalog(config: &CatalogConfig) -> HttpCatalog {
    let credentials = match (&config.token, &config.password) {
        (Some(token), _) => Credentials::Token(token.clone()),
        (None, Some(password)) => Credentials::Basic {
            user: config.user.clone(),
            password: password.clone(),
        },
        (None, None) => Credentials::Anonymous,
    };
    HttpCatalog::new(
        &config.endpoint,
        &config.server,
        &config.user,
        credentials,
        config.timeout(),
    )
}

/// The catalog a pass runs against.
///
/// `--offline` and display passes without a configured catalog get an empty
/// in-memory one; validate and process need a real catalog otherwise.
fn open_catalog(config: &QuillConfig, offline: bool, directive: Directive) -> Result<Box<dyn CatalogClient>> {
    if offline {
        tracing::info!(target: "quill::cli", "Offline: using an empty in-memory catalog");
        return Ok(Box::new(MemoryCatalog::new()));
    }
    match &config.catalog {
        Some(c) => {
            tracing::info!(target: "quill::cli", endpoint = %c.endpoint, server = %c.server, "Using remote catalog");
            Ok(Box::new(http_catalog(c)))
        }
        None if directive == Directive::Display => Ok(Box::new(MemoryCatalog::new())),
        None => bail!(
            "no [catalog] section in {}; add one or pass --offline",
            CONFIG_FILE_NAME
        ),
    }
}

fn run_document(matches: &ArgMatches, path: &Path, mode: OutputMode) -> Result<i32> {
    let directive: Directive = matches
        .get_one::<String>("directive")
        .map(String::as_str)
        .unwrap_or("process")
        .parse()?;
    let config = load_config(matches)?;
    let table = load_table(&config)?;
    let catalog = open_catalog(&config, matches.get_flag("offline"), directive)?;

    let executor = Executor::new(&table, &*catalog)?;
    let processor = DocumentProcessor::from_config(executor, directive, &config)?;
    let report = processor
        .process_file(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let source = path.display().to_string();
    match mode {
        OutputMode::Json => println!("{}", format_report(&report, &source, mode)),
        OutputMode::Human => eprintln!("{}", format_report(&report, &source, mode)),
    }

    if report.should_persist() {
        let now = chrono::Local::now().naive_local();
        let written = report
            .write(&config.output_dir, path, now)
            .with_context(|| format!("writing to {}", config.output_dir.display()))?;
        eprintln!("Wrote {}", written.display());
    } else if mode == OutputMode::Human {
        print!("{}", report.output);
    }

    Ok(if report.failed() > 0 { 1 } else { 0 })
}

fn run_commands(matches: &ArgMatches, sub: &ArgMatches, mode: OutputMode) -> Result<i32> {
    let config = load_config(matches)?;
    let registry = Registry::from_table(&load_table(&config)?)?;
    println!("{}", format_commands(&registry, sub.get_flag("all"), mode));
    Ok(0)
}

fn run_init(matches: &ArgMatches) -> Result<i32> {
    let (path, _) = config_path(matches);
    if QuillConfig::write_default_if_missing(&path)? {
        eprintln!("Wrote {}", path.display());
    } else {
        eprintln!("{} already exists; left unchanged", path.display());
    }
    Ok(0)
}
