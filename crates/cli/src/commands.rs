//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("quill")
        .about("Apply Markdown command documents to a metadata catalog")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(false)
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Markdown document to process"),
        )
        .arg(
            Arg::new("directive")
                .long("directive")
                .short('d')
                .help("What to do with each command block")
                .value_parser(["display", "validate", "process"])
                .default_value("process"),
        )
        .arg(
            Arg::new("usage-level")
                .long("usage-level")
                .help("Attribute visibility (overrides the config file)")
                .value_parser(["basic", "advanced", "expert", "invisible"]),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .help("Use an empty in-memory catalog instead of the configured one")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .short('o')
                .value_name("DIR")
                .help("Where processed documents are written (overrides the config file)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("Config file (default: ./quill.toml)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON summaries instead of human-readable ones")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("More log output on stderr (repeat for more)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(build_commands())
        .subcommand(build_init())
}

fn build_commands() -> Command {
    Command::new("commands")
        .about("List the commands documents may use")
        .arg(
            Arg::new("all")
                .long("all")
                .help("Also list every alternate name")
                .action(ArgAction::SetTrue),
        )
}

fn build_init() -> Command {
    Command::new("init").about("Write a default quill.toml if none exists")
}
