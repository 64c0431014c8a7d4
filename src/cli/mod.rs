//! CLI Module for Genesis
//! A terminal front over the [`Store`]: every command dispatches actions,
//! then renders what the getters expose.

pub mod commands;
pub mod highlight;
pub mod tree;

use colored::Colorize;
use std::error::Error;
use std::path::PathBuf;

use crate::models::{KeyValuePair, ObfuscatorProfile, SnippetAlteration};
use crate::store::Store;

pub(crate) const MARGIN: &str = "┃";

/// Executes CLI commands based on the provided arguments
pub async fn execute_cli(args: &[String], store: &Store) -> Result<(), Box<dyn Error>> {
    if args.is_empty() {
        print_help();
        return Ok(());
    }

    match args[0].as_str() {
        "status" => commands::show_status(store).await?,
        "list" | "ls" => commands::list_snippets(store, args.get(1).map(String::as_str)).await?,
        "show" | "view" => {
            let Some(name_or_id) = args.get(1) else {
                return missing_argument("Missing snippet title or ID", "genesis show <TITLE_OR_ID>");
            };
            commands::show_snippet(store, name_or_id).await?;
        }
        "languages" => commands::list_languages(store).await?,
        "architectures" | "archs" => commands::list_architectures(store).await?,
        "techniques" => commands::list_techniques(store).await?,
        "profiles" => commands::list_profiles(store).await?,
        "tactics" => commands::list_tactics(store, args.get(1).map(String::as_str)).await?,
        "search" => {
            let Some(keyword) = args.get(1) else {
                return missing_argument("Missing search keyword", "genesis search <KEYWORD>");
            };
            commands::search_remote(store, keyword).await?;
        }
        "find" => {
            let Some(query) = args.get(1) else {
                return missing_argument("Missing search query", "genesis find <QUERY>");
            };
            commands::find_local(store, query).await?;
        }
        "add" => {
            let Some(path) = args.get(1) else {
                return missing_argument("Missing snippet description file", "genesis add <FILE.json>");
            };
            commands::add_snippet(store, &PathBuf::from(path)).await?;
        }
        "build" => {
            let Some(snippet_id) = args.get(1) else {
                return missing_argument(
                    "Missing snippet ID",
                    "genesis build <SNIPPET_ID> [--profile P] [--set KEY=VALUE]... [--out FILE]",
                );
            };
            let (alteration, out) = parse_build_options(snippet_id, &args[2..])?;
            commands::build_snippet(store, alteration, out).await?;
        }
        "reload" => commands::reload_catalog(store).await?,
        "help" | "--help" | "-h" => print_help(),
        other => {
            println!("{}  Unknown command: {}", MARGIN.bright_magenta(), other);
            print_help();
        }
    }

    Ok(())
}

fn missing_argument(message: &str, usage: &str) -> Result<(), Box<dyn Error>> {
    println!("{}  Error: {}", MARGIN.bright_magenta(), message);
    println!("{}  Usage: {}", MARGIN.bright_magenta(), usage);
    Ok(())
}

/// Parses the flags that follow `build <SNIPPET_ID>`
fn parse_build_options(
    snippet_id: &str,
    args: &[String],
) -> Result<(SnippetAlteration, Option<PathBuf>), Box<dyn Error>> {
    let mut alteration = SnippetAlteration::new(snippet_id);
    let mut out = None;
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("Flag {flag} expects a value"))?;
        match flag.as_str() {
            "--profile" | "-p" => {
                let profile = ObfuscatorProfile::from_name(value)
                    .ok_or_else(|| format!("Unknown obfuscation profile: {value}"))?;
                alteration = alteration.with_profile(profile);
            }
            "--set" | "-s" => {
                let pair = KeyValuePair::parse(value)
                    .ok_or_else(|| format!("Expected KEY=VALUE, got: {value}"))?;
                alteration = alteration.with_pair(pair);
            }
            "--out" | "-o" => out = Some(PathBuf::from(value)),
            _ => return Err(format!("Unknown flag: {flag}").into()),
        }
    }

    Ok((alteration, out))
}

/// Prints the help message with available commands
fn print_help() {
    let margin = MARGIN.bright_magenta();
    println!("{}  {}", margin, "GENESIS CLI - SNIPPET CATALOG".bold());
    println!("{}  {}", margin, "USAGE:".bright_yellow());
    println!("{}  genesis [COMMAND] [ARGS]", margin);
    println!("{}  {}", margin, "COMMANDS:".bright_yellow());

    let commands = [
        ("status", "Show catalog metrics and server version"),
        ("list, ls [LANGUAGE]", "List snippets grouped by language and architecture"),
        ("show, view <TITLE_OR_ID>", "Display a snippet (partial title works)"),
        ("languages", "List supported languages"),
        ("architectures, archs", "List supported architectures"),
        ("techniques", "List known ATT&CK techniques"),
        ("profiles", "List obfuscation profiles offered for builds"),
        ("tactics [NAME]", "List tactics, or the techniques of one tactic"),
        ("search <KEYWORD>", "Search snippets on the server"),
        ("find <QUERY>", "Filter the loaded catalog locally"),
        ("add <FILE.json>", "Submit a new snippet description"),
        ("build <SNIPPET_ID>", "Generate code (--profile, --set KEY=VALUE, --out FILE)"),
        ("reload", "Ask the server to reload its snippet folder"),
        ("help", "Display this help message"),
    ];
    for (name, description) in commands {
        println!("{}  {:<27} {}", margin, name.bright_white(), description);
    }

    println!("{}  {}", margin, "TIP:".bright_green());
    println!(
        "{}  Point the client at a server with GENESIS_API_URL or ~/.config/genesis/config.toml",
        margin
    );
}
