use colored::Colorize;
use std::error::Error;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use super::{MARGIN, highlight, tree};
use crate::models::{
    DownloadData, Language, NewSnippet, ObfuscatorProfile, Snippet, SnippetAlteration, StatusMessage,
};
use crate::search;
use crate::store::{Store, getters};

/// Loads the whole catalog and prints the aggregate metrics
pub async fn show_status(store: &Store) -> Result<(), Box<dyn Error>> {
    store.retrieve_all().await?;
    store.retrieve_status_top_technique().await?;

    let state = store.snapshot();
    let metric = |value: Option<&StatusMessage>| {
        value
            .map(|m| m.message.clone())
            .unwrap_or_else(|| "-".to_string())
    };

    println!(
        "{}  {}",
        MARGIN.bright_magenta(),
        "GENESIS STATUS".bright_green().bold()
    );
    println!("{}", "─".repeat(60).bright_magenta());

    let rows = vec![
        ("Version", metric(getters::status_version(&state))),
        ("Snippets", metric(getters::status_snippets(&state))),
        ("Techniques used", metric(getters::status_technique_count(&state))),
        ("Top language", metric(getters::status_top_language(&state))),
        ("Top technique", metric(getters::status_top_technique(&state))),
        ("Languages", getters::languages(&state).len().to_string()),
        ("Architectures", getters::architectures(&state).len().to_string()),
        ("Known techniques", getters::techniques(&state).len().to_string()),
    ];

    for (label, value) in rows {
        println!(
            "{}  {:<18} {}",
            MARGIN.bright_magenta(),
            label.bright_blue(),
            value.bright_white()
        );
    }
    Ok(())
}

/// Lists the catalog as a tree, optionally narrowed to one language
pub async fn list_snippets(store: &Store, language: Option<&str>) -> Result<(), Box<dyn Error>> {
    store.retrieve_snippets().await?;
    let state = store.snapshot();
    let filter = language.map(|name| Language::from(name.to_uppercase()));
    tree::display_tree(getters::snippets(&state), filter.as_ref());
    Ok(())
}

/// Shows a snippet by ID (or ID prefix) or title
pub async fn show_snippet(store: &Store, name_or_id: &str) -> Result<(), Box<dyn Error>> {
    store.retrieve_snippets().await?;

    let found = store.read(|state| find_snippet_id(getters::snippets(state).values(), name_or_id));
    let Some(id) = found else {
        println!(
            "{}  No snippet found matching: {}",
            MARGIN.bright_magenta(),
            name_or_id
        );
        return Ok(());
    };

    store.select_snippet(id);
    match store.read(|state| getters::current_snippet(state).cloned()) {
        Some(snippet) => display_snippet(&snippet),
        None => println!(
            "{}  Snippet disappeared while loading: {}",
            MARGIN.bright_magenta(),
            name_or_id
        ),
    }
    Ok(())
}

/// Exact id, then id prefix, then exact title, then partial title
fn find_snippet_id<'a>(
    snippets: impl Iterator<Item = &'a Snippet> + Clone,
    name_or_id: &str,
) -> Option<String> {
    let needle = name_or_id.to_lowercase();
    let mut all = snippets;

    all.clone()
        .find(|s| s.id == name_or_id)
        .or_else(|| all.clone().find(|s| s.id.starts_with(&needle)))
        .or_else(|| all.clone().find(|s| s.title.to_lowercase() == needle))
        .or_else(|| all.find(|s| s.title.to_lowercase().contains(&needle)))
        .map(|s| s.id.clone())
}

fn display_snippet(snippet: &Snippet) {
    let margin = MARGIN.bright_magenta();
    println!(
        "{}  {} {}",
        margin,
        "SNIPPET".bright_green().bold(),
        snippet.title.bold()
    );
    println!("{}", "─".repeat(60).bright_magenta());

    if let Some(language) = snippet.language() {
        println!(
            "{}  {}: {}",
            margin,
            "Language".bright_yellow(),
            language.display_name()
        );
    }
    if let Some(architecture) = snippet.architecture() {
        println!(
            "{}  {}: {}",
            margin,
            "Architecture".bright_blue(),
            architecture.display_name()
        );
    }
    if !snippet.description.is_empty() {
        println!(
            "{}  {}: {}",
            margin,
            "Description".bright_cyan(),
            snippet.description
        );
    }
    println!("{}  {}: {}", margin, "Author".bright_white(), snippet.author);
    println!("{}  {}: {}", margin, "Date".bright_white(), snippet.date);

    let techniques: Vec<_> = snippet.techniques().iter().map(|t| t.display_name()).collect();
    if !techniques.is_empty() {
        println!(
            "{}  {}: {}",
            margin,
            "Techniques".bright_red(),
            techniques.join(", ")
        );
    }

    let keys: Vec<_> = snippet.alterator_keys().collect();
    if !keys.is_empty() {
        println!(
            "{}  {}: {}",
            margin,
            "Build values".bright_green(),
            keys.join(", ")
        );
    }
    println!("{}  {}: {}", margin, "ID".bright_black(), snippet.id);
}

pub async fn list_languages(store: &Store) -> Result<(), Box<dyn Error>> {
    store.retrieve_languages().await?;
    let names = store.read(|state| {
        getters::languages(state)
            .iter()
            .map(|l| (l.display_name(), l.to_string()))
            .collect::<Vec<_>>()
    });
    print_numbered("LANGUAGES", names);
    Ok(())
}

pub async fn list_architectures(store: &Store) -> Result<(), Box<dyn Error>> {
    store.retrieve_architectures().await?;
    let names = store.read(|state| {
        getters::architectures(state)
            .iter()
            .map(|a| (a.display_name(), a.to_string()))
            .collect::<Vec<_>>()
    });
    print_numbered("ARCHITECTURES", names);
    Ok(())
}

pub async fn list_techniques(store: &Store) -> Result<(), Box<dyn Error>> {
    store.retrieve_techniques().await?;
    let names = store.read(|state| {
        getters::techniques(state)
            .iter()
            .map(|t| (t.display_name(), t.to_string()))
            .collect::<Vec<_>>()
    });
    print_numbered("TECHNIQUES", names);
    Ok(())
}

/// Lists the obfuscation profiles the server offers for builds
pub async fn list_profiles(store: &Store) -> Result<(), Box<dyn Error>> {
    store.retrieve_obfuscator_profiles().await?;
    let names = store.read(|state| {
        getters::obfuscator_profiles(state)
            .iter()
            .map(|p| (format!("{p:?}"), p.name().to_string()))
            .collect::<Vec<_>>()
    });
    print_numbered("OBFUSCATOR PROFILES", names);
    Ok(())
}

/// Without a name lists every tactic, otherwise the techniques of that tactic
pub async fn list_tactics(store: &Store, name: Option<&str>) -> Result<(), Box<dyn Error>> {
    match name {
        Some(name) => {
            let techniques = store.retrieve_tactic(name).await?;
            let names = techniques
                .iter()
                .map(|t| (t.display_name(), t.to_string()))
                .collect();
            print_numbered(&format!("TACTIC {}", name.to_uppercase()), names);
        }
        None => {
            store.retrieve_tactics().await?;
            let names = store.read(|state| {
                getters::tactics(state)
                    .iter()
                    .map(|t| (t.name.clone(), format!("{} techniques", t.techniques.len())))
                    .collect::<Vec<_>>()
            });
            print_numbered("TACTICS", names);
        }
    }
    Ok(())
}

fn print_numbered(title: &str, rows: Vec<(String, String)>) {
    println!("{}  {}", MARGIN.bright_magenta(), title.bold());
    if rows.is_empty() {
        println!("{}  Nothing to show.", MARGIN.bright_magenta());
        return;
    }
    for (idx, (name, detail)) in rows.iter().enumerate() {
        println!(
            "{}  {}. {} {}",
            MARGIN.bright_magenta(),
            (idx + 1).to_string().bright_yellow(),
            name.bright_white(),
            format!("[{detail}]").bright_black().italic()
        );
    }
}

/// Runs the server-side keyword search
pub async fn search_remote(store: &Store, keyword: &str) -> Result<(), Box<dyn Error>> {
    store.search_snippets(keyword).await?;
    let results = store.read(|state| getters::search_results(state).to_vec());

    println!(
        "{}  {} '{}'",
        MARGIN.bright_magenta(),
        "SEARCH RESULTS FOR".bold(),
        keyword.bright_white()
    );
    if results.is_empty() {
        println!("{}  No snippets found.", MARGIN.bright_magenta());
        return Ok(());
    }
    for (idx, snippet) in results.iter().enumerate() {
        print_result(idx, results.len(), snippet, None);
    }
    Ok(())
}

/// Filters the freshly loaded catalog without a server-side search
pub async fn find_local(store: &Store, query: &str) -> Result<(), Box<dyn Error>> {
    store.retrieve_snippets().await?;
    let state = store.snapshot();
    let hits = search::filter_snippets(&state, query);

    println!(
        "{}  {} '{}'",
        MARGIN.bright_magenta(),
        "MATCHES FOR".bold(),
        query.bright_white()
    );
    if hits.is_empty() {
        println!("{}  No snippets found matching: {}", MARGIN.bright_magenta(), query);
        return Ok(());
    }
    for (idx, hit) in hits.iter().enumerate() {
        let detail = format!("{}: {}", hit.kind.label(), hit.context);
        print_result(idx, hits.len(), hit.snippet, Some(detail.as_str()));
    }
    Ok(())
}

fn print_result(idx: usize, total: usize, snippet: &Snippet, detail: Option<&str>) {
    let margin = MARGIN.bright_magenta();
    println!(
        "{}  {}. {}",
        margin,
        (idx + 1).to_string().bright_yellow(),
        snippet.title.bright_white().bold()
    );
    if let Some(detail) = detail {
        println!("{}     {}: {}", margin, "Match".bright_green(), detail);
    }
    println!("{}     {}: {}", margin, "ID".bright_black(), snippet.id);
    if idx + 1 < total {
        println!("{}  {}", margin, "─".repeat(40).bright_black());
    }
}

/// Submits the JSON snippet description stored at `path`
pub async fn add_snippet(store: &Store, path: &Path) -> Result<(), Box<dyn Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let description: NewSnippet = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not a snippet description: {e}", path.display()))?;

    store.add_new_snippet(&description).await?;
    println!(
        "{}  {} {}",
        MARGIN.bright_magenta(),
        "Snippet submitted:".bright_green(),
        path.display()
    );
    Ok(())
}

/// Generates code for a snippet and prints it or writes it to `out`
pub async fn build_snippet(
    store: &Store,
    alteration: SnippetAlteration,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    store.retrieve_obfuscator_profiles().await?;
    let offered = store.read(|state| getters::obfuscator_profiles(state).to_vec());
    ensure_profile_offered(&offered, alteration.profile)?;

    store.create_snippet(&alteration).await?;
    let text = match store.read(|state| getters::download_data(state).clone()) {
        DownloadData::Text(text) => text,
        DownloadData::Record(value) => serde_json::to_string_pretty(&value)?,
    };

    if let Some(path) = out {
        fs::write(&path, &text)?;
        println!(
            "{}  {} {}",
            MARGIN.bright_magenta(),
            "Build written to".bright_green(),
            path.display()
        );
        return Ok(());
    }

    if std::io::stdout().is_terminal() {
        // Best effort: the language only picks the highlighting.
        let language = store
            .retrieve_snippet(&alteration.snippet_id)
            .await
            .ok()
            .and_then(|s| s.language().cloned());
        print!("{}", highlight::highlight(&text, language.as_ref()));
    } else {
        print!("{text}");
    }
    Ok(())
}

pub async fn reload_catalog(store: &Store) -> Result<(), Box<dyn Error>> {
    store.reload_catalog().await?;
    store.retrieve_snippets().await?;
    let count = store.read(|state| getters::snippets(state).len());
    println!(
        "{}  {} {} snippets loaded",
        MARGIN.bright_magenta(),
        "Catalog reloaded:".bright_green(),
        count
    );
    Ok(())
}

fn ensure_profile_offered(offered: &[ObfuscatorProfile], wanted: ObfuscatorProfile) -> Result<(), String> {
    if offered.contains(&wanted) {
        return Ok(());
    }
    let names: Vec<_> = offered.iter().map(|p| p.name()).collect();
    Err(format!(
        "Profile {} is not offered by the server (available: {})",
        wanted.name(),
        names.join(", ")
    ))
}
