use colored::Colorize;
use std::collections::BTreeMap;

use super::MARGIN;
use crate::models::{Language, Snippet};
use crate::store::SnippetCollection;

type Grouped<'a> = BTreeMap<String, BTreeMap<String, Vec<&'a Snippet>>>;

/// Displays the catalog as language → architecture → snippet
pub fn display_tree(snippets: &SnippetCollection, language: Option<&Language>) {
    let groups = group(snippets, language);

    if groups.is_empty() {
        match language {
            Some(language) => println!(
                "{}  No {} snippets in the catalog.",
                MARGIN.bright_magenta(),
                language.display_name()
            ),
            None => println!("{}  The catalog is empty.", MARGIN.bright_magenta()),
        }
        return;
    }

    for (language, architectures) in &groups {
        let count: usize = architectures.values().map(Vec::len).sum();
        println!(
            "{}  {} {}",
            MARGIN.bright_magenta(),
            language.bold(),
            format!("({count})").bright_black()
        );

        let arch_count = architectures.len();
        for (a_idx, (architecture, entries)) in architectures.iter().enumerate() {
            let last_arch = a_idx == arch_count - 1;
            println!(
                "{}  {}{}",
                MARGIN.bright_magenta(),
                connector(last_arch),
                architecture.bright_blue()
            );

            for (s_idx, snippet) in entries.iter().enumerate() {
                let last_snippet = s_idx == entries.len() - 1;
                // Keep the architecture's vertical guide while siblings follow.
                let guide = if last_arch { "   " } else { "┃  " };
                println!(
                    "{}  {}{}{} {}",
                    MARGIN.bright_magenta(),
                    guide,
                    connector(last_snippet),
                    snippet.title.bright_white(),
                    short_id(&snippet.id).bright_black().italic()
                );
            }
        }
    }
}

fn group<'a>(snippets: &'a SnippetCollection, language: Option<&Language>) -> Grouped<'a> {
    let mut groups: Grouped<'a> = BTreeMap::new();

    for snippet in snippets.values() {
        if language.is_some() && snippet.language() != language {
            continue;
        }
        let language = snippet
            .language()
            .map(Language::display_name)
            .unwrap_or_else(|| "Unknown".to_string());
        let architecture = snippet
            .architecture()
            .map(|a| a.display_name())
            .unwrap_or_else(|| "Any".to_string());

        groups
            .entry(language)
            .or_default()
            .entry(architecture)
            .or_default()
            .push(snippet);
    }

    for architectures in groups.values_mut() {
        for entries in architectures.values_mut() {
            entries.sort_by(|a, b| a.title.cmp(&b.title));
        }
    }
    groups
}

fn connector(is_last: bool) -> &'static str {
    if is_last { "└── " } else { "├── " }
}

fn short_id(id: &str) -> String {
    id.chars().take(12).collect()
}
