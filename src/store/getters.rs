//! Read-only projections over [`AppState`].

use crate::client::ApiError;
use crate::models::{
    Architecture, DownloadData, Language, ObfuscatorProfile, Snippet, StatusMessage, Tactic,
    Technique,
};

use super::state::{AppState, SnippetCollection};

pub fn languages(state: &AppState) -> &[Language] {
    &state.languages
}

pub fn techniques(state: &AppState) -> &[Technique] {
    &state.techniques
}

pub fn architectures(state: &AppState) -> &[Architecture] {
    &state.architectures
}

pub fn tactics(state: &AppState) -> &[Tactic] {
    &state.tactics
}

pub fn obfuscator_profiles(state: &AppState) -> &[ObfuscatorProfile] {
    &state.obfuscator_profiles
}

pub fn download_data(state: &AppState) -> &DownloadData {
    &state.download_data
}

pub fn snippets(state: &AppState) -> &SnippetCollection {
    &state.snippets
}

pub fn current_snippet_id(state: &AppState) -> &str {
    &state.current_snippet_id
}

/// The snippet the current id points at, if it is (still) loaded.
pub fn current_snippet(state: &AppState) -> Option<&Snippet> {
    state.snippets.get(&state.current_snippet_id)
}

pub fn search_results(state: &AppState) -> &[Snippet] {
    &state.search_results
}

pub fn status_technique_count(state: &AppState) -> Option<&StatusMessage> {
    state.status_technique_count.as_ref()
}

pub fn status_top_language(state: &AppState) -> Option<&StatusMessage> {
    state.status_top_language.as_ref()
}

pub fn status_top_technique(state: &AppState) -> Option<&StatusMessage> {
    state.status_top_technique.as_ref()
}

pub fn status_version(state: &AppState) -> Option<&StatusMessage> {
    state.status_version.as_ref()
}

pub fn status_snippets(state: &AppState) -> Option<&StatusMessage> {
    state.status_snippets.as_ref()
}

pub fn error(state: &AppState) -> Option<&ApiError> {
    state.error.as_ref()
}

/// Loaded snippets written in `language`, ordered by title.
pub fn snippets_by_language<'a>(state: &'a AppState, language: &Language) -> Vec<&'a Snippet> {
    let mut matches: Vec<_> = state
        .snippets
        .values()
        .filter(|snippet| snippet.language() == Some(language))
        .collect();
    matches.sort_by(|a, b| a.title.cmp(&b.title));
    matches
}
