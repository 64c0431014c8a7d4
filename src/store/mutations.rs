use crate::client::ApiError;
use crate::models::{
    Architecture, DownloadData, Language, ObfuscatorProfile, Snippet, StatusMessage, Tactic,
    Technique,
};

use super::state::{AppState, SnippetCollection};

/// A named, synchronous write to [`AppState`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetLanguages(Vec<Language>),
    SetTechniques(Vec<Technique>),
    SetArchitectures(Vec<Architecture>),
    SetTactics(Vec<Tactic>),
    SetObfuscatorProfiles(Vec<ObfuscatorProfile>),
    /// Replaces the whole collection; nothing from the previous one survives.
    SetSnippets(Vec<Snippet>),
    SetCurrentSnippetId(String),
    SetSearchResults(Vec<Snippet>),
    SetDownloadData(DownloadData),
    SetStatusTechniqueCount(StatusMessage),
    SetStatusTopLanguage(StatusMessage),
    SetStatusTopTechnique(StatusMessage),
    SetStatusVersion(StatusMessage),
    SetStatusSnippets(StatusMessage),
    Error(ApiError),
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetLanguages(_) => "setLanguages",
            Mutation::SetTechniques(_) => "setTechniques",
            Mutation::SetArchitectures(_) => "setArchitectures",
            Mutation::SetTactics(_) => "setTactics",
            Mutation::SetObfuscatorProfiles(_) => "setObfuscatorProfiles",
            Mutation::SetSnippets(_) => "setSnippets",
            Mutation::SetCurrentSnippetId(_) => "setCurrentSnippetId",
            Mutation::SetSearchResults(_) => "setSearchResults",
            Mutation::SetDownloadData(_) => "setDownloadData",
            Mutation::SetStatusTechniqueCount(_) => "setStatusTechniqueCount",
            Mutation::SetStatusTopLanguage(_) => "setStatusTopLanguage",
            Mutation::SetStatusTopTechnique(_) => "setStatusTopTechnique",
            Mutation::SetStatusVersion(_) => "setStatusVersion",
            Mutation::SetStatusSnippets(_) => "setStatusSnippets",
            Mutation::Error(_) => "error",
        }
    }

    pub fn apply(self, state: &mut AppState) {
        match self {
            Mutation::SetLanguages(languages) => state.languages = languages,
            Mutation::SetTechniques(techniques) => state.techniques = techniques,
            Mutation::SetArchitectures(architectures) => state.architectures = architectures,
            Mutation::SetTactics(tactics) => state.tactics = tactics,
            Mutation::SetObfuscatorProfiles(profiles) => state.obfuscator_profiles = profiles,
            Mutation::SetSnippets(snippets) => state.snippets = index_by_id(snippets),
            Mutation::SetCurrentSnippetId(id) => state.current_snippet_id = id,
            Mutation::SetSearchResults(results) => state.search_results = results,
            Mutation::SetDownloadData(data) => state.download_data = data,
            Mutation::SetStatusTechniqueCount(m) => state.status_technique_count = Some(m),
            Mutation::SetStatusTopLanguage(m) => state.status_top_language = Some(m),
            Mutation::SetStatusTopTechnique(m) => state.status_top_technique = Some(m),
            Mutation::SetStatusVersion(m) => state.status_version = Some(m),
            Mutation::SetStatusSnippets(m) => state.status_snippets = Some(m),
            Mutation::Error(err) => state.error = Some(err),
        }
    }
}

/// Later records win when ids repeat.
fn index_by_id(snippets: Vec<Snippet>) -> SnippetCollection {
    snippets
        .into_iter()
        .map(|snippet| (snippet.id.clone(), snippet))
        .collect()
}
