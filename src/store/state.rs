use std::collections::HashMap;

use crate::client::ApiError;
use crate::models::{
    Architecture, DownloadData, Language, ObfuscatorProfile, Snippet, StatusMessage, Tactic,
    Technique,
};

/// Snippets keyed by their id.
pub type SnippetCollection = HashMap<String, Snippet>;

/// Everything the client knows about the remote catalog.
///
/// Only [`Mutation::apply`](super::Mutation::apply) writes to this struct;
/// readers go through the functions in [`getters`](super::getters).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub languages: Vec<Language>,
    pub techniques: Vec<Technique>,
    pub architectures: Vec<Architecture>,
    pub tactics: Vec<Tactic>,
    pub obfuscator_profiles: Vec<ObfuscatorProfile>,
    pub snippets: SnippetCollection,
    /// Not guaranteed to name an entry of `snippets`.
    pub current_snippet_id: String,
    pub search_results: Vec<Snippet>,
    pub download_data: DownloadData,
    pub status_technique_count: Option<StatusMessage>,
    pub status_top_language: Option<StatusMessage>,
    pub status_top_technique: Option<StatusMessage>,
    pub status_version: Option<StatusMessage>,
    pub status_snippets: Option<StatusMessage>,
    /// Most recent failure from any action.
    pub error: Option<ApiError>,
}

impl AppState {
    /// The shape the store starts from: empty lists, no snippets, no
    /// selection, empty download data, no metrics and no error.
    pub fn initial() -> Self {
        Self::default()
    }
}
