use crate::models::Snippet;
use crate::store::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Title,
    Description,
    Author,
    Technique,
}

impl MatchKind {
    pub fn label(&self) -> &'static str {
        match self {
            MatchKind::Title => "title",
            MatchKind::Description => "description",
            MatchKind::Author => "author",
            MatchKind::Technique => "technique",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub snippet: &'a Snippet,
    pub kind: MatchKind,
    pub context: String,
}

/// Case-insensitive search over the loaded catalog.
/// Each snippet appears at most once, under its strongest match; hits are
/// ordered by match kind, then title.
pub fn filter_snippets<'a>(state: &'a AppState, query: &str) -> Vec<SearchHit<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<_> = state
        .snippets
        .values()
        .filter_map(|snippet| match_snippet(snippet, &query))
        .collect();

    hits.sort_by(|a, b| {
        rank(a.kind)
            .cmp(&rank(b.kind))
            .then_with(|| a.snippet.title.cmp(&b.snippet.title))
    });
    hits
}

fn match_snippet<'a>(snippet: &'a Snippet, query: &str) -> Option<SearchHit<'a>> {
    let hit = |kind, context: String| SearchHit {
        snippet,
        kind,
        context,
    };

    if snippet.title.to_lowercase().contains(query) {
        return Some(hit(MatchKind::Title, snippet.title.clone()));
    }

    if snippet.description.to_lowercase().contains(query) {
        return Some(hit(MatchKind::Description, snippet.description.clone()));
    }

    if snippet.author.to_lowercase().contains(query) {
        return Some(hit(MatchKind::Author, format!("by {}", snippet.author)));
    }

    snippet
        .techniques()
        .iter()
        .find(|technique| technique.as_str().to_lowercase().contains(query))
        .map(|technique| hit(MatchKind::Technique, technique.display_name()))
}

fn rank(kind: MatchKind) -> u8 {
    match kind {
        MatchKind::Title => 0,
        MatchKind::Description => 1,
        MatchKind::Author => 2,
        MatchKind::Technique => 3,
    }
}
