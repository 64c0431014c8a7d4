pub mod reference;
pub mod snippet;
pub mod status;

pub use reference::{Architecture, Language, Tactic, Technique};
pub use snippet::{
    ClassObject, KeyValuePair, NewSnippet, ObfuscatorProfile, Snippet, SnippetAlteration, SnippetClass,
    SnippetInformation,
};
pub use status::{DownloadData, StatusMessage};
