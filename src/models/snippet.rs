use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::{Architecture, Language, Technique};

/// A catalog entry as served by `GET /snippets`.
///
/// The id is assigned by the server (a SHA-256 of the snippet's metadata)
/// and is the only field the client relies on; everything else defaults when
/// absent so that partially filled records still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub alterators: Vec<KeyValuePair>,
    #[serde(default, rename = "classObject", skip_serializing_if = "Option::is_none")]
    pub class_object: Option<ClassObject>,
}

/// The code body of a snippet together with its tag associations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Architecture>,
    #[serde(default)]
    pub techniques: Vec<Technique>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub variables: Value,
    #[serde(default)]
    pub functions: Value,
}

/// A placeholder in a snippet's code and the value it should be replaced with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parses `KEY=VALUE`; the value may itself contain `=`.
    pub fn parse(pair: &str) -> Option<Self> {
        let (key, value) = pair.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key, value))
    }
}

/// Obfuscation strength requested from the build endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObfuscatorProfile {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl ObfuscatorProfile {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Name as it appears on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// Body of `POST /build`: which snippet to generate and how to fill it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetAlteration {
    #[serde(rename = "snippetId")]
    pub snippet_id: String,
    pub profile: ObfuscatorProfile,
    #[serde(rename = "keyValuePairs", default)]
    pub key_value_pairs: Vec<KeyValuePair>,
}

impl SnippetAlteration {
    pub fn new(snippet_id: impl Into<String>) -> Self {
        Self {
            snippet_id: snippet_id.into(),
            profile: ObfuscatorProfile::default(),
            key_value_pairs: Vec::new(),
        }
    }

    pub fn with_profile(mut self, profile: ObfuscatorProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_pair(mut self, pair: KeyValuePair) -> Self {
        self.key_value_pairs.push(pair);
        self
    }
}

/// Body of `POST /snippets/create`, in the layout the server's snippet
/// loader reads: descriptive fields under `information`, code under `class`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSnippet {
    pub information: SnippetInformation,
    #[serde(rename = "class")]
    pub class: SnippetClass,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetInformation {
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: String,
}

/// Language-specific part of a new snippet. `variables` maps a variable
/// name to its type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetClass {
    pub language: String,
    pub architecture: String,
    #[serde(default)]
    pub techniques: Vec<String>,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl NewSnippet {
    pub fn new(title: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            information: SnippetInformation {
                title: title.into(),
                ..SnippetInformation::default()
            },
            class: SnippetClass {
                language: language.into(),
                ..SnippetClass::default()
            },
        }
    }
}

impl Snippet {
    pub fn language(&self) -> Option<&Language> {
        self.class_object.as_ref()?.language.as_ref()
    }

    pub fn architecture(&self) -> Option<&Architecture> {
        self.class_object.as_ref()?.architecture.as_ref()
    }

    pub fn techniques(&self) -> &[Technique] {
        self.class_object
            .as_ref()
            .map(|class| class.techniques.as_slice())
            .unwrap_or_default()
    }

    /// Keys the build endpoint expects values for.
    pub fn alterator_keys(&self) -> impl Iterator<Item = &str> {
        self.alterators.iter().map(|pair| pair.key.as_str())
    }
}
