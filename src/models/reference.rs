use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a transparent newtype over one of the server's enum names.
macro_rules! tag_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_string())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

tag_type!(
    /// Snippet language, e.g. `VBA` or `POWERSHELL`.
    Language
);
tag_type!(
    /// Target platform, e.g. `WINDOWS_10_X64`.
    Architecture
);
tag_type!(
    /// MITRE ATT&CK technique name, e.g. `SpearphishingAttachment`.
    Technique
);

impl Language {
    pub fn display_name(&self) -> String {
        match self.0.as_str() {
            "VBA" => "VBA".to_string(),
            "POWERSHELL" => "PowerShell".to_string(),
            "JAVASCRIPT" => "JavaScript".to_string(),
            other => title_case(other),
        }
    }

    /// File extension used to pick a syntax for generated code.
    pub fn file_extension(&self) -> &'static str {
        match self.0.as_str() {
            "VBA" => "vb",
            "POWERSHELL" => "ps1",
            "JAVASCRIPT" => "js",
            _ => "txt",
        }
    }
}

impl Architecture {
    /// `WINDOWS_10_X64` becomes `Windows 10 x64`.
    pub fn display_name(&self) -> String {
        self.0
            .split('_')
            .map(|part| match part {
                "X86" | "X64" => part.to_lowercase(),
                "MACOS" => "macOS".to_string(),
                "XP" => "XP".to_string(),
                "81" => "8.1".to_string(),
                _ => title_case(part),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Technique {
    /// `SpearphishingAttachment` becomes `Spearphishing Attachment`.
    pub fn display_name(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 8);
        let mut prev_lower = false;
        for ch in self.0.chars() {
            if ch.is_uppercase() && prev_lower {
                out.push(' ');
            }
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
        out
    }
}

/// An ATT&CK tactic and the techniques grouped under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tactic {
    pub name: String,
    #[serde(default)]
    pub techniques: Vec<Technique>,
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
