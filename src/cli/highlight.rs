use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};

use crate::models::Language;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";

/// Renders generated code with terminal colour escapes.
/// Falls back to the plain text when no syntax or theme matches.
pub fn highlight(code: &str, language: Option<&Language>) -> String {
    let extension = match language.map(Language::file_extension) {
        Some(extension) if extension != "txt" => extension,
        _ => return code.to_string(),
    };
    let Some(syntax) = SYNTAX_SET.find_syntax_by_extension(extension) else {
        return code.to_string();
    };
    let Some(theme) = THEME_SET.themes.get(THEME) else {
        return code.to_string();
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut out = String::with_capacity(code.len() * 2);
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
            Err(_) => out.push_str(line),
        }
    }
    out.push_str("\x1b[0m");
    out
}
