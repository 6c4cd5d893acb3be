//! Language detection and per-language lexical rules.

use std::path::Path;
use std::str::FromStr;

use crate::SyntaxError;

/// Languages the tokenizer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    TypeScript,
    JavaScript,
    Markdown,
    Json,
    /// Anything else: no tokens
    #[default]
    PlainText,
}

impl Language {
    /// Infers the language from a filename's extension.
    ///
    /// Unknown or missing extensions (and a missing filename) map to
    /// [`Language::PlainText`].
    pub fn from_filename(filename: Option<&str>) -> Self {
        let Some(name) = filename else {
            return Language::PlainText;
        };
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("ts" | "tsx" | "mts" | "cts") => Language::TypeScript,
            Some("js" | "jsx" | "mjs" | "cjs") => Language::JavaScript,
            Some("md" | "markdown") => Language::Markdown,
            Some("json") => Language::Json,
            _ => Language::PlainText,
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Markdown => "markdown",
            Language::Json => "json",
            Language::PlainText => "plaintext",
        }
    }

    /// Returns supported languages.
    pub fn supported() -> &'static [Language] {
        &[
            Language::TypeScript,
            Language::JavaScript,
            Language::Markdown,
            Language::Json,
        ]
    }

    pub(crate) fn rules(&self) -> Option<&'static CodeRules> {
        match self {
            Language::TypeScript | Language::JavaScript => Some(&SCRIPT_RULES),
            Language::Json => Some(&JSON_RULES),
            Language::Markdown | Language::PlainText => None,
        }
    }
}

impl FromStr for Language {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Ok(Language::TypeScript),
            "javascript" | "js" => Ok(Language::JavaScript),
            "markdown" | "md" => Ok(Language::Markdown),
            "json" => Ok(Language::Json),
            "plaintext" | "text" | "none" => Ok(Language::PlainText),
            _ => Err(SyntaxError::UnknownLanguage(s.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lexical rules for C-family languages.
#[derive(Debug)]
pub(crate) struct CodeRules {
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub string_delims: &'static [char],
    pub keywords: &'static [&'static str],
    pub types: &'static [&'static str],
    /// Operator lexemes of length 1 to 3
    pub operators: &'static [&'static str],
    /// Strings directly followed by `:` are object keys (JSON)
    pub keys_as_types: bool,
}

const SCRIPT_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "declare", "default", "delete", "do", "else", "enum", "export", "extends",
    "false", "finally", "for", "from", "function", "get", "if", "implements", "import", "in",
    "instanceof", "interface", "keyof", "let", "namespace", "new", "null", "of", "private",
    "protected", "public", "readonly", "return", "set", "static", "super", "switch", "this",
    "throw", "true", "try", "type", "typeof", "undefined", "var", "void", "while", "with",
    "yield",
];

const SCRIPT_TYPES: &[&str] = &[
    "any", "bigint", "boolean", "never", "number", "object", "string", "symbol", "unknown",
    "Array", "Date", "Error", "Map", "Promise", "Record", "RegExp", "Set",
];

const SCRIPT_OPERATORS: &[&str] = &[
    "===", "!==", "**=", "...", "<<=", ">>=", ">>>", "&&=", "||=", "??=",
    "==", "!=", "<=", ">=", "=>", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=",
    "%=", "**", "<<", ">>", "&=", "|=", "^=",
    "+", "-", "*", "/", "%", "=", "<", ">", "!", "&", "|", "^", "~", "?", ":", ";", ",", ".",
    "(", ")", "{", "}", "[", "]",
];

static SCRIPT_RULES: CodeRules = CodeRules {
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    string_delims: &['"', '\'', '`'],
    keywords: SCRIPT_KEYWORDS,
    types: SCRIPT_TYPES,
    operators: SCRIPT_OPERATORS,
    keys_as_types: false,
};

static JSON_RULES: CodeRules = CodeRules {
    line_comment: None,
    block_comment: None,
    string_delims: &['"'],
    keywords: &["true", "false", "null"],
    types: &[],
    operators: &["{", "}", "[", "]", ":", ",", "-"],
    keys_as_types: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(Language::from_filename(Some("app.ts")), Language::TypeScript);
        assert_eq!(Language::from_filename(Some("App.TSX")), Language::TypeScript);
        assert_eq!(Language::from_filename(Some("index.mjs")), Language::JavaScript);
        assert_eq!(Language::from_filename(Some("README.md")), Language::Markdown);
        assert_eq!(Language::from_filename(Some("package.json")), Language::Json);
        assert_eq!(Language::from_filename(Some("notes.txt")), Language::PlainText);
        assert_eq!(Language::from_filename(Some("Makefile")), Language::PlainText);
        assert_eq!(Language::from_filename(None), Language::PlainText);
    }

    #[test]
    fn test_parse_language_name() {
        assert_eq!("typescript".parse::<Language>(), Ok(Language::TypeScript));
        assert_eq!("JSON".parse::<Language>(), Ok(Language::Json));
        assert!("cobol".parse::<Language>().is_err());
    }
}
