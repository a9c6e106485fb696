//! Source language allow-list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Languages the prompts know how to describe.
///
/// Unknown input never fails: it normalizes to [`Language::JavaScript`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    TypeScript,
    Python,
    Java,
    CSharp,
    Cpp,
    C,
    Go,
    Rust,
    Php,
    Ruby,
    Swift,
    Kotlin,
    Html,
    Css,
    Sql,
}

impl Language {
    /// Every supported language, in display order.
    pub const ALL: [Language; 16] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Java,
        Language::CSharp,
        Language::Cpp,
        Language::C,
        Language::Go,
        Language::Rust,
        Language::Php,
        Language::Ruby,
        Language::Swift,
        Language::Kotlin,
        Language::Html,
        Language::Css,
        Language::Sql,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Html => "html",
            Language::Css => "css",
            Language::Sql => "sql",
        }
    }

    /// Match a canonical name or common alias, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let lang = match lowered.as_str() {
            "js" => Language::JavaScript,
            "ts" => Language::TypeScript,
            "py" => Language::Python,
            "cs" | "c#" => Language::CSharp,
            "c++" => Language::Cpp,
            "golang" => Language::Go,
            "rs" => Language::Rust,
            "rb" => Language::Ruby,
            "kt" => Language::Kotlin,
            other => return Self::ALL.into_iter().find(|l| l.as_str() == other),
        };
        Some(lang)
    }

    /// Like [`from_name`](Self::from_name) but substitutes the default.
    pub fn normalize(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
