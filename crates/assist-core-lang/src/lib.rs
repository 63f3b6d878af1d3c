#![warn(missing_docs)]
//! `assist-core-lang` - data-driven language metadata for `assist-core`.
//!
//! This crate intentionally stays lightweight and does **not** depend on any parsing or
//! highlighting system. It answers two questions the kernel needs while rendering previews and
//! choosing fallback code blocks:
//!
//! - which fence tag (```` ```rust ````) labels code for the active document
//! - whether a fence tag written by the assistant refers to the same language

/// Static description of a language the kernel knows how to label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Stable identifier (e.g. `rust`, `typescript`).
    pub id: &'static str,
    /// Tag used when opening a fenced code block for this language.
    pub fence_tag: &'static str,
    /// File extensions (without the dot) mapped to this language.
    pub extensions: &'static [&'static str],
    /// Alternative fence tags an assistant may emit for this language.
    pub aliases: &'static [&'static str],
}

impl Language {
    /// Returns `true` if `tag` (as written after a fence opener) names this language.
    ///
    /// Matching is ASCII case-insensitive and ignores anything after the first whitespace, so
    /// info strings like `rust title="main.rs"` still match.
    pub fn matches_fence_tag(&self, tag: &str) -> bool {
        let tag = tag.split_whitespace().next().unwrap_or("");
        if tag.is_empty() {
            return false;
        }
        tag.eq_ignore_ascii_case(self.id)
            || tag.eq_ignore_ascii_case(self.fence_tag)
            || self.aliases.iter().any(|alias| tag.eq_ignore_ascii_case(alias))
            || self.extensions.iter().any(|ext| tag.eq_ignore_ascii_case(ext))
    }
}

/// Built-in language table.
pub const LANGUAGES: &[Language] = &[
    Language {
        id: "rust",
        fence_tag: "rust",
        extensions: &["rs"],
        aliases: &[],
    },
    Language {
        id: "typescript",
        fence_tag: "typescript",
        extensions: &["ts", "tsx", "mts", "cts"],
        aliases: &["tsx"],
    },
    Language {
        id: "javascript",
        fence_tag: "javascript",
        extensions: &["js", "jsx", "mjs", "cjs"],
        aliases: &["jsx", "node"],
    },
    Language {
        id: "python",
        fence_tag: "python",
        extensions: &["py", "pyi"],
        aliases: &["py3", "python3"],
    },
    Language {
        id: "c",
        fence_tag: "c",
        extensions: &["c", "h"],
        aliases: &[],
    },
    Language {
        id: "cpp",
        fence_tag: "cpp",
        extensions: &["cc", "cpp", "cxx", "hpp", "hh", "hxx"],
        aliases: &["c++"],
    },
    Language {
        id: "java",
        fence_tag: "java",
        extensions: &["java"],
        aliases: &[],
    },
    Language {
        id: "go",
        fence_tag: "go",
        extensions: &["go"],
        aliases: &["golang"],
    },
    Language {
        id: "json",
        fence_tag: "json",
        extensions: &["json", "jsonc"],
        aliases: &[],
    },
    Language {
        id: "html",
        fence_tag: "html",
        extensions: &["html", "htm"],
        aliases: &[],
    },
    Language {
        id: "css",
        fence_tag: "css",
        extensions: &["css"],
        aliases: &[],
    },
    Language {
        id: "markdown",
        fence_tag: "markdown",
        extensions: &["md", "markdown"],
        aliases: &["md"],
    },
    Language {
        id: "shell",
        fence_tag: "bash",
        extensions: &["sh", "bash", "zsh"],
        aliases: &["sh", "zsh", "shell"],
    },
    Language {
        id: "toml",
        fence_tag: "toml",
        extensions: &["toml"],
        aliases: &[],
    },
    Language {
        id: "yaml",
        fence_tag: "yaml",
        extensions: &["yaml", "yml"],
        aliases: &["yml"],
    },
];

/// Look up a language by its identifier (ASCII case-insensitive).
pub fn language_by_id(id: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.id.eq_ignore_ascii_case(id))
}

/// Look up a language from a file path or document identifier by its extension.
///
/// Accepts plain paths, `file://` URIs and bare file names.
pub fn language_for_path(path: &str) -> Option<&'static Language> {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    LANGUAGES
        .iter()
        .find(|lang| lang.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Resolve the language a fence tag refers to.
pub fn language_for_fence_tag(tag: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.matches_fence_tag(tag))
}
