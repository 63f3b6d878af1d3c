//! Line ending helpers.
//!
//! `assist-core` works on LF (`'\n'`) normalized text. Documents taken from the editing surface
//! may use CRLF (`"\r\n"`) or lone CR; they are normalized before splitting into lines, and the
//! detected style is re-applied when the patched text is handed back to the host.

/// The newline sequence a document was authored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the dominant line ending from a source text.
    ///
    /// Policy: if the input contains any CRLF (`"\r\n"`), returns [`LineEnding::Crlf`],
    /// otherwise [`LineEnding::Lf`].
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }

    /// Convert an LF-normalized text to this line ending.
    pub fn apply_to_text(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            Self::Crlf => text.replace('\n', "\r\n"),
        }
    }
}

/// Collapse `"\r\n"` and lone `'\r'` into `'\n'`.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mixed_terminators() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_line_endings("plain"), "plain");
    }

    #[test]
    fn test_crlf_round_trip() {
        let original = "x\r\ny\r\n";
        let ending = LineEnding::detect_in_text(original);
        assert_eq!(ending, LineEnding::Crlf);
        assert_eq!(ending.apply_to_text(&normalize_line_endings(original)), original);
    }
}
