//! Low-level scanners over JSON-like text that may be incomplete.

/// A JSON string value read from an opening quote, possibly cut off by the end of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PartialString {
    /// Unescaped characters read so far.
    pub value: String,
    /// Byte offset just past the closing quote, or the buffer length when cut off.
    pub end: usize,
}

/// Read a JSON string body starting at byte `start` (just after the opening quote).
///
/// Stops at the first unescaped `"` or at the end of `buffer`. An escape sequence cut off by
/// the end of the buffer is held back rather than emitted half-decoded.
pub(crate) fn read_partial_string(buffer: &str, start: usize) -> PartialString {
    let mut value = String::new();
    let Some(rest) = buffer.get(start..) else {
        return PartialString {
            value,
            end: buffer.len(),
        };
    };

    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                return PartialString {
                    value,
                    end: start + rest.len() - chars.as_str().len(),
                };
            }
            '\\' => {
                let Some(escaped) = chars.next() else {
                    break;
                };
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'b' => value.push('\u{8}'),
                    'f' => value.push('\u{c}'),
                    'u' => match read_hex4(&mut chars) {
                        Hex::Incomplete => break,
                        Hex::Invalid => value.push('\u{FFFD}'),
                        Hex::Unit(unit) if (0xD800..0xDC00).contains(&unit) => {
                            // high surrogate: combine with a following `\uXXXX` low half
                            let mut lookahead = chars.clone();
                            let low = match (lookahead.next(), lookahead.next()) {
                                (None, _) | (Some('\\'), None) => break,
                                (Some('\\'), Some('u')) => match read_hex4(&mut lookahead) {
                                    Hex::Incomplete => break,
                                    Hex::Invalid => None,
                                    Hex::Unit(low) => Some(low),
                                },
                                _ => None,
                            };
                            match low.filter(|low| (0xDC00..0xE000).contains(low)) {
                                Some(low) => {
                                    let combined =
                                        0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                                    value.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                                    chars = lookahead;
                                }
                                None => value.push('\u{FFFD}'),
                            }
                        }
                        Hex::Unit(unit) => {
                            value.push(char::from_u32(unit).unwrap_or('\u{FFFD}'));
                        }
                    },
                    other => value.push(other),
                }
            }
            other => value.push(other),
        }
    }

    PartialString {
        value,
        end: buffer.len(),
    }
}

enum Hex {
    Unit(u32),
    Incomplete,
    Invalid,
}

fn read_hex4<I: Iterator<Item = char>>(chars: &mut I) -> Hex {
    let mut unit = 0u32;
    for _ in 0..4 {
        let Some(c) = chars.next() else {
            return Hex::Incomplete;
        };
        let Some(digit) = c.to_digit(16) else {
            return Hex::Invalid;
        };
        unit = unit * 16 + digit;
    }
    Hex::Unit(unit)
}

/// Byte ranges of top-level balanced `{...}` objects, in order.
///
/// Depth counting skips braces inside string literals. A `{` that never closes is skipped and
/// scanning resumes just after it.
pub(crate) fn balanced_objects(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut objects = Vec::new();
    let mut pos = 0;

    while let Some(offset) = bytes[pos..].iter().position(|b| *b == b'{') {
        let start = pos + offset;
        let Some(end) = matching_brace(bytes, start) else {
            pos = start + 1;
            continue;
        };
        objects.push(&text[start..=end]);
        pos = end + 1;
    }

    objects
}

fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, byte) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
