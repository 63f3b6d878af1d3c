//! Fenced code block scanning.
//!
//! A single top-level pass over the text splits it into narrative segments and fenced code
//! segments. Fences open with a line starting with three or more backticks (optionally followed
//! by an info string such as `rust` or `json`) and close with a line holding at least as many
//! backticks and nothing else. A fence left open at the end of the text extends to the end.

use crate::line_ending::normalize_line_endings;

/// A fenced code region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info string after the opening fence (trimmed, may be empty).
    pub info: String,
    /// Lines between the fences, joined with `'\n'`.
    pub content: String,
    /// Whether a closing fence was found.
    pub closed: bool,
}

impl CodeBlock {
    /// First word of the info string (the language tag).
    pub fn language_tag(&self) -> &str {
        self.info.split_whitespace().next().unwrap_or("")
    }
}

/// One piece of a narrative response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Narrative text between fences.
    Text(String),
    /// A fenced code region.
    Code(CodeBlock),
}

/// Split `text` into narrative and fenced segments, in order.
///
/// Whitespace-only narrative between fences is dropped.
pub fn split_fenced(text: &str) -> Vec<Segment> {
    let normalized = normalize_line_endings(text);
    let mut segments = Vec::new();
    let mut narrative: Vec<&str> = Vec::new();
    let mut open: Option<(usize, String, Vec<&str>)> = None;

    for line in normalized.split('\n') {
        match open.as_mut() {
            Some((ticks, _, body)) => {
                if is_closing_fence(line, *ticks) {
                    if let Some((_, info, body)) = open.take() {
                        segments.push(Segment::Code(CodeBlock {
                            info,
                            content: body.join("\n"),
                            closed: true,
                        }));
                    }
                } else {
                    body.push(line);
                }
            }
            None => {
                if let Some((ticks, info)) = opening_fence(line) {
                    flush_narrative(&mut segments, &mut narrative);
                    open = Some((ticks, info, Vec::new()));
                } else {
                    narrative.push(line);
                }
            }
        }
    }

    if let Some((_, info, body)) = open {
        segments.push(Segment::Code(CodeBlock {
            info,
            content: body.join("\n"),
            closed: false,
        }));
    }
    flush_narrative(&mut segments, &mut narrative);
    segments
}

/// All fenced code regions of `text`, in order.
pub fn code_blocks(text: &str) -> Vec<CodeBlock> {
    split_fenced(text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Code(block) => Some(block),
            Segment::Text(_) => None,
        })
        .collect()
}

fn flush_narrative(segments: &mut Vec<Segment>, narrative: &mut Vec<&str>) {
    let text = narrative.join("\n");
    narrative.clear();
    if !text.trim().is_empty() {
        segments.push(Segment::Text(text));
    }
}

fn opening_fence(line: &str) -> Option<(usize, String)> {
    let trimmed = line.trim_start();
    let ticks = trimmed.chars().take_while(|c| *c == '`').count();
    if ticks < 3 {
        return None;
    }
    let info = trimmed[ticks..].trim();
    // An info string cannot contain backticks (rules out inline ```code``` on one line).
    if info.contains('`') {
        return None;
    }
    Some((ticks, info.to_string()))
}

fn is_closing_fence(line: &str, opening_ticks: usize) -> bool {
    let trimmed = line.trim();
    let ticks = trimmed.chars().take_while(|c| *c == '`').count();
    ticks >= opening_ticks && ticks == trimmed.len()
}
