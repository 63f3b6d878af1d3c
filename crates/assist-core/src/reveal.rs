//! Paced reveal of a finalized document.
//!
//! [`RevealController`] is the synchronous stepper: it knows nothing about timers. Each
//! [`tick`](RevealController::tick) yields a longer prefix of the target text until the whole text
//! has been shown. Async drivers call it on a fixed interval and may
//! [`finish`](RevealController::finish) early when the reveal is cancelled.

/// Default upper bound on the number of reveal ticks.
pub const DEFAULT_REVEAL_STEPS: usize = 200;

/// Progress of a reveal after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStatus {
    /// More ticks are needed.
    InProgress,
    /// The full target text has been shown.
    Complete,
    /// Nothing is being revealed.
    Idle,
}

/// Splits a target text into at most `steps` char-boundary-safe prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealController {
    target: String,
    chunk_chars: usize,
    /// Byte offset of the end of the prefix shown so far.
    shown: usize,
    done: bool,
}

impl RevealController {
    /// Reveal `target` in at most `steps` ticks (`0` is treated as `1`).
    pub fn new(target: impl Into<String>, steps: usize) -> Self {
        let target = target.into();
        let chars = target.chars().count();
        let chunk_chars = chars.div_ceil(steps.max(1)).max(1);
        Self {
            target,
            chunk_chars,
            shown: 0,
            done: false,
        }
    }

    /// The full text being revealed.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The prefix shown so far.
    pub fn shown(&self) -> &str {
        &self.target[..self.shown]
    }

    /// Returns `true` once the full target has been yielded.
    pub fn is_complete(&self) -> bool {
        self.done
    }

    /// Advance by one chunk and return the new prefix.
    ///
    /// Returns `None` once the reveal is complete. An empty target completes on the first tick.
    pub fn tick(&mut self) -> Option<&str> {
        if self.done {
            return None;
        }
        let rest = &self.target[self.shown..];
        let advance = rest
            .char_indices()
            .nth(self.chunk_chars)
            .map_or(rest.len(), |(idx, _)| idx);
        self.shown += advance;
        if self.shown >= self.target.len() {
            self.done = true;
        }
        Some(&self.target[..self.shown])
    }

    /// Jump to the full text.
    ///
    /// Returns the target if it had not been fully yielded yet, `None` if the reveal was
    /// already complete.
    pub fn finish(&mut self) -> Option<&str> {
        if self.done {
            return None;
        }
        self.shown = self.target.len();
        self.done = true;
        Some(&self.target)
    }

    /// Number of ticks a full reveal takes.
    pub fn total_ticks(&self) -> usize {
        self.target.chars().count().div_ceil(self.chunk_chars).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_grow_to_target() {
        let mut reveal = RevealController::new("abcdefg", 3);
        assert_eq!(reveal.total_ticks(), 3);
        assert_eq!(reveal.tick(), Some("abc"));
        assert_eq!(reveal.tick(), Some("abcdef"));
        assert_eq!(reveal.tick(), Some("abcdefg"));
        assert!(reveal.is_complete());
        assert_eq!(reveal.tick(), None);
    }

    #[test]
    fn test_multibyte_chars_are_never_split() {
        let mut reveal = RevealController::new("héllo wörld ✓", 5);
        while let Some(prefix) = reveal.tick() {
            assert!("héllo wörld ✓".starts_with(prefix));
        }
        assert_eq!(reveal.shown(), "héllo wörld ✓");
    }

    #[test]
    fn test_empty_target_completes_in_one_tick() {
        let mut reveal = RevealController::new("", DEFAULT_REVEAL_STEPS);
        assert_eq!(reveal.tick(), Some(""));
        assert!(reveal.is_complete());
        assert_eq!(reveal.finish(), None);
    }

    #[test]
    fn test_finish_jumps_to_the_end() {
        let mut reveal = RevealController::new("0123456789", 10);
        assert_eq!(reveal.tick(), Some("0"));
        assert_eq!(reveal.finish(), Some("0123456789"));
        assert_eq!(reveal.tick(), None);
        assert_eq!(reveal.finish(), None);
    }

    #[test]
    fn test_short_text_uses_fewer_ticks_than_steps() {
        let mut reveal = RevealController::new("ab", 200);
        assert_eq!(reveal.total_ticks(), 2);
        assert_eq!(reveal.tick(), Some("a"));
        assert_eq!(reveal.tick(), Some("ab"));
    }
}
