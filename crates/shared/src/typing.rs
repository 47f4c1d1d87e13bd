//! Keystroke-by-keystroke progress tracking for a single practice item.
//!
//! The tracker consumes successive snapshots of the full input field (the way
//! a text input reports change events) rather than individual key events.
//! Input events are processed one at a time, so consecutive snapshots differ
//! by at most one character.

use std::time::Instant;

/// Lifecycle of one practice item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Playing,
    Finished,
}

/// What the UI should signal for the keystroke that produced an update.
/// The completing keystroke reports `None`; completion is handled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    None,
    Match,
    Mismatch,
}

/// Progress against a single target string.
///
/// Counters never decrease except through [`TypingAttempt::start`] or
/// [`TypingAttempt::reset`].
#[derive(Debug, Clone)]
pub struct TypingAttempt {
    target: String,
    input: String,
    started: Option<Instant>,
    errors: u32,
    backspaces: u32,
    status: Status,
}

impl TypingAttempt {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            input: String::new(),
            started: None,
            errors: 0,
            backspaces: 0,
            status: Status::Ready,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn backspaces(&self) -> u32 {
        self.backspaces
    }

    /// Begin the attempt, clearing any prior input and counters.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Begin the attempt with an explicit start instant.
    pub fn start_at(&mut self, now: Instant) {
        self.input.clear();
        self.errors = 0;
        self.backspaces = 0;
        self.started = Some(now);
        self.status = Status::Playing;
    }

    /// Move on to the next practice item, discarding all progress.
    pub fn reset(&mut self, target: impl Into<String>) {
        *self = Self::new(target);
    }

    /// Apply a new snapshot of the input field.
    ///
    /// Shrinking input counts a backspace. Growing input compares the
    /// appended character against the target at that position; a mismatch
    /// increments the error counter. Ignored outside `Playing`.
    pub fn update_input(&mut self, new_input: &str) -> Feedback {
        if self.status != Status::Playing {
            return Feedback::None;
        }

        let old_len = self.input.chars().count();
        let new_len = new_input.chars().count();

        let feedback = if new_len < old_len {
            self.backspaces += 1;
            Feedback::None
        } else if new_len > old_len {
            let typed = new_input.chars().nth(old_len);
            let expected = self.target.chars().nth(old_len);

            match (typed, expected) {
                (Some(t), Some(e)) if t == e => {
                    if new_input == self.target {
                        // Completing keystroke: feedback handled by completion
                        Feedback::None
                    } else {
                        Feedback::Match
                    }
                }
                _ => {
                    self.errors += 1;
                    Feedback::Mismatch
                }
            }
        } else {
            Feedback::None
        };

        self.input = new_input.to_string();
        if self.input == self.target {
            self.status = Status::Finished;
        }

        feedback
    }

    /// Words per minute, rounded. Zero before the attempt starts or before
    /// any time has elapsed.
    pub fn wpm(&self) -> u32 {
        self.wpm_at(Instant::now())
    }

    pub fn wpm_at(&self, now: Instant) -> u32 {
        let Some(started) = self.started else {
            return 0;
        };

        let minutes = now.saturating_duration_since(started).as_secs_f64() / 60.0;
        if minutes <= 0.0 {
            return 0;
        }

        let words = self.input.split_whitespace().count() as f64;
        (words / minutes).round() as u32
    }

    /// Accuracy in percent: the share of input characters matching the target
    /// at their position, minus half a point per backspace, clamped to
    /// [0, 100].
    pub fn accuracy(&self) -> u32 {
        let typed = self.input.chars().count();
        let ratio = if typed == 0 {
            1.0
        } else {
            let matching = self
                .input
                .chars()
                .zip(self.target.chars())
                .filter(|(i, t)| i == t)
                .count();
            matching as f64 / typed as f64
        };

        let score = (ratio * 100.0 - f64::from(self.backspaces) * 0.5).round();
        score.clamp(0.0, 100.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn playing(target: &str) -> TypingAttempt {
        let mut attempt = TypingAttempt::new(target);
        attempt.start();
        attempt
    }

    #[test]
    fn clean_run_finishes_exactly_on_full_match() {
        let mut attempt = playing("abc");

        assert_eq!(attempt.update_input("a"), Feedback::Match);
        assert_eq!(attempt.status(), Status::Playing);

        assert_eq!(attempt.update_input("ab"), Feedback::Match);
        assert_eq!(attempt.status(), Status::Playing);

        // Completing keystroke: no per-key feedback
        assert_eq!(attempt.update_input("abc"), Feedback::None);
        assert_eq!(attempt.status(), Status::Finished);
        assert_eq!(attempt.errors(), 0);
    }

    #[test]
    fn first_wrong_character_counts_one_error() {
        let mut attempt = playing("abc");

        assert_eq!(attempt.update_input("x"), Feedback::Mismatch);
        assert_eq!(attempt.errors(), 1);
        assert_eq!(attempt.status(), Status::Playing);
    }

    #[test]
    fn shrinking_input_counts_a_backspace() {
        let mut attempt = playing("abc");

        attempt.update_input("a");
        attempt.update_input("");

        assert_eq!(attempt.backspaces(), 1);
        assert_eq!(attempt.errors(), 0);
    }

    #[test]
    fn corrected_error_still_counts() {
        let mut attempt = playing("abc");

        attempt.update_input("x");
        attempt.update_input("");
        attempt.update_input("a");
        attempt.update_input("ab");
        attempt.update_input("abc");

        assert_eq!(attempt.errors(), 1);
        assert_eq!(attempt.backspaces(), 1);
        assert_eq!(attempt.status(), Status::Finished);
    }

    #[test]
    fn typing_past_the_target_is_an_error() {
        let mut attempt = playing("ab");

        attempt.update_input("a");
        attempt.update_input("ax");
        assert_eq!(attempt.errors(), 1);

        // No expected character beyond the target's end
        assert_eq!(attempt.update_input("axc"), Feedback::Mismatch);
        assert_eq!(attempt.errors(), 2);
        assert_eq!(attempt.status(), Status::Playing);
    }

    #[test]
    fn finished_attempts_ignore_further_input() {
        let mut attempt = playing("ab");

        attempt.update_input("a");
        attempt.update_input("ab");
        assert_eq!(attempt.status(), Status::Finished);

        assert_eq!(attempt.update_input("abc"), Feedback::None);
        assert_eq!(attempt.errors(), 0);
        assert_eq!(attempt.input(), "ab");
    }

    #[test]
    fn updates_are_ignored_before_start() {
        let mut attempt = TypingAttempt::new("abc");

        assert_eq!(attempt.update_input("a"), Feedback::None);
        assert_eq!(attempt.input(), "");
        assert_eq!(attempt.status(), Status::Ready);
    }

    #[test]
    fn start_resets_counters_and_input() {
        let mut attempt = playing("abc");
        attempt.update_input("x");
        attempt.update_input("");

        attempt.start();

        assert_eq!(attempt.errors(), 0);
        assert_eq!(attempt.backspaces(), 0);
        assert_eq!(attempt.input(), "");
        assert_eq!(attempt.status(), Status::Playing);
    }

    #[test]
    fn wpm_is_zero_without_start_or_elapsed_time() {
        let attempt = TypingAttempt::new("abc");
        assert_eq!(attempt.wpm(), 0);

        let start = Instant::now();
        let mut attempt = TypingAttempt::new("hello world");
        attempt.start_at(start);
        attempt.update_input("hello");
        assert_eq!(attempt.wpm_at(start), 0);
    }

    #[test]
    fn wpm_counts_words_over_elapsed_minutes() {
        let start = Instant::now();
        let mut attempt = TypingAttempt::new("hello world again");
        attempt.start_at(start);
        attempt.update_input("hello world");

        // Two words in half a minute
        assert_eq!(attempt.wpm_at(start + Duration::from_secs(30)), 4);
    }

    #[test]
    fn accuracy_penalizes_mismatches_and_backspaces() {
        let mut attempt = playing("abc");
        attempt.update_input("a");
        attempt.update_input("ax");

        // 1 of 2 chars matches, no backspaces: 50
        assert_eq!(attempt.accuracy(), 50);

        attempt.update_input("a");
        attempt.update_input("ab");
        attempt.update_input("abc");

        // Full match minus one backspace penalty, rounded
        assert_eq!(attempt.accuracy(), 100);
    }

    #[test]
    fn accuracy_clamps_to_bounds() {
        let mut attempt = playing("abc");
        for _ in 0..250 {
            attempt.update_input("a");
            attempt.update_input("");
        }

        assert_eq!(attempt.accuracy(), 0);

        let fresh = playing("abc");
        assert_eq!(fresh.accuracy(), 100);
    }
}
