//! Access-code matching automaton.
//!
//! Tracks how much of the access code has been entered during the current
//! call. The code must be entered as one contiguous run of tones:
//!
//! | Input                     | Effect                          |
//! |---------------------------|---------------------------------|
//! | symbol == code[position]  | position + 1                    |
//! | position reaches length   | position ← 0, unlock            |
//! | any other symbol          | position ← 0                    |
//! | call start / end / cancel | position ← 0 (via [`reset`])    |
//!
//! A mismatching symbol is not re-tested against the first symbol, so
//! "11234" does not open a door whose code is "1234".
//!
//! [`reset`]: CodeMatcher::reset
//!
//! # Examples
//!
//! ```
//! use intercom_access::{CodeMatcher, MatchOutcome};
//! use intercom_core::AccessCode;
//!
//! let mut matcher = CodeMatcher::new("42".parse::<AccessCode>().unwrap());
//!
//! assert_eq!(matcher.press('4', 100), MatchOutcome::Advanced { position: 1 });
//! assert_eq!(matcher.press('2', 100), MatchOutcome::Unlock);
//! assert_eq!(matcher.position(), 0);
//! ```

use intercom_core::AccessCode;

/// How tone durations are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonPolicy {
    /// Duration is ignored.
    #[default]
    IgnoreDuration,

    /// Presses shorter than the given number of milliseconds count as mismatches.
    MinDuration(u32),
}

impl ButtonPolicy {
    /// Policy for an optional minimum press duration.
    pub fn from_min_press(min_press_ms: Option<u32>) -> Self {
        match min_press_ms {
            Some(ms) => ButtonPolicy::MinDuration(ms),
            None => ButtonPolicy::IgnoreDuration,
        }
    }

    fn accepts(self, duration_ms: u32) -> bool {
        match self {
            ButtonPolicy::IgnoreDuration => true,
            ButtonPolicy::MinDuration(min) => duration_ms >= min,
        }
    }
}

/// Result of feeding one tone to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The tone extended the entered prefix to `position` symbols.
    Advanced { position: usize },

    /// The tone did not match; the entry starts over.
    Reset,

    /// The tone completed the code. The matcher is already back at zero.
    Unlock,
}

/// Matching automaton for a single access code.
#[derive(Debug, Clone)]
pub struct CodeMatcher {
    code: AccessCode,
    position: usize,
    policy: ButtonPolicy,
}

impl CodeMatcher {
    pub fn new(code: AccessCode) -> Self {
        Self::with_policy(code, ButtonPolicy::default())
    }

    pub fn with_policy(code: AccessCode, policy: ButtonPolicy) -> Self {
        Self {
            code,
            position: 0,
            policy,
        }
    }

    /// Number of symbols entered correctly so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    pub fn policy(&self) -> ButtonPolicy {
        self.policy
    }

    /// Discard any partial entry.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Feed one tone.
    pub fn press(&mut self, symbol: char, duration_ms: u32) -> MatchOutcome {
        if !self.policy.accepts(duration_ms) || !self.code.matches_at(self.position, symbol) {
            self.position = 0;
            return MatchOutcome::Reset;
        }

        self.position += 1;
        if self.position == self.code.len() {
            self.position = 0;
            return MatchOutcome::Unlock;
        }
        MatchOutcome::Advanced {
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn matcher(code: &str) -> CodeMatcher {
        CodeMatcher::new(AccessCode::new(code).unwrap())
    }

    fn feed(matcher: &mut CodeMatcher, symbols: &str) -> usize {
        symbols
            .chars()
            .filter(|&s| matcher.press(s, 100) == MatchOutcome::Unlock)
            .count()
    }

    #[rstest]
    #[case("", 0)]
    #[case("1", 1)]
    #[case("12", 2)]
    #[case("123", 3)]
    fn test_prefix_advances_position(#[case] prefix: &str, #[case] position: usize) {
        let mut m = matcher("1234");
        assert_eq!(feed(&mut m, prefix), 0);
        assert_eq!(m.position(), position);
    }

    #[rstest]
    #[case("9")]
    #[case("19")]
    #[case("129")]
    #[case("1239")]
    fn test_deviation_resets(#[case] input: &str) {
        let mut m = matcher("1234");
        assert_eq!(feed(&mut m, input), 0);
        assert_eq!(m.position(), 0);
    }

    #[rstest]
    #[case("1234", 1)]
    #[case("12341234", 2)]
    #[case("13234", 0)]
    #[case("11234", 0)]
    #[case("123", 0)]
    #[case("9991234", 1)]
    #[case("12391234", 1)]
    fn test_unlock_count(#[case] input: &str, #[case] unlocks: usize) {
        let mut m = matcher("1234");
        assert_eq!(feed(&mut m, input), unlocks);
    }

    #[test]
    fn test_unlock_resets_position() {
        let mut m = matcher("1234");
        assert_eq!(feed(&mut m, "1234"), 1);
        assert_eq!(m.position(), 0);
        assert_eq!(m.press('1', 100), MatchOutcome::Advanced { position: 1 });
    }

    #[test]
    fn test_mismatch_not_retested_against_first_symbol() {
        let mut m = matcher("1234");
        m.press('1', 100);
        assert_eq!(m.press('1', 100), MatchOutcome::Reset);
        assert_eq!(m.position(), 0);
    }

    #[test]
    fn test_reset_discards_partial_entry() {
        let mut m = matcher("1234");
        feed(&mut m, "12");
        m.reset();
        assert_eq!(m.position(), 0);
        assert_eq!(feed(&mut m, "34"), 0);
    }

    #[test]
    fn test_symbols_are_case_sensitive() {
        let mut m = matcher("A1");
        assert_eq!(m.press('a', 100), MatchOutcome::Reset);
        assert_eq!(feed(&mut m, "A1"), 1);
    }

    #[test]
    fn test_single_symbol_code() {
        let mut m = matcher("#");
        assert_eq!(m.press('#', 100), MatchOutcome::Unlock);
        assert_eq!(m.press('#', 100), MatchOutcome::Unlock);
    }

    #[test]
    fn test_duration_ignored_by_default() {
        let mut m = matcher("12");
        assert_eq!(m.press('1', 0), MatchOutcome::Advanced { position: 1 });
        assert_eq!(m.press('2', u32::MAX), MatchOutcome::Unlock);
    }

    #[rstest]
    #[case(39, MatchOutcome::Reset)]
    #[case(40, MatchOutcome::Advanced { position: 1 })]
    #[case(500, MatchOutcome::Advanced { position: 1 })]
    fn test_min_duration_policy(#[case] duration_ms: u32, #[case] expected: MatchOutcome) {
        let code = AccessCode::new("12").unwrap();
        let mut m = CodeMatcher::with_policy(code, ButtonPolicy::MinDuration(40));
        assert_eq!(m.press('1', duration_ms), expected);
    }

    #[test]
    fn test_short_press_breaks_entry() {
        let code = AccessCode::new("123").unwrap();
        let mut m = CodeMatcher::with_policy(code, ButtonPolicy::MinDuration(40));
        m.press('1', 100);
        assert_eq!(m.press('2', 10), MatchOutcome::Reset);
        assert_eq!(m.position(), 0);
    }

    #[test]
    fn test_policy_from_config() {
        assert_eq!(ButtonPolicy::from_min_press(None), ButtonPolicy::IgnoreDuration);
        assert_eq!(
            ButtonPolicy::from_min_press(Some(60)),
            ButtonPolicy::MinDuration(60)
        );
    }
}
