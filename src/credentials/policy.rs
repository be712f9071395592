//! Password complexity rules.

use regex::Regex;

use super::manager::ComplexityRejection;

const DEFAULT_MIN_LENGTH: usize = 8;
const DEFAULT_MAX_LENGTH: usize = 128;
const DEFAULT_MAX_REPEATED: usize = 3;

#[derive(Clone, Debug)]
pub struct ComplexityPolicy {
    min_length: usize,
    max_length: usize,
    require_uppercase: bool,
    require_lowercase: bool,
    require_digit: bool,
    require_special: bool,
    max_repeated: usize,
}

impl Default for ComplexityPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
            max_repeated: DEFAULT_MAX_REPEATED,
        }
    }
}

impl ComplexityPolicy {
    #[must_use]
    pub fn with_min_length(mut self, length: usize) -> Self {
        self.min_length = length;
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, length: usize) -> Self {
        self.max_length = length;
        self
    }

    #[must_use]
    pub fn with_require_special(mut self, required: bool) -> Self {
        self.require_special = required;
        self
    }

    #[must_use]
    pub fn with_max_repeated(mut self, count: usize) -> Self {
        self.max_repeated = count;
        self
    }

    #[must_use]
    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    /// Check every rule and report all violations at once.
    ///
    /// # Errors
    /// Returns a rejection whose reason lists each violated rule, separated by `; `.
    pub fn check(&self, candidate: &str) -> Result<(), ComplexityRejection> {
        let mut violations = Vec::new();
        let length = candidate.chars().count();

        if length < self.min_length {
            violations.push(format!(
                "password must be at least {} characters long",
                self.min_length
            ));
        }
        if length > self.max_length {
            violations.push(format!(
                "password must be at most {} characters long",
                self.max_length
            ));
        }
        if self.require_uppercase && !matches(r"\p{Lu}", candidate) {
            violations.push("password must contain an uppercase letter".to_string());
        }
        if self.require_lowercase && !matches(r"\p{Ll}", candidate) {
            violations.push("password must contain a lowercase letter".to_string());
        }
        if self.require_digit && !matches(r"\p{Nd}", candidate) {
            violations.push("password must contain a digit".to_string());
        }
        if self.require_special && !matches(r"[^\p{L}\p{N}]", candidate) {
            violations.push("password must contain a special character".to_string());
        }
        if self.max_repeated > 0 && longest_run(candidate) > self.max_repeated {
            violations.push(format!(
                "password must not repeat a character more than {} times in a row",
                self.max_repeated
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ComplexityRejection::new(violations.join("; ")))
        }
    }
}

fn matches(pattern: &str, candidate: &str) -> bool {
    Regex::new(pattern).is_ok_and(|regex| regex.is_match(candidate))
}

fn longest_run(candidate: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;

    for c in candidate.chars() {
        if previous == Some(c) {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }

    longest
}
