//! Redirect destination allowlisting.
//!
//! Client-supplied `redirect_url` values sit on a security boundary: used
//! verbatim they enable open-redirect phishing. Destinations are honored only
//! on an exact match against the configured allowlist; everything else
//! silently degrades to a caller-chosen fallback, so no input can throw its
//! way past the check.

/// Process-wide allowlist of redirect destinations, read-only after load.
#[derive(Clone, Debug, Default)]
pub struct RedirectPolicy {
    allowed: Vec<String>,
}

impl RedirectPolicy {
    #[must_use]
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed: allowed
                .into_iter()
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }

    /// Validate a candidate destination, returning it only on an exact
    /// allowlist match (after trimming) and `fallback` otherwise.
    ///
    /// No prefix, substring, or case-insensitive matching: a closed list,
    /// not a pattern.
    #[must_use]
    pub fn validate(&self, candidate: Option<&str>, fallback: &str) -> String {
        let Some(candidate) = candidate else {
            return fallback.to_string();
        };
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return fallback.to_string();
        }
        if self.allowed.iter().any(|entry| entry == trimmed) {
            trimmed.to_string()
        } else {
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RedirectPolicy {
        RedirectPolicy::new(vec!["http://localhost:3000/demo".to_string()])
    }

    #[test]
    fn missing_or_blank_candidates_fall_back() {
        let policy = policy();
        assert_eq!(policy.validate(None, "/profile"), "/profile");
        assert_eq!(policy.validate(Some(""), "/profile"), "/profile");
        assert_eq!(policy.validate(Some("   "), "/profile"), "/profile");
    }

    #[test]
    fn exact_match_is_returned_trimmed() {
        let policy = policy();
        assert_eq!(
            policy.validate(Some("  http://localhost:3000/demo  "), "/profile"),
            "http://localhost:3000/demo"
        );
    }

    #[test]
    fn near_misses_fall_back() {
        let policy = policy();
        // No prefix, suffix, case, or superstring variants.
        for candidate in [
            "http://localhost:3000/demo/",
            "http://localhost:3000/demo2",
            "http://localhost:3000",
            "HTTP://LOCALHOST:3000/DEMO",
            "http://localhost:3000/demo?x=1",
            "http://evil.example/steal",
            "//evil.example",
            "javascript:alert(1)",
        ] {
            assert_eq!(policy.validate(Some(candidate), "/profile"), "/profile");
        }
    }

    #[test]
    fn empty_allowlist_rejects_everything() {
        let policy = RedirectPolicy::new(Vec::new());
        assert_eq!(policy.validate(Some("/profile"), "/login"), "/login");
    }

    #[test]
    fn allowlist_entries_are_trimmed_at_load() {
        let policy = RedirectPolicy::new(vec![" /dashboard ".to_string(), String::new()]);
        assert_eq!(policy.validate(Some("/dashboard"), "/"), "/dashboard");
    }
}
