//! Process-level run ID for tracking serving and training runs.
//!
//! Each process gets one ULID at startup; every match response and trainer
//! artifact set produced by that process carries it, so a score seen in the
//! dashboard can be traced back to the exact run (and therefore the exact
//! encoder configuration) that produced it.

use once_cell::sync::Lazy;
use ulid::Ulid;

static RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Returns the process-level run ID (stable for the process lifetime,
/// 26 chars, lexicographically time-ordered).
#[inline]
pub fn get() -> &'static str {
    &RUN_ID
}

/// Generates a fresh ULID for per-request ids.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_stable_across_calls() {
        assert_eq!(get(), get());
        assert_eq!(get().len(), 26);
    }

    #[test]
    fn generate_returns_unique_values() {
        assert_ne!(generate(), generate());
    }
}
