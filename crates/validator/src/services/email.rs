//! RFC-grade e-mail address parsing.

/// Full RFC 5322 address check used by the `strict` e-mail mode.
pub trait StrictEmailParser: Send + Sync {
    /// Returns `true` for a valid address.
    fn is_valid(&self, email: &str) -> bool;
}

impl<F> StrictEmailParser for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, email: &str) -> bool {
        self(email)
    }
}
