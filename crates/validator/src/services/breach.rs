//! Compromised-password range lookups (k-anonymity).
//!
//! Only the first five characters of the password's SHA-1 hash leave the
//! process; the service answers with every known suffix sharing that prefix.

use crate::foundation::ServiceError;

/// Answers range queries against a breached-password corpus.
pub trait PasswordBreachChecker: Send + Sync {
    /// Returns the raw range body for a five-character uppercase hex
    /// prefix: one `SUFFIX:COUNT` pair per line.
    fn fetch_range(&self, prefix: &str) -> Result<String, ServiceError>;
}

impl<F> PasswordBreachChecker for F
where
    F: Fn(&str) -> Result<String, ServiceError> + Send + Sync,
{
    fn fetch_range(&self, prefix: &str) -> Result<String, ServiceError> {
        self(prefix)
    }
}

/// Parses a range body and returns the breach count recorded for `suffix`.
///
/// Lines that do not parse are ignored; suffixes compare case-insensitively.
pub fn breach_count(body: &str, suffix: &str) -> u64 {
    body.lines()
        .filter_map(|line| line.trim().split_once(':'))
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(suffix))
        .and_then(|(_, count)| count.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(feature = "http")]
pub use http::{DEFAULT_ENDPOINT, HttpBreachChecker};

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use tracing::debug;

    use super::PasswordBreachChecker;
    use crate::foundation::ServiceError;

    /// Public range API endpoint; `{prefix}` is substituted.
    pub const DEFAULT_ENDPOINT: &str = "https://api.pwnedpasswords.com/range/{prefix}";

    /// Blocking HTTP client for the range API.
    #[derive(Debug, Clone)]
    pub struct HttpBreachChecker {
        client: reqwest::blocking::Client,
        endpoint: String,
    }

    impl HttpBreachChecker {
        /// Client for the public endpoint.
        pub fn new(timeout: Duration) -> Result<Self, ServiceError> {
            Self::with_endpoint(DEFAULT_ENDPOINT, timeout)
        }

        /// Client for a custom endpoint. `endpoint` must contain `{prefix}`.
        pub fn with_endpoint(
            endpoint: impl Into<String>,
            timeout: Duration,
        ) -> Result<Self, ServiceError> {
            let endpoint = endpoint.into();
            if !endpoint.contains("{prefix}") {
                return Err(ServiceError::Other(format!(
                    "breach endpoint \"{endpoint}\" has no {{prefix}} placeholder"
                )));
            }
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("rampart/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| ServiceError::Transport(Box::new(e)))?;
            Ok(Self { client, endpoint })
        }
    }

    impl PasswordBreachChecker for HttpBreachChecker {
        fn fetch_range(&self, prefix: &str) -> Result<String, ServiceError> {
            let url = self.endpoint.replace("{prefix}", prefix);
            debug!(%url, "fetching password range");
            let response = self
                .client
                .get(&url)
                .send()
                .map_err(|e| ServiceError::Transport(Box::new(e)))?;
            let status = response.status();
            if !status.is_success() {
                return Err(ServiceError::Status(status.as_u16()));
            }
            response
                .text()
                .map_err(|e| ServiceError::Transport(Box::new(e)))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "\
0018A45C4D1DEF81644B54AB7F969B88D65:1\r
00D4F6E8FA6EECAD2A3AA415EEC418D38EC:2\r
011053FD0102E94D6AE2F8B83D76FAF94F6:not-a-number\r
1E4C9B93F3F0682250B6CF8331B7EE68FD8:3730471";

    #[test]
    fn counts_are_read_per_suffix() {
        assert_eq!(breach_count(BODY, "1E4C9B93F3F0682250B6CF8331B7EE68FD8"), 3_730_471);
        assert_eq!(breach_count(BODY, "00d4f6e8fa6eecad2a3aa415eec418d38ec"), 2);
        assert_eq!(breach_count(BODY, "011053FD0102E94D6AE2F8B83D76FAF94F6"), 0);
        assert_eq!(breach_count(BODY, "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF"), 0);
    }

    #[test]
    fn closures_are_checkers() {
        let checker = |prefix: &str| Ok::<_, ServiceError>(format!("{prefix}:1"));
        assert_eq!(checker.fetch_range("ABCDE").unwrap(), "ABCDE:1");
    }
}
