//! DNS host names.

use serde::Deserialize;

use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

/// Top-level domains reserved by RFC 2606 and RFC 6761.
const RESERVED_TLDS: &[&str] = &["example", "invalid", "localhost", "test"];

const MAX_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// The value must be a syntactically valid host name.
///
/// With `require_tld` (the default) the name needs at least two labels and
/// its last label must not be a reserved top-level domain.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hostname {
    /// Require a non-reserved top-level domain.
    pub require_tld: bool,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Default for Hostname {
    fn default() -> Self {
        Self {
            require_tld: true,
            message: None,
            groups: Groups::default(),
        }
    }
}

impl Hostname {
    crate::error_codes! {
        INVALID_HOSTNAME_ERROR = "7057ffdb-0af4-4f7e-bd5e-e9acfa6d7a2d";
    }

    const MESSAGE: &'static str = "This value is not a valid hostname.";

    /// Single-label names such as `localhost` are accepted.
    #[must_use = "builder methods must be chained or built"]
    pub fn without_tld(mut self) -> Self {
        self.require_tld = false;
        self
    }

    fn is_valid(&self, host: &str) -> bool {
        let host = host.strip_suffix('.').unwrap_or(host);
        if host.is_empty() || host.len() > MAX_LENGTH {
            return false;
        }
        let labels: Vec<&str> = host.split('.').collect();
        if !labels.iter().all(|label| is_valid_label(label)) {
            return false;
        }
        if !self.require_tld {
            return true;
        }
        match labels.as_slice() {
            [_, .., tld] => !RESERVED_TLDS.iter().any(|r| r.eq_ignore_ascii_case(tld)),
            _ => false,
        }
    }
}

fn is_valid_label(label: &str) -> bool {
    (1..=MAX_LABEL_LENGTH).contains(&label.len())
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

impl Validate for Hostname {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        if !self.is_valid(&text) {
            report(
                ctx,
                self.message.as_deref(),
                Self::MESSAGE,
                value,
                Self::INVALID_HOSTNAME_ERROR,
            );
        }
        Ok(())
    }
}
