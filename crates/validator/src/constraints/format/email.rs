//! E-mail addresses.

use std::sync::LazyLock;

use serde::Deserialize;

use crate::constraints::basic::Normalizer;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};
use crate::services::RecordKind;

static LOOSE_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^.+@\S+\.\S+$").expect("valid loose e-mail pattern"));

static HTML5_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("valid html5 e-mail pattern")
});

static HTML5_NO_TLD_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid html5 e-mail pattern")
});

/// How strictly addresses are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailMode {
    /// Something, `@`, something with a dot.
    Loose,
    /// The WHATWG `input[type=email]` grammar, requiring a dot in the host.
    #[default]
    Html5,
    /// The WHATWG grammar as written, hosts without a dot included.
    Html5AllowNoTld,
    /// Full RFC check through the configured
    /// [`StrictEmailParser`](crate::services::StrictEmailParser).
    Strict,
}

/// The value must be an e-mail address.
///
/// `check_mx` and `check_host` additionally ask the configured
/// [`DnsResolver`](crate::services::DnsResolver) about the domain.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Email {
    /// Grammar to apply.
    pub mode: EmailMode,
    /// The domain must have an MX record.
    pub check_mx: bool,
    /// The domain must have an MX, A or AAAA record.
    pub check_host: bool,
    /// Applied before checking.
    pub normalizer: Option<Normalizer>,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Email {
    crate::error_codes! {
        INVALID_FORMAT_ERROR = "bd79c0ab-ddba-46cc-a703-a7a4b08de310";
        MX_CHECK_FAILED_ERROR = "bf447c1c-0266-4e10-9c6c-573df282e413";
        HOST_CHECK_FAILED_ERROR = "7da53a8b-56f3-4288-bb3e-ee9ede4ef9a1";
    }

    const MESSAGE: &'static str = "This value is not a valid email address.";

    /// Address grammar `mode`.
    pub fn new(mode: EmailMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Requires an MX record for the domain.
    #[must_use = "builder methods must be chained or built"]
    pub fn checking_mx(mut self) -> Self {
        self.check_mx = true;
        self
    }

    /// Requires any mail-capable record for the domain.
    #[must_use = "builder methods must be chained or built"]
    pub fn checking_host(mut self) -> Self {
        self.check_host = true;
        self
    }

    fn matches_grammar(
        &self,
        email: &str,
        ctx: &ExecutionContext<'_>,
    ) -> Result<bool, ValidatorError> {
        Ok(match self.mode {
            EmailMode::Loose => LOOSE_PATTERN.is_match(email),
            EmailMode::Html5 => HTML5_PATTERN.is_match(email),
            EmailMode::Html5AllowNoTld => HTML5_NO_TLD_PATTERN.is_match(email),
            EmailMode::Strict => {
                let parser = ctx.services().strict_email_parser().ok_or(
                    ValidatorError::MissingService {
                        constraint: "Email",
                        service: "strict e-mail parser",
                    },
                )?;
                parser.is_valid(email)
            }
        })
    }

    /// Returns the failing DNS check's error code, if any.
    fn check_dns(
        &self,
        host: &str,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Option<&'static str>, ValidatorError> {
        if !self.check_mx && !self.check_host {
            return Ok(None);
        }
        let resolver = ctx
            .services()
            .dns_resolver()
            .ok_or(ValidatorError::MissingService {
                constraint: "Email",
                service: "DNS resolver",
            })?;
        let lookup = |kind: RecordKind| {
            resolver
                .has_record(host, kind)
                .map_err(|source| ValidatorError::Service {
                    service: "DNS resolver",
                    source,
                })
        };

        if self.check_mx {
            return Ok((!lookup(RecordKind::Mx)?).then_some(Self::MX_CHECK_FAILED_ERROR));
        }
        for kind in [RecordKind::Mx, RecordKind::A, RecordKind::Aaaa] {
            if lookup(kind)? {
                return Ok(None);
            }
        }
        Ok(Some(Self::HOST_CHECK_FAILED_ERROR))
    }

    fn report(&self, value: &Value, code: &'static str, ctx: &mut ExecutionContext<'_>) {
        crate::constraints::report(ctx, self.message.as_deref(), Self::MESSAGE, value, code);
    }
}

impl Validate for Email {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let email = match self.normalizer {
            Some(normalizer) => normalizer.apply(&text),
            None => text.as_ref(),
        };

        if !self.matches_grammar(email, ctx)? {
            self.report(value, Self::INVALID_FORMAT_ERROR, ctx);
            return Ok(());
        }

        let host = email.rsplit_once('@').map_or("", |(_, host)| host);
        if let Some(code) = self.check_dns(host, ctx)? {
            self.report(value, code, ctx);
        }
        Ok(())
    }
}
