//! Layered configuration: built-in defaults, then `rampart.toml` (or
//! `--config`), then `RAMPART_*` environment variables. Command-line flags
//! are applied on top by the caller.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `RAMPART_BREACH__ENABLED=true`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use rampart_validator::foundation::ServiceError;
use rampart_validator::services::{
    DEFAULT_ENDPOINT, E164PhoneParser, HttpBreachChecker, ParsedPhoneNumber,
    PasswordBreachChecker, PhoneNumberParser, Services,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_FILE: &str = "rampart.toml";

/// How `check` prints its results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per violation.
    #[default]
    Text,
    /// A JSON array with one report per document.
    Json,
}

/// Compromised-password lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreachConfig {
    /// Query the range API. When off, no password counts as compromised.
    pub enabled: bool,
    /// Range endpoint; must contain `{prefix}`.
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Treat lookup failures as "not compromised" instead of failing.
    pub skip_on_error: bool,
}

impl Default for BreachConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout_secs: 5,
            skip_on_error: false,
        }
    }
}

/// Phone number parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneConfig {
    /// Region used for national numbers when a rule names none.
    pub default_region: Option<String>,
}

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub format: OutputFormat,
    pub groups: Vec<String>,
    pub breach: BreachConfig,
    pub phone: PhoneConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            format: OutputFormat::Text,
            groups: Vec::new(),
            breach: BreachConfig::default(),
            phone: PhoneConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration. An explicit `path` must exist; the default
    /// file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => {
                bail!("config file {} does not exist", path.display())
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_FILE),
        };
        Self::figment(&file)
            .extract()
            .with_context(|| format!("invalid configuration (file {})", file.display()))
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("RAMPART_").split("__"))
    }

    /// Builds the service bundle the validator runs with.
    pub fn services(&self) -> Result<Services> {
        let mut services = Services::default().with_phone_parser(RegionalPhoneParser {
            default_region: self.phone.default_region.clone(),
        });

        services = if self.breach.enabled {
            let checker = HttpBreachChecker::with_endpoint(
                self.breach.endpoint.clone(),
                Duration::from_secs(self.breach.timeout_secs),
            )
            .context("cannot set up the password breach checker")?;
            if self.breach.skip_on_error {
                services.with_breach_checker(Lenient(checker))
            } else {
                services.with_breach_checker(checker)
            }
        } else {
            services.with_breach_checker(|prefix: &str| {
                debug!(prefix, "breach lookups disabled");
                Ok::<_, ServiceError>(String::new())
            })
        };
        Ok(services)
    }
}

/// Answers with an empty range when the wrapped checker fails.
struct Lenient<C>(C);

impl<C: PasswordBreachChecker> PasswordBreachChecker for Lenient<C> {
    fn fetch_range(&self, prefix: &str) -> Result<String, ServiceError> {
        self.0.fetch_range(prefix).or_else(|error| {
            warn!(prefix, %error, "breach lookup failed, treating password as not compromised");
            Ok(String::new())
        })
    }
}

/// E.164 parsing with a configured fallback region.
struct RegionalPhoneParser {
    default_region: Option<String>,
}

impl PhoneNumberParser for RegionalPhoneParser {
    fn parse(&self, input: &str, default_region: Option<&str>) -> Option<ParsedPhoneNumber> {
        let region = default_region.or(self.default_region.as_deref());
        E164PhoneParser.parse(input, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn load_from(toml: &str) -> Config {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap()
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::figment(Path::new("definitely-missing.toml"))
            .extract::<Config>()
            .unwrap();
        assert_eq!(config.format, OutputFormat::Text);
        assert!(!config.breach.enabled);
        assert_eq!(config.breach.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn file_overrides_nested_keys() {
        let config = load_from(
            r#"
            format = "json"
            groups = ["strict"]

            [breach]
            enabled = true
            timeout_secs = 2

            [phone]
            default_region = "DE"
            "#,
        );
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.groups, vec!["strict".to_owned()]);
        assert!(config.breach.enabled);
        assert_eq!(config.breach.timeout_secs, 2);
        assert!(!config.breach.skip_on_error);
        assert_eq!(config.phone.default_region.as_deref(), Some("DE"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Config::load(Some(Path::new("definitely-missing.toml"))).is_err());
    }

    #[test]
    fn lenient_checker_swallows_errors() {
        let failing = |_: &str| Err::<String, _>(ServiceError::Status(503));
        assert_eq!(Lenient(failing).fetch_range("ABCDE").unwrap(), "");
    }

    #[test]
    fn regional_parser_falls_back_to_configured_region() {
        let parser = RegionalPhoneParser {
            default_region: Some("DE".to_owned()),
        };
        assert!(parser.parse("030 1234567", None).is_some());
        assert!(parser.parse("030 1234567", Some("ZZ")).is_none());
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let mut config = Config::default();
        config.breach.enabled = true;
        config.breach.endpoint = "https://example.test/range".to_owned();
        assert!(config.services().is_err());
    }
}
