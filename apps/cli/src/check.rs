//! `rampart check`: validate JSON documents against a rule file.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rampart_validator::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::config::{Config, OutputFormat};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Rule file (`.toml`, anything else is read as JSON)
    #[arg(long)]
    pub rules: PathBuf,

    /// Document to validate; `-` or omitted reads stdin
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Validation group to run (repeatable); defaults to `Default`
    #[arg(long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Violations found in one document of the input.
#[derive(Debug, Serialize)]
struct Report {
    document: usize,
    violations: ViolationList,
}

/// Runs the check and returns `true` when every document is valid.
pub fn run(args: &CheckArgs, config: &Config, out: &mut impl Write) -> Result<bool> {
    let rules = load_rules(&args.rules)?;
    let documents = read_documents(args.input.as_deref())?;

    let groups: Vec<&str> = if args.groups.is_empty() {
        config.groups.iter().map(String::as_str).collect()
    } else {
        args.groups.iter().map(String::as_str).collect()
    };

    let validator = Validator::builder().services(config.services()?).build();
    let reports = documents
        .iter()
        .enumerate()
        .map(|(document, value)| -> Result<Report> {
            let violations = validator
                .validate_object(value, &rules, &groups)
                .with_context(|| format!("document {document} could not be validated"))?;
            Ok(Report {
                document,
                violations,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let total: usize = reports.iter().map(|r| r.violations.len()).sum();
    info!(documents = reports.len(), violations = total, "check finished");

    match args.format.unwrap_or(config.format) {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &reports)?;
            writeln!(out)?;
        }
        OutputFormat::Text => write_text(&reports, total, out)?,
    }
    Ok(total == 0)
}

fn write_text(reports: &[Report], total: usize, out: &mut impl Write) -> io::Result<()> {
    let several = reports.len() > 1;
    for report in reports {
        for violation in report.violations.iter() {
            if several {
                write!(out, "[{}] ", report.document)?;
            }
            writeln!(out, "{violation}")?;
        }
    }
    match total {
        0 => writeln!(out, "no violations"),
        1 => writeln!(out, "1 violation"),
        n => writeln!(out, "{n} violations"),
    }
}

fn load_rules(path: &Path) -> Result<ConstraintSet> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("cannot read rule file {}", path.display()))?;
    let rules = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml")) {
        ConstraintSet::from_toml_str(&source)
    } else {
        ConstraintSet::from_json_str(&source)
    };
    rules.with_context(|| format!("invalid rule file {}", path.display()))
}

/// Reads one object, or an array of objects, as a list of documents.
fn read_documents(input: Option<&Path>) -> Result<Vec<Value>> {
    let source = match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("cannot read input {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("cannot read stdin")?;
            buffer
        }
    };
    let json: serde_json::Value =
        serde_json::from_str(&source).context("input is not valid JSON")?;
    Ok(match json {
        serde_json::Value::Array(items) => items.into_iter().map(Value::from).collect(),
        other => vec![Value::from(other)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(document: usize, value: serde_json::Value, rules: &ConstraintSet) -> Report {
        let violations = Validator::new()
            .validate_object(&value.into(), rules, &[])
            .unwrap();
        Report {
            document,
            violations,
        }
    }

    #[test]
    fn text_output_prefixes_documents_only_when_several() {
        let rules = ConstraintSet::new().with_field("name", vec![NotBlank::default().into()]);
        let single = [report(0, serde_json::json!({ "name": "" }), &rules)];

        let mut out = Vec::new();
        write_text(&single, 1, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            format!(
                "name: This value should not be blank. (code {})\n1 violation\n",
                NotBlank::IS_BLANK_ERROR
            )
        );

        let several = [
            report(0, serde_json::json!({ "name": "ok" }), &rules),
            report(1, serde_json::json!({}), &rules),
        ];
        let mut out = Vec::new();
        write_text(&several, 1, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("[1] name: "));
    }

    #[test]
    fn rule_format_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml = dir.path().join("rules.TOML");
        fs::write(&toml, "[[fields.name]]\ntype = \"not_blank\"\n").unwrap();
        assert_eq!(load_rules(&toml).unwrap().len(), 1);

        let json = dir.path().join("rules.json");
        fs::write(&json, r#"{ "fields": { "name": [{ "type": "not_blank" }] } }"#).unwrap();
        assert_eq!(load_rules(&json).unwrap().len(), 1);
    }
}
