use serde::Deserialize;
use std::collections::BTreeSet;

/// Name of the opt-out file read from the root of the audited repository.
pub const IGNORE_FILE: &str = "repository-validator.json";

/// Per-repository rule opt-out, owned by the audited repository itself.
///
/// Wire schema (field names are part of the contract, case-sensitive):
/// `{ "Version": "1", "IgnoredRules": ["<RuleName>", ...] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IgnoreConfig {
    #[serde(rename = "Version", default)]
    pub version: String,

    #[serde(rename = "IgnoredRules", default)]
    pub ignored_rules: BTreeSet<String>,
}

impl IgnoreConfig {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Rule names match ignore keys exactly, case-sensitive.
    pub fn ignores(&self, rule_name: &str) -> bool {
        self.ignored_rules.contains(rule_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_documented_schema() {
        let cfg = IgnoreConfig::parse(
            r#"{ "Version": "1", "IgnoredRules": ["Stale branches", "Missing License"] }"#,
        )
        .expect("parse");
        assert_eq!(cfg.version, "1");
        assert!(cfg.ignores("Stale branches"));
        assert!(cfg.ignores("Missing License"));
        assert!(!cfg.ignores("Missing CODEOWNERS"));
    }

    #[test]
    fn ignore_keys_are_case_sensitive() {
        let cfg = IgnoreConfig::parse(r#"{ "Version": "1", "IgnoredRules": ["Stale branches"] }"#)
            .expect("parse");
        assert!(!cfg.ignores("stale branches"));
    }

    #[test]
    fn tolerates_missing_fields_and_extras() {
        let cfg = IgnoreConfig::parse(r#"{ "SomethingElse": true }"#).expect("parse");
        assert!(cfg.ignored_rules.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(IgnoreConfig::parse("{ not json").is_err());
    }
}
