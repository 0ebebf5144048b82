//! Configuration management for `trachub-core`.
//!
//! This module defines the core data structures for markup rewrite rules. The rule
//! table is plain data: an ordered list of (pattern, replacement template) pairs
//! loaded from YAML, either the embedded default table or a user supplied file.
//! Order is significant and is preserved exactly as declared.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Placeholders a replacement template may reference, besides capture groups.
pub const PLACEHOLDER_REPO_URL: &str = "repo_url";
pub const PLACEHOLDER_TRAC_URL: &str = "trac_url";
pub const PLACEHOLDER_ATTACHMENTS_PREFIX: &str = "attachments_prefix";
pub const PLACEHOLDER_TICKET_ID: &str = "ticket_id";
pub const PLACEHOLDER_ISSUE: &str = "issue";

static CAPTURE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{?(\d+)\}?").expect("static capture reference regex"));

// `${name}` is a named capture group reference, `{name}` a template placeholder.
static TEMPLATE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static placeholder regex")
});

/// How a rule's replacement is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Replacement is fixed once the translator is constructed.
    #[default]
    Static,
    /// Replacement depends on the ticket being translated; applied before static rules.
    Context,
    /// Replacement is looked up in the ticket-to-issue map for every match.
    TicketLookup,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            RuleKind::Static => "static",
            RuleKind::Context => "context",
            RuleKind::TicketLookup => "ticket_lookup",
        };
        f.write_str(label)
    }
}

/// Represents a single markup rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationRule {
    /// Unique identifier for the rule (e.g., "heading_level_2").
    pub name: String,
    /// Human-readable description of what the rule rewrites.
    pub description: Option<String>,
    /// The regex pattern string.
    pub pattern: Option<String>,
    /// Replacement template: `$N` for capture groups, `{name}` for configuration values.
    pub replace_with: String,
    pub kind: RuleKind,
    /// If true, enables multiline mode for the regex engine.
    pub multiline: bool,
    /// If true, the dot character `.` in regex will match newlines.
    pub dot_matches_new_line: bool,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
    /// Matches whose first capture group starts with one of these are left untouched.
    pub deny_prefixes: Option<Vec<String>>,
    /// Matches directly followed by one of these are left untouched.
    pub deny_followed_by: Option<Vec<String>>,
}

impl Default for TranslationRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            pattern: None,
            replace_with: String::new(),
            kind: RuleKind::Static,
            multiline: false,
            dot_matches_new_line: true,
            enabled: None,
            deny_prefixes: None,
            deny_followed_by: None,
        }
    }
}

impl TranslationRule {
    /// Configuration placeholders (`{repo_url}`, ...) referenced by the replacement template.
    pub fn placeholders(&self) -> Vec<&str> {
        template_placeholders(&self.replace_with)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Returns the `{name}` placeholders of a replacement template, in order of appearance.
pub fn template_placeholders(template: &str) -> Vec<&str> {
    TEMPLATE_PLACEHOLDER
        .captures_iter(template)
        .filter(|caps| !caps[0].starts_with('$'))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// The ordered rule table applied by the translator.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuleTable {
    pub rules: Vec<TranslationRule>,
}

/// Error type for rule names that are not part of the table.
#[derive(Debug)]
pub struct RuleNotFoundError {
    pub rule_name: String,
}

impl fmt::Display for RuleNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Markup rule '{}' not found.", self.rule_name)
    }
}

impl std::error::Error for RuleNotFoundError {}

impl RuleTable {
    /// Loads a rule table from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom markup rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file {}", path.display()))?;
        let table: RuleTable = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse rule file {}", path.display()))?;

        validate_rules(&table.rules)?;
        info!("Loaded {} rules from file {}.", table.rules.len(), path.display());

        Ok(table)
    }

    /// Loads the built-in Trac wiki to GitHub markdown rules from the embedded table.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default markup rules from embedded string...");
        let default_yaml = include_str!("../config/markup_rules.yaml");
        let table: RuleTable =
            serde_yml::from_str(default_yaml).context("Failed to parse default markup rules")?;

        debug!("Loaded {} default markup rules.", table.rules.len());
        Ok(table)
    }

    /// Drops the named rules from the table, keeping the order of the rest.
    pub fn set_active_rules(&mut self, disable_rules: &[String]) {
        let disable_set: HashSet<&str> = disable_rules.iter().map(String::as_str).collect();
        let all_rule_names: HashSet<&str> = self.rules.iter().map(|r| r.name.as_str()).collect();

        for rule_name in disable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `disable_rules` list does not exist.", rule_name);
        }

        self.rules
            .retain(|rule| !disable_set.contains(rule.name.as_str()));
        debug!("Active markup rules after filtering: {}", self.rules.len());
    }

    pub fn find(&self, name: &str) -> Result<&TranslationRule, RuleNotFoundError> {
        self.rules
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RuleNotFoundError {
                rule_name: name.to_string(),
            })
    }
}

/// Validates rule integrity (regex compilation, capture groups, placeholders).
pub fn validate_rules(rules: &[TranslationRule]) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();
    let mut lookup_rules = 0usize;

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.clone()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        let pattern = match &rule.pattern {
            Some(p) if !p.is_empty() => p,
            _ => {
                errors.push(format!("Rule '{}' is missing the `pattern` field.", rule.name));
                continue;
            }
        };

        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                errors.push(format!("Rule '{}' has an invalid regex pattern: {}", rule.name, e));
                continue;
            }
        };
        let group_count = regex.captures_len() - 1;

        for cap in CAPTURE_REFERENCE.captures_iter(&rule.replace_with) {
            if let Some(Ok(group_num)) = cap.get(1).map(|m| m.as_str().parse::<usize>()) {
                if group_num > group_count {
                    errors.push(format!(
                        "Rule '{}': replacement references non-existent capture group '${}'.",
                        rule.name, group_num
                    ));
                }
            }
        }

        if rule.deny_prefixes.is_some() && group_count == 0 {
            errors.push(format!(
                "Rule '{}': `deny_prefixes` needs a pattern with at least one capture group.",
                rule.name
            ));
        }

        for placeholder in rule.placeholders() {
            let allowed = match placeholder {
                PLACEHOLDER_REPO_URL | PLACEHOLDER_TRAC_URL | PLACEHOLDER_ATTACHMENTS_PREFIX => true,
                PLACEHOLDER_TICKET_ID => rule.kind == RuleKind::Context,
                PLACEHOLDER_ISSUE => rule.kind == RuleKind::TicketLookup,
                _ => false,
            };
            if !allowed {
                errors.push(format!(
                    "Rule '{}': placeholder '{{{}}}' is not available to {} rules.",
                    rule.name, placeholder, rule.kind
                ));
            }
        }

        if rule.kind != RuleKind::Static && rule.replace_with.contains("${") {
            errors.push(format!(
                "Rule '{}': {} rules must reference capture groups as `$N`, not `${{N}}`.",
                rule.name, rule.kind
            ));
        }

        if rule.kind == RuleKind::TicketLookup {
            lookup_rules += 1;
            if group_count == 0 {
                errors.push(format!(
                    "Rule '{}': ticket lookup rules must capture the ticket number.",
                    rule.name
                ));
            }
        }
    }

    if lookup_rules > 1 {
        errors.push(format!(
            "Found {} ticket lookup rules; at most one is allowed.",
            lookup_rules
        ));
    }

    if !errors.is_empty() {
        let full_error_message = format!("Rule validation failed:\n{}", errors.join("\n"));
        Err(anyhow!(full_error_message))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, pattern: &str, replace_with: &str) -> TranslationRule {
        TranslationRule {
            name: name.to_string(),
            pattern: Some(pattern.to_string()),
            replace_with: replace_with.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn default_rules_are_valid_and_ordered() {
        let table = RuleTable::load_default_rules().unwrap();
        validate_rules(&table.rules).unwrap();

        let names: Vec<&str> = table.rules.iter().map(|r| r.name.as_str()).collect();
        let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();
        assert!(pos("code_block_language") < pos("code_inline"));
        assert!(pos("code_inline") < pos("code_block"));
        assert!(pos("heading_level_4") < pos("heading_level_1"));
        assert!(pos("strong_emphasis") < pos("emphasis"));
        assert!(pos("source_revision") < pos("source_path"));
        assert_eq!(*names.last().unwrap(), "ticket_reference");
    }

    #[test]
    fn default_rules_have_no_numbered_list_rule() {
        let table = RuleTable::load_default_rules().unwrap();
        assert!(table.rules.iter().all(|r| !r.name.contains("numbered")));
    }

    #[test]
    fn placeholders_ignore_braced_capture_groups() {
        assert_eq!(template_placeholders("_${1}_"), Vec::<&str>::new());
        assert_eq!(
            template_placeholders("$1[$3]({repo_url}/commit/$3)$4"),
            vec!["repo_url"]
        );
        assert_eq!(
            template_placeholders("{attachments_prefix}/{ticket_id}/$1"),
            vec!["attachments_prefix", "ticket_id"]
        );
    }

    #[test]
    fn rejects_missing_capture_group() {
        let err = validate_rules(&[rule("bad", "a(b)", "$2")]).unwrap_err();
        assert!(err.to_string().contains("non-existent capture group '$2'"));
    }

    #[test]
    fn capture_count_ignores_parentheses_in_classes() {
        validate_rules(&[rule("class", r"\[([^().]+)\]", "$1")]).unwrap();
        assert!(validate_rules(&[rule("class", r"\[([^().]+)\]", "$2")]).is_err());
    }

    #[test]
    fn rejects_duplicates_and_bad_patterns() {
        let err = validate_rules(&[rule("dup", "a", "b"), rule("dup", "(", "b")]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Duplicate rule name found: 'dup'"));
        assert!(message.contains("invalid regex pattern"));
    }

    #[test]
    fn rejects_ticket_placeholder_outside_context_rules() {
        let err = validate_rules(&[rule("ctx", "x", "{ticket_id}")]).unwrap_err();
        assert!(err.to_string().contains("not available to static rules"));

        let mut ctx = rule("ctx", "x", "{ticket_id}");
        ctx.kind = RuleKind::Context;
        validate_rules(&[ctx]).unwrap();
    }

    #[test]
    fn set_active_rules_keeps_order() {
        let mut table = RuleTable {
            rules: vec![rule("a", "a", "1"), rule("b", "b", "2"), rule("c", "c", "3")],
        };
        table.set_active_rules(&["b".to_string(), "missing".to_string()]);
        let names: Vec<&str> = table.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
