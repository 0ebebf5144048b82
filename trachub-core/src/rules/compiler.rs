//! compiler.rs - Compiles the markup rule table into ready-to-apply rules.
//!
//! Compilation happens once per translator. Static rules have their configuration
//! placeholders rendered here; context and ticket lookup rules keep their raw template
//! because their replacement depends on the call. The compiled rules are owned by the
//! translator that built them, there is no process-wide cache.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use regex::{Captures, Regex, RegexBuilder};

use crate::config::{RuleKind, TranslationRule, MAX_PATTERN_LENGTH};
use crate::errors::TrachubError;
use crate::rules::template::{render_template, CallValues, TemplateValues};

/// Represents a single compiled markup rule.
#[derive(Debug)]
pub struct CompiledRule {
    /// The compiled regular expression used for matching.
    pub regex: Regex,
    /// Replacement template. Fully rendered for static rules, raw otherwise.
    pub replace_with: String,
    /// The unique name of the markup rule.
    pub name: String,
    pub kind: RuleKind,
    pub deny_prefixes: Vec<String>,
    pub deny_followed_by: Vec<String>,
}

impl CompiledRule {
    /// True when the first capture group starts with a denied prefix, or the text right
    /// after the match starts with a denied suffix.
    pub fn is_denied(&self, caps: &Captures<'_>, haystack: &str) -> bool {
        let denied_prefix = caps.get(1).is_some_and(|target| {
            self.deny_prefixes
                .iter()
                .any(|prefix| target.as_str().starts_with(prefix.as_str()))
        });
        if denied_prefix {
            return true;
        }
        caps.get(0).is_some_and(|whole| {
            let rest = &haystack[whole.end()..];
            self.deny_followed_by
                .iter()
                .any(|follower| rest.starts_with(follower.as_str()))
        })
    }
}

/// The compiled rule set, split into the per-ticket context pass and the main pass.
#[derive(Debug, Default)]
pub struct CompiledRules {
    /// Context rules, applied first, in declaration order.
    pub context_rules: Vec<CompiledRule>,
    /// Static and ticket lookup rules, in declaration order.
    pub rules: Vec<CompiledRule>,
}

impl CompiledRules {
    pub fn len(&self) -> usize {
        self.context_rules.len() + self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All rules in the order they are applied.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.context_rules.iter().chain(self.rules.iter())
    }
}

/// Compiles a list of `TranslationRule`s into `CompiledRules`.
///
/// Rules whose template needs an optional value that is not configured (`{trac_url}`
/// or `{attachments_prefix}`) are skipped and leave their matches untouched.
pub fn compile_rules(
    rules_to_compile: Vec<TranslationRule>,
    values: &TemplateValues,
) -> Result<CompiledRules, TrachubError> {
    debug!("Starting compilation of {} markup rules.", rules_to_compile.len());

    let mut compiled = CompiledRules::default();
    let mut compilation_errors = Vec::new();

    for rule in rules_to_compile {
        if !rule.is_enabled() {
            debug!("Skipping rule '{}' because it is disabled.", &rule.name);
            continue;
        }

        if let Some(missing) = rule.placeholders().into_iter().find(|p| !values.provides(p)) {
            debug!(
                "Skipping rule '{}' because '{}' is not configured.",
                &rule.name, missing
            );
            continue;
        }

        let Some(pattern) = rule.pattern.as_ref() else {
            warn!("Skipping rule '{}' because its pattern is missing.", &rule.name);
            continue;
        };

        if pattern.len() > MAX_PATTERN_LENGTH {
            compilation_errors.push(TrachubError::PatternLengthExceeded(
                rule.name,
                pattern.len(),
                MAX_PATTERN_LENGTH,
            ));
            continue;
        }

        let regex = match RegexBuilder::new(pattern)
            .multi_line(rule.multiline)
            .dot_matches_new_line(rule.dot_matches_new_line)
            .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
            .build()
        {
            Ok(regex) => regex,
            Err(e) => {
                compilation_errors.push(TrachubError::RuleCompilationError(rule.name, e));
                continue;
            }
        };

        let replace_with = if rule.kind == RuleKind::Static && !rule.placeholders().is_empty() {
            match render_template(&rule.name, &rule.replace_with, values, CallValues::default()) {
                Ok(rendered) => rendered,
                Err(e) => {
                    compilation_errors.push(e);
                    continue;
                }
            }
        } else {
            rule.replace_with
        };

        log::debug!(
            target: "trachub_core::rules",
            "Rule '{}' compiled successfully.",
            &rule.name
        );
        let compiled_rule = CompiledRule {
            regex,
            replace_with,
            name: rule.name,
            kind: rule.kind,
            deny_prefixes: rule.deny_prefixes.unwrap_or_default(),
            deny_followed_by: rule.deny_followed_by.unwrap_or_default(),
        };
        match compiled_rule.kind {
            RuleKind::Context => compiled.context_rules.push(compiled_rule),
            RuleKind::Static | RuleKind::TicketLookup => compiled.rules.push(compiled_rule),
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        Err(TrachubError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            compilation_errors.len(),
            error_message
        )))
    } else {
        debug!("Finished compiling rules. Total compiled: {}.", compiled.len());
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleTable;

    fn rule(name: &str, kind: RuleKind, pattern: &str, replace_with: &str) -> TranslationRule {
        TranslationRule {
            name: name.to_string(),
            kind,
            pattern: Some(pattern.to_string()),
            replace_with: replace_with.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn splits_context_rules_and_keeps_order() {
        let rules = vec![
            rule("a", RuleKind::Static, "a", "A"),
            rule("ctx", RuleKind::Context, "c", "{ticket_id}"),
            rule("lookup", RuleKind::TicketLookup, "t([0-9]+)", "#{issue}"),
            rule("b", RuleKind::Static, "b", "B"),
        ];
        let compiled = compile_rules(rules, &TemplateValues::new("u", None, None)).unwrap();
        let names: Vec<&str> = compiled.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "lookup", "b"]);
        assert_eq!(compiled.context_rules[0].name, "ctx");
        assert_eq!(compiled.context_rules[0].replace_with, "{ticket_id}");
    }

    #[test]
    fn static_templates_are_rendered_once() {
        let rules = vec![rule("commit", RuleKind::Static, "([0-9a-f]+)", "{repo_url}/commit/$1")];
        let compiled =
            compile_rules(rules, &TemplateValues::new("https://github.com/o/r", None, None))
                .unwrap();
        assert_eq!(compiled.rules[0].replace_with, "https://github.com/o/r/commit/$1");
    }

    #[test]
    fn rules_needing_unconfigured_values_are_skipped() {
        let table = RuleTable::load_default_rules().unwrap();
        let compiled =
            compile_rules(table.rules, &TemplateValues::new("https://github.com/o/r", None, None))
                .unwrap();
        assert!(compiled.context_rules.is_empty());
        assert!(compiled.iter().all(|r| r.name != "blog" && r.name != "diff_range"));
        assert!(compiled.iter().any(|r| r.name == "commit_hash"));
    }

    #[test]
    fn collects_all_compilation_errors() {
        let rules = vec![
            rule("broken_one", RuleKind::Static, "(", "x"),
            rule("broken_two", RuleKind::Static, "[", "x"),
        ];
        let err = compile_rules(rules, &TemplateValues::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Failed to compile 2 rule(s)"));
        assert!(message.contains("broken_one"));
        assert!(message.contains("broken_two"));
    }

    #[test]
    fn rejects_overlong_patterns() {
        let long = "a".repeat(MAX_PATTERN_LENGTH + 1);
        let err = compile_rules(vec![rule("long", RuleKind::Static, &long, "x")], &TemplateValues::default())
            .unwrap_err();
        assert!(err.to_string().contains("exceeds maximum allowed"));
    }

    #[test]
    fn deny_prefixes_check_first_group() {
        let mut r = rule("link", RuleKind::Static, r"\[(\S+) ([^\]]+)\]", "[$2]($1)");
        r.deny_prefixes = Some(vec!["Thu".to_string()]);
        let compiled = compile_rules(vec![r], &TemplateValues::default()).unwrap();
        let link = &compiled.rules[0];
        let denied = link.regex.captures("[Thu Jan 01]").unwrap();
        let allowed = link.regex.captures("[http://x y]").unwrap();
        assert!(link.is_denied(&denied, "[Thu Jan 01]"));
        assert!(!link.is_denied(&allowed, "[http://x y]"));
    }

    #[test]
    fn deny_followed_by_checks_text_after_match() {
        let mut r = rule("link", RuleKind::Static, r"\[(\S+) ([^\]]+)\]", "[$2]($1)");
        r.deny_followed_by = Some(vec!["(".to_string()]);
        let compiled = compile_rules(vec![r], &TemplateValues::default()).unwrap();
        let link = &compiled.rules[0];
        let converted = "[the docs](wiki:Docs)";
        let caps = link.regex.captures(converted).unwrap();
        assert!(link.is_denied(&caps, converted));
        let raw = "[wiki:Docs the docs] more";
        let caps = link.regex.captures(raw).unwrap();
        assert!(!link.is_denied(&caps, raw));
    }
}
