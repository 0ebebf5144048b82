// trachub-core/src/engines/wiki_translator.rs
//! A `MarkupTranslator` that rewrites Trac wiki markup into GitHub markdown with an
//! ordered table of regular expression rules.
//!
//! Translation runs in two passes. The context pass applies the attachment and image
//! rules, whose replacement depends on the ticket being translated. The main pass then
//! applies every other rule in declaration order, each one over the output of the
//! previous rule. The ticket lookup rule sits at its declared position in that pass and
//! resolves `ticket:N` through the ticket-to-issue map.
//!
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use log::{debug, info};
use regex::Captures;

use crate::config::{validate_rules, RuleKind, RuleTable};
use crate::engine::{MarkupTranslator, RuleHit, TicketId};
use crate::errors::TrachubError;
use crate::issue_map::TicketToIssueMap;
use crate::rules::compiler::{compile_rules, CompiledRule, CompiledRules};
use crate::rules::template::{render_template, CallValues, TemplateValues};

/// Base URL of a GitHub repository.
pub fn github_repo_url(owner_login: &str, repo_name: &str) -> String {
    format!("https://github.com/{}/{}", owner_login, repo_name)
}

#[derive(Debug)]
pub struct WikiTranslator {
    compiled_rules: CompiledRules,
    values: TemplateValues,
    ticket_map: Arc<TicketToIssueMap>,
}

impl WikiTranslator {
    /// Creates a translator with the built-in rule table.
    ///
    /// `ticket_map` must already contain every ticket that any translated text refers to.
    pub fn new(
        repo_url: impl Into<String>,
        ticket_map: impl Into<Arc<TicketToIssueMap>>,
        trac_url: Option<String>,
        attachments_prefix: Option<String>,
    ) -> Result<Self, TrachubError> {
        let table = RuleTable::load_default_rules()?;
        Self::with_rules(
            table,
            TemplateValues::new(repo_url, trac_url, attachments_prefix),
            ticket_map,
        )
    }

    /// Creates a translator with an arbitrary rule table.
    pub fn with_rules(
        table: RuleTable,
        values: TemplateValues,
        ticket_map: impl Into<Arc<TicketToIssueMap>>,
    ) -> Result<Self, TrachubError> {
        validate_rules(&table.rules)?;
        let compiled_rules = compile_rules(table.rules, &values)?;
        info!(
            "Markup translator ready with {} rules for {}.",
            compiled_rules.len(),
            values.repo_url
        );

        Ok(Self {
            compiled_rules,
            values,
            ticket_map: ticket_map.into(),
        })
    }

    pub fn compiled_rules(&self) -> &CompiledRules {
        &self.compiled_rules
    }

    pub fn ticket_map(&self) -> &TicketToIssueMap {
        &self.ticket_map
    }

    fn resolve_ticket(&self, rule: &CompiledRule, caps: &Captures<'_>) -> Result<u64, TrachubError> {
        let reference = caps
            .get(1)
            .map(|m| m.as_str())
            .ok_or_else(|| TrachubError::Fatal(format!("Rule '{}' captured no ticket number", rule.name)))?;
        let ticket_id: TicketId = reference.parse().map_err(|_| {
            TrachubError::Fatal(format!("Ticket reference '{}' is not a valid ticket number", reference))
        })?;
        self.ticket_map
            .get(ticket_id)
            .ok_or(TrachubError::UnresolvedTicketReference(ticket_id))
    }
}

/// Replaces every non-overlapping match of `rule` in `text`, left to right.
///
/// Returns `None` when nothing was rewritten. A match rejected by the rule's deny lists is
/// kept verbatim and the search resumes one character after the start of that match.
fn rewrite_all<F>(
    rule: &CompiledRule,
    text: &str,
    mut replacement: F,
) -> Result<Option<(String, usize)>, TrachubError>
where
    F: FnMut(&Captures<'_>, &mut String) -> Result<(), TrachubError>,
{
    let mut out = String::new();
    let mut last_end = 0usize;
    let mut search_from = 0usize;
    let mut hits = 0usize;

    while search_from <= text.len() {
        let Some(caps) = rule.regex.captures_at(text, search_from) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        if rule.is_denied(&caps, text) {
            search_from = next_char_boundary(text, whole.start());
            continue;
        }

        if hits == 0 {
            out.reserve(text.len());
        }
        out.push_str(&text[last_end..whole.start()]);
        replacement(&caps, &mut out)?;
        last_end = whole.end();
        hits += 1;
        search_from = if whole.is_empty() {
            next_char_boundary(text, whole.end())
        } else {
            whole.end()
        };
    }

    if hits == 0 {
        return Ok(None);
    }
    out.push_str(&text[last_end..]);
    Ok(Some((out, hits)))
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| index + c.len_utf8())
}

impl MarkupTranslator for WikiTranslator {
    fn translate_with_summary(
        &self,
        text: &str,
        ticket_id: Option<TicketId>,
    ) -> Result<(String, Vec<RuleHit>), TrachubError> {
        let call = CallValues {
            ticket_id,
            issue: None,
        };
        let mut current = text.to_string();
        let mut summary = Vec::new();

        let mut record = |rule: &CompiledRule, result: Option<(String, usize)>, current: &mut String| {
            if let Some((rewritten, occurrences)) = result {
                debug!("Rule '{}' rewrote {} match(es).", rule.name, occurrences);
                *current = rewritten;
                summary.push(RuleHit {
                    rule_name: rule.name.clone(),
                    occurrences,
                });
            }
        };

        for rule in &self.compiled_rules.context_rules {
            if !rule.regex.is_match(&current) {
                continue;
            }
            let template = render_template(&rule.name, &rule.replace_with, &self.values, call)?;
            let result = rewrite_all(rule, &current, |caps, dst| {
                caps.expand(&template, dst);
                Ok(())
            })?;
            record(rule, result, &mut current);
        }

        for rule in &self.compiled_rules.rules {
            let result = match rule.kind {
                RuleKind::TicketLookup => rewrite_all(rule, &current, |caps, dst| {
                    let issue = self.resolve_ticket(rule, caps)?;
                    let lookup_call = CallValues {
                        issue: Some(issue),
                        ..call
                    };
                    let template =
                        render_template(&rule.name, &rule.replace_with, &self.values, lookup_call)?;
                    caps.expand(&template, dst);
                    Ok(())
                })?,
                RuleKind::Static | RuleKind::Context => rewrite_all(rule, &current, |caps, dst| {
                    caps.expand(&rule.replace_with, dst);
                    Ok(())
                })?,
            };
            record(rule, result, &mut current);
        }

        Ok((current, summary))
    }

    fn name(&self) -> &str {
        "trac-wiki"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationRule;

    fn translator() -> WikiTranslator {
        let map: TicketToIssueMap = [(42, 7), (1, 1)].into_iter().collect();
        WikiTranslator::new(
            github_repo_url("owner", "repo"),
            map,
            Some("https://trac.example.org".to_string()),
            Some("https://x/files".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn derives_repository_url() {
        assert_eq!(github_repo_url("o", "r"), "https://github.com/o/r");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(translator().translate("", Some(1)).unwrap(), "");
    }

    #[test]
    fn summary_lists_rules_that_fired_in_order() {
        let (out, hits) = translator()
            .translate_with_summary("== Intro ==\nsee ticket:42 and ticket:1", None)
            .unwrap();
        assert_eq!(out, "## Intro\nsee issue #7 and issue #1");
        let names: Vec<&str> = hits.iter().map(|h| h.rule_name.as_str()).collect();
        assert_eq!(names, vec!["heading_level_2", "ticket_reference"]);
        assert_eq!(hits[1].occurrences, 2);
    }

    #[test]
    fn denied_match_resumes_inside_the_rejected_span() {
        let rule = TranslationRule {
            name: "link".to_string(),
            pattern: Some(r"\[(\S+)\s+([^\]]+)\]".to_string()),
            replace_with: "[$2]($1)".to_string(),
            deny_prefixes: Some(vec!["Thu".to_string()]),
            ..Default::default()
        };
        let t = WikiTranslator::with_rules(
            RuleTable { rules: vec![rule] },
            TemplateValues::new("u", None, None),
            TicketToIssueMap::default(),
        )
        .unwrap();
        let out = t.translate("[Thu [http://x y]", None).unwrap();
        assert_eq!(out, "[Thu [y](http://x)");
    }

    #[test]
    fn oversized_ticket_number_is_an_error() {
        let err = translator()
            .translate("ticket:99999999999999999999999", None)
            .unwrap_err();
        assert!(matches!(err, TrachubError::Fatal(_)));
    }

    #[test]
    fn next_char_boundary_handles_multibyte() {
        let text = "éa";
        assert_eq!(next_char_boundary(text, 0), 2);
        assert_eq!(next_char_boundary(text, 2), 3);
        assert_eq!(next_char_boundary(text, 3), 4);
    }
}
