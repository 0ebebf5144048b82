//! template.rs - Rendering of `{placeholder}` values into replacement templates.
//!
//! Replacement templates mix two syntaxes: `$N` capture group references, which the
//! regex engine expands per match, and `{name}` configuration placeholders, which are
//! rendered here with `tinytemplate`. Rendered values are escaped so that a `$` in a
//! URL is never read back as a capture group reference.
//!
//! License: MIT OR APACHE 2.0

use serde_json::{Map, Value};
use tinytemplate::{format_unescaped, TinyTemplate};

use crate::config::{
    PLACEHOLDER_ATTACHMENTS_PREFIX, PLACEHOLDER_ISSUE, PLACEHOLDER_REPO_URL,
    PLACEHOLDER_TICKET_ID, PLACEHOLDER_TRAC_URL,
};
use crate::errors::TrachubError;
use crate::escaping::escape_replacement_value;

/// Configuration values fixed for the lifetime of a translator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValues {
    pub repo_url: String,
    pub trac_url: Option<String>,
    pub attachments_prefix: Option<String>,
}

impl TemplateValues {
    pub fn new(
        repo_url: impl Into<String>,
        trac_url: Option<String>,
        attachments_prefix: Option<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            trac_url,
            attachments_prefix,
        }
    }

    /// Returns false when the placeholder refers to an optional value that is not configured.
    pub fn provides(&self, placeholder: &str) -> bool {
        match placeholder {
            PLACEHOLDER_TRAC_URL => self.trac_url.is_some(),
            PLACEHOLDER_ATTACHMENTS_PREFIX => self.attachments_prefix.is_some(),
            _ => true,
        }
    }

    fn context(&self) -> Map<String, Value> {
        let mut ctx = Map::new();
        ctx.insert(PLACEHOLDER_REPO_URL.into(), escaped(&self.repo_url));
        if let Some(url) = &self.trac_url {
            ctx.insert(PLACEHOLDER_TRAC_URL.into(), escaped(url));
        }
        if let Some(prefix) = &self.attachments_prefix {
            ctx.insert(PLACEHOLDER_ATTACHMENTS_PREFIX.into(), escaped(prefix));
        }
        ctx
    }
}

/// Per-call values: the ticket being translated and, for lookups, the resolved issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallValues {
    pub ticket_id: Option<u64>,
    pub issue: Option<u64>,
}

fn escaped(value: &str) -> Value {
    Value::String(escape_replacement_value(value))
}

/// Renders `template` into a regex replacement template.
pub fn render_template(
    rule_name: &str,
    template: &str,
    values: &TemplateValues,
    call: CallValues,
) -> Result<String, TrachubError> {
    let mut ctx = values.context();
    // An absent ticket id renders as an empty path segment.
    let ticket_id = call.ticket_id.map(|id| id.to_string()).unwrap_or_default();
    ctx.insert(PLACEHOLDER_TICKET_ID.into(), Value::String(ticket_id));
    if let Some(issue) = call.issue {
        ctx.insert(PLACEHOLDER_ISSUE.into(), Value::String(issue.to_string()));
    }

    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&format_unescaped);
    tt.add_template(rule_name, template)
        .map_err(|e| TrachubError::TemplateError(rule_name.to_string(), e.to_string()))?;
    tt.render(rule_name, &Value::Object(ctx))
        .map_err(|e| TrachubError::TemplateError(rule_name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> TemplateValues {
        TemplateValues::new(
            "https://github.com/o/r",
            Some("https://trac.example.org".to_string()),
            Some("https://x/files".to_string()),
        )
    }

    #[test]
    fn renders_configuration_and_keeps_capture_groups() {
        let out = render_template(
            "commit_hash",
            "$1[$3]({repo_url}/commit/$3)$4",
            &values(),
            CallValues::default(),
        )
        .unwrap();
        assert_eq!(out, "$1[$3](https://github.com/o/r/commit/$3)$4");
    }

    #[test]
    fn renders_ticket_id_per_call() {
        let call = CallValues {
            ticket_id: Some(5),
            issue: None,
        };
        let out = render_template(
            "attachment",
            "{attachments_prefix}/{ticket_id}/$1",
            &values(),
            call,
        )
        .unwrap();
        assert_eq!(out, "https://x/files/5/$1");
    }

    #[test]
    fn dollar_in_values_is_escaped() {
        let v = TemplateValues::new("https://host/$1", None, None);
        let out = render_template("r", "{repo_url}", &v, CallValues::default()).unwrap();
        assert_eq!(out, "https://host/$$1");
    }

    #[test]
    fn values_are_not_html_escaped() {
        let v = TemplateValues::new("https://host/a&b", None, None);
        let out = render_template("r", "{repo_url}", &v, CallValues::default()).unwrap();
        assert_eq!(out, "https://host/a&b");
    }

    #[test]
    fn missing_value_is_a_template_error() {
        let v = TemplateValues::new("https://host", None, None);
        let err = render_template("blog", "{trac_url}/blog/$1", &v, CallValues::default())
            .unwrap_err();
        assert!(matches!(err, TrachubError::TemplateError(name, _) if name == "blog"));
    }
}
