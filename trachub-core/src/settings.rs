// File: trachub-core/src/settings.rs
//! The migration configuration file.
//!
//! A YAML document describing where the Trac exports live, which tickets to convert and
//! how to label and assign the resulting issues. Relative paths are resolved against the
//! directory of the configuration file.
//!
//! ```yaml
//! repo: owner/name
//! tickets: tickets.csv
//! comments: comments.csv
//! trac_url: https://trac.example.org/project
//! convert_text: true
//! labels:
//!   - { field: type, value: defect, label: bug }
//! user_logins:
//!   "*": "*"
//! ```
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::RuleTable;
use crate::engines::wiki_translator::github_repo_url;
use crate::errors::TrachubError;
use crate::headless::{TranslatorKind, TranslatorOptions};
use crate::issue_map::IssueNumbering;
use crate::mapping::{LabelMapping, LabelRule, LoginMapping};

pub const OPTION_REPO: &str = "repo";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationSettings {
    /// Destination repository as `owner/name`.
    pub repo: String,
    pub tickets: PathBuf,
    pub comments: Option<PathBuf>,
    pub attachments: Option<PathBuf>,
    /// URL under which attachments are published, `{prefix}/{ticket}/{file}`.
    pub attachments_prefix: Option<String>,
    /// Base URL of the Trac instance, used for backlinks.
    pub trac_url: Option<String>,
    /// Translate wiki markup; when false all texts are copied verbatim.
    pub convert_text: bool,
    pub first_ticket: u64,
    /// 0 means no upper bound.
    pub last_ticket: u64,
    /// When non-empty, only these tickets are planned and their output is logged.
    pub tickets_to_render: Vec<u64>,
    /// Number of issues already present in the destination repository.
    pub existing_issues: u64,
    pub existing_issue_numbers: Vec<u64>,
    pub skip_colliding: bool,
    pub labels: Vec<LabelRule>,
    pub user_logins: Option<BTreeMap<String, String>>,
    pub add_component_labels: bool,
    /// Custom markup rule table replacing the built-in one.
    pub rules: Option<PathBuf>,
    pub disable_rules: Vec<String>,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            repo: String::new(),
            tickets: PathBuf::from("tickets.csv"),
            comments: None,
            attachments: None,
            attachments_prefix: None,
            trac_url: None,
            convert_text: false,
            first_ticket: 1,
            last_ticket: 0,
            tickets_to_render: Vec::new(),
            existing_issues: 0,
            existing_issue_numbers: Vec::new(),
            skip_colliding: false,
            labels: Vec::new(),
            user_logins: None,
            add_component_labels: false,
            rules: None,
            disable_rules: Vec::new(),
        }
    }
}

impl MigrationSettings {
    /// Loads and validates the settings file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading migration settings from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let mut settings: MigrationSettings = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        settings.resolve_paths(base_dir);
        settings.normalize_urls();
        settings.repo_parts()?;
        debug!("Settings loaded: {:?}", settings);
        Ok(settings)
    }

    /// Makes every relative input path relative to `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base_dir.join(&*p);
            }
        };
        resolve(&mut self.tickets);
        self.comments.iter_mut().for_each(resolve);
        self.attachments.iter_mut().for_each(resolve);
        self.rules.iter_mut().for_each(resolve);
    }

    fn normalize_urls(&mut self) {
        for url in [&mut self.trac_url, &mut self.attachments_prefix].into_iter().flatten() {
            while url.ends_with('/') {
                url.pop();
            }
        }
    }

    /// Splits `repo` into owner login and repository name.
    pub fn repo_parts(&self) -> Result<(&str, &str), TrachubError> {
        match self.repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(TrachubError::config(
                OPTION_REPO,
                format!("repository must be given as \"owner/name\" but is {:?}", self.repo),
            )),
        }
    }

    pub fn repo_url(&self) -> Result<String, TrachubError> {
        let (owner, name) = self.repo_parts()?;
        Ok(github_repo_url(owner, name))
    }

    pub fn numbering(&self) -> IssueNumbering {
        IssueNumbering {
            existing_issue_count: self.existing_issues,
            first_ticket: self.first_ticket,
            last_ticket: self.last_ticket,
            existing_issue_numbers: self.existing_issue_numbers.clone(),
            skip_colliding: self.skip_colliding,
        }
    }

    pub fn label_mapping(&self) -> Result<LabelMapping, TrachubError> {
        LabelMapping::new(self.labels.clone())
    }

    pub fn login_mapping(&self) -> Result<LoginMapping, TrachubError> {
        match &self.user_logins {
            Some(logins) => LoginMapping::new(logins.clone()),
            None => Ok(LoginMapping::default()),
        }
    }

    /// The rule table to translate with, or `None` for the unmodified built-in table.
    pub fn rule_table(&self) -> Result<Option<RuleTable>> {
        let mut table = match &self.rules {
            Some(path) => RuleTable::load_from_file(path)?,
            None if self.disable_rules.is_empty() => return Ok(None),
            None => RuleTable::load_default_rules()?,
        };
        table.set_active_rules(&self.disable_rules);
        Ok(Some(table))
    }

    pub fn translator_options(&self) -> Result<TranslatorOptions> {
        let rules = if self.convert_text { self.rule_table()? } else { None };
        Ok(TranslatorOptions {
            kind: TranslatorKind::from_convert_text(self.convert_text),
            repo_url: self.repo_url()?,
            trac_url: self.trac_url.clone(),
            attachments_prefix: self.attachments_prefix.clone(),
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_follow_the_documented_values() {
        let settings: MigrationSettings = serde_yml::from_str("repo: o/r").unwrap();
        assert_eq!(settings.first_ticket, 1);
        assert_eq!(settings.last_ticket, 0);
        assert_eq!(settings.tickets, PathBuf::from("tickets.csv"));
        assert!(!settings.convert_text);
        assert_eq!(settings.login_mapping().unwrap().login_for("x").unwrap(), "x");
    }

    #[test]
    fn relative_paths_follow_the_settings_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("migrate.yaml");
        fs::write(
            &path,
            "repo: o/r\ntickets: export/tickets.csv\ncomments: /abs/comments.csv\ntrac_url: https://trac.example.org/\n",
        )?;
        let settings = MigrationSettings::load_from_file(&path)?;
        assert_eq!(settings.tickets, dir.path().join("export/tickets.csv"));
        assert_eq!(settings.comments, Some(PathBuf::from("/abs/comments.csv")));
        assert_eq!(settings.trac_url.as_deref(), Some("https://trac.example.org"));
        Ok(())
    }

    #[test]
    fn rejects_malformed_repo() {
        let settings = MigrationSettings {
            repo: "just-a-name".to_string(),
            ..Default::default()
        };
        let err = settings.repo_url().unwrap_err();
        assert!(err.to_string().contains("\"repo\""));
    }

    #[test]
    fn rejects_unknown_options() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("migrate.yaml");
        fs::write(&path, "repo: o/r\ntokens: secret\n")?;
        assert!(MigrationSettings::load_from_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn disable_rules_apply_to_the_built_in_table() -> Result<()> {
        let settings = MigrationSettings {
            repo: "o/r".to_string(),
            convert_text: true,
            disable_rules: vec!["emphasis".to_string()],
            ..Default::default()
        };
        let table = settings.rule_table()?.expect("table with rules disabled");
        assert!(table.find("emphasis").is_err());
        assert!(table.find("strong_emphasis").is_ok());
        Ok(())
    }
}
