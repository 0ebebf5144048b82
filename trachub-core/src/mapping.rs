// File: trachub-core/src/mapping.rs
//! Mapping of Trac field values to GitHub labels and of Trac users to GitHub logins.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::TrachubError;

pub const OPTION_LABELS: &str = "labels";
pub const OPTION_USER_LOGINS: &str = "user_logins";

/// Matches any Trac user in a login mapping, either as key or as value.
pub const WILDCARD: &str = "*";

/// Trac fields a label can be derived from.
pub const LABEL_FIELDS: [&str; 4] = ["type", "resolution", "priority", "keyword"];

/// `field = value: label`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelRule {
    pub field: String,
    pub value: String,
    pub label: String,
}

/// Ordered label transformations; the first matching rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LabelMapping {
    rules: Vec<LabelRule>,
}

impl LabelMapping {
    pub fn new(rules: Vec<LabelRule>) -> Result<Self, TrachubError> {
        for rule in &rules {
            if rule.label.trim().is_empty() {
                return Err(TrachubError::config(
                    OPTION_LABELS,
                    format!("label for Trac field \"{}\" = {:?} must not be empty", rule.field, rule.value),
                ));
            }
            if !LABEL_FIELDS.contains(&rule.field.as_str()) {
                warn!(
                    "Label rule for unknown Trac field '{}' will never match; known fields: {}",
                    rule.field,
                    LABEL_FIELDS.join(", ")
                );
            }
        }
        Ok(Self { rules })
    }

    pub fn label_for(&self, field: &str, value: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.field == field && rule.value == value)
            .map(|rule| rule.label.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Trac user name to GitHub login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LoginMapping {
    logins: BTreeMap<String, String>,
}

impl Default for LoginMapping {
    /// Every Trac user keeps their name.
    fn default() -> Self {
        Self {
            logins: BTreeMap::from([(WILDCARD.to_string(), WILDCARD.to_string())]),
        }
    }
}

impl LoginMapping {
    pub fn new(logins: BTreeMap<String, String>) -> Result<Self, TrachubError> {
        for (user, login) in &logins {
            if login.trim().is_empty() {
                return Err(TrachubError::config(
                    OPTION_USER_LOGINS,
                    format!("login for Trac user \"{}\" must not be empty", user),
                ));
            }
            debug!("User login mapping found for: {}={}", user, login);
        }
        Ok(Self { logins })
    }

    /// The GitHub login for `trac_user`.
    ///
    /// Falls back to the `*` entry; a `*` login means the Trac user name itself.
    pub fn login_for(&self, trac_user: &str) -> Result<String, TrachubError> {
        let login = self
            .logins
            .get(trac_user)
            .or_else(|| self.logins.get(WILDCARD))
            .ok_or_else(|| {
                TrachubError::config(
                    OPTION_USER_LOGINS,
                    format!("Trac user \"{}\" must be mapped to a GitHub login", trac_user),
                )
            })?;
        if login == WILDCARD {
            Ok(trac_user.to_string())
        } else {
            Ok(login.clone())
        }
    }
}
