//! Policy configuration and its load-time normalization.
//!
//! Rule tables accept several loose shapes, as hand-written configuration
//! tends to use them:
//!
//! ```toml
//! https = false
//! prefixes = ["admin"]        # or a single string: prefixes = "admin"
//!
//! [secured]
//! payments = ["checkout", "refund"]
//! users = "login"             # one action
//! accounts = "*"              # every action
//! "*" = ["login"]             # `login` on any controller
//!
//! [allowed]
//! payments = ["public"]
//! ```
//!
//! A table may also be a list of controller names (`secured = ["users"]`)
//! or a single name, each meaning "every action". In formats with `null`
//! (JSON), a null action spec also means every action.
//!
//! Shapes that make no sense (numbers, booleans, nested tables) are dropped
//! with a warning instead of failing the load. The same goes for an `https`
//! that is not a boolean: it is ignored and the transport is auto-detected.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::rule::{ActionRule, RuleTable};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read configuration file `{path}`")]
    Io {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML or has a mistyped key
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration supplied to [`PolicyStore::init`](crate::PolicyStore::init).
///
/// Every key is optional. Absent tables leave existing state untouched when
/// merging and become empty when replacing; an absent `https` triggers
/// auto-detection.
///
/// # Examples
///
/// ```
/// use secure_routes::{ActionRule, PolicyConfig};
///
/// let from_toml = PolicyConfig::from_toml_str(r#"
///     prefixes = "admin"
///
///     [secured]
///     payments = ["checkout", "refund"]
/// "#).unwrap();
///
/// let built = PolicyConfig::new()
///     .secure("payments", ActionRule::from_actions(["checkout", "refund"]))
///     .lock_prefix("admin");
///
/// assert_eq!(from_toml, built);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PolicyConfig {
    /// Endpoints forced onto the secure transport
    #[serde(default, deserialize_with = "deserialize_rule_table")]
    pub secured: Option<RuleTable>,
    /// Endpoints exempt from enforcement; checked before `secured`
    #[serde(default, deserialize_with = "deserialize_rule_table")]
    pub allowed: Option<RuleTable>,
    /// Route prefixes locked down to the secure transport as a whole
    #[serde(default, deserialize_with = "deserialize_prefixes")]
    pub prefixes: Option<BTreeSet<String>>,
    /// Explicit transport state; auto-detected when absent
    #[serde(default, deserialize_with = "deserialize_https")]
    pub https: Option<bool>,
}

impl PolicyConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;

        tracing::debug!(path = %path.display(), "Loaded transport policy configuration");
        Ok(config)
    }

    /// Adds a `secured` rule.
    pub fn secure(mut self, controller: impl Into<String>, rule: ActionRule) -> Self {
        self.secured
            .get_or_insert_with(RuleTable::new)
            .insert(controller, rule);
        self
    }

    /// Adds an `allowed` rule.
    pub fn allow(mut self, controller: impl Into<String>, rule: ActionRule) -> Self {
        self.allowed
            .get_or_insert_with(RuleTable::new)
            .insert(controller, rule);
        self
    }

    /// Locks a whole route prefix to the secure transport.
    pub fn lock_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.prefixes.get_or_insert_with(BTreeSet::new).insert(prefix);
        }
        self
    }

    /// Sets the transport state explicitly, disabling auto-detection.
    pub fn force_https(mut self, https: bool) -> Self {
        self.https = Some(https);
        self
    }
}

/// Options controlling how [`PolicyStore::init`](crate::PolicyStore::init)
/// applies a [`PolicyConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOptions {
    /// Merge supplied tables into existing state instead of replacing it
    pub merge: bool,
    /// Detect the transport from the environment when `https` is absent
    pub https_auto_detect: bool,
}

impl InitOptions {
    /// Options that replace existing state wholesale.
    pub fn replace() -> Self {
        Self {
            merge: false,
            ..Self::default()
        }
    }
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            merge: true,
            https_auto_detect: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRuleTable {
    Map(BTreeMap<String, Option<RawActions>>),
    List(Vec<String>),
    Single(String),
    Malformed(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawActions {
    One(String),
    Many(Vec<String>),
    Malformed(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrefixes {
    One(String),
    Many(Vec<String>),
    Malformed(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawHttps {
    Flag(bool),
    Malformed(IgnoredAny),
}

impl RawRuleTable {
    fn normalize(self) -> RuleTable {
        match self {
            RawRuleTable::Map(entries) => entries
                .into_iter()
                .filter_map(|(controller, actions)| {
                    let rule = match actions {
                        None => ActionRule::All,
                        Some(RawActions::One(action)) => ActionRule::from_actions([action]),
                        Some(RawActions::Many(actions)) => ActionRule::from_actions(actions),
                        Some(RawActions::Malformed(_)) => {
                            tracing::warn!(
                                controller = %controller,
                                "Dropping rule with malformed action list"
                            );
                            return None;
                        }
                    };
                    Some((controller, rule))
                })
                .collect(),
            RawRuleTable::List(controllers) => controllers
                .into_iter()
                .map(|controller| (controller, ActionRule::All))
                .collect(),
            RawRuleTable::Single(controller) => {
                [(controller, ActionRule::All)].into_iter().collect()
            }
            RawRuleTable::Malformed(_) => {
                tracing::warn!("Malformed rule table treated as empty");
                RuleTable::new()
            }
        }
    }
}

impl RawPrefixes {
    fn normalize(self) -> BTreeSet<String> {
        let prefixes = match self {
            RawPrefixes::One(prefix) => vec![prefix],
            RawPrefixes::Many(prefixes) => prefixes,
            RawPrefixes::Malformed(_) => {
                tracing::warn!("Malformed prefix list treated as empty");
                Vec::new()
            }
        };
        prefixes.into_iter().filter(|p| !p.is_empty()).collect()
    }
}

fn deserialize_rule_table<'de, D>(deserializer: D) -> Result<Option<RuleTable>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawRuleTable>::deserialize(deserializer)?;
    Ok(raw.map(RawRuleTable::normalize))
}

fn deserialize_prefixes<'de, D>(deserializer: D) -> Result<Option<BTreeSet<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawPrefixes>::deserialize(deserializer)?;
    Ok(raw.map(RawPrefixes::normalize))
}

fn deserialize_https<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawHttps>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawHttps::Flag(flag)) => Some(flag),
        Some(RawHttps::Malformed(_)) => {
            tracing::warn!("Non-boolean `https` ignored; transport will be auto-detected");
            None
        }
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_empty_config() {
        let config = PolicyConfig::from_toml_str("").unwrap();
        assert_eq!(config, PolicyConfig::default());
        assert!(config.secured.is_none());
        assert!(config.https.is_none());
    }

    #[test]
    fn map_table_normalizes_action_shapes() {
        let config = PolicyConfig::from_toml_str(
            r#"
            [secured]
            payments = ["checkout", "refund"]
            users = "login"
            accounts = "*"
            orders = []
            "*" = ["login", "*"]
            "#,
        )
        .unwrap();

        let secured = config.secured.unwrap();
        assert_eq!(
            secured.get("payments"),
            Some(&ActionRule::from_actions(["checkout", "refund"]))
        );
        assert_eq!(
            secured.get("users"),
            Some(&ActionRule::from_actions(["login"]))
        );
        assert_eq!(secured.get("accounts"), Some(&ActionRule::All));
        assert_eq!(secured.get("orders"), Some(&ActionRule::All));
        assert_eq!(secured.get("*"), Some(&ActionRule::All));
    }

    #[test]
    fn list_table_means_every_action() {
        let config = PolicyConfig::from_toml_str(r#"allowed = ["pages", "news"]"#).unwrap();
        let allowed = config.allowed.unwrap();
        assert_eq!(allowed.len(), 2);
        assert_eq!(allowed.get("pages"), Some(&ActionRule::All));
    }

    #[test]
    fn single_controller_table() {
        let config = PolicyConfig::from_toml_str(r#"secured = "checkout""#).unwrap();
        assert_eq!(
            config.secured.unwrap().get("checkout"),
            Some(&ActionRule::All)
        );
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let config = PolicyConfig::from_toml_str(
            r#"
            [secured]
            payments = 42
            users = ["login"]
            "#,
        )
        .unwrap();

        let secured = config.secured.unwrap();
        assert_eq!(secured.len(), 1);
        assert!(secured.get("payments").is_none());
    }

    #[test]
    fn malformed_table_becomes_empty() {
        let config = PolicyConfig::from_toml_str("secured = 7\nprefixes = true").unwrap();
        assert_eq!(config.secured, Some(RuleTable::new()));
        assert_eq!(config.prefixes, Some(BTreeSet::new()));
    }

    #[test]
    fn prefixes_accept_string_or_list() {
        let one = PolicyConfig::from_toml_str(r#"prefixes = "admin""#).unwrap();
        assert_eq!(one.prefixes.unwrap().len(), 1);

        let many = PolicyConfig::from_toml_str(r#"prefixes = ["admin", "manager", ""]"#).unwrap();
        let many = many.prefixes.unwrap();
        assert_eq!(many.len(), 2);
        assert!(many.contains("manager"));
    }

    #[test]
    fn non_boolean_https_is_ignored() {
        for text in [r#"https = "on""#, "https = 1", "https = [true]"] {
            let config = PolicyConfig::from_toml_str(text).unwrap();
            assert_eq!(config.https, None, "{text}");
        }

        let config = PolicyConfig::from_toml_str("https = true\nprefixes = \"admin\"").unwrap();
        assert_eq!(config.https, Some(true));
        assert_eq!(config.prefixes.unwrap().len(), 1);

        let config: PolicyConfig = serde_json::from_str(r#"{"https": "off"}"#).unwrap();
        assert_eq!(config.https, None);
    }

    #[test]
    fn json_null_action_spec_means_all() {
        let config: PolicyConfig =
            serde_json::from_str(r#"{"secured": {"users": null}}"#).unwrap();
        assert_eq!(
            config.secured.unwrap().get("users"),
            Some(&ActionRule::All)
        );
    }

    #[test]
    fn builder_methods() {
        let config = PolicyConfig::new()
            .secure("payments", ActionRule::All)
            .allow("pages", ActionRule::from_actions(["display"]))
            .lock_prefix("admin")
            .lock_prefix("")
            .force_https(false);

        assert_eq!(config.secured.unwrap().len(), 1);
        assert_eq!(config.allowed.unwrap().len(), 1);
        assert_eq!(config.prefixes.unwrap().len(), 1);
        assert_eq!(config.https, Some(false));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = PolicyConfig::load(Path::new("/nonexistent/secure-routes.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("secure-routes.toml"));
    }

    #[test]
    fn init_options_defaults() {
        let options = InitOptions::default();
        assert!(options.merge);
        assert!(options.https_auto_detect);
        assert!(!InitOptions::replace().merge);
    }
}
