use std::collections::BTreeSet;

use crate::config::{InitOptions, PolicyConfig};
use crate::env::{is_transport_secure, Environment};
use crate::rule::RuleTable;

/// The transport policy: rule tables plus the active transport state.
///
/// A store is built once at startup and shared by reference with every
/// [`DecisionEngine`](crate::DecisionEngine). It changes only through
/// [`init`](Self::init), which needs `&mut self`, so it cannot change while
/// an engine borrows it. Independent stores can coexist freely.
///
/// # Examples
///
/// ```
/// use secure_routes::{InitOptions, PolicyConfig, PolicyStore, StaticEnv};
///
/// let env = StaticEnv::new().with("HTTPS", "on");
///
/// let mut store = PolicyStore::new();
/// store.init(
///     PolicyConfig::from_toml_str(r#"secured = ["payments"]"#).unwrap(),
///     InitOptions::default(),
///     &env,
/// );
///
/// assert!(store.https_active());
/// assert_eq!(store.secured().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    secured: RuleTable,
    allowed: RuleTable,
    prefixes: BTreeSet<String>,
    https_active: bool,
}

impl PolicyStore {
    /// Creates an empty store on the plaintext transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from `config` with default [`InitOptions`].
    pub fn from_config(config: PolicyConfig, env: &impl Environment) -> Self {
        let mut store = Self::new();
        store.init(config, InitOptions::default(), env);
        store
    }

    /// Applies `config` to the store.
    ///
    /// With `options.merge`, supplied tables are merged into the current ones
    /// (a controller key from `config` replaces an existing one, prefixes are
    /// added) and absent tables are left alone. Without it, every table is
    /// replaced and absent tables become empty.
    ///
    /// The transport state is taken from `config.https` when present.
    /// Otherwise, with `options.https_auto_detect`, it is read from `env`
    /// through [`is_transport_secure`]; without it the previous state is kept.
    pub fn init(&mut self, config: PolicyConfig, options: InitOptions, env: &impl Environment) {
        let PolicyConfig {
            secured,
            allowed,
            prefixes,
            https,
        } = config;

        let secured = secured.unwrap_or_default();
        let allowed = allowed.unwrap_or_default();
        let prefixes = prefixes.unwrap_or_default();

        if options.merge {
            self.secured.merge(secured);
            self.allowed.merge(allowed);
            self.prefixes.extend(prefixes);
        } else {
            self.secured = secured;
            self.allowed = allowed;
            self.prefixes = prefixes;
        }

        if let Some(https) = https {
            self.https_active = https;
        } else if options.https_auto_detect {
            self.https_active = is_transport_secure(env);
        }

        tracing::info!(
            merge = options.merge,
            secured = self.secured.len(),
            allowed = self.allowed.len(),
            prefixes = self.prefixes.len(),
            https_active = self.https_active,
            "Initialized transport policy"
        );
    }

    /// Returns the `secured` table.
    pub fn secured(&self) -> &RuleTable {
        &self.secured
    }

    /// Returns the `allowed` table.
    pub fn allowed(&self) -> &RuleTable {
        &self.allowed
    }

    /// Returns the locked-down route prefixes.
    pub fn prefixes(&self) -> &BTreeSet<String> {
        &self.prefixes
    }

    /// Returns true if the active transport is secure.
    pub fn https_active(&self) -> bool {
        self.https_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{StaticEnv, HTTPS_SIGNAL};
    use crate::rule::ActionRule;

    fn plain_env() -> StaticEnv {
        StaticEnv::new()
    }

    #[test]
    fn new_store_is_empty_and_plaintext() {
        let store = PolicyStore::new();
        assert!(store.secured().is_empty());
        assert!(store.allowed().is_empty());
        assert!(store.prefixes().is_empty());
        assert!(!store.https_active());
    }

    #[test]
    fn merge_replaces_duplicate_controller_keys() {
        let mut store = PolicyStore::new();
        store.init(
            PolicyConfig::new()
                .secure("users", ActionRule::from_actions(["login"]))
                .secure("orders", ActionRule::All),
            InitOptions::default(),
            &plain_env(),
        );
        store.init(
            PolicyConfig::new().secure("users", ActionRule::from_actions(["edit"])),
            InitOptions::default(),
            &plain_env(),
        );

        assert_eq!(store.secured().len(), 2);
        assert_eq!(
            store.secured().get("users"),
            Some(&ActionRule::from_actions(["edit"]))
        );
    }

    #[test]
    fn merge_keeps_absent_tables_and_unions_prefixes() {
        let mut store = PolicyStore::new();
        store.init(
            PolicyConfig::new()
                .allow("pages", ActionRule::All)
                .lock_prefix("admin"),
            InitOptions::default(),
            &plain_env(),
        );
        store.init(
            PolicyConfig::new().lock_prefix("manager"),
            InitOptions::default(),
            &plain_env(),
        );

        assert_eq!(store.allowed().len(), 1);
        assert_eq!(store.prefixes().len(), 2);
    }

    #[test]
    fn replace_discards_previous_state() {
        let mut store = PolicyStore::new();
        store.init(
            PolicyConfig::new()
                .secure("users", ActionRule::All)
                .allow("pages", ActionRule::All)
                .lock_prefix("admin"),
            InitOptions::default(),
            &plain_env(),
        );
        store.init(
            PolicyConfig::new().secure("orders", ActionRule::All),
            InitOptions::replace(),
            &plain_env(),
        );

        assert_eq!(store.secured().len(), 1);
        assert!(store.secured().get("users").is_none());
        assert!(store.allowed().is_empty());
        assert!(store.prefixes().is_empty());
    }

    #[test]
    fn replace_is_idempotent() {
        let config = PolicyConfig::new()
            .secure("users", ActionRule::All)
            .lock_prefix("admin");

        let mut once = PolicyStore::new();
        once.init(config.clone(), InitOptions::replace(), &plain_env());
        let mut twice = once.clone();
        twice.init(config, InitOptions::replace(), &plain_env());

        assert_eq!(once.secured(), twice.secured());
        assert_eq!(once.prefixes(), twice.prefixes());
    }

    #[test]
    fn explicit_https_skips_detection() {
        let env = StaticEnv::new().with(HTTPS_SIGNAL, "on");
        let store = PolicyStore::from_config(PolicyConfig::new().force_https(false), &env);
        assert!(!store.https_active());
    }

    #[test]
    fn auto_detects_transport() {
        let env = StaticEnv::new().with(HTTPS_SIGNAL, "on");
        let store = PolicyStore::from_config(PolicyConfig::new(), &env);
        assert!(store.https_active());

        let env = StaticEnv::new().with(HTTPS_SIGNAL, "1");
        let store = PolicyStore::from_config(PolicyConfig::new(), &env);
        assert!(!store.https_active());
    }

    #[test]
    fn disabled_detection_keeps_previous_state() {
        let mut store = PolicyStore::from_config(PolicyConfig::new().force_https(true), &plain_env());
        let options = InitOptions {
            https_auto_detect: false,
            ..InitOptions::default()
        };
        store.init(PolicyConfig::new(), options, &plain_env());
        assert!(store.https_active());
    }

    #[test]
    fn mistyped_https_falls_back_to_detection() {
        let config = PolicyConfig::from_toml_str(r#"https = "off""#).unwrap();
        let env = StaticEnv::new().with(HTTPS_SIGNAL, "on");
        let store = PolicyStore::from_config(config, &env);
        assert!(store.https_active());
    }
}
