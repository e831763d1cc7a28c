//! Environment signals: transport detection and server name.

use std::collections::HashMap;

/// Name of the signal reporting whether the current transport is secure.
pub const HTTPS_SIGNAL: &str = "HTTPS";

/// Name of the signal carrying the host name used for absolute URLs.
pub const SERVER_NAME_SIGNAL: &str = "SERVER_NAME";

/// A value read from the environment.
///
/// Hosts differ in how they report signals: process variables are always
/// text, while in-process server integrations may hand over real booleans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    /// A textual value, such as `"on"` or `"www.example.com"`
    Text(String),
    /// A boolean value
    Flag(bool),
}

impl EnvValue {
    /// Returns the value as text, if it is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EnvValue::Text(text) => Some(text),
            EnvValue::Flag(_) => None,
        }
    }
}

impl From<&str> for EnvValue {
    fn from(text: &str) -> Self {
        EnvValue::Text(text.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(text: String) -> Self {
        EnvValue::Text(text)
    }
}

impl From<bool> for EnvValue {
    fn from(flag: bool) -> Self {
        EnvValue::Flag(flag)
    }
}

/// Read access to environment signals.
pub trait Environment {
    /// Returns the named signal, or `None` if it is not set.
    fn get(&self, name: &str) -> Option<EnvValue>;

    /// Returns the server host name (possibly with a port), if set and non-empty.
    fn server_name(&self) -> Option<String> {
        match self.get(SERVER_NAME_SIGNAL) {
            Some(EnvValue::Text(name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn get(&self, name: &str) -> Option<EnvValue> {
        (**self).get(name)
    }
}

/// Returns true if the environment reports a secure transport.
///
/// Only the exact text `"on"` or the boolean `true` count. Other truthy
/// spellings such as `"1"`, `"ON"` or `"true"` do not.
///
/// # Examples
///
/// ```
/// use secure_routes::{is_transport_secure, StaticEnv};
///
/// assert!(is_transport_secure(&StaticEnv::new().with("HTTPS", "on")));
/// assert!(is_transport_secure(&StaticEnv::new().with("HTTPS", true)));
/// assert!(!is_transport_secure(&StaticEnv::new().with("HTTPS", "1")));
/// assert!(!is_transport_secure(&StaticEnv::new()));
/// ```
pub fn is_transport_secure(env: &impl Environment) -> bool {
    match env.get(HTTPS_SIGNAL) {
        Some(EnvValue::Text(value)) => value == "on",
        Some(EnvValue::Flag(flag)) => flag,
        None => false,
    }
}

/// In-memory environment.
///
/// Useful for tests and for hosts that collect server variables themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    values: HashMap<String, EnvValue>,
}

impl StaticEnv {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the environment with `name` set to `value`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<EnvValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets `name` to `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<EnvValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Removes `name`.
    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }
}

impl Environment for StaticEnv {
    fn get(&self, name: &str) -> Option<EnvValue> {
        self.values.get(name).cloned()
    }
}

/// The process environment, read through `std::env::var`.
///
/// Values are always [`EnvValue::Text`]; unset and non-UTF-8 variables read
/// as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn get(&self, name: &str) -> Option<EnvValue> {
        std::env::var(name).ok().map(EnvValue::Text)
    }
}
