//! Request adapter for mapping HTTP requests to transport-policy types.

use std::collections::HashMap;

use crate::env::{EnvValue, Environment, HTTPS_SIGNAL, SERVER_NAME_SIGNAL};
use crate::error::InvalidRouteError;
use crate::route::RouteParams;

use super::{ExtractRoute, ExtractServerVars};

/// Server variables of a single request.
///
/// Framework code fills this from its connection info; it then serves as
/// the [`Environment`] for decisions about that request.
///
/// # Examples
///
/// ```
/// use secure_routes::web::ServerVars;
/// use secure_routes::{is_transport_secure, Environment};
///
/// let mut vars = ServerVars::new();
/// vars.set_https("on");
/// vars.set_server_name("shop.example.com");
///
/// assert!(is_transport_secure(&vars));
/// assert_eq!(vars.server_name().as_deref(), Some("shop.example.com"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServerVars {
    vars: HashMap<String, EnvValue>,
}

impl ServerVars {
    /// Creates an empty set of server variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds server variables from textual name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), EnvValue::Text(v.into())))
                .collect(),
        }
    }

    /// Sets a server variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<EnvValue>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Sets the `HTTPS` transport signal.
    pub fn set_https(&mut self, value: impl Into<EnvValue>) {
        self.set(HTTPS_SIGNAL, value);
    }

    /// Sets the `SERVER_NAME` host signal.
    pub fn set_server_name(&mut self, host: impl Into<String>) {
        self.set(SERVER_NAME_SIGNAL, EnvValue::Text(host.into()));
    }
}

impl Environment for ServerVars {
    fn get(&self, name: &str) -> Option<EnvValue> {
        self.vars.get(name).cloned()
    }
}

/// Adapter for converting framework-specific HTTP requests into
/// transport-policy inputs.
///
/// Holds simple owned data so it stays independent of any framework's
/// request types: the request target (path and query), the routing
/// parameters the framework matched, and the request's server variables.
///
/// # Examples
///
/// ```
/// use secure_routes::web::{ExtractRoute, RequestAdapter};
///
/// let mut adapter = RequestAdapter::new("/payments/checkout?cart=9");
/// adapter.set_route_param("controller", "payments");
/// adapter.set_route_param("action", "checkout");
///
/// let params = adapter.route_params().unwrap();
/// assert_eq!(params.controller(), "payments");
/// assert_eq!(adapter.request_target(), "/payments/checkout?cart=9");
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    /// Path and query of the request
    target: String,
    /// Routing parameters (`controller`, `action`, `prefix`)
    route: HashMap<String, String>,
    /// Server variables for this request
    server_vars: ServerVars,
}

impl RequestAdapter {
    /// Creates an adapter for the given request target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            route: HashMap::new(),
            server_vars: ServerVars::new(),
        }
    }

    /// Sets a routing parameter.
    pub fn set_route_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.route.insert(key.into(), value.into());
    }

    /// Returns the server variables for modification.
    pub fn server_vars_mut(&mut self) -> &mut ServerVars {
        &mut self.server_vars
    }
}

impl ExtractRoute for RequestAdapter {
    fn route_params(&self) -> Result<RouteParams, InvalidRouteError> {
        RouteParams::from_pairs(self.route.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }

    fn request_target(&self) -> &str {
        &self.target
    }
}

impl ExtractServerVars for RequestAdapter {
    fn server_vars(&self) -> ServerVars {
        self.server_vars.clone()
    }
}
