//! The decision engine: rule matching and scheme-correct URL resolution.

use std::fmt;

use crate::env::Environment;
use crate::error::{Error, Result};
use crate::logging::RouteLog;
use crate::route::{RouteParams, RouteSpec};
use crate::router::Router;
use crate::scheme::{is_absolute_url, rewrite_scheme, Scheme};
use crate::store::PolicyStore;

/// Outcome of comparing a route's policy with the active transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportDecision {
    /// The route matches the `allowed` table; either transport is fine
    Exempt,
    /// The route's policy already agrees with the active transport
    Unchanged,
    /// The route must be secure but the transport is plaintext
    UpgradeToSecure,
    /// The route must be plaintext but the transport is secure
    DowngradeToPlain,
}

impl TransportDecision {
    /// Returns the scheme URLs must be rewritten to, if any.
    pub fn target_scheme(&self) -> Option<Scheme> {
        match self {
            TransportDecision::UpgradeToSecure => Some(Scheme::Https),
            TransportDecision::DowngradeToPlain => Some(Scheme::Http),
            TransportDecision::Exempt | TransportDecision::Unchanged => None,
        }
    }

    /// Returns true if the decision calls for a scheme rewrite.
    pub fn needs_rewrite(&self) -> bool {
        self.target_scheme().is_some()
    }
}

impl fmt::Display for TransportDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportDecision::Exempt => write!(f, "exempt"),
            TransportDecision::Unchanged => write!(f, "unchanged"),
            TransportDecision::UpgradeToSecure => write!(f, "upgrade_to_secure"),
            TransportDecision::DowngradeToPlain => write!(f, "downgrade_to_plain"),
        }
    }
}

/// Answers transport questions for routes against a [`PolicyStore`].
///
/// The engine borrows the store, the host's [`Router`] and an
/// [`Environment`]; it holds no state of its own and is cheap to create per
/// request.
///
/// # Examples
///
/// ```
/// use secure_routes::{
///     ActionRule, DecisionEngine, PathRouter, PolicyConfig, PolicyStore, RouteSpec, StaticEnv,
/// };
///
/// let env = StaticEnv::new().with("SERVER_NAME", "shop.example.com");
/// let store = PolicyStore::from_config(
///     PolicyConfig::new().secure("payments", ActionRule::from_actions(["checkout", "refund"])),
///     &env,
/// );
/// let router = PathRouter::new("http://shop.example.com");
/// let engine = DecisionEngine::new(&store, &router, &env);
///
/// assert_eq!(
///     engine.resolve_url(&RouteSpec::from("/payments/checkout"), false).unwrap(),
///     "https://shop.example.com/payments/checkout"
/// );
/// assert_eq!(
///     engine.resolve_url(&RouteSpec::from("/catalog/index"), false).unwrap(),
///     "/catalog/index"
/// );
/// ```
#[derive(Debug)]
pub struct DecisionEngine<'a, R, E> {
    store: &'a PolicyStore,
    router: &'a R,
    env: &'a E,
}

impl<'a, R: Router, E: Environment> DecisionEngine<'a, R, E> {
    /// Creates an engine over the given store and collaborators.
    pub fn new(store: &'a PolicyStore, router: &'a R, env: &'a E) -> Self {
        Self { store, router, env }
    }

    /// Returns the policy store.
    pub fn store(&self) -> &'a PolicyStore {
        self.store
    }

    /// Returns true if the route matches the `allowed` table.
    pub fn is_allowed(&self, params: &RouteParams) -> bool {
        self.store.allowed().matches(params)
    }

    /// Returns true if the route must be served over the secure transport.
    ///
    /// A route whose prefix is locked down is always secure; the `secured`
    /// table is only consulted otherwise.
    pub fn requires_secure(&self, params: &RouteParams) -> bool {
        let prefixes = self.store.prefixes();
        if !prefixes.is_empty() {
            if let Some(prefix) = params.prefix() {
                if prefixes.contains(prefix) {
                    return true;
                }
            }
        }

        self.store.secured().matches(params)
    }

    /// Decides against the store's active transport.
    pub fn decide(&self, params: &RouteParams) -> TransportDecision {
        self.decide_for(params, self.store.https_active())
    }

    /// Decides against an explicit transport state.
    pub fn decide_for(&self, params: &RouteParams, transport_secure: bool) -> TransportDecision {
        let decision = if self.is_allowed(params) {
            TransportDecision::Exempt
        } else {
            let required = Scheme::for_transport(self.requires_secure(params));
            if required == Scheme::for_transport(transport_secure) {
                TransportDecision::Unchanged
            } else if required.is_secure() {
                TransportDecision::UpgradeToSecure
            } else {
                TransportDecision::DowngradeToPlain
            }
        };

        RouteLog::new(params).debug(format_args!(
            "Transport decision: {} (transport_secure={})",
            decision, transport_secure
        ));
        decision
    }

    /// Resolves `input` to a URL whose scheme agrees with the policy.
    ///
    /// Absolute and scheme-relative strings are returned untouched. Anything
    /// else is resolved to route parameters through the router; when the
    /// policy disagrees with the active transport the router's absolute
    /// rendering is rewritten to the required scheme and the server name,
    /// otherwise the router's rendering is returned as is, absolute when
    /// `full` is set.
    ///
    /// # Errors
    ///
    /// Propagates router failures, and returns
    /// [`Error::MissingServerName`] when a rewrite is needed but the
    /// environment has no server name. A rewrite of a rendering with dot
    /// segments fails with [`Error::DotSegments`].
    pub fn resolve_url(&self, input: &RouteSpec, full: bool) -> Result<String> {
        if let RouteSpec::Path(path) = input {
            if is_absolute_url(path) {
                tracing::trace!(url = %path, "Absolute URL passed through");
                return Ok(path.clone());
            }
        }

        let params = self.canonical_params(input)?;
        match self.decide(&params).target_scheme() {
            Some(scheme) => {
                let rendered = self.router.render_url(input, true)?;
                self.rewrite(&rendered, scheme)
            }
            None => self.router.render_url(input, full),
        }
    }

    /// Rewrites `url` to `scheme` on the environment's server name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingServerName`] if the environment has no server
    /// name, and otherwise fails as [`rewrite_scheme`] does.
    pub fn rewrite(&self, url: &str, scheme: Scheme) -> Result<String> {
        let host = self.env.server_name().ok_or(Error::MissingServerName)?;
        rewrite_scheme(url, scheme, &host)
    }

    /// Resolves the logical route behind `input`.
    ///
    /// Structured input goes through the router twice: rendered to a path,
    /// stripped of the base path, then parsed back, so custom routes map to
    /// the controller/action identifiers the rule tables use.
    fn canonical_params(&self, input: &RouteSpec) -> Result<RouteParams> {
        match input {
            RouteSpec::Path(path) => self.router.parse_to_params(path),
            RouteSpec::Params(_) => {
                let rendered = self.router.render_url(input, false)?;
                let path = strip_base_path(&rendered, self.router.base_path());
                self.router.parse_to_params(path)
            }
        }
    }
}

/// Strips `base` from the start of `path` when it is a whole path prefix.
fn strip_base_path<'p>(path: &'p str, base: &str) -> &'p str {
    if base.is_empty() {
        return path;
    }
    match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}
