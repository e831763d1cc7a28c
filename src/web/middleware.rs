//! Middleware function deciding whether the current request must switch
//! transport.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code builds RequestAdapter (or implements the traits)
//!   ↓
//! Call enforce_transport()
//!   ↓
//! Proceed → handle the request
//! Redirect { location } → framework answers with a redirect to `location`
//! ```

use crate::engine::{DecisionEngine, TransportDecision};
use crate::env::{is_transport_secure, Environment};
use crate::error::Result;
use crate::logging::RouteLog;
use crate::router::Router;
use crate::scheme::rewrite_scheme;

use super::{ExtractRoute, ExtractServerVars};

/// Result of checking the current request against the transport policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCheck {
    /// The request may be handled on its current transport
    Proceed {
        /// Why no redirect is needed
        decision: TransportDecision,
    },
    /// The request must be repeated on the other transport
    Redirect {
        /// Absolute URL of the same request target on the required scheme
        location: String,
        /// Which way the transport must change
        decision: TransportDecision,
    },
}

impl TransportCheck {
    /// Returns true if a redirect is required.
    pub fn is_redirect(&self) -> bool {
        matches!(self, TransportCheck::Redirect { .. })
    }

    /// Returns the redirect location, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            TransportCheck::Redirect { location, .. } => Some(location),
            TransportCheck::Proceed { .. } => None,
        }
    }

    /// Returns the underlying decision.
    pub fn decision(&self) -> TransportDecision {
        match self {
            TransportCheck::Proceed { decision } | TransportCheck::Redirect { decision, .. } => {
                *decision
            }
        }
    }
}

/// Checks the current request against the transport policy.
///
/// The decision uses the transport the request arrived on (its `HTTPS`
/// server variable). When a redirect is needed, the location keeps the
/// request target and uses the request's `SERVER_NAME`, falling back to the
/// engine's environment.
///
/// # Errors
///
/// Returns [`Error::InvalidRoute`](crate::Error::InvalidRoute) if the
/// request has no controller or action, and
/// [`Error::MissingServerName`](crate::Error::MissingServerName) if a
/// redirect is needed but no server name is known. A request target with
/// `.` or `..` path segments is never redirected; it fails with
/// [`Error::DotSegments`](crate::Error::DotSegments).
///
/// # Examples
///
/// ```
/// use secure_routes::web::{enforce_transport, RequestAdapter, TransportCheck};
/// use secure_routes::{DecisionEngine, PathRouter, PolicyConfig, PolicyStore, StaticEnv};
///
/// let env = StaticEnv::new();
/// let store = PolicyStore::from_config(PolicyConfig::new().lock_prefix("admin"), &env);
/// let router = PathRouter::new("http://shop.example.com");
/// let engine = DecisionEngine::new(&store, &router, &env);
///
/// let mut adapter = RequestAdapter::new("/admin/orders?page=2");
/// adapter.set_route_param("controller", "orders");
/// adapter.set_route_param("action", "index");
/// adapter.set_route_param("prefix", "admin");
/// adapter.server_vars_mut().set_server_name("shop.example.com");
///
/// let check = enforce_transport(&adapter, &engine).unwrap();
/// assert_eq!(check.location(), Some("https://shop.example.com/admin/orders?page=2"));
/// ```
pub fn enforce_transport<Req, R, E>(
    request: &Req,
    engine: &DecisionEngine<'_, R, E>,
) -> Result<TransportCheck>
where
    Req: ExtractRoute + ExtractServerVars,
    R: Router,
    E: Environment,
{
    let params = request.route_params()?;
    let vars = request.server_vars();
    let decision = engine.decide_for(&params, is_transport_secure(&vars));

    let Some(scheme) = decision.target_scheme() else {
        return Ok(TransportCheck::Proceed { decision });
    };

    let target = request.request_target();
    let location = match vars.server_name() {
        Some(host) => rewrite_scheme(target, scheme, &host)?,
        None => engine.rewrite(target, scheme)?,
    };

    RouteLog::new(&params).info(format_args!(
        "Redirecting request to {} ({})",
        location, decision
    ));
    Ok(TransportCheck::Redirect { location, decision })
}
