//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the transport
//! policy. It handles:
//! - Mapping a framework request to [`RouteParams`](crate::RouteParams)
//! - Exposing the request's server variables as an
//!   [`Environment`](crate::Environment)
//! - Deciding whether the current request must be redirected to the other
//!   transport
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: nothing here depends on a particular
//!    framework. Framework code implements the extraction traits or fills a
//!    [`RequestAdapter`].
//!
//! 2. **Per-Request Transport**: the redirect decision uses the transport
//!    the current request arrived on, read from its own server variables,
//!    not the store's startup state.
//!
//! 3. **No Serving**: the boundary returns a [`TransportCheck`]; sending the
//!    redirect response is the framework's job.
//!
//! # Integration Model
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//!
//! // 1. Describe the request
//! let mut adapter = RequestAdapter::new(uri.path_and_query().as_str());
//! adapter.set_route_param("controller", matched.controller);
//! adapter.set_route_param("action", matched.action);
//! adapter.server_vars_mut().set_https(if tls { "on" } else { "off" });
//! adapter.server_vars_mut().set_server_name(host);
//!
//! // 2. Decide
//! match enforce_transport(&adapter, &engine)? {
//!     TransportCheck::Proceed { .. } => next.run(request).await,
//!     TransportCheck::Redirect { location, .. } => Redirect::temporary(&location).into_response(),
//! }
//! ```

mod adapter;
mod extract;
mod middleware;

pub use adapter::{RequestAdapter, ServerVars};
pub use extract::{ExtractRoute, ExtractServerVars};
pub use middleware::{enforce_transport, TransportCheck};
