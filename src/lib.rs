//! Per-route transport policy for web applications.
//!
//! This crate decides, for each controller/action endpoint, whether it must
//! be served over HTTPS or plain HTTP, and rewrites generated URLs so their
//! scheme matches that decision:
//! - **Rule tables**: `secured` and `allowed` map controllers (or `*`) to
//!   the actions they cover
//! - **Prefix lockdown**: whole route prefixes (such as `admin`) can be
//!   forced onto HTTPS
//! - **Explicit policy**: a [`PolicyStore`] is built once and passed by
//!   reference; there is no global state
//!
//! # Core Types
//!
//! - [`PolicyConfig`]: Configuration, loadable from TOML
//! - [`PolicyStore`]: Normalized rule tables plus the active transport
//! - [`DecisionEngine`]: Matching, decisions and URL resolution
//! - [`Router`]: The host's URL generator; [`PathRouter`] is a reference one
//! - [`Environment`]: Transport and host-name signals
//!
//! # Examples
//!
//! ```
//! use secure_routes::{DecisionEngine, PathRouter, PolicyConfig, PolicyStore, RouteSpec, StaticEnv};
//!
//! let config = PolicyConfig::from_toml_str(r#"
//!     [secured]
//!     "*" = "*"
//!
//!     [allowed]
//!     payments = ["public"]
//! "#).unwrap();
//!
//! let env = StaticEnv::new().with("SERVER_NAME", "shop.example.com");
//! let store = PolicyStore::from_config(config, &env);
//! let router = PathRouter::new("http://shop.example.com");
//! let engine = DecisionEngine::new(&store, &router, &env);
//!
//! // Everything is secured...
//! assert_eq!(
//!     engine.resolve_url(&RouteSpec::from("/users/login"), false).unwrap(),
//!     "https://shop.example.com/users/login"
//! );
//!
//! // ...except what `allowed` exempts.
//! assert_eq!(
//!     engine.resolve_url(&RouteSpec::from("/payments/public"), false).unwrap(),
//!     "/payments/public"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod env;
mod error;
mod logging;
mod route;
mod router;
mod rule;
mod scheme;
mod store;

pub mod web;

pub use config::{ConfigError, InitOptions, PolicyConfig};
pub use engine::{DecisionEngine, TransportDecision};
pub use env::{
    is_transport_secure, EnvValue, Environment, ProcessEnv, StaticEnv, HTTPS_SIGNAL,
    SERVER_NAME_SIGNAL,
};
pub use error::{Error, InvalidRouteError, Result, RouteField};
pub use route::{RouteParams, RouteSpec};
pub use router::{PathRouter, Router};
pub use rule::{ActionRule, RuleTable, WILDCARD};
pub use scheme::{is_absolute_url, rewrite_scheme, Scheme};
pub use store::PolicyStore;
