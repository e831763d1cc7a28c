use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while resolving transport policy.
#[derive(Debug, Error)]
pub enum Error {
    /// Route parameters were missing a required field
    #[error("Invalid route: {0}")]
    InvalidRoute(#[from] InvalidRouteError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An absolute URL was needed but the environment has no server name
    #[error("Server name is not available; cannot build an absolute URL")]
    MissingServerName,

    /// A URL or host could not be parsed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A URL to be rewritten has `.` or `..` path segments
    #[error("URL `{0}` contains dot segments; refusing to rewrite it")]
    DotSegments(String),

    /// The router collaborator failed
    #[error("Router error: {0}")]
    Router(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a router collaborator failure.
    pub fn router(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Router(err.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Route parameters that lack a field required for rule matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing {field}")]
pub struct InvalidRouteError {
    /// The field that was missing or empty
    pub field: RouteField,
}

impl InvalidRouteError {
    /// Creates a new error for the given missing field.
    pub fn missing(field: RouteField) -> Self {
        Self { field }
    }
}

/// A required route parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteField {
    /// The controller identifier
    Controller,
    /// The action identifier
    Action,
}

impl fmt::Display for RouteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteField::Controller => write!(f, "controller"),
            RouteField::Action => write!(f, "action"),
        }
    }
}
