//! The router collaborator and a conventional reference router.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::route::{RouteParams, RouteSpec};
use crate::scheme::is_absolute_url;

/// URL generation and parsing, as provided by the host application.
///
/// The router must use the same controller/action vocabulary as the rule
/// tables. Failures are reported through [`Error::Router`] (or
/// [`Error::InvalidRoute`]) and are propagated unchanged by the engine.
pub trait Router {
    /// Renders `spec` as a URL; absolute when `absolute` is set.
    fn render_url(&self, spec: &RouteSpec, absolute: bool) -> Result<String>;

    /// Parses an application-relative path into route parameters.
    fn parse_to_params(&self, path: &str) -> Result<RouteParams>;

    /// Returns the base path the application is mounted under, or `""`.
    fn base_path(&self) -> &str;
}

impl<R: Router + ?Sized> Router for &R {
    fn render_url(&self, spec: &RouteSpec, absolute: bool) -> Result<String> {
        (**self).render_url(spec, absolute)
    }

    fn parse_to_params(&self, path: &str) -> Result<RouteParams> {
        (**self).parse_to_params(path)
    }

    fn base_path(&self) -> &str {
        (**self).base_path()
    }
}

/// A conventional router for `[/<prefix>]/<controller>/<action>[/<pass>...]`.
///
/// Paths are mounted under an optional base path (`/app`) and rendered
/// absolute against a full base (`http://www.example.com`). A missing
/// action defaults to `index`; the bare root maps to the home route.
///
/// # Examples
///
/// ```
/// use secure_routes::{PathRouter, RouteParams, RouteSpec, Router};
///
/// let router = PathRouter::new("http://www.example.com")
///     .with_base_path("/shop")
///     .with_prefix("admin");
///
/// let params = router.parse_to_params("/admin/orders/view/7").unwrap();
/// assert_eq!(params.prefix(), Some("admin"));
/// assert_eq!(params.controller(), "orders");
/// assert_eq!(params.pass(), ["7".to_string()]);
///
/// let spec = RouteSpec::Params(params);
/// assert_eq!(router.render_url(&spec, false).unwrap(), "/shop/admin/orders/view/7");
/// assert_eq!(
///     router.render_url(&spec, true).unwrap(),
///     "http://www.example.com/shop/admin/orders/view/7"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PathRouter {
    full_base: String,
    base_path: String,
    prefixes: BTreeSet<String>,
    home: (String, String),
}

impl PathRouter {
    /// Default action when a path names only a controller.
    pub const DEFAULT_ACTION: &'static str = "index";

    /// Creates a router rendering absolute URLs against `full_base`.
    pub fn new(full_base: impl Into<String>) -> Self {
        Self {
            full_base: full_base.into().trim_end_matches('/').to_string(),
            base_path: String::new(),
            prefixes: BTreeSet::new(),
            home: ("pages".to_string(), "display".to_string()),
        }
    }

    /// Mounts the application under `base_path` (for example `/app`).
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        let trimmed = base_path.trim_matches('/');
        self.base_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        };
        self
    }

    /// Registers a route prefix recognized as the first path segment.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into());
        self
    }

    /// Sets the controller/action served at `/`.
    pub fn with_home(mut self, controller: impl Into<String>, action: impl Into<String>) -> Self {
        self.home = (controller.into(), action.into());
        self
    }

    fn params_path(params: &RouteParams) -> String {
        let mut path = String::new();
        if let Some(prefix) = params.prefix() {
            path.push('/');
            path.push_str(prefix);
        }
        path.push('/');
        path.push_str(params.controller());
        path.push('/');
        path.push_str(params.action());
        for arg in params.pass() {
            path.push('/');
            path.push_str(arg);
        }
        path
    }
}

impl Router for PathRouter {
    fn render_url(&self, spec: &RouteSpec, absolute: bool) -> Result<String> {
        let path = match spec {
            RouteSpec::Path(path) if is_absolute_url(path) => return Ok(path.clone()),
            RouteSpec::Path(path) if path.starts_with('/') => path.clone(),
            RouteSpec::Path(path) => format!("/{}", path),
            RouteSpec::Params(params) => Self::params_path(params),
        };

        let relative = format!("{}{}", self.base_path, path);
        if absolute {
            Ok(format!("{}{}", self.full_base, relative))
        } else {
            Ok(relative)
        }
    }

    fn parse_to_params(&self, path: &str) -> Result<RouteParams> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();

        let prefix = match segments.peek() {
            Some(first) if self.prefixes.contains(*first) => segments.next(),
            _ => None,
        };

        let params = match (segments.next(), prefix) {
            (Some(controller), _) => {
                let action = segments.next().unwrap_or(Self::DEFAULT_ACTION);
                RouteParams::new(controller, action)?
            }
            (None, None) => RouteParams::new(self.home.0.as_str(), self.home.1.as_str())?,
            (None, Some(prefix)) => {
                return Err(Error::router(format!(
                    "prefix `{}` has no controller in path `{}`",
                    prefix, path
                )))
            }
        };

        let params = params.with_prefix(prefix.unwrap_or_default());
        Ok(segments.fold(params, |params, arg| params.with_pass(arg)))
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }
}
