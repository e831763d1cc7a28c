use std::fmt;

use crate::error::{InvalidRouteError, RouteField};

/// Logical route parameters for a single decision.
///
/// Rule tables match on `controller` and `action`; the optional `prefix`
/// names a route group such as `admin`. `pass` carries positional
/// arguments (for example the `42` in `/users/view/42`) and takes no part
/// in matching.
///
/// `controller` and `action` are always non-empty: construction fails with
/// [`InvalidRouteError`] otherwise, and an empty prefix is treated as no
/// prefix.
///
/// # Examples
///
/// ```
/// use secure_routes::RouteParams;
///
/// let params = RouteParams::new("payments", "checkout")
///     .unwrap()
///     .with_prefix("admin");
///
/// assert_eq!(params.controller(), "payments");
/// assert_eq!(params.prefix(), Some("admin"));
/// assert!(RouteParams::new("", "index").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParams {
    controller: String,
    action: String,
    prefix: Option<String>,
    pass: Vec<String>,
}

impl RouteParams {
    /// Creates route parameters for a controller/action pair.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRouteError`] if either identifier is empty.
    pub fn new(
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<Self, InvalidRouteError> {
        let controller = controller.into();
        let action = action.into();

        if controller.is_empty() {
            return Err(InvalidRouteError::missing(RouteField::Controller));
        }
        if action.is_empty() {
            return Err(InvalidRouteError::missing(RouteField::Action));
        }

        Ok(Self {
            controller,
            action,
            prefix: None,
            pass: Vec::new(),
        })
    }

    /// Builds route parameters from loose key/value pairs.
    ///
    /// Recognized keys are `controller`, `action` and `prefix`; every other
    /// key is ignored. Later duplicates win.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRouteError`] if `controller` or `action` is missing
    /// or empty.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, InvalidRouteError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut controller = None;
        let mut action = None;
        let mut prefix = None;

        for (key, value) in pairs {
            match key.as_ref() {
                "controller" => controller = Some(value.into()),
                "action" => action = Some(value.into()),
                "prefix" => prefix = Some(value.into()),
                _ => {}
            }
        }

        let controller =
            controller.ok_or(InvalidRouteError::missing(RouteField::Controller))?;
        let action = action.ok_or(InvalidRouteError::missing(RouteField::Action))?;

        let params = Self::new(controller, action)?;
        Ok(match prefix {
            Some(prefix) => params.with_prefix(prefix),
            None => params,
        })
    }

    /// Sets the route prefix. An empty string clears it.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    /// Appends a positional argument.
    pub fn with_pass(mut self, arg: impl Into<String>) -> Self {
        self.pass.push(arg.into());
        self
    }

    /// Returns the controller identifier.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Returns the action identifier.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the route prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the positional arguments.
    pub fn pass(&self) -> &[String] {
        &self.pass
    }
}

impl fmt::Display for RouteParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{}:", prefix)?;
        }
        write!(f, "{}/{}", self.controller, self.action)
    }
}

/// Input to URL generation.
///
/// `Path` is a path or URL string as a caller would write it in a template;
/// `Params` is the structured form. Both are handed back to the router
/// unchanged for rendering, so the caller's chosen form is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSpec {
    /// A path (`/users/login`) or an absolute URL
    Path(String),
    /// Structured route parameters
    Params(RouteParams),
}

impl From<&str> for RouteSpec {
    fn from(path: &str) -> Self {
        RouteSpec::Path(path.to_string())
    }
}

impl From<String> for RouteSpec {
    fn from(path: String) -> Self {
        RouteSpec::Path(path)
    }
}

impl From<RouteParams> for RouteSpec {
    fn from(params: RouteParams) -> Self {
        RouteSpec::Params(params)
    }
}
