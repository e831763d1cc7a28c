//! Extraction boundary traits for web integration.
//!
//! These traits map framework-specific request types to the inputs a
//! transport decision needs.

use crate::error::InvalidRouteError;
use crate::route::RouteParams;

use super::ServerVars;

/// Extracts the matched route from a framework-specific request.
///
/// # Examples
///
/// ```
/// use secure_routes::web::ExtractRoute;
/// use secure_routes::{InvalidRouteError, RouteParams};
///
/// struct MyFrameworkRequest {
///     uri: String,
///     controller: String,
///     action: String,
/// }
///
/// impl ExtractRoute for MyFrameworkRequest {
///     fn route_params(&self) -> Result<RouteParams, InvalidRouteError> {
///         RouteParams::new(self.controller.clone(), self.action.clone())
///     }
///
///     fn request_target(&self) -> &str {
///         &self.uri
///     }
/// }
/// ```
pub trait ExtractRoute {
    /// Returns the logical route of the request.
    ///
    /// Fails with [`InvalidRouteError`] when the framework did not provide
    /// a controller or an action.
    fn route_params(&self) -> Result<RouteParams, InvalidRouteError>;

    /// Returns the path and query of the request, as sent by the client.
    fn request_target(&self) -> &str;
}

/// Extracts the server variables of a framework-specific request.
pub trait ExtractServerVars {
    /// Returns the request's server variables (`HTTPS`, `SERVER_NAME`, ...).
    fn server_vars(&self) -> ServerVars;
}
