use std::fmt;

use crate::route::RouteParams;

/// Route-scoped structured logging.
///
/// Every event carries the route's `controller`, `action` and `prefix`
/// fields, so decisions can be correlated with the endpoint they concern.
#[derive(Debug)]
pub(crate) struct RouteLog<'a> {
    params: &'a RouteParams,
}

impl<'a> RouteLog<'a> {
    pub(crate) fn new(params: &'a RouteParams) -> Self {
        Self { params }
    }

    /// Logs a debug-level message with the route fields.
    pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(
            controller = %self.params.controller(),
            action = %self.params.action(),
            prefix = self.params.prefix().unwrap_or_default(),
            "{}",
            args
        );
    }

    /// Logs an info-level message with the route fields.
    pub(crate) fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(
            controller = %self.params.controller(),
            action = %self.params.action(),
            prefix = self.params.prefix().unwrap_or_default(),
            "{}",
            args
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_log_accepts_format_args() {
        let params = RouteParams::new("users", "login").unwrap().with_prefix("admin");
        let log = RouteLog::new(&params);
        log.debug(format_args!("decision {}", "unchanged"));
        log.info(format_args!("redirecting"));
    }
}
