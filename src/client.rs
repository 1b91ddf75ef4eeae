//! Route client: dispatches validated requests to a routing engine.

use tracing::debug;

use crate::error::{RoutingErrorKind, RoutingFailure};
use crate::request::RouteRequest;
use crate::route::Route;
use crate::traits::RoutingEngine;

/// Successful calculation: at least one route, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    routes: Vec<Route>,
}

impl RouteResult {
    /// Wraps engine output, treating an empty list as an engine fault.
    pub fn new(routes: Vec<Route>) -> Result<Self, RoutingFailure> {
        if routes.is_empty() {
            return Err(RoutingFailure::new(
                RoutingErrorKind::Internal,
                "routing engine reported success without any route",
            ));
        }
        Ok(Self { routes })
    }

    /// The engine's top-ranked route.
    pub fn best(&self) -> &Route {
        &self.routes[0]
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn alternatives(&self) -> &[Route] {
        &self.routes[1..]
    }

    /// Takes the top-ranked route, dropping the alternatives.
    pub fn into_best(self) -> Route {
        let mut routes = self.routes;
        routes.swap_remove(0)
    }

    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}

#[derive(Debug)]
pub struct RouteClient<E> {
    engine: E,
}

impl<E: RoutingEngine> RouteClient<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Calculates routes for `request`. Failures are passed through as-is.
    pub async fn calculate_route(&self, request: &RouteRequest) -> Result<RouteResult, RoutingFailure> {
        debug!(
            waypoints = request.waypoints().len(),
            mode = ?request.options().transport_mode,
            "dispatching route request"
        );

        let routes = self
            .engine
            .calculate_route(request.waypoints(), request.options())
            .await?;

        debug!(routes = routes.len(), "routing engine responded");
        RouteResult::new(routes)
    }
}
