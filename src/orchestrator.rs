//! Plan-and-show orchestration.
//!
//! The orchestrator is owned by whichever thread owns the map. Calculations
//! run as tasks on a Tokio runtime and report back over a channel; their
//! results are only applied to the presenter when the owner calls
//! [`Orchestrator::next_completion`] or [`Orchestrator::drain_completions`].
//!
//! Every request gets a sequence number. Once a request's result has been
//! applied, completions of older requests are discarded, so a slow stale
//! answer can never replace a newer route.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::client::{RouteClient, RouteResult};
use crate::config::PlannerConfig;
use crate::error::{InvalidRequest, RoutingErrorKind, RoutingFailure};
use crate::presenter::RoutePresenter;
use crate::request::{RouteOptions, RouteRequest, Waypoint};
use crate::summary::{RouteSummary, summarize};
use crate::traits::{MapScene, NotificationSink, RoutingEngine};

pub const SUCCESS_TITLE: &str = "Route Details";
pub const FAILURE_TITLE: &str = "Error while calculating a route:";

/// Identifies one dispatched route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTicket(pub u64);

/// What happened when a completion was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    Shown {
        ticket: RequestTicket,
        summary: RouteSummary,
    },
    Failed {
        ticket: RequestTicket,
        failure: RoutingFailure,
    },
    /// Superseded by a newer applied result, or cancelled.
    Discarded { ticket: RequestTicket },
}

impl CompletionOutcome {
    pub fn ticket(&self) -> RequestTicket {
        match self {
            CompletionOutcome::Shown { ticket, .. }
            | CompletionOutcome::Failed { ticket, .. }
            | CompletionOutcome::Discarded { ticket } => *ticket,
        }
    }
}

#[derive(Debug)]
struct Completion {
    ticket: RequestTicket,
    result: Result<RouteResult, RoutingFailure>,
}

pub struct Orchestrator<E, M, N>
where
    E: RoutingEngine + 'static,
    M: MapScene,
    N: NotificationSink,
{
    client: Arc<RouteClient<E>>,
    presenter: RoutePresenter<M>,
    sink: N,
    config: PlannerConfig,
    runtime: Handle,
    last_issued: u64,
    last_applied: u64,
    in_flight: HashMap<RequestTicket, AbortHandle>,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl<E, M, N> Orchestrator<E, M, N>
where
    E: RoutingEngine + 'static,
    M: MapScene,
    N: NotificationSink,
{
    /// Wires the collaborators together and points the camera at the
    /// configured origin.
    pub fn new(runtime: Handle, engine: E, scene: M, sink: N, config: PlannerConfig) -> Self {
        let mut presenter =
            RoutePresenter::with_style(scene, config.polyline_style, config.marker_icon.clone());
        presenter.look_at(config.origin, config.camera_distance_meters);

        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(RouteClient::new(engine)),
            presenter,
            sink,
            config,
            runtime,
            last_issued: 0,
            last_applied: 0,
            in_flight: HashMap::new(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn presenter(&self) -> &RoutePresenter<M> {
        &self.presenter
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn client(&self) -> &RouteClient<E> {
        &self.client
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Requests a route between the configured origin and destination.
    pub fn plan_default_route(&mut self) -> Result<RequestTicket, InvalidRequest> {
        let waypoints = [
            Waypoint::new(self.config.origin),
            Waypoint::new(self.config.destination),
        ];
        let options = self.config.options.clone();
        self.plan_route_with(&waypoints, &options)
    }

    /// Requests a route through `waypoints` using the configured options.
    pub fn plan_route(&mut self, waypoints: &[Waypoint]) -> Result<RequestTicket, InvalidRequest> {
        let options = self.config.options.clone();
        self.plan_route_with(waypoints, &options)
    }

    /// Validates and dispatches a request without waiting for it.
    ///
    /// Invalid input is returned here and nothing is dispatched.
    pub fn plan_route_with(
        &mut self,
        waypoints: &[Waypoint],
        options: &RouteOptions,
    ) -> Result<RequestTicket, InvalidRequest> {
        let request = RouteRequest::build(waypoints, options)?;

        self.last_issued += 1;
        let ticket = RequestTicket(self.last_issued);
        let client = Arc::clone(&self.client);
        let completions = self.completions_tx.clone();
        let timeout = self.config.request_timeout;

        let task = self.runtime.spawn(async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, client.calculate_route(&request))
                    .await
                    .unwrap_or_else(|_| {
                        Err(RoutingFailure::new(
                            RoutingErrorKind::Timeout,
                            format!("no route within {:?}", limit),
                        ))
                    }),
                None => client.calculate_route(&request).await,
            }
        });
        self.in_flight.insert(ticket, task.abort_handle());

        // Every task that ends without being aborted reports exactly once,
        // including one whose engine panicked.
        self.runtime.spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(err) if err.is_panic() => {
                    error!(?ticket, "routing engine panicked");
                    Err(RoutingFailure::new(
                        RoutingErrorKind::Internal,
                        "routing engine panicked",
                    ))
                }
                Err(_) => {
                    debug!(?ticket, "route task aborted");
                    return;
                }
            };
            if completions.send(Completion { ticket, result }).is_err() {
                debug!(?ticket, "orchestrator dropped before route completed");
            }
        });

        debug!(?ticket, waypoints = waypoints.len(), "route request dispatched");
        Ok(ticket)
    }

    /// Aborts a request. Returns false if it already completed.
    pub fn cancel(&mut self, ticket: RequestTicket) -> bool {
        match self.in_flight.remove(&ticket) {
            Some(task) => {
                task.abort();
                info!(?ticket, "route request cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (ticket, task) in self.in_flight.drain() {
            task.abort();
            info!(?ticket, "route request cancelled");
        }
    }

    /// Waits for the next completion and applies it. Returns `None` when
    /// nothing is in flight or queued.
    pub async fn next_completion(&mut self) -> Option<CompletionOutcome> {
        if self.in_flight.is_empty() {
            let completion = self.completions_rx.try_recv().ok()?;
            return Some(self.apply(completion));
        }
        let completion = self.completions_rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Applies every completion that has already arrived, without waiting.
    pub fn drain_completions(&mut self) -> Vec<CompletionOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            outcomes.push(self.apply(completion));
        }
        outcomes
    }

    /// Removes the shown route from the map.
    pub fn clear_map(&mut self) {
        self.presenter.clear();
    }

    fn apply(&mut self, completion: Completion) -> CompletionOutcome {
        let Completion { ticket, result } = completion;

        if self.in_flight.remove(&ticket).is_none() || ticket.0 < self.last_applied {
            warn!(?ticket, last_applied = self.last_applied, "discarding stale route completion");
            return CompletionOutcome::Discarded { ticket };
        }
        self.last_applied = ticket.0;

        match result {
            Ok(result) => {
                let route = result.into_best();
                let summary = summarize(&route);
                info!(
                    ?ticket,
                    duration_secs = route.duration_secs(),
                    length_meters = route.length_meters(),
                    sections = route.sections().len(),
                    "route calculated"
                );
                for notice in route.notices() {
                    warn!(code = %notice.code, "route notice: {}", notice.message);
                }
                for maneuver in route.maneuvers() {
                    debug!(
                        action = ?maneuver.action,
                        lat = maneuver.location.lat(),
                        lng = maneuver.location.lng(),
                        road = maneuver.road_name.as_deref().unwrap_or(""),
                        "maneuver"
                    );
                }

                self.sink.notify(SUCCESS_TITLE, &summary.message());
                if self.config.frame_route_on_show {
                    self.presenter.frame_route(&route);
                }
                self.presenter.show_route(route);
                CompletionOutcome::Shown { ticket, summary }
            }
            Err(failure) => {
                warn!(?ticket, kind = %failure.kind, message = %failure.message, "route calculation failed");
                self.sink.notify(FAILURE_TITLE, &failure.to_string());
                CompletionOutcome::Failed { ticket, failure }
            }
        }
    }
}

impl<E, M, N> Drop for Orchestrator<E, M, N>
where
    E: RoutingEngine + 'static,
    M: MapScene,
    N: NotificationSink,
{
    fn drop(&mut self) {
        for task in self.in_flight.values() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tracing_test::traced_test;

    use crate::error::RenderFailure;
    use crate::geo::{GeoPath, GeoPoint};
    use crate::route::{Place, Route, Section, SectionNotice};
    use crate::traits::{IconRef, MarkerHandle, PolylineHandle, PolylineStyle};

    struct TollRoadEngine;

    #[async_trait]
    impl RoutingEngine for TollRoadEngine {
        async fn calculate_route(
            &self,
            waypoints: &[Waypoint],
            _options: &RouteOptions,
        ) -> Result<Vec<Route>, RoutingFailure> {
            let (from, to) = (waypoints[0].point, waypoints[waypoints.len() - 1].point);
            let section = Section::new(
                Place::new(from),
                Place::new(to),
                GeoPath::new(vec![from, to]).unwrap(),
                120,
                900,
            )
            .with_notices(vec![SectionNotice {
                code: "tollRoad".to_string(),
                message: "route uses a toll road".to_string(),
            }]);
            Ok(vec![Route::new(vec![section]).unwrap()])
        }
    }

    #[derive(Default)]
    struct BlankScene {
        next: u64,
    }

    impl MapScene for BlankScene {
        fn add_polyline(&mut self, _: &GeoPath, _: &PolylineStyle) -> Result<PolylineHandle, RenderFailure> {
            self.next += 1;
            Ok(PolylineHandle(self.next))
        }

        fn remove_polyline(&mut self, _: PolylineHandle) -> Result<(), RenderFailure> {
            Ok(())
        }

        fn add_marker(&mut self, _: GeoPoint, _: &IconRef) -> Result<MarkerHandle, RenderFailure> {
            self.next += 1;
            Ok(MarkerHandle(self.next))
        }

        fn remove_marker(&mut self, _: MarkerHandle) -> Result<(), RenderFailure> {
            Ok(())
        }

        fn look_at(&mut self, _: GeoPoint, _: f64) {}
    }

    #[derive(Default)]
    struct Inbox(Vec<(String, String)>);

    impl NotificationSink for Inbox {
        fn notify(&mut self, title: &str, message: &str) {
            self.0.push((title.to_string(), message.to_string()));
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_route_notices_are_logged_as_warnings() {
        let mut orchestrator = Orchestrator::new(
            Handle::current(),
            TollRoadEngine,
            BlankScene::default(),
            Inbox::default(),
            PlannerConfig::default(),
        );

        orchestrator.plan_default_route().unwrap();
        let outcome = orchestrator.next_completion().await.unwrap();

        assert!(matches!(outcome, CompletionOutcome::Shown { .. }));
        assert_eq!(orchestrator.sink().0.len(), 1);
        assert!(logs_contain("route notice: route uses a toll road"));
        assert!(logs_contain("tollRoad"));
    }
}
