//! Hand-written collaborators for driving the orchestrator in tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use route_planner::error::{RenderFailure, RoutingErrorKind, RoutingFailure};
use route_planner::geo::{GeoPath, GeoPoint};
use route_planner::request::{RouteOptions, Waypoint};
use route_planner::route::{Maneuver, ManeuverAction, Place, Route, Section};
use route_planner::traits::{
    IconRef, MapScene, MarkerHandle, NotificationSink, PolylineHandle, PolylineStyle, RoutingEngine,
};

pub type EngineOutcome = Result<Vec<Route>, RoutingFailure>;

/// Offset applied to requested points to fake map matching.
pub const SNAP_OFFSET: f64 = 0.0002;

/// One-section route whose endpoints are snapped slightly north of the
/// requested coordinates.
pub fn sample_route(from: GeoPoint, to: GeoPoint, duration_secs: u64, length_meters: u64) -> Route {
    let snapped_from = GeoPoint::new(from.lat() + SNAP_OFFSET, from.lng()).unwrap();
    let snapped_to = GeoPoint::new(to.lat() + SNAP_OFFSET, to.lng()).unwrap();
    let section = Section::new(
        Place::matched(from, snapped_from),
        Place::matched(to, snapped_to),
        GeoPath::new(vec![snapped_from, snapped_to]).unwrap(),
        duration_secs,
        length_meters,
    )
    .with_maneuvers(vec![
        Maneuver {
            action: ManeuverAction::Depart,
            location: snapped_from,
            road_name: None,
        },
        Maneuver {
            action: ManeuverAction::Arrive,
            location: snapped_to,
            road_name: None,
        },
    ]);
    Route::new(vec![section]).unwrap()
}

// ============================================================================
// Map scene
// ============================================================================

#[derive(Debug, Default)]
pub struct SceneLog {
    next_handle: u64,
    pub polylines: HashMap<u64, GeoPath>,
    pub markers: HashMap<u64, GeoPoint>,
    pub camera: Vec<(GeoPoint, f64)>,
    pub fail_removals: bool,
}

/// Map scene that keeps what is currently drawn in a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingScene {
    pub log: Rc<RefCell<SceneLog>>,
}

impl RecordingScene {
    pub fn polyline_count(&self) -> usize {
        self.log.borrow().polylines.len()
    }

    pub fn marker_points(&self) -> Vec<GeoPoint> {
        self.log.borrow().markers.values().copied().collect()
    }

    pub fn last_camera(&self) -> Option<(GeoPoint, f64)> {
        self.log.borrow().camera.last().copied()
    }
}

impl MapScene for RecordingScene {
    fn add_polyline(
        &mut self,
        geometry: &GeoPath,
        _style: &PolylineStyle,
    ) -> Result<PolylineHandle, RenderFailure> {
        let mut log = self.log.borrow_mut();
        log.next_handle += 1;
        let id = log.next_handle;
        log.polylines.insert(id, geometry.clone());
        Ok(PolylineHandle(id))
    }

    fn remove_polyline(&mut self, handle: PolylineHandle) -> Result<(), RenderFailure> {
        let mut log = self.log.borrow_mut();
        if log.fail_removals {
            return Err(RenderFailure::new(
                route_planner::error::OverlayKind::Polyline,
                "scene rejected removal",
            ));
        }
        log.polylines.remove(&handle.0);
        Ok(())
    }

    fn add_marker(&mut self, point: GeoPoint, _icon: &IconRef) -> Result<MarkerHandle, RenderFailure> {
        let mut log = self.log.borrow_mut();
        log.next_handle += 1;
        let id = log.next_handle;
        log.markers.insert(id, point);
        Ok(MarkerHandle(id))
    }

    fn remove_marker(&mut self, handle: MarkerHandle) -> Result<(), RenderFailure> {
        let mut log = self.log.borrow_mut();
        if log.fail_removals {
            return Err(RenderFailure::new(
                route_planner::error::OverlayKind::Marker,
                "scene rejected removal",
            ));
        }
        log.markers.remove(&handle.0);
        Ok(())
    }

    fn look_at(&mut self, center: GeoPoint, distance_meters: f64) {
        self.log.borrow_mut().camera.push((center, distance_meters));
    }
}

// ============================================================================
// Notification sink
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub messages: Rc<RefCell<Vec<(String, String)>>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn last(&self) -> Option<(String, String)> {
        self.messages.borrow().last().cloned()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, title: &str, message: &str) {
        self.messages
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

// ============================================================================
// Routing engines
// ============================================================================

/// Answers every request with the same outcome.
#[derive(Debug, Clone)]
pub struct StaticEngine {
    outcome: EngineOutcome,
    pub calls: Arc<AtomicUsize>,
}

impl StaticEngine {
    pub fn new(outcome: EngineOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(kind: RoutingErrorKind, message: &str) -> Self {
        Self::new(Err(RoutingFailure::new(kind, message)))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutingEngine for StaticEngine {
    async fn calculate_route(&self, _waypoints: &[Waypoint], _options: &RouteOptions) -> EngineOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Holds each request until the test releases it, keyed by destination.
#[derive(Debug, Default)]
pub struct GatedEngine {
    gates: Mutex<HashMap<u64, oneshot::Receiver<EngineOutcome>>>,
}

impl GatedEngine {
    /// Registers a gate for requests ending at `destination`.
    pub fn gate(&self, destination: GeoPoint) -> oneshot::Sender<EngineOutcome> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .insert(destination.lat().to_bits(), rx);
        tx
    }
}

#[async_trait]
impl RoutingEngine for GatedEngine {
    async fn calculate_route(&self, waypoints: &[Waypoint], _options: &RouteOptions) -> EngineOutcome {
        let key = waypoints[waypoints.len() - 1].point.lat().to_bits();
        let gate = self.gates.lock().unwrap().remove(&key);
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| {
                Err(RoutingFailure::new(RoutingErrorKind::Internal, "gate dropped"))
            }),
            None => Err(RoutingFailure::new(RoutingErrorKind::Internal, "no gate registered")),
        }
    }
}

/// Never answers.
#[derive(Debug, Default)]
pub struct PendingEngine;

#[async_trait]
impl RoutingEngine for PendingEngine {
    async fn calculate_route(&self, _waypoints: &[Waypoint], _options: &RouteOptions) -> EngineOutcome {
        std::future::pending().await
    }
}

/// Panics inside the calculation.
#[derive(Debug, Default)]
pub struct PanickingEngine;

#[async_trait]
impl RoutingEngine for PanickingEngine {
    async fn calculate_route(&self, _waypoints: &[Waypoint], _options: &RouteOptions) -> EngineOutcome {
        panic!("engine crashed mid-calculation")
    }
}
