//! Route presentation on a map scene.
//!
//! The presenter exclusively owns the overlays it has put on the scene and is
//! either `Empty` or `Showing` one route. Rendering is best-effort: a failed
//! add or remove is logged and reported, never propagated, so that a new
//! route is always drawn even when cleanup of the old one misbehaves.

use tracing::{debug, warn};

use crate::error::RenderFailure;
use crate::geo::GeoPoint;
use crate::haversine::haversine_meters;
use crate::route::Route;
use crate::traits::{IconRef, MapScene, MarkerHandle, PolylineHandle, PolylineStyle};

/// Closest the camera gets when framing a route.
const MIN_FRAMING_DISTANCE_M: f64 = 500.0;

/// Camera distance as a multiple of the route's bounding-box diagonal.
const FRAMING_PADDING: f64 = 1.5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySet {
    pub polylines: Vec<PolylineHandle>,
    pub markers: Vec<MarkerHandle>,
}

impl OverlaySet {
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty() && self.markers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.polylines.len() + self.markers.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterState {
    Empty,
    Showing(Route),
}

/// What a render pass did to the scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub removed: OverlaySet,
    pub added: OverlaySet,
    pub failures: Vec<RenderFailure>,
}

pub struct RoutePresenter<M: MapScene> {
    scene: M,
    overlays: OverlaySet,
    /// Stale overlays the scene refused to remove, retried on the next pass.
    pending_removals: OverlaySet,
    state: PresenterState,
    style: PolylineStyle,
    marker_icon: IconRef,
}

impl<M: MapScene> RoutePresenter<M> {
    pub fn new(scene: M) -> Self {
        Self::with_style(scene, PolylineStyle::default(), IconRef::default())
    }

    pub fn with_style(scene: M, style: PolylineStyle, marker_icon: IconRef) -> Self {
        Self {
            scene,
            overlays: OverlaySet::default(),
            pending_removals: OverlaySet::default(),
            state: PresenterState::Empty,
            style,
            marker_icon,
        }
    }

    pub fn state(&self) -> &PresenterState {
        &self.state
    }

    pub fn current_route(&self) -> Option<&Route> {
        match &self.state {
            PresenterState::Showing(route) => Some(route),
            PresenterState::Empty => None,
        }
    }

    pub fn overlays(&self) -> &OverlaySet {
        &self.overlays
    }

    pub fn pending_removals(&self) -> &OverlaySet {
        &self.pending_removals
    }

    pub fn scene(&self) -> &M {
        &self.scene
    }

    /// Replaces whatever is shown with `route`: its full geometry as one
    /// polyline plus markers at the map-matched departure and arrival.
    pub fn show_route(&mut self, route: Route) -> RenderReport {
        let mut report = RenderReport::default();
        self.remove_tracked(&mut report);

        match self.scene.add_polyline(route.geometry(), &self.style) {
            Ok(handle) => {
                debug!(?handle, points = route.geometry().points().len(), "added route polyline");
                self.overlays.polylines.push(handle);
                report.added.polylines.push(handle);
            }
            Err(err) => {
                warn!(error = %err, "failed to add route polyline");
                report.failures.push(err);
            }
        }

        let endpoints = [route.departure().display_point(), route.arrival().display_point()];
        for point in endpoints {
            match self.scene.add_marker(point, &self.marker_icon) {
                Ok(handle) => {
                    debug!(?handle, lat = point.lat(), lng = point.lng(), "added route marker");
                    self.overlays.markers.push(handle);
                    report.added.markers.push(handle);
                }
                Err(err) => {
                    warn!(error = %err, "failed to add route marker");
                    report.failures.push(err);
                }
            }
        }

        self.state = PresenterState::Showing(route);
        report
    }

    /// Removes every tracked overlay and returns to `Empty`.
    pub fn clear(&mut self) -> RenderReport {
        let mut report = RenderReport::default();
        self.remove_tracked(&mut report);
        self.state = PresenterState::Empty;
        report
    }

    pub fn look_at(&mut self, center: GeoPoint, distance_meters: f64) {
        self.scene.look_at(center, distance_meters);
    }

    /// Points the camera at the middle of the route's bounding box, far
    /// enough out to see all of it.
    pub fn frame_route(&mut self, route: &Route) {
        let (sw, ne) = route.geometry().bounds();
        let center = GeoPoint::new((sw.lat() + ne.lat()) / 2.0, (sw.lng() + ne.lng()) / 2.0);
        let distance = (haversine_meters(sw, ne) * FRAMING_PADDING).max(MIN_FRAMING_DISTANCE_M);
        match center {
            Ok(center) => self.scene.look_at(center, distance),
            Err(err) => warn!(error = %err, "cannot frame route"),
        }
    }

    // Handles the scene refuses to remove move to `pending_removals` and are
    // retried before the current overlays on every later pass.
    fn remove_tracked(&mut self, report: &mut RenderReport) {
        let mut stale = std::mem::take(&mut self.pending_removals);
        let current = std::mem::take(&mut self.overlays);
        stale.polylines.extend(current.polylines);
        stale.markers.extend(current.markers);

        for handle in stale.polylines {
            match self.scene.remove_polyline(handle) {
                Ok(()) => report.removed.polylines.push(handle),
                Err(err) => {
                    warn!(?handle, error = %err, "failed to remove stale polyline");
                    report.failures.push(err);
                    self.pending_removals.polylines.push(handle);
                }
            }
        }

        for handle in stale.markers {
            match self.scene.remove_marker(handle) {
                Ok(()) => report.removed.markers.push(handle),
                Err(err) => {
                    warn!(?handle, error = %err, "failed to remove stale marker");
                    report.failures.push(err);
                    self.pending_removals.markers.push(handle);
                }
            }
        }
    }
}

impl<M: MapScene> Drop for RoutePresenter<M> {
    fn drop(&mut self) {
        if !self.overlays.is_empty() || !self.pending_removals.is_empty() {
            self.clear();
        }
    }
}
