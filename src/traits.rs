//! Seams to the external capabilities the planner drives.
//!
//! Route calculation, map rendering and user notification all live outside
//! this crate. Hosts implement these traits for whatever engine, map view and
//! UI toolkit they use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RenderFailure, RoutingFailure};
use crate::geo::{GeoPath, GeoPoint};
use crate::request::{RouteOptions, Waypoint};
use crate::route::Route;

/// Computes routes through an ordered list of waypoints.
///
/// Implementations return routes ranked best-first. A single call produces
/// exactly one outcome and is never retried by the caller.
#[async_trait]
pub trait RoutingEngine: Send + Sync {
    async fn calculate_route(
        &self,
        waypoints: &[Waypoint],
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RoutingFailure>;
}

/// Handle of a polyline added to a map scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolylineHandle(pub u64);

/// Handle of a marker added to a map scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

/// RGBA color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolylineStyle {
    pub color: Rgba,
    pub width_px: f32,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            color: Rgba {
                r: 0.0,
                g: 0.56,
                b: 0.54,
                a: 0.63,
            },
            width_px: 20.0,
        }
    }
}

/// Reference to a marker image known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRef(pub String);

impl Default for IconRef {
    fn default() -> Self {
        IconRef("green_dot".to_string())
    }
}

/// A map view that can draw and remove overlays.
///
/// Not assumed to be thread-safe; callers serialize access.
pub trait MapScene {
    fn add_polyline(
        &mut self,
        geometry: &GeoPath,
        style: &PolylineStyle,
    ) -> Result<PolylineHandle, RenderFailure>;

    fn remove_polyline(&mut self, handle: PolylineHandle) -> Result<(), RenderFailure>;

    fn add_marker(&mut self, point: GeoPoint, icon: &IconRef) -> Result<MarkerHandle, RenderFailure>;

    fn remove_marker(&mut self, handle: MarkerHandle) -> Result<(), RenderFailure>;

    fn look_at(&mut self, center: GeoPoint, distance_meters: f64);
}

/// Fire-and-forget message surface for the end user.
pub trait NotificationSink {
    fn notify(&mut self, title: &str, message: &str);
}
