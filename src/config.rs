//! Planner configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::request::RouteOptions;
use crate::traits::{IconRef, PolylineStyle};

/// Default trip start.
pub const DEFAULT_ORIGIN: GeoPoint = GeoPoint::new_unchecked(33.7046767, -7.362642);

/// Default trip end.
pub const DEFAULT_DESTINATION: GeoPoint = GeoPoint::new_unchecked(33.706628, -7.3584743);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub options: RouteOptions,
    /// Initial camera distance from the origin, in meters.
    pub camera_distance_meters: f64,
    pub polyline_style: PolylineStyle,
    pub marker_icon: IconRef,
    /// Give up on a calculation after this long. `None` waits for the engine.
    pub request_timeout: Option<Duration>,
    /// Move the camera onto each newly shown route.
    pub frame_route_on_show: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN,
            destination: DEFAULT_DESTINATION,
            options: RouteOptions::car(),
            camera_distance_meters: 500.0 * 10.0,
            polyline_style: PolylineStyle::default(),
            marker_icon: IconRef::default(),
            request_timeout: None,
            frame_route_on_show: false,
        }
    }
}
