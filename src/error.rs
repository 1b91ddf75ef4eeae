//! Error taxonomy for request building, routing, rendering and formatting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A coordinate or path violated its value-type invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("coordinate component is not a finite number")]
    NotFinite,
    #[error("path needs at least 2 points, got {0}")]
    PathTooShort(usize),
}

/// Malformed route request, caught before anything is dispatched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRequest {
    #[error("route request needs at least 2 waypoints, got {count}")]
    TooFewWaypoints { count: usize },
    #[error("waypoint {index} heading {heading} is outside [0, 360)")]
    InvalidHeading { index: usize, heading: f64 },
    #[error("requested {requested} alternatives, at most {max} are supported")]
    TooManyAlternatives { requested: u8, max: u8 },
}

/// Failure categories reported by a routing capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutingErrorKind {
    NoRouteFound,
    InvalidInput,
    ServiceUnavailable,
    Timeout,
    Unauthorized,
    Internal,
}

impl fmt::Display for RoutingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoutingErrorKind::NoRouteFound => "NoRouteFound",
            RoutingErrorKind::InvalidInput => "InvalidInput",
            RoutingErrorKind::ServiceUnavailable => "ServiceUnavailable",
            RoutingErrorKind::Timeout => "Timeout",
            RoutingErrorKind::Unauthorized => "Unauthorized",
            RoutingErrorKind::Internal => "Internal",
        };
        f.write_str(name)
    }
}

/// A route calculation that did not produce a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RoutingFailure {
    pub kind: RoutingErrorKind,
    pub message: String,
}

impl RoutingFailure {
    pub fn new(kind: RoutingErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Which kind of overlay a render call was dealing with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Polyline,
    Marker,
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayKind::Polyline => f.write_str("polyline"),
            OverlayKind::Marker => f.write_str("marker"),
        }
    }
}

/// An overlay add or remove call was rejected by the map scene.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{overlay} render call failed: {message}")]
pub struct RenderFailure {
    pub overlay: OverlayKind,
    pub message: String,
}

impl RenderFailure {
    pub fn new(overlay: OverlayKind, message: impl Into<String>) -> Self {
        Self {
            overlay,
            message: message.into(),
        }
    }
}

/// Rejected input to a summary formatter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("duration must not be negative, got {0}s")]
    NegativeDuration(i64),
    #[error("length must not be negative, got {0}m")]
    NegativeLength(i64),
}
