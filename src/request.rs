//! Route request assembly.

use serde::{Deserialize, Serialize};

use crate::error::InvalidRequest;
use crate::geo::GeoPoint;

/// Upper bound on alternative routes a request may ask for.
pub const MAX_ALTERNATIVES: u8 = 3;

/// A location the route must pass through, with optional routing hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub point: GeoPoint,
    /// Direction of travel at the waypoint in degrees clockwise from north.
    pub heading: Option<f64>,
}

impl Waypoint {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            heading: None,
        }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }
}

impl From<GeoPoint> for Waypoint {
    fn from(point: GeoPoint) -> Self {
        Waypoint::new(point)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    #[default]
    Car,
    Truck,
    Pedestrian,
    Bicycle,
    Scooter,
}

/// Options forwarded to the routing capability. Not interpreted locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOptions {
    pub transport_mode: TransportMode,
    pub avoid_tolls: bool,
    pub avoid_highways: bool,
    /// Number of alternatives wanted in addition to the best route.
    pub alternatives: u8,
}

impl RouteOptions {
    pub fn car() -> Self {
        Self::default()
    }

    pub fn pedestrian() -> Self {
        Self {
            transport_mode: TransportMode::Pedestrian,
            ..Self::default()
        }
    }
}

/// A validated, immutable route request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    waypoints: Vec<Waypoint>,
    options: RouteOptions,
}

impl RouteRequest {
    /// Validates the inputs and copies them into a new request.
    pub fn build(waypoints: &[Waypoint], options: &RouteOptions) -> Result<Self, InvalidRequest> {
        if waypoints.len() < 2 {
            return Err(InvalidRequest::TooFewWaypoints {
                count: waypoints.len(),
            });
        }

        for (index, waypoint) in waypoints.iter().enumerate() {
            if let Some(heading) = waypoint.heading {
                if !(0.0..360.0).contains(&heading) {
                    return Err(InvalidRequest::InvalidHeading { index, heading });
                }
            }
        }

        if options.alternatives > MAX_ALTERNATIVES {
            return Err(InvalidRequest::TooManyAlternatives {
                requested: options.alternatives,
                max: MAX_ALTERNATIVES,
            });
        }

        Ok(Self {
            waypoints: waypoints.to_vec(),
            options: options.clone(),
        })
    }

    /// Shorthand for a plain origin to destination request.
    pub fn between(
        origin: GeoPoint,
        destination: GeoPoint,
        options: &RouteOptions,
    ) -> Result<Self, InvalidRequest> {
        Self::build(&[Waypoint::new(origin), Waypoint::new(destination)], options)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    pub fn origin(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    pub fn destination(&self) -> &Waypoint {
        &self.waypoints[self.waypoints.len() - 1]
    }
}
