//! Great-circle distances and a straight-line routing fallback.
//!
//! Uses haversine distance to estimate travel time.
//! Less accurate than a road-network engine (ignores roads) but always available.

use async_trait::async_trait;

use crate::error::{RoutingErrorKind, RoutingFailure};
use crate::geo::{GeoPath, GeoPoint};
use crate::request::{RouteOptions, TransportMode, Waypoint};
use crate::route::{Maneuver, ManeuverAction, Place, Route, Section};
use crate::traits::RoutingEngine;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

const WALKING_SPEED_KMH: f64 = 5.0;
const CYCLING_SPEED_KMH: f64 = 15.0;

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
pub fn haversine_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let (lat1, lng1) = from.coords();
    let (lat2, lng2) = to.coords();

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Summed segment distances along a path, in meters.
pub fn path_length_meters(path: &GeoPath) -> f64 {
    path.points()
        .windows(2)
        .map(|pair| haversine_meters(pair[0], pair[1]))
        .sum()
}

/// Routing engine that connects waypoints with straight lines.
///
/// Useful as a fallback when no routing service is reachable.
#[derive(Debug, Clone)]
pub struct StraightLineEngine {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for StraightLineEngine {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl StraightLineEngine {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    fn speed_for(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Car | TransportMode::Truck => self.speed_kmh,
            TransportMode::Pedestrian => WALKING_SPEED_KMH,
            TransportMode::Bicycle | TransportMode::Scooter => CYCLING_SPEED_KMH,
        }
    }

    /// Convert distance in meters to travel time in seconds.
    fn meters_to_seconds(meters: f64, speed_kmh: f64) -> u64 {
        let hours = meters / 1000.0 / speed_kmh;
        (hours * 3600.0).round() as u64
    }

    fn route_for(&self, waypoints: &[Waypoint], options: &RouteOptions) -> Result<Route, RoutingFailure> {
        let speed = self.speed_for(options.transport_mode);
        if !(speed.is_finite() && speed > 0.0) {
            return Err(RoutingFailure::new(
                RoutingErrorKind::InvalidInput,
                format!("assumed speed {} km/h is not usable", speed),
            ));
        }

        let last_leg = waypoints.len().saturating_sub(2);
        let sections = waypoints
            .windows(2)
            .enumerate()
            .map(|(leg, pair)| -> Result<Section, RoutingFailure> {
                let (from, to) = (pair[0].point, pair[1].point);
                let geometry = GeoPath::new(vec![from, to])
                    .map_err(|err| RoutingFailure::new(RoutingErrorKind::Internal, err.to_string()))?;
                let meters = haversine_meters(from, to);

                let departure_action = if leg == 0 {
                    ManeuverAction::Depart
                } else {
                    ManeuverAction::Continue
                };
                let mut maneuvers = vec![Maneuver {
                    action: departure_action,
                    location: from,
                    road_name: None,
                }];
                if leg == last_leg {
                    maneuvers.push(Maneuver {
                        action: ManeuverAction::Arrive,
                        location: to,
                        road_name: None,
                    });
                }

                Ok(Section::new(
                    Place::matched(from, from),
                    Place::matched(to, to),
                    geometry,
                    Self::meters_to_seconds(meters, speed),
                    meters.round() as u64,
                )
                .with_maneuvers(maneuvers))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Route::new(sections).map_err(|err| RoutingFailure::new(RoutingErrorKind::InvalidInput, err.to_string()))
    }
}

#[async_trait]
impl RoutingEngine for StraightLineEngine {
    async fn calculate_route(
        &self,
        waypoints: &[Waypoint],
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RoutingFailure> {
        self.route_for(waypoints, options).map(|route| vec![route])
    }
}
