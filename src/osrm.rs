//! OSRM HTTP adapter for route calculation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RoutingErrorKind, RoutingFailure};
use crate::geo::{GeoPath, GeoPoint};
use crate::request::{RouteOptions, TransportMode, Waypoint};
use crate::route::{Maneuver, ManeuverAction, Place, Route, Section};
use crate::traits::RoutingEngine;

/// Accepted deviation from a waypoint heading, in degrees.
const BEARING_RANGE_DEG: u32 = 45;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_BASE_URL`, `OSRM_PROFILE` and
    /// `OSRM_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("OSRM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(profile) = std::env::var("OSRM_PROFILE") {
            config.profile = profile;
        }
        if let Some(secs) = std::env::var("OSRM_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn profile_for(&self, mode: TransportMode) -> &str {
        match mode {
            TransportMode::Car | TransportMode::Truck => &self.config.profile,
            TransportMode::Pedestrian => "foot",
            TransportMode::Bicycle | TransportMode::Scooter => "bike",
        }
    }

    fn route_url(&self, waypoints: &[Waypoint], options: &RouteOptions) -> String {
        let coords = waypoints
            .iter()
            .map(|waypoint| format!("{:.6},{:.6}", waypoint.point.lng(), waypoint.point.lat()))
            .collect::<Vec<_>>()
            .join(";");

        let mut url = format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson&steps=true",
            self.config.base_url.trim_end_matches('/'),
            self.profile_for(options.transport_mode),
            coords
        );

        if options.alternatives > 0 {
            url.push_str(&format!("&alternatives={}", options.alternatives));
        }

        let mut excludes = Vec::new();
        if options.avoid_tolls {
            excludes.push("toll");
        }
        if options.avoid_highways {
            excludes.push("motorway");
        }
        if !excludes.is_empty() {
            url.push_str(&format!("&exclude={}", excludes.join(",")));
        }

        if waypoints.iter().any(|waypoint| waypoint.heading.is_some()) {
            let bearings = waypoints
                .iter()
                .map(|waypoint| match waypoint.heading {
                    Some(heading) => format!("{},{}", heading.round() as u32 % 360, BEARING_RANGE_DEG),
                    None => String::new(),
                })
                .collect::<Vec<_>>()
                .join(";");
            url.push_str(&format!("&bearings={}", bearings));
        }

        url
    }
}

#[async_trait]
impl RoutingEngine for OsrmClient {
    async fn calculate_route(
        &self,
        waypoints: &[Waypoint],
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RoutingFailure> {
        let url = self.route_url(waypoints, options);
        debug!(%url, "requesting OSRM route");

        let response = self.client.get(url).send().await.map_err(transport_failure)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RoutingFailure::new(
                RoutingErrorKind::Unauthorized,
                format!("OSRM refused the request with status {}", status),
            ));
        }

        let body = match response.json::<OsrmRouteResponse>().await {
            Ok(body) => body,
            Err(_) if status.is_server_error() => {
                return Err(RoutingFailure::new(
                    RoutingErrorKind::ServiceUnavailable,
                    format!("OSRM answered with status {}", status),
                ));
            }
            Err(err) => return Err(transport_failure(err)),
        };

        routes_from_response(body, waypoints)
    }
}

fn transport_failure(err: reqwest::Error) -> RoutingFailure {
    let kind = if err.is_timeout() {
        RoutingErrorKind::Timeout
    } else if err.is_connect() {
        RoutingErrorKind::ServiceUnavailable
    } else {
        RoutingErrorKind::Internal
    };
    RoutingFailure::new(kind, err.to_string())
}

fn failure_for_code(code: &str, message: Option<String>) -> RoutingFailure {
    let kind = match code {
        "NoRoute" | "NoSegment" => RoutingErrorKind::NoRouteFound,
        "InvalidUrl" | "InvalidService" | "InvalidVersion" | "InvalidOptions" | "InvalidQuery"
        | "InvalidValue" | "TooBig" => RoutingErrorKind::InvalidInput,
        _ => RoutingErrorKind::Internal,
    };
    RoutingFailure::new(kind, message.unwrap_or_else(|| code.to_string()))
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    location: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    duration: f64,
    distance: f64,
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    geometry: Option<OsrmGeometry>,
    maneuver: OsrmManeuver,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    location: [f64; 2],
    #[serde(rename = "type")]
    kind: String,
    modifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

fn invalid_response(message: impl Into<String>) -> RoutingFailure {
    RoutingFailure::new(RoutingErrorKind::Internal, message)
}

fn point_from_lng_lat([lng, lat]: [f64; 2]) -> Result<GeoPoint, RoutingFailure> {
    GeoPoint::new(lat, lng).map_err(|err| invalid_response(format!("bad coordinate from OSRM: {}", err)))
}

fn routes_from_response(
    body: OsrmRouteResponse,
    requested: &[Waypoint],
) -> Result<Vec<Route>, RoutingFailure> {
    if body.code != "Ok" {
        return Err(failure_for_code(&body.code, body.message));
    }
    if body.routes.is_empty() {
        return Err(RoutingFailure::new(
            RoutingErrorKind::NoRouteFound,
            "OSRM returned no routes",
        ));
    }

    let snapped = body
        .waypoints
        .iter()
        .map(|waypoint| point_from_lng_lat(waypoint.location))
        .collect::<Result<Vec<_>, _>>()?;

    body.routes
        .into_iter()
        .map(|route| route_from_osrm(route, requested, &snapped))
        .collect()
}

fn route_from_osrm(
    route: OsrmRoute,
    requested: &[Waypoint],
    snapped: &[GeoPoint],
) -> Result<Route, RoutingFailure> {
    if route.legs.len() + 1 != requested.len() {
        return Err(invalid_response(format!(
            "OSRM returned {} legs for {} waypoints",
            route.legs.len(),
            requested.len()
        )));
    }

    let place = |index: usize| match snapped.get(index) {
        Some(matched) => Place::matched(requested[index].point, *matched),
        None => Place::new(requested[index].point),
    };

    let sections = route
        .legs
        .into_iter()
        .enumerate()
        .map(|(index, leg)| -> Result<Section, RoutingFailure> {
            let departure = place(index);
            let arrival = place(index + 1);

            let mut points: Vec<GeoPoint> = Vec::new();
            let mut maneuvers = Vec::with_capacity(leg.steps.len());
            for step in leg.steps {
                if let Some(geometry) = step.geometry {
                    for coordinate in geometry.coordinates {
                        let point = point_from_lng_lat(coordinate)?;
                        if points.last() != Some(&point) {
                            points.push(point);
                        }
                    }
                }
                maneuvers.push(Maneuver {
                    action: maneuver_action(&step.maneuver.kind, step.maneuver.modifier.as_deref()),
                    location: point_from_lng_lat(step.maneuver.location)?,
                    road_name: Some(step.name).filter(|name| !name.is_empty()),
                });
            }
            if points.len() < 2 {
                points = vec![departure.display_point(), arrival.display_point()];
            }

            let geometry = GeoPath::new(points).map_err(|err| invalid_response(err.to_string()))?;
            Ok(Section::new(
                departure,
                arrival,
                geometry,
                leg.duration.max(0.0) as u64,
                leg.distance.max(0.0) as u64,
            )
            .with_maneuvers(maneuvers))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Route::new(sections).map_err(|err| invalid_response(err.to_string()))
}

fn maneuver_action(kind: &str, modifier: Option<&str>) -> ManeuverAction {
    match (kind, modifier) {
        ("depart", _) => ManeuverAction::Depart,
        ("arrive", _) => ManeuverAction::Arrive,
        ("merge", _) => ManeuverAction::Merge,
        ("roundabout" | "rotary" | "roundabout turn" | "exit roundabout" | "exit rotary", _) => {
            ManeuverAction::Roundabout
        }
        (_, Some("uturn")) => ManeuverAction::UTurn,
        (_, Some("left")) => ManeuverAction::LeftTurn,
        (_, Some("right")) => ManeuverAction::RightTurn,
        (_, Some("slight left")) => ManeuverAction::SlightLeftTurn,
        (_, Some("slight right")) => ManeuverAction::SlightRightTurn,
        (_, Some("sharp left")) => ManeuverAction::SharpLeftTurn,
        (_, Some("sharp right")) => ManeuverAction::SharpRightTurn,
        ("continue" | "new name" | "notification", _) | (_, Some("straight")) => ManeuverAction::Continue,
        (other, _) => ManeuverAction::Other(other.to_string()),
    }
}
