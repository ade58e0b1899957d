use tracing::info;

use crate::functions::routes::{carbon_footprint, green_score};
use crate::queries::_structs::{
    Accessibility, Location, MobilityResponse, Mode, RealTimeUpdates, Route, RouteStep,
    Sustainability,
};
use crate::queries::find_by_coordinates::ReverseGeocoder;
use crate::queries::find_route::{OsrmRoute, RoutingError, RoutingService};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error("Route calculation failed")]
    RouteFailed,
}

/// The snapshot always describes the car baseline, regardless of any mode
/// words in the message; only explicit route requests pick a profile.
const SNAPSHOT_MODE: Mode = Mode::Driving;

/// Wheelchair access depends on the mode; audio and visual guidance are
/// assumed available everywhere.
fn accessibility_for_mode(mode: Mode) -> Accessibility {
    Accessibility {
        wheelchair: matches!(mode, Mode::Driving | Mode::Walking),
        audio: true,
        visual: true,
    }
}

/// Route for the snapshot: the full routed path condensed into one step.
fn snapshot_route(osrm: &OsrmRoute, mode: Mode) -> Route {
    let step = RouteStep {
        instruction: "Route".into(),
        distance: osrm.distance,
        duration: osrm.duration,
        mode: mode.profile().into(),
        name: String::new(),
        intersections: Vec::new(),
        geometry: serde_json::to_value(&osrm.geometry).unwrap_or_default(),
    };

    Route {
        mode: mode.descriptor(),
        distance: osrm.distance,
        duration: osrm.duration,
        carbon_footprint: carbon_footprint(osrm.distance, mode),
        accessibility: accessibility_for_mode(mode),
        steps: vec![step],
        geometry: Some(osrm.geometry.clone()),
        destination: None,
    }
}

/// Mobility snapshot for the current position, used when the message is not
/// a route request: a same-point route, the reverse-geocoded surroundings
/// and the mocked real-time conditions, fetched concurrently.
pub async fn mobility_snapshot(
    routing: &RoutingService,
    geocoder: &ReverseGeocoder,
    start: &Location,
    end: &Location,
) -> Result<MobilityResponse, SnapshotError> {
    info!("Building mobility snapshot at ({}, {})", start.lat, start.lng);

    let (route_result, amenities, real_time_updates) = tokio::join!(
        routing.find_route(start, end, SNAPSHOT_MODE),
        geocoder.find_by_coordinates(start),
        async { RealTimeUpdates::mock() },
    );

    let body = route_result?;
    if body.code != "Ok" {
        return Err(SnapshotError::RouteFailed);
    }
    let osrm = body.routes.first().ok_or(SnapshotError::RouteFailed)?;
    let route = snapshot_route(osrm, SNAPSHOT_MODE);

    let sustainability = Sustainability {
        carbon_footprint: route.carbon_footprint,
        green_score: green_score(route.mode.is_sustainable),
    };
    let accessibility = route.accessibility;

    Ok(MobilityResponse {
        routes: vec![route],
        amenities,
        sustainability,
        accessibility,
        real_time_updates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::find_route::OsrmResponse;

    #[test]
    fn wheelchair_access_follows_mode() {
        assert!(accessibility_for_mode(Mode::Driving).wheelchair);
        assert!(accessibility_for_mode(Mode::Walking).wheelchair);
        assert!(!accessibility_for_mode(Mode::Cycling).wheelchair);
        assert!(accessibility_for_mode(Mode::Cycling).audio);
    }

    #[test]
    fn snapshot_route_condenses_path_into_one_step() {
        let body: OsrmResponse = serde_json::from_str(
            r#"{"code": "Ok", "routes": [{
                "distance": 1500.0, "duration": 1200.0,
                "geometry": {"type": "LineString",
                             "coordinates": [[-0.09, 51.505], [-0.08, 51.51]]}
            }]}"#,
        )
        .unwrap();

        let route = snapshot_route(&body.routes[0], Mode::Driving);
        assert_eq!(route.steps.len(), 1);
        assert_eq!(route.steps[0].instruction, "Route");
        assert_eq!(route.steps[0].distance, 1500.0);
        assert_eq!(route.carbon_footprint, 0.3);
        assert!(route.destination.is_none());
    }

    #[test]
    fn snapshot_baseline_is_the_car_profile() {
        assert_eq!(SNAPSHOT_MODE, Mode::Driving);

        let body: OsrmResponse = serde_json::from_str(
            r#"{"code": "Ok", "routes": [{
                "distance": 0.0, "duration": 0.0,
                "geometry": {"type": "LineString",
                             "coordinates": [[-0.09, 51.505], [-0.09, 51.505]]}
            }]}"#,
        )
        .unwrap();

        let route = snapshot_route(&body.routes[0], SNAPSHOT_MODE);
        assert_eq!(route.mode.name, "Car");
        assert!(!route.mode.is_sustainable);
        assert_eq!(green_score(route.mode.is_sustainable), 50);
        assert!(route.accessibility.wheelchair);
    }
}
