use crate::queries::_structs::{
    Accessibility, Destination, Location, MobilityResponse, Mode, Place, RealTimeUpdates, Route,
    RouteGeometry, RouteStep, Sustainability,
};
use crate::queries::find_route::OsrmRoute;
use crate::utils::geo::haversine_km;

/// Decimal-degree offset used for the synthesized fallback destination,
/// roughly one kilometer.
const FALLBACK_OFFSET_DEG: f64 = 0.01;

/// Estimated CO2 mass in kilograms for traversing `distance_m` meters by
/// the given mode. Zero for the active modes, 0.2 kg/km otherwise.
pub fn carbon_footprint(distance_m: f64, mode: Mode) -> f64 {
    if mode.is_sustainable() {
        0.0
    } else {
        (distance_m / 1000.0) * 0.2
    }
}

/// Coarse sustainability rating derived solely from the mode.
pub fn green_score(is_sustainable: bool) -> u8 {
    if is_sustainable {
        100
    } else {
        50
    }
}

/// Route built from an actual routed path returned by the routing service.
pub fn routed(osrm: &OsrmRoute, mode: Mode, place: &Place) -> Route {
    let steps = osrm
        .legs
        .first()
        .map(|leg| {
            leg.steps
                .iter()
                .map(|step| RouteStep {
                    instruction: step.instruction(),
                    distance: step.distance,
                    duration: step.duration,
                    mode: step.mode.clone(),
                    name: step.name.clone(),
                    intersections: step.intersections.clone(),
                    geometry: step.geometry.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    Route {
        mode: mode.route_descriptor(),
        distance: osrm.distance,
        duration: osrm.duration,
        carbon_footprint: carbon_footprint(osrm.distance, mode),
        accessibility: Accessibility::full(),
        steps,
        geometry: Some(osrm.geometry.clone()),
        destination: Some(Destination {
            name: place.name.clone(),
            kind: place.kind.clone(),
            address: place.address.clone(),
            phone: place.phone.clone(),
            website: place.website.clone(),
            opening_hours: place.opening_hours.clone(),
            accessibility: place.accessibility,
        }),
    }
}

/// Degraded route when live routing is unavailable: straight-line distance,
/// no duration, no steps, two-point geometry.
pub fn straight_line(start: &Location, end: &Location, mode: Mode) -> Route {
    let distance_m = haversine_km(start.lat, start.lng, end.lat, end.lng) * 1000.0;
    Route {
        mode: mode.route_descriptor(),
        distance: distance_m,
        duration: 0.0,
        carbon_footprint: 0.0,
        accessibility: Accessibility::full(),
        steps: Vec::new(),
        geometry: Some(RouteGeometry::line(vec![
            [start.lng, start.lat],
            [end.lng, end.lat],
        ])),
        destination: None,
    }
}

/// Fabricate a destination about one kilometer from the origin at the given
/// bearing. The bearing is supplied by the caller so the fallback stays
/// deterministic under test.
pub fn synthesize_destination(origin: &Location, bearing_rad: f64, name: &str) -> Location {
    Location::named(
        origin.lat + FALLBACK_OFFSET_DEG * bearing_rad.sin(),
        origin.lng + FALLBACK_OFFSET_DEG * bearing_rad.cos(),
        name,
    )
}

/// Wrap a single route into the response envelope.
pub fn envelope(route: Route) -> MobilityResponse {
    let sustainability = Sustainability {
        carbon_footprint: route.carbon_footprint,
        green_score: green_score(route.mode.is_sustainable),
    };
    let accessibility = route.accessibility;
    MobilityResponse {
        routes: vec![route],
        amenities: Vec::new(),
        sustainability,
        accessibility,
        real_time_updates: RealTimeUpdates::mock(),
    }
}

/// Full degraded answer for the no-places case: a synthesized nearby point,
/// a straight-line route to it, and the user-facing explanation. This path
/// skips the language model entirely.
pub fn no_places_response(
    start: &Location,
    mode: Mode,
    destination_type: &str,
    bearing_rad: f64,
) -> (String, MobilityResponse) {
    let end = synthesize_destination(start, bearing_rad, destination_type);
    let data = envelope(straight_line(start, &end, mode));
    let message = format!(
        "I couldn't find any {destination_type} in the area. \
         I've shown you a route to a nearby point instead."
    );
    (message, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::_structs::Coordinates;
    use crate::queries::find_route::OsrmResponse;

    #[test]
    fn carbon_is_zero_for_active_modes() {
        for d in [0.0, 500.0, 12_000.0] {
            assert_eq!(carbon_footprint(d, Mode::Walking), 0.0);
            assert_eq!(carbon_footprint(d, Mode::Cycling), 0.0);
        }
    }

    #[test]
    fn carbon_is_linear_for_driving() {
        assert_eq!(carbon_footprint(1000.0, Mode::Driving), 0.2);
        assert_eq!(carbon_footprint(5500.0, Mode::Driving), 1.1);
        assert_eq!(carbon_footprint(0.0, Mode::Driving), 0.0);
    }

    #[test]
    fn green_score_is_dichotomous() {
        assert_eq!(green_score(true), 100);
        assert_eq!(green_score(false), 50);
    }

    #[test]
    fn straight_line_route_has_no_duration_or_steps() {
        let start = Location::new(51.505, -0.09);
        let end = Location::new(51.515, -0.09);
        let route = straight_line(&start, &end, Mode::Walking);
        assert_eq!(route.duration, 0.0);
        assert!(route.steps.is_empty());
        assert_eq!(route.carbon_footprint, 0.0);
        let geometry = route.geometry.unwrap();
        assert_eq!(geometry.coordinates.len(), 2);
        assert_eq!(geometry.coordinates[0], [-0.09, 51.505]);
        // ~1.1 km of latitude.
        assert!((route.distance - 1112.0).abs() < 20.0);
    }

    #[test]
    fn synthesized_destination_sits_about_a_kilometer_away() {
        let origin = Location::new(51.505, -0.09);
        for bearing in [0.0, 1.0, 2.5, 5.0] {
            let dest = synthesize_destination(&origin, bearing, "pharmacy");
            let km = haversine_km(origin.lat, origin.lng, dest.lat, dest.lng);
            assert!(km > 0.5 && km < 1.5, "bearing {bearing} gave {km} km");
            assert_eq!(dest.name.as_deref(), Some("pharmacy"));
        }
    }

    #[test]
    fn no_places_fallback_names_the_missing_destination() {
        let start = Location::new(51.505, -0.09);
        let (message, data) = no_places_response(&start, Mode::Walking, "pharmacy", 1.2);
        assert!(message.contains("couldn't find any pharmacy"));
        assert_eq!(data.routes[0].duration, 0.0);
        assert!(data.routes[0].steps.is_empty());
        assert_eq!(data.sustainability.green_score, 100);
        assert!(data.amenities.is_empty());
    }

    #[test]
    fn routed_path_keeps_service_figures_and_destination() {
        let body: OsrmResponse = serde_json::from_str(
            r#"{
                "code": "Ok",
                "routes": [{
                    "distance": 2500.0,
                    "duration": 1800.0,
                    "geometry": {"type": "LineString",
                                 "coordinates": [[-0.09, 51.505], [-0.1, 51.51]]},
                    "legs": [{"steps": [
                        {"distance": 100.0, "duration": 80.0, "name": "High Street",
                         "mode": "driving",
                         "maneuver": {"type": "turn", "modifier": "right"}}
                    ]}]
                }]
            }"#,
        )
        .unwrap();
        let place = Place {
            name: "Boots".into(),
            kind: "pharmacy".into(),
            distance: 2.5,
            coordinates: Coordinates {
                lat: 51.51,
                lng: -0.1,
            },
            address: "High Street".into(),
            phone: "Phone not available".into(),
            website: "Website not available".into(),
            opening_hours: "Hours not available".into(),
            rating: None,
            wheelchair: "yes".into(),
            smoking: "unknown".into(),
            cuisine: None,
            brand: None,
            operator: None,
            capacity: None,
            fee: "unknown".into(),
            parking: "unknown".into(),
            public_transport: "unknown".into(),
            accessibility: Accessibility {
                wheelchair: true,
                audio: false,
                visual: false,
            },
        };

        let route = routed(&body.routes[0], Mode::Driving, &place);
        assert_eq!(route.distance, 2500.0);
        assert_eq!(route.duration, 1800.0);
        assert_eq!(route.carbon_footprint, 0.5);
        assert_eq!(route.steps.len(), 1);
        assert_eq!(route.steps[0].instruction, "turn right");
        let destination = route.destination.unwrap();
        assert_eq!(destination.name, "Boots");
        assert!(destination.accessibility.wheelchair);

        let data = envelope(routed(&body.routes[0], Mode::Driving, &place));
        assert_eq!(data.sustainability.green_score, 50);
        assert_eq!(data.sustainability.carbon_footprint, 0.5);
    }
}
