use std::cmp::Ordering;

use crate::queries::_structs::{Accessibility, Coordinates, Location, Place};
use crate::queries::find_nearby::OverpassElement;
use crate::utils::geo::haversine_km;

/// Distances (km) and relevance scores closer than this are treated as ties.
const TIE_BAND: f64 = 0.1;

/// Normalize raw geodata elements into uniform place records. Elements
/// without usable coordinates are dropped.
pub fn normalize_places(origin: &Location, elements: &[OverpassElement]) -> Vec<Place> {
    elements
        .iter()
        .filter_map(|element| normalize_place(origin, element))
        .collect()
}

fn normalize_place(origin: &Location, element: &OverpassElement) -> Option<Place> {
    let (lat, lng) = element.coordinates()?;
    let distance = haversine_km(origin.lat, origin.lng, lat, lng);

    let tag_or = |key: &str, fallback: &str| {
        element
            .tag(key)
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    };
    let tag_opt = |key: &str| element.tag(key).map(str::to_string);

    Some(Place {
        name: tag_or("name", "Unnamed Place"),
        kind: element
            .tag("amenity")
            .or_else(|| element.tag("shop"))
            .or_else(|| element.tag("leisure"))
            .unwrap_or("unknown")
            .to_string(),
        distance,
        coordinates: Coordinates { lat, lng },
        address: tag_or("addr:street", "Address not available"),
        phone: tag_or("phone", "Phone not available"),
        website: tag_or("website", "Website not available"),
        opening_hours: tag_or("opening_hours", "Hours not available"),
        rating: element.tag("rating").and_then(|r| r.parse().ok()),
        wheelchair: tag_or("wheelchair", "unknown"),
        smoking: tag_or("smoking", "unknown"),
        cuisine: tag_opt("cuisine"),
        brand: tag_opt("brand"),
        operator: tag_opt("operator"),
        capacity: tag_opt("capacity"),
        fee: tag_or("fee", "unknown"),
        parking: tag_or("parking", "unknown"),
        public_transport: tag_or("public_transport", "unknown"),
        accessibility: Accessibility {
            wheelchair: element.tag("wheelchair") == Some("yes"),
            audio: element.tag("audio") == Some("yes"),
            visual: element.tag("visual") == Some("yes"),
        },
    })
}

/// Relevance score for a candidate against the extracted destination phrase.
/// Comparisons are case-insensitive throughout.
pub fn calculate_relevance(place: &Place, search_term: &str, is_nearest: bool) -> f64 {
    let mut score = 0.0;
    let search = search_term.to_lowercase();
    let name = place.name.to_lowercase();
    let kind = place.kind.to_lowercase();

    if is_nearest {
        // Nearest queries favor exact category matches.
        if kind == search {
            score += 3.0;
        }
        if name.contains(&search) {
            score += 2.0;
        }
    } else if name.contains(&search) {
        score += 2.0;
    }

    // Partial word matches.
    score += search
        .split_whitespace()
        .filter(|word| name.contains(*word))
        .count() as f64
        * 0.5;

    if matches!(kind.as_str(), "station" | "landmark" | "attraction") {
        score += 1.0;
    }

    if let Some(rating) = place.rating {
        score += rating * 0.5;
    }
    if place.accessibility.wheelchair {
        score += 0.5;
    }
    if place.parking == "yes" {
        score += 0.3;
    }
    if place.public_transport == "yes" {
        score += 0.3;
    }

    score
}

/// Order candidates for selection. Nearest queries sort by ascending
/// distance with near-ties (< 0.1 km) broken by descending relevance;
/// everything else sorts by descending relevance with near-ties broken by
/// ascending distance.
pub fn rank_places(places: &mut [Place], search_term: &str, is_nearest: bool) {
    places.sort_by(|a, b| {
        let relevance_a = calculate_relevance(a, search_term, is_nearest);
        let relevance_b = calculate_relevance(b, search_term, is_nearest);

        if is_nearest {
            if (a.distance - b.distance).abs() < TIE_BAND {
                relevance_b.partial_cmp(&relevance_a).unwrap_or(Ordering::Equal)
            } else {
                a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal)
            }
        } else if (relevance_a - relevance_b).abs() < TIE_BAND {
            a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal)
        } else {
            relevance_b.partial_cmp(&relevance_a).unwrap_or(Ordering::Equal)
        }
    });
}

/// Rank and pick the best candidate.
pub fn select_place(mut places: Vec<Place>, search_term: &str, is_nearest: bool) -> Option<Place> {
    rank_places(&mut places, search_term, is_nearest);
    places.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_place(name: &str, kind: &str, distance: f64) -> Place {
        Place {
            name: name.to_string(),
            kind: kind.to_string(),
            distance,
            coordinates: Coordinates { lat: 0.0, lng: 0.0 },
            address: "Address not available".into(),
            phone: "Phone not available".into(),
            website: "Website not available".into(),
            opening_hours: "Hours not available".into(),
            rating: None,
            wheelchair: "unknown".into(),
            smoking: "unknown".into(),
            cuisine: None,
            brand: None,
            operator: None,
            capacity: None,
            fee: "unknown".into(),
            parking: "unknown".into(),
            public_transport: "unknown".into(),
            accessibility: Accessibility::default(),
        }
    }

    #[test]
    fn wheelchair_flag_adds_exactly_half_a_point() {
        let base = test_place("Boots Pharmacy", "pharmacy", 1.0);
        let mut accessible = base.clone();
        accessible.accessibility.wheelchair = true;

        let without = calculate_relevance(&base, "pharmacy", true);
        let with = calculate_relevance(&accessible, "pharmacy", true);
        assert!((with - without - 0.5).abs() < 1e-9);
    }

    #[test]
    fn nearest_query_scores_exact_type_match() {
        let place = test_place("Unnamed Place", "pharmacy", 1.0);
        assert_eq!(calculate_relevance(&place, "pharmacy", true), 3.0);
        // Regular queries ignore the category match.
        assert_eq!(calculate_relevance(&place, "pharmacy", false), 0.0);
    }

    #[test]
    fn station_kind_gets_type_bonus() {
        let place = test_place("King's Cross", "station", 2.0);
        assert_eq!(calculate_relevance(&place, "pharmacy", false), 1.0);
    }

    #[test]
    fn nearest_sort_breaks_near_ties_by_relevance() {
        // First two are inside the 0.1 km tie band; the far one must sort
        // last no matter how relevant it is.
        let near_plain = test_place("Corner Shop", "convenience", 2.0);
        let near_match = test_place("Central Pharmacy", "pharmacy", 2.05);
        let far_match = test_place("Big Pharmacy", "pharmacy", 5.0);

        let mut places = vec![near_plain.clone(), near_match.clone(), far_match.clone()];
        rank_places(&mut places, "pharmacy", true);

        assert_eq!(places[0].name, "Central Pharmacy");
        assert_eq!(places[1].name, "Corner Shop");
        assert_eq!(places[2].name, "Big Pharmacy");
    }

    #[test]
    fn regular_sort_orders_by_relevance_then_distance() {
        let strong = test_place("Science Museum", "museum", 4.0);
        let weak = test_place("Cafe Nero", "cafe", 1.0);
        let mut places = vec![weak.clone(), strong.clone()];
        rank_places(&mut places, "museum", false);
        assert_eq!(places[0].name, "Science Museum");
    }

    #[test]
    fn normalization_applies_sentinels_and_accessibility() {
        let origin = Location::new(51.505, -0.09);
        let elements: Vec<OverpassElement> = serde_json::from_str(
            r#"[
                {"lat": 51.51, "lon": -0.1,
                 "tags": {"amenity": "pharmacy", "wheelchair": "yes", "rating": "4.5"}},
                {"tags": {"amenity": "orphan-without-coordinates"}}
            ]"#,
        )
        .unwrap();

        let places = normalize_places(&origin, &elements);
        assert_eq!(places.len(), 1);
        let place = &places[0];
        assert_eq!(place.name, "Unnamed Place");
        assert_eq!(place.kind, "pharmacy");
        assert_eq!(place.address, "Address not available");
        assert_eq!(place.fee, "unknown");
        assert_eq!(place.rating, Some(4.5));
        assert!(place.accessibility.wheelchair);
        assert!(!place.accessibility.audio);
        assert!(place.distance > 0.0 && place.distance < 2.0);
    }
}
