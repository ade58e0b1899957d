use regex::Regex;

use crate::queries::_structs::Mode;

/// What the user asked for, parsed from the raw message. Pure parse, no
/// side effects; an empty message falls through to the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub is_route_request: bool,
    pub transport_mode: Mode,
    pub destination_type: String,
    pub is_nearest_query: bool,
}

const TRANSIT_KEYWORDS: [&str; 5] = ["bus", "train", "tube", "metro", "public transport"];
const CYCLING_KEYWORDS: [&str; 2] = ["bike", "cycle"];
const ROUTE_KEYWORDS: [&str; 3] = ["route", "directions", "how to get to"];

/// Parse the free-text message into a routing intent.
pub fn extract_intent(message: &str) -> Intent {
    let lower = message.to_lowercase();

    let is_route_request = ROUTE_KEYWORDS.iter().any(|kw| lower.contains(kw));

    // Transit keywords take priority over cycling ones; "bike to the train
    // station" resolves to driving. Flagged for product review.
    let transport_mode = if TRANSIT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        // No transit profile on the router yet, driving is the stand-in.
        Mode::Driving
    } else if CYCLING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Mode::Cycling
    } else {
        Mode::Walking
    };

    let destination_type = destination_regex()
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| "Destination".to_string());

    let is_nearest_query = lower.contains("nearest");

    Intent {
        is_route_request,
        transport_mode,
        destination_type,
        is_nearest_query,
    }
}

fn destination_regex() -> Regex {
    // "to <X>", stopping at a trailing "from ..." clause or end of message.
    Regex::new(r"(?i)to (.+?)(?:\s*from|$)").expect("destination pattern is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_pharmacy_route_request() {
        let intent = extract_intent("route to nearest pharmacy from here");
        assert!(intent.is_route_request);
        assert!(intent.is_nearest_query);
        assert!(intent.destination_type.starts_with("nearest pharmacy"));
        assert_eq!(intent.transport_mode, Mode::Walking);
    }

    #[test]
    fn directions_keyword_marks_route_request() {
        assert!(extract_intent("Directions to the museum").is_route_request);
        assert!(extract_intent("how to get to King's Cross").is_route_request);
        assert!(!extract_intent("what is the weather like").is_route_request);
    }

    #[test]
    fn transit_keywords_win_over_cycling() {
        let intent = extract_intent("bike route to the train station");
        assert_eq!(intent.transport_mode, Mode::Driving);
    }

    #[test]
    fn cycling_keywords_without_transit() {
        let intent = extract_intent("cycle route to the park");
        assert_eq!(intent.transport_mode, Mode::Cycling);
    }

    #[test]
    fn destination_defaults_when_no_match() {
        let intent = extract_intent("show me a route please");
        assert_eq!(intent.destination_type, "Destination");
    }

    #[test]
    fn empty_message_falls_back_to_defaults() {
        let intent = extract_intent("");
        assert!(!intent.is_route_request);
        assert!(!intent.is_nearest_query);
        assert_eq!(intent.transport_mode, Mode::Walking);
        assert_eq!(intent.destination_type, "Destination");
    }
}
