//! Journey extraction and the mocked transit planner.
//!
//! No GTFS or geocoding happens here; routes are a fixed template with the
//! origin and destination interpolated.

use chrono::Utc;

use crate::models::transport::{ JourneyPlan, RouteOption, TransportStatus };

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    pub origin: String,
    pub destination: String,
}

/// Byte offset of the first whole-word occurrence of `word` at or after `start`.
fn find_word(haystack: &str, word: &str, start: usize) -> Option<usize> {
    let mut cursor = start;
    while let Some(pos) = haystack[cursor..].find(word) {
        let idx = cursor + pos;
        let end = idx + word.len();
        let before_ok = haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return Some(idx);
        }
        cursor = end;
    }
    None
}

/// Pulls "from X to Y" out of a free-text query.
///
/// Both words must stand alone, so "from Toronto to Boston" splits on the
/// second `to`. Origin and destination come back lowercased and trimmed.
pub fn extract_journey(query: &str) -> Option<Journey> {
    let lower = query.to_lowercase();
    let from_idx = find_word(&lower, "from", 0)?;
    let origin_start = from_idx + "from".len();
    let to_idx = find_word(&lower, "to", origin_start)?;

    let origin = lower[origin_start..to_idx].trim();
    let destination = lower[to_idx + "to".len()..].trim();
    if origin.is_empty() || destination.is_empty() {
        return None;
    }

    Some(Journey {
        origin: origin.to_string(),
        destination: destination.to_string(),
    })
}

pub fn plan_journey(origin: &str, destination: &str) -> JourneyPlan {
    JourneyPlan {
        routes: vec![RouteOption {
            mode: "LRT".to_string(),
            line: "Kelana Jaya Line".to_string(),
            duration: "25 minutes".to_string(),
            steps: vec![
                format!("Walk to nearest LRT station from {}", origin),
                "Take Kelana Jaya Line towards Gombak".to_string(),
                "Transfer at Masjid Jamek to Ampang Line".to_string(),
                format!("Alight at station nearest to {}", destination),
            ],
            fare: "RM 2.50 - RM 4.20".to_string(),
            next_departure: "5 minutes".to_string(),
        }],
        traffic_info: "Moderate traffic conditions".to_string(),
        last_updated: Utc::now().to_rfc3339(),
    }
}

pub fn transport_status() -> TransportStatus {
    TransportStatus {
        lrt_status: "Normal operations".to_string(),
        mrt_status: "Normal operations".to_string(),
        bus_status: "Minor delays on certain routes".to_string(),
        last_updated: Utc::now().to_rfc3339(),
    }
}

pub fn render_journey_answer(journey: &Journey, plan: &JourneyPlan) -> String {
    let mut answer = format!(
        "**Panduan Perjalanan / Journey Guide:** {} → {}\n",
        journey.origin,
        journey.destination
    );
    for route in &plan.routes {
        answer.push_str(&format!(
            "\n**{} ({})**, {}\n",
            route.mode,
            route.line,
            route.duration
        ));
        for (i, step) in route.steps.iter().enumerate() {
            answer.push_str(&format!("{}. {}\n", i + 1, step));
        }
        answer.push_str(&format!("**Tambang / Fare:** {}\n", route.fare));
        answer.push_str(&format!("**Perlepasan seterusnya / Next departure:** {}\n", route.next_departure));
    }
    answer.push_str(&format!("\n**Trafik / Traffic:** {}", plan.traffic_info));
    answer
}
