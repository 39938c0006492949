use url::form_urlencoded;

use crate::models::chat::ActionItem;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";
const MAP_LABEL: &str = "Lihat di peta / View on map";

pub fn maps_search_url(query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}{}", MAPS_SEARCH_URL, encoded)
}

enum CuratedLink {
    /// Rendered as a maps search for `search`.
    Map { label: &'static str, search: &'static str },
    Website { label: &'static str, url: &'static str },
}

struct CuratedRule {
    matches: fn(&str) -> bool,
    links: &'static [CuratedLink],
}

fn cyberjaya_cafes(query_lower: &str) -> bool {
    query_lower.contains("cyberjaya") &&
        ["cafe", "café", "coffee", "kopi"].iter().any(|k| query_lower.contains(k))
}

// Hand-picked demo results. The first rule whose predicate accepts the lowercased
// query replaces the generic map action with its own links, in order.
const CURATED_RULES: &[CuratedRule] = &[
    CuratedRule {
        matches: cyberjaya_cafes,
        links: &[
            CuratedLink::Map {
                label: "Kafe di Cyberjaya / Cafés in Cyberjaya",
                search: "cafe Cyberjaya",
            },
            CuratedLink::Map {
                label: "DPulze Shopping Centre",
                search: "DPulze Shopping Centre Cyberjaya",
            },
            CuratedLink::Website {
                label: "Majlis Bandaraya Sepang",
                url: "https://www.mpsepang.gov.my",
            },
        ],
    },
];

impl CuratedLink {
    fn to_action(&self) -> ActionItem {
        match self {
            CuratedLink::Map { label, search } => ActionItem::map(*label, maps_search_url(search)),
            CuratedLink::Website { label, url } => ActionItem::website(*label, *url),
        }
    }
}

/// Actions for a query: a curated list when one applies, otherwise a single map search.
pub fn actions_for(query: &str) -> Vec<ActionItem> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let query_lower = query.to_lowercase();
    if let Some(rule) = CURATED_RULES.iter().find(|rule| (rule.matches)(&query_lower)) {
        return rule.links.iter().map(CuratedLink::to_action).collect();
    }

    vec![ActionItem::map(MAP_LABEL, maps_search_url(query))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::LinkSubtype;

    #[test]
    fn generic_map_action_encodes_query() {
        let actions = actions_for("Klinik Kesihatan Bangsar & Pantai");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].subtype, LinkSubtype::Map);
        assert_eq!(
            actions[0].url,
            "https://www.google.com/maps/search/?api=1&query=Klinik+Kesihatan+Bangsar+%26+Pantai"
        );
    }

    #[test]
    fn curated_rule_replaces_generic_action() {
        let actions = actions_for("Any good coffee spots in Cyberjaya?");
        let labels: Vec<&str> = actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, [
            "Kafe di Cyberjaya / Cafés in Cyberjaya",
            "DPulze Shopping Centre",
            "Majlis Bandaraya Sepang",
        ]);
        assert_eq!(actions[2].subtype, LinkSubtype::Website);
        assert!(actions.iter().all(|a| a.label != MAP_LABEL));
    }

    #[test]
    fn empty_query_has_no_actions() {
        assert!(actions_for("  ").is_empty());
    }
}
