use async_trait::async_trait;

use crate::models::chat::SourceItem;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub sources: Vec<SourceItem>,
    /// Plain-text background handed to the answer generator.
    pub context: String,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> SearchResult;
}

struct SearchTopic {
    keywords: &'static [&'static str],
    sources: &'static [(&'static str, &'static str)],
    context: &'static str,
}

// Mocked search results. A topic matches when any keyword occurs in the lowercased query;
// every matching topic contributes, in table order.
const SEARCH_TOPICS: &[SearchTopic] = &[
    SearchTopic {
        keywords: &["cyberjaya"],
        sources: &[
            ("Cyberjaya - Wikipedia", "https://en.wikipedia.org/wiki/Cyberjaya"),
            ("Majlis Bandaraya Sepang", "https://www.mpsepang.gov.my"),
        ],
        context: "Cyberjaya is a planned city in Sepang District, Selangor, built around technology parks, universities and the Multimedia Super Corridor.",
    },
    SearchTopic {
        keywords: &["kuala lumpur", "klcc", "kl sentral"],
        sources: &[
            ("Kuala Lumpur - Wikipedia", "https://en.wikipedia.org/wiki/Kuala_Lumpur"),
            ("Prasarana Malaysia", "https://www.prasarana.com.my"),
        ],
        context: "Kuala Lumpur is served by the LRT, MRT, monorail and RapidKL buses, with KL Sentral as the main interchange.",
    },
    SearchTopic {
        keywords: &["income tax", "cukai", "lhdn"],
        sources: &[("MyTax - Lembaga Hasil Dalam Negeri", "https://mytax.hasil.gov.my")],
        context: "Individual income tax in Malaysia is filed online through MyTax, run by the Inland Revenue Board (LHDN).",
    },
];

/// Web search stub backed by [`SEARCH_TOPICS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticWebSearch;

impl StaticWebSearch {
    pub fn lookup(query: &str) -> SearchResult {
        let query_lower = query.to_lowercase();
        let mut result = SearchResult::default();
        let mut contexts = Vec::new();

        for topic in SEARCH_TOPICS {
            if !topic.keywords.iter().any(|k| query_lower.contains(k)) {
                continue;
            }
            result.sources.extend(
                topic.sources
                    .iter()
                    .map(|(title, url)| SourceItem::new(*title, *url))
            );
            contexts.push(topic.context);
        }

        result.context = contexts.join("\n");
        result
    }
}

#[async_trait]
impl WebSearch for StaticWebSearch {
    async fn search(&self, query: &str) -> SearchResult {
        Self::lookup(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_topics_return_empty_result() {
        assert_eq!(StaticWebSearch::lookup("what is the meaning of life"), SearchResult::default());
    }

    #[test]
    fn matching_topics_contribute_in_table_order() {
        let result = StaticWebSearch::lookup("Best cafe in Cyberjaya near KLCC?");
        let titles: Vec<&str> = result.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, [
            "Cyberjaya - Wikipedia",
            "Majlis Bandaraya Sepang",
            "Kuala Lumpur - Wikipedia",
            "Prasarana Malaysia",
        ]);
        assert_eq!(result.context.lines().count(), 2);
    }

    #[tokio::test]
    async fn trait_delegates_to_table() {
        let result = StaticWebSearch.search("how do I pay my LHDN tax").await;
        assert_eq!(result.sources[0].url, "https://mytax.hasil.gov.my");
    }
}
