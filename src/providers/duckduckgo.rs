//! DuckDuckGo Instant Answer client (web-search second opinion)
//!
//! The abstract and each related topic are treated as ranked hits.

use super::http::UpstreamClient;
use super::{SearchHit, WebSearchProvider};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "duckduckgo";

pub struct DuckDuckGoClient {
    http: UpstreamClient,
}

impl DuckDuckGoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: UpstreamClient::new(PROVIDER, base_url, timeout)?,
        })
    }
}

#[async_trait]
impl WebSearchProvider for DuckDuckGoClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let response: InstantAnswer = self
            .http
            .get_json(
                "/",
                &[
                    ("q", query.to_string()),
                    ("format", "json".to_string()),
                    ("no_html", "1".to_string()),
                    ("skip_disambig", "1".to_string()),
                ],
            )
            .await?;

        Ok(collect_hits(response, limit))
    }
}

fn collect_hits(answer: InstantAnswer, limit: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if !answer.heading.is_empty() || !answer.abstract_text.is_empty() {
        hits.push(SearchHit {
            title: answer.heading,
            snippet: answer.abstract_text,
        });
    }

    // Category entries nest their topics one level down
    let topics = answer.related_topics.into_iter().flat_map(|topic| match topic {
        RelatedTopic::Entry { text, .. } => vec![text],
        RelatedTopic::Group { topics, .. } => topics.into_iter().map(|t| t.text).collect(),
    });

    hits.extend(topics.filter(|text| !text.is_empty()).map(|text| {
        let (title, snippet) = match text.split_once(" - ") {
            Some((title, rest)) => (title.to_string(), rest.to_string()),
            None => (String::new(), text),
        };
        SearchHit { title, snippet }
    }));

    hits.truncate(limit);
    hits
}

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Entry {
        #[serde(rename = "Text")]
        text: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<TopicEntry>,
    },
}

#[derive(Debug, Deserialize)]
struct TopicEntry {
    #[serde(rename = "Text", default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_hits_include_abstract_groups_and_respect_limit() {
        let answer: InstantAnswer = serde_json::from_value(json!({
            "Heading": "TSMC",
            "AbstractText": "Taiwan Semiconductor Manufacturing Company is listed on the stock exchange.",
            "RelatedTopics": [
                { "Text": "TSMC ADR - Traded on NYSE", "FirstURL": "https://duckduckgo.com/a" },
                { "Name": "Companies", "Topics": [
                    { "Text": "Foundry - Contract chip maker", "FirstURL": "https://duckduckgo.com/b" },
                    { "Text": "Wafer - Silicon slice", "FirstURL": "https://duckduckgo.com/c" }
                ]}
            ]
        }))
        .unwrap();

        let hits = collect_hits(answer, 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "TSMC");
        assert_eq!(hits[1].title, "TSMC ADR");
        assert_eq!(hits[1].snippet, "Traded on NYSE");
        assert_eq!(hits[2].title, "Foundry");
    }

    #[tokio::test]
    async fn test_search_sends_json_format() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/")
                    .query_param("q", "tsmc")
                    .query_param("format", "json");
                then.status(200).json_body(json!({
                    "Heading": "",
                    "AbstractText": "",
                    "RelatedTopics": []
                }));
            })
            .await;

        let client =
            DuckDuckGoClient::new(&server.base_url(), std::time::Duration::from_secs(2)).unwrap();
        let hits = client.search("tsmc", 5).await.unwrap();

        mock.assert_async().await;
        assert!(hits.is_empty());
    }
}
