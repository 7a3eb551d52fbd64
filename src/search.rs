use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const SEARCH_CONTEXT_HEADER: &str = "Based on current search results:\n\n";
pub const MAX_ORGANIC_RESULTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchResult {
    KnowledgeAnswer {
        title: String,
        snippet: String,
    },
    Organic {
        title: String,
        snippet: String,
        link: String,
    },
}

impl SearchResult {
    pub fn snippet(&self) -> &str {
        match self {
            SearchResult::KnowledgeAnswer { snippet, .. } => snippet,
            SearchResult::Organic { snippet, .. } => snippet,
        }
    }
}

#[async_trait]
pub trait SearchService: Send + Sync {
    fn backend_name(&self) -> &'static str;
    /// Results keep service order: knowledge answer first, then organic hits.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

#[derive(Debug, Default, Deserialize)]
struct SerpApiPayload {
    knowledge_graph: Option<SerpKnowledgeGraph>,
    organic_results: Option<Vec<SerpOrganicResult>>,
}

#[derive(Debug, Deserialize)]
struct SerpKnowledgeGraph {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpOrganicResult {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

pub fn search_results_from_payload(payload: serde_json::Value) -> Result<Vec<SearchResult>> {
    let parsed = serde_json::from_value::<SerpApiPayload>(payload)
        .context("search payload did not match the expected shape")?;
    let mut results = Vec::new();

    if let Some(graph) = parsed.knowledge_graph
        && let Some(description) = graph.description.filter(|value| !value.is_empty())
    {
        results.push(SearchResult::KnowledgeAnswer {
            title: graph
                .title
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "Quick Answer".to_string()),
            snippet: description,
        });
    }

    if let Some(organic) = parsed.organic_results {
        results.extend(
            organic
                .into_iter()
                .take(MAX_ORGANIC_RESULTS)
                .map(|result| SearchResult::Organic {
                    title: result.title.unwrap_or_default(),
                    snippet: result.snippet.unwrap_or_default(),
                    link: result.link.unwrap_or_default(),
                }),
        );
    }

    Ok(results)
}

pub fn render_search_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|result| match result {
            SearchResult::KnowledgeAnswer { snippet, .. } => format!("Quick Answer: {snippet}\n\n"),
            SearchResult::Organic { snippet, .. } => format!("• {snippet}\n"),
        })
        .collect::<String>()
}

pub fn build_search_context(results: &[SearchResult]) -> String {
    format!("{SEARCH_CONTEXT_HEADER}{}", render_search_results(results))
}

#[derive(Debug, Clone)]
pub struct SerpApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl SearchService for SerpApiClient {
    fn backend_name(&self) -> &'static str {
        "serpapi"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.trim()),
                ("api_key", self.api_key.as_str()),
                ("num", "5"),
                ("gl", "us"),
                ("hl", "en"),
            ])
            .send()
            .await
            .map_err(|err| err.without_url())
            .context("failed to reach search service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "search service returned {}: {}",
                status,
                body.trim()
            ));
        }

        let payload = response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| err.without_url())
            .context("failed to decode search response")?;
        search_results_from_payload(payload)
    }
}
