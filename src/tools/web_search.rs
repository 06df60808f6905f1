// Web search tool backed by the DuckDuckGo HTML endpoint

use crate::agent::Tool;
use crate::error::{CinebotError, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const DEFAULT_MAX_RESULTS: usize = 5;
const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// Free-text web search backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

/// DuckDuckGo search returning the top result snippets as one text blob
pub struct DuckDuckGoSearch {
    client: Client,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            max_results: DEFAULT_MAX_RESULTS,
        })
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .post(DUCKDUCKGO_HTML_URL)
            .form(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CinebotError::ToolError(format!(
                "DuckDuckGo search returned {}",
                response.status()
            )));
        }

        let page = response.text().await?;
        let snippets = extract_snippets(&page, self.max_results);
        tracing::debug!("DuckDuckGo search {:?} -> {} snippet(s)", query, snippets.len());

        if snippets.is_empty() {
            Ok(NO_RESULTS.to_string())
        } else {
            Ok(snippets.join(" "))
        }
    }
}

fn snippet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*class="result__snippet"[^>]*>(.*?)</a>"#)
            .expect("snippet pattern is valid")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

/// Plain-text snippets from a DuckDuckGo HTML results page
fn extract_snippets(page: &str, max_results: usize) -> Vec<String> {
    snippet_pattern()
        .captures_iter(page)
        .map(|capture| {
            let text = tag_pattern().replace_all(&capture[1], "");
            html_escape::decode_html_entities(&text).trim().to_string()
        })
        .filter(|snippet| !snippet.is_empty())
        .take(max_results)
        .collect()
}

/// Agent tool wrapping a search provider
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search for movies/series to extract basic information (IMDB rating, release date, director, starring)"
    }

    fn input_description(&self) -> &str {
        "The search query"
    }

    async fn run(&self, input: &str) -> Result<String> {
        self.provider.search(input).await
    }
}
