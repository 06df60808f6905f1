// Trailer lookup: finds the official YouTube trailer for a title

use crate::agent::Tool;
use crate::error::{CinebotError, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

const YOUTUBE_RESULTS_URL: &str = "https://www.youtube.com/results";
const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// One video returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoResult {
    pub id: String,
}

/// Video search backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Search for videos, returning at most `max_results` hits in ranking order
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<VideoResult>>;
}

/// Look up the official trailer for `title`
///
/// Provider errors propagate to the caller.
pub async fn find_trailer(provider: &dyn VideoProvider, title: &str) -> Result<String> {
    let query = format!("{} official trailer", title);
    let results = provider.search(&query, 1).await?;

    Ok(match results.first() {
        Some(video) => format!("🎬 Found trailer: {}{}", YOUTUBE_WATCH_URL, video.id),
        None => "No trailer found.".to_string(),
    })
}

/// Scrapes the YouTube results page for video ids
pub struct YouTubeSearch {
    client: Client,
}

impl YouTubeSearch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl VideoProvider for YouTubeSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<VideoResult>> {
        let response = self
            .client
            .get(YOUTUBE_RESULTS_URL)
            .query(&[("search_query", query)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CinebotError::ToolError(format!(
                "YouTube search returned {}",
                response.status()
            )));
        }

        let page = response.text().await?;
        let ids = extract_video_ids(&page, max_results);
        tracing::debug!("YouTube search {:?} -> {} result(s)", query, ids.len());

        Ok(ids.into_iter().map(|id| VideoResult { id }).collect())
    }
}

fn video_renderer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""videoRenderer":\{"videoId":"([A-Za-z0-9_-]{11})""#)
            .expect("video renderer pattern is valid")
    })
}

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""videoId":"([A-Za-z0-9_-]{11})""#).expect("video id pattern is valid")
    })
}

/// Distinct video ids in page order, search results first
///
/// Falls back to any `videoId` on the page when no result renderers are present.
fn extract_video_ids(page: &str, max_results: usize) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();

    for pattern in [video_renderer_pattern(), video_id_pattern()] {
        for capture in pattern.captures_iter(page) {
            if ids.len() >= max_results {
                return ids;
            }
            let id = &capture[1];
            if !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
        if !ids.is_empty() {
            break;
        }
    }

    ids
}

/// Agent tool wrapping a video provider
pub struct TrailerTool {
    provider: Arc<dyn VideoProvider>,
}

impl TrailerTool {
    pub fn new(provider: Arc<dyn VideoProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for TrailerTool {
    fn name(&self) -> &str {
        "youtube_search"
    }

    fn description(&self) -> &str {
        "Find a YouTube trailer link for a movie or series."
    }

    fn input_description(&self) -> &str {
        "Title of the movie or series"
    }

    async fn run(&self, input: &str) -> Result<String> {
        find_trailer(self.provider.as_ref(), input).await
    }
}
