// Tools available to the movie assistant
//
// Each tool wraps a provider trait so tests can swap the network backend.

pub mod trailer;
pub mod web_search;

pub use trailer::{find_trailer, TrailerTool, VideoProvider, VideoResult, YouTubeSearch};
pub use web_search::{DuckDuckGoSearch, SearchProvider, WebSearchTool};

use crate::agent::ToolRegistry;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Registry with the production search and trailer tools
pub fn default_registry(timeout: Duration) -> Result<ToolRegistry> {
    let search: Arc<dyn SearchProvider> = Arc::new(DuckDuckGoSearch::new(timeout)?);
    let videos: Arc<dyn VideoProvider> = Arc::new(YouTubeSearch::new(timeout)?);

    Ok(ToolRegistry::new()
        .with_tool(Arc::new(WebSearchTool::new(search)))
        .with_tool(Arc::new(TrailerTool::new(videos))))
}
