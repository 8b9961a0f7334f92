use std::process::Stdio;

use async_trait::async_trait;
use jukebox_core::format_length_text;
use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use super::{ContentResolver, InputError, SearchResult};

const DEFAULT_RESULT_COUNT: usize = 10;

/// Searches YouTube using yt-dlp.
#[derive(Debug, Clone)]
pub struct YouTubeSearch {
    binary: String,
    result_count: usize,
}

#[derive(Debug, Deserialize)]
struct FlatYouTubeVideo {
    id: String,
    title: String,
    duration: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YouTubeEntry {
    Flat(FlatYouTubeVideo),
    // Deleted or private videos come without a title
    Unavailable {},
}

#[derive(Debug, Deserialize)]
struct YouTubeSearchResults {
    entries: Vec<YouTubeEntry>,
}

impl YouTubeSearch {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            result_count: DEFAULT_RESULT_COUNT,
        }
    }

    async fn run(&self, query: &str) -> Result<String, InputError> {
        let search = format!("ytsearch{}:{}", self.result_count, query);

        // Both pipes are drained together, a chatty stderr can't stall the process
        let output = Command::new(&self.binary)
            // Don't resolve every result, the flat data is enough.
            .arg("--flat-playlist")
            .arg("--skip-download")
            // Get a JSON output, in a single line.
            .arg("-J")
            .args(["--", &search])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| InputError::Other(e.to_string()))?;

        if !output.status.success() {
            let error_output = String::from_utf8_lossy(&output.stderr);
            return Err(InputError::FetchError(error_output.trim().to_string()));
        }

        String::from_utf8(output.stdout).map_err(|e| InputError::ParseError(e.to_string()))
    }
}

impl Default for YouTubeSearch {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl ContentResolver for YouTubeSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, InputError> {
        let query = query.trim();

        if query.is_empty() {
            return Err(InputError::NoMatch);
        }

        debug!("Searching YouTube for \"{}\"", query);

        let output = self.run(query).await?;
        parse_search_results(&output)
    }
}

fn parse_search_results(output: &str) -> Result<Vec<SearchResult>, InputError> {
    let results: YouTubeSearchResults =
        serde_json::from_str(output).map_err(|e| InputError::ParseError(e.to_string()))?;

    Ok(results
        .entries
        .into_iter()
        .filter_map(|entry| match entry {
            YouTubeEntry::Flat(video) => Some(video.into()),
            YouTubeEntry::Unavailable {} => None,
        })
        .collect())
}

impl From<FlatYouTubeVideo> for SearchResult {
    fn from(video: FlatYouTubeVideo) -> Self {
        Self {
            title: video.title,
            id: video.id,
            // Live streams have no duration
            length_text: video
                .duration
                .map(|d| format_length_text(d.max(0.) as u32))
                .unwrap_or_default(),
        }
    }
}
