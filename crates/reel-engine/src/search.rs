//! Stock-footage search providers.
//!
//! Two interchangeable providers sit behind [`FootageSearcher`]: Pexels
//! returns a best-quality link directly, Pixabay exposes quality tiers and
//! the client picks deterministically (high, then full-HD, then medium).
//! Results from all providers are deduplicated by the clip id derived from
//! the URL's trailing path segment.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use reel_models::{ClipDescriptor, ClipQuality};

use crate::error::{EngineError, EngineResult};

/// Candidates requested per keyword from each provider.
const RESULTS_PER_KEYWORD: &str = "5";

/// Capability interface for a stock-footage search provider.
#[async_trait]
pub trait FootageSearcher: Send + Sync {
    /// Provider name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Search candidate clips for one keyword.
    async fn search(&self, keyword: &str) -> EngineResult<Vec<ClipDescriptor>>;
}

/// Search all keywords across all providers, deduplicating by clip id.
///
/// Provider failures are absorbed per keyword unless `strict_external` is
/// set: the failing (provider, keyword) pair is logged and skipped, and the
/// remaining results are returned. With `strict_external` the first provider
/// failure aborts the search. First occurrence of a clip id wins, so result
/// order follows keyword order, then provider order.
pub async fn search_keywords(
    searchers: &[Box<dyn FootageSearcher>],
    keywords: &[String],
    strict_external: bool,
) -> EngineResult<Vec<ClipDescriptor>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut results = Vec::new();

    for keyword in keywords {
        for searcher in searchers {
            match searcher.search(keyword).await {
                Ok(clips) => {
                    for clip in clips {
                        if seen.insert(clip.clip_id()) {
                            results.push(clip);
                        }
                    }
                }
                Err(e) if strict_external => return Err(e),
                Err(e) => {
                    warn!(
                        provider = searcher.name(),
                        keyword = %keyword,
                        error = %e,
                        "Footage search failed, skipping keyword for this provider"
                    );
                }
            }
        }
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Pexels

#[derive(Debug, Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    videos: Vec<PexelsVideo>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideo {
    duration: f64,
    video_files: Vec<PexelsVideoFile>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideoFile {
    link: String,
    quality: Option<String>,
}

/// Pexels video search client.
pub struct PexelsSearcher {
    api_key: String,
    client: Client,
    base_url: String,
}

impl PexelsSearcher {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: "https://api.pexels.com".to_string(),
        }
    }

    /// Override the base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl FootageSearcher for PexelsSearcher {
    fn name(&self) -> &'static str {
        "pexels"
    }

    async fn search(&self, keyword: &str) -> EngineResult<Vec<ClipDescriptor>> {
        let url = format!("{}/videos/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", keyword),
                ("per_page", RESULTS_PER_KEYWORD),
                ("orientation", "landscape"),
                ("size", "medium"),
            ])
            .send()
            .await
            .map_err(|e| EngineError::external("pexels", e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::external(
                "pexels",
                format!("HTTP status {} for keyword '{}'", response.status(), keyword),
            ));
        }

        let parsed: PexelsResponse = response
            .json()
            .await
            .map_err(|e| EngineError::external("pexels", format!("bad response shape: {}", e)))?;

        let mut clips = Vec::new();
        for video in parsed.videos {
            // Pexels orders video_files best first; take the first link.
            let Some(file) = video.video_files.first() else {
                continue;
            };
            let quality = match file.quality.as_deref() {
                Some("hd") | Some("fullHD") => ClipQuality::FullHd,
                Some("sd") | Some("medium") => ClipQuality::Medium,
                _ => ClipQuality::High,
            };
            match ClipDescriptor::new(keyword, &file.link, video.duration, quality) {
                Ok(clip) => clips.push(clip),
                Err(e) => debug!(error = %e, "Skipping invalid Pexels candidate"),
            }
        }
        Ok(clips)
    }
}

// ---------------------------------------------------------------------------
// Pixabay

#[derive(Debug, Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    duration: f64,
    videos: PixabayVariants,
}

#[derive(Debug, Deserialize)]
struct PixabayVariants {
    high: Option<PixabayVariant>,
    #[serde(rename = "fullHD")]
    full_hd: Option<PixabayVariant>,
    medium: Option<PixabayVariant>,
}

#[derive(Debug, Deserialize)]
struct PixabayVariant {
    url: String,
}

/// Pixabay video search client.
pub struct PixabaySearcher {
    api_key: String,
    client: Client,
    base_url: String,
}

impl PixabaySearcher {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: "https://pixabay.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl FootageSearcher for PixabaySearcher {
    fn name(&self) -> &'static str {
        "pixabay"
    }

    async fn search(&self, keyword: &str) -> EngineResult<Vec<ClipDescriptor>> {
        let url = format!("{}/api/videos/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", keyword),
                ("video_type", "film"),
                ("per_page", RESULTS_PER_KEYWORD),
                ("orientation", "horizontal"),
                ("video_quality", "720"),
            ])
            .send()
            .await
            .map_err(|e| EngineError::external("pixabay", e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::external(
                "pixabay",
                format!("HTTP status {} for keyword '{}'", response.status(), keyword),
            ));
        }

        let parsed: PixabayResponse = response
            .json()
            .await
            .map_err(|e| EngineError::external("pixabay", format!("bad response shape: {}", e)))?;

        let mut clips = Vec::new();
        for hit in parsed.hits {
            // Fixed preference order: high, then full-HD, then medium.
            let (url, quality) = if let Some(v) = &hit.videos.high {
                (&v.url, ClipQuality::High)
            } else if let Some(v) = &hit.videos.full_hd {
                (&v.url, ClipQuality::FullHd)
            } else if let Some(v) = &hit.videos.medium {
                (&v.url, ClipQuality::Medium)
            } else {
                continue;
            };
            match ClipDescriptor::new(keyword, url, hit.duration, quality) {
                Ok(clip) => clips.push(clip),
                Err(e) => debug!(error = %e, "Skipping invalid Pixabay candidate"),
            }
        }
        Ok(clips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_pexels_search_takes_first_video_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/search"))
            .and(header("Authorization", "px-key"))
            .and(query_param("query", "ocean"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "videos": [{
                    "duration": 14.0,
                    "video_files": [
                        {"link": "https://cdn.pexels.com/v/111.mp4", "quality": "hd"},
                        {"link": "https://cdn.pexels.com/v/111-sd.mp4", "quality": "sd"}
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let searcher = PexelsSearcher::new("px-key").with_base_url(server.uri());
        let clips = searcher.search("ocean").await.unwrap();

        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].url, "https://cdn.pexels.com/v/111.mp4");
        assert_eq!(clips[0].keyword, "ocean");
        assert!((clips[0].native_duration - 14.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_pixabay_quality_preference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/videos/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hits": [
                    {
                        "duration": 20.0,
                        "videos": {
                            "high": {"url": "https://cdn.pixabay.com/v/high-1.mp4"},
                            "fullHD": {"url": "https://cdn.pixabay.com/v/full-1.mp4"},
                            "medium": {"url": "https://cdn.pixabay.com/v/med-1.mp4"}
                        }
                    },
                    {
                        "duration": 8.0,
                        "videos": {
                            "fullHD": {"url": "https://cdn.pixabay.com/v/full-2.mp4"},
                            "medium": {"url": "https://cdn.pixabay.com/v/med-2.mp4"}
                        }
                    },
                    {
                        "duration": 5.0,
                        "videos": {
                            "medium": {"url": "https://cdn.pixabay.com/v/med-3.mp4"}
                        }
                    }
                ]
            })))
            .mount(&server)
            .await;

        let searcher = PixabaySearcher::new("pb-key").with_base_url(server.uri());
        let clips = searcher.search("city").await.unwrap();

        assert_eq!(clips.len(), 3);
        assert_eq!(clips[0].quality, ClipQuality::High);
        assert_eq!(clips[1].quality, ClipQuality::FullHd);
        assert_eq!(clips[2].quality, ClipQuality::Medium);
        assert_eq!(clips[1].url, "https://cdn.pixabay.com/v/full-2.mp4");
    }

    #[tokio::test]
    async fn test_search_keywords_dedups_across_providers() {
        struct Fixed(Vec<ClipDescriptor>);

        #[async_trait]
        impl FootageSearcher for Fixed {
            fn name(&self) -> &'static str {
                "fixed"
            }
            async fn search(&self, _keyword: &str) -> EngineResult<Vec<ClipDescriptor>> {
                Ok(self.0.clone())
            }
        }

        let clip = |url: &str| ClipDescriptor::new("sky", url, 10.0, ClipQuality::High).unwrap();
        let searchers: Vec<Box<dyn FootageSearcher>> = vec![
            Box::new(Fixed(vec![clip("https://a/123.mp4"), clip("https://a/456.mp4")])),
            // Same clip id 123 behind a different host and no extension.
            Box::new(Fixed(vec![clip("https://b/123"), clip("https://b/789.mp4")])),
        ];

        let results = search_keywords(&searchers, &["sky".to_string()], false)
            .await
            .unwrap();
        let ids: Vec<String> = results.iter().map(|c| c.clip_id()).collect();
        assert_eq!(ids, vec!["123", "456", "789"]);
    }

    #[tokio::test]
    async fn test_search_keywords_absorbs_provider_failure() {
        struct Failing;

        #[async_trait]
        impl FootageSearcher for Failing {
            fn name(&self) -> &'static str {
                "failing"
            }
            async fn search(&self, _keyword: &str) -> EngineResult<Vec<ClipDescriptor>> {
                Err(EngineError::external("failing", "boom"))
            }
        }

        struct One;

        #[async_trait]
        impl FootageSearcher for One {
            fn name(&self) -> &'static str {
                "one"
            }
            async fn search(&self, keyword: &str) -> EngineResult<Vec<ClipDescriptor>> {
                Ok(vec![ClipDescriptor::new(
                    keyword,
                    "https://c/42.mp4",
                    6.0,
                    ClipQuality::Medium,
                )
                .unwrap()])
            }
        }

        let searchers: Vec<Box<dyn FootageSearcher>> = vec![Box::new(Failing), Box::new(One)];
        let results = search_keywords(&searchers, &["rain".to_string()], false)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].clip_id(), "42");

        // Strict mode escalates the same provider failure instead.
        let result = search_keywords(&searchers, &["rain".to_string()], true).await;
        assert!(matches!(result, Err(EngineError::ExternalService { .. })));
    }
}
