//! Keyword generation via an OpenAI-compatible chat endpoint.
//!
//! The prompt contract matters more than the model: keywords must be short,
//! generic, on-topic English terms usable as stock-footage search queries,
//! never proper nouns or technical vocabulary, comma separated, at most ten.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use reel_models::script::MAX_KEYWORDS_PER_PART;

use crate::error::{EngineError, EngineResult};
use crate::partition::KeywordGenerator;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI chat-completions client for keyword generation.
pub struct OpenAiKeywordGenerator {
    api_key: String,
    model: String,
    client: Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiKeywordGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gpt-4".to_string(),
            client: Client::new(),
            endpoint: CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    /// Override the endpoint (tests point this at a mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_prompt(part_text: &str) -> String {
        format!(
            "Summarize this text: '{}' into 10 relevant keywords for \
             video scraping, i.e., not too specific. Never any complicated words, \
             or compound words. It's imperative that the word is on-topic, \
             but absolutely never too scientific/too specific/proper noun... \
             E.G. If the text talks about ABC NEWS, just output 'News', or 'TV', \
             nothing too specific. Only provide the words, in English, \
             and separate them by commas.",
            part_text
        )
    }
}

#[async_trait]
impl KeywordGenerator for OpenAiKeywordGenerator {
    async fn keywords(&self, part_text: &str) -> EngineResult<Vec<String>> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are an expert video editor".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(part_text),
                },
            ],
            max_tokens: 350,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::external("openai", e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::external(
                "openai",
                format!("HTTP status {}", response.status()),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::external("openai", format!("bad response shape: {}", e)))?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| EngineError::external("openai", "empty choices array"))?;

        let keywords = parse_keyword_list(content);
        debug!(count = keywords.len(), "Generated keywords");
        Ok(keywords)
    }
}

/// Split a comma-separated model reply into at most ten trimmed keywords.
fn parse_keyword_list(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .take(MAX_KEYWORDS_PER_PART)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_keyword_list_trims_and_caps() {
        let parsed = parse_keyword_list("ocean, waves , beach,, sun");
        assert_eq!(parsed, vec!["ocean", "waves", "beach", "sun"]);

        let many = (0..14).map(|i| format!("k{}", i)).collect::<Vec<_>>().join(",");
        assert_eq!(parse_keyword_list(&many).len(), MAX_KEYWORDS_PER_PART);
    }

    #[tokio::test]
    async fn test_keywords_roundtrip_against_mock() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "News, TV, City"}}
                ]
            })))
            .mount(&server)
            .await;

        let generator = OpenAiKeywordGenerator::new("test-key")
            .with_endpoint(format!("{}/v1/chat/completions", server.uri()));
        let keywords = generator.keywords("A report about ABC NEWS.").await.unwrap();
        assert_eq!(keywords, vec!["News", "TV", "City"]);
    }

    #[tokio::test]
    async fn test_error_status_maps_to_external_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let generator =
            OpenAiKeywordGenerator::new("test-key").with_endpoint(server.uri());
        let result = generator.keywords("anything").await;
        assert!(matches!(result, Err(EngineError::ExternalService { .. })));
    }
}
