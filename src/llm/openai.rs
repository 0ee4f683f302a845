//! OpenAI chat completions client
//!
//! Sends the rendered prompt as a single user message to
//! `POST {base_url}/chat/completions` and returns the first choice.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LanguageModel;
use crate::embedding::openai::ErrorResponse;
use crate::errors::{Result, SymbiontError};

/// Chat model client
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChat {
    pub fn new(base_url: &str, api_key: &str, model: &str, temperature: f32) -> Result<Self> {
        let client = Client::builder().build().map_err(SymbiontError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SymbiontError::GenerationError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(SymbiontError::GenerationError(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            SymbiontError::GenerationError(format!("Failed to parse response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| SymbiontError::GenerationError("Response contained no answer".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [{ "role": "user", "content": "Question: hi" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "index": 0, "message": { "role": "assistant", "content": " Hello! \n" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let chat = OpenAiChat::new(&server.uri(), "sk-test", "gpt-3.5-turbo", 0.9).unwrap();
        let answer = chat.complete("Question: hi").await.unwrap();
        assert_eq!(answer, "Hello!");
        assert_eq!(chat.model_name(), "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_http_error_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limit reached" }
            })))
            .mount(&server)
            .await;

        let chat = OpenAiChat::new(&server.uri(), "sk-test", "gpt-3.5-turbo", 0.9).unwrap();
        let err = chat.complete("hi").await.unwrap_err();
        assert!(matches!(err, SymbiontError::GenerationError(ref m) if m.contains("Rate limit reached")));
    }

    #[tokio::test]
    async fn test_empty_choices_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let chat = OpenAiChat::new(&server.uri(), "sk-test", "m", 0.0).unwrap();
        assert!(matches!(
            chat.complete("hi").await,
            Err(SymbiontError::GenerationError(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_generation_error() {
        let chat = OpenAiChat::new("http://127.0.0.1:1", "sk-test", "m", 0.0).unwrap();
        assert!(matches!(
            chat.complete("hi").await,
            Err(SymbiontError::GenerationError(_))
        ));
    }
}
