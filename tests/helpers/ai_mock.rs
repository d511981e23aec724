//! Mock AI gateway built on wiremock

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use KarmaHub::config::AiConfig;

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";
pub const TEST_AI_KEY: &str = "test-ai-key";

pub struct AiMockServer {
    pub server: MockServer,
}

impl AiMockServer {
    pub async fn new() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn config(&self) -> AiConfig {
        AiConfig {
            api_url: format!("{}{}", self.server.uri(), COMPLETIONS_PATH),
            api_key: Some(TEST_AI_KEY.to_string()),
            model: "test-model".to_string(),
            timeout_seconds: 5,
            requests_per_minute: 5,
            prompts_path: None,
        }
    }

    /// Respond with a single chat completion carrying `content`
    pub async fn mock_completion(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .and(header("authorization", format!("Bearer {}", TEST_AI_KEY).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }]
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream says no"))
            .mount(&self.server)
            .await;
    }
}
