//! AI gateway client
//!
//! Sends one chat-completions request per generated post. System prompts are
//! chosen by post type and may be overridden from a TOML file.

use std::path::Path;
use std::time::Duration;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::config::AiConfig;
use crate::models::PostType;
use crate::utils::errors::{AiError, KarmaHubError, Result};
use crate::utils::logging::log_api_error;

const HACKATHON_PROMPT: &str = "You are a professional LinkedIn post writer specializing in hackathon achievements. Create engaging, professional posts that highlight:
- The hackathon name and achievement
- Key technical skills and technologies used
- Team collaboration and problem-solving
- Impact and learnings
Keep it authentic, humble, and inspiring. Use 1-2 relevant emojis. Length: 150-250 words.";

const EVENT_PROMPT: &str = "You are a professional LinkedIn post writer for event participation. Create posts that showcase:
- Event name and key takeaways
- Networking and learning opportunities
- Skills developed or knowledge gained
- Gratitude to organizers and speakers
Keep it professional yet personal. Use 1-2 relevant emojis. Length: 150-250 words.";

const PROJECT_PROMPT: &str = "You are a professional LinkedIn post writer for technical projects. Create posts that highlight:
- Project overview and purpose
- Technical stack and innovations
- Challenges overcome and solutions
- Impact and future scope
Keep it technical but accessible. Use 1-2 relevant emojis. Length: 150-250 words.";

const ACHIEVEMENT_PROMPT: &str = "You are a professional LinkedIn post writer for achievements and milestones. Create posts that convey:
- The achievement with context
- Journey and key learnings
- People who supported along the way
- Future aspirations
Keep it humble, grateful, and motivating. Use 1-2 relevant emojis. Length: 150-250 words.";

/// System prompts keyed by post type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSet {
    pub hackathon: String,
    pub event: String,
    pub project: String,
    pub achievement: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            hackathon: HACKATHON_PROMPT.to_string(),
            event: EVENT_PROMPT.to_string(),
            project: PROJECT_PROMPT.to_string(),
            achievement: ACHIEVEMENT_PROMPT.to_string(),
        }
    }
}

/// Partial prompt file; missing keys keep the built-in prompt
#[derive(Debug, Default, Deserialize)]
struct PromptOverrides {
    hackathon: Option<String>,
    event: Option<String>,
    project: Option<String>,
    achievement: Option<String>,
}

impl PromptSet {
    pub fn for_type(&self, post_type: PostType) -> &str {
        match post_type {
            PostType::Hackathon => &self.hackathon,
            PostType::Event => &self.event,
            PostType::Project => &self.project,
            PostType::Achievement => &self.achievement,
        }
    }

    /// Parse a TOML override document on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let overrides: PromptOverrides = toml::from_str(content)
            .map_err(|e| KarmaHubError::Config(format!("Invalid prompt file: {}", e)))?;

        let defaults = PromptSet::default();
        Ok(Self {
            hackathon: overrides.hackathon.unwrap_or(defaults.hackathon),
            event: overrides.event.unwrap_or(defaults.event),
            project: overrides.project.unwrap_or(defaults.project),
            achievement: overrides.achievement.unwrap_or(defaults.achievement),
        })
    }

    /// Load prompts from a file, or the defaults when no path is given
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path.filter(|p| !p.is_empty()) {
            Some(path) => {
                let content = std::fs::read_to_string(Path::new(path))?;
                let prompts = Self::from_toml_str(&content)?;
                info!(path = %path, "Loaded prompt overrides");
                Ok(prompts)
            }
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for the chat-completions endpoint
#[derive(Debug, Clone)]
pub struct AiClient {
    client: Client,
    config: AiConfig,
    prompts: PromptSet,
}

impl AiClient {
    pub fn new(config: AiConfig, prompts: PromptSet) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("KarmaHub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config, prompts })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    /// Generate text for `user_message` using the prompt for `post_type`
    pub async fn complete(&self, post_type: PostType, user_message: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(AiError::NotConfigured)?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: self.prompts.for_type(post_type) },
                ChatMessage { role: "user", content: user_message },
            ],
        };

        debug!(post_type = post_type.as_str(), model = %self.config.model, "Requesting completion");
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited,
                StatusCode::PAYMENT_REQUIRED => AiError::CreditsDepleted,
                other => {
                    let text = response.text().await.unwrap_or_default();
                    log_api_error("ai_gateway", &format!("HTTP {}", other.as_u16()), Some(&text));
                    AiError::RequestFailed { status: other.as_u16() }
                }
            }
            .into());
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AiError::EmptyResponse.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_selection() {
        let prompts = PromptSet::default();
        assert!(prompts.for_type(PostType::Hackathon).contains("hackathon achievements"));
        assert!(prompts.for_type(PostType::Achievement).contains("achievements and milestones"));
        assert_eq!(
            prompts.for_type(PostType::parse_lenient("internship")),
            prompts.for_type(PostType::Achievement)
        );
    }

    #[test]
    fn test_partial_override() {
        let prompts = PromptSet::from_toml_str("event = \"Write about the event.\"\n").unwrap();
        assert_eq!(prompts.event, "Write about the event.");
        assert_eq!(prompts.project, PromptSet::default().project);
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let err = PromptSet::from_toml_str("event = [").unwrap_err();
        assert!(matches!(err, KarmaHubError::Config(_)));
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        assert_eq!(PromptSet::load(None).unwrap(), PromptSet::default());
        assert_eq!(PromptSet::load(Some("")).unwrap(), PromptSet::default());
    }
}
