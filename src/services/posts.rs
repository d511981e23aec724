//! LinkedIn post generation and template service

use tracing::info;
use uuid::Uuid;
use crate::database::{EventRepository, PostRepository};
use crate::middleware::rate_limit::UserRateLimiter;
use crate::models::{
    CreateGeneratedPostRequest, CreateTemplateRequest, Event, GeneratePostRequest, GeneratedPost,
    PostTemplate, PostType, Profile,
};
use crate::services::ai::AiClient;
use crate::utils::errors::{KarmaHubError, Result};
use crate::utils::logging::log_user_action;

pub const MAX_DETAILS_CHARS: usize = 4000;
pub const MAX_TEMPLATE_CHARS: usize = 4000;

/// Build the user message sent to the model
pub fn compose_user_message(details: &str, event: Option<&Event>, template: Option<&PostTemplate>) -> String {
    let mut details = details.trim().to_string();
    if let Some(event) = event {
        details.push_str(&format!("\nEvent: {} at {}", event.title, event.location_name));
    }

    let request = format!("Generate a LinkedIn post with these details: {}", details);
    match template {
        Some(template) => format!(
            "Use this template as a style guide:\n{}\n\n{}",
            template.base_text.trim(),
            request
        ),
        None => request,
    }
}

fn validate_details(details: &str) -> Result<()> {
    if details.trim().is_empty() {
        return Err(KarmaHubError::InvalidInput("Please provide details for the post".to_string()));
    }
    if details.chars().count() > MAX_DETAILS_CHARS {
        return Err(KarmaHubError::InvalidInput(format!(
            "Details must be at most {} characters",
            MAX_DETAILS_CHARS
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PostService {
    posts: PostRepository,
    events: EventRepository,
    ai: AiClient,
    limiter: UserRateLimiter,
}

impl PostService {
    pub fn new(posts: PostRepository, events: EventRepository, ai: AiClient, limiter: UserRateLimiter) -> Self {
        Self { posts, events, ai, limiter }
    }

    pub fn ai_configured(&self) -> bool {
        self.ai.is_configured()
    }

    async fn owned_template(&self, user: &Profile, id: Uuid) -> Result<PostTemplate> {
        let template = self
            .posts
            .find_template(id)
            .await?
            .ok_or(KarmaHubError::NotFound { kind: "Template", id })?;
        if template.user_id != user.id {
            return Err(KarmaHubError::PermissionDenied("Template belongs to another user".to_string()));
        }
        Ok(template)
    }

    /// Generate a post with the AI gateway and store it
    pub async fn generate(&self, user: &Profile, request: GeneratePostRequest) -> Result<GeneratedPost> {
        validate_details(&request.details)?;
        let post_type = PostType::parse_lenient(&request.post_type);

        let template = match request.template_id {
            Some(id) => Some(self.owned_template(user, id).await?),
            None => None,
        };
        let event = match request.event_id {
            Some(id) => Some(
                self.events
                    .find_by_id(id)
                    .await?
                    .ok_or(KarmaHubError::EventNotFound { event_id: id })?,
            ),
            None => None,
        };

        self.limiter.check(user.id)?;

        let message = compose_user_message(&request.details, event.as_ref(), template.as_ref());
        let content = self.ai.complete(post_type, &message).await?;

        let post = self
            .posts
            .create(CreateGeneratedPostRequest {
                user_id: user.id,
                event_id: request.event_id,
                post_type,
                details: request.details.trim().to_string(),
                content,
            })
            .await?;
        log_user_action(user.id, "generate_post", Some(post_type.as_str()));
        info!(post_id = %post.id, post_type = post_type.as_str(), "Post generated");
        Ok(post)
    }

    pub async fn my_posts(&self, user: &Profile) -> Result<Vec<GeneratedPost>> {
        self.posts.list_for_user(user.id).await
    }

    pub async fn delete_post(&self, user: &Profile, id: Uuid) -> Result<()> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(KarmaHubError::NotFound { kind: "Post", id })?;
        if post.user_id != user.id {
            return Err(KarmaHubError::PermissionDenied("Post belongs to another user".to_string()));
        }
        self.posts.delete(id).await
    }

    pub async fn list_templates(&self, user: &Profile) -> Result<Vec<PostTemplate>> {
        self.posts.list_templates(user.id).await
    }

    pub async fn create_template(&self, user: &Profile, mut request: CreateTemplateRequest) -> Result<PostTemplate> {
        request.base_text = request.base_text.trim().to_string();
        if request.base_text.is_empty() {
            return Err(KarmaHubError::InvalidInput("Template text is required".to_string()));
        }
        if request.base_text.chars().count() > MAX_TEMPLATE_CHARS {
            return Err(KarmaHubError::InvalidInput(format!(
                "Template text must be at most {} characters",
                MAX_TEMPLATE_CHARS
            )));
        }
        self.posts.create_template(user.id, request).await
    }

    pub async fn delete_template(&self, user: &Profile, id: Uuid) -> Result<()> {
        self.owned_template(user, id).await?;
        self.posts.delete_template(id).await
    }
}
