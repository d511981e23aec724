//! LinkedIn post models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "post_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    Hackathon,
    Event,
    Project,
    Achievement,
}

impl PostType {
    pub const ALL: [PostType; 4] = [
        PostType::Hackathon,
        PostType::Event,
        PostType::Project,
        PostType::Achievement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Hackathon => "hackathon",
            PostType::Event => "event",
            PostType::Project => "project",
            PostType::Achievement => "achievement",
        }
    }

    /// Parse a post type, falling back to `Achievement` for unknown input
    pub fn parse_lenient(value: &str) -> PostType {
        PostType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
            .unwrap_or(PostType::Achievement)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GeneratedPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Option<Uuid>,
    pub post_type: PostType,
    pub details: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGeneratedPostRequest {
    pub user_id: Uuid,
    pub event_id: Option<Uuid>,
    pub post_type: PostType,
    pub details: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostTemplate {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub base_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub base_text: String,
}

/// Body of a post generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePostRequest {
    #[serde(rename = "postType")]
    pub post_type: String,
    pub details: String,
    #[serde(rename = "eventId", default)]
    pub event_id: Option<Uuid>,
    #[serde(rename = "templateId", default)]
    pub template_id: Option<Uuid>,
}
