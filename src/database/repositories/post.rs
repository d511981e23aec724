//! Generated post and post template repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::post::{GeneratedPost, CreateGeneratedPostRequest, PostTemplate, CreateTemplateRequest};
use crate::utils::errors::KarmaHubError;

#[derive(Clone, Debug)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a generated post
    pub async fn create(&self, request: CreateGeneratedPostRequest) -> Result<GeneratedPost, KarmaHubError> {
        let post = sqlx::query_as::<_, GeneratedPost>(
            r#"
            INSERT INTO generated_posts (id, user_id, event_id, post_type, details, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, event_id, post_type, details, content, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.event_id)
        .bind(request.post_type)
        .bind(request.details)
        .bind(request.content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Find generated post by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GeneratedPost>, KarmaHubError> {
        let post = sqlx::query_as::<_, GeneratedPost>(
            "SELECT id, user_id, event_id, post_type, details, content, created_at FROM generated_posts WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Posts of a user, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<GeneratedPost>, KarmaHubError> {
        let posts = sqlx::query_as::<_, GeneratedPost>(
            "SELECT id, user_id, event_id, post_type, details, content, created_at FROM generated_posts WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Delete generated post
    pub async fn delete(&self, id: Uuid) -> Result<(), KarmaHubError> {
        sqlx::query("DELETE FROM generated_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Count total generated posts
    pub async fn count(&self) -> Result<i64, KarmaHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM generated_posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Create a post template owned by a user
    pub async fn create_template(&self, user_id: Uuid, request: CreateTemplateRequest) -> Result<PostTemplate, KarmaHubError> {
        let template = sqlx::query_as::<_, PostTemplate>(
            r#"
            INSERT INTO linkedin_post_templates (id, user_id, type, base_text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, type, base_text, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(request.post_type)
        .bind(request.base_text)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(template)
    }

    /// Find template by ID
    pub async fn find_template(&self, id: Uuid) -> Result<Option<PostTemplate>, KarmaHubError> {
        let template = sqlx::query_as::<_, PostTemplate>(
            "SELECT id, user_id, type, base_text, created_at FROM linkedin_post_templates WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    /// Templates of a user, newest first
    pub async fn list_templates(&self, user_id: Uuid) -> Result<Vec<PostTemplate>, KarmaHubError> {
        let templates = sqlx::query_as::<_, PostTemplate>(
            "SELECT id, user_id, type, base_text, created_at FROM linkedin_post_templates WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// Delete template
    pub async fn delete_template(&self, id: Uuid) -> Result<(), KarmaHubError> {
        sqlx::query("DELETE FROM linkedin_post_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
