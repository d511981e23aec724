//! Listing repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder};
use chrono::Utc;
use uuid::Uuid;
use crate::models::listing::{Listing, ListingFilter, ListingStatus, CreateListingRequest, UpdateListingRequest};
use crate::utils::errors::KarmaHubError;

const LISTING_COLUMNS: &str = "id, seller_id, buyer_id, title, description, category, condition, original_price, expected_price, images, status, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new listing for a seller
    pub async fn create(&self, seller_id: Uuid, request: CreateListingRequest) -> Result<Listing, KarmaHubError> {
        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO listings (id, seller_id, title, description, category, condition, original_price, expected_price, images, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'active', $10, $10)
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );

        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(Uuid::new_v4())
            .bind(seller_id)
            .bind(request.title)
            .bind(request.description)
            .bind(request.category)
            .bind(request.condition)
            .bind(request.original_price)
            .bind(request.expected_price)
            .bind(request.images)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(listing)
    }

    /// Find listing by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, KarmaHubError> {
        let sql = format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS);
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(listing)
    }

    /// Update listing fields that are present in the request
    pub async fn update(&self, id: Uuid, request: UpdateListingRequest) -> Result<Listing, KarmaHubError> {
        let sql = format!(
            r#"
            UPDATE listings
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                condition = COALESCE($5, condition),
                original_price = COALESCE($6, original_price),
                expected_price = COALESCE($7, expected_price),
                updated_at = $8
            WHERE id = $1
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );

        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .bind(request.title)
            .bind(request.description)
            .bind(request.category)
            .bind(request.condition)
            .bind(request.original_price)
            .bind(request.expected_price)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        listing.ok_or(KarmaHubError::ListingNotFound { listing_id: id })
    }

    /// Append an image URL to a listing
    pub async fn append_image(&self, id: Uuid, url: &str) -> Result<Listing, KarmaHubError> {
        let sql = format!(
            "UPDATE listings SET images = array_append(images, $2), updated_at = $3 WHERE id = $1 RETURNING {}",
            LISTING_COLUMNS
        );

        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .bind(url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        listing.ok_or(KarmaHubError::ListingNotFound { listing_id: id })
    }

    /// Delete listing
    pub async fn delete(&self, id: Uuid) -> Result<(), KarmaHubError> {
        sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List listings matching a filter in the requested order
    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>, KarmaHubError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM listings WHERE TRUE", LISTING_COLUMNS));

        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category);
        }
        if let Some(condition) = filter.condition {
            builder.push(" AND condition = ").push_bind(condition);
        }
        builder.push(" ORDER BY ").push(filter.sort.order_clause());

        let listings = builder
            .build_query_as::<Listing>()
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }

    /// Listings created by a seller, newest first
    pub async fn list_by_seller(&self, seller_id: Uuid) -> Result<Vec<Listing>, KarmaHubError> {
        let sql = format!("SELECT {} FROM listings WHERE seller_id = $1 ORDER BY created_at DESC", LISTING_COLUMNS);
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }

    /// Listings bought by a user, most recently updated first
    pub async fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Listing>, KarmaHubError> {
        let sql = format!("SELECT {} FROM listings WHERE buyer_id = $1 ORDER BY updated_at DESC", LISTING_COLUMNS);
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(buyer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }

    /// Count total listings
    pub async fn count(&self) -> Result<i64, KarmaHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count listings in a status
    pub async fn count_by_status(&self, status: ListingStatus) -> Result<i64, KarmaHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM listings WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
