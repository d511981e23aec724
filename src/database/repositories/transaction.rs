//! Purchase transaction repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::listing::{Listing, Transaction, TransactionStatus};
use crate::utils::errors::KarmaHubError;

#[derive(Clone, Debug)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending transaction
    pub async fn create(&self, listing_id: Uuid, buyer_id: Uuid, amount: f64) -> Result<Transaction, KarmaHubError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, listing_id, buyer_id, amount, status, created_at)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING id, listing_id, buyer_id, amount, status, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(buyer_id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Find transaction by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, KarmaHubError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT id, listing_id, buyer_id, amount, status, created_at FROM transactions WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Move a transaction from `from` to `to`.
    ///
    /// Returns `None` when the row is no longer in the `from` state.
    pub async fn transition(&self, id: Uuid, from: TransactionStatus, to: TransactionStatus) -> Result<Option<Transaction>, KarmaHubError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING id, listing_id, buyer_id, amount, status, created_at
            "#
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Mark a pending transaction paid and its listing sold in one database transaction.
    ///
    /// Fails with a conflict, leaving both rows untouched, when the listing has
    /// already been sold or the transaction is no longer pending.
    pub async fn complete_purchase(&self, transaction_id: Uuid) -> Result<(Transaction, Listing), KarmaHubError> {
        let mut tx = self.pool.begin().await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = 'paid'
            WHERE id = $1 AND status = 'pending'
            RETURNING id, listing_id, buyer_id, amount, status, created_at
            "#
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| KarmaHubError::Conflict("Transaction is no longer pending".to_string()))?;

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET status = 'sold', buyer_id = $2, updated_at = $3
            WHERE id = $1 AND status = 'active'
            RETURNING id, seller_id, buyer_id, title, description, category, condition, original_price, expected_price, images, status, created_at, updated_at
            "#
        )
        .bind(transaction.listing_id)
        .bind(transaction.buyer_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(listing) = listing else {
            tx.rollback().await?;
            return Err(KarmaHubError::Conflict("This item has already been sold".to_string()));
        };

        tx.commit().await?;
        Ok((transaction, listing))
    }

    /// Transactions made by a buyer, newest first
    pub async fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Transaction>, KarmaHubError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT id, listing_id, buyer_id, amount, status, created_at FROM transactions WHERE buyer_id = $1 ORDER BY created_at DESC"
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }
}
