//! Marketplace listing and transaction models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    Bag,
    Calculator,
    Books,
    Electronics,
    Others,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingCondition {
    New,
    LikeNew,
    Used,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Sold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Failed => "failed",
        }
    }

    /// Only pending transactions may move, and only to a final state
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pending, TransactionStatus::Paid)
                | (TransactionStatus::Pending, TransactionStatus::Failed)
        )
    }
}

/// Browse ordering offered by the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSort {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
}

impl ListingSort {
    pub fn order_clause(&self) -> &'static str {
        match self {
            ListingSort::Newest => "created_at DESC",
            ListingSort::PriceLow => "expected_price ASC, created_at DESC",
            ListingSort::PriceHigh => "expected_price DESC, created_at DESC",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: ListingCategory,
    pub condition: ListingCondition,
    pub original_price: f64,
    pub expected_price: f64,
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub category: ListingCategory,
    pub condition: ListingCondition,
    pub original_price: f64,
    pub expected_price: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ListingCategory>,
    pub condition: Option<ListingCondition>,
    pub original_price: Option<f64>,
    pub expected_price: Option<f64>,
}

/// Filters accepted by listing queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub category: Option<ListingCategory>,
    pub condition: Option<ListingCondition>,
    #[serde(default)]
    pub sort: ListingSort,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub amount: f64,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_transitions() {
        assert!(TransactionStatus::Pending.can_transition_to(TransactionStatus::Paid));
        assert!(TransactionStatus::Pending.can_transition_to(TransactionStatus::Failed));
        assert!(!TransactionStatus::Paid.can_transition_to(TransactionStatus::Failed));
        assert!(!TransactionStatus::Failed.can_transition_to(TransactionStatus::Paid));
        assert!(!TransactionStatus::Pending.can_transition_to(TransactionStatus::Pending));
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(serde_json::to_string(&ListingCondition::LikeNew).unwrap(), "\"like_new\"");
        assert_eq!(serde_json::to_string(&ListingSort::PriceHigh).unwrap(), "\"price_high\"");
        let category: ListingCategory = serde_json::from_str("\"calculator\"").unwrap();
        assert_eq!(category, ListingCategory::Calculator);
    }
}
