//! Marketplace service implementation
//!
//! Listings, seller image uploads and the purchase flow. A purchase is a
//! transaction that moves `pending -> paid | failed`; marking it paid sells
//! the listing in the same database transaction.

use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::database::{ListingRepository, TransactionRepository};
use crate::models::{
    CreateListingRequest, Listing, ListingCategory, ListingFilter, ListingStatus, Profile, Transaction,
    TransactionStatus, UpdateListingRequest,
};
use crate::services::storage::{StorageService, UploadedFile, LISTING_BUCKET};
use crate::utils::errors::{KarmaHubError, Result};
use crate::utils::logging::log_user_action;

fn validate_price(label: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(KarmaHubError::InvalidInput(format!("{} must be a non-negative number", label)));
    }
    Ok(())
}

/// Check the fields of a new listing
pub fn validate_new_listing(request: &CreateListingRequest) -> Result<()> {
    if request.title.trim().is_empty() {
        return Err(KarmaHubError::InvalidInput("Title is required".to_string()));
    }
    validate_price("Original price", request.original_price)?;
    validate_price("Expected price", request.expected_price)?;
    Ok(())
}

/// Check the present fields of a listing update
pub fn validate_listing_update(request: &UpdateListingRequest) -> Result<()> {
    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(KarmaHubError::InvalidInput("Title cannot be empty".to_string()));
        }
    }
    if let Some(price) = request.original_price {
        validate_price("Original price", price)?;
    }
    if let Some(price) = request.expected_price {
        validate_price("Expected price", price)?;
    }
    Ok(())
}

fn ensure_can_manage(actor: &Profile, listing: &Listing) -> Result<()> {
    if listing.seller_id == actor.id || actor.is_admin() {
        Ok(())
    } else {
        Err(KarmaHubError::PermissionDenied("Only the seller can change this listing".to_string()))
    }
}

#[derive(Clone)]
pub struct MarketplaceService {
    listings: ListingRepository,
    transactions: TransactionRepository,
    storage: StorageService,
}

impl MarketplaceService {
    pub fn new(listings: ListingRepository, transactions: TransactionRepository, storage: StorageService) -> Self {
        Self { listings, transactions, storage }
    }

    /// Browse active listings
    pub async fn browse(&self, mut filter: ListingFilter) -> Result<Vec<Listing>> {
        filter.status = Some(ListingStatus::Active);
        self.listings.list(&filter).await
    }

    pub async fn get_listing(&self, id: Uuid) -> Result<Listing> {
        self.listings
            .find_by_id(id)
            .await?
            .ok_or(KarmaHubError::ListingNotFound { listing_id: id })
    }

    /// Create a listing sold by the caller
    pub async fn create_listing(&self, seller: &Profile, mut request: CreateListingRequest) -> Result<Listing> {
        validate_new_listing(&request)?;
        request.title = request.title.trim().to_string();

        let listing = self.listings.create(seller.id, request).await?;
        log_user_action(seller.id, "create_listing", Some(&listing.id.to_string()));
        Ok(listing)
    }

    pub async fn update_listing(&self, actor: &Profile, id: Uuid, request: UpdateListingRequest) -> Result<Listing> {
        let listing = self.get_listing(id).await?;
        ensure_can_manage(actor, &listing)?;
        if listing.status == ListingStatus::Sold {
            return Err(KarmaHubError::Conflict("Sold listings cannot be edited".to_string()));
        }
        validate_listing_update(&request)?;

        self.listings.update(id, request).await
    }

    pub async fn delete_listing(&self, actor: &Profile, id: Uuid) -> Result<()> {
        let listing = self.get_listing(id).await?;
        ensure_can_manage(actor, &listing)?;

        self.listings.delete(id).await?;
        log_user_action(actor.id, "delete_listing", Some(&id.to_string()));
        Ok(())
    }

    /// Upload an image and append its URL to the listing
    pub async fn attach_listing_image(&self, actor: &Profile, id: Uuid, file: UploadedFile) -> Result<Listing> {
        let listing = self.get_listing(id).await?;
        if listing.seller_id != actor.id {
            return Err(KarmaHubError::PermissionDenied("Only the seller can add images".to_string()));
        }
        if listing.status == ListingStatus::Sold {
            return Err(KarmaHubError::Conflict("Sold listings cannot be edited".to_string()));
        }

        let url = self
            .storage
            .store(LISTING_BUCKET, &listing.id.to_string(), &actor.id.to_string(), &file)
            .await?;
        self.listings.append_image(id, &url).await
    }

    pub async fn my_listings(&self, seller: &Profile) -> Result<Vec<Listing>> {
        self.listings.list_by_seller(seller.id).await
    }

    pub async fn my_purchases(&self, buyer: &Profile) -> Result<Vec<Listing>> {
        self.listings.list_by_buyer(buyer.id).await
    }

    /// Admin view over every listing, newest first
    pub async fn list_all_listings(&self, status: Option<ListingStatus>, category: Option<ListingCategory>) -> Result<Vec<Listing>> {
        let filter = ListingFilter {
            status,
            category,
            ..Default::default()
        };
        self.listings.list(&filter).await
    }

    /// Open a pending transaction for a listing
    pub async fn start_purchase(&self, buyer: &Profile, listing_id: Uuid) -> Result<Transaction> {
        let listing = self.get_listing(listing_id).await?;
        if listing.seller_id == buyer.id {
            return Err(KarmaHubError::InvalidInput("You cannot buy your own listing".to_string()));
        }
        if listing.status != ListingStatus::Active {
            return Err(KarmaHubError::Conflict("This item has already been sold".to_string()));
        }

        let transaction = self
            .transactions
            .create(listing.id, buyer.id, listing.expected_price)
            .await?;
        info!(transaction_id = %transaction.id, listing_id = %listing.id, buyer_id = %buyer.id, "Purchase started");
        Ok(transaction)
    }

    async fn buyer_transaction(&self, buyer: &Profile, id: Uuid) -> Result<Transaction> {
        let transaction = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or(KarmaHubError::TransactionNotFound { transaction_id: id })?;
        if transaction.buyer_id != buyer.id {
            return Err(KarmaHubError::PermissionDenied("Only the buyer can settle this transaction".to_string()));
        }
        Ok(transaction)
    }

    /// Mark a transaction paid and the listing sold
    pub async fn confirm_payment(&self, buyer: &Profile, id: Uuid) -> Result<(Transaction, Listing)> {
        let transaction = self.buyer_transaction(buyer, id).await?;
        if !transaction.status.can_transition_to(TransactionStatus::Paid) {
            return Err(KarmaHubError::InvalidStateTransition {
                from: transaction.status.as_str().to_string(),
                to: TransactionStatus::Paid.as_str().to_string(),
            });
        }

        let (transaction, listing) = self.transactions.complete_purchase(id).await.map_err(|e| {
            warn!(transaction_id = %id, error = %e, "Purchase could not be completed");
            e
        })?;
        log_user_action(buyer.id, "purchase", Some(&listing.id.to_string()));
        Ok((transaction, listing))
    }

    /// Abandon a pending transaction
    pub async fn cancel_payment(&self, buyer: &Profile, id: Uuid) -> Result<Transaction> {
        let transaction = self.buyer_transaction(buyer, id).await?;
        let invalid = || KarmaHubError::InvalidStateTransition {
            from: transaction.status.as_str().to_string(),
            to: TransactionStatus::Failed.as_str().to_string(),
        };
        if !transaction.status.can_transition_to(TransactionStatus::Failed) {
            return Err(invalid());
        }

        let updated = self
            .transactions
            .transition(id, TransactionStatus::Pending, TransactionStatus::Failed)
            .await?
            .ok_or_else(invalid)?;
        debug!(transaction_id = %id, "Purchase cancelled");
        Ok(updated)
    }

    pub async fn my_transactions(&self, buyer: &Profile) -> Result<Vec<Transaction>> {
        self.transactions.list_by_buyer(buyer.id).await
    }
}
