pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use models::*;
pub use postgres::PgStore;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence operations used by the handlers and interceptors.
///
/// Single-document reads and writes are individually atomic. The two
/// multi-document operations (`add_review`, `remove_review`) and the
/// cascading `delete_listing` are atomic as a whole in every implementation.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_listings(&self) -> Result<Vec<Listing>, StoreError>;

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError>;

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;

    /// Replace the editable fields; `None` when the listing does not exist
    async fn update_listing(
        &self,
        id: Uuid,
        changes: ListingChanges,
    ) -> Result<Option<Listing>, StoreError>;

    /// Delete the listing together with every review it references
    async fn delete_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError>;

    /// Delete every listing and review
    async fn clear_listings(&self) -> Result<u64, StoreError>;

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, StoreError>;

    /// Resolve the listing's review references in order, with author names
    async fn reviews_for(&self, listing: &Listing) -> Result<Vec<ReviewView>, StoreError>;

    /// Persist the review and append its reference to the parent listing
    async fn add_review(&self, listing_id: Uuid, review: NewReview) -> Result<Review, StoreError>;

    /// Pull the reference from the parent listing and delete the review
    async fn remove_review(&self, listing_id: Uuid, review_id: Uuid) -> Result<Review, StoreError>;

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Release pooled connections on shutdown
    async fn close(&self) {}
}

pub(crate) fn listing_not_found() -> StoreError {
    StoreError::NotFound("Listing not found".to_string())
}

pub(crate) fn review_not_found() -> StoreError {
    StoreError::NotFound("Review not found".to_string())
}
