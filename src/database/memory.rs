use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::models::*;
use super::{listing_not_found, review_not_found, Store, StoreError};

#[derive(Debug, Default)]
struct Collections {
    /// Insertion order is the listing order
    listings: Vec<Listing>,
    reviews: HashMap<Uuid, Review>,
    users: HashMap<Uuid, User>,
}

impl Collections {
    fn listing_mut(&mut self, id: Uuid) -> Option<&mut Listing> {
        self.listings.iter_mut().find(|listing| listing.id == id)
    }
}

/// Process-local store. Every operation takes one lock, so multi-document
/// writes are atomic with respect to each other.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_listings(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(self.inner.read().await.listings.clone())
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let data = self.inner.read().await;
        Ok(data.listings.iter().find(|listing| listing.id == id).cloned())
    }

    async fn insert_listing(&self, new: NewListing) -> Result<Listing, StoreError> {
        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            image: new.image,
            price: new.price,
            location: new.location,
            country: new.country,
            owner: new.owner,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.inner.write().await.listings.push(listing.clone());
        Ok(listing)
    }

    async fn update_listing(
        &self,
        id: Uuid,
        changes: ListingChanges,
    ) -> Result<Option<Listing>, StoreError> {
        let mut data = self.inner.write().await;
        Ok(data.listing_mut(id).map(|listing| {
            changes.apply(listing);
            listing.clone()
        }))
    }

    async fn delete_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let mut data = self.inner.write().await;
        let Some(position) = data.listings.iter().position(|listing| listing.id == id) else {
            return Ok(None);
        };

        let listing = data.listings.remove(position);
        for review_id in &listing.reviews {
            data.reviews.remove(review_id);
        }
        debug!("Deleted listing {} and {} reviews", id, listing.reviews.len());
        Ok(Some(listing))
    }

    async fn clear_listings(&self) -> Result<u64, StoreError> {
        let mut data = self.inner.write().await;
        let count = data.listings.len() as u64;
        data.listings.clear();
        data.reviews.clear();
        Ok(count)
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        Ok(self.inner.read().await.reviews.get(&id).cloned())
    }

    async fn reviews_for(&self, listing: &Listing) -> Result<Vec<ReviewView>, StoreError> {
        let data = self.inner.read().await;
        Ok(listing
            .reviews
            .iter()
            .filter_map(|id| data.reviews.get(id))
            .map(|review| ReviewView {
                review: review.clone(),
                author_name: data.users.get(&review.author).map(|user| user.username.clone()),
            })
            .collect())
    }

    async fn add_review(&self, listing_id: Uuid, new: NewReview) -> Result<Review, StoreError> {
        let mut data = self.inner.write().await;
        let review = Review {
            id: Uuid::new_v4(),
            rating: new.rating,
            comment: new.comment,
            author: new.author,
            created_at: Utc::now(),
        };

        let listing = data.listing_mut(listing_id).ok_or_else(listing_not_found)?;
        listing.reviews.push(review.id);
        data.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn remove_review(&self, listing_id: Uuid, review_id: Uuid) -> Result<Review, StoreError> {
        let mut data = self.inner.write().await;
        let listing = data.listing_mut(listing_id).ok_or_else(listing_not_found)?;

        // A review attached to another listing is not reachable through this one
        if !listing.reviews.contains(&review_id) {
            return Err(review_not_found());
        }
        listing.reviews.retain(|id| *id != review_id);

        data.reviews.remove(&review_id).ok_or_else(review_not_found)
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut data = self.inner.write().await;
        if data.users.values().any(|user| user.username == new.username) {
            return Err(StoreError::Conflict(format!(
                "A user with the given username is already registered: {}",
                new.username
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        data.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let data = self.inner.read().await;
        Ok(data.users.values().find(|user| user.username == username).cloned())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_listing(owner: Uuid) -> NewListing {
        NewListing {
            title: "Cabin".to_string(),
            description: None,
            image: None,
            price: Some("100".to_string()),
            location: Some("Tahoe".to_string()),
            country: Some("USA".to_string()),
            owner,
        }
    }

    fn new_review(author: Uuid) -> NewReview {
        NewReview {
            rating: 4,
            comment: "Cosy".to_string(),
            author,
        }
    }

    #[tokio::test]
    async fn review_reference_is_appended_and_resolved() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let listing = store.insert_listing(new_listing(owner)).await.unwrap();

        let review = store.add_review(listing.id, new_review(owner)).await.unwrap();

        let listing = store.find_listing(listing.id).await.unwrap().unwrap();
        assert_eq!(listing.reviews, vec![review.id]);
        let resolved = store.reviews_for(&listing).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].review.comment, "Cosy");
    }

    #[tokio::test]
    async fn add_review_to_missing_listing_persists_nothing() {
        let store = MemoryStore::new();
        let err = store
            .add_review(Uuid::new_v4(), new_review(Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.inner.read().await.reviews.is_empty());
    }

    #[tokio::test]
    async fn remove_review_pulls_reference_and_deletes() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let listing = store.insert_listing(new_listing(owner)).await.unwrap();
        let keep = store.add_review(listing.id, new_review(owner)).await.unwrap();
        let drop = store.add_review(listing.id, new_review(owner)).await.unwrap();

        store.remove_review(listing.id, drop.id).await.unwrap();

        let listing = store.find_listing(listing.id).await.unwrap().unwrap();
        assert_eq!(listing.reviews, vec![keep.id]);
        assert!(store.find_review(drop.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_missing_review_leaves_listing_untouched() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let listing = store.insert_listing(new_listing(owner)).await.unwrap();
        let review = store.add_review(listing.id, new_review(owner)).await.unwrap();

        let err = store.remove_review(listing.id, Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound(msg) if msg == "Review not found"));
        let listing = store.find_listing(listing.id).await.unwrap().unwrap();
        assert_eq!(listing.reviews, vec![review.id]);
    }

    #[tokio::test]
    async fn review_cannot_be_removed_through_another_listing() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let home = store.insert_listing(new_listing(owner)).await.unwrap();
        let other = store.insert_listing(new_listing(owner)).await.unwrap();
        let review = store.add_review(home.id, new_review(owner)).await.unwrap();

        let err = store.remove_review(other.id, review.id).await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound(msg) if msg == "Review not found"));
        assert!(store.find_review(review.id).await.unwrap().is_some());
        let home = store.find_listing(home.id).await.unwrap().unwrap();
        assert_eq!(home.reviews, vec![review.id]);
    }

    #[tokio::test]
    async fn delete_listing_cascades_to_reviews() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let listing = store.insert_listing(new_listing(owner)).await.unwrap();
        let review = store.add_review(listing.id, new_review(owner)).await.unwrap();

        let deleted = store.delete_listing(listing.id).await.unwrap();

        assert!(deleted.is_some());
        assert!(store.find_review(review.id).await.unwrap().is_none());
        assert!(store.delete_listing(listing.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let first = NewUser::new("sam", "sam@example.com", "pw").unwrap();
        store.insert_user(first).await.unwrap();

        let err = store
            .insert_user(NewUser::new("sam", "other@example.com", "pw").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
