use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Filename recorded when a listing image is given as a bare URL
pub const DEFAULT_IMAGE_FILENAME: &str = "listingimage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImage {
    pub filename: String,
    pub url: String,
}

impl ListingImage {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            filename: DEFAULT_IMAGE_FILENAME.to_string(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<ListingImage>,
    /// Kept as submitted text; validated as a non-negative number on input
    pub price: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub owner: Uuid,
    /// Ordered references into the reviews collection
    pub reviews: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner == user_id
    }
}

/// Fields supplied when creating a listing
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<ListingImage>,
    pub price: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub owner: Uuid,
}

/// Edits to a listing's editable fields. For optional fields `None` leaves the
/// stored value alone and `Some(None)` clears it. Owner and review references
/// are not part of it.
#[derive(Debug, Clone, Default)]
pub struct ListingChanges {
    pub title: String,
    pub description: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub price: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub country: Option<Option<String>>,
}

impl ListingChanges {
    pub fn apply(self, listing: &mut Listing) {
        listing.title = self.title;
        if let Some(description) = self.description {
            listing.description = description;
        }
        if let Some(url) = self.image_url {
            // An unchanged URL keeps the stored filename
            listing.image = url.map(|url| match listing.image.take() {
                Some(existing) if existing.url == url => existing,
                _ => ListingImage::from_url(url),
            });
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(location) = self.location {
            listing.location = location;
        }
        if let Some(country) = self.country {
            listing.country = country;
        }
        listing.updated_at = Utc::now();
    }
}

/// Flat row shape of the listings table
#[derive(Debug, FromRow)]
pub struct ListingRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_filename: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub owner: Uuid,
    pub reviews: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        let image = row.image_url.map(|url| ListingImage {
            filename: row
                .image_filename
                .unwrap_or_else(|| DEFAULT_IMAGE_FILENAME.to_string()),
            url,
        });

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            image,
            price: row.price,
            location: row.location,
            country: row.country,
            owner: row.owner,
            reviews: row.reviews,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
