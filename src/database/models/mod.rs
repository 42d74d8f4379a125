pub mod listing;
pub mod review;
pub mod user;

pub use listing::{Listing, ListingChanges, ListingImage, ListingRow, NewListing};
pub use review::{NewReview, Review, ReviewView};
pub use user::{NewUser, User};
