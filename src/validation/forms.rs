use rust_decimal::Decimal;
use serde::Deserialize;
use std::borrow::Cow;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::database::models::{ListingChanges, ListingImage, NewListing, NewReview};

/// `listing[...]` fields of the new/edit listing forms. Optional fields stay
/// `None` when the key is not submitted at all.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListingForm {
    #[serde(rename = "listing[title]", default)]
    #[validate(custom(function = "title_present"))]
    pub title: String,

    #[serde(rename = "listing[description]", default)]
    pub description: Option<String>,

    #[serde(rename = "listing[image]", default)]
    #[validate(custom(function = "image_is_url"))]
    pub image: Option<String>,

    #[serde(rename = "listing[price]", default)]
    #[validate(custom(function = "price_is_number"))]
    pub price: Option<String>,

    #[serde(rename = "listing[location]", default)]
    pub location: Option<String>,

    #[serde(rename = "listing[country]", default)]
    pub country: Option<String>,
}

impl ListingForm {
    pub fn into_new_listing(self, owner: Uuid) -> NewListing {
        NewListing {
            title: self.title.trim().to_string(),
            description: self.description.and_then(non_empty),
            image: self.image.and_then(non_empty).map(ListingImage::from_url),
            price: self.price.and_then(non_empty),
            location: self.location.and_then(non_empty),
            country: self.country.and_then(non_empty),
            owner,
        }
    }

    /// Submitted keys replace (blank clears), missing keys are left alone
    pub fn into_changes(self) -> ListingChanges {
        ListingChanges {
            title: self.title.trim().to_string(),
            description: self.description.map(non_empty),
            image_url: self.image.map(non_empty),
            price: self.price.map(non_empty),
            location: self.location.map(non_empty),
            country: self.country.map(non_empty),
        }
    }
}

/// `review[...]` fields of the review form
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewForm {
    #[serde(rename = "review[rating]", default)]
    #[validate(
        required(message = "\"review.rating\" is required"),
        range(min = 1, max = 5, message = "\"review.rating\" must be between 1 and 5")
    )]
    pub rating: Option<i16>,

    #[serde(rename = "review[comment]", default)]
    #[validate(custom(function = "comment_present"))]
    pub comment: String,
}

impl ReviewForm {
    pub fn into_new_review(self, author: Uuid) -> NewReview {
        NewReview {
            rating: self.rating.unwrap_or_default(),
            comment: self.comment.trim().to_string(),
            author,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 3, max = 32, message = "\"username\" must be between 3 and 32 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "\"email\" must be a valid email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "\"password\" must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "\"username\" is required"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "\"password\" is required"))]
    pub password: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn title_present(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(invalid("required", "\"listing.title\" is required"));
    }
    Ok(())
}

fn comment_present(comment: &str) -> Result<(), ValidationError> {
    if comment.trim().is_empty() {
        return Err(invalid("required", "\"review.comment\" is required"));
    }
    Ok(())
}

fn image_is_url(image: &str) -> Result<(), ValidationError> {
    let image = image.trim();
    if image.is_empty() {
        return Ok(());
    }

    match url::Url::parse(image) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(invalid("url", "\"listing.image\" must be a valid uri")),
    }
}

fn price_is_number(price: &str) -> Result<(), ValidationError> {
    let price = price.trim();
    if price.is_empty() {
        return Ok(());
    }

    match Decimal::from_str(price) {
        Ok(value) if value.is_sign_negative() => Err(invalid(
            "min",
            "\"listing.price\" must be greater than or equal to 0",
        )),
        Ok(_) => Ok(()),
        Err(_) => Err(invalid("number", "\"listing.price\" must be a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validation_error;

    fn listing(title: &str, price: &str) -> ListingForm {
        ListingForm {
            title: title.to_string(),
            price: Some(price.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn title_and_price_are_enough() {
        assert!(listing("Cabin", "100").validate().is_ok());
    }

    #[test]
    fn missing_title_is_rejected() {
        let errors = listing("   ", "100").validate().unwrap_err();
        let err = validation_error(errors);
        assert_eq!(err.message(), "\"listing.title\" is required");
    }

    #[test]
    fn every_violation_is_reported() {
        let mut form = listing("", "cheap");
        form.image = Some("not a url".to_string());

        let err = validation_error(form.validate().unwrap_err());

        assert_eq!(
            err.message(),
            "\"listing.image\" must be a valid uri,\"listing.price\" must be a number,\"listing.title\" is required"
        );
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(listing("Cabin", "-5").validate().is_err());
        assert!(listing("Cabin", "12.50").validate().is_ok());
    }

    #[test]
    fn blank_fields_clear_and_missing_fields_are_kept() {
        let mut form = listing(" Cabin ", "");
        form.image = Some("https://img.example/cabin.jpg".to_string());

        let changes = form.into_changes();

        assert_eq!(changes.title, "Cabin");
        assert_eq!(changes.price, Some(None));
        assert_eq!(changes.description, None);
        assert_eq!(
            changes.image_url,
            Some(Some("https://img.example/cabin.jpg".to_string()))
        );
    }

    #[test]
    fn new_listing_drops_blank_fields() {
        let mut form = listing("Cabin", " ");
        form.country = Some("Italy".to_string());

        let new = form.into_new_listing(Uuid::new_v4());

        assert!(new.price.is_none());
        assert!(new.image.is_none());
        assert_eq!(new.country.as_deref(), Some("Italy"));
    }

    #[test]
    fn review_rating_must_be_in_range() {
        let review = |rating| ReviewForm {
            rating,
            comment: "Lovely".to_string(),
        };

        assert!(review(Some(5)).validate().is_ok());
        assert!(review(Some(0)).validate().is_err());
        assert!(review(Some(6)).validate().is_err());
        assert!(review(None).validate().is_err());
    }

    #[test]
    fn review_needs_a_comment() {
        let form = ReviewForm {
            rating: Some(3),
            comment: " ".to_string(),
        };
        let err = validation_error(form.validate().unwrap_err());
        assert_eq!(err.message(), "\"review.comment\" is required");
    }
}
