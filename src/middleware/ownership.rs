use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::auth::CurrentUser;
use crate::database::Listing;
use crate::error::{AppError, AppResult};
use crate::redirect::Found;
use crate::handlers::parse_id;
use crate::session;
use crate::state::AppState;

/// Listing already loaded and checked by `require_owner`
#[derive(Clone, Debug)]
pub struct OwnedListing(pub Listing);

fn current_user(request: &Request) -> AppResult<CurrentUser> {
    request.extensions().get::<CurrentUser>().cloned().ok_or_else(|| {
        AppError::internal_server_error("Login required before ownership validation")
    })
}

/// Lets the request through only when the session user owns the listing.
/// Anyone else is sent back to the listing page with a notice.
pub async fn require_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    session: Session,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let user = current_user(&request)?;
    let listing_id = parse_id(&id)?;

    let listing = state
        .store
        .find_listing(listing_id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;

    if !listing.is_owned_by(user.id) {
        tracing::warn!(
            "Ownership check failed: user '{}' ({}) does not own listing {}",
            user.username, user.id, listing_id
        );
        session::flash_error(
            &session,
            "You don't have permission. It can only be done by the owner.",
        )
        .await?;
        return Ok(Found::to(format!("/listings/{}", listing_id)).into_response());
    }

    request.extensions_mut().insert(OwnedListing(listing));
    Ok(next.run(request).await)
}

/// Lets the request through only when the review belongs to the listing and
/// the session user wrote it
pub async fn require_review_author(
    State(state): State<AppState>,
    Path((id, review_id)): Path<(String, String)>,
    session: Session,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let user = current_user(&request)?;
    let listing_id = parse_id(&id)?;
    let review_id = parse_id(&review_id)?;

    let listing = state
        .store
        .find_listing(listing_id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;

    // Only reviews referenced by this listing are addressable under it
    if !listing.reviews.contains(&review_id) {
        return Err(AppError::not_found("Review not found"));
    }

    let review = state
        .store
        .find_review(review_id)
        .await?
        .ok_or_else(|| AppError::not_found("Review not found"))?;

    if !review.is_authored_by(user.id) {
        tracing::warn!(
            "Authorship check failed: user '{}' ({}) did not write review {}",
            user.username, user.id, review_id
        );
        session::flash_error(&session, "You are not the author of this review.").await?;
        return Ok(Found::to(format!("/listings/{}", listing_id)).into_response());
    }

    Ok(next.run(request).await)
}
