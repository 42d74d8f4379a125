use axum::extract::{Path, State};
use tower_sessions::Session;

use super::parse_id;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::redirect::Found;
use crate::session;
use crate::state::AppState;
use crate::validation::{ReviewForm, ValidatedForm};

/// POST /listings/:id/reviews
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedForm(form): ValidatedForm<ReviewForm>,
) -> AppResult<Found> {
    let listing_id = parse_id(&id)?;

    // Review insert and reference append commit together or not at all
    let review = state
        .store
        .add_review(listing_id, form.into_new_review(user.id))
        .await?;
    tracing::info!("Review {} added to listing {} by {}", review.id, listing_id, user.username);

    session::flash_success(&session, "New Review Created!").await?;
    Ok(Found::to(format!("/listings/{}", listing_id)))
}

/// DELETE /listings/:id/reviews/:review_id
pub async fn destroy(
    State(state): State<AppState>,
    session: Session,
    Path((id, review_id)): Path<(String, String)>,
) -> AppResult<Found> {
    let listing_id = parse_id(&id)?;
    let review_id = parse_id(&review_id)?;

    state.store.remove_review(listing_id, review_id).await?;
    tracing::info!("Review {} removed from listing {}", review_id, listing_id);

    session::flash_success(&session, "Review Deleted!").await?;
    Ok(Found::to(format!("/listings/{}", listing_id)))
}
