use axum::{
    extract::{Path, State},
    response::Html,
    Extension,
};
use tower_sessions::Session;

use super::parse_id;
use crate::error::{AppError, AppResult};
use crate::middleware::{CurrentUser, OwnedListing};
use crate::redirect::Found;
use crate::session;
use crate::state::AppState;
use crate::validation::{ListingForm, ValidatedForm};
use crate::views;

/// GET /listings
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    user: Option<CurrentUser>,
) -> AppResult<Html<String>> {
    let listings = state.store.list_listings().await?;
    views::render(&session, user.as_ref(), "All listings", &views::listings::index(&listings)).await
}

/// GET /listings/new
pub async fn new_form(session: Session, user: CurrentUser) -> AppResult<Html<String>> {
    views::render(&session, Some(&user), "New listing", &views::listings::new_form()).await
}

/// POST /listings
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    ValidatedForm(form): ValidatedForm<ListingForm>,
) -> AppResult<Found> {
    let listing = state.store.insert_listing(form.into_new_listing(user.id)).await?;
    tracing::info!("Listing {} created by {}", listing.id, user.username);

    session::flash_success(&session, "New Listing Created!").await?;
    Ok(Found::to("/listings"))
}

/// GET /listings/:id
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    user: Option<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&id)?;
    let listing = state
        .store
        .find_listing(id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;

    let reviews = state.store.reviews_for(&listing).await?;
    let owner = state.store.find_user(listing.owner).await?;
    let body = views::listings::show(
        &listing,
        owner.as_ref().map(|owner| owner.username.as_str()),
        &reviews,
        user.as_ref(),
    );

    views::render(&session, user.as_ref(), &listing.title, &body).await
}

/// GET /listings/:id/edit
pub async fn edit_form(
    session: Session,
    user: CurrentUser,
    Extension(OwnedListing(listing)): Extension<OwnedListing>,
) -> AppResult<Html<String>> {
    views::render(&session, Some(&user), "Edit listing", &views::listings::edit_form(&listing)).await
}

/// PUT /listings/:id
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    ValidatedForm(form): ValidatedForm<ListingForm>,
) -> AppResult<Found> {
    let id = parse_id(&id)?;
    state
        .store
        .update_listing(id, form.into_changes())
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;
    tracing::info!("Listing {} updated", id);

    session::flash_success(&session, "Listing Updated!").await?;
    Ok(Found::to(format!("/listings/{}", id)))
}

/// DELETE /listings/:id
pub async fn destroy(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Found> {
    let id = parse_id(&id)?;
    let deleted = state
        .store
        .delete_listing(id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;
    tracing::info!("Listing {} deleted with {} reviews", id, deleted.reviews.len());

    session::flash_success(&session, "Listing Deleted!").await?;
    Ok(Found::to("/listings"))
}
